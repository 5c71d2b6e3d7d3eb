//! Generic tree-sitter extraction shared by all language parsers.
//!
//! Two passes over the tree: structure (imports, classes, functions) and
//! call sites. Node kinds from every registered grammar are matched in
//! one place so a new dialect only adds kinds, not passes.

use smallvec::SmallVec;
use tree_sitter::{Node, Parser};

use archmap_core::errors::ParseError;

use super::source_unit::{
    Annotation, AnnotationArg, CallSite, ClassDecl, FieldDecl, FunctionDecl, Import, Param,
    SourceUnit,
};
use crate::scanner::language::Language;

/// Parse a file and extract its structural elements.
pub fn parse_source(
    source: &str,
    file: &str,
    language: Language,
) -> Result<SourceUnit, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|_| ParseError::GrammarNotFound {
            language: language.name().to_string(),
        })?;

    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| ParseError::Syntax {
            path: file.into(),
            message: "tree-sitter returned no tree".to_string(),
        })?;

    let root = tree.root_node();
    let mut unit = SourceUnit::new(file, language);
    unit.error_count = count_errors(root);
    unit.has_errors = unit.error_count > 0;

    let bytes = source.as_bytes();
    extract_structure(&mut unit, root, bytes, 0);
    extract_calls(&mut unit, root, bytes, 0);
    Ok(unit)
}

/// Count ERROR and MISSING nodes in the tree.
fn count_errors(root: Node) -> usize {
    let mut count = 0;
    let mut cursor = root.walk();
    let mut reached_root = false;
    while !reached_root {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            count += 1;
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                reached_root = true;
                break;
            }
        }
    }
    count
}

// ─── Pass 1: structure ─────────────────────────────────────────────────────

fn extract_structure(unit: &mut SourceUnit, node: Node, source: &[u8], depth: usize) {
    if depth > 50 {
        return;
    }
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let child = cursor.node();
        match child.kind() {
            // Imports across grammars
            "import_statement" | "import_declaration" | "import_from_statement"
            | "using_directive" => {
                if let Some(import) = extract_import(child, source) {
                    unit.imports.push(import);
                }
            }
            // Python: decorators wrap the definition
            "decorated_definition" => {
                extract_decorated(unit, child, source);
            }
            // Classes
            "class_declaration" | "class_definition" | "class" => {
                let class = extract_class(child, source, Vec::new());
                if let Some(class) = class {
                    unit.classes.push(class);
                }
            }
            // Top-level functions
            "function_definition" | "function_declaration" | "method" => {
                if let Some(func) = extract_function(child, source, Vec::new()) {
                    unit.functions.push(func);
                }
            }
            // Ruby `module` and namespaces: descend
            "module" | "namespace_declaration" | "block" | "body_statement"
            | "declaration_list" | "compilation_unit" | "program" | "expression_statement"
            | "global_attribute" => {
                extract_structure(unit, child, source, depth + 1);
            }
            _ => {
                // Ruby require / JS require() are call-shaped imports
                if let Some(import) = extract_require(child, source) {
                    unit.imports.push(import);
                } else if child.named_child_count() > 0 && !is_leafish(child.kind()) {
                    extract_structure(unit, child, source, depth + 1);
                }
            }
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

/// Kinds that cannot contain class/function declarations worth walking.
fn is_leafish(kind: &str) -> bool {
    matches!(
        kind,
        "string" | "string_literal" | "comment" | "line_comment" | "block_comment" | "integer"
    )
}

/// Python `decorated_definition`: collect decorators, then the inner
/// class or function carries them as annotations.
fn extract_decorated(unit: &mut SourceUnit, node: Node, source: &[u8]) {
    let mut annotations = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            match child.kind() {
                "decorator" => {
                    if let Some(annotation) = parse_decorator(child, source) {
                        annotations.push(annotation);
                    }
                }
                "class_definition" => {
                    if let Some(class) = extract_class(child, source, annotations.clone()) {
                        unit.classes.push(class);
                    }
                }
                "function_definition" => {
                    if let Some(func) = extract_function(child, source, annotations.clone()) {
                        unit.functions.push(func);
                    }
                }
                _ => {}
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

fn extract_class(node: Node, source: &[u8], mut annotations: Vec<Annotation>) -> Option<ClassDecl> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .or_else(|| find_child_text(node, source, &["identifier", "constant", "type_identifier"]))?;

    annotations.extend(extract_attached_annotations(node, source));

    let mut class = ClassDecl {
        name,
        annotations,
        line: node.start_position().row as u32 + 1,
        ..ClassDecl::default()
    };

    // Superclass / base list
    if let Some(superclass) = node.child_by_field_name("superclass") {
        // Ruby superclass node is `< Constant`; Java is `extends Type`
        class.extends = last_named_text(superclass, source);
    } else if let Some(superclasses) = node.child_by_field_name("superclasses") {
        // Python: first base is the superclass, the rest go to implements
        let mut bases = collect_named_texts(superclasses, source);
        if !bases.is_empty() {
            class.extends = Some(bases.remove(0));
            class.implements = bases.into();
        }
    }
    for i in 0..node.child_count() {
        let child = node.child(i)?;
        match child.kind() {
            "superclass" if class.extends.is_none() => {
                class.extends = last_named_text(child, source);
            }
            "super_interfaces" | "class_heritage" => {
                class.implements.extend(collect_named_texts(child, source));
            }
            "base_list" => {
                // C#: first entry may be the base class; keep all as implements
                let mut bases = collect_named_texts(child, source);
                if class.extends.is_none() && !bases.is_empty() {
                    class.extends = Some(bases.remove(0));
                }
                class.implements.extend(bases);
            }
            _ => {}
        }
    }

    // Body: methods, fields, Ruby includes
    if let Some(body) = node
        .child_by_field_name("body")
        .or_else(|| find_child_by_kind(node, "class_body"))
        .or_else(|| find_child_by_kind(node, "declaration_list"))
        .or_else(|| find_child_by_kind(node, "body_statement"))
        .or_else(|| find_child_by_kind(node, "block"))
    {
        extract_class_body(&mut class, body, source);
    }

    Some(class)
}

fn extract_class_body(class: &mut ClassDecl, body: Node, source: &[u8]) {
    let mut cursor = body.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let child = cursor.node();
        match child.kind() {
            "method_declaration" | "method_definition" | "method" | "constructor_declaration"
            | "function_definition" | "singleton_method" => {
                if let Some(method) = extract_function(child, source, Vec::new()) {
                    class.methods.push(method);
                }
            }
            "decorated_definition" => {
                let mut annotations = Vec::new();
                for i in 0..child.child_count() {
                    if let Some(grandchild) = child.child(i) {
                        match grandchild.kind() {
                            "decorator" => {
                                if let Some(a) = parse_decorator(grandchild, source) {
                                    annotations.push(a);
                                }
                            }
                            "function_definition" => {
                                if let Some(m) =
                                    extract_function(grandchild, source, annotations.clone())
                                {
                                    class.methods.push(m);
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            "field_declaration" | "property_declaration" => {
                if let Some(field) = extract_field(child, source) {
                    class.fields.push(field);
                }
            }
            // Python/Ruby class-level assignment: `name = models.CharField(...)`
            "expression_statement" | "assignment" => {
                let assignment = if child.kind() == "assignment" {
                    Some(child)
                } else {
                    find_child_by_kind(child, "assignment")
                };
                if let Some(assignment) = assignment {
                    if let Some(field) = extract_assignment_field(assignment, source) {
                        class.fields.push(field);
                    }
                }
                // Ruby `include Sidekiq::Worker` parses as a bare call
                if let Some(call) = find_child_by_kind(child, "call") {
                    record_include(class, call, source);
                }
            }
            "call" => {
                record_include(class, child, source);
            }
            _ => {}
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

/// Ruby `include X` / `extend X` inside a class body.
fn record_include(class: &mut ClassDecl, call: Node, source: &[u8]) {
    let method = call
        .child_by_field_name("method")
        .map(|n| node_text(n, source));
    if matches!(method.as_deref(), Some("include") | Some("extend")) {
        if let Some(args) = call.child_by_field_name("arguments") {
            for target in collect_named_texts(args, source) {
                class.includes.push(target);
            }
        }
    }
}

fn extract_function(
    node: Node,
    source: &[u8],
    mut annotations: Vec<Annotation>,
) -> Option<FunctionDecl> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .or_else(|| find_child_text(node, source, &["identifier", "property_identifier"]))?;

    annotations.extend(extract_attached_annotations(node, source));

    let return_type = node
        .child_by_field_name("return_type")
        .or_else(|| node.child_by_field_name("returns"))
        .or_else(|| node.child_by_field_name("type"))
        .map(|n| node_text(n, source));

    let params = node
        .child_by_field_name("parameters")
        .or_else(|| find_child_by_kind(node, "formal_parameters"))
        .or_else(|| find_child_by_kind(node, "parameter_list"))
        .or_else(|| find_child_by_kind(node, "method_parameters"))
        .map(|p| extract_params(p, source))
        .unwrap_or_default();

    Some(FunctionDecl {
        name,
        annotations,
        params,
        return_type,
        line: node.start_position().row as u32 + 1,
    })
}

fn extract_params(list: Node, source: &[u8]) -> SmallVec<[Param; 4]> {
    let mut params = SmallVec::new();
    let mut cursor = list.walk();
    if !cursor.goto_first_child() {
        return params;
    }
    loop {
        let child = cursor.node();
        match child.kind() {
            "formal_parameter" | "parameter" | "required_parameter" | "optional_parameter"
            | "typed_parameter" | "default_parameter" | "typed_default_parameter"
            | "identifier" | "simple_parameter" => {
                let name = if child.kind() == "identifier" {
                    node_text(child, source)
                } else {
                    child
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source))
                        .or_else(|| find_child_text(child, source, &["identifier"]))
                        .unwrap_or_else(|| node_text(child, source))
                };
                let type_annotation = child
                    .child_by_field_name("type")
                    .map(|n| node_text(n, source));
                let default_value = child
                    .child_by_field_name("value")
                    .or_else(|| child.child_by_field_name("default_value"))
                    .map(|n| node_text(n, source));
                params.push(Param {
                    name,
                    type_annotation,
                    annotations: extract_attached_annotations(child, source),
                    default_value,
                });
            }
            _ => {}
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    params
}

fn extract_field(node: Node, source: &[u8]) -> Option<FieldDecl> {
    let annotations = extract_attached_annotations(node, source);
    let field_type = node
        .child_by_field_name("type")
        .map(|n| node_text(n, source));

    // Java: the name sits in a variable_declarator; C#: name field or
    // direct identifier.
    let name = find_child_by_kind(node, "variable_declarator")
        .and_then(|d| {
            d.child_by_field_name("name")
                .map(|n| node_text(n, source))
                .or_else(|| find_child_text(d, source, &["identifier"]))
        })
        .or_else(|| node.child_by_field_name("name").map(|n| node_text(n, source)))
        .or_else(|| find_child_text(node, source, &["identifier"]))?;

    Some(FieldDecl {
        name,
        field_type,
        annotations,
        initializer_call: None,
        initializer_literal: None,
        line: node.start_position().row as u32 + 1,
    })
}

/// Class-level `name = SomeCall(...)` or `name = "literal"` (Python ORMs
/// and dunder attributes).
fn extract_assignment_field(node: Node, source: &[u8]) -> Option<FieldDecl> {
    let left = node.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    let right = node.child_by_field_name("right")?;
    let initializer_call = if right.kind() == "call" {
        extract_call_site(right, source)
    } else {
        None
    };
    let initializer_literal = matches!(right.kind(), "string" | "string_literal")
        .then(|| unquote(&node_text(right, source)));
    Some(FieldDecl {
        name: node_text(left, source),
        field_type: initializer_call.as_ref().map(|c| c.name.clone()),
        annotations: Vec::new(),
        initializer_call,
        initializer_literal,
        line: node.start_position().row as u32 + 1,
    })
}

// ─── Annotations, attributes, decorators ───────────────────────────────────

/// Annotations attached to a declaration node: Java `modifiers`
/// children, C# `attribute_list` children.
fn extract_attached_annotations(node: Node, source: &[u8]) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        match child.kind() {
            "modifiers" => {
                for j in 0..child.child_count() {
                    if let Some(modifier) = child.child(j) {
                        if matches!(modifier.kind(), "annotation" | "marker_annotation") {
                            if let Some(a) = parse_java_annotation(modifier, source) {
                                annotations.push(a);
                            }
                        }
                    }
                }
            }
            "annotation" | "marker_annotation" => {
                if let Some(a) = parse_java_annotation(child, source) {
                    annotations.push(a);
                }
            }
            "attribute_list" => {
                for j in 0..child.child_count() {
                    if let Some(attribute) = child.child(j) {
                        if attribute.kind() == "attribute" {
                            if let Some(a) = parse_csharp_attribute(attribute, source) {
                                annotations.push(a);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    annotations
}

/// Java `@Name` or `@Name(args)`.
fn parse_java_annotation(node: Node, source: &[u8]) -> Option<Annotation> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .or_else(|| find_child_text(node, source, &["identifier", "scoped_identifier"]))?;
    let mut args = Vec::new();
    if let Some(list) = node
        .child_by_field_name("arguments")
        .or_else(|| find_child_by_kind(node, "annotation_argument_list"))
    {
        for i in 0..list.child_count() {
            let Some(child) = list.child(i) else { continue };
            match child.kind() {
                "element_value_pair" => {
                    let key = child
                        .child_by_field_name("key")
                        .map(|n| node_text(n, source));
                    let value = child
                        .child_by_field_name("value")
                        .map(|n| annotation_value(n, source))
                        .unwrap_or_default();
                    args.push(AnnotationArg { name: key, value });
                }
                "(" | ")" | "," => {}
                _ => {
                    args.push(AnnotationArg::positional(annotation_value(child, source)));
                }
            }
        }
    }
    Some(Annotation {
        name,
        args,
        raw: node_text(node, source),
    })
}

/// C# `[Name]` or `[Name(args)]`.
fn parse_csharp_attribute(node: Node, source: &[u8]) -> Option<Annotation> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .or_else(|| find_child_text(node, source, &["identifier", "qualified_name"]))?;
    let mut args = Vec::new();
    if let Some(list) = find_child_by_kind(node, "attribute_argument_list") {
        for i in 0..list.child_count() {
            let Some(child) = list.child(i) else { continue };
            if child.kind() == "attribute_argument" {
                let mut key = None;
                let mut value = String::new();
                for j in 0..child.child_count() {
                    if let Some(part) = child.child(j) {
                        match part.kind() {
                            "name_equals" | "name_colon" => {
                                key = find_child_text(part, source, &["identifier"]);
                            }
                            "=" | ":" => {}
                            _ => value = annotation_value(part, source),
                        }
                    }
                }
                args.push(AnnotationArg { name: key, value });
            }
        }
    }
    Some(Annotation {
        name,
        args,
        raw: node_text(node, source),
    })
}

/// Python `@expr` where expr is an identifier, dotted name, or call.
fn parse_decorator(node: Node, source: &[u8]) -> Option<Annotation> {
    let mut target = None;
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        if child.kind() != "@" {
            target = Some(child);
            break;
        }
    }
    let target = target?;
    match target.kind() {
        "call" => {
            let call = extract_call_site(target, source)?;
            let name = match &call.receiver {
                Some(receiver) => format!("{receiver}.{}", call.name),
                None => call.name.clone(),
            };
            Some(Annotation {
                name,
                args: call.args,
                raw: node_text(node, source),
            })
        }
        _ => Some(Annotation {
            name: node_text(target, source),
            args: Vec::new(),
            raw: node_text(node, source),
        }),
    }
}

fn annotation_value(node: Node, source: &[u8]) -> String {
    unquote(&node_text(node, source))
}

// ─── Pass 2: call sites ────────────────────────────────────────────────────

fn extract_calls(unit: &mut SourceUnit, node: Node, source: &[u8], depth: usize) {
    if depth > 50 {
        return;
    }
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let child = cursor.node();
        match child.kind() {
            "call_expression" | "call" | "method_invocation" | "invocation_expression" => {
                if let Some(call) = extract_call_site(child, source) {
                    unit.calls.push(call);
                }
                extract_calls(unit, child, source, depth + 1);
            }
            kind if is_leafish(kind) => {}
            _ => extract_calls(unit, child, source, depth + 1),
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

fn extract_call_site(node: Node, source: &[u8]) -> Option<CallSite> {
    let (name, receiver) = extract_call_target(node, source)?;
    let args = node
        .child_by_field_name("arguments")
        .map(|a| extract_call_args(a, source))
        .unwrap_or_default();
    Some(CallSite {
        receiver,
        name,
        args,
        line: node.start_position().row as u32 + 1,
    })
}

fn extract_call_target(node: Node, source: &[u8]) -> Option<(String, Option<String>)> {
    if let Some(func) = node.child_by_field_name("function") {
        match func.kind() {
            "identifier" | "name" => return Some((node_text(func, source), None)),
            "member_expression" | "attribute" | "member_access_expression"
            | "selector_expression" => {
                let receiver = func
                    .child_by_field_name("object")
                    .or_else(|| func.child_by_field_name("expression"))
                    .or_else(|| func.child_by_field_name("operand"))
                    .map(|n| node_text(n, source));
                let name = func
                    .child_by_field_name("property")
                    .or_else(|| func.child_by_field_name("attribute"))
                    .or_else(|| func.child_by_field_name("name"))
                    .or_else(|| func.child_by_field_name("field"))
                    .map(|n| node_text(n, source));
                if let Some(name) = name {
                    return Some((name, receiver));
                }
            }
            _ => return Some((node_text(func, source), None)),
        }
    }
    // Java method_invocation / Ruby call: name + object/receiver fields
    if let Some(name) = node
        .child_by_field_name("name")
        .or_else(|| node.child_by_field_name("method"))
    {
        let receiver = node
            .child_by_field_name("object")
            .or_else(|| node.child_by_field_name("receiver"))
            .map(|n| node_text(n, source));
        return Some((node_text(name, source), receiver));
    }
    None
}

fn extract_call_args(list: Node, source: &[u8]) -> Vec<AnnotationArg> {
    let mut args = Vec::new();
    let mut cursor = list.walk();
    if !cursor.goto_first_child() {
        return args;
    }
    loop {
        let child = cursor.node();
        match child.kind() {
            "(" | ")" | "," | "[" | "]" => {}
            "keyword_argument" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source));
                let value = child
                    .child_by_field_name("value")
                    .map(|n| unquote(&node_text(n, source)))
                    .unwrap_or_default();
                args.push(AnnotationArg { name, value });
            }
            "pair" => {
                // Ruby keyword args: `queue: "mailers"`
                let name = child
                    .child_by_field_name("key")
                    .map(|n| node_text(n, source).trim_end_matches(':').to_string());
                let value = child
                    .child_by_field_name("value")
                    .map(|n| unquote(&node_text(n, source)))
                    .unwrap_or_default();
                args.push(AnnotationArg { name, value });
            }
            "argument_list" | "arguments" => {
                args.extend(extract_call_args(child, source));
            }
            _ => {
                args.push(AnnotationArg::positional(unquote(&node_text(
                    child, source,
                ))));
            }
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
    args
}

// ─── Imports ───────────────────────────────────────────────────────────────

fn extract_import(node: Node, source: &[u8]) -> Option<Import> {
    let line = node.start_position().row as u32 + 1;
    let source_text = match node.kind() {
        // JS/TS: import ... from 'module'
        "import_statement" => node
            .child_by_field_name("source")
            .map(|n| unquote(&node_text(n, source)))
            .or_else(|| {
                // Python plain `import a.b`
                find_child_text(node, source, &["dotted_name", "aliased_import"])
            }),
        // Python: from X import a
        "import_from_statement" => node
            .child_by_field_name("module_name")
            .map(|n| node_text(n, source)),
        // Java: import a.b.C;
        "import_declaration" => {
            find_child_text(node, source, &["scoped_identifier", "identifier"])
        }
        // C#: using A.B;
        "using_directive" => find_child_text(node, source, &["qualified_name", "identifier"]),
        _ => None,
    }?;
    Some(Import {
        source: source_text,
        line,
    })
}

/// Ruby `require 'x'` / JS `require("x")` call-shaped imports.
fn extract_require(node: Node, source: &[u8]) -> Option<Import> {
    if !matches!(node.kind(), "call" | "call_expression" | "expression_statement") {
        return None;
    }
    let call_node = if node.kind() == "expression_statement" {
        find_child_by_kind(node, "call").or_else(|| find_child_by_kind(node, "call_expression"))?
    } else {
        node
    };
    let call = extract_call_site(call_node, source)?;
    if call.receiver.is_none() && matches!(call.name.as_str(), "require" | "require_relative") {
        let target = call.first_string_arg()?.to_string();
        return Some(Import {
            source: target,
            line: call.line,
        });
    }
    None
}

// ─── Utilities ─────────────────────────────────────────────────────────────

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn unquote(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("f\"")
        .map(|rest| rest.trim_end_matches('"'))
        .or_else(|| trimmed.strip_prefix("f'").map(|rest| rest.trim_end_matches('\'')))
        .unwrap_or(trimmed);
    trimmed
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

fn find_child_text(node: Node, source: &[u8], kinds: &[&str]) -> Option<String> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if kinds.contains(&child.kind()) {
                let text = node_text(child, source);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }
    None
}

fn last_named_text(node: Node, source: &[u8]) -> Option<String> {
    let mut last = None;
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            last = Some(node_text(child, source));
        }
    }
    last
}

fn collect_named_texts(node: Node, source: &[u8]) -> Vec<String> {
    let mut texts = Vec::new();
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            let text = node_text(child, source);
            if !text.is_empty() && text != "," {
                texts.push(text);
            }
        }
    }
    texts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_class_with_annotations_and_methods() {
        let source = r#"
import org.springframework.web.bind.annotation.RestController;

@RestController
@RequestMapping("/api/users")
public class UserController {
    @GetMapping("/{id}")
    public User get(@PathVariable Long id) { return null; }
}
"#;
        let unit = parse_source(source, "UserController.java", Language::Java).unwrap();
        assert!(!unit.has_errors);
        assert_eq!(unit.classes.len(), 1);

        let class = &unit.classes[0];
        assert_eq!(class.name, "UserController");
        let names: Vec<_> = class.annotations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["RestController", "RequestMapping"]);
        assert_eq!(
            class.annotations[1].first_positional(),
            Some("/api/users")
        );

        let method = &class.methods[0];
        assert_eq!(method.name, "get");
        assert_eq!(method.annotations[0].name, "GetMapping");
        assert_eq!(method.annotations[0].first_positional(), Some("/{id}"));
        assert_eq!(method.params[0].annotations[0].name, "PathVariable");
    }

    #[test]
    fn python_decorated_function() {
        let source = r#"
from fastapi import FastAPI

app = FastAPI()

@app.get("/users")
def list_users():
    return []
"#;
        let unit = parse_source(source, "main.py", Language::Python).unwrap();
        assert!(!unit.has_errors);
        assert!(unit.imports_contain("fastapi"));
        assert_eq!(unit.functions.len(), 1);
        let func = &unit.functions[0];
        assert_eq!(func.name, "list_users");
        assert_eq!(func.annotations[0].name, "app.get");
        assert_eq!(func.annotations[0].first_positional(), Some("/users"));
    }

    #[test]
    fn python_syntax_error_is_flagged() {
        let source = "def broken(\n    return 1\n";
        let unit = parse_source(source, "bad.py", Language::Python).unwrap();
        assert!(unit.has_errors);
    }

    #[test]
    fn ruby_class_with_include() {
        let source = r#"
class HardWorker
  include Sidekiq::Worker
  def perform(name)
  end
end
"#;
        let unit = parse_source(source, "worker.rb", Language::Ruby).unwrap();
        assert_eq!(unit.classes.len(), 1);
        let class = &unit.classes[0];
        assert_eq!(class.name, "HardWorker");
        assert!(class.includes.iter().any(|i| i == "Sidekiq::Worker"));
        assert_eq!(class.methods[0].name, "perform");
    }

    #[test]
    fn ruby_controller_superclass() {
        let source = r#"
class UsersController < ApplicationController
  def index
  end
  def show
  end
end
"#;
        let unit = parse_source(source, "users_controller.rb", Language::Ruby).unwrap();
        let class = &unit.classes[0];
        assert_eq!(class.extends.as_deref(), Some("ApplicationController"));
        assert_eq!(class.methods.len(), 2);
    }

    #[test]
    fn csharp_attributes_on_class_and_methods() {
        let source = r#"
using Microsoft.AspNetCore.Mvc;

[ApiController]
[Route("api/products")]
public class ProductsController : ControllerBase {
    [HttpGet("{id}")]
    public Product Get(int id) { return null; }
}
"#;
        let unit = parse_source(source, "ProductsController.cs", Language::CSharp).unwrap();
        let class = &unit.classes[0];
        assert_eq!(class.name, "ProductsController");
        assert_eq!(class.extends.as_deref(), Some("ControllerBase"));
        let names: Vec<_> = class.annotations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ApiController", "Route"]);
        assert_eq!(class.annotations[1].first_positional(), Some("api/products"));
        assert_eq!(class.methods[0].annotations[0].name, "HttpGet");
    }

    #[test]
    fn javascript_call_sites() {
        let source = r#"
const express = require('express');
const app = express();
app.get('/users', (req, res) => res.json([]));
app.post('/users', createUser);
"#;
        let unit = parse_source(source, "server.js", Language::JavaScript).unwrap();
        assert!(unit.imports_contain("express"));
        let routes: Vec<_> = unit
            .calls
            .iter()
            .filter(|c| c.receiver.as_deref() == Some("app"))
            .map(|c| (c.name.clone(), c.first_string_arg().unwrap().to_string()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("get".to_string(), "/users".to_string()),
                ("post".to_string(), "/users".to_string()),
            ]
        );
    }

    #[test]
    fn python_class_fields_from_assignments() {
        let source = r#"
class User(Base):
    __tablename__ = "users"
    id = Column(Integer, primary_key=True)
    name = Column(String)
"#;
        let unit = parse_source(source, "models.py", Language::Python).unwrap();
        let class = &unit.classes[0];
        assert_eq!(class.extends.as_deref(), Some("Base"));
        let id_field = class.fields.iter().find(|f| f.name == "id").unwrap();
        let call = id_field.initializer_call.as_ref().unwrap();
        assert_eq!(call.name, "Column");
        assert_eq!(call.named_arg("primary_key"), Some("True"));
    }
}
