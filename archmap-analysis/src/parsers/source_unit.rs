//! The typed view of one parsed source file.
//!
//! A `SourceUnit` is language-neutral: analyzers for Spring, FastAPI,
//! Rails, ASP.NET, … all read the same shape (classes, annotations,
//! methods, fields, call sites) and interpret it per framework.

use smallvec::SmallVec;

use crate::scanner::language::Language;

/// One import / require / using statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub source: String,
    pub line: u32,
}

/// One argument of an annotation or call: positional or named.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationArg {
    pub name: Option<String>,
    /// String literals are unquoted; other expressions keep their text.
    pub value: String,
}

impl AnnotationArg {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

/// An annotation, attribute, or decorator attached to a declaration.
///
/// `name` keeps the dotted form for call-shaped decorators
/// (`app.get`, `shared_task`), and the bare identifier for Java/C#
/// annotations (`GetMapping`, `Route`).
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub args: Vec<AnnotationArg>,
    pub raw: String,
}

impl Annotation {
    /// First positional argument, if any.
    pub fn first_positional(&self) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.name.is_none())
            .map(|a| a.value.as_str())
    }

    /// Value of a named argument.
    pub fn named_arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| a.value.as_str())
    }

    /// Bare name without any receiver prefix (`app.get` → `get`).
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Receiver prefix of a dotted decorator (`app.get` → `app`).
    pub fn receiver(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(r, _)| r)
    }
}

/// One function or method parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Param {
    pub name: String,
    pub type_annotation: Option<String>,
    pub annotations: Vec<Annotation>,
    pub default_value: Option<String>,
}

/// One function or method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub params: SmallVec<[Param; 4]>,
    pub return_type: Option<String>,
    pub line: u32,
}

/// One field or property declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub field_type: Option<String>,
    pub annotations: Vec<Annotation>,
    /// Call-shaped initializer, e.g. `Column(Integer, primary_key=True)`
    /// or `models.ForeignKey("Order")`.
    pub initializer_call: Option<CallSite>,
    /// String-literal initializer, e.g. `__tablename__ = "users"`.
    pub initializer_literal: Option<String>,
    pub line: u32,
}

/// One class, struct, or module-level type declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDecl {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub extends: Option<String>,
    pub implements: SmallVec<[String; 2]>,
    /// Ruby `include`/`extend` targets inside the class body.
    pub includes: Vec<String>,
    pub methods: Vec<FunctionDecl>,
    pub fields: Vec<FieldDecl>,
    pub line: u32,
}

/// One call site with its receiver and literal-ish arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    pub receiver: Option<String>,
    pub name: String,
    pub args: Vec<AnnotationArg>,
    pub line: u32,
}

impl CallSite {
    pub fn first_string_arg(&self) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.name.is_none())
            .map(|a| a.value.as_str())
    }

    pub fn named_arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| a.value.as_str())
    }
}

/// Everything extracted from one source file by the tier-1 parser.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub file: String,
    pub language: Language,
    /// True when the tree contained ERROR or MISSING nodes; the kernel
    /// treats such a unit as a tier-1 failure.
    pub has_errors: bool,
    pub error_count: usize,
    pub imports: Vec<Import>,
    pub classes: Vec<ClassDecl>,
    /// Top-level functions (module scope).
    pub functions: Vec<FunctionDecl>,
    /// All call sites in the file, in source order.
    pub calls: Vec<CallSite>,
}

impl SourceUnit {
    pub fn new(file: impl Into<String>, language: Language) -> Self {
        Self {
            file: file.into(),
            language,
            has_errors: false,
            error_count: 0,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// True iff any import source contains the needle.
    pub fn imports_contain(&self, needle: &str) -> bool {
        self.imports.iter().any(|i| i.source.contains(needle))
    }
}
