//! GraphQL SDL analyzer.
//!
//! A small recursive-descent parser over the SDL token stream: object,
//! input, interface, and enum definitions become DataEntities; fields of
//! `Query`, `Mutation`, and `Subscription` become ApiEndpoints.

use archmap_core::errors::ParseError;
use archmap_core::model::{ApiEndpoint, ApiKind, DataEntity, EntityField};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct GraphqlAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(GraphqlAnalyzer {
        kernel: AnalyzerKernel::new("graphql-schema", services),
    }))
}

impl Analyzer for GraphqlAnalyzer {
    fn id(&self) -> &'static str {
        "graphql-schema"
    }

    fn display_name(&self) -> &'static str {
        "GraphQL schema"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["graphql"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.graphql".into(), "**/*.graphqls".into(), "*.graphql".into(), "*.graphqls".into()]
    }

    fn priority(&self) -> i32 {
        priority::SCHEMA
    }

    fn strategy(&self) -> Strategy {
        has_files(["**/*.graphql", "**/*.graphqls", "*.graphql", "*.graphqls"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["*.graphql", "*.graphqls"]);
        let kernel = super::schema_kernel(&self.kernel, ctx);
        let timed_out = kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_sdl(&component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

// ─── SDL tokenizer ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Punct(char),
    StringBlock,
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '#' => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '"' => {
                // Block or single-line description string.
                let block = text[i..].starts_with("\"\"\"");
                if block {
                    chars.next();
                    chars.next();
                    let mut quote_run = 0;
                    for (_, c) in chars.by_ref() {
                        if c == '"' {
                            quote_run += 1;
                            if quote_run == 3 {
                                break;
                            }
                        } else {
                            quote_run = 0;
                        }
                    }
                } else {
                    let mut escaped = false;
                    for (_, c) in chars.by_ref() {
                        if escaped {
                            escaped = false;
                        } else if c == '\\' {
                            escaped = true;
                        } else if c == '"' {
                            break;
                        }
                    }
                }
                tokens.push(Token::StringBlock);
            }
            '{' | '}' | '(' | ')' | ':' | '!' | '[' | ']' | '=' | '@' | '&' | '|' => {
                tokens.push(Token::Punct(c));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                let mut end = i + c.len_utf8();
                while let Some(&(j, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        end = j + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(text[start..end].to_string()));
            }
            c if c.is_whitespace() || c == ',' => {}
            c => return Err(format!("unexpected character '{c}'")),
        }
    }
    Ok(tokens)
}

// ─── SDL parser ────────────────────────────────────────────────────────────

struct SdlParser {
    tokens: Vec<Token>,
    position: usize,
}

#[derive(Debug)]
struct SdlField {
    name: String,
    field_type: String,
    nullable: bool,
    args: Vec<(String, String)>,
}

#[derive(Debug)]
struct SdlType {
    keyword: String,
    name: String,
    fields: Vec<SdlField>,
}

impl SdlParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect_name(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Name(name)) => Ok(name),
            other => Err(format!("expected name, found {other:?}")),
        }
    }

    fn expect_punct(&mut self, punct: char) -> Result<(), String> {
        match self.next() {
            Some(Token::Punct(c)) if c == punct => Ok(()),
            other => Err(format!("expected '{punct}', found {other:?}")),
        }
    }

    fn parse_document(&mut self) -> Result<Vec<SdlType>, String> {
        let mut types = Vec::new();
        while let Some(token) = self.next() {
            match token {
                Token::Name(keyword)
                    if matches!(keyword.as_str(), "type" | "input" | "interface" | "enum") =>
                {
                    types.push(self.parse_type_definition(keyword)?);
                }
                Token::Name(keyword) if keyword == "schema" => {
                    self.skip_braced_block()?;
                }
                Token::Name(keyword) if keyword == "scalar" || keyword == "directive" => {
                    // scalar Name / directive @name(...) on ... — consume
                    // to the next definition keyword.
                    self.skip_until_definition();
                }
                Token::Name(keyword) if keyword == "extend" => {}
                Token::StringBlock => {}
                Token::Name(other) => {
                    return Err(format!("unexpected top-level token '{other}'"));
                }
                Token::Punct(c) => {
                    return Err(format!("unexpected top-level '{c}'"));
                }
            }
        }
        Ok(types)
    }

    fn parse_type_definition(&mut self, keyword: String) -> Result<SdlType, String> {
        let name = self.expect_name()?;

        // implements A & B, directives
        while let Some(token) = self.peek() {
            match token {
                Token::Punct('{') => break,
                _ => {
                    self.next();
                }
            }
        }
        self.expect_punct('{')?;

        let mut fields = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Punct('}')) => {
                    self.next();
                    break;
                }
                Some(Token::StringBlock) => {
                    self.next();
                }
                Some(Token::Name(_)) => {
                    if keyword == "enum" {
                        let value = self.expect_name()?;
                        fields.push(SdlField {
                            name: value,
                            field_type: name.clone(),
                            nullable: false,
                            args: Vec::new(),
                        });
                    } else {
                        fields.push(self.parse_field()?);
                    }
                }
                other => return Err(format!("unexpected token in {name}: {other:?}")),
            }
        }

        Ok(SdlType {
            keyword,
            name,
            fields,
        })
    }

    fn parse_field(&mut self) -> Result<SdlField, String> {
        let name = self.expect_name()?;
        let mut args = Vec::new();

        if matches!(self.peek(), Some(Token::Punct('('))) {
            self.next();
            loop {
                match self.next() {
                    Some(Token::Punct(')')) => break,
                    Some(Token::Name(arg_name)) => {
                        self.expect_punct(':')?;
                        let (arg_type, _) = self.parse_type_reference()?;
                        // Default value: `= literal`
                        if matches!(self.peek(), Some(Token::Punct('='))) {
                            self.next();
                            self.next();
                        }
                        args.push((arg_name, arg_type));
                    }
                    Some(Token::StringBlock) => {}
                    other => return Err(format!("unexpected argument token {other:?}")),
                }
            }
        }

        self.expect_punct(':')?;
        let (field_type, nullable) = self.parse_type_reference()?;
        self.skip_directives();

        Ok(SdlField {
            name,
            field_type,
            nullable,
            args,
        })
    }

    /// `User`, `User!`, `[User!]!` → (base name, nullability of the
    /// outermost reference).
    fn parse_type_reference(&mut self) -> Result<(String, bool), String> {
        let mut depth = 0;
        while matches!(self.peek(), Some(Token::Punct('['))) {
            self.next();
            depth += 1;
        }
        let base = self.expect_name()?;
        let mut nullable = true;
        if matches!(self.peek(), Some(Token::Punct('!'))) {
            self.next();
            nullable = false;
        }
        for _ in 0..depth {
            self.expect_punct(']')?;
            if matches!(self.peek(), Some(Token::Punct('!'))) {
                self.next();
                nullable = false;
            }
        }
        Ok((base, nullable))
    }

    fn skip_directives(&mut self) {
        while matches!(self.peek(), Some(Token::Punct('@'))) {
            self.next();
            self.next();
            if matches!(self.peek(), Some(Token::Punct('('))) {
                let mut depth = 0;
                while let Some(token) = self.next() {
                    match token {
                        Token::Punct('(') => depth += 1,
                        Token::Punct(')') => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn skip_braced_block(&mut self) -> Result<(), String> {
        while !matches!(self.peek(), Some(Token::Punct('{')) | None) {
            self.next();
        }
        let mut depth = 0;
        while let Some(token) = self.next() {
            match token {
                Token::Punct('{') => depth += 1,
                Token::Punct('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err("unbalanced braces".to_string())
    }

    fn skip_until_definition(&mut self) {
        while let Some(token) = self.peek() {
            if let Token::Name(name) = token {
                if matches!(
                    name.as_str(),
                    "type" | "input" | "interface" | "enum" | "scalar" | "schema" | "directive"
                ) {
                    return;
                }
            }
            self.next();
        }
    }
}

// ─── Findings mapping ──────────────────────────────────────────────────────

const OPERATION_TYPES: &[(&str, ApiKind, &str)] = &[
    ("Query", ApiKind::GraphqlQuery, "QUERY"),
    ("Mutation", ApiKind::GraphqlMutation, "MUTATION"),
    ("Subscription", ApiKind::GraphqlSubscription, "SUBSCRIPTION"),
];

fn parse_sdl(component_id: &str, file: &DiscoveredFile, text: &str) -> Result<Findings, ParseError> {
    let tokens = tokenize(text).map_err(|message| ParseError::Syntax {
        path: file.path.clone(),
        message,
    })?;
    let types = SdlParser::new(tokens)
        .parse_document()
        .map_err(|message| ParseError::Syntax {
            path: file.path.clone(),
            message,
        })?;

    let mut findings = Findings::new();
    for sdl_type in &types {
        let operation = OPERATION_TYPES
            .iter()
            .find(|(name, _, _)| sdl_type.name == *name && sdl_type.keyword == "type");

        if let Some((_, kind, method)) = operation {
            for field in &sdl_type.fields {
                let mut endpoint =
                    ApiEndpoint::new(component_id, *kind, *method, field.name.clone())
                        .with_response_schema(field.field_type.clone());
                if let Some((_, input_type)) = field.args.first() {
                    endpoint.request_schema = Some(input_type.clone());
                }
                for (arg_name, arg_type) in &field.args {
                    endpoint.parameters.push(format!("{arg_name}:{arg_type}"));
                }
                findings.endpoints.push(endpoint);
            }
            continue;
        }

        let entity_kind = match sdl_type.keyword.as_str() {
            "input" => "graphql-input",
            "interface" => "graphql-interface",
            "enum" => "graphql-enum",
            _ => "graphql-type",
        };
        let mut entity = DataEntity::new(component_id, &sdl_type.name, entity_kind);
        for field in &sdl_type.fields {
            entity.fields.push(EntityField {
                name: field.name.clone(),
                field_type: field.field_type.clone(),
                nullable: field.nullable,
                default_value: None,
            });
        }
        if entity.fields.iter().any(|f| f.name == "id") {
            entity.primary_key = Some("id".to_string());
        }
        findings.entities.push(entity);
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file() -> DiscoveredFile {
        DiscoveredFile {
            path: PathBuf::from("/p/schema.graphql"),
            relative: "schema.graphql".to_string(),
            size_bytes: 1,
        }
    }

    const SCHEMA: &str = r#"
"User of the system"
type User {
  id: ID!
  name: String!
  tags: [String!]
}

input CreateUserInput {
  name: String!
}

type Query {
  getUser(id: ID!): User
}

type Mutation {
  createUser(input: CreateUserInput!): User
}
"#;

    #[test]
    fn types_and_inputs_become_entities() {
        let findings = parse_sdl("c", &file(), SCHEMA).unwrap();
        assert_eq!(findings.entities.len(), 2);
        let user = &findings.entities[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.entity_kind, "graphql-type");
        assert_eq!(user.fields.len(), 3);
        assert!(!user.fields[0].nullable);
        assert!(user.fields[2].nullable);
        assert_eq!(user.primary_key.as_deref(), Some("id"));

        let input = &findings.entities[1];
        assert_eq!(input.entity_kind, "graphql-input");
    }

    #[test]
    fn operations_become_endpoints() {
        let findings = parse_sdl("c", &file(), SCHEMA).unwrap();
        assert_eq!(findings.endpoints.len(), 2);

        let query = &findings.endpoints[0];
        assert_eq!(query.kind, ApiKind::GraphqlQuery);
        assert_eq!(query.method, "QUERY");
        assert_eq!(query.path, "getUser");
        assert_eq!(query.response_schema.as_deref(), Some("User"));

        let mutation = &findings.endpoints[1];
        assert_eq!(mutation.kind, ApiKind::GraphqlMutation);
        assert_eq!(mutation.method, "MUTATION");
        assert_eq!(mutation.path, "createUser");
        assert_eq!(mutation.request_schema.as_deref(), Some("CreateUserInput"));
        assert_eq!(mutation.response_schema.as_deref(), Some("User"));
    }

    #[test]
    fn enums_and_comments_parse() {
        let text = r#"
# role of a user
enum Role {
  ADMIN
  MEMBER
}
"#;
        let findings = parse_sdl("c", &file(), text).unwrap();
        assert_eq!(findings.entities[0].entity_kind, "graphql-enum");
        assert_eq!(findings.entities[0].fields.len(), 2);
    }

    #[test]
    fn malformed_sdl_is_a_syntax_error() {
        let result = parse_sdl("c", &file(), "type User { id: }");
        assert!(result.is_err());
    }
}
