//! SQL DDL analyzer: `CREATE TABLE` statements in migration files.
//!
//! Tier 1 is a dedicated statement-oriented parser (tokenized enough to
//! survive quoting and nested parens); tier 2 recovers bare table names.

use std::sync::OnceLock;

use archmap_core::errors::ParseError;
use archmap_core::model::ids::component_id as id_for;
use archmap_core::model::{DataEntity, EntityField, Relationship, RelationshipKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use regex::Regex;

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct SqlDdlAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(SqlDdlAnalyzer {
        kernel: AnalyzerKernel::new("sql-ddl", services),
    }))
}

impl Analyzer for SqlDdlAnalyzer {
    fn id(&self) -> &'static str {
        "sql-ddl"
    }

    fn display_name(&self) -> &'static str {
        "SQL DDL tables"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["sql"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.sql".into(), "*.sql".into()]
    }

    fn priority(&self) -> i32 {
        priority::DATA
    }

    fn strategy(&self) -> Strategy {
        has_files(["**/*.sql", "*.sql"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new()
            .with_name_patterns(&["*.sql"])
            .with_markers(&["CREATE TABLE", "create table"]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_ddl(&component_id, file, text),
            Some(&|_file, text| fallback_tables(&component_id, text)),
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

fn parse_ddl(
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    let mut findings = Findings::new();
    let mut found_any = false;

    for statement in split_statements(text) {
        let upper = statement.to_uppercase();
        let Some(idx) = upper.find("CREATE TABLE") else {
            continue;
        };
        found_any = true;
        let after = statement[idx + "CREATE TABLE".len()..].trim_start();
        let after = after
            .strip_prefix("IF NOT EXISTS")
            .or_else(|| after.strip_prefix("if not exists"))
            .unwrap_or(after)
            .trim_start();

        let Some(open) = after.find('(') else {
            return Err(ParseError::Malformed {
                path: file.path.clone(),
                message: "CREATE TABLE without column list".to_string(),
            });
        };
        let table = normalize_ident(after[..open].trim());
        if table.is_empty() {
            return Err(ParseError::Malformed {
                path: file.path.clone(),
                message: "CREATE TABLE with empty table name".to_string(),
            });
        }
        let Some(body) = matching_paren_body(&after[open..]) else {
            return Err(ParseError::Malformed {
                path: file.path.clone(),
                message: format!("unbalanced parentheses in CREATE TABLE {table}"),
            });
        };

        let mut entity = DataEntity::new(component_id, &table, "table");
        for item in split_top_level(body) {
            parse_table_item(item.trim(), &table, &mut entity, &mut findings);
        }
        findings.entities.push(entity);
    }

    if !found_any {
        return Err(ParseError::Unsupported {
            path: file.path.clone(),
            message: "no CREATE TABLE statements".to_string(),
        });
    }
    Ok(findings)
}

/// One column or constraint line inside the CREATE TABLE body.
fn parse_table_item(
    item: &str,
    table: &str,
    entity: &mut DataEntity,
    findings: &mut Findings,
) {
    if item.is_empty() {
        return;
    }
    let upper = item.to_uppercase();

    if upper.starts_with("PRIMARY KEY") {
        if let Some(column) = first_paren_ident(item) {
            entity.primary_key = Some(column);
        }
        return;
    }
    if upper.starts_with("FOREIGN KEY") || upper.contains("REFERENCES") {
        if let Some(target) = references_table(item) {
            findings.relationships.push(
                Relationship::new(id_for(table), id_for(&target), RelationshipKind::DependsOn)
                    .with_description("Many-to-One")
                    .with_source_analyzer("sql-ddl"),
            );
        }
        if upper.starts_with("FOREIGN KEY") || upper.starts_with("CONSTRAINT") {
            return;
        }
    }
    if upper.starts_with("CONSTRAINT") || upper.starts_with("UNIQUE") || upper.starts_with("CHECK")
        || upper.starts_with("INDEX") || upper.starts_with("KEY ")
    {
        return;
    }

    // Plain column: `name TYPE [NOT NULL] [DEFAULT v] [PRIMARY KEY]`.
    let mut tokens = item.split_whitespace();
    let Some(name) = tokens.next() else { return };
    let Some(column_type) = tokens.next() else { return };
    let name = normalize_ident(name);

    let nullable = !upper.contains("NOT NULL") && !upper.contains("PRIMARY KEY");
    let default_value = upper.find("DEFAULT").map(|i| {
        item[i + "DEFAULT".len()..]
            .trim()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_matches('\'')
            .to_string()
    });

    if upper.contains("PRIMARY KEY") {
        entity.primary_key = Some(name.clone());
    }
    entity.fields.push(EntityField {
        name,
        field_type: column_type.trim_end_matches(',').to_uppercase(),
        nullable,
        default_value,
    });
}

/// Statements split on `;`, with `--` line comments stripped.
fn split_statements(text: &str) -> Vec<String> {
    let without_comments: String = text
        .lines()
        .map(|line| line.split("--").next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");
    without_comments
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Body of the first balanced paren group, exclusive of the parens.
fn matching_paren_body(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let start = text.find('(')?;
    for (i, c) in text[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start + 1..start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split the table body on commas outside parentheses.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&body[start..]);
    items
}

fn first_paren_ident(item: &str) -> Option<String> {
    let open = item.find('(')?;
    let close = item[open..].find(')')? + open;
    item[open + 1..close]
        .split(',')
        .next()
        .map(|s| normalize_ident(s.trim()))
}

/// `REFERENCES other_table (id)` → `other_table`.
fn references_table(item: &str) -> Option<String> {
    let upper = item.to_uppercase();
    let idx = upper.find("REFERENCES")?;
    let rest = item[idx + "REFERENCES".len()..].trim_start();
    let end = rest
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(rest.len());
    let table = normalize_ident(&rest[..end]);
    (!table.is_empty()).then_some(table)
}

fn normalize_ident(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']')
        .to_string()
}

/// Tier 2: bare table names only.
fn fallback_tables(component_id: &str, text: &str) -> Findings {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?[`"\[]?(\w+)"#)
            .expect("static regex")
    });

    let mut findings = Findings::new();
    for capture in re.captures_iter(text) {
        findings
            .entities
            .push(DataEntity::new(component_id, &capture[1], "table"));
    }
    findings
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file() -> DiscoveredFile {
        DiscoveredFile {
            path: PathBuf::from("/p/001_init.sql"),
            relative: "migrations/001_init.sql".to_string(),
            size_bytes: 1,
        }
    }

    const DDL: &str = r#"
-- users and orders
CREATE TABLE users (
    id BIGINT PRIMARY KEY,
    email VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT now()
);

CREATE TABLE orders (
    id BIGINT NOT NULL,
    user_id BIGINT REFERENCES users (id),
    total NUMERIC(10, 2),
    PRIMARY KEY (id),
    FOREIGN KEY (user_id) REFERENCES users (id)
);
"#;

    #[test]
    fn tables_columns_and_keys() {
        let findings = parse_ddl("c", &file(), DDL).unwrap();
        assert_eq!(findings.entities.len(), 2);

        let users = &findings.entities[0];
        assert_eq!(users.name, "users");
        assert_eq!(users.primary_key.as_deref(), Some("id"));
        assert_eq!(users.fields.len(), 3);
        let email = &users.fields[1];
        assert!(!email.nullable);
        let created = &users.fields[2];
        assert_eq!(created.default_value.as_deref(), Some("now()"));

        let orders = &findings.entities[1];
        assert_eq!(orders.primary_key.as_deref(), Some("id"));
        // NUMERIC(10, 2) must not split into two columns.
        assert_eq!(orders.fields.len(), 3);
    }

    #[test]
    fn foreign_keys_become_edges() {
        let findings = parse_ddl("c", &file(), DDL).unwrap();
        assert!(!findings.relationships.is_empty());
        for rel in &findings.relationships {
            assert_eq!(rel.target_id, id_for("users"));
            assert_eq!(rel.description, "Many-to-One");
        }
    }

    #[test]
    fn files_without_ddl_are_unsupported() {
        let result = parse_ddl("c", &file(), "SELECT 1;");
        assert!(matches!(result, Err(ParseError::Unsupported { .. })));
    }

    #[test]
    fn fallback_recovers_table_names() {
        let findings = fallback_tables("c", "CREATE TABLE IF NOT EXISTS payments (broken");
        assert_eq!(findings.entities.len(), 1);
        assert_eq!(findings.entities[0].name, "payments");
    }
}
