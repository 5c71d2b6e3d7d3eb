//! `archmap init` — write a commented configuration stub.

use std::path::Path;

use anyhow::{bail, Context, Result};

const CONFIG_FILE: &str = "archmap.yaml";

const STUB: &str = r#"# archmap configuration
project:
  name: my-project
  version: "0.1.0"

repositories:
  - name: main
    path: .

scanners:
  # AUTO: all analyzers run, applicability decides.
  # GROUPS: only analyzers matching `groups` language tags.
  # EXPLICIT: only analyzers listed under `enabled`.
  mode: AUTO
  # groups: [java, python]
  # enabled: [maven-deps, spring-rest]
  # config:
  #   maven-deps:
  #     resolve_properties: true

generators:
  default: markdown
  enabled: [markdown, mermaid]

output:
  directory: docs/architecture
  generateIndex: true
"#;

pub fn run(force: bool) -> Result<()> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() && !force {
        bail!("{CONFIG_FILE} already exists (use --force to overwrite)");
    }
    std::fs::write(path, STUB).with_context(|| format!("writing {CONFIG_FILE}"))?;
    println!("Wrote {CONFIG_FILE}");
    Ok(())
}
