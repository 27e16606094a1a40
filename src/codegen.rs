//! Rust source for a struct bound to a usage text.
use std::collections::HashSet;
use std::fmt::Write;

use crate::Schema;
use crate::pattern::{ElementKind, is_rust_keyword, rust_ident};

/// Render a `#[derive(Cli)]` struct declaration named `name` for `schema`.
///
/// Flags and command words become `bool`, options and positionals `Option<String>`, and variadic
/// positionals `Vec<String>`. A `help: bool` field is added when the usage does not name one.
/// Fields whose identifiers would clash (`-n` and `-N`) get a numeric suffix and `#[cli(name)]`.
pub fn render_struct(schema: &Schema, name: &str) -> String {
    let mut out = String::new();
    out.push_str("#[derive(Debug, genopts::Cli)]\n");
    // `{:?}` escapes newlines of multi-line usages.
    let _ = writeln!(out, "#[cli(usage = {:?})]", schema.template().to_string());
    let _ = writeln!(out, "pub struct {name} {{");

    let mut used: HashSet<String> = HashSet::new();
    for elem in schema.elements() {
        let base = rust_ident(&elem.field);
        let mut ident = base.clone();
        let mut n = 2;
        while used.contains(&ident) {
            ident = format!("{base}_{n}");
            n += 1;
        }
        let ty = match elem.kind {
            ElementKind::Flag | ElementKind::Word => "bool",
            ElementKind::Positional { variadic: true } => "Vec<String>",
            ElementKind::Value { .. } | ElementKind::Positional { variadic: false } => {
                "Option<String>"
            }
        };
        let raw = if is_rust_keyword(&ident) { "r#" } else { "" };
        let _ = writeln!(out, "    /// `{elem}`");
        if ident == elem.field {
            let _ = writeln!(out, "    pub {raw}{ident}: {ty},");
        } else {
            let _ = writeln!(out, "    #[cli(name = {:?})]", elem.field);
            let _ = writeln!(out, "    pub {raw}{ident}: {ty},");
        }
        used.insert(ident);
    }
    if !used.contains("help") {
        out.push_str("    pub help: bool,\n");
    }
    out.push_str("}\n");
    out
}
