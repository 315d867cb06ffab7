//! Offline commands: kinds, schema, decode and encode

use std::io::Read;
use std::path::Path;

use cfgmap_core::{TreeFormat, load_tree};
use cfgmap_entities::EntityKind;
use colored::Colorize;
use serde_json::Value;

use crate::error::Result;

pub fn run_kinds() -> Result<()> {
    println!("{}", "Entity kinds".bold());
    println!();
    for kind in EntityKind::ALL {
        let identity = if kind.has_identity() { "" } else { " (singleton)" };
        println!(
            "  {:<24} {}{}",
            kind.as_str().green(),
            kind.description(),
            identity.dimmed()
        );
    }
    Ok(())
}

pub fn run_schema(kind: EntityKind) -> Result<()> {
    println!("{} {}", kind.as_str().green().bold(), kind.description());
    println!();
    print!("{}", kind.schema().describe());
    Ok(())
}

/// Tree document to wire JSON on stdout.
pub fn run_decode(kind: EntityKind, tree: &Path, prior: Option<&Path>) -> Result<()> {
    let proposed = load_tree(tree)?;
    let prior = prior.map(load_tree).transpose()?;
    let document = kind.tree_to_wire(&proposed, prior.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&document).map_err(cfgmap_core::Error::from)?);
    Ok(())
}

/// Wire JSON to a tree document.
pub fn run_encode(
    kind: EntityKind,
    wire: &Path,
    format: Option<TreeFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let document = read_wire(wire)?;
    let tree = kind.wire_to_tree(document)?;
    write_tree(&tree, format, output)
}

fn read_wire(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(path)?
    };
    serde_json::from_str(&text)
        .map_err(|e| cfgmap_core::Error::Malformed(e.to_string()).into())
}

/// Render `tree` to `output`, or to stdout when no output is given.
pub(crate) fn write_tree(
    tree: &Value,
    format: Option<TreeFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let format = format
        .or_else(|| output.map(TreeFormat::from_path))
        .unwrap_or(TreeFormat::Toml);
    let text = format.render(tree)?;
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            eprintln!("{} {}", "Wrote".green(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
