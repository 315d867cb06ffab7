//! CLI argument parsing using clap derive

use std::path::PathBuf;

use cfgmap_core::TreeFormat;
use cfgmap_entities::EntityKind;
use clap::{Parser, Subcommand, ValueEnum};

/// cfgmap - Convert configuration entities between trees and wire JSON
#[derive(Parser, Debug)]
#[command(name = "cfgmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Client configuration file
    #[arg(long, global = true, env = "CFGMAP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

fn parse_kind(value: &str) -> Result<EntityKind, cfgmap_core::UnknownVariant> {
    value.parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

impl From<Format> for TreeFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Toml => TreeFormat::Toml,
            Format::Json => TreeFormat::Json,
            Format::Yaml => TreeFormat::Yaml,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List entity kinds
    Kinds,

    /// Print the tree schema of an entity kind
    Schema {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,
    },

    /// Decode a tree document and print its wire JSON
    ///
    /// Examples:
    ///   cfgmap decode alerting_profile profile.toml
    ///   cfgmap decode alerting_profile profile.toml --prior applied.toml
    Decode {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,

        /// Tree document (.toml, .json, .yaml)
        tree: PathBuf,

        /// Previously applied tree; identifiers are kept from it
        #[arg(long)]
        prior: Option<PathBuf>,
    },

    /// Decode wire JSON and print it as a tree document
    Encode {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,

        /// Wire JSON file, or - for stdin
        wire: PathBuf,

        /// Output format (defaults to the output extension, then TOML)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create or update an entity from a tree document
    Push {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,

        /// Tree document
        tree: PathBuf,

        /// Update this identifier instead of the one in the tree
        #[arg(long)]
        id: Option<String>,
    },

    /// Fetch an entity and print it as a tree document
    Pull {
        #[arg(value_parser = parse_kind)]
        kind: EntityKind,

        id: String,

        #[arg(short, long, value_enum)]
        format: Option<Format>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
