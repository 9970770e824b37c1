//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    choice::ChoiceCommands, completions::CompletionsArgs, field::FieldCommands, init::InitArgs,
    kinds::KindsArgs, schema::SchemaCommands, value::ValueCommands,
};

#[derive(Parser)]
#[command(name = "fieldbook")]
#[command(author, version, about = "Fieldbook custom field engine")]
#[command(
    long_about = "Define extra typed attributes on field service records (customers, sites, \
assets, jobs, estimates, invoices), validate and store values against them, and move whole \
attribute sets between installations as portable JSON documents."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Project root (default: auto-detect by finding .fieldbook/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new Fieldbook project
    Init(InitArgs),

    /// Field definition management
    #[command(subcommand)]
    Field(FieldCommands),

    /// Choice list management for enumerated fields
    #[command(subcommand)]
    Choice(ChoiceCommands),

    /// Read and write custom field values on entity instances
    #[command(subcommand)]
    Value(ValueCommands),

    /// Export and import whole entity-kind schemas
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// List the registered entity kinds
    Kinds(KindsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for terminals, falling back to the configured default
    #[default]
    Auto,
    /// Aligned table
    Table,
    /// JSON (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
}

impl OutputFormat {
    /// Resolve Auto against the configured default
    pub fn resolve(self, configured: Option<&str>) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        match configured {
            Some("json") => OutputFormat::Json,
            Some("tsv") => OutputFormat::Tsv,
            _ => OutputFormat::Table,
        }
    }
}
