//! `fieldbook schema` command - export and import whole-kind schemas

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::Confirm;
use miette::{miette, IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;
use crate::transfer::{self, ImportMode, TransferError};

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Write an entity kind's field definitions to a JSON document
    Export(ExportArgs),

    /// Install field definitions from a JSON document
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Entity kind to export
    #[arg(long, short = 'k')]
    pub kind: String,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Schema document to import
    pub file: PathBuf,

    /// Conflict policy
    #[arg(long, short = 'm', default_value = "merge")]
    pub mode: ModeArg,

    /// Skip the replace confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    /// Keep existing fields, add new ones
    Merge,
    /// Drop the kind's existing schema first (destructive)
    Replace,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Merge => ImportMode::Merge,
            ModeArg::Replace => ImportMode::Replace,
        }
    }
}

/// Run a schema subcommand
pub fn run(cmd: SchemaCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SchemaCommands::Export(args) => run_export(args, global),
        SchemaCommands::Import(args) => run_import(args, global),
    }
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;
    let doc = transfer::export(&store, &args.kind)?;

    match args.output {
        Some(path) => {
            transfer::write_document(&path, &doc)?;
            if !global.quiet {
                println!(
                    "{} Exported {} field(s) to {}",
                    style("✓").green(),
                    doc.fields.len(),
                    path.display()
                );
            }
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&doc).into_diagnostic()?);
        }
    }
    Ok(())
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;

    let doc = match transfer::read_document(&args.file) {
        Ok(doc) => doc,
        Err(TransferError::Malformed(issues)) => {
            for issue in &issues {
                eprintln!("  {} {}", style("✗").red(), issue);
            }
            return Err(TransferError::Malformed(issues).into());
        }
        Err(e) => return Err(e.into()),
    };

    let mode = ImportMode::from(args.mode);
    if mode == ImportMode::Replace && !args.yes {
        let existing = store.list_fields(&doc.entity_type)?.len();
        let prompt = format!(
            "Replace the schema for {}? {} existing field(s) and their stored values will be deleted.",
            doc.entity_type, existing
        );
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| miette!("{}", e))?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let report = match transfer::import(&mut store, &doc, mode) {
        Ok(report) => report,
        Err(TransferError::Malformed(issues)) => {
            for issue in &issues {
                eprintln!("  {} {}", style("✗").red(), issue);
            }
            return Err(TransferError::Malformed(issues).into());
        }
        Err(e) => return Err(e.into()),
    };

    if !global.quiet {
        println!(
            "{} Imported {} field(s) into {}",
            style("✓").green(),
            report.imported.len(),
            doc.entity_type
        );
        for name in &report.imported {
            println!("  {} {}", style("+").green(), name);
        }
        for name in &report.skipped {
            println!(
                "  {} {} (already defined, skipped)",
                style("=").yellow(),
                name
            );
        }
    }
    Ok(())
}
