//! `fieldbook value` command - read and write values on entity instances

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{open_store, resolve_field, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::fields::ValueEntry;
use crate::validate;

#[derive(Subcommand, Debug)]
pub enum ValueCommands {
    /// Validate and store one value
    Set(SetArgs),

    /// List an instance's stored values (lenient read)
    Get(GetArgs),

    /// Remove every stored value for an instance
    Clear(ClearArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Entity kind of the instance
    #[arg(long, short = 'k')]
    pub kind: String,

    /// Instance id assigned by the business layer
    #[arg(long, short = 'i')]
    pub id: String,

    /// Field id (FLD-...) or field name
    #[arg(long)]
    pub field: String,

    /// The raw value; empty clears the stored value
    pub value: String,
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Entity kind of the instance
    #[arg(long, short = 'k')]
    pub kind: String,

    /// Instance id assigned by the business layer
    #[arg(long, short = 'i')]
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Entity kind of the instance
    #[arg(long, short = 'k')]
    pub kind: String,

    /// Instance id assigned by the business layer
    #[arg(long, short = 'i')]
    pub id: String,
}

/// Run a value subcommand
pub fn run(cmd: ValueCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ValueCommands::Set(args) => run_set(args, global),
        ValueCommands::Get(args) => run_get(args, global),
        ValueCommands::Clear(args) => run_clear(args, global),
    }
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let field_id = resolve_field(&store, &args.field, Some(&args.kind))?;

    let typed = store.set_value(&args.kind, &args.id, field_id, &args.value)?;

    if !global.quiet {
        if typed.is_none() {
            println!("{} Cleared value", style("✓").green());
        } else {
            println!("{} Stored {}", style("✓").green(), typed);
        }
    }
    Ok(())
}

fn run_get(args: GetArgs, global: &GlobalOpts) -> Result<()> {
    let (config, store) = open_store(global)?;
    let entries = store.get_values(&args.kind, &args.id)?;

    match global.format.resolve(config.default_format.as_deref()) {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = entries
                .iter()
                .map(|e| {
                    (
                        e.definition.field_name.clone(),
                        json!({
                            "raw": e.raw_value,
                            "value": e.value,
                            "stale": is_stale(e),
                        }),
                    )
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&map).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for e in &entries {
                println!("{}\t{}", e.definition.field_name, e.raw_value);
            }
        }
        _ => {
            if entries.is_empty() {
                if !global.quiet {
                    println!("No values stored for {} {}", args.kind, args.id);
                }
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(["FIELD", "VALUE", "TYPE", ""]);
            for e in &entries {
                builder.push_record([
                    e.definition.field_name.clone(),
                    truncate_str(&e.value.to_string(), 40),
                    e.definition.field_type.to_string(),
                    if is_stale(e) { "stale" } else { "" }.to_string(),
                ]);
            }
            println!("{}", builder.build().with(Style::sharp()));
        }
    }
    Ok(())
}

/// A stored value is stale when it would no longer pass validation
/// under the current definition
fn is_stale(entry: &ValueEntry) -> bool {
    validate::validate(&entry.definition, &entry.raw_value).is_err()
}

fn run_clear(args: ClearArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let removed = store.delete_values_for_instance(&args.kind, &args.id)?;

    if !global.quiet {
        println!("{} Removed {} value(s)", style("✓").green(), removed);
    }
    Ok(())
}
