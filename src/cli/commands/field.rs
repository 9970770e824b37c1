//! `fieldbook field` command - field definition management

use clap::Subcommand;
use console::style;
use dialoguer::Confirm;
use miette::{miette, IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{open_store, resolve_field, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::fields::{FieldDefinition, FieldSpec, FieldType};

#[derive(Subcommand, Debug)]
pub enum FieldCommands {
    /// Define a new field on an entity kind
    Define(DefineArgs),

    /// Replace the mutable attributes of an existing field
    Update(UpdateArgs),

    /// List an entity kind's fields
    List(ListArgs),

    /// Show one field with its choices
    Show(ShowArgs),

    /// Delete a field, its choices, and every stored value
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct SpecArgs {
    /// Machine name, unique within the entity kind
    #[arg(long, short = 'n')]
    pub name: String,

    /// Label shown to operators (default: the machine name)
    #[arg(long, short = 'l')]
    pub label: Option<String>,

    /// Field type
    #[arg(long = "type", short = 't', value_parser = parse_field_type)]
    pub field_type: FieldType,

    /// Require a value on save
    #[arg(long)]
    pub required: bool,

    /// Mark the field read-only for rendering UIs
    #[arg(long)]
    pub read_only: bool,

    /// Suggested initial value
    #[arg(long)]
    pub default: Option<String>,

    /// Input placeholder text
    #[arg(long)]
    pub placeholder: Option<String>,

    /// Operator-facing help text
    #[arg(long)]
    pub description: Option<String>,

    /// UI group name
    #[arg(long)]
    pub group: Option<String>,

    /// Position among the kind's fields (default: appended)
    #[arg(long)]
    pub order: Option<i64>,

    /// Create the field soft-disabled
    #[arg(long)]
    pub inactive: bool,

    /// Full-match validation pattern (text fields)
    #[arg(long)]
    pub regex: Option<String>,

    /// Inclusive lower bound (numeric fields)
    #[arg(long)]
    pub min_value: Option<f64>,

    /// Inclusive upper bound (numeric fields)
    #[arg(long)]
    pub max_value: Option<f64>,

    /// Inclusive minimum length (text fields)
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Inclusive maximum length (text fields)
    #[arg(long)]
    pub max_length: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct DefineArgs {
    /// Entity kind the field attaches to
    #[arg(long, short = 'k')]
    pub kind: String,

    #[command(flatten)]
    pub spec: SpecArgs,

    /// Choice to add, as TEXT or TEXT=VALUE (repeatable)
    #[arg(long = "choice", short = 'c')]
    pub choices: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Field id (FLD-...) or field name with --kind
    pub field: String,

    /// Entity kind, for looking the field up by name
    #[arg(long, short = 'k')]
    pub kind: Option<String>,

    #[command(flatten)]
    pub spec: SpecArgs,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Entity kind
    #[arg(long, short = 'k')]
    pub kind: String,

    /// Include soft-disabled fields
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Field id (FLD-...) or field name with --kind
    pub field: String,

    /// Entity kind, for looking the field up by name
    #[arg(long, short = 'k')]
    pub kind: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Field id (FLD-...) or field name with --kind
    pub field: String,

    /// Entity kind, for looking the field up by name
    #[arg(long, short = 'k')]
    pub kind: Option<String>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

fn parse_field_type(s: &str) -> Result<FieldType, String> {
    s.parse()
}

/// Run a field subcommand
pub fn run(cmd: FieldCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FieldCommands::Define(args) => run_define(args, global),
        FieldCommands::Update(args) => run_update(args, global),
        FieldCommands::List(args) => run_list(args, global),
        FieldCommands::Show(args) => run_show(args, global),
        FieldCommands::Delete(args) => run_delete(args, global),
    }
}

fn build_spec(args: SpecArgs) -> FieldSpec {
    FieldSpec {
        display_label: args.label.unwrap_or_else(|| args.name.clone()),
        field_name: args.name,
        field_type: args.field_type,
        required: args.required,
        read_only: args.read_only,
        default_value: args.default,
        placeholder: args.placeholder,
        description: args.description,
        group_name: args.group,
        display_order: args.order,
        active: !args.inactive,
        validation_regex: args.regex,
        min_value: args.min_value,
        max_value: args.max_value,
        min_length: args.min_length,
        max_length: args.max_length,
    }
}

fn run_define(args: DefineArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;

    let field_id = store.define_field(&args.kind, build_spec(args.spec))?;

    for raw in &args.choices {
        let (text, value) = match raw.split_once('=') {
            Some((text, value)) => (text, Some(value.to_string())),
            None => (raw.as_str(), None),
        };
        store.add_choice(field_id, text, value)?;
    }

    if global.quiet {
        println!("{}", field_id);
    } else {
        println!("{} Defined field {}", style("✓").green(), field_id);
    }
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let field_id = resolve_field(&store, &args.field, args.kind.as_deref())?;

    store.update_field(field_id, build_spec(args.spec))?;

    if !global.quiet {
        println!("{} Updated field {}", style("✓").green(), field_id);
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (config, store) = open_store(global)?;

    let mut fields = store.list_fields(&args.kind)?;
    if !args.all {
        fields.retain(|f| f.active);
    }

    match global.format.resolve(config.default_format.as_deref()) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&fields).into_diagnostic()?
            );
        }
        OutputFormat::Tsv => {
            for f in &fields {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    f.id,
                    f.field_name,
                    f.field_type,
                    if f.required { "required" } else { "optional" },
                    if f.active { "active" } else { "inactive" }
                );
            }
        }
        _ => {
            if fields.is_empty() {
                if !global.quiet {
                    println!("No fields defined for {}", args.kind);
                }
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(["ID", "NAME", "TYPE", "REQ", "GROUP", "CHOICES", "ACTIVE"]);
            for f in &fields {
                builder.push_record([
                    f.id.to_string(),
                    f.field_name.clone(),
                    f.field_type.to_string(),
                    if f.required { "yes" } else { "" }.to_string(),
                    truncate_str(f.group_name.as_deref().unwrap_or(""), 16),
                    choice_summary(f),
                    if f.active { "yes" } else { "no" }.to_string(),
                ]);
            }
            println!("{}", builder.build().with(Style::sharp()));
            if !global.quiet {
                println!("{} field(s)", fields.len());
            }
        }
    }
    Ok(())
}

fn choice_summary(field: &FieldDefinition) -> String {
    if !field.field_type.has_choices() {
        return String::new();
    }
    let values: Vec<&str> = field.choices.iter().map(|c| c.value.as_str()).collect();
    truncate_str(&values.join(", "), 24)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;
    let field_id = resolve_field(&store, &args.field, args.kind.as_deref())?;

    let definition = store.field(field_id)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&definition).into_diagnostic()?
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let field_id = resolve_field(&store, &args.field, args.kind.as_deref())?;

    let definition = store.field(field_id)?;
    let value_count = store.count_values(field_id)?;

    if !args.yes {
        let prompt = format!(
            "Delete field '{}' on {}? This removes {} stored value(s) and cannot be undone.",
            definition.field_name, definition.entity_kind, value_count
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

    store.delete_field(field_id)?;

    if !global.quiet {
        println!(
            "{} Deleted field '{}' and {} stored value(s)",
            style("✓").green(),
            definition.field_name,
            value_count
        );
    }
    Ok(())
}
