//! `fieldbook choice` command - choice list management

use clap::Subcommand;
use console::style;
use miette::{miette, Result};

use crate::cli::helpers::{open_store, resolve_field};
use crate::cli::GlobalOpts;
use crate::core::identity::ChoiceId;

#[derive(Subcommand, Debug)]
pub enum ChoiceCommands {
    /// Add a choice to a field's list
    Add(AddArgs),

    /// Remove a single choice (stored values are left in place)
    Remove(RemoveArgs),

    /// Rewrite a field's choice ordering
    Reorder(ReorderArgs),

    /// List a field's choices in order
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Field id (FLD-...) or field name with --kind
    pub field: String,

    /// Entity kind, for looking the field up by name
    #[arg(long, short = 'k')]
    pub kind: Option<String>,

    /// Text shown to operators
    #[arg(long, short = 't')]
    pub text: String,

    /// Persisted token (default: the display text)
    #[arg(long, short = 'v')]
    pub value: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Choice id (CHC-...)
    pub choice_id: String,
}

#[derive(clap::Args, Debug)]
pub struct ReorderArgs {
    /// Field id (FLD-...) or field name with --kind
    pub field: String,

    /// Entity kind, for looking the field up by name
    #[arg(long, short = 'k')]
    pub kind: Option<String>,

    /// Every choice id of the field, in the new order
    #[arg(required = true)]
    pub choice_ids: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Field id (FLD-...) or field name with --kind
    pub field: String,

    /// Entity kind, for looking the field up by name
    #[arg(long, short = 'k')]
    pub kind: Option<String>,
}

/// Run a choice subcommand
pub fn run(cmd: ChoiceCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ChoiceCommands::Add(args) => run_add(args, global),
        ChoiceCommands::Remove(args) => run_remove(args, global),
        ChoiceCommands::Reorder(args) => run_reorder(args, global),
        ChoiceCommands::List(args) => run_list(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let field_id = resolve_field(&store, &args.field, args.kind.as_deref())?;

    let choice_id = store.add_choice(field_id, &args.text, args.value)?;

    if global.quiet {
        println!("{}", choice_id);
    } else {
        println!("{} Added choice {}", style("✓").green(), choice_id);
    }
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let choice_id = ChoiceId::parse(&args.choice_id).map_err(|e| miette!("{}", e))?;

    store.remove_choice(choice_id)?;

    if !global.quiet {
        println!("{} Removed choice {}", style("✓").green(), choice_id);
    }
    Ok(())
}

fn run_reorder(args: ReorderArgs, global: &GlobalOpts) -> Result<()> {
    let (_, mut store) = open_store(global)?;
    let field_id = resolve_field(&store, &args.field, args.kind.as_deref())?;

    let ordered = args
        .choice_ids
        .iter()
        .map(|s| ChoiceId::parse(s).map_err(|e| miette!("{}", e)))
        .collect::<Result<Vec<_>>>()?;

    store.reorder_choices(field_id, &ordered)?;

    if !global.quiet {
        println!(
            "{} Reordered {} choice(s)",
            style("✓").green(),
            ordered.len()
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;
    let field_id = resolve_field(&store, &args.field, args.kind.as_deref())?;

    for choice in store.choices(field_id)? {
        println!("{}\t{}\t{}", choice.id, choice.value, choice.display_text);
    }
    Ok(())
}
