//! `fieldbook init` command - create a new project

use console::style;
use miette::{miette, Result};
use std::path::PathBuf;

use crate::core::project::Project;
use crate::core::Config;
use crate::store::FieldStore;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    pub path: Option<PathBuf>,

    /// Reinitialize even if a project already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&path).map_err(|e| miette!("cannot create {:?}: {}", path, e))?;

    let project = if args.force {
        Project::init_force(&path).map_err(|e| miette!("{}", e))?
    } else {
        Project::init(&path).map_err(|e| miette!("{}", e))?
    };

    // Create the store up front so the first schema command finds it
    let config = Config::load(&project);
    let store = FieldStore::open(&project, &config)?;
    let kinds = store.entity_kinds()?;

    println!(
        "{} Initialized Fieldbook project in {}",
        style("✓").green(),
        project.fieldbook_dir().display()
    );
    println!("  Entity kinds: {}", kinds.join(", "));

    Ok(())
}
