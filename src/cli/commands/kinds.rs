//! `fieldbook kinds` command - list the entity kind registry

use miette::Result;

use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct KindsArgs {}

pub fn run(_args: KindsArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store(global)?;
    for kind in store.entity_kinds()? {
        println!("{}", kind);
    }
    Ok(())
}
