//! Entry commands.

use super::{open_journal, sync_config, CommandResult};
use crate::GlobalArgs;
use daylog_entry::EntryId;
use tracing::info;

/// Prints every entry id, newest first.
pub fn list(global: &GlobalArgs) -> CommandResult {
    let journal = open_journal(global, sync_config(global))?;
    for id in journal.list() {
        println!("{id}");
    }
    Ok(())
}

/// Prints the content of an entry.
pub fn view(global: &GlobalArgs, id: &str) -> CommandResult {
    let id = EntryId::parse(id)?;
    let journal = open_journal(global, sync_config(global))?;
    println!("{}", journal.view(&id)?);
    Ok(())
}

/// Creates today's entry and prints its id.
pub fn create(global: &GlobalArgs, content: Option<String>) -> CommandResult {
    let journal = open_journal(global, sync_config(global))?;
    let id = journal.create()?;
    if let Some(content) = content {
        journal.edit(&id, content)?;
    }
    info!(%id, "created entry");
    println!("{id}");
    Ok(())
}

/// Replaces the content of an entry.
pub fn edit(global: &GlobalArgs, id: &str, content: String) -> CommandResult {
    let id = EntryId::parse(id)?;
    let journal = open_journal(global, sync_config(global))?;
    journal.edit(&id, content)?;
    info!(%id, "updated entry");
    Ok(())
}

/// Deletes an entry.
pub fn delete(global: &GlobalArgs, id: &str) -> CommandResult {
    let id = EntryId::parse(id)?;
    let journal = open_journal(global, sync_config(global))?;
    journal.delete(&id)?;
    info!(%id, "deleted entry");
    Ok(())
}
