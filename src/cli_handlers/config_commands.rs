use crate::cli::ConfigCommands;
use crate::cli_handlers::utils::print_json;
use crate::error::Result;
use crate::settings::{config_get, config_list, config_set, config_unset, ensure_writable};
use crate::workspace::WorkspaceContext;
use serde_json::json;

/// Handle all `sprint config` subcommands
pub async fn handle_config_command(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value, format } => handle_set(&key, &value, &format).await,
        ConfigCommands::Get { key, format } => handle_get(&key, &format).await,
        ConfigCommands::List { prefix, format } => handle_list(prefix.as_deref(), &format).await,
        ConfigCommands::Unset { key, format } => handle_unset(&key, &format).await,
    }
}

async fn handle_set(key: &str, value: &str, format: &str) -> Result<()> {
    ensure_writable(key)?;

    let ctx = WorkspaceContext::load_or_init().await?;
    config_set(&ctx.pool, key, value).await?;
    tracing::debug!(key, "Setting stored");

    if format == "json" {
        print_json(&json!({ "key": key, "value": value, "set": true }))
    } else {
        println!("Set {} = {}", key, value);
        Ok(())
    }
}

async fn handle_get(key: &str, format: &str) -> Result<()> {
    let ctx = WorkspaceContext::load_or_init().await?;
    let value = config_get(&ctx.pool, key).await?;

    if format == "json" {
        return print_json(&json!({ "key": key, "value": value }));
    }
    match value {
        Some(v) => println!("{} = {}", key, v),
        None => println!("{}: (not set)", key),
    }
    Ok(())
}

async fn handle_list(prefix: Option<&str>, format: &str) -> Result<()> {
    let ctx = WorkspaceContext::load_or_init().await?;
    let entries = config_list(&ctx.pool, prefix).await?;

    if format == "json" {
        return print_json(&json!({ "config": entries }));
    }
    if entries.is_empty() {
        println!("No configuration entries found.");
    }
    for entry in &entries {
        println!("{} = {}", entry.key, entry.value);
    }
    Ok(())
}

async fn handle_unset(key: &str, format: &str) -> Result<()> {
    ensure_writable(key)?;

    let ctx = WorkspaceContext::load_or_init().await?;
    let deleted = config_unset(&ctx.pool, key).await?;

    if format == "json" {
        print_json(&json!({ "key": key, "deleted": deleted }))
    } else {
        if deleted {
            println!("Unset {}", key);
        } else {
            println!("{}: (not found)", key);
        }
        Ok(())
    }
}
