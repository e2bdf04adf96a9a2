//! `berth provider add|list|use|delete|rename`

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use berth_core::{
    provider, rename_provider, ProviderName, RegistryError, RenameReport, WorkspaceStore,
};

use super::Session;
use crate::GlobalArgs;

/// Manage providers in the active context.
#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// Register a new provider.
    Add(AddArgs),

    /// List providers, marking the context default.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Make a provider the default for new workspaces.
    Use {
        name: String,
    },

    /// Remove a provider that no workspace is bound to.
    Delete {
        name: String,

        /// Succeed if the provider does not exist.
        #[arg(long)]
        ignore_not_found: bool,
    },

    /// Rename a provider, rebinding every workspace that uses it.
    Rename {
        /// Current provider name.
        old_name: String,

        /// New provider name.
        new_name: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Provider name: lowercase letters, digits and '-'.
    pub name: String,

    /// Where the provider was installed from.
    #[arg(long)]
    pub source: Option<String>,

    /// Provider option, repeatable.
    #[arg(long = "option", short = 'o', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub options: Vec<(String, String)>,

    /// Also make this provider the context default.
    #[arg(long = "use")]
    pub use_it: bool,
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

pub fn run(cmd: ProviderCommand, global: &GlobalArgs) -> Result<()> {
    let mut session = Session::open(global)?;
    match cmd {
        ProviderCommand::Add(args) => add(&mut session, args),
        ProviderCommand::List { json } => list(&session, json),
        ProviderCommand::Use { name } => use_provider(&mut session, name),
        ProviderCommand::Delete {
            name,
            ignore_not_found,
        } => delete(&mut session, name, ignore_not_found),
        ProviderCommand::Rename { old_name, new_name } => rename(&mut session, old_name, new_name),
    }
}

fn add(session: &mut Session, args: AddArgs) -> Result<()> {
    let options: BTreeMap<String, String> = args.options.into_iter().collect();
    let record = provider::add_provider_at(
        session.store.home(),
        &session.context,
        ProviderName::from(args.name.clone()),
        args.source,
        options,
    )
    .with_context(|| format!("failed to add provider '{}'", args.name))?;

    println!(
        "✓ Added provider '{}' to context '{}'",
        record.name, session.context
    );

    if args.use_it {
        session
            .config
            .set_default_provider(&session.context, Some(record.name.clone()));
        session.save_config()?;
        println!("✓ Default provider is now '{}'", record.name);
    }
    Ok(())
}

#[derive(Serialize)]
struct ProviderJson {
    name: String,
    source: Option<String>,
    default: bool,
    options: BTreeMap<String, String>,
}

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "options")]
    options: usize,
}

fn list(session: &Session, json: bool) -> Result<()> {
    let providers = provider::list_providers_at(session.store.home(), &session.context)
        .context("failed to read provider registry")?;
    let default = session.config.default_provider(&session.context);

    if json {
        let payload: Vec<ProviderJson> = providers
            .into_iter()
            .map(|p| ProviderJson {
                default: default == Some(&p.name),
                name: p.name.0,
                source: p.source,
                options: p.options,
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize provider JSON")?
        );
        return Ok(());
    }

    if providers.is_empty() {
        println!("No providers in context '{}'.", session.context);
        println!("Run: berth provider add <name>");
        return Ok(());
    }

    let rows: Vec<ProviderRow> = providers
        .into_iter()
        .map(|p| ProviderRow {
            marker: if default == Some(&p.name) {
                "*".green().bold().to_string()
            } else {
                String::new()
            },
            name: p.name.0,
            source: p.source.unwrap_or_else(|| "-".to_string()),
            options: p.options.len(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", format!("Context: {}", session.context).bold());
    println!("{table}");
    Ok(())
}

fn use_provider(session: &mut Session, name: String) -> Result<()> {
    let name = ProviderName::from(name);
    if !provider::provider_exists_at(session.store.home(), &session.context, &name)? {
        return Err(RegistryError::ProviderNotFound {
            context: session.context.clone(),
            name,
        }
        .into());
    }

    session
        .config
        .set_default_provider(&session.context, Some(name.clone()));
    session.save_config()?;
    println!(
        "✓ Default provider for context '{}' is now '{}'",
        session.context, name
    );
    Ok(())
}

fn delete(session: &mut Session, name: String, ignore_not_found: bool) -> Result<()> {
    provider::validate_provider_name(&name)?;
    let name = ProviderName::from(name);
    let bound: Vec<_> = session
        .store
        .list_workspaces(&session.context)
        .context("failed to read workspace registry")?
        .into_iter()
        .filter(|w| w.is_bound_to(&name))
        .map(|w| w.id)
        .collect();
    if !bound.is_empty() {
        return Err(RegistryError::ProviderInUse {
            name,
            workspaces: bound,
        }
        .into());
    }

    provider::delete_provider_at(session.store.home(), &session.context, &name, ignore_not_found)
        .with_context(|| format!("failed to delete provider '{name}'"))?;

    if session.config.default_provider(&session.context) == Some(&name) {
        session.config.set_default_provider(&session.context, None);
        session.save_config()?;
        tracing::info!(provider = %name, "cleared default provider");
    }

    println!("✓ Deleted provider '{name}'");
    Ok(())
}

fn rename(session: &mut Session, old_name: String, new_name: String) -> Result<()> {
    let old = ProviderName::from(old_name);
    let new = ProviderName::from(new_name);

    let report = rename_provider(
        &session.store,
        &mut session.config,
        &session.context,
        &old,
        &new,
    )
    .with_context(|| format!("failed to rename provider '{old}' to '{new}'"))?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RenameReport) {
    println!("✓ Renamed provider '{}' to '{}'", report.old, report.new);
    if report.rebound.is_empty() {
        println!("  no workspaces were bound to '{}'", report.old);
    } else {
        let ids: Vec<&str> = report.rebound.iter().map(|id| id.0.as_str()).collect();
        println!(
            "  rebound {} workspace(s): {}",
            report.rebound.len(),
            ids.join(", ")
        );
    }
    if report.default_updated {
        println!("  default provider updated to '{}'", report.new);
    }
}
