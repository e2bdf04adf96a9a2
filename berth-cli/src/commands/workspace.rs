//! `berth workspace add|list|rebind|delete`

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use berth_core::{rebind, workspace, ProviderName, RegistryError, WorkspaceId, WorkspaceStore};

use super::Session;
use crate::GlobalArgs;

/// Manage workspaces in the active context.
#[derive(Subcommand, Debug)]
pub enum WorkspaceCommand {
    /// Register a workspace bound to a provider.
    Add(AddArgs),

    /// List workspaces and the provider each is bound to.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Point a workspace at a different provider.
    Rebind {
        /// Workspace name or path; converted to a workspace id.
        workspace_name: String,

        /// Provider to bind the workspace to.
        new_provider_name: String,
    },

    /// Remove a workspace record.
    Delete {
        name: String,

        /// Succeed if the workspace does not exist.
        #[arg(long)]
        ignore_not_found: bool,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Workspace name or path; converted to a workspace id.
    pub name: String,

    /// Provider to bind to. Defaults to the context's default provider.
    #[arg(long, short = 'p')]
    pub provider: Option<String>,

    /// Where the workspace content comes from (path, git URL, image).
    #[arg(long)]
    pub source: Option<String>,
}

pub fn run(cmd: WorkspaceCommand, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        WorkspaceCommand::Add(args) => add(&session, args),
        WorkspaceCommand::List { json } => list(&session, json),
        WorkspaceCommand::Rebind {
            workspace_name,
            new_provider_name,
        } => rebind_workspace(&session, &workspace_name, new_provider_name),
        WorkspaceCommand::Delete {
            name,
            ignore_not_found,
        } => delete(&session, &name, ignore_not_found),
    }
}

fn workspace_id(name: &str) -> Result<WorkspaceId> {
    WorkspaceId::from_name(name)
        .ok_or_else(|| RegistryError::InvalidWorkspaceName(name.to_string()).into())
}

fn add(session: &Session, args: AddArgs) -> Result<()> {
    let id = workspace_id(&args.name)?;
    let provider = match args.provider {
        Some(p) => ProviderName::from(p),
        None => session
            .config
            .default_provider(&session.context)
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "no provider given and context '{}' has no default provider. \
                     Pass --provider <name> or run `berth provider use <name>`.",
                    session.context
                )
            })?,
    };

    let record = workspace::create_workspace_at(
        session.store.home(),
        &session.context,
        id.clone(),
        provider,
        args.source,
    )
    .with_context(|| format!("failed to add workspace '{id}'"))?;

    println!(
        "✓ Added workspace '{}' bound to provider '{}'",
        record.id, record.provider.name
    );
    Ok(())
}

#[derive(Serialize)]
struct WorkspaceJson {
    id: String,
    provider: String,
    source: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(Tabled)]
struct WorkspaceRow {
    #[tabled(rename = "workspace")]
    id: String,
    #[tabled(rename = "provider")]
    provider: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "updated")]
    updated: String,
}

fn list(session: &Session, json: bool) -> Result<()> {
    let workspaces = session
        .store
        .list_workspaces(&session.context)
        .context("failed to read workspace registry")?;

    if json {
        let payload: Vec<WorkspaceJson> = workspaces
            .into_iter()
            .map(|w| WorkspaceJson {
                id: w.id.0,
                provider: w.provider.name.0,
                source: w.source,
                created_at: w.created_at.to_rfc3339(),
                updated_at: w.updated_at.to_rfc3339(),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize workspace JSON")?
        );
        return Ok(());
    }

    if workspaces.is_empty() {
        println!("No workspaces in context '{}'.", session.context);
        return Ok(());
    }

    let rows: Vec<WorkspaceRow> = workspaces
        .into_iter()
        .map(|w| WorkspaceRow {
            id: w.id.0,
            provider: w.provider.name.0,
            source: w.source.unwrap_or_else(|| "-".to_string()),
            updated: w
                .updated_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn rebind_workspace(session: &Session, workspace_name: &str, provider: String) -> Result<()> {
    let id = workspace_id(workspace_name)?;
    let provider = ProviderName::from(provider);

    let outcome = rebind(&session.store, &session.context, &id, &provider)
        .with_context(|| format!("failed to rebind workspace '{id}' to provider '{provider}'"))?;

    println!(
        "✓ Workspace '{}' rebound from '{}' to '{}'",
        outcome.workspace, outcome.previous, outcome.current
    );
    Ok(())
}

fn delete(session: &Session, name: &str, ignore_not_found: bool) -> Result<()> {
    let id = workspace_id(name)?;
    workspace::delete_workspace_at(session.store.home(), &session.context, &id, ignore_not_found)
        .with_context(|| format!("failed to delete workspace '{id}'"))?;
    println!("✓ Deleted workspace '{id}'");
    Ok(())
}
