use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use astra::Server;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::AppState;
use crate::backend::{Backend, ChangeHub, SqliteBackend, SupabaseBackend};
use crate::cli::{Cli, Commands};
use crate::config::{AppConfig, BackendConfig};
use crate::db::{init_db, Database};
use crate::domain::lead::LeadRecord;
use crate::refresher::Refresher;
use crate::responses::error_to_response;
use crate::router::handle;

mod app;
mod auth;
mod backend;
mod cli;
mod config;
mod controller;
mod db;
mod domain;
mod errors;
mod refresher;
mod responses;
mod router;
mod templates;

#[cfg(test)]
mod tests;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config),
        Commands::CreateUser {
            email,
            password,
            role,
        } => {
            let backend = local_backend(&config, ChangeHub::new())?;
            let id = backend.create_user(&email, &password, role.as_deref())?;
            info!(user_id = id, %email, "user ready");
            Ok(())
        }
        Commands::ImportLeads { file } => {
            let backend = local_backend(&config, ChangeHub::new())?;
            let raw = std::fs::read_to_string(&file)?;
            let records: Vec<LeadRecord> = serde_json::from_str(&raw)?;
            let count = backend.import_leads(&records)?;
            info!(count, file = %file.display(), "leads imported");
            Ok(())
        }
    }
}

/// Account and import commands only make sense against the local store.
fn local_backend(config: &AppConfig, changes: ChangeHub) -> Result<SqliteBackend, Box<dyn Error>> {
    match &config.backend {
        BackendConfig::Sqlite { path } => {
            let db = Database::new(path);
            init_db(&db)?;
            Ok(SqliteBackend::new(db, changes))
        }
        BackendConfig::Supabase { .. } => {
            Err("this command needs the SQLite backend; unset SUPABASE_URL".into())
        }
    }
}

fn serve(config: AppConfig) -> Result<(), Box<dyn Error>> {
    let changes = ChangeHub::new();
    let backend: Arc<dyn Backend> = match &config.backend {
        BackendConfig::Supabase { url, anon_key } => {
            info!(%url, "using hosted backend");
            Arc::new(SupabaseBackend::new(url, anon_key)?)
        }
        BackendConfig::Sqlite { path } => {
            info!(path = %path.display(), "using local SQLite backend");
            Arc::new(local_backend(&config, changes.clone())?)
        }
    };

    let state = Arc::new(AppState::new(backend, changes.clone(), &config));
    let refresher = Refresher::spawn(state.clone(), &changes, config.refresh_interval)?;

    info!(addr = %config.addr, workers = config.max_workers, "starting server");
    let server = Server::bind(&config.addr).max_workers(config.max_workers);
    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    refresher.shutdown();
    result?;
    info!("server shut down cleanly");
    Ok(())
}
