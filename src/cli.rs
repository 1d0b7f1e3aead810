use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "leads-dashboard")]
#[command(about = "Lead management dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web dashboard (default)
    Serve,

    /// Create an operator account in the local SQLite store
    CreateUser {
        email: String,

        /// Password; read from the environment when not given
        #[arg(long, env = "DASHBOARD_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Role to grant, e.g. "admin"
        #[arg(long)]
        role: Option<String>,
    },

    /// Load leads from a JSON array into the local SQLite store
    ImportLeads {
        /// JSON file holding lead rows as the hosted table returns them
        file: PathBuf,
    },
}
