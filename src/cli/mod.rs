//! CLI interface for artspace

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "artspace")]
#[command(version)]
#[command(about = "Art marketplace backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default artspace.toml with a fresh signing secret
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the config file
        #[arg(short, long, env = "ARTSPACE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Validate the configuration and print it with secrets redacted
    CheckConfig {
        /// Path to the config file
        #[arg(short, long, env = "ARTSPACE_CONFIG")]
        config: Option<PathBuf>,
    },
}
