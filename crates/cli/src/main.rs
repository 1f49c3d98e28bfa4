// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ozwald: CLI companion for the provisioner control plane.
//!
//! Exit codes: 0 success, 1 configuration/auth error, 2 runtime error.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod display;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use client::{ApiClient, ClientError};

#[derive(Parser)]
#[command(name = "ozwald", about = "Control a per-host service provisioner", version)]
pub struct Cli {
    /// Provisioner API port
    #[arg(long, global = true, default_value_t = 8000)]
    pub port: u16,

    /// Bearer key; defaults to $OZWALD_SYSTEM_KEY
    #[arg(long, global = true)]
    pub key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List services configured on the provisioner
    Configured,
    /// List active service instances
    Active,
    /// Update the set of active dynamic services
    Update {
        /// Comma-separated instance specs: NAME[service][variety-or-profile][profile]
        #[arg(long, conflicts_with = "clear")]
        services: Option<String>,
        /// Deactivate everything
        #[arg(long)]
        clear: bool,
    },
    /// Show available host resources
    Resources,
    /// Footprint measurement jobs
    #[command(subcommand)]
    Footprint(FootprintCommand),
    /// Show cached runner logs for a service
    Logs {
        service: String,
        #[arg(long, default_value = "default")]
        realm: String,
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        variety: Option<String>,
        /// Keep only the first N lines
        #[arg(long)]
        top: Option<usize>,
        /// Keep only the last N lines
        #[arg(long)]
        last: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum FootprintCommand {
    /// List pending footprint requests
    List,
    /// Queue a footprint request
    Request {
        /// Footprint every configured service variant
        #[arg(long, conflicts_with = "services")]
        all: bool,
        /// Comma-separated instance specs to footprint
        #[arg(long)]
        services: Option<String>,
    },
}

/// Failures mapped onto the CLI exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Missing key, bad spec, unreadable catalog, auth rejection → exit 1
    Config(String),
    /// Everything else → exit 2
    Runtime(String),
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Auth(_) => CliError::Config(err.to_string()),
            _ => CliError::Runtime(err.to_string()),
        }
    }
}

fn system_key(cli_key: Option<String>) -> Result<String, CliError> {
    cli_key
        .or_else(|| std::env::var("OZWALD_SYSTEM_KEY").ok())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            CliError::Config(
                "no system key: pass --key or set OZWALD_SYSTEM_KEY".to_string(),
            )
        })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let key = match system_key(cli.key.clone()) {
        Ok(key) => key,
        Err(CliError::Config(msg)) | Err(CliError::Runtime(msg)) => {
            eprintln!("error: {msg}");
            return ExitCode::from(1);
        }
    };
    let client = ApiClient::new(cli.port, key);

    let result = match cli.command {
        Command::Configured => commands::configured(&client).await,
        Command::Active => commands::active(&client).await,
        Command::Update { services, clear } => {
            commands::update(&client, services.as_deref(), clear).await
        }
        Command::Resources => commands::resources(&client).await,
        Command::Footprint(FootprintCommand::List) => commands::footprint_list(&client).await,
        Command::Footprint(FootprintCommand::Request { all, services }) => {
            commands::footprint_request(&client, all, services.as_deref()).await
        }
        Command::Logs { service, realm, profile, variety, top, last } => {
            commands::logs(&client, &service, &realm, profile, variety, top, last).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Config(msg)) => {
            eprintln!("error: {msg}");
            ExitCode::from(1)
        }
        Err(CliError::Runtime(msg)) => {
            eprintln!("error: {msg}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
