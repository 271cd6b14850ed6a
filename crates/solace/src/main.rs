// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Solace - AI support chat with escalation to human psychologists.
//!
//! This is the binary entry point for the Solace service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::str::FromStr;

use clap::{Parser, Subcommand};
use solace_auth::HmacTokenAuth;
use solace_config::model::SolaceConfig;
use solace_core::{Role, SolaceError};

/// Solace - AI support chat with escalation to human psychologists.
#[derive(Parser, Debug)]
#[command(name = "solace", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Bearer token utilities.
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommands {
    /// Sign a bearer token with the configured `auth.token_secret`.
    Issue {
        /// Subject user id carried in the token.
        #[arg(long)]
        user: String,
        /// One of `user`, `psychologist`, `admin`.
        #[arg(long, default_value = "user", value_parser = parse_role)]
        role: Role,
        /// Override `auth.token_ttl_hours` for this token.
        #[arg(long)]
        ttl_hours: Option<u64>,
    },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::from_str(raw).map_err(|_| format!("unknown role `{raw}`"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match solace_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            solace_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Token {
            action: TokenCommands::Issue {
                user,
                role,
                ttl_hours,
            },
        }) => issue_token(&config, &user, role, ttl_hours).map(|token| println!("{token}")),
        None => {
            println!("solace: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn issue_token(
    config: &SolaceConfig,
    user: &str,
    role: Role,
    ttl_hours: Option<u64>,
) -> Result<String, SolaceError> {
    let mut auth_config = config.auth.clone();
    if let Some(hours) = ttl_hours {
        auth_config.token_ttl_hours = hours;
    }
    HmacTokenAuth::from_config(&auth_config)?.issue(user, role)
}
