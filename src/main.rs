//! matrix-client - Command-line front end for the `matrix_client` library.
//!
//! This binary talks to a Matrix homeserver through the client-server API:
//! it lists supported versions and login flows, logs in with a password and
//! queries or invalidates the resulting session.
//!
//! # Configuration
//!
//! Create a `config.yaml` file (see [`config`] for every option):
//!
//! ```yaml
//! homeserver:
//!   host: "matrix.org"
//!
//! account:
//!   user_id: "@alice:matrix.org"
//!   password: "your-password"
//! ```
//!
//! Values can be overridden with `MATRIX_CLIENT_` environment variables:
//!
//! ```bash
//! export MATRIX_CLIENT_ACCOUNT__PASSWORD="your-password"
//! ```
//!
//! # Usage
//!
//! ```bash
//! matrix-client --config config.yaml info
//! matrix-client --config config.yaml login
//! matrix-client --config config.yaml joined-rooms --access-token syt_...
//! matrix-client --config config.yaml logout --access-token syt_...
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use matrix_client::{
    api::LoginPasswordRequest, client::MatrixClient, identifiers::Identifier,
};

use crate::config::Config;

mod config;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the API versions and unstable features of the homeserver
    Versions,
    /// List the login flows of the homeserver
    Flows,
    /// Query versions and login flows concurrently
    Info,
    /// Log in with the configured account and print the session
    Login,
    /// List the rooms joined by the owner of an access token
    JoinedRooms {
        /// Access token returned by `login`
        #[arg(long)]
        access_token: String,
    },
    /// Show the owner of an access token
    Whoami {
        /// Access token returned by `login`
        #[arg(long)]
        access_token: String,
    },
    /// Invalidate an access token
    Logout {
        /// Access token returned by `login`
        #[arg(long)]
        access_token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    info!(
        "Starting matrix-client {} against {}",
        env!("CARGO_PKG_VERSION"),
        config.homeserver.host
    );

    let client = MatrixClient::new(&config.homeserver).context("invalid homeserver")?;

    match args.command {
        Command::Versions => {
            let versions = client.versions().await?;
            print_versions(&versions);
        }
        Command::Flows => {
            for flow in client.login_flows().await? {
                println!("{}", flow);
            }
        }
        Command::Info => {
            let (versions, flows) = futures::join!(client.versions(), client.login_flows());
            print_versions(&versions?);
            for flow in flows? {
                println!("{}", flow);
            }
        }
        Command::Login => {
            let Some(account) = config.account else {
                bail!("the login command needs an `account` section in the configuration");
            };

            let mut request = LoginPasswordRequest::new(
                Identifier::user(account.user_id),
                &account.password,
                &account.device_name,
            );
            if let Some(device_id) = &account.device_id {
                request = request.with_device_id(device_id);
            }

            let session = client.login(&request).await?;
            println!("user_id: {}", session.user_id);
            println!("device_id: {}", session.device_id);
            println!("access_token: {}", session.access_token);
        }
        Command::JoinedRooms { access_token } => {
            for room in client.joined_rooms(&access_token).await? {
                println!("{}", room);
            }
        }
        Command::Whoami { access_token } => {
            let whoami = client.whoami(&access_token).await?;
            match whoami.device_id {
                Some(device_id) => println!("{} ({})", whoami.user_id, device_id),
                None => println!("{}", whoami.user_id),
            }
        }
        Command::Logout { access_token } => {
            client.logout(&access_token).await?;
            info!("Logged out");
        }
    }

    Ok(())
}

fn print_versions(versions: &matrix_client::api::VersionsResponse) {
    let mut supported: Vec<&str> = versions.versions.iter().map(|v| v.as_str()).collect();
    supported.sort_unstable();
    println!("versions: {}", supported.join(", "));

    let mut features: Vec<_> = versions
        .unstable_features
        .iter()
        .filter(|(_, enabled)| **enabled)
        .map(|(name, _)| name.as_str())
        .collect();
    features.sort_unstable();
    if !features.is_empty() {
        println!("unstable features: {}", features.join(", "));
    }
}
