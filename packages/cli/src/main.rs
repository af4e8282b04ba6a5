//! `sdash` — command-line front-end for the sensor network dashboard.
//!
//! - **`login`** — exchange credentials for a session and persist it.
//! - **`logout`** — forget the persisted session.
//! - **`status`** — print the authentication state.
//! - **`networks`** — list the networks of the logged-in user as cards.
//! - **`watch`** — keep the session and networks fresh and print changes.
//!
//! The session lives in a SQLite file (`--session-db`), so a login survives
//! between invocations.

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sensordash::render::render_networks;
use sensordash::AuthenticationState;
use sensordash_client::{ClientConfig, Dashboard};

/// sdash — sensor network dashboard CLI
#[derive(Parser)]
#[command(name = "sdash", version, about, long_about = None)]
struct Cli {
    /// Base URL of the remote API [default: http://127.0.0.1:8000].
    #[arg(long, env = "SENSORDASH_SERVER_URL", global = true)]
    server: Option<String>,

    /// SQLite file holding the session [default: sensordash-session.db].
    #[arg(long, env = "SENSORDASH_SESSION_DB", global = true)]
    session_db: Option<String>,

    /// Milliseconds between background session lookups (`watch`).
    #[arg(long, env = "SENSORDASH_REFRESH_INTERVAL_MS", value_name = "MS", global = true)]
    refresh_interval_ms: Option<u64>,

    /// Transport timeout for every request.
    #[arg(long, env = "SENSORDASH_HTTP_TIMEOUT_SECS", value_name = "SECS", global = true)]
    http_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session.
    Login {
        #[arg(short = 'u', long, value_name = "USER")]
        username: String,

        /// Read from SENSORDASH_PASSWORD when not given.
        #[arg(short = 'p', long, env = "SENSORDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Clear the persisted session. Safe to repeat.
    Logout,

    /// Print `loggedIn` or `loggedOut`.
    Status {
        /// Print the state and user as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List networks of the logged-in user.
    ///
    /// A failed request logs the session out; log in again afterwards.
    Networks {
        /// Print the networks as a JSON array instead of cards.
        #[arg(long)]
        json: bool,
    },

    /// Keep the session and networks fresh in the background and print the
    /// networks whenever they change. Stops on Ctrl-C.
    Watch,
}

/// Session file used when neither `--session-db` nor the environment names one.
const DEFAULT_SESSION_DB: &str = "sensordash-session.db";

/// Layer command-line arguments over `base` (usually [`ClientConfig::from_env`]).
fn build_config(cli: &Cli, base: ClientConfig) -> ClientConfig {
    ClientConfig {
        server_url: cli.server.clone().unwrap_or(base.server_url),
        session_db: cli
            .session_db
            .clone()
            .or(base.session_db)
            .or_else(|| Some(DEFAULT_SESSION_DB.to_string())),
        refresh_interval: cli
            .refresh_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(base.refresh_interval),
        http_timeout: cli
            .http_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(base.http_timeout),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensordash=info,sensordash_client=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli, ClientConfig::from_env());
    let dashboard = Dashboard::from_config(&config)
        .unwrap_or_else(|e| fatal(&format!("failed to start: {e}")));

    match cli.command {
        Command::Login { username, password } => {
            match dashboard.session.login(&username, &password).await {
                Ok(session) => println!("logged in as {}", session.user_identifier),
                Err(e) => {
                    eprintln!("error: login failed: {e}");
                    process::exit(1);
                }
            }
        }

        Command::Logout => {
            if let Err(e) = dashboard.session.logout().await {
                fatal(&format!("logout failed: {e}"));
            }
            println!("logged out");
        }

        Command::Status { json } => {
            let state = dashboard.session.refresh().await;
            if json {
                let user = dashboard
                    .session
                    .current()
                    .session()
                    .map(|s| s.user_identifier.clone());
                let out = serde_json::json!({ "authenticationState": state, "userIdentifier": user });
                println!("{out}");
            } else {
                println!("{state}");
            }
        }

        Command::Networks { json } => {
            if dashboard.session.refresh().await != AuthenticationState::LoggedIn {
                eprintln!("error: not logged in");
                process::exit(1);
            }
            let networks = match dashboard.networks().await {
                Ok(Some(networks)) => networks,
                Ok(None) => {
                    eprintln!("error: could not fetch networks; the session was cleared");
                    process::exit(1);
                }
                Err(e) => fatal(&e.to_string()),
            };
            if json {
                match serde_json::to_string_pretty(&networks) {
                    Ok(out) => println!("{out}"),
                    Err(e) => fatal(&format!("failed to encode networks: {e}")),
                }
            } else {
                print!("{}", render_networks(&networks));
            }
        }

        Command::Watch => watch(&dashboard).await,
    }
}

async fn watch(dashboard: &Dashboard) {
    let tasks = dashboard.spawn_background();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    let mut last_state = None;
    let mut last_networks = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {}
        }

        if tasks.networks_revalidation.is_finished() {
            tasks.abort();
            fatal("networks response did not match its schema");
        }

        let state = dashboard.session.authentication_state();
        if last_state != Some(state) {
            println!("session: {state}");
            last_state = Some(state);
        }

        let networks = dashboard.networks.data();
        if networks != last_networks {
            if let Some(n) = &networks {
                print!("{}", render_networks(n));
            }
            last_networks = networks;
        }
    }

    tasks.abort();
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("sdash: {}", msg);
    process::exit(2);
}
