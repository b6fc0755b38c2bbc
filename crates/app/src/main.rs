//! Tether - Main Entry Point
//!
//! Loads settings, opens a session and sends one request through the
//! session dispatcher. Logs go to stderr; the response goes to stdout.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use tether_application::CallError;
use tether_domain::AccessToken;
use tether_infrastructure::{connect, load_settings};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

/// Exit code when the session ended and the user must sign in again.
const EXIT_SESSION_ENDED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let session = connect(settings)?;

    if let Some(token) = &cli.token {
        session.dispatcher().sign_in(AccessToken::new(token.as_str())?);
    } else {
        tracing::warn!("no access token given; sending unauthenticated");
    }

    let request = cli.request(&session)?;
    match session.dispatcher().send(request).await {
        Ok(response) => {
            println!("{}", response.status);
            println!("{}", response.body);
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(CallError::SessionEnded { reason }) => {
            let target = session
                .last_navigation()
                .map_or_else(|| session.settings().login_path.clone(), |n| n.target);
            eprintln!("session ended ({reason}); sign in again at {target}");
            Ok(ExitCode::from(EXIT_SESSION_ENDED))
        }
        Err(error) => Err(error.into()),
    }
}
