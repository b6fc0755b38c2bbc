//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use tether_domain::{Header, HttpMethod, RequestSpec};
use tether_infrastructure::{Session, SettingsError};

/// Sends one authenticated request through a Tether session.
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Access token to start the session with
    #[arg(short, long, env = "TETHER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// HTTP method
    pub method: HttpMethod,

    /// Path (or absolute URL) resolved against the configured base URL
    pub path: String,

    /// JSON request body
    #[arg(short, long, value_parser = parse_json)]
    pub body: Option<String>,

    /// Extra header, as `Name: value`
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<Header>,
}

impl Cli {
    /// Builds the request described by the arguments.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` if the path cannot be resolved.
    pub fn request(&self, session: &Session) -> Result<RequestSpec, SettingsError> {
        let mut request = session.request(self.method, &self.path)?;
        if let Some(body) = &self.body {
            request = request.with_json_body(body.clone());
        }
        for header in &self.headers {
            request.headers.set(header.clone());
        }
        Ok(request)
    }
}

fn parse_header(value: &str) -> Result<Header, String> {
    Header::parse(value).map_err(|e| e.to_string())
}

fn parse_json(value: &str) -> Result<String, String> {
    serde_json::from_str::<serde_json::Value>(value)
        .map(|_| value.to_string())
        .map_err(|e| format!("invalid JSON: {e}"))
}
