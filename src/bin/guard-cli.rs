use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Url};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "guard-cli")]
#[command(about = "Management CLI for the reliability guard", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "GUARD_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status and active store tier
    Status,
    /// Error budget, quality score and SLO alerts
    Diagnostics,
    /// Show lockout state for an identifier
    Lockout { identifier: String },
    /// Clear failures and any lockout for an identifier
    Unlock { identifier: String },
    /// Start a new error budget window
    ResetBudget,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let (method, segments) = match &cli.command {
        Commands::Status => (Method::GET, vec!["admin", "status"]),
        Commands::Diagnostics => (Method::GET, vec!["admin", "diagnostics"]),
        Commands::Lockout { identifier } => {
            (Method::GET, vec!["admin", "lockouts", identifier.as_str()])
        }
        Commands::Unlock { identifier } => {
            (Method::DELETE, vec!["admin", "lockouts", identifier.as_str()])
        }
        Commands::ResetBudget => (Method::POST, vec!["admin", "error-budget", "reset"]),
    };

    let res = client
        .request(method, endpoint(&cli.url, &segments)?)
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

/// Append `segments` to `base`, percent-encoding each one, so an identifier
/// containing `/`, `?` or `#` stays a single path segment.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("'{}' cannot be used as a base URL", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
