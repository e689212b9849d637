use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "sentinel-cli")]
#[command(about = "Remote CLI for a running endpoint-sentinel", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token, when the server requires one
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Liveness check
    Health,
    /// Trigger a full reconciliation pass
    Reconcile {
        /// Print the full pass report
        #[arg(long)]
        report: bool,
    },
    /// Trigger reconciliation of one endpoint
    Check { handle: String },
    /// List persisted endpoint state
    Endpoints,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let base = cli.url.trim_end_matches('/');
    let res = match cli.command {
        Commands::Health => client.get(format!("{}/healthz", base)).send().await?,
        Commands::Reconcile { report } => {
            client
                .post(format!("{}/reconcile", base))
                .query(&[("report", report)])
                .headers(headers)
                .send()
                .await?
        }
        Commands::Check { handle } => {
            client
                .post(format!("{}/reconcile/{}", base, handle))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Endpoints => {
            client
                .get(format!("{}/endpoints", base))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        eprintln!("Error: sentinel returned status {}", status);
        std::process::exit(1);
    }
    Ok(())
}
