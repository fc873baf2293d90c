use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Client for a running prompt gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[arg(short, long, default_value = "demo-key-123")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Submit a prompt through the admission pipeline
    Query {
        #[arg(short, long)]
        prompt: String,

        #[arg(short, long)]
        max_new_tokens: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{base}/health")).send().await?;
            print_response(res).await?;
        }
        Commands::Query {
            prompt,
            max_new_tokens,
        } => {
            let mut headers = HeaderMap::new();
            headers.insert("x-api-key", HeaderValue::from_str(&cli.key)?);

            let mut body = json!({ "prompt": prompt });
            if let Some(n) = max_new_tokens {
                body["max_new_tokens"] = json!(n);
            }

            let res = client
                .post(format!("{base}/query"))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{rendered}");
    } else {
        eprintln!("Error: gateway returned status {status}");
        eprintln!("{rendered}");
        std::process::exit(1);
    }
    Ok(())
}
