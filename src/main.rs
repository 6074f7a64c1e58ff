mod client;
mod error;
mod model;
mod parser;
mod settings;
mod submit;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use client::FormsClient;
use error::FormError;

#[derive(Parser)]
#[command(name = "openform", about = "Read and submit Google Forms as JSON")]
struct Cli {
    /// Override OPENFORM_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a form and print its structure
    Get {
        /// Form id or full form URL
        form: String,
    },
    /// Decode a saved viewform page
    Parse {
        html_file: PathBuf,
    },
    /// Submit answers read from a JSON object of entry id -> value(s)
    Submit {
        /// Form id or full form URL
        form: String,
        /// Path to the answers file, or "-" for stdin
        #[arg(short, long)]
        answers: String,
        /// Print the encoded fields without sending them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = settings::Settings::load()?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }

    let outcome = match cli.command {
        Commands::Get { form } => {
            let form_id = resolve_form_id(&form)?;
            let client = FormsClient::new(&settings)?;
            client
                .get_form(&form_id)
                .await
                .map(|doc| serde_json::to_string_pretty(&doc))
        }
        Commands::Parse { html_file } => {
            let html = std::fs::read_to_string(&html_file)
                .with_context(|| format!("Failed to read {}", html_file.display()))?;
            parser::parse_form(&html).map(|doc| serde_json::to_string_pretty(&doc))
        }
        Commands::Submit {
            form,
            answers,
            dry_run,
        } => {
            let form_id = resolve_form_id(&form)?;
            let answers: submit::Answers = serde_json::from_str(&read_input(&answers)?)
                .context("Answers must be a JSON object of strings or string arrays")?;
            match submit::encode(&answers) {
                Ok(payload) if dry_run => Ok(serde_json::to_string_pretty(&payload.fields())),
                Ok(payload) => {
                    let client = FormsClient::new(&settings)?;
                    client
                        .submit(&form_id, &payload)
                        .await
                        .map(|receipt| serde_json::to_string_pretty(&receipt))
                }
                Err(e) => Err(e),
            }
        }
    };

    match outcome {
        Ok(json) => {
            println!("{}", json?);
            Ok(())
        }
        Err(e) => report_and_exit(e),
    }
}

fn resolve_form_id(input: &str) -> Result<String> {
    client::form_id_from_input(input)
        .with_context(|| format!("Cannot find a form id in '{}'", input))
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read answers from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
    }
}

/// Print the tagged error body and exit with a non-zero status.
fn report_and_exit(e: FormError) -> ! {
    let body = serde_json::to_string_pretty(&e.report())
        .unwrap_or_else(|_| format!("{{\"error\":true,\"message\":{:?}}}", e.to_string()));
    println!("{}", body);
    tracing::debug!(status = e.http_status(), kind = e.kind(), "request failed");
    std::process::exit(1);
}
