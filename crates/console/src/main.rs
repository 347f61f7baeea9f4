//! Comanda console: an interactive terminal client for the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! comanda-console --base-url http://localhost:3000/api/v1
//! ```
//!
//! JSON input can be typed at the prompt or read from a file with
//! `@path/to/file.json`. Log in first to use the order endpoints.

mod client;
mod menus;
mod prompt;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use client::ApiClient;
use prompt::Prompt;

#[derive(Parser)]
#[command(name = "comanda-console")]
#[command(author, version, about = "Interactive client for the Comanda API")]
struct Cli {
    /// API root URL
    #[arg(long, env = "COMANDA_API_URL", default_value = "http://localhost:3000/api/v1")]
    base_url: String,
}

const MAIN_MENU: &[&str] = &["Entities", "Files", "Aggregations", "Log in", "Log out", "Exit"];

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comanda_console=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Console failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut client = ApiClient::new(&cli.base_url);
    let mut prompt = Prompt::new();
    println!("Comanda console, talking to {}", client.base_url());

    loop {
        let title = if client.is_authenticated() {
            "Main menu (logged in)"
        } else {
            "Main menu"
        };
        let Some(choice) = prompt.choose(title, MAIN_MENU).await? else {
            if prompt.is_closed() {
                break;
            }
            continue;
        };

        let outcome = match MAIN_MENU[choice] {
            "Entities" => menus::entities(&client, &mut prompt).await,
            "Files" => menus::files(&client, &mut prompt).await,
            "Aggregations" => menus::aggregations(&client, &mut prompt).await,
            "Log in" => menus::login(&mut client, &mut prompt).await,
            "Log out" => {
                client.logout();
                println!("Logged out.");
                Ok(())
            }
            _ => break,
        };
        if let Err(e) = outcome {
            println!("Error: {e:#}");
        }
        if prompt.is_closed() {
            break;
        }
    }

    println!("Bye.");
    Ok(())
}
