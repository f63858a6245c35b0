use clap::Parser;
use codebeast_server::cli::Cli;
use codebeast_server::config::AppConfig;
use codebeast_server::error::Result;
use codebeast_server::imaging::ProviderKind;
use codebeast_server::server::{serve, AppState};
use colored::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("codebeast_server=debug,tower_http=info"))
        )
        .init();

    // Missing required variables make clap exit here
    let cli = Cli::parse();
    let config = AppConfig::try_from(cli)?;

    println!("{}", "CodeBeast Generator API".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());
    println!("🔗 Langflow: {}", config.langflow.base_url);
    println!("📁 Images: {}", config.temp_dir().display());

    let state = AppState::from_config(config)?;
    let providers: Vec<String> = state
        .generators
        .available()
        .iter()
        .map(|kind| kind.to_string())
        .collect();
    println!("🎨 Image providers: {}", providers.join(", "));
    if !state.generators.available().contains(&ProviderKind::Stability) {
        println!("{}", "STABILITY_API_KEY not set, only dall_e is available".yellow());
    }
    println!("\nPress Ctrl+C to stop the server\n");

    serve(state).await?;

    println!("✅ Server stopped");
    Ok(())
}
