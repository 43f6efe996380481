// src/main.rs — Charla entry point

use clap::Parser;

use charla::cli::Cli;
use charla::core::controller::ChatController;
use charla::infra::config::Config;
use charla::infra::logger;
use charla::provider::resolver;

#[tokio::main]
async fn main() {
    // Respects RUST_LOG / CHARLA_LOG via the env filter.
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    let model = cli.model.unwrap_or_else(|| config.model.name.clone());

    // The only ambient credential read. Whatever wins here is injected into
    // the resolver; nothing below main touches the environment.
    let api_key = std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .ok()
        .or_else(|| config.api_key.clone());

    let resolution = resolver::resolve_credential(api_key.as_deref(), &model);

    let persona = cli.persona.unwrap_or_else(|| config.chat.persona.clone());
    let mut controller = ChatController::new(resolution, &persona);

    charla::cli::chat::run_chat(&mut controller, cli.knowledge.as_deref()).await
}
