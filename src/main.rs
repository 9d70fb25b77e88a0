mod cli;
mod config;
mod relay;
mod speech;
mod web;

use std::path::{Path, PathBuf};

use actix_files as fs;
use actix_web::{web::Data, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::{error, info};
use tera::Tera;

use cli::{Cli, Command};
use config::{RelayConfig, ServerConfig, SpeechConfig};
use relay::ChatRelay;
use speech::SpeechOptions;
use web::routes;

// App state structure
struct AppState {
    tera: Tera,
    relay: ChatRelay,
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Transcribe {
            audio,
            width,
            language,
        } => transcribe(&audio, width, language.as_deref()).await,
        Command::Speak {
            text,
            file,
            voice,
            speed,
            output,
        } => speak(text, file, SpeechOptions { voice, speed }, &output).await,
    }
}

async fn serve() -> Result<()> {
    info!("Starting chat relay");

    let relay_config = RelayConfig::from_env().context("chat relay configuration")?;
    let server_config = ServerConfig::from_env().context("server configuration")?;

    // Initialize template engine
    let mut tera = Tera::new(&format!("{}/**/*", server_config.template_dir)).map_err(|e| {
        error!("Template parsing error: {}", e);
        anyhow::anyhow!("failed to load templates from {}", server_config.template_dir)
    })?;
    tera.autoescape_on(vec![".html"]);

    let app_state = Data::new(AppState {
        tera,
        relay: ChatRelay::new(relay_config),
    });

    let static_dir = server_config.static_dir.clone();
    info!(
        "Listening on {}:{}",
        server_config.bind_address, server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", &static_dir))
    })
    .bind((server_config.bind_address.as_str(), server_config.port))?
    .run()
    .await?;

    Ok(())
}

async fn transcribe(audio: &Path, width: usize, language: Option<&str>) -> Result<()> {
    let config = SpeechConfig::from_env().context("speech configuration")?;
    let transcript = speech::transcribe_wrapped(&config, audio, language, width)
        .await
        .with_context(|| format!("failed to transcribe {}", audio.display()))?;

    println!("{}", transcript);
    Ok(())
}

async fn speak(
    text: Option<String>,
    file: Option<PathBuf>,
    options: SpeechOptions,
    output: &Path,
) -> Result<()> {
    let config = SpeechConfig::from_env().context("speech configuration")?;
    let text = speech::resolve_text(text, file.as_deref(), tokio::io::stdin())
        .await
        .context("failed to read text to speak")?;

    speech::speak_to_file(&config, &text, &options, output)
        .await
        .context("speech synthesis failed")?;
    Ok(())
}
