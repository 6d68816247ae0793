mod cli;
mod client;
mod config;
mod dto;
mod error;
mod fireworks;
mod pipeline;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use config::ClientConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => server::run_server(host, port).await,
        Commands::CorrectText { text, server_url } => {
            client::run_client(ClientConfig::new_text_mode(server_url, text)).await
        }
        Commands::CorrectFile {
            audio_file,
            server_url,
        } => client::run_client(ClientConfig::new_file_mode(server_url, audio_file)).await,
    }
}
