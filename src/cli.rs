use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tutor-relay",
    about = "Tutor Relay - English correction over HTTP",
    long_about = "Relays text or speech to a hosted language model that corrects it and explains the mistakes. Runs the relay server or talks to one as a client.",
    after_help = "EXAMPLES:\n    # Start the relay server\n    tutor-relay serve\n\n    # Correct a sentence\n    tutor-relay text \"I has a dog\"\n\n    # Transcribe a voice note and correct it\n    tutor-relay file voice.ogg\n\n    # Use a different server when in client mode\n    tutor-relay text \"He like it\" --server-url http://my-server:8080"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(name = "serve")]
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8080")]
        port: u16,
    },
    #[command(name = "text")]
    CorrectText {
        #[arg(value_parser = validate_text)]
        text: String,

        #[arg(long, default_value = "http://localhost:8080")]
        server_url: String,
    },
    #[command(name = "file")]
    CorrectFile {
        audio_file: String,

        #[arg(long, default_value = "http://localhost:8080")]
        server_url: String,
    },
}

pub fn validate_text(s: &str) -> Result<String, String> {
    if s.is_empty() {
        Err("Text must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}
