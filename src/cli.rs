use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::speech::synthesize::{DEFAULT_SPEED, DEFAULT_VOICE};

#[derive(Debug, Parser)]
#[command(name = "chat-relay", version, about = "Web chat relay with speech helpers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the chat web server (default)
    Serve,
    /// Transcribe an audio file and print the text
    Transcribe {
        audio: PathBuf,
        /// Wrap the transcript at this many columns
        #[arg(long, default_value_t = 50)]
        width: usize,
        /// ISO-639-1 language hint
        #[arg(long)]
        language: Option<String>,
    },
    /// Convert text to speech and save it as MP3
    Speak {
        /// Text to speak; read from --file or stdin when omitted
        text: Option<String>,
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_VOICE)]
        voice: String,
        #[arg(long, default_value_t = DEFAULT_SPEED)]
        speed: f32,
        #[arg(short, long, default_value = "speech.mp3")]
        output: PathBuf,
    },
}
