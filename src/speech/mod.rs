//! Speech-to-text and text-to-speech against hosted OpenAI-compatible audio
//! endpoints. Each operation is a single outbound call.

pub mod synthesize;
pub mod transcribe;

use std::path::PathBuf;

use thiserror::Error;

pub use synthesize::{resolve_text, speak_to_file, SpeechOptions};
pub use transcribe::transcribe_wrapped;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("speech API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("no text to speak")]
    EmptyInput,
    #[error("speed {0} is outside 0.25..=4.0")]
    InvalidSpeed(f32),
}

/// Greedily packs whitespace-separated words into lines of at most `width`
/// characters. Hyphenated words may break after a hyphen, and a word longer
/// than `width` fills the rest of the current line before spilling over.
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut line: Vec<char> = Vec::new();

    for word in text.split_whitespace() {
        for (i, piece) in hyphen_pieces(word).iter().enumerate() {
            let sep = usize::from(i == 0 && !line.is_empty());
            let mut rest: &[char] = piece;

            if line.len() + sep + rest.len() <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.extend_from_slice(rest);
                continue;
            }
            if rest.len() <= width {
                lines.push(line.drain(..).collect());
                line.extend_from_slice(rest);
                continue;
            }

            if !line.is_empty() {
                let room = width.saturating_sub(line.len() + sep);
                if room > 0 {
                    if sep == 1 {
                        line.push(' ');
                    }
                    line.extend_from_slice(&rest[..room]);
                    rest = &rest[room..];
                }
                lines.push(line.drain(..).collect());
            }
            while rest.len() > width {
                lines.push(rest[..width].iter().collect());
                rest = &rest[width..];
            }
            line.extend_from_slice(rest);
        }
    }
    if !line.is_empty() {
        lines.push(line.into_iter().collect());
    }
    lines.join("\n")
}

// "well-known" -> ["well-", "known"]; only hyphens between word characters split.
fn hyphen_pieces(word: &str) -> Vec<Vec<char>> {
    let chars: Vec<char> = word.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;
    for i in 1..chars.len().saturating_sub(1) {
        if chars[i] == '-' && chars[i - 1].is_alphanumeric() && chars[i + 1].is_alphanumeric() {
            pieces.push(chars[start..=i].to_vec());
            start = i + 1;
        }
    }
    pieces.push(chars[start..].to_vec());
    pieces
}
