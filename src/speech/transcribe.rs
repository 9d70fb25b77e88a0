use std::path::Path;

use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::{wrap_text, SpeechError};
use crate::config::SpeechConfig;

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp3") | Some("mpga") | Some("mpeg") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") | Some("opus") => "audio/ogg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("webm") => "audio/webm",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Uploads an audio file and returns the transcript text.
pub async fn transcribe(
    config: &SpeechConfig,
    path: &Path,
    language: Option<&str>,
) -> Result<String, SpeechError> {
    let audio = tokio::fs::read(path).await.map_err(|source| SpeechError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());

    info!("Transcribing {} ({} bytes)", path.display(), audio.len());

    let part = Part::bytes(audio)
        .file_name(file_name)
        .mime_str(mime_for(path))?;
    let mut form = Form::new()
        .part("file", part)
        .text("model", config.transcription_model.clone())
        .text("response_format", "json");
    if let Some(language) = language {
        form = form.text("language", language.to_string());
    }

    let response = Client::new()
        .post(&config.transcription_url)
        .bearer_auth(&config.api_key)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        return Err(SpeechError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    debug!("Transcription response: {}", body);
    let result: TranscriptionResponse = serde_json::from_str(&body)
        .map_err(|e| SpeechError::MalformedResponse(e.to_string()))?;

    info!("Transcribed {} chars", result.text.len());
    Ok(result.text)
}

/// Transcribes `path` and wraps the transcript to `width` columns for printing.
pub async fn transcribe_wrapped(
    config: &SpeechConfig,
    path: &Path,
    language: Option<&str>,
    width: usize,
) -> Result<String, SpeechError> {
    let transcript = transcribe(config, path, language).await?;
    Ok(wrap_text(&transcript, width))
}
