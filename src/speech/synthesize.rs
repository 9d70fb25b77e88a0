use std::path::{Path, PathBuf};

use log::info;
use reqwest::Client;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::SpeechError;
use crate::config::SpeechConfig;

pub const DEFAULT_VOICE: &str = "nova";
pub const DEFAULT_SPEED: f32 = 0.95;

#[derive(Debug, Clone)]
pub struct SpeechOptions {
    pub voice: String,
    pub speed: f32,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            speed: DEFAULT_SPEED,
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'static str,
}

/// Synthesizes `text` and returns MP3 audio bytes.
pub async fn synthesize(
    config: &SpeechConfig,
    text: &str,
    options: &SpeechOptions,
) -> Result<Vec<u8>, SpeechError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SpeechError::EmptyInput);
    }
    if !(0.25..=4.0).contains(&options.speed) {
        return Err(SpeechError::InvalidSpeed(options.speed));
    }

    let body = SpeechRequest {
        model: &config.speech_model,
        input: text,
        voice: &options.voice,
        speed: options.speed,
        response_format: "mp3",
    };

    let response = Client::new()
        .post(&config.speech_url)
        .bearer_auth(&config.api_key)
        .json(&body)
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

    let audio = response.bytes().await?.to_vec();
    info!(
        "Generated {} bytes of audio (voice={}, model={})",
        audio.len(),
        options.voice,
        config.speech_model
    );
    Ok(audio)
}

/// Picks the text to speak: the inline argument, else the file, else `stdin`.
pub async fn resolve_text<R>(
    text: Option<String>,
    file: Option<&Path>,
    mut stdin: R,
) -> Result<String, SpeechError>
where
    R: AsyncRead + Unpin,
{
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SpeechError::Io {
                path: path.to_path_buf(),
                source,
            });
    }
    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .await
        .map_err(|source| SpeechError::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
    Ok(buf)
}

/// Synthesizes `text` and writes the MP3 to `output`, returning the byte count.
pub async fn speak_to_file(
    config: &SpeechConfig,
    text: &str,
    options: &SpeechOptions,
    output: &Path,
) -> Result<usize, SpeechError> {
    info!("Speaking {} chars", text.trim().chars().count());
    let audio = synthesize(config, text, options).await?;
    tokio::fs::write(output, &audio)
        .await
        .map_err(|source| SpeechError::Io {
            path: output.to_path_buf(),
            source,
        })?;
    info!("Saved audio to {}", output.display());
    Ok(audio.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config_for(url: String) -> SpeechConfig {
        SpeechConfig {
            api_key: "sk-audio".to_string(),
            transcription_url: "http://unused".to_string(),
            transcription_model: "whisper-1".to_string(),
            speech_url: url,
            speech_model: "tts-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_synthesize_success() {
        let fake_audio = vec![0xFFu8; 128];
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", "Bearer sk-audio")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "tts-1",
                "input": "No rest, no rest.",
                "voice": "nova",
                "response_format": "mp3"
            })))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(fake_audio.clone())
            .create_async()
            .await;

        let audio = synthesize(
            &config_for(server.url()),
            "\n  No rest, no rest.\n",
            &SpeechOptions::default(),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(audio, fake_audio);
    }

    #[tokio::test]
    async fn test_synthesize_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = synthesize(&config_for(server.url()), "hello", &SpeechOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_synthesize_rejects_blank_text_without_calling_api() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;

        let err = synthesize(&config_for(server.url()), "   \n", &SpeechOptions::default())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, SpeechError::EmptyInput));
    }

    #[tokio::test]
    async fn test_synthesize_rejects_out_of_range_speed() {
        let options = SpeechOptions {
            voice: "alloy".to_string(),
            speed: 5.0,
        };
        let err = synthesize(&config_for("http://127.0.0.1:1/".to_string()), "hi", &options)
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::InvalidSpeed(_)));
    }

    #[tokio::test]
    async fn test_synthesize_body_read_failure_is_transport_error() {
        use std::io::Write;

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(500)
            .with_chunked_body(|w| {
                w.write_all(b"partial")?;
                Err(std::io::Error::new(std::io::ErrorKind::Other, "connection dropped"))
            })
            .create_async()
            .await;

        let err = synthesize(&config_for(server.url()), "hello", &SpeechOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SpeechError::Transport(_)), "got {:?}", err);
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("chat-relay-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_resolve_text_prefers_inline_argument() {
        let file = temp_path("inline-unused.txt");
        std::fs::write(&file, "from file").unwrap();

        let text = resolve_text(Some("inline".to_string()), Some(file.as_path()), &b"from stdin"[..])
            .await
            .unwrap();
        let _ = std::fs::remove_file(&file);

        assert_eq!(text, "inline");
    }

    #[tokio::test]
    async fn test_resolve_text_reads_file() {
        let file = temp_path("poem.txt");
        std::fs::write(&file, "The clock ticks loud when you're alone,\n").unwrap();

        let text = resolve_text(None, Some(file.as_path()), &b"from stdin"[..]).await.unwrap();
        let _ = std::fs::remove_file(&file);

        assert_eq!(text, "The clock ticks loud when you're alone,\n");
    }

    #[tokio::test]
    async fn test_resolve_text_falls_back_to_stdin() {
        let text = resolve_text(None, None, &b"Walls whisper secrets"[..])
            .await
            .unwrap();
        assert_eq!(text, "Walls whisper secrets");
    }

    #[tokio::test]
    async fn test_resolve_text_missing_file_is_io_error() {
        let missing = Path::new("/nonexistent/poem.txt");
        let err = resolve_text(None, Some(missing), &b""[..]).await.unwrap_err();
        match err {
            SpeechError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_speak_to_file_writes_audio() {
        let fake_audio = vec![0x49u8, 0x44, 0x33, 0x04, 0x00];
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(serde_json::json!({"input": "No rest."})))
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(fake_audio.clone())
            .create_async()
            .await;

        let output = temp_path("speech.mp3");
        let written = speak_to_file(
            &config_for(server.url()),
            "No rest.",
            &SpeechOptions::default(),
            &output,
        )
        .await
        .unwrap();
        let saved = std::fs::read(&output).unwrap();
        let _ = std::fs::remove_file(&output);

        mock.assert_async().await;
        assert_eq!(written, fake_audio.len());
        assert_eq!(saved, fake_audio);
    }

    #[tokio::test]
    async fn test_speak_to_file_does_not_create_output_on_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let output = temp_path("never-written.mp3");
        let err = speak_to_file(
            &config_for(server.url()),
            "hello",
            &SpeechOptions::default(),
            &output,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SpeechError::Api { status: 401, .. }));
        assert!(!output.exists());
    }
}
