//! Speech rendering seam

use thiserror::Error;

/// Errors raised by a speech backend
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech backend unavailable: {0}")]
    Unavailable(String),
    #[error("Speech rendering failed: {0}")]
    RenderFailed(String),
}

impl From<std::io::Error> for SpeechError {
    fn from(err: std::io::Error) -> Self {
        SpeechError::Unavailable(err.to_string())
    }
}

/// Renders text to audio.
///
/// `render` blocks until playback has finished. It is only ever called from
/// the dispatcher worker, one request at a time.
pub trait SpeechRenderer: Send + Sync + 'static {
    fn render(&self, text: &str) -> Result<(), SpeechError>;
}
