//! Speech backends

use alerting::{SpeechError, SpeechRenderer};
use std::process::Command;
use tracing::info;

/// Logs announcements instead of playing them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRenderer;

impl SpeechRenderer for LogRenderer {
    fn render(&self, text: &str) -> Result<(), SpeechError> {
        info!(target: "speech", "{}", text);
        Ok(())
    }
}

/// Speaks through an external TTS program, e.g. `espeak -s 175 <text>`.
/// The program runs to completion before the next announcement.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl SpeechRenderer for CommandRenderer {
    fn render(&self, text: &str) -> Result<(), SpeechError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::RenderFailed(format!(
                "{} exited with {}",
                self.program, status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_renderer_never_fails() {
        assert!(LogRenderer.render("Summary: hello").is_ok());
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let renderer = CommandRenderer::new("/nonexistent/tts-binary", vec![]);
        assert!(matches!(
            renderer.render("hello"),
            Err(SpeechError::Unavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exit_status() {
        assert!(CommandRenderer::new("true", vec![]).render("hello").is_ok());
        assert!(matches!(
            CommandRenderer::new("false", vec![]).render("hello"),
            Err(SpeechError::RenderFailed(_))
        ));
    }
}
