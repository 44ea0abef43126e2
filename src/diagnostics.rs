//! Structured diagnostics collected during a conversion.
//!
//! Recoverable problems (an unknown code language, a malformed component
//! payload) do not abort a post. Instead each pass reports them to a
//! [`Diagnostics`] sink owned by the pipeline run, and the caller gets the
//! full list back alongside the markdown. Tests assert on these events
//! instead of scraping log output.

use serde::Serialize;

/// How severe a recoverable event was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Processing continued with a fallback value.
    Warning,
    /// Processing continued, but content was left unconverted.
    Error,
}

/// One diagnostic event emitted by a pipeline stage.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Name of the stage that emitted the event.
    pub stage: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Per-conversion diagnostic sink.
///
/// Each conversion owns its own sink; nothing is shared between concurrent
/// posts. Events are mirrored to the `log` facade as they arrive.
#[derive(Debug, Default)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and mirrors it to `log::warn!`.
    pub fn warn(&mut self, stage: &'static str, message: impl Into<String>) {
        let message = message.into();
        log::warn!("[{stage}] {message}");
        self.events.push(Diagnostic {
            stage,
            severity: Severity::Warning,
            message,
        });
    }

    /// Records a recoverable error and mirrors it to `log::error!`.
    pub fn error(&mut self, stage: &'static str, message: impl Into<String>) {
        let message = message.into();
        log::error!("[{stage}] {message}");
        self.events.push(Diagnostic {
            stage,
            severity: Severity::Error,
            message,
        });
    }

    /// Returns the events recorded so far.
    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    /// Consumes the sink and returns the recorded events.
    pub fn into_events(self) -> Vec<Diagnostic> {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_recorded_in_order() {
        let mut diag = Diagnostics::new();
        diag.warn("code-blocks", "unsupported language: brainfuck");
        diag.error("components", "malformed payload");

        assert_eq!(diag.events().len(), 2);
        assert_eq!(diag.events()[0].stage, "code-blocks");
        assert_eq!(diag.events()[0].severity, Severity::Warning);
        assert_eq!(diag.events()[1].severity, Severity::Error);
    }
}
