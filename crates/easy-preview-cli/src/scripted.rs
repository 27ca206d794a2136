// Scripted stand-ins for the browser-side collaborators
//
// The CLI has no iframe and no feedback service, so `load` drives the core
// against a frame whose probe result and native events come from flags, and
// `feedback` appends submissions to a JSON-lines file.

use async_trait::async_trait;
use easy_preview::preview::FeedbackSubmission;
use easy_preview::{DocumentContent, EmbeddedFrame, FeedbackBackend, FrameProbe, LiveSize};
use std::io::Write;
use std::path::PathBuf;

/// Frame that reports a fixed probe.
#[derive(Debug)]
pub struct ScriptedFrame {
    probe: FrameProbe,
}

impl ScriptedFrame {
    pub fn new(address: Option<String>, text: Option<String>, markup: Option<String>) -> Self {
        let document = match (text, markup) {
            (None, None) => None,
            (text, markup) => Some(DocumentContent {
                text: text.unwrap_or_default(),
                markup: markup.unwrap_or_default(),
            }),
        };
        Self {
            probe: FrameProbe { address, document },
        }
    }
}

impl EmbeddedFrame for ScriptedFrame {
    fn navigate(&self, url: &str) {
        tracing::info!("Frame navigating to {}", url);
    }

    fn probe(&self) -> FrameProbe {
        self.probe.clone()
    }

    fn apply_size(&self, size: LiveSize) {
        tracing::debug!("Frame sized to {}x{}", size.width, size.height);
    }
}

/// Feedback backend writing one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesBackend {
    path: PathBuf,
}

impl JsonLinesBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedbackBackend for JsonLinesBackend {
    async fn submit(&self, submission: &FeedbackSubmission) -> easy_preview::Result<()> {
        let line = serde_json::to_string(submission)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| easy_preview::Error::Backend(format!("{}: {}", self.path.display(), e)))?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
