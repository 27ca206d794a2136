// Shared helpers for integration tests
//
// Each test binary compiles this module separately, so some helpers look
// unused from any single binary.
#![allow(dead_code)]

use easy_preview::{DocumentContent, EmbeddedFrame, FrameProbe, LiveSize};
use parking_lot::Mutex;
use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a tracing subscriber honoring RUST_LOG, once per test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Embedded frame standing in for an iframe.
///
/// Records navigations and sizes; tests choose what the frame exposes when
/// probed.
#[derive(Default)]
pub struct FakeFrame {
    navigations: Mutex<Vec<String>>,
    sizes: Mutex<Vec<LiveSize>>,
    probe: Mutex<FrameProbe>,
}

impl FakeFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    pub fn last_size(&self) -> Option<LiveSize> {
        self.sizes.lock().last().copied()
    }

    pub fn size_count(&self) -> usize {
        self.sizes.lock().len()
    }

    /// Makes the frame look like a cross-origin page.
    pub fn set_opaque(&self) {
        *self.probe.lock() = FrameProbe::opaque();
    }

    /// Makes the frame resolve to `address` with nothing readable.
    pub fn set_address(&self, address: &str) {
        *self.probe.lock() = FrameProbe {
            address: Some(address.to_string()),
            document: None,
        };
    }

    /// Makes the frame look like a readable same-origin page.
    pub fn set_readable(&self, address: &str, text: &str, markup: &str) {
        *self.probe.lock() = FrameProbe {
            address: Some(address.to_string()),
            document: Some(DocumentContent {
                text: text.to_string(),
                markup: markup.to_string(),
            }),
        };
    }
}

impl EmbeddedFrame for FakeFrame {
    fn navigate(&self, url: &str) {
        self.navigations.lock().push(url.to_string());
    }

    fn probe(&self) -> FrameProbe {
        self.probe.lock().clone()
    }

    fn apply_size(&self, size: LiveSize) {
        self.sizes.lock().push(size);
    }
}
