//! easy-preview: core of a responsive-design preview tool
//!
//! A user enters a URL, picks a device or custom size, and the page renders
//! inside a resizable frame. This crate holds the parts with real logic:
//!
//! - [`ResizeController`]: eight-handle drag-to-resize with minimum-size clamping
//! - [`reconcile`]: maps dimensions back to a device preset or `custom`
//! - [`LoadMonitor`]: classifies an embedded load as success, blocked or failed
//!   without access to the (usually cross-origin) document
//! - [`PreviewApp`]: the single owner of application state
//!
//! Everything platform-specific sits behind a trait ([`EmbeddedFrame`],
//! [`PreferenceStore`], [`FeedbackBackend`]) so a browser binding or a test
//! harness can drive the same code.
//!
//! # Examples
//!
//! ## Drag to resize
//!
//! ```ignore
//! use easy_preview::{HandleKind, LiveSize, PointerPosition, ResizeController};
//!
//! let mut resizer = ResizeController::new();
//! resizer.begin_drag(
//!     HandleKind::Right,
//!     PointerPosition::new(500.0, 300.0),
//!     LiveSize::new(400.0, 700.0),
//! );
//!
//! // Dragging 300px to the left stops at the 200px floor
//! let update = resizer.update_drag(PointerPosition::new(200.0, 300.0)).unwrap();
//! assert_eq!(update.viewport.width, 200);
//! assert!(update.identity.is_custom());
//!
//! resizer.end_drag();
//! ```
//!
//! ## Loading a URL
//!
//! ```ignore
//! use easy_preview::{LoadPolicy, Presentation, PreviewApp};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let frame = Arc::new(MyIframeAdapter::new());
//!     let mut app = PreviewApp::new(frame, LoadPolicy::default())?;
//!
//!     // "example.com" becomes "https://example.com"
//!     let attempt = app.submit_url("example.com")?;
//!     assert!(matches!(app.snapshot().presentation, Presentation::Loading { .. }));
//!
//!     // The adapter forwards the iframe's native events with the attempt id
//!     app.on_frame_load(attempt);
//!     Ok(())
//! }
//! ```

pub mod api;
mod error;
pub mod preview;

// Re-export error types
pub use error::{Error, Result};

// Re-export options
pub use api::{LoadPolicy, ShareOptions};

// Re-export the application controller
pub use preview::{AppSnapshot, PreviewApp, normalize_url};

// Re-export devices and dimensions
pub use preview::{
    DEVICES, DevicePreset, DimensionIdentity, MIN_HEIGHT, MIN_WIDTH, Viewport, default_device,
    get_device_by_id, reconcile,
};

// Re-export resize types
pub use preview::{HandleKind, LiveSize, PointerPosition, ResizeController, ResizeUpdate};

// Re-export load monitoring types
pub use preview::{
    AttemptId, BlockReason, DocumentContent, EmbeddedFrame, FrameProbe, LoadMonitor, LoadOutcome,
    Presentation,
};

// Re-export share, theme and feedback types
pub use preview::{
    FeedbackBackend, FeedbackForm, PreferenceStore, QueryState, ShareLinks, Theme, ThemeManager,
};
