// Preview components
//
// Architecture:
// - PreviewApp owns the application state and performs every mutation
// - ResizeController turns pointer drags into clamped viewports
// - reconcile maps a viewport back to a device preset or `custom`
// - LoadMonitor classifies loads of the embedded frame
//
// Platform code (DOM, storage, network) is reached only through the
// EmbeddedFrame, PreferenceStore and FeedbackBackend traits.

pub mod app;
pub mod devices;
pub mod feedback;
pub mod monitor;
pub mod resizer;
pub mod share;
pub mod theme;
pub mod viewport;

pub use app::{AppSnapshot, PreviewApp, normalize_url};
pub use devices::{
    CUSTOM_DEVICE_ID, DEFAULT_DEVICE_ID, DEVICES, DeviceCategory, DevicePreset, DimensionIdentity,
    custom_device, default_device, find_device_by_dimensions, get_device_by_id, reconcile,
};
pub use feedback::{
    FeedbackBackend, FeedbackCategory, FeedbackForm, FeedbackSubmission, submit_feedback,
};
pub use monitor::{
    AttemptId, BlockReason, DocumentContent, EmbeddedFrame, FrameProbe, LoadAttempt,
    LoadClassifier, LoadMonitor, LoadOutcome, Presentation, classify_load_outcome,
};
pub use resizer::{
    DragSession, HandleKind, LiveSize, PointerPosition, ResizeController, ResizeUpdate,
    compute_resize,
};
pub use share::{
    QueryState, ShareLinks, ShareState, generate_embed_code, generate_full_screen_url,
    generate_share_url, share_links,
};
pub use theme::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, THEME_STORAGE_KEY, Theme,
    ThemeManager,
};
pub use viewport::{MIN_HEIGHT, MIN_WIDTH, Viewport, parse_dimension};
