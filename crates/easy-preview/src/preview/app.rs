// PreviewApp - Application state and the operations that mutate it
//
// All state (viewport, current URL) lives in one struct owned by the
// controller. The device identity is never stored: it is reconciled from the
// viewport whenever it is read. Display, share and monitor code read an
// immutable AppSnapshot.

use crate::api::{LoadPolicy, ShareOptions};
use crate::error::{Error, Result};
use crate::preview::devices::{DimensionIdentity, default_device, get_device_by_id, reconcile};
use crate::preview::monitor::{AttemptId, EmbeddedFrame, LoadMonitor, Presentation};
use crate::preview::resizer::{
    HandleKind, LiveSize, PointerPosition, ResizeController, ResizeUpdate,
};
use crate::preview::share::{QueryState, ShareLinks, ShareState, share_links};
use crate::preview::viewport::{Viewport, parse_dimension};
use serde::Serialize;
use std::sync::Arc;

/// Normalizes and validates URL input.
///
/// Input is trimmed and `https://` is prepended when no http(s) scheme is
/// present. The result must parse as an absolute URL with a host. The returned
/// string is the prepended input, as shown back in the URL field.
pub fn normalize_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyUrl);
    }
    let lowered = trimmed.to_ascii_lowercase();
    let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let parsed = url::Url::parse(&candidate).map_err(|e| Error::InvalidUrl {
        input: candidate.clone(),
        reason: e.to_string(),
    })?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl {
            input: candidate,
            reason: "missing host".to_string(),
        });
    }
    Ok(candidate)
}

/// Mutable application state.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AppState {
    viewport: Viewport,
    url: Option<String>,
}

/// Immutable view of the application for display and sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub device: DimensionIdentity,
    pub viewport: Viewport,
    pub url: Option<String>,
    pub presentation: Presentation,
    pub is_resizing: bool,
}

impl AppSnapshot {
    /// Text of the dimension display, e.g. `320 × 568`.
    pub fn display_text(&self) -> String {
        self.viewport.display_text()
    }

    /// What a share link would encode, once a URL is loaded.
    pub fn share_state(&self) -> Option<ShareState> {
        self.url.as_ref().map(|url| ShareState {
            url: url.clone(),
            device: self.device.id().to_string(),
            viewport: self.viewport,
        })
    }
}

/// Controller owning the preview state, the resize controller and the load
/// monitor.
#[derive(Debug)]
pub struct PreviewApp {
    state: AppState,
    resizer: ResizeController,
    monitor: LoadMonitor,
}

impl PreviewApp {
    /// Creates the controller on the default device with nothing loaded.
    pub fn new(frame: Arc<dyn EmbeddedFrame>, policy: LoadPolicy) -> Result<Self> {
        let device = default_device();
        let app = Self {
            state: AppState {
                viewport: Viewport {
                    width: device.width,
                    height: device.height,
                },
                url: None,
            },
            resizer: ResizeController::new(),
            monitor: LoadMonitor::new(frame, policy)?,
        };
        app.push_size();
        Ok(app)
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    /// Device identity of the current viewport.
    pub fn identity(&self) -> DimensionIdentity {
        reconcile(self.state.viewport.width, self.state.viewport.height)
    }

    pub fn current_url(&self) -> Option<&str> {
        self.state.url.as_deref()
    }

    pub fn monitor(&self) -> &LoadMonitor {
        &self.monitor
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            device: self.identity(),
            viewport: self.state.viewport,
            url: self.state.url.clone(),
            presentation: self.monitor.presentation(),
            is_resizing: self.resizer.is_resizing(),
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) -> DimensionIdentity {
        self.state.viewport = viewport;
        self.push_size();
        let identity = self.identity();
        tracing::debug!("Viewport set to {} ({})", viewport, identity);
        identity
    }

    fn push_size(&self) {
        self.monitor.frame().apply_size(LiveSize::from(self.state.viewport));
    }

    /// Applies a device from the selector.
    ///
    /// Selecting `custom` keeps the current dimensions.
    pub fn select_device(&mut self, id: &str) -> Result<DimensionIdentity> {
        let device = get_device_by_id(id)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown device '{}'", id)))?;
        if device.is_custom() {
            return Ok(self.identity());
        }
        Ok(self.set_viewport(Viewport {
            width: device.width,
            height: device.height,
        }))
    }

    /// Commits the width/height input fields (on change/blur).
    ///
    /// Non-numeric input falls back to 375x667; values are clamped to the
    /// floors. Returns the viewport the fields should be rewritten with.
    pub fn set_dimensions_from_input(&mut self, width: &str, height: &str) -> Viewport {
        let viewport = Viewport::from_inputs(width, height);
        self.set_viewport(viewport);
        viewport
    }

    /// Dimension display text while the user is still typing.
    ///
    /// Nothing is committed; unparseable fields show the current value.
    pub fn preview_dimension_input(&self, width: &str, height: &str) -> String {
        let current = self.state.viewport;
        let width = parse_dimension(width).unwrap_or(i64::from(current.width));
        let height = parse_dimension(height).unwrap_or(i64::from(current.height));
        format!("{} × {}", width, height)
    }

    /// Swaps width and height and reconciles the result.
    pub fn toggle_orientation(&mut self) -> Viewport {
        let rotated = self.state.viewport.rotated();
        if !rotated.is_within_floors() {
            tracing::debug!("Rotated viewport {} is below a floor; keeping it", rotated);
        }
        self.set_viewport(rotated);
        rotated
    }

    /// Pointer-down on a resize handle.
    ///
    /// `rect` is the live rendered size of the preview container.
    pub fn begin_resize(&mut self, handle: HandleKind, pointer: PointerPosition, rect: LiveSize) {
        self.resizer.begin_drag(handle, pointer, rect);
    }

    /// Pointer-move while resizing; no-op without an active drag.
    pub fn update_resize(&mut self, pointer: PointerPosition) -> Option<ResizeUpdate> {
        let update = self.resizer.update_drag(pointer)?;
        self.monitor.frame().apply_size(update.live);
        self.state.viewport = update.viewport;
        Some(update)
    }

    /// Pointer-up anywhere on the page.
    pub fn end_resize(&mut self) {
        self.resizer.end_drag();
    }

    pub fn is_resizing(&self) -> bool {
        self.resizer.is_resizing()
    }

    /// Validates URL input and starts loading it.
    ///
    /// Invalid input leaves all state untouched and issues no load.
    pub fn submit_url(&mut self, input: &str) -> Result<AttemptId> {
        let url = normalize_url(input)?;
        Ok(self.load(url))
    }

    fn load(&mut self, url: String) -> AttemptId {
        let id = self.monitor.issue(&url);
        self.state.url = Some(url);
        id
    }

    /// Native load event of the frame for attempt `id`.
    pub fn on_frame_load(&self, id: AttemptId) -> bool {
        self.monitor.on_load(id)
    }

    /// Native error event of the frame for attempt `id`.
    pub fn on_frame_error(&self, id: AttemptId) -> bool {
        self.monitor.on_error(id)
    }

    /// Restores state from startup query parameters.
    ///
    /// A known `device` wins over `w`/`h`; `w`/`h` apply only when `device` is
    /// absent or `custom`, and only as a pair. A restored URL is loaded
    /// immediately; the id of that load is returned.
    pub fn restore(&mut self, query: &QueryState) -> Option<AttemptId> {
        match query.device.as_deref() {
            Some(id) if id != crate::preview::devices::CUSTOM_DEVICE_ID => {
                if let Err(e) = self.select_device(id) {
                    tracing::warn!("Ignoring shared device: {}", e);
                }
            }
            _ => {
                if let (Some(width), Some(height)) = (&query.width, &query.height) {
                    self.set_viewport(Viewport::from_inputs(width, height));
                }
            }
        }

        let url = query.url.as_deref()?;
        match normalize_url(url) {
            Ok(url) => Some(self.load(url)),
            Err(e) => {
                tracing::warn!("Ignoring shared url: {}", e);
                None
            }
        }
    }

    /// Links for the share dialog.
    pub fn share_links(&self, options: &ShareOptions) -> Result<ShareLinks> {
        share_links(options, self.snapshot().share_state().as_ref())
    }
}
