// Resizer - Drag-to-resize state machine
//
// Eight handles (four edges, four corners) resize the preview from a
// pointer-drag. Updates are computed synchronously on every pointer move; the
// work is a handful of arithmetic operations so nothing is debounced.

use crate::error::{Error, Result};
use crate::preview::devices::{DimensionIdentity, reconcile};
use crate::preview::viewport::{MIN_HEIGHT, MIN_WIDTH, Viewport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edge or corner a drag starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleKind {
    Right,
    Bottom,
    BottomRight,
    Left,
    Top,
    TopLeft,
    TopRight,
    BottomLeft,
}

impl HandleKind {
    /// All handles, in the order they are attached to the preview container.
    pub const ALL: [HandleKind; 8] = [
        HandleKind::Right,
        HandleKind::Bottom,
        HandleKind::BottomRight,
        HandleKind::Left,
        HandleKind::Top,
        HandleKind::TopLeft,
        HandleKind::TopRight,
        HandleKind::BottomLeft,
    ];

    /// Kebab-case name, used for `data-handle` attributes and CSS classes.
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::Right => "right",
            HandleKind::Bottom => "bottom",
            HandleKind::BottomRight => "bottom-right",
            HandleKind::Left => "left",
            HandleKind::Top => "top",
            HandleKind::TopLeft => "top-left",
            HandleKind::TopRight => "top-right",
            HandleKind::BottomLeft => "bottom-left",
        }
    }

    /// Sign applied to the horizontal delta: `1` grows with `dx`, `-1`
    /// shrinks with it, `0` ignores it.
    pub fn width_sign(&self) -> f64 {
        match self {
            HandleKind::Right | HandleKind::BottomRight | HandleKind::TopRight => 1.0,
            HandleKind::Left | HandleKind::TopLeft | HandleKind::BottomLeft => -1.0,
            HandleKind::Top | HandleKind::Bottom => 0.0,
        }
    }

    /// Sign applied to the vertical delta.
    pub fn height_sign(&self) -> f64 {
        match self {
            HandleKind::Bottom | HandleKind::BottomRight | HandleKind::BottomLeft => 1.0,
            HandleKind::Top | HandleKind::TopLeft | HandleKind::TopRight => -1.0,
            HandleKind::Left | HandleKind::Right => 0.0,
        }
    }

    /// CSS cursor shown on the page body while dragging this handle.
    pub fn cursor(&self) -> &'static str {
        match self {
            HandleKind::Right | HandleKind::Left => "ew-resize",
            HandleKind::Top | HandleKind::Bottom => "ns-resize",
            HandleKind::TopLeft | HandleKind::BottomRight => "nwse-resize",
            HandleKind::TopRight | HandleKind::BottomLeft => "nesw-resize",
        }
    }

    /// Accessible label for the handle element.
    pub fn aria_label(&self) -> String {
        format!("Resize {}", self.as_str())
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HandleKind::ALL
            .into_iter()
            .find(|handle| handle.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown resize handle '{}'", s)))
    }
}

/// Pointer position in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rendered size of the preview container, possibly fractional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LiveSize {
    pub width: f64,
    pub height: f64,
}

impl LiveSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Rounds to the nearest integral pixel for publication.
    pub fn to_viewport(self) -> Viewport {
        Viewport {
            width: round_px(self.width),
            height: round_px(self.height),
        }
    }
}

impl From<Viewport> for LiveSize {
    fn from(viewport: Viewport) -> Self {
        Self {
            width: f64::from(viewport.width),
            height: f64::from(viewport.height),
        }
    }
}

fn round_px(value: f64) -> u32 {
    // Inputs are already floored to the minimums, so the cast never saturates low.
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Computes the size for a drag delta from a given handle.
///
/// Each axis is clamped independently: width to `MIN_WIDTH`, height to
/// `MIN_HEIGHT`.
pub fn compute_resize(handle: HandleKind, start: LiveSize, delta_x: f64, delta_y: f64) -> LiveSize {
    let width = start.width + handle.width_sign() * delta_x;
    let height = start.height + handle.height_sign() * delta_y;
    LiveSize {
        width: width.max(f64::from(MIN_WIDTH)),
        height: height.max(f64::from(MIN_HEIGHT)),
    }
}

/// State of one pointer drag, from pointer-down to pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub handle: HandleKind,
    pub start_pointer: PointerPosition,
    pub start_size: LiveSize,
}

/// Result of one pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeUpdate {
    pub handle: HandleKind,
    /// Size to write to the rendered container and frame
    pub live: LiveSize,
    /// Rounded size published to state and the input fields
    pub viewport: Viewport,
    pub identity: DimensionIdentity,
}

/// Owns the drag lifecycle for the preview container.
///
/// Only one drag is active at a time. Starting a new drag replaces any
/// active one; ending a drag is unconditional and idempotent.
#[derive(Debug, Default)]
pub struct ResizeController {
    session: Option<DragSession>,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a drag from `handle`.
    ///
    /// `rect` must be the live rendered size of the container, not the last
    /// published viewport, so an external resize between renders is honored.
    pub fn begin_drag(&mut self, handle: HandleKind, pointer: PointerPosition, rect: LiveSize) {
        if let Some(previous) = self.session {
            tracing::debug!(
                "Replacing active drag on '{}' with '{}'",
                previous.handle,
                handle
            );
        }
        tracing::debug!(
            "Drag started on '{}' at ({}, {}) from {}x{}",
            handle,
            pointer.x,
            pointer.y,
            rect.width,
            rect.height
        );
        self.session = Some(DragSession {
            handle,
            start_pointer: pointer,
            start_size: rect,
        });
    }

    /// Computes the resize for a pointer move; `None` without an active drag.
    pub fn update_drag(&self, pointer: PointerPosition) -> Option<ResizeUpdate> {
        let session = self.session?;
        let delta_x = pointer.x - session.start_pointer.x;
        let delta_y = pointer.y - session.start_pointer.y;
        let live = compute_resize(session.handle, session.start_size, delta_x, delta_y);
        let viewport = live.to_viewport();
        Some(ResizeUpdate {
            handle: session.handle,
            live,
            viewport,
            identity: reconcile(viewport.width, viewport.height),
        })
    }

    /// Ends the drag wherever the pointer is. Returns the ended session.
    pub fn end_drag(&mut self) -> Option<DragSession> {
        let ended = self.session.take();
        if let Some(session) = &ended {
            tracing::debug!("Drag ended on '{}'", session.handle);
        }
        ended
    }

    /// Whether a drag is in progress (text selection should be suppressed).
    pub fn is_resizing(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }
}
