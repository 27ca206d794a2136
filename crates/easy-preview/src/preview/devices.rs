// Devices - Preset catalog and dimension reconciliation
//
// The catalog order is the display order of the device selector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the catch-all entry used when dimensions match no preset.
pub const CUSTOM_DEVICE_ID: &str = "custom";

/// Device selected on startup.
pub const DEFAULT_DEVICE_ID: &str = "iphone-16-pro-max";

/// Device category, used to group presets in the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Phone,
    Tablet,
    Custom,
}

/// Immutable catalog entry describing a common device viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DevicePreset {
    /// Stable identifier, used in share links (`device=`)
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Viewport width in CSS pixels
    pub width: u32,
    /// Viewport height in CSS pixels
    pub height: u32,
    pub category: DeviceCategory,
}

impl DevicePreset {
    /// Returns true for the `custom` catch-all entry.
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_DEVICE_ID
    }

    /// Label shown in the device selector.
    ///
    /// Presets show their dimensions (`iPhone SE (320×568)`), the custom entry
    /// shows only its name.
    pub fn label(&self) -> String {
        if self.is_custom() {
            self.name.to_string()
        } else {
            format!("{} ({}×{})", self.name, self.width, self.height)
        }
    }
}

const fn preset(
    id: &'static str,
    name: &'static str,
    width: u32,
    height: u32,
    category: DeviceCategory,
) -> DevicePreset {
    DevicePreset {
        id,
        name,
        width,
        height,
        category,
    }
}

/// Preset catalog, in selector display order.
pub static DEVICES: &[DevicePreset] = &[
    preset("iphone-se", "iPhone SE", 320, 568, DeviceCategory::Phone),
    preset("iphone-16", "iPhone 16", 393, 852, DeviceCategory::Phone),
    preset("iphone-16-pro", "iPhone 16 Pro", 402, 874, DeviceCategory::Phone),
    preset(
        "iphone-16-pro-max",
        "iPhone 16 Pro Max",
        440,
        956,
        DeviceCategory::Phone,
    ),
    preset("iphone-16-plus", "iPhone 16 Plus", 430, 932, DeviceCategory::Phone),
    preset(
        "android-compact",
        "Android Compact",
        412,
        917,
        DeviceCategory::Phone,
    ),
    preset(
        "android-medium",
        "Android Medium",
        700,
        840,
        DeviceCategory::Phone,
    ),
    preset("ipad-mini", "iPad Mini", 744, 1133, DeviceCategory::Tablet),
    preset("ipad-pro-11", "iPad Pro 11\"", 834, 1194, DeviceCategory::Tablet),
    preset(CUSTOM_DEVICE_ID, "Custom", 375, 667, DeviceCategory::Custom),
];

/// Looks up a catalog entry by id (including `custom`).
pub fn get_device_by_id(id: &str) -> Option<&'static DevicePreset> {
    DEVICES.iter().find(|device| device.id == id)
}

/// Returns the startup device, falling back to the first catalog entry.
pub fn default_device() -> &'static DevicePreset {
    get_device_by_id(DEFAULT_DEVICE_ID).unwrap_or(&DEVICES[0])
}

/// The `custom` catalog entry.
pub fn custom_device() -> &'static DevicePreset {
    // The catalog is static and always carries the custom entry as its last item.
    get_device_by_id(CUSTOM_DEVICE_ID).unwrap_or(&DEVICES[DEVICES.len() - 1])
}

/// Finds the first non-custom preset whose dimensions match exactly.
pub fn find_device_by_dimensions(width: u32, height: u32) -> Option<&'static DevicePreset> {
    DEVICES
        .iter()
        .find(|device| !device.is_custom() && device.width == width && device.height == height)
}

/// Identity of the current viewport: a preset or the generic custom identity.
///
/// Never stored on its own; always derived from the viewport with [`reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionIdentity {
    Preset(&'static DevicePreset),
    Custom,
}

impl DimensionIdentity {
    /// Stable id as used by the selector and share links.
    pub fn id(&self) -> &'static str {
        match self {
            DimensionIdentity::Preset(device) => device.id,
            DimensionIdentity::Custom => CUSTOM_DEVICE_ID,
        }
    }

    /// The catalog entry backing this identity (the custom entry for `Custom`).
    pub fn device(&self) -> &'static DevicePreset {
        match self {
            DimensionIdentity::Preset(device) => device,
            DimensionIdentity::Custom => custom_device(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, DimensionIdentity::Custom)
    }
}

impl fmt::Display for DimensionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for DimensionIdentity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

/// Maps a (width, height) pair to its preset identity, or `Custom`.
///
/// Exact match over the catalog excluding the custom entry; catalog order
/// breaks ties.
pub fn reconcile(width: u32, height: u32) -> DimensionIdentity {
    match find_device_by_dimensions(width, height) {
        Some(device) => DimensionIdentity::Preset(device),
        None => DimensionIdentity::Custom,
    }
}
