//! Camera device descriptors.

use serde::{Deserialize, Serialize};

/// Which way a camera points, guessed from its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingHint {
    /// User-facing camera.
    Front,
    /// World-facing camera ("environment" in media constraint terms).
    #[serde(alias = "environment")]
    #[default]
    Back,
    /// Label carries no facing information.
    Unknown,
}

impl FacingHint {
    /// Derives a facing hint from a device label.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_ascii_lowercase();
        if ["back", "rear", "environment", "world"]
            .iter()
            .any(|k| label.contains(k))
        {
            FacingHint::Back
        } else if ["front", "user", "face"].iter().any(|k| label.contains(k)) {
            FacingHint::Front
        } else {
            FacingHint::Unknown
        }
    }
}

impl std::fmt::Display for FacingHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FacingHint::Front => "front",
            FacingHint::Back => "environment",
            FacingHint::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A video input device available for scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDevice {
    /// Opaque backend identifier.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Facing guess derived from the label.
    pub facing: FacingHint,
}

impl CameraDevice {
    /// Creates a device, inferring the facing hint from its label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            facing: FacingHint::from_label(&label),
            label,
        }
    }
}

/// Picks the device to open.
///
/// An explicit id must match exactly. Otherwise the first device facing the
/// preferred way wins, falling back to the first device listed.
pub(crate) fn select_device<'a>(
    devices: &'a [CameraDevice],
    device_id: Option<&str>,
    preferred: FacingHint,
) -> Option<&'a CameraDevice> {
    match device_id {
        Some(id) => devices.iter().find(|d| d.id == id),
        None => devices
            .iter()
            .find(|d| d.facing == preferred)
            .or_else(|| devices.first()),
    }
}
