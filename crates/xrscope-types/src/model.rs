//! Data model for runtime and extension discovery.

use std::fmt;

use serde::Deserialize;

/// Extension name for HTC vive tracker interaction.
pub const VIVE_TRACKER_EXTENSION: &str = "XR_HTCX_vive_tracker_interaction";

/// One extension reported by the runtime during catalog discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    /// Extension name as reported by the runtime.
    pub name: String,
    /// Extension revision as reported by the runtime.
    pub version: u32,
}

/// A caller request to enable one extension by name.
///
/// Requests are soft: a name the runtime does not support produces a
/// diagnostic and is skipped, never a startup failure.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExtensionRequest {
    pub name: String,
    /// `false` downgrades the missing-extension diagnostic to a warning.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl ExtensionRequest {
    /// A required request (missing extension logged at error level).
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// An optional request (missing extension logged at warn level).
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Hardware device class to discover on the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// A headset worn on the user's head.
    HeadMountedDisplay,
    /// A held device such as a phone or tablet.
    Handheld,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeadMountedDisplay => write!(f, "head-mounted display"),
            Self::Handheld => write!(f, "handheld"),
        }
    }
}

/// Packed OpenXR version: major (16 bits), minor (16 bits), patch (32 bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct XrVersion(pub u64);

impl XrVersion {
    pub const fn new(major: u16, minor: u16, patch: u32) -> Self {
        Self(((major as u64) << 48) | ((minor as u64) << 32) | patch as u64)
    }

    pub const fn major(self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub const fn minor(self) -> u16 {
        (self.0 >> 32) as u16
    }

    pub const fn patch(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for XrVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

/// Identity of the runtime behind a created instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeIdentity {
    pub name: String,
    pub version: XrVersion,
}

/// Identity of the discovered hardware system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemIdentity {
    /// Runtime-assigned system id.
    pub id: u64,
    /// System name; empty when the property query failed.
    pub name: String,
    pub device_class: DeviceClass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_packs_and_unpacks() {
        let v = XrVersion::new(1, 0, 34);
        assert_eq!(v.major(), 1);
        assert_eq!(v.minor(), 0);
        assert_eq!(v.patch(), 34);
        assert_eq!(format!("{v}"), "1.0.34");
    }

    #[test]
    fn version_matches_openxr_packing() {
        // 1.0.0 must pack to exactly 1 << 48.
        assert_eq!(XrVersion::new(1, 0, 0).0, 1u64 << 48);
    }

    #[test]
    fn device_class_display() {
        assert_eq!(
            format!("{}", DeviceClass::HeadMountedDisplay),
            "head-mounted display"
        );
        assert_eq!(format!("{}", DeviceClass::Handheld), "handheld");
    }

    #[test]
    fn request_constructors() {
        assert!(ExtensionRequest::required("XR_MND_headless").required);
        assert!(!ExtensionRequest::optional("XR_MND_headless").required);
    }

    #[test]
    fn request_deserialize_defaults_required() {
        let req: ExtensionRequest = toml::from_str("name = \"XR_MND_headless\"").unwrap();
        assert_eq!(req.name, "XR_MND_headless");
        assert!(req.required);
    }
}
