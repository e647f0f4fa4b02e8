//! Startup configuration.
//!
//! Loaded from an optional `xrscope.toml`. Every field has a default, so
//! a missing file, an empty file, or a partial table all yield a working
//! configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::model::{ExtensionRequest, VIVE_TRACKER_EXTENSION};

/// Application metadata reported to the runtime at instance creation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApplicationInfo {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_component_version")]
    pub version: u32,
    #[serde(default = "default_engine_name")]
    pub engine_name: String,
    #[serde(default = "default_component_version")]
    pub engine_version: u32,
}

impl Default for ApplicationInfo {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_component_version(),
            engine_name: default_engine_name(),
            engine_version: default_component_version(),
        }
    }
}

/// Top-level XRSCOPE configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct XrscopeConfig {
    #[serde(default)]
    pub application: ApplicationInfo,
    /// Override path for the OpenXR loader shared library.
    #[serde(default)]
    pub loader_path: Option<PathBuf>,
    /// Ordered extension request list, negotiated against the runtime
    /// catalog in this exact order.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<ExtensionRequest>,
}

impl Default for XrscopeConfig {
    fn default() -> Self {
        Self {
            application: ApplicationInfo::default(),
            loader_path: None,
            extensions: default_extensions(),
        }
    }
}

impl XrscopeConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

fn default_app_name() -> String {
    "xrscope".to_string()
}

fn default_engine_name() -> String {
    "xrscope".to_string()
}

fn default_component_version() -> u32 {
    1
}

fn default_extensions() -> Vec<ExtensionRequest> {
    vec![ExtensionRequest::required(VIVE_TRACKER_EXTENSION)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_requests_vive_tracker() {
        let config = XrscopeConfig::default();
        assert_eq!(config.extensions.len(), 1);
        assert_eq!(config.extensions[0].name, VIVE_TRACKER_EXTENSION);
        assert!(config.extensions[0].required);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = XrscopeConfig::from_toml_str("").unwrap();
        assert_eq!(config, XrscopeConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = XrscopeConfig::from_toml_str(
            r#"
            [application]
            name = "tracker-lab"
            "#,
        )
        .unwrap();
        assert_eq!(config.application.name, "tracker-lab");
        assert_eq!(config.application.version, 1);
        assert_eq!(config.extensions.len(), 1);
    }

    #[test]
    fn full_toml_parses() {
        let config = XrscopeConfig::from_toml_str(
            r#"
            loader_path = "/opt/xr/libopenxr_loader.so.1"

            [application]
            name = "tracker-lab"
            version = 3
            engine_name = "bench"
            engine_version = 2

            [[extensions]]
            name = "XR_HTCX_vive_tracker_interaction"

            [[extensions]]
            name = "XR_MND_headless"
            required = false
            "#,
        )
        .unwrap();
        assert_eq!(
            config.loader_path.as_deref(),
            Some(Path::new("/opt/xr/libopenxr_loader.so.1"))
        );
        assert_eq!(config.application.version, 3);
        assert_eq!(config.application.engine_name, "bench");
        assert_eq!(config.extensions.len(), 2);
        assert!(config.extensions[0].required);
        assert!(!config.extensions[1].required);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(XrscopeConfig::from_toml_str("extensions = 7").is_err());
    }
}
