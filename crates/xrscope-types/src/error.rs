//! Error types for XRSCOPE.

use std::io;

/// Errors produced by the XRSCOPE harness.
#[derive(Debug, thiserror::Error)]
pub enum XrscopeError {
    /// The OpenXR loader library could not be opened or a symbol is missing.
    #[error("loader error: {0}")]
    Loader(String),

    /// A native runtime call returned a failure code.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// A command needs a capability that was never negotiated in.
    #[error("capability unavailable: {0}")]
    Capability(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, XrscopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_error_display() {
        let e = XrscopeError::Loader("libopenxr_loader.so.1 not found".into());
        assert_eq!(
            format!("{e}"),
            "loader error: libopenxr_loader.so.1 not found"
        );
    }

    #[test]
    fn runtime_error_display() {
        let e = XrscopeError::Runtime("xrCreateInstance failed".into());
        assert_eq!(format!("{e}"), "runtime error: xrCreateInstance failed");
    }

    #[test]
    fn capability_error_display() {
        let e = XrscopeError::Capability("vive tracker enumeration".into());
        assert_eq!(
            format!("{e}"),
            "capability unavailable: vive tracker enumeration"
        );
    }

    #[test]
    fn command_error_display() {
        let e = XrscopeError::Command("unknown command: bogus".into());
        assert_eq!(format!("{e}"), "command error: unknown command: bogus");
    }

    #[test]
    fn config_error_display() {
        let e = XrscopeError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: XrscopeError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: XrscopeError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn result_alias_ok() {
        let r: Result<i32> = Ok(42);
        assert_eq!(r.unwrap(), 42);
    }
}
