//! Service traits over the native runtime boundary.
//!
//! The catalog, negotiator, bootstrapper, and command loop all talk to
//! the runtime through these seams, so they can be exercised against
//! mock implementations without an OpenXR runtime installed.

use xrscope_types::config::ApplicationInfo;
use xrscope_types::error::Result;
use xrscope_types::model::{DeviceClass, ExtensionDescriptor, RuntimeIdentity};

/// Pre-instance runtime access: extension discovery and instance creation.
pub trait RuntimeEntry {
    /// Enumerate every extension the runtime supports.
    ///
    /// A runtime reporting zero extensions yields an empty vector, not
    /// an error.
    fn enumerate_extensions(&self) -> Result<Vec<ExtensionDescriptor>>;

    /// Create the runtime instance with the given enabled extensions.
    ///
    /// Called at most once per process; the returned instance is the
    /// connection context for every later call.
    fn create_instance(
        &self,
        app: &ApplicationInfo,
        enabled_extensions: &[String],
    ) -> Result<Box<dyn RuntimeInstance>>;
}

/// A live, created runtime instance.
pub trait RuntimeInstance: Send {
    /// Name and version of the runtime behind this instance.
    fn runtime_identity(&self) -> Result<RuntimeIdentity>;

    /// Discover the attached system matching the device class.
    fn system_id(&self, device_class: DeviceClass) -> Result<u64>;

    /// System name for a discovered system id.
    fn system_name(&self, system_id: u64) -> Result<String>;

    /// Resolve the vive tracker extension function table.
    ///
    /// Only meaningful when the tracker extension was negotiated in;
    /// the runtime rejects the resolution otherwise.
    fn resolve_tracker_table(&mut self) -> Result<()>;

    /// Tracker enumeration service, present once the table resolved.
    fn trackers(&self) -> Option<&dyn TrackerService>;

    /// Render a path atom as its string form.
    fn path_to_string(&self, path: u64) -> Result<String>;
}

/// Tracker-path enumeration via `XR_HTCX_vive_tracker_interaction`.
pub trait TrackerService {
    /// Enumerate the paths of all connected vive trackers.
    fn enumerate_paths(&self) -> Result<Vec<TrackerPaths>>;
}

/// Path atoms describing one connected tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerPaths {
    /// Persistent path identifying the tracker across sessions.
    pub persistent: u64,
    /// Role path (e.g. left foot), if the tracker has an assigned role.
    pub role: Option<u64>,
}
