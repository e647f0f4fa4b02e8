//! Mock runtime implementations for tests.
//!
//! Used by the bootstrap tests here and by the dispatcher tests in
//! `xrscope-shell`, which is why this module is public rather than
//! `#[cfg(test)]`. Nothing in it touches the native boundary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use xrscope_types::config::ApplicationInfo;
use xrscope_types::error::{Result, XrscopeError};
use xrscope_types::model::{DeviceClass, ExtensionDescriptor, RuntimeIdentity, XrVersion};

use crate::service::{RuntimeEntry, RuntimeInstance, TrackerPaths, TrackerService};

/// Mock pre-instance entry with a configurable catalog and instance.
pub struct MockEntry {
    extensions: Vec<ExtensionDescriptor>,
    fail_enumerate: bool,
    fail_create: bool,
    instance: MockInstance,
    created_with: Mutex<Vec<String>>,
}

impl MockEntry {
    pub fn new(extensions: Vec<ExtensionDescriptor>) -> Self {
        Self {
            extensions,
            fail_enumerate: false,
            fail_create: false,
            instance: MockInstance::new(),
            created_with: Mutex::new(Vec::new()),
        }
    }

    /// Make extension enumeration fail.
    pub fn with_enumerate_failure(mut self) -> Self {
        self.fail_enumerate = true;
        self
    }

    /// Make instance creation fail.
    pub fn with_create_failure(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Use a configured instance template for created instances.
    pub fn with_instance(mut self, instance: MockInstance) -> Self {
        self.instance = instance;
        self
    }

    /// The extension names passed to the last `create_instance` call.
    pub fn created_with(&self) -> Vec<String> {
        self.created_with.lock().expect("lock poisoned").clone()
    }
}

impl RuntimeEntry for MockEntry {
    fn enumerate_extensions(&self) -> Result<Vec<ExtensionDescriptor>> {
        if self.fail_enumerate {
            return Err(XrscopeError::Runtime(
                "xrEnumerateInstanceExtensionProperties failed: XR_ERROR_RUNTIME_FAILURE (-2)"
                    .into(),
            ));
        }
        Ok(self.extensions.clone())
    }

    fn create_instance(
        &self,
        _app: &ApplicationInfo,
        enabled_extensions: &[String],
    ) -> Result<Box<dyn RuntimeInstance>> {
        if self.fail_create {
            return Err(XrscopeError::Runtime(
                "xrCreateInstance failed: XR_ERROR_INITIALIZATION_FAILED (-6)".into(),
            ));
        }
        *self.created_with.lock().expect("lock poisoned") = enabled_extensions.to_vec();
        Ok(Box::new(self.instance.clone()))
    }
}

/// Mock instance with configurable per-step behavior.
#[derive(Clone)]
pub struct MockInstance {
    identity: Option<RuntimeIdentity>,
    system_id: Option<u64>,
    system_name: Option<String>,
    tracker_config: Option<TrackerConfig>,
    resolved: Option<MockTrackers>,
    enumerations: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct TrackerConfig {
    paths: Vec<TrackerPaths>,
    fail_enumerate: bool,
}

impl MockInstance {
    /// A healthy instance: identity present, one HMD attached, tracker
    /// extension resolvable with no trackers connected.
    pub fn new() -> Self {
        Self {
            identity: Some(RuntimeIdentity {
                name: "Mock Runtime".to_string(),
                version: XrVersion::new(1, 0, 0),
            }),
            system_id: Some(1),
            system_name: Some("Mock HMD".to_string()),
            tracker_config: Some(TrackerConfig {
                paths: Vec::new(),
                fail_enumerate: false,
            }),
            resolved: None,
            enumerations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the identity query fail.
    pub fn with_identity_failure(mut self) -> Self {
        self.identity = None;
        self
    }

    /// No system of any device class is attached.
    pub fn without_system(mut self) -> Self {
        self.system_id = None;
        self
    }

    /// Make the system properties query fail.
    pub fn with_system_name_failure(mut self) -> Self {
        self.system_name = None;
        self
    }

    /// Make tracker table resolution fail (extension not enabled).
    pub fn without_tracker_extension(mut self) -> Self {
        self.tracker_config = None;
        self
    }

    /// Report the given tracker paths from enumeration.
    pub fn with_tracker_paths(mut self, paths: Vec<TrackerPaths>) -> Self {
        self.tracker_config = Some(TrackerConfig {
            paths,
            fail_enumerate: false,
        });
        self
    }

    /// Resolve the table but fail every enumeration call.
    pub fn with_tracker_enumeration_failure(mut self) -> Self {
        self.tracker_config = Some(TrackerConfig {
            paths: Vec::new(),
            fail_enumerate: true,
        });
        self
    }

    /// How many tracker enumerations ran, across all clones.
    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }
}

impl Default for MockInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeInstance for MockInstance {
    fn runtime_identity(&self) -> Result<RuntimeIdentity> {
        self.identity.clone().ok_or_else(|| {
            XrscopeError::Runtime(
                "xrGetInstanceProperties failed: XR_ERROR_RUNTIME_FAILURE (-2)".into(),
            )
        })
    }

    fn system_id(&self, _device_class: DeviceClass) -> Result<u64> {
        self.system_id.ok_or_else(|| {
            XrscopeError::Runtime(
                "xrGetSystem failed: XR_ERROR_FORM_FACTOR_UNAVAILABLE (-40)".into(),
            )
        })
    }

    fn system_name(&self, _system_id: u64) -> Result<String> {
        self.system_name.clone().ok_or_else(|| {
            XrscopeError::Runtime(
                "xrGetSystemProperties failed: XR_ERROR_RUNTIME_FAILURE (-2)".into(),
            )
        })
    }

    fn resolve_tracker_table(&mut self) -> Result<()> {
        let config = self.tracker_config.clone().ok_or_else(|| {
            XrscopeError::Runtime(
                "xrEnumerateViveTrackerPathsHTCX failed: XR_ERROR_FUNCTION_UNSUPPORTED (-7)".into(),
            )
        })?;
        self.resolved = Some(MockTrackers {
            config,
            enumerations: Arc::clone(&self.enumerations),
        });
        Ok(())
    }

    fn trackers(&self) -> Option<&dyn TrackerService> {
        self.resolved.as_ref().map(|t| t as &dyn TrackerService)
    }

    fn path_to_string(&self, path: u64) -> Result<String> {
        Ok(format!("/mock/path/{path}"))
    }
}

#[derive(Clone)]
struct MockTrackers {
    config: TrackerConfig,
    enumerations: Arc<AtomicUsize>,
}

impl TrackerService for MockTrackers {
    fn enumerate_paths(&self) -> Result<Vec<TrackerPaths>> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_enumerate {
            return Err(XrscopeError::Runtime(
                "xrEnumerateViveTrackerPathsHTCX failed: XR_ERROR_INSTANCE_LOST (-13)".into(),
            ));
        }
        Ok(self.config.paths.clone())
    }
}
