//! OpenXR loader-backed implementation of the runtime service traits.
//!
//! Opens the loader shared library with `libloading`, resolves
//! `xrGetInstanceProcAddr`, and obtains everything else through it --
//! pre-instance calls against the null handle, instance calls against
//! the created instance. All unsafe code in XRSCOPE lives here and in
//! [`crate::ffi`].

use std::ffi::{CString, c_char};
use std::path::Path;
use std::ptr;
use std::sync::Arc;

use libloading::Library;

use xrscope_types::config::ApplicationInfo;
use xrscope_types::error::{Result, XrscopeError};
use xrscope_types::model::{DeviceClass, ExtensionDescriptor, RuntimeIdentity, XrVersion};

use crate::ffi;
use crate::service::{RuntimeEntry, RuntimeInstance, TrackerPaths, TrackerService};

/// Platform-default loader library name.
#[cfg(target_os = "windows")]
const DEFAULT_LOADER: &str = "openxr_loader.dll";
#[cfg(target_os = "macos")]
const DEFAULT_LOADER: &str = "libopenxr_loader.dylib";
#[cfg(all(unix, not(target_os = "macos")))]
const DEFAULT_LOADER: &str = "libopenxr_loader.so.1";

/// The opened loader library with the pre-instance entry points resolved.
#[derive(Debug)]
pub struct OpenXrEntry {
    library: Arc<Library>,
    get_instance_proc_addr: ffi::PfnGetInstanceProcAddr,
    enumerate_instance_extension_properties: ffi::PfnEnumerateInstanceExtensionProperties,
    create_instance: ffi::PfnCreateInstance,
}

impl OpenXrEntry {
    /// Open the OpenXR loader and resolve the pre-instance entry points.
    ///
    /// `path` overrides the platform-default loader library name.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let name = path
            .map(|p| p.as_os_str().to_os_string())
            .unwrap_or_else(|| DEFAULT_LOADER.into());
        log::debug!("opening OpenXR loader {name:?}");
        let library = unsafe { Library::new(&name) }
            .map_err(|e| XrscopeError::Loader(format!("cannot open {name:?}: {e}")))?;
        let library = Arc::new(library);

        let get_instance_proc_addr = unsafe {
            let symbol: libloading::Symbol<'_, ffi::PfnGetInstanceProcAddr> =
                library.get(b"xrGetInstanceProcAddr\0").map_err(|e| {
                    XrscopeError::Loader(format!("loader has no xrGetInstanceProcAddr: {e}"))
                })?;
            *symbol
        };

        // Pre-instance functions resolve against the null handle.
        let enumerate_instance_extension_properties = unsafe {
            std::mem::transmute::<ffi::PfnVoidFunction, ffi::PfnEnumerateInstanceExtensionProperties>(
                resolve_proc(
                    get_instance_proc_addr,
                    ffi::XR_NULL_HANDLE,
                    "xrEnumerateInstanceExtensionProperties",
                )?,
            )
        };
        let create_instance = unsafe {
            std::mem::transmute::<ffi::PfnVoidFunction, ffi::PfnCreateInstance>(resolve_proc(
                get_instance_proc_addr,
                ffi::XR_NULL_HANDLE,
                "xrCreateInstance",
            )?)
        };

        Ok(Self {
            library,
            get_instance_proc_addr,
            enumerate_instance_extension_properties,
            create_instance,
        })
    }
}

impl RuntimeEntry for OpenXrEntry {
    fn enumerate_extensions(&self) -> Result<Vec<ExtensionDescriptor>> {
        // Two-step query: count first, then a buffer sized to the count.
        let mut count = 0u32;
        let result = unsafe {
            (self.enumerate_instance_extension_properties)(
                ptr::null(),
                0,
                &mut count,
                ptr::null_mut(),
            )
        };
        check("xrEnumerateInstanceExtensionProperties", result)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut properties = vec![ffi::XrExtensionProperties::out_struct(); count as usize];
        let mut filled = count;
        let result = unsafe {
            (self.enumerate_instance_extension_properties)(
                ptr::null(),
                count,
                &mut filled,
                properties.as_mut_ptr(),
            )
        };
        check("xrEnumerateInstanceExtensionProperties", result)?;

        // Trust the reported length, never the allocation.
        let filled = filled.min(count) as usize;
        Ok(properties[..filled]
            .iter()
            .map(|p| ExtensionDescriptor {
                name: ffi::decode_fixed_str(&p.extension_name),
                version: p.extension_version,
            })
            .collect())
    }

    fn create_instance(
        &self,
        app: &ApplicationInfo,
        enabled_extensions: &[String],
    ) -> Result<Box<dyn RuntimeInstance>> {
        let mut info = ffi::XrInstanceCreateInfo::new();
        ffi::encode_fixed_str(&app.name, &mut info.application_info.application_name);
        info.application_info.application_version = app.version;
        ffi::encode_fixed_str(&app.engine_name, &mut info.application_info.engine_name);
        info.application_info.engine_version = app.engine_version;
        info.application_info.api_version = ffi::XR_CURRENT_API_VERSION;

        // Transient NUL-terminated copies of the extension names; the
        // CString storage drops when this call returns, on every path.
        let storage: Vec<CString> = enabled_extensions
            .iter()
            .map(|name| {
                CString::new(name.as_str()).map_err(|_| {
                    XrscopeError::Config(format!("extension name contains NUL: {name:?}"))
                })
            })
            .collect::<Result<_>>()?;
        let pointers: Vec<*const c_char> = storage.iter().map(|s| s.as_ptr()).collect();
        info.enabled_extension_count = pointers.len() as u32;
        info.enabled_extension_names = if pointers.is_empty() {
            ptr::null()
        } else {
            pointers.as_ptr()
        };

        let mut handle = ffi::XR_NULL_HANDLE;
        let result = unsafe { (self.create_instance)(&info, &mut handle) };
        check("xrCreateInstance", result)?;
        if handle == ffi::XR_NULL_HANDLE {
            return Err(XrscopeError::Runtime(
                "xrCreateInstance returned a null instance".into(),
            ));
        }

        let instance = OpenXrInstance::new(
            Arc::clone(&self.library),
            self.get_instance_proc_addr,
            handle,
        )?;
        Ok(Box::new(instance))
    }
}

/// A created instance with its core function pointers.
///
/// Destroys the instance on drop; there is exactly one per process.
pub struct OpenXrInstance {
    // Keeps the loader mapped for as long as any function pointer lives.
    _library: Arc<Library>,
    handle: ffi::XrInstance,
    get_instance_proc_addr: ffi::PfnGetInstanceProcAddr,
    destroy_instance: ffi::PfnDestroyInstance,
    get_instance_properties: ffi::PfnGetInstanceProperties,
    get_system: ffi::PfnGetSystem,
    get_system_properties: ffi::PfnGetSystemProperties,
    path_to_string: ffi::PfnPathToString,
    trackers: Option<ViveTrackerTable>,
}

impl OpenXrInstance {
    fn new(
        library: Arc<Library>,
        get_instance_proc_addr: ffi::PfnGetInstanceProcAddr,
        handle: ffi::XrInstance,
    ) -> Result<Self> {
        // Resolve the destructor first so every later failure path can
        // still tear the instance down.
        let destroy_instance = unsafe {
            std::mem::transmute::<ffi::PfnVoidFunction, ffi::PfnDestroyInstance>(resolve_proc(
                get_instance_proc_addr,
                handle,
                "xrDestroyInstance",
            )?)
        };

        let core = (|| -> Result<_> {
            let get_instance_properties = unsafe {
                std::mem::transmute::<ffi::PfnVoidFunction, ffi::PfnGetInstanceProperties>(
                    resolve_proc(get_instance_proc_addr, handle, "xrGetInstanceProperties")?,
                )
            };
            let get_system = unsafe {
                std::mem::transmute::<ffi::PfnVoidFunction, ffi::PfnGetSystem>(resolve_proc(
                    get_instance_proc_addr,
                    handle,
                    "xrGetSystem",
                )?)
            };
            let get_system_properties = unsafe {
                std::mem::transmute::<ffi::PfnVoidFunction, ffi::PfnGetSystemProperties>(
                    resolve_proc(get_instance_proc_addr, handle, "xrGetSystemProperties")?,
                )
            };
            let path_to_string = unsafe {
                std::mem::transmute::<ffi::PfnVoidFunction, ffi::PfnPathToString>(resolve_proc(
                    get_instance_proc_addr,
                    handle,
                    "xrPathToString",
                )?)
            };
            Ok((
                get_instance_properties,
                get_system,
                get_system_properties,
                path_to_string,
            ))
        })();

        let (get_instance_properties, get_system, get_system_properties, path_to_string) =
            match core {
                Ok(core) => core,
                Err(e) => {
                    let result = unsafe { destroy_instance(handle) };
                    if result != ffi::XR_SUCCESS {
                        log::warn!(
                            "xrDestroyInstance failed during teardown: {}",
                            ffi::result_name(result)
                        );
                    }
                    return Err(e);
                }
            };

        Ok(Self {
            _library: library,
            handle,
            get_instance_proc_addr,
            destroy_instance,
            get_instance_properties,
            get_system,
            get_system_properties,
            path_to_string,
            trackers: None,
        })
    }
}

impl RuntimeInstance for OpenXrInstance {
    fn runtime_identity(&self) -> Result<RuntimeIdentity> {
        let mut properties = ffi::XrInstanceProperties::out_struct();
        let result = unsafe { (self.get_instance_properties)(self.handle, &mut properties) };
        check("xrGetInstanceProperties", result)?;
        Ok(RuntimeIdentity {
            name: ffi::decode_fixed_str(&properties.runtime_name),
            version: XrVersion(properties.runtime_version),
        })
    }

    fn system_id(&self, device_class: DeviceClass) -> Result<u64> {
        let get_info = ffi::XrSystemGetInfo {
            ty: ffi::XR_TYPE_SYSTEM_GET_INFO,
            next: ptr::null(),
            form_factor: form_factor(device_class),
        };
        let mut system_id = ffi::XR_NULL_SYSTEM_ID;
        let result = unsafe { (self.get_system)(self.handle, &get_info, &mut system_id) };
        check("xrGetSystem", result)?;
        Ok(system_id)
    }

    fn system_name(&self, system_id: u64) -> Result<String> {
        let mut properties = ffi::XrSystemProperties::out_struct();
        let result =
            unsafe { (self.get_system_properties)(self.handle, system_id, &mut properties) };
        check("xrGetSystemProperties", result)?;
        Ok(ffi::decode_fixed_str(&properties.system_name))
    }

    fn resolve_tracker_table(&mut self) -> Result<()> {
        let enumerate = unsafe {
            std::mem::transmute::<ffi::PfnVoidFunction, ffi::PfnEnumerateViveTrackerPathsHTCX>(
                resolve_proc(
                    self.get_instance_proc_addr,
                    self.handle,
                    "xrEnumerateViveTrackerPathsHTCX",
                )?,
            )
        };
        self.trackers = Some(ViveTrackerTable {
            instance: self.handle,
            enumerate_vive_tracker_paths: enumerate,
        });
        Ok(())
    }

    fn trackers(&self) -> Option<&dyn TrackerService> {
        self.trackers.as_ref().map(|t| t as &dyn TrackerService)
    }

    fn path_to_string(&self, path: u64) -> Result<String> {
        // Two-call sizing: the first call reports the required capacity
        // including the NUL terminator.
        let mut count = 0u32;
        let result =
            unsafe { (self.path_to_string)(self.handle, path, 0, &mut count, ptr::null_mut()) };
        check("xrPathToString", result)?;
        if count == 0 {
            return Ok(String::new());
        }

        let mut buffer = vec![0 as c_char; count as usize];
        let mut filled = count;
        let result = unsafe {
            (self.path_to_string)(
                self.handle,
                path,
                count,
                &mut filled,
                buffer.as_mut_ptr(),
            )
        };
        check("xrPathToString", result)?;
        let filled = filled.min(count) as usize;
        Ok(ffi::decode_fixed_str(&buffer[..filled]))
    }
}

impl Drop for OpenXrInstance {
    fn drop(&mut self) {
        let result = unsafe { (self.destroy_instance)(self.handle) };
        if result != ffi::XR_SUCCESS {
            log::warn!("xrDestroyInstance failed: {}", ffi::result_name(result));
        }
    }
}

/// Resolved `XR_HTCX_vive_tracker_interaction` function table.
struct ViveTrackerTable {
    instance: ffi::XrInstance,
    enumerate_vive_tracker_paths: ffi::PfnEnumerateViveTrackerPathsHTCX,
}

impl TrackerService for ViveTrackerTable {
    fn enumerate_paths(&self) -> Result<Vec<TrackerPaths>> {
        // Two-call sizing pattern: ask for the count, then fill a
        // buffer of that capacity.
        let mut count = 0u32;
        let result = unsafe {
            (self.enumerate_vive_tracker_paths)(self.instance, 0, &mut count, ptr::null_mut())
        };
        check("xrEnumerateViveTrackerPathsHTCX", result)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut paths = vec![ffi::XrViveTrackerPathsHTCX::out_struct(); count as usize];
        let mut filled = count;
        let result = unsafe {
            (self.enumerate_vive_tracker_paths)(
                self.instance,
                count,
                &mut filled,
                paths.as_mut_ptr(),
            )
        };
        check("xrEnumerateViveTrackerPathsHTCX", result)?;

        let filled = filled.min(count) as usize;
        Ok(paths[..filled]
            .iter()
            .map(|p| TrackerPaths {
                persistent: p.persistent_path,
                role: (p.role_path != ffi::XR_NULL_PATH).then_some(p.role_path),
            })
            .collect())
    }
}

/// Resolve one function through `xrGetInstanceProcAddr`.
fn resolve_proc(
    get_instance_proc_addr: ffi::PfnGetInstanceProcAddr,
    instance: ffi::XrInstance,
    name: &'static str,
) -> Result<ffi::PfnVoidFunction> {
    let cname = CString::new(name)
        .map_err(|_| XrscopeError::Loader(format!("function name contains NUL: {name}")))?;
    let mut function: Option<ffi::PfnVoidFunction> = None;
    let result =
        unsafe { (get_instance_proc_addr)(instance, cname.as_ptr(), &mut function) };
    check(name, result)?;
    function.ok_or_else(|| XrscopeError::Loader(format!("{name} resolved to null")))
}

/// Map a non-success result to a runtime error.
fn check(call: &'static str, result: ffi::XrResult) -> Result<()> {
    if result == ffi::XR_SUCCESS {
        Ok(())
    } else {
        Err(XrscopeError::Runtime(format!(
            "{call} failed: {} ({result})",
            ffi::result_name(result)
        )))
    }
}

/// Native form-factor code for a device class.
fn form_factor(device_class: DeviceClass) -> ffi::XrFormFactor {
    match device_class {
        DeviceClass::HeadMountedDisplay => ffi::XR_FORM_FACTOR_HEAD_MOUNTED_DISPLAY,
        DeviceClass::Handheld => ffi::XR_FORM_FACTOR_HANDHELD_DISPLAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_maps_success() {
        assert!(check("xrGetSystem", ffi::XR_SUCCESS).is_ok());
    }

    #[test]
    fn check_maps_failure_with_symbolic_name() {
        let err = check("xrGetSystem", ffi::XR_ERROR_FORM_FACTOR_UNAVAILABLE).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("xrGetSystem"));
        assert!(msg.contains("XR_ERROR_FORM_FACTOR_UNAVAILABLE"));
    }

    #[test]
    fn form_factor_codes() {
        assert_eq!(
            form_factor(DeviceClass::HeadMountedDisplay),
            ffi::XR_FORM_FACTOR_HEAD_MOUNTED_DISPLAY
        );
        assert_eq!(
            form_factor(DeviceClass::Handheld),
            ffi::XR_FORM_FACTOR_HANDHELD_DISPLAY
        );
    }

    #[test]
    fn open_with_missing_library_is_a_loader_error() {
        let err = OpenXrEntry::open(Some(Path::new("/nonexistent/libopenxr_loader.so.1")))
            .unwrap_err();
        assert!(matches!(err, XrscopeError::Loader(_)));
    }
}
