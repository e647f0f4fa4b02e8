//! Raw OpenXR types for the loader boundary.
//!
//! Hand-written subset of the OpenXR 1.0 C API: only the types,
//! constants, and function-pointer signatures the harness actually
//! calls. Handles and atoms are 64-bit integers; strings cross the
//! boundary in fixed-capacity `char` arrays as NUL-terminated UTF-8.

use std::ffi::{c_char, c_void};

pub type XrResult = i32;
pub type XrStructureType = i32;
pub type XrFormFactor = i32;
pub type XrBool32 = u32;
pub type XrVersion = u64;
pub type XrInstance = u64;
pub type XrSystemId = u64;
pub type XrPath = u64;

pub const XR_NULL_HANDLE: XrInstance = 0;
pub const XR_NULL_SYSTEM_ID: XrSystemId = 0;
pub const XR_NULL_PATH: XrPath = 0;

// Result codes.
pub const XR_SUCCESS: XrResult = 0;
pub const XR_ERROR_VALIDATION_FAILURE: XrResult = -1;
pub const XR_ERROR_RUNTIME_FAILURE: XrResult = -2;
pub const XR_ERROR_OUT_OF_MEMORY: XrResult = -3;
pub const XR_ERROR_API_VERSION_UNSUPPORTED: XrResult = -4;
pub const XR_ERROR_INITIALIZATION_FAILED: XrResult = -6;
pub const XR_ERROR_FUNCTION_UNSUPPORTED: XrResult = -7;
pub const XR_ERROR_FEATURE_UNSUPPORTED: XrResult = -8;
pub const XR_ERROR_EXTENSION_NOT_PRESENT: XrResult = -9;
pub const XR_ERROR_LIMIT_REACHED: XrResult = -10;
pub const XR_ERROR_SIZE_INSUFFICIENT: XrResult = -11;
pub const XR_ERROR_HANDLE_INVALID: XrResult = -12;
pub const XR_ERROR_INSTANCE_LOST: XrResult = -13;
pub const XR_ERROR_SYSTEM_INVALID: XrResult = -18;
pub const XR_ERROR_PATH_INVALID: XrResult = -19;
pub const XR_ERROR_FORM_FACTOR_UNSUPPORTED: XrResult = -38;
pub const XR_ERROR_FORM_FACTOR_UNAVAILABLE: XrResult = -40;
pub const XR_ERROR_RUNTIME_UNAVAILABLE: XrResult = -51;

// Structure type tags.
pub const XR_TYPE_EXTENSION_PROPERTIES: XrStructureType = 2;
pub const XR_TYPE_INSTANCE_CREATE_INFO: XrStructureType = 3;
pub const XR_TYPE_SYSTEM_GET_INFO: XrStructureType = 4;
pub const XR_TYPE_SYSTEM_PROPERTIES: XrStructureType = 5;
pub const XR_TYPE_INSTANCE_PROPERTIES: XrStructureType = 32;
pub const XR_TYPE_VIVE_TRACKER_PATHS_HTCX: XrStructureType = 1000103000;

// Fixed buffer capacities.
pub const XR_MAX_APPLICATION_NAME_SIZE: usize = 128;
pub const XR_MAX_ENGINE_NAME_SIZE: usize = 128;
pub const XR_MAX_RUNTIME_NAME_SIZE: usize = 128;
pub const XR_MAX_EXTENSION_NAME_SIZE: usize = 128;
pub const XR_MAX_SYSTEM_NAME_SIZE: usize = 256;

// Form factors.
pub const XR_FORM_FACTOR_HEAD_MOUNTED_DISPLAY: XrFormFactor = 1;
pub const XR_FORM_FACTOR_HANDHELD_DISPLAY: XrFormFactor = 2;

/// Pack an API version the way `XR_MAKE_VERSION` does.
pub const fn xr_make_version(major: u16, minor: u16, patch: u32) -> XrVersion {
    ((major as u64) << 48) | ((minor as u64) << 32) | patch as u64
}

/// API version requested at instance creation.
pub const XR_CURRENT_API_VERSION: XrVersion = xr_make_version(1, 0, 34);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrApplicationInfo {
    pub application_name: [c_char; XR_MAX_APPLICATION_NAME_SIZE],
    pub application_version: u32,
    pub engine_name: [c_char; XR_MAX_ENGINE_NAME_SIZE],
    pub engine_version: u32,
    pub api_version: XrVersion,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrInstanceCreateInfo {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub create_flags: u64,
    pub application_info: XrApplicationInfo,
    pub enabled_api_layer_count: u32,
    pub enabled_api_layer_names: *const *const c_char,
    pub enabled_extension_count: u32,
    pub enabled_extension_names: *const *const c_char,
}

impl XrInstanceCreateInfo {
    /// Zero-initialized with the structure type tag set.
    pub fn new() -> Self {
        let mut info: Self = unsafe { std::mem::zeroed() };
        info.ty = XR_TYPE_INSTANCE_CREATE_INFO;
        info
    }
}

impl Default for XrInstanceCreateInfo {
    fn default() -> Self {
        Self::new()
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrExtensionProperties {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub extension_name: [c_char; XR_MAX_EXTENSION_NAME_SIZE],
    pub extension_version: u32,
}

impl XrExtensionProperties {
    /// Zero-initialized output struct, ready for the runtime to fill.
    pub fn out_struct() -> Self {
        let mut props: Self = unsafe { std::mem::zeroed() };
        props.ty = XR_TYPE_EXTENSION_PROPERTIES;
        props
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrInstanceProperties {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub runtime_version: XrVersion,
    pub runtime_name: [c_char; XR_MAX_RUNTIME_NAME_SIZE],
}

impl XrInstanceProperties {
    pub fn out_struct() -> Self {
        let mut props: Self = unsafe { std::mem::zeroed() };
        props.ty = XR_TYPE_INSTANCE_PROPERTIES;
        props
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrSystemGetInfo {
    pub ty: XrStructureType,
    pub next: *const c_void,
    pub form_factor: XrFormFactor,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrSystemGraphicsProperties {
    pub max_swapchain_image_height: u32,
    pub max_swapchain_image_width: u32,
    pub max_layer_count: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrSystemTrackingProperties {
    pub orientation_tracking: XrBool32,
    pub position_tracking: XrBool32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrSystemProperties {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub system_id: XrSystemId,
    pub vendor_id: u32,
    pub system_name: [c_char; XR_MAX_SYSTEM_NAME_SIZE],
    pub graphics_properties: XrSystemGraphicsProperties,
    pub tracking_properties: XrSystemTrackingProperties,
}

impl XrSystemProperties {
    pub fn out_struct() -> Self {
        let mut props: Self = unsafe { std::mem::zeroed() };
        props.ty = XR_TYPE_SYSTEM_PROPERTIES;
        props
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct XrViveTrackerPathsHTCX {
    pub ty: XrStructureType,
    pub next: *mut c_void,
    pub persistent_path: XrPath,
    pub role_path: XrPath,
}

impl XrViveTrackerPathsHTCX {
    pub fn out_struct() -> Self {
        let mut paths: Self = unsafe { std::mem::zeroed() };
        paths.ty = XR_TYPE_VIVE_TRACKER_PATHS_HTCX;
        paths
    }
}

// Function-pointer signatures, resolved through xrGetInstanceProcAddr.

pub type PfnVoidFunction = unsafe extern "system" fn();

pub type PfnGetInstanceProcAddr = unsafe extern "system" fn(
    instance: XrInstance,
    name: *const c_char,
    function: *mut Option<PfnVoidFunction>,
) -> XrResult;

pub type PfnEnumerateInstanceExtensionProperties = unsafe extern "system" fn(
    layer_name: *const c_char,
    property_capacity_input: u32,
    property_count_output: *mut u32,
    properties: *mut XrExtensionProperties,
) -> XrResult;

pub type PfnCreateInstance = unsafe extern "system" fn(
    create_info: *const XrInstanceCreateInfo,
    instance: *mut XrInstance,
) -> XrResult;

pub type PfnDestroyInstance = unsafe extern "system" fn(instance: XrInstance) -> XrResult;

pub type PfnGetInstanceProperties = unsafe extern "system" fn(
    instance: XrInstance,
    instance_properties: *mut XrInstanceProperties,
) -> XrResult;

pub type PfnGetSystem = unsafe extern "system" fn(
    instance: XrInstance,
    get_info: *const XrSystemGetInfo,
    system_id: *mut XrSystemId,
) -> XrResult;

pub type PfnGetSystemProperties = unsafe extern "system" fn(
    instance: XrInstance,
    system_id: XrSystemId,
    properties: *mut XrSystemProperties,
) -> XrResult;

pub type PfnPathToString = unsafe extern "system" fn(
    instance: XrInstance,
    path: XrPath,
    buffer_capacity_input: u32,
    buffer_count_output: *mut u32,
    buffer: *mut c_char,
) -> XrResult;

pub type PfnEnumerateViveTrackerPathsHTCX = unsafe extern "system" fn(
    instance: XrInstance,
    paths_capacity_input: u32,
    paths_count_output: *mut u32,
    paths: *mut XrViveTrackerPathsHTCX,
) -> XrResult;

/// Symbolic name for a result code, for diagnostics.
pub fn result_name(result: XrResult) -> &'static str {
    match result {
        XR_SUCCESS => "XR_SUCCESS",
        XR_ERROR_VALIDATION_FAILURE => "XR_ERROR_VALIDATION_FAILURE",
        XR_ERROR_RUNTIME_FAILURE => "XR_ERROR_RUNTIME_FAILURE",
        XR_ERROR_OUT_OF_MEMORY => "XR_ERROR_OUT_OF_MEMORY",
        XR_ERROR_API_VERSION_UNSUPPORTED => "XR_ERROR_API_VERSION_UNSUPPORTED",
        XR_ERROR_INITIALIZATION_FAILED => "XR_ERROR_INITIALIZATION_FAILED",
        XR_ERROR_FUNCTION_UNSUPPORTED => "XR_ERROR_FUNCTION_UNSUPPORTED",
        XR_ERROR_FEATURE_UNSUPPORTED => "XR_ERROR_FEATURE_UNSUPPORTED",
        XR_ERROR_EXTENSION_NOT_PRESENT => "XR_ERROR_EXTENSION_NOT_PRESENT",
        XR_ERROR_LIMIT_REACHED => "XR_ERROR_LIMIT_REACHED",
        XR_ERROR_SIZE_INSUFFICIENT => "XR_ERROR_SIZE_INSUFFICIENT",
        XR_ERROR_HANDLE_INVALID => "XR_ERROR_HANDLE_INVALID",
        XR_ERROR_INSTANCE_LOST => "XR_ERROR_INSTANCE_LOST",
        XR_ERROR_SYSTEM_INVALID => "XR_ERROR_SYSTEM_INVALID",
        XR_ERROR_PATH_INVALID => "XR_ERROR_PATH_INVALID",
        XR_ERROR_FORM_FACTOR_UNSUPPORTED => "XR_ERROR_FORM_FACTOR_UNSUPPORTED",
        XR_ERROR_FORM_FACTOR_UNAVAILABLE => "XR_ERROR_FORM_FACTOR_UNAVAILABLE",
        XR_ERROR_RUNTIME_UNAVAILABLE => "XR_ERROR_RUNTIME_UNAVAILABLE",
        _ => "XR_ERROR_UNKNOWN",
    }
}

/// Decode a NUL-terminated UTF-8 string from a fixed-capacity native
/// buffer. Stops at the first NUL; a buffer with no NUL decodes in full
/// but never past its capacity. Invalid UTF-8 decodes lossily.
pub fn decode_fixed_str(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Encode a UTF-8 string into a fixed-capacity native buffer,
/// truncating on a char boundary to capacity - 1 and NUL-terminating.
pub fn encode_fixed_str(src: &str, dst: &mut [c_char]) {
    let max = dst.len().saturating_sub(1);
    let mut end = src.len().min(max);
    while end > 0 && !src.is_char_boundary(end) {
        end -= 1;
    }
    for (slot, byte) in dst.iter_mut().zip(src.as_bytes()[..end].iter()) {
        *slot = *byte as c_char;
    }
    if !dst.is_empty() {
        dst[end] = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_stops_at_nul() {
        let mut buf = [0 as c_char; 16];
        for (i, b) in b"monado".iter().enumerate() {
            buf[i] = *b as c_char;
        }
        buf[10] = b'x' as c_char; // garbage past the terminator
        assert_eq!(decode_fixed_str(&buf), "monado");
    }

    #[test]
    fn decode_without_nul_reads_whole_buffer_only() {
        let buf = [b'a' as c_char; 8];
        assert_eq!(decode_fixed_str(&buf), "aaaaaaaa");
    }

    #[test]
    fn decode_invalid_utf8_is_lossy() {
        let mut buf = [0 as c_char; 4];
        buf[0] = b'a' as c_char;
        buf[1] = 0xFFu8 as c_char;
        let decoded = decode_fixed_str(&buf);
        assert!(decoded.starts_with('a'));
        assert_eq!(decoded.chars().count(), 2);
    }

    #[test]
    fn encode_round_trips() {
        let mut buf = [0x7F as c_char; 32];
        encode_fixed_str("SteamVR/OpenXR", &mut buf);
        assert_eq!(decode_fixed_str(&buf), "SteamVR/OpenXR");
    }

    #[test]
    fn encode_truncates_to_capacity_minus_one() {
        let mut buf = [0 as c_char; 4];
        encode_fixed_str("abcdef", &mut buf);
        assert_eq!(decode_fixed_str(&buf), "abc");
        assert_eq!(buf[3], 0);
    }

    #[test]
    fn encode_truncates_on_char_boundary() {
        // "é" is two bytes; capacity 3 leaves room for 2 payload bytes,
        // but splitting the char would leave invalid UTF-8.
        let mut buf = [0 as c_char; 3];
        encode_fixed_str("aé", &mut buf);
        assert_eq!(decode_fixed_str(&buf), "a");
    }

    #[test]
    fn encode_empty_buffer_is_a_no_op() {
        let mut buf: [c_char; 0] = [];
        encode_fixed_str("abc", &mut buf);
    }

    #[test]
    fn version_packing_matches_spec() {
        assert_eq!(xr_make_version(1, 0, 0), 1u64 << 48);
        assert_eq!(xr_make_version(1, 0, 34) & 0xFFFF_FFFF, 34);
    }

    #[test]
    fn result_names() {
        assert_eq!(result_name(XR_SUCCESS), "XR_SUCCESS");
        assert_eq!(
            result_name(XR_ERROR_FORM_FACTOR_UNAVAILABLE),
            "XR_ERROR_FORM_FACTOR_UNAVAILABLE"
        );
        assert_eq!(result_name(-9999), "XR_ERROR_UNKNOWN");
    }

    #[test]
    fn out_structs_carry_type_tags() {
        assert_eq!(
            XrExtensionProperties::out_struct().ty,
            XR_TYPE_EXTENSION_PROPERTIES
        );
        assert_eq!(
            XrSystemProperties::out_struct().ty,
            XR_TYPE_SYSTEM_PROPERTIES
        );
        assert_eq!(
            XrViveTrackerPathsHTCX::out_struct().ty,
            XR_TYPE_VIVE_TRACKER_PATHS_HTCX
        );
    }
}
