//! OpenXR boundary for XRSCOPE.
//!
//! Everything between the loader shared library and the command loop:
//! the extension catalog, capability negotiation, the instance
//! bootstrap sequence, and the service traits that let every stage run
//! against mocks in tests.

pub mod bootstrap;
pub mod catalog;
pub mod ffi;
pub mod loader;
pub mod negotiate;
pub mod service;
pub mod test_support;

/// The bootstrap sequence and its result.
pub use bootstrap::{RuntimeContext, bootstrap};
/// Snapshot of runtime-supported extensions.
pub use catalog::ExtensionCatalog;
/// The loader-backed entry implementation.
pub use loader::OpenXrEntry;
/// Capability negotiation over the catalog.
pub use negotiate::{NegotiatedSet, negotiate};
/// Service traits over the native boundary.
pub use service::{RuntimeEntry, RuntimeInstance, TrackerPaths, TrackerService};
