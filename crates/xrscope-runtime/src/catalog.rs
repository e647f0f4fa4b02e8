//! Extension catalog: a snapshot of what the runtime supports.

use std::collections::HashSet;

use xrscope_types::error::Result;
use xrscope_types::model::ExtensionDescriptor;

use crate::service::RuntimeEntry;

/// Snapshot of the extensions a runtime supports, with name lookup.
///
/// Taken once before instance creation and never refreshed.
pub struct ExtensionCatalog {
    descriptors: Vec<ExtensionDescriptor>,
    names: HashSet<String>,
}

impl ExtensionCatalog {
    /// Query the runtime for every supported extension.
    ///
    /// A runtime reporting zero extensions yields an empty catalog.
    pub fn query(entry: &dyn RuntimeEntry) -> Result<Self> {
        let descriptors = entry.enumerate_extensions()?;
        for ext in &descriptors {
            log::info!("instance extension: name={} version={}", ext.name, ext.version);
        }
        Ok(Self::from_descriptors(descriptors))
    }

    /// Build a catalog from already-known descriptors.
    pub fn from_descriptors(descriptors: Vec<ExtensionDescriptor>) -> Self {
        let names = descriptors.iter().map(|d| d.name.clone()).collect();
        Self { descriptors, names }
    }

    /// Whether the runtime supports an extension by name.
    pub fn supports(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Descriptors in the order the runtime reported them.
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockEntry;

    fn descriptor(name: &str) -> ExtensionDescriptor {
        ExtensionDescriptor {
            name: name.to_string(),
            version: 1,
        }
    }

    #[test]
    fn query_snapshots_all_descriptors() {
        let entry = MockEntry::new(vec![
            descriptor("XR_KHR_composition_layer_depth"),
            descriptor("XR_HTCX_vive_tracker_interaction"),
        ]);
        let catalog = ExtensionCatalog::query(&entry).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.supports("XR_HTCX_vive_tracker_interaction"));
        assert!(!catalog.supports("XR_MND_headless"));
    }

    #[test]
    fn zero_extensions_is_an_empty_catalog_not_an_error() {
        let entry = MockEntry::new(Vec::new());
        let catalog = ExtensionCatalog::query(&entry).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn iteration_preserves_runtime_order() {
        let catalog = ExtensionCatalog::from_descriptors(vec![
            descriptor("XR_B"),
            descriptor("XR_A"),
        ]);
        let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["XR_B", "XR_A"]);
    }
}
