//! Capability negotiation: reconcile requested extensions with the catalog.

use xrscope_types::model::ExtensionRequest;

use crate::catalog::ExtensionCatalog;

/// Ordered set of extension names to enable at instance creation.
///
/// Always a subset of the catalog, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegotiatedSet {
    names: Vec<String>,
}

impl NegotiatedSet {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Intersect the request list with the catalog, preserving request order.
///
/// Requests the runtime does not support produce a diagnostic and are
/// skipped; this never fails, and an empty result is a valid (degraded)
/// outcome. Deterministic: the same catalog and request order always
/// produce the same set.
pub fn negotiate(catalog: &ExtensionCatalog, requests: &[ExtensionRequest]) -> NegotiatedSet {
    let mut names = Vec::new();
    for request in requests {
        if catalog.supports(&request.name) {
            names.push(request.name.clone());
        } else if request.required {
            log::error!("extension not supported: {}", request.name);
        } else {
            log::warn!("extension not supported: {}", request.name);
        }
    }
    NegotiatedSet { names }
}
