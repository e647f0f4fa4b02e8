//! Instance bootstrap: the ordered create / identify / discover sequence.

use xrscope_types::config::ApplicationInfo;
use xrscope_types::error::Result;
use xrscope_types::model::{DeviceClass, RuntimeIdentity, SystemIdentity, VIVE_TRACKER_EXTENSION};

use crate::negotiate::NegotiatedSet;
use crate::service::{RuntimeEntry, RuntimeInstance};

/// Everything the command loop needs from a bootstrapped runtime.
///
/// Constructed once, before the worker thread starts, and never mutated
/// afterwards; commands only read from it.
pub struct RuntimeContext {
    pub instance: Box<dyn RuntimeInstance>,
    /// Runtime identity, when the diagnostic query succeeded.
    pub identity: Option<RuntimeIdentity>,
    pub system: SystemIdentity,
    pub negotiated: NegotiatedSet,
}

/// Run the bootstrap sequence against a runtime entry.
///
/// Instance creation and system discovery failures are fatal; identity
/// and property queries degrade with a diagnostic. Steps run in a fixed
/// order because each depends on the handles of the one before it.
pub fn bootstrap(
    entry: &dyn RuntimeEntry,
    app: &ApplicationInfo,
    negotiated: NegotiatedSet,
    device_class: DeviceClass,
) -> Result<RuntimeContext> {
    // 1. Create the instance. The runtime rejecting creation is fatal.
    log::info!(
        "creating instance: app={} extensions={:?}",
        app.name,
        negotiated.names(),
    );
    let mut instance = entry.create_instance(app, negotiated.names())?;

    // 2. Runtime identity is diagnostic context only.
    let identity = match instance.runtime_identity() {
        Ok(identity) => {
            log::info!("runtime: name={} version={}", identity.name, identity.version);
            Some(identity)
        }
        Err(e) => {
            log::warn!("runtime identity query failed: {e}");
            None
        }
    };

    // 3. Nothing downstream works without an attached system: fatal.
    let system_id = instance.system_id(device_class)?;
    log::info!("system: id={system_id}");

    // 4. The system name degrades to empty on failure.
    let system_name = match instance.system_name(system_id) {
        Ok(name) => {
            log::info!("system: name={name}");
            name
        }
        Err(e) => {
            log::warn!("system properties query failed: {e}");
            String::new()
        }
    };

    // 5. Extension tables resolve only after the instance exists. A
    //    failed resolution degrades the matching command, not startup.
    if negotiated.contains(VIVE_TRACKER_EXTENSION) {
        match instance.resolve_tracker_table() {
            Ok(()) => log::debug!("resolved {VIVE_TRACKER_EXTENSION} function table"),
            Err(e) => log::warn!("tracker table resolution failed: {e}"),
        }
    }

    Ok(RuntimeContext {
        instance,
        identity,
        system: SystemIdentity {
            id: system_id,
            name: system_name,
            device_class,
        },
        negotiated,
    })
}
