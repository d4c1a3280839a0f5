//! Process-wide bridge
//!
//! The host starts the bridge once, hands the export table to its managed
//! runtime, and shuts it down on unload. Starting applies the config:
//! logger installation and per-call tracing.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::exports::{ExportTable, RegisterExportFn};
use crate::ffi;
use parking_lot::RwLock;
use std::ffi::{c_char, c_void, CStr};
use std::path::Path;

static BRIDGE: RwLock<Option<Bridge>> = parking_lot::const_rwlock(None);

/// Live bridge state
#[derive(Debug)]
pub struct Bridge {
    config: BridgeConfig,
    exports: ExportTable,
}

impl Bridge {
    /// Create a bridge with the full export table
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            exports: ExportTable::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Export table
    pub fn exports(&self) -> &ExportTable {
        &self.exports
    }
}

/// Start the process-wide bridge
pub fn init(config: BridgeConfig) -> Result<()> {
    let mut bridge = BRIDGE.write();
    if bridge.is_some() {
        log::warn!("Property bridge init called twice");
        return Err(BridgeError::AlreadyInitialized);
    }

    config.install_logger();
    ffi::set_trace_calls(config.trace_calls);

    let created = Bridge::new(config);
    log::info!(
        "Property bridge initialized ({} exports, tracing {})",
        created.exports.len(),
        if created.config.trace_calls { "on" } else { "off" }
    );
    *bridge = Some(created);
    Ok(())
}

/// Stop the bridge; returns false if it was not running
pub fn shutdown() -> bool {
    if BRIDGE.write().take().is_none() {
        return false;
    }
    ffi::set_trace_calls(false);
    log::info!("Property bridge shut down");
    true
}

/// Check if the bridge is running
pub fn is_initialized() -> bool {
    BRIDGE.read().is_some()
}

/// Run `f` against the live bridge
pub fn with_bridge<R>(f: impl FnOnce(&Bridge) -> R) -> Result<R> {
    BRIDGE.read().as_ref().map(f).ok_or(BridgeError::NotInitialized)
}

/// Address of the export called `name`
pub fn get_export(name: &str) -> Result<Option<*const c_void>> {
    with_bridge(|bridge| bridge.exports.get(name))
}

/// Start the bridge, loading config from `config_path` if it is not null
///
/// Returns 0 on success or a [`BridgeError::status`] code.
///
/// # Safety
/// `config_path` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn void_bridge_init(config_path: *const c_char) -> i32 {
    let result = load_config(config_path).and_then(init);
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::error!("Property bridge init failed: {}", err);
            err.status()
        }
    }
}

unsafe fn load_config(config_path: *const c_char) -> Result<BridgeConfig> {
    if config_path.is_null() {
        return BridgeConfig::load(None);
    }
    let path = CStr::from_ptr(config_path)
        .to_str()
        .map_err(|_| BridgeError::InvalidPath)?;
    BridgeConfig::load(Some(Path::new(path)))
}

/// Stop the bridge; a no-op if it is not running
#[no_mangle]
pub extern "C" fn void_bridge_shutdown() {
    shutdown();
}

/// Address of a named export, or null if unknown or the bridge is down
///
/// # Safety
/// `name` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn void_bridge_get_export(name: *const c_char) -> *const c_void {
    if name.is_null() {
        return std::ptr::null();
    }
    let Ok(name) = CStr::from_ptr(name).to_str() else {
        return std::ptr::null();
    };
    match get_export(name) {
        Ok(Some(function)) => function,
        _ => std::ptr::null(),
    }
}

/// Pass every export to `callback`
///
/// Returns the number of exports registered, or the negated
/// [`BridgeError::status`] if the bridge is not running.
///
/// # Safety
/// `callback` must be safe to call with a NUL-terminated name and a
/// function address.
#[no_mangle]
pub unsafe extern "C" fn void_bridge_register_exports(callback: RegisterExportFn) -> i32 {
    match with_bridge(|bridge| bridge.exports.register_with(callback)) {
        Ok(count) => crate::resolver::to_i32(count),
        Err(err) => -err.status(),
    }
}
