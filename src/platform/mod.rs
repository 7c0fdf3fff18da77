//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging (console on web, env_logger natively)
//! - Entropy for id/color seeds
//! - Storage (LocalStorage on web)

pub mod storage;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::MemoryStorage;

use crate::persistence::Storage;

/// Install the logger and panic hook (call once at startup)
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: log::LevelFilter) {
    console_error_panic_hook::set_once();
    let level = level.to_level().unwrap_or(log::Level::Error);
    if console_log::init_with_level(level).is_err() {
        log::warn!("Logger already initialized");
    }
}

/// Install the logger (call once at startup); `RUST_LOG` overrides `level`
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Seed for the id/color generators
#[cfg(target_arch = "wasm32")]
pub fn entropy_seed() -> u64 {
    let now = js_sys::Date::now() as u64;
    let noise = (js_sys::Math::random() * u32::MAX as f64) as u64;
    now ^ (noise << 32)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn entropy_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Open the durable storage for this platform
///
/// Falls back to memory when LocalStorage is disabled, so the boards keep
/// working for the session without durability.
#[cfg(target_arch = "wasm32")]
pub fn open_storage() -> Box<dyn Storage> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            log::warn!("LocalStorage unavailable ({}), state will not survive reload", err);
            Box::new(MemoryStorage::new())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_storage() -> Box<dyn Storage> {
    Box::new(MemoryStorage::new())
}
