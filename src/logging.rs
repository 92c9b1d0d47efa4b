//! `log` sink selection: `wasm-logger` (browser console) under wasm32,
//! `env_logger` natively.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install the logger. Safe to call more than once; later calls are no-ops.
#[cfg(target_arch = "wasm32")]
pub fn init() {
    INIT.call_once(|| {
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        wasm_logger::init(wasm_logger::Config::new(level));
    });
}

/// Install the logger. Safe to call more than once; later calls are no-ops.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    INIT.call_once(|| {
        let _ = env_logger::try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
        log::info!("logger installed");
        assert!(INIT.is_completed());
    }
}
