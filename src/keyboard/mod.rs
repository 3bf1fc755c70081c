//! Live state of the alternate modifier (Option on macOS, Alt on Windows).
//! Linux has no global key state to read, so it always reports released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::session::{ModifierNotifier, ModifierSubscription};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

pub fn alternate_held() -> bool {
    #[cfg(target_os = "macos")]
    return macos::alternate_held();
    #[cfg(target_os = "windows")]
    return windows::alternate_held();
    #[cfg(target_os = "linux")]
    return linux::alternate_held();
    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    return false;
}

/// Polls [`alternate_held`] on a background thread and reports changes.
///
/// The first report is delivered right after subscribing so the caller can
/// sync labels with the current key state.
pub struct PollingModifierWatcher {
    interval: Duration,
    read_key: fn() -> bool,
}

impl Default for PollingModifierWatcher {
    fn default() -> Self {
        Self::with_reader(Duration::from_millis(50), alternate_held)
    }
}

impl PollingModifierWatcher {
    pub fn with_reader(interval: Duration, read_key: fn() -> bool) -> Self {
        Self { interval, read_key }
    }
}

impl ModifierNotifier for PollingModifierWatcher {
    fn subscribe(&self, on_change: Box<dyn Fn(bool) + Send + 'static>) -> ModifierSubscription {
        let stop = Arc::new(AtomicBool::new(false));
        let interval = self.interval;
        let read_key = self.read_key;

        let flag = Arc::clone(&stop);
        let spawned = thread::Builder::new()
            .name("modifier-watcher".into())
            .spawn(move || {
                let mut last = read_key();
                on_change(last);
                while !flag.load(Ordering::Relaxed) {
                    thread::sleep(interval);
                    let current = read_key();
                    if current != last {
                        last = current;
                        on_change(current);
                    }
                }
            });

        match spawned {
            Ok(handle) => ModifierSubscription::new(move || {
                stop.store(true, Ordering::Relaxed);
                let _ = handle.join();
            }),
            Err(err) => {
                warn!("failed to start modifier watcher: {err}");
                ModifierSubscription::new(|| {})
            }
        }
    }
}

/// Win32 key state words carry "down" in the high bit, i.e. the sign bit.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(crate) fn high_bit_down(state: i16) -> bool {
    state < 0
}
