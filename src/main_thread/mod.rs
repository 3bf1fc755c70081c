//! Getting work onto the UI thread while the dropdown is being tracked.
//!
//! The popup blocks inside a tray callback, so Tauri's own event loop does
//! not run queued tasks until the menu closes. On macOS tasks go through the
//! GCD main queue instead, which the menu-tracking run loop keeps draining.

use std::sync::Arc;

use tauri::AppHandle;
use tracing::debug;

#[cfg(target_os = "macos")]
mod macos;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait MainThreadScheduler: Send + Sync {
    fn schedule(&self, task: Task);
}

/// Posts to the main dispatch queue.
#[cfg(target_os = "macos")]
pub struct MainQueueScheduler;

#[cfg(target_os = "macos")]
impl MainThreadScheduler for MainQueueScheduler {
    fn schedule(&self, task: Task) {
        macos::run_on_main_queue(task);
    }
}

/// Posts to the Tauri event loop.
#[cfg_attr(target_os = "macos", allow(dead_code))]
pub struct EventLoopScheduler {
    app: AppHandle,
}

#[cfg_attr(target_os = "macos", allow(dead_code))]
impl EventLoopScheduler {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl MainThreadScheduler for EventLoopScheduler {
    fn schedule(&self, task: Task) {
        if let Err(err) = self.app.run_on_main_thread(task) {
            debug!("failed to schedule main thread task: {err}");
        }
    }
}

/// The scheduler that still runs while a popup menu is open.
pub fn menu_tracking_scheduler(app: &AppHandle) -> Arc<dyn MainThreadScheduler> {
    #[cfg(target_os = "macos")]
    {
        let _ = app;
        Arc::new(MainQueueScheduler)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(EventLoopScheduler::new(app.clone()))
    }
}

/// Wraps `refresh` so every modifier change is applied on the UI thread
/// through `scheduler`, never on the watcher thread.
pub fn scheduled_refresh(
    scheduler: Arc<dyn MainThreadScheduler>,
    refresh: Arc<dyn Fn(bool) + Send + Sync>,
) -> Box<dyn Fn(bool) + Send + 'static> {
    Box::new(move |alternate| {
        let refresh = Arc::clone(&refresh);
        scheduler.schedule(Box::new(move || refresh(alternate)));
    })
}
