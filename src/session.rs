//! Open/close lifecycle of the dropdown menu.
//!
//! While the menu is open the activation shortcut is unregistered (so
//! recording a new one cannot trigger the picker) and modifier-key changes
//! are observed to keep the history labels live. Closing undoes both and
//! persists the state.

use tracing::{debug, warn};

use crate::state::PickerState;

pub trait ShortcutRegistrar {
    fn register(&mut self, shortcut: &str) -> anyhow::Result<()>;
    fn unregister(&mut self, shortcut: &str) -> anyhow::Result<()>;
}

pub trait StateStore {
    fn save_state(&mut self, state: &PickerState) -> anyhow::Result<()>;
}

/// Reports changes of the alternate modifier to `on_change` until the
/// returned subscription is dropped.
pub trait ModifierNotifier {
    fn subscribe(&self, on_change: Box<dyn Fn(bool) + Send + 'static>) -> ModifierSubscription;
}

/// Releases its observer when dropped.
pub struct ModifierSubscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ModifierSubscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for ModifierSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

pub struct MenuSession<R> {
    registrar: R,
    registered: Option<String>,
    subscription: Option<ModifierSubscription>,
    open: bool,
}

impl<R: ShortcutRegistrar> MenuSession<R> {
    pub fn new(registrar: R) -> Self {
        Self {
            registrar,
            registered: None,
            subscription: None,
            open: false,
        }
    }

    #[cfg(test)]
    pub fn registered_shortcut(&self) -> Option<&str> {
        self.registered.as_deref()
    }

    /// Makes `shortcut` the only registered activation shortcut. Registering
    /// the shortcut that is already active does nothing.
    pub fn register_activating(&mut self, shortcut: Option<&str>) {
        if self.registered.as_deref() == shortcut {
            return;
        }
        self.unregister_activating();
        let Some(shortcut) = shortcut else {
            return;
        };
        match self.registrar.register(shortcut) {
            Ok(()) => {
                debug!(%shortcut, "registered activation shortcut");
                self.registered = Some(shortcut.to_string());
            }
            Err(err) => warn!(%shortcut, "failed to register activation shortcut: {err:#}"),
        }
    }

    pub fn unregister_activating(&mut self) {
        if let Some(shortcut) = self.registered.take() {
            if let Err(err) = self.registrar.unregister(&shortcut) {
                warn!(%shortcut, "failed to unregister activation shortcut: {err:#}");
            }
        }
    }

    pub fn open(
        &mut self,
        notifier: &dyn ModifierNotifier,
        on_change: Box<dyn Fn(bool) + Send + 'static>,
    ) {
        self.unregister_activating();
        if self.subscription.is_none() {
            self.subscription = Some(notifier.subscribe(on_change));
        }
        self.open = true;
    }

    /// Closing a session that is not open does nothing, so the shortcut is
    /// registered at most once per open.
    pub fn close(&mut self, state: &PickerState, store: &mut dyn StateStore) {
        if !self.open {
            return;
        }
        self.open = false;
        self.subscription = None;
        self.register_activating(state.settings.activating_shortcut.as_deref());
        if let Err(err) = store.save_state(state) {
            warn!("failed to save state: {err:#}");
        }
    }

    /// Applies a new activation shortcut. While open, registration waits for
    /// [`MenuSession::close`].
    pub fn shortcut_changed(&mut self, shortcut: Option<&str>) {
        if !self.open {
            self.register_activating(shortcut);
        }
    }
}
