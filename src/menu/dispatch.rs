use tracing::{debug, info, warn};

use super::recent::{RecentRow, RecentRowListener};
use super::MenuAction;
use crate::color::PickedColor;
use crate::icons::is_known_icon;
use crate::settings::{clamp_float_precision, clamp_magnification};
use crate::state::PickerState;

/// Side effects a menu action may need beyond mutating [`PickerState`].
pub trait MenuServices {
    fn show_picker(&mut self);
    fn write_clipboard(&mut self, text: &str) -> anyhow::Result<()>;
    fn close_menu(&mut self);
    fn status_icon_changed(&mut self, name: &str);
    fn launch_at_login(&self) -> bool;
    fn set_launch_at_login(&mut self, enabled: bool) -> anyhow::Result<()>;
    fn export_logs(&mut self);
    fn show_about(&mut self);
    fn quit(&mut self);
}

/// What the caller still has to do after dispatching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    pub state_changed: bool,
    pub labels_stale: bool,
    pub shortcut_changed: bool,
}

/// Resolves menu actions and history row signals against the shared state.
pub struct MenuController<'a> {
    state: &'a mut PickerState,
    services: &'a mut dyn MenuServices,
    alternate: bool,
    effects: Effects,
}

impl<'a> MenuController<'a> {
    /// `alternate` is whether the alternate modifier is held right now.
    pub fn new(
        state: &'a mut PickerState,
        services: &'a mut dyn MenuServices,
        alternate: bool,
    ) -> Self {
        Self {
            state,
            services,
            alternate,
            effects: Effects::default(),
        }
    }

    pub fn finish(self) -> Effects {
        self.effects
    }

    pub fn dispatch(&mut self, action: &MenuAction) {
        debug!(?action, "menu action");
        let settings = &mut self.state.settings;
        match action {
            MenuAction::ShowPicker => self.services.show_picker(),
            MenuAction::SetStatusIcon(name) => {
                if !is_known_icon(name) {
                    warn!(%name, "ignoring unknown status icon");
                    return;
                }
                settings.status_item_image = name.clone();
                self.services.status_icon_changed(name);
                self.effects.state_changed = true;
            }
            MenuAction::SetGrid(setting) => {
                settings.grid_setting = *setting;
                self.effects.state_changed = true;
            }
            MenuAction::SetColorSpace(name) => {
                settings.color_space = name.clone();
                self.effects.state_changed = true;
            }
            MenuAction::SetFormat(format) => {
                settings.chosen_format = *format;
                self.effects.state_changed = true;
                self.effects.labels_stale = true;
            }
            MenuAction::SetMagnification(level) => {
                settings.magnification_level = clamp_magnification(u64::from(*level));
                self.effects.state_changed = true;
            }
            MenuAction::SetFocusModifier(modifier) => {
                settings.focus_mode_modifier = *modifier;
                self.effects.state_changed = true;
            }
            MenuAction::SetFloatPrecision(precision) => {
                settings.float_precision = clamp_float_precision(u64::from(*precision));
                self.effects.state_changed = true;
                self.effects.labels_stale = true;
            }
            MenuAction::SetShortcut(shortcut) => {
                if settings.activating_shortcut == *shortcut {
                    return;
                }
                settings.activating_shortcut = shortcut.clone();
                self.effects.state_changed = true;
                self.effects.shortcut_changed = true;
            }
            MenuAction::ToggleUppercase => {
                settings.use_uppercase = !settings.use_uppercase;
                self.effects.state_changed = true;
                self.effects.labels_stale = true;
            }
            MenuAction::ToggleWcag => {
                settings.show_wcag_level = !settings.show_wcag_level;
                self.effects.state_changed = true;
            }
            MenuAction::ToggleLaunchAtLogin => {
                let enabled = !self.services.launch_at_login();
                if let Err(err) = self.services.set_launch_at_login(enabled) {
                    warn!("failed to change launch at login: {err:#}");
                }
            }
            MenuAction::ExportLog => self.services.export_logs(),
            MenuAction::About => self.services.show_about(),
            MenuAction::Quit => self.services.quit(),
        }
    }

    fn copy_pick(&mut self, pick: &PickedColor) {
        let value = self.state.settings.display_string(pick, self.alternate);
        match self.services.write_clipboard(&value) {
            Ok(()) => info!(%value, "copied recent pick"),
            Err(err) => warn!("failed to copy recent pick: {err:#}"),
        }
        self.services.close_menu();
    }

    fn delete_pick(&mut self, pick: &PickedColor) {
        if self.state.remove_recent_pick(pick) {
            self.effects.state_changed = true;
        } else {
            debug!(captured = %pick.captured, "recent pick already gone");
        }
        self.services.close_menu();
    }
}

impl RecentRowListener for MenuController<'_> {
    fn row_selected(&mut self, row: &RecentRow) {
        self.copy_pick(row.pick());
    }

    fn row_delete_requested(&mut self, row: &RecentRow) {
        self.delete_pick(row.pick());
    }
}
