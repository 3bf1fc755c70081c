use std::sync::Arc;

use tauri::{AppHandle, Emitter, Manager};
use tracing::{debug, info, warn};

use crate::clipboard::set_clipboard_text;
use crate::color::{Color, PickedColor};
use crate::events::{ColorPickedEvent, PickerRequestedEvent, PICKER_SHOW_REQUESTED};
use crate::session::StateStore;
use crate::state::PickerState;
use crate::SharedState;

/// The pixel sampling overlay. Only its entry point is needed here.
pub trait PickerController {
    fn show_picker(&self);
}

/// Asks the overlay to open by emitting [`PICKER_SHOW_REQUESTED`] with the
/// current picker settings.
pub struct OverlayController {
    app: AppHandle,
}

impl OverlayController {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl PickerController for OverlayController {
    fn show_picker(&self) {
        let state = self.app.state::<Arc<SharedState>>();
        let payload = match state.picker.lock() {
            Ok(picker) => PickerRequestedEvent::from(&picker.settings),
            Err(_) => {
                warn!("picker state poisoned, not showing picker");
                return;
            }
        };
        debug!("showing picker");
        if let Err(err) = self.app.emit(PICKER_SHOW_REQUESTED, payload) {
            warn!("failed to request picker: {err}");
        }
    }
}

/// Records a color reported by the overlay in the history.
pub fn record_picked(state: &mut PickerState, event: ColorPickedEvent) -> PickedColor {
    let color = Color::new(event.red, event.green, event.blue, event.alpha);
    state.record_pick(color).clone()
}

/// Handles a pick reported by the overlay: history, clipboard, persistence.
pub fn handle_color_picked(shared: &SharedState, event: ColorPickedEvent) {
    let Ok(mut picker) = shared.picker.lock() else {
        warn!("picker state poisoned, dropping pick");
        return;
    };
    let pick = record_picked(&mut picker, event);
    info!(captured = %pick.captured, "picked color");

    if let Err(err) = set_clipboard_text(&pick.captured) {
        warn!("failed to copy picked color: {err:#}");
    }

    match shared.storage.lock() {
        Ok(mut storage) => {
            if let Err(err) = storage.save_state(&picker) {
                warn!("failed to save state: {err:#}");
            }
        }
        Err(_) => warn!("storage poisoned, pick not persisted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorFormat;
    use crate::settings::Settings;

    #[test]
    fn picks_are_captured_in_the_chosen_format() {
        let mut state = PickerState::new(
            Settings {
                chosen_format: ColorFormat::CssRgb,
                ..Settings::default()
            },
            Vec::new(),
        );
        let event = ColorPickedEvent {
            red: 0.0,
            green: 0.0,
            blue: 1.0,
            alpha: 1.0,
        };

        let pick = record_picked(&mut state, event);
        assert_eq!(pick.captured, "rgb(0, 0, 255)");
        assert_eq!(state.recent_picks(), &[pick]);
    }
}
