use serde::{Deserialize, Serialize};

use crate::color::ColorFormat;
use crate::settings::{FocusModifier, GridSetting, Settings};

pub const PICKER_SHOW_REQUESTED: &str = "picker:show_requested";
pub const PICKER_COLOR_PICKED: &str = "picker:color_picked";

/// Everything the picker overlay needs to know when it opens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerRequestedEvent {
    pub format: ColorFormat,
    pub grid: GridSetting,
    pub color_space: Option<String>,
    pub magnification: u32,
    pub focus_modifier: FocusModifier,
    pub float_precision: u32,
    pub uppercase_hex: bool,
    pub show_wcag_level: bool,
}

impl From<&Settings> for PickerRequestedEvent {
    fn from(settings: &Settings) -> Self {
        Self {
            format: settings.chosen_format,
            grid: settings.grid_setting,
            color_space: settings.color_space.clone(),
            magnification: settings.magnification_level,
            focus_modifier: settings.focus_mode_modifier,
            float_precision: settings.float_precision,
            uppercase_hex: settings.use_uppercase,
            show_wcag_level: settings.show_wcag_level,
        }
    }
}

/// Sent by the picker overlay once the user has chosen a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColorPickedEvent {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    #[serde(default = "opaque")]
    pub alpha: f64,
}

fn opaque() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_event_uses_camel_case() {
        let value = serde_json::to_value(PickerRequestedEvent::from(&Settings::default()))
            .expect("serialize");
        assert_eq!(value["format"], "generic_hex");
        assert_eq!(value["focusModifier"], "control");
        assert_eq!(value["magnification"], 8);
        assert!(value["colorSpace"].is_null());
    }

    #[test]
    fn picked_event_defaults_to_opaque() {
        let event: ColorPickedEvent =
            serde_json::from_str(r#"{"red":1.0,"green":0.5,"blue":0.0}"#).expect("parse");
        assert_eq!(event.alpha, 1.0);
    }
}
