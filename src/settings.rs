use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorFormat, FormatOptions, PickedColor};

pub const MIN_MAGNIFICATION: u32 = 4;
pub const MAX_MAGNIFICATION: u32 = 24;
pub const MAGNIFICATION_STEP: u32 = 2;
pub const MAX_FLOAT_PRECISION: u32 = 8;

/// When the picker's preview draws a pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSetting {
    Never,
    Always,
    InFocusMode,
}

impl GridSetting {
    pub const WITH_NAMES: [(&'static str, GridSetting); 3] = [
        ("Only in Focus Mode", GridSetting::InFocusMode),
        ("Always", GridSetting::Always),
        ("Never", GridSetting::Never),
    ];
}

/// The modifier key that toggles focus mode while the picker is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusModifier {
    Function,
    Command,
    Control,
    Option,
    Shift,
}

impl FocusModifier {
    pub const WITH_NAMES: [(&'static str, FocusModifier); 5] = [
        ("fn Function", FocusModifier::Function),
        ("⌘ Command", FocusModifier::Command),
        ("⌃ Control", FocusModifier::Control),
        ("⌥ Option", FocusModifier::Option),
        ("⇧ Shift", FocusModifier::Shift),
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub chosen_format: ColorFormat,
    pub grid_setting: GridSetting,
    pub color_space: Option<String>,
    pub magnification_level: u32,
    pub float_precision: u32,
    pub status_item_image: String,
    pub focus_mode_modifier: FocusModifier,
    pub activating_shortcut: Option<String>,
    pub use_uppercase: bool,
    pub show_wcag_level: bool,
    pub debug_mode: bool,
    pub left_click_activates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let shortcut = if cfg!(target_os = "macos") {
            "Cmd+Shift+P".to_string()
        } else {
            "Ctrl+Shift+P".to_string()
        };

        Self {
            chosen_format: ColorFormat::GenericHex,
            grid_setting: GridSetting::InFocusMode,
            color_space: None,
            magnification_level: 8,
            float_precision: 3,
            status_item_image: crate::icons::DEFAULT_STATUS_ICON.to_string(),
            focus_mode_modifier: FocusModifier::Control,
            activating_shortcut: Some(shortcut),
            use_uppercase: false,
            show_wcag_level: false,
            debug_mode: false,
            left_click_activates: false,
        }
    }
}

impl Settings {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            float_precision: self.float_precision,
            uppercase_hex: self.use_uppercase,
        }
    }

    /// Renders `color` in the currently chosen format.
    pub fn format_color(&self, color: &Color) -> String {
        self.chosen_format.format(color, self.format_options())
    }

    /// The text shown (and copied) for a recent pick: its captured text when
    /// the alternate modifier is held, otherwise the current format.
    pub fn display_string(&self, pick: &PickedColor, alternate: bool) -> String {
        if alternate {
            pick.captured.clone()
        } else {
            self.format_color(&pick.color)
        }
    }
}

pub fn magnification_levels() -> impl Iterator<Item = u32> {
    (MIN_MAGNIFICATION..=MAX_MAGNIFICATION).step_by(MAGNIFICATION_STEP as usize)
}

/// Snaps a level onto the even `[MIN_MAGNIFICATION, MAX_MAGNIFICATION]` grid.
pub fn clamp_magnification(level: u64) -> u32 {
    let level = level.clamp(u64::from(MIN_MAGNIFICATION), u64::from(MAX_MAGNIFICATION)) as u32;
    level - (level - MIN_MAGNIFICATION) % MAGNIFICATION_STEP
}

pub fn clamp_float_precision(precision: u64) -> u32 {
    precision.clamp(1, u64::from(MAX_FLOAT_PRECISION)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnification_levels_are_even_steps() {
        let levels: Vec<u32> = magnification_levels().collect();
        assert_eq!(levels, vec![4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24]);
    }

    #[test]
    fn magnification_is_clamped_and_snapped() {
        assert_eq!(clamp_magnification(1), 4);
        assert_eq!(clamp_magnification(7), 6);
        assert_eq!(clamp_magnification(12), 12);
        assert_eq!(clamp_magnification(99), 24);
    }

    #[test]
    fn float_precision_is_clamped() {
        assert_eq!(clamp_float_precision(0), 1);
        assert_eq!(clamp_float_precision(5), 5);
        assert_eq!(clamp_float_precision(40), MAX_FLOAT_PRECISION);
    }

    #[test]
    fn display_string_switches_on_alternate() {
        let mut settings = Settings::default();
        settings.chosen_format = ColorFormat::CssRgb;
        let pick = PickedColor::new(Color::from_rgb8(255, 0, 0), "ff0000");
        assert_eq!(settings.display_string(&pick, true), "ff0000");
        assert_eq!(settings.display_string(&pick, false), "rgb(255, 0, 0)");
    }

    #[test]
    fn default_magnification_is_on_the_grid() {
        let settings = Settings::default();
        assert!(magnification_levels().any(|l| l == settings.magnification_level));
    }
}
