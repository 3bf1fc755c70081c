use crate::color::{Color, PickedColor};
use crate::settings::Settings;

pub const SWATCH_SIZE: u32 = 12;

/// Receives the signals raised by a [`RecentRow`].
pub trait RecentRowListener {
    fn row_selected(&mut self, row: &RecentRow);
    fn row_delete_requested(&mut self, row: &RecentRow);
}

/// One history entry in the dropdown: a swatch, a label and a delete control.
///
/// A row never touches shared state itself, it only reports to its listener.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentRow {
    pick: PickedColor,
    label: String,
    swatch: Vec<u8>,
}

impl RecentRow {
    /// The initial label always uses the chosen format, not the capture.
    pub fn new(pick: PickedColor, settings: &Settings) -> Self {
        let label = settings.format_color(&pick.color);
        let swatch = circle_swatch(SWATCH_SIZE, &pick.color);
        Self {
            pick,
            label,
            swatch,
        }
    }

    pub fn pick(&self) -> &PickedColor {
        &self.pick
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// RGBA bytes of a `SWATCH_SIZE` square image.
    pub fn swatch(&self) -> &[u8] {
        &self.swatch
    }

    /// Recomputes the label. Returns whether it changed.
    pub fn refresh(&mut self, alternate: bool, settings: &Settings) -> bool {
        let label = settings.display_string(&self.pick, alternate);
        if label == self.label {
            return false;
        }
        self.label = label;
        true
    }

    pub fn pointer_down(&self, listener: &mut dyn RecentRowListener) {
        listener.row_selected(self);
    }

    pub fn activate_delete(&self, listener: &mut dyn RecentRowListener) {
        listener.row_delete_requested(self);
    }
}

/// A filled circle of `color` on a transparent square.
pub fn circle_swatch(size: u32, color: &Color) -> Vec<u8> {
    let [r, g, b, a] = color.to_rgba8();
    let radius = size as f32 / 2.0;
    let mut rgba = vec![0u8; (size * size * 4) as usize];
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - radius;
            let dy = y as f32 + 0.5 - radius;
            if dx * dx + dy * dy <= radius * radius {
                let i = ((y * size + x) * 4) as usize;
                rgba[i..i + 4].copy_from_slice(&[r, g, b, a]);
            }
        }
    }
    rgba
}
