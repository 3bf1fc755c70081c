//! Procedurally drawn status bar icons.
//!
//! Every icon is a small RGBA bitmap drawn in black on transparent so it can
//! be used as a template image on macOS.

pub const ICON_SIZE: u32 = 18;
pub const DEFAULT_STATUS_ICON: &str = "icon-default";

/// Selectable status icons as `(menu title, name)` pairs.
pub const STATUS_ICONS: [(&str, &str); 5] = [
    ("Rainbow", "icon-default"),
    ("Palette", "icon-palette"),
    ("Dropper", "icon-dropper"),
    ("Magnifying Dropper", "icon-mag-dropper"),
    ("Magnifying Dropper (Flat)", "icon-mag-dropper-flat"),
];

pub fn is_known_icon(name: &str) -> bool {
    STATUS_ICONS.iter().any(|(_, n)| *n == name)
}

struct Canvas {
    size: u32,
    rgba: Vec<u8>,
}

impl Canvas {
    fn new(size: u32) -> Self {
        Self {
            size,
            rgba: vec![0u8; (size * size * 4) as usize],
        }
    }

    fn set(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 || x >= self.size as i32 || y >= self.size as i32 {
            return;
        }
        let i = ((y as u32 * self.size + x as u32) * 4) as usize;
        self.rgba[i..i + 4].copy_from_slice(&[0, 0, 0, 255]);
    }

    fn fill_where(&mut self, inside: impl Fn(f32, f32) -> bool) {
        for y in 0..self.size as i32 {
            for x in 0..self.size as i32 {
                if inside(x as f32 + 0.5, y as f32 + 0.5) {
                    self.set(x, y);
                }
            }
        }
    }

    fn line(&mut self, from: (i32, i32), to: (i32, i32)) {
        let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).max(1);
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = from.0 as f32 + (to.0 - from.0) as f32 * t;
            let y = from.1 as f32 + (to.1 - from.1) as f32 * t;
            self.set(x.round() as i32, y.round() as i32);
        }
    }
}

fn ring(cx: f32, cy: f32, outer: f32, inner: f32) -> impl Fn(f32, f32) -> bool {
    move |x, y| {
        let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        d <= outer && d >= inner
    }
}

/// Draws the named status icon, returning its RGBA bytes. Unknown names
/// yield `None`.
pub fn render_status_icon(name: &str) -> Option<Vec<u8>> {
    let mut canvas = Canvas::new(ICON_SIZE);
    match name {
        "icon-default" => {
            canvas.fill_where(ring(9.0, 12.0, 8.0, 6.5));
            canvas.fill_where(ring(9.0, 12.0, 5.5, 4.0));
            canvas.fill_where(|x, y| y >= 12.0 && y < 14.0 && (x < 2.0 || x > 16.0));
        }
        "icon-palette" => {
            canvas.fill_where(ring(9.0, 9.0, 8.0, 6.5));
            for (cx, cy) in [(6.0, 6.0), (11.5, 5.5), (12.5, 10.5)] {
                canvas.fill_where(ring(cx, cy, 1.6, 0.0));
            }
        }
        "icon-dropper" => {
            canvas.line((3, 15), (11, 7));
            canvas.line((4, 15), (12, 7));
            canvas.fill_where(ring(13.5, 4.5, 2.8, 0.0));
        }
        "icon-mag-dropper" => {
            canvas.fill_where(ring(7.0, 7.0, 6.0, 4.6));
            canvas.line((11, 11), (16, 16));
            canvas.line((12, 11), (16, 15));
        }
        "icon-mag-dropper-flat" => {
            canvas.fill_where(ring(7.0, 7.0, 6.0, 0.0));
            canvas.line((11, 11), (16, 16));
            canvas.line((12, 11), (16, 15));
        }
        _ => return None,
    }
    Some(canvas.rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_icon_renders() {
        for (_, name) in STATUS_ICONS {
            let rgba = render_status_icon(name).expect(name);
            assert_eq!(rgba.len(), (ICON_SIZE * ICON_SIZE * 4) as usize);
            assert!(rgba.chunks(4).any(|px| px[3] == 255), "{name} is blank");
        }
    }

    #[test]
    fn unknown_icon_is_rejected() {
        assert!(render_status_icon("icon-missing").is_none());
        assert!(!is_known_icon("icon-missing"));
        assert!(is_known_icon(DEFAULT_STATUS_ICON));
    }
}
