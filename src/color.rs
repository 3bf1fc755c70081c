use palette::{FromColor, Hsl, Srgb};
use serde::{Deserialize, Serialize};

/// Color spaces the picker can be pinned to, as `(menu title, name)` pairs.
/// A `None` choice in the settings means "infer from the screen".
pub const COLOR_SPACE_NAMES: [(&str, &str); 5] = [
    ("sRGB", "sRGB"),
    ("Display P3", "displayP3"),
    ("Adobe RGB (1998)", "adobeRGB1998"),
    ("Generic RGB", "genericRGB"),
    ("Device RGB", "deviceRGB"),
];

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::new(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            1.0,
        )
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
            channel_to_u8(self.alpha),
        ]
    }

    /// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let srgb = Srgb::new(self.red as f32, self.green as f32, self.blue as f32);
        let hsl: Hsl = Hsl::from_color(srgb);
        let hue = f64::from(hsl.hue.into_positive_degrees()) % 360.0;
        (hue, f64::from(hsl.saturation), f64::from(hsl.lightness))
    }

    fn is_opaque(&self) -> bool {
        self.alpha >= 1.0
    }
}

fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Options that influence how a color is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub float_precision: u32,
    pub uppercase_hex: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            float_precision: 3,
            uppercase_hex: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    GenericHex,
    CssHex,
    GenericRgb,
    CssRgb,
    GenericHsl,
    CssHsl,
    SwiftNsColor,
    ObjcNsColor,
    SwiftUiColor,
    OpenGl,
}

impl ColorFormat {
    pub const ALL: [ColorFormat; 10] = [
        ColorFormat::GenericHex,
        ColorFormat::CssHex,
        ColorFormat::GenericRgb,
        ColorFormat::CssRgb,
        ColorFormat::GenericHsl,
        ColorFormat::CssHsl,
        ColorFormat::SwiftNsColor,
        ColorFormat::ObjcNsColor,
        ColorFormat::SwiftUiColor,
        ColorFormat::OpenGl,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ColorFormat::GenericHex => "Hex: RRGGBB",
            ColorFormat::CssHex => "CSS Hex: #RRGGBB",
            ColorFormat::GenericRgb => "RGB: R, G, B",
            ColorFormat::CssRgb => "CSS RGB: rgb(R, G, B)",
            ColorFormat::GenericHsl => "HSL: H, S%, L%",
            ColorFormat::CssHsl => "CSS HSL: hsl(H, S%, L%)",
            ColorFormat::SwiftNsColor => "Swift: NSColor(...)",
            ColorFormat::ObjcNsColor => "Objective-C: [NSColor ...]",
            ColorFormat::SwiftUiColor => "SwiftUI: Color(...)",
            ColorFormat::OpenGl => "OpenGL: vec4(...)",
        }
    }

    pub fn format(self, color: &Color, options: FormatOptions) -> String {
        let [r, g, b, a] = color.to_rgba8();
        let p = options.float_precision as usize;
        match self {
            ColorFormat::GenericHex => hex_digits(&[r, g, b], options.uppercase_hex),
            ColorFormat::CssHex => {
                let digits = if color.is_opaque() {
                    hex_digits(&[r, g, b], options.uppercase_hex)
                } else {
                    hex_digits(&[r, g, b, a], options.uppercase_hex)
                };
                format!("#{digits}")
            }
            ColorFormat::GenericRgb => format!("{r}, {g}, {b}"),
            ColorFormat::CssRgb => {
                if color.is_opaque() {
                    format!("rgb({r}, {g}, {b})")
                } else {
                    format!("rgba({r}, {g}, {b}, {:.p$})", color.alpha)
                }
            }
            ColorFormat::GenericHsl => {
                let (h, s, l) = hsl_rounded(color);
                format!("{h}, {s}%, {l}%")
            }
            ColorFormat::CssHsl => {
                let (h, s, l) = hsl_rounded(color);
                if color.is_opaque() {
                    format!("hsl({h}, {s}%, {l}%)")
                } else {
                    format!("hsla({h}, {s}%, {l}%, {:.p$})", color.alpha)
                }
            }
            ColorFormat::SwiftNsColor => format!(
                "NSColor(red: {:.p$}, green: {:.p$}, blue: {:.p$}, alpha: {:.p$})",
                color.red, color.green, color.blue, color.alpha
            ),
            ColorFormat::ObjcNsColor => format!(
                "[NSColor colorWithRed:{:.p$} green:{:.p$} blue:{:.p$} alpha:{:.p$}]",
                color.red, color.green, color.blue, color.alpha
            ),
            ColorFormat::SwiftUiColor => format!(
                "Color(red: {:.p$}, green: {:.p$}, blue: {:.p$}, opacity: {:.p$})",
                color.red, color.green, color.blue, color.alpha
            ),
            ColorFormat::OpenGl => format!(
                "vec4({:.p$}, {:.p$}, {:.p$}, {:.p$})",
                color.red, color.green, color.blue, color.alpha
            ),
        }
    }
}

fn hex_digits(bytes: &[u8], uppercase: bool) -> String {
    bytes
        .iter()
        .map(|b| {
            if uppercase {
                format!("{b:02X}")
            } else {
                format!("{b:02x}")
            }
        })
        .collect()
}

fn hsl_rounded(color: &Color) -> (u32, u32, u32) {
    let (h, s, l) = color.to_hsl();
    let hue = h.round() as u32 % 360;
    (hue, (s * 100.0).round() as u32, (l * 100.0).round() as u32)
}

/// A color sampled by the picker together with the text it was copied as.
///
/// Two picks are the same pick only if both the color and the captured text
/// match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickedColor {
    pub color: Color,
    pub captured: String,
}

impl PickedColor {
    pub fn new(color: Color, captured: impl Into<String>) -> Self {
        Self {
            color,
            captured: captured.into(),
        }
    }

    pub fn capture(color: Color, format: ColorFormat, options: FormatOptions) -> Self {
        let captured = format.format(&color, options);
        Self { color, captured }
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, ColorFormat, FormatOptions, PickedColor};

    fn teal() -> Color {
        Color::from_rgb8(0x1a, 0x2b, 0x3c)
    }

    #[test]
    fn hex_formats_respect_uppercase() {
        let lower = FormatOptions::default();
        let upper = FormatOptions {
            uppercase_hex: true,
            ..lower
        };
        assert_eq!(ColorFormat::GenericHex.format(&teal(), lower), "1a2b3c");
        assert_eq!(ColorFormat::CssHex.format(&teal(), upper), "#1A2B3C");
    }

    #[test]
    fn css_hex_appends_alpha_when_translucent() {
        let color = Color::new(1.0, 0.0, 0.0, 0.5);
        assert_eq!(
            ColorFormat::CssHex.format(&color, FormatOptions::default()),
            "#ff000080"
        );
    }

    #[test]
    fn rgb_formats_use_byte_channels() {
        let options = FormatOptions::default();
        assert_eq!(ColorFormat::GenericRgb.format(&teal(), options), "26, 43, 60");
        assert_eq!(ColorFormat::CssRgb.format(&teal(), options), "rgb(26, 43, 60)");
    }

    #[test]
    fn hsl_formats_primary_colors() {
        let options = FormatOptions::default();
        let red = Color::from_rgb8(255, 0, 0);
        let blue = Color::from_rgb8(0, 0, 255);
        assert_eq!(ColorFormat::CssHsl.format(&red, options), "hsl(0, 100%, 50%)");
        assert_eq!(ColorFormat::GenericHsl.format(&blue, options), "240, 100%, 50%");
    }

    #[test]
    fn float_formats_follow_precision() {
        let white = Color::new(1.0, 1.0, 1.0, 1.0);
        let options = FormatOptions {
            float_precision: 1,
            uppercase_hex: false,
        };
        assert_eq!(
            ColorFormat::SwiftNsColor.format(&white, options),
            "NSColor(red: 1.0, green: 1.0, blue: 1.0, alpha: 1.0)"
        );
        assert_eq!(
            ColorFormat::OpenGl.format(&white, FormatOptions::default()),
            "vec4(1.000, 1.000, 1.000, 1.000)"
        );
    }

    #[test]
    fn components_are_clamped() {
        let color = Color::new(1.5, -0.2, 0.5, 2.0);
        assert_eq!(color.red, 1.0);
        assert_eq!(color.green, 0.0);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn picks_compare_color_and_capture() {
        let a = PickedColor::new(teal(), "1a2b3c");
        let b = PickedColor::new(teal(), "rgb(26, 43, 60)");
        assert_ne!(a, b);
        assert_eq!(a, PickedColor::new(teal(), "1a2b3c"));
    }

    #[test]
    fn capture_records_the_format_at_pick_time() {
        let pick = PickedColor::capture(teal(), ColorFormat::CssRgb, FormatOptions::default());
        assert_eq!(pick.captured, "rgb(26, 43, 60)");
    }
}
