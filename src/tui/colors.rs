use palette::{FromColor, Lch, Srgb};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Rgb(pub(crate) u8, pub(crate) u8, pub(crate) u8);

impl Rgb {
    /// A light, saturated color for the given LCh hue in degrees.
    pub(crate) fn from_hue(hue: f32) -> Self {
        Self::from_lch(Lch::new(75.0, 90.0, hue))
    }

    fn from_lch(lch: Lch) -> Self {
        let rgb = Srgb::from_color(lch).into_format::<u8>();
        Self(rgb.red, rgb.green, rgb.blue)
    }
}

impl From<Rgb> for crossterm::style::Color {
    fn from(f: Rgb) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: f.0,
            g: f.1,
            b: f.2,
        }
    }
}

/// Colors used to draw the board.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Colors {
    pub(crate) player1: Rgb,
    pub(crate) player2: Rgb,
    pub(crate) target: Rgb,
    pub(crate) border: Rgb,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            player1: Rgb::from_hue(250.0),
            player2: Rgb::from_hue(140.0),
            target: Rgb::from_hue(40.0),
            border: Rgb::from_lch(Lch::new(60.0, 0.0, 0.0)),
        }
    }
}
