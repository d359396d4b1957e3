use std::fmt;
use std::sync::OnceLock;

/// Number of entries in the urgency gradient: 256 steps up to yellow,
/// then 255 steps down to green, sharing the yellow midpoint.
pub const PALETTE_LEN: usize = 2 * 256 - 1;

static PALETTE: OnceLock<Palette> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Red -> yellow -> green gradient. Index 0 is the most urgent color.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Process-wide palette, built on first use and never mutated.
    pub fn shared() -> &'static Palette {
        PALETTE.get_or_init(Palette::gradient)
    }

    pub fn gradient() -> Self {
        let mut colors = Vec::with_capacity(PALETTE_LEN);
        for green in 0..=u8::MAX {
            colors.push(Color::new(u8::MAX, green, 0));
        }
        for red in (0..u8::MAX).rev() {
            colors.push(Color::new(red, u8::MAX, 0));
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    pub fn most_urgent(&self) -> Color {
        self.colors[0]
    }

    pub fn calmest(&self) -> Color {
        self.colors[self.colors.len() - 1]
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}
