use chrono::Duration;

use crate::models::color::{Color, Palette};

/// Maps "time until the next event" onto the palette: the closer the
/// event, the redder the color. Anything at or beyond the horizon is green.
pub struct UrgencyMapper<'a> {
    palette: &'a Palette,
    horizon: Duration,
}

impl<'a> UrgencyMapper<'a> {
    pub fn new(palette: &'a Palette, horizon: Duration) -> Self {
        Self { palette, horizon }
    }

    pub fn index_for(&self, until: Duration) -> usize {
        let last = self.palette.len().saturating_sub(1);
        if until >= self.horizon || self.horizon <= Duration::zero() {
            return last;
        }
        if until <= Duration::zero() {
            return 0;
        }
        let position = until.num_milliseconds() as f64 / self.horizon.num_milliseconds() as f64;
        let index = (self.palette.len() as f64 * position).floor() as usize;
        index.min(last)
    }

    pub fn color_for(&self, until: Option<Duration>) -> Color {
        match until {
            Some(until) => self
                .palette
                .get(self.index_for(until))
                .unwrap_or_else(|| self.palette.calmest()),
            None => self.palette.calmest(),
        }
    }
}
