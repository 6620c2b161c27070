use std::time::{Duration, Instant};

use soundgrid::shared::{NUM_PADS, PadKey};

pub const FLASH: Duration = Duration::from_millis(150);

// state local to the tui: which pads were hit recently, so they can flash
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pressed_at: [Option<Instant>; NUM_PADS],
}

impl TuiState {
    pub fn flash(&mut self, key: PadKey, now: Instant) {
        self.pressed_at[key.index()] = Some(now);
    }

    pub fn lit(&self, now: Instant) -> [bool; NUM_PADS] {
        self.pressed_at
            .map(|at| at.is_some_and(|at| now.saturating_duration_since(at) < FLASH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_flash_for_150ms() {
        let t0 = Instant::now();
        let key = PadKey::new(5).unwrap();
        let mut ts = TuiState::default();
        ts.flash(key, t0);

        let lit = ts.lit(t0 + Duration::from_millis(149));
        assert!(lit[5]);
        assert_eq!(lit.iter().filter(|l| **l).count(), 1);
        assert!(!ts.lit(t0 + FLASH)[5]);
    }
}
