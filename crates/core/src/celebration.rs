//! Confetti burst selection.
//!
//! Randomness is supplied by the caller as rolls in `[0, 1)`, so every choice
//! here is a plain function of its inputs.

use serde::Serialize;

/// Default probability that a burst uses hearts instead of squares.
pub const HEART_BURST_CHANCE: f64 = 0.35;

/// Palette cycled across the pieces of a burst.
pub const CONFETTI_COLORS: [&str; 5] = ["#c74a2e", "#2b5b4b", "#f4d9c7", "#d8e7db", "#f2b56b"];

/// Shape of a burst: how many pieces and how far they fly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfettiPreset {
    pub pieces: u32,
    pub spread_x: u32,
    pub rise_y: u32,
    pub spin: u32,
    pub delay_ms: u32,
}

pub const CONFETTI_PRESETS: [ConfettiPreset; 3] = [
    ConfettiPreset {
        pieces: 12,
        spread_x: 80,
        rise_y: 60,
        spin: 180,
        delay_ms: 80,
    },
    ConfettiPreset {
        pieces: 24,
        spread_x: 140,
        rise_y: 110,
        spin: 210,
        delay_ms: 120,
    },
    ConfettiPreset {
        pieces: 48,
        spread_x: 220,
        rise_y: 180,
        spin: 360,
        delay_ms: 160,
    },
];

/// One piece of confetti, offsets relative to the burst origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfettiPiece {
    pub x: i32,
    pub y: i32,
    pub rotation_deg: i32,
    pub delay_ms: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfettiBurst {
    pub preset: ConfettiPreset,
    pub hearts: bool,
    pub pieces: Vec<ConfettiPiece>,
}

#[must_use]
pub fn heart_burst_chance() -> f64 {
    HEART_BURST_CHANCE
}

/// Hearts are used when `roll` falls strictly below `threshold`.
#[must_use]
pub fn should_use_heart_confetti(roll: f64, threshold: f64) -> bool {
    roll < threshold
}

fn unit(roll: f64) -> f64 {
    if roll.is_finite() {
        roll.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Picks a preset, with `roll` spread evenly across [`CONFETTI_PRESETS`].
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn preset_for_roll(roll: f64) -> ConfettiPreset {
    let last = CONFETTI_PRESETS.len() - 1;
    let index = ((unit(roll) * CONFETTI_PRESETS.len() as f64).floor() as usize).min(last);
    CONFETTI_PRESETS[index]
}

impl ConfettiPreset {
    /// Lays out piece `index` from four rolls: horizontal, vertical, spin, delay.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn piece(&self, index: usize, rolls: [f64; 4]) -> ConfettiPiece {
        let [rx, ry, rr, rd] = rolls.map(unit);
        let spin = f64::from(self.spin);
        ConfettiPiece {
            x: ((rx - 0.5) * f64::from(self.spread_x)).round() as i32,
            y: (-40.0 - ry * f64::from(self.rise_y)).round() as i32,
            rotation_deg: (rr * spin * 2.0 - spin).round() as i32,
            delay_ms: (rd * f64::from(self.delay_ms)).round() as u32,
            color: CONFETTI_COLORS[index % CONFETTI_COLORS.len()],
        }
    }
}

/// Assembles a full burst, drawing four rolls per piece from `roll`.
pub fn build_burst(
    preset: ConfettiPreset,
    hearts: bool,
    mut roll: impl FnMut() -> f64,
) -> ConfettiBurst {
    let pieces = (0..preset.pieces as usize)
        .map(|index| preset.piece(index, [roll(), roll(), roll(), roll()]))
        .collect();
    ConfettiBurst {
        preset,
        hearts,
        pieces,
    }
}
