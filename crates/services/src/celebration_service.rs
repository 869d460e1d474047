use countdown_core::celebration::{
    ConfettiBurst, HEART_BURST_CHANCE, build_burst, preset_for_roll, should_use_heart_confetti,
};
use rand::Rng;

/// Picks the confetti burst shown when a page is completed.
#[derive(Debug, Clone, Copy)]
pub struct CelebrationService {
    heart_chance: f64,
}

impl Default for CelebrationService {
    fn default() -> Self {
        Self::new(HEART_BURST_CHANCE)
    }
}

impl CelebrationService {
    /// `heart_chance` is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(heart_chance: f64) -> Self {
        let heart_chance = if heart_chance.is_finite() {
            heart_chance.clamp(0.0, 1.0)
        } else {
            HEART_BURST_CHANCE
        };
        Self { heart_chance }
    }

    #[must_use]
    pub fn heart_chance(&self) -> f64 {
        self.heart_chance
    }

    /// Roll a burst with the thread-local generator.
    #[must_use]
    pub fn burst(&self) -> ConfettiBurst {
        self.burst_with(&mut rand::rng())
    }

    /// Roll a burst from `rng`.
    pub fn burst_with<R: Rng>(&self, rng: &mut R) -> ConfettiBurst {
        let preset = preset_for_roll(rng.random());
        let hearts = should_use_heart_confetti(rng.random(), self.heart_chance);
        build_burst(preset, hearts, || rng.random())
    }
}
