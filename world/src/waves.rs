//! Wave controller: spawn cadence, completion detection and scaling rules.

use crate::rng::SplitMix64;

/// Minimum wave before flying enemies may appear.
const FLYING_MINIMUM_WAVE: u32 = 10;

/// Flying enemies only appear on waves divisible by this.
const FLYING_WAVE_STRIDE: u32 = 3;

/// Chance that an eligible spawn becomes a flying enemy.
const FLYING_CHANCE: f64 = 0.4;

/// Spawn-cadence state machine for the active wave.
///
/// `idle → spawning → draining → cleared` in the spec's terms: `spawning`
/// tracks the cadence counters, `active` stays set while spawned enemies
/// remain alive, and the world flips the controller back to idle once the
/// field is empty.
#[derive(Clone, Debug, Default)]
pub(crate) struct WaveController {
    active: bool,
    spawning: bool,
    spawn_timer: u32,
    spawn_delay: u32,
    spawned: u32,
    spawn_target: u32,
}

impl WaveController {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn is_spawning(&self) -> bool {
        self.spawning
    }

    pub(crate) fn spawn_progress(&self) -> (u32, u32) {
        (self.spawned, self.spawn_target)
    }

    /// Arms the controller for the provided wave number.
    ///
    /// Returns the spawn target and inter-spawn delay so callers can report
    /// them. The first spawn fires on the next tick.
    pub(crate) fn start(&mut self, wave: u32) -> (u32, u32) {
        self.active = true;
        self.spawning = true;
        self.spawned = 0;
        self.spawn_timer = 0;
        self.spawn_target = spawn_target(wave);
        self.spawn_delay = spawn_delay(wave);
        (self.spawn_target, self.spawn_delay)
    }

    /// Advances the cadence one tick; `true` means spawn an enemy now.
    pub(crate) fn tick_spawn(&mut self) -> bool {
        if !self.spawning {
            return false;
        }

        if self.spawn_timer > 0 {
            self.spawn_timer -= 1;
            return false;
        }

        self.spawned += 1;
        self.spawn_timer = self.spawn_delay;
        if self.spawned >= self.spawn_target {
            self.spawning = false;
        }
        true
    }

    /// Reports whether the active wave has fully drained.
    pub(crate) fn cleared(&self, live_enemies: usize) -> bool {
        self.active && !self.spawning && live_enemies == 0
    }

    /// Returns the controller to idle after a cleared wave or game over.
    pub(crate) fn finish(&mut self) {
        self.active = false;
        self.spawning = false;
    }
}

/// Number of enemies spawned by the provided wave.
pub(crate) fn spawn_target(wave: u32) -> u32 {
    20 + (f64::from(wave) * 1.3) as u32
}

/// Ticks between consecutive spawns, tightening with the wave number.
pub(crate) fn spawn_delay(wave: u32) -> u32 {
    (60.0 - (f64::from(wave) * 1.5).min(50.0)) as u32
}

/// Wave-gated probabilistic rule deciding whether a spawn flies.
pub(crate) fn rolls_flying(wave: u32, rng: &mut SplitMix64) -> bool {
    wave >= FLYING_MINIMUM_WAVE && wave % FLYING_WAVE_STRIDE == 0 && rng.chance(FLYING_CHANCE)
}
