//! Stacking hero buffs granted by abilities.
//!
//! Both buffs share one countdown for all stacks: casting adds a stack and
//! starts the countdown only if it is idle, and each expiry peels off a
//! single stack and restarts the countdown while any remain.

use serde::{Deserialize, Serialize};

use crate::config::AbilityTuning;

/// Speed burst from the Charge ability, followed by an attack speed boost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeBuff {
    stacks: u32,
    timer: f32,
    boost_timer: f32,
    trail_timer: f32,
}

/// What a [`ChargeBuff`] did during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChargeTick {
    /// The last stack ran out and the attack speed boost started
    pub boost_started: bool,
    /// A trail marker is due
    pub trail: bool,
}

impl ChargeBuff {
    /// Returns the active stack count.
    #[must_use]
    pub const fn stacks(&self) -> u32 {
        self.stacks
    }

    /// Returns the remaining time on the current stack.
    #[must_use]
    pub const fn timer(&self) -> f32 {
        self.timer
    }

    /// Returns the remaining attack speed boost time.
    #[must_use]
    pub const fn boost_timer(&self) -> f32 {
        self.boost_timer
    }

    /// Returns true while the speed burst is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer > 0.0
    }

    /// Returns true while the attack speed boost is running.
    #[must_use]
    pub fn is_boosting(&self) -> bool {
        self.boost_timer > 0.0
    }

    /// Adds a stack.
    pub fn apply(&mut self, tuning: &AbilityTuning) {
        self.stacks = self.stacks.saturating_add(1);
        if self.timer <= 0.0 {
            self.timer = tuning.charge_duration;
        }
    }

    /// Advances the countdowns.
    pub fn tick(&mut self, dt: f32, tuning: &AbilityTuning) -> ChargeTick {
        let mut out = ChargeTick::default();

        if self.timer > 0.0 {
            self.timer -= dt;
            if self.timer <= 0.0 {
                self.stacks = self.stacks.saturating_sub(1);
                if self.stacks > 0 {
                    self.timer = tuning.charge_duration;
                } else {
                    self.timer = 0.0;
                    self.boost_timer = tuning.attack_speed_boost_duration;
                    out.boost_started = true;
                }
            }
        }

        if self.boost_timer > 0.0 {
            self.boost_timer = (self.boost_timer - dt).max(0.0);
        }

        if self.timer > 0.0 {
            self.trail_timer += dt;
            if self.trail_timer >= tuning.trail_interval {
                self.trail_timer = 0.0;
                out.trail = true;
            }
        } else {
            self.trail_timer = 0.0;
        }

        out
    }

    /// Movement speed multiplier: `base^stacks`.
    #[must_use]
    pub fn move_speed_multiplier(&self, tuning: &AbilityTuning) -> f32 {
        if self.stacks == 0 {
            1.0
        } else {
            tuning.charge_speed_base.powi(self.stacks as i32)
        }
    }

    /// Attack speed multiplier, raised only while boosting.
    #[must_use]
    pub fn attack_speed_multiplier(&self, tuning: &AbilityTuning) -> f32 {
        if self.is_boosting() {
            tuning.attack_speed_boost_multiplier
        } else {
            1.0
        }
    }
}

/// Size and turn rate increase from the Enlarge ability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnlargeBuff {
    stacks: u32,
    timer: f32,
}

impl EnlargeBuff {
    /// Returns the active stack count.
    #[must_use]
    pub const fn stacks(&self) -> u32 {
        self.stacks
    }

    /// Returns the remaining time on the current stack.
    #[must_use]
    pub const fn timer(&self) -> f32 {
        self.timer
    }

    /// Adds a stack.
    pub fn apply(&mut self, tuning: &AbilityTuning) {
        self.stacks = self.stacks.saturating_add(1);
        if self.timer <= 0.0 {
            self.timer = tuning.enlarge_duration;
        }
    }

    /// Advances the countdown.
    pub fn tick(&mut self, dt: f32, tuning: &AbilityTuning) {
        if self.timer <= 0.0 {
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.stacks = self.stacks.saturating_sub(1);
            self.timer = if self.stacks > 0 {
                tuning.enlarge_duration
            } else {
                0.0
            };
        }
    }

    /// Size multiplier: `base^stacks`.
    #[must_use]
    pub fn size_multiplier(&self, tuning: &AbilityTuning) -> f32 {
        if self.stacks == 0 {
            1.0
        } else {
            tuning.enlarge_size_base.powi(self.stacks as i32)
        }
    }

    /// Turn rate multiplier: `factor * stacks`, or 1 with no stacks.
    #[must_use]
    pub fn turn_rate_multiplier(&self, tuning: &AbilityTuning) -> f32 {
        if self.stacks == 0 {
            1.0
        } else {
            tuning.enlarge_turn_factor * self.stacks as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_charge(buff: &mut ChargeBuff, seconds: f32, tuning: &AbilityTuning) -> Vec<ChargeTick> {
        let steps = (seconds / 0.01).round() as usize;
        (0..steps).map(|_| buff.tick(0.01, tuning)).collect()
    }

    #[test]
    fn test_charge_stacks_share_one_timer() {
        let tuning = AbilityTuning::default();
        let mut buff = ChargeBuff::default();
        buff.apply(&tuning);
        run_charge(&mut buff, 0.5, &tuning);
        buff.apply(&tuning);

        assert_eq!(buff.stacks(), 2);
        // Second cast did not restart the countdown.
        assert!((buff.timer() - 1.0).abs() < 0.02);
        assert!((buff.move_speed_multiplier(&tuning) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_charge_expiry_peels_one_stack() {
        let tuning = AbilityTuning::default();
        let mut buff = ChargeBuff::default();
        buff.apply(&tuning);
        buff.apply(&tuning);

        let ticks = run_charge(&mut buff, 1.55, &tuning);
        assert_eq!(buff.stacks(), 1);
        assert!(buff.is_running());
        assert!(!buff.is_boosting());
        assert!(ticks.iter().all(|t| !t.boost_started));
    }

    #[test]
    fn test_boost_starts_only_after_last_stack() {
        let tuning = AbilityTuning::default();
        let mut buff = ChargeBuff::default();
        buff.apply(&tuning);

        let ticks = run_charge(&mut buff, 1.55, &tuning);
        assert_eq!(buff.stacks(), 0);
        assert!(buff.is_boosting());
        assert_eq!(ticks.iter().filter(|t| t.boost_started).count(), 1);
        assert!((buff.attack_speed_multiplier(&tuning) - 3.0).abs() < 1e-6);
        assert!((buff.move_speed_multiplier(&tuning) - 1.0).abs() < 1e-6);

        run_charge(&mut buff, 3.1, &tuning);
        assert!(!buff.is_boosting());
        assert!((buff.attack_speed_multiplier(&tuning) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_trail_markers_only_while_running() {
        let tuning = AbilityTuning::default();
        let mut buff = ChargeBuff::default();
        assert!(!buff.tick(0.1, &tuning).trail);

        buff.apply(&tuning);
        let trails = run_charge(&mut buff, 1.0, &tuning)
            .iter()
            .filter(|t| t.trail)
            .count();
        assert!((15..=21).contains(&trails));
    }

    #[test]
    fn test_enlarge_multipliers() {
        let tuning = AbilityTuning::default();
        let mut buff = EnlargeBuff::default();
        assert!((buff.turn_rate_multiplier(&tuning) - 1.0).abs() < 1e-6);

        buff.apply(&tuning);
        buff.apply(&tuning);
        assert!((buff.size_multiplier(&tuning) - 2.25).abs() < 1e-6);
        assert!((buff.turn_rate_multiplier(&tuning) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_enlarge_expires_stack_by_stack() {
        let tuning = AbilityTuning::default();
        let mut buff = EnlargeBuff::default();
        buff.apply(&tuning);
        buff.apply(&tuning);

        for _ in 0..51 {
            buff.tick(0.1, &tuning);
        }
        assert_eq!(buff.stacks(), 1);
        assert!(buff.timer() > 4.0);

        for _ in 0..51 {
            buff.tick(0.1, &tuning);
        }
        assert_eq!(buff.stacks(), 0);
        assert!(buff.timer().abs() < f32::EPSILON);
    }
}
