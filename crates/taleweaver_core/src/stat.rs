//! Player statistics.

use serde::{Deserialize, Serialize};

/// A named, bounded integer statistic.
///
/// Invariant: `range[0] <= value <= range[1]` always; every mutation
/// clamps back into range.
///
/// # Examples
///
/// ```
/// use taleweaver_core::Stat;
///
/// let mut hp = Stat::new("HP", 100, [0, 100]);
/// hp.apply_delta(-150);
/// assert_eq!(hp.value, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Stat name, unique within the active world
    pub name: String,
    /// Current value
    pub value: i64,
    /// Inclusive `[min, max]` bounds
    pub range: [i64; 2],
}

impl Stat {
    /// Create a new stat, clamping the initial value into range.
    pub fn new(name: impl Into<String>, value: i64, range: [i64; 2]) -> Self {
        let mut stat = Self {
            name: name.into(),
            value,
            range,
        };
        stat.value = stat.clamped(value);
        stat
    }

    /// Clamp `value` into this stat's range.
    pub fn clamped(&self, value: i64) -> i64 {
        value.max(self.range[0]).min(self.range[1])
    }

    /// Add `delta` to the current value, clamping into range.
    ///
    /// Saturates on overflow; the model can emit arbitrarily large deltas.
    pub fn apply_delta(&mut self, delta: i64) {
        self.value = self.clamped(self.value.saturating_add(delta));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_clamps_at_both_bounds() {
        let mut hp = Stat::new("HP", 50, [0, 100]);
        hp.apply_delta(500);
        assert_eq!(hp.value, 100);
        hp.apply_delta(-500);
        assert_eq!(hp.value, 0);
    }

    #[test]
    fn initial_value_is_clamped() {
        let hp = Stat::new("HP", 150, [0, 100]);
        assert_eq!(hp.value, 100);
    }

    #[test]
    fn extreme_deltas_saturate_instead_of_overflowing() {
        let mut hp = Stat::new("HP", 10, [0, 100]);
        hp.apply_delta(i64::MAX);
        assert_eq!(hp.value, 100);
        hp.apply_delta(i64::MIN);
        assert_eq!(hp.value, 0);
    }

    #[test]
    fn sequences_of_deltas_stay_in_range() {
        let mut stamina = Stat::new("Stamina", 10, [-5, 20]);
        for delta in [-7, 30, -100, 3, 18, -2] {
            stamina.apply_delta(delta);
            assert!(stamina.value >= stamina.range[0]);
            assert!(stamina.value <= stamina.range[1]);
        }
    }
}
