//! Bounded value with an animated display position.
//!
//! Data arrives at polling cadence but frames are drawn far more often, so
//! a gauge keeps two values: the `target` (latest truth, used for text) and
//! the `displayed` value (used for the arc), which only moves on [`Gauge::tick`].

/// Default fraction of the remaining distance covered per tick.
pub const DEFAULT_EASING: f64 = 0.2;

/// Numeric types a [`Gauge`] can animate.
pub trait GaugeScalar: Copy + PartialOrd + std::fmt::Debug {
    /// One easing step from `from` toward `to`.
    ///
    /// Must land strictly closer to `to` (or exactly on it) and never
    /// overshoot, so repeated steps converge in a bounded number of ticks.
    fn ease(from: Self, to: Self, ratio: f64) -> Self;
}

/// Float steps below this snap straight to the target.
const FLOAT_SNAP: f64 = 0.05;

macro_rules! impl_float_scalar {
    ($($t:ty),*) => {$(
        impl GaugeScalar for $t {
            fn ease(from: Self, to: Self, ratio: f64) -> Self {
                let distance = to as f64 - from as f64;
                let step = distance * ratio;
                if step.abs() < FLOAT_SNAP || distance.abs() <= FLOAT_SNAP {
                    return to;
                }
                (from as f64 + step) as $t
            }
        }
    )*};
}

macro_rules! impl_int_scalar {
    ($($t:ty),*) => {$(
        impl GaugeScalar for $t {
            fn ease(from: Self, to: Self, ratio: f64) -> Self {
                if from == to {
                    return to;
                }
                let distance = to as f64 - from as f64;
                // Always move at least one unit so integer gauges cannot stall
                let step = (distance * ratio).round().abs().max(1.0).min(distance.abs());
                if to > from {
                    (from as f64 + step) as $t
                } else {
                    (from as f64 - step) as $t
                }
            }
        }
    )*};
}

impl_float_scalar!(f32, f64);
impl_int_scalar!(i32, i64, u32, u64);

#[derive(Debug, Clone)]
pub struct Gauge<T: GaugeScalar> {
    min: T,
    max: T,
    target: T,
    displayed: T,
    easing: f64,
}

impl<T: GaugeScalar> Gauge<T> {
    /// Create a gauge over `[min, max]` resting at `min`. Reversed bounds are
    /// swapped.
    pub fn new(min: T, max: T) -> Self {
        let (min, max) = if max < min { (max, min) } else { (min, max) };
        Self {
            min,
            max,
            target: min,
            displayed: min,
            easing: DEFAULT_EASING,
        }
    }

    /// Set the per-tick easing ratio. Values outside `(0, 1]` fall back to
    /// [`DEFAULT_EASING`].
    pub fn with_easing(mut self, ratio: f64) -> Self {
        self.easing = if ratio > 0.0 && ratio <= 1.0 {
            ratio
        } else {
            DEFAULT_EASING
        };
        self
    }

    /// Store `value` clamped into range. The displayed value is untouched.
    ///
    /// Values that compare neither below, above, nor inside the range (NaN)
    /// are ignored.
    pub fn set_target(&mut self, value: T) {
        if value < self.min {
            self.target = self.min;
        } else if value > self.max {
            self.target = self.max;
        } else if value >= self.min {
            self.target = value;
        }
    }

    /// Advance the displayed value one step toward the target.
    pub fn tick(&mut self) {
        if self.is_settled() {
            return;
        }
        let next = T::ease(self.displayed, self.target, self.easing);
        self.displayed = if next < self.min {
            self.min
        } else if next > self.max {
            self.max
        } else {
            next
        };
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn displayed(&self) -> T {
        self.displayed
    }

    pub fn is_settled(&self) -> bool {
        self.displayed == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks_to_settle<T: GaugeScalar>(gauge: &mut Gauge<T>, limit: usize) -> usize {
        for n in 0..limit {
            if gauge.is_settled() {
                return n;
            }
            gauge.tick();
            assert!(gauge.displayed() >= gauge.min && gauge.displayed() <= gauge.max);
        }
        panic!("gauge did not settle within {} ticks", limit);
    }

    #[test]
    fn test_set_target_clamps() {
        let mut gauge = Gauge::new(0.0, 100.0);
        gauge.set_target(-5.0);
        assert_eq!(gauge.target(), 0.0);
        gauge.set_target(105.0);
        assert_eq!(gauge.target(), 100.0);
        assert_eq!(gauge.displayed(), 0.0, "set_target must not move displayed");
    }

    #[test]
    fn test_nan_target_ignored() {
        let mut gauge = Gauge::new(0.0, 100.0);
        gauge.set_target(40.0);
        gauge.set_target(f64::NAN);
        assert_eq!(gauge.target(), 40.0);
    }

    #[test]
    fn test_float_converges_in_bounded_ticks() {
        for target in [0.0, 0.01, 37.5, 99.99, 100.0] {
            let mut gauge = Gauge::new(0.0, 100.0);
            gauge.set_target(100.0);
            ticks_to_settle(&mut gauge, 200);
            gauge.set_target(target);
            ticks_to_settle(&mut gauge, 200);
            assert_eq!(gauge.displayed(), target);
        }
    }

    #[test]
    fn test_int_converges_in_bounded_ticks() {
        let mut gauge: Gauge<i32> = Gauge::new(0, 100);
        gauge.set_target(99);
        ticks_to_settle(&mut gauge, 200);
        assert_eq!(gauge.displayed(), 99);

        gauge.set_target(1);
        ticks_to_settle(&mut gauge, 200);
        assert_eq!(gauge.displayed(), 1);
    }

    #[test]
    fn test_tick_is_noop_when_settled() {
        let mut gauge = Gauge::new(0.0, 100.0).with_easing(1.0);
        gauge.set_target(42.0);
        gauge.tick();
        assert_eq!(gauge.displayed(), 42.0);
        gauge.tick();
        gauge.tick();
        assert_eq!(gauge.displayed(), 42.0);
    }

    #[test]
    fn test_displayed_moves_monotonically() {
        let mut gauge = Gauge::new(0.0, 100.0);
        gauge.set_target(80.0);
        let mut previous = gauge.displayed();
        while !gauge.is_settled() {
            gauge.tick();
            assert!(gauge.displayed() > previous);
            assert!(gauge.displayed() <= 80.0);
            previous = gauge.displayed();
        }
    }

    #[test]
    fn test_reversed_bounds_and_bad_easing() {
        let mut gauge = Gauge::new(10, -10).with_easing(7.0);
        assert_eq!((gauge.min, gauge.max), (-10, 10));
        gauge.set_target(50);
        assert_eq!(gauge.target(), 10);
    }
}
