use crate::types::AccelerationSample;

/// The jerk (difference in acceleration between consecutive samples)
/// required on an axis for it to count toward a shake, in m/s^2.
pub const SHAKE_THRESHOLD: f64 = 3.0;

/// The minimum amount of time allowed between shakes, in nanoseconds.
pub const MIN_TIME_BETWEEN_SHAKES_NS: i64 = 1_000_000_000;

/// Debounced jerk-threshold shake classifier.
///
/// Feeds on a serial stream of accelerometer samples and reports, per
/// sample, whether the stream just crossed from "moving" into "shaken":
/// the per-axis difference against the previous sample must exceed
/// [`SHAKE_THRESHOLD`] on at least 2 of the 3 axes, at least
/// [`MIN_TIME_BETWEEN_SHAKES_NS`] after the previously reported shake.
/// The very first sample after a reset only seeds the comparison state
/// and never reports a shake.
#[derive(Debug, Clone)]
pub struct ShakeDetector {
    last_acceleration: [f64; 3],
    last_shake_timestamp: i64,
    is_first_sample: bool,
}

impl ShakeDetector {
    pub fn new() -> Self {
        Self {
            last_acceleration: [0.0; 3],
            last_shake_timestamp: 0,
            is_first_sample: true,
        }
    }

    /// Discards all classification state. Called whenever monitoring
    /// restarts, so the first sample of the new run is suppressed again.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Classifies one sample. Always updates the comparison state,
    /// whether or not a shake is reported.
    pub fn process(&mut self, sample: &AccelerationSample) -> bool {
        let current = sample.axes();

        let axes_over_threshold = current
            .iter()
            .zip(self.last_acceleration.iter())
            .filter(|(a, b)| (*a - *b).abs() > SHAKE_THRESHOLD)
            .count();

        let is_shake = !self.is_first_sample
            && sample.timestamp - self.last_shake_timestamp >= MIN_TIME_BETWEEN_SHAKES_NS
            && axes_over_threshold >= 2;

        // Save for comparing to the next sample.
        self.last_acceleration = current;
        self.is_first_sample = false;

        if is_shake {
            self.last_shake_timestamp = sample.timestamp;
        }

        is_shake
    }
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sensor timestamps are nanoseconds since boot, so tests run well
    // after the detector's "never shaken" sentinel of 0.
    const BOOT: i64 = 20_000_000_000;
    const MS: i64 = 1_000_000;

    fn sample(x: f64, y: f64, z: f64, offset_ms: i64) -> AccelerationSample {
        AccelerationSample::new(x, y, z, BOOT + offset_ms * MS)
    }

    #[test]
    fn first_sample_never_shakes() {
        let mut detector = ShakeDetector::new();
        assert!(!detector.process(&sample(50.0, -50.0, 50.0, 0)));
    }

    #[test]
    fn two_axes_over_threshold_shakes() {
        let mut detector = ShakeDetector::new();
        detector.process(&sample(0.0, 0.0, 0.0, 0));
        assert!(detector.process(&sample(3.5, -3.5, 0.0, 10)));
    }

    #[test]
    fn three_axes_over_threshold_shakes() {
        let mut detector = ShakeDetector::new();
        detector.process(&sample(0.0, 0.0, 0.0, 0));
        assert!(detector.process(&sample(4.0, 4.0, -4.0, 10)));
    }

    #[test]
    fn single_axis_jerk_is_ignored() {
        let mut detector = ShakeDetector::new();
        detector.process(&sample(0.0, 0.0, 0.0, 0));
        // Large jerk, but only on x.
        assert!(!detector.process(&sample(30.0, 0.0, 0.0, 10)));
    }

    #[test]
    fn threshold_is_strict() {
        let mut detector = ShakeDetector::new();
        detector.process(&sample(0.0, 0.0, 0.0, 0));
        // Exactly 3.0 on every axis does not exceed the threshold.
        assert!(!detector.process(&sample(3.0, 3.0, 3.0, 10)));
    }

    #[test]
    fn shakes_are_debounced_for_one_second() {
        let mut detector = ShakeDetector::new();
        detector.process(&sample(0.0, 0.0, 0.0, 0));
        assert!(detector.process(&sample(5.0, 5.0, 0.0, 10)));
        // Qualifying jerk inside the debounce window is suppressed.
        assert!(!detector.process(&sample(0.0, 0.0, 0.0, 510)));
        // 999ms after the detected shake: still inside the window.
        assert!(!detector.process(&sample(5.0, 5.0, 0.0, 1009)));
        // Exactly at the window boundary it fires again.
        assert!(detector.process(&sample(0.0, 0.0, 5.0, 1010)));
    }

    #[test]
    fn comparison_state_updates_on_shake() {
        let mut detector = ShakeDetector::new();
        detector.process(&sample(0.0, 0.0, 0.0, 0));
        assert!(detector.process(&sample(10.0, 10.0, 10.0, 10)));
        // Same reading two seconds later: zero jerk, no shake.
        assert!(!detector.process(&sample(10.0, 10.0, 10.0, 2010)));
    }

    #[test]
    fn comparison_state_updates_without_shake() {
        let mut detector = ShakeDetector::new();
        detector.process(&sample(0.0, 0.0, 0.0, 0));
        // Sub-threshold drift updates the reference anyway...
        assert!(!detector.process(&sample(2.0, 2.0, 2.0, 10)));
        // ...so the next jerk is measured from (2,2,2), not (0,0,0),
        // and 4.0 per axis is enough to fire.
        assert!(detector.process(&sample(6.0, 6.0, 6.0, 2010)));
    }

    #[test]
    fn suppressed_first_sample_still_seeds_comparison() {
        let mut detector = ShakeDetector::new();
        // Huge first reading is swallowed but becomes the reference.
        assert!(!detector.process(&sample(40.0, 40.0, 40.0, 0)));
        assert!(!detector.process(&sample(40.0, 40.0, 40.0, 10)));
    }

    #[test]
    fn reset_rearms_first_sample_suppression() {
        let mut detector = ShakeDetector::new();
        detector.process(&sample(0.0, 0.0, 0.0, 0));
        assert!(detector.process(&sample(5.0, 5.0, 0.0, 10)));
        detector.reset();
        // Would qualify against the old reference, but the reset made
        // this a first sample again.
        assert!(!detector.process(&sample(0.0, 0.0, 0.0, 3000)));
    }

    #[test]
    fn shake_session_scenario() {
        let mut detector = ShakeDetector::new();
        // First sample: suppressed.
        assert!(!detector.process(&sample(0.0, 0.0, 0.0, 0)));
        // Jerk of 5 on two axes, never shaken before: fires.
        assert!(detector.process(&sample(5.0, 5.0, 0.0, 100)));
        // No jerk at all.
        assert!(!detector.process(&sample(5.0, 5.0, 0.0, 200)));
        // Qualifying jerk, but only 800ms since the detected shake.
        assert!(!detector.process(&sample(10.0, 10.0, 0.0, 900)));
        // 1100ms since the detected shake and two axes over: fires.
        assert!(detector.process(&sample(5.0, 5.0, 0.0, 1200)));
    }
}
