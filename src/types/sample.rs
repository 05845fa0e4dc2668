/// One accelerometer reading: per-axis acceleration in m/s^2 and the
/// sensor timestamp in nanoseconds since boot.
#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
pub struct AccelerationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp: i64,
}

impl AccelerationSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp: i64) -> Self {
        Self { x, y, z, timestamp }
    }

    pub fn axes(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}
