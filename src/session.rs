use crossbeam_channel::Receiver;
use log::{info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::PlaybackControl;
use crate::catalog::SoundCatalog;
use crate::detector::ShakeDetector;
use crate::types::AccelerationSample;
use crate::utils::format_timestamp_ns;

/// One monitoring run: owns the detector state, the sound catalog, the
/// playback handle and the RNG that picks clips.
///
/// `start`/`stop` mirror the sensor-listener lifecycle: starting resets
/// the detector so the first sample of a run never fires, stopping
/// silences playback. Samples arriving while stopped are ignored.
pub struct MonitoringSession<P: PlaybackControl> {
    detector: ShakeDetector,
    catalog: SoundCatalog,
    playback: P,
    rng: StdRng,
    active: bool,
    shake_count: u64,
}

impl<P: PlaybackControl> MonitoringSession<P> {
    /// A seed makes the clip sequence reproducible; without one the RNG
    /// comes from OS entropy.
    pub fn new(catalog: SoundCatalog, playback: P, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            detector: ShakeDetector::new(),
            catalog,
            playback,
            rng,
            active: false,
            shake_count: 0,
        }
    }

    pub fn start(&mut self) {
        self.detector.reset();
        self.active = true;
        info!("Monitoring started ({} clips in catalog)", self.catalog.len());
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.playback.stop();
        info!("Monitoring stopped after {} shakes", self.shake_count);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Classifies one sample and, on a shake, fires a random clip.
    /// Returns whether a shake was detected.
    pub fn handle_sample(&mut self, sample: &AccelerationSample) -> bool {
        if !self.active {
            return false;
        }

        trace!(
            "sample x={:.3} y={:.3} z={:.3} at {}",
            sample.x,
            sample.y,
            sample.z,
            format_timestamp_ns(sample.timestamp)
        );

        if !self.detector.process(sample) {
            return false;
        }

        self.shake_count += 1;
        match self.catalog.choose(&mut self.rng) {
            Some(clip) => {
                info!(
                    "Shake at {} -> {}",
                    format_timestamp_ns(sample.timestamp),
                    clip.name
                );
                self.playback.set_clip(&clip.name, clip.bytes.clone());
                self.playback.toggle();
            }
            None => {
                warn!(
                    "Shake at {} but the sound catalog is empty",
                    format_timestamp_ns(sample.timestamp)
                );
            }
        }

        true
    }

    /// Drains the sample channel until the source disconnects.
    pub fn run(&mut self, receiver: &Receiver<AccelerationSample>) {
        for sample in receiver.iter() {
            self.handle_sample(&sample);
        }
        info!("Sample source disconnected");
    }
}
