use std::path::Path;

use log::{info, warn};
use rand::seq::IndexedRandom;
use rand::Rng;

/// One encoded audio file held in memory, ready to hand to the playback
/// service. Decoding happens at playback time.
#[derive(Debug, Clone)]
pub struct SoundClip {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The fixed set of sound effects a shake can trigger.
///
/// Loaded once at startup; files that cannot be read are skipped with a
/// warning so a broken entry never takes the application down.
#[derive(Debug, Clone)]
pub struct SoundCatalog {
    clips: Vec<SoundClip>,
}

impl SoundCatalog {
    pub fn load<P: AsRef<Path>>(directory: P, files: &[String]) -> Self {
        let directory = directory.as_ref();
        let mut clips = Vec::with_capacity(files.len());

        for file in files {
            let path = directory.join(file);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    clips.push(SoundClip {
                        name: file.clone(),
                        bytes,
                    });
                }
                Err(e) => {
                    warn!("Skipping sound {}: {}", path.display(), e);
                }
            }
        }

        info!("Sound catalog loaded: {}/{} clips", clips.len(), files.len());
        Self { clips }
    }

    pub fn from_clips(clips: Vec<SoundClip>) -> Self {
        Self { clips }
    }

    /// Picks one clip uniformly at random, with replacement. The RNG is
    /// supplied by the caller so a seeded session stays deterministic.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&SoundClip> {
        self.clips.choose(rng)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}
