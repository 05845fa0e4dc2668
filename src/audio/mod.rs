pub mod player;

pub use player::{AudioPlayer, PlaybackState};

/// Playback operations the monitoring session needs. The production
/// implementation is [`AudioPlayer`]; tests substitute a recorder.
pub trait PlaybackControl {
    /// Replaces the current clip. Stops anything playing first.
    fn set_clip(&self, name: &str, bytes: Vec<u8>);

    /// If playing, silences and rewinds; otherwise starts the current
    /// clip from the beginning.
    fn toggle(&self);

    /// Stops playback unconditionally.
    fn stop(&self);
}
