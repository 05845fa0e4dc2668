mod audio;
mod catalog;
mod config;
mod detector;
mod logger;
mod mqtt;
mod session;
mod types;
mod utils;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use log::{error, info, warn};

use audio::AudioPlayer;
use catalog::SoundCatalog;
use config::AppConfig;
use session::MonitoringSession;

const DEFAULT_CONFIG_PATH: &str = "shakeplay.toml";

fn main() {
    logger::init_logger();
    info!("Application starting");

    let config_path =
        std::env::var("SHAKEPLAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match AppConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    let catalog = SoundCatalog::load(config.sounds_directory(), &config.sounds.files);
    if catalog.is_empty() {
        warn!("Sound catalog is empty; shakes will be silent");
    }

    let player = match AudioPlayer::new() {
        Ok(player) => player,
        Err(e) => {
            error!("Failed to start audio player: {}", e);
            std::process::exit(1);
        }
    };

    let (sample_sender, sample_receiver) = bounded(config.channels.sample_channel_capacity);
    let sample_sender = Arc::new(sample_sender);
    let shutdown_signal = Arc::new(AtomicBool::new(false));

    let feed_config = config.mqtt.clone();
    let feed_shutdown = Arc::clone(&shutdown_signal);
    let feed_handle = thread::spawn(move || {
        if let Err(e) = mqtt::run_sample_feed(feed_config, sample_sender, feed_shutdown) {
            error!("Sample feed thread failed: {}", e);
        }
    });

    // Samples are classified serially on this thread; the feed thread
    // only ever touches its end of the channel.
    let mut session = MonitoringSession::new(catalog, player, None);
    session.start();
    session.run(&sample_receiver);
    session.stop();

    shutdown_signal.store(true, Ordering::Relaxed);
    match feed_handle.join() {
        Ok(()) => info!("Sample feed thread shut down"),
        Err(e) => error!("Sample feed thread panicked: {:?}", e),
    }
}
