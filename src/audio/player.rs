use std::io::Cursor;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};
use rodio::{Decoder, OutputStreamBuilder, Sink};

use super::PlaybackControl;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

#[derive(Debug, Clone)]
pub struct AudioStatus {
    pub state: PlaybackState,
    pub is_available: bool,
}

#[derive(Debug, Clone)]
enum AudioCommand {
    SetClip { name: String, bytes: Vec<u8> },
    Toggle,
    Stop,
    Shutdown,
}

/// Handle to the audio worker thread.
///
/// All playback runs on the worker; the handle only posts commands, so
/// the session never blocks on the audio device. Dropping the handle
/// shuts the worker down.
pub struct AudioPlayer {
    command_sender: mpsc::Sender<AudioCommand>,
    worker_handle: Option<JoinHandle<()>>,
    status: Arc<Mutex<AudioStatus>>,
}

impl AudioPlayer {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (command_sender, command_receiver) = mpsc::channel();
        let (ready_sender, ready_receiver) = mpsc::channel();

        let status = Arc::new(Mutex::new(AudioStatus {
            state: PlaybackState::Stopped,
            is_available: false,
        }));
        let worker_status = Arc::clone(&status);

        let worker_handle = thread::spawn(move || {
            if let Err(e) = audio_worker_thread(command_receiver, ready_sender, worker_status) {
                error!("Audio worker thread failed: {}", e);
            }
        });

        // The worker reports back once it has the output stream open, so
        // a machine without an audio device fails construction instead of
        // staying silently broken.
        match ready_receiver.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker_handle.join();
                return Err(e.into());
            }
            Err(e) => return Err(format!("Audio worker did not start: {}", e).into()),
        }

        Ok(AudioPlayer {
            command_sender,
            worker_handle: Some(worker_handle),
            status,
        })
    }

    pub fn state(&self) -> PlaybackState {
        self.status.lock().unwrap().state
    }

    pub fn is_available(&self) -> bool {
        self.status.lock().unwrap().is_available
    }
}

impl PlaybackControl for AudioPlayer {
    fn set_clip(&self, name: &str, bytes: Vec<u8>) {
        let _ = self.command_sender.send(AudioCommand::SetClip {
            name: name.to_string(),
            bytes,
        });
    }

    fn toggle(&self) {
        let _ = self.command_sender.send(AudioCommand::Toggle);
    }

    fn stop(&self) {
        let _ = self.command_sender.send(AudioCommand::Stop);
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        let _ = self.command_sender.send(AudioCommand::Shutdown);

        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

fn audio_worker_thread(
    command_receiver: mpsc::Receiver<AudioCommand>,
    ready_sender: mpsc::Sender<Result<(), String>>,
    status: Arc<Mutex<AudioStatus>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let stream = match OutputStreamBuilder::open_default_stream() {
        Ok(stream) => {
            let _ = ready_sender.send(Ok(()));
            stream
        }
        Err(e) => {
            let message = format!("Failed to open default audio stream: {}", e);
            let _ = ready_sender.send(Err(message.clone()));
            return Err(message.into());
        }
    };

    // Current clip, kept encoded; decoded fresh for every playback so a
    // toggle always starts from the beginning.
    let mut clip: Option<(String, Vec<u8>)> = None;
    let mut sink: Option<Sink> = None;
    let mut state = PlaybackState::Stopped;

    let set_status = |state: PlaybackState| {
        *status.lock().unwrap() = AudioStatus {
            state,
            is_available: true,
        };
    };
    set_status(state);
    info!("Audio worker started");

    loop {
        match command_receiver.recv_timeout(Duration::from_millis(50)) {
            Ok(AudioCommand::SetClip { name, bytes }) => {
                if let Some(current) = sink.take() {
                    current.stop();
                }
                state = PlaybackState::Stopped;

                // Decode failures leave the player silent: the next
                // toggle is a no-op instead of replaying a stale clip.
                match Decoder::new(Cursor::new(bytes.clone())) {
                    Ok(_) => {
                        debug!("Loaded clip {}", name);
                        clip = Some((name, bytes));
                    }
                    Err(e) => {
                        error!("Failed to decode clip {}: {}", name, e);
                        clip = None;
                    }
                }
                set_status(state);
            }
            Ok(AudioCommand::Toggle) => {
                if state == PlaybackState::Playing {
                    if let Some(current) = sink.take() {
                        current.stop();
                    }
                    state = PlaybackState::Stopped;
                } else if let Some((name, bytes)) = clip.clone() {
                    match Decoder::new(Cursor::new(bytes)) {
                        Ok(source) => {
                            let new_sink = Sink::connect_new(stream.mixer());
                            new_sink.append(source);
                            new_sink.play();
                            sink = Some(new_sink);
                            state = PlaybackState::Playing;
                            debug!("Playing clip {}", name);
                        }
                        Err(e) => {
                            error!("Failed to decode clip {}: {}", name, e);
                            clip = None;
                        }
                    }
                }
                set_status(state);
            }
            Ok(AudioCommand::Stop) => {
                if let Some(current) = sink.take() {
                    current.stop();
                }
                state = PlaybackState::Stopped;
                set_status(state);
            }
            Ok(AudioCommand::Shutdown) => {
                if let Some(current) = sink.take() {
                    current.stop();
                }
                info!("Audio worker shutting down");
                break;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // A drained sink means the clip finished on its own.
                let finished = sink
                    .as_ref()
                    .map(|s| s.empty() && state == PlaybackState::Playing)
                    .unwrap_or(false);
                if finished {
                    sink = None;
                    state = PlaybackState::Stopped;
                    set_status(state);
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}
