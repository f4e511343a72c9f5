//! Audio output: one playback handle shared between the keep-alive and alarm roles

use std::{
    process::Stdio,
    sync::{Arc, Mutex, MutexGuard},
};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::{process::Command, sync::oneshot, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::error::PlatformError;

/// A clip in flight. Resolves when the clip ends on its own; dropping it
/// silences the clip.
pub type Playback = BoxFuture<'static, Result<(), PlatformError>>;

/// Something that can play a sound file from its start
pub trait AudioBackend: Send + Sync {
    /// Start playing `source`. Fails with `PlaybackRejected` when the
    /// platform refuses to start playback at all.
    fn play(&self, source: &str) -> Result<Playback, PlatformError>;
}

/// Plays clips by spawning an external player process per clip
#[derive(Debug, Clone)]
pub struct CommandAudio {
    player: String,
}

impl CommandAudio {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
        }
    }
}

impl AudioBackend for CommandAudio {
    fn play(&self, source: &str) -> Result<Playback, PlatformError> {
        debug!("Spawning {} for {}", self.player, source);

        let mut child = Command::new(&self.player)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlatformError::PlaybackRejected(format!("failed to spawn {}: {}", self.player, e)))?;

        let player = self.player.clone();
        Ok(Box::pin(async move {
            let status = child
                .wait()
                .await
                .map_err(|e| PlatformError::CommandFailed(format!("{} did not exit cleanly: {}", player, e)))?;

            if !status.success() {
                return Err(PlatformError::CommandFailed(format!(
                    "{} exited with code {}",
                    player,
                    status.code().unwrap_or(-1)
                )));
            }
            Ok(())
        }))
    }
}

/// Sound files used by the channel
#[derive(Debug, Clone)]
pub struct SoundConfig {
    pub alarm: String,
    /// Looped while a timer runs; `None` disables the keep-alive role
    pub keep_alive: Option<String>,
}

/// Who currently owns the audio output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioRole {
    Silent,
    KeepAlive,
    Alarm,
}

#[derive(Debug)]
struct Owner {
    role: AudioRole,
    task: Option<JoinHandle<()>>,
}

impl Owner {
    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.role = AudioRole::Silent;
    }
}

/// The single audio output handle.
///
/// Exactly one role owns the output at a time. Every role switch releases the
/// previous owner's playback before the next one starts, so the keep-alive
/// clip and the alarm never overlap.
pub struct AudioChannel {
    backend: Arc<dyn AudioBackend>,
    sounds: SoundConfig,
    owner: Mutex<Owner>,
}

impl AudioChannel {
    pub fn new(backend: Arc<dyn AudioBackend>, sounds: SoundConfig) -> Self {
        Self {
            backend,
            sounds,
            owner: Mutex::new(Owner {
                role: AudioRole::Silent,
                task: None,
            }),
        }
    }

    fn owner(&self) -> MutexGuard<'_, Owner> {
        // The owner record stays consistent even if a holder panicked
        self.owner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current owner of the output
    pub fn role(&self) -> AudioRole {
        self.owner().role
    }

    /// Loop the keep-alive clip until another role takes over.
    ///
    /// A no-op when no keep-alive clip is configured.
    pub fn start_keep_alive(&self) -> Result<(), PlatformError> {
        let Some(source) = self.sounds.keep_alive.clone() else {
            debug!("No keep-alive sound configured");
            return Ok(());
        };

        let mut owner = self.owner();
        owner.release();

        let first = self.backend.play(&source)?;
        let backend = Arc::clone(&self.backend);
        owner.task = Some(tokio::spawn(async move {
            let mut playback = first;
            loop {
                if let Err(e) = playback.await {
                    warn!("Keep-alive clip failed, stopping the loop: {}", e);
                    break;
                }
                playback = match backend.play(&source) {
                    Ok(next) => next,
                    Err(e) => {
                        warn!("Keep-alive playback rejected: {}", e);
                        break;
                    }
                };
            }
        }));
        owner.role = AudioRole::KeepAlive;

        info!("Keep-alive audio started");
        Ok(())
    }

    /// Play the alarm clip once from its start.
    ///
    /// The returned receiver yields the clip's outcome once it ends by
    /// itself. A player that started but could not play the clip reports
    /// `PlaybackRejected`. The receiver is dropped without firing if the
    /// channel is silenced or handed to another role first.
    pub fn play_alarm(&self) -> Result<oneshot::Receiver<Result<(), PlatformError>>, PlatformError> {
        let mut owner = self.owner();
        owner.release();

        let playback = self.backend.play(&self.sounds.alarm)?;
        let (ended_tx, ended_rx) = oneshot::channel();
        owner.task = Some(tokio::spawn(async move {
            let outcome = playback.await.map_err(|e| match e {
                PlatformError::CommandFailed(reason) => PlatformError::PlaybackRejected(reason),
                other => other,
            });
            if let Err(e) = &outcome {
                warn!("Alarm clip ended with an error: {}", e);
            }
            let _ = ended_tx.send(outcome);
        }));
        owner.role = AudioRole::Alarm;

        Ok(ended_rx)
    }

    /// Stop whatever is playing. Safe to call at any time.
    pub fn silence(&self) {
        let mut owner = self.owner();
        if owner.role != AudioRole::Silent {
            debug!("Silencing {:?} audio", owner.role);
        }
        owner.release();
    }
}
