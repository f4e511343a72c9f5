//! Alert sequencer: vibrate, notify, then ring a bounded number of times

use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info, warn};

use crate::services::{AudioChannel, Notification, Notifier, Vibrator};

/// Shape of one alert sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTimings {
    /// Rings before the sequence resolves itself
    pub rings: u32,
    /// Silence between two rings
    pub ring_pause: Duration,
    /// Silence after the last ring before completion
    pub final_pause: Duration,
    pub vibration_pattern: Vec<u64>,
}

impl Default for AlertTimings {
    fn default() -> Self {
        Self {
            rings: 3,
            ring_pause: Duration::from_secs(2),
            final_pause: Duration::from_secs(1),
            vibration_pattern: vec![500, 200, 500, 200, 500],
        }
    }
}

/// Drives the alarm once a timer expires.
///
/// Owns its ring counter and the task running the current sequence. `stop()`
/// aborts that task, which drops any pending pause and silences playback, so
/// a stopped sequence never rings again or reports completion.
pub struct AlertSequencer {
    audio: Arc<AudioChannel>,
    notifier: Arc<dyn Notifier>,
    vibrator: Arc<dyn Vibrator>,
    timings: AlertTimings,
    ring_count: Arc<AtomicU32>,
    current: Mutex<Option<JoinHandle<()>>>,
}

impl AlertSequencer {
    pub fn new(
        audio: Arc<AudioChannel>,
        notifier: Arc<dyn Notifier>,
        vibrator: Arc<dyn Vibrator>,
        timings: AlertTimings,
    ) -> Self {
        Self {
            audio,
            notifier,
            vibrator,
            timings,
            ring_count: Arc::new(AtomicU32::new(0)),
            current: Mutex::new(None),
        }
    }

    /// Rings started in the current sequence
    pub fn ring_count(&self) -> u32 {
        self.ring_count.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .map(|current| current.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }

    /// Start a new alert sequence.
    ///
    /// `on_ring` sees each ring number as it starts. `on_complete` runs once
    /// after the final pause, or right away if the alarm cannot be played.
    /// Any sequence still in flight is stopped first.
    pub fn run<R, C>(&self, on_ring: R, on_complete: C)
    where
        R: Fn(u32) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.stop();
        info!("Starting alert sequence ({} rings)", self.timings.rings);

        if let Err(e) = self.vibrator.vibrate(&self.timings.vibration_pattern) {
            debug!("Vibration skipped: {}", e);
        }

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.show(Notification::timer_finished()).await {
                warn!("Notification not shown: {}", e);
            }
        });

        let audio = Arc::clone(&self.audio);
        let ring_count = Arc::clone(&self.ring_count);
        let timings = self.timings.clone();
        let task = tokio::spawn(async move {
            for ring in 1..=timings.rings {
                ring_count.store(ring, Ordering::SeqCst);
                on_ring(ring);

                let ended = match audio.play_alarm() {
                    Ok(ended) => ended,
                    Err(e) => {
                        error!("Alarm playback failed, resolving alert: {}", e);
                        on_complete();
                        return;
                    }
                };

                match ended.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        error!("Alarm ring {} could not be played, resolving alert: {}", ring, e);
                        on_complete();
                        return;
                    }
                    Err(_) => {
                        debug!("Alarm ring {} interrupted", ring);
                        return;
                    }
                }
                debug!("Alarm ring {} finished", ring);

                let pause = if ring < timings.rings {
                    timings.ring_pause
                } else {
                    timings.final_pause
                };
                sleep(pause).await;
            }

            info!("Alert sequence complete");
            on_complete();
        });

        match self.current.lock() {
            Ok(mut current) => *current = Some(task),
            Err(e) => {
                error!("Failed to track alert sequence: {}", e);
                task.abort();
            }
        }
    }

    /// Cancel the current sequence and silence the alarm. Idempotent.
    pub fn stop(&self) {
        let task = match self.current.lock() {
            Ok(mut current) => current.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            if !task.is_finished() {
                debug!("Stopping alert sequence");
            }
            task.abort();
        }

        self.audio.silence();
        self.ring_count.store(0, Ordering::SeqCst);
    }
}
