//! Main application state: the timer state machine and everything it drives

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

use super::{
    CancelGuard, CancelRequest, DurationSelection, TickOutcome, TimerSession, TimerSnapshot, TimerStatus,
};
use crate::{
    alerts::AlertSequencer,
    config::Config,
    error::SelectionError,
    services::{
        AudioBackend, AudioChannel, Clock, CommandAudio, DesktopNotifier, NoVibration, Notifier, Permission,
        SoundConfig, SystemClock, Vibrator,
    },
    tasks::{countdown_task, CountdownSampler},
};

/// Platform collaborators the timer drives
pub struct Platform {
    pub audio: Arc<dyn AudioBackend>,
    pub sounds: SoundConfig,
    pub notifier: Arc<dyn Notifier>,
    pub vibrator: Arc<dyn Vibrator>,
    pub clock: Arc<dyn Clock>,
}

impl Platform {
    /// External sound player, `notify-send`, no vibration, wall clock
    pub fn host(config: &Config) -> Self {
        Self {
            audio: Arc::new(CommandAudio::new(config.player.clone())),
            sounds: config.sounds(),
            notifier: Arc::new(DesktopNotifier::default()),
            vibrator: Arc::new(NoVibration),
            clock: Arc::new(SystemClock),
        }
    }
}

/// The sampler of the running session and the task consuming its events
struct Countdown {
    sampler: CountdownSampler,
    consumer: JoinHandle<()>,
}

impl Countdown {
    fn stop(self) {
        self.sampler.stop();
        self.consumer.abort();
    }
}

/// Main application state that owns the single timer session.
///
/// Lock order is session, then countdown, then selection. The session lock is
/// held across every transition together with its side effects, so a reset can
/// never interleave with a start or an expiry.
pub struct AppState {
    session: Mutex<TimerSession>,
    selection: Mutex<DurationSelection>,
    countdown: Mutex<Option<Countdown>>,
    sequencer: AlertSequencer,
    audio: Arc<AudioChannel>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    pub max_hours: u32,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for timer updates
    snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    pub fn new(config: &Config, platform: Platform) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerSnapshot::default());
        let audio = Arc::new(AudioChannel::new(platform.audio, platform.sounds));
        let sequencer = AlertSequencer::new(
            Arc::clone(&audio),
            Arc::clone(&platform.notifier),
            platform.vibrator,
            config.alert_timings(),
        );

        Self {
            session: Mutex::new(TimerSession::new()),
            selection: Mutex::new(DurationSelection::default()),
            countdown: Mutex::new(None),
            sequencer,
            audio,
            notifier: platform.notifier,
            clock: platform.clock,
            tick_interval: config.tick_interval(),
            max_hours: config.max_hours,
            start_time: Instant::now(),
            port: config.port,
            host: config.host.clone(),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    fn lock_session(&self) -> Result<MutexGuard<'_, TimerSession>, String> {
        self.session.lock()
            .map_err(|e| format!("Failed to lock timer session: {}", e))
    }

    fn lock_selection(&self) -> Result<MutexGuard<'_, DurationSelection>, String> {
        self.selection.lock()
            .map_err(|e| format!("Failed to lock duration selection: {}", e))
    }

    fn countdown_slot(&self) -> MutexGuard<'_, Option<Countdown>> {
        // Stopping tasks must work even after a panic elsewhere
        self.countdown.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot_of(&self, session: &TimerSession) -> Result<TimerSnapshot, String> {
        let selection = *self.lock_selection()?;
        Ok(TimerSnapshot::new(session.clone(), selection, self.audio.role()))
    }

    /// Send the current snapshot to watchers. Called with the session lock
    /// held so snapshots go out in transition order.
    fn publish(&self, session: &TimerSession) -> Result<TimerSnapshot, String> {
        let snapshot = self.snapshot_of(session)?;
        if let Err(e) = self.snapshot_tx.send(snapshot.clone()) {
            warn!("Failed to send timer update: {}", e);
        }
        Ok(snapshot)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get the current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        let session = self.lock_session()?;
        self.snapshot_of(&session)
    }

    /// Watch every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn ring_count(&self) -> u32 {
        self.sequencer.ring_count()
    }

    /// Start a countdown of `total_minutes`.
    ///
    /// Returns `Ok(false)` without touching anything when a timer is already
    /// active or the duration is zero.
    pub fn start(self: &Arc<Self>, total_minutes: u32) -> Result<bool, String> {
        let mut session = self.lock_session()?;
        if !self.start_locked(&mut session, total_minutes) {
            return Ok(false);
        }

        self.record_action("start");
        self.publish(&session)?;
        Ok(true)
    }

    /// Start a countdown for the current duration selection
    pub fn start_selected(self: &Arc<Self>) -> Result<bool, String> {
        let mut session = self.lock_session()?;
        let total_minutes = self.lock_selection()?.total_minutes();
        if !self.start_locked(&mut session, total_minutes) {
            return Ok(false);
        }

        self.record_action("start");
        self.publish(&session)?;
        Ok(true)
    }

    fn start_locked(self: &Arc<Self>, session: &mut TimerSession, total_minutes: u32) -> bool {
        let Some(target_ms) = session.start(total_minutes, self.clock.now_ms()) else {
            debug!("Ignoring start: status={:?}, minutes={}", session.status, total_minutes);
            return false;
        };
        let session_id = session.session_id;

        let (sampler, events) = CountdownSampler::spawn(target_ms, self.tick_interval, Arc::clone(&self.clock));
        let consumer = tokio::spawn(countdown_task(Arc::clone(self), session_id, events));
        if let Some(previous) = self.countdown_slot().replace(Countdown { sampler, consumer }) {
            previous.stop();
        }

        if let Err(e) = self.audio.start_keep_alive() {
            warn!("Keep-alive audio unavailable: {}", e);
        }

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if notifier.request_permission().await == Permission::Denied {
                info!("Notification permission denied, alerts will use sound and vibration only");
            }
        });

        info!("Timer started for {} minutes (session {})", total_minutes, session_id);
        true
    }

    /// Apply one countdown sample
    pub fn tick(self: &Arc<Self>, session_id: u64, remaining_seconds: u64) -> Result<TickOutcome, String> {
        let mut session = self.lock_session()?;
        let previous = session.remaining_seconds;

        let outcome = session.tick(session_id, remaining_seconds);
        match outcome {
            TickOutcome::Ignored => return Ok(outcome),
            TickOutcome::Updated if previous == remaining_seconds => return Ok(outcome),
            TickOutcome::Updated => {}
            TickOutcome::Expired => {
                info!("Timer expired (session {})", session_id);
                self.begin_alert(session_id);
            }
        }

        self.publish(&session)?;
        Ok(outcome)
    }

    /// Apply the sampler's terminal signal
    pub fn expire(self: &Arc<Self>, session_id: u64) -> Result<TickOutcome, String> {
        self.tick(session_id, 0)
    }

    fn begin_alert(self: &Arc<Self>, session_id: u64) {
        if let Some(countdown) = self.countdown_slot().as_ref() {
            countdown.sampler.stop();
        }

        let ring_state = Arc::downgrade(self);
        let done_state = Arc::downgrade(self);
        self.sequencer.run(
            move |ring| {
                if let Some(state) = ring_state.upgrade() {
                    if let Err(e) = state.record_ring(session_id, ring) {
                        error!("Failed to record alarm ring: {}", e);
                    }
                }
            },
            move || {
                if let Some(state) = done_state.upgrade() {
                    if let Err(e) = state.finish_alert(session_id) {
                        error!("Failed to reset after alert: {}", e);
                    }
                }
            },
        );
    }

    /// Mirror a ring of the alert sequence into the session
    pub fn record_ring(&self, session_id: u64, ring: u32) -> Result<bool, String> {
        let mut session = self.lock_session()?;
        if !session.record_ring(session_id, ring) {
            return Ok(false);
        }
        info!("Alarm ring {}", ring);
        self.publish(&session)?;
        Ok(true)
    }

    /// Reset after the alert sequence resolved on its own
    pub fn finish_alert(&self, session_id: u64) -> Result<bool, String> {
        let mut session = self.lock_session()?;
        if session.status != TimerStatus::Completed || session.session_id != session_id {
            debug!("Ignoring stale alert completion for session {}", session_id);
            return Ok(false);
        }

        info!("Alert finished, back to idle");
        self.reset_locked(&mut session)?;
        self.record_action("auto-reset");
        self.publish(&session)?;
        Ok(true)
    }

    /// Stop everything and return to idle with a cleared selection.
    ///
    /// The countdown, the alert sequence and the audio are all stopped before
    /// the idle state becomes visible.
    fn reset_locked(&self, session: &mut TimerSession) -> Result<(), String> {
        if let Some(countdown) = self.countdown_slot().take() {
            countdown.stop();
        }
        self.sequencer.stop();
        self.audio.silence();

        session.reset();
        self.lock_selection()?.clear();
        Ok(())
    }

    /// Reset from any state. Safe to call repeatedly.
    pub fn reset(&self) -> Result<TimerSnapshot, String> {
        let mut session = self.lock_session()?;
        let previous = session.status;
        self.reset_locked(&mut session)?;

        if previous == TimerStatus::Idle {
            debug!("Reset while idle");
        } else {
            info!("Timer reset from {:?}", previous);
        }
        self.record_action("reset");
        self.publish(&session)
    }

    /// Ask to cancel. A running timer only opens the confirmation prompt;
    /// anything else resets right away.
    pub fn request_cancel(&self) -> Result<CancelRequest, String> {
        let mut session = self.lock_session()?;
        let request = session.request_cancel();
        match request {
            CancelRequest::AwaitingConfirmation => info!("Cancel requested, awaiting confirmation"),
            CancelRequest::ResetNow => self.reset_locked(&mut session)?,
        }

        self.record_action("cancel");
        self.publish(&session)?;
        Ok(request)
    }

    /// The confirmation prompt, if a cancel request is pending
    pub fn cancel_guard(&self) -> Result<Option<CancelGuard<'_>>, String> {
        let pending = self.lock_session()?.pending_cancel_confirmation;
        Ok(pending.then(|| CancelGuard::new(self)))
    }

    pub(super) fn confirm_cancel(&self) -> Result<bool, String> {
        let mut session = self.lock_session()?;
        if !session.clear_cancel_confirmation() {
            return Ok(false);
        }

        info!("Cancel confirmed");
        self.reset_locked(&mut session)?;
        self.record_action("cancel-confirm");
        self.publish(&session)?;
        Ok(true)
    }

    pub(super) fn abort_cancel(&self) -> Result<bool, String> {
        let mut session = self.lock_session()?;
        if !session.clear_cancel_confirmation() {
            return Ok(false);
        }

        info!("Cancel aborted, timer keeps running");
        self.record_action("cancel-abort");
        self.publish(&session)?;
        Ok(true)
    }

    /// Update the duration wheels. Only allowed while idle.
    pub fn set_selection(&self, hours: Option<u32>, minutes: Option<u32>) -> Result<TimerSnapshot, SelectionError> {
        let session = self.lock_session().map_err(SelectionError::State)?;
        if session.status != TimerStatus::Idle {
            return Err(SelectionError::NotIdle);
        }

        self.lock_selection()
            .map_err(SelectionError::State)?
            .set(hours, minutes, self.max_hours)?;
        self.record_action("select");
        self.publish(&session).map_err(SelectionError::State)
    }

    /// Show or hide the hours wheel. Only allowed while idle.
    pub fn toggle_hours(&self) -> Result<TimerSnapshot, SelectionError> {
        let session = self.lock_session().map_err(SelectionError::State)?;
        if session.status != TimerStatus::Idle {
            return Err(SelectionError::NotIdle);
        }

        self.lock_selection().map_err(SelectionError::State)?.toggle_hours();
        self.record_action("toggle-hours");
        self.publish(&session).map_err(SelectionError::State)
    }

    /// Zero the duration wheels. Ignored unless idle.
    pub fn clear_selection(&self) -> Result<bool, String> {
        let session = self.lock_session()?;
        if session.status != TimerStatus::Idle {
            return Ok(false);
        }

        self.lock_selection()?.clear();
        self.record_action("clear");
        self.publish(&session)?;
        Ok(true)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tokio::time::timeout;

    use super::*;
    use crate::{
        services::{
            audio::testing::{sounds, FakeAudio},
            notification::testing::RecordingNotifier,
            vibration::testing::RecordingVibrator,
            AudioRole, ManualClock,
        },
        tasks::remaining_seconds,
    };

    /// Wall clock that follows tokio's paused clock
    struct PausedClock {
        origin: tokio::time::Instant,
    }

    impl Clock for PausedClock {
        fn now_ms(&self) -> i64 {
            self.origin.elapsed().as_millis() as i64
        }
    }

    fn config() -> Config {
        Config::try_parse_from(["stove-timer"]).unwrap()
    }

    fn app_with(audio: FakeAudio, clock: Arc<dyn Clock>) -> (Arc<AppState>, Arc<FakeAudio>) {
        let audio = Arc::new(audio);
        let platform = Platform {
            audio: audio.clone(),
            sounds: sounds(),
            notifier: Arc::new(RecordingNotifier::new(Permission::Granted)),
            vibrator: Arc::new(RecordingVibrator::default()),
            clock,
        };
        (Arc::new(AppState::new(&config(), platform)), audio)
    }

    fn manual_app(now_ms: i64) -> (Arc<AppState>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now_ms));
        let (state, _) = app_with(FakeAudio::new(Duration::from_secs(3)), clock.clone());
        (state, clock)
    }

    async fn wait_for(state: &AppState, what: impl FnMut(&TimerSnapshot) -> bool) -> TimerSnapshot {
        let mut updates = state.subscribe();
        let snapshot = timeout(Duration::from_secs(600), updates.wait_for(what))
            .await
            .expect("timed out waiting for timer state")
            .expect("timer state channel closed");
        snapshot.clone()
    }

    #[tokio::test(start_paused = true)]
    async fn start_sets_target_from_the_clock() {
        let (state, _clock) = manual_app(0);

        assert!(state.start(25).unwrap());
        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.session.status, TimerStatus::Running);
        assert_eq!(snapshot.session.target_instant_ms, Some(1_500_000));
        assert_eq!(snapshot.display, "25:00");
        assert_eq!(snapshot.audio, AudioRole::KeepAlive);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_minutes_leaves_state_unchanged() {
        let (state, _clock) = manual_app(0);
        let before = state.get_snapshot().unwrap();

        assert!(!state.start(0).unwrap());
        assert!(!state.start_selected().unwrap());
        assert_eq!(state.get_snapshot().unwrap(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn samples_near_the_target_expire_once() {
        let (state, _clock) = manual_app(0);
        state.start(25).unwrap();
        let id = state.get_snapshot().unwrap().session.session_id;

        let remaining = remaining_seconds(1_500_000, 1_499_800);
        assert_eq!(state.tick(id, remaining).unwrap(), TickOutcome::Updated);
        assert_eq!(state.get_snapshot().unwrap().session.remaining_seconds, 1);

        let remaining = remaining_seconds(1_500_000, 1_500_100);
        assert_eq!(state.tick(id, remaining).unwrap(), TickOutcome::Expired);
        assert_eq!(state.expire(id).unwrap(), TickOutcome::Ignored);
        assert_eq!(state.tick(id, 0).unwrap(), TickOutcome::Ignored);

        let snapshot = state.get_snapshot().unwrap();
        assert_eq!(snapshot.session.status, TimerStatus::Completed);
        assert_eq!(snapshot.session.target_instant_ms, None);
        state.reset().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn full_countdown_rings_and_returns_to_idle() {
        let clock = Arc::new(PausedClock {
            origin: tokio::time::Instant::now(),
        });
        let (state, audio) = app_with(FakeAudio::new(Duration::from_secs(3)), clock.clone());
        state.set_selection(None, Some(1)).unwrap();

        assert!(state.start_selected().unwrap());
        let completed = wait_for(&state, |s| s.session.status == TimerStatus::Completed).await;
        let expired_at = clock.now_ms();
        assert!((60_000..60_000 + 250).contains(&expired_at), "expired at {}", expired_at);
        assert_eq!(completed.session.remaining_seconds, 0);

        wait_for(&state, |s| s.session.ring_count == 3).await;
        let idle = wait_for(&state, |s| s.session.status == TimerStatus::Idle).await;

        assert_eq!(idle.session.ring_count, 0);
        assert_eq!(idle.total_selected_minutes, 0);
        assert_eq!(idle.audio, AudioRole::Silent);
        assert_eq!(audio.started().iter().filter(|s| *s == "alarm.oga").count(), 3);
        assert_eq!(state.get_last_action().0.as_deref(), Some("auto-reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_alarm_resolves_straight_to_idle() {
        let clock = Arc::new(PausedClock {
            origin: tokio::time::Instant::now(),
        });
        let (state, _audio) = app_with(FakeAudio::rejecting(), clock);

        assert!(state.start(1).unwrap());
        wait_for(&state, |s| s.session.status == TimerStatus::Completed).await;
        let idle = wait_for(&state, |s| s.session.status == TimerStatus::Idle).await;
        assert_eq!(idle.session.ring_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unplayable_alarm_clip_resolves_straight_to_idle() {
        let started_at = tokio::time::Instant::now();
        let clock = Arc::new(PausedClock { origin: started_at });
        let (state, audio) = app_with(FakeAudio::failing(), clock);

        assert!(state.start(1).unwrap());
        let idle = wait_for(&state, |s| s.session.status == TimerStatus::Idle).await;

        // No pauses between rings that never played
        assert!(tokio::time::Instant::now() - started_at < Duration::from_secs(61));
        assert_eq!(idle.session.ring_count, 0);
        assert_eq!(state.get_last_action().0.as_deref(), Some("auto-reset"));
        assert_eq!(audio.started().iter().filter(|s| s.as_str() == "alarm.oga").count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_the_countdown() {
        let clock = Arc::new(PausedClock {
            origin: tokio::time::Instant::now(),
        });
        let (state, audio) = app_with(FakeAudio::new(Duration::from_secs(3)), clock);
        let mut updates = state.subscribe();

        state.start(1).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        state.reset().unwrap();
        updates.borrow_and_update();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!updates.has_changed().unwrap());
        assert_eq!(state.get_snapshot().unwrap().session.status, TimerStatus::Idle);
        assert!(!audio.started().contains(&"alarm.oga".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_is_identical_from_every_state() {
        let (state, _clock) = manual_app(0);
        let normalize = |s: TimerSnapshot| TimerSnapshot {
            session: TimerSession {
                session_id: 0,
                ..s.session
            },
            ..s
        };

        let from_idle = normalize(state.reset().unwrap());

        state.set_selection(Some(1), Some(5)).unwrap();
        state.start_selected().unwrap();
        state.request_cancel().unwrap();
        let from_running = normalize(state.reset().unwrap());

        state.start(2).unwrap();
        let id = state.get_snapshot().unwrap().session.session_id;
        state.expire(id).unwrap();
        state.record_ring(id, 1).unwrap();
        let from_completed = normalize(state.reset().unwrap());

        assert_eq!(from_running, from_completed);
        assert_eq!(from_running.session, from_idle.session);
        assert_eq!(from_running.session.status, TimerStatus::Idle);
        assert_eq!(from_running.total_selected_minutes, 0);
        assert_eq!(from_running.audio, AudioRole::Silent);
        assert_eq!(state.ring_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_guard_confirm_and_abort() {
        let (state, _clock) = manual_app(0);
        assert!(state.cancel_guard().unwrap().is_none());

        state.start(10).unwrap();
        assert_eq!(state.request_cancel().unwrap(), CancelRequest::AwaitingConfirmation);
        assert!(state.get_snapshot().unwrap().session.pending_cancel_confirmation);

        assert!(state.cancel_guard().unwrap().unwrap().abort().unwrap());
        let snapshot = state.get_snapshot().unwrap();
        assert!(!snapshot.session.pending_cancel_confirmation);
        assert_eq!(snapshot.session.status, TimerStatus::Running);
        assert!(state.cancel_guard().unwrap().is_none());

        state.request_cancel().unwrap();
        assert!(state.cancel_guard().unwrap().unwrap().confirm().unwrap());
        let snapshot = state.get_snapshot().unwrap();
        assert!(!snapshot.session.pending_cancel_confirmation);
        assert_eq!(snapshot.session.status, TimerStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_while_idle_resets_immediately() {
        let (state, _clock) = manual_app(0);
        state.set_selection(None, Some(15)).unwrap();

        assert_eq!(state.request_cancel().unwrap(), CancelRequest::ResetNow);
        let snapshot = state.get_snapshot().unwrap();
        assert!(!snapshot.session.pending_cancel_confirmation);
        assert_eq!(snapshot.total_selected_minutes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_session_events_are_ignored() {
        let (state, _clock) = manual_app(0);
        state.start(1).unwrap();
        let stale = state.get_snapshot().unwrap().session.session_id;
        state.reset().unwrap();
        state.start(3).unwrap();

        assert_eq!(state.tick(stale, 0).unwrap(), TickOutcome::Ignored);
        assert!(!state.finish_alert(stale).unwrap());
        assert!(!state.record_ring(stale, 2).unwrap());
        assert_eq!(state.get_snapshot().unwrap().session.status, TimerStatus::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_is_locked_while_running() {
        let (state, _clock) = manual_app(0);
        state.toggle_hours().unwrap();
        state.set_selection(Some(1), Some(0)).unwrap();
        state.start_selected().unwrap();

        assert_eq!(state.set_selection(None, Some(5)), Err(SelectionError::NotIdle));
        assert_eq!(state.toggle_hours(), Err(SelectionError::NotIdle));
        assert!(!state.clear_selection().unwrap());
        assert_eq!(state.get_snapshot().unwrap().total_selected_minutes, 60);

        let snapshot = state.reset().unwrap();
        assert!(snapshot.selection.show_hours);
        assert_eq!(snapshot.total_selected_minutes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_hands_audio_from_keep_alive_to_alarm() {
        let (state, _clock) = manual_app(0);
        state.start(1).unwrap();
        assert_eq!(state.get_snapshot().unwrap().audio, AudioRole::KeepAlive);

        let id = state.get_snapshot().unwrap().session.session_id;
        state.expire(id).unwrap();
        tokio::task::yield_now().await;
        assert_eq!(state.get_snapshot().unwrap().audio, AudioRole::Alarm);

        state.reset().unwrap();
        assert_eq!(state.get_snapshot().unwrap().audio, AudioRole::Silent);
    }
}
