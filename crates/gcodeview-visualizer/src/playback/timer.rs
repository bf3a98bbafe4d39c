//! Playback timer
//!
//! Drives a [`PlaybackClock`] from a tokio task. The task owns the clock and
//! the loaded program; timer ticks and user commands arrive in the same
//! `select!` loop so every mutation happens on that task. Observers read
//! [`PlaybackSnapshot`]s from a watch channel.

use gcodeview_core::{Error, MotionProgram, PlaybackError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::clock::{PlaybackClock, PlaybackSnapshot};

/// Timer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Interval between clock ticks in milliseconds
    pub tick_interval_ms: u64,
    /// Speed multiplier applied when the timer starts
    pub initial_speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            initial_speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> gcodeview_core::Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::other("Tick interval must be > 0"));
        }
        if !self.initial_speed.is_finite() || self.initial_speed <= 0.0 {
            return Err(PlaybackError::InvalidSpeed {
                speed: self.initial_speed,
            }
            .into());
        }
        Ok(())
    }
}

/// Commands accepted by the timer task
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    Load(Arc<MotionProgram>),
    Play,
    Pause,
    Reset,
    Seek(usize),
    SetSpeed(f64),
}

/// Handle to a running playback task
pub struct PlaybackTimer {
    command_tx: Arc<RwLock<Option<mpsc::UnboundedSender<PlaybackCommand>>>>,
    shutdown_signal: Arc<RwLock<Option<mpsc::Sender<()>>>>,
    task: Arc<RwLock<Option<JoinHandle<()>>>>,
    snapshot_rx: watch::Receiver<PlaybackSnapshot>,
}

impl PlaybackTimer {
    /// Start the timer task on the current tokio runtime.
    pub fn spawn(config: PlaybackConfig) -> Result<Self, PlaybackError> {
        let mut clock = PlaybackClock::new();
        clock.set_speed(config.initial_speed)?;
        let period = Duration::from_millis(config.tick_interval_ms.max(1));

        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<PlaybackCommand>();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (snapshot_tx, snapshot_rx) = watch::channel(clock.snapshot());

        let handle = tokio::spawn(async move {
            let mut program: Option<Arc<MotionProgram>> = None;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_tick = Instant::now();

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    command = command_rx.recv() => {
                        let Some(command) = command else {
                            break;
                        };
                        apply_command(&mut clock, &mut program, command);
                        publish(&snapshot_tx, &clock, program.as_deref());
                    }
                    _ = ticker.tick() => {
                        let now = Instant::now();
                        let elapsed = now.duration_since(last_tick);
                        last_tick = now;
                        if clock.tick(elapsed.as_secs_f64()) {
                            publish(&snapshot_tx, &clock, program.as_deref());
                        }
                    }
                }
            }
            debug!("Playback timer task exited");
        });

        debug!("Playback timer started, tick interval {:?}", period);
        Ok(Self {
            command_tx: Arc::new(RwLock::new(Some(command_tx))),
            shutdown_signal: Arc::new(RwLock::new(Some(shutdown_tx))),
            task: Arc::new(RwLock::new(Some(handle))),
            snapshot_rx,
        })
    }

    pub fn send(&self, command: PlaybackCommand) -> Result<(), PlaybackError> {
        let guard = self.command_tx.read();
        let tx = guard.as_ref().ok_or(PlaybackError::TimerStopped)?;
        tx.send(command).map_err(|_| PlaybackError::TimerStopped)
    }

    /// Load a program, rewinding playback to its start
    pub fn load(&self, program: Arc<MotionProgram>) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Load(program))
    }

    pub fn play(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Play)
    }

    pub fn pause(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Pause)
    }

    pub fn reset(&self) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Reset)
    }

    pub fn seek(&self, index: usize) -> Result<(), PlaybackError> {
        self.send(PlaybackCommand::Seek(index))
    }

    /// Change the speed multiplier; invalid speeds are rejected here
    pub fn set_speed(&self, speed: f64) -> Result<(), PlaybackError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PlaybackError::InvalidSpeed { speed });
        }
        self.send(PlaybackCommand::SetSpeed(speed))
    }

    /// Most recently published snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        *self.snapshot_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task
            .read()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the task. Safe to call more than once.
    pub fn stop(&self) {
        if let Some(tx) = self.shutdown_signal.write().take() {
            let _ = tx.try_send(());
        }
        self.command_tx.write().take();

        if let Some(handle) = self.task.write().take() {
            handle.abort();
            debug!("Playback timer stopped");
        }
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn apply_command(
    clock: &mut PlaybackClock,
    program: &mut Option<Arc<MotionProgram>>,
    command: PlaybackCommand,
) {
    match command {
        PlaybackCommand::Load(new_program) => {
            clock.load_program(&new_program);
            *program = Some(new_program);
        }
        PlaybackCommand::Play => clock.play(),
        PlaybackCommand::Pause => clock.pause(),
        PlaybackCommand::Reset => clock.reset(),
        PlaybackCommand::Seek(index) => clock.seek(index),
        PlaybackCommand::SetSpeed(speed) => {
            if let Err(e) = clock.set_speed(speed) {
                warn!("Ignoring speed change: {}", e);
            }
        }
    }
}

fn publish(
    tx: &watch::Sender<PlaybackSnapshot>,
    clock: &PlaybackClock,
    program: Option<&MotionProgram>,
) {
    let mut snapshot = clock.snapshot();
    snapshot.tool_position = program.and_then(|p| clock.tool_position(p));
    // No receivers left is fine; the handle keeps one alive anyway
    let _ = tx.send(snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.tick_interval_ms, 16);
        assert_eq!(config.initial_speed, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = PlaybackConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlaybackConfig {
            initial_speed: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_spawn_rejects_invalid_initial_speed() {
        let config = PlaybackConfig {
            initial_speed: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            PlaybackTimer::spawn(config),
            Err(PlaybackError::InvalidSpeed { .. })
        ));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let timer = PlaybackTimer::spawn(PlaybackConfig::default()).unwrap();
        assert!(timer.is_running());
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.play(), Err(PlaybackError::TimerStopped));
    }
}
