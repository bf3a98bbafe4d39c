//! Playback clock
//!
//! Advances a (segment index, progress) cursor through a program's segment
//! durations under a speed multiplier. The clock knows nothing about wall
//! time; whoever drives it passes the elapsed seconds to [`PlaybackClock::tick`].

use gcodeview_core::{MotionProgram, PlaybackError, Point3D};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative slack when deciding whether a segment's time has run out
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
    /// Ran past the final segment; cursor pinned at the end
    Finished,
}

impl PlaybackState {
    /// Returns the name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Finished => "Finished",
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of playback within a program
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackCursor {
    pub segment_index: usize,
    /// Progress through the current segment, in `[0, 1]`
    pub progress: f64,
    pub playing: bool,
    pub speed: f64,
    /// Scaled seconds spent in the current segment
    pub segment_elapsed: f64,
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self {
            segment_index: 0,
            progress: 0.0,
            playing: false,
            speed: 1.0,
            segment_elapsed: 0.0,
        }
    }
}

/// Point-in-time view of the clock, published to observers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub segment_index: usize,
    pub progress: f64,
    pub speed: f64,
    /// Time-weighted progress through the whole program, in `[0, 1]`
    pub overall_progress: f64,
    pub segment_count: usize,
    /// Interpolated tool position, when the publisher holds the program
    pub tool_position: Option<Point3D>,
}

/// Simulated execution clock over a list of segment durations
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    durations: Vec<f64>,
    cursor: PlaybackCursor,
    state: PlaybackState,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_program(program: &MotionProgram) -> Self {
        let mut clock = Self::new();
        clock.load_program(program);
        clock
    }

    /// Replace the durations and rewind to the start, stopped.
    ///
    /// The speed multiplier carries over.
    pub fn load(&mut self, durations: Vec<f64>) {
        debug!("Playback loaded {} segments", durations.len());
        self.durations = durations;
        self.reset();
    }

    pub fn load_program(&mut self, program: &MotionProgram) {
        self.load(program.durations());
    }

    /// Start or resume playback.
    ///
    /// From `Finished` this restarts at the first segment. No-op without
    /// segments.
    pub fn play(&mut self) {
        if self.durations.is_empty() {
            debug!("Play ignored, no segments loaded");
            return;
        }
        if self.state == PlaybackState::Finished {
            self.rewind();
        }
        self.set_state(PlaybackState::Playing);
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.set_state(PlaybackState::Paused);
        }
    }

    pub fn reset(&mut self) {
        self.rewind();
        self.set_state(PlaybackState::Stopped);
    }

    /// Jump to the start of `index`, clamped to the last segment.
    ///
    /// A user seek pauses running playback.
    pub fn seek(&mut self, index: usize) {
        let Some(last) = self.durations.len().checked_sub(1) else {
            return;
        };
        self.cursor.segment_index = index.min(last);
        self.cursor.progress = 0.0;
        self.cursor.segment_elapsed = 0.0;
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Finished) {
            self.set_state(PlaybackState::Paused);
        }
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), PlaybackError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PlaybackError::InvalidSpeed { speed });
        }
        self.cursor.speed = speed;
        Ok(())
    }

    /// Advance by `elapsed_seconds` of wall time.
    ///
    /// Crosses at most one segment boundary; time left over past the end of
    /// a segment is dropped. Returns true when the cursor moved.
    pub fn tick(&mut self, elapsed_seconds: f64) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        let Some(&duration) = self.durations.get(self.cursor.segment_index) else {
            self.finish();
            return true;
        };

        self.cursor.segment_elapsed += elapsed_seconds.max(0.0) * self.cursor.speed;
        let elapsed = self.cursor.segment_elapsed;
        self.cursor.progress = if duration > 0.0 && elapsed < duration * (1.0 - BOUNDARY_EPSILON) {
            elapsed / duration
        } else {
            1.0
        };

        if self.cursor.progress >= 1.0 {
            self.advance();
        }
        true
    }

    fn advance(&mut self) {
        self.cursor.segment_elapsed = 0.0;
        if self.cursor.segment_index + 1 >= self.durations.len() {
            self.finish();
        } else {
            self.cursor.segment_index += 1;
            self.cursor.progress = 0.0;
        }
    }

    fn finish(&mut self) {
        self.cursor.segment_index = self.durations.len().saturating_sub(1);
        self.cursor.progress = 1.0;
        self.cursor.segment_elapsed = 0.0;
        self.set_state(PlaybackState::Finished);
    }

    fn rewind(&mut self) {
        self.cursor.segment_index = 0;
        self.cursor.progress = 0.0;
        self.cursor.segment_elapsed = 0.0;
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            debug!("Playback {} -> {}", self.state, state);
        }
        self.state = state;
        self.cursor.playing = state == PlaybackState::Playing;
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn segment_index(&self) -> usize {
        self.cursor.segment_index
    }

    pub fn progress(&self) -> f64 {
        self.cursor.progress
    }

    pub fn speed(&self) -> f64 {
        self.cursor.speed
    }

    pub fn is_playing(&self) -> bool {
        self.cursor.playing
    }

    pub fn segment_count(&self) -> usize {
        self.durations.len()
    }

    /// Time-weighted progress through all segments
    pub fn overall_progress(&self) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        if self.state == PlaybackState::Finished {
            return 1.0;
        }
        let index = self.cursor.segment_index;
        let total: f64 = self.durations.iter().sum();
        if total <= 0.0 {
            return (index as f64 + self.cursor.progress) / self.durations.len() as f64;
        }
        let done: f64 = self.durations[..index].iter().sum();
        let current = self.durations.get(index).copied().unwrap_or(0.0);
        ((done + current * self.cursor.progress) / total).clamp(0.0, 1.0)
    }

    /// Interpolated tool position for the current cursor
    pub fn tool_position(&self, program: &MotionProgram) -> Option<Point3D> {
        program
            .segment(self.cursor.segment_index)?
            .point_at(self.cursor.progress)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            segment_index: self.cursor.segment_index,
            progress: self.cursor.progress,
            speed: self.cursor.speed,
            overall_progress: self.overall_progress(),
            segment_count: self.durations.len(),
            tool_position: None,
        }
    }
}
