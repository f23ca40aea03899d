//! Game loop driver
//!
//! Owns the session, a fixed-step frame clock and the queue of host commands.
//! The host calls `frame` once per animation frame; each call steps the
//! simulation zero or more times, paints once, and hands back the events.

use std::collections::VecDeque;

use crate::consts::*;
use crate::quiz::{Question, QuizError};
use crate::renderer::{Surface, render_frame};
use crate::settings::Settings;
use crate::sim::{Command, GameEvent, GamePhase, GameSession, Key, Pacing, TickInput, tick};

/// Slack for animation frames that arrive a little early
const FRAME_JITTER_MS: f64 = 1.0;
/// Rounding slack when comparing accumulated time against the step
const STEP_EPSILON_MS: f64 = 1e-6;

/// Converts wall-clock frame times into a number of fixed simulation steps
#[derive(Debug, Clone)]
pub struct FrameClock {
    accumulator_ms: f64,
    last_ms: Option<f64>,
    frame_interval_ms: f64,
}

impl FrameClock {
    pub fn new(target_fps: u32) -> Self {
        Self {
            accumulator_ms: 0.0,
            last_ms: None,
            frame_interval_ms: 1000.0 / target_fps.max(1) as f64,
        }
    }

    /// Number of ticks to run for a frame at `now_ms`.
    ///
    /// Frames closer together than the target frame interval are skipped
    /// without consuming time. At most `MAX_SUBSTEPS` ticks run per frame.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_ms {
            // First frame runs a single step
            None => SIM_DT_MS,
            Some(last) => {
                let elapsed = now_ms - last;
                if elapsed + FRAME_JITTER_MS < self.frame_interval_ms {
                    return 0;
                }
                elapsed.clamp(0.0, MAX_FRAME_DELTA_MS)
            }
        };
        self.last_ms = Some(now_ms);
        self.accumulator_ms += delta;

        let mut steps = 0;
        while self.accumulator_ms + STEP_EPSILON_MS >= SIM_DT_MS && steps < MAX_SUBSTEPS {
            self.accumulator_ms = (self.accumulator_ms - SIM_DT_MS).max(0.0);
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator_ms = self.accumulator_ms.min(SIM_DT_MS);
        }
        steps
    }

    /// Forget the last frame time, e.g. after the page was hidden
    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
        self.last_ms = None;
    }
}

/// Runs a game session against a drawing surface
#[derive(Debug)]
pub struct GameDriver {
    session: GameSession,
    clock: FrameClock,
    queue: VecDeque<Command>,
}

impl GameDriver {
    pub fn new(questions: Vec<Question>, settings: &Settings, seed: u64) -> Result<Self, QuizError> {
        let session = GameSession::new(questions, Pacing::from(settings), seed)?;
        Ok(Self {
            session,
            clock: FrameClock::new(settings.target_fps),
            queue: VecDeque::new(),
        })
    }

    /// Queue a command for the next tick
    pub fn send(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Advance by one animation frame and paint the result.
    ///
    /// Returns the events produced by the ticks that ran.
    pub fn frame<S: Surface + ?Sized>(&mut self, now_ms: f64, surface: &mut S) -> Vec<GameEvent> {
        let steps = self.clock.advance(now_ms);
        if steps == 0 {
            return Vec::new();
        }

        for _ in 0..steps {
            self.step_once();
        }

        self.sync_images(surface);
        render_frame(&self.session, surface);
        self.session.drain_events()
    }

    /// Run exactly one tick with whatever is queued, without painting
    pub fn step(&mut self) -> Vec<GameEvent> {
        self.step_once();
        self.session.drain_events()
    }

    /// Let go of every held key and the horn.
    ///
    /// Key-up events never arrive once the page loses focus, so the host
    /// calls this whenever it stops listening.
    pub fn release_held(&mut self) {
        for key in Key::ALL {
            self.send(Command::Release(key));
        }
        self.send(Command::HornOff);
    }

    /// Pause on behalf of the host (tab hidden, window blurred).
    ///
    /// Held input is always released. Returns true when a pause was queued.
    pub fn auto_pause(&mut self) -> bool {
        self.release_held();
        let pending = self.queue.contains(&Command::TogglePause);
        if self.session.phase != GamePhase::Driving || pending {
            return false;
        }
        self.send(Command::TogglePause);
        true
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Restart the frame clock so a long gap is not replayed
    pub fn resume_clock(&mut self) {
        self.clock.reset();
    }

    fn step_once(&mut self) {
        let input = TickInput::with(self.queue.drain(..));
        tick(&mut self.session, &input);
    }

    fn sync_images<S: Surface + ?Sized>(&mut self, surface: &S) {
        if let Some(marker) = self.session.sign.marker_mut() {
            let ready = marker.image.is_some_and(|key| surface.image_ready(key));
            if ready != marker.is_loaded {
                log::debug!("Sign image ready: {}", ready);
            }
            marker.is_loaded = ready;
        }
    }
}
