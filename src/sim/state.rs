//! Game session state and core simulation types
//!
//! Everything a tick reads or writes lives in `GameSession`; nothing in the
//! simulation reaches for ambient state.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::assets::AssetKey;
use crate::consts::*;
use crate::quiz::{Question, QuizError, SignSide};
use crate::secs_to_ticks;
use crate::settings::Settings;

/// Directional inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::Up, Key::Down, Key::Left, Key::Right];
}

/// Currently held directional inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    pub fn set(&mut self, key: Key, held: bool) {
        match key {
            Key::Up => self.up = held,
            Key::Down => self.down = held,
            Key::Left => self.left = held,
            Key::Right => self.right = held,
        }
    }
}

/// Driving scene state, advanced every tick by the physics integrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadState {
    pub speed: f32,
    pub max_speed: f32,
    /// Steering angle in [-MAX_TURN, MAX_TURN]
    pub turn_angle: f32,
    /// Car position relative to the road centre (negative = left)
    pub lateral_offset: f32,
    pub current_curve: f32,
    pub target_curve: f32,
    /// Distance left before a new curve is chosen
    pub remaining_section_distance: f32,
    /// Ground band scroll in [0, STRIPE_PERIOD)
    pub ground_stripe_offset: f32,
    /// Which colour the nearest band starts with
    pub ground_stripe_polarity: bool,
    /// Sky scroll in [0, VIEW_WIDTH)
    pub backdrop_offset: f32,
}

impl RoadState {
    pub fn new(max_speed: f32) -> Self {
        Self {
            speed: 0.0,
            max_speed,
            turn_angle: 0.0,
            lateral_offset: 0.0,
            current_curve: 0.0,
            target_curve: 0.0,
            remaining_section_distance: INITIAL_SECTION_LENGTH,
            ground_stripe_offset: 0.0,
            ground_stripe_polarity: false,
            backdrop_offset: 0.0,
        }
    }

    /// True once the car has run off the road and been stopped
    pub fn is_parked(&self) -> bool {
        self.lateral_offset.abs() > PARKING_OFFSET
    }
}

impl Default for RoadState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEED)
    }
}

/// The sign standing at the roadside while a question approaches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoleMarker {
    /// Distance travelled toward the viewer
    pub vertical_progress: f32,
    pub image: Option<AssetKey>,
    /// Whether the sign image is ready to draw
    pub is_loaded: bool,
    pub side: SignSide,
    /// Index into the session's question list
    pub question: usize,
}

impl PoleMarker {
    pub fn new(question: usize, q: &Question) -> Self {
        Self {
            vertical_progress: 0.0,
            image: q.asset(),
            is_loaded: false,
            side: q.side,
            question,
        }
    }

    /// Normalized approach in [0, 1], quadratic so the sign grows faster
    /// as it nears the viewer
    pub fn perspective(&self) -> f32 {
        let t = (self.vertical_progress / SIGN_DISTANCE).clamp(0.0, 1.0);
        t * t
    }
}

/// Sign spawner / question timer phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SignPhase {
    /// No sign; waiting before the next one
    Idle { wait_ticks: u32 },
    /// A sign is approaching
    Armed { marker: PoleMarker },
    /// The question is on screen and the countdown runs
    QuestionActive {
        marker: PoleMarker,
        remaining_ticks: u32,
    },
    /// Answer recorded; short pause before returning to Idle
    Resolving { wait_ticks: u32 },
    /// Every question has been shown
    Exhausted,
}

impl SignPhase {
    pub fn marker(&self) -> Option<&PoleMarker> {
        match self {
            SignPhase::Armed { marker } | SignPhase::QuestionActive { marker, .. } => Some(marker),
            _ => None,
        }
    }

    pub fn marker_mut(&mut self) -> Option<&mut PoleMarker> {
        match self {
            SignPhase::Armed { marker } | SignPhase::QuestionActive { marker, .. } => Some(marker),
            _ => None,
        }
    }

    pub fn is_question_active(&self) -> bool {
        matches!(self, SignPhase::QuestionActive { .. })
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Driving,
    Paused,
    /// Lives ran out; only a restart leaves this phase
    GameOver,
}

/// Score and remaining lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u32,
    pub lives: u8,
}

impl GameStats {
    pub fn new(lives: u8) -> Self {
        Self { score: 0, lives }
    }

    /// Apply one answer; returns true when this answer ended the game
    pub fn record(&mut self, correct: bool, score_value: u32) -> bool {
        if self.lives == 0 {
            return false;
        }
        if correct {
            self.score = self.score.saturating_add(score_value);
            false
        } else {
            self.lives -= 1;
            self.lives == 0
        }
    }
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(DEFAULT_LIVES)
    }
}

/// Outcome of one question, reported upward
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub correct: bool,
    /// None when the result was forced after the questions ran out
    pub question_id: Option<u64>,
    /// Sequence of the chosen option (None if nothing could be chosen)
    pub selected: Option<u32>,
    pub score_value: u32,
    pub timed_out: bool,
}

/// Things the host needs to react to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A sign started approaching
    SignArmed { question_id: u64 },
    /// The sign reached the viewer: pause driving and show the question
    QuestionDue { question_id: u64 },
    AnswerResolved(AnswerResult),
    QuestionsExhausted,
    GameOver { score: u32 },
    Restarted,
    HornChanged(bool),
    HeadlightsChanged(bool),
    PauseChanged(bool),
}

/// Timing and limits derived from settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pacing {
    pub spawn_delay_ticks: u32,
    pub resolve_delay_ticks: u32,
    pub question_secs: u32,
    pub starting_lives: u8,
    pub max_speed: f32,
}

impl From<&Settings> for Pacing {
    fn from(s: &Settings) -> Self {
        Self {
            spawn_delay_ticks: secs_to_ticks(s.spawn_delay_secs),
            resolve_delay_ticks: secs_to_ticks(s.resolve_delay_secs),
            question_secs: s.question_secs,
            starting_lives: s.starting_lives,
            max_speed: s.max_speed,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// One play session: road, input, spawner, stats and the question list
#[derive(Debug, Clone)]
pub struct GameSession {
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub pacing: Pacing,
    pub road: RoadState,
    pub keys: KeyState,
    pub sign: SignPhase,
    pub stats: GameStats,
    pub phase: GamePhase,
    pub questions: Vec<Question>,
    /// Next question to arm
    pub next_question: usize,
    pub horn: bool,
    pub headlights: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Start a session. A session cannot run without questions.
    pub fn new(questions: Vec<Question>, pacing: Pacing, seed: u64) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        log::info!(
            "Session started: {} questions, seed {}",
            questions.len(),
            seed
        );
        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            pacing,
            road: RoadState::new(pacing.max_speed),
            keys: KeyState::default(),
            sign: SignPhase::Idle {
                wait_ticks: pacing.spawn_delay_ticks,
            },
            stats: GameStats::new(pacing.starting_lives),
            phase: GamePhase::Driving,
            questions,
            next_question: 0,
            horn: false,
            headlights: false,
            time_ticks: 0,
            events: Vec::new(),
        })
    }

    /// Reinitialise the scene, spawner and stats. The RNG keeps running so
    /// each replay gets a different road.
    pub fn restart(&mut self) {
        self.road = RoadState::new(self.pacing.max_speed);
        self.keys = KeyState::default();
        self.sign = SignPhase::Idle {
            wait_ticks: self.pacing.spawn_delay_ticks,
        };
        self.stats = GameStats::new(self.pacing.starting_lives);
        self.phase = GamePhase::Driving;
        self.next_question = 0;
        self.horn = false;
        self.headlights = false;
        self.time_ticks = 0;
        self.events.push(GameEvent::Restarted);
        log::info!("Session restarted");
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The question currently on screen
    pub fn active_question(&self) -> Option<&Question> {
        match &self.sign {
            SignPhase::QuestionActive { marker, .. } => self.questions.get(marker.question),
            _ => None,
        }
    }

    /// Whole seconds left on the question countdown
    pub fn remaining_secs(&self) -> Option<u32> {
        match &self.sign {
            SignPhase::QuestionActive {
                remaining_ticks, ..
            } => Some(remaining_ticks.div_ceil(TICK_RATE)),
            _ => None,
        }
    }

    /// Physics runs only while driving with no question on screen
    pub fn is_driving(&self) -> bool {
        self.phase == GamePhase::Driving && !self.sign.is_question_active()
    }
}
