//! Game settings and tuning
//!
//! Persisted in LocalStorage on the web; native builds use defaults or a
//! JSON string supplied by the caller.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Loop ===
    /// Frame cap for the animation loop
    pub target_fps: u32,

    // === Quiz pacing ===
    /// Default seconds to answer a question
    pub question_secs: u32,
    /// Delay after a reset or an answer before the next sign appears
    pub spawn_delay_secs: f32,
    /// Pause after an answer before the scene resumes
    pub resolve_delay_secs: f32,
    /// Lives at session start
    pub starting_lives: u8,
    /// Where the question list is fetched from
    pub question_url: String,

    // === Driving ===
    pub max_speed: f32,
    /// Fixed RNG seed (None = seed from the clock)
    pub seed: Option<u64>,

    // === Audio ===
    /// Horn volume (0.0 - 1.0)
    pub horn_volume: f32,
    pub muted: bool,

    // === HUD ===
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_fps: TICK_RATE,

            question_secs: DEFAULT_QUESTION_SECS,
            spawn_delay_secs: 3.0,
            resolve_delay_secs: 1.5,
            starting_lives: DEFAULT_LIVES,
            question_url: "api/sample_questions.json".to_string(),

            max_speed: DEFAULT_MAX_SPEED,
            seed: None,

            horn_volume: 0.6,
            muted: false,

            show_fps: false,
        }
    }
}

impl Settings {
    /// Parse settings, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(|s| s.sanitized())
    }

    /// Clamp out-of-range values into something playable
    pub fn sanitized(mut self) -> Self {
        self.target_fps = self.target_fps.clamp(1, 240);
        self.question_secs = self.question_secs.clamp(1, 600);
        self.spawn_delay_secs = self.spawn_delay_secs.clamp(0.0, 60.0);
        self.resolve_delay_secs = self.resolve_delay_secs.clamp(0.0, 10.0);
        self.starting_lives = self.starting_lives.max(1);
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            self.max_speed = DEFAULT_MAX_SPEED;
        }
        self.horn_volume = self.horn_volume.clamp(0.0, 1.0);
        self
    }

    /// Effective horn volume (respects mute)
    pub fn effective_horn_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.horn_volume }
    }

    /// Flip mute, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "roadwise_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Stored settings unreadable: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
