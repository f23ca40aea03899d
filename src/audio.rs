//! Car horn using the Web Audio API
//!
//! Two detuned square waves held for as long as the horn is on. No sample
//! files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Horn pitches in Hz; a major third apart like a real two-tone horn
const HORN_TONES: [f32; 2] = [392.0, 494.0];
/// Fade in/out so the tone does not click
const RAMP_SECS: f64 = 0.03;

/// Sustained horn tone
pub struct Horn {
    ctx: Option<AudioContext>,
    /// Zero when muted
    volume: f32,
    voices: Vec<OscillatorNode>,
    gain: Option<GainNode>,
}

impl Horn {
    pub fn new(volume: f32) -> Self {
        // Audio may be unavailable (e.g. not a secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - horn disabled");
        }
        Self {
            ctx,
            volume: volume.clamp(0.0, 1.0),
            voices: Vec::new(),
            gain: None,
        }
    }

    /// Takes effect from the next press; silencing also cuts a sounding horn
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if self.volume <= 0.0 {
            self.stop();
        }
    }

    pub fn is_sounding(&self) -> bool {
        !self.voices.is_empty()
    }

    /// Start the horn; no-op if already sounding or silent
    pub fn start(&mut self) {
        let vol = self.volume;
        if vol <= 0.0 || self.is_sounding() {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let Ok(gain) = ctx.create_gain() else { return };
        if gain.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }
        let t = ctx.current_time();
        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.25, t + RAMP_SECS)
            .ok();

        for freq in HORN_TONES {
            let Ok(osc) = ctx.create_oscillator() else {
                continue;
            };
            osc.set_type(OscillatorType::Square);
            osc.frequency().set_value(freq);
            if osc.connect_with_audio_node(&gain).is_ok() && osc.start().is_ok() {
                self.voices.push(osc);
            }
        }
        self.gain = Some(gain);
    }

    /// Fade out and release the oscillators
    pub fn stop(&mut self) {
        let Some(ctx) = &self.ctx else { return };
        let t = ctx.current_time();
        if let Some(gain) = self.gain.take() {
            gain.gain().cancel_scheduled_values(t).ok();
            gain.gain().set_value_at_time(gain.gain().value(), t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(0.0, t + RAMP_SECS)
                .ok();
        }
        for osc in self.voices.drain(..) {
            osc.stop_with_when(t + RAMP_SECS).ok();
        }
    }

    /// Follow a horn state change from the simulation
    pub fn set_on(&mut self, on: bool) {
        if on {
            self.start();
        } else {
            self.stop();
        }
    }
}
