//! Fixed timestep simulation tick
//!
//! Applies queued host commands, then advances physics, curves and the sign
//! spawner by one step.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, GameSession, Key};
use super::{curve, physics, spawner};

/// Discrete commands from the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Press(Key),
    Release(Key),
    HornOn,
    HornOff,
    ToggleHeadlight,
    TogglePause,
    /// Back to a fresh session: road, spawner and stats reset
    Restart,
    /// Answer the question on screen with the option of this sequence
    SelectOption(u32),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub commands: Vec<Command>,
}

impl TickInput {
    pub fn with(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, input: &TickInput) {
    for command in &input.commands {
        apply_command(session, *command);
    }

    match session.phase {
        GamePhase::GameOver => return,
        GamePhase::Paused => {
            // The road stays put but a question on screen keeps counting down
            if session.sign.is_question_active() {
                spawner::advance(session);
            }
            return;
        }
        GamePhase::Driving => {}
    }

    session.time_ticks += 1;

    // Driving freezes while a question is on screen; its countdown does not
    if session.is_driving() {
        physics::integrate(&mut session.road, &session.keys);
        curve::advance(&mut session.road, &mut session.rng);
    }

    spawner::advance(session);
}

/// Apply one host command to the session
pub fn apply_command(session: &mut GameSession, command: Command) {
    match command {
        Command::Press(key) => session.keys.set(key, true),
        Command::Release(key) => session.keys.set(key, false),
        Command::HornOn | Command::HornOff => {
            let on = command == Command::HornOn;
            if session.horn != on {
                session.horn = on;
                session.emit(GameEvent::HornChanged(on));
            }
        }
        Command::ToggleHeadlight => {
            session.headlights = !session.headlights;
            let on = session.headlights;
            session.emit(GameEvent::HeadlightsChanged(on));
        }
        Command::TogglePause => {
            let paused = match session.phase {
                GamePhase::Driving => true,
                GamePhase::Paused => false,
                GamePhase::GameOver => return,
            };
            session.phase = if paused {
                GamePhase::Paused
            } else {
                GamePhase::Driving
            };
            session.emit(GameEvent::PauseChanged(paused));
        }
        Command::Restart => session.restart(),
        Command::SelectOption(sequence) => {
            if session.phase != GamePhase::Driving {
                log::warn!("Ignoring answer {} while {:?}", sequence, session.phase);
                return;
            }
            spawner::select_option(session, sequence);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::parse_questions;
    use crate::sim::state::{Pacing, SignPhase};

    const QUESTIONS: &str = r#"{
        "1": {"id": 1, "name": "Stop sign?", "metadata": {"ans": "1", "image": "stop.png"},
              "options": [{"id": 10, "toolTip": "Stop", "sequence": 1},
                          {"id": 11, "toolTip": "Go", "sequence": 2}]}
    }"#;

    fn session() -> GameSession {
        GameSession::new(parse_questions(QUESTIONS).unwrap(), Pacing::default(), 12345).unwrap()
    }

    #[test]
    fn test_press_and_release_drive_the_car() {
        let mut s = session();
        tick(&mut s, &TickInput::with([Command::Press(Key::Up)]));
        assert!(s.keys.up);
        assert!(s.road.speed > 0.0);

        tick(&mut s, &TickInput::with([Command::Release(Key::Up)]));
        assert!(!s.keys.up);
    }

    #[test]
    fn test_tick_pause() {
        let mut s = session();
        let pause = TickInput::with([Command::TogglePause]);

        tick(&mut s, &TickInput::with([Command::Press(Key::Up)]));
        let ticks = s.time_ticks;
        let road = s.road.clone();

        tick(&mut s, &pause);
        assert_eq!(s.phase, GamePhase::Paused);
        tick(&mut s, &TickInput::default());
        assert_eq!(s.time_ticks, ticks);
        assert_eq!(s.road, road);

        tick(&mut s, &pause);
        assert_eq!(s.phase, GamePhase::Driving);
        assert!(s.time_ticks > ticks);
    }

    #[test]
    fn test_question_clock_runs_while_paused() {
        let mut s = session();
        s.road.speed = 6.0;
        while !s.sign.is_question_active() {
            tick(&mut s, &TickInput::default());
            s.road.speed = 6.0;
        }
        let SignPhase::QuestionActive {
            remaining_ticks, ..
        } = s.sign
        else {
            unreachable!()
        };
        s.drain_events();

        tick(&mut s, &TickInput::with([Command::TogglePause]));
        let ticks = s.time_ticks;
        let road = s.road.clone();
        // The pausing tick already counted one
        for _ in 2..remaining_ticks {
            tick(&mut s, &TickInput::default());
        }
        assert_eq!(s.remaining_secs(), Some(1));
        assert_eq!(s.road, road);
        assert_eq!(s.time_ticks, ticks);

        // The last tick of the budget times out even though the game is paused
        s.drain_events();
        tick(&mut s, &TickInput::default());
        let events = s.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::AnswerResolved(r)] if r.timed_out && !r.correct
        ));
        assert_eq!(s.phase, GamePhase::Paused);

        // The resolve delay waits for the game to resume
        let waiting = s.sign.clone();
        for _ in 0..600 {
            tick(&mut s, &TickInput::default());
        }
        assert_eq!(s.sign, waiting);
    }

    #[test]
    fn test_horn_events_only_on_change() {
        let mut s = session();
        tick(
            &mut s,
            &TickInput::with([Command::HornOn, Command::HornOn, Command::HornOff]),
        );
        let events = s.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::HornChanged(true), GameEvent::HornChanged(false)]
        );
    }

    #[test]
    fn test_headlight_toggle() {
        let mut s = session();
        tick(&mut s, &TickInput::with([Command::ToggleHeadlight]));
        assert!(s.headlights);
        tick(&mut s, &TickInput::with([Command::ToggleHeadlight]));
        assert!(!s.headlights);
    }

    #[test]
    fn test_physics_freezes_during_question() {
        let mut s = session();
        s.road.speed = 6.0;
        let hold = TickInput::with([Command::Press(Key::Up)]);
        tick(&mut s, &hold);
        while !s.sign.is_question_active() {
            tick(&mut s, &TickInput::default());
            s.road.speed = 6.0;
        }
        let frozen = s.road.clone();
        let SignPhase::QuestionActive {
            remaining_ticks, ..
        } = s.sign
        else {
            unreachable!()
        };

        tick(&mut s, &TickInput::default());
        assert_eq!(s.road, frozen);
        assert!(matches!(
            s.sign,
            SignPhase::QuestionActive { remaining_ticks: r, .. } if r == remaining_ticks - 1
        ));
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs end up identical
        let mut a = session();
        let mut b = session();
        let inputs = [
            TickInput::with([Command::Press(Key::Up)]),
            TickInput::with([Command::Press(Key::Right)]),
            TickInput::default(),
            TickInput::with([Command::Release(Key::Right), Command::Press(Key::Left)]),
        ];
        for _ in 0..400 {
            for input in &inputs {
                tick(&mut a, input);
                tick(&mut b, input);
            }
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.road, b.road);
        assert_eq!(a.sign, b.sign);
    }
}
