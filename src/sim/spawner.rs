//! Sign spawner and question timer
//!
//! Idle -> Armed -> QuestionActive -> Resolving -> Idle, one sign at a time.
//! When the question list runs out the spawner parks in `Exhausted` and
//! ends the game.

use super::state::{AnswerResult, GameEvent, GamePhase, GameSession, PoleMarker, SignPhase};
use crate::consts::*;
use crate::secs_to_ticks;

/// What the current phase asks for after this tick's bookkeeping
enum Transition {
    Stay,
    ArmNext,
    ShowQuestion,
    TimeOut,
    BackToIdle,
}

/// Advance the spawner by one tick. The car's speed drives an approaching sign.
pub fn advance(session: &mut GameSession) {
    let speed = session.road.speed;

    let transition = match &mut session.sign {
        SignPhase::Idle { wait_ticks } => {
            *wait_ticks = wait_ticks.saturating_sub(1);
            if *wait_ticks == 0 {
                Transition::ArmNext
            } else {
                Transition::Stay
            }
        }
        SignPhase::Armed { marker } => {
            marker.vertical_progress += speed * SIGN_APPROACH_RATE;
            if marker.perspective() > SIGN_TRIGGER {
                Transition::ShowQuestion
            } else {
                Transition::Stay
            }
        }
        SignPhase::QuestionActive {
            remaining_ticks, ..
        } => {
            *remaining_ticks = remaining_ticks.saturating_sub(1);
            if *remaining_ticks == 0 {
                Transition::TimeOut
            } else {
                Transition::Stay
            }
        }
        SignPhase::Resolving { wait_ticks } => {
            *wait_ticks = wait_ticks.saturating_sub(1);
            if *wait_ticks == 0 {
                Transition::BackToIdle
            } else {
                Transition::Stay
            }
        }
        SignPhase::Exhausted => Transition::Stay,
    };

    match transition {
        Transition::Stay => {}
        Transition::ArmNext => arm_next(session),
        Transition::ShowQuestion => show_question(session),
        Transition::TimeOut => {
            let fallback = session
                .active_question()
                .and_then(|q| q.fallback_option())
                .map(|o| o.sequence);
            resolve(session, fallback, true);
        }
        Transition::BackToIdle => {
            session.sign = SignPhase::Idle {
                wait_ticks: session.pacing.spawn_delay_ticks,
            };
        }
    }
}

/// Player picked an option. Returns false when no question is on screen or
/// the sequence is not one of its options.
pub fn select_option(session: &mut GameSession, sequence: u32) -> bool {
    let Some(question) = session.active_question() else {
        log::warn!("Ignoring answer {}: no question active", sequence);
        return false;
    };
    if question.option(sequence).is_none() {
        log::warn!(
            "Ignoring answer {}: not an option of question {}",
            sequence,
            question.id
        );
        return false;
    }
    resolve(session, Some(sequence), false);
    true
}

fn arm_next(session: &mut GameSession) {
    let index = session.next_question;
    let Some(question) = session.questions.get(index) else {
        exhaust(session);
        return;
    };

    let marker = PoleMarker::new(index, question);
    let question_id = question.id;
    session.next_question += 1;
    session.sign = SignPhase::Armed { marker };
    session.emit(GameEvent::SignArmed { question_id });
    log::debug!("Sign armed for question {}", question_id);
}

fn show_question(session: &mut GameSession) {
    let SignPhase::Armed { marker } = std::mem::replace(&mut session.sign, SignPhase::Exhausted)
    else {
        return;
    };
    let Some(question) = session.questions.get(marker.question) else {
        return;
    };

    let secs = question.duration_or(session.pacing.question_secs);
    let question_id = question.id;
    session.sign = SignPhase::QuestionActive {
        marker,
        remaining_ticks: secs_to_ticks(secs as f32).max(1),
    };
    session.emit(GameEvent::QuestionDue { question_id });
    log::debug!("Question {} due, {}s to answer", question_id, secs);
}

fn resolve(session: &mut GameSession, selected: Option<u32>, timed_out: bool) {
    let Some(question) = session.active_question() else {
        return;
    };

    let result = AnswerResult {
        correct: selected.is_some_and(|s| question.is_correct(s)),
        question_id: Some(question.id),
        selected,
        score_value: question.score_value(),
        timed_out,
    };
    log::debug!(
        "Question {} resolved: correct={} timed_out={}",
        question.id,
        result.correct,
        timed_out
    );

    session.sign = SignPhase::Resolving {
        wait_ticks: session.pacing.resolve_delay_ticks,
    };
    record(session, result);
}

/// Out of questions: end the session by spending every remaining life
fn exhaust(session: &mut GameSession) {
    log::info!("All {} questions shown", session.questions.len());
    session.sign = SignPhase::Exhausted;
    session.emit(GameEvent::QuestionsExhausted);

    while session.stats.lives > 0 {
        record(
            session,
            AnswerResult {
                correct: false,
                question_id: None,
                selected: None,
                score_value: 0,
                timed_out: false,
            },
        );
    }
}

/// Report a result upward and apply it to the stats
fn record(session: &mut GameSession, result: AnswerResult) {
    let game_over = session.stats.record(result.correct, result.score_value);
    session.emit(GameEvent::AnswerResolved(result));
    if game_over {
        session.phase = GamePhase::GameOver;
        session.emit(GameEvent::GameOver {
            score: session.stats.score,
        });
        log::info!("Game over with score {}", session.stats.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Question;
    use crate::sim::state::Pacing;

    fn question(id: u64, correct: u32) -> Question {
        let json = format!(
            r#"{{"q": {{"id": {id}, "name": "q{id}", "metadata": {{"ans": {correct}}},
                "options": [{{"id": 1, "toolTip": "a", "sequence": 1}},
                            {{"id": 2, "toolTip": "b", "sequence": 2}}]}}}}"#
        );
        crate::quiz::parse_questions(&json).unwrap().remove(0)
    }

    fn session(count: u64) -> GameSession {
        let questions = (1..=count).map(|id| question(id, 2)).collect();
        let pacing = Pacing {
            spawn_delay_ticks: 2,
            resolve_delay_ticks: 2,
            ..Pacing::default()
        };
        GameSession::new(questions, pacing, 5).unwrap()
    }

    fn activate(session: &mut GameSession) {
        session.road.speed = 6.0;
        for _ in 0..1000 {
            advance(session);
            if session.sign.is_question_active() {
                return;
            }
        }
        panic!("question never became active");
    }

    #[test]
    fn test_idle_arms_after_delay() {
        let mut s = session(1);
        advance(&mut s);
        assert!(matches!(s.sign, SignPhase::Idle { .. }));
        advance(&mut s);
        assert!(matches!(s.sign, SignPhase::Armed { .. }));
        assert_eq!(s.drain_events(), vec![GameEvent::SignArmed { question_id: 1 }]);
    }

    #[test]
    fn test_stopped_car_never_reaches_sign() {
        let mut s = session(1);
        for _ in 0..500 {
            advance(&mut s);
        }
        assert!(matches!(s.sign, SignPhase::Armed { .. }));
    }

    #[test]
    fn test_correct_answer_scores_once() {
        let mut s = session(2);
        activate(&mut s);
        s.drain_events();

        assert!(select_option(&mut s, 2));
        assert!(!select_option(&mut s, 2));
        let events = s.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            GameEvent::AnswerResolved(AnswerResult { correct: true, .. })
        ));
        assert_eq!(s.stats.lives, DEFAULT_LIVES);
        assert_eq!(s.stats.score, DEFAULT_QUESTION_SCORE);
    }

    #[test]
    fn test_unknown_option_is_ignored() {
        let mut s = session(1);
        activate(&mut s);
        assert!(!select_option(&mut s, 9));
        assert!(s.sign.is_question_active());
    }

    #[test]
    fn test_resolving_returns_to_idle_without_marker() {
        let mut s = session(2);
        activate(&mut s);
        select_option(&mut s, 1);
        assert!(s.sign.marker().is_none());
        advance(&mut s);
        advance(&mut s);
        assert!(matches!(s.sign, SignPhase::Idle { .. }));
    }

    #[test]
    fn test_exhaustion_ends_game() {
        let mut s = session(1);
        activate(&mut s);
        select_option(&mut s, 2);
        s.drain_events();
        for _ in 0..10 {
            advance(&mut s);
        }
        assert_eq!(s.sign, SignPhase::Exhausted);
        assert_eq!(s.phase, GamePhase::GameOver);
        assert_eq!(s.stats.lives, 0);

        let events = s.drain_events();
        assert_eq!(events[0], GameEvent::QuestionsExhausted);
        let forced = events
            .iter()
            .filter(|e| matches!(e, GameEvent::AnswerResolved(r) if !r.correct))
            .count();
        assert_eq!(forced, DEFAULT_LIVES as usize);
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameOver {
                score: DEFAULT_QUESTION_SCORE
            })
        );
    }

    #[test]
    fn test_timeout_without_wrong_option_selects_nothing() {
        let mut only_right = question(1, 2);
        only_right.options.retain(|o| o.sequence == 2);
        let mut s = GameSession::new(vec![only_right], Pacing::default(), 1).unwrap();
        activate(&mut s);
        s.drain_events();
        while s.sign.is_question_active() {
            advance(&mut s);
        }
        let events = s.drain_events();
        assert!(matches!(
            &events[0],
            GameEvent::AnswerResolved(AnswerResult {
                correct: false,
                selected: None,
                timed_out: true,
                ..
            })
        ));
    }
}
