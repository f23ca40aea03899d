// End-to-end game scenarios driven headlessly through `GameDriver`.
// Commands go in, events come out; the `DrawList` surface stands in for the canvas.

use roadwise::consts::*;
use roadwise::quiz::parse_questions;
use roadwise::renderer::{DrawCommand, DrawList};
use roadwise::sim::{AnswerResult, Command, GameEvent, GamePhase, Key, RoadState, SignPhase};
use roadwise::{GameDriver, Settings, assets};

const QUESTIONS: &str = r#"{
    "stop": {"id": 1, "name": "What must you do here?", "sequence": 1,
             "metadata": {"ans": "2", "image": "stop.png", "position": "RIGHT"},
             "options": [{"id": 10, "toolTip": "Slow down", "sequence": 1},
                         {"id": 11, "toolTip": "Stop", "sequence": 2},
                         {"id": 12, "toolTip": "Honk", "sequence": 3}]},
    "school": {"id": 2, "name": "This sign warns of...", "sequence": 2,
               "metadata": {"ans": 1, "image": "school_zone.png", "position": "LEFT", "score": "25"},
               "options": [{"id": 20, "toolTip": "A school", "sequence": 1},
                           {"id": 21, "toolTip": "A market", "sequence": 2}]},
    "horn": {"id": 3, "name": "What is prohibited?", "sequence": 3,
             "metadata": {"ans": "2", "image": "horn_prohibited.png"},
             "options": [{"id": 30, "toolTip": "Parking", "sequence": 1},
                         {"id": 31, "toolTip": "Horn", "sequence": 2}]}
}"#;

fn driver_with(json: &str) -> GameDriver {
    GameDriver::new(parse_questions(json).unwrap(), &Settings::default(), 99).unwrap()
}

fn driver() -> GameDriver {
    driver_with(QUESTIONS)
}

/// Hold the throttle until a question comes up; returns its id
fn drive_to_question(driver: &mut GameDriver) -> u64 {
    driver.send(Command::Press(Key::Up));
    for _ in 0..10_000 {
        for event in driver.step() {
            if let GameEvent::QuestionDue { question_id } = event {
                return question_id;
            }
        }
    }
    panic!("no question came up");
}

fn answers(events: &[GameEvent]) -> Vec<AnswerResult> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::AnswerResolved(r) => Some(r.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn unanswered_question_times_out_after_twenty_seconds() {
    let mut d = driver();
    assert_eq!(drive_to_question(&mut d), 1);

    let budget = DEFAULT_QUESTION_SECS * TICK_RATE;
    for _ in 0..budget - 1 {
        assert!(answers(&d.step()).is_empty());
    }

    let results = answers(&d.step());
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert!(!result.correct);
    assert!(result.timed_out);
    // First option that is not the right one
    assert_eq!(result.selected, Some(1));
    assert_eq!(result.question_id, Some(1));
    assert_eq!(d.session().stats.lives, 2);
    assert_eq!(d.session().stats.score, 0);

    // Only one result per question
    for _ in 0..budget {
        let events = d.step();
        assert!(answers(&events).iter().all(|r| r.question_id != Some(1)));
    }
}

#[test]
fn correct_answer_scores_once_and_keeps_lives() {
    let mut d = driver();
    drive_to_question(&mut d);

    d.send(Command::SelectOption(2));
    let results = answers(&d.step());
    assert_eq!(results.len(), 1);
    assert!(results[0].correct);
    assert!(!results[0].timed_out);
    assert_eq!(d.session().stats.score, 10);
    assert_eq!(d.session().stats.lives, 3);

    // A second click on the same question does nothing
    d.send(Command::SelectOption(2));
    assert!(answers(&d.step()).is_empty());
    assert_eq!(d.session().stats.score, 10);
}

#[test]
fn question_score_overrides_default() {
    let mut d = driver();
    drive_to_question(&mut d);
    d.send(Command::SelectOption(2));
    d.step();

    assert_eq!(drive_to_question(&mut d), 2);
    d.send(Command::SelectOption(1));
    d.step();
    assert_eq!(d.session().stats.score, 35);
}

#[test]
fn unknown_option_is_ignored() {
    let mut d = driver();
    drive_to_question(&mut d);
    d.send(Command::SelectOption(9));
    assert!(answers(&d.step()).is_empty());
    assert!(d.session().sign.is_question_active());
}

#[test]
fn losing_every_life_ends_the_game_and_restart_recovers() {
    let mut d = driver();
    let mut events = Vec::new();
    for _ in 0..3 {
        drive_to_question(&mut d);
        let wrong = d
            .session()
            .active_question()
            .and_then(|q| q.fallback_option())
            .map(|o| o.sequence)
            .unwrap();
        d.send(Command::SelectOption(wrong));
        events.extend(d.step());
    }

    assert!(events.contains(&GameEvent::GameOver { score: 0 }));
    assert_eq!(d.session().phase, GamePhase::GameOver);
    assert_eq!(d.session().stats.lives, 0);

    // Nothing advances after game over
    let ticks = d.session().time_ticks;
    let road = d.session().road.clone();
    for _ in 0..60 {
        d.step();
    }
    assert_eq!(d.session().time_ticks, ticks);
    assert_eq!(d.session().road, road);

    d.send(Command::Restart);
    let events = d.step();
    assert!(events.contains(&GameEvent::Restarted));
    assert_eq!(d.session().phase, GamePhase::Driving);
    assert_eq!(d.session().stats.score, 0);
    assert_eq!(d.session().stats.lives, 3);
    assert_eq!(d.session().next_question, 0);
}

#[test]
fn repeated_restarts_give_the_same_road() {
    let mut d = driver();
    d.send(Command::Press(Key::Up));
    d.send(Command::Press(Key::Left));
    for _ in 0..300 {
        d.step();
    }

    d.send(Command::Restart);
    d.step();
    let first = d.session().road.clone();
    d.send(Command::Restart);
    d.step();
    assert_eq!(d.session().road, first);

    // One idle tick after restart leaves the road untouched
    assert_eq!(first, RoadState::new(DEFAULT_MAX_SPEED));
    assert!(!d.session().keys.up);
}

#[test]
fn running_out_of_questions_ends_the_game() {
    let one = r#"{"only": {"id": 7, "name": "Only one", "metadata": {"ans": 1},
                 "options": [{"id": 70, "toolTip": "Yes", "sequence": 1},
                             {"id": 71, "toolTip": "No", "sequence": 2}]}}"#;
    let mut d = driver_with(one);
    drive_to_question(&mut d);
    d.send(Command::SelectOption(1));
    d.step();

    let mut events = Vec::new();
    for _ in 0..10_000 {
        events.extend(d.step());
        if d.session().phase == GamePhase::GameOver {
            break;
        }
    }
    assert!(events.contains(&GameEvent::QuestionsExhausted));
    assert!(events.contains(&GameEvent::GameOver { score: 10 }));
    assert_eq!(d.session().sign, SignPhase::Exhausted);
}

#[test]
fn question_clock_keeps_running_while_paused() {
    let mut d = driver();
    drive_to_question(&mut d);
    let road = d.session().road.clone();

    d.send(Command::TogglePause);
    let budget = DEFAULT_QUESTION_SECS * TICK_RATE;
    for _ in 0..budget - 1 {
        assert!(answers(&d.step()).is_empty());
    }
    assert_eq!(d.session().remaining_secs(), Some(1));

    // Answers are ignored while paused
    d.send(Command::SelectOption(2));
    let results = answers(&d.step());

    // ...and the timeout still lands on schedule
    assert_eq!(results.len(), 1);
    assert!(results[0].timed_out);
    assert!(!results[0].correct);
    assert_eq!(d.session().stats.lives, 2);
    assert_eq!(d.session().phase, GamePhase::Paused);
    assert_eq!(d.session().road, road);

    // Resuming does not reopen the question
    d.send(Command::TogglePause);
    d.send(Command::SelectOption(2));
    assert!(answers(&d.step()).is_empty());
    assert_eq!(d.session().stats.score, 0);
}

#[test]
fn question_frame_shows_sign_inset_and_car() {
    let mut d = driver();
    let mut surface = DrawList::with_images(assets::all());
    d.send(Command::Press(Key::Up));

    let mut now = 0.0;
    while !d.session().sign.is_question_active() {
        d.frame(now, &mut surface);
        now += SIM_DT_MS;
        assert!(now < 600_000.0, "no question came up");
    }

    let images: Vec<_> = surface.images().collect();
    assert!(images.contains(&assets::CAR));
    assert!(images.contains(&assets::SKY));
    assert!(images.contains(&assets::lookup("stop.png").unwrap()));
    assert!(
        surface
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::ImageCircle { .. }))
    );
}
