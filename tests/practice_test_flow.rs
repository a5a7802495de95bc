use std::sync::mpsc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use satprep::app::{App, AppScreen};
use satprep::bank::{BankError, QuestionBank, QuestionFilter, Section};
use satprep::config::Config;
use satprep::event::AppEvent;
use satprep::session::practice_test::{SubmitReason, TestPhase, TestPlan, TestSession};
use satprep::session::result::{NO_ANSWER, TestResult};
use satprep::session::timer::TimerState;

#[test]
fn bundled_bank_has_documented_sections() {
    let bank = QuestionBank::bundled();
    assert_eq!(bank.len(), 11);
    assert_eq!(bank.by_section(Section::Math).len(), 4);
    assert_eq!(bank.by_section(Section::Reading).len(), 3);
    assert_eq!(bank.by_section(Section::Writing).len(), 4);
    assert!(bank.all().iter().all(|q| q.options.len() == 4));
    assert_eq!(bank.get("reading_2").map(|q| q.section), Some(Section::Reading));
    assert!(bank.get("missing").is_none());
}

#[test]
fn malformed_table_is_rejected() {
    let json = r#"[{"id":"x","section":"math","difficulty":"easy","topic":"t",
        "question":"q","options":["a","b","c","d"],"correct_answer":7,"explanation":"e"}]"#;
    assert!(matches!(
        QuestionBank::from_json(json),
        Err(BankError::CorrectOutOfRange { .. })
    ));
    assert!(matches!(QuestionBank::from_json("{"), Err(BankError::Parse(_))));
}

#[test]
fn seeded_samples_repeat_and_stay_distinct() {
    let bank = QuestionBank::bundled();
    let ids = |seed| {
        let mut rng = SmallRng::seed_from_u64(seed);
        bank.random_sample(10, None, &mut rng)
            .into_iter()
            .map(|q| q.id.clone())
            .collect::<Vec<_>>()
    };
    let first = ids(42);
    assert_eq!(first, ids(42));
    assert_eq!(first.len(), 10);
    let mut unique = first.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 10);

    let mut rng = SmallRng::seed_from_u64(1);
    assert_eq!(bank.random_sample(10, Some(Section::Reading), &mut rng).len(), 3);
}

#[test]
fn half_right_scores_fifty_percent() {
    let bank = QuestionBank::bundled();
    let mut session = TestSession::new(TestPlan {
        length: 4,
        section: Some(Section::Math),
        time_limit_secs: 3600,
    });
    let mut rng = SmallRng::seed_from_u64(3);
    session.begin(bank, &mut rng).unwrap();
    assert_eq!(session.len(), 4);

    // Right on the first two, wrong on the third, skip the fourth.
    for _ in 0..2 {
        let correct = session.current_question().unwrap().correct_answer;
        session.select_answer(correct).unwrap();
        session.advance();
    }
    let wrong = (session.current_question().unwrap().correct_answer + 1) % 4;
    session.select_answer(wrong).unwrap();

    assert_eq!(session.submit(SubmitReason::Manual), Ok(true));
    assert_eq!(session.submit(SubmitReason::Manual), Ok(false));

    let result = TestResult::from_session(&session).unwrap();
    assert_eq!(result.score.correct, 2);
    assert_eq!(result.score.total, 4);
    assert_eq!(result.score.percent, 50);
    assert_eq!(result.review[3].chosen_text(), NO_ANSWER);
    assert!(!result.review[2].is_correct);
    assert_eq!(session.phase(), TestPhase::Completed);
    assert_eq!(session.timer_state(), TimerState::Stopped);
}

#[test]
fn filtered_pool_matches_browser_count() {
    let bank = QuestionBank::bundled();
    let mut filter = QuestionFilter::default();
    assert_eq!(bank.filtered(&filter).len(), 11);
    filter.cycle_section_forward();
    assert_eq!(bank.filtered(&filter).len(), 4);
}

#[test]
fn clock_thread_expires_the_test() {
    let (tx, rx) = mpsc::channel();
    let config = Config {
        test_length: 3,
        time_limit_secs: 2,
        ..Config::default()
    };
    let mut app = App::new(config, Some(11)).with_event_sender(tx);
    app.open_practice_test();
    app.start_test();
    app.select_answer(0);
    assert!(app.clock_running());

    while app.screen == AppScreen::PracticeTest {
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(AppEvent::Countdown(id)) => app.on_countdown(id),
            Ok(_) => {}
            Err(err) => panic!("clock stopped before expiry: {err}"),
        }
    }

    assert_eq!(app.screen, AppScreen::TestResult);
    assert!(!app.clock_running());
    let result = app.last_result.as_ref().unwrap();
    assert!(result.timed_out());
    assert_eq!(result.remaining_secs, 0);
    assert_eq!(result.score.total, 3);
    assert_eq!(app.results.len(), 1);
}
