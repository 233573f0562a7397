use std::time::{Duration, Instant};

use tapr::input::InputKind;
use tapr::records::RecordSet;
use tapr::session::{Effect, Session, SessionMsg, MAX_HISTORY};
use tapr::stats::{classify, Comparison};

fn send(session: &mut Session, kind: InputKind, label: &str, now: Instant) -> Effect {
    session.handle(
        SessionMsg::InputOccurred {
            kind,
            label: label.to_string(),
        },
        now,
    )
}

#[test]
fn totals_always_balance_across_mixed_input() {
    let mut session = Session::new(0, RecordSet::default());
    let t0 = Instant::now();

    let script = [
        (InputKind::LeftClick, "Left Click"),
        (InputKind::LeftClick, "Left Click"),
        (InputKind::KeyPress, "Space"),
        (InputKind::RightClick, "Right Click"),
        (InputKind::KeyPress, "a"),
        (InputKind::KeyPress, "a"),
        (InputKind::LeftClick, "Left Click"),
    ];

    for (i, (kind, label)) in script.iter().enumerate() {
        send(
            &mut session,
            *kind,
            label,
            t0 + Duration::from_millis(i as u64 * 150),
        );
        assert_eq!(
            session.total_count,
            session.left_count + session.right_count + session.key_count,
            "invariant must hold after every event"
        );
    }

    assert_eq!(session.total_count, 7);
    assert_eq!(session.left_count, 3);
    assert_eq!(session.right_count, 1);
    assert_eq!(session.key_count, 3);
}

#[test]
fn sub_threshold_pairs_never_both_land_in_history() {
    let mut session = Session::new(0, RecordSet::default());
    let t0 = Instant::now();

    send(&mut session, InputKind::LeftClick, "Left Click", t0);
    send(
        &mut session,
        InputKind::LeftClick,
        "Left Click",
        t0 + Duration::from_millis(200),
    );
    // 7ms after the previous accepted event: dropped entirely
    let effect = send(
        &mut session,
        InputKind::LeftClick,
        "Left Click",
        t0 + Duration::from_millis(207),
    );
    assert_eq!(effect, Effect::None);

    assert_eq!(session.history.len(), 2);
    assert_eq!(session.total_count, 2);
    assert!(session
        .history
        .windows(2)
        .all(|w| w[0].interval_ms == 0 || w[0].interval_ms >= 10));
}

#[test]
fn history_keeps_the_latest_fifty() {
    let mut session = Session::new(0, RecordSet::default());
    let t0 = Instant::now();

    for i in 0..70u64 {
        send(
            &mut session,
            InputKind::KeyPress,
            "j",
            t0 + Duration::from_millis(i * 40),
        );
    }

    assert_eq!(session.history.len(), MAX_HISTORY);
    let seqs: Vec<u64> = session.history.iter().map(|e| e.sequence_number).collect();
    let expected: Vec<u64> = (21..=70).rev().collect();
    assert_eq!(seqs, expected);
}

#[test]
fn intervals_match_the_gaps_between_accepts() {
    let mut session = Session::new(0, RecordSet::default());
    let t0 = Instant::now();
    let gaps = [0u64, 130, 90, 210, 55];

    let mut at = 0u64;
    for gap in gaps {
        at += gap;
        send(
            &mut session,
            InputKind::LeftClick,
            "Left Click",
            t0 + Duration::from_millis(at),
        );
    }

    let recorded: Vec<u64> = session
        .history
        .iter()
        .rev()
        .map(|e| e.interval_ms)
        .collect();
    assert_eq!(recorded, gaps);
}

#[test]
fn macro_flag_tracks_interval_regularity() {
    // Five consecutive intervals inside [48, 52] -> warn
    let mut session = Session::new(0, RecordSet::default());
    let t0 = Instant::now();
    let mut at = 0u64;
    send(&mut session, InputKind::LeftClick, "Left Click", t0);
    for gap in [48u64, 52, 50, 49, 51] {
        at += gap;
        send(
            &mut session,
            InputKind::LeftClick,
            "Left Click",
            t0 + Duration::from_millis(at),
        );
    }
    assert!(session.macro_warning);

    // High-variance pattern -> no warning
    let mut session = Session::new(0, RecordSet::default());
    let mut at = 0u64;
    send(&mut session, InputKind::LeftClick, "Left Click", t0);
    for gap in [10u64, 500, 20, 480, 15] {
        at += gap;
        send(
            &mut session,
            InputKind::LeftClick,
            "Left Click",
            t0 + Duration::from_millis(at),
        );
    }
    assert!(!session.macro_warning);
}

#[test]
fn classification_brackets_the_baseline() {
    assert_eq!(classify(8.0).unwrap().category, Comparison::Above);
    assert_eq!(classify(5.0).unwrap().category, Comparison::Below);
    assert_eq!(classify(6.5).unwrap().category, Comparison::Average);
    assert_eq!(classify(0.0), None);
}

#[test]
fn reset_clears_state_but_not_records() {
    let mut session = Session::new(0, RecordSet::default());
    session.records.best_10s = 80;
    let t0 = Instant::now();

    for i in 0..12u64 {
        send(
            &mut session,
            InputKind::KeyPress,
            "k",
            t0 + Duration::from_millis(i * 60),
        );
    }
    assert!(session.macro_warning);
    assert!(!session.history.is_empty());

    session.handle(SessionMsg::ResetRequested, t0 + Duration::from_secs(2));

    assert!(!session.is_active());
    assert!(session.history.is_empty());
    assert!(session.chart.is_empty());
    assert!(!session.macro_warning);
    assert_eq!(session.total_count, 0);
    assert_eq!(session.records.best_10s, 80);
}
