//! Integration tests for the session state machine.
//!
//! Drives full Work/Break cycles with explicit timestamps and checks the
//! transition, pause, reset and settings-change behaviour end to end.

use chrono::{DateTime, Duration, TimeZone, Utc};
use focusdial_core::{
    BreakKind, Event, MemoryStore, Phase, PomodoroSession, RawSettings, SessionConfig,
    SessionMachine, Snapshot,
};
use proptest::prelude::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()
}

/// Tick once per second until the phase changes or `limit` seconds pass.
fn run_phase(machine: &mut SessionMachine, now: &mut DateTime<Utc>, limit: u64) -> Vec<Event> {
    let start_phase = machine.phase();
    let mut events = Vec::new();
    for _ in 0..limit {
        *now += Duration::seconds(1);
        events.extend(machine.tick(*now));
        if machine.phase() != start_phase {
            break;
        }
    }
    events
}

#[test]
fn test_four_work_sessions_reach_the_long_break() {
    let config = SessionConfig::new(1500, 300, 900, 4).unwrap();
    let mut machine = SessionMachine::new(config);
    let mut now = t0();
    machine.activate();
    machine.start(now);

    let mut break_phases = Vec::new();
    for round in 1..=4 {
        assert_eq!(machine.phase(), Phase::Work);
        run_phase(&mut machine, &mut now, 1500);
        assert_eq!(machine.completed_work_sessions(), round);
        break_phases.push(machine.phase());
        if machine.phase() == Phase::ShortBreak {
            assert!(machine.is_running());
            run_phase(&mut machine, &mut now, 300);
        }
    }

    assert_eq!(
        break_phases,
        vec![
            Phase::ShortBreak,
            Phase::ShortBreak,
            Phase::ShortBreak,
            Phase::LongBreak
        ]
    );
    assert_eq!(machine.completed_work_sessions(), 4);
    assert_eq!(machine.remaining_seconds(), 900);
    assert!(!machine.is_running());
    assert!(machine.awaiting_cycle_decision());
}

#[test]
fn test_next_cycle_after_long_break() {
    let config = SessionConfig::new(60, 30, 90, 2).unwrap();
    let mut machine = SessionMachine::new(config);
    let mut now = t0();
    machine.activate();
    machine.start(now);

    run_phase(&mut machine, &mut now, 60);
    run_phase(&mut machine, &mut now, 30);
    let events = run_phase(&mut machine, &mut now, 60);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::CycleCompleted { completed_work_sessions: 2, .. })));
    assert_eq!(machine.phase(), Phase::LongBreak);

    // Ticks while waiting for the decision do nothing.
    run_phase(&mut machine, &mut now, 10);
    assert_eq!(machine.remaining_seconds(), 90);

    machine.continue_cycle(now);
    assert_eq!(machine.completed_work_sessions(), 0);
    let events = run_phase(&mut machine, &mut now, 90);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::BreakCompleted {
            kind: BreakKind::Long,
            duration_secs: 90,
            ..
        }
    )));
    assert_eq!(machine.phase(), Phase::Work);
    assert_eq!(machine.remaining_seconds(), 60);
    assert!(machine.is_running());
}

#[test]
fn test_sub_second_ticks_then_boundary() {
    let mut machine = SessionMachine::new(SessionConfig::default());
    machine.activate();
    machine.start(t0());

    machine.tick(t0() + Duration::milliseconds(150));
    machine.tick(t0() + Duration::milliseconds(400));
    assert_eq!(machine.remaining_seconds(), 1500);

    machine.tick(t0() + Duration::milliseconds(1050));
    assert_eq!(machine.remaining_seconds(), 1499);
}

#[test]
fn test_reset_after_partial_progress() {
    let mut machine = SessionMachine::new(SessionConfig::default());
    machine.activate();
    machine.start(t0());
    machine.tick(t0() + Duration::seconds(400));
    machine.reset();
    assert_eq!(machine.remaining_seconds(), 1500);
    assert!(!machine.is_running());
    assert_eq!(machine.phase(), Phase::Work);
}

#[test]
fn test_work_duration_change_while_running() {
    let mut session = PomodoroSession::new(MemoryStore::new());
    session.activate(None);
    session.start(t0());
    session.tick(t0() + Duration::seconds(60));
    assert_eq!(session.remaining_seconds(), 1440);

    let change_at = t0() + Duration::milliseconds(60_700);
    let raw = RawSettings {
        hours: "0".into(),
        minutes: "40".into(),
        ..RawSettings::default()
    };
    session.apply_settings(&raw, change_at);
    assert_eq!(session.remaining_seconds(), 2400);
    assert!(session.is_running());

    // The old anchor (t0 + 60s) would count a full second here.
    session.tick(t0() + Duration::milliseconds(61_200));
    assert_eq!(session.remaining_seconds(), 2400);
    session.tick(t0() + Duration::milliseconds(61_700));
    assert_eq!(session.remaining_seconds(), 2399);
}

proptest! {
    #[test]
    fn prop_work_completion_picks_break_by_cycle(
        work in 1u64..120,
        short in 1u64..60,
        long in 1u64..60,
        cycles in 1u32..6,
        rounds in 1u32..12,
    ) {
        let config = SessionConfig::new(work, short, long, cycles).unwrap();
        let mut machine = SessionMachine::new(config);
        let mut now = t0();
        machine.activate();
        machine.start(now);

        for _ in 0..rounds {
            prop_assert_eq!(machine.phase(), Phase::Work);
            let before = machine.completed_work_sessions();
            run_phase(&mut machine, &mut now, work);
            let expected = if (before + 1) % cycles != 0 {
                Phase::ShortBreak
            } else {
                Phase::LongBreak
            };
            prop_assert_eq!(machine.phase(), expected);
            prop_assert_eq!(machine.completed_work_sessions(), before + 1);

            if expected == Phase::LongBreak {
                machine.continue_cycle(now);
                run_phase(&mut machine, &mut now, long);
                prop_assert_eq!(machine.completed_work_sessions(), 0);
            } else {
                run_phase(&mut machine, &mut now, short);
            }
        }
    }

    #[test]
    fn prop_paused_ticks_change_nothing(
        progress in 0i64..1000,
        ticks in proptest::collection::vec(0i64..100_000, 0..20),
    ) {
        let mut machine = SessionMachine::new(SessionConfig::default());
        machine.activate();
        machine.start(t0());
        machine.tick(t0() + Duration::seconds(progress));
        machine.pause();
        let frozen = machine.snapshot();
        for offset in ticks {
            prop_assert!(machine.tick(t0() + Duration::milliseconds(offset)).is_empty());
        }
        prop_assert_eq!(machine.snapshot(), frozen);
    }

    #[test]
    fn prop_remaining_never_exceeds_phase_length(
        steps in proptest::collection::vec(1i64..5_000, 1..200),
    ) {
        let config = SessionConfig::new(30, 10, 20, 3).unwrap();
        let mut machine = SessionMachine::new(config);
        let mut now = t0();
        machine.activate();
        machine.start(now);
        for step in steps {
            now += Duration::milliseconds(step);
            machine.tick(now);
            if machine.awaiting_cycle_decision() {
                machine.continue_cycle(now);
            }
            prop_assert!(machine.remaining_seconds() <= machine.total_seconds());
            prop_assert!(machine.remaining_seconds() > 0);
        }
    }

    #[test]
    fn prop_snapshot_json_roundtrip(
        phase in prop_oneof![
            Just(Phase::Work),
            Just(Phase::ShortBreak),
            Just(Phase::LongBreak)
        ],
        remaining in 0u64..100_000,
        completed in 0u32..100,
        is_running in any::<bool>(),
    ) {
        let snapshot = Snapshot {
            phase,
            remaining_seconds: remaining,
            completed_work_sessions: completed,
            is_running,
            awaiting_cycle_decision: false,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed.phase, snapshot.phase);
        prop_assert_eq!(parsed.remaining_seconds, snapshot.remaining_seconds);
        prop_assert_eq!(parsed.completed_work_sessions, snapshot.completed_work_sessions);
    }
}
