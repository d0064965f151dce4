//! Integration tests for the navigation state machine.

use std::time::{Duration, Instant};

use kv_attention_tour::catalog;
use kv_attention_tour::nav::{Mode, Navigator, Phase, Track};
use proptest::prelude::*;

const INTERVAL: Duration = Duration::from_millis(2000);

fn len(track: Track) -> usize {
    catalog::steps(track).len()
}

/// Deliver one tick exactly at the pending deadline.
fn tick_at_deadline(nav: &mut Navigator, now: &mut Instant) -> bool {
    if let Some(deadline) = nav.timer().deadline() {
        *now = deadline;
    } else {
        *now += INTERVAL;
    }
    nav.tick(*now)
}

#[test]
fn test_initial_state() {
    let nav = Navigator::new(INTERVAL);
    let state = nav.state();

    assert_eq!(state.mode(), Mode::Overview);
    assert_eq!(state.phase(), Phase::One);
    assert_eq!(state.step(), 0);
    assert!(!state.autoplay());
    assert!(nav.catalog().is_none());
    assert!(nav.current().is_none());
}

#[test]
fn test_enter_detail_resets_for_every_track() {
    for track in Track::ALL {
        let mut nav = Navigator::new(INTERVAL);
        nav.enter_detail(Track::Prefill);
        nav.step_forward();
        nav.step_forward();
        nav.toggle_autoplay(Instant::now());

        nav.enter_detail(track);
        let state = nav.state();
        assert_eq!(state.mode(), Mode::Detail(track));
        assert_eq!(state.step(), 0);
        assert!(!state.autoplay());
        assert!(!nav.timer().is_armed());
    }
}

#[test]
fn test_step_forward_clamps_at_last() {
    for track in Track::ALL {
        let n = len(track);
        let mut nav = Navigator::new(INTERVAL);
        nav.enter_detail(track);

        for _ in 0..n - 1 {
            nav.step_forward();
        }
        assert_eq!(nav.state().step(), n - 1);

        nav.step_forward();
        assert_eq!(nav.state().step(), n - 1);
    }
}

#[test]
fn test_step_backward_never_below_zero() {
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Decoding);
    nav.step_forward();
    nav.step_forward();

    for _ in 0..10 {
        nav.step_backward();
    }
    assert_eq!(nav.state().step(), 0);
}

#[test]
fn test_step_backward_disabled_while_playing() {
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Prefill);
    nav.step_forward();
    nav.step_forward();
    nav.toggle_autoplay(Instant::now());

    nav.step_backward();
    assert_eq!(nav.state().step(), 2);
    assert!(nav.state().autoplay());
}

#[test]
fn test_toggle_at_end_rewinds() {
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::NoCache);
    for _ in 0..len(Track::NoCache) {
        nav.step_forward();
    }

    nav.toggle_autoplay(Instant::now());
    assert_eq!(nav.state().step(), 0);
    assert!(nav.state().autoplay());
}

#[test]
fn test_toggle_mid_track_keeps_step() {
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Prefill);
    nav.step_forward();
    nav.step_forward();

    nav.toggle_autoplay(Instant::now());
    assert_eq!(nav.state().step(), 2);
    assert!(nav.state().autoplay());
}

#[test]
fn test_toggle_off_cancels_timer() {
    let t0 = Instant::now();
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Decoding);
    nav.toggle_autoplay(t0);
    assert!(nav.timer().is_armed());

    nav.toggle_autoplay(t0);
    assert!(!nav.state().autoplay());
    assert!(!nav.timer().is_armed());

    assert!(!nav.tick(t0 + 10 * INTERVAL));
    assert_eq!(nav.state().step(), 0);
}

#[test]
fn test_tick_waits_for_interval() {
    let t0 = Instant::now();
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Prefill);
    nav.toggle_autoplay(t0);

    assert!(!nav.tick(t0 + Duration::from_millis(1999)));
    assert_eq!(nav.state().step(), 0);

    assert!(nav.tick(t0 + INTERVAL));
    assert_eq!(nav.state().step(), 1);
    assert_eq!(nav.time_until_tick(t0 + INTERVAL), Some(INTERVAL));
}

#[test]
fn test_each_tick_advances_exactly_one() {
    let mut now = Instant::now();
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Decoding);
    nav.toggle_autoplay(now);

    for expected in 1..len(Track::Decoding) {
        assert!(tick_at_deadline(&mut nav, &mut now));
        assert_eq!(nav.state().step(), expected);
    }
    assert!(!nav.state().autoplay());
}

#[test]
fn test_manual_forward_to_end_stops_playing() {
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Decoding);
    nav.toggle_autoplay(Instant::now());

    for _ in 0..len(Track::Decoding) - 1 {
        nav.step_forward();
    }
    assert_eq!(nav.state().step(), len(Track::Decoding) - 1);
    assert!(!nav.state().autoplay());
    assert!(!nav.timer().is_armed());
}

#[test]
fn test_return_to_overview_stops_and_keeps_phase() {
    let mut nav = Navigator::new(INTERVAL);
    nav.select_phase(Phase::Three);
    nav.enter_detail(Track::Prefill);
    nav.step_forward();
    nav.toggle_autoplay(Instant::now());

    nav.return_to_overview();
    let state = nav.state();
    assert_eq!(state.mode(), Mode::Overview);
    assert_eq!(state.phase(), Phase::Three);
    assert!(!state.autoplay());
    assert!(!nav.timer().is_armed());
}

#[test]
fn test_mode_change_leaves_no_stale_tick() {
    let t0 = Instant::now();
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Prefill);
    nav.toggle_autoplay(t0);
    assert!(nav.timer().deadline().is_some());

    nav.enter_detail(Track::Decoding);
    assert!(!nav.tick(t0 + INTERVAL));
    assert_eq!(nav.state().step(), 0);
    assert_eq!(nav.state().mode(), Mode::Detail(Track::Decoding));
}

#[test]
fn test_prefill_scenario() {
    let mut now = Instant::now();
    let mut nav = Navigator::new(INTERVAL);
    assert_eq!(nav.state().mode(), Mode::Overview);
    assert_eq!(nav.state().phase(), Phase::One);

    nav.enter_detail(Track::Prefill);
    assert_eq!(nav.state().mode(), Mode::Detail(Track::Prefill));
    assert_eq!(nav.state().step(), 0);
    assert!(!nav.state().autoplay());

    for _ in 0..6 {
        nav.step_forward();
    }
    assert_eq!(nav.state().step(), 6);
    nav.step_forward();
    assert_eq!(nav.state().step(), 6);

    nav.toggle_autoplay(now);
    assert_eq!(nav.state().step(), 0);
    assert!(nav.state().autoplay());

    for _ in 0..7 {
        tick_at_deadline(&mut nav, &mut now);
    }
    assert_eq!(nav.state().step(), 6);
    assert!(!nav.state().autoplay());
}

#[test]
fn test_no_cache_reentry_scenario() {
    let mut nav = Navigator::new(INTERVAL);
    nav.enter_detail(Track::Decoding);
    nav.step_forward();
    nav.step_forward();
    nav.toggle_autoplay(Instant::now());

    nav.return_to_overview();
    nav.enter_detail(Track::NoCache);

    let state = nav.state();
    assert_eq!(state.mode(), Mode::Detail(Track::NoCache));
    assert_eq!(state.step(), 0);
    assert!(!state.autoplay());
}

#[derive(Debug, Clone)]
enum Op {
    Enter(Track),
    Overview,
    Phase(Phase),
    Forward,
    Backward,
    Toggle,
    Tick(u64),
}

fn op() -> impl Strategy<Value = Op> {
    let track = prop::sample::select(Track::ALL.to_vec());
    let phase = prop::sample::select(Phase::ALL.to_vec());
    prop_oneof![
        track.prop_map(Op::Enter),
        Just(Op::Overview),
        phase.prop_map(Op::Phase),
        Just(Op::Forward),
        Just(Op::Backward),
        Just(Op::Toggle),
        (0u64..5000).prop_map(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn prop_invariants_hold(ops in prop::collection::vec(op(), 0..200)) {
        let mut now = Instant::now();
        let mut nav = Navigator::new(INTERVAL);

        for op in ops {
            let before = nav.state();
            match op {
                Op::Enter(track) => nav.enter_detail(track),
                Op::Overview => nav.return_to_overview(),
                Op::Phase(phase) => nav.select_phase(phase),
                Op::Forward => nav.step_forward(),
                Op::Backward => nav.step_backward(),
                Op::Toggle => nav.toggle_autoplay(now),
                Op::Tick(ms) => {
                    now += Duration::from_millis(ms);
                    nav.tick(now);
                }
            }
            let state = nav.state();

            match state.mode() {
                Mode::Overview => {
                    prop_assert!(!state.autoplay());
                    prop_assert!(!nav.timer().is_armed());
                }
                Mode::Detail(track) => {
                    prop_assert!(state.step() < len(track));
                    prop_assert_eq!(state.autoplay(), nav.timer().is_armed());
                }
            }

            if state.mode() != before.mode() {
                prop_assert_eq!(state.step(), 0);
                prop_assert!(!state.autoplay());
            }
            if state.step() > before.step() && state.mode() == before.mode() {
                prop_assert_eq!(state.step(), before.step() + 1);
            }
        }
    }
}
