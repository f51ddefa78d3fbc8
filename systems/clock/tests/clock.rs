use std::time::Duration;

use drop_catcher_core::{Command, DifficultyProfile, Event, RoundOutcome, RoundPhase};
use drop_catcher_system_clock::RoundClock;
use drop_catcher_world::{self as world, query, World};

fn pump(world: &mut World, clock: &mut RoundClock, command: Command) -> Vec<Event> {
    let mut seen = Vec::new();
    let mut pending = vec![command];
    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        clock.handle(&events, &mut pending);
        seen.extend(events);
    }
    seen
}

fn short_profile(duration_secs: u32) -> DifficultyProfile {
    DifficultyProfile {
        duration_secs,
        ..DifficultyProfile::NORMAL
    }
}

#[test]
fn ticks_once_per_elapsed_second() {
    let mut world = World::new();
    let mut clock = RoundClock::new();
    let _ = pump(
        &mut world,
        &mut clock,
        Command::StartRound {
            profile: short_profile(30),
        },
    );
    assert_eq!(clock.armed_round(), Some(query::round(&world)));

    for _ in 0..9 {
        let _ = pump(
            &mut world,
            &mut clock,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
        );
    }
    assert_eq!(query::round_state(&world).remaining_seconds(), 30);

    let events = pump(
        &mut world,
        &mut clock,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
    );
    assert!(events.contains(&Event::ClockTicked {
        round: query::round(&world),
        remaining_seconds: 29,
    }));
}

#[test]
fn timeout_ends_round_as_survived() {
    let mut world = World::new();
    let mut clock = RoundClock::new();
    let _ = pump(
        &mut world,
        &mut clock,
        Command::StartRound {
            profile: short_profile(3),
        },
    );
    let round = query::round(&world);

    let events = pump(
        &mut world,
        &mut clock,
        Command::Tick {
            dt: Duration::from_secs(3),
        },
    );

    assert_eq!(query::phase(&world), RoundPhase::Ended);
    assert_eq!(query::outcome(&world), Some(RoundOutcome::Survived));
    assert_eq!(
        events.last(),
        Some(&Event::RoundEnded {
            round,
            score: 0,
            outcome: RoundOutcome::Survived,
        })
    );
    assert_eq!(clock.armed_round(), None);
}

#[test]
fn surplus_ticks_after_timeout_are_ignored() {
    let mut world = World::new();
    let mut clock = RoundClock::new();
    let _ = pump(
        &mut world,
        &mut clock,
        Command::StartRound {
            profile: short_profile(2),
        },
    );

    let events = pump(
        &mut world,
        &mut clock,
        Command::Tick {
            dt: Duration::from_secs(10),
        },
    );

    let ticked = events
        .iter()
        .filter(|event| matches!(event, Event::ClockTicked { .. }))
        .count();
    assert_eq!(ticked, 2, "ticks queued past the end must not apply");
    assert_eq!(query::round_state(&world).remaining_seconds(), 0);
}

#[test]
fn nothing_ticks_after_the_round_ends() {
    let mut world = World::new();
    let mut clock = RoundClock::new();
    let _ = pump(
        &mut world,
        &mut clock,
        Command::StartRound {
            profile: short_profile(1),
        },
    );
    let _ = pump(
        &mut world,
        &mut clock,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
    );

    for _ in 0..5 {
        let events = pump(
            &mut world,
            &mut clock,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
        );
        assert!(events.is_empty());
    }
}

#[test]
fn restarting_discards_the_partial_second() {
    let mut world = World::new();
    let mut clock = RoundClock::new();
    let _ = pump(
        &mut world,
        &mut clock,
        Command::StartRound {
            profile: short_profile(1),
        },
    );
    let _ = pump(
        &mut world,
        &mut clock,
        Command::Tick {
            dt: Duration::from_millis(1_000),
        },
    );
    assert_eq!(query::phase(&world), RoundPhase::Ended);

    let _ = pump(
        &mut world,
        &mut clock,
        Command::StartRound {
            profile: short_profile(5),
        },
    );
    let events = pump(
        &mut world,
        &mut clock,
        Command::Tick {
            dt: Duration::from_millis(999),
        },
    );
    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::ClockTicked { .. })));
}
