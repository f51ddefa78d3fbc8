use std::time::Duration;

use drop_catcher_core::{
    Command, DifficultyProfile, DropCategory, Event, PlayArea, RoundId, SpawnContext,
};
use drop_catcher_system_classifier::{DropClassifier, MIN_DROP_SIZE};
use drop_catcher_world::{self as world, query, World};

fn running_context(profile: DifficultyProfile) -> SpawnContext {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartRound { profile }, &mut events);
    query::spawn_context(&world)
}

#[test]
fn category_shares_follow_the_nested_split() {
    let context = running_context(DifficultyProfile::NORMAL);
    let mut classifier = DropClassifier::new(0x5eed_cafe);
    let draws = 100_000;

    let mut obstacle = 0u32;
    let mut clean = 0u32;
    let mut dirty = 0u32;
    for _ in 0..draws {
        match classifier.classify(&context).category {
            DropCategory::Obstacle => obstacle += 1,
            DropCategory::Clean => clean += 1,
            DropCategory::Dirty => dirty += 1,
        }
    }

    let share = |count: u32| f64::from(count) / f64::from(draws);
    assert!((share(obstacle) - 0.15).abs() < 0.01, "obstacle {}", share(obstacle));
    assert!((share(clean) - 0.5525).abs() < 0.01, "clean {}", share(clean));
    assert!((share(dirty) - 0.2975).abs() < 0.01, "dirty {}", share(dirty));
}

#[test]
fn drops_fit_inside_the_play_area() {
    let context = running_context(DifficultyProfile::HARD);
    let mut classifier = DropClassifier::new(7);

    for _ in 0..5_000 {
        let spec = classifier.classify(&context);
        assert!((MIN_DROP_SIZE..=50.0).contains(&spec.size), "size {}", spec.size);
        assert_eq!(spec.size.fract(), 0.0);
        assert!(spec.left >= 0.0);
        assert!(spec.left + spec.size <= context.play_area.width());
        assert_eq!(spec.left.fract(), 0.0);
        assert!(spec.fall_duration >= Duration::from_millis(1_199));
        assert!(spec.fall_duration <= Duration::from_millis(2_400));
    }
}

#[test]
fn faster_rounds_shorten_falls_down_to_the_floor() {
    let context = SpawnContext {
        speed_multiplier: 6.0,
        ..running_context(DifficultyProfile::NORMAL)
    };
    let mut classifier = DropClassifier::new(11);
    for _ in 0..1_000 {
        assert_eq!(
            classifier.classify(&context).fall_duration,
            Duration::from_millis(500)
        );
    }
}

#[test]
fn narrow_play_area_pins_drops_to_the_left_edge() {
    let context = SpawnContext {
        play_area: PlayArea::new(20.0, 400.0).expect("valid area"),
        ..running_context(DifficultyProfile::NORMAL)
    };
    let mut classifier = DropClassifier::new(3);
    for _ in 0..100 {
        assert_eq!(classifier.classify(&context).left, 0.0);
    }
}

#[test]
fn answers_only_spawn_slots_of_the_current_round() {
    let context = running_context(DifficultyProfile::NORMAL);
    let mut classifier = DropClassifier::new(1);
    let mut commands = Vec::new();
    classifier.handle(
        &[
            Event::SpawnRequested {
                round: context.round,
            },
            Event::SpawnRequested {
                round: RoundId::new(99),
            },
            Event::TimeAdvanced {
                dt: Duration::from_millis(16),
            },
        ],
        &context,
        &mut commands,
    );

    assert_eq!(commands.len(), 1);
    assert!(matches!(
        commands[0],
        Command::SpawnDrop { round, .. } if round == context.round
    ));
}

#[test]
fn same_seed_classifies_identically() {
    let context = running_context(DifficultyProfile::EASY);
    let mut first = DropClassifier::new(2024);
    let mut second = DropClassifier::new(2024);
    for _ in 0..256 {
        assert_eq!(first.classify(&context), second.classify(&context));
    }
}
