use std::collections::BTreeMap;

use mine_defence_core::{
    CellCoord, Command, EnemyKind, GridConfig, Path, SpawnOrigin, SpawnOriginId, WaveConfig,
};
use mine_defence_system_spawning::{kind_for, Config, WaveSpawner};
use mine_defence_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn origin(id: u32, column: u32, row: u32) -> SpawnOrigin {
    SpawnOrigin {
        id: SpawnOriginId::new(id),
        cell: CellCoord::new(column, row),
    }
}

fn straight_path(start: CellCoord, goal: CellCoord) -> Option<Path> {
    Some(Path::new(vec![start, goal]))
}

#[test]
fn refuses_wave_without_origins() {
    let mut spawner = WaveSpawner::new(Config::new(&WaveConfig::default(), 7));
    let mut commands = Vec::new();

    let launched = spawner.try_spawn_wave(&[], CellCoord::new(10, 10), straight_path, &mut commands);

    assert!(!launched);
    assert!(commands.is_empty());
    assert_eq!(spawner.spawned(), 0);
    assert_eq!(spawner.waves(), 0);
}

#[test]
fn wave_sizes_and_multipliers_scale_with_spawn_count() {
    let mut spawner = WaveSpawner::new(Config::new(&WaveConfig::default(), 0x5eed));
    let origins = [origin(0, 0, 0), origin(1, 19, 19)];
    let base = CellCoord::new(10, 10);

    let mut sizes = Vec::new();
    for _ in 0..4 {
        let mut commands = Vec::new();
        let expected_multiplier = 1.1f32.powi(spawner.spawned() as i32);
        assert!(spawner.try_spawn_wave(&origins, base, straight_path, &mut commands));
        sizes.push(commands.len());

        for command in &commands {
            match command {
                Command::SpawnEnemy {
                    hp_multiplier,
                    origin,
                    path,
                    ..
                } => {
                    assert_eq!(*hp_multiplier, expected_multiplier);
                    assert!(origins.iter().any(|candidate| candidate.cell == *origin));
                    assert_eq!(path.start(), Some(*origin));
                    assert_eq!(path.goal(), Some(base));
                }
                other => panic!("unexpected command emitted: {other:?}"),
            }
        }
    }

    assert_eq!(sizes, vec![3, 4, 5, 7]);
    assert_eq!(spawner.spawned(), 19);
    assert_eq!(spawner.waves(), 4);
}

#[test]
fn early_spawns_are_always_normal() {
    for seed in 0..32 {
        let mut spawner = WaveSpawner::new(Config::new(&WaveConfig::default(), seed));
        let mut commands = Vec::new();
        assert!(spawner.try_spawn_wave(
            &[origin(0, 0, 0)],
            CellCoord::new(5, 5),
            straight_path,
            &mut commands,
        ));

        assert_eq!(commands.len(), 3);
        for command in commands {
            assert!(matches!(
                command,
                Command::SpawnEnemy {
                    kind: EnemyKind::Normal,
                    ..
                }
            ));
        }
    }
}

#[test]
fn late_spawns_follow_forty_forty_twenty_split() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x0bad_cafe);
    let trials = 20_000;
    let mut counts: BTreeMap<EnemyKind, u32> = BTreeMap::new();
    for _ in 0..trials {
        *counts.entry(kind_for(10, rng.gen::<f32>())).or_default() += 1;
    }

    let share = |kind| f64::from(counts.get(&kind).copied().unwrap_or(0)) / f64::from(trials);
    assert!((share(EnemyKind::Normal) - 0.4).abs() < 0.02);
    assert!((share(EnemyKind::Fast) - 0.4).abs() < 0.02);
    assert!((share(EnemyKind::Tank) - 0.2).abs() < 0.02);
}

#[test]
fn missing_route_yields_stationary_enemy() {
    let mut spawner = WaveSpawner::new(Config::new(&WaveConfig::default(), 3));
    let mut commands = Vec::new();

    assert!(spawner.try_spawn_wave(
        &[origin(0, 1, 1)],
        CellCoord::new(5, 5),
        |_, _| None,
        &mut commands,
    ));

    assert_eq!(commands.len(), 3);
    assert_eq!(spawner.spawned(), 3);
    for command in commands {
        match command {
            Command::SpawnEnemy { path, origin, .. } => {
                assert!(path.is_empty());
                assert_eq!(origin, CellCoord::new(1, 1));
            }
            other => panic!("unexpected command emitted: {other:?}"),
        }
    }
}

#[test]
fn routes_come_from_world_navigation() {
    let config = GridConfig {
        width: 20,
        height: 20,
        hazard_ratio: 0.0,
        safe_zone_size: 0,
        ..GridConfig::default()
    };
    let mut world = World::new(&config, 21).expect("valid config");
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Disclose {
            cell: CellCoord::new(0, 0),
        },
        &mut events,
    );
    world::apply(&mut world, Command::CreateSpawnOrigin, &mut events);

    let origins = query::spawn_origins(&world).to_vec();
    assert_eq!(origins.len(), 1);
    let base = query::base_center(&world);

    let mut spawner = WaveSpawner::new(Config::new(&WaveConfig::default(), 99));
    let mut commands = Vec::new();
    assert!(spawner.try_spawn_wave(
        &origins,
        base,
        |start, goal| query::find_path(&world, start, goal),
        &mut commands,
    ));

    for command in commands {
        let Command::SpawnEnemy { origin, ref path, .. } = command else {
            panic!("unexpected command emitted: {command:?}");
        };
        let distance = origin.manhattan_distance(base) as usize;
        assert_eq!(path.steps(), distance);

        let mut spawned = Vec::new();
        world::apply(&mut world, command.clone(), &mut spawned);
        assert_eq!(spawned.len(), 1);
    }
    assert_eq!(query::enemy_count(&world), 3);
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay(0x4d59_5df4_d0f3_3173);
    let second = replay(0x4d59_5df4_d0f3_3173);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.len(), 3 + 4 + 5 + 7 + 9);
}

fn replay(seed: u64) -> Vec<Command> {
    let origins = [origin(0, 0, 0), origin(1, 0, 19), origin(2, 19, 0)];
    let mut spawner = WaveSpawner::new(Config::new(&WaveConfig::default(), seed));
    let mut commands = Vec::new();
    for _ in 0..5 {
        let _ = spawner.try_spawn_wave(&origins, CellCoord::new(10, 10), straight_path, &mut commands);
    }
    commands
}
