//! Headless integration tests for Tilth.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register only the
//! pure-logic systems (skipping all rendering/UI), and verify that the
//! soil lifecycle works correctly end to end.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::collections::HashSet;

use tilth::calendar::CalendarPlugin;
use tilth::data::{parse_farm_map, FARM_MAP};
use tilth::farming::soil::SoilField;
use tilth::farming::{FarmEntities, FarmingPlugin};
use tilth::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds a minimal Bevy app with all shared resources and events registered
/// but NO rendering, windowing, or asset loading.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    app.init_state::<GameState>();

    app.init_resource::<Calendar>().init_resource::<CropRegistry>();

    app.add_event::<DayEndEvent>()
        .add_event::<ToolUseEvent>()
        .add_event::<PlantSeedEvent>()
        .add_event::<CropHarvestedEvent>();

    app.add_plugins(FarmingPlugin);

    // Crop data, normally loaded by the DataPlugin in Loading state.
    let mut registry = app.world_mut().resource_mut::<CropRegistry>();
    tilth::data::populate_crops(&mut registry);

    app
}

/// A 3x3 field, every cell farmable.
fn open_field() -> SoilField {
    let farmable: HashSet<GridPos> = (0..3).flat_map(|c| (0..3).map(move |r| (c, r))).collect();
    SoilField::new(3, 3, &farmable).unwrap()
}

/// World-space centre of a cell.
fn centre((col, row): GridPos) -> Vec2 {
    Vec2::new(
        col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        row as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

fn enter_playing_state(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update(); // process state transition
}

fn registry() -> CropRegistry {
    let mut registry = CropRegistry::default();
    tilth::data::populate_crops(&mut registry);
    registry
}

/// The tile invariant chain must hold at every point after every
/// operation: planted ⇒ tilled ⇒ farmable, and untilled ⇒ unwatered.
fn assert_invariants(field: &SoilField, cols: i32, rows: i32) {
    for col in 0..cols {
        for row in 0..rows {
            let t = field.state((col, row));
            if t.planted {
                assert!(t.tilled, "planted but untilled at ({col}, {row})");
            }
            if t.tilled {
                assert!(t.farmable, "tilled but unfarmable at ({col}, {row})");
            }
            if !t.tilled {
                assert!(!t.watered, "watered but untilled at ({col}, {row})");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pure field logic
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_till_is_idempotent_and_respects_farmable() {
    let farmable: HashSet<GridPos> = [(1, 1)].into_iter().collect();
    let mut field = SoilField::new(3, 3, &farmable).unwrap();

    assert!(field.till(centre((1, 1)), false));
    let after_one = field.state((1, 1));

    // Second till on the same point changes nothing.
    assert!(!field.till(centre((1, 1)), false));
    assert_eq!(field.state((1, 1)), after_one);

    // Non-farmable ground rejects tilling silently.
    assert!(!field.till(centre((0, 0)), false));
    assert_eq!(field.state((0, 0)), TileState::default());
    assert_invariants(&field, 3, 3);
}

#[test]
fn test_water_requires_tilled_ground() {
    let mut field = open_field();
    assert!(!field.water(centre((0, 0))), "untilled ground holds no water");

    field.till(centre((0, 0)), false);
    assert!(field.water(centre((0, 0))));
    assert!(!field.water(centre((0, 0))), "already-watered cell is a no-op");
    assert_invariants(&field, 3, 3);
}

#[test]
fn test_water_all_then_clear_water_leaves_everything_dry() {
    let mut field = open_field();
    field.till(centre((0, 0)), false);
    field.till(centre((2, 1)), false);
    field.water(centre((0, 0)));

    // Rain soaks only the dry tilled cell.
    assert_eq!(field.water_all(), 1);
    assert_eq!(field.watered_cells().len(), 2);

    field.clear_water();
    assert!(field.watered_cells().is_empty());
    for col in 0..3 {
        for row in 0..3 {
            assert!(!field.state((col, row)).watered);
        }
    }
    assert_invariants(&field, 3, 3);
}

#[test]
fn test_till_during_rain_waters_immediately() {
    let mut field = open_field();
    field.till(centre((1, 1)), true);
    let state = field.state((1, 1));
    assert!(state.tilled && state.watered);
    assert_invariants(&field, 3, 3);
}

#[test]
fn test_plant_requires_tilled_and_empty_cell() {
    let mut field = open_field();
    assert!(!field.plant_seed(centre((1, 1)), SeedKind::Corn), "untilled");

    field.till(centre((1, 1)), false);
    assert!(field.plant_seed(centre((1, 1)), SeedKind::Corn));
    assert!(
        !field.plant_seed(centre((1, 1)), SeedKind::Tomato),
        "one plant per cell"
    );
    assert_eq!(field.plant((1, 1)).unwrap().kind, SeedKind::Corn);
    assert_invariants(&field, 3, 3);
}

#[test]
fn test_growth_gating_unwatered_plants_never_advance() {
    let reg = registry();
    let mut field = open_field();
    field.till(centre((0, 2)), false);
    field.plant_seed(centre((0, 2)), SeedKind::Corn);

    for _ in 0..10 {
        field.advance_day(false, &reg);
    }
    assert_eq!(field.plant((0, 2)).unwrap().stage, 0.0);
    assert!(!field.plant((0, 2)).unwrap().harvestable);
}

#[test]
fn test_growth_determinism_reaches_maturity_in_exact_day_count() {
    let reg = registry();
    for (kind, expected_days) in [
        // corn: max stage 3.0, rate 1.0 → 3 days
        (SeedKind::Corn, 3),
        // tomato: max stage 2.0, rate 0.7 → ceil(2.0 / 0.7) = 3 days
        (SeedKind::Tomato, 3),
    ] {
        let mut field = open_field();
        field.till(centre((1, 1)), false);
        field.plant_seed(centre((1, 1)), kind);
        field.water(centre((1, 1)));

        for day in 1..=expected_days {
            // Rain every day keeps the cell watered for the next tick.
            field.advance_day(true, &reg);
            let plant = field.plant((1, 1)).unwrap();
            assert_eq!(
                plant.harvestable,
                day >= expected_days,
                "{kind:?} day {day}"
            );
        }
    }
}

#[test]
fn test_growth_uses_overnight_water_not_the_cleared_state() {
    let reg = registry();
    let mut field = open_field();
    field.till(centre((1, 1)), false);
    field.plant_seed(centre((1, 1)), SeedKind::Corn);
    field.water(centre((1, 1)));

    // The new day is dry, but the plant grew against yesterday's water.
    field.advance_day(false, &reg);
    assert_eq!(field.plant((1, 1)).unwrap().stage, 1.0);
    assert!(field.watered_cells().is_empty());

    // Nothing was watered overnight, so the next tick does not grow.
    field.advance_day(false, &reg);
    assert_eq!(field.plant((1, 1)).unwrap().stage, 1.0);
}

#[test]
fn test_harvest_sweep_collects_only_ripe_intersecting_cells() {
    let reg = registry();
    let mut field = open_field();
    for pos in [(0, 0), (1, 0)] {
        field.till(centre(pos), false);
        field.plant_seed(centre(pos), SeedKind::Corn);
    }
    // Ripen both.
    for _ in 0..3 {
        field.advance_day(true, &reg);
    }

    // Hitbox over (0, 0) only.
    let hitbox = Rect::from_center_size(centre((0, 0)), Vec2::splat(TILE_SIZE * 0.5));
    let collected = field.harvest_sweep(hitbox);
    assert_eq!(collected, vec![((0, 0), SeedKind::Corn)]);
    assert!(!field.state((0, 0)).planted);
    assert!(field.state((0, 0)).tilled, "harvest keeps the furrow");
    assert!(field.state((1, 0)).planted, "out-of-reach crop stays");

    // A second sweep over the same cell returns nothing.
    assert!(field.harvest_sweep(hitbox).is_empty());
    assert_invariants(&field, 3, 3);
}

#[test]
fn test_harvest_sweep_collects_multiple_cells_at_once() {
    let reg = registry();
    let mut field = open_field();
    for pos in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        field.till(centre(pos), false);
        field.plant_seed(
            centre(pos),
            if pos.0 == 0 { SeedKind::Corn } else { SeedKind::Tomato },
        );
    }
    for _ in 0..3 {
        field.advance_day(true, &reg);
    }

    // A hitbox straddling all four cells collects all four.
    let hitbox = Rect::from_center_size(Vec2::splat(TILE_SIZE), Vec2::splat(TILE_SIZE * 1.5));
    let collected = field.harvest_sweep(hitbox);
    assert_eq!(collected.len(), 4);
    assert!(field.plants().next().is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Autotile variants through the field
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_tilling_updates_neighbor_variants_both_ways() {
    use tilth::farming::autotile::SoilVariant;

    let mut field = open_field();
    field.till(centre((1, 1)), false);
    assert_eq!(field.variant((1, 1)), Some(SoilVariant::Isolated));
    assert_eq!(field.variant((1, 0)), None, "untilled cells carry no variant");

    // Tilling the cell below reshapes both edges.
    field.till(centre((1, 0)), false);
    assert_eq!(field.variant((1, 1)), Some(SoilVariant::South));
    assert_eq!(field.variant((1, 0)), Some(SoilVariant::North));

    field.till(centre((1, 2)), false);
    assert_eq!(field.variant((1, 1)), Some(SoilVariant::NorthSouth));

    field.till(centre((0, 1)), false);
    field.till(centre((2, 1)), false);
    assert_eq!(field.variant((1, 1)), Some(SoilVariant::All));
    assert_eq!(field.variant((0, 1)), Some(SoilVariant::East));
}

#[test]
fn test_watering_and_planting_never_touch_variants() {
    let mut field = open_field();
    field.till(centre((1, 1)), false);
    let before = field.variants().clone();

    field.water(centre((1, 1)));
    field.plant_seed(centre((1, 1)), SeedKind::Corn);
    assert_eq!(field.variants(), &before);
}

#[test]
fn test_grid_edges_count_as_untilled_neighbors() {
    use tilth::farming::autotile::SoilVariant;

    // 1x1 grid: the only cell resolves as if surrounded by open space.
    let farmable: HashSet<GridPos> = [(0, 0)].into_iter().collect();
    let mut field = SoilField::new(1, 1, &farmable).unwrap();
    field.till(centre((0, 0)), false);
    assert_eq!(field.variant((0, 0)), Some(SoilVariant::Isolated));
}

// ─────────────────────────────────────────────────────────────────────────────
// End-to-end scenario (3x3, all farmable)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_season_scenario() {
    use tilth::farming::autotile::SoilVariant;

    let reg = registry();
    let mut field = open_field();

    field.till(centre((1, 1)), false);
    assert_eq!(field.variant((1, 1)), Some(SoilVariant::Isolated));

    field.till(centre((1, 0)), false);
    assert_eq!(field.variant((1, 1)), Some(SoilVariant::South));
    assert_eq!(field.variant((1, 0)), Some(SoilVariant::North));

    assert!(field.plant_seed(centre((1, 1)), SeedKind::Corn));
    assert_eq!(field.plant((1, 1)).unwrap().stage, 0.0);

    field.water(centre((1, 1)));
    for _ in 0..3 {
        field.advance_day(true, &reg);
        assert_invariants(&field, 3, 3);
    }
    let plant = field.plant((1, 1)).unwrap();
    assert!(plant.harvestable);
    assert_eq!(plant.frame(), 3, "corn shows its final frame");

    let hitbox = Rect::from_center_size(centre((1, 1)), Vec2::splat(TILE_SIZE * 0.8));
    assert_eq!(field.harvest_sweep(hitbox), vec![((1, 1), SeedKind::Corn)]);

    let state = field.state((1, 1));
    assert!(state.tilled && !state.planted);
    field.advance_day(false, &reg);
    assert!(!field.state((1, 1)).watered);
    assert_invariants(&field, 3, 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Event-driven systems
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_hoe_event_tills_through_the_system_layer() {
    let mut app = build_test_app();
    app.world_mut().insert_resource(open_field());
    enter_playing_state(&mut app);

    app.world_mut().send_event(ToolUseEvent {
        tool: ToolKind::Hoe,
        target: centre((2, 2)),
    });
    app.update();

    let field = app.world().resource::<SoilField>();
    assert!(field.state((2, 2)).tilled);
    assert!(!field.state((2, 2)).watered, "sunny day, no free water");
}

#[test]
fn test_hoe_event_during_rain_wets_the_furrow() {
    let mut app = build_test_app();
    app.world_mut().insert_resource(open_field());
    app.world_mut().resource_mut::<Calendar>().weather = Weather::Rainy;
    enter_playing_state(&mut app);

    app.world_mut().send_event(ToolUseEvent {
        tool: ToolKind::Hoe,
        target: centre((0, 1)),
    });
    app.update();

    let field = app.world().resource::<SoilField>();
    assert!(field.state((0, 1)).tilled && field.state((0, 1)).watered);
}

#[test]
fn test_day_end_event_runs_the_overnight_cycle() {
    let mut app = build_test_app();
    let mut field = open_field();
    field.till(centre((1, 1)), false);
    field.plant_seed(centre((1, 1)), SeedKind::Corn);
    field.water(centre((1, 1)));
    app.world_mut().insert_resource(field);
    enter_playing_state(&mut app);

    // The calendar has already rolled the new day's weather: rainy.
    app.world_mut().resource_mut::<Calendar>().weather = Weather::Rainy;
    app.world_mut().send_event(DayEndEvent { new_day: 2 });
    app.update();

    let field = app.world().resource::<SoilField>();
    assert_eq!(field.plant((1, 1)).unwrap().stage, 1.0, "grew on overnight water");
    assert!(field.state((1, 1)).watered, "rain re-soaked the furrow");
}

#[test]
fn test_player_walkover_harvests_and_emits_event() {
    let mut app = build_test_app();
    let reg = registry();
    let mut field = open_field();
    field.till(centre((1, 1)), false);
    field.plant_seed(centre((1, 1)), SeedKind::Tomato);
    field.water(centre((1, 1)));
    for _ in 0..3 {
        field.advance_day(true, &reg);
    }
    assert!(field.plant((1, 1)).unwrap().harvestable);
    app.world_mut().insert_resource(field);
    enter_playing_state(&mut app);

    // Stand the player on the ripe cell.
    app.world_mut().spawn((
        Player,
        Transform::from_translation(centre((1, 1)).extend(Z_PLAYER)),
    ));
    app.update();

    let field = app.world().resource::<SoilField>();
    assert!(field.plant((1, 1)).is_none());
    assert!(!field.state((1, 1)).planted);

    let events = app.world().resource::<Events<CropHarvestedEvent>>();
    let mut cursor = events.get_cursor();
    let harvested: Vec<_> = cursor.read(events).collect();
    assert_eq!(harvested.len(), 1);
    assert_eq!(harvested[0].kind, SeedKind::Tomato);
    assert_eq!((harvested[0].col, harvested[0].row), (1, 1));
}

#[test]
fn test_render_sync_mirrors_field_state() {
    let mut app = build_test_app();
    app.world_mut().insert_resource(open_field());
    enter_playing_state(&mut app);

    app.world_mut().send_event(ToolUseEvent {
        tool: ToolKind::Hoe,
        target: centre((1, 1)),
    });
    app.update();
    app.world_mut().send_event(ToolUseEvent {
        tool: ToolKind::WateringCan,
        target: centre((1, 1)),
    });
    app.update();

    let entities = app.world().resource::<FarmEntities>();
    assert_eq!(entities.soil.len(), 1);
    assert_eq!(entities.water.len(), 1);
    assert!(entities.plants.is_empty());
}

#[test]
fn test_sleep_key_starts_the_day_transition() {
    let mut app = build_test_app();
    app.add_plugins(CalendarPlugin);
    app.world_mut().insert_resource(open_field());
    app.world_mut().insert_resource(PlayerInput {
        sleep: true,
        ..default()
    });
    enter_playing_state(&mut app);

    app.update();
    app.update();
    let state = app.world().resource::<State<GameState>>();
    assert_eq!(state.get(), &GameState::Sleeping);
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bundled_farm_map_builds_a_field() {
    let (cols, rows, farmable) = parse_farm_map(FARM_MAP);
    let field = SoilField::new(cols, rows, &farmable).unwrap();
    let (col, row) = *farmable.iter().next().unwrap();
    assert!(field.state((col, row)).farmable);
}

#[test]
fn test_out_of_bounds_farmable_tile_is_a_config_error() {
    let farmable: HashSet<GridPos> = [(5, 5)].into_iter().collect();
    let err = SoilField::new(2, 2, &farmable).unwrap_err();
    assert!(matches!(err, ConfigError::FarmableOutOfBounds { .. }));
}

#[test]
fn test_registry_validation_catches_missing_crops() {
    let registry = CropRegistry::default();
    assert!(registry.validate().is_err());

    let mut registry = CropRegistry::default();
    tilth::data::populate_crops(&mut registry);
    assert!(registry.validate().is_ok());
}
