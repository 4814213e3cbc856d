//! Visual synchronisation — derives sprite entities from soil state.
//!
//! Runs in PostUpdate, after all mutations for the frame have settled.
//! Three independent token sets: tilled-soil tiles (variant-driven), water
//! overlays, and plant sprites. Each sync pass spawns missing entities,
//! updates changed ones, and despawns stale ones.

use bevy::prelude::*;

use crate::shared::*;
use super::autotile::SoilVariant;
use super::soil::SoilField;
use super::{grid_to_world, FarmEntities};

#[derive(Component, Debug, Clone)]
pub struct SoilSprite {
    pub pos: GridPos,
    pub variant: SoilVariant,
}

#[derive(Component, Debug, Clone)]
pub struct WaterSprite {
    pub pos: GridPos,
}

#[derive(Component, Debug, Clone)]
pub struct PlantSprite {
    pub pos: GridPos,
}

/// Short-lived spark shown where a crop was collected.
#[derive(Component, Debug)]
pub struct HarvestParticle {
    pub timer: Timer,
}

/// Placeholder colour for a tilled tile. Edges read slightly lighter than
/// interior tiles so the autotile variants are visible without an atlas.
pub fn soil_color(variant: SoilVariant) -> Color {
    let open_edges = match variant {
        SoilVariant::Isolated => 4,
        SoilVariant::North
        | SoilVariant::South
        | SoilVariant::East
        | SoilVariant::West => 3,
        SoilVariant::NorthSouth
        | SoilVariant::EastWest
        | SoilVariant::NorthEast
        | SoilVariant::NorthWest
        | SoilVariant::SouthEast
        | SoilVariant::SouthWest => 2,
        SoilVariant::NorthSouthEast
        | SoilVariant::NorthSouthWest
        | SoilVariant::NorthEastWest
        | SoilVariant::SouthEastWest => 1,
        SoilVariant::All => 0,
    };
    let lift = open_edges as f32 * 0.02;
    Color::srgb(0.45 + lift, 0.32 + lift, 0.20 + lift)
}

/// Placeholder colour for a plant at a given growth frame: pale seedling
/// green ripening toward the kind's harvest colour.
pub fn plant_color(kind: SeedKind, frame: usize, frames: u8) -> Color {
    let progress = frame as f32 / (frames.saturating_sub(1).max(1)) as f32;
    let ripe = match kind {
        SeedKind::Corn => Vec3::new(0.9, 0.8, 0.2),
        SeedKind::Tomato => Vec3::new(0.85, 0.2, 0.15),
    };
    let seedling = Vec3::new(0.5, 0.75, 0.3);
    let rgb = seedling.lerp(ripe, progress);
    Color::srgb(rgb.x, rgb.y, rgb.z)
}

// ─────────────────────────────────────────────────────────────────────────────
// Soil tiles
// ─────────────────────────────────────────────────────────────────────────────

pub fn sync_soil_sprites(
    mut commands: Commands,
    mut entities: ResMut<FarmEntities>,
    field: Res<SoilField>,
    mut soil_query: Query<(&mut SoilSprite, &mut Sprite)>,
) {
    // Update variants that changed since the last frame.
    for (mut token, mut sprite) in soil_query.iter_mut() {
        if let Some(variant) = field.variant(token.pos) {
            if token.variant != variant {
                token.variant = variant;
                sprite.color = soil_color(variant);
            }
        }
    }

    // Spawn tiles that became tilled this frame.
    let missing: Vec<(GridPos, SoilVariant)> = field
        .variants()
        .iter()
        .filter(|(pos, _)| !entities.soil.contains_key(pos))
        .map(|(&pos, &variant)| (pos, variant))
        .collect();
    for (pos, variant) in missing {
        let entity = commands
            .spawn((
                Sprite {
                    color: soil_color(variant),
                    custom_size: Some(Vec2::splat(TILE_SIZE)),
                    ..default()
                },
                Transform::from_translation(grid_to_world(pos, Z_SOIL)),
                SoilSprite { pos, variant },
            ))
            .id();
        entities.soil.insert(pos, entity);
    }

    // Tilled ground is permanent in normal play, but stay symmetrical with
    // the other passes in case the field is ever reset.
    let stale: Vec<GridPos> = entities
        .soil
        .keys()
        .filter(|pos| !field.variants().contains_key(pos))
        .copied()
        .collect();
    for pos in stale {
        if let Some(entity) = entities.soil.remove(&pos) {
            commands.entity(entity).despawn();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Water overlays
// ─────────────────────────────────────────────────────────────────────────────

pub fn sync_water_sprites(
    mut commands: Commands,
    mut entities: ResMut<FarmEntities>,
    field: Res<SoilField>,
) {
    let watered = field.watered_cells();

    for &pos in &watered {
        if entities.water.contains_key(&pos) {
            continue;
        }
        let entity = commands
            .spawn((
                Sprite {
                    color: Color::srgba(0.15, 0.25, 0.6, 0.45),
                    custom_size: Some(Vec2::splat(TILE_SIZE)),
                    ..default()
                },
                Transform::from_translation(grid_to_world(pos, Z_WATER)),
                WaterSprite { pos },
            ))
            .id();
        entities.water.insert(pos, entity);
    }

    let stale: Vec<GridPos> = entities
        .water
        .keys()
        .filter(|pos| !watered.contains(pos))
        .copied()
        .collect();
    for pos in stale {
        if let Some(entity) = entities.water.remove(&pos) {
            commands.entity(entity).despawn();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plants
// ─────────────────────────────────────────────────────────────────────────────

pub fn sync_plant_sprites(
    mut commands: Commands,
    mut entities: ResMut<FarmEntities>,
    field: Res<SoilField>,
    registry: Res<CropRegistry>,
    mut plant_query: Query<(&PlantSprite, &mut Sprite)>,
) {
    // Recolour existing sprites as their plant's frame advances.
    for (token, mut sprite) in plant_query.iter_mut() {
        if let Some(plant) = field.plant(token.pos) {
            let frames = registry.get(plant.kind).map(|d| d.frames).unwrap_or(1);
            sprite.color = plant_color(plant.kind, plant.frame(), frames);
        }
    }

    let missing: Vec<(GridPos, SeedKind, usize)> = field
        .plants()
        .filter(|(pos, _)| !entities.plants.contains_key(pos))
        .map(|(pos, plant)| (pos, plant.kind, plant.frame()))
        .collect();
    for (pos, kind, frame) in missing {
        let frames = registry.get(kind).map(|d| d.frames).unwrap_or(1);
        let entity = commands
            .spawn((
                Sprite {
                    color: plant_color(kind, frame, frames),
                    custom_size: Some(Vec2::splat(TILE_SIZE * 0.6)),
                    ..default()
                },
                Transform::from_translation(grid_to_world(pos, Z_PLANT)),
                PlantSprite { pos },
            ))
            .id();
        entities.plants.insert(pos, entity);
    }

    // Despawn sprites whose plants were harvested.
    let stale: Vec<GridPos> = entities
        .plants
        .keys()
        .filter(|&&pos| field.plant(pos).is_none())
        .copied()
        .collect();
    for pos in stale {
        if let Some(entity) = entities.plants.remove(&pos) {
            commands.entity(entity).despawn();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Harvest particles
// ─────────────────────────────────────────────────────────────────────────────

/// Spawn a transient spark where each crop was collected.
pub fn spawn_harvest_particles(
    mut commands: Commands,
    mut harvested_events: EventReader<CropHarvestedEvent>,
) {
    for event in harvested_events.read() {
        commands.spawn((
            Sprite {
                color: Color::srgba(1.0, 0.95, 0.6, 0.9),
                custom_size: Some(Vec2::splat(TILE_SIZE * 0.3)),
                ..default()
            },
            Transform::from_translation(grid_to_world((event.col, event.row), Z_PLANT)),
            HarvestParticle {
                timer: Timer::from_seconds(0.4, TimerMode::Once),
            },
        ));
    }
}

pub fn tick_harvest_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(Entity, &mut HarvestParticle, &mut Sprite)>,
) {
    for (entity, mut particle, mut sprite) in particles.iter_mut() {
        particle.timer.tick(time.delta());
        if particle.timer.finished() {
            commands.entity(entity).despawn();
        } else {
            let alpha = 0.9 * particle.timer.fraction_remaining();
            sprite.color.set_alpha(alpha);
        }
    }
}
