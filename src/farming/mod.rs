//! Farming domain — soil tilling, watering, planting, crop growth, harvest.
//!
//! Communicates with other domains exclusively through crate::shared
//! events/resources. Core state lives in [`soil::SoilField`]; everything in
//! here is plumbing between events, the field, and its sprites.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

pub mod autotile;
pub mod grid;
pub mod growth;
pub mod render;
pub mod soil;

/// Tracks which sprite entities exist keyed by grid position, one map per
/// visual token set.
#[derive(Resource, Default, Debug)]
pub struct FarmEntities {
    pub soil: HashMap<GridPos, Entity>,
    pub water: HashMap<GridPos, Entity>,
    pub plants: HashMap<GridPos, Entity>,
}

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FarmEntities>()
            .add_systems(
                Update,
                (
                    // Tool use responses — soil interaction
                    soil::handle_hoe_tool_use,
                    soil::handle_watering_can_tool_use,
                    soil::handle_plant_seed,
                    // Walking over a ripe crop collects it
                    soil::harvest_under_player,
                    // Overnight growth, water reset, rain reapplication
                    soil::on_day_end,
                )
                    .run_if(in_state(GameState::Playing)),
            )
            // Visual sync — runs after all state mutations for the frame
            .add_systems(
                PostUpdate,
                (
                    render::sync_soil_sprites,
                    render::sync_water_sprites,
                    render::sync_plant_sprites,
                    render::spawn_harvest_particles,
                    render::tick_harvest_particles,
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Convert a grid position to the world-space centre of its tile.
pub fn grid_to_world((col, row): GridPos, z: f32) -> Vec3 {
    Vec3::new(
        col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        row as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        z,
    )
}
