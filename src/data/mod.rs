//! Data layer — populates the crop registry and the soil field at startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills the CropRegistry
//! from hard-coded game-design data, parses the farm layout into the soil
//! field, then transitions the game into GameState::Playing.
//!
//! A configuration error here (out-of-bounds farmable tile, missing crop
//! definition) is fatal: it is logged and the app exits.

mod crops;
mod farm_map;

pub use crops::populate_crops;
pub use farm_map::{parse_farm_map, FARM_MAP};

use bevy::app::AppExit;
use bevy::prelude::*;

use crate::farming::soil::SoilField;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(
    mut commands: Commands,
    mut crop_registry: ResMut<CropRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit_events: EventWriter<AppExit>,
) {
    info!("[Data] Populating registries…");

    crops::populate_crops(&mut crop_registry);
    if let Err(err) = crop_registry.validate() {
        error!("[Data] Invalid crop configuration: {err}");
        exit_events.send(AppExit::error());
        return;
    }
    info!("[Data] Crops loaded: {}", crop_registry.crops.len());

    let (cols, rows, farmable) = parse_farm_map(FARM_MAP);
    let field = match SoilField::new(cols, rows, &farmable) {
        Ok(field) => field,
        Err(err) => {
            error!("[Data] Invalid farm layout: {err}");
            exit_events.send(AppExit::error());
            return;
        }
    };
    info!(
        "[Data] Farm grid {}x{}, {} farmable tiles",
        cols,
        rows,
        farmable.len()
    );
    commands.insert_resource(field);

    next_state.set(GameState::Playing);
}
