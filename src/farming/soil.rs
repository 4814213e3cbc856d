//! Soil orchestration — the single mutator of grid and plant state.
//!
//! `SoilField` owns the grid, the plants, and the cached autotile variant
//! set, and exposes the gameplay verbs. The systems at the bottom translate
//! cross-domain events (tool use, planting, day end) and player proximity
//! into those verbs. Invalid player actions are expected input and absorbed
//! as silent no-ops; nothing here returns a gameplay error.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::shared::*;
use super::autotile::{resolve_variant, SoilVariant};
use super::grid::FarmGrid;
use super::growth::{Plant, PlantGrowth};

/// The farmland. Sole owner and sole mutator of cultivation state; the
/// render layer and tests only read through the query methods.
#[derive(Resource, Debug, Clone)]
pub struct SoilField {
    grid: FarmGrid,
    plants: PlantGrowth,
    /// Autotile variant per tilled cell, regenerated only when tilled
    /// membership changes.
    variants: HashMap<GridPos, SoilVariant>,
}

impl SoilField {
    pub fn new(cols: i32, rows: i32, farmable: &HashSet<GridPos>) -> Result<Self, ConfigError> {
        Ok(Self {
            grid: FarmGrid::new(cols, rows, farmable)?,
            plants: PlantGrowth::default(),
            variants: HashMap::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn cell_at(&self, point: Vec2) -> Option<GridPos> {
        self.grid.cell_at(point)
    }

    pub fn state(&self, pos: GridPos) -> TileState {
        self.grid.state(pos)
    }

    pub fn variant(&self, pos: GridPos) -> Option<SoilVariant> {
        self.variants.get(&pos).copied()
    }

    pub fn variants(&self) -> &HashMap<GridPos, SoilVariant> {
        &self.variants
    }

    pub fn plant(&self, pos: GridPos) -> Option<&Plant> {
        self.plants.get(pos)
    }

    pub fn plants(&self) -> impl Iterator<Item = (GridPos, &Plant)> {
        self.plants.iter()
    }

    pub fn watered_cells(&self) -> Vec<GridPos> {
        self.grid.cells_where(|t| t.watered)
    }

    pub fn cell_rect(&self, pos: GridPos) -> Rect {
        self.grid.cell_rect(pos)
    }

    // ── Verbs ────────────────────────────────────────────────────────────

    /// Till the cell under `point`. No-op on non-farmable ground or ground
    /// already tilled. During rain the fresh furrow is watered immediately.
    /// Returns whether anything changed.
    pub fn till(&mut self, point: Vec2, raining: bool) -> bool {
        let Some(pos) = self.grid.cell_at(point) else {
            return false;
        };
        if self.grid.state(pos).tilled {
            return false;
        }
        self.grid.mutate(pos, |t| {
            t.tilled = true;
            if raining {
                t.watered = true;
            }
        });
        self.regenerate_variants_around(pos);
        true
    }

    /// Water the cell under `point`. Only tilled, currently dry cells
    /// accept water. Never touches the tilled variant set.
    pub fn water(&mut self, point: Vec2) -> bool {
        let Some(pos) = self.grid.cell_at(point) else {
            return false;
        };
        let state = self.grid.state(pos);
        if !state.tilled || state.watered {
            return false;
        }
        self.grid.mutate(pos, |t| t.watered = true);
        true
    }

    /// Rain: water every tilled, dry cell. Returns how many were soaked.
    pub fn water_all(&mut self) -> usize {
        let dry = self.grid.cells_where(|t| t.tilled && !t.watered);
        for &pos in &dry {
            self.grid.mutate(pos, |t| t.watered = true);
        }
        dry.len()
    }

    /// Clear `watered` everywhere — the day-start reset, before rain is
    /// reapplied.
    pub fn clear_water(&mut self) {
        for pos in self.grid.cells_where(|t| t.watered) {
            self.grid.mutate(pos, |t| t.watered = false);
        }
    }

    /// Sow a seed on the tilled cell under `point`. No-op on untilled
    /// ground or a cell that already holds a plant.
    pub fn plant_seed(&mut self, point: Vec2, kind: SeedKind) -> bool {
        let Some(pos) = self.grid.cell_at(point) else {
            return false;
        };
        if !self.grid.state(pos).tilled || self.grid.state(pos).planted {
            return false;
        }
        if !self.plants.plant(pos, kind) {
            return false;
        }
        self.grid.mutate(pos, |t| t.planted = true);
        true
    }

    /// Harvest every ripe plant whose tile intersects `hitbox`. All
    /// intersecting ripe cells are collected in one sweep; the cells are
    /// spatially disjoint so no tie-break is needed.
    pub fn harvest_sweep(&mut self, hitbox: Rect) -> Vec<(GridPos, SeedKind)> {
        let mut collected = Vec::new();
        for pos in self.plants.ripe_cells() {
            if self.grid.cell_rect(pos).intersect(hitbox).is_empty() {
                continue;
            }
            if let Some(kind) = self.plants.harvest(pos) {
                self.grid.mutate(pos, |t| t.planted = false);
                collected.push((pos, kind));
            }
        }
        collected
    }

    /// The day boundary. Ordering is load-bearing: plants grow against the
    /// water state as it stood overnight, then water clears, then the new
    /// day's rain re-soaks the field.
    pub fn advance_day(&mut self, raining_today: bool, registry: &CropRegistry) {
        let watered = self.grid.cells_where(|t| t.watered);
        let watered: HashSet<GridPos> = watered.into_iter().collect();
        self.plants.tick(|pos| watered.contains(&pos), registry);
        self.clear_water();
        if raining_today {
            self.water_all();
        }
    }

    /// Recompute the autotile variant for a cell and its four axis
    /// neighbors. Called whenever tilled membership changes; a neighbor's
    /// edge may open or close both ways.
    fn regenerate_variants_around(&mut self, (col, row): GridPos) {
        let cells = [
            (col, row),
            (col, row - 1),
            (col, row + 1),
            (col + 1, row),
            (col - 1, row),
        ];
        for pos in cells {
            if self.grid.tilled(pos) {
                self.variants.insert(pos, self.resolve_cell(pos));
            } else {
                self.variants.remove(&pos);
            }
        }
    }

    fn resolve_cell(&self, (col, row): GridPos) -> SoilVariant {
        // World space is y-up, so north is the row above.
        resolve_variant(
            self.grid.tilled((col, row + 1)),
            self.grid.tilled((col, row - 1)),
            self.grid.tilled((col + 1, row)),
            self.grid.tilled((col - 1, row)),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems — event plumbing into the verbs
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_hoe_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut field: ResMut<SoilField>,
    calendar: Res<Calendar>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::Hoe {
            continue;
        }
        if field.till(event.target, calendar.weather.is_rainy()) {
            debug!("[Farming] Tilled at {:?}", event.target);
        }
    }
}

pub fn handle_watering_can_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut field: ResMut<SoilField>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::WateringCan {
            continue;
        }
        field.water(event.target);
    }
}

pub fn handle_plant_seed(
    mut plant_events: EventReader<PlantSeedEvent>,
    mut field: ResMut<SoilField>,
) {
    for event in plant_events.read() {
        if field.plant_seed(event.target, event.kind) {
            info!("[Farming] Planted {} at {:?}", event.kind.name(), event.target);
        }
    }
}

/// Every frame, collect ripe plants the player is standing over. Emits one
/// `CropHarvestedEvent` per plant; the player domain credits the inventory.
pub fn harvest_under_player(
    mut field: ResMut<SoilField>,
    player_query: Query<&Transform, With<Player>>,
    mut harvested_events: EventWriter<CropHarvestedEvent>,
) {
    let Ok(transform) = player_query.get_single() else {
        return;
    };
    let hitbox = Rect::from_center_size(
        transform.translation.truncate(),
        Vec2::splat(TILE_SIZE * 0.8),
    );
    for ((col, row), kind) in field.harvest_sweep(hitbox) {
        info!("[Farming] Harvested {} at ({col}, {row})", kind.name());
        harvested_events.send(CropHarvestedEvent { kind, col, row });
    }
}

/// Day-end processing. Ordered after the calendar's transition resolution,
/// so `calendar.weather` is already the new day's roll.
pub fn on_day_end(
    mut day_end_events: EventReader<DayEndEvent>,
    mut field: ResMut<SoilField>,
    calendar: Res<Calendar>,
    registry: Res<CropRegistry>,
) {
    for event in day_end_events.read() {
        let raining = calendar.weather.is_rainy();
        field.advance_day(raining, &registry);
        info!(
            "[Farming] Day {} begins, rain: {}, plants: {}",
            event.new_day,
            raining,
            field.plants.len(),
        );
    }
}
