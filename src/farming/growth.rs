//! Plant lifecycle — planting, the daily growth tick, harvest.

use std::collections::HashMap;

use crate::shared::*;

/// A growing crop on one cell. Stage is fractional so kinds can grow at
/// different daily rates; the visual frame is the floored stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub kind: SeedKind,
    pub stage: f32,
    pub harvestable: bool,
}

impl Plant {
    fn new(kind: SeedKind) -> Self {
        Self {
            kind,
            stage: 0.0,
            harvestable: false,
        }
    }

    /// Index of the growth frame to draw.
    pub fn frame(&self) -> usize {
        self.stage.floor() as usize
    }
}

/// Exclusively owns the mapping from planted cells to plants. Mutated only
/// through the soil orchestrator.
#[derive(Debug, Clone, Default)]
pub struct PlantGrowth {
    plants: HashMap<GridPos, Plant>,
}

impl PlantGrowth {
    /// Put a stage-0 plant on a cell. No-op if the cell is already
    /// occupied — one plant per cell.
    pub fn plant(&mut self, pos: GridPos, kind: SeedKind) -> bool {
        if self.plants.contains_key(&pos) {
            return false;
        }
        self.plants.insert(pos, Plant::new(kind));
        true
    }

    /// The once-per-day growth tick. Each plant on a cell that is watered
    /// *right now* advances by its kind's rate, clamped to the kind's max
    /// stage; dry cells do not grow. Growth is gated by water presence at
    /// tick time, not by watering history.
    pub fn tick(&mut self, watered: impl Fn(GridPos) -> bool, registry: &CropRegistry) {
        for (&pos, plant) in self.plants.iter_mut() {
            if !watered(pos) {
                continue;
            }
            let Some(def) = registry.get(plant.kind) else {
                continue;
            };
            plant.stage = (plant.stage + def.growth_rate).min(def.max_stage());
            plant.harvestable = plant.stage >= def.max_stage();
        }
    }

    /// Remove a mature plant and return its kind for inventory crediting.
    /// `None` if the cell is empty or the plant is not yet harvestable.
    pub fn harvest(&mut self, pos: GridPos) -> Option<SeedKind> {
        if !self.plants.get(&pos)?.harvestable {
            return None;
        }
        self.plants.remove(&pos).map(|p| p.kind)
    }

    pub fn get(&self, pos: GridPos) -> Option<&Plant> {
        self.plants.get(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &Plant)> {
        self.plants.iter().map(|(&pos, plant)| (pos, plant))
    }

    /// Cells holding a harvestable plant.
    pub fn ripe_cells(&self) -> Vec<GridPos> {
        self.plants
            .iter()
            .filter(|(_, p)| p.harvestable)
            .map(|(&pos, _)| pos)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}
