//! Shared components, resources, events, and states for Tilth.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    /// Day-transition fade. `DayEndEvent` fires exactly once when it resolves.
    Sleeping,
}

// ═══════════════════════════════════════════════════════════════════════
// CALENDAR & WEATHER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Sunny,
    Rainy,
}

impl Weather {
    pub fn is_rainy(self) -> bool {
        matches!(self, Weather::Rainy)
    }
}

/// Day counter plus today's weather. Weather is rolled once per day
/// transition and never changes mid-day.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub day: u32,
    pub weather: Weather,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            day: 1,
            weather: Weather::Sunny,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn offset(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, 1.0),
            Facing::Down => Vec2::new(0.0, -1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Hoe,
    WateringCan,
}

/// What the player applies on tool use: a tool or a seed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectedAction {
    Tool(ToolKind),
    Seed(SeedKind),
}

impl Default for SelectedAction {
    fn default() -> Self {
        SelectedAction::Tool(ToolKind::Hoe)
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

#[derive(Component, Debug, Clone)]
pub struct PlayerMovement {
    pub facing: Facing,
    pub speed: f32,
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self {
            facing: Facing::Down,
            speed: PLAYER_SPEED,
        }
    }
}

/// Per-frame snapshot of player intent. Reset and re-read by the input
/// domain each frame; everything else only reads it.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub tool_use: bool,
    pub sleep: bool,
    /// 1-based hotbar slot the player just pressed, if any.
    pub select_slot: Option<u8>,
}

/// Harvested produce tally, credited from `CropHarvestedEvent`.
/// The farming domain never touches this; it only emits the event.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub produce: HashMap<SeedKind, u32>,
}

impl Inventory {
    pub fn credit(&mut self, kind: SeedKind) {
        *self.produce.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: SeedKind) -> u32 {
        self.produce.get(&kind).copied().unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FARMING
// ═══════════════════════════════════════════════════════════════════════

/// Grid coordinate, (col, row). Derived from a world point by floor
/// division by `TILE_SIZE`; hit-testing never yields an out-of-range pair.
pub type GridPos = (i32, i32);

/// Per-cell cultivation flags.
///
/// Invariant chain: `planted ⇒ tilled ⇒ farmable`, and
/// `!tilled ⇒ !watered`. `farmable` is permanent once set at
/// construction; `tilled` is permanent once set in normal play;
/// `watered` clears every day boundary; `planted` clears on harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileState {
    pub farmable: bool,
    pub tilled: bool,
    pub watered: bool,
    pub planted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedKind {
    Corn,
    Tomato,
}

impl SeedKind {
    pub const ALL: [SeedKind; 2] = [SeedKind::Corn, SeedKind::Tomato];

    pub fn name(self) -> &'static str {
        match self {
            SeedKind::Corn => "corn",
            SeedKind::Tomato => "tomato",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropDef {
    pub kind: SeedKind,
    pub name: String,
    /// Stage gained per watered day.
    pub growth_rate: f32,
    /// Number of visual growth frames. Max stage is `frames - 1`.
    pub frames: u8,
}

impl CropDef {
    pub fn max_stage(&self) -> f32 {
        (self.frames - 1) as f32
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CropRegistry {
    pub crops: HashMap<SeedKind, CropDef>,
}

impl CropRegistry {
    pub fn get(&self, kind: SeedKind) -> Option<&CropDef> {
        self.crops.get(&kind)
    }

    /// Every seed kind must carry a usable growth definition before play starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in SeedKind::ALL {
            let def = self
                .crops
                .get(&kind)
                .ok_or(ConfigError::MissingCropDef { kind })?;
            if def.growth_rate <= 0.0 || def.frames == 0 {
                return Err(ConfigError::MissingCropDef { kind });
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ERRORS — construction-time only; gameplay misuse is a silent no-op
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("farmable tile ({col}, {row}) lies outside the {cols}x{rows} grid")]
    FarmableOutOfBounds {
        col: i32,
        row: i32,
        cols: i32,
        rows: i32,
    },
    #[error("no growth definition for seed kind {kind:?}")]
    MissingCropDef { kind: SeedKind },
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Fired by the calendar exactly once per sleep transition, after the new
/// day's weather has been rolled.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub new_day: u32,
}

/// Player swings a tool at a world-space target point (the tile in front
/// of the player, resolved by the player domain).
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: ToolKind,
    pub target: Vec2,
}

/// Player uses a seed packet at a world-space target point.
#[derive(Event, Debug, Clone)]
pub struct PlantSeedEvent {
    pub target: Vec2,
    pub kind: SeedKind,
}

/// A mature crop was collected. The player domain credits the inventory;
/// the farming domain carries no inventory dependency.
#[derive(Event, Debug, Clone)]
pub struct CropHarvestedEvent {
    pub kind: SeedKind,
    pub col: i32,
    pub row: i32,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 64.0;
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

pub const PLAYER_SPEED: f32 = 200.0;

/// Daily chance that the new day starts rainy.
pub const RAIN_CHANCE: f64 = 0.3;

/// Draw depth, back to front: ground < soil < water overlay < plants.
pub const Z_SOIL: f32 = 1.0;
pub const Z_WATER: f32 = 2.0;
pub const Z_PLANT: f32 = 3.0;
pub const Z_PLAYER: f32 = 4.0;
