//! Player domain — movement, action selection, tool use, inventory credit.
//!
//! The farming domain never sees the player directly (beyond the `Player`
//! marker for harvest proximity); everything flows through ToolUseEvent /
//! PlantSeedEvent, and harvested produce comes back as CropHarvestedEvent.

use bevy::prelude::*;

use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Inventory>()
            .init_resource::<CurrentAction>()
            .add_systems(OnEnter(GameState::Playing), spawn_player)
            .add_systems(
                Update,
                (select_action, move_player, use_action, credit_harvests)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// The player's selected hotbar action: hoe, watering can, or a seed packet.
#[derive(Resource, Debug, Clone, Default)]
pub struct CurrentAction(pub SelectedAction);

fn spawn_player(mut commands: Commands, existing: Query<(), With<Player>>) {
    // The Playing state is re-entered after every sleep transition.
    if !existing.is_empty() {
        return;
    }
    commands.spawn((
        Sprite {
            color: Color::srgb(0.9, 0.85, 0.7),
            custom_size: Some(Vec2::new(TILE_SIZE * 0.5, TILE_SIZE * 0.8)),
            ..default()
        },
        Transform::from_translation(Vec3::new(
            TILE_SIZE * 5.0,
            TILE_SIZE * 5.0,
            Z_PLAYER,
        )),
        Player,
        PlayerMovement::default(),
    ));
    info!("[Player] Spawned");
}

fn select_action(input: Res<PlayerInput>, mut action: ResMut<CurrentAction>) {
    let Some(slot) = input.select_slot else {
        return;
    };
    action.0 = match slot {
        1 => SelectedAction::Tool(ToolKind::Hoe),
        2 => SelectedAction::Tool(ToolKind::WateringCan),
        3 => SelectedAction::Seed(SeedKind::Corn),
        _ => SelectedAction::Seed(SeedKind::Tomato),
    };
    info!("[Player] Selected {:?}", action.0);
}

fn move_player(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut query: Query<(&mut Transform, &mut PlayerMovement), With<Player>>,
) {
    let Ok((mut transform, mut movement)) = query.get_single_mut() else {
        return;
    };
    let axis = input.move_axis;
    if axis == Vec2::ZERO {
        return;
    }
    transform.translation += (axis * movement.speed * time.delta_secs()).extend(0.0);

    // Facing follows the dominant axis, vertical winning ties.
    movement.facing = if axis.y.abs() >= axis.x.abs() {
        if axis.y > 0.0 { Facing::Up } else { Facing::Down }
    } else if axis.x > 0.0 {
        Facing::Right
    } else {
        Facing::Left
    };
}

/// The centre of the tile in front of the player — the target every tool
/// and seed action applies to.
pub fn target_point(transform: &Transform, facing: Facing) -> Vec2 {
    transform.translation.truncate() + facing.offset() * TILE_SIZE
}

fn use_action(
    input: Res<PlayerInput>,
    action: Res<CurrentAction>,
    query: Query<(&Transform, &PlayerMovement), With<Player>>,
    mut tool_events: EventWriter<ToolUseEvent>,
    mut plant_events: EventWriter<PlantSeedEvent>,
) {
    if !input.tool_use {
        return;
    }
    let Ok((transform, movement)) = query.get_single() else {
        return;
    };
    let target = target_point(transform, movement.facing);
    match action.0 {
        SelectedAction::Tool(tool) => {
            tool_events.send(ToolUseEvent { tool, target });
        }
        SelectedAction::Seed(kind) => {
            plant_events.send(PlantSeedEvent { target, kind });
        }
    }
}

/// Apply harvest results to the inventory. This is the consumer side of the
/// farming domain's harvest events.
fn credit_harvests(
    mut harvested_events: EventReader<CropHarvestedEvent>,
    mut inventory: ResMut<Inventory>,
) {
    for event in harvested_events.read() {
        inventory.credit(event.kind);
        info!(
            "[Player] +1 {} ({} total)",
            event.kind.name(),
            inventory.count(event.kind)
        );
    }
}
