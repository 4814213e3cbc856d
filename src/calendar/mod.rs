//! Calendar domain — the day/weather cycle.
//!
//! Responsible for:
//! - The sleep-triggered day transition (a short fade)
//! - Advancing the day counter when the fade resolves
//! - Rolling the new day's weather
//! - Sending DayEndEvent exactly once per transition
//!
//! The farming domain orders its day-end handling after the event, so by
//! the time it runs `Calendar.weather` is already the new day's roll.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

/// How long the sleep fade lasts.
const FADE_SECONDS: f32 = 1.2;

#[derive(Resource, Debug)]
pub struct SleepFade {
    pub timer: Timer,
}

/// Full-screen black node faded in over the transition.
#[derive(Component, Debug)]
pub struct SleepOverlay;

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            trigger_sleep.run_if(in_state(GameState::Playing)),
        )
        .add_systems(OnEnter(GameState::Sleeping), begin_fade)
        .add_systems(Update, run_fade.run_if(in_state(GameState::Sleeping)));
    }
}

/// Player presses the sleep key: start the day transition.
fn trigger_sleep(
    input: Res<PlayerInput>,
    calendar: Res<Calendar>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.sleep {
        return;
    }
    info!("[Calendar] Going to sleep on day {}", calendar.day);
    next_state.set(GameState::Sleeping);
}

fn begin_fade(mut commands: Commands) {
    commands.insert_resource(SleepFade {
        timer: Timer::from_seconds(FADE_SECONDS, TimerMode::Once),
    });
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        SleepOverlay,
    ));
}

/// Drive the fade; when it completes, advance the day, roll weather, fire
/// the day-end event once, and return to play. The day change happens
/// atomically at the conclusion of the transition, never partially.
fn run_fade(
    mut commands: Commands,
    time: Res<Time>,
    mut fade: ResMut<SleepFade>,
    mut overlay: Query<(Entity, &mut BackgroundColor), With<SleepOverlay>>,
    mut calendar: ResMut<Calendar>,
    mut day_end_events: EventWriter<DayEndEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    fade.timer.tick(time.delta());

    for (_, mut background) in overlay.iter_mut() {
        background.0.set_alpha(fade.timer.fraction().min(1.0));
    }

    if !fade.timer.just_finished() {
        return;
    }

    calendar.day += 1;
    calendar.weather = roll_weather();
    info!(
        "[Calendar] Day {} dawns, weather: {:?}",
        calendar.day, calendar.weather
    );
    day_end_events.send(DayEndEvent {
        new_day: calendar.day,
    });

    for (entity, _) in overlay.iter() {
        commands.entity(entity).despawn();
    }
    commands.remove_resource::<SleepFade>();
    next_state.set(GameState::Playing);
}

pub fn roll_weather() -> Weather {
    if rand::thread_rng().gen_bool(RAIN_CHANCE) {
        Weather::Rainy
    } else {
        Weather::Sunny
    }
}
