//! Headless tower defense game built on rampart game engine

use std::error::Error;

use rampart_core::{config::Config, state::GameState, DeltaTime, Engine};

use crate::states::PlayState;
use crate::systems::{HealthSystem, TowerAiSystem, WaveSystem};

mod components;
mod logger;
mod states;
mod systems;

const APP_NAME: &str = env!("CARGO_CRATE_NAME", "binary must be compiled by Cargo");
const APP_VERSION_STR: &str = env!("CARGO_PKG_VERSION", "binary must be compiled by Cargo");

/// Longest game allowed: two minutes at 60 frames per second.
const FRAME_LIMIT: u64 = 60 * 120;

/// Entry point of `rampart-rs` tower defense game
fn main() -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    let _handle = logger::init()?;
    log::info!("logger initialized successfully");

    let version = APP_VERSION_STR.parse()?;
    let config = Config::new(APP_NAME, version).with_frame_limit(Some(FRAME_LIMIT));

    let play = PlayState::new(&config)?
        .with_pause(DeltaTime::from_secs(5), DeltaTime::from_secs(1));
    let mut engine = Engine::new(config)?;
    engine.push_state(play)?;

    let frames = engine.run()?;
    log::info!("game is over after {} frames", frames);

    if let Some(play) = engine
        .states()
        .current()
        .and_then(|state| state.as_any().downcast_ref::<PlayState>())
    {
        log::info!(
            "played {:?}, castle health {:?}, {} enemies left",
            play.elapsed(),
            play.castle_health(),
            play.enemies_left(),
        );
        let world = play.world();
        if let (Some(waves), Some(towers), Some(health)) = (
            world.get_system::<WaveSystem>(),
            world.get_system::<TowerAiSystem>(),
            world.get_system::<HealthSystem>(),
        ) {
            log::info!(
                "{} enemies spawned, {} shots made, {} entities destroyed",
                waves.spawned(),
                towers.shots(),
                health.killed(),
            );
        }
        for (_, stats) in world.monitor().iter() {
            log::info!(
                "system `{}`: {} updates, average {:?}, {} entities",
                stats.name(),
                stats.updates(),
                stats.average(),
                stats.entities(),
            );
        }
    }
    Ok(())
}
