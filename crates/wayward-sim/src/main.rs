//! Wayward behavior harness.
//!
//! Loads waypoint paths and a behavior config, then walks a single entity
//! along one path over a kinematic world, logging every notification.
//!
//! Run with `RUST_LOG=wayward=debug` for per-step detail.

mod scenario;

use anyhow::{bail, Context, Result};
use clap::Parser;
use scenario::{Arrival, SimEngine, SimMotion, SimWorld};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wayward_behavior::{
    BehaviorConfig, BehaviorController, ControlSurface, DespawnState, MovementKind, PathStore,
    QuestService, QuestStatus, SharedPaths, WorldQuery,
};
use wayward_common::{EntityId, PathId, Position, QuestId};

/// Distance the escorting party trails behind the entity.
const PARTY_TRAIL: f32 = 2.0;

type SimController = BehaviorController<SimMotion, SimWorld, SimEngine>;

/// Walks one scripted entity along a waypoint path
#[derive(Parser, Debug)]
#[command(name = "wayward-sim")]
#[command(about = "Walks one scripted entity along a waypoint path", long_about = None)]
#[command(version)]
struct Args {
    /// RON file with waypoint paths
    #[arg(long, default_value = "crates/wayward-sim/data/paths.ron")]
    paths: PathBuf,

    /// TOML behavior config (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to walk
    #[arg(long, default_value_t = 1)]
    path: u32,

    /// Restart the path when it ends
    #[arg(long)]
    repeat: bool,

    /// Walk instead of run
    #[arg(long)]
    walk: bool,

    /// Escort a party that trails the entity
    #[arg(long)]
    party: bool,

    /// Quest credited to the party at the last node
    #[arg(long, requires = "party")]
    quest: Option<u32>,

    /// Despawn delay after the quest completes
    #[arg(long, default_value_t = 0)]
    despawn_ms: u32,

    /// Milliseconds per tick
    #[arg(long, default_value_t = 100)]
    tick_ms: u32,

    /// Maximum number of ticks
    #[arg(long, default_value_t = 1200)]
    ticks: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("wayward=info".parse()?))
        .init();

    let args = Args::parse();
    info!("Wayward sim {}", env!("CARGO_PKG_VERSION"));

    let config = args
        .config
        .as_deref()
        .map(BehaviorConfig::load_from)
        .unwrap_or_default();

    let paths = Arc::new(PathStore::new());
    paths
        .load_file(&args.paths)
        .with_context(|| format!("failed to load paths from {}", args.paths.display()))?;

    let me = EntityId::new();
    let spawn = Position::default();
    let mut world = SimWorld::new(me, spawn);
    let quest = args.quest.map(QuestId::new);

    let party = args.party.then(EntityId::new);
    if let Some(party) = party {
        world.add_party(party, spawn);
        if let Some(quest) = quest {
            world.set_quest_status(party, quest, QuestStatus::Incomplete);
        }
    }

    let engine = SimEngine::new(Arc::clone(&paths), quest, args.despawn_ms);
    let shared: SharedPaths = paths;
    let mut controller = BehaviorController::new(me, SimMotion::new(spawn), world, shared, config, engine);

    controller.initialize();
    controller.start_path(!args.walk, Some(PathId::new(args.path)), args.repeat, party);
    if controller.escort_state().is_empty() {
        bail!("path {} could not be started", args.path);
    }

    let ticks = run(&mut controller, &args, party);

    if let (Some(party), Some(quest)) = (party, quest) {
        let status = controller.world().quest_status(party, quest);
        info!(quest = quest.raw(), ?status, "Quest outcome");
    }
    info!(
        ticks,
        events = controller.engine().events().len(),
        "Simulation finished"
    );
    Ok(())
}

/// Runs the tick loop. Returns the number of ticks simulated.
fn run(controller: &mut SimController, args: &Args, party: Option<EntityId>) -> u32 {
    let me = controller.me();
    for tick in 0..args.ticks {
        controller.update(args.tick_ms);

        let here = controller.world().position(me).unwrap_or_default();
        let (next, arrival) = controller.motion_mut().step(here, args.tick_ms);
        controller.world_mut().set_position(me, next);
        if let Some(party) = party {
            let behind = next.to_vec3() - glam::Vec3::new(PARTY_TRAIL, 0.0, 0.0);
            controller
                .world_mut()
                .set_position(party, Position::from_vec3(behind, next.facing));
        }

        match arrival {
            Some(Arrival::Point(id)) => controller.movement_inform(MovementKind::Point, id),
            Some(Arrival::Home) => controller.just_reached_home(),
            None => {}
        }

        if controller.world().is_despawned() {
            info!(tick, "Entity removed");
            return tick + 1;
        }
        let idle = controller.despawn().state() == DespawnState::Inactive;
        if controller.escort_state().is_empty() && idle {
            info!(tick, "Escort finished");
            return tick + 1;
        }
    }
    args.ticks
}
