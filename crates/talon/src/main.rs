use crate::{
    engine::{Engine, EngineConfig},
    entities::{snapshot, EntityCaps, SpawnParams},
};
use clap::Parser;
use glam::Vec3;
use log::*;
use talon_utils::{color::RGBA8, ok, AnyResult};

pub mod cli;
pub mod engine;
pub mod entities;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn main() -> AnyResult {
    pretty_env_logger::formatted_builder()
        .format_indent(None)
        .format_timestamp(None)
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = cli::Args::parse();

    info!("Welcome to Talon Engine {VERSION}");

    let mut engine = Engine::new(EngineConfig {
        capacity: args.capacity,
        fixed_step: args.fixed_step(),
    })?;

    if !args.no_demo {
        spawn_demo_scene(&mut engine);
    }

    engine.run(args.frames);

    if let Some(path) = args.snapshot {
        let image = snapshot::write_snapshot(engine.pool())?;
        std::fs::write(&path, image.as_slice())?;
        info!("wrote {} snapshot bytes to {}", image.len(), path.display());
    }

    ok()
}

/// A small scene exercising every capability: a player, a chasing pack of
/// enemies, an orbiting satellite, a turret that shoots at whatever wanders
/// into its line, and some short-lived debris.
fn spawn_demo_scene(engine: &mut Engine) {
    let resources = engine.resources_mut();
    resources.register("models/player");
    resources.register("models/drone");
    resources.register("textures/tracer");

    let spawns = [
        SpawnParams {
            name: "player",
            caps: EntityCaps::PLAYER
                | EntityCaps::MOVER
                | EntityCaps::COLLIDER
                | EntityCaps::DESTROYABLE
                | EntityCaps::RENDERABLE,
            origin: Vec3::new(0.0, 0.5, 0.0),
            color: RGBA8::new(64, 160, 255, 255),
            ..Default::default()
        },
        SpawnParams {
            name: "camera",
            caps: EntityCaps::CAMERA,
            origin: Vec3::new(0.0, 6.0, -12.0),
            ..Default::default()
        },
        SpawnParams {
            name: "turret",
            caps: EntityCaps::SHOOTER | EntityCaps::RENDERABLE,
            origin: Vec3::new(-8.0, 1.0, 0.0),
            color: RGBA8::new(200, 200, 200, 255),
            ..Default::default()
        },
        SpawnParams {
            name: "satellite",
            caps: EntityCaps::SATELLITE | EntityCaps::RENDERABLE,
            origin: Vec3::new(0.0, 4.0, 0.0),
            color: RGBA8::new(255, 255, 128, 255),
            radius: 0.25,
            ..Default::default()
        },
    ];
    for params in spawns {
        if let Err(err) = engine.spawn(params) {
            warn!("demo spawn `{}` skipped: {err}", params.name);
        }
    }

    for i in 0..4 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_2;
        let params = SpawnParams {
            name: "drone",
            caps: EntityCaps::ENEMY
                | EntityCaps::MOVER
                | EntityCaps::COLLIDER
                | EntityCaps::DESTROYABLE
                | EntityCaps::RENDERABLE,
            origin: Vec3::new(angle.cos() * 15.0, 0.5, angle.sin() * 15.0),
            color: RGBA8::new(255, 80, 80, 255),
            ..Default::default()
        };
        if let Err(err) = engine.spawn(params) {
            warn!("demo spawn `drone` skipped: {err}");
        }
    }

    for i in 0..8 {
        let params = SpawnParams {
            name: "debris",
            caps: EntityCaps::MOVER | EntityCaps::COLLIDER | EntityCaps::RENDERABLE,
            origin: Vec3::new(i as f32 - 4.0, 3.0, 2.0),
            lifetime: 5.0 + i as f64 * 0.25,
            color: RGBA8::new(120, 120, 120, 255),
            radius: 0.2,
            ..Default::default()
        };
        match engine.spawn(params) {
            Ok(entity) => entity.velocity = Vec3::new(0.0, 2.0 + i as f32 * 0.5, -1.0),
            Err(err) => warn!("demo spawn `debris` skipped: {err}"),
        }
    }

    debug!("demo scene ready, {} entities", engine.pool().len());
}
