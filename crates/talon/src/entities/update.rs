//! Per-frame entity update dispatch
//!
//! `EntityPool::update` runs once per frame, single-threaded. For every
//! occupied slot it checks lifetime expiry first (an expired entity is
//! despawned and skips everything else that frame), then walks [`PASSES`] —
//! a fixed-priority table mapping capability bits to update routines:
//! movement integration, collision resolution, the specialized behaviors,
//! and the render-state refresh last.
//!
//! Cross-entity effects (bullet spawns, collision kills) are deferred into
//! per-frame queues and applied after the scan, so the in-order slot walk
//! never observes a half-despawned entity.

use super::{Entity, EntityCaps, EntityFlags, EntityPool, PoolError, SpawnParams};
use glam::{Mat4, Vec3};
use log::*;
use smallvec::SmallVec;
use talon_utils::{color::RGBA8, SmallStr};

/// Velocity damping coefficient, per second.
pub const FRICTION: f32 = 0.8;
/// Height of the ground plane colliders rest on.
pub const GROUND_Y: f32 = 0.0;
/// Half-extent of the world box on the X and Z axes.
pub const WORLD_EXTENT: f32 = 512.0;

const SHOOTER_COOLDOWN: f32 = 0.75;
const BULLET_SPEED: f32 = 40.0;
const BULLET_LIFETIME: f64 = 2.5;
const BULLET_RADIUS: f32 = 0.1;
const BULLET_STALL_SPEED: f32 = 0.05;
const ORBIT_RATE: f32 = 1.2;
const ORBIT_RADIUS: f32 = 3.0;
const PLAYER_MAX_SPEED: f32 = 12.0;
const ENEMY_CHASE_ACCEL: f32 = 6.0;
/// Renderable entities fade out over this many seconds before expiry.
const EXPIRY_FADE_WINDOW: f64 = 0.5;

/// Read-only per-frame context shared by all update routines.
struct UpdateCtx {
    now: f64,
    /// Frame delta time. Stays f64 here; each routine narrows to f32 at its
    /// own integration boundary.
    dt: f64,
    /// Position of the (first) player entity this frame, if any.
    player: Option<Vec3>,
    /// Destroyable entities, snapshotted before the scan for bullet hits.
    targets: SmallVec<[Target; 16]>,
}

struct Target {
    index: u32,
    position: Vec3,
    radius: f32,
}

/// Effects queued during the scan and applied after it.
#[derive(Default)]
struct Deferred {
    spawns: SmallVec<[DeferredSpawn; 8]>,
    kills: SmallVec<[u32; 8]>,
}

struct DeferredSpawn {
    name: SmallStr,
    origin: Vec3,
    velocity: Vec3,
    caps: EntityCaps,
    lifetime: f64,
    color: RGBA8,
    radius: f32,
    angle: f32,
}

/// One entry of the update dispatch table.
struct UpdatePass {
    caps: EntityCaps,
    run: fn(&mut Entity, &UpdateCtx, &mut Deferred),
}

/// The capability dispatch table, in priority order. An entity runs every
/// pass whose mask intersects its own, which keeps each behavior auditable
/// and testable in isolation.
const PASSES: &[UpdatePass] = &[
    UpdatePass {
        caps: EntityCaps::MOVER,
        run: mover_pass,
    },
    UpdatePass {
        caps: EntityCaps::COLLIDER,
        run: collider_pass,
    },
    UpdatePass {
        caps: EntityCaps::SHOOTER,
        run: shooter_pass,
    },
    UpdatePass {
        caps: EntityCaps::BULLET,
        run: bullet_pass,
    },
    UpdatePass {
        caps: EntityCaps::SATELLITE,
        run: satellite_pass,
    },
    UpdatePass {
        caps: EntityCaps::PLAYER,
        run: player_pass,
    },
    UpdatePass {
        caps: EntityCaps::ENEMY,
        run: enemy_pass,
    },
    UpdatePass {
        caps: EntityCaps::from_bits_truncate(
            EntityCaps::RENDERABLE.bits() | EntityCaps::CAMERA.bits(),
        ),
        run: render_pass,
    },
];

impl EntityPool {
    /// Advances the simulation by one frame.
    ///
    /// `now` and `dt` come from the embedder's clock, in seconds. A full
    /// pool while applying deferred spawns is absorbed with a debug log;
    /// nothing in here panics mid-frame.
    pub fn update(&mut self, now: f64, dt: f64) {
        let ctx = UpdateCtx {
            now,
            dt,
            player: self
                .iter()
                .find(|e| e.caps.contains(EntityCaps::PLAYER))
                .map(|e| e.position),
            targets: self
                .iter()
                .filter(|e| e.caps.contains(EntityCaps::DESTROYABLE))
                .map(|e| Target {
                    index: e.index,
                    position: e.position,
                    radius: e.radius,
                })
                .collect(),
        };
        let mut deferred = Deferred::default();

        for index in 0..self.slots.len() {
            if !self.slots[index].is_alive() {
                continue;
            }
            if self.slots[index].is_expired(now) {
                self.despawn(index as u32);
                continue;
            }
            let entity = &mut self.slots[index];
            for pass in PASSES {
                if entity.caps.intersects(pass.caps) {
                    (pass.run)(entity, &ctx, &mut deferred);
                }
            }
        }

        for index in deferred.kills {
            self.despawn(index);
        }
        for spawn in deferred.spawns {
            let params = SpawnParams {
                name: spawn.name.as_str(),
                origin: spawn.origin,
                caps: spawn.caps,
                lifetime: spawn.lifetime,
                color: spawn.color,
                radius: spawn.radius,
                angle: spawn.angle,
            };
            match self.spawn(now, params) {
                Ok(entity) => entity.velocity = spawn.velocity,
                Err(PoolError::Full) => {
                    debug!("pool full, dropping deferred spawn `{}`", spawn.name)
                }
                Err(err) => debug!("deferred spawn `{}` failed: {err}", spawn.name),
            }
        }
    }
}

/// Semi-implicit Euler integration: velocity picks up acceleration and
/// friction damping first, position then follows the *new* velocity.
fn mover_pass(e: &mut Entity, ctx: &UpdateCtx, _deferred: &mut Deferred) {
    let dt = ctx.dt as f32;
    e.velocity += e.acceleration * dt;
    e.velocity *= (1.0 - FRICTION * dt).max(0.0);
    e.position += e.velocity * dt;
}

fn collider_pass(e: &mut Entity, ctx: &UpdateCtx, deferred: &mut Deferred) {
    // Ground plane: rest the bounding sphere on it, cancel downward motion.
    if e.position.y < GROUND_Y + e.radius {
        e.position.y = GROUND_Y + e.radius;
        if e.velocity.y < 0.0 {
            e.velocity.y = 0.0;
        }
        e.flags.insert(EntityFlags::GROUNDED);
    } else {
        e.flags.remove(EntityFlags::GROUNDED);
    }

    e.position.x = e.position.x.clamp(-WORLD_EXTENT, WORLD_EXTENT);
    e.position.z = e.position.z.clamp(-WORLD_EXTENT, WORLD_EXTENT);

    // Bullets test their bounding sphere against the destroyable snapshot;
    // both parties die through the deferred queue.
    if e.caps.contains(EntityCaps::BULLET) {
        for target in &ctx.targets {
            if target.index == e.index {
                continue;
            }
            let reach = e.radius + target.radius;
            if e.position.distance_squared(target.position) <= reach * reach {
                trace!("bullet #{} hit #{}", e.index, target.index);
                deferred.kills.push(target.index);
                deferred.kills.push(e.index);
                break;
            }
        }
    }
}

fn shooter_pass(e: &mut Entity, ctx: &UpdateCtx, deferred: &mut Deferred) {
    e.cooldown -= ctx.dt as f32;
    if e.cooldown > 0.0 {
        return;
    }
    e.cooldown = SHOOTER_COOLDOWN;

    let direction = Vec3::new(e.angle.cos(), 0.0, e.angle.sin());
    deferred.spawns.push(DeferredSpawn {
        name: SmallStr::from("bullet"),
        // nudged clear of the shooter so it can't shoot itself
        origin: e.position + direction * (e.radius + BULLET_RADIUS * 4.0),
        velocity: direction * BULLET_SPEED,
        caps: EntityCaps::MOVER
            | EntityCaps::COLLIDER
            | EntityCaps::BULLET
            | EntityCaps::RENDERABLE,
        lifetime: BULLET_LIFETIME,
        color: RGBA8::new(255, 220, 64, 255),
        radius: BULLET_RADIUS,
        angle: e.angle,
    });
}

/// Friction eventually stalls bullets that never hit anything; a stalled
/// bullet has no further use and frees its slot early.
fn bullet_pass(e: &mut Entity, _ctx: &UpdateCtx, deferred: &mut Deferred) {
    if e.velocity.length_squared() < BULLET_STALL_SPEED * BULLET_STALL_SPEED {
        deferred.kills.push(e.index);
    }
}

fn satellite_pass(e: &mut Entity, ctx: &UpdateCtx, _deferred: &mut Deferred) {
    e.angle += ORBIT_RATE * ctx.dt as f32;
    let offset = Vec3::new(e.angle.cos(), 0.0, e.angle.sin()) * ORBIT_RADIUS;
    e.position = e.home + offset;
}

fn player_pass(e: &mut Entity, _ctx: &UpdateCtx, _deferred: &mut Deferred) {
    let speed_sq = e.velocity.length_squared();
    if speed_sq > PLAYER_MAX_SPEED * PLAYER_MAX_SPEED {
        e.velocity *= PLAYER_MAX_SPEED / speed_sq.sqrt();
    }
}

fn enemy_pass(e: &mut Entity, ctx: &UpdateCtx, _deferred: &mut Deferred) {
    match ctx.player {
        Some(player) => {
            e.acceleration = (player - e.position).normalize_or_zero() * ENEMY_CHASE_ACCEL;
        }
        None => e.acceleration = Vec3::ZERO,
    }
}

/// Refreshes the state a renderer reads afterwards: the cached transform
/// and the faded render color. Runs last so it sees this frame's final
/// kinematics.
fn render_pass(e: &mut Entity, ctx: &UpdateCtx, _deferred: &mut Deferred) {
    e.transform = Mat4::from_translation(e.position) * Mat4::from_rotation_y(e.angle);

    e.render_color = match e.expires_at() {
        Some(expiry) if expiry - ctx.now < EXPIRY_FADE_WINDOW => {
            let factor = ((expiry - ctx.now) / EXPIRY_FADE_WINDOW).max(0.0);
            e.color.with_alpha_scaled(factor as f32)
        }
        _ => e.color,
    };
}
