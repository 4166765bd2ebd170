//! Entity pool snapshot codec
//!
//! Serializes the live pool state into a flat little-endian byte image and
//! reads it back. The format is a header (magic, version, capacity, live
//! count) followed by one record per live entity. Transient render state is
//! not stored; the first update after a restore rebuilds it.

use super::{Entity, EntityCaps, EntityFlags, EntityPool, NAME_MAX};
use anyhow::{anyhow, bail, ensure};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use glam::Vec3;
use std::io::{Read, Write};
use talon_utils::{ok, AnyResult, BinReader, BinStream, ByteBuffer, SmallStr};

pub const SNAPSHOT_MAGIC: u32 = u32::from_le_bytes(*b"TSNP");
pub const SNAPSHOT_VERSION: u32 = 1;

const HEADER_SIZE: usize = 16;
// index + caps + flags + name length byte + vectors + color + scalars
const RECORD_BASE_SIZE: usize = 4 * 3 + 1 + (4 * 3) * 4 + 4 + 4 * 3 + 8 * 2;

/// Serializes every live entity of `pool` into a fresh buffer.
pub fn write_snapshot(pool: &EntityPool) -> AnyResult<ByteBuffer> {
    let total = HEADER_SIZE
        + pool
            .iter()
            .map(|e| RECORD_BASE_SIZE + e.name.len())
            .sum::<usize>();
    let mut buffer = ByteBuffer::new();
    buffer.resize(total);

    let mut stream = BinStream::new(buffer.as_mut_slice());
    stream.write_u32::<LE>(SNAPSHOT_MAGIC)?;
    stream.write_u32::<LE>(SNAPSHOT_VERSION)?;
    stream.write_u32::<LE>(pool.capacity() as u32)?;
    stream.write_u32::<LE>(pool.len() as u32)?;

    for entity in pool.iter() {
        stream.write_u32::<LE>(entity.index)?;
        stream.write_u32::<LE>(entity.caps.bits())?;
        stream.write_u32::<LE>(entity.flags.bits())?;

        debug_assert!(entity.name.len() <= NAME_MAX);
        stream.write_u8(entity.name.len() as u8)?;
        stream.write_all(entity.name.as_bytes())?;

        write_vec3(&mut stream, entity.position)?;
        write_vec3(&mut stream, entity.velocity)?;
        write_vec3(&mut stream, entity.acceleration)?;
        write_vec3(&mut stream, entity.home)?;

        stream.write_u8(entity.color.r)?;
        stream.write_u8(entity.color.g)?;
        stream.write_u8(entity.color.b)?;
        stream.write_u8(entity.color.a)?;

        stream.write_f32::<LE>(entity.radius)?;
        stream.write_f32::<LE>(entity.angle)?;
        stream.write_f32::<LE>(entity.cooldown)?;
        stream.write_f64::<LE>(entity.spawned_at)?;
        stream.write_f64::<LE>(entity.lifetime)?;
    }

    ensure!(stream.remaining() == 0, "snapshot size miscalculation");
    Ok(buffer)
}

/// Reconstructs a pool from a snapshot image produced by [`write_snapshot`].
pub fn read_snapshot(bytes: &[u8]) -> AnyResult<EntityPool> {
    let mut reader = BinReader::new(bytes);

    let magic = reader.read_u32::<LE>()?;
    ensure!(magic == SNAPSHOT_MAGIC, "not a pool snapshot");
    let version = reader.read_u32::<LE>()?;
    ensure!(
        version == SNAPSHOT_VERSION,
        "unsupported snapshot version {version}"
    );

    let capacity = reader.read_u32::<LE>()? as usize;
    let count = reader.read_u32::<LE>()? as usize;
    ensure!(count <= capacity, "more entities than pool capacity");

    let mut pool = EntityPool::new(capacity)?;
    for _ in 0..count {
        let index = reader.read_u32::<LE>()?;
        ensure!((index as usize) < capacity, "entity index out of range");

        let caps = EntityCaps::from_bits(reader.read_u32::<LE>()?)
            .ok_or_else(|| anyhow!("invalid capability bits"))?;
        ensure!(!caps.is_empty(), "snapshot contains a free slot record");
        let flags = EntityFlags::from_bits(reader.read_u32::<LE>()?)
            .ok_or_else(|| anyhow!("invalid entity flag bits"))?;

        let name = read_name(&mut reader)?;

        let entity = &mut pool.slots[index as usize];
        if entity.is_alive() {
            bail!("duplicate entity index {index} in snapshot");
        }
        entity.caps = caps;
        entity.flags = flags;
        entity.name = name;
        entity.position = read_vec3(&mut reader)?;
        entity.velocity = read_vec3(&mut reader)?;
        entity.acceleration = read_vec3(&mut reader)?;
        entity.home = read_vec3(&mut reader)?;

        entity.color.r = reader.read_u8()?;
        entity.color.g = reader.read_u8()?;
        entity.color.b = reader.read_u8()?;
        entity.color.a = reader.read_u8()?;
        entity.render_color = entity.color;

        entity.radius = reader.read_f32::<LE>()?;
        entity.angle = reader.read_f32::<LE>()?;
        entity.cooldown = reader.read_f32::<LE>()?;
        entity.spawned_at = reader.read_f64::<LE>()?;
        entity.lifetime = reader.read_f64::<LE>()?;

        pool.live += 1;
    }

    Ok(pool)
}

fn write_vec3(stream: &mut BinStream, v: Vec3) -> AnyResult {
    stream.write_f32::<LE>(v.x)?;
    stream.write_f32::<LE>(v.y)?;
    stream.write_f32::<LE>(v.z)?;
    ok()
}

fn read_vec3(reader: &mut BinReader) -> AnyResult<Vec3> {
    Ok(Vec3::new(
        reader.read_f32::<LE>()?,
        reader.read_f32::<LE>()?,
        reader.read_f32::<LE>()?,
    ))
}

fn read_name(reader: &mut BinReader) -> AnyResult<SmallStr> {
    let len = reader.read_u8()? as usize;
    ensure!(len <= NAME_MAX, "entity name too long");

    let mut raw = [0u8; NAME_MAX];
    reader.read_exact(&mut raw[..len])?;
    let text = std::str::from_utf8(&raw[..len])?;

    let mut name = SmallStr::new();
    name.copy_from(text);
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SpawnParams;
    use talon_utils::color::RGBA8;

    #[test]
    fn snapshot_round_trip() {
        let mut pool = EntityPool::new(8).unwrap();
        pool.spawn(
            1.5,
            SpawnParams {
                name: "player",
                caps: EntityCaps::PLAYER | EntityCaps::MOVER | EntityCaps::RENDERABLE,
                origin: Vec3::new(1.0, 0.5, -2.0),
                color: RGBA8::new(10, 20, 30, 255),
                ..Default::default()
            },
        )
        .unwrap()
        .velocity = Vec3::new(3.0, 0.0, 0.0);
        pool.spawn(
            2.0,
            SpawnParams {
                name: "spark",
                caps: EntityCaps::MOVER | EntityCaps::RENDERABLE,
                lifetime: 4.0,
                ..Default::default()
            },
        )
        .unwrap();
        // leave a hole so indices aren't contiguous
        let doomed = pool
            .spawn(2.1, SpawnParams {
                name: "doomed",
                caps: EntityCaps::MOVER,
                ..Default::default()
            })
            .unwrap()
            .index;
        pool.spawn(
            2.2,
            SpawnParams {
                name: "turret",
                caps: EntityCaps::SHOOTER | EntityCaps::RENDERABLE,
                ..Default::default()
            },
        )
        .unwrap();
        pool.despawn(doomed);

        let image = write_snapshot(&pool).unwrap();
        let restored = read_snapshot(image.as_slice()).unwrap();

        assert_eq!(restored.capacity(), pool.capacity());
        assert_eq!(restored.len(), pool.len());
        for original in pool.iter() {
            let copy = restored.find_by_index(original.index).unwrap();
            assert_eq!(copy.name, original.name);
            assert_eq!(copy.caps, original.caps);
            assert_eq!(copy.position, original.position);
            assert_eq!(copy.velocity, original.velocity);
            assert_eq!(copy.spawned_at, original.spawned_at);
            assert_eq!(copy.lifetime, original.lifetime);
            assert_eq!(copy.color, original.color);
        }
        assert!(restored.find_by_index(doomed).is_none());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut pool = EntityPool::new(2).unwrap();
        pool.spawn(0.0, SpawnParams {
            name: "a",
            caps: EntityCaps::MOVER,
            ..Default::default()
        })
        .unwrap();

        let mut image = write_snapshot(&pool).unwrap();
        image.write_at(0, b"XXXX").unwrap();
        assert!(read_snapshot(image.as_slice()).is_err());
    }

    #[test]
    fn truncated_snapshot_is_rejected() {
        let mut pool = EntityPool::new(2).unwrap();
        pool.spawn(0.0, SpawnParams {
            name: "a",
            caps: EntityCaps::MOVER,
            ..Default::default()
        })
        .unwrap();

        let image = write_snapshot(&pool).unwrap();
        let cut = &image.as_slice()[..image.len() - 5];
        assert!(read_snapshot(cut).is_err());
    }
}
