//! Multi-object scenes: objects rain onto the ground one at a time while the
//! simulation keeps running.

use anyhow::Result;
use clap::ValueEnum;
use glam::Vec3;
use playground_common::{ObjectId, ObjectOptions};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::stage::Stage;

/// Half-width of the square the spawn points are drawn from, in whole metres.
const SPAWN_SPREAD: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RainShape {
    /// 5 m crates dropped from 50 m
    Box,
    /// 1 m balls dropped from 10 m
    Ball,
}

impl RainShape {
    fn label(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Ball => "ball",
        }
    }

    /// Height of the resting centre above the surface it lies on.
    pub fn half_height(self) -> f32 {
        match self {
            Self::Box => 2.5,
            Self::Ball => 1.0,
        }
    }

    fn options(self, x: f32, z: f32) -> ObjectOptions {
        match self {
            Self::Box => ObjectOptions::at(Vec3::new(x, 50.0, z))
                .with_size(Vec3::splat(5.0))
                .with_mass(1.0),
            Self::Ball => ObjectOptions::at(Vec3::new(x, 10.0, z))
                .with_radius(1.0)
                .with_mass(1.0),
        }
    }
}

/// Spawns `count` objects at seeded random spots, one every `interval` frames.
#[derive(Debug, Clone)]
pub struct Rain {
    pub shape: RainShape,
    pub count: u32,
    pub interval: u32,
    pub seed: u64,
}

impl Rain {
    /// Run the scene on `stage`: the first object appears before the first
    /// frame, the rest are added mid-simulation. After the last spawn the
    /// stage runs `settle` more frames.
    pub fn run(&self, stage: &mut Stage, settle: u32, dt: f32) -> Result<Vec<ObjectId>> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let interval = self.interval.max(1);
        let mut spawned = Vec::with_capacity(self.count as usize);
        let mut frame = 0u32;

        while spawned.len() < self.count as usize {
            if frame % interval == 0 {
                let id = self.spawn(stage, &mut rng, spawned.len())?;
                spawned.push(id);
            }
            stage.frame(dt);
            frame += 1;
        }
        for _ in 0..settle {
            stage.frame(dt);
        }
        tracing::info!(count = spawned.len(), frames = frame + settle, "rain finished");
        Ok(spawned)
    }

    fn spawn(&self, stage: &mut Stage, rng: &mut impl Rng, index: usize) -> Result<ObjectId> {
        let x = rng.gen_range(-SPAWN_SPREAD..=SPAWN_SPREAD) as f32;
        let z = rng.gen_range(-SPAWN_SPREAD..=SPAWN_SPREAD) as f32;
        let name = format!("{}-{index}", self.shape.label());
        let options = self.shape.options(x, z);
        let id = match self.shape {
            RainShape::Box => stage.add_cuboid(&name, options, 0xff0000)?,
            RainShape::Ball => stage.add_ball(&name, options, 0xff0505)?,
        };
        tracing::debug!(%id, name = %name, x, z, "spawned");
        Ok(id)
    }
}
