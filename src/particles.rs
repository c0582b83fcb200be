//! Cosmetic particles. Nothing in the simulation reads them.

use std::f32::consts::TAU;

use rand::Rng;

use crate::pool::ObjectPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    Spark,
    Trail,
    Sparkle,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub gravity: f32,
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
    /// `life / max_life`, used for fading.
    pub alpha: f32,
    pub kind: ParticleKind,
}

impl Particle {
    fn blank() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            gravity: 0.0,
            life: 0,
            max_life: 0,
            size: 0.0,
            alpha: 0.0,
            kind: ParticleKind::Spark,
        }
    }

    fn step(&mut self) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += self.gravity;
        self.life = self.life.saturating_sub(1);
        self.alpha = if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        };
        self.life > 0
    }
}

struct Emit {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    gravity: f32,
    life: u32,
    size: f32,
    kind: ParticleKind,
}

pub struct ParticleSystem {
    live: Vec<Particle>,
    pool: ObjectPool<Particle>,
}

impl std::fmt::Debug for ParticleSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("live", &self.live.len())
            .field("pooled", &self.pool.len())
            .finish()
    }
}

impl ParticleSystem {
    pub fn new(pool_capacity: usize) -> Self {
        Self {
            live: Vec::new(),
            pool: ObjectPool::bounded(pool_capacity),
        }
    }

    fn emit(&mut self, e: Emit) {
        let mut p = self.pool.acquire().unwrap_or_else(Particle::blank);
        p.x = e.x;
        p.y = e.y;
        p.vx = e.vx;
        p.vy = e.vy;
        p.gravity = e.gravity;
        p.life = e.life.max(1);
        p.max_life = p.life;
        p.size = e.size;
        p.alpha = 1.0;
        p.kind = e.kind;
        self.live.push(p);
    }

    /// Ring of sparks flying outwards, used when something blows up.
    pub fn burst(&mut self, x: f32, y: f32, count: usize, rng: &mut impl Rng) {
        for i in 0..count {
            let angle = i as f32 / count as f32 * TAU;
            let speed = 5.0 * rng.gen_range(0.5..1.0);
            self.emit(Emit {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                gravity: 0.1,
                life: rng.gen_range(30..60),
                size: rng.gen_range(2.0..4.0),
                kind: ParticleKind::Spark,
            });
        }
    }

    pub fn trail(&mut self, x: f32, y: f32, rng: &mut impl Rng) {
        self.emit(Emit {
            x,
            y,
            vx: rng.gen_range(-2.0..2.0),
            vy: rng.gen_range(-2.0..2.0),
            gravity: -0.05,
            life: rng.gen_range(20..30),
            size: rng.gen_range(1.0..2.0),
            kind: ParticleKind::Trail,
        });
    }

    pub fn sparkles(&mut self, x: f32, y: f32, rng: &mut impl Rng) {
        for _ in 0..3 {
            self.emit(Emit {
                x,
                y,
                vx: rng.gen_range(-2.0..2.0),
                vy: rng.gen_range(-2.0..2.0),
                gravity: -0.02,
                life: rng.gen_range(40..60),
                size: rng.gen_range(2.0..3.0),
                kind: ParticleKind::Sparkle,
            });
        }
    }

    /// Advance every particle one tick and recycle the expired ones.
    pub fn update(&mut self) {
        self.pool.reclaim_from(&mut self.live, Particle::step);
    }

    pub fn clear(&mut self) {
        for p in self.live.drain(..) {
            self.pool.release(p);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }
}
