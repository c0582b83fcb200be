//! Asset lookup boundary.
//!
//! Loading happens before the first session; during play the core only asks
//! for handles by key. Missing keys are never fatal: entities fall back to a
//! flagged placeholder and keep simulating.

use std::collections::HashMap;

use crate::error::AssetError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AudioHandle {
    pub key: String,
}

/// Read-only view of the loaded assets. Implementations must not panic on unknown keys.
pub trait AssetProvider {
    fn get_image(&self, key: &str) -> Option<ImageHandle>;
    fn get_audio(&self, key: &str) -> Option<AudioHandle>;
    /// Ordered animation frames.
    fn get_sprite(&self, key: &str) -> Option<Vec<ImageHandle>>;
    /// Number of assets of any kind that loaded.
    fn loaded_count(&self) -> usize;
}

// ── Catalog ───────────────────────────────────────────────────────────────────

const STANDARD_SPRITES: &[(&str, usize)] = &[
    ("playerBlue", 3),
    ("enemyred", 3),
    ("enemygreen", 3),
    ("explosions", 9),
];

const STANDARD_IMAGES: &[&str] = &[
    "powerup_health",
    "powerup_shield",
    "powerup_ammo",
    "projectile_laser",
    "projectile_plasma",
];

const STANDARD_AUDIO: &[&str] = &[
    "bgMusic",
    "menuMusic",
    "laser",
    "explosion",
    "powerup",
    "startMissionSound",
];

/// In-memory [`AssetProvider`].
#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    images: HashMap<String, ImageHandle>,
    audio: HashMap<String, AudioHandle>,
    sprites: HashMap<String, Vec<ImageHandle>>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every key the game asks for.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (key, frames) in STANDARD_SPRITES {
            catalog.add_sprite(key, *frames);
        }
        for key in STANDARD_IMAGES {
            catalog.add_image(key);
        }
        for key in STANDARD_AUDIO {
            catalog.add_audio(key);
        }
        catalog
    }

    pub fn add_image(&mut self, key: &str) -> &mut Self {
        self.images.insert(key.to_string(), ImageHandle { key: key.to_string() });
        self
    }

    pub fn add_audio(&mut self, key: &str) -> &mut Self {
        self.audio.insert(key.to_string(), AudioHandle { key: key.to_string() });
        self
    }

    pub fn add_sprite(&mut self, key: &str, frames: usize) -> &mut Self {
        let handles = (0..frames)
            .map(|i| ImageHandle {
                key: format!("{key}#{i}"),
            })
            .collect();
        self.sprites.insert(key.to_string(), handles);
        self
    }

    /// Drop a key of any kind, as if it had failed to load.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.images.remove(key);
        self.audio.remove(key);
        self.sprites.remove(key);
        self
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        if self.loaded_count() == 0 {
            return Err(AssetError::NothingLoaded);
        }
        Ok(())
    }
}

impl AssetProvider for AssetCatalog {
    fn get_image(&self, key: &str) -> Option<ImageHandle> {
        self.images.get(key).cloned()
    }

    fn get_audio(&self, key: &str) -> Option<AudioHandle> {
        self.audio.get(key).cloned()
    }

    fn get_sprite(&self, key: &str) -> Option<Vec<ImageHandle>> {
        self.sprites.get(key).filter(|frames| !frames.is_empty()).cloned()
    }

    fn loaded_count(&self) -> usize {
        self.images.len() + self.audio.len() + self.sprites.len()
    }
}

// ── Appearance ────────────────────────────────────────────────────────────────

/// What an entity draws, resolved once when the entity is created.
#[derive(Clone, Debug, PartialEq)]
pub struct Appearance {
    pub key: String,
    pub frame_count: usize,
    /// Set when the real asset was missing and a stand-in is drawn instead.
    pub placeholder: bool,
}

impl Appearance {
    pub fn placeholder(key: &str) -> Self {
        Self {
            key: key.to_string(),
            frame_count: 1,
            placeholder: true,
        }
    }

    pub fn sprite(assets: &dyn AssetProvider, key: &str) -> Self {
        match assets.get_sprite(key) {
            Some(frames) => Self {
                key: key.to_string(),
                frame_count: frames.len(),
                placeholder: false,
            },
            None => {
                log::warn!("{}; using placeholder", AssetError::Missing { kind: "Sprite", key: key.to_string() });
                Self::placeholder(key)
            }
        }
    }

    pub fn image(assets: &dyn AssetProvider, key: &str) -> Self {
        match assets.get_image(key) {
            Some(_) => Self {
                key: key.to_string(),
                frame_count: 1,
                placeholder: false,
            },
            None => {
                log::warn!("{}; using placeholder", AssetError::Missing { kind: "Image", key: key.to_string() });
                Self::placeholder(key)
            }
        }
    }
}
