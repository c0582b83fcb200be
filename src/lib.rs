//! Stellar Conflict: simulation core of a top-down arcade shooter.
//!
//! The library owns the rules and never touches a terminal, clock or disk
//! directly; the host feeds it timestamps and key presses and hands it a
//! [`render::Renderer`] and a [`storage::PersistenceStore`].

pub mod achievements;
pub mod assets;
pub mod collision;
pub mod combo;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod input;
pub mod machine;
pub mod particles;
pub mod pool;
pub mod render;
pub mod storage;
