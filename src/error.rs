use thiserror::Error;

use crate::types::{ActorId, ShapeKind};

/// Usage errors raised by the declaration and query API.
///
/// Invisible or removed bodies are not errors; they simply never collide.
#[derive(Error, Debug)]
pub enum CollisionError {
    #[error("actor {0:?} is not attached to the world")]
    UnknownActor(ActorId),

    #[error("frame {frame} out of range for a body with {count} frame(s)")]
    FrameOutOfRange { frame: usize, count: usize },

    #[error("{kind:?} is not a legal {registry} shape")]
    IllegalShape { kind: ShapeKind, registry: &'static str },

    #[error("no tile map attached")]
    NoTileMap,

    #[error("tile ({x}, {y}) lies outside the {width}x{height} tile map")]
    TileOutOfRange { x: i32, y: i32, width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
