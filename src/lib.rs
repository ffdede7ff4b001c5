//! spritehit: collision and hit-testing for 2D tile/actor simulations
//! (rotation-cached shapes, pixel masks, per-domain rearm cooldowns)

pub mod types;
pub mod api;
pub mod error;
pub mod narrowphase;
pub mod pixel;
pub mod rotation;
pub mod area;
pub mod dispatch;
pub mod cooldown;
pub mod actor;
pub mod tilemap;
pub mod world;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::CollisionError;
pub use crate::actor::ActorDesc;
pub use crate::pixel::{MaskView, PixelMask};
pub use crate::tilemap::{TileMap, TileMapDesc};
pub use crate::world::CollisionWorld;
