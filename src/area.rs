use glam::DVec2;

use crate::error::{CollisionError, Result};
use crate::rotation::RotationCache;
use crate::types::{Shape, ShapeKind};

/// Which registry an area belongs to. The two differ only in legal kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AreaRole {
    Collision,
    Interaction,
}

impl AreaRole {
    pub fn allows(self, kind: ShapeKind) -> bool {
        match self {
            AreaRole::Collision => true,
            AreaRole::Interaction => matches!(
                kind,
                ShapeKind::None | ShapeKind::Rectangle | ShapeKind::Circle | ShapeKind::PixelMask
            ),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AreaRole::Collision => "collision",
            AreaRole::Interaction => "interaction",
        }
    }
}

/// Where and how a body currently sits in the world.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Placement {
    pub position: DVec2,
    pub rotation_index: usize,
    pub mirror_h: bool,
    pub mirror_v: bool,
}

/// Per-frame rotation caches of one body, for one role.
#[derive(Clone, Debug)]
pub struct AreaRegistry {
    role: AreaRole,
    steps: usize,
    frames: Vec<Option<RotationCache>>,
}

impl AreaRegistry {
    pub fn new(role: AreaRole, frame_count: usize, steps: usize) -> Self {
        Self { role, steps, frames: vec![None; frame_count] }
    }

    /// One declared shape per frame. A kind the role does not accept leaves
    /// that frame undeclared.
    pub fn from_shapes(role: AreaRole, steps: usize, bases: impl IntoIterator<Item = Shape>, rotatable: bool) -> Self {
        let frames = bases
            .into_iter()
            .map(|base| role.allows(base.kind()).then(|| RotationCache::build(base, steps, rotatable)))
            .collect();
        Self { role, steps, frames }
    }

    pub fn role(&self) -> AreaRole {
        self.role
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Replaces the frame's shape (and all of its orientations) with `base`,
    /// given in coordinates relative to the frame center.
    pub fn declare(&mut self, frame: usize, base: Shape, rotatable: bool) -> Result<()> {
        let count = self.frames.len();
        let kind = base.kind();
        if !self.role.allows(kind) {
            return Err(CollisionError::IllegalShape { kind, registry: self.role.name() });
        }
        let slot = self
            .frames
            .get_mut(frame)
            .ok_or(CollisionError::FrameOutOfRange { frame, count })?;
        match slot {
            Some(cache) => cache.replace(base, rotatable),
            None => *slot = Some(RotationCache::build(base, self.steps, rotatable)),
        }
        Ok(())
    }

    pub fn active_kind(&self, frame: usize) -> ShapeKind {
        match self.frames.get(frame) {
            Some(Some(cache)) => cache.kind(),
            _ => ShapeKind::None,
        }
    }

    /// Cached shape for the placement's orientation, mirrored, then moved to
    /// the placement position.
    pub fn world_shape(&self, frame: usize, placement: &Placement) -> Shape {
        let Some(Some(cache)) = self.frames.get(frame) else {
            return Shape::None;
        };
        cache
            .get(placement.rotation_index)
            .mirrored(placement.mirror_h, placement.mirror_v)
            .translated(placement.position)
    }
}
