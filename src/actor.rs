use glam::DVec2;

use crate::api::{ActorCollisionListener, TileCollisionListener};
use crate::area::{AreaRegistry, AreaRole, Placement};
use crate::cooldown::Cooldown;
use crate::dispatch::Participant;
use crate::pixel::{MaskView, PixelMask};
use crate::rotation::{index_angle, normalize_direction, rotation_index};
use crate::types::*;

/// Description of an actor to attach.
#[derive(Clone, Debug)]
pub struct ActorDesc {
    /// Raster frames; a frame's size gives its default areas.
    pub frames: Vec<PixelMask>,
    pub position: DVec2,
    /// Degrees, clockwise, 0 = east.
    pub direction: f64,
    pub rotatable: bool,
    /// Frame shown on attach; `None` attaches the actor hidden.
    pub visible: Option<usize>,
}

impl ActorDesc {
    pub fn new(frames: Vec<PixelMask>) -> Self {
        let visible = if frames.is_empty() { None } else { Some(0) };
        Self { frames, position: DVec2::ZERO, direction: 0.0, rotatable: false, visible }
    }

    pub fn single(frame: PixelMask) -> Self {
        Self::new(vec![frame])
    }

    pub fn at(mut self, position: DVec2) -> Self {
        self.position = position;
        self
    }

    pub fn facing(mut self, direction: f64) -> Self {
        self.direction = direction;
        self
    }

    pub fn rotatable(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = None;
        self
    }
}

/// Attached actor state.
pub(crate) struct Actor {
    pub frames: Vec<PixelMask>,
    pub visible: Option<usize>,
    pub position: DVec2,
    pub direction: f64,
    pub rotation_index: usize,
    pub rotatable: bool,
    pub mirror_h: bool,
    pub mirror_v: bool,

    pub collision: AreaRegistry,
    pub interaction: AreaRegistry,

    pub actor_candidates: Vec<ActorId>,
    pub tile_candidates: Vec<TileLoc>,
    pub cooldown: Cooldown,
    pub actor_enabled: bool,
    pub tile_enabled: bool,
    pub touch_enabled: bool,

    pub actor_listener: Option<Box<dyn ActorCollisionListener>>,
    pub tile_listener: Option<Box<dyn TileCollisionListener>>,
}

impl Actor {
    /// Builds the actor with default areas: a collision rectangle covering
    /// each frame and a pixel-mask interaction area.
    pub fn from_desc(desc: ActorDesc, steps: usize) -> Self {
        let count = desc.frames.len();
        let bounds = desc
            .frames
            .iter()
            .map(|frame| Shape::Rectangle(Rectangle::axis_aligned(DVec2::ZERO, frame.size() * 0.5)));
        let collision = AreaRegistry::from_shapes(AreaRole::Collision, steps, bounds, desc.rotatable);
        let interaction = AreaRegistry::from_shapes(
            AreaRole::Interaction,
            steps,
            std::iter::repeat_n(Shape::PixelMask, count),
            desc.rotatable,
        );
        let visible = desc.visible.filter(|f| *f < count);

        let mut actor = Self {
            frames: desc.frames,
            visible,
            position: desc.position,
            direction: 0.0,
            rotation_index: 0,
            rotatable: desc.rotatable,
            mirror_h: false,
            mirror_v: false,
            collision,
            interaction,
            actor_candidates: Vec::new(),
            tile_candidates: Vec::new(),
            cooldown: Cooldown::default(),
            actor_enabled: true,
            tile_enabled: true,
            touch_enabled: true,
            actor_listener: None,
            tile_listener: None,
        };
        actor.set_direction(desc.direction, steps);
        actor
    }

    pub fn set_direction(&mut self, degrees: f64, steps: usize) {
        self.direction = normalize_direction(degrees);
        self.rotation_index = if self.rotatable { rotation_index(self.direction, steps) } else { 0 };
    }

    pub fn placement(&self) -> Placement {
        Placement {
            position: self.position,
            rotation_index: self.rotation_index,
            mirror_h: self.mirror_h,
            mirror_v: self.mirror_v,
        }
    }

    pub fn collision_shape(&self) -> Shape {
        match self.visible {
            Some(frame) => self.collision.world_shape(frame, &self.placement()),
            None => Shape::None,
        }
    }

    pub fn interaction_shape(&self) -> Shape {
        match self.visible {
            Some(frame) => self.interaction.world_shape(frame, &self.placement()),
            None => Shape::None,
        }
    }

    /// The visible frame placed like the actor's shapes.
    pub fn mask_view(&self, steps: usize) -> Option<MaskView<'_>> {
        let mask = self.frames.get(self.visible?)?;
        Some(MaskView {
            mask,
            center: self.position,
            direction: if self.rotatable { index_angle(self.rotation_index, steps) } else { 0.0 },
            mirror_h: self.mirror_h,
            mirror_v: self.mirror_v,
        })
    }

    pub fn collision_participant(&self, steps: usize) -> Participant<'_> {
        Participant::new(self.collision_shape(), self.mask_view(steps), self.rotatable)
    }

    pub fn interaction_participant(&self, steps: usize) -> Participant<'_> {
        Participant::new(self.interaction_shape(), self.mask_view(steps), self.rotatable)
    }
}
