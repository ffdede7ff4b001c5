use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{CollisionError, Result};

slotmap::new_key_type! {
    /// Handle of an actor attached to a [`crate::CollisionWorld`].
    pub struct ActorId;
}

/// Cell coordinates inside the attached tile map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileLoc {
    pub x: i32,
    pub y: i32,
}

impl TileLoc {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rotatable rectangle stored by its four vertices.
///
/// For direction 0 the layout in y-down screen space is
///
/// ```text
/// v0 ---- edge 0 ----> v1
/// ^                    |
/// edge 3            edge 1
/// |                    v
/// v3 <--- edge 2 ----- v2
/// ```
///
/// The direction of the rectangle is the direction of edge 0, clockwise
/// from the x axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub vertices: [DVec2; 4],
}

impl Rectangle {
    /// Rectangle centered at `center` whose edge 0 points along `direction` (radians, clockwise).
    pub fn new(center: DVec2, direction: f64, width: f64, height: f64) -> Self {
        let e1 = DVec2::from_angle(direction);
        let e2 = e1.perp();
        let hw = e1 * (width / 2.0);
        let hh = e2 * (height / 2.0);
        Self {
            vertices: [
                center - hw - hh,
                center + hw - hh,
                center + hw + hh,
                center - hw + hh,
            ],
        }
    }

    /// Axis-parallel rectangle from center and half extents.
    pub fn axis_aligned(center: DVec2, half_extents: DVec2) -> Self {
        Self::new(center, 0.0, half_extents.x * 2.0, half_extents.y * 2.0)
    }

    pub fn from_vertices(vertices: [DVec2; 4]) -> Self {
        Self { vertices }
    }

    /// Edge `i` (0..4), pointing from vertex `i` to vertex `i + 1`.
    pub fn edge(&self, i: usize) -> DVec2 {
        self.vertices[(i + 1) % 4] - self.vertices[i % 4]
    }

    pub fn center(&self) -> DVec2 {
        (self.vertices[0] + self.vertices[2]) * 0.5
    }

    pub fn width(&self) -> f64 {
        self.edge(0).length()
    }

    pub fn height(&self) -> f64 {
        self.edge(1).length()
    }

    /// Direction of edge 0 in radians. A collapsed edge 0 is recovered from
    /// edge 1; a point rectangle has direction 0.
    pub fn direction(&self) -> f64 {
        let e0 = self.edge(0);
        let e1 = self.edge(1);
        if e0 != DVec2::ZERO {
            e0.y.atan2(e0.x)
        } else if e1 != DVec2::ZERO {
            e1.y.atan2(e1.x) - std::f64::consts::FRAC_PI_2
        } else {
            0.0
        }
    }

    /// Radius of the circle through the four vertices.
    pub fn circumradius(&self) -> f64 {
        0.5 * (self.vertices[0] - self.vertices[2]).length()
    }

    /// Two perpendicular projection axes parallel to the edges.
    ///
    /// Degenerate rectangles borrow the perpendicular of whichever edge
    /// survives, and fall back to the coordinate axes when both collapse.
    pub fn axes(&self) -> [DVec2; 2] {
        let e0 = self.edge(0);
        let e1 = self.edge(1);
        if e0 != DVec2::ZERO {
            [e0, e0.perp()]
        } else if e1 != DVec2::ZERO {
            [e1.perp(), e1]
        } else {
            [DVec2::X, DVec2::Y]
        }
    }

    /// Axis-parallel bounds `(min, max)` over the vertices.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min = min.min(*v);
            max = max.max(*v);
        }
        (min, max)
    }

    /// Rotates about the coordinate origin by `angle` radians (clockwise in screen space).
    pub fn rotated(&self, angle: f64) -> Self {
        let rot = DVec2::from_angle(angle);
        Self { vertices: self.vertices.map(|v| rot.rotate(v)) }
    }

    pub fn translated(&self, offset: DVec2) -> Self {
        Self { vertices: self.vertices.map(|v| v + offset) }
    }

    fn mirrored(&self, flip: DVec2) -> Self {
        Self { vertices: self.vertices.map(|v| v * flip) }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub const fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineSegment {
    pub start: DVec2,
    pub end: DVec2,
}

impl LineSegment {
    pub const fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    pub fn vector(&self) -> DVec2 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().length()
    }
}

/// Collision or interaction footprint of one body frame.
///
/// `PixelMask` carries no geometry: the opaque pixels of the body's current
/// raster frame are the footprint.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum Shape {
    #[default]
    None,
    Rectangle(Rectangle),
    Circle(Circle),
    Line(LineSegment),
    Spot(DVec2),
    PixelMask,
}

/// Discriminant of [`Shape`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    None,
    Rectangle,
    Circle,
    Line,
    Spot,
    PixelMask,
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::None => ShapeKind::None,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Spot(_) => ShapeKind::Spot,
            Shape::PixelMask => ShapeKind::PixelMask,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Shape::None)
    }

    /// Rigid rotation about the frame center (the local origin).
    pub fn rotated(&self, angle: f64) -> Shape {
        let rot = DVec2::from_angle(angle);
        match *self {
            Shape::Rectangle(r) => Shape::Rectangle(r.rotated(angle)),
            Shape::Circle(c) => Shape::Circle(Circle::new(rot.rotate(c.center), c.radius)),
            Shape::Line(l) => Shape::Line(LineSegment::new(rot.rotate(l.start), rot.rotate(l.end))),
            Shape::Spot(p) => Shape::Spot(rot.rotate(p)),
            other => other,
        }
    }

    /// Negates x (horizontal) and/or y (vertical) of every coordinate.
    pub fn mirrored(&self, horizontal: bool, vertical: bool) -> Shape {
        if !horizontal && !vertical {
            return *self;
        }
        let flip = DVec2::new(
            if horizontal { -1.0 } else { 1.0 },
            if vertical { -1.0 } else { 1.0 },
        );
        match *self {
            Shape::Rectangle(r) => Shape::Rectangle(r.mirrored(flip)),
            Shape::Circle(c) => Shape::Circle(Circle::new(c.center * flip, c.radius)),
            Shape::Line(l) => Shape::Line(LineSegment::new(l.start * flip, l.end * flip)),
            Shape::Spot(p) => Shape::Spot(p * flip),
            other => other,
        }
    }

    pub fn translated(&self, offset: DVec2) -> Shape {
        match *self {
            Shape::Rectangle(r) => Shape::Rectangle(r.translated(offset)),
            Shape::Circle(c) => Shape::Circle(Circle::new(c.center + offset, c.radius)),
            Shape::Line(l) => Shape::Line(LineSegment::new(l.start + offset, l.end + offset)),
            Shape::Spot(p) => Shape::Spot(p + offset),
            other => other,
        }
    }
}

/// Collision domain of an actor: partner actors or partner tiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    Actor,
    Tile,
}

/// The body an actor collided with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Partner {
    Actor(ActorId),
    Tile(TileLoc),
}

/// Collision notification produced by a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Step counter value when the collision was detected.
    pub step: u64,
    pub actor: ActorId,
    pub partner: Partner,
    /// Counter value the listener reloaded for this domain.
    pub cooldown: u32,
}

impl CollisionEvent {
    pub fn domain(&self) -> Domain {
        match self.partner {
            Partner::Actor(_) => Domain::Actor,
            Partner::Tile(_) => Domain::Tile,
        }
    }
}

/// Engine-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of discrete orientations N (rotation index in `0..N`).
    pub rotation_steps: usize,
    /// Tolerance of the line-vs-spot test.
    pub spot_epsilon: f64,
    /// Spot-vs-spot is tested as two circles of this radius.
    pub spot_radius: f64,
    /// Reject rectangle pairs whose circumcircles are apart before running SAT.
    pub circumradius_reject: bool,
    /// Record a [`StepTiming`] for every step (adds small overhead).
    pub enable_timing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rotation_steps: 60,
            spot_epsilon: 1e-6,
            spot_radius: 1.0,
            circumradius_reject: true,
            enable_timing: false,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML table; missing keys keep their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(src)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rotation_steps == 0 {
            return Err(CollisionError::InvalidConfig(
                "rotation_steps must be at least 1".into(),
            ));
        }
        if !(self.spot_epsilon >= 0.0) {
            return Err(CollisionError::InvalidConfig(format!(
                "spot_epsilon must be non-negative, got {}",
                self.spot_epsilon
            )));
        }
        if !(self.spot_radius >= 0.0) {
            return Err(CollisionError::InvalidConfig(format!(
                "spot_radius must be non-negative, got {}",
                self.spot_radius
            )));
        }
        Ok(())
    }
}

/// Debug statistics for the current world state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub actors: usize,
    pub visible_actors: usize,
    pub tiles_with_shapes: usize,
    /// Sum of all actor-candidate list lengths.
    pub actor_candidates: usize,
    /// Sum of all tile-candidate list lengths.
    pub tile_candidates: usize,
}

/// Timing breakdown of the last completed step.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepTiming {
    pub step_ms: f64,
    pub actor_domain_ms: f64,
    pub tile_domain_ms: f64,

    /// Dispatch-matrix evaluations performed.
    pub pairs_tested: usize,
    pub notifications: usize,
}
