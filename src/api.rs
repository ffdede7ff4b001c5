use glam::DVec2;

use crate::error::Result;
use crate::types::*;

/// Public API contract for the collision world.
pub trait CollisionWorldApi {
    /// Construct a new world with the given configuration.
    fn new(cfg: EngineConfig) -> Result<Self>
    where
        Self: Sized;

    // --- Step lifecycle ----------------------------------------------------

    /// Run one simulation step: both domain passes for every attached actor,
    /// in insertion order. Notifications are buffered as events.
    fn step(&mut self);

    /// Rearm check plus dispatch against the actor's partner actors.
    /// Returns the first colliding partner, if the domain fired.
    fn on_step_actor_domain(&mut self, actor: ActorId) -> Result<Option<(ActorId, ActorId)>>;

    /// Rearm check plus dispatch against the actor's partner tiles.
    fn on_step_tile_domain(&mut self, actor: ActorId) -> Result<Option<(ActorId, TileLoc)>>;

    /// Drain and return the events accumulated since the last drain.
    fn drain_events(&mut self) -> Vec<CollisionEvent>;

    // --- Declarations ------------------------------------------------------

    fn declare_collision_rectangle(
        &mut self,
        actor: ActorId,
        frame: usize,
        center: DVec2,
        width: f64,
        height: f64,
    ) -> Result<()>;

    fn declare_collision_circle(&mut self, actor: ActorId, frame: usize, center: DVec2, radius: f64) -> Result<()>;

    fn declare_collision_line(&mut self, actor: ActorId, frame: usize, start: DVec2, end: DVec2) -> Result<()>;

    fn declare_collision_spot(&mut self, actor: ActorId, frame: usize, spot: DVec2) -> Result<()>;

    fn declare_collision_image(&mut self, actor: ActorId, frame: usize) -> Result<()>;

    fn declare_interaction_rectangle(
        &mut self,
        actor: ActorId,
        frame: usize,
        center: DVec2,
        width: f64,
        height: f64,
    ) -> Result<()>;

    fn declare_interaction_circle(&mut self, actor: ActorId, frame: usize, center: DVec2, radius: f64) -> Result<()>;

    fn declare_interaction_image(&mut self, actor: ActorId, frame: usize) -> Result<()>;

    /// Toggle participation of an actor in a domain without discarding shapes.
    fn set_domain_enabled(&mut self, actor: ActorId, domain: Domain, enable: bool) -> Result<()>;

    // --- Queries -----------------------------------------------------------

    /// Dispatch-matrix test between two actors' current collision shapes.
    fn is_actor_colliding(&self, a: ActorId, b: ActorId) -> Result<bool>;

    /// Dispatch-matrix test between an actor and a tile's static shape.
    fn is_tile_colliding(&self, actor: ActorId, tile: TileLoc) -> Result<bool>;

    /// Pointer hit-test against the actor's interaction area.
    fn is_touched(&self, actor: ActorId, point: DVec2) -> Result<bool>;

    /// Current cooldown counter of a domain.
    fn cooldown(&self, actor: ActorId, domain: Domain) -> Result<u32>;
}

/// Notified when an actor collides with one of its partner actors.
///
/// The return value reloads the actor-domain cooldown: the domain is tested
/// again `k` steps later, so 0 and 1 both rearm for the next step.
pub trait ActorCollisionListener {
    fn collide(&mut self, actor: ActorId, partner: ActorId) -> u32;
}

/// Notified when an actor collides with one of its partner tiles.
pub trait TileCollisionListener {
    fn collide(&mut self, actor: ActorId, tile: TileLoc) -> u32;
}

impl<F: FnMut(ActorId, ActorId) -> u32> ActorCollisionListener for F {
    fn collide(&mut self, actor: ActorId, partner: ActorId) -> u32 {
        self(actor, partner)
    }
}

impl<F: FnMut(ActorId, TileLoc) -> u32> TileCollisionListener for F {
    fn collide(&mut self, actor: ActorId, tile: TileLoc) -> u32 {
        self(actor, tile)
    }
}

/// Shape kernel signatures. All predicates are closed (boundary contact counts).
pub trait NarrowphaseApi {
    // Polygons (SAT) --------------------------------------------------------

    fn rect_rect(a: &Rectangle, b: &Rectangle) -> bool;
    fn rect_line(r: &Rectangle, l: &LineSegment) -> bool;

    // Circles ---------------------------------------------------------------

    fn circle_circle(a: &Circle, b: &Circle) -> bool;
    fn circle_rect(c: &Circle, r: &Rectangle) -> bool;
    fn circle_aabb(c: &Circle, min: DVec2, max: DVec2) -> bool;
    fn circle_line(c: &Circle, l: &LineSegment) -> bool;

    // Segments --------------------------------------------------------------

    fn line_line(a: &LineSegment, b: &LineSegment) -> bool;

    // Points ----------------------------------------------------------------

    fn point_in_rect(p: DVec2, r: &Rectangle, rotatable: bool) -> bool;
    fn point_on_line(p: DVec2, l: &LineSegment, epsilon: f64) -> bool;
    fn point_in_circle(p: DVec2, c: &Circle) -> bool;
}
