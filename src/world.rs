use glam::DVec2;
use log::{debug, trace, warn};
use slotmap::SlotMap;

use std::time::Instant;

use crate::actor::{Actor, ActorDesc};
use crate::api::{ActorCollisionListener, CollisionWorldApi, TileCollisionListener};
use crate::area::AreaRole;
use crate::dispatch::{self, Participant};
use crate::error::{CollisionError, Result};
use crate::pixel::PixelMask;
use crate::tilemap::{TileMap, TileMapDesc};
use crate::types::*;

/// Actors, the optional tile map, and the per-step collision passes.
pub struct CollisionWorld {
    pub cfg: EngineConfig,
    pub step_counter: u64,

    actors: SlotMap<ActorId, Actor>,
    // Insertion order; also the paint order for pointer hit-testing
    order: Vec<ActorId>,
    tilemap: Option<TileMap>,

    // Event buffer, drained by the caller
    events: Vec<CollisionEvent>,

    counters: PassCounters,
    last_timing: Option<StepTiming>,
}

#[derive(Copy, Clone, Default)]
struct PassCounters {
    pairs_tested: usize,
    notifications: usize,
}

#[inline]
fn elapsed_ms(t: Option<Instant>) -> f64 {
    t.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0)
}

impl CollisionWorldApi for CollisionWorld {
    fn new(cfg: EngineConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            step_counter: 0,
            actors: SlotMap::with_key(),
            order: Vec::new(),
            tilemap: None,
            events: Vec::new(),
            counters: PassCounters::default(),
            last_timing: None,
        })
    }

    fn step(&mut self) {
        let timing = self.cfg.enable_timing;
        let t_all = if timing { Some(Instant::now()) } else { None };
        self.step_counter = self.step_counter.wrapping_add(1);
        self.counters = PassCounters::default();

        let mut actor_domain_ms = 0.0;
        let mut tile_domain_ms = 0.0;
        let order = self.order.clone();
        for id in order {
            let t0 = if timing { Some(Instant::now()) } else { None };
            self.actor_pass(id);
            actor_domain_ms += elapsed_ms(t0);

            let t1 = if timing { Some(Instant::now()) } else { None };
            self.tile_pass(id);
            tile_domain_ms += elapsed_ms(t1);
        }

        if let Some(t_all) = t_all {
            self.last_timing = Some(StepTiming {
                step_ms: t_all.elapsed().as_secs_f64() * 1000.0,
                actor_domain_ms,
                tile_domain_ms,
                pairs_tested: self.counters.pairs_tested,
                notifications: self.counters.notifications,
            });
        }
    }

    fn on_step_actor_domain(&mut self, actor: ActorId) -> Result<Option<(ActorId, ActorId)>> {
        self.actor(actor)?;
        Ok(self.actor_pass(actor).map(|partner| (actor, partner)))
    }

    fn on_step_tile_domain(&mut self, actor: ActorId) -> Result<Option<(ActorId, TileLoc)>> {
        self.actor(actor)?;
        Ok(self.tile_pass(actor).map(|tile| (actor, tile)))
    }

    fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    fn declare_collision_rectangle(
        &mut self,
        actor: ActorId,
        frame: usize,
        center: DVec2,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let base = Shape::Rectangle(Rectangle::new(center, 0.0, width, height));
        self.declare(actor, AreaRole::Collision, frame, base)
    }

    fn declare_collision_circle(&mut self, actor: ActorId, frame: usize, center: DVec2, radius: f64) -> Result<()> {
        self.declare(actor, AreaRole::Collision, frame, Shape::Circle(Circle::new(center, radius)))
    }

    fn declare_collision_line(&mut self, actor: ActorId, frame: usize, start: DVec2, end: DVec2) -> Result<()> {
        self.declare(actor, AreaRole::Collision, frame, Shape::Line(LineSegment::new(start, end)))
    }

    fn declare_collision_spot(&mut self, actor: ActorId, frame: usize, spot: DVec2) -> Result<()> {
        self.declare(actor, AreaRole::Collision, frame, Shape::Spot(spot))
    }

    fn declare_collision_image(&mut self, actor: ActorId, frame: usize) -> Result<()> {
        self.declare(actor, AreaRole::Collision, frame, Shape::PixelMask)
    }

    fn declare_interaction_rectangle(
        &mut self,
        actor: ActorId,
        frame: usize,
        center: DVec2,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let base = Shape::Rectangle(Rectangle::new(center, 0.0, width, height));
        self.declare(actor, AreaRole::Interaction, frame, base)
    }

    fn declare_interaction_circle(&mut self, actor: ActorId, frame: usize, center: DVec2, radius: f64) -> Result<()> {
        self.declare(actor, AreaRole::Interaction, frame, Shape::Circle(Circle::new(center, radius)))
    }

    fn declare_interaction_image(&mut self, actor: ActorId, frame: usize) -> Result<()> {
        self.declare(actor, AreaRole::Interaction, frame, Shape::PixelMask)
    }

    fn set_domain_enabled(&mut self, actor: ActorId, domain: Domain, enable: bool) -> Result<()> {
        let a = self.actor_mut(actor)?;
        match domain {
            Domain::Actor => a.actor_enabled = enable,
            Domain::Tile => a.tile_enabled = enable,
        }
        Ok(())
    }

    fn is_actor_colliding(&self, a: ActorId, b: ActorId) -> Result<bool> {
        let steps = self.cfg.rotation_steps;
        let pa = self.actor(a)?.collision_participant(steps);
        let pb = self.actor(b)?.collision_participant(steps);
        Ok(dispatch::query(&pa, &pb, &self.cfg))
    }

    fn is_tile_colliding(&self, actor: ActorId, tile: TileLoc) -> Result<bool> {
        let map = self.tilemap.as_ref().ok_or(CollisionError::NoTileMap)?;
        map.active_kind(tile)?;
        let me = self.actor(actor)?.collision_participant(self.cfg.rotation_steps);
        Ok(dispatch::query(&me, &Participant::fixed(map.world_shape(tile)), &self.cfg))
    }

    fn is_touched(&self, actor: ActorId, point: DVec2) -> Result<bool> {
        let a = self.actor(actor)?;
        if !a.touch_enabled {
            return Ok(false);
        }
        let area = a.interaction_participant(self.cfg.rotation_steps);
        Ok(dispatch::query(&Participant::fixed(Shape::Spot(point)), &area, &self.cfg))
    }

    fn cooldown(&self, actor: ActorId, domain: Domain) -> Result<u32> {
        Ok(self.actor(actor)?.cooldown.count(domain))
    }
}

impl CollisionWorld {
    fn actor(&self, id: ActorId) -> Result<&Actor> {
        self.actors.get(id).ok_or(CollisionError::UnknownActor(id))
    }

    fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor> {
        self.actors.get_mut(id).ok_or(CollisionError::UnknownActor(id))
    }

    fn declare(&mut self, id: ActorId, role: AreaRole, frame: usize, base: Shape) -> Result<()> {
        let a = self.actor_mut(id)?;
        let rotatable = a.rotatable;
        let registry = match role {
            AreaRole::Collision => &mut a.collision,
            AreaRole::Interaction => &mut a.interaction,
        };
        registry.declare(frame, base, rotatable)?;
        debug!("actor {id:?} frame {frame}: {} area {:?}", role.name(), base.kind());
        Ok(())
    }

    /// Gate, then test the actor's partner actors in list order.
    fn actor_pass(&mut self, id: ActorId) -> Option<ActorId> {
        let steps = self.cfg.rotation_steps;
        let actor = self.actors.get_mut(id)?;
        if !actor.cooldown.advance(Domain::Actor) || !actor.actor_enabled {
            return None;
        }

        let actor = self.actors.get(id)?;
        let me = actor.collision_participant(steps);
        if me.shape.is_none() {
            return None;
        }
        let mut hit = None;
        for &partner_id in &actor.actor_candidates {
            if partner_id == id {
                continue;
            }
            let Some(partner) = self.actors.get(partner_id) else { continue };
            self.counters.pairs_tested += 1;
            let other = partner.collision_participant(steps);
            let collides = dispatch::query(&me, &other, &self.cfg);
            trace!("{:?} {:?} vs {:?} {:?}: {collides}", id, me.shape.kind(), partner_id, other.shape.kind());
            if collides {
                hit = Some(partner_id);
                break;
            }
        }

        let partner = hit?;
        self.notify_actor(id, partner);
        Some(partner)
    }

    /// Gate, then test the actor's partner tiles in list order.
    fn tile_pass(&mut self, id: ActorId) -> Option<TileLoc> {
        let steps = self.cfg.rotation_steps;
        // Without a map the tile domain is frozen, counter included
        if self.tilemap.is_none() {
            return None;
        }
        let actor = self.actors.get_mut(id)?;
        if !actor.cooldown.advance(Domain::Tile) || !actor.tile_enabled {
            return None;
        }

        let actor = self.actors.get(id)?;
        if actor.tile_candidates.is_empty() {
            return None;
        }
        let map = self.tilemap.as_ref()?;
        let me = actor.collision_participant(steps);
        if me.shape.is_none() {
            return None;
        }
        let mut hit = None;
        for &loc in &actor.tile_candidates {
            if !map.contains(loc) {
                warn!("tile candidate {loc:?} of actor {id:?} lies outside the tile map");
                continue;
            }
            self.counters.pairs_tested += 1;
            let tile = Participant::fixed(map.world_shape(loc));
            let collides = dispatch::query(&me, &tile, &self.cfg);
            trace!("{:?} {:?} vs tile {loc:?} {:?}: {collides}", id, me.shape.kind(), tile.shape.kind());
            if collides {
                hit = Some(loc);
                break;
            }
        }

        let loc = hit?;
        self.notify_tile(id, loc);
        Some(loc)
    }

    fn notify_actor(&mut self, id: ActorId, partner: ActorId) {
        let Some(actor) = self.actors.get_mut(id) else { return };
        let cooldown = match actor.actor_listener.as_mut() {
            Some(listener) => listener.collide(id, partner),
            None => 0,
        };
        actor.cooldown.reload(Domain::Actor, cooldown);
        self.counters.notifications += 1;
        debug!("step {}: actor {id:?} hit actor {partner:?}, cooldown {cooldown}", self.step_counter);
        self.events.push(CollisionEvent {
            step: self.step_counter,
            actor: id,
            partner: Partner::Actor(partner),
            cooldown,
        });
    }

    fn notify_tile(&mut self, id: ActorId, loc: TileLoc) {
        let Some(actor) = self.actors.get_mut(id) else { return };
        let cooldown = match actor.tile_listener.as_mut() {
            Some(listener) => listener.collide(id, loc),
            None => 0,
        };
        actor.cooldown.reload(Domain::Tile, cooldown);
        self.counters.notifications += 1;
        debug!("step {}: actor {id:?} hit tile {loc:?}, cooldown {cooldown}", self.step_counter);
        self.events.push(CollisionEvent {
            step: self.step_counter,
            actor: id,
            partner: Partner::Tile(loc),
            cooldown,
        });
    }

    // --- Actors ----------------------------------------------------------------

    pub fn add_actor(&mut self, desc: ActorDesc) -> ActorId {
        let frames = desc.frames.len();
        let id = self.actors.insert(Actor::from_desc(desc, self.cfg.rotation_steps));
        self.order.push(id);
        debug!("attached actor {id:?} with {frames} frame(s)");
        id
    }

    /// Detaches an actor and drops it from every candidate list.
    pub fn remove_actor(&mut self, id: ActorId) -> Result<()> {
        self.actors.remove(id).ok_or(CollisionError::UnknownActor(id))?;
        self.order.retain(|a| *a != id);
        for other in self.actors.values_mut() {
            other.actor_candidates.retain(|a| *a != id);
        }
        debug!("removed actor {id:?}");
        Ok(())
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(id)
    }

    /// Attached actors in insertion order.
    pub fn actor_ids(&self) -> &[ActorId] {
        &self.order
    }

    /// Shows a frame, or hides the actor with `None`.
    pub fn show(&mut self, id: ActorId, frame: Option<usize>) -> Result<()> {
        let a = self.actor_mut(id)?;
        if let Some(f) = frame {
            let count = a.frames.len();
            if f >= count {
                return Err(CollisionError::FrameOutOfRange { frame: f, count });
            }
        }
        a.visible = frame;
        Ok(())
    }

    /// Cycles forward through the frames; a hidden actor shows its first frame.
    pub fn show_next_frame(&mut self, id: ActorId) -> Result<()> {
        let a = self.actor_mut(id)?;
        let n = a.frames.len();
        if n > 0 {
            a.visible = Some(a.visible.map_or(0, |f| (f + 1) % n));
        }
        Ok(())
    }

    /// Cycles backward through the frames; a hidden actor shows its last frame.
    pub fn show_previous_frame(&mut self, id: ActorId) -> Result<()> {
        let a = self.actor_mut(id)?;
        let n = a.frames.len();
        if n > 0 {
            a.visible = Some(a.visible.map_or(n - 1, |f| (f + n - 1) % n));
        }
        Ok(())
    }

    pub fn visible_frame(&self, id: ActorId) -> Result<Option<usize>> {
        Ok(self.actor(id)?.visible)
    }

    pub fn set_position(&mut self, id: ActorId, position: DVec2) -> Result<()> {
        self.actor_mut(id)?.position = position;
        Ok(())
    }

    pub fn position(&self, id: ActorId) -> Result<DVec2> {
        Ok(self.actor(id)?.position)
    }

    /// Sets the direction in degrees and updates the rotation index.
    pub fn set_direction(&mut self, id: ActorId, degrees: f64) -> Result<()> {
        let steps = self.cfg.rotation_steps;
        self.actor_mut(id)?.set_direction(degrees, steps);
        Ok(())
    }

    pub fn turn(&mut self, id: ActorId, degrees: f64) -> Result<()> {
        let steps = self.cfg.rotation_steps;
        let a = self.actor_mut(id)?;
        let direction = a.direction + degrees;
        a.set_direction(direction, steps);
        Ok(())
    }

    pub fn direction(&self, id: ActorId) -> Result<f64> {
        Ok(self.actor(id)?.direction)
    }

    pub fn rotation_index(&self, id: ActorId) -> Result<usize> {
        Ok(self.actor(id)?.rotation_index)
    }

    pub fn set_horz_mirror(&mut self, id: ActorId, mirrored: bool) -> Result<()> {
        self.actor_mut(id)?.mirror_h = mirrored;
        Ok(())
    }

    pub fn set_vert_mirror(&mut self, id: ActorId, mirrored: bool) -> Result<()> {
        self.actor_mut(id)?.mirror_v = mirrored;
        Ok(())
    }

    pub fn set_touch_enabled(&mut self, id: ActorId, enable: bool) -> Result<()> {
        self.actor_mut(id)?.touch_enabled = enable;
        Ok(())
    }

    pub fn active_collision_kind(&self, id: ActorId, frame: usize) -> Result<ShapeKind> {
        Ok(self.actor(id)?.collision.active_kind(frame))
    }

    pub fn active_interaction_kind(&self, id: ActorId, frame: usize) -> Result<ShapeKind> {
        Ok(self.actor(id)?.interaction.active_kind(frame))
    }

    /// Current collision shape in world space (`Shape::None` when hidden).
    pub fn collision_shape(&self, id: ActorId) -> Result<Shape> {
        Ok(self.actor(id)?.collision_shape())
    }

    // --- Candidates and listeners ---------------------------------------------

    pub fn add_collision_actor(&mut self, id: ActorId, partner: ActorId) -> Result<()> {
        self.actor(partner)?;
        let a = self.actor_mut(id)?;
        if partner != id && !a.actor_candidates.contains(&partner) {
            a.actor_candidates.push(partner);
        }
        Ok(())
    }

    pub fn add_collision_actors(&mut self, id: ActorId, partners: impl IntoIterator<Item = ActorId>) -> Result<()> {
        for partner in partners {
            self.add_collision_actor(id, partner)?;
        }
        Ok(())
    }

    pub fn remove_collision_actor(&mut self, id: ActorId, partner: ActorId) -> Result<()> {
        self.actor_mut(id)?.actor_candidates.retain(|a| *a != partner);
        Ok(())
    }

    /// Tiles are not checked against the map here; the map may be attached later.
    pub fn add_collision_tile(&mut self, id: ActorId, loc: TileLoc) -> Result<()> {
        let a = self.actor_mut(id)?;
        if !a.tile_candidates.contains(&loc) {
            a.tile_candidates.push(loc);
        }
        Ok(())
    }

    pub fn add_collision_tiles(&mut self, id: ActorId, locs: impl IntoIterator<Item = TileLoc>) -> Result<()> {
        for loc in locs {
            self.add_collision_tile(id, loc)?;
        }
        Ok(())
    }

    pub fn remove_collision_tile(&mut self, id: ActorId, loc: TileLoc) -> Result<()> {
        self.actor_mut(id)?.tile_candidates.retain(|t| *t != loc);
        Ok(())
    }

    pub fn set_actor_collision_listener(
        &mut self,
        id: ActorId,
        listener: impl ActorCollisionListener + 'static,
    ) -> Result<()> {
        self.actor_mut(id)?.actor_listener = Some(Box::new(listener));
        Ok(())
    }

    pub fn set_tile_collision_listener(
        &mut self,
        id: ActorId,
        listener: impl TileCollisionListener + 'static,
    ) -> Result<()> {
        self.actor_mut(id)?.tile_listener = Some(Box::new(listener));
        Ok(())
    }

    // --- Queries ------------------------------------------------------------------

    /// Partner actors whose rectangle or circle collision area meets a circle
    /// of `radius` around the actor's position.
    pub fn collision_actors_in_range(&self, id: ActorId, radius: f64) -> Result<Vec<ActorId>> {
        let steps = self.cfg.rotation_steps;
        let a = self.actor(id)?;
        let probe = Participant::fixed(Shape::Circle(Circle::new(a.position, radius)));
        let hits = a
            .actor_candidates
            .iter()
            .copied()
            .filter(|c| *c != id)
            .filter(|c| {
                self.actors.get(*c).is_some_and(|other| {
                    let part = other.collision_participant(steps);
                    matches!(part.shape, Shape::Rectangle(_) | Shape::Circle(_))
                        && dispatch::query(&probe, &part, &self.cfg)
                })
            })
            .collect();
        Ok(hits)
    }

    /// Every actor whose interaction area contains `point`, topmost (latest added) first.
    pub fn touched_actors(&self, point: DVec2) -> Vec<ActorId> {
        self.order
            .iter()
            .rev()
            .copied()
            .filter(|id| matches!(self.is_touched(*id, point), Ok(true)))
            .collect()
    }

    // --- Tiles --------------------------------------------------------------------

    /// Attaches a tile map, replacing any previous one.
    pub fn attach_tilemap(&mut self, desc: TileMapDesc) -> Result<()> {
        self.tilemap = Some(TileMap::new(desc)?);
        debug!("attached {}x{} tile map, tile size {}", desc.width, desc.height, desc.tile_size);
        Ok(())
    }

    /// Removes the tile map; tile candidates stay listed but never fire.
    pub fn detach_tilemap(&mut self) -> Option<TileMap> {
        let map = self.tilemap.take();
        if map.is_some() {
            debug!("detached tile map");
        }
        map
    }

    pub fn tilemap(&self) -> Option<&TileMap> {
        self.tilemap.as_ref()
    }

    fn tilemap_mut(&mut self) -> Result<&mut TileMap> {
        self.tilemap.as_mut().ok_or(CollisionError::NoTileMap)
    }

    /// Assigns (or with `None` clears) a tile's image, which sets its default rectangle.
    pub fn set_tile_image(&mut self, loc: TileLoc, image: Option<&PixelMask>) -> Result<()> {
        self.tilemap_mut()?.set_image(loc, image)
    }

    pub fn declare_tile_rectangle(&mut self, loc: TileLoc, center: DVec2, width: f64, height: f64) -> Result<()> {
        self.declare_tile(loc, Shape::Rectangle(Rectangle::new(center, 0.0, width, height)))
    }

    pub fn declare_tile_circle(&mut self, loc: TileLoc, center: DVec2, radius: f64) -> Result<()> {
        self.declare_tile(loc, Shape::Circle(Circle::new(center, radius)))
    }

    pub fn declare_tile_line(&mut self, loc: TileLoc, start: DVec2, end: DVec2) -> Result<()> {
        self.declare_tile(loc, Shape::Line(LineSegment::new(start, end)))
    }

    pub fn declare_tile_spot(&mut self, loc: TileLoc, spot: DVec2) -> Result<()> {
        self.declare_tile(loc, Shape::Spot(spot))
    }

    fn declare_tile(&mut self, loc: TileLoc, shape: Shape) -> Result<()> {
        self.tilemap_mut()?.declare(loc, shape)?;
        debug!("tile {loc:?}: collision area {:?}", shape.kind());
        Ok(())
    }

    pub fn set_tile_collision_enabled(&mut self, loc: TileLoc, enable: bool) -> Result<()> {
        self.tilemap_mut()?.set_enabled(loc, enable)
    }

    // --- Instrumentation ------------------------------------------------------------

    /// Return debug stats for the current world state.
    pub fn debug_stats(&self) -> WorldStats {
        WorldStats {
            actors: self.actors.len(),
            visible_actors: self.actors.values().filter(|a| a.visible.is_some()).count(),
            tiles_with_shapes: self.tilemap.as_ref().map_or(0, |m| m.shaped_cells()),
            actor_candidates: self.actors.values().map(|a| a.actor_candidates.len()).sum(),
            tile_candidates: self.actors.values().map(|a| a.tile_candidates.len()).sum(),
        }
    }

    /// Return timing breakdown for the last `step` (only with `enable_timing`).
    pub fn timing(&self) -> Option<StepTiming> {
        self.last_timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> CollisionWorld {
        CollisionWorld::new(EngineConfig::default()).unwrap()
    }

    fn square(w: &mut CollisionWorld, x: f64, y: f64, size: u32) -> ActorId {
        w.add_actor(ActorDesc::single(PixelMask::filled(size, size, true)).at(DVec2::new(x, y)))
    }

    #[test]
    fn test_add_remove_and_unknown_actor() {
        let mut w = world();
        let a = square(&mut w, 0.0, 0.0, 10);
        let b = square(&mut w, 5.0, 0.0, 10);
        w.add_collision_actor(a, b).unwrap();
        assert_eq!(w.debug_stats().actor_candidates, 1);

        w.remove_actor(b).unwrap();
        assert!(!w.contains(b));
        assert_eq!(w.actor_ids(), &[a]);
        assert_eq!(w.debug_stats().actor_candidates, 0);
        assert!(matches!(w.is_actor_colliding(a, b), Err(CollisionError::UnknownActor(id)) if id == b));
        assert!(matches!(w.remove_actor(b), Err(CollisionError::UnknownActor(_))));
    }

    #[test]
    fn test_default_rectangles_collide_on_step() {
        let mut w = world();
        let a = square(&mut w, 0.0, 0.0, 10);
        let b = square(&mut w, 9.0, 0.0, 10);
        w.add_collision_actor(a, b).unwrap();
        w.set_actor_collision_listener(a, |_: ActorId, _: ActorId| 2).unwrap();

        w.step();
        let evs = w.drain_events();
        assert_eq!(evs.len(), 1);
        assert_eq!(evs[0].actor, a);
        assert_eq!(evs[0].partner, Partner::Actor(b));
        assert_eq!(evs[0].cooldown, 2);
        assert_eq!(evs[0].step, 1);
        assert_eq!(w.cooldown(a, Domain::Actor).unwrap(), 2);
        assert!(w.drain_events().is_empty());
    }

    #[test]
    fn test_only_first_positive_candidate_fires() {
        let mut w = world();
        let a = square(&mut w, 0.0, 0.0, 10);
        let far = square(&mut w, 100.0, 0.0, 10);
        let b = square(&mut w, 5.0, 0.0, 10);
        let c = square(&mut w, -5.0, 0.0, 10);
        w.add_collision_actors(a, [far, b, c]).unwrap();

        assert_eq!(w.on_step_actor_domain(a).unwrap(), Some((a, b)));
        assert_eq!(w.drain_events().len(), 1);
    }

    #[test]
    fn test_hidden_and_disabled_actors_never_collide() {
        let mut w = world();
        let a = square(&mut w, 0.0, 0.0, 10);
        let b = square(&mut w, 0.0, 0.0, 10);
        w.add_collision_actor(a, b).unwrap();

        w.show(b, None).unwrap();
        assert!(!w.is_actor_colliding(a, b).unwrap());
        w.step();
        assert!(w.drain_events().is_empty());

        w.show(b, Some(0)).unwrap();
        w.set_domain_enabled(a, Domain::Actor, false).unwrap();
        w.step();
        assert!(w.drain_events().is_empty());
        w.set_domain_enabled(a, Domain::Actor, true).unwrap();
        w.step();
        assert_eq!(w.drain_events().len(), 1);
    }

    #[test]
    fn test_declarations_validate_frame_and_kind() {
        let mut w = world();
        let a = square(&mut w, 0.0, 0.0, 10);
        assert!(matches!(
            w.declare_collision_circle(a, 1, DVec2::ZERO, 2.0),
            Err(CollisionError::FrameOutOfRange { frame: 1, count: 1 })
        ));
        w.declare_collision_spot(a, 0, DVec2::new(3.0, 0.0)).unwrap();
        assert_eq!(w.active_collision_kind(a, 0).unwrap(), ShapeKind::Spot);
        assert_eq!(w.collision_shape(a).unwrap(), Shape::Spot(DVec2::new(3.0, 0.0)));
        assert!(matches!(w.show(a, Some(3)), Err(CollisionError::FrameOutOfRange { .. })));
    }

    #[test]
    fn test_rotatable_spot_follows_direction() {
        let mut w = world();
        let a = w.add_actor(ActorDesc::single(PixelMask::filled(20, 20, true)).rotatable(true));
        w.declare_collision_spot(a, 0, DVec2::new(8.0, 0.0)).unwrap();
        let target = w.add_actor(ActorDesc::single(PixelMask::filled(4, 4, true)).at(DVec2::new(0.0, 8.0)));
        w.declare_collision_circle(target, 0, DVec2::ZERO, 1.0).unwrap();

        assert!(!w.is_actor_colliding(a, target).unwrap());
        w.set_direction(a, 90.0).unwrap();
        assert_eq!(w.rotation_index(a).unwrap(), 15);
        assert!(w.is_actor_colliding(a, target).unwrap());
        w.turn(a, 90.0).unwrap();
        assert_eq!(w.direction(a).unwrap(), 180.0);
        assert!(!w.is_actor_colliding(a, target).unwrap());
    }

    #[test]
    fn test_tile_domain_with_default_image_rectangle() {
        let mut w = world();
        w.attach_tilemap(TileMapDesc::new(4, 4, DVec2::splat(16.0))).unwrap();
        let wall = TileLoc::new(2, 0);
        w.set_tile_image(wall, Some(&PixelMask::filled(16, 16, true))).unwrap();

        let a = square(&mut w, 20.0, 8.0, 8);
        w.add_collision_tiles(a, [TileLoc::new(0, 0), wall, TileLoc::new(9, 9)]).unwrap();
        w.set_tile_collision_listener(a, |_: ActorId, _: TileLoc| 2).unwrap();

        // Actor spans x 16..24, wall spans 32..48
        assert!(!w.is_tile_colliding(a, wall).unwrap());
        w.set_position(a, DVec2::new(29.0, 8.0)).unwrap();
        assert!(w.is_tile_colliding(a, wall).unwrap());

        assert_eq!(w.on_step_tile_domain(a).unwrap(), Some((a, wall)));
        assert_eq!(w.cooldown(a, Domain::Tile).unwrap(), 2);
        // Cooling: the next step is gated, the one after fires again
        assert_eq!(w.on_step_tile_domain(a).unwrap(), None);
        assert_eq!(w.on_step_tile_domain(a).unwrap(), Some((a, wall)));

        w.set_tile_collision_enabled(wall, false).unwrap();
        assert!(!w.is_tile_colliding(a, wall).unwrap());
        assert!(matches!(w.is_tile_colliding(a, TileLoc::new(9, 9)), Err(CollisionError::TileOutOfRange { .. })));
    }

    #[test]
    fn test_tile_queries_need_a_map() {
        let mut w = world();
        let a = square(&mut w, 0.0, 0.0, 8);
        assert!(matches!(w.is_tile_colliding(a, TileLoc::new(0, 0)), Err(CollisionError::NoTileMap)));
        assert!(matches!(w.declare_tile_circle(TileLoc::new(0, 0), DVec2::ZERO, 2.0), Err(CollisionError::NoTileMap)));
        w.add_collision_tile(a, TileLoc::new(0, 0)).unwrap();
        assert_eq!(w.on_step_tile_domain(a).unwrap(), None);
    }

    #[test]
    fn test_tile_cooldown_holds_while_detached() {
        let mut w = world();
        w.attach_tilemap(TileMapDesc::new(2, 2, DVec2::splat(16.0))).unwrap();
        let floor = TileLoc::new(0, 0);
        w.set_tile_image(floor, Some(&PixelMask::filled(16, 16, true))).unwrap();
        let a = square(&mut w, 8.0, 8.0, 8);
        w.add_collision_tile(a, floor).unwrap();
        w.set_tile_collision_listener(a, |_: ActorId, _: TileLoc| 3).unwrap();

        assert_eq!(w.on_step_tile_domain(a).unwrap(), Some((a, floor)));
        let map = w.detach_tilemap().unwrap();
        assert!(w.detach_tilemap().is_none());
        for _ in 0..5 {
            assert_eq!(w.on_step_tile_domain(a).unwrap(), None);
        }
        assert_eq!(w.cooldown(a, Domain::Tile).unwrap(), 3);

        w.attach_tilemap(*map.desc()).unwrap();
        w.set_tile_image(floor, Some(&PixelMask::filled(16, 16, true))).unwrap();
        assert_eq!(w.on_step_tile_domain(a).unwrap(), None);
        assert_eq!(w.on_step_tile_domain(a).unwrap(), None);
        assert_eq!(w.on_step_tile_domain(a).unwrap(), Some((a, floor)));
    }

    #[test]
    fn test_touch_uses_interaction_area() {
        let mut w = world();
        // Left half opaque
        let mask = PixelMask::from_fn(10, 10, |x, _| x < 5);
        let a = w.add_actor(ActorDesc::single(mask).at(DVec2::new(50.0, 50.0)));
        assert!(w.is_touched(a, DVec2::new(47.0, 50.0)).unwrap());
        assert!(!w.is_touched(a, DVec2::new(53.0, 50.0)).unwrap());

        w.set_horz_mirror(a, true).unwrap();
        assert!(w.is_touched(a, DVec2::new(53.0, 50.0)).unwrap());

        w.declare_interaction_circle(a, 0, DVec2::ZERO, 20.0).unwrap();
        assert!(w.is_touched(a, DVec2::new(65.0, 50.0)).unwrap());
        w.set_touch_enabled(a, false).unwrap();
        assert!(!w.is_touched(a, DVec2::new(50.0, 50.0)).unwrap());
    }

    #[test]
    fn test_touched_actors_topmost_first() {
        let mut w = world();
        let bottom = square(&mut w, 0.0, 0.0, 10);
        let top = square(&mut w, 2.0, 0.0, 10);
        let hidden = square(&mut w, 0.0, 0.0, 10);
        w.show(hidden, None).unwrap();
        assert_eq!(w.touched_actors(DVec2::new(1.0, 0.0)), vec![top, bottom]);
        assert_eq!(w.touched_actors(DVec2::new(-4.0, 0.0)), vec![bottom]);
    }

    #[test]
    fn test_range_query_considers_rect_and_circle_only() {
        let mut w = world();
        let a = square(&mut w, 0.0, 0.0, 4);
        let near = square(&mut w, 10.0, 0.0, 4);
        let far = square(&mut w, 30.0, 0.0, 4);
        let spot = square(&mut w, 5.0, 0.0, 4);
        w.declare_collision_spot(spot, 0, DVec2::ZERO).unwrap();
        w.add_collision_actors(a, [near, far, spot]).unwrap();
        assert_eq!(w.collision_actors_in_range(a, 9.0).unwrap(), vec![near]);
        assert_eq!(w.collision_actors_in_range(a, 7.0).unwrap(), Vec::<ActorId>::new());
    }

    #[test]
    fn test_frame_cycling_wraps() {
        let mut w = world();
        let frames = vec![PixelMask::filled(2, 2, true), PixelMask::filled(4, 4, true), PixelMask::filled(6, 6, true)];
        let a = w.add_actor(ActorDesc::new(frames).hidden());
        w.show_next_frame(a).unwrap();
        assert_eq!(w.visible_frame(a).unwrap(), Some(0));
        w.show_previous_frame(a).unwrap();
        assert_eq!(w.visible_frame(a).unwrap(), Some(2));
        w.show_next_frame(a).unwrap();
        assert_eq!(w.visible_frame(a).unwrap(), Some(0));
        assert_eq!(w.debug_stats().visible_actors, 1);
    }

    #[test]
    fn test_timing_recorded_when_enabled() {
        let cfg = EngineConfig { enable_timing: true, ..EngineConfig::default() };
        let mut w = CollisionWorld::new(cfg).unwrap();
        let a = square(&mut w, 0.0, 0.0, 10);
        let b = square(&mut w, 5.0, 0.0, 10);
        w.add_collision_actor(a, b).unwrap();
        w.add_collision_actor(b, a).unwrap();
        assert!(w.timing().is_none());
        w.step();
        let t = w.timing().unwrap();
        assert_eq!(t.pairs_tested, 2);
        assert_eq!(t.notifications, 2);
        assert!(t.step_ms >= 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = EngineConfig { rotation_steps: 0, ..EngineConfig::default() };
        assert!(matches!(CollisionWorld::new(cfg), Err(CollisionError::InvalidConfig(_))));
    }
}
