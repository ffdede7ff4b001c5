use glam::DVec2;
use spritehit::*;

use std::cell::Cell;
use std::rc::Rc;

fn main() -> Result<(), CollisionError> {
    env_logger::init();

    let mut world = CollisionWorld::new(EngineConfig { enable_timing: true, ..EngineConfig::default() })?;
    world.attach_tilemap(TileMapDesc::new(16, 4, DVec2::splat(32.0)))?;

    // A wall column at x = 12
    let brick = PixelMask::filled(32, 32, true);
    let wall: Vec<TileLoc> = (0..4).map(|y| TileLoc::new(12, y)).collect();
    for &loc in &wall {
        world.set_tile_image(loc, Some(&brick))?;
    }

    // The tank body is a rotatable 40x24 hull; its collision area is the
    // muzzle spot at the front of the barrel.
    let hull = PixelMask::from_fn(40, 24, |x, y| x < 30 || (9..15).contains(&y));
    let tank = world.add_actor(ActorDesc::single(hull).at(DVec2::new(80.0, 64.0)).rotatable(true));
    world.declare_collision_spot(tank, 0, DVec2::new(20.0, 0.0))?;

    let shell = world.add_actor(ActorDesc::single(PixelMask::filled(6, 6, true)).at(DVec2::new(120.0, 64.0)));
    world.declare_collision_circle(shell, 0, DVec2::ZERO, 3.0)?;

    world.add_collision_actor(shell, tank)?;
    world.add_collision_tiles(shell, wall.iter().copied())?;

    let hits = Rc::new(Cell::new(0u32));
    let counter = hits.clone();
    world.set_tile_collision_listener(shell, move |_: ActorId, loc: TileLoc| {
        counter.set(counter.get() + 1);
        println!("shell hit the wall at {:?}", loc);
        10
    })?;
    world.set_actor_collision_listener(shell, |_: ActorId, _: ActorId| 5)?;

    for frame in 0..80 {
        let pos = world.position(shell)? + DVec2::new(4.0, 0.0);
        world.set_position(shell, pos)?;
        world.turn(tank, 6.0)?;
        world.step();
        for ev in world.drain_events() {
            println!("step {:>3}: {:?} -> {:?} (cooldown {})", ev.step, ev.actor, ev.partner, ev.cooldown);
        }
        if frame % 20 == 0 {
            if let Some(t) = world.timing() {
                println!(
                    "timing: step={:.3}ms actors={:.3}ms tiles={:.3}ms pairs={}",
                    t.step_ms, t.actor_domain_ms, t.tile_domain_ms, t.pairs_tested
                );
            }
        }
    }

    println!("wall hits: {}", hits.get());
    println!("touched at muzzle: {:?}", world.touched_actors(DVec2::new(80.0, 64.0)));
    println!("stats: {:?}", world.debug_stats());
    Ok(())
}
