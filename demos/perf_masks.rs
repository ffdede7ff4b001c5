use glam::DVec2;
use spritehit::*;
use std::time::Instant;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn main() -> Result<(), CollisionError> {
    env_logger::init();

    let mut world = CollisionWorld::new(EngineConfig::default())?;

    // Ring-shaped sprite: opaque between radius 8 and 16
    let ring = PixelMask::from_fn(32, 32, |x, y| {
        let d = DVec2::new(x as f64 + 0.5 - 16.0, y as f64 + 0.5 - 16.0).length();
        (8.0..16.0).contains(&d)
    });

    let mut seed = 7u32;
    let n = 400;
    let mut ids = Vec::with_capacity(n);
    for _ in 0..n {
        let x = (lcg(&mut seed) % 1024) as f64;
        let y = (lcg(&mut seed) % 1024) as f64;
        let dir = (lcg(&mut seed) % 360) as f64;
        let id = world.add_actor(ActorDesc::single(ring.clone()).at(DVec2::new(x, y)).facing(dir).rotatable(true));
        world.declare_collision_image(id, 0)?;
        ids.push(id);
    }

    // Probes: circles tested against every ring
    let probe = world.add_actor(ActorDesc::single(PixelMask::filled(8, 8, true)));
    world.declare_collision_circle(probe, 0, DVec2::ZERO, 4.0)?;
    world.add_collision_actors(probe, ids.iter().copied())?;

    let n_queries = 2_000;
    let t0 = Instant::now();
    let mut positives = 0usize;
    for _ in 0..n_queries {
        let p = DVec2::new((lcg(&mut seed) % 1024) as f64, (lcg(&mut seed) % 1024) as f64);
        world.set_position(probe, p)?;
        positives += world.collision_actors_in_range(probe, 24.0)?.len();
        for &id in &ids {
            if world.is_actor_colliding(probe, id)? {
                positives += 1;
            }
        }
    }
    let dt = t0.elapsed().as_secs_f64();
    let total = n_queries * ids.len();
    println!(
        "circle_vs_mask: queries={} secs={:.3} throughput={:.0} q/s positives={}",
        total,
        dt,
        total as f64 / dt,
        positives
    );

    // Touch throughput through the default pixel-mask interaction areas
    let t1 = Instant::now();
    let mut touched = 0usize;
    for _ in 0..n_queries {
        let p = DVec2::new((lcg(&mut seed) % 1024) as f64, (lcg(&mut seed) % 1024) as f64);
        touched += world.touched_actors(p).len();
    }
    let dt1 = t1.elapsed().as_secs_f64();
    println!("touch: points={} secs={:.3} touched={}", n_queries, dt1, touched);
    println!("stats: {:?}", world.debug_stats());
    Ok(())
}
