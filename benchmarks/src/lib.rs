//! Scene setup shared by the rein2d benchmarks.
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- grid

use glam::Vec2;
use rein2d::bodies::{conveyor_body, crate_body, ConveyorDirection, CrateKind};
use rein2d::physics::collider::Aabb;
use rein2d::{BodyHandle, BodySet, PhysicsBody, PhysicsEngine};

/// Deterministic xorshift so every run benches the same scene.
pub struct Scatter(u32);

impl Scatter {
    pub fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    /// Next value in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x >> 8) as f32 / (1u32 << 24) as f32
    }

    pub fn point_in(&mut self, extent: f32) -> Vec2 {
        Vec2::new(self.next_f32() * extent, self.next_f32() * extent)
    }
}

// ---------------------------------------------------------------------------
// Body sets
// ---------------------------------------------------------------------------

/// `n` 10x10 dynamic boxes scattered over a square sized so roughly a
/// quarter of them touch a neighbour.
pub fn setup_box_set(n: usize) -> (BodySet, Vec<BodyHandle>) {
    let extent = (n as f32).sqrt() * 20.0;
    let mut scatter = Scatter::new(0x5eed);
    let mut bodies = BodySet::new();
    let mut handles = Vec::with_capacity(n);
    for _ in 0..n {
        let p = scatter.point_in(extent);
        let body = PhysicsBody::default().with_position(p.x, p.y);
        handles.push(bodies.insert(body));
    }
    (bodies, handles)
}

/// Bounds of every body, in handle order.
pub fn bounds_of(bodies: &BodySet, handles: &[BodyHandle]) -> Vec<(BodyHandle, Aabb)> {
    handles
        .iter()
        .filter_map(|&h| bodies.get(h).map(|b| (h, b.bounds())))
        .collect()
}

/// `n` overlapping pairs moving head-on.
pub fn setup_contact_pairs(n: usize) -> Vec<(PhysicsBody, PhysicsBody)> {
    (0..n)
        .map(|i| {
            let y = i as f32 * 20.0;
            let a = PhysicsBody::default()
                .with_position(0.0, y)
                .with_velocity(Vec2::new(5.0, 0.0));
            let b = PhysicsBody::default()
                .with_position(8.0, y)
                .with_velocity(Vec2::new(-5.0, 0.0));
            (a, b)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Engine scenes
// ---------------------------------------------------------------------------

/// Crates dropped in a column grid onto a long conveyor.
pub fn setup_scene(n: usize) -> rein2d::Result<(BodySet, PhysicsEngine)> {
    let columns = (n as f32).sqrt().ceil().max(1.0) as usize;
    let mut bodies = BodySet::new();
    let mut engine = PhysicsEngine::new();
    engine.environment_mut().set_preset("platformer")?;

    let width = columns as f32 * 30.0 + 100.0;
    let belt = bodies.insert(conveyor_body(
        Vec2::ZERO,
        Vec2::new(width, 20.0),
        ConveyorDirection::East,
        50.0,
        false,
    )?);
    engine.register_body(&bodies, belt)?;

    for i in 0..n {
        let column = (i % columns) as f32;
        let row = (i / columns) as f32;
        let body = crate_body(
            CrateKind::Wooden,
            Vec2::new(column * 30.0, 25.0 + row * 25.0),
            Vec2::splat(20.0),
            10.0,
        )?;
        let handle = bodies.insert(body);
        engine.register_body(&bodies, handle)?;
    }
    Ok((bodies, engine))
}
