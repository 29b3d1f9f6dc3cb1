//! Conveyor Line Demo - Crates ride a belt past a sensor and drop onto a floor
//!
//! Headless: the scene is stepped for a few simulated seconds and progress is
//! logged.
//!
//! Run with: RUST_LOG=info cargo run --manifest-path demos/conveyor_line/Cargo.toml

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::Vec2;
use rein2d::bodies::{sensor_body, Conveyor, ProximitySensor, SensorEvent};
use rein2d::{BodyHandle, BodySet, PhysicsEngine, TemplateRegistry};
use tracing_subscriber::EnvFilter;

/// Crates placed on the belt at start
const CRATE_COUNT: usize = 5;
/// Gap between crates along the belt
const CRATE_SPACING: f32 = 60.0;
/// Simulated seconds
const RUN_SECONDS: f64 = 12.0;
/// Frame time fed to the engine
const FRAME_TIME: f64 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let registry = TemplateRegistry::with_builtin();
    let mut bodies = BodySet::new();
    let mut engine = PhysicsEngine::new();
    engine.environment_mut().set_preset("platformer")?;

    // Belt along y = 0..20, floor below and beyond its east end
    let mut belt = registry.create("Conveyor Belt")?;
    belt.set_size(400.0, 20.0)?;
    if let Some(conveyor) = belt.behavior_mut::<Conveyor>() {
        conveyor.set_belt_speed(80.0);
    }
    let belt = bodies.insert(belt);

    let mut floor = registry.create("Solid Platform Floor")?;
    floor.set_position(Vec2::new(400.0, -100.0));
    let floor = bodies.insert(floor);

    let counted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&counted);
    let sensor = ProximitySensor::new().with_listener(move |event| match event {
        SensorEvent::ObjectEntered(handle) => {
            let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::info!("Crate {:?} reached the end of the line ({} so far)", handle, n);
        }
        SensorEvent::Activated => tracing::debug!("End-of-line sensor on"),
        SensorEvent::Deactivated => tracing::debug!("End-of-line sensor off"),
        SensorEvent::ObjectExited(_) => {}
    });
    let gate = bodies.insert(sensor_body(
        Vec2::new(380.0, 20.0),
        Vec2::new(20.0, 40.0),
        sensor,
    )?);

    let mut crates: Vec<BodyHandle> = Vec::with_capacity(CRATE_COUNT);
    for i in 0..CRATE_COUNT {
        let mut body = registry.create("Crate")?;
        body.set_position(Vec2::new(10.0 + i as f32 * CRATE_SPACING, 20.0));
        body.name = format!("Crate {}", i + 1);
        crates.push(bodies.insert(body));
    }

    for handle in [belt, floor, gate].into_iter().chain(crates.iter().copied()) {
        engine.register_body(&bodies, handle)?;
    }

    let frames = (RUN_SECONDS / FRAME_TIME).round() as usize;
    for frame in 0..frames {
        engine.step(&mut bodies, FRAME_TIME)?;

        if frame % 120 == 0 {
            let on_belt = bodies
                .get(belt)
                .and_then(|b| b.behavior::<Conveyor>())
                .map_or(0, |c| c.bodies_on_belt().count());
            tracing::info!(
                "t = {:.1}s: {} crates on the belt, {} contacts",
                engine.total_time(),
                on_belt,
                engine.last_contacts().len()
            );
        }
    }

    for &handle in &crates {
        if let Some(body) = bodies.get(handle) {
            tracing::info!(
                "{} at ({:.1}, {:.1}) moving {:.1} u/s",
                body.name,
                body.position().x,
                body.position().y,
                body.velocity().length()
            );
        }
    }

    let stats = engine.stats(&bodies);
    tracing::info!(
        "Done: {} steps over {:.2}s, {} of {} bodies awake, {} crates counted",
        stats.step_count,
        stats.total_time,
        stats.active_bodies,
        stats.body_count,
        counted.load(Ordering::Relaxed)
    );
    Ok(())
}
