//! 2D rigid body physics with fixed-timestep simulation.
//!
//! # Architecture
//!
//! Each fixed step runs the same pipeline:
//!
//! 1. Apply forces (gravity, fluid drag)
//! 2. Integrate velocities and positions
//! 3. Rebuild the broadphase grid
//! 4. Detect collisions and fire enter/stay/exit hooks
//! 5. Resolve contacts (impulse + positional correction)
//! 6. Run per-body update hooks
//! 7. Update sleep states

pub mod behavior;
pub mod body;
pub mod broadphase;
pub mod collider;
pub mod collision;
pub mod contact;
pub mod environment;
pub mod material;
pub mod narrowphase;
pub mod rigid_body;
pub mod solver;

use glam::Vec2;

use crate::error::{PhysicsError, Result};

use self::body::{BodyHandle, BodySet};
use self::collision::{CollisionConfig, CollisionService};
use self::contact::CollisionInfo;
use self::environment::EnvironmentService;

/// Configuration for the physics simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    /// Fixed timestep for physics updates in seconds. Default: 1/60.
    pub physics_step: f64,
    /// Maximum number of fixed steps per `step` call. Default: 10.
    pub max_steps_per_call: u32,
    /// Multiplier applied to incoming frame time. 0 pauses. Default: 1.0.
    pub time_scale: f64,
    /// Converts `width * height` into a drag cross-section. Default: 0.0001.
    pub drag_area_scale: f32,
    /// Seconds below the sleep threshold before a dynamic body falls asleep.
    /// Default: `None` (bodies never auto-sleep).
    pub auto_sleep_after: Option<f32>,
    pub collision: CollisionConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            physics_step: 1.0 / 60.0,
            max_steps_per_call: 10,
            time_scale: 1.0,
            drag_area_scale: 0.0001,
            auto_sleep_after: None,
            collision: CollisionConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Check every field, including the collision config.
    pub fn validate(&self) -> Result<()> {
        validate_physics_step(self.physics_step)?;
        validate_time_scale(self.time_scale)?;
        if self.max_steps_per_call == 0 {
            return Err(PhysicsError::invalid(
                "max steps per call",
                "must be >= 1, got 0",
            ));
        }
        if self.drag_area_scale.is_nan() || self.drag_area_scale < 0.0 {
            return Err(PhysicsError::invalid(
                "drag area scale",
                format!("must be >= 0, got {}", self.drag_area_scale),
            ));
        }
        if let Some(delay) = self.auto_sleep_after {
            if delay.is_nan() || delay < 0.0 {
                return Err(PhysicsError::invalid(
                    "auto sleep delay",
                    format!("must be >= 0, got {delay}"),
                ));
            }
        }
        self.collision.validate()
    }
}

fn validate_physics_step(step: f64) -> Result<()> {
    if step.is_nan() || step <= 0.0 {
        return Err(PhysicsError::invalid(
            "physics step",
            format!("must be > 0, got {step}"),
        ));
    }
    Ok(())
}

fn validate_time_scale(scale: f64) -> Result<()> {
    if scale.is_nan() || scale < 0.0 {
        return Err(PhysicsError::invalid(
            "time scale",
            format!("must be >= 0, got {scale}"),
        ));
    }
    Ok(())
}

/// Snapshot of engine counters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStats {
    pub total_time: f64,
    pub step_count: u64,
    pub body_count: usize,
    /// Registered bodies that are enabled and awake.
    pub active_bodies: usize,
    pub physics_step: f64,
    pub time_scale: f64,
    pub accumulator: f64,
}

/// Top-level simulation driver.
///
/// Bodies live in a [`BodySet`] owned by the caller; the engine only keeps
/// the handles registered with it.
#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    config: PhysicsConfig,
    environment: EnvironmentService,
    collision: CollisionService,
    bodies: Vec<BodyHandle>,
    accumulator: f64,
    total_time: f64,
    step_count: u64,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsEngine {
    /// Create an engine with the default configuration and Earth environment.
    pub fn new() -> Self {
        let config = PhysicsConfig::default();
        Self {
            collision: CollisionService::new(config.collision.clone()),
            config,
            environment: EnvironmentService::new(),
            bodies: Vec::new(),
            accumulator: 0.0,
            total_time: 0.0,
            step_count: 0,
        }
    }

    /// Create an engine from a custom configuration, validating it first.
    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            collision: CollisionService::new(config.collision.clone()),
            config,
            ..Self::new()
        })
    }

    /// Current engine configuration.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Environment settings (gravity, fluid density, limits).
    pub fn environment(&self) -> &EnvironmentService {
        &self.environment
    }

    /// Mutable access to the environment settings.
    pub fn environment_mut(&mut self) -> &mut EnvironmentService {
        &mut self.environment
    }

    /// Collision service owning the broadphase and pair tracking.
    pub fn collision(&self) -> &CollisionService {
        &self.collision
    }

    /// Register a body with the engine and the collision service.
    ///
    /// Returns `Ok(false)` if it was already registered.
    pub fn register_body(&mut self, bodies: &BodySet, handle: BodyHandle) -> Result<bool> {
        if !bodies.contains(handle) {
            return Err(PhysicsError::UnknownBody(handle));
        }
        if self.is_registered(handle) {
            return Ok(false);
        }
        self.bodies.push(handle);
        self.collision.register(bodies, handle);
        tracing::debug!("Registered body {:?}", handle);
        Ok(true)
    }

    /// Remove a body from the engine and the broadphase. Returns `false` if
    /// it was not registered.
    pub fn unregister_body(&mut self, handle: BodyHandle) -> bool {
        let Some(index) = self.bodies.iter().position(|h| *h == handle) else {
            return false;
        };
        self.bodies.remove(index);
        self.collision.unregister(handle);
        tracing::debug!("Unregistered body {:?}", handle);
        true
    }

    /// Whether the body is registered with this engine.
    pub fn is_registered(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(&handle)
    }

    /// Registered bodies in registration order.
    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    /// Number of registered bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of registered bodies that are enabled and awake.
    pub fn active_body_count(&self, bodies: &BodySet) -> usize {
        self.bodies
            .iter()
            .filter_map(|h| bodies.get(*h))
            .filter(|body| body.is_active())
            .count()
    }

    /// Step the simulation forward by `delta_time` seconds of frame time.
    ///
    /// Scaled frame time accumulates and is drained in whole fixed steps, at
    /// most `max_steps_per_call` per call. Hitting the cap drops whatever is
    /// left in the accumulator. Returns the number of fixed steps run.
    ///
    /// A failing behavior hook aborts the current fixed step and is returned
    /// as [`PhysicsError::Hook`]; that step's time is still consumed.
    pub fn step(&mut self, bodies: &mut BodySet, delta_time: f64) -> Result<u32> {
        self.accumulator += (delta_time * self.config.time_scale).max(0.0);

        let step = self.config.physics_step;
        let max_steps = self.config.max_steps_per_call;
        let mut steps = 0u32;
        while self.accumulator >= step && steps < max_steps {
            self.accumulator -= step;
            steps += 1;
            self.fixed_step(bodies, step as f32)?;
            self.step_count += 1;
        }

        // Clamp accumulator to avoid spiral of death
        if steps >= max_steps {
            if self.accumulator >= step {
                tracing::warn!(
                    "Physics fell behind: dropping {:.4}s after {} steps",
                    self.accumulator,
                    steps
                );
            }
            self.accumulator = 0.0;
        }
        Ok(steps)
    }

    fn fixed_step(&mut self, bodies: &mut BodySet, dt: f32) -> Result<()> {
        // 1. Apply forces
        rigid_body::apply_environment_forces(
            bodies,
            &self.bodies,
            &self.environment,
            self.config.drag_area_scale,
            dt,
        );

        // 2. Integrate
        rigid_body::integrate(bodies, &self.bodies, &self.environment, dt);

        // 3. Broadphase
        self.collision.update_spatial_grid(bodies);

        // 4. Detection and lifecycle hooks
        let contacts = self.collision.detect_collisions(bodies)?.len();

        // 5. Response
        self.collision.resolve_collisions(bodies);

        // 6. Per-body update hooks
        for &handle in &self.bodies {
            let active = bodies.get(handle).is_some_and(|body| body.is_active());
            if active {
                behavior::dispatch_update(bodies, handle, dt)?;
            }
        }

        // 7. Sleep states
        rigid_body::update_sleep_states(
            bodies,
            &self.bodies,
            self.environment.sleep_threshold(),
            self.config.auto_sleep_after,
            dt,
        );

        self.total_time += dt as f64;
        tracing::trace!(
            "Fixed step {} done: {} contacts",
            self.step_count + 1,
            contacts
        );
        Ok(())
    }

    /// Zero the accumulator, time and step count and clear forces on every
    /// registered body. Registrations are kept.
    pub fn reset(&mut self, bodies: &mut BodySet) {
        self.accumulator = 0.0;
        self.total_time = 0.0;
        self.step_count = 0;
        for &handle in &self.bodies {
            if let Some(body) = bodies.get_mut(handle) {
                body.rigid_body.clear_forces();
            }
        }
    }

    /// Unregister everything and reset counters.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.collision.clear();
        self.accumulator = 0.0;
        self.total_time = 0.0;
        self.step_count = 0;
    }

    /// Snapshot of engine timing and body counts.
    pub fn stats(&self, bodies: &BodySet) -> EngineStats {
        EngineStats {
            total_time: self.total_time,
            step_count: self.step_count,
            body_count: self.bodies.len(),
            active_bodies: self.active_body_count(bodies),
            physics_step: self.config.physics_step,
            time_scale: self.config.time_scale,
            accumulator: self.accumulator,
        }
    }

    /// Simulated time in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Fixed steps run since creation or the last reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Unsimulated frame time carried to the next call.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Gravity acceleration.
    pub fn gravity(&self) -> Vec2 {
        self.environment.gravity()
    }

    /// Set gravity acceleration. Takes effect from the next fixed step.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.environment.set_gravity(gravity);
    }

    /// Frame time multiplier.
    pub fn time_scale(&self) -> f64 {
        self.config.time_scale
    }

    /// Set the frame time multiplier. 0 pauses, below 1 slows down.
    pub fn set_time_scale(&mut self, scale: f64) -> Result<()> {
        validate_time_scale(scale)?;
        self.config.time_scale = scale;
        Ok(())
    }

    /// Fixed step length in seconds.
    pub fn physics_step(&self) -> f64 {
        self.config.physics_step
    }

    /// Set the fixed step length. Must be > 0.
    pub fn set_physics_step(&mut self, step: f64) -> Result<()> {
        validate_physics_step(step)?;
        self.config.physics_step = step;
        Ok(())
    }

    /// Contacts found during the most recent fixed step.
    pub fn last_contacts(&self) -> &[CollisionInfo] {
        self.collision.contacts()
    }

    /// Registered bodies whose bounds contain `point`. Linear scan.
    pub fn query_bodies_at_point(&self, bodies: &BodySet, point: Vec2) -> Vec<BodyHandle> {
        self.bodies
            .iter()
            .copied()
            .filter(|h| {
                bodies
                    .get(*h)
                    .is_some_and(|body| body.bounds().contains_point(point))
            })
            .collect()
    }

    /// Registered bodies whose bounds overlap `min..max`. Linear scan.
    pub fn query_bodies_in_area(&self, bodies: &BodySet, min: Vec2, max: Vec2) -> Vec<BodyHandle> {
        let area = collider::Aabb::new(min, max);
        self.bodies
            .iter()
            .copied()
            .filter(|h| bodies.get(*h).is_some_and(|body| body.bounds().overlaps(&area)))
            .collect()
    }
}
