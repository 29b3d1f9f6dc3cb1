//! Rigid body state and the force/integration stages of the pipeline.

use glam::Vec2;

use crate::error::{PhysicsError, Result};

use super::body::{BodyHandle, BodySet, BodyType};
use super::environment::EnvironmentService;

/// Mass properties, velocities and force accumulators of a body.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    mass: f32,
    inverse_mass: f32,
    /// Set for static bodies; pins the inverse mass to zero.
    immovable: bool,
    pub moment_of_inertia: f32,
    pub velocity: Vec2,
    /// Acceleration computed during the last integration.
    pub acceleration: Vec2,
    pub angular_velocity: f32,
    force: Vec2,
    torque: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inverse_mass: 1.0,
            immovable: false,
            moment_of_inertia: 1.0,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
        }
    }
}

impl RigidBody {
    /// Create a rigid body with the given mass. Zero mass means infinite mass.
    pub fn new(mass: f32) -> Result<Self> {
        let mut rb = Self::default();
        rb.set_mass(mass)?;
        Ok(rb)
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// `1 / mass`, or zero for massless and immovable bodies.
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Set the mass and recompute the inverse mass.
    ///
    /// Clears accumulated force and torque so a body gaining mass does not
    /// convert forces gathered while massless into a huge acceleration.
    pub fn set_mass(&mut self, mass: f32) -> Result<()> {
        if mass.is_nan() || mass < 0.0 {
            return Err(PhysicsError::invalid(
                "mass",
                format!("must be >= 0, got {mass}"),
            ));
        }
        self.mass = mass;
        self.sync_inverse_mass();
        self.clear_forces();
        Ok(())
    }

    /// Drop all mass. Infallible counterpart of `set_mass(0.0)`.
    pub(crate) fn make_massless(&mut self) {
        self.mass = 0.0;
        self.sync_inverse_mass();
        self.clear_forces();
    }

    pub(crate) fn set_immovable(&mut self, immovable: bool) {
        self.immovable = immovable;
        self.sync_inverse_mass();
    }

    fn sync_inverse_mass(&mut self) {
        self.inverse_mass = if self.immovable || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        };
    }

    pub fn force(&self) -> Vec2 {
        self.force
    }

    pub fn torque(&self) -> f32 {
        self.torque
    }

    /// Accumulate a force, applied at the next integration.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Change velocity immediately by `impulse * inverse_mass`.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.inverse_mass > 0.0 {
            self.velocity += impulse * self.inverse_mass;
        }
    }

    pub fn apply_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Apply gravity and fluid drag to every enabled, awake dynamic body.
///
/// Drag is clamped per axis to `|m * v / dt|` so it can never reverse a
/// body's velocity within one step.
pub fn apply_environment_forces(
    bodies: &mut BodySet,
    handles: &[BodyHandle],
    environment: &EnvironmentService,
    area_scale: f32,
    dt: f32,
) {
    let gravity = environment.gravity();
    for &handle in handles {
        let Some(body) = bodies.get_mut(handle) else {
            continue;
        };
        if !body.is_active() || body.body_type() != BodyType::Dynamic {
            continue;
        }

        let mass = body.rigid_body.mass();
        body.rigid_body.apply_force(gravity * mass);

        let area = body.size().x * body.size().y * area_scale;
        let velocity = body.rigid_body.velocity;
        let mut drag = environment.drag_force(velocity, body.material.drag(), area);
        if body.rigid_body.inverse_mass() > 0.0 && dt > 0.0 {
            drag = Vec2::new(
                clamp_drag_axis(drag.x, velocity.x, mass, dt),
                clamp_drag_axis(drag.y, velocity.y, mass, dt),
            );
        }
        body.rigid_body.apply_force(drag);
    }
}

fn clamp_drag_axis(drag: f32, velocity: f32, mass: f32, dt: f32) -> f32 {
    let max = (mass * velocity / dt).abs();
    if drag.abs() > max {
        if velocity > 0.0 {
            -max
        } else {
            max
        }
    } else {
        drag
    }
}

/// Semi-implicit Euler integration.
///
/// Dynamic bodies integrate force into velocity, then clamp to terminal
/// velocity, decay by `damping^dt` and snap tiny components to zero before
/// moving. Kinematic bodies move by their stored velocity even while asleep.
/// Force accumulators are cleared for every body that passes through here.
pub fn integrate(
    bodies: &mut BodySet,
    handles: &[BodyHandle],
    environment: &EnvironmentService,
    dt: f32,
) {
    let config = environment.config();
    for &handle in handles {
        let Some(body) = bodies.get_mut(handle) else {
            continue;
        };
        if !body.enabled {
            continue;
        }

        match body.body_type() {
            BodyType::Static => continue,
            BodyType::Kinematic => {
                body.rigid_body.clear_forces();
            }
            BodyType::Dynamic => {
                if body.is_sleeping() {
                    continue;
                }
                let rb = &mut body.rigid_body;
                let inv_mass = rb.inverse_mass();
                if inv_mass > 0.0 {
                    rb.acceleration = rb.force * inv_mass;
                    let mut velocity = rb.velocity + rb.acceleration * dt;
                    velocity = velocity.clamp_length_max(config.terminal_velocity);
                    velocity *= config.linear_damping.powf(dt);
                    if velocity.x.abs() < config.velocity_threshold {
                        velocity.x = 0.0;
                    }
                    if velocity.y.abs() < config.velocity_threshold {
                        velocity.y = 0.0;
                    }
                    rb.velocity = velocity;
                } else {
                    rb.acceleration = Vec2::ZERO;
                }

                if rb.moment_of_inertia > 0.0 {
                    rb.angular_velocity += rb.torque / rb.moment_of_inertia * dt;
                }
                rb.clear_forces();
            }
        }

        let displacement = body.rigid_body.velocity * dt;
        let spin = body.rigid_body.angular_velocity * dt;
        body.translate(displacement);
        body.roll += spin;
    }
}

/// Wake dynamic bodies moving at or above `threshold`.
///
/// With `auto_sleep_after` set, bodies that stay below the threshold for
/// that many seconds are put to sleep and their velocity is zeroed.
pub fn update_sleep_states(
    bodies: &mut BodySet,
    handles: &[BodyHandle],
    threshold: f32,
    auto_sleep_after: Option<f32>,
    dt: f32,
) {
    for &handle in handles {
        let Some(body) = bodies.get_mut(handle) else {
            continue;
        };
        if !body.enabled || body.body_type() != BodyType::Dynamic {
            continue;
        }

        if body.rigid_body.speed() >= threshold {
            body.wake();
        } else if let Some(delay) = auto_sleep_after {
            if !body.is_sleeping() {
                body.sleep_timer += dt;
                if body.sleep_timer >= delay {
                    body.sleep();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::PhysicsBody;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let rb = RigidBody::default();
        assert_eq!(rb.mass(), 1.0);
        assert_eq!(rb.inverse_mass(), 1.0);
        assert_eq!(rb.moment_of_inertia, 1.0);
    }

    #[test]
    fn test_negative_mass_rejected() {
        let mut rb = RigidBody::default();
        assert!(rb.set_mass(-2.0).is_err());
        assert_eq!(rb.mass(), 1.0);
        assert!(RigidBody::new(-0.1).is_err());
    }

    #[test]
    fn test_set_mass_clears_forces() {
        let mut rb = RigidBody::new(0.0).unwrap();
        rb.apply_force(Vec2::new(1000.0, 0.0));
        rb.apply_torque(5.0);
        rb.set_mass(2.0).unwrap();
        assert_eq!(rb.force(), Vec2::ZERO);
        assert_eq!(rb.torque(), 0.0);
    }

    #[test]
    fn test_force_accumulates_without_moving() {
        let mut rb = RigidBody::default();
        rb.apply_force(Vec2::new(1.0, 2.0));
        rb.apply_force(Vec2::new(3.0, -1.0));
        assert_eq!(rb.force(), Vec2::new(4.0, 1.0));
        assert_eq!(rb.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_immovable_pins_inverse_mass() {
        let mut rb = RigidBody::new(4.0).unwrap();
        rb.set_immovable(true);
        assert_eq!(rb.inverse_mass(), 0.0);
        rb.set_mass(8.0).unwrap();
        assert_eq!(rb.inverse_mass(), 0.0);
        rb.set_immovable(false);
        assert_eq!(rb.inverse_mass(), 0.125);
    }

    #[test]
    fn test_drag_clamp_never_reverses() {
        // Drag far larger than the momentum it opposes
        let clamped = clamp_drag_axis(-500.0, 2.0, 1.0, 1.0 / 60.0);
        assert!((clamped + 120.0).abs() < 1e-3, "clamped = {}", clamped);
        assert_eq!(clamp_drag_axis(-1.0, 2.0, 1.0, 1.0 / 60.0), -1.0);
        assert_eq!(clamp_drag_axis(0.0, 0.0, 1.0, 1.0 / 60.0), 0.0);
    }

    #[test]
    fn test_integrate_kinematic_ignores_forces() {
        let mut bodies = BodySet::new();
        let env = EnvironmentService::new();
        let mut body = PhysicsBody::new_kinematic().with_velocity(Vec2::new(6.0, 0.0));
        body.rigid_body.apply_force(Vec2::new(0.0, 1000.0));
        body.sleep();
        body.rigid_body.velocity = Vec2::new(6.0, 0.0);
        let h = bodies.insert(body);

        integrate(&mut bodies, &[h], &env, 0.5);

        let body = bodies.get(h).unwrap();
        assert_eq!(body.position(), Vec2::new(3.0, 0.0));
        assert_eq!(body.rigid_body.velocity, Vec2::new(6.0, 0.0));
        assert_eq!(body.rigid_body.force(), Vec2::ZERO);
    }

    #[test]
    fn test_integrate_integrates_torque_before_clearing() {
        let mut bodies = BodySet::new();
        let env = EnvironmentService::new();
        let mut body = PhysicsBody::new_dynamic(1.0).unwrap();
        body.rigid_body.moment_of_inertia = 2.0;
        body.rigid_body.apply_torque(4.0);
        let h = bodies.insert(body);

        integrate(&mut bodies, &[h], &env, 0.5);

        let body = bodies.get(h).unwrap();
        assert!((body.rigid_body.angular_velocity - 1.0).abs() < 1e-6);
        assert!((body.roll - 0.5).abs() < 1e-6);
        assert_eq!(body.rigid_body.torque(), 0.0);
    }

    #[test]
    fn test_integrate_clamps_to_terminal_velocity() {
        let mut bodies = BodySet::new();
        let mut env = EnvironmentService::new();
        env.set_linear_damping(1.0).unwrap();
        let body = PhysicsBody::new_dynamic(1.0)
            .unwrap()
            .with_velocity(Vec2::new(0.0, -1000.0));
        let h = bodies.insert(body);

        integrate(&mut bodies, &[h], &env, 1.0 / 60.0);

        let speed = bodies.get(h).unwrap().rigid_body.speed();
        assert!((speed - 200.0).abs() < 1e-3, "speed = {}", speed);
    }

    #[test]
    fn test_integrate_snaps_creep_to_zero() {
        let mut bodies = BodySet::new();
        let env = EnvironmentService::new();
        let body = PhysicsBody::new_dynamic(1.0)
            .unwrap()
            .with_velocity(Vec2::new(0.005, 3.0));
        let h = bodies.insert(body);

        integrate(&mut bodies, &[h], &env, 1.0 / 60.0);

        let v = bodies.get(h).unwrap().rigid_body.velocity;
        assert_eq!(v.x, 0.0);
        assert!(v.y > 2.9);
    }

    #[test]
    fn test_integrate_clears_forces_on_massless_dynamic() {
        let mut bodies = BodySet::new();
        let env = EnvironmentService::new();
        let mut body = PhysicsBody::new_dynamic(0.0)
            .unwrap()
            .with_velocity(Vec2::new(3.0, 0.0));
        body.rigid_body.apply_force(Vec2::new(500.0, -20.0));
        body.rigid_body.apply_torque(2.0);
        let h = bodies.insert(body);

        integrate(&mut bodies, &[h], &env, 1.0 / 60.0);

        let body = bodies.get(h).unwrap();
        assert_eq!(body.rigid_body.force(), Vec2::ZERO);
        assert_eq!(body.rigid_body.torque(), 0.0);
        assert_eq!(body.rigid_body.acceleration, Vec2::ZERO);
        assert_eq!(body.velocity(), Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_static_body_untouched() {
        let mut bodies = BodySet::new();
        let env = EnvironmentService::new();
        let mut body = PhysicsBody::new_static().with_velocity(Vec2::new(5.0, 5.0));
        body.rigid_body.apply_force(Vec2::ONE);
        let h = bodies.insert(body);

        apply_environment_forces(&mut bodies, &[h], &env, 0.0001, 1.0 / 60.0);
        integrate(&mut bodies, &[h], &env, 1.0 / 60.0);

        let body = bodies.get(h).unwrap();
        assert_eq!(body.position(), Vec2::ZERO);
        assert_eq!(body.rigid_body.force(), Vec2::ONE);
    }

    #[test]
    fn test_sleep_pass_wakes_moving_bodies() {
        let mut bodies = BodySet::new();
        let mut body = PhysicsBody::new_dynamic(1.0).unwrap();
        body.sleep();
        body.rigid_body.velocity = Vec2::new(0.0, 1.0);
        let h = bodies.insert(body);

        update_sleep_states(&mut bodies, &[h], 0.01, None, 1.0 / 60.0);
        assert!(!bodies.get(h).unwrap().is_sleeping());
    }

    #[test]
    fn test_bodies_never_auto_sleep_by_default() {
        let mut bodies = BodySet::new();
        let h = bodies.insert(PhysicsBody::new_dynamic(1.0).unwrap());

        for _ in 0..600 {
            update_sleep_states(&mut bodies, &[h], 0.01, None, 1.0 / 60.0);
        }
        assert!(!bodies.get(h).unwrap().is_sleeping());
    }

    #[test]
    fn test_auto_sleep_after_delay() {
        let mut bodies = BodySet::new();
        let h = bodies.insert(PhysicsBody::new_dynamic(1.0).unwrap());

        for _ in 0..30 {
            update_sleep_states(&mut bodies, &[h], 0.01, Some(1.0), 1.0 / 60.0);
        }
        assert!(!bodies.get(h).unwrap().is_sleeping());
        for _ in 0..31 {
            update_sleep_states(&mut bodies, &[h], 0.01, Some(1.0), 1.0 / 60.0);
        }
        assert!(bodies.get(h).unwrap().is_sleeping());
    }

    proptest! {
        #[test]
        fn inverse_mass_tracks_mass(mass in prop_oneof![Just(0.0f32), 0.001f32..1.0e4]) {
            let mut rb = RigidBody::default();
            rb.set_mass(mass).unwrap();
            if mass == 0.0 {
                prop_assert_eq!(rb.inverse_mass(), 0.0);
            } else {
                prop_assert!((rb.inverse_mass() * mass - 1.0).abs() < 1e-5);
            }
        }

        #[test]
        fn impulse_scales_by_inverse_mass(
            mass in 0.1f32..100.0,
            jx in -100.0f32..100.0,
            jy in -100.0f32..100.0,
        ) {
            let mut rb = RigidBody::new(mass).unwrap();
            rb.apply_impulse(Vec2::new(jx, jy));
            prop_assert!((rb.velocity.x - jx / mass).abs() < 1e-3);
            prop_assert!((rb.velocity.y - jy / mass).abs() < 1e-3);

            let mut fixed = RigidBody::new(0.0).unwrap();
            fixed.apply_impulse(Vec2::new(jx, jy));
            prop_assert_eq!(fixed.velocity, Vec2::ZERO);
        }
    }
}
