//! Floor surfaces.
//!
//! Trigger floors suit top-down scenes: every dynamic body inside them is
//! slowed each step according to the surface friction and drag. Solid floors
//! are plain platforms that bodies stand on.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::error::{PhysicsError, Result};
use crate::physics::behavior::{BodyBehavior, Peer};
use crate::physics::body::{BodyType, PhysicsBody};
use crate::physics::collider::{CollisionLayer, LayerMask};
use crate::physics::material::Material;

/// Speeds below this are left alone.
const REST_SPEED: f32 = 0.01;
/// Velocity components below this snap to zero after damping.
const SNAP_SPEED: f32 = 1.0;
/// Per-step retention lost per unit of surface friction.
const FRICTION_DAMPING: f32 = 0.15;
/// Per-step retention lost per unit of surface drag.
const DRAG_DAMPING: f32 = 0.01;

/// Floor surface preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloorSurface {
    #[default]
    Concrete,
    Wood,
    Ice,
    Mud,
    Carpet,
    Metal,
}

impl FloorSurface {
    pub const ALL: [FloorSurface; 6] = [
        Self::Concrete,
        Self::Wood,
        Self::Ice,
        Self::Mud,
        Self::Carpet,
        Self::Metal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concrete => "concrete",
            Self::Wood => "wood",
            Self::Ice => "ice",
            Self::Mud => "mud",
            Self::Carpet => "carpet",
            Self::Metal => "metal",
        }
    }

    /// Friction, drag and restitution of the surface.
    pub fn properties(&self) -> (f32, f32, f32) {
        match self {
            Self::Concrete => (0.8, 3.0, 0.1),
            Self::Wood => (0.6, 2.0, 0.2),
            Self::Ice => (0.1, 0.5, 0.05),
            Self::Mud => (0.9, 5.0, 0.0),
            Self::Carpet => (0.7, 2.5, 0.1),
            Self::Metal => (0.4, 1.5, 0.3),
        }
    }

    pub fn material(&self) -> Material {
        let (friction, drag, restitution) = self.properties();
        Material::preset(1.0, restitution, friction, drag)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Concrete => "Rough concrete - high friction, objects stop quickly",
            Self::Wood => "Wooden floor - moderate friction",
            Self::Ice => "Slippery ice - very low friction, slides far",
            Self::Mud => "Thick mud - very high friction, objects stop immediately",
            Self::Carpet => "Carpet - good friction, dampens movement",
            Self::Metal => "Smooth metal - low friction, some bounce",
        }
    }
}

impl fmt::Display for FloorSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FloorSurface {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|surface| surface.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PhysicsError::UnknownName {
                kind: "floor surface",
                value: s.to_string(),
                expected: "concrete, wood, ice, mud, carpet, metal",
            })
    }
}

/// Floor behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct Floor {
    surface: FloorSurface,
}

impl Floor {
    pub fn new(surface: FloorSurface) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> FloorSurface {
        self.surface
    }

    /// Switch surface and rewrite the floor body's material to match.
    pub fn set_surface(&mut self, body: &mut PhysicsBody, surface: FloorSurface) {
        self.surface = surface;
        body.material = surface.material();
    }

    pub fn set_surface_by_name(&mut self, body: &mut PhysicsBody, name: &str) -> Result<()> {
        let surface = name.parse::<FloorSurface>()?;
        self.set_surface(body, surface);
        Ok(())
    }

    /// Surface description with the floor's mode.
    pub fn describe(&self, body: &PhysicsBody) -> String {
        let mode = if body.collider.is_trigger {
            "trigger (top-down)"
        } else {
            "solid (platformer)"
        };
        format!("{} [{}]", self.surface.description(), mode)
    }
}

/// Velocity after one step of surface damping.
pub fn damp_velocity(velocity: Vec2, material: &Material) -> Vec2 {
    let retention =
        (1.0 - material.friction() * FRICTION_DAMPING) * (1.0 - material.drag() * DRAG_DAMPING);
    let mut damped = velocity * retention;
    if damped.x.abs() < SNAP_SPEED {
        damped.x = 0.0;
    }
    if damped.y.abs() < SNAP_SPEED {
        damped.y = 0.0;
    }
    damped
}

impl BodyBehavior for Floor {
    fn on_collision_stay(&mut self, body: &mut PhysicsBody, other: Peer<'_>) -> anyhow::Result<()> {
        if !body.collider.is_trigger || other.body.body_type() != BodyType::Dynamic {
            return Ok(());
        }
        let velocity = other.body.velocity();
        if velocity.length() < REST_SPEED {
            return Ok(());
        }
        other.body.set_velocity(damp_velocity(velocity, &body.material));
        Ok(())
    }
}

/// Build a static floor at `position` (bottom-left corner).
pub fn floor_body(
    position: Vec2,
    size: Vec2,
    surface: FloorSurface,
    is_trigger: bool,
) -> Result<PhysicsBody> {
    let mut body = PhysicsBody::new_static()
        .with_name("Floor")
        .with_position(position.x, position.y)
        .with_material(surface.material())
        .with_layer(CollisionLayer::Terrain)
        .with_mask(LayerMask::from_layers(&[
            CollisionLayer::Default,
            CollisionLayer::Player,
            CollisionLayer::Enemy,
        ]))
        .with_trigger(is_trigger)
        .with_tags(["floor", "terrain", "static"])
        .with_behavior(Floor::new(surface));
    body.set_size(size.x, size.y)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodySet;
    use crate::physics::PhysicsEngine;

    fn stay(floor_body: &mut PhysicsBody, other: &mut PhysicsBody) {
        let mut bodies = BodySet::new();
        let handle = bodies.insert(PhysicsBody::default());
        let mut floor = Floor::default();
        floor
            .on_collision_stay(floor_body, Peer { handle, body: other })
            .unwrap();
    }

    fn mover(velocity: Vec2) -> PhysicsBody {
        PhysicsBody::new_dynamic(1.0).unwrap().with_velocity(velocity)
    }

    #[test]
    fn test_surface_presets() {
        let ice = FloorSurface::Ice.material();
        assert_eq!(ice.friction(), 0.1);
        assert_eq!(ice.drag(), 0.5);
        assert_eq!(ice.restitution(), 0.05);
        assert_eq!("Mud".parse::<FloorSurface>().unwrap(), FloorSurface::Mud);
        assert!(matches!(
            "lava".parse::<FloorSurface>(),
            Err(PhysicsError::UnknownName { .. })
        ));
    }

    #[test]
    fn test_trigger_floor_damps_velocity() {
        let mut floor = floor_body(Vec2::ZERO, Vec2::splat(100.0), FloorSurface::Concrete, true).unwrap();
        let mut body = mover(Vec2::new(100.0, -50.0));
        stay(&mut floor, &mut body);

        // (1 - 0.8 * 0.15) * (1 - 3.0 * 0.01) = 0.88 * 0.97
        let retention = 0.88 * 0.97;
        assert!((body.velocity().x - 100.0 * retention).abs() < 1e-3);
        assert!((body.velocity().y + 50.0 * retention).abs() < 1e-3);
    }

    #[test]
    fn test_slow_components_snap_to_zero() {
        let mut floor = floor_body(Vec2::ZERO, Vec2::splat(100.0), FloorSurface::Ice, true).unwrap();
        let mut body = mover(Vec2::new(20.0, 0.9));
        stay(&mut floor, &mut body);
        assert_eq!(body.velocity().y, 0.0);
        assert!(body.velocity().x > 19.0);

        let damped = damp_velocity(Vec2::new(0.5, -0.5), &FloorSurface::Ice.material());
        assert_eq!(damped, Vec2::ZERO);
    }

    #[test]
    fn test_solid_floor_and_non_dynamic_untouched() {
        let mut solid = floor_body(Vec2::ZERO, Vec2::new(100.0, 10.0), FloorSurface::Mud, false).unwrap();
        let mut body = mover(Vec2::new(30.0, 0.0));
        stay(&mut solid, &mut body);
        assert_eq!(body.velocity(), Vec2::new(30.0, 0.0));

        let mut trigger = floor_body(Vec2::ZERO, Vec2::splat(100.0), FloorSurface::Mud, true).unwrap();
        let mut platform = PhysicsBody::new_kinematic().with_velocity(Vec2::new(30.0, 0.0));
        stay(&mut trigger, &mut platform);
        assert_eq!(platform.velocity(), Vec2::new(30.0, 0.0));
    }

    #[test]
    fn test_set_surface_updates_material() {
        let mut body = floor_body(Vec2::ZERO, Vec2::splat(10.0), FloorSurface::Concrete, true).unwrap();
        let mut floor = Floor::default();
        floor.set_surface_by_name(&mut body, "ice").unwrap();
        assert_eq!(floor.surface(), FloorSurface::Ice);
        assert_eq!(body.material.friction(), 0.1);
        assert!(floor.describe(&body).ends_with("[trigger (top-down)]"));

        assert!(floor.set_surface_by_name(&mut body, "sand").is_err());
        assert_eq!(floor.surface(), FloorSurface::Ice);
    }

    #[test]
    fn test_floor_body_configuration() {
        let body = floor_body(Vec2::ZERO, Vec2::splat(1000.0), FloorSurface::Wood, true).unwrap();
        assert_eq!(body.body_type(), BodyType::Static);
        assert_eq!(body.collider.layer, CollisionLayer::Terrain);
        assert!(body.has_tag("floor") && body.has_tag("terrain") && body.has_tag("static"));
        assert_eq!(body.behavior::<Floor>().unwrap().surface(), FloorSurface::Wood);
    }

    #[test]
    fn test_mud_stops_sliding_body() {
        let mut bodies = BodySet::new();
        let mud = bodies.insert(
            floor_body(Vec2::ZERO, Vec2::splat(1000.0), FloorSurface::Mud, true).unwrap(),
        );
        let puck = bodies.insert(
            mover(Vec2::new(100.0, 0.0))
                .with_position(100.0, 100.0)
                .with_size(10.0, 10.0),
        );

        let mut engine = PhysicsEngine::new();
        engine.set_gravity(Vec2::ZERO);
        engine.register_body(&bodies, mud).unwrap();
        engine.register_body(&bodies, puck).unwrap();

        for _ in 0..120 {
            engine.step(&mut bodies, 1.0 / 60.0).unwrap();
        }
        assert_eq!(bodies.get(puck).unwrap().velocity(), Vec2::ZERO);
        assert!(bodies.get(puck).unwrap().position().x < 120.0);
    }
}
