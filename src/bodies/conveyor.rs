//! Conveyor belts that carry dynamic bodies resting on them.
//!
//! A solid belt (platformer) overrides the velocity component along its axis
//! of travel for bodies standing on its top edge. A trigger belt (top-down)
//! carries every overlapping dynamic body and only ever speeds it up to the
//! belt speed.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::error::{PhysicsError, Result};
use crate::physics::behavior::{BodyBehavior, Peer};
use crate::physics::body::{BodyHandle, BodyType, PhysicsBody};
use crate::physics::collider::{CollisionLayer, LayerMask};
use crate::physics::material::Material;

/// Default belt speed in world units per second.
pub const DEFAULT_BELT_SPEED: f32 = 50.0;

/// Direction of belt travel. The world is y-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConveyorDirection {
    North,
    South,
    #[default]
    East,
    West,
}

impl ConveyorDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }

    /// Unit vector of travel.
    pub fn unit(&self) -> Vec2 {
        match self {
            Self::North => Vec2::Y,
            Self::South => Vec2::NEG_Y,
            Self::East => Vec2::X,
            Self::West => Vec2::NEG_X,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::East | Self::West)
    }
}

impl fmt::Display for ConveyorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConveyorDirection {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "north" => Ok(Self::North),
            "south" => Ok(Self::South),
            "east" => Ok(Self::East),
            "west" => Ok(Self::West),
            _ => Err(PhysicsError::UnknownName {
                kind: "conveyor direction",
                value: s.to_string(),
                expected: "north, south, east, west",
            }),
        }
    }
}

/// Conveyor belt behavior.
#[derive(Debug, Clone)]
pub struct Conveyor {
    pub direction: ConveyorDirection,
    belt_speed: f32,
    active: bool,
    on_belt: BTreeSet<BodyHandle>,
}

impl Default for Conveyor {
    fn default() -> Self {
        Self::new(ConveyorDirection::East, DEFAULT_BELT_SPEED)
    }
}

impl Conveyor {
    /// Negative speeds are stored as their magnitude.
    pub fn new(direction: ConveyorDirection, belt_speed: f32) -> Self {
        Self {
            direction,
            belt_speed: belt_speed.abs(),
            active: true,
            on_belt: BTreeSet::new(),
        }
    }

    pub fn belt_speed(&self) -> f32 {
        self.belt_speed
    }

    pub fn set_belt_speed(&mut self, speed: f32) {
        self.belt_speed = speed.abs();
    }

    pub fn set_direction(&mut self, direction: ConveyorDirection) {
        self.direction = direction;
    }

    /// Velocity imparted by the belt; zero while stopped.
    pub fn belt_velocity(&self) -> Vec2 {
        if self.active {
            self.direction.unit() * self.belt_speed
        } else {
            Vec2::ZERO
        }
    }

    /// Set direction and speed from a velocity vector.
    ///
    /// The x component takes priority. A zero vector only zeroes the speed.
    pub fn set_belt_velocity(&mut self, velocity: Vec2) {
        if velocity.x > 0.0 {
            self.direction = ConveyorDirection::East;
            self.belt_speed = velocity.x;
        } else if velocity.x < 0.0 {
            self.direction = ConveyorDirection::West;
            self.belt_speed = -velocity.x;
        } else if velocity.y > 0.0 {
            self.direction = ConveyorDirection::North;
            self.belt_speed = velocity.y;
        } else if velocity.y < 0.0 {
            self.direction = ConveyorDirection::South;
            self.belt_speed = -velocity.y;
        } else {
            self.belt_speed = 0.0;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    /// Bodies currently carried by the belt.
    pub fn bodies_on_belt(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.on_belt.iter().copied()
    }

    pub fn is_carrying(&self, handle: BodyHandle) -> bool {
        self.on_belt.contains(&handle)
    }

    fn carry(&self, belt_is_trigger: bool, velocity: Vec2) -> Vec2 {
        let belt = self.belt_velocity();
        if belt_is_trigger {
            let unit = self.direction.unit();
            let along = velocity.dot(unit);
            if along >= self.belt_speed {
                velocity
            } else {
                velocity + unit * (self.belt_speed - along)
            }
        } else if self.direction.is_horizontal() {
            Vec2::new(belt.x, velocity.y)
        } else {
            Vec2::new(velocity.x, belt.y)
        }
    }
}

impl BodyBehavior for Conveyor {
    fn on_collision_enter(&mut self, body: &mut PhysicsBody, other: Peer<'_>) -> anyhow::Result<()> {
        if body.collider.is_trigger || other.body.is_on_top_of(body) {
            self.on_belt.insert(other.handle);
        }
        Ok(())
    }

    fn on_collision_stay(&mut self, body: &mut PhysicsBody, other: Peer<'_>) -> anyhow::Result<()> {
        if !self.active || other.body.body_type() != BodyType::Dynamic {
            return Ok(());
        }

        let trigger = body.collider.is_trigger;
        if !trigger && !other.body.is_on_top_of(body) {
            // Side contact
            self.on_belt.remove(&other.handle);
            return Ok(());
        }

        self.on_belt.insert(other.handle);
        let velocity = self.carry(trigger, other.body.velocity());
        other.body.set_velocity(velocity);
        Ok(())
    }

    fn on_collision_exit(
        &mut self,
        _body: &mut PhysicsBody,
        other: BodyHandle,
        _other_body: Option<&mut PhysicsBody>,
    ) -> anyhow::Result<()> {
        self.on_belt.remove(&other);
        Ok(())
    }
}

/// Build a static conveyor body at `position` (bottom-left corner).
///
/// Trigger conveyors suit top-down scenes; solid ones act as platforms.
pub fn conveyor_body(
    position: Vec2,
    size: Vec2,
    direction: ConveyorDirection,
    belt_speed: f32,
    is_trigger: bool,
) -> Result<PhysicsBody> {
    let mut body = PhysicsBody::new_static()
        .with_name("Conveyor")
        .with_position(position.x, position.y)
        .with_material(Material::preset(1.0, 0.1, 0.9, 0.05))
        .with_layer(CollisionLayer::Terrain)
        .with_mask(LayerMask::from_layers(&[
            CollisionLayer::Default,
            CollisionLayer::Player,
            CollisionLayer::Enemy,
        ]))
        .with_trigger(is_trigger)
        .with_tags(["conveyor", "platform"])
        .with_behavior(Conveyor::new(direction, belt_speed));
    body.set_size(size.x, size.y)?;
    Ok(body)
}
