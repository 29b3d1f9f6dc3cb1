//! Dynamic boxes with material presets.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::error::{PhysicsError, Result};
use crate::physics::body::PhysicsBody;
use crate::physics::collider::{CollisionLayer, LayerMask};
use crate::physics::material::Material;

/// Crate construction material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrateKind {
    #[default]
    Wooden,
    Metal,
    Cardboard,
    Plastic,
}

impl CrateKind {
    pub const ALL: [CrateKind; 4] = [Self::Wooden, Self::Metal, Self::Cardboard, Self::Plastic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wooden => "wooden",
            Self::Metal => "metal",
            Self::Cardboard => "cardboard",
            Self::Plastic => "plastic",
        }
    }

    /// Density, restitution, friction and drag of the kind.
    pub fn material(&self) -> Material {
        match self {
            Self::Wooden => Material::preset(0.6, 0.3, 0.6, 0.1),
            Self::Metal => Material::preset(7.8, 0.2, 0.4, 0.05),
            Self::Cardboard => Material::preset(0.2, 0.1, 0.7, 0.15),
            Self::Plastic => Material::preset(0.9, 0.5, 0.3, 0.08),
        }
    }
}

impl fmt::Display for CrateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrateKind {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PhysicsError::UnknownName {
                kind: "crate kind",
                value: s.to_string(),
                expected: "wooden, metal, cardboard, plastic",
            })
    }
}

/// Moment of inertia of a solid box about its center.
pub fn box_inertia(mass: f32, size: Vec2) -> f32 {
    mass * (size.x * size.x + size.y * size.y) / 12.0
}

/// Build a dynamic crate at `position` (bottom-left corner).
pub fn crate_body(kind: CrateKind, position: Vec2, size: Vec2, mass: f32) -> Result<PhysicsBody> {
    let mut body = PhysicsBody::new_dynamic(mass)?
        .with_name("Crate")
        .with_position(position.x, position.y)
        .with_material(kind.material())
        .with_mask(LayerMask::from_layers(&[
            CollisionLayer::Default,
            CollisionLayer::Terrain,
            CollisionLayer::Player,
            CollisionLayer::Enemy,
            CollisionLayer::Sensor,
        ]))
        .with_tags(["crate", kind.as_str()]);
    body.set_size(size.x, size.y)?;
    body.rigid_body.moment_of_inertia = box_inertia(mass, size);
    Ok(body)
}

pub fn wooden_crate(position: Vec2, size: Vec2) -> Result<PhysicsBody> {
    crate_body(CrateKind::Wooden, position, size, 10.0)
}

pub fn metal_crate(position: Vec2, size: Vec2) -> Result<PhysicsBody> {
    crate_body(CrateKind::Metal, position, size, 50.0)
}

pub fn cardboard_box(position: Vec2, size: Vec2) -> Result<PhysicsBody> {
    crate_body(CrateKind::Cardboard, position, size, 2.0)
}
