//! Axis-aligned colliders, collision layers and masks.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::error::PhysicsError;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box spanning `position..position + size`.
    pub fn from_rect(position: Vec2, size: Vec2) -> Self {
        Self {
            min: position,
            max: position + size,
        }
    }

    /// Test whether two AABBs overlap. Touching edges count as overlapping.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Closed-interval point containment.
    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Geometric shape tag. Only rectangles are tested geometrically; other
/// shapes collide through their bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColliderType {
    #[default]
    Rectangle,
    Circle,
    Polygon,
    None,
}

impl ColliderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Polygon => "polygon",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ColliderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColliderType {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangle" => Ok(Self::Rectangle),
            "circle" => Ok(Self::Circle),
            "polygon" => Ok(Self::Polygon),
            "none" => Ok(Self::None),
            _ => Err(PhysicsError::UnknownName {
                kind: "collider type",
                value: s.to_string(),
                expected: "rectangle, circle, polygon, none",
            }),
        }
    }
}

/// Collision layer a body lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CollisionLayer {
    #[default]
    Default,
    Player,
    Enemy,
    Projectile,
    Terrain,
    Trigger,
    Transparent,
    Sensor,
}

impl CollisionLayer {
    pub const ALL: [CollisionLayer; 8] = [
        Self::Default,
        Self::Player,
        Self::Enemy,
        Self::Projectile,
        Self::Terrain,
        Self::Trigger,
        Self::Transparent,
        Self::Sensor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Projectile => "projectile",
            Self::Terrain => "terrain",
            Self::Trigger => "trigger",
            Self::Transparent => "transparent",
            Self::Sensor => "sensor",
        }
    }

    #[inline]
    fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for CollisionLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollisionLayer {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|layer| layer.as_str() == lower)
            .ok_or_else(|| PhysicsError::UnknownName {
                kind: "collision layer",
                value: s.to_string(),
                expected: "default, player, enemy, projectile, terrain, trigger, transparent, sensor",
            })
    }
}

/// Set of layers a collider interacts with. An empty mask collides with
/// every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(u16);

impl LayerMask {
    pub const EMPTY: LayerMask = LayerMask(0);

    pub fn from_layers(layers: &[CollisionLayer]) -> Self {
        layers.iter().copied().collect()
    }

    #[inline]
    pub fn contains(&self, layer: CollisionLayer) -> bool {
        self.0 & layer.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, layer: CollisionLayer) {
        self.0 |= layer.bit();
    }

    pub fn remove(&mut self, layer: CollisionLayer) {
        self.0 &= !layer.bit();
    }

    /// Empty masks accept everything.
    #[inline]
    pub fn accepts(&self, layer: CollisionLayer) -> bool {
        self.is_empty() || self.contains(layer)
    }

    pub fn layers(&self) -> impl Iterator<Item = CollisionLayer> + '_ {
        CollisionLayer::ALL
            .into_iter()
            .filter(move |layer| self.contains(*layer))
    }
}

impl FromIterator<CollisionLayer> for LayerMask {
    fn from_iter<I: IntoIterator<Item = CollisionLayer>>(iter: I) -> Self {
        let mut mask = LayerMask::EMPTY;
        for layer in iter {
            mask.insert(layer);
        }
        mask
    }
}

/// Rectangular collision volume. Holds the spatial state of its owning body.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    /// Lower-left corner in world units.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
    pub collider_type: ColliderType,
    pub layer: CollisionLayer,
    pub mask: LayerMask,
    /// Triggers report contacts but never receive an impulse response.
    pub is_trigger: bool,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::splat(10.0),
            collider_type: ColliderType::Rectangle,
            layer: CollisionLayer::Default,
            mask: LayerMask::EMPTY,
            is_trigger: false,
        }
    }
}

impl Collider {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            ..Default::default()
        }
    }

    /// Bounds as `(x, y, x + width, y + height)`.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(self.position, self.size)
    }

    pub fn check_collision(&self, other: &Collider) -> bool {
        self.bounds().overlaps(&other.bounds())
    }

    /// Each side's mask must accept the other's layer.
    pub fn should_collide(&self, other: &Collider) -> bool {
        self.mask.accepts(other.layer) && other.mask.accepts(self.layer)
    }
}
