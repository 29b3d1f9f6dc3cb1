//! Contact data structures for collision response.

use glam::Vec2;

use super::body::BodyHandle;

/// Geometry of a single overlap between two AABBs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// Unit axis normal pointing from shape A to shape B.
    pub normal: Vec2,
    /// Overlap along the normal axis.
    pub penetration: f32,
    /// Center of the overlap region.
    pub point: Vec2,
}

/// A detected overlap between two registered bodies.
///
/// Created fresh every detection pass. `body_a` always orders before `body_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub contact: ContactInfo,
}

impl CollisionInfo {
    pub fn normal(&self) -> Vec2 {
        self.contact.normal
    }

    pub fn penetration(&self) -> f32 {
        self.contact.penetration
    }

    pub fn point(&self) -> Vec2 {
        self.contact.point
    }

    /// Whether `handle` is one of the two bodies.
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.body_a == handle || self.body_b == handle
    }
}
