//! Physics bodies and the arena that owns them.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use slotmap::{new_key_type, SlotMap};

use crate::error::{PhysicsError, Result};

use super::behavior::BodyBehavior;
use super::collider::{Aabb, Collider, CollisionLayer, LayerMask};
use super::material::Material;
use super::rigid_body::RigidBody;

/// Vertical distance within which one body counts as resting on another.
pub const ON_TOP_TOLERANCE: f32 = 5.0;

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BodyType {
    /// Never moves; infinite mass.
    Static,
    /// Affected by forces and collisions.
    #[default]
    Dynamic,
    /// Moved by its velocity only; ignores forces and mass.
    Kinematic,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
            Self::Kinematic => "kinematic",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "dynamic" => Ok(Self::Dynamic),
            "kinematic" => Ok(Self::Kinematic),
            _ => Err(PhysicsError::UnknownName {
                kind: "body type",
                value: s.to_string(),
                expected: "static, dynamic, kinematic",
            }),
        }
    }
}

/// Rigid body, collider and material with body-level state and an optional
/// behavior hook.
pub struct PhysicsBody {
    pub name: String,
    /// Name of the template this body was created from, if any.
    pub template_name: Option<String>,
    tags: Vec<String>,
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub material: Material,
    body_type: BodyType,
    pub enabled: bool,
    sleeping: bool,
    /// Seconds spent below the sleep threshold.
    pub(crate) sleep_timer: f32,
    /// Rotation about the 2D plane normal, driven by angular velocity.
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    behavior: Option<Box<dyn BodyBehavior>>,
}

impl fmt::Debug for PhysicsBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsBody")
            .field("name", &self.name)
            .field("body_type", &self.body_type)
            .field("position", &self.collider.position)
            .field("size", &self.collider.size)
            .field("velocity", &self.rigid_body.velocity)
            .field("enabled", &self.enabled)
            .field("sleeping", &self.sleeping)
            .field("has_behavior", &self.behavior.is_some())
            .finish()
    }
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            name: "PhysicsBody".to_string(),
            template_name: None,
            tags: Vec::new(),
            rigid_body: RigidBody::default(),
            collider: Collider::default(),
            material: Material::default(),
            body_type: BodyType::Dynamic,
            enabled: true,
            sleeping: false,
            sleep_timer: 0.0,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            behavior: None,
        }
    }
}

impl PhysicsBody {
    /// Create a body of the given type with default mass, size and material.
    pub fn new(body_type: BodyType) -> Self {
        let mut body = Self::default();
        body.set_body_type(body_type);
        body
    }

    /// Create a dynamic body with the given mass.
    pub fn new_dynamic(mass: f32) -> Result<Self> {
        let mut body = Self::new(BodyType::Dynamic);
        body.set_mass(mass)?;
        Ok(body)
    }

    /// Create a massless static body.
    pub fn new_static() -> Self {
        let mut body = Self::new(BodyType::Static);
        body.rigid_body.make_massless();
        body
    }

    pub fn new_kinematic() -> Self {
        Self::new(BodyType::Kinematic)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.collider.position = Vec2::new(x, y);
        self
    }

    /// Negative extents are clamped to zero.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.collider.size = Vec2::new(width.max(0.0), height.max(0.0));
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.rigid_body.velocity = velocity;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.collider.layer = layer;
        self
    }

    pub fn with_mask(mut self, mask: LayerMask) -> Self {
        self.collider.mask = mask;
        self
    }

    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.collider.is_trigger = is_trigger;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.add_tag(tag);
        }
        self
    }

    pub fn with_behavior<B: BodyBehavior>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Static bodies have their inverse mass pinned to zero; other types
    /// restore `1 / mass` when the mass is positive.
    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
        self.rigid_body.set_immovable(body_type == BodyType::Static);
    }

    pub fn set_mass(&mut self, mass: f32) -> Result<()> {
        self.rigid_body.set_mass(mass)
    }

    pub fn mass(&self) -> f32 {
        self.rigid_body.mass()
    }

    /// Zero for static bodies regardless of stored mass.
    pub fn inverse_mass(&self) -> f32 {
        self.rigid_body.inverse_mass()
    }

    pub fn position(&self) -> Vec2 {
        self.collider.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.collider.position = position;
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.collider.position += offset;
    }

    pub fn size(&self) -> Vec2 {
        self.collider.size
    }

    pub fn set_size(&mut self, width: f32, height: f32) -> Result<()> {
        if width.is_nan() || height.is_nan() || width < 0.0 || height < 0.0 {
            return Err(PhysicsError::invalid(
                "size",
                format!("width and height must be >= 0, got {width}x{height}"),
            ));
        }
        self.collider.size = Vec2::new(width, height);
        Ok(())
    }

    pub fn velocity(&self) -> Vec2 {
        self.rigid_body.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.rigid_body.velocity = velocity;
    }

    pub fn bounds(&self) -> Aabb {
        self.collider.bounds()
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Enabled and awake.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.sleeping
    }

    /// Put the body to sleep and zero its velocity.
    pub fn sleep(&mut self) {
        self.sleeping = true;
        self.rigid_body.velocity = Vec2::ZERO;
        self.rigid_body.angular_velocity = 0.0;
    }

    pub fn wake(&mut self) {
        self.sleeping = false;
        self.sleep_timer = 0.0;
    }

    /// Whether this body rests on `other`: the two overlap horizontally and
    /// this body's bottom edge lies within [`ON_TOP_TOLERANCE`] of the other
    /// body's top edge.
    pub fn is_on_top_of(&self, other: &PhysicsBody) -> bool {
        let this = self.bounds();
        let below = other.bounds();
        let horizontal = this.min.x < below.max.x && this.max.x > below.min.x;
        horizontal && (this.min.y - below.max.y).abs() <= ON_TOP_TOLERANCE
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    pub fn set_behavior<B: BodyBehavior>(&mut self, behavior: B) {
        self.behavior = Some(Box::new(behavior));
    }

    /// Downcast the attached behavior.
    pub fn behavior<T: BodyBehavior>(&self) -> Option<&T> {
        self.behavior.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub fn behavior_mut<T: BodyBehavior>(&mut self) -> Option<&mut T> {
        self.behavior.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn take_behavior(&mut self) -> Option<Box<dyn BodyBehavior>> {
        self.behavior.take()
    }

    /// Put a behavior back after dispatch unless the hook installed a new one.
    pub(crate) fn restore_behavior(&mut self, behavior: Box<dyn BodyBehavior>) {
        if self.behavior.is_none() {
            self.behavior = Some(behavior);
        }
    }
}

new_key_type! {
    /// Stable reference to a body in a [`BodySet`].
    ///
    /// Handles carry a version, so a handle to a removed body never aliases a
    /// body inserted later in the same slot.
    pub struct BodyHandle;
}

/// Generational arena owning every body in a simulation.
#[derive(Default)]
pub struct BodySet {
    bodies: SlotMap<BodyHandle, PhysicsBody>,
}

impl BodySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: PhysicsBody) -> BodyHandle {
        self.bodies.insert(body)
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<PhysicsBody> {
        self.bodies.remove(handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&PhysicsBody> {
        self.bodies.get(handle)
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut PhysicsBody> {
        self.bodies.get_mut(handle)
    }

    /// Borrow two distinct bodies mutably at once.
    pub fn pair_mut(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<(&mut PhysicsBody, &mut PhysicsBody)> {
        let [first, second] = self.bodies.get_disjoint_mut([a, b])?;
        Some((first, second))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &PhysicsBody)> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyHandle, &mut PhysicsBody)> {
        self.bodies.iter_mut()
    }
}
