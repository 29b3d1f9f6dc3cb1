//! Rein 2D Physics
//!
//! A fixed-timestep 2D rigid body simulation core with AABB collision
//! detection, impulse response and per-body behavior hooks.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **error** - Crate error type
//! 2. **physics** - Bodies, collision detection, environment and the engine loop
//! 3. **bodies** - Ready-made domain bodies (conveyor, crate, sensor, floor)
//!    and the template registry
//!
//! # Example
//!
//! ```
//! use rein2d::{BodySet, PhysicsBody, PhysicsEngine};
//!
//! let mut bodies = BodySet::new();
//! let ball = bodies.insert(PhysicsBody::new_dynamic(1.0)?.with_position(0.0, 100.0));
//!
//! let mut engine = PhysicsEngine::new();
//! engine.register_body(&bodies, ball)?;
//! engine.step(&mut bodies, 1.0 / 60.0)?;
//!
//! assert!(bodies.get(ball).map_or(false, |b| b.velocity().y < 0.0));
//! # Ok::<(), rein2d::PhysicsError>(())
//! ```

pub mod bodies;
pub mod error;
pub mod physics;

pub use error::{PhysicsError, Result};

pub use physics::behavior::{BodyBehavior, Peer};
pub use physics::body::{BodyHandle, BodySet, BodyType, PhysicsBody};
pub use physics::collider::{Aabb, Collider, ColliderType, CollisionLayer, LayerMask};
pub use physics::collision::{CollisionConfig, CollisionService};
pub use physics::contact::{CollisionInfo, ContactInfo};
pub use physics::environment::{EnvironmentConfig, EnvironmentPreset, EnvironmentService};
pub use physics::material::Material;
pub use physics::rigid_body::RigidBody;
pub use physics::{EngineStats, PhysicsConfig, PhysicsEngine};

pub use bodies::factory::{BodyTemplate, TemplateRegistry};

// Re-export glam for convenience
pub use glam;
