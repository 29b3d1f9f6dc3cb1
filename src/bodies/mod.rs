//! Ready-made bodies built on the physics core.
//!
//! Each module pairs a [`BodyBehavior`](crate::physics::behavior::BodyBehavior)
//! with a constructor returning a fully configured
//! [`PhysicsBody`](crate::physics::body::PhysicsBody).

pub mod conveyor;
pub mod crate_body;
pub mod factory;
pub mod floor;
pub mod sensor;

pub use conveyor::{conveyor_body, Conveyor, ConveyorDirection};
pub use crate_body::{crate_body, CrateKind};
pub use factory::{BodyTemplate, TemplateRegistry};
pub use floor::{floor_body, Floor, FloorSurface};
pub use sensor::{sensor_body, ProximitySensor, SensorEvent};
