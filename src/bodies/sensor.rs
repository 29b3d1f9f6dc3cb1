//! Proximity sensors: static triggers that report what enters and leaves.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec2;

use crate::error::Result;
use crate::physics::behavior::{BodyBehavior, Peer};
use crate::physics::body::{BodyHandle, PhysicsBody};
use crate::physics::collider::{CollisionLayer, LayerMask};
use crate::physics::material::Material;

/// Event reported to sensor listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEvent {
    /// First body detected.
    Activated,
    /// Last body left.
    Deactivated,
    ObjectEntered(BodyHandle),
    ObjectExited(BodyHandle),
}

type Listener = Box<dyn FnMut(&SensorEvent) + Send>;

/// Sensor behavior tracking the bodies overlapping it.
#[derive(Default)]
pub struct ProximitySensor {
    detected: BTreeSet<BodyHandle>,
    active: bool,
    listeners: Vec<Listener>,
}

impl fmt::Debug for ProximitySensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProximitySensor")
            .field("detected", &self.detected)
            .field("active", &self.active)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ProximitySensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called for every event, in registration order.
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: FnMut(&SensorEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&SensorEvent) + Send + 'static,
    {
        self.on_event(listener);
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_detecting(&self, handle: BodyHandle) -> bool {
        self.detected.contains(&handle)
    }

    pub fn detected(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.detected.iter().copied()
    }

    pub fn detected_count(&self) -> usize {
        self.detected.len()
    }

    /// Forget every detected body. An active sensor reports `Deactivated`.
    pub fn clear_detected(&mut self) {
        self.detected.clear();
        if self.active {
            self.active = false;
            self.emit(SensorEvent::Deactivated);
        }
    }

    fn emit(&mut self, event: SensorEvent) {
        tracing::trace!("Sensor event: {:?}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl BodyBehavior for ProximitySensor {
    fn on_collision_enter(&mut self, _body: &mut PhysicsBody, other: Peer<'_>) -> anyhow::Result<()> {
        if !self.detected.insert(other.handle) {
            return Ok(());
        }
        self.emit(SensorEvent::ObjectEntered(other.handle));
        if !self.active {
            self.active = true;
            self.emit(SensorEvent::Activated);
        }
        Ok(())
    }

    fn on_collision_exit(
        &mut self,
        _body: &mut PhysicsBody,
        other: BodyHandle,
        _other_body: Option<&mut PhysicsBody>,
    ) -> anyhow::Result<()> {
        if !self.detected.remove(&other) {
            return Ok(());
        }
        self.emit(SensorEvent::ObjectExited(other));
        if self.active && self.detected.is_empty() {
            self.active = false;
            self.emit(SensorEvent::Deactivated);
        }
        Ok(())
    }
}

/// Build a static trigger sensor at `position` (bottom-left corner).
pub fn sensor_body(position: Vec2, size: Vec2, sensor: ProximitySensor) -> Result<PhysicsBody> {
    let mut body = PhysicsBody::new_static()
        .with_name("ProximitySensor")
        .with_position(position.x, position.y)
        .with_material(Material::preset(0.0, 0.0, 0.0, 0.0))
        .with_layer(CollisionLayer::Sensor)
        .with_mask(LayerMask::from_layers(&[
            CollisionLayer::Default,
            CollisionLayer::Player,
            CollisionLayer::Enemy,
        ]))
        .with_trigger(true)
        .with_tags(["sensor", "proximity"])
        .with_behavior(sensor);
    body.set_size(size.x, size.y)?;
    Ok(body)
}

pub fn small_sensor(position: Vec2, sensor: ProximitySensor) -> Result<PhysicsBody> {
    sensor_body(position, Vec2::splat(5.0), sensor)
}

/// Wide, flat sensor for marking progress along a path.
pub fn checkpoint_sensor(position: Vec2, sensor: ProximitySensor) -> Result<PhysicsBody> {
    let mut body = sensor_body(position, Vec2::new(20.0, 5.0), sensor)?;
    body.add_tag("checkpoint");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodySet;
    use crate::physics::PhysicsEngine;
    use std::sync::{Arc, Mutex};

    fn recording_sensor() -> (ProximitySensor, Arc<Mutex<Vec<SensorEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sensor = ProximitySensor::new().with_listener(move |event| {
            sink.lock().unwrap().push(*event);
        });
        (sensor, events)
    }

    fn enter(sensor: &mut ProximitySensor, handle: BodyHandle) {
        let mut body = PhysicsBody::default();
        let mut other = PhysicsBody::default();
        sensor
            .on_collision_enter(&mut body, Peer { handle, body: &mut other })
            .unwrap();
    }

    fn exit(sensor: &mut ProximitySensor, handle: BodyHandle) {
        let mut body = PhysicsBody::default();
        sensor.on_collision_exit(&mut body, handle, None).unwrap();
    }

    fn handles(n: usize) -> Vec<BodyHandle> {
        let mut bodies = BodySet::new();
        (0..n).map(|_| bodies.insert(PhysicsBody::default())).collect()
    }

    #[test]
    fn test_event_sequence() {
        let (mut sensor, events) = recording_sensor();
        let h = handles(2);

        enter(&mut sensor, h[0]);
        enter(&mut sensor, h[1]);
        exit(&mut sensor, h[0]);
        assert!(sensor.is_active());
        exit(&mut sensor, h[1]);
        assert!(!sensor.is_active());

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                SensorEvent::ObjectEntered(h[0]),
                SensorEvent::Activated,
                SensorEvent::ObjectEntered(h[1]),
                SensorEvent::ObjectExited(h[0]),
                SensorEvent::ObjectExited(h[1]),
                SensorEvent::Deactivated,
            ]
        );
    }

    #[test]
    fn test_duplicate_and_unknown_events_ignored() {
        let (mut sensor, events) = recording_sensor();
        let h = handles(2);

        enter(&mut sensor, h[0]);
        enter(&mut sensor, h[0]);
        exit(&mut sensor, h[1]);
        assert_eq!(sensor.detected_count(), 1);
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_clear_detected_deactivates() {
        let (mut sensor, events) = recording_sensor();
        let h = handles(1);
        enter(&mut sensor, h[0]);
        sensor.clear_detected();

        assert!(!sensor.is_active());
        assert!(!sensor.is_detecting(h[0]));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                SensorEvent::ObjectEntered(h[0]),
                SensorEvent::Activated,
                SensorEvent::Deactivated,
            ]
        );

        // Already inactive: nothing more to report
        sensor.clear_detected();
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_sensor_variants() {
        let body = sensor_body(Vec2::ZERO, Vec2::splat(10.0), ProximitySensor::new()).unwrap();
        assert!(body.collider.is_trigger);
        assert_eq!(body.collider.layer, CollisionLayer::Sensor);
        assert_eq!(body.mass(), 0.0);
        assert!(body.has_tag("proximity"));

        let small = small_sensor(Vec2::ZERO, ProximitySensor::new()).unwrap();
        assert_eq!(small.size(), Vec2::splat(5.0));
        let checkpoint = checkpoint_sensor(Vec2::ZERO, ProximitySensor::new()).unwrap();
        assert_eq!(checkpoint.size(), Vec2::new(20.0, 5.0));
        assert!(checkpoint.has_tag("checkpoint"));
    }

    #[test]
    fn test_engine_detects_passing_body() {
        let (sensor, events) = recording_sensor();
        let mut bodies = BodySet::new();
        let gate = bodies.insert(sensor_body(Vec2::new(50.0, 0.0), Vec2::splat(10.0), sensor).unwrap());
        let runner = bodies.insert(
            PhysicsBody::new_dynamic(1.0)
                .unwrap()
                .with_position(30.0, 0.0)
                .with_size(5.0, 5.0)
                .with_velocity(Vec2::new(180.0, 0.0)),
        );

        let mut engine = PhysicsEngine::new();
        engine.set_gravity(Vec2::ZERO);
        engine.register_body(&bodies, gate).unwrap();
        engine.register_body(&bodies, runner).unwrap();

        // About 3 units per step: inside the gate from roughly step 5 to 10
        for _ in 0..30 {
            engine.step(&mut bodies, 1.0 / 60.0).unwrap();
        }

        let events = events.lock().unwrap();
        assert_eq!(events.first(), Some(&SensorEvent::ObjectEntered(runner)));
        assert_eq!(events.last(), Some(&SensorEvent::Deactivated));
        assert_eq!(events.len(), 4);
        // Triggers never deflect
        assert!(bodies.get(runner).unwrap().velocity().x > 170.0);
    }
}
