//! Named body templates.
//!
//! A [`TemplateRegistry`] maps template names to builders. Registries are
//! plain values; create one per scene or tool and pass it where needed.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;

use crate::error::{PhysicsError, Result};
use crate::physics::body::PhysicsBody;
use crate::physics::material::Material;

use super::conveyor::{conveyor_body, ConveyorDirection, DEFAULT_BELT_SPEED};
use super::crate_body::{crate_body, CrateKind};
use super::floor::{floor_body, FloorSurface};
use super::sensor::{sensor_body, ProximitySensor};

/// Category used when a template does not name one.
pub const DEFAULT_CATEGORY: &str = "General";

type Builder = Box<dyn Fn() -> Result<PhysicsBody> + Send + Sync>;

/// A named recipe for a configured body.
pub struct BodyTemplate {
    pub name: String,
    pub category: String,
    pub description: String,
    builder: Builder,
}

impl fmt::Debug for BodyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyTemplate")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl BodyTemplate {
    pub fn new<F>(name: impl Into<String>, builder: F) -> Self
    where
        F: Fn() -> Result<PhysicsBody> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            description: String::new(),
            builder: Box::new(builder),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build a fresh body. The body remembers which template it came from.
    pub fn build(&self) -> Result<PhysicsBody> {
        let mut body = (self.builder)()?;
        body.template_name = Some(self.name.clone());
        Ok(body)
    }
}

/// Registry of body templates, ordered by name.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, BodyTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in bodies.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for template in builtin_templates() {
            registry.register(template);
        }
        registry
    }

    /// Add a template, replacing any template of the same name.
    pub fn register(&mut self, template: BodyTemplate) {
        if self.templates.contains_key(&template.name) {
            tracing::warn!("Overwriting body template '{}'", template.name);
        }
        self.templates.insert(template.name.clone(), template);
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.templates.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&BodyTemplate> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn templates(&self) -> impl Iterator<Item = &BodyTemplate> {
        self.templates.values()
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a BodyTemplate> {
        self.templates
            .values()
            .filter(move |template| template.category == category)
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .templates
            .values()
            .map(|template| template.category.as_str())
            .collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    /// Build a body from the named template.
    pub fn create(&self, name: &str) -> Result<PhysicsBody> {
        let template = self
            .get(name)
            .ok_or_else(|| PhysicsError::UnknownTemplate(name.to_string()))?;
        template.build().inspect_err(|err| {
            tracing::error!("Failed to create body from template '{}': {}", name, err);
        })
    }
}

fn floor_template(name: &str, surface: FloorSurface, description: &str) -> BodyTemplate {
    BodyTemplate::new(name, move || {
        floor_body(Vec2::ZERO, Vec2::splat(1000.0), surface, true)
    })
    .with_category("Terrain")
    .with_description(description)
}

fn builtin_templates() -> Vec<BodyTemplate> {
    vec![
        BodyTemplate::new("Base Physics Body", || {
            let mut body = PhysicsBody::new_dynamic(1.0)?.with_material(Material::default());
            body.set_size(10.0, 10.0)?;
            Ok(body)
        })
        .with_category("Basic")
        .with_description("A basic physics body with default properties."),
        BodyTemplate::new("Conveyor Belt", || {
            conveyor_body(
                Vec2::ZERO,
                Vec2::new(200.0, 20.0),
                ConveyorDirection::East,
                DEFAULT_BELT_SPEED,
                false,
            )
        })
        .with_category("Platforms")
        .with_description("A conveyor belt that moves objects placed on top of it."),
        BodyTemplate::new("Top-Down Conveyor Belt", || {
            conveyor_body(
                Vec2::ZERO,
                Vec2::new(200.0, 20.0),
                ConveyorDirection::North,
                DEFAULT_BELT_SPEED,
                true,
            )
        })
        .with_category("Platforms")
        .with_description("A top-down conveyor belt that moves objects in cardinal directions."),
        BodyTemplate::new("Crate", || {
            crate_body(CrateKind::Wooden, Vec2::ZERO, Vec2::splat(20.0), 10.0)
        })
        .with_category("Objects"),
        BodyTemplate::new("Proximity Sensor", || {
            sensor_body(Vec2::ZERO, Vec2::splat(10.0), ProximitySensor::new())
        }),
        floor_template(
            "Concrete Floor",
            FloorSurface::Concrete,
            "Rough concrete floor with high friction - objects stop quickly.",
        ),
        floor_template(
            "Ice Floor",
            FloorSurface::Ice,
            "Slippery ice floor with very low friction - objects slide far.",
        ),
        floor_template(
            "Wood Floor",
            FloorSurface::Wood,
            "Wooden floor with moderate friction.",
        ),
        floor_template(
            "Mud Floor",
            FloorSurface::Mud,
            "Thick mud floor - objects stop almost immediately.",
        ),
        BodyTemplate::new("Solid Platform Floor", || {
            floor_body(Vec2::ZERO, Vec2::new(1000.0, 50.0), FloorSurface::Concrete, false)
        })
        .with_category("Terrain")
        .with_description(
            "Solid floor platform for side-scrolling games - objects collide and stand on it.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::conveyor::Conveyor;
    use crate::bodies::floor::Floor;
    use crate::physics::body::BodyType;

    #[test]
    fn test_builtin_templates() {
        let registry = TemplateRegistry::with_builtin();
        assert_eq!(registry.len(), 10);
        assert_eq!(
            registry.categories(),
            vec!["Basic", "General", "Objects", "Platforms", "Terrain"]
        );
        assert_eq!(registry.by_category("Terrain").count(), 5);
        assert_eq!(registry.by_category("Platforms").count(), 2);
    }

    #[test]
    fn test_create_sets_template_name() {
        let registry = TemplateRegistry::with_builtin();

        let belt = registry.create("Top-Down Conveyor Belt").unwrap();
        assert_eq!(belt.template_name.as_deref(), Some("Top-Down Conveyor Belt"));
        assert!(belt.collider.is_trigger);
        let conveyor = belt.behavior::<Conveyor>().unwrap();
        assert_eq!(conveyor.direction, ConveyorDirection::North);

        let crate_body = registry.create("Crate").unwrap();
        assert_eq!(crate_body.mass(), 10.0);
        assert_eq!(crate_body.size(), Vec2::splat(20.0));

        let solid = registry.create("Solid Platform Floor").unwrap();
        assert!(!solid.collider.is_trigger);
        assert_eq!(solid.body_type(), BodyType::Static);
        assert_eq!(solid.behavior::<Floor>().unwrap().surface(), FloorSurface::Concrete);

        let base = registry.create("Base Physics Body").unwrap();
        assert_eq!(base.body_type(), BodyType::Dynamic);
        assert!(!base.has_behavior());
    }

    #[test]
    fn test_unknown_template() {
        let registry = TemplateRegistry::with_builtin();
        let err = registry.create("Trampoline").unwrap_err();
        assert!(matches!(err, PhysicsError::UnknownTemplate(ref name) if name == "Trampoline"));
    }

    #[test]
    fn test_register_overwrite_and_unregister() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.is_empty());

        registry.register(BodyTemplate::new("Ball", || PhysicsBody::new_dynamic(1.0)));
        registry.register(
            BodyTemplate::new("Ball", || PhysicsBody::new_dynamic(3.0)).with_category("Toys"),
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Ball").unwrap().category, "Toys");
        assert_eq!(registry.create("Ball").unwrap().mass(), 3.0);

        assert!(registry.unregister("Ball"));
        assert!(!registry.unregister("Ball"));
        assert!(!registry.contains("Ball"));
    }

    #[test]
    fn test_builder_errors_propagate() {
        let mut registry = TemplateRegistry::new();
        registry.register(BodyTemplate::new("Broken", || PhysicsBody::new_dynamic(-1.0)));
        assert!(matches!(
            registry.create("Broken"),
            Err(PhysicsError::InvalidArgument { name: "mass", .. })
        ));
    }

    #[test]
    fn test_each_create_is_fresh() {
        let registry = TemplateRegistry::with_builtin();
        let mut first = registry.create("Crate").unwrap();
        first.set_velocity(Vec2::new(5.0, 0.0));
        let second = registry.create("Crate").unwrap();
        assert_eq!(second.velocity(), Vec2::ZERO);
    }
}
