//! Surface and bulk material properties.

use crate::error::{PhysicsError, Result};

/// Physical material of a body.
///
/// Restitution and friction are clamped to `[0, 1]` on every write. Density
/// and drag reject negative values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    density: f32,
    restitution: f32,
    friction: f32,
    drag: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            restitution: 0.3,
            friction: 0.5,
            drag: 0.1,
        }
    }
}

impl Material {
    /// Create a material, validating density and drag.
    pub fn new(density: f32, restitution: f32, friction: f32, drag: f32) -> Result<Self> {
        let mut material = Self::default();
        material.set_density(density)?;
        material.set_drag(drag)?;
        material.set_restitution(restitution);
        material.set_friction(friction);
        Ok(material)
    }

    /// Build a material from constants known to be in range.
    pub(crate) const fn preset(density: f32, restitution: f32, friction: f32, drag: f32) -> Self {
        Self {
            density,
            restitution,
            friction,
            drag,
        }
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn drag(&self) -> f32 {
        self.drag
    }

    pub fn set_density(&mut self, density: f32) -> Result<()> {
        self.density = non_negative("density", density)?;
        Ok(())
    }

    pub fn set_drag(&mut self, drag: f32) -> Result<()> {
        self.drag = non_negative("drag", drag)?;
        Ok(())
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = clamp_unit(restitution);
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = clamp_unit(friction);
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<f32> {
    if value.is_nan() || value < 0.0 {
        return Err(PhysicsError::invalid(
            name,
            format!("must be >= 0, got {value}"),
        ));
    }
    Ok(value)
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
