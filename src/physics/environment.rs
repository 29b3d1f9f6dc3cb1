//! Environment presets and material combination formulas.

use glam::Vec2;

use crate::error::{PhysicsError, Result};

use super::material::clamp_unit;

/// Speed below which drag is treated as zero.
const DRAG_EPSILON: f32 = 0.001;

/// A named bundle of environment values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentPreset {
    /// Lookup key, e.g. `"earth"`.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    pub description: &'static str,
    pub gravity: Vec2,
    /// Fluid density in kg/m^3 used by the drag equation.
    pub fluid_density: f32,
    pub default_friction: f32,
    pub default_restitution: f32,
}

/// Built-in presets. The first entry is the default.
pub const PRESETS: [EnvironmentPreset; 6] = [
    EnvironmentPreset {
        key: "earth",
        name: "Earth (Normal)",
        description: "Standard earth conditions",
        gravity: Vec2::new(0.0, -9.81),
        fluid_density: 1.225,
        default_friction: 0.5,
        default_restitution: 0.3,
    },
    EnvironmentPreset {
        key: "space",
        name: "Space (Zero-G)",
        description: "Zero gravity, no atmosphere",
        gravity: Vec2::new(0.0, 0.0),
        fluid_density: 0.0,
        default_friction: 0.0,
        default_restitution: 0.9,
    },
    EnvironmentPreset {
        key: "moon",
        name: "Moon",
        description: "Lunar gravity, no atmosphere",
        gravity: Vec2::new(0.0, -1.62),
        fluid_density: 0.0,
        default_friction: 0.3,
        default_restitution: 0.4,
    },
    EnvironmentPreset {
        key: "underwater",
        name: "Underwater",
        description: "Underwater with high drag",
        gravity: Vec2::new(0.0, -9.81),
        fluid_density: 1000.0,
        default_friction: 0.8,
        default_restitution: 0.1,
    },
    EnvironmentPreset {
        key: "platformer",
        name: "Platformer (Game)",
        description: "Classic platformer physics",
        gravity: Vec2::new(0.0, -20.0),
        fluid_density: 0.5,
        default_friction: 0.6,
        default_restitution: 0.0,
    },
    EnvironmentPreset {
        key: "top_down",
        name: "Top-Down (2D)",
        description: "Top-down game with friction",
        gravity: Vec2::new(0.0, 0.0),
        fluid_density: 2.0,
        default_friction: 0.7,
        default_restitution: 0.2,
    },
];

/// Active environment values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentConfig {
    pub gravity: Vec2,
    pub fluid_density: f32,
    pub default_friction: f32,
    pub default_restitution: f32,
    /// Cap on any body's speed. Default: 200.
    pub terminal_velocity: f32,
    /// Speed at or above which a dynamic body is kept awake. Default: 0.01.
    pub sleep_threshold: f32,
    /// Reserved for multi-pass resolution. Default: 8.
    pub collision_iterations: u32,
    /// Per-second velocity retention, applied as `damping^dt`. Default: 0.98.
    pub linear_damping: f32,
    /// Velocity components below this snap to zero. Default: 0.01.
    pub velocity_threshold: f32,
}

impl EnvironmentConfig {
    fn from_preset(preset: &EnvironmentPreset) -> Self {
        Self {
            gravity: preset.gravity,
            fluid_density: preset.fluid_density,
            default_friction: preset.default_friction,
            default_restitution: preset.default_restitution,
            terminal_velocity: 200.0,
            sleep_threshold: 0.01,
            collision_iterations: 8,
            linear_damping: 0.98,
            velocity_threshold: 0.01,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self::from_preset(&PRESETS[0])
    }
}

/// Holds the active environment and the force formulas that depend on it.
#[derive(Debug, Clone)]
pub struct EnvironmentService {
    preset: &'static str,
    config: EnvironmentConfig,
}

impl Default for EnvironmentService {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentService {
    /// Start from the `earth` preset.
    pub fn new() -> Self {
        Self {
            preset: PRESETS[0].key,
            config: EnvironmentConfig::default(),
        }
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Key of the preset last applied.
    pub fn preset_name(&self) -> &'static str {
        self.preset
    }

    pub fn list_presets() -> &'static [EnvironmentPreset] {
        &PRESETS
    }

    pub fn find_preset(name: &str) -> Option<&'static EnvironmentPreset> {
        let lower = name.to_ascii_lowercase();
        PRESETS.iter().find(|preset| preset.key == lower)
    }

    /// Apply a preset's gravity, fluid density and material defaults.
    ///
    /// Engine-wide constants (terminal velocity, thresholds, iterations,
    /// damping) are left untouched.
    pub fn set_preset(&mut self, name: &str) -> Result<()> {
        let preset = Self::find_preset(name).ok_or_else(|| PhysicsError::UnknownPreset {
            name: name.to_string(),
            available: PRESETS.iter().map(|p| p.key).collect(),
        })?;
        self.preset = preset.key;
        self.config.gravity = preset.gravity;
        self.config.fluid_density = preset.fluid_density;
        self.config.default_friction = preset.default_friction;
        self.config.default_restitution = preset.default_restitution;
        tracing::info!("Environment preset set to {}", preset.name);
        Ok(())
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
    }

    pub fn fluid_density(&self) -> f32 {
        self.config.fluid_density
    }

    pub fn set_fluid_density(&mut self, density: f32) -> Result<()> {
        if density.is_nan() || density < 0.0 {
            return Err(PhysicsError::invalid(
                "fluid density",
                format!("must be >= 0, got {density}"),
            ));
        }
        self.config.fluid_density = density;
        Ok(())
    }

    pub fn set_default_friction(&mut self, friction: f32) {
        self.config.default_friction = clamp_unit(friction);
    }

    pub fn set_default_restitution(&mut self, restitution: f32) {
        self.config.default_restitution = clamp_unit(restitution);
    }

    pub fn terminal_velocity(&self) -> f32 {
        self.config.terminal_velocity
    }

    pub fn set_terminal_velocity(&mut self, velocity: f32) -> Result<()> {
        if velocity.is_nan() || velocity <= 0.0 {
            return Err(PhysicsError::invalid(
                "terminal velocity",
                format!("must be > 0, got {velocity}"),
            ));
        }
        self.config.terminal_velocity = velocity;
        Ok(())
    }

    pub fn sleep_threshold(&self) -> f32 {
        self.config.sleep_threshold
    }

    pub fn set_sleep_threshold(&mut self, threshold: f32) -> Result<()> {
        if threshold.is_nan() || threshold < 0.0 {
            return Err(PhysicsError::invalid(
                "sleep threshold",
                format!("must be >= 0, got {threshold}"),
            ));
        }
        self.config.sleep_threshold = threshold;
        Ok(())
    }

    pub fn collision_iterations(&self) -> u32 {
        self.config.collision_iterations
    }

    pub fn set_collision_iterations(&mut self, iterations: u32) -> Result<()> {
        if iterations < 1 {
            return Err(PhysicsError::invalid(
                "collision iterations",
                "must be >= 1, got 0",
            ));
        }
        self.config.collision_iterations = iterations;
        Ok(())
    }

    pub fn set_linear_damping(&mut self, damping: f32) -> Result<()> {
        if damping.is_nan() || damping <= 0.0 || damping > 1.0 {
            return Err(PhysicsError::invalid(
                "linear damping",
                format!("must be in (0, 1], got {damping}"),
            ));
        }
        self.config.linear_damping = damping;
        Ok(())
    }

    pub fn set_velocity_threshold(&mut self, threshold: f32) -> Result<()> {
        if threshold.is_nan() || threshold < 0.0 {
            return Err(PhysicsError::invalid(
                "velocity threshold",
                format!("must be >= 0, got {threshold}"),
            ));
        }
        self.config.velocity_threshold = threshold;
        Ok(())
    }

    /// Quadratic drag `F = 0.5 * rho * v^2 * Cd * A`, opposite the velocity.
    pub fn drag_force(&self, velocity: Vec2, drag_coefficient: f32, area: f32) -> Vec2 {
        let speed = velocity.length();
        if speed < DRAG_EPSILON {
            return Vec2::ZERO;
        }
        let magnitude = 0.5 * self.config.fluid_density * speed * speed * drag_coefficient * area;
        -velocity / speed * magnitude
    }
}

/// Geometric mean of two friction coefficients.
pub fn combined_friction(a: f32, b: f32) -> f32 {
    (a * b).max(0.0).sqrt()
}

/// The bouncier material wins.
pub fn combined_restitution(a: f32, b: f32) -> f32 {
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_earth() {
        let env = EnvironmentService::new();
        assert_eq!(env.preset_name(), "earth");
        assert_eq!(env.gravity(), Vec2::new(0.0, -9.81));
        assert_eq!(env.fluid_density(), 1.225);
        assert_eq!(env.terminal_velocity(), 200.0);
        assert_eq!(env.sleep_threshold(), 0.01);
        assert_eq!(env.collision_iterations(), 8);
    }

    #[test]
    fn test_set_preset_case_insensitive() {
        let mut env = EnvironmentService::new();
        env.set_terminal_velocity(50.0).unwrap();
        env.set_preset("Underwater").unwrap();
        assert_eq!(env.preset_name(), "underwater");
        assert_eq!(env.fluid_density(), 1000.0);
        assert_eq!(env.config().default_friction, 0.8);
        // Engine constants survive preset changes
        assert_eq!(env.terminal_velocity(), 50.0);
    }

    #[test]
    fn test_unknown_preset_lists_names() {
        let mut env = EnvironmentService::new();
        let err = env.set_preset("jupiter").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("jupiter"), "message = {}", message);
        for preset in EnvironmentService::list_presets() {
            assert!(message.contains(preset.key), "missing {} in {}", preset.key, message);
        }
        assert_eq!(env.preset_name(), "earth");
    }

    #[test]
    fn test_validation() {
        let mut env = EnvironmentService::new();
        assert!(env.set_terminal_velocity(0.0).is_err());
        assert!(env.set_sleep_threshold(-0.1).is_err());
        assert!(env.set_collision_iterations(0).is_err());
        assert!(env.set_fluid_density(-1.0).is_err());
        assert!(env.set_linear_damping(1.5).is_err());
        env.set_sleep_threshold(0.0).unwrap();
        env.set_default_friction(2.0);
        assert_eq!(env.config().default_friction, 1.0);
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let env = EnvironmentService::new();
        let drag = env.drag_force(Vec2::new(10.0, 0.0), 1.0, 2.0);
        // 0.5 * 1.225 * 100 * 1 * 2
        assert!((drag.x + 122.5).abs() < 1e-3, "drag = {:?}", drag);
        assert_eq!(drag.y, 0.0);
    }

    #[test]
    fn test_drag_zero_in_vacuum() {
        let mut env = EnvironmentService::new();
        env.set_preset("space").unwrap();
        assert_eq!(env.drag_force(Vec2::new(50.0, 50.0), 1.0, 1.0), Vec2::ZERO);
    }

    #[test]
    fn test_combined_properties() {
        assert_eq!(combined_restitution(0.3, 0.8), 0.8);
        assert!((combined_friction(0.25, 1.0) - 0.5).abs() < 1e-6);
        assert_eq!(combined_friction(0.0, 0.9), 0.0);
    }

    proptest! {
        #[test]
        fn drag_is_zero_at_rest(coefficient in 0.0f32..10.0, area in 0.0f32..1000.0) {
            let env = EnvironmentService::new();
            prop_assert_eq!(env.drag_force(Vec2::ZERO, coefficient, area), Vec2::ZERO);
        }

        #[test]
        fn restitution_combines_as_max(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let e = combined_restitution(a, b);
            prop_assert_eq!(e, a.max(b));
            prop_assert_eq!(e, combined_restitution(b, a));
        }
    }
}
