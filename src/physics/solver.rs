//! Impulse response and positional correction for AABB contacts.

use super::body::{BodyType, PhysicsBody};
use super::contact::ContactInfo;
use super::environment::combined_restitution;

/// Penetration allowed before positional correction kicks in.
pub const DEFAULT_SLOP: f32 = 0.05;
/// Fraction of the remaining penetration corrected per step.
pub const DEFAULT_CORRECTION_PERCENT: f32 = 0.4;

/// Only dynamic bodies take part in the response.
#[inline]
fn effective_inverse_mass(body: &PhysicsBody) -> f32 {
    if body.body_type() == BodyType::Dynamic {
        body.inverse_mass()
    } else {
        0.0
    }
}

/// Resolve one contact between `a` and `b`, normal pointing from `a` to `b`.
///
/// Returns `false` when the pair needs no response: a trigger is involved,
/// neither side can move, or the bodies are already separating.
pub fn resolve_contact(
    a: &mut PhysicsBody,
    b: &mut PhysicsBody,
    contact: &ContactInfo,
    slop: f32,
    correction_percent: f32,
) -> bool {
    if a.collider.is_trigger || b.collider.is_trigger {
        return false;
    }
    if a.body_type() == BodyType::Static && b.body_type() == BodyType::Static {
        return false;
    }

    let inv_a = effective_inverse_mass(a);
    let inv_b = effective_inverse_mass(b);
    let inv_mass_sum = inv_a + inv_b;
    if inv_mass_sum <= 0.0 {
        return false;
    }

    let normal = contact.normal;
    let relative_velocity = b.velocity() - a.velocity();
    let velocity_along_normal = relative_velocity.dot(normal);
    if velocity_along_normal > 0.0 {
        return false;
    }

    let restitution = combined_restitution(a.material.restitution(), b.material.restitution());
    let j = -(1.0 + restitution) * velocity_along_normal / inv_mass_sum;
    let impulse = normal * j;
    if inv_a > 0.0 {
        a.rigid_body.apply_impulse(-impulse);
    }
    if inv_b > 0.0 {
        b.rigid_body.apply_impulse(impulse);
    }

    correct_positions(a, b, contact, inv_a, inv_b, slop, correction_percent);
    true
}

/// Push bodies apart along the normal in proportion to their inverse mass.
pub fn correct_positions(
    a: &mut PhysicsBody,
    b: &mut PhysicsBody,
    contact: &ContactInfo,
    inv_a: f32,
    inv_b: f32,
    slop: f32,
    correction_percent: f32,
) {
    let inv_mass_sum = inv_a + inv_b;
    if inv_mass_sum <= 0.0 {
        return;
    }
    let magnitude = (contact.penetration - slop).max(0.0) / inv_mass_sum * correction_percent;
    let correction = contact.normal * magnitude;
    if inv_a > 0.0 {
        a.translate(-correction * inv_a);
    }
    if inv_b > 0.0 {
        b.translate(correction * inv_b);
    }
}
