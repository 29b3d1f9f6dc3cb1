//! Narrowphase AABB contact generation.

use glam::Vec2;

use super::collider::Aabb;
use super::contact::ContactInfo;

/// Compute contact data for two overlapping AABBs.
///
/// The normal lies on the axis of least overlap, x winning ties, and points
/// from `a` toward `b`. Returns `None` when the boxes are separated.
pub fn aabb_contact(a: &Aabb, b: &Aabb) -> Option<ContactInfo> {
    if !a.overlaps(b) {
        return None;
    }

    let overlap_x = (a.max.x - b.min.x).min(b.max.x - a.min.x);
    let overlap_y = (a.max.y - b.min.y).min(b.max.y - a.min.y);
    let center_a = a.center();
    let center_b = b.center();

    let (normal, penetration) = if overlap_x <= overlap_y {
        let sign = if center_a.x < center_b.x { 1.0 } else { -1.0 };
        (Vec2::new(sign, 0.0), overlap_x)
    } else {
        let sign = if center_a.y < center_b.y { 1.0 } else { -1.0 };
        (Vec2::new(0.0, sign), overlap_y)
    };

    let overlap_min = a.min.max(b.min);
    let overlap_max = a.max.min(b.max);

    Some(ContactInfo {
        normal,
        penetration: penetration.max(0.0),
        point: (overlap_min + overlap_max) * 0.5,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::from_rect(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_separated_boxes() {
        assert!(aabb_contact(&rect(0.0, 0.0, 10.0, 10.0), &rect(20.0, 0.0, 10.0, 10.0)).is_none());
    }

    #[test]
    fn test_x_axis_contact() {
        let c = aabb_contact(&rect(0.0, 0.0, 10.0, 10.0), &rect(8.0, 1.0, 10.0, 10.0)).unwrap();
        assert_eq!(c.normal, Vec2::new(1.0, 0.0));
        assert!((c.penetration - 2.0).abs() < 1e-6);
        assert_eq!(c.point, Vec2::new(9.0, 5.5));
    }

    #[test]
    fn test_y_axis_contact_points_from_a_to_b() {
        // A sits above B, overlapping by 1 unit vertically
        let c = aabb_contact(&rect(0.0, 9.0, 10.0, 10.0), &rect(2.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(c.normal, Vec2::new(0.0, -1.0));
        assert!((c.penetration - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_equal_overlap_prefers_x_axis() {
        let c = aabb_contact(&rect(0.0, 0.0, 10.0, 10.0), &rect(5.0, 5.0, 10.0, 10.0)).unwrap();
        assert_eq!(c.normal, Vec2::new(1.0, 0.0));
        assert!((c.penetration - 5.0).abs() < 1e-6);

        let c = aabb_contact(&rect(5.0, 5.0, 10.0, 10.0), &rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(c.normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_touching_edges_zero_penetration() {
        let c = aabb_contact(&rect(0.0, 0.0, 10.0, 10.0), &rect(10.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(c.penetration, 0.0);
        assert_eq!(c.normal, Vec2::new(1.0, 0.0));
    }
}
