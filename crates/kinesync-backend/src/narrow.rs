// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Narrow-phase contact generation for the reference simulation.
//!
//! Sphere/sphere and sphere/box are exact. Box/box uses the overlap of the
//! boxes' world bounds, which is exact for axis-aligned boxes and
//! conservative (may report contact early) for rotated ones.

use kinesync_geom::math::EPSILON;
use kinesync_geom::{Pose, Vec3};

use crate::shape::Shape;

/// A single contact between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first shape toward the second.
    pub normal: Vec3,
    /// Penetration depth in meters (zero when just touching).
    pub depth: f32,
}

impl Contact {
    fn flipped(self) -> Self {
        Self {
            normal: self.normal.neg(),
            depth: self.depth,
        }
    }
}

/// Tests two placed shapes for contact. Touching counts as contact.
pub fn collide(shape_a: &Shape, pose_a: &Pose, shape_b: &Shape, pose_b: &Pose) -> Option<Contact> {
    match (shape_a, shape_b) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(pose_a.position(), *ra, pose_b.position(), *rb)
        }
        (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
            sphere_box(pose_a.position(), *radius, pose_b, *half_extents)
        }
        (Shape::Box { half_extents }, Shape::Sphere { radius }) => {
            sphere_box(pose_b.position(), *radius, pose_a, *half_extents).map(Contact::flipped)
        }
        (Shape::Box { .. }, Shape::Box { .. }) => box_box(shape_a, pose_a, shape_b, pose_b),
    }
}

fn sphere_sphere(ca: Vec3, ra: f32, cb: Vec3, rb: f32) -> Option<Contact> {
    let d = cb.sub(&ca);
    let dist = d.length();
    let reach = ra + rb;
    if dist > reach {
        return None;
    }
    let normal = if dist <= EPSILON {
        Vec3::UNIT_X
    } else {
        d.scale(1.0 / dist)
    };
    Some(Contact {
        normal,
        depth: reach - dist,
    })
}

fn sphere_box(center: Vec3, radius: f32, box_pose: &Pose, he: Vec3) -> Option<Contact> {
    let local = box_pose.inverse_transform_point(&center);
    let clamped = Vec3::new(
        local.x().clamp(-he.x(), he.x()),
        local.y().clamp(-he.y(), he.y()),
        local.z().clamp(-he.z(), he.z()),
    );
    let offset = clamped.sub(&local);
    let dist = offset.length();
    if dist > radius {
        return None;
    }
    if dist > EPSILON {
        let normal = box_pose.transform_direction(&offset.scale(1.0 / dist));
        return Some(Contact {
            normal,
            depth: radius - dist,
        });
    }
    // Center inside the box: exit through the nearest face.
    let l = local.to_array();
    let h = he.to_array();
    let mut axis = 0;
    let mut best = h[0] - l[0].abs();
    for i in 1..3 {
        let pen = h[i] - l[i].abs();
        if pen < best {
            best = pen;
            axis = i;
        }
    }
    let mut dir = [0.0f32; 3];
    dir[axis] = if l[axis] < 0.0 { 1.0 } else { -1.0 };
    Some(Contact {
        normal: box_pose.transform_direction(&Vec3::from(dir)),
        depth: radius + best,
    })
}

fn box_box(shape_a: &Shape, pose_a: &Pose, shape_b: &Shape, pose_b: &Pose) -> Option<Contact> {
    let a = shape_a.bounds(pose_a);
    let b = shape_b.bounds(pose_b);
    if !a.overlaps(&b) {
        return None;
    }
    let overlap = a.max().min(&b.max()).sub(&a.min().max(&b.min())).to_array();
    let between = b.center().sub(&a.center()).to_array();
    let mut axis = 0;
    for i in 1..3 {
        if overlap[i] < overlap[axis] {
            axis = i;
        }
    }
    let mut dir = [0.0f32; 3];
    dir[axis] = if between[axis] < 0.0 { -1.0 } else { 1.0 };
    Some(Contact {
        normal: Vec3::from(dir),
        depth: overlap[axis],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_spheres_report_depth_along_center_line() {
        let c = collide(
            &Shape::sphere(1.0),
            &Pose::at(Vec3::ZERO),
            &Shape::sphere(1.0),
            &Pose::at(Vec3::new(0.5, 0.0, 0.0)),
        );
        let Some(c) = c else {
            unreachable!("spheres overlap");
        };
        assert_eq!(c.normal, Vec3::UNIT_X);
        assert!((c.depth - 1.5).abs() < 1e-6);
    }

    #[test]
    fn separated_spheres_do_not_touch() {
        let c = collide(
            &Shape::sphere(1.0),
            &Pose::at(Vec3::ZERO),
            &Shape::sphere(1.0),
            &Pose::at(Vec3::new(2.5, 0.0, 0.0)),
        );
        assert!(c.is_none());
    }

    #[test]
    fn sphere_resting_on_box_points_down_into_box() {
        let ground = Pose::at(Vec3::new(0.0, -1.0, 0.0));
        let c = collide(
            &Shape::sphere(0.5),
            &Pose::at(Vec3::new(0.0, 0.4, 0.0)),
            &Shape::cuboid(10.0, 2.0, 10.0),
            &ground,
        );
        let Some(c) = c else {
            unreachable!("sphere dips into box");
        };
        assert!((c.normal.y() + 1.0).abs() < 1e-6);
        assert!((c.depth - 0.1).abs() < 1e-5);
    }

    #[test]
    fn box_sphere_is_mirror_of_sphere_box() {
        let sphere = Pose::at(Vec3::new(1.2, 0.0, 0.0));
        let cube = Pose::at(Vec3::ZERO);
        let ab = collide(&Shape::sphere(0.5), &sphere, &Shape::cuboid(2.0, 2.0, 2.0), &cube);
        let ba = collide(&Shape::cuboid(2.0, 2.0, 2.0), &cube, &Shape::sphere(0.5), &sphere);
        match (ab, ba) {
            (Some(ab), Some(ba)) => {
                assert_eq!(ab.normal, ba.normal.neg());
                assert!((ab.depth - ba.depth).abs() < 1e-6);
            }
            other => unreachable!("expected contact both ways, got {other:?}"),
        }
    }

    #[test]
    fn stacked_boxes_separate_along_shallowest_axis() {
        let c = collide(
            &Shape::cuboid(2.0, 2.0, 2.0),
            &Pose::at(Vec3::ZERO),
            &Shape::cuboid(2.0, 2.0, 2.0),
            &Pose::at(Vec3::new(0.0, 1.9, 0.0)),
        );
        let Some(c) = c else {
            unreachable!("boxes overlap");
        };
        assert_eq!(c.normal, Vec3::UNIT_Y);
        assert!((c.depth - 0.1).abs() < 1e-5);
    }
}
