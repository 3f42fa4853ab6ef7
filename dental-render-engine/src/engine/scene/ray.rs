use bevy::math::{Affine3A, Ray3d, Vec3};

/// Axis aligned bounding box in whatever space its owner lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of the eight transformed corners.
    pub fn transformed(&self, xf: &Affine3A) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = xf.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    /// Distance along `ray` to the first intersection, if any.
    pub fn ray_hit(&self, ray: &Ray3d) -> Option<f32> {
        ray_aabb_hit_t(ray.origin, *ray.direction, self.min, self.max)
    }
}

// Slab-method ray–AABB intersection, returns Some(t) or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = Vec3::new(
        if ray_direction.x != 0.0 { 1.0 / ray_direction.x } else { f32::INFINITY },
        if ray_direction.y != 0.0 { 1.0 / ray_direction.y } else { f32::INFINITY },
        if ray_direction.z != 0.0 { 1.0 / ray_direction.z } else { f32::INFINITY },
    );

    let (mut tmin, mut tmax) = slab(ray_origin.x, inv.x, min.x, max.x);
    let (tymin, tymax) = slab(ray_origin.y, inv.y, min.y, max.y);

    if (tmin > tymax) || (tymin > tmax) { return None; }
    tmin = tmin.max(tymin);
    tmax = tmax.min(tymax);

    let (tzmin, tzmax) = slab(ray_origin.z, inv.z, min.z, max.z);

    if (tmin > tzmax) || (tzmin > tmax) { return None; }
    tmin = tmin.max(tzmin);
    tmax = tmax.min(tzmax);

    if tmax < 0.0 { return None; }
    Some(if tmin >= 0.0 { tmin } else { tmax })
}

// Entry/exit distances for one axis. A ray parallel to the slab and inside it
// spans the whole line, outside it misses.
fn slab(origin: f32, inv_dir: f32, min: f32, max: f32) -> (f32, f32) {
    if inv_dir.is_infinite() {
        return if origin >= min && origin <= max {
            (f32::NEG_INFINITY, f32::INFINITY)
        } else {
            (f32::INFINITY, f32::NEG_INFINITY)
        };
    }
    let (a, b) = ((min - origin) * inv_dir, (max - origin) * inv_dir);
    if a > b { (b, a) } else { (a, b) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::{Dir3, Quat};

    fn unit_box() -> Aabb3 {
        Aabb3::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))
    }

    #[test]
    fn ray_towards_box_hits_front_face() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 5.0), Dir3::NEG_Z);
        let t = unit_box().ray_hit(&ray).unwrap();
        assert!((t - 4.5).abs() < 1e-5);
    }

    #[test]
    fn ray_pointing_away_misses() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 5.0), Dir3::Z);
        assert!(unit_box().ray_hit(&ray).is_none());
    }

    #[test]
    fn axis_parallel_ray_outside_slab_misses() {
        let ray = Ray3d::new(Vec3::new(2.0, 0.0, 5.0), Dir3::NEG_Z);
        assert!(unit_box().ray_hit(&ray).is_none());
    }

    #[test]
    fn origin_inside_box_reports_exit() {
        let ray = Ray3d::new(Vec3::ZERO, Dir3::X);
        let t = unit_box().ray_hit(&ray).unwrap();
        assert!((t - 0.5).abs() < 1e-5);
    }

    #[test]
    fn transformed_bounds_cover_rotated_box() {
        let xf = Affine3A::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let bounds = unit_box().transformed(&xf);
        let half_diag = 0.5 * std::f32::consts::SQRT_2;
        assert!((bounds.max.x - (1.0 + half_diag)).abs() < 1e-5);
        assert!((bounds.min.z + half_diag).abs() < 1e-5);
        assert!((bounds.center() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }
}
