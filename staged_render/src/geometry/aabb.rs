use glam::{Mat4, Vec3};

/// Axis-Aligned Bounding Box
///
/// Bounds of a frustum in world space, or of a drawable in local space
/// (transformed by its world matrix at culling time).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box that any `merge_point` turns into a valid one
    pub fn empty() -> Self {
        Self { min: Vec3::splat(f32::MAX), max: Vec3::splat(f32::MIN) }
    }

    /// Smallest box enclosing every point
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.merge_point(*p);
        }
        aabb
    }

    /// Grow the box to enclose `p`
    pub fn merge_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// True until at least one point has been merged
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Full edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half edge lengths
    pub fn extent(&self) -> Vec3 {
        self.size() * 0.5
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Transform this box by a matrix, returning the enclosing box.
    ///
    /// Arvo method: projects each matrix axis onto the extents instead of
    /// transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// `other` lies entirely within `self`
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Point inside or on the boundary, with a tolerance for rounding
    pub fn contains_point(&self, p: Vec3, epsilon: f32) -> bool {
        let eps = Vec3::splat(epsilon);
        (self.min - eps).cmple(p).all() && (self.max + eps).cmpge(p).all()
    }

    /// The two boxes overlap or touch
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
