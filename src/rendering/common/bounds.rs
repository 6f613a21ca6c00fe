use glam::Vec3;

use crate::rendering::common::types::Aabb;

#[derive(Debug, Copy, Clone)]
struct MaxMinFinder {
    min: f32,
    max: f32,
}

impl Default for MaxMinFinder {
    fn default() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }
}

impl MaxMinFinder {
    #[inline]
    fn add(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// max(max², min²), the squared distance of the farthest extent from zero
    #[inline]
    fn max_squared(&self) -> f32 {
        (self.max * self.max).max(self.min * self.min)
    }
}

/// Accumulates points and derives the bounds of a mesh from them.
#[derive(Debug, Copy, Clone, Default)]
pub struct BoundsFinder {
    x: MaxMinFinder,
    y: MaxMinFinder,
    z: MaxMinFinder,
}

impl BoundsFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<'a, I: IntoIterator<Item = &'a Vec3>>(&mut self, points: I) {
        for point in points {
            self.x.add(point.x);
            self.y.add(point.y);
            self.z.add(point.z);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.x.min <= self.x.max && self.y.min <= self.y.max && self.z.min <= self.z.max
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    pub fn aabb(&self) -> Option<Aabb> {
        self.is_valid().then(|| Aabb::new(self.min(), self.max()))
    }

    /// The radius is measured from the origin, not from the geometric center of the points,
    /// so objects are bounded relative to their local origin. `None` until a point has been added.
    pub fn radius(&self) -> Option<f32> {
        self.is_valid()
            .then(|| (self.x.max_squared() + self.y.max_squared() + self.z.max_squared()).sqrt())
    }
}
