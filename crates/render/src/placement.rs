use glam::{Mat4, Vec3};
use std::f32::consts::TAU;

/// A fixed rotation: angle in radians about a unit axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    angle: f32,
    axis: Vec3,
}

impl Rotation {
    /// Returns `None` for a non-finite angle or a zero-length axis.
    pub fn from_radians(angle: f32, axis: Vec3) -> Option<Self> {
        if !angle.is_finite() {
            return None;
        }
        Some(Self {
            angle,
            axis: axis.try_normalize()?,
        })
    }

    pub fn from_degrees(degrees: f32, axis: Vec3) -> Option<Self> {
        Self::from_radians(degrees.to_radians(), axis)
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_axis_angle(self.axis, self.angle)
    }
}

/// Time-driven rotation followed by an offset.
///
/// The angle is a function of total elapsed time, recomputed every frame,
/// so it never accumulates drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    axis: Vec3,
    radians_per_second: f32,
    offset: Vec3,
}

impl Animation {
    /// Returns `None` for a zero-length axis or non-finite parameters.
    pub fn new(axis: Vec3, degrees_per_second: f32, offset: Vec3) -> Option<Self> {
        if !degrees_per_second.is_finite() || !offset.is_finite() {
            return None;
        }
        Some(Self {
            axis: axis.try_normalize()?,
            radians_per_second: degrees_per_second.to_radians(),
            offset,
        })
    }

    /// Spin in place.
    pub fn spin(axis: Vec3, degrees_per_second: f32) -> Option<Self> {
        Self::new(axis, degrees_per_second, Vec3::ZERO)
    }

    /// Angle after `elapsed` seconds, wrapped to one turn.
    pub fn angle_at(&self, elapsed: f32) -> f32 {
        (elapsed * self.radians_per_second).rem_euclid(TAU)
    }

    pub fn matrix_at(&self, elapsed: f32) -> Mat4 {
        Mat4::from_axis_angle(self.axis, self.angle_at(elapsed)) * Mat4::from_translation(self.offset)
    }
}

/// Where an object sits in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: Vec3,
    pub scale: Vec3,
    pub rotation: Option<Rotation>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: None,
        }
    }
}

impl Placement {
    pub fn new(translation: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            scale,
            rotation: None,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.scale.is_finite()
    }

    /// Compose identity, translate, scale, [animation], rotate, in that order.
    pub fn matrix(&self, animation: Option<(&Animation, f32)>) -> Mat4 {
        let mut model = Mat4::from_translation(self.translation) * Mat4::from_scale(self.scale);
        if let Some((animation, elapsed)) = animation {
            model *= animation.matrix_at(elapsed);
        }
        if let Some(rotation) = &self.rotation {
            model *= rotation.matrix();
        }
        model
    }
}
