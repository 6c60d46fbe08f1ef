use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, Euler rotation (radians, XYZ order) and scale of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_scale(scale: f32) -> Self {
        Self {
            scale: Vec3::splat(scale),
            ..Self::default()
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Model matrix: scale, then rotate, then translate
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Move `current` a fixed fraction of the remaining distance toward `goal`
pub fn approach(current: Vec3, goal: Vec3, factor: f32) -> Vec3 {
    current + (goal - current) * factor
}

/// Round for display, e.g. `round_to(1.23456, 2) == 1.23`
pub fn round_to(value: f32, decimals: u32) -> f32 {
    let scale = 10f32.powi(decimals as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_moves_fraction() {
        let next = approach(Vec3::ZERO, Vec3::new(10.0, 0.0, -10.0), 0.1);
        assert!((next - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.05, 1), -0.1);
        assert_eq!(round_to(1.7777, 3), 1.778);
    }

    #[test]
    fn test_matrix_applies_scale_before_translation() {
        let transform = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            ..Transform::from_scale(2.0)
        };
        let p = transform.matrix().transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!((p - Vec3::new(3.0, 2.0, 2.0)).length() < 1e-6);
    }
}
