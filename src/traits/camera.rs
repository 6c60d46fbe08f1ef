use glam::{Mat4, Vec3};

use crate::camera::Lens;

/// A camera the renderer can draw the scene from
pub trait ViewCamera {
    fn lens(&self) -> &Lens;

    /// World-space eye position
    fn position(&self) -> Vec3;

    /// Unit view direction
    fn forward(&self) -> Vec3;

    fn view_matrix(&self) -> Mat4;

    fn projection_matrix(&self) -> Mat4 {
        self.lens().projection()
    }

    fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Point one unit ahead of the camera
    fn look_at_point(&self) -> Vec3 {
        self.position() + self.forward()
    }
}
