use std::sync::Arc;

use glam::Mat4;

use crate::assets::Geometry;

/// How the color target is cleared before drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearMode {
    /// Opaque black, for the orbit view
    Opaque,
    /// Zero alpha so the capture feed behind the surface shows through
    Transparent,
}

/// One object to draw this frame
#[derive(Debug, Clone)]
pub struct DrawItem<'a> {
    pub name: &'a str,
    pub geometry: &'a Arc<Geometry>,
    pub model: Mat4,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub view_projection: Mat4,
    pub objects: Vec<DrawItem<'a>>,
    pub clear: ClearMode,
}

/// Draws a frame from whichever camera the composer selected
pub trait SceneRenderer {
    fn render(&mut self, frame: &FrameView<'_>) -> anyhow::Result<()>;

    /// Resize the output surface, in physical pixels
    fn resize(&mut self, width: u32, height: u32);

    fn output_size(&self) -> (u32, u32);

    /// Free GPU resources; the renderer must not be used afterwards
    fn release(&mut self);
}
