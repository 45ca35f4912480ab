/// Framebuffer trait - groups render target attachments for a render pass
///
/// A framebuffer binds together color and depth/stencil attachments
/// that a render pass will render into.
///
/// Created once and reused each frame. Must be recreated only when
/// attachments change (e.g., window resize).

use std::sync::Arc;
use crate::graphics_device::{RenderPass, Texture};

/// Framebuffer, a group of color and depth/stencil attachments
///
/// Created via `GraphicsDevice::create_framebuffer()`.
pub trait Framebuffer: Send + Sync {
    /// Get the width in pixels
    fn width(&self) -> u32;

    /// Get the height in pixels
    fn height(&self) -> u32;
}

/// Descriptor for creating a framebuffer
pub struct FramebufferDesc<'a> {
    /// The render pass this framebuffer is compatible with
    pub render_pass: &'a Arc<dyn RenderPass>,
    /// Color attachments (empty for depth-only framebuffers)
    pub color_attachments: Vec<Arc<dyn Texture>>,
    /// Optional depth/stencil attachment
    pub depth_attachment: Option<Arc<dyn Texture>>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}
