/// Swapchain trait - for window presentation

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Texture, TextureFormat};

/// Swapchain for presenting rendered images to a window
///
/// Manages the set of images presented to the screen in sequence. The
/// image count here is the source of truth for the FrameSlot count: every
/// per-frame resource (command buffer, descriptor set, uniform buffer,
/// shadow map) is duplicated `image_count()` times.
pub trait Swapchain: Send + Sync {
    /// Acquire the next available swapchain image index
    fn acquire_next_image(&mut self) -> Result<u32>;

    /// Present the rendered image to the screen
    ///
    /// # Arguments
    ///
    /// * `image_index` - Index of the image to present (from acquire_next_image)
    fn present(&mut self, image_index: u32) -> Result<()>;

    /// Recreate the swapchain (e.g., after window resize)
    ///
    /// The image count may change across a recreation; callers must re-query
    /// `image_count()` and rebuild all per-frame resources.
    ///
    /// # Arguments
    ///
    /// * `width` - New width in pixels
    /// * `height` - New height in pixels
    fn recreate(&mut self, width: u32, height: u32) -> Result<()>;

    /// Get the number of images in the swapchain
    fn image_count(&self) -> usize;

    /// Get one of the swapchain images as a texture (for framebuffer creation)
    fn image(&self, index: usize) -> Result<Arc<dyn Texture>>;

    /// Get the width of the swapchain images in pixels
    fn width(&self) -> u32;

    /// Get the height of the swapchain images in pixels
    fn height(&self) -> u32;

    /// Get the pixel format of the swapchain images
    fn format(&self) -> TextureFormat;
}
