/// ShadowSystem - owns the shadow technique, maps and pass
///
/// With the technique set to `None` the system holds no GPU resources
/// at all; every accessor degrades to `None`, zero or the identity and
/// recording is a no-op. Enabling shadows is a construction-time choice.

use std::sync::Arc;

use glam::Mat4;

use crate::engine_info;
use crate::error::Result;
use crate::graphics_device::{CommandList, GraphicsDevice, RenderPass, Sampler, SamplerDesc};
use crate::graphics_device::{AddressMode, FilterMode};
use crate::registry::Renderables;
use crate::shadow::{
    light_space_matrix, ShadowCamera, ShadowMap, ShadowPass, ShadowProjection,
};

const LOG_SOURCE: &str = "prism::ShadowSystem";

const MIN_RESOLUTION: u32 = 256;
const MAX_RESOLUTION: u32 = 4096;

/// Shadow rendering technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowTechnique {
    /// No shadow resources whatsoever
    #[default]
    None,
    /// One depth map per frame, sampled with a compare sampler
    Basic,
}

#[derive(Debug, Clone, Copy)]
pub struct ShadowConfig {
    pub technique: ShadowTechnique,
    /// Map edge length in pixels; snapped to a power of two in
    /// [256, 4096]
    pub resolution: u32,
    pub projection: ShadowProjection,
    pub camera: ShadowCamera,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            technique: ShadowTechnique::None,
            resolution: 1024,
            projection: ShadowProjection::Orthographic {
                half_extent: 20.0,
                near: 0.1,
                far: 100.0,
            },
            camera: ShadowCamera::StraightDown { height: 20.0 },
        }
    }
}

/// Snap a requested resolution to a supported power of two
pub fn clamp_resolution(resolution: u32) -> u32 {
    // Clamp before rounding so oversized requests cannot overflow the
    // power-of-two step.
    resolution
        .clamp(MIN_RESOLUTION, MAX_RESOLUTION)
        .next_power_of_two()
}

struct Enabled {
    config: ShadowConfig,
    sampler: Arc<dyn Sampler>,
    pass: ShadowPass,
    maps: Vec<ShadowMap>,
    light_matrix: Mat4,
}

pub struct ShadowSystem {
    inner: Option<Enabled>,
}

impl ShadowSystem {
    /// Build the system; `ShadowTechnique::None` allocates nothing
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        frame_count: usize,
        config: ShadowConfig,
    ) -> Result<Self> {
        if config.technique == ShadowTechnique::None {
            return Ok(Self::disabled());
        }

        let mut config = config;
        config.resolution = clamp_resolution(config.resolution);
        let sampler = device.create_sampler(&SamplerDesc {
            filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToBorder,
            compare_enable: true,
        })?;
        let pass = ShadowPass::new(device, frame_count)?;
        let maps = Self::create_maps(device, pass.render_pass(), frame_count, config.resolution)?;
        let light_matrix = light_space_matrix(&config.projection, &config.camera);

        engine_info!(
            LOG_SOURCE,
            "Enabled {}x{} shadow maps for {} frames",
            config.resolution,
            config.resolution,
            frame_count
        );
        Ok(Self {
            inner: Some(Enabled {
                config,
                sampler,
                pass,
                maps,
                light_matrix,
            }),
        })
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    // ===== ACCESSORS (all safe no-ops when disabled) =====

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Map edge length; 0 when disabled
    pub fn resolution(&self) -> u32 {
        self.inner.as_ref().map(|e| e.config.resolution).unwrap_or(0)
    }

    pub fn map(&self, frame_index: usize) -> Option<&ShadowMap> {
        self.inner.as_ref().and_then(|e| e.maps.get(frame_index))
    }

    pub fn sampler(&self) -> Option<&Arc<dyn Sampler>> {
        self.inner.as_ref().map(|e| &e.sampler)
    }

    pub fn render_pass(&self) -> Option<&Arc<dyn RenderPass>> {
        self.inner.as_ref().map(|e| e.pass.render_pass())
    }

    pub fn command_list(&self, frame_index: usize) -> Option<&dyn CommandList> {
        self.inner.as_ref().and_then(|e| e.pass.list(frame_index))
    }

    /// World-to-light-clip matrix; identity when disabled
    pub fn light_space_matrix(&self) -> Mat4 {
        self.inner.as_ref().map(|e| e.light_matrix).unwrap_or(Mat4::IDENTITY)
    }

    // ===== LIGHT CONFIGURATION =====

    pub fn set_camera(&mut self, camera: ShadowCamera) {
        if let Some(enabled) = &mut self.inner {
            enabled.config.camera = camera;
            enabled.light_matrix =
                light_space_matrix(&enabled.config.projection, &enabled.config.camera);
        }
    }

    pub fn set_projection(&mut self, projection: ShadowProjection) {
        if let Some(enabled) = &mut self.inner {
            enabled.config.projection = projection;
            enabled.light_matrix =
                light_space_matrix(&enabled.config.projection, &enabled.config.camera);
        }
    }

    // ===== PER-FRAME WORK =====

    /// Record the depth pass for one frame; no-op when disabled
    pub fn record_for_frame(&mut self, frame_index: usize, registry: &Renderables) -> Result<()> {
        let Some(enabled) = &mut self.inner else {
            return Ok(());
        };
        let Some(map) = enabled.maps.get(frame_index) else {
            return Ok(());
        };
        enabled.pass.record(frame_index, map, registry)
    }

    // ===== RECREATION =====

    /// Rebuild maps and command lists for a new frame count
    pub fn recreate(&mut self, device: &Arc<dyn GraphicsDevice>, frame_count: usize) -> Result<()> {
        let Some(enabled) = &mut self.inner else {
            return Ok(());
        };
        enabled.maps.clear();
        enabled.pass.recreate(device, frame_count)?;
        enabled.maps = Self::create_maps(
            device,
            enabled.pass.render_pass(),
            frame_count,
            enabled.config.resolution,
        )?;
        Ok(())
    }

    fn create_maps(
        device: &Arc<dyn GraphicsDevice>,
        render_pass: &Arc<dyn RenderPass>,
        frame_count: usize,
        resolution: u32,
    ) -> Result<Vec<ShadowMap>> {
        (0..frame_count)
            .map(|_| ShadowMap::new(device, render_pass, resolution))
            .collect()
    }
}

#[cfg(test)]
#[path = "shadow_system_tests.rs"]
mod tests;
