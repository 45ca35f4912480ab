/// Customizer flags - per-drawable fixed-function overrides

use crate::graphics_device::{
    ColorBlendState, CullMode, FrontFace, PolygonMode, RasterizationState,
};

bitflags::bitflags! {
    /// Flags that shape a drawable's pipeline state
    ///
    /// Combined with `|` and passed in the drawable's spec. The default
    /// (empty) set renders filled, back-culled, counter-clockwise-front,
    /// opaque geometry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Customizer: u32 {
        /// Render edges only
        const WIREFRAME = 0b00001;
        /// Disable back-face culling
        const SHOW_BACKFACES = 0b00010;
        /// Content winds its front faces clockwise
        const FRONT_CLOCKWISE = 0b00100;
        /// Content was authored for Vulkan's inverted Y; the projection
        /// flip reverses the effective winding
        const MODELED_FOR_VULKAN = 0b01000;
        /// Enable standard alpha blending
        const ALPHA_BLENDING = 0b10000;
    }
}

impl Customizer {
    /// Rasterization state implied by these flags
    pub fn rasterization_state(&self) -> RasterizationState {
        // The Y flip reverses winding, so each of the two flags toggles it.
        let mut clockwise = self.contains(Customizer::FRONT_CLOCKWISE);
        if self.contains(Customizer::MODELED_FOR_VULKAN) {
            clockwise = !clockwise;
        }

        RasterizationState {
            cull_mode: if self.contains(Customizer::SHOW_BACKFACES) {
                CullMode::None
            } else {
                CullMode::Back
            },
            front_face: if clockwise {
                FrontFace::Clockwise
            } else {
                FrontFace::CounterClockwise
            },
            polygon_mode: if self.contains(Customizer::WIREFRAME) {
                PolygonMode::Line
            } else {
                PolygonMode::Fill
            },
        }
    }

    /// Color blend state implied by these flags
    pub fn color_blend_state(&self) -> ColorBlendState {
        ColorBlendState {
            blend_enable: self.contains(Customizer::ALPHA_BLENDING),
        }
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_filled_back_culled_ccw() {
        let state = Customizer::default().rasterization_state();
        assert_eq!(state.polygon_mode, PolygonMode::Fill);
        assert_eq!(state.cull_mode, CullMode::Back);
        assert_eq!(state.front_face, FrontFace::CounterClockwise);
    }

    #[test]
    fn wireframe_and_backfaces() {
        let state = (Customizer::WIREFRAME | Customizer::SHOW_BACKFACES).rasterization_state();
        assert_eq!(state.polygon_mode, PolygonMode::Line);
        assert_eq!(state.cull_mode, CullMode::None);
    }

    #[test]
    fn vulkan_authoring_flips_winding() {
        assert_eq!(
            Customizer::MODELED_FOR_VULKAN.rasterization_state().front_face,
            FrontFace::Clockwise
        );
        // Both flags together cancel out.
        assert_eq!(
            (Customizer::MODELED_FOR_VULKAN | Customizer::FRONT_CLOCKWISE)
                .rasterization_state()
                .front_face,
            FrontFace::CounterClockwise
        );
    }

    #[test]
    fn alpha_blending_enables_blend() {
        assert!(Customizer::ALPHA_BLENDING.color_blend_state().blend_enable);
        assert!(!Customizer::default().color_blend_state().blend_enable);
    }
}
