/// Light-space projection math for the shadow pass

use glam::{Mat4, Vec3};

/// How the light projects the scene onto the shadow map
#[derive(Debug, Clone, Copy)]
pub enum ShadowProjection {
    /// Directional light; covers a square of `half_extent` world units
    Orthographic { half_extent: f32, near: f32, far: f32 },
    /// Spot-style light with a square frustum
    Perspective { fov_y: f32, near: f32, far: f32 },
}

/// Where the light sits and looks
#[derive(Debug, Clone, Copy)]
pub enum ShadowCamera {
    /// Directly above the origin, looking straight down
    StraightDown { height: f32 },
    /// Free position and direction
    CustomDirection { position: Vec3, direction: Vec3 },
    /// Positioned freely, always aimed at the world origin
    LookAtOrigin { position: Vec3 },
}

/// World-to-light-clip matrix for one light configuration
///
/// The shadow map is square, so the perspective aspect ratio is 1.
pub fn light_space_matrix(projection: &ShadowProjection, camera: &ShadowCamera) -> Mat4 {
    projection_matrix(projection) * view_matrix(camera)
}

fn view_matrix(camera: &ShadowCamera) -> Mat4 {
    let (position, direction) = match camera {
        ShadowCamera::StraightDown { height } => (Vec3::new(0.0, *height, 0.0), Vec3::NEG_Y),
        ShadowCamera::CustomDirection { position, direction } => {
            let direction = direction.normalize_or_zero();
            if direction == Vec3::ZERO {
                (*position, Vec3::NEG_Y)
            } else {
                (*position, direction)
            }
        }
        ShadowCamera::LookAtOrigin { position } => {
            let direction = (-*position).normalize_or_zero();
            if direction == Vec3::ZERO {
                // Light sits at the origin; any direction works.
                (*position, Vec3::NEG_Y)
            } else {
                (*position, direction)
            }
        }
    };

    // A near-vertical light direction is parallel to the Y axis; switch
    // the up vector to Z to keep the basis well-formed.
    let up = if direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    Mat4::look_to_rh(position, direction, up)
}

fn projection_matrix(projection: &ShadowProjection) -> Mat4 {
    match projection {
        ShadowProjection::Orthographic { half_extent, near, far } => Mat4::orthographic_rh(
            -half_extent,
            *half_extent,
            -half_extent,
            *half_extent,
            *near,
            *far,
        ),
        ShadowProjection::Perspective { fov_y, near, far } => {
            Mat4::perspective_rh(*fov_y, 1.0, *near, *far)
        }
    }
}

// ===== TESTS =====
