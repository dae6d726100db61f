//! Camera rig: smoothed horizontal follow and the viewport rectangle the
//! world streamer keys its spawn bands off.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::constants::VIEWPORT_FALLBACK_HALF_WIDTH;
use crate::menu::GameState;
use crate::player::state::KnightFollower;

pub const CAMERA_START: Vec2 = Vec2::new(400.0, 300.0);

/// Horizontal extent of the camera viewport in world coordinates.
///
/// Recomputed every frame; the streamer reads it instead of querying the
/// camera directly so its systems stay camera-agnostic in tests.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ViewportRect {
    pub left: f32,
    pub right: f32,
}

impl Default for ViewportRect {
    fn default() -> Self {
        Self {
            left: CAMERA_START.x - VIEWPORT_FALLBACK_HALF_WIDTH,
            right: CAMERA_START.x + VIEWPORT_FALLBACK_HALF_WIDTH,
        }
    }
}

pub struct CameraRigPlugin;

impl Plugin for CameraRigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportRect>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (camera_follow_system, update_viewport_rect_system)
                    .chain()
                    .in_set(crate::TickSet::Camera)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_xyz(CAMERA_START.x, CAMERA_START.y, 999.9),
    ));
}

/// Lerp toward the target: `current + (target - current) * t`.
pub fn follow_lerp(current: f32, target: f32, t: f32) -> f32 {
    current + (target - current) * t
}

/// Chase the follow anchor horizontally, clamped so the viewport never shows
/// past the world edges.  Vertical position stays fixed.
pub fn camera_follow_system(
    config: Res<GameConfig>,
    q_follower: Query<&Transform, With<KnightFollower>>,
    mut q_camera: Query<&mut Transform, (With<Camera2d>, Without<KnightFollower>)>,
) {
    let Ok(target) = q_follower.single() else {
        return;
    };
    let Ok(mut camera) = q_camera.single_mut() else {
        return;
    };

    let half_width = VIEWPORT_FALLBACK_HALF_WIDTH;
    let x = follow_lerp(
        camera.translation.x,
        target.translation.x,
        config.camera_follow_lerp,
    );
    camera.translation.x = x.clamp(half_width, config.world_width - half_width);
}

/// Publish the camera's world-space horizontal extent.
///
/// Uses the orthographic projection's area when available, falling back to a
/// fixed half-width when the projection has not been computed yet.
pub fn update_viewport_rect_system(
    mut viewport: ResMut<ViewportRect>,
    q_camera: Query<(&Transform, Option<&Projection>), With<Camera2d>>,
) {
    let Ok((transform, projection)) = q_camera.single() else {
        return;
    };

    // The projection's area sits at its 2×2 default until the render pass
    // first computes it; treat that as "not yet available".
    let half_width = match projection {
        Some(Projection::Orthographic(ortho)) if ortho.area.width() > 2.0 => {
            ortho.area.width() / 2.0
        }
        _ => VIEWPORT_FALLBACK_HALF_WIDTH,
    };

    viewport.left = transform.translation.x - half_width;
    viewport.right = transform.translation.x + half_width;
}
