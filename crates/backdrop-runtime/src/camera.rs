//! Driving a host scene camera from an externally tracked pose.
//!
//! The pose source owns the camera: the scene camera must not re-derive its matrices from its
//! own transform hierarchy, so `sync_camera` switches automatic updates off before writing.

use backdrop_core::ClipPlanes;
use glam::{DMat4, Mat4};
use thiserror::Error;
use tracing::trace;

use crate::frame::PoseSource;

/// Capability of a scene camera whose matrices can be written directly.
pub trait ManualPoseTarget {
    /// Enable/disable recomputing matrices from the scene-graph transform.
    fn set_matrix_auto_update(&mut self, enabled: bool);

    /// Set world→camera and its inverse camera→world.
    fn set_view_matrix(&mut self, world_to_camera: Mat4, camera_to_world: Mat4);

    /// Set the projection and its inverse.
    fn set_projection_matrix(&mut self, projection: Mat4, inverse: Mat4);
}

/// Plain camera state, for hosts without their own camera type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    pub matrix_auto_update: bool,
    /// World → camera (view).
    pub matrix_world_inverse: Mat4,
    /// Camera → world.
    pub matrix_world: Mat4,
    pub projection: Mat4,
    pub projection_inverse: Mat4,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            matrix_auto_update: true,
            matrix_world_inverse: Mat4::IDENTITY,
            matrix_world: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            projection_inverse: Mat4::IDENTITY,
        }
    }
}

impl ManualPoseTarget for SceneCamera {
    fn set_matrix_auto_update(&mut self, enabled: bool) {
        self.matrix_auto_update = enabled;
    }

    fn set_view_matrix(&mut self, world_to_camera: Mat4, camera_to_world: Mat4) {
        self.matrix_world_inverse = world_to_camera;
        self.matrix_world = camera_to_world;
    }

    fn set_projection_matrix(&mut self, projection: Mat4, inverse: Mat4) {
        self.projection = projection;
        self.projection_inverse = inverse;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoseError {
    #[error("{0} matrix contains non-finite values")]
    NonFinite(&'static str),

    #[error("view matrix is not invertible")]
    SingularView,

    #[error("projection matrix is not invertible")]
    SingularProjection,
}

/// What `sync_camera` did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraSync {
    /// Matrices were written from the pose source.
    Updated,
    /// No pose this tick; the camera keeps its previous matrices.
    NoPose,
}

/// Inverse computed in f64. `None` for singular or non-finite results.
///
/// Invertibility is judged by the round trip `m * m⁻¹ ≈ I`, so uniformly tiny or huge matrices
/// are accepted as long as they are well conditioned.
fn invert(m: Mat4) -> Option<Mat4> {
    let d = m.as_dmat4();
    let det = d.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let inv: DMat4 = d.inverse();
    if !inv.is_finite() || !(d * inv).abs_diff_eq(DMat4::IDENTITY, 1e-6) {
        return None;
    }
    let out = inv.as_mat4();
    out.is_finite().then_some(out)
}

/// Copy the pose (view + projection for `clip`) into `target`.
///
/// Both matrices are validated before anything is written, so a rejected pose leaves the
/// camera exactly as it was.
pub fn sync_camera<P, T>(
    pose: Option<&P>,
    target: &mut T,
    clip: ClipPlanes,
) -> Result<CameraSync, PoseError>
where
    P: PoseSource + ?Sized,
    T: ManualPoseTarget + ?Sized,
{
    let Some(pose) = pose else {
        trace!("no pose this tick");
        return Ok(CameraSync::NoPose);
    };

    let view = Mat4::from_cols_array(&pose.view_matrix());
    if !view.is_finite() {
        return Err(PoseError::NonFinite("view"));
    }
    let camera_to_world = invert(view).ok_or(PoseError::SingularView)?;

    let projection = Mat4::from_cols_array(&pose.projection_matrix(clip.near, clip.far));
    if !projection.is_finite() {
        return Err(PoseError::NonFinite("projection"));
    }
    let projection_inverse = invert(projection).ok_or(PoseError::SingularProjection)?;

    target.set_matrix_auto_update(false);
    target.set_view_matrix(view, camera_to_world);
    target.set_projection_matrix(projection, projection_inverse);
    Ok(CameraSync::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PerspectivePose;
    use glam::{Quat, Vec3};

    struct FixedPose {
        view: [f32; 16],
        proj: [f32; 16],
    }

    impl PoseSource for FixedPose {
        fn view_matrix(&self) -> [f32; 16] {
            self.view
        }
        fn projection_matrix(&self, _near: f32, _far: f32) -> [f32; 16] {
            self.proj
        }
    }

    #[test]
    fn camera_to_world_is_inverse_of_view() {
        let view = Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.7),
            Vec3::new(0.3, -1.2, 4.0),
        );
        let pose = PerspectivePose::new(view, 1.0, 16.0 / 9.0);
        let mut cam = SceneCamera::default();

        let r = sync_camera(Some(&pose), &mut cam, ClipPlanes::default()).expect("sync");
        assert_eq!(r, CameraSync::Updated);
        assert!(!cam.matrix_auto_update);
        assert_eq!(cam.matrix_world_inverse, view);
        assert!(cam.matrix_world.abs_diff_eq(view.inverse(), 1e-5));
        assert!((cam.matrix_world * view).abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn projection_inverse_composes_to_identity() {
        let pose = PerspectivePose::new(Mat4::IDENTITY, 1.2, 0.75);
        let mut cam = SceneCamera::default();
        sync_camera(Some(&pose), &mut cam, ClipPlanes::default()).expect("sync");

        let expected = Mat4::perspective_rh_gl(1.2, 0.75, 0.001, 1000.0);
        assert_eq!(cam.projection, expected);
        assert!((cam.projection_inverse * cam.projection).abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }

    #[test]
    fn no_pose_leaves_camera_untouched() {
        let mut cam = SceneCamera {
            matrix_world: Mat4::from_scale(Vec3::splat(2.0)),
            ..SceneCamera::default()
        };
        let before = cam;
        let r = sync_camera::<PerspectivePose, _>(None, &mut cam, ClipPlanes::default())
            .expect("no pose is fine");
        assert_eq!(r, CameraSync::NoPose);
        assert_eq!(cam, before);
    }

    #[test]
    fn singular_view_is_rejected_without_partial_writes() {
        let pose = FixedPose {
            view: Mat4::ZERO.to_cols_array(),
            proj: Mat4::IDENTITY.to_cols_array(),
        };
        let mut cam = SceneCamera::default();
        let before = cam;
        assert_eq!(
            sync_camera(Some(&pose), &mut cam, ClipPlanes::default()),
            Err(PoseError::SingularView)
        );
        assert_eq!(cam, before);
    }

    #[test]
    fn small_uniform_scale_view_is_still_invertible() {
        let view = Mat4::from_scale(Vec3::splat(2e-4))
            * Mat4::from_rotation_translation(Quat::from_rotation_x(0.3), Vec3::new(1.0, 2.0, 3.0));
        let pose = FixedPose {
            view: view.to_cols_array(),
            proj: Mat4::perspective_rh_gl(1.0, 1.0, 0.001, 1000.0).to_cols_array(),
        };
        let mut cam = SceneCamera::default();

        let r = sync_camera(Some(&pose), &mut cam, ClipPlanes::default()).expect("well conditioned");
        assert_eq!(r, CameraSync::Updated);
        assert!((cam.matrix_world * view).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn rank_deficient_view_is_singular() {
        let pose = FixedPose {
            view: Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).to_cols_array(),
            proj: Mat4::IDENTITY.to_cols_array(),
        };
        let mut cam = SceneCamera::default();
        assert_eq!(
            sync_camera(Some(&pose), &mut cam, ClipPlanes::default()),
            Err(PoseError::SingularView)
        );
    }

    #[test]
    fn non_finite_projection_is_rejected() {
        let mut proj = Mat4::IDENTITY.to_cols_array();
        proj[5] = f32::INFINITY;
        let pose = FixedPose {
            view: Mat4::IDENTITY.to_cols_array(),
            proj,
        };
        let mut cam = SceneCamera::default();
        assert_eq!(
            sync_camera(Some(&pose), &mut cam, ClipPlanes::default()),
            Err(PoseError::NonFinite("projection"))
        );
        assert!(cam.matrix_auto_update);
    }
}
