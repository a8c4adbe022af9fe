use std::fmt;

use backdrop_core::{BackdropError, CompositorConfig};
use backdrop_runtime::{
    sync_camera, CameraFrame, CameraSync, DisplayTransform, ManualPoseTarget, PoseError,
    TexturePair,
};
use tracing::{debug, trace, warn};

use crate::context::GpuContext;
use crate::program::YuvProgram;
use crate::quad::QuadVertexState;
use crate::state::StateGuard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOutcome {
    Drawn,
    /// No complete texture pair this tick; the context was not touched.
    Skipped,
}

/// Result of one `render` tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub outcome: CompositeOutcome,
    pub camera: Result<CameraSync, PoseError>,
}

/// Draws the camera planes as a full-screen backdrop into a context shared with a host renderer.
pub struct FrameCompositor<C: GpuContext> {
    program: YuvProgram<C>,
    quad: QuadVertexState<C>,
    config: CompositorConfig,
}

impl<C: GpuContext> fmt::Debug for FrameCompositor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("program", &self.program)
            .field("quad", &self.quad)
            .field("config", &self.config)
            .finish()
    }
}

impl<C: GpuContext> FrameCompositor<C> {
    /// Build the program and quad. On error nothing is left allocated.
    pub unsafe fn new(gl: &C, config: CompositorConfig) -> Result<Self, BackdropError> {
        let program = YuvProgram::build(gl, &config)?;
        let quad = match QuadVertexState::build(gl, &program) {
            Ok(q) => q,
            Err(e) => {
                program.destroy(gl);
                return Err(e);
            }
        };
        debug!(vao = ?quad.vertex_array(), "frame compositor ready");
        Ok(Self {
            program,
            quad,
            config,
        })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn program(&self) -> &YuvProgram<C> {
        &self.program
    }

    pub fn quad(&self) -> &QuadVertexState<C> {
        &self.quad
    }

    /// Draw one frame's planes.
    ///
    /// An incomplete pair returns `Skipped` without issuing a single GL call. Otherwise every
    /// binding the draw changes is restored before returning, including on unwind.
    pub unsafe fn composite(
        &self,
        gl: &C,
        textures: TexturePair<C::Texture>,
        transform: &DisplayTransform,
    ) -> CompositeOutcome {
        let Some((luma, chroma)) = textures.complete() else {
            trace!("no camera textures this tick");
            return CompositeOutcome::Skipped;
        };

        let units = self.program.units();
        let _restore = StateGuard::capture(gl, [units.luma, units.chroma]);

        gl.disable(glow::DEPTH_TEST);
        gl.use_program(Some(self.program.program()));
        gl.bind_vertex_array(Some(self.quad.vertex_array()));
        gl.uniform_matrix_3_f32_slice(
            Some(self.program.display_transform_location()),
            false,
            transform.as_slice(),
        );
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);

        gl.active_texture(glow::TEXTURE0 + units.luma);
        gl.bind_texture(glow::TEXTURE_2D, Some(luma));
        gl.active_texture(glow::TEXTURE0 + units.chroma);
        gl.bind_texture(glow::TEXTURE_2D, Some(chroma));

        self.quad.draw(gl);
        trace!(?luma, ?chroma, "camera backdrop drawn");
        CompositeOutcome::Drawn
    }

    /// Camera sync followed by composite. A rejected pose leaves `camera` as it was; the
    /// backdrop is still drawn.
    pub unsafe fn render<F, T>(&self, gl: &C, frame: &F, camera: &mut T) -> RenderReport
    where
        F: CameraFrame<Texture = C::Texture> + ?Sized,
        T: ManualPoseTarget + ?Sized,
    {
        let sync = sync_camera(frame.camera(), camera, self.config.clip);
        if let Err(e) = &sync {
            warn!(error = %e, "camera pose rejected; keeping previous matrices");
        }
        let outcome = self.composite(gl, frame.camera_textures(), &frame.display_transform());
        RenderReport {
            outcome,
            camera: sync,
        }
    }

    /// Delete the program, both vertex buffers and the VAO.
    pub unsafe fn destroy(self, gl: &C) {
        self.quad.destroy(gl);
        self.program.destroy(gl);
        debug!("frame compositor destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GlCall, RecordingContext, UniformValue};
    use backdrop_runtime::{FrameData, PerspectivePose, SceneCamera};
    use glam::{Mat4, Vec3};

    fn compositor(gl: &RecordingContext) -> FrameCompositor<RecordingContext> {
        unsafe { FrameCompositor::new(gl, CompositorConfig::default()) }.expect("compositor")
    }

    #[test]
    fn composite_binds_planes_at_fixed_units_and_restores_host_state() {
        let gl = RecordingContext::new();
        gl.seed_host_bindings();
        let c = compositor(&gl);
        let before = gl.observed();
        let (y, uv) = (gl.create_texture(), gl.create_texture());

        let out = unsafe { c.composite(&gl, TexturePair::new(y, uv), &DisplayTransform::IDENTITY) };

        assert_eq!(out, CompositeOutcome::Drawn);
        let draws = gl.draws();
        assert_eq!(draws.len(), 1);
        let d = &draws[0];
        assert_eq!((d.mode, d.first, d.count), (glow::TRIANGLE_STRIP, 0, 4));
        assert_eq!(d.state.texture_at(5), Some(y));
        assert_eq!(d.state.texture_at(6), Some(uv));
        assert_eq!(d.state.program, Some(c.program().program()));
        assert_eq!(d.state.vertex_array, Some(c.quad().vertex_array()));
        assert_eq!(d.state.unpack_alignment, 1);
        assert!(!d.state.enabled.contains(&glow::DEPTH_TEST));
        assert_eq!(
            d.uniforms.get("displayTransform"),
            Some(&UniformValue::Mat3 {
                transpose: false,
                values: DisplayTransform::IDENTITY.0.to_vec()
            })
        );

        assert_eq!(gl.observed(), before);
        assert!(gl.errors().is_empty(), "{:?}", gl.errors());
    }

    #[test]
    fn incomplete_pair_issues_no_calls() {
        let gl = RecordingContext::new();
        gl.seed_host_bindings();
        let c = compositor(&gl);
        let t = gl.create_texture();
        gl.take_calls();

        for pair in [
            TexturePair::none(),
            TexturePair { y: Some(t), uv: None },
            TexturePair { y: None, uv: Some(t) },
        ] {
            let out = unsafe { c.composite(&gl, pair, &DisplayTransform::IDENTITY) };
            assert_eq!(out, CompositeOutcome::Skipped);
        }
        assert_eq!(gl.take_calls(), Vec::<GlCall>::new());
        assert!(gl.draws().is_empty());
    }

    #[test]
    fn render_syncs_camera_then_draws() {
        let gl = RecordingContext::new();
        let c = compositor(&gl);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 1.5, 3.0), Vec3::ZERO, Vec3::Y);
        let frame = FrameData::new(TexturePair::new(gl.create_texture(), gl.create_texture()))
            .with_pose(PerspectivePose::new(view, 1.0, 16.0 / 9.0));
        let mut camera = SceneCamera::default();

        let report = unsafe { c.render(&gl, &frame, &mut camera) };

        assert_eq!(report.outcome, CompositeOutcome::Drawn);
        assert_eq!(report.camera, Ok(CameraSync::Updated));
        assert!(!camera.matrix_auto_update);
        assert_eq!(camera.matrix_world_inverse, view);
        assert!(camera.matrix_world.abs_diff_eq(view.inverse(), 1e-5));
    }

    #[test]
    fn singular_pose_is_reported_and_backdrop_still_drawn() {
        let gl = RecordingContext::new();
        let c = compositor(&gl);
        let frame = FrameData::new(TexturePair::new(gl.create_texture(), gl.create_texture()))
            .with_pose(PerspectivePose::new(Mat4::ZERO, 1.0, 1.0));
        let mut camera = SceneCamera::default();

        let report = unsafe { c.render(&gl, &frame, &mut camera) };

        assert_eq!(report.outcome, CompositeOutcome::Drawn);
        assert_eq!(report.camera, Err(PoseError::SingularView));
        assert_eq!(camera, SceneCamera::default());
    }

    #[test]
    fn destroy_releases_all_objects() {
        let gl = RecordingContext::new();
        let c = compositor(&gl);
        assert_eq!(gl.live_objects().programs, 1);
        unsafe { c.destroy(&gl) };
        let live = gl.live_objects();
        assert_eq!((live.programs, live.buffers, live.vertex_arrays), (0, 0, 0));
    }

    #[test]
    fn quad_failure_releases_program() {
        let gl = RecordingContext::new();
        gl.fail_vertex_array_creation();
        let err = unsafe { FrameCompositor::new(&gl, CompositorConfig::default()) }
            .expect_err("no VAO");
        assert!(matches!(err, BackdropError::GlCreate(_)));
        assert_eq!(gl.live_objects().programs, 0);
    }
}
