//! Host glue (policy layer).
//!
//! `BackdropView` is what a page/window embeds: it builds the compositor when attached, follows
//! the platform theme while attached, renders once per tick, and on detach releases every GPU
//! object and its theme subscription.
//! It stays separate so the runtime can remain embed-friendly.
#![allow(clippy::missing_safety_doc)]
#![deny(missing_debug_implementations)]

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use backdrop_core::{BackdropError, CompositorConfig};
use backdrop_runtime::{CameraFrame, EventHub, ManualPoseTarget, Subscription, Theme};
use backdrop_runtime_glow::{FrameCompositor, GpuContext, RenderReport};
use tracing::{debug, error};

/// A camera backdrop attached to a host view.
pub struct BackdropView<C: GpuContext> {
    compositor: Option<FrameCompositor<C>>,
    build_error: Option<BackdropError>,
    theme: Rc<Cell<Theme>>,
    theme_changes: Subscription,
}

impl<C: GpuContext> fmt::Debug for BackdropView<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackdropView")
            .field("compositor", &self.compositor)
            .field("build_error", &self.build_error)
            .field("theme", &self.theme.get())
            .field("theme_changes", &self.theme_changes)
            .finish()
    }
}

impl<C: GpuContext> BackdropView<C> {
    /// Build GPU resources and start following `themes`.
    ///
    /// A build failure is logged and kept in `build_error`; the view then never renders.
    pub unsafe fn attach(
        gl: &C,
        themes: &EventHub<Theme>,
        initial_theme: Theme,
        config: CompositorConfig,
    ) -> Self {
        let (compositor, build_error) = match FrameCompositor::new(gl, config) {
            Ok(c) => (Some(c), None),
            Err(e) => {
                error!(error = %e, "camera backdrop unavailable");
                (None, Some(e))
            }
        };

        let theme = Rc::new(Cell::new(initial_theme));
        let theme_changes = {
            let theme = Rc::clone(&theme);
            themes.subscribe(move |t: &Theme| {
                debug!(theme = ?t, "theme changed");
                theme.set(*t);
            })
        };

        debug!(ready = compositor.is_some(), theme = ?initial_theme, "backdrop view attached");
        Self {
            compositor,
            build_error,
            theme,
            theme_changes,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.compositor.is_some()
    }

    pub fn build_error(&self) -> Option<&BackdropError> {
        self.build_error.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn compositor(&self) -> Option<&FrameCompositor<C>> {
        self.compositor.as_ref()
    }

    /// One tick. `None` when the compositor failed to build.
    pub unsafe fn render<F, T>(&self, gl: &C, frame: &F, camera: &mut T) -> Option<RenderReport>
    where
        F: CameraFrame<Texture = C::Texture> + ?Sized,
        T: ManualPoseTarget + ?Sized,
    {
        let compositor = self.compositor.as_ref()?;
        Some(compositor.render(gl, frame, camera))
    }

    /// Release the program, buffers and VAO, then stop following theme changes.
    pub unsafe fn detach(self, gl: &C) {
        if let Some(c) = self.compositor {
            c.destroy(gl);
        }
        self.theme_changes.unsubscribe();
        debug!("backdrop view detached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_runtime::{FrameData, PerspectivePose, SceneCamera, TexturePair};
    use backdrop_runtime_glow::testing::RecordingContext;
    use backdrop_runtime_glow::CompositeOutcome;
    use glam::Mat4;

    #[test]
    fn attached_view_follows_theme_until_detached() {
        let gl = RecordingContext::new();
        let hub = EventHub::new();
        let view = unsafe { BackdropView::attach(&gl, &hub, Theme::Light, CompositorConfig::default()) };
        assert!(view.is_ready());
        assert_eq!(hub.listener_count(), 1);

        hub.emit(&Theme::Dark);
        assert_eq!(view.theme(), Theme::Dark);

        unsafe { view.detach(&gl) };
        assert_eq!(hub.listener_count(), 0);
        hub.emit(&Theme::Light);
    }

    #[test]
    fn detach_deletes_every_gpu_object() {
        let gl = RecordingContext::new();
        let hub = EventHub::new();
        let view = unsafe { BackdropView::attach(&gl, &hub, Theme::Dark, CompositorConfig::default()) };
        let live = gl.live_objects();
        assert_eq!((live.programs, live.buffers, live.vertex_arrays), (1, 2, 1));

        unsafe { view.detach(&gl) };
        let live = gl.live_objects();
        assert_eq!(
            (live.shaders, live.programs, live.buffers, live.vertex_arrays),
            (0, 0, 0, 0)
        );
    }

    #[test]
    fn failed_build_blocks_rendering() {
        let gl = RecordingContext::new();
        gl.fail_next_link();
        let hub = EventHub::new();
        let view = unsafe { BackdropView::attach(&gl, &hub, Theme::Light, CompositorConfig::default()) };
        assert!(!view.is_ready());
        assert!(matches!(view.build_error(), Some(BackdropError::Link(_))));

        let frame = FrameData::<_, PerspectivePose>::new(TexturePair::new(
            gl.create_texture(),
            gl.create_texture(),
        ));
        let mut camera = SceneCamera::default();
        gl.take_calls();
        assert!(unsafe { view.render(&gl, &frame, &mut camera) }.is_none());
        assert!(gl.take_calls().is_empty());
    }

    #[test]
    fn render_draws_and_syncs_camera() {
        let gl = RecordingContext::new();
        let hub = EventHub::new();
        let view = unsafe { BackdropView::attach(&gl, &hub, Theme::Light, CompositorConfig::default()) };
        let frame = FrameData::new(TexturePair::new(gl.create_texture(), gl.create_texture()))
            .with_pose(PerspectivePose::new(Mat4::from_translation(glam::Vec3::X), 1.2, 0.75));
        let mut camera = SceneCamera::default();

        let report = unsafe { view.render(&gl, &frame, &mut camera) }.expect("ready");
        assert_eq!(report.outcome, CompositeOutcome::Drawn);
        assert!(report.camera.is_ok());
        assert!(!camera.matrix_auto_update);
        unsafe { view.detach(&gl) };
    }
}
