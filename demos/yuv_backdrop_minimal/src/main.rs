use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context as _};
use glam::{Mat4, Vec3};
use glow::HasContext;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{
    ContextAttributesBuilder, NotCurrentGlContextSurfaceAccessor, PossiblyCurrentContext,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::{GlConfig, GlDisplay, GlSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasRawWindowHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::ControlFlow;

use backdrop_core::{load_config_from, CompositorConfig};
use backdrop_host::BackdropView;
use backdrop_runtime::{
    DisplayTransform, EventHub, FrameData, PerspectivePose, SceneCamera, TexturePair, Theme,
};

const WIN_W: u32 = 960;
const WIN_H: u32 = 540;

// Synthetic camera resolution; chroma is subsampled 2x2.
const CAM_W: i32 = 640;
const CAM_H: i32 = 480;

fn make_gl(
    event_loop: &winit::event_loop::EventLoop<()>,
) -> anyhow::Result<(
    winit::window::Window,
    glutin::surface::Surface<glutin::surface::WindowSurface>,
    PossiblyCurrentContext,
    glow::Context,
)> {
    let template =
        ConfigTemplateBuilder::new().with_alpha_size(8).with_depth_size(24).with_stencil_size(0);

    let display_builder = DisplayBuilder::new().with_window_builder(Some(
        winit::window::WindowBuilder::new()
            .with_title("backdrop: yuv_backdrop_minimal")
            .with_inner_size(PhysicalSize::new(WIN_W, WIN_H)),
    ));

    let (window, gl_config) = display_builder
        .build(event_loop, template, |configs| {
            configs
                .reduce(|a, b| if a.num_samples() > b.num_samples() { a } else { b })
                .expect("display offered no GL configs")
        })
        .map_err(|e| anyhow!("display build failed: {e}"))?;

    let window = window.context("no window created")?;
    let raw_window_handle = window.raw_window_handle();

    let gl_display = gl_config.display();

    let context_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));
    let not_current_gl_context = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
        .map_err(|e| anyhow!("create_context failed: {e}"))?;

    let size = window.inner_size();
    let attrs = glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new()
        .build(raw_window_handle, non_zero(size.width), non_zero(size.height));

    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
        .map_err(|e| anyhow!("create_window_surface failed: {e}"))?;

    let gl_context = not_current_gl_context
        .make_current(&gl_surface)
        .map_err(|e| anyhow!("make_current failed: {e}"))?;

    let gl = unsafe {
        glow::Context::from_loader_function(|s| {
            gl_display.get_proc_address(std::ffi::CStr::from_bytes_with_nul_unchecked(
                format!("{s}\0").as_bytes(),
            )) as *const _
        })
    };

    Ok((window, gl_surface, gl_context, gl))
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v.max(1)).unwrap_or(NonZeroU32::MIN)
}

/// Empty plane texture, sampled linearly with clamped edges.
unsafe fn make_plane_texture(
    gl: &glow::Context,
    internal: u32,
    format: u32,
    w: i32,
    h: i32,
) -> anyhow::Result<glow::NativeTexture> {
    let tex = gl.create_texture().map_err(anyhow::Error::msg)?;
    gl.bind_texture(glow::TEXTURE_2D, Some(tex));
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
    gl.tex_image_2d(
        glow::TEXTURE_2D,
        0,
        internal as i32,
        w,
        h,
        0,
        format,
        glow::UNSIGNED_BYTE,
        None,
    );
    Ok(tex)
}

unsafe fn upload_plane(
    gl: &glow::Context,
    tex: glow::NativeTexture,
    format: u32,
    w: i32,
    h: i32,
    bytes: &[u8],
) {
    gl.bind_texture(glow::TEXTURE_2D, Some(tex));
    gl.tex_sub_image_2d(
        glow::TEXTURE_2D,
        0,
        0,
        0,
        w,
        h,
        format,
        glow::UNSIGNED_BYTE,
        glow::PixelUnpackData::Slice(bytes),
    );
}

/// Stand-in for a camera: a luma ramp that scrolls with time and a chroma field that rotates
/// through hues. Chroma texels carry U in `.r` and V in `.a`.
struct SyntheticCamera {
    luma: Vec<u8>,
    chroma: Vec<u8>,
}

impl SyntheticCamera {
    fn new() -> Self {
        Self {
            luma: vec![0; (CAM_W * CAM_H) as usize],
            chroma: vec![0; ((CAM_W / 2) * (CAM_H / 2) * 4) as usize],
        }
    }

    fn fill(&mut self, t: f32) {
        for y in 0..CAM_H {
            for x in 0..CAM_W {
                let ramp = ((x as f32 / CAM_W as f32) + t * 0.1).fract();
                let band = if (y / 40) % 2 == 0 { 1.0 } else { 0.8 };
                self.luma[(y * CAM_W + x) as usize] = (ramp * band * 255.0) as u8;
            }
        }

        let (cw, ch) = (CAM_W / 2, CAM_H / 2);
        for y in 0..ch {
            for x in 0..cw {
                let a = t + (x as f32 / cw as f32) * std::f32::consts::TAU;
                let r = y as f32 / ch as f32 * 0.5;
                let u = 0.5 + r * a.cos();
                let v = 0.5 + r * a.sin();
                let i = ((y * cw + x) * 4) as usize;
                self.chroma[i] = (u * 255.0) as u8;
                self.chroma[i + 1] = 0;
                self.chroma[i + 2] = 0;
                self.chroma[i + 3] = (v * 255.0) as u8;
            }
        }
    }
}

fn load_config() -> anyhow::Result<CompositorConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            let cfg = load_config_from(&path)
                .with_context(|| format!("loading config {}", path.display()))?;
            info!(path = %path.display(), "config loaded");
            Ok(cfg)
        }
        None => Ok(CompositorConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config()?;

    let event_loop = winit::event_loop::EventLoop::new();
    let (window, gl_surface, gl_context, gl) = make_gl(&event_loop)?;

    let (y_tex, uv_tex) = unsafe {
        // Plane rows are tightly packed.
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        (
            make_plane_texture(&gl, glow::R8, glow::RED, CAM_W, CAM_H)?,
            make_plane_texture(&gl, glow::RGBA8, glow::RGBA, CAM_W / 2, CAM_H / 2)?,
        )
    };

    let themes = EventHub::new();
    let mut theme = Theme::Light;
    let mut view = Some(unsafe { BackdropView::attach(&gl, &themes, theme, config) });
    if let Some(err) = view.as_ref().and_then(|v| v.build_error()) {
        warn!(error = %err, "rendering disabled; window will stay blank");
    }

    let mut synth = SyntheticCamera::new();
    let mut camera = SceneCamera::default();
    let t0 = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    if let Some(v) = view.take() {
                        unsafe {
                            v.detach(&gl);
                            gl.delete_texture(y_tex);
                            gl.delete_texture(uv_tex);
                        }
                    }
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    gl_surface.resize(&gl_context, non_zero(size.width), non_zero(size.height));
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::T),
                            ..
                        },
                    ..
                } => {
                    theme = match theme {
                        Theme::Light => Theme::Dark,
                        Theme::Dark => Theme::Light,
                    };
                    themes.emit(&theme);
                }
                _ => {}
            },
            Event::MainEventsCleared => window.request_redraw(),
            Event::RedrawRequested(_) => {
                let Some(view) = view.as_ref() else {
                    return;
                };
                let t = t0.elapsed().as_secs_f32();
                synth.fill(t);

                let size = window.inner_size();
                let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
                let eye = Vec3::new(3.0 * (t * 0.3).cos(), 1.2, 3.0 * (t * 0.3).sin());
                let pose = PerspectivePose::new(
                    Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y),
                    60f32.to_radians(),
                    aspect,
                );
                let frame = FrameData::new(TexturePair::new(y_tex, uv_tex))
                    .with_display_transform(DisplayTransform::IDENTITY)
                    .with_pose(pose);

                unsafe {
                    upload_plane(&gl, y_tex, glow::RED, CAM_W, CAM_H, &synth.luma);
                    upload_plane(&gl, uv_tex, glow::RGBA, CAM_W / 2, CAM_H / 2, &synth.chroma);

                    gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                    gl.viewport(0, 0, size.width as i32, size.height as i32);
                    let bg = if view.theme() == Theme::Dark { 0.05 } else { 0.9 };
                    gl.clear_color(bg, bg, bg, 1.0);
                    gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

                    if let Some(report) = view.render(&gl, &frame, &mut camera) {
                        debug!(outcome = ?report.outcome, camera = ?report.camera, "tick");
                    }

                    if let Err(e) = gl_surface.swap_buffers(&gl_context) {
                        warn!(error = %e, "swap_buffers failed");
                    }
                }
            }
            _ => {}
        }
    });
}
