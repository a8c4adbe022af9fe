#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use backdrop_core::{BackdropError, CompositorConfig, TextureUnits};
    use backdrop_runtime::{DisplayTransform, TexturePair};
    use backdrop_runtime_glow::testing::{
        FakeProgram, FakeTexture, GlCall, ObservedState, RecordingContext,
    };
    use backdrop_runtime_glow::{CompositeOutcome, FrameCompositor, QUAD_POSITIONS, QUAD_TEX_COORDS};

    fn build(gl: &RecordingContext) -> FrameCompositor<RecordingContext> {
        unsafe { FrameCompositor::new(gl, CompositorConfig::default()) }.expect("compositor")
    }

    fn rotation(i: usize) -> DisplayTransform {
        let (s, c) = (i as f32 * 0.1).sin_cos();
        DisplayTransform([c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0])
    }

    /// State idempotence: N composites leave the context exactly as the host left it, after
    /// each call and not only at the end.
    #[test]
    fn repeated_composites_leave_host_state_unchanged() {
        let gl = RecordingContext::new();
        gl.seed_host_bindings();
        let c = build(&gl);
        let before = gl.observed();

        for i in 0..64 {
            let pair = TexturePair::new(gl.create_texture(), gl.create_texture());
            let out = unsafe { c.composite(&gl, pair, &rotation(i)) };
            assert_eq!(out, CompositeOutcome::Drawn);
            assert_eq!(gl.observed(), before, "state drifted after frame {i}");
        }
        assert_eq!(gl.draws().len(), 64);
        assert!(gl.errors().is_empty(), "{:?}", gl.errors());
    }

    #[test]
    fn interleaved_skipped_and_drawn_frames_stay_idempotent() {
        let gl = RecordingContext::new();
        gl.seed_host_bindings();
        let c = build(&gl);
        let before = gl.observed();
        let y = gl.create_texture();
        let uv = gl.create_texture();

        for i in 0..20 {
            let pair = if i % 3 == 0 {
                TexturePair { y: Some(y), uv: None }
            } else {
                TexturePair::new(y, uv)
            };
            unsafe { c.composite(&gl, pair, &DisplayTransform::IDENTITY) };
            assert_eq!(gl.observed(), before);
        }
        assert_eq!(gl.draws().len(), 13);
    }

    /// No-op on missing texture: not one GL call, query or mutation.
    #[test]
    fn missing_textures_issue_zero_calls() {
        let gl = RecordingContext::new();
        gl.seed_host_bindings();
        let c = build(&gl);
        let before = gl.observed();
        gl.take_calls();

        let out = unsafe { c.composite(&gl, TexturePair::none(), &DisplayTransform::IDENTITY) };

        assert_eq!(out, CompositeOutcome::Skipped);
        assert!(gl.take_calls().is_empty());
        assert_eq!(gl.observed(), before);
    }

    /// Fixed binding units, whatever the host had bound or active beforehand.
    #[test]
    fn planes_are_at_units_five_and_six_during_the_draw_for_any_prior_state() {
        let gl = RecordingContext::new();
        let c = build(&gl);
        let junk: Vec<FakeTexture> = (0..8).map(|_| gl.create_texture()).collect();

        let priors = [
            ObservedState::default(),
            ObservedState {
                active_texture: glow::TEXTURE0 + 6,
                unit_textures: BTreeMap::from([(5, junk[0]), (6, junk[1])]),
                unpack_alignment: 8,
                enabled: BTreeSet::from([glow::DEPTH_TEST]),
                ..ObservedState::default()
            },
            ObservedState {
                active_texture: glow::TEXTURE0 + 5,
                unit_textures: (0..8).map(|u| (u, junk[u as usize])).collect(),
                ..ObservedState::default()
            },
        ];

        for prior in priors {
            gl.set_state(prior.clone());
            let y = gl.create_texture();
            let uv = gl.create_texture();
            unsafe { c.composite(&gl, TexturePair::new(y, uv), &DisplayTransform::IDENTITY) };

            let draws = gl.draws();
            let d = draws.last().expect("drawn");
            assert_eq!(d.state.texture_at(5), Some(y));
            assert_eq!(d.state.texture_at(6), Some(uv));
            assert_eq!(d.state.unpack_alignment, 1);
            assert!(!d.state.enabled.contains(&glow::DEPTH_TEST));
            assert_eq!(gl.observed(), prior);
        }
    }

    /// Restore order: unit 6, then unit 5, each re-activated before its rebind, and the host's
    /// active unit last.
    #[test]
    fn restore_rebinds_units_before_restoring_active_unit() {
        let gl = RecordingContext::new();
        let host = gl.seed_host_bindings();
        let c = build(&gl);
        let (y, uv) = (gl.create_texture(), gl.create_texture());
        gl.take_calls();

        unsafe { c.composite(&gl, TexturePair::new(y, uv), &DisplayTransform::IDENTITY) };

        let calls = gl.take_calls();
        let draw_at = calls
            .iter()
            .position(|c| matches!(c, GlCall::DrawArrays { .. }))
            .expect("draw issued");
        let tail: Vec<&GlCall> = calls[draw_at + 1..]
            .iter()
            .filter(|c| matches!(c, GlCall::ActiveTexture(_) | GlCall::BindTexture(..)))
            .collect();
        assert_eq!(
            tail,
            vec![
                &GlCall::ActiveTexture(glow::TEXTURE0 + 6),
                &GlCall::BindTexture(glow::TEXTURE_2D, host.texture_at_6),
                &GlCall::ActiveTexture(glow::TEXTURE0 + 5),
                &GlCall::BindTexture(glow::TEXTURE_2D, host.texture_at_5),
                &GlCall::ActiveTexture(glow::TEXTURE0 + 2),
            ]
        );
    }

    #[test]
    fn custom_units_are_honoured() {
        let gl = RecordingContext::new();
        gl.seed_host_bindings();
        let config = CompositorConfig {
            units: TextureUnits {
                luma: 9,
                chroma: 7,
                ..TextureUnits::default()
            },
            ..CompositorConfig::default()
        };
        let c = unsafe { FrameCompositor::new(&gl, config) }.expect("compositor");
        let before = gl.observed();
        let (y, uv) = (gl.create_texture(), gl.create_texture());

        unsafe { c.composite(&gl, TexturePair::new(y, uv), &DisplayTransform::IDENTITY) };

        let d = gl.draws().pop().expect("drawn");
        assert_eq!(d.state.texture_at(9), Some(y));
        assert_eq!(d.state.texture_at(7), Some(uv));
        assert_eq!(gl.observed(), before);
    }

    /// Geometry invariance: identical bytes from independent builds on differently-primed contexts.
    #[test]
    fn quad_geometry_is_bit_identical_across_builds() {
        let fresh = RecordingContext::new();
        let busy = RecordingContext::new();
        busy.seed_host_bindings();

        let a = build(&fresh);
        let b = build(&busy);

        let (a_pos, a_uv) = a.quad().buffers();
        let (b_pos, b_uv) = b.quad().buffers();
        let a_pos = fresh.buffer_data(a_pos).expect("a positions").0;
        let a_uv = fresh.buffer_data(a_uv).expect("a tex coords").0;
        assert_eq!(Some(a_pos.clone()), busy.buffer_data(b_pos).map(|d| d.0));
        assert_eq!(Some(a_uv.clone()), busy.buffer_data(b_uv).map(|d| d.0));
        assert_eq!(a_pos.as_slice(), bytemuck::cast_slice::<f32, u8>(&QUAD_POSITIONS));
        assert_eq!(a_uv.as_slice(), bytemuck::cast_slice::<f32, u8>(&QUAD_TEX_COORDS));
    }

    #[test]
    fn quad_build_leaves_host_vertex_bindings() {
        let gl = RecordingContext::new();
        let host = gl.seed_host_bindings();

        let _c = build(&gl);

        let after = gl.observed();
        assert_eq!(after.vertex_array, Some(host.vertex_array));
        assert_eq!(after.array_buffer, Some(host.array_buffer));
    }

    fn assert_failed_build_keeps_host_program(
        prepare: impl Fn(&RecordingContext),
        check: impl Fn(&BackdropError) -> bool,
    ) {
        let gl = RecordingContext::new();
        let host = gl.seed_host_bindings();
        prepare(&gl);

        let err = unsafe { FrameCompositor::new(&gl, CompositorConfig::default()) }
            .expect_err("build must fail");
        assert!(check(&err), "unexpected error: {err:?}");
        assert!(err.is_build_failure());
        assert_eq!(gl.observed().program, Some::<FakeProgram>(host.program));
        let live = gl.live_objects();
        // Only the host's own objects remain.
        assert_eq!((live.shaders, live.programs), (0, 1));
        assert!(gl.draws().is_empty());
    }

    #[test]
    fn build_failures_surface_matching_error_and_keep_host_program() {
        assert_failed_build_keeps_host_program(
            |gl| gl.fail_next_compile(glow::VERTEX_SHADER),
            |e| matches!(e, BackdropError::VertexCompile(log) if !log.is_empty()),
        );
        assert_failed_build_keeps_host_program(
            |gl| gl.fail_next_compile(glow::FRAGMENT_SHADER),
            |e| matches!(e, BackdropError::FragmentCompile(log) if !log.is_empty()),
        );
        assert_failed_build_keeps_host_program(
            |gl| gl.fail_next_link(),
            |e| matches!(e, BackdropError::Link(log) if log.contains("link")),
        );
        assert_failed_build_keeps_host_program(
            |gl| gl.hide_uniform("uv_texture"),
            |e| matches!(e, BackdropError::MissingUniform(n) if n == "uv_texture"),
        );
        assert_failed_build_keeps_host_program(
            |gl| gl.hide_attrib("a_texCoord"),
            |e| matches!(e, BackdropError::MissingAttribute(n) if n == "a_texCoord"),
        );
        assert_failed_build_keeps_host_program(
            |gl| gl.set_max_texture_units(4),
            |e| matches!(e, BackdropError::TextureUnitUnavailable { unit: 5, max: 4 }),
        );
    }
}
