use std::fmt;

use backdrop_core::{BackdropError, CompositorConfig, TextureUnits};
use tracing::debug;

use crate::context::GpuContext;
use crate::shaders::{
    yuv_sources, ATTR_POSITION, ATTR_TEX_COORD, UNIFORM_DISPLAY_TRANSFORM, UNIFORM_UV_TEXTURE,
    UNIFORM_Y_TEXTURE,
};
use crate::state::ProgramGuard;

/// One shader stage, compiled. On failure the shader object is already deleted.
unsafe fn compile_stage<C: GpuContext>(
    gl: &C,
    stage: u32,
    src: &str,
) -> Result<C::Shader, BackdropError> {
    let shader = gl
        .create_shader(stage)
        .map_err(|e| BackdropError::GlCreate(format!("create_shader({stage:#x}) failed: {e:?}")))?;
    gl.shader_source(shader, src);
    gl.compile_shader(shader);
    if gl.get_shader_compile_status(shader) {
        return Ok(shader);
    }

    let log = gl.get_shader_info_log(shader);
    gl.delete_shader(shader);
    Err(if stage == glow::VERTEX_SHADER {
        BackdropError::VertexCompile(log)
    } else {
        BackdropError::FragmentCompile(log)
    })
}

/// Link both stages into a program. No shader object outlives this call.
unsafe fn link_stages<C: GpuContext>(
    gl: &C,
    vert_src: &str,
    frag_src: &str,
) -> Result<C::Program, BackdropError> {
    let vs = compile_stage(gl, glow::VERTEX_SHADER, vert_src)?;
    let fs = match compile_stage(gl, glow::FRAGMENT_SHADER, frag_src) {
        Ok(fs) => fs,
        Err(e) => {
            gl.delete_shader(vs);
            return Err(e);
        }
    };

    let linked = gl.create_program().map(|program| {
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        program
    });
    gl.delete_shader(vs);
    gl.delete_shader(fs);

    let program =
        linked.map_err(|e| BackdropError::GlCreate(format!("create_program failed: {e:?}")))?;
    if !gl.get_program_link_status(program) {
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        return Err(BackdropError::Link(log));
    }
    Ok(program)
}

/// The linked YUV → RGB program and its resolved locations.
///
/// Sampler uniforms are pointed at the configured units once, during `build`, and never
/// written again.
pub struct YuvProgram<C: GpuContext> {
    program: C::Program,
    position: u32,
    tex_coord: u32,
    display_transform: C::UniformLocation,
    units: TextureUnits,
}

impl<C: GpuContext> fmt::Debug for YuvProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YuvProgram")
            .field("program", &self.program)
            .field("position", &self.position)
            .field("tex_coord", &self.tex_coord)
            .field("display_transform", &self.display_transform)
            .field("units", &self.units)
            .finish()
    }
}

impl<C: GpuContext> YuvProgram<C> {
    /// Build the program for `config`. The program current on entry is current again on
    /// return, on success and on failure.
    pub unsafe fn build(gl: &C, config: &CompositorConfig) -> Result<Self, BackdropError> {
        config.validate()?;

        let max = gl
            .get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS)
            .max(0) as u32;
        for unit in config.units.as_array() {
            if unit >= max {
                return Err(BackdropError::TextureUnitUnavailable { unit, max });
            }
        }

        let sources = yuv_sources(config.dialect, config.color_matrix.coefficients());
        let program = link_stages(gl, &sources.vert, &sources.frag)?;

        match Self::resolve(gl, program, config.units) {
            Ok(p) => {
                debug!(
                    ?program,
                    dialect = ?config.dialect,
                    matrix = ?config.color_matrix,
                    luma_unit = config.units.luma,
                    chroma_unit = config.units.chroma,
                    "yuv program built"
                );
                Ok(p)
            }
            Err(e) => {
                gl.delete_program(program);
                Err(e)
            }
        }
    }

    unsafe fn resolve(
        gl: &C,
        program: C::Program,
        units: TextureUnits,
    ) -> Result<Self, BackdropError> {
        let attrib = |name: &str| {
            gl.get_attrib_location(program, name)
                .ok_or_else(|| BackdropError::MissingAttribute(name.to_string()))
        };
        let uniform = |name: &str| {
            gl.get_uniform_location(program, name)
                .ok_or_else(|| BackdropError::MissingUniform(name.to_string()))
        };

        let position = attrib(ATTR_POSITION)?;
        let tex_coord = attrib(ATTR_TEX_COORD)?;
        let display_transform = uniform(UNIFORM_DISPLAY_TRANSFORM)?;
        let y_texture = uniform(UNIFORM_Y_TEXTURE)?;
        let uv_texture = uniform(UNIFORM_UV_TEXTURE)?;

        // Sampler uniforms are per-program state: the program must be current to set them.
        {
            let _restore = ProgramGuard::capture(gl);
            gl.use_program(Some(program));
            gl.uniform_1_i32(Some(&y_texture), units.luma as i32);
            gl.uniform_1_i32(Some(&uv_texture), units.chroma as i32);
        }

        Ok(Self {
            program,
            position,
            tex_coord,
            display_transform,
            units,
        })
    }

    pub fn program(&self) -> C::Program {
        self.program
    }

    pub fn position_location(&self) -> u32 {
        self.position
    }

    pub fn tex_coord_location(&self) -> u32 {
        self.tex_coord
    }

    pub fn display_transform_location(&self) -> &C::UniformLocation {
        &self.display_transform
    }

    pub fn units(&self) -> TextureUnits {
        self.units
    }

    pub unsafe fn destroy(self, gl: &C) {
        gl.delete_program(self.program);
    }
}
