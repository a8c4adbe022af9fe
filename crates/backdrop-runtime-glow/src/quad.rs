use std::fmt;

use backdrop_core::BackdropError;

use crate::context::GpuContext;
use crate::program::YuvProgram;
use crate::state::VertexInputGuard;

/// Clip-space corners, triangle-strip order.
pub const QUAD_POSITIONS: [f32; 8] = [1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, -1.0];

/// Texture coordinates matching `QUAD_POSITIONS`, flipped vertically: camera planes arrive
/// top row first.
pub const QUAD_TEX_COORDS: [f32; 8] = [1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0];

pub const QUAD_VERTEX_COUNT: i32 = 4;

/// Static full-screen quad: two vertex buffers recorded in one VAO.
pub struct QuadVertexState<C: GpuContext> {
    vao: C::VertexArray,
    positions: C::Buffer,
    tex_coords: C::Buffer,
}

impl<C: GpuContext> fmt::Debug for QuadVertexState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuadVertexState")
            .field("vao", &self.vao)
            .field("positions", &self.positions)
            .field("tex_coords", &self.tex_coords)
            .finish()
    }
}

/// Upload `data` as 2-component float attributes into `buffer` and wire it to `location` on the
/// bound VAO.
unsafe fn upload_vec2_attribute<C: GpuContext>(
    gl: &C,
    buffer: C::Buffer,
    location: u32,
    data: &[f32],
) {
    gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
    gl.buffer_data_u8_slice(
        glow::ARRAY_BUFFER,
        bytemuck::cast_slice(data),
        glow::STATIC_DRAW,
    );
    gl.vertex_attrib_pointer_f32(location, 2, glow::FLOAT, false, 0, 0);
    gl.enable_vertex_attrib_array(location);
}

impl<C: GpuContext> QuadVertexState<C> {
    /// Allocate and fill the quad for `program`'s attribute locations.
    ///
    /// The VAO and `ARRAY_BUFFER` bindings current on entry are current again on return.
    pub unsafe fn build(gl: &C, program: &YuvProgram<C>) -> Result<Self, BackdropError> {
        let vao = gl
            .create_vertex_array()
            .map_err(|e| BackdropError::GlCreate(format!("create_vertex_array: {e}")))?;
        let positions = match gl.create_buffer() {
            Ok(b) => b,
            Err(e) => {
                gl.delete_vertex_array(vao);
                return Err(BackdropError::GlCreate(format!("create_buffer: {e}")));
            }
        };
        let tex_coords = match gl.create_buffer() {
            Ok(b) => b,
            Err(e) => {
                gl.delete_buffer(positions);
                gl.delete_vertex_array(vao);
                return Err(BackdropError::GlCreate(format!("create_buffer: {e}")));
            }
        };

        {
            let _restore = VertexInputGuard::capture(gl);
            gl.bind_vertex_array(Some(vao));
            upload_vec2_attribute(gl, positions, program.position_location(), &QUAD_POSITIONS);
            upload_vec2_attribute(gl, tex_coords, program.tex_coord_location(), &QUAD_TEX_COORDS);
        }

        Ok(Self {
            vao,
            positions,
            tex_coords,
        })
    }

    pub fn vertex_array(&self) -> C::VertexArray {
        self.vao
    }

    /// `(positions, tex_coords)` buffer handles.
    pub fn buffers(&self) -> (C::Buffer, C::Buffer) {
        (self.positions, self.tex_coords)
    }

    /// Issue the strip. The caller has bound this quad's VAO and the program.
    pub unsafe fn draw(&self, gl: &C) {
        gl.draw_arrays(glow::TRIANGLE_STRIP, 0, QUAD_VERTEX_COUNT);
    }

    pub unsafe fn destroy(self, gl: &C) {
        gl.delete_vertex_array(self.vao);
        gl.delete_buffer(self.positions);
        gl.delete_buffer(self.tex_coords);
    }
}
