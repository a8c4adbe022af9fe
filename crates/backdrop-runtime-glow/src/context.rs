//! The slice of OpenGL the compositor touches.
//!
//! Everything goes through an explicit context handle rather than ambient global state, so the
//! same code drives a real `glow::Context` and the in-memory `RecordingContext` (behind the
//! `testing` feature).
//! Method names and argument order follow `glow::HasContext`.

use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroU32;

use glow::HasContext;

pub trait GpuContext {
    type Shader: Copy + Debug;
    type Program: Copy + Eq + Hash + Debug;
    type Buffer: Copy + Eq + Hash + Debug;
    type VertexArray: Copy + Eq + Hash + Debug;
    type Texture: Copy + Eq + Hash + Debug;
    type UniformLocation: Clone + Debug;

    // ---- State queries ----
    unsafe fn current_program(&self) -> Option<Self::Program>;
    /// Raw `ACTIVE_TEXTURE` value (`TEXTURE0 + n`).
    unsafe fn active_texture_unit(&self) -> u32;
    /// Texture bound to `TEXTURE_2D` on the active unit.
    unsafe fn texture_binding_2d(&self) -> Option<Self::Texture>;
    unsafe fn vertex_array_binding(&self) -> Option<Self::VertexArray>;
    unsafe fn array_buffer_binding(&self) -> Option<Self::Buffer>;
    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32;
    unsafe fn is_enabled(&self, capability: u32) -> bool;

    // ---- Shaders / programs ----
    unsafe fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String>;
    unsafe fn shader_source(&self, shader: Self::Shader, source: &str);
    unsafe fn compile_shader(&self, shader: Self::Shader);
    unsafe fn get_shader_compile_status(&self, shader: Self::Shader) -> bool;
    unsafe fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    unsafe fn delete_shader(&self, shader: Self::Shader);
    unsafe fn create_program(&self) -> Result<Self::Program, String>;
    unsafe fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    unsafe fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    unsafe fn link_program(&self, program: Self::Program);
    unsafe fn get_program_link_status(&self, program: Self::Program) -> bool;
    unsafe fn get_program_info_log(&self, program: Self::Program) -> String;
    unsafe fn delete_program(&self, program: Self::Program);
    unsafe fn use_program(&self, program: Option<Self::Program>);
    unsafe fn get_attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    unsafe fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    unsafe fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, x: i32);
    unsafe fn uniform_matrix_3_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        v: &[f32],
    );

    // ---- Buffers / vertex arrays ----
    unsafe fn create_buffer(&self) -> Result<Self::Buffer, String>;
    unsafe fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>);
    unsafe fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    unsafe fn delete_buffer(&self, buffer: Self::Buffer);
    unsafe fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    unsafe fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    unsafe fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    unsafe fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    unsafe fn enable_vertex_attrib_array(&self, index: u32);

    // ---- Textures / fixed function / draw ----
    unsafe fn active_texture(&self, unit: u32);
    unsafe fn bind_texture(&self, target: u32, texture: Option<Self::Texture>);
    unsafe fn pixel_store_i32(&self, parameter: u32, value: i32);
    unsafe fn enable(&self, capability: u32);
    unsafe fn disable(&self, capability: u32);
    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32);
}

/// Name queries return GLuint; zero means "nothing bound".
unsafe fn bound_name(gl: &glow::Context, parameter: u32) -> Option<NonZeroU32> {
    NonZeroU32::new(HasContext::get_parameter_i32(gl, parameter) as u32)
}

impl GpuContext for glow::Context {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Buffer = glow::NativeBuffer;
    type VertexArray = glow::NativeVertexArray;
    type Texture = glow::NativeTexture;
    type UniformLocation = glow::NativeUniformLocation;

    unsafe fn current_program(&self) -> Option<glow::NativeProgram> {
        bound_name(self, glow::CURRENT_PROGRAM).map(glow::NativeProgram)
    }

    unsafe fn active_texture_unit(&self) -> u32 {
        HasContext::get_parameter_i32(self, glow::ACTIVE_TEXTURE) as u32
    }

    unsafe fn texture_binding_2d(&self) -> Option<glow::NativeTexture> {
        bound_name(self, glow::TEXTURE_BINDING_2D).map(glow::NativeTexture)
    }

    unsafe fn vertex_array_binding(&self) -> Option<glow::NativeVertexArray> {
        bound_name(self, glow::VERTEX_ARRAY_BINDING).map(glow::NativeVertexArray)
    }

    unsafe fn array_buffer_binding(&self) -> Option<glow::NativeBuffer> {
        bound_name(self, glow::ARRAY_BUFFER_BINDING).map(glow::NativeBuffer)
    }

    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32 {
        HasContext::get_parameter_i32(self, parameter)
    }

    unsafe fn is_enabled(&self, capability: u32) -> bool {
        HasContext::is_enabled(self, capability)
    }

    unsafe fn create_shader(&self, shader_type: u32) -> Result<glow::NativeShader, String> {
        HasContext::create_shader(self, shader_type)
    }

    unsafe fn shader_source(&self, shader: glow::NativeShader, source: &str) {
        HasContext::shader_source(self, shader, source)
    }

    unsafe fn compile_shader(&self, shader: glow::NativeShader) {
        HasContext::compile_shader(self, shader)
    }

    unsafe fn get_shader_compile_status(&self, shader: glow::NativeShader) -> bool {
        HasContext::get_shader_compile_status(self, shader)
    }

    unsafe fn get_shader_info_log(&self, shader: glow::NativeShader) -> String {
        HasContext::get_shader_info_log(self, shader)
    }

    unsafe fn delete_shader(&self, shader: glow::NativeShader) {
        HasContext::delete_shader(self, shader)
    }

    unsafe fn create_program(&self) -> Result<glow::NativeProgram, String> {
        HasContext::create_program(self)
    }

    unsafe fn attach_shader(&self, program: glow::NativeProgram, shader: glow::NativeShader) {
        HasContext::attach_shader(self, program, shader)
    }

    unsafe fn detach_shader(&self, program: glow::NativeProgram, shader: glow::NativeShader) {
        HasContext::detach_shader(self, program, shader)
    }

    unsafe fn link_program(&self, program: glow::NativeProgram) {
        HasContext::link_program(self, program)
    }

    unsafe fn get_program_link_status(&self, program: glow::NativeProgram) -> bool {
        HasContext::get_program_link_status(self, program)
    }

    unsafe fn get_program_info_log(&self, program: glow::NativeProgram) -> String {
        HasContext::get_program_info_log(self, program)
    }

    unsafe fn delete_program(&self, program: glow::NativeProgram) {
        HasContext::delete_program(self, program)
    }

    unsafe fn use_program(&self, program: Option<glow::NativeProgram>) {
        HasContext::use_program(self, program)
    }

    unsafe fn get_attrib_location(&self, program: glow::NativeProgram, name: &str) -> Option<u32> {
        HasContext::get_attrib_location(self, program, name)
    }

    unsafe fn get_uniform_location(
        &self,
        program: glow::NativeProgram,
        name: &str,
    ) -> Option<glow::NativeUniformLocation> {
        HasContext::get_uniform_location(self, program, name)
    }

    unsafe fn uniform_1_i32(&self, location: Option<&glow::NativeUniformLocation>, x: i32) {
        HasContext::uniform_1_i32(self, location, x)
    }

    unsafe fn uniform_matrix_3_f32_slice(
        &self,
        location: Option<&glow::NativeUniformLocation>,
        transpose: bool,
        v: &[f32],
    ) {
        HasContext::uniform_matrix_3_f32_slice(self, location, transpose, v)
    }

    unsafe fn create_buffer(&self) -> Result<glow::NativeBuffer, String> {
        HasContext::create_buffer(self)
    }

    unsafe fn bind_buffer(&self, target: u32, buffer: Option<glow::NativeBuffer>) {
        HasContext::bind_buffer(self, target, buffer)
    }

    unsafe fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        HasContext::buffer_data_u8_slice(self, target, data, usage)
    }

    unsafe fn delete_buffer(&self, buffer: glow::NativeBuffer) {
        HasContext::delete_buffer(self, buffer)
    }

    unsafe fn create_vertex_array(&self) -> Result<glow::NativeVertexArray, String> {
        HasContext::create_vertex_array(self)
    }

    unsafe fn bind_vertex_array(&self, vertex_array: Option<glow::NativeVertexArray>) {
        HasContext::bind_vertex_array(self, vertex_array)
    }

    unsafe fn delete_vertex_array(&self, vertex_array: glow::NativeVertexArray) {
        HasContext::delete_vertex_array(self, vertex_array)
    }

    unsafe fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        HasContext::vertex_attrib_pointer_f32(self, index, size, data_type, normalized, stride, offset)
    }

    unsafe fn enable_vertex_attrib_array(&self, index: u32) {
        HasContext::enable_vertex_attrib_array(self, index)
    }

    unsafe fn active_texture(&self, unit: u32) {
        HasContext::active_texture(self, unit)
    }

    unsafe fn bind_texture(&self, target: u32, texture: Option<glow::NativeTexture>) {
        HasContext::bind_texture(self, target, texture)
    }

    unsafe fn pixel_store_i32(&self, parameter: u32, value: i32) {
        HasContext::pixel_store_i32(self, parameter, value)
    }

    unsafe fn enable(&self, capability: u32) {
        HasContext::enable(self, capability)
    }

    unsafe fn disable(&self, capability: u32) {
        HasContext::disable(self, capability)
    }

    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        HasContext::draw_arrays(self, mode, first, count)
    }
}
