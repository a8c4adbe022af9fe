//! In-memory GL state model for driver-free tests.
//!
//! `RecordingContext` implements [`GpuContext`] by tracking the bindings a real context would
//! hold (program, active unit, per-unit 2D textures, VAO, array buffer, pixel-store alignment,
//! capabilities), logging every mutating call, and snapshotting the bound state at each draw.
//! Misuse that a driver would reject (uniform upload with no program, draw without a VAO,
//! out-of-range texture unit) is collected in `errors()` instead of panicking.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::context::GpuContext;

macro_rules! handle {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u32);
        )*
    };
}

handle!(FakeShader, FakeProgram, FakeBuffer, FakeVertexArray, FakeTexture);

/// Uniform locations are scoped to the program they were queried from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeUniform {
    pub program: FakeProgram,
    pub location: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    I32(i32),
    Mat3 { transpose: bool, values: Vec<f32> },
}

/// Externally observable binding state (what the host renderer would see).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedState {
    pub program: Option<FakeProgram>,
    pub active_texture: u32,
    /// Unit index → texture bound to `TEXTURE_2D`. Absent means nothing bound.
    pub unit_textures: BTreeMap<u32, FakeTexture>,
    pub vertex_array: Option<FakeVertexArray>,
    pub array_buffer: Option<FakeBuffer>,
    pub unpack_alignment: i32,
    pub enabled: BTreeSet<u32>,
}

impl Default for ObservedState {
    fn default() -> Self {
        Self {
            program: None,
            active_texture: glow::TEXTURE0,
            unit_textures: BTreeMap::new(),
            vertex_array: None,
            array_buffer: None,
            unpack_alignment: 4,
            enabled: BTreeSet::new(),
        }
    }
}

impl ObservedState {
    pub fn texture_at(&self, unit: u32) -> Option<FakeTexture> {
        self.unit_textures.get(&unit).copied()
    }
}

/// Mutating calls, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    Create(&'static str, u32),
    Delete(&'static str, u32),
    ShaderSource(FakeShader),
    CompileShader(FakeShader),
    AttachShader(FakeProgram, FakeShader),
    DetachShader(FakeProgram, FakeShader),
    LinkProgram(FakeProgram),
    UseProgram(Option<FakeProgram>),
    Uniform(FakeUniform, UniformValue),
    BindBuffer(u32, Option<FakeBuffer>),
    BufferData { target: u32, len: usize, usage: u32 },
    BindVertexArray(Option<FakeVertexArray>),
    VertexAttribPointer { index: u32, size: i32, data_type: u32 },
    EnableVertexAttribArray(u32),
    ActiveTexture(u32),
    BindTexture(u32, Option<FakeTexture>),
    PixelStore(u32, i32),
    Enable(u32),
    Disable(u32),
    DrawArrays { mode: u32, first: i32, count: i32 },
}

/// State bound at the moment of a draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub mode: u32,
    pub first: i32,
    pub count: i32,
    pub state: ObservedState,
    /// Current program's uniform values by name.
    pub uniforms: BTreeMap<String, UniformValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttribPointer {
    pub buffer: Option<FakeBuffer>,
    pub size: i32,
    pub data_type: u32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
struct ShaderObj {
    kind: u32,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Clone, Default)]
struct ProgramObj {
    attached: BTreeMap<u32, (u32, String)>,
    linked: bool,
    log: String,
    attribs: BTreeMap<String, u32>,
    uniforms: BTreeMap<String, u32>,
    values: BTreeMap<u32, UniformValue>,
}

#[derive(Debug, Clone)]
struct BufferObj {
    data: Vec<u8>,
    usage: u32,
}

#[derive(Debug, Default)]
struct Failures {
    compile: Option<u32>,
    link: bool,
    hidden_uniforms: BTreeSet<String>,
    hidden_attribs: BTreeSet<String>,
    vertex_arrays: bool,
}

#[derive(Debug)]
struct Inner {
    state: ObservedState,
    next_id: u32,
    max_texture_units: i32,
    shaders: BTreeMap<u32, ShaderObj>,
    programs: BTreeMap<u32, ProgramObj>,
    buffers: BTreeMap<u32, BufferObj>,
    vertex_arrays: BTreeMap<u32, BTreeMap<u32, AttribPointer>>,
    textures: BTreeSet<u32>,
    calls: Vec<GlCall>,
    draws: Vec<DrawRecord>,
    errors: Vec<String>,
    fail: Failures,
}

impl Inner {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn active_unit(&self) -> u32 {
        self.state.active_texture.wrapping_sub(glow::TEXTURE0)
    }
}

/// Handles seeded by [`RecordingContext::seed_host_bindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostBindings {
    pub program: FakeProgram,
    pub vertex_array: FakeVertexArray,
    pub array_buffer: FakeBuffer,
    pub texture_at_5: Option<FakeTexture>,
    pub texture_at_6: Option<FakeTexture>,
}

/// Live (not yet deleted) object counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveObjects {
    pub shaders: usize,
    pub programs: usize,
    pub buffers: usize,
    pub vertex_arrays: usize,
}

#[derive(Debug)]
pub struct RecordingContext {
    inner: RefCell<Inner>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Names declared by `keyword TYPE NAME;` lines.
fn declared_names<'a>(source: &'a str, keywords: &[&str]) -> Vec<&'a str> {
    source
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let kw = tokens.next()?;
            if !keywords.contains(&kw) {
                return None;
            }
            let _ty = tokens.next()?;
            let name = tokens.next()?.trim_end_matches(';');
            Some(name)
        })
        .collect()
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner {
                state: ObservedState::default(),
                next_id: 0,
                max_texture_units: 16,
                shaders: BTreeMap::new(),
                programs: BTreeMap::new(),
                buffers: BTreeMap::new(),
                vertex_arrays: BTreeMap::new(),
                textures: BTreeSet::new(),
                calls: Vec::new(),
                draws: Vec::new(),
                errors: Vec::new(),
                fail: Failures::default(),
            }),
        }
    }

    // ---- Inspection ----

    pub fn observed(&self) -> ObservedState {
        self.inner.borrow().state.clone()
    }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut self.inner.borrow_mut().calls)
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.inner.borrow().draws.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.inner.borrow().errors.clone()
    }

    pub fn buffer_data(&self, buffer: FakeBuffer) -> Option<(Vec<u8>, u32)> {
        self.inner
            .borrow()
            .buffers
            .get(&buffer.0)
            .map(|b| (b.data.clone(), b.usage))
    }

    pub fn vertex_array_attribs(&self, vao: FakeVertexArray) -> BTreeMap<u32, AttribPointer> {
        self.inner
            .borrow()
            .vertex_arrays
            .get(&vao.0)
            .cloned()
            .unwrap_or_default()
    }

    pub fn uniform_value(&self, program: FakeProgram, name: &str) -> Option<UniformValue> {
        let inner = self.inner.borrow();
        let p = inner.programs.get(&program.0)?;
        let loc = p.uniforms.get(name)?;
        p.values.get(loc).cloned()
    }

    pub fn live_objects(&self) -> LiveObjects {
        let inner = self.inner.borrow();
        LiveObjects {
            shaders: inner.shaders.len(),
            programs: inner.programs.len(),
            buffers: inner.buffers.len(),
            vertex_arrays: inner.vertex_arrays.len(),
        }
    }

    // ---- Failure injection ----

    /// Make the next compile of a `shader_type` shader fail.
    pub fn fail_next_compile(&self, shader_type: u32) {
        self.inner.borrow_mut().fail.compile = Some(shader_type);
    }

    pub fn fail_next_link(&self) {
        self.inner.borrow_mut().fail.link = true;
    }

    /// Pretend the linker optimised `name` away.
    pub fn hide_uniform(&self, name: &str) {
        self.inner.borrow_mut().fail.hidden_uniforms.insert(name.to_string());
    }

    pub fn hide_attrib(&self, name: &str) {
        self.inner.borrow_mut().fail.hidden_attribs.insert(name.to_string());
    }

    pub fn fail_vertex_array_creation(&self) {
        self.inner.borrow_mut().fail.vertex_arrays = true;
    }

    pub fn set_max_texture_units(&self, n: i32) {
        self.inner.borrow_mut().max_texture_units = n;
    }

    // ---- Host-side helpers (not logged) ----

    pub fn create_texture(&self) -> FakeTexture {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc();
        inner.textures.insert(id);
        FakeTexture(id)
    }

    /// Put the context into a busy "host renderer" state: a host program and VAO bound, an array
    /// buffer bound, textures on units 0..=6 (including the compositor's units), unit 2 active,
    /// depth testing on and the default unpack alignment.
    pub fn seed_host_bindings(&self) -> HostBindings {
        let textures: Vec<FakeTexture> = (0..=6).map(|_| self.create_texture()).collect();
        let mut inner = self.inner.borrow_mut();

        let program = FakeProgram(inner.alloc());
        inner.programs.insert(
            program.0,
            ProgramObj {
                linked: true,
                ..ProgramObj::default()
            },
        );
        let vertex_array = FakeVertexArray(inner.alloc());
        inner.vertex_arrays.insert(vertex_array.0, BTreeMap::new());
        let array_buffer = FakeBuffer(inner.alloc());
        inner.buffers.insert(
            array_buffer.0,
            BufferObj {
                data: Vec::new(),
                usage: glow::DYNAMIC_DRAW,
            },
        );

        let state = &mut inner.state;
        state.program = Some(program);
        state.vertex_array = Some(vertex_array);
        state.array_buffer = Some(array_buffer);
        state.unit_textures = textures.iter().enumerate().map(|(u, t)| (u as u32, *t)).collect();
        state.active_texture = glow::TEXTURE0 + 2;
        state.unpack_alignment = 4;
        state.enabled.insert(glow::DEPTH_TEST);

        HostBindings {
            program,
            vertex_array,
            array_buffer,
            texture_at_5: state.texture_at(5),
            texture_at_6: state.texture_at(6),
        }
    }

    /// Overwrite the binding state directly (not logged).
    pub fn set_state(&self, state: ObservedState) {
        self.inner.borrow_mut().state = state;
    }

    fn log(&self, call: GlCall) {
        self.inner.borrow_mut().calls.push(call);
    }

    fn error(&self, msg: String) {
        self.inner.borrow_mut().errors.push(msg);
    }

    fn set_uniform(&self, location: Option<&FakeUniform>, value: UniformValue) {
        let Some(loc) = location.copied() else {
            return;
        };
        self.log(GlCall::Uniform(loc, value.clone()));
        let mut inner = self.inner.borrow_mut();
        let current = inner.state.program;
        if current != Some(loc.program) {
            inner.errors.push(format!(
                "uniform upload to {loc:?} while program {current:?} is current"
            ));
            return;
        }
        if let Some(p) = inner.programs.get_mut(&loc.program.0) {
            p.values.insert(loc.location, value);
        }
    }
}

impl GpuContext for RecordingContext {
    type Shader = FakeShader;
    type Program = FakeProgram;
    type Buffer = FakeBuffer;
    type VertexArray = FakeVertexArray;
    type Texture = FakeTexture;
    type UniformLocation = FakeUniform;

    unsafe fn current_program(&self) -> Option<FakeProgram> {
        self.inner.borrow().state.program
    }

    unsafe fn active_texture_unit(&self) -> u32 {
        self.inner.borrow().state.active_texture
    }

    unsafe fn texture_binding_2d(&self) -> Option<FakeTexture> {
        let inner = self.inner.borrow();
        inner.state.texture_at(inner.active_unit())
    }

    unsafe fn vertex_array_binding(&self) -> Option<FakeVertexArray> {
        self.inner.borrow().state.vertex_array
    }

    unsafe fn array_buffer_binding(&self) -> Option<FakeBuffer> {
        self.inner.borrow().state.array_buffer
    }

    unsafe fn get_parameter_i32(&self, parameter: u32) -> i32 {
        let inner = self.inner.borrow();
        match parameter {
            glow::UNPACK_ALIGNMENT => inner.state.unpack_alignment,
            glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS => inner.max_texture_units,
            glow::ACTIVE_TEXTURE => inner.state.active_texture as i32,
            _ => 0,
        }
    }

    unsafe fn is_enabled(&self, capability: u32) -> bool {
        self.inner.borrow().state.enabled.contains(&capability)
    }

    unsafe fn create_shader(&self, shader_type: u32) -> Result<FakeShader, String> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc();
        inner.shaders.insert(
            id,
            ShaderObj {
                kind: shader_type,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        inner.calls.push(GlCall::Create("shader", id));
        Ok(FakeShader(id))
    }

    unsafe fn shader_source(&self, shader: FakeShader, source: &str) {
        self.log(GlCall::ShaderSource(shader));
        if let Some(s) = self.inner.borrow_mut().shaders.get_mut(&shader.0) {
            s.source = source.to_string();
        }
    }

    unsafe fn compile_shader(&self, shader: FakeShader) {
        self.log(GlCall::CompileShader(shader));
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let inject = inner.fail.compile;
        let Some(s) = inner.shaders.get_mut(&shader.0) else {
            return;
        };
        if inject == Some(s.kind) {
            s.compiled = false;
            s.log = "0:1(1): error: injected compile failure".to_string();
            inner.fail.compile = None;
        } else {
            s.compiled = !s.source.trim().is_empty();
        }
    }

    unsafe fn get_shader_compile_status(&self, shader: FakeShader) -> bool {
        self.inner
            .borrow()
            .shaders
            .get(&shader.0)
            .map(|s| s.compiled)
            .unwrap_or(false)
    }

    unsafe fn get_shader_info_log(&self, shader: FakeShader) -> String {
        self.inner
            .borrow()
            .shaders
            .get(&shader.0)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    unsafe fn delete_shader(&self, shader: FakeShader) {
        self.log(GlCall::Delete("shader", shader.0));
        self.inner.borrow_mut().shaders.remove(&shader.0);
    }

    unsafe fn create_program(&self) -> Result<FakeProgram, String> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc();
        inner.programs.insert(id, ProgramObj::default());
        inner.calls.push(GlCall::Create("program", id));
        Ok(FakeProgram(id))
    }

    unsafe fn attach_shader(&self, program: FakeProgram, shader: FakeShader) {
        self.log(GlCall::AttachShader(program, shader));
        let mut inner = self.inner.borrow_mut();
        let Some(s) = inner.shaders.get(&shader.0).cloned() else {
            inner.errors.push(format!("attach of unknown shader {shader:?}"));
            return;
        };
        if let Some(p) = inner.programs.get_mut(&program.0) {
            p.attached.insert(shader.0, (s.kind, s.source));
        }
    }

    unsafe fn detach_shader(&self, program: FakeProgram, shader: FakeShader) {
        self.log(GlCall::DetachShader(program, shader));
        if let Some(p) = self.inner.borrow_mut().programs.get_mut(&program.0) {
            p.attached.remove(&shader.0);
        }
    }

    unsafe fn link_program(&self, program: FakeProgram) {
        self.log(GlCall::LinkProgram(program));
        let mut inner = self.inner.borrow_mut();
        let inject = std::mem::take(&mut inner.fail.link);
        let hidden_uniforms = inner.fail.hidden_uniforms.clone();
        let hidden_attribs = inner.fail.hidden_attribs.clone();
        let Some(p) = inner.programs.get_mut(&program.0) else {
            return;
        };

        if inject {
            p.linked = false;
            p.log = "error: injected link failure".to_string();
            return;
        }

        p.attribs.clear();
        p.uniforms.clear();
        p.values.clear();
        for (kind, source) in p.attached.values() {
            if *kind == glow::VERTEX_SHADER {
                for name in declared_names(source, &["attribute", "in"]) {
                    if hidden_attribs.contains(name) {
                        continue;
                    }
                    let next = p.attribs.len() as u32;
                    p.attribs.entry(name.to_string()).or_insert(next);
                }
            }
            for name in declared_names(source, &["uniform"]) {
                if hidden_uniforms.contains(name) {
                    continue;
                }
                let next = p.uniforms.len() as u32;
                p.uniforms.entry(name.to_string()).or_insert(next);
            }
        }
        p.linked = true;
    }

    unsafe fn get_program_link_status(&self, program: FakeProgram) -> bool {
        self.inner
            .borrow()
            .programs
            .get(&program.0)
            .map(|p| p.linked)
            .unwrap_or(false)
    }

    unsafe fn get_program_info_log(&self, program: FakeProgram) -> String {
        self.inner
            .borrow()
            .programs
            .get(&program.0)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    unsafe fn delete_program(&self, program: FakeProgram) {
        self.log(GlCall::Delete("program", program.0));
        self.inner.borrow_mut().programs.remove(&program.0);
    }

    unsafe fn use_program(&self, program: Option<FakeProgram>) {
        self.log(GlCall::UseProgram(program));
        let mut inner = self.inner.borrow_mut();
        if let Some(p) = program {
            if !inner.programs.get(&p.0).map(|o| o.linked).unwrap_or(false) {
                inner.errors.push(format!("use_program on unlinked/unknown {p:?}"));
            }
        }
        inner.state.program = program;
    }

    unsafe fn get_attrib_location(&self, program: FakeProgram, name: &str) -> Option<u32> {
        self.inner
            .borrow()
            .programs
            .get(&program.0)
            .and_then(|p| p.attribs.get(name).copied())
    }

    unsafe fn get_uniform_location(&self, program: FakeProgram, name: &str) -> Option<FakeUniform> {
        self.inner
            .borrow()
            .programs
            .get(&program.0)
            .and_then(|p| p.uniforms.get(name).copied())
            .map(|location| FakeUniform { program, location })
    }

    unsafe fn uniform_1_i32(&self, location: Option<&FakeUniform>, x: i32) {
        self.set_uniform(location, UniformValue::I32(x));
    }

    unsafe fn uniform_matrix_3_f32_slice(
        &self,
        location: Option<&FakeUniform>,
        transpose: bool,
        v: &[f32],
    ) {
        if v.len() != 9 {
            self.error(format!("uniform mat3 upload with {} floats", v.len()));
            return;
        }
        self.set_uniform(
            location,
            UniformValue::Mat3 {
                transpose,
                values: v.to_vec(),
            },
        );
    }

    unsafe fn create_buffer(&self) -> Result<FakeBuffer, String> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc();
        inner.buffers.insert(
            id,
            BufferObj {
                data: Vec::new(),
                usage: 0,
            },
        );
        inner.calls.push(GlCall::Create("buffer", id));
        Ok(FakeBuffer(id))
    }

    unsafe fn bind_buffer(&self, target: u32, buffer: Option<FakeBuffer>) {
        self.log(GlCall::BindBuffer(target, buffer));
        if target == glow::ARRAY_BUFFER {
            self.inner.borrow_mut().state.array_buffer = buffer;
        }
    }

    unsafe fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        self.log(GlCall::BufferData {
            target,
            len: data.len(),
            usage,
        });
        let mut inner = self.inner.borrow_mut();
        let Some(bound) = inner.state.array_buffer.filter(|_| target == glow::ARRAY_BUFFER) else {
            inner.errors.push("buffer_data with no ARRAY_BUFFER bound".to_string());
            return;
        };
        if let Some(b) = inner.buffers.get_mut(&bound.0) {
            b.data = data.to_vec();
            b.usage = usage;
        }
    }

    unsafe fn delete_buffer(&self, buffer: FakeBuffer) {
        self.log(GlCall::Delete("buffer", buffer.0));
        let mut inner = self.inner.borrow_mut();
        inner.buffers.remove(&buffer.0);
        if inner.state.array_buffer == Some(buffer) {
            inner.state.array_buffer = None;
        }
    }

    unsafe fn create_vertex_array(&self) -> Result<FakeVertexArray, String> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail.vertex_arrays {
            return Err("vertex array objects unsupported".to_string());
        }
        let id = inner.alloc();
        inner.vertex_arrays.insert(id, BTreeMap::new());
        inner.calls.push(GlCall::Create("vertex_array", id));
        Ok(FakeVertexArray(id))
    }

    unsafe fn bind_vertex_array(&self, vertex_array: Option<FakeVertexArray>) {
        self.log(GlCall::BindVertexArray(vertex_array));
        self.inner.borrow_mut().state.vertex_array = vertex_array;
    }

    unsafe fn delete_vertex_array(&self, vertex_array: FakeVertexArray) {
        self.log(GlCall::Delete("vertex_array", vertex_array.0));
        let mut inner = self.inner.borrow_mut();
        inner.vertex_arrays.remove(&vertex_array.0);
        if inner.state.vertex_array == Some(vertex_array) {
            inner.state.vertex_array = None;
        }
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
        self.log(GlCall::VertexAttribPointer {
            index,
            size,
            data_type,
        });
        let mut inner = self.inner.borrow_mut();
        let buffer = inner.state.array_buffer;
        let Some(vao) = inner.state.vertex_array else {
            inner.errors.push("vertex_attrib_pointer with no VAO bound".to_string());
            return;
        };
        if let Some(attribs) = inner.vertex_arrays.get_mut(&vao.0) {
            let enabled = attribs.get(&index).map(|a| a.enabled).unwrap_or(false);
            attribs.insert(
                index,
                AttribPointer {
                    buffer,
                    size,
                    data_type,
                    normalized,
                    stride,
                    offset,
                    enabled,
                },
            );
        }
    }

    unsafe fn enable_vertex_attrib_array(&self, index: u32) {
        self.log(GlCall::EnableVertexAttribArray(index));
        let mut inner = self.inner.borrow_mut();
        let Some(vao) = inner.state.vertex_array else {
            inner.errors.push("enable_vertex_attrib_array with no VAO bound".to_string());
            return;
        };
        if let Some(a) = inner
            .vertex_arrays
            .get_mut(&vao.0)
            .and_then(|attribs| attribs.get_mut(&index))
        {
            a.enabled = true;
        }
    }

    unsafe fn active_texture(&self, unit: u32) {
        self.log(GlCall::ActiveTexture(unit));
        let mut inner = self.inner.borrow_mut();
        let max = inner.max_texture_units.max(0) as u32;
        if unit < glow::TEXTURE0 || unit - glow::TEXTURE0 >= max {
            inner.errors.push(format!("active_texture out of range: 0x{unit:x}"));
            return;
        }
        inner.state.active_texture = unit;
    }

    unsafe fn bind_texture(&self, target: u32, texture: Option<FakeTexture>) {
        self.log(GlCall::BindTexture(target, texture));
        let mut inner = self.inner.borrow_mut();
        if target != glow::TEXTURE_2D {
            inner.errors.push(format!("unsupported texture target 0x{target:x}"));
            return;
        }
        let unit = inner.active_unit();
        match texture {
            Some(t) if !inner.textures.contains(&t.0) => {
                inner.errors.push(format!("bind of unknown texture {t:?}"));
            }
            Some(t) => {
                inner.state.unit_textures.insert(unit, t);
            }
            None => {
                inner.state.unit_textures.remove(&unit);
            }
        }
    }

    unsafe fn pixel_store_i32(&self, parameter: u32, value: i32) {
        self.log(GlCall::PixelStore(parameter, value));
        if parameter == glow::UNPACK_ALIGNMENT {
            self.inner.borrow_mut().state.unpack_alignment = value;
        }
    }

    unsafe fn enable(&self, capability: u32) {
        self.log(GlCall::Enable(capability));
        self.inner.borrow_mut().state.enabled.insert(capability);
    }

    unsafe fn disable(&self, capability: u32) {
        self.log(GlCall::Disable(capability));
        self.inner.borrow_mut().state.enabled.remove(&capability);
    }

    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.log(GlCall::DrawArrays { mode, first, count });
        let mut inner = self.inner.borrow_mut();
        let state = inner.state.clone();

        let Some(program) = state.program else {
            inner.errors.push("draw with no program".to_string());
            return;
        };
        if state.vertex_array.is_none() {
            inner.errors.push("draw with no VAO bound".to_string());
            return;
        }

        let uniforms = inner
            .programs
            .get(&program.0)
            .map(|p| {
                p.uniforms
                    .iter()
                    .filter_map(|(name, loc)| p.values.get(loc).map(|v| (name.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default();

        inner.draws.push(DrawRecord {
            mode,
            first,
            count,
            state,
            uniforms,
        });
    }
}
