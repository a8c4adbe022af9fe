//! Save/restore of host GL state around guest work.
//!
//! The host renderer owns the context before and after every call. Each guard here records the
//! bindings it is about to disturb and writes them back in `Drop`, so early returns and unwinding
//! restore state the same way the normal path does.
//!
//! Guards are created through `unsafe fn`s: the caller promises the context stays current on
//! this thread for the guard's lifetime, which is what makes the GL calls in `Drop` sound.

use std::fmt;

use crate::context::GpuContext;

/// Host state touched by a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuStateSnapshot<P, T, V> {
    pub program: Option<P>,
    /// Raw `ACTIVE_TEXTURE` value.
    pub active_texture: u32,
    /// `(unit index, texture bound to TEXTURE_2D on it)`, in capture order.
    pub unit_textures: [(u32, Option<T>); 2],
    pub vertex_array: Option<V>,
    pub unpack_alignment: i32,
    pub depth_test: bool,
}

pub type SnapshotOf<C> = GpuStateSnapshot<
    <C as GpuContext>::Program,
    <C as GpuContext>::Texture,
    <C as GpuContext>::VertexArray,
>;

impl<P: Copy, T: Copy, V: Copy> GpuStateSnapshot<P, T, V> {
    /// Record the current state. Leaves the active unit on `units[1]`; `restore` puts it back.
    pub unsafe fn capture<C>(gl: &C, units: [u32; 2]) -> Self
    where
        C: GpuContext<Program = P, Texture = T, VertexArray = V>,
    {
        let program = gl.current_program();
        let active_texture = gl.active_texture_unit();
        let vertex_array = gl.vertex_array_binding();
        let unpack_alignment = gl.get_parameter_i32(glow::UNPACK_ALIGNMENT);
        let depth_test = gl.is_enabled(glow::DEPTH_TEST);

        // TEXTURE_BINDING_2D is per active unit.
        let mut unit_textures = [(units[0], None), (units[1], None)];
        for slot in unit_textures.iter_mut() {
            gl.active_texture(glow::TEXTURE0 + slot.0);
            slot.1 = gl.texture_binding_2d();
        }

        Self {
            program,
            active_texture,
            unit_textures,
            vertex_array,
            unpack_alignment,
            depth_test,
        }
    }

    /// Write every captured field back once.
    ///
    /// Unit textures go back in reverse capture order, each after re-activating its unit; the
    /// active unit itself is restored only after that.
    pub unsafe fn restore<C>(&self, gl: &C)
    where
        C: GpuContext<Program = P, Texture = T, VertexArray = V>,
    {
        for (unit, tex) in self.unit_textures.iter().rev() {
            gl.active_texture(glow::TEXTURE0 + *unit);
            gl.bind_texture(glow::TEXTURE_2D, *tex);
        }
        gl.use_program(self.program);
        gl.active_texture(self.active_texture);
        gl.bind_vertex_array(self.vertex_array);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, self.unpack_alignment);
        if self.depth_test {
            gl.enable(glow::DEPTH_TEST);
        } else {
            gl.disable(glow::DEPTH_TEST);
        }
    }
}

/// Full composite snapshot, restored on drop.
pub struct StateGuard<'a, C: GpuContext> {
    gl: &'a C,
    snapshot: SnapshotOf<C>,
}

impl<'a, C: GpuContext> StateGuard<'a, C> {
    pub unsafe fn capture(gl: &'a C, units: [u32; 2]) -> Self {
        Self {
            gl,
            snapshot: GpuStateSnapshot::capture(gl, units),
        }
    }

    pub fn snapshot(&self) -> &SnapshotOf<C> {
        &self.snapshot
    }
}

impl<C: GpuContext> fmt::Debug for StateGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateGuard")
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

impl<C: GpuContext> Drop for StateGuard<'_, C> {
    fn drop(&mut self) {
        unsafe { self.snapshot.restore(self.gl) }
    }
}

/// Restores the current program on drop.
pub struct ProgramGuard<'a, C: GpuContext> {
    gl: &'a C,
    previous: Option<C::Program>,
}

impl<'a, C: GpuContext> ProgramGuard<'a, C> {
    pub unsafe fn capture(gl: &'a C) -> Self {
        Self {
            gl,
            previous: gl.current_program(),
        }
    }
}

impl<C: GpuContext> fmt::Debug for ProgramGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramGuard")
            .field("previous", &self.previous)
            .finish()
    }
}

impl<C: GpuContext> Drop for ProgramGuard<'_, C> {
    fn drop(&mut self) {
        unsafe { self.gl.use_program(self.previous) }
    }
}

/// Restores the VAO and `ARRAY_BUFFER` bindings on drop.
pub struct VertexInputGuard<'a, C: GpuContext> {
    gl: &'a C,
    vertex_array: Option<C::VertexArray>,
    array_buffer: Option<C::Buffer>,
}

impl<'a, C: GpuContext> VertexInputGuard<'a, C> {
    pub unsafe fn capture(gl: &'a C) -> Self {
        Self {
            gl,
            vertex_array: gl.vertex_array_binding(),
            array_buffer: gl.array_buffer_binding(),
        }
    }
}

impl<C: GpuContext> fmt::Debug for VertexInputGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexInputGuard")
            .field("vertex_array", &self.vertex_array)
            .field("array_buffer", &self.array_buffer)
            .finish()
    }
}

impl<C: GpuContext> Drop for VertexInputGuard<'_, C> {
    fn drop(&mut self) {
        unsafe {
            // VAO first: ARRAY_BUFFER is global state, not recorded in the VAO.
            self.gl.bind_vertex_array(self.vertex_array);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, self.array_buffer);
        }
    }
}
