use std::cell::Cell;

use super::device::Device;

/// Owns the device and remembers which program it last activated.
///
/// Every [`GpuProgram`](super::GpuProgram) built from the same context shares
/// it through an `Rc`, so activation is deduplicated across all of them. The
/// slot is only correct while nothing else calls `use_program` on the device.
pub struct GpuContext<D: Device> {
    device: D,
    active: Cell<Option<D::Program>>,
}

impl<D: Device> GpuContext<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            active: Cell::new(None),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn active_program(&self) -> Option<D::Program> {
        self.active.get()
    }

    /// Makes `program` current, returning whether a device bind was issued.
    pub(crate) fn activate(&self, program: D::Program) -> bool {
        if self.active.get() == Some(program) {
            tracing::trace!(?program, "program already active; bind elided");
            return false;
        }
        self.device.use_program(Some(program));
        self.active.set(Some(program));
        true
    }

    /// Forgets `program` if it is the active one. Device handles can be
    /// recycled after deletion.
    pub(crate) fn release(&self, program: D::Program) {
        if self.active.get() == Some(program) {
            self.active.set(None);
        }
    }
}
