use crate::types::Topology;

use super::device::Device;

/// Geometry provider consumed by [`GpuProgram::draw`](super::GpuProgram::draw).
///
/// The `bind_*` stream methods make the corresponding buffer current on the
/// device and report whether this geometry has that stream at all.
pub trait Drawable<D: Device> {
    fn bind_position(&self, device: &D) -> bool;
    fn bind_normal(&self, device: &D) -> bool;
    fn bind_index(&self, device: &D);
    fn topology(&self) -> Topology;
    fn element_count(&self) -> u32;
}
