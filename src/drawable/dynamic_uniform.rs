/// Dynamic uniform buffer - one packed arena of per-object elements,
/// duplicated per frame in flight
///
/// Drawables that share one uniform layout (typically a model matrix)
/// take a slot here instead of carrying their own buffer. At bind time
/// the slot turns into a dynamic descriptor offset, so one descriptor
/// binding serves every object. The same offsets are replayed by the
/// shadow pass.

use std::sync::{Arc, Mutex};

use crate::engine_err;
use crate::error::{Error, Result};
use crate::graphics_device::{Buffer, BufferDesc, BufferUsage, GraphicsDevice, MemoryKind};
use crate::utils::SlotAllocator;

const LOG_SOURCE: &str = "prism::DynamicUniformBuffer";

struct Inner {
    /// One buffer per frame in flight
    buffers: Vec<Arc<dyn Buffer>>,
    allocator: SlotAllocator,
}

pub struct DynamicUniformBuffer {
    element_size: u64,
    /// Element stride rounded up to the device's offset alignment
    stride: u64,
    capacity: u32,
    inner: Mutex<Inner>,
}

impl DynamicUniformBuffer {
    /// Create the arena with room for `capacity` elements per frame
    ///
    /// # Arguments
    ///
    /// * `frame_count` - Number of frames in flight
    /// * `element_size` - Size of one element in bytes
    /// * `capacity` - Maximum number of simultaneously allocated slots
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        frame_count: usize,
        element_size: u64,
        capacity: u32,
    ) -> Result<Self> {
        if element_size == 0 || capacity == 0 {
            return Err(engine_err!(LOG_SOURCE, "dynamic uniform arena needs a non-zero element size and capacity"));
        }
        let alignment = device.min_uniform_offset_alignment();
        let stride = element_size.div_ceil(alignment) * alignment;
        let buffers = Self::create_buffers(device, frame_count, stride, capacity)?;
        Ok(Self {
            element_size,
            stride,
            capacity,
            inner: Mutex::new(Inner {
                buffers,
                allocator: SlotAllocator::new(),
            }),
        })
    }

    /// Take a slot; fails when the arena is full
    pub fn alloc_slot(&self) -> Result<u32> {
        let mut inner = self.inner.lock().unwrap();
        if inner.allocator.len() >= self.capacity {
            crate::engine_error!(LOG_SOURCE, "Arena full, all {} slots allocated", self.capacity);
            return Err(Error::OutOfMemory);
        }
        Ok(inner.allocator.alloc())
    }

    pub fn free_slot(&self, slot: u32) {
        self.inner.lock().unwrap().allocator.free(slot);
    }

    /// Write one element for one frame
    pub fn write(&self, frame_index: usize, slot: u32, data: &[u8]) -> Result<()> {
        if data.len() as u64 != self.element_size {
            return Err(Error::UniformSizeMismatch {
                name: "dynamic uniform element".to_string(),
                expected: self.element_size,
                actual: data.len() as u64,
            });
        }
        let inner = self.inner.lock().unwrap();
        inner.buffers[frame_index].update(slot as u64 * self.stride, data)
    }

    /// Dynamic descriptor offset for a slot
    pub fn offset_for(&self, slot: u32) -> u32 {
        (slot as u64 * self.stride) as u32
    }

    /// Backing buffer of one frame (for descriptor writes)
    pub fn buffer(&self, frame_index: usize) -> Arc<dyn Buffer> {
        Arc::clone(&self.inner.lock().unwrap().buffers[frame_index])
    }

    pub fn element_size(&self) -> u64 {
        self.element_size
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn slot_count(&self) -> u32 {
        self.inner.lock().unwrap().allocator.len()
    }

    /// Rebuild the per-frame buffers for a new frame count
    ///
    /// Slot assignments survive; element contents do not and must be
    /// rewritten before the next frame is prepared.
    pub fn recreate(&self, device: &Arc<dyn GraphicsDevice>, frame_count: usize) -> Result<()> {
        let buffers = Self::create_buffers(device, frame_count, self.stride, self.capacity)?;
        self.inner.lock().unwrap().buffers = buffers;
        Ok(())
    }

    fn create_buffers(
        device: &Arc<dyn GraphicsDevice>,
        frame_count: usize,
        stride: u64,
        capacity: u32,
    ) -> Result<Vec<Arc<dyn Buffer>>> {
        (0..frame_count)
            .map(|_| {
                device.create_buffer(&BufferDesc {
                    size: stride * capacity as u64,
                    usage: BufferUsage::Uniform,
                    memory: MemoryKind::HostVisible,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "dynamic_uniform_tests.rs"]
mod tests;
