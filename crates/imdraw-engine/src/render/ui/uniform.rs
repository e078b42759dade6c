use std::marker::PhantomData;

use bytemuck::Pod;

use super::scope::capture;
use super::InitError;

/// Slot bookkeeping for a multi-buffered uniform ring.
///
/// Each `advance` hands out the next slot, wrapping after `depth` slots.
/// Nothing here knows whether the GPU is done with a slot: the ring depth
/// must be at least the number of frames the device keeps in flight.
#[derive(Debug, Clone)]
pub struct SlotRing {
    depth: usize,
    stride: u64,
    next: usize,
    current: Option<usize>,
}

impl SlotRing {
    /// `slot_size` is padded up to `alignment` to form the stride between slots.
    pub fn new(depth: usize, slot_size: u64, alignment: u64) -> Self {
        debug_assert!(depth > 0);
        Self {
            depth,
            stride: wgpu::util::align_to(slot_size, alignment.max(1)),
            next: 0,
            current: None,
        }
    }

    /// Claims the next slot for writing and makes it current.
    pub fn advance(&mut self) -> usize {
        let slot = self.next;
        self.current = Some(slot);
        self.next = (self.next + 1) % self.depth;
        slot
    }

    /// Slot written by the most recent `advance`, if any.
    #[inline]
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    #[inline]
    pub fn offset_of(&self, slot: usize) -> u64 {
        slot as u64 * self.stride
    }

    /// Bytes needed to back every slot.
    #[inline]
    pub fn total_size(&self) -> u64 {
        self.depth as u64 * self.stride
    }
}

/// Location of the most recently written uniform slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformBinding {
    pub set: u32,
    pub binding: u32,
    pub offset: u64,
    pub size: wgpu::BufferSize,
}

impl UniformBinding {
    /// Offset in the form `set_bind_group` expects for dynamic bindings.
    #[inline]
    pub fn dynamic_offset(&self) -> u32 {
        self.offset as u32
    }
}

/// A uniform value streamed once per frame through a ring of slots in one buffer.
///
/// The binding is declared with `has_dynamic_offset`, so one bind group serves
/// every slot and only the offset changes between frames.
pub struct StreamedUniform<T> {
    buffer: wgpu::Buffer,
    ring: SlotRing,
    size: wgpu::BufferSize,
    _marker: PhantomData<T>,
}

impl<T: Pod> StreamedUniform<T> {
    pub fn new(device: &wgpu::Device, depth: usize, label: &str) -> Result<Self, InitError> {
        if depth == 0 {
            return Err(InitError::InvalidConfig("uniform ring depth must be at least 1".into()));
        }
        let size = Self::binding_size()
            .ok_or_else(|| InitError::InvalidConfig("uniform type has zero size".into()))?;

        let limits = device.limits();
        let alignment = u64::from(limits.min_uniform_buffer_offset_alignment);
        let ring = SlotRing::new(depth, size.get(), alignment);

        if ring.total_size() > limits.max_buffer_size {
            return Err(InitError::BufferTooLarge {
                what: "uniform ring",
                size: ring.total_size(),
                max: limits.max_buffer_size,
            });
        }

        let buffer = capture(device, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: ring.total_size(),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })
        .map_err(|err| InitError::Device(err.to_string()))?;

        Ok(Self {
            buffer,
            ring,
            size,
            _marker: PhantomData,
        })
    }

    /// Size of one value, as declared in the bind group layout.
    #[inline]
    pub fn binding_size() -> Option<wgpu::BufferSize> {
        wgpu::BufferSize::new(std::mem::size_of::<T>() as u64)
    }

    /// Copies `value` into the next slot and makes that slot current.
    pub fn write(&mut self, queue: &wgpu::Queue, value: &T) {
        let slot = self.ring.advance();
        queue.write_buffer(&self.buffer, self.ring.offset_of(slot), bytemuck::bytes_of(value));
    }

    /// Describes the slot written by the last [`write`](Self::write).
    ///
    /// `None` until the first write of the renderer's lifetime.
    pub fn bind_descriptor_at_current_offset(&self, set: u32, binding: u32) -> Option<UniformBinding> {
        let slot = self.ring.current()?;
        Some(UniformBinding {
            set,
            binding,
            offset: self.ring.offset_of(slot),
            size: self.size,
        })
    }

    /// Resource for the bind group entry: a window of one slot at offset 0.
    /// The dynamic offset selects the actual slot at bind time.
    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: Some(self.size),
        })
    }

    #[inline]
    pub fn ring(&self) -> &SlotRing {
        &self.ring
    }
}
