use std::sync::Arc;

use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;

fn make_arena(element_size: u64, capacity: u32) -> (Arc<MockGraphicsDevice>, DynamicUniformBuffer) {
    let device = MockGraphicsDevice::new();
    let dyn_device = device.clone() as Arc<dyn GraphicsDevice>;
    let arena = DynamicUniformBuffer::new(&dyn_device, 3, element_size, capacity).unwrap();
    (device, arena)
}

#[test]
fn stride_is_rounded_to_device_alignment() {
    // Mock device aligns dynamic offsets to 256 bytes.
    let (_device, arena) = make_arena(64, 4);
    assert_eq!(arena.element_size(), 64);
    assert_eq!(arena.stride(), 256);

    let (_device, arena) = make_arena(256, 4);
    assert_eq!(arena.stride(), 256);

    let (_device, arena) = make_arena(300, 4);
    assert_eq!(arena.stride(), 512);
}

#[test]
fn slots_turn_into_aligned_offsets() {
    let (_device, arena) = make_arena(64, 4);
    let a = arena.alloc_slot().unwrap();
    let b = arena.alloc_slot().unwrap();

    assert_eq!(arena.offset_for(a), 0);
    assert_eq!(arena.offset_for(b), 256);
}

#[test]
fn freed_slots_are_recycled() {
    let (_device, arena) = make_arena(64, 2);
    let a = arena.alloc_slot().unwrap();
    let _b = arena.alloc_slot().unwrap();
    assert!(arena.alloc_slot().is_err());

    arena.free_slot(a);
    assert_eq!(arena.alloc_slot().unwrap(), a);
}

#[test]
fn write_lands_at_the_slot_offset() {
    let (_device, arena) = make_arena(4, 4);
    let slot = arena.alloc_slot().unwrap();
    let slot2 = arena.alloc_slot().unwrap();

    arena.write(1, slot, &[1, 2, 3, 4]).unwrap();
    arena.write(1, slot2, &[5, 6, 7, 8]).unwrap();

    let buffer = arena.buffer(1);
    assert_eq!(buffer.read_back(0, 4).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(buffer.read_back(256, 4).unwrap(), vec![5, 6, 7, 8]);
    // Frame 0 was never written.
    assert_eq!(arena.buffer(0).read_back(0, 4).unwrap(), vec![0, 0, 0, 0]);
}

#[test]
fn wrong_element_size_is_fatal() {
    let (_device, arena) = make_arena(8, 2);
    let slot = arena.alloc_slot().unwrap();
    assert!(matches!(
        arena.write(0, slot, &[0; 4]),
        Err(Error::UniformSizeMismatch { expected: 8, actual: 4, .. })
    ));
}

#[test]
fn recreate_changes_frame_count_and_keeps_slots() {
    let (device, arena) = make_arena(64, 4);
    let slot = arena.alloc_slot().unwrap();
    assert_eq!(device.live_buffers(), 3);

    let dyn_device = device.clone() as Arc<dyn GraphicsDevice>;
    arena.recreate(&dyn_device, 2).unwrap();

    assert_eq!(device.live_buffers(), 2);
    assert_eq!(arena.slot_count(), 1);
    arena.write(1, slot, &[0; 64]).unwrap();
}
