use super::*;

// ============================================================================
// Basic allocation tests
// ============================================================================

#[test]
fn test_sequential_alloc() {
    let mut alloc = SlotAllocator::new();
    assert_eq!(alloc.alloc(), 0);
    assert_eq!(alloc.alloc(), 1);
    assert_eq!(alloc.alloc(), 2);
}

#[test]
fn test_new_is_empty() {
    let alloc = SlotAllocator::new();
    assert!(alloc.is_empty());
    assert_eq!(alloc.len(), 0);
    assert_eq!(alloc.high_water_mark(), 0);
}

// ============================================================================
// Free and recycle tests
// ============================================================================

#[test]
fn test_free_and_recycle() {
    let mut alloc = SlotAllocator::new();
    let a = alloc.alloc(); // 0
    let b = alloc.alloc(); // 1
    alloc.free(a);
    let c = alloc.alloc(); // 0 (recycled)
    assert_eq!(c, 0);
    assert_eq!(b, 1);
}

#[test]
fn test_high_water_mark_ignores_frees() {
    let mut alloc = SlotAllocator::new();
    let a = alloc.alloc();
    alloc.alloc();
    alloc.alloc();
    alloc.free(a);
    assert_eq!(alloc.high_water_mark(), 3);
    assert_eq!(alloc.len(), 2);
}
