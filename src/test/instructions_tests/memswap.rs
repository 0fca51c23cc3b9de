use crate::memory::MemoryLayout;
use crate::test::{encode, processor_with_memory};

#[test]
fn memswap_exchanges_two_memory_cells_addressed_from_the_stack() {
    let mut layout = MemoryLayout::new();
    layout.insert(1, 10);
    layout.insert(2, 20);
    let mut vm = processor_with_memory(
        vec![encode("pushc", 1), encode("pushc", 2), encode("memswap", 0)],
        &layout,
    );
    for _ in 0..3 {
        vm.step().unwrap();
    }
    assert_eq!(vm.memory_get(1).unwrap(), 20);
    assert_eq!(vm.memory_get(2).unwrap(), 10);
}

#[test]
fn memswap_is_its_own_inverse() {
    let mut layout = MemoryLayout::new();
    layout.insert(1, 10);
    layout.insert(2, 20);
    let mut vm = processor_with_memory(
        vec![
            encode("pushc", 1),
            encode("pushc", 2),
            encode("memswap", 0),
            encode("memswap", 0),
        ],
        &layout,
    );
    for _ in 0..4 {
        vm.step().unwrap();
    }
    assert_eq!(vm.memory_get(1).unwrap(), 10);
    assert_eq!(vm.memory_get(2).unwrap(), 20);
}
