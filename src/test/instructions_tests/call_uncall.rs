use crate::test::{encode, processor};

#[test]
fn call_swaps_br_with_the_top_of_stack() {
    let mut vm = processor(vec![encode("pushc", 5), encode("call", 0)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.br(), 5);
    assert_eq!(vm.stack_peek(0), 0);
}

#[test]
fn call_is_its_own_inverse() {
    let mut vm = processor(vec![
        encode("pushc", 5),
        encode("call", 0),
        encode("call", 0),
    ]);
    for _ in 0..3 {
        vm.step().unwrap();
    }
    assert_eq!(vm.br(), 0);
    assert_eq!(vm.stack_peek(0), 5);
}

#[test]
fn uncall_negates_br_and_the_return_slot_and_flips_direction() {
    let mut vm = processor(vec![encode("pushc", 5), encode("uncall", 0)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.br(), -5);
    assert_eq!(vm.stack_peek(0), 0);
    assert!(matches!(vm.dir(), crate::processor::Direction::Backward));
}

#[test]
fn uncall_is_its_own_inverse() {
    let mut vm = processor(vec![
        encode("pushc", 5),
        encode("uncall", 0),
        encode("uncall", 0),
    ]);
    vm.step().unwrap();
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.br(), 0);
    assert_eq!(vm.stack_peek(0), 5);
    assert!(matches!(vm.dir(), crate::processor::Direction::Forward));
}
