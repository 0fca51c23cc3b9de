use crate::test::{encode, processor};

#[test]
fn add_adds_the_second_cell_into_the_top_without_popping_it() {
    let mut vm = processor(vec![encode("pushc", 3), encode("pushc", 4), encode("add", 0)]);
    for _ in 0..3 {
        vm.step().unwrap();
    }
    assert_eq!(vm.sp(), 2);
    assert_eq!(vm.stack_peek(1), 7, "top holds 3 + 4");
    assert_eq!(vm.stack_peek(0), 3, "the addend below is left in place");
}

#[test]
fn sub_is_the_exact_inverse_of_add() {
    let mut vm = processor(vec![
        encode("pushc", 3),
        encode("pushc", 4),
        encode("add", 0),
        encode("sub", 0),
    ]);
    for _ in 0..4 {
        vm.step().unwrap();
    }
    assert_eq!(vm.stack_peek(1), 4);
    assert_eq!(vm.stack_peek(0), 3);
}

#[test]
fn xor_xors_the_second_cell_into_the_top_and_is_its_own_inverse() {
    let mut vm = processor(vec![
        encode("pushc", 0b1100),
        encode("pushc", 0b1010),
        encode("xor", 0),
        encode("xor", 0),
    ]);
    for _ in 0..3 {
        vm.step().unwrap();
    }
    assert_eq!(vm.stack_peek(1), 0b0110);
    vm.step().unwrap();
    assert_eq!(vm.stack_peek(1), 0b1010, "xor-ing the same cell twice restores it");
}
