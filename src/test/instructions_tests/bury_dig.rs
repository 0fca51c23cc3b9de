use crate::test::{encode, processor};

#[test]
fn bury_rotates_the_deepest_of_three_cells_to_the_top() {
    let mut vm = processor(vec![
        encode("pushc", 1),
        encode("pushc", 2),
        encode("pushc", 3),
        encode("bury", 0),
    ]);
    for _ in 0..4 {
        vm.step().unwrap();
    }
    assert_eq!((vm.stack_peek(0), vm.stack_peek(1), vm.stack_peek(2)), (3, 1, 2));
}

#[test]
fn dig_is_the_exact_inverse_of_bury() {
    let mut vm = processor(vec![
        encode("pushc", 1),
        encode("pushc", 2),
        encode("pushc", 3),
        encode("bury", 0),
        encode("dig", 0),
    ]);
    for _ in 0..5 {
        vm.step().unwrap();
    }
    assert_eq!((vm.stack_peek(0), vm.stack_peek(1), vm.stack_peek(2)), (1, 2, 3));
}
