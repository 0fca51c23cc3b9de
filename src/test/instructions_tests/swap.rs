use crate::test::{encode, processor};

#[test]
fn swap_exchanges_the_top_two_cells_and_is_its_own_inverse() {
    let mut vm = processor(vec![
        encode("pushc", 1),
        encode("pushc", 2),
        encode("swap", 0),
        encode("swap", 0),
    ]);
    vm.step().unwrap();
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.stack_peek(0), 2);
    assert_eq!(vm.stack_peek(1), 1);
    vm.step().unwrap();
    assert_eq!(vm.stack_peek(0), 1);
    assert_eq!(vm.stack_peek(1), 2);
}
