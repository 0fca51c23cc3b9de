use crate::test::{encode, processor};

#[test]
fn dup_duplicates_the_top_of_stack() {
    let mut vm = processor(vec![encode("pushc", 5), encode("dup", 0)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.sp(), 2);
    assert_eq!(vm.stack_peek(0), 5);
    assert_eq!(vm.stack_peek(1), 5);
}

#[test]
fn undup_is_the_exact_inverse_of_dup() {
    let mut vm = processor(vec![encode("pushc", 5), encode("dup", 0), encode("undup", 0)]);
    vm.step().unwrap();
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.sp(), 1);
    assert_eq!(vm.stack_peek(0), 5);
    assert_eq!(vm.stack_peek(1), 0);
}
