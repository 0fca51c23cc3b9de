use crate::error::ErrorKind;
use crate::test::{encode, processor};

#[test]
fn pushc_pushes_a_sign_extended_constant() {
    let mut vm = processor(vec![encode("pushc", -3)]);
    vm.step().unwrap();
    assert_eq!(vm.sp(), 1);
    assert_eq!(vm.stack_peek(0), -3);
}

#[test]
fn popc_is_the_exact_inverse_of_pushc() {
    let mut vm = processor(vec![encode("pushc", 99), encode("popc", 99)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.sp(), 0);
    assert_eq!(vm.stack_peek(0), 0);
}

#[test]
fn popc_with_wrong_expected_value_fails_and_leaves_the_receipt() {
    let mut vm = processor(vec![encode("pushc", 99), encode("popc", 1)]);
    vm.step().unwrap();
    let err = vm.step().unwrap_err();
    assert_eq!(err.kind, ErrorKind::DomainError { expected: 1, actual: 99 });
}
