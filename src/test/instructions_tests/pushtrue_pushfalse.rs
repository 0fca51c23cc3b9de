use crate::error::ErrorKind;
use crate::test::{encode, processor};

#[test]
fn pushtrue_pushes_the_true_encoding() {
    let mut vm = processor(vec![encode("pushtrue", 0)]);
    vm.step().unwrap();
    assert_eq!(vm.stack_peek(0), -1);
}

#[test]
fn poptrue_is_the_exact_inverse_of_pushtrue() {
    let mut vm = processor(vec![encode("pushtrue", 0), encode("poptrue", 0)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.sp(), 0);
}

#[test]
fn poptrue_rejects_a_false_cell() {
    let mut vm = processor(vec![encode("pushfalse", 0), encode("poptrue", 0)]);
    vm.step().unwrap();
    let err = vm.step().unwrap_err();
    assert_eq!(err.kind, ErrorKind::DomainError { expected: -1, actual: 1 });
}

#[test]
fn pushfalse_pushes_the_false_encoding() {
    let mut vm = processor(vec![encode("pushfalse", 0)]);
    vm.step().unwrap();
    assert_eq!(vm.stack_peek(0), 1);
}

#[test]
fn popfalse_is_the_exact_inverse_of_pushfalse() {
    let mut vm = processor(vec![encode("pushfalse", 0), encode("popfalse", 0)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.sp(), 0);
}
