use crate::error::ErrorKind;
use crate::test::{encode, processor};

#[test]
fn cmpusheq_pushes_true_when_operands_are_equal() {
    let mut vm = processor(vec![
        encode("pushc", 4),
        encode("pushc", 4),
        encode("cmpusheq", 0),
    ]);
    for _ in 0..3 {
        vm.step().unwrap();
    }
    assert_eq!(vm.sp(), 3);
    assert_eq!(vm.stack_peek(2), -1, "TRUE is encoded as -1");
}

#[test]
fn cmpusheq_pushes_false_when_operands_differ() {
    let mut vm = processor(vec![
        encode("pushc", 4),
        encode("pushc", 5),
        encode("cmpusheq", 0),
    ]);
    for _ in 0..3 {
        vm.step().unwrap();
    }
    assert_eq!(vm.stack_peek(2), 1, "FALSE is encoded as 1");
}

#[test]
fn cmpopeq_is_the_exact_inverse_of_cmpusheq() {
    let mut vm = processor(vec![
        encode("pushc", 4),
        encode("pushc", 4),
        encode("cmpusheq", 0),
        encode("cmpopeq", 0),
    ]);
    for _ in 0..4 {
        vm.step().unwrap();
    }
    assert_eq!(vm.sp(), 2);
}

#[test]
fn cmpopeq_reports_a_domain_error_if_the_result_was_tampered() {
    let mut vm = processor(vec![
        encode("pushc", 4),
        encode("pushc", 4),
        encode("cmpusheq", 0),
        encode("cmpopeq", 0),
    ]);
    vm.step().unwrap();
    vm.step().unwrap();
    vm.step().unwrap();
    vm.stack_set(2, 1).unwrap();
    let err = vm.step().unwrap_err();
    assert_eq!(err.kind, ErrorKind::DomainError { expected: -1, actual: 1 });
}

#[test]
fn cmpushlt_and_cmpushle_compare_in_stack_order() {
    // cmp operand order is stack[sp-1] OP stack[sp-2]; pushed 3 then 5 means
    // sp-1 == 5, sp-2 == 3, so "5 < 3" is false.
    let mut vm = processor(vec![
        encode("pushc", 3),
        encode("pushc", 5),
        encode("cmpushlt", 0),
    ]);
    for _ in 0..3 {
        vm.step().unwrap();
    }
    assert_eq!(vm.stack_peek(2), 1, "5 < 3 is false");
}

#[test]
fn cmpushne_pushes_true_when_operands_differ() {
    let mut vm = processor(vec![
        encode("pushc", 3),
        encode("pushc", 5),
        encode("cmpushne", 0),
    ]);
    for _ in 0..3 {
        vm.step().unwrap();
    }
    assert_eq!(vm.stack_peek(2), -1);
}
