use crate::test::{encode, processor};

#[test]
fn branch_adds_dir_times_operand_to_br() {
    let mut vm = processor(vec![encode("branch", 3)]);
    vm.step().unwrap();
    assert_eq!(vm.br(), 3);
}

#[test]
fn branch_is_its_own_inverse_when_run_backward() {
    // A nonzero br makes step_pc() jump by br instead of 1, so the single
    // "branch 3" word loops pc straight back to itself once br == 3.
    let mut vm = processor(vec![encode("branch", 3)]);
    vm.step().unwrap();
    assert_eq!(vm.br(), 3);
    vm.invert_direction();
    assert_eq!(vm.pc(), 0);
    vm.step().unwrap();
    assert_eq!(vm.br(), 0);
}

#[test]
fn brt_branches_only_when_top_of_stack_is_true() {
    let mut vm = processor(vec![encode("pushtrue", 0), encode("brt", 2)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.br(), 2);
}

#[test]
fn brt_does_not_branch_when_top_of_stack_is_false() {
    let mut vm = processor(vec![encode("pushfalse", 0), encode("brt", 2)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.br(), 0);
}

#[test]
fn brf_branches_only_when_top_of_stack_is_false() {
    let mut vm = processor(vec![encode("pushfalse", 0), encode("brf", 2)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.br(), 2);
}

#[test]
fn brf_does_not_branch_when_top_of_stack_is_true() {
    let mut vm = processor(vec![encode("pushtrue", 0), encode("brf", 2)]);
    vm.step().unwrap();
    vm.step().unwrap();
    assert_eq!(vm.br(), 0);
}
