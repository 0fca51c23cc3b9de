use crate::error::ErrorKind;
use crate::test::{encode, processor};

#[test]
fn start_sets_running_and_stop_clears_it() {
    let mut vm = processor(vec![encode("start", 0), encode("stop", 0)]);
    assert!(!vm.running());
    vm.step().unwrap();
    assert!(vm.running());
    vm.step().unwrap();
    assert!(!vm.running());
}

#[test]
fn starting_an_already_running_machine_is_an_error() {
    let mut vm = processor(vec![encode("start", 0), encode("start", 0)]);
    vm.step().unwrap();
    let err = vm.step().unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyRunning(true));
}

#[test]
fn stopping_a_machine_that_is_not_running_is_an_error() {
    let mut vm = processor(vec![encode("stop", 0)]);
    let err = vm.step().unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyRunning(false));
}
