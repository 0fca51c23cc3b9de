use crate::test::{encode, processor};

#[test]
fn pushl_swaps_a_local_slot_onto_the_top_of_stack() {
    let mut vm = processor(vec![
        encode("pushc", 1), // lives below the frame
        encode("asf", 2),
        encode("pushc", 9),
        encode("popl", 1), // stores 9 into local 1, clearing the old top
        encode("pushl", 1), // brings it back to the top
    ]);
    for _ in 0..5 {
        vm.step().unwrap();
    }
    assert_eq!(vm.sp(), 5);
    assert_eq!(vm.stack_peek(4), 9, "pushl brought local 1 back to the top");
}

#[test]
fn popl_is_the_exact_inverse_of_pushl() {
    let mut vm = processor(vec![
        encode("pushc", 1),
        encode("asf", 2),
        encode("pushc", 9),
        encode("popl", 1),
        encode("pushl", 1),
        encode("popl", 1),
    ]);
    for _ in 0..6 {
        vm.step().unwrap();
    }
    assert_eq!(vm.sp(), 4, "back to the sp pushl started from");
}
