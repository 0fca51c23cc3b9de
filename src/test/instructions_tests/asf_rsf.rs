use crate::test::{encode, processor};

#[test]
fn asf_opens_a_frame_and_rsf_closes_it_restoring_the_caller_frame_pointer() {
    let mut vm = processor(vec![
        encode("pushc", 1),
        encode("asf", 2),
        encode("rsf", 2),
    ]);
    vm.step().unwrap();
    assert_eq!((vm.sp(), vm.fp()), (1, 0));

    vm.step().unwrap();
    // pushc left one value below the frame, plus 2 locals plus the saved fp.
    assert_eq!(vm.sp(), 4);
    assert_eq!(vm.fp(), 1);
    assert_eq!(vm.stack_peek(1), 0, "saved caller fp");

    vm.step().unwrap();
    assert_eq!((vm.sp(), vm.fp()), (1, 0));
    assert_eq!(vm.stack_peek(1), 0, "rsf leaves the saved-fp cell cleared");
}
