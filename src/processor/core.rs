use crate::error::{Error, ErrorKind};
use crate::memory::{Memory, MemoryLayout};

/// Which way the machine is currently executing.
///
/// Encoded numerically so it can double as the `dir` multiplier applied to
/// `pc`/`br` updates, and so that `Backward`/`Forward` can stand in for the
/// `True`/`False` boolean encoding used on the stack.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(i32)]
pub enum Direction {
    Forward = 1,
    Backward = -1,
}

impl Direction {
    pub fn invert(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    pub fn value(self) -> i32 {
        self as i32
    }
}

/// The reversible stack machine: registers, data memory, operand stack and
/// the read-only encoded program.
pub struct Processor {
    pub(super) dir: Direction,
    pub(super) pc: i32,
    pub(super) br: i32,
    pub(super) sp: i32,
    pub(super) fp: i32,

    pub(super) memory: Memory,
    pub(super) stack: Vec<i32>,

    pub(super) running: bool,
    pub(super) counter: u64,

    pub(super) program: Vec<u32>,
}

impl Processor {
    pub fn new(
        program: Vec<u32>,
        layout: &MemoryLayout,
        memory_size: usize,
        stack_size: usize,
        entry_pc: i32,
    ) -> Result<Processor, Error> {
        let memory = Memory::new(memory_size, layout)?;
        Ok(Processor {
            dir: Direction::Forward,
            pc: entry_pc,
            br: 0,
            sp: 0,
            fp: 0,
            memory,
            stack: vec![0i32; stack_size],
            running: false,
            counter: 0,
            program,
        })
    }

    pub fn dir(&self) -> Direction {
        self.dir
    }

    pub fn pc(&self) -> i32 {
        self.pc
    }

    pub fn br(&self) -> i32 {
        self.br
    }

    pub fn sp(&self) -> i32 {
        self.sp
    }

    pub fn fp(&self) -> i32 {
        self.fp
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn program(&self) -> &[u32] {
        &self.program
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Reads the stack slot at the given index (0-based from the bottom),
    /// independent of the current `sp`. Used by the debugger and the entropy
    /// reporter, which both need to look at slots the program considers "popped".
    pub fn stack_peek(&self, index: i32) -> i32 {
        self.stack[index as usize]
    }

    pub fn memory_iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.memory.iter()
    }

    /// Direct, bounds-checked access to a stack cell, for the debugger's `S[n]`.
    pub fn stack_get(&self, index: i32) -> Result<i32, Error> {
        if index < 0 || index as usize >= self.stack.len() {
            Err(Error::new(ErrorKind::InvalidArgument(format!(
                "stack index {} out of range",
                index
            ))))
        } else {
            Ok(self.stack[index as usize])
        }
    }

    pub fn stack_set(&mut self, index: i32, value: i32) -> Result<(), Error> {
        if index < 0 || index as usize >= self.stack.len() {
            Err(Error::new(ErrorKind::InvalidArgument(format!(
                "stack index {} out of range",
                index
            ))))
        } else {
            self.stack[index as usize] = value;
            Ok(())
        }
    }

    /// Direct, bounds-checked access to a memory cell, for the debugger's `M[n]`.
    pub fn memory_get(&self, address: i32) -> Result<i32, Error> {
        self.memory.get(address)
    }

    pub fn memory_set(&mut self, address: i32, value: i32) -> Result<(), Error> {
        *self.memory.get_mut(address)? = value;
        Ok(())
    }

    /// Direct, read-only access to a program word, for the debugger's `P[n]`.
    pub fn program_get(&self, index: i32) -> Result<u32, Error> {
        if index < 0 || index as usize >= self.program.len() {
            Err(Error::new(ErrorKind::InvalidArgument(format!(
                "program index {} out of range",
                index
            ))))
        } else {
            Ok(self.program[index as usize])
        }
    }

    pub fn set_pc(&mut self, value: i32) {
        self.pc = value;
    }

    pub fn set_br(&mut self, value: i32) {
        self.br = value;
    }

    pub fn set_sp(&mut self, value: i32) {
        self.sp = value;
    }

    pub fn set_fp(&mut self, value: i32) {
        self.fp = value;
    }

    /// Flips the execution direction and recomputes `pc` as if `step_pc` had
    /// just run in the new direction, without executing an instruction. Used
    /// by the debugger's `invert` command.
    pub fn invert_direction(&mut self) {
        self.dir = self.dir.invert();
        self.step_pc();
    }

    pub(super) fn step_pc(&mut self) {
        if self.br == 0 {
            self.pc += self.dir.value();
        } else {
            self.pc += self.dir.value() * self.br;
        }
    }

    /// Executes a single instruction: decode, dispatch, advance `pc`.
    pub fn step(&mut self) -> Result<(), Error> {
        self.counter += 1;
        self.step_instr()?;
        self.step_pc();
        Ok(())
    }

    /// Runs until a `stop` instruction clears `running`.
    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            self.step()?;
            if !self.running {
                break;
            }
        }
        Ok(())
    }

    pub(super) fn requires(&self, n: i32) -> Result<(), Error> {
        if self.sp < n {
            Err(Error::new(ErrorKind::StackUnderflow))
        } else {
            Ok(())
        }
    }

    pub(super) fn pushes(&self, n: i32) -> Result<(), Error> {
        if (self.stack.len() as i32) - self.sp < n {
            Err(Error::new(ErrorKind::StackOverflow))
        } else {
            Ok(())
        }
    }

    pub(super) fn assert_positive(&self, n: i32) -> Result<(), Error> {
        if n < 0 {
            Err(Error::new(ErrorKind::NegativeOperand(n)))
        } else {
            Ok(())
        }
    }

}

/// Verifies `cell` holds `expected`, then clears it to zero by XOR-ing the
/// expected value back in. This is the reversible "pop with a receipt"
/// primitive every `*pop*`/`un*` instruction is built from.
pub(super) fn clear(cell: &mut i32, expected: i32) -> Result<(), Error> {
    let actual = *cell;
    *cell ^= expected;
    if *cell != 0 {
        Err(Error::new(ErrorKind::DomainError { expected, actual }))
    } else {
        Ok(())
    }
}
