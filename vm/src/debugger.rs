//! Interactive REPL wrapping [`Processor::step`] with breakpoints, a
//! step-count budget, and inspection/mutation of machine state.
//!
//! Commands dispatch on the first whitespace-delimited token of the input
//! line, not the line as a whole — an earlier release matched the raw line
//! and so silently ignored any trailing arguments typed after the command.

use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use util::EnumFromStr;
use util_derive::EnumFromStr;
use vcpu::error::{Error, ErrorKind};
use vcpu::processor::Processor;


/// The plain (non-indexed) register names `inspect`/`set` accept, parsed via
/// the same `EnumFromStr` derive the instruction set's opcode enum would use
/// if it had one: the variant name is matched against the token verbatim.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumFromStr)]
enum Register {
    sp,
    fp,
    br,
    pc,
}

/// A machine component the `inspect`/`set` commands can address.
enum Target {
    Sp,
    Fp,
    Br,
    Pc,
    Stack(i32),
    Memory(i32),
    Program(i32),
}

impl Target {
    fn parse(token: &str) -> Result<Target, Error> {
        match Register::from_str(token) {
            Ok(Register::sp) => Ok(Target::Sp),
            Ok(Register::fp) => Ok(Target::Fp),
            Ok(Register::br) => Ok(Target::Br),
            Ok(Register::pc) => Ok(Target::Pc),
            Err(_) => Target::parse_indexed(token),
        }
    }

    fn parse_indexed(token: &str) -> Result<Target, Error> {
        let bad = || Error::new(ErrorKind::InvalidArgument(format!("unknown component '{}'", token)));
        let (prefix, rest) = token.split_at(1);
        let index: i32 = rest
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(bad)?
            .parse()
            .map_err(|_| bad())?;
        match prefix {
            "S" => Ok(Target::Stack(index)),
            "M" => Ok(Target::Memory(index)),
            "P" => Ok(Target::Program(index)),
            _ => Err(bad()),
        }
    }

    fn read(&self, vm: &Processor) -> Result<i32, Error> {
        match self {
            Target::Sp => Ok(vm.sp()),
            Target::Fp => Ok(vm.fp()),
            Target::Br => Ok(vm.br()),
            Target::Pc => Ok(vm.pc()),
            Target::Stack(i) => vm.stack_get(*i),
            Target::Memory(i) => vm.memory_get(*i),
            Target::Program(i) => vm.program_get(*i).map(|w| w as i32),
        }
    }

    fn write(&self, vm: &mut Processor, value: i32) -> Result<(), Error> {
        match self {
            Target::Sp => {
                vm.set_sp(value);
                Ok(())
            }
            Target::Fp => {
                vm.set_fp(value);
                Ok(())
            }
            Target::Br => {
                vm.set_br(value);
                Ok(())
            }
            Target::Pc => {
                vm.set_pc(value);
                Ok(())
            }
            Target::Stack(i) => vm.stack_set(*i, value),
            Target::Memory(i) => vm.memory_set(*i, value),
            Target::Program(_) => Err(Error::new(ErrorKind::InvalidArgument(
                "P[] is read-only".to_string(),
            ))),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Target::Sp => write!(f, "sp"),
            Target::Fp => write!(f, "fp"),
            Target::Br => write!(f, "br"),
            Target::Pc => write!(f, "pc"),
            Target::Stack(i) => write!(f, "S[{}]", i),
            Target::Memory(i) => write!(f, "M[{}]", i),
            Target::Program(i) => write!(f, "P[{}]", i),
        }
    }
}

struct State {
    breakpoints: BTreeSet<i32>,
    remaining_steps: u64,
    continue_running: bool,
    last_input: String,
}

impl State {
    fn new() -> State {
        State {
            breakpoints: BTreeSet::new(),
            remaining_steps: 0,
            continue_running: false,
            last_input: String::new(),
        }
    }

    fn requires_interaction(&self, vm: &Processor) -> bool {
        if self.continue_running {
            self.breakpoints.contains(&vm.pc())
        } else {
            self.remaining_steps == 0
        }
    }
}

enum Interaction {
    Resume,
    Quit,
}

fn print_info<W: Write>(vm: &Processor, out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "counter={} dir={:?} pc={} br={} sp={} fp={}",
        vm.counter(),
        vm.dir(),
        vm.pc(),
        vm.br(),
        vm.sp(),
        vm.fp()
    )?;
    let sp = vm.sp();
    let start = (sp - 10).max(0);
    if sp == 0 {
        writeln!(out, "Stack is empty.")?;
    } else {
        for i in (start..sp).rev() {
            writeln!(out, "S[{}] = {}", i, vm.stack_peek(i))?;
        }
    }
    Ok(())
}

fn parse_ints<'a>(args: impl Iterator<Item = &'a str>) -> Result<Vec<i32>, Error> {
    args.map(|a| {
        a.parse::<i32>()
            .map_err(|_| Error::new(ErrorKind::InvalidArgument(format!("'{}' is not an integer", a))))
    })
    .collect()
}

fn dispatch<W: Write>(
    vm: &mut Processor,
    state: &mut State,
    line: &str,
    out: &mut W,
    err: &mut W,
) -> Result<Interaction, Error> {
    let mut tokens = line.split_whitespace();
    let command = match tokens.next() {
        Some(c) => c,
        None => return Ok(Interaction::Resume),
    };
    let args: Vec<&str> = tokens.collect();

    match command {
        "info" => {
            print_info(vm, out).ok();
            Ok(Interaction::Resume)
        }
        "step" => {
            let n: i32 = match args.first() {
                Some(s) => s
                    .parse()
                    .map_err(|_| Error::new(ErrorKind::InvalidArgument(format!("'{}' is not an integer", s))))?,
                None => 1,
            };
            if n < 0 {
                vm.invert_direction();
            }
            state.remaining_steps = n.unsigned_abs() as u64;
            Ok(Interaction::Resume)
        }
        "run" | "continue" | "c" => {
            state.continue_running = true;
            Ok(Interaction::Resume)
        }
        "breakpoint" | "break" | "b" => {
            for value in parse_ints(args.into_iter())? {
                state.breakpoints.insert(value);
            }
            Ok(Interaction::Resume)
        }
        "clear" => {
            for value in parse_ints(args.into_iter())? {
                state.breakpoints.remove(&value);
            }
            Ok(Interaction::Resume)
        }
        "list" => {
            for bp in &state.breakpoints {
                writeln!(out, "{}", bp).ok();
            }
            Ok(Interaction::Resume)
        }
        "inspect" => {
            for token in args {
                let target = Target::parse(token)?;
                let value = target.read(vm)?;
                writeln!(out, "{} = {}", target, value).ok();
            }
            Ok(Interaction::Resume)
        }
        "set" => {
            // Each `name value` pair is independent: a bad target or value
            // reports its own error and the remaining pairs are still tried,
            // rather than one bad pair aborting the whole command.
            let mut iter = args.into_iter();
            loop {
                let name = match iter.next() {
                    Some(n) => n,
                    None => break,
                };
                let outcome = match iter.next() {
                    None => Err(Error::new(ErrorKind::InvalidArgument(format!("missing value for '{}'", name)))),
                    Some(value_str) => value_str
                        .parse::<i32>()
                        .map_err(|_| Error::new(ErrorKind::InvalidArgument(format!("'{}' is not an integer", value_str))))
                        .and_then(|value| Target::parse(name).and_then(|target| target.write(vm, value))),
                };
                if let Err(e) = outcome {
                    writeln!(err, "[ERROR] {}", e).ok();
                }
            }
            Ok(Interaction::Resume)
        }
        "invert" => {
            vm.invert_direction();
            Ok(Interaction::Resume)
        }
        "quit" | "q" => Ok(Interaction::Quit),
        "help" => {
            writeln!(
                out,
                "info | step [N] | run|continue|c | breakpoint|break|b N... | clear N... | list | inspect X... | set X V... | invert | quit|q | help"
            )
            .ok();
            Ok(Interaction::Resume)
        }
        other => Err(Error::new(ErrorKind::InvalidArgument(format!(
            "unknown command '{}'",
            other
        )))),
    }
}

fn interact<R: BufRead, W: Write>(
    vm: &mut Processor,
    state: &mut State,
    input: &mut R,
    out: &mut W,
    err: &mut W,
) -> std::io::Result<Interaction> {
    loop {
        write!(out, "(vm) ")?;
        out.flush()?;
        let mut line = String::new();
        let bytes_read = input.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(out)?;
            return Ok(Interaction::Quit);
        }
        let trimmed = line.trim();
        let effective = if trimmed.is_empty() {
            state.last_input.clone()
        } else {
            trimmed.to_string()
        };
        state.last_input = effective.clone();

        match dispatch(vm, state, &effective, out, err) {
            Ok(Interaction::Resume) => return Ok(Interaction::Resume),
            Ok(Interaction::Quit) => return Ok(Interaction::Quit),
            Err(e) => {
                writeln!(err, "[ERROR] {}", e)?;
            }
        }
    }
}

/// Runs `vm` under the interactive debugger until it stops or the user quits.
pub fn run<R: BufRead, W: Write>(
    vm: &mut Processor,
    input: &mut R,
    out: &mut W,
    err: &mut W,
) -> std::io::Result<()> {
    let mut state = State::new();
    loop {
        if state.requires_interaction(vm) {
            state.continue_running = false;
            match interact(vm, &mut state, input, out, err)? {
                Interaction::Quit => return Ok(()),
                Interaction::Resume => {}
            }
            continue;
        }

        match vm.step() {
            Ok(()) => {}
            Err(e) => {
                writeln!(err, "[ERROR] {}", e)?;
                return Ok(());
            }
        }
        if state.remaining_steps > 0 {
            state.remaining_steps -= 1;
        }
        if !vm.running() {
            return Ok(());
        }
    }
}
