#[macro_use]
extern crate clap;

mod debugger;
mod size;

use clap::{Arg, ArgGroup};
use size::parse_size;
use std::fs;
use std::io::{self, Write};
use std::process::exit;
use vcpu::constants::{DEFAULT_MEMORY_SIZE, DEFAULT_STACK_SIZE};
use vcpu::entropy::{count_entropy, Measure};
use vcpu::processor::Processor;

const EXIT_OK: i32 = 0;
const EXIT_RUNTIME_ERROR: i32 = 1;
const EXIT_USAGE_ERROR: i32 = 2;

fn fail_usage(message: impl std::fmt::Display) -> ! {
    eprintln!("[ERROR] {}", message);
    exit(EXIT_USAGE_ERROR);
}

fn fail_runtime(message: impl std::fmt::Display) -> ! {
    eprintln!("[ERROR] {}", message);
    exit(EXIT_RUNTIME_ERROR);
}

fn main() {
    let app = app_from_crate!()
        .version_short("v")
        .arg(Arg::with_name("FILE").help("Source file to assemble and run").required(true).index(1))
        .arg(
            Arg::with_name("debug")
                .short("d")
                .long("debug")
                .help("Drop into the interactive debugger instead of running to completion"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Suppress the final stack dump"),
        )
        .arg(
            Arg::with_name("information")
                .short("i")
                .long("information")
                .help("Print a timing report to stderr"),
        )
        .arg(
            Arg::with_name("entropy-hamming")
                .short("e")
                .help("Report leftover state as a Hamming-weight bit count"),
        )
        .arg(
            Arg::with_name("entropy-words")
                .short("E")
                .help("Report leftover state as a count of differing words"),
        )
        .group(ArgGroup::with_name("entropy").args(&["entropy-hamming", "entropy-words"]))
        .arg(
            Arg::with_name("stacksize")
                .short("s")
                .long("stacksize")
                .takes_value(true)
                .value_name("SIZE")
                .help("Operand stack capacity, e.g. 1024, 4k, 1m (default 1024)"),
        )
        .arg(
            Arg::with_name("memsize")
                .short("m")
                .long("memsize")
                .takes_value(true)
                .value_name("SIZE")
                .help("Data memory capacity, e.g. 102400, 100k, 1m (default 102400)"),
        );

    let matches = match app.get_matches_safe() {
        Ok(matches) => matches,
        Err(e) => {
            eprint!("{}", e);
            exit(EXIT_USAGE_ERROR);
        }
    };

    let path = matches.value_of("FILE").unwrap();
    let source = fs::read_to_string(path).unwrap_or_else(|e| fail_usage(format!("{}: {}", path, e)));

    let stack_size = match matches.value_of("stacksize") {
        Some(s) => parse_size(s).unwrap_or_else(|e| fail_usage(e)),
        None => DEFAULT_STACK_SIZE,
    };
    let memory_size = match matches.value_of("memsize") {
        Some(s) => parse_size(s).unwrap_or_else(|e| fail_usage(e)),
        None => DEFAULT_MEMORY_SIZE,
    };

    let assembled = vasm::assemble(&source).unwrap_or_else(|e| fail_runtime(e));

    let mut vm = Processor::new(assembled.code, &assembled.layout, memory_size, stack_size, assembled.entry_pc)
        .unwrap_or_else(|e| fail_runtime(e));

    let start = std::time::Instant::now();

    if matches.is_present("debug") {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        let mut err = io::stderr();
        if let Err(e) = debugger::run(&mut vm, &mut input, &mut out, &mut err) {
            fail_runtime(e);
        }
    } else if let Err(e) = vm.run() {
        fail_runtime(e);
    }

    let elapsed = start.elapsed();

    if matches.is_present("information") {
        eprintln!(
            "[INFO] executed {} instructions in {:.3}ms",
            vm.counter(),
            elapsed.as_secs_f64() * 1000.0
        );
    }

    if matches.is_present("entropy-hamming") {
        let bits = count_entropy(Measure::HammingWeight, &assembled.layout, &vm);
        eprintln!("[INFO] entropy (hamming weight): {} bits", bits);
    } else if matches.is_present("entropy-words") {
        let bits = count_entropy(Measure::WordDifference, &assembled.layout, &vm);
        eprintln!("[INFO] entropy (word difference): {} bits", bits);
    }

    if !matches.is_present("quiet") {
        let mut stdout = io::stdout();
        print_stack(&vm, &mut stdout).ok();
    }

    if !vm.running() {
        exit(EXIT_OK);
    } else {
        exit(EXIT_RUNTIME_ERROR);
    }
}

fn print_stack<W: Write>(vm: &Processor, out: &mut W) -> io::Result<()> {
    let sp = vm.sp();
    if sp == 0 {
        writeln!(out, "Stack is empty.")
    } else {
        for i in (0..sp).rev() {
            writeln!(out, "{}", vm.stack_peek(i))?;
        }
        Ok(())
    }
}
