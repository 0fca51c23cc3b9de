//! Assembler for the [vcpu](../vcpu/index.html) reversible stack machine.
//!
//! [`assemble`] accepts a program written in the VASM source language and
//! produces the encoded instruction vector, the initial [`MemoryLayout`] and
//! the entry program counter, ready to be handed to
//! [`vcpu::processor::Processor::new`].
//!
//! # VASM Assembler Language
//!
//! A program consists of up to three sections, introduced by `.code`,
//! `.data` and `.bss` headers; they may appear in any order but each is
//! read only once. Comments start with `#` and run to end of line. Lines
//! may carry zero or more `label:` prefixes before their content.
//!
//! `.code` holds one instruction per line: a mnemonic from the instruction
//! table, optionally followed by an operand expression. `.data` and `.bss`
//! hold `.word expr, expr, …` (initialised words), `.reserve expr`
//! (zero-initialised words) and `.set addr = expr` (either fixes a literal
//! address's contents, or — when the left side is a bare identifier — binds
//! that identifier to a constant in the symbol table without reserving any
//! memory).
//!
//! An operand expression is an integer literal, a symbol reference, `$`
//! (the line's own address), or a `+`/`-` of two such terms.

mod ast;
mod eval;
mod layout;
mod memory_builder;
mod parser;
mod translate;


pub use ast::{Line, LineVariant, Operand, Primitive, Program};
pub use eval::SymbolTable;

use vcpu::error::Error;
use vcpu::memory::MemoryLayout;

/// The result of assembling a program: its encoded instructions, the
/// initial contents of data memory, and the PC to start execution at.
pub struct Assembled {
    pub code: Vec<u32>,
    pub layout: MemoryLayout,
    pub entry_pc: i32,
    pub symbols: SymbolTable,
}

/// Parses, resolves and translates `source`, starting the `.data`/`.bss`
/// address space at `base_address`.
pub fn assemble_addressed(source: &str, base_address: i32) -> Result<Assembled, Error> {
    let mut program = parser::parse(source)?;
    let (symbols, _reserved) = layout::resolve(&mut program, base_address)?;
    let layout = memory_builder::build(&program, &symbols)?;
    let (code, entry_pc) = translate::translate(&program, &symbols)?;
    Ok(Assembled { code, layout, entry_pc, symbols })
}

/// Parses, resolves and translates `source`, with the `.data`/`.bss`
/// address space starting at `0`.
pub fn assemble(source: &str) -> Result<Assembled, Error> {
    assemble_addressed(source, 0)
}
