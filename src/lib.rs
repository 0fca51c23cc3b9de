//! Core types for the reversible stack machine: the encoded instruction
//! format, the opcode table, data memory and the execution core itself.
//!
//! Assembling source text into a runnable program lives in the separate
//! `vasm` crate; the command-line front end and debugger live in `vm`.

pub mod constants;
pub mod entropy;
pub mod error;
pub mod instructions;
pub mod memory;
pub mod processor;
