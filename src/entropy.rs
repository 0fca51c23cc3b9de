//! Reports how much information remains in machine state after a program runs.
//!
//! A fully "cleared" reversible program leaves every memory cell and stack slot
//! exactly as it started; anything left over is unintended information leakage.
//! This module measures that leftover, either in bits (Hamming weight of the
//! difference) or in whole 32-bit words that differ at all.

use crate::memory::MemoryLayout;
use crate::processor::Processor;

/// Which metric to use when comparing final state against the original layout.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Measure {
    /// Sum of differing bits between final and original words (via `popcount(a ^ b)`).
    HammingWeight,
    /// Count of 32-bit words that differ at all, each counted as 32 bits.
    WordDifference,
}

fn hamming_weight(a: i32, b: i32) -> u32 {
    ((a ^ b) as u32).count_ones()
}

fn word_difference(a: i32, b: i32) -> u32 {
    if a != b {
        1
    } else {
        0
    }
}

/// Compares `processor`'s final memory and stack against `original_memory`
/// (the layout computed by the assembler before execution) using `measure`.
///
/// Returns the number of bits of leftover information. For [`Measure::WordDifference`]
/// this is already multiplied by 32 to be directly comparable to
/// [`Measure::HammingWeight`]'s result.
pub fn count_entropy(measure: Measure, original_memory: &MemoryLayout, processor: &Processor) -> u64 {
    let word_fn: fn(i32, i32) -> u32 = match measure {
        Measure::HammingWeight => hamming_weight,
        Measure::WordDifference => word_difference,
    };

    let mut result: u64 = 0;
    for (address, value) in processor.memory_iter() {
        let expected = original_memory.get(&address).copied().unwrap_or(0);
        result += word_fn(value, expected) as u64;
    }
    for index in 0..processor.sp() {
        result += word_fn(processor.stack_peek(index), 0) as u64;
    }
    result += word_fn(processor.sp(), 0) as u64;

    match measure {
        Measure::HammingWeight => result,
        Measure::WordDifference => result * 32,
    }
}
