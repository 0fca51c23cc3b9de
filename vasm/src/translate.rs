//! Walks the laid-out `.code` section once, producing the encoded program
//! and locating the single mandatory entry point.

use crate::ast::{LineVariant, Program};
use crate::eval::{eval, SymbolTable};
use vcpu::constants::{low16, OPERAND_MASK, OPERAND_WIDTH};
use vcpu::error::{Error, ErrorKind};
use vcpu::instructions::{self, offset, OperandMode};
use vcpu::processor::encode_upper;

/// Translates `program.code` into its encoded word vector and entry PC.
///
/// Requires that [`crate::layout::resolve`] has already filled in every
/// line's `base_address`.
pub fn translate(program: &Program, symbols: &SymbolTable) -> Result<(Vec<u32>, i32), Error> {
    let mut words = Vec::with_capacity(program.code.len());
    let mut entry_pc: Option<i32> = None;
    let mut seen_stop = false;

    for line in &program.code {
        let (table_offset, is_forward, operand) = match &line.variant {
            LineVariant::Instruction { offset, is_forward, operand } => (*offset, *is_forward, operand),
            _ => return Err(Error::at_line(ErrorKind::IllegalSectionContent, line.source_line)),
        };

        let entry = instructions::lookup(table_offset).ok_or_else(|| {
            Error::at_line(
                ErrorKind::InvalidOperand(format!("unknown instruction offset {}", table_offset)),
                line.source_line,
            )
        })?;

        if table_offset == offset::START_STOP {
            if is_forward {
                if entry_pc.is_some() {
                    return Err(Error::at_line(ErrorKind::StartStopPresence("start"), line.source_line));
                }
                entry_pc = Some(line.base_address);
            } else {
                if seen_stop {
                    return Err(Error::at_line(ErrorKind::StartStopPresence("stop"), line.source_line));
                }
                seen_stop = true;
            }
        }

        let raw_value = eval(operand, line.base_address, symbols).map_err(|e| e.with_line(line.source_line))?;

        let operand_field: u16 = match entry.mode {
            OperandMode::NoOperand => {
                if raw_value != 0 {
                    eprintln!(
                        "[WARN] Line {}: operand of '{}' is ignored; forcing it to zero.",
                        line.source_line,
                        instructions::mnemonic_for(entry, is_forward)
                    );
                }
                0
            }
            OperandMode::Absolute => low16(raw_value),
            OperandMode::Relative => low16(raw_value - line.base_address),
            OperandMode::Upper => encode_upper(raw_value),
        };

        let opcode = entry.encoded_opcode(is_forward);
        let word = ((opcode as u32) << OPERAND_WIDTH) | (operand_field as u32 & OPERAND_MASK);
        words.push(word);
    }

    let entry_pc = entry_pc.ok_or_else(|| Error::new(ErrorKind::StartStopPresence("start")))?;
    if !seen_stop {
        return Err(Error::new(ErrorKind::StartStopPresence("stop")));
    }

    Ok((words, entry_pc))
}
