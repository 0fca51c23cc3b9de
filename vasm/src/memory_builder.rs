//! Builds the initial [`MemoryLayout`] by evaluating every `.data`/`.bss`
//! line now that the symbol table and every line's `base_address` are known.

use crate::ast::{Line, LineVariant, Program};
use crate::eval::{eval, SymbolTable};
use crate::layout::is_symbol_binding;
use vcpu::error::Error;
use vcpu::memory::MemoryLayout;

fn write_line(layout: &mut MemoryLayout, symbols: &SymbolTable, line: &Line) -> Result<(), Error> {
    match &line.variant {
        LineVariant::Words(words) => {
            for (i, word) in words.iter().enumerate() {
                let address = line.base_address + i as i32;
                let value = eval(word, address, symbols).map_err(|e| e.with_line(line.source_line))?;
                layout.insert(address, value);
            }
        }
        LineVariant::Set { address, value } => {
            // A pure symbol binding (`.set name = expr`) has nothing to
            // store; only a fixed-address `.set` places a value in memory.
            if !is_symbol_binding(address) {
                let resolved = eval(value, line.base_address, symbols)
                    .map_err(|e| e.with_line(line.source_line))?;
                layout.insert(line.base_address, resolved);
            }
        }
        LineVariant::Reserved(_) => {}
        LineVariant::Instruction { .. } => {}
    }
    Ok(())
}

/// Fills a [`MemoryLayout`] from `.data` and `.bss`. Must run after
/// [`crate::layout::resolve`] has filled in `base_address` on every line.
pub fn build(program: &Program, symbols: &SymbolTable) -> Result<MemoryLayout, Error> {
    let mut layout = MemoryLayout::new();
    for line in program.data.iter().chain(program.bss.iter()) {
        write_line(&mut layout, symbols, line)?;
    }
    Ok(layout)
}
