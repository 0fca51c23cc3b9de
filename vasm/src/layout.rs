//! Three-pass symbol resolver and memory layout engine.
//!
//! Pass 1 claims fixed addresses requested by `.set` in `.data` and binds
//! the symbols they define. Pass 2 flows the remaining `.data` content
//! around whatever pass 1 claimed. Pass 3 flows `.bss` in the same address
//! space, then `.code` in its own 0-based instruction-index space.

use crate::ast::{Line, LineVariant, Operand, Primitive, Program};
use crate::eval::{restrict_eval, SymbolTable};
use std::collections::BTreeSet;
use vcpu::error::{Error, ErrorKind};

fn bind_symbol(symbols: &mut SymbolTable, name: &str, value: i32) -> Result<(), Error> {
    if symbols.contains_key(name) {
        Err(Error::new(ErrorKind::SymbolRedefinition(name.to_string())))
    } else {
        symbols.insert(name.to_string(), value);
        Ok(())
    }
}

fn bind_labels(symbols: &mut SymbolTable, labels: &[String], value: i32) -> Result<(), Error> {
    for label in labels {
        bind_symbol(symbols, label, value)?;
    }
    Ok(())
}

fn as_fixed_address(address: &Operand) -> Option<i32> {
    restrict_eval(address).ok()
}

fn as_bare_symbol(address: &Operand) -> Option<&str> {
    match address {
        Operand::Primitive(Primitive::Symbol(name)) => Some(name.as_str()),
        _ => None,
    }
}

/// True when a `.set`'s address operand names a bare symbol (a pure
/// symbol-table binding) rather than a fixed memory address.
pub(crate) fn is_symbol_binding(address: &Operand) -> bool {
    as_bare_symbol(address).is_some()
}

fn reserve(reserved: &mut BTreeSet<i32>, address: i32, line: u32) -> Result<(), Error> {
    if !reserved.insert(address) {
        Err(Error::at_line(ErrorKind::SetAddressClash(address), line))
    } else {
        Ok(())
    }
}

/// Pass 1: fixed-address `.set` lines in `.data`.
fn resolve_fixed_sets(
    data: &mut [Line],
    symbols: &mut SymbolTable,
    reserved: &mut BTreeSet<i32>,
) -> Result<(), Error> {
    for line in data.iter_mut() {
        let (address, value) = match &line.variant {
            LineVariant::Set { address, value } => (address.clone(), value.clone()),
            _ => continue,
        };

        if let Some(addr) = as_fixed_address(&address) {
            reserve(reserved, addr, line.source_line)?;
            line.base_address = addr;
            bind_labels(symbols, &line.labels, addr).map_err(|e| e.with_line(line.source_line))?;
        } else if let Some(name) = as_bare_symbol(&address) {
            let resolved = restrict_eval(&value).map_err(|e| e.with_line(line.source_line))?;
            bind_symbol(symbols, name, resolved).map_err(|e| e.with_line(line.source_line))?;
            line.base_address = resolved;
            bind_labels(symbols, &line.labels, resolved)
                .map_err(|e| e.with_line(line.source_line))?;
        } else {
            return Err(Error::at_line(
                ErrorKind::InvalidOperand(
                    ".set address must be a constant expression or a bare symbol".to_string(),
                ),
                line.source_line,
            ));
        }
    }
    Ok(())
}

/// Size in words of a non-`Set` line, as seen by the flowing layout passes.
fn line_size(line: &Line) -> Result<i32, Error> {
    let size = match &line.variant {
        LineVariant::Reserved(expr) => {
            restrict_eval(expr).map_err(|e| e.with_line(line.source_line))?
        }
        LineVariant::Words(words) => words.len() as i32,
        LineVariant::Instruction { .. } => return Err(Error::at_line(ErrorKind::IllegalSectionContent, line.source_line)),
        LineVariant::Set { .. } => 0,
    };
    if size < 0 {
        return Err(Error::at_line(ErrorKind::NegativeOperand(size), line.source_line));
    }
    Ok(size)
}

/// Finds the first address `>= cursor` such that `[address, address+size)` is
/// entirely free, reserves it, and returns it.
fn allocate(reserved: &mut BTreeSet<i32>, cursor: i32, size: i32) -> Result<i32, Error> {
    let mut addr = cursor;
    loop {
        addr.checked_add(size).ok_or_else(|| Error::new(ErrorKind::Overflow))?;
        let clash = (addr..addr + size).any(|a| reserved.contains(&a));
        if !clash {
            for a in addr..addr + size {
                reserved.insert(a);
            }
            return Ok(addr);
        }
        addr = addr.checked_add(1).ok_or_else(|| Error::new(ErrorKind::Overflow))?;
    }
}

/// Pass 2/3 flowing allocation over one section, sharing `cursor`/`reserved`
/// across calls so `.data` and `.bss` occupy the same address space.
fn resolve_flowing(
    lines: &mut [Line],
    allowed: fn(&LineVariant) -> bool,
    symbols: &mut SymbolTable,
    reserved: &mut BTreeSet<i32>,
    cursor: &mut i32,
) -> Result<(), Error> {
    for line in lines.iter_mut() {
        if matches!(line.variant, LineVariant::Set { .. }) {
            continue;
        }
        if !allowed(&line.variant) {
            return Err(Error::at_line(ErrorKind::IllegalSectionContent, line.source_line));
        }
        let size = line_size(line)?;
        let addr = allocate(reserved, *cursor, size).map_err(|e| e.with_line(line.source_line))?;
        line.base_address = addr;
        bind_labels(symbols, &line.labels, addr).map_err(|e| e.with_line(line.source_line))?;
        *cursor = addr + size;
    }
    Ok(())
}

fn resolve_code(code: &mut [Line], symbols: &mut SymbolTable) -> Result<(), Error> {
    let mut cursor = 0i32;
    for line in code.iter_mut() {
        if !matches!(line.variant, LineVariant::Instruction { .. }) {
            return Err(Error::at_line(ErrorKind::IllegalSectionContent, line.source_line));
        }
        line.base_address = cursor;
        bind_labels(symbols, &line.labels, cursor).map_err(|e| e.with_line(line.source_line))?;
        cursor += 1;
    }
    Ok(())
}

fn is_data_content(variant: &LineVariant) -> bool {
    matches!(variant, LineVariant::Reserved(_) | LineVariant::Words(_))
}

fn is_bss_content(variant: &LineVariant) -> bool {
    matches!(variant, LineVariant::Reserved(_))
}

/// Runs all three layout passes over `program`, filling in every line's
/// `base_address` and returning the completed symbol table and the set of
/// addresses claimed in the shared `data`/`bss` address space.
pub fn resolve(program: &mut Program, base_address: i32) -> Result<(SymbolTable, BTreeSet<i32>), Error> {
    let mut symbols = SymbolTable::new();
    let mut reserved = BTreeSet::new();

    resolve_fixed_sets(&mut program.data, &mut symbols, &mut reserved)?;

    let mut cursor = base_address;
    resolve_flowing(&mut program.data, is_data_content, &mut symbols, &mut reserved, &mut cursor)?;
    resolve_flowing(&mut program.bss, is_bss_content, &mut symbols, &mut reserved, &mut cursor)?;

    resolve_code(&mut program.code, &mut symbols)?;

    Ok((symbols, reserved))
}
