//! Operand evaluation: resolving an [`Operand`] expression to a 32-bit value.

use crate::ast::{Operand, Primitive};
use std::collections::HashMap;
use vcpu::error::{Error, ErrorKind};

pub type SymbolTable = HashMap<String, i32>;

fn eval_primitive(
    primitive: &Primitive,
    position: i32,
    symbols: &SymbolTable,
) -> Result<i32, Error> {
    match primitive {
        Primitive::Constant(value) => Ok(*value),
        Primitive::Symbol(name) => symbols
            .get(name)
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::InvalidOperand(format!("undefined symbol '{}'", name)))),
        Primitive::Relative(delta) => Ok(position + delta),
        Primitive::NoOperand => Ok(0),
    }
}

/// Fully resolves an operand, given the position of the line it belongs to
/// (its `base_address`) and the completed symbol table.
pub fn eval(operand: &Operand, position: i32, symbols: &SymbolTable) -> Result<i32, Error> {
    match operand {
        Operand::Primitive(p) => eval_primitive(p, position, symbols),
        Operand::Add(lhs, rhs) => Ok(eval_primitive(lhs, position, symbols)?
            .wrapping_add(eval_primitive(rhs, position, symbols)?)),
        Operand::Sub(lhs, rhs) => Ok(eval_primitive(lhs, position, symbols)?
            .wrapping_sub(eval_primitive(rhs, position, symbols)?)),
    }
}

fn restrict_primitive(primitive: &Primitive) -> Result<i32, Error> {
    match primitive {
        Primitive::Constant(value) => Ok(*value),
        Primitive::Symbol(name) => Err(Error::new(ErrorKind::InvalidOperand(format!(
            "'{}' is not a constant expression",
            name
        )))),
        Primitive::Relative(_) => Err(Error::new(ErrorKind::InvalidOperand(
            "'$' is not a constant expression".to_string(),
        ))),
        Primitive::NoOperand => Ok(0),
    }
}

/// Evaluates an operand that must not reference any symbol or `$`, used
/// during layout before the symbol table is complete (fixed-address `.set`s
/// and reserved-space sizes).
pub fn restrict_eval(operand: &Operand) -> Result<i32, Error> {
    match operand {
        Operand::Primitive(p) => restrict_primitive(p),
        Operand::Add(lhs, rhs) => {
            Ok(restrict_primitive(lhs)?.wrapping_add(restrict_primitive(rhs)?))
        }
        Operand::Sub(lhs, rhs) => {
            Ok(restrict_primitive(lhs)?.wrapping_sub(restrict_primitive(rhs)?))
        }
    }
}
