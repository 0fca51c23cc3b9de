//! A [pest]-based parser turning assembly source text into a [`Program`].
//!
//! Grammar-level syntax (tokens, comments, the operand expression shape) is
//! `vasm.pest`; everything section-order-sensitive (label accumulation,
//! rejecting content before the first section header, rejecting a reopened
//! section, looking up mnemonics) is resolved by walking the parse tree
//! below, same as it would be walking a token stream.
//!
//! [pest]: https://docs.rs/pest/

use crate::ast::{Line, LineVariant, Operand, Primitive, Program};
use pest::iterators::Pair;
use pest_derive::Parser;
use vcpu::error::{Error, ErrorKind};
use vcpu::instructions::lookup_mnemonic;

#[derive(Parser)]
#[grammar = "vasm.pest"]
struct VASMParser;

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
enum Section {
    Code,
    Data,
    Bss,
}

fn parse_error(line: u32, message: impl Into<String>) -> Error {
    Error::at_line(ErrorKind::ParseError(message.into()), line)
}

fn line_number(pair: &Pair<Rule>) -> u32 {
    pair.as_span().start_pos().line_col().0 as u32
}

fn convert_pest_error(err: pest::error::Error<Rule>) -> Error {
    let line = match err.line_col() {
        pest::error::LineColLocation::Pos((line, _)) => line,
        pest::error::LineColLocation::Span((line, _), _) => line,
    };
    parse_error(line as u32, err.to_string())
}

fn build_primitive(pair: Pair<Rule>) -> Result<Primitive, Error> {
    let line = line_number(&pair);
    match pair.as_rule() {
        Rule::relative => Ok(Primitive::Relative(0)),
        Rule::hex_integer => i32::from_str_radix(&pair.as_str()[2..], 16)
            .map(Primitive::Constant)
            .map_err(|_| parse_error(line, "Hexadecimal literal out of range.")),
        Rule::integer => pair
            .as_str()
            .parse::<i32>()
            .map(Primitive::Constant)
            .map_err(|_| parse_error(line, "Decimal literal out of range.")),
        Rule::identifier => Ok(Primitive::Symbol(pair.as_str().to_string())),
        other => unreachable!("unexpected primitive rule {:?}", other),
    }
}

fn build_operand(pair: Pair<Rule>) -> Result<Operand, Error> {
    debug_assert_eq!(pair.as_rule(), Rule::operand);
    let mut inner = pair.into_inner();
    let lhs = build_primitive(inner.next().unwrap())?;
    match inner.next() {
        None => Ok(Operand::Primitive(lhs)),
        Some(binop) => {
            let rhs = build_primitive(inner.next().unwrap())?;
            match binop.as_str() {
                "+" => Ok(Operand::Add(lhs, rhs)),
                "-" => Ok(Operand::Sub(lhs, rhs)),
                other => unreachable!("unexpected binop {:?}", other),
            }
        }
    }
}

fn build_line_variant(pair: Pair<Rule>, line_no: u32) -> Result<LineVariant, Error> {
    match pair.as_rule() {
        Rule::word_directive => {
            let operands = pair.into_inner().map(build_operand).collect::<Result<Vec<_>, _>>()?;
            Ok(LineVariant::Words(operands))
        }
        Rule::reserve_directive => {
            Ok(LineVariant::Reserved(build_operand(pair.into_inner().next().unwrap())?))
        }
        Rule::set_directive => {
            let mut inner = pair.into_inner();
            let address = build_operand(inner.next().unwrap())?;
            let value = build_operand(inner.next().unwrap())?;
            Ok(LineVariant::Set { address, value })
        }
        Rule::instruction => {
            let mut inner = pair.into_inner();
            let mnemonic = inner.next().unwrap();
            let head = mnemonic.as_str();
            if head.starts_with('.') {
                return Err(parse_error(line_no, format!("Unknown directive '{}'.", head)));
            }
            let (offset, is_forward) = lookup_mnemonic(head)
                .ok_or_else(|| parse_error(line_no, format!("Unknown mnemonic '{}'.", head)))?;
            let operand = match inner.next() {
                Some(p) => build_operand(p)?,
                None => Operand::no_operand(),
            };
            Ok(LineVariant::Instruction { offset, is_forward, operand })
        }
        other => unreachable!("unexpected line content rule {:?}", other),
    }
}

/// Parses complete assembly source text into a [`Program`].
pub fn parse(source: &str) -> Result<Program, Error> {
    use pest::Parser as _;

    let mut parsed = VASMParser::parse(Rule::program, source).map_err(convert_pest_error)?;
    let program_pair = parsed.next().unwrap();

    let mut program = Program::default();
    let mut active: Option<Section> = None;
    let mut finished: Vec<Section> = Vec::new();
    let mut pending_labels: Vec<String> = Vec::new();
    let mut last_line = 0u32;

    for line_pair in program_pair.into_inner() {
        if line_pair.as_rule() == Rule::EOI {
            continue;
        }

        let line_no = line_number(&line_pair);
        last_line = last_line.max(line_no);

        let mut labels = Vec::new();
        let mut content: Option<Pair<Rule>> = None;
        for child in line_pair.into_inner() {
            if child.as_rule() == Rule::label {
                labels.push(child.into_inner().next().unwrap().as_str().to_string());
            } else {
                content = Some(child);
            }
        }

        let content = match content {
            Some(content) => content,
            None => {
                pending_labels.extend(labels);
                continue;
            }
        };

        if content.as_rule() == Rule::section_header {
            let section = match content.as_str() {
                ".code" => Section::Code,
                ".data" => Section::Data,
                ".bss" => Section::Bss,
                other => unreachable!("unknown section header {:?}", other),
            };
            if active != Some(section) {
                if finished.contains(&section) {
                    return Err(parse_error(
                        line_no,
                        format!("Section {} is reopened after already being closed.", content.as_str()),
                    ));
                }
                if let Some(previous) = active {
                    finished.push(previous);
                }
                active = Some(section);
            }
            continue;
        }

        let active_section = active
            .ok_or_else(|| parse_error(line_no, "Content appears before any section header."))?;

        let variant = build_line_variant(content, line_no)?;

        let mut all_labels = std::mem::take(&mut pending_labels);
        all_labels.extend(labels);
        let line = Line::new(all_labels, line_no, variant);

        match active_section {
            Section::Code => program.code.push(line),
            Section::Data => program.data.push(line),
            Section::Bss => program.bss.push(line),
        }
    }

    if !pending_labels.is_empty() {
        return Err(parse_error(last_line.max(1), "Labels at end of file with no following content."));
    }

    Ok(program)
}
