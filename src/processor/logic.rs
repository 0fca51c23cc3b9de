//! Instruction dispatch: decoding an encoded word and running its effect.
//!
//! Every opcode pair shares one method, taking a `forward` flag selected by
//! the current [`Direction`] and the word's own direction bit (see
//! `step_instr`). Reversibility falls directly out of this: the backward arm
//! of a pair is always written to be the forward arm's exact undo.

use super::core::{clear, Direction, Processor};
use crate::constants::{sign_extend, DIRECTION_BIT, FALSE, OPCODE_BODY_MASK, TRUE};
use crate::error::{Error, ErrorKind};
use crate::instructions::offset;

impl Processor {
    /// Decodes and executes the instruction at `pc`, without touching `pc` itself.
    pub(super) fn step_instr(&mut self) -> Result<(), Error> {
        let index = self.pc;
        if index < 0 || index as usize >= self.program.len() {
            return Err(Error::new(ErrorKind::InvalidArgument(format!(
                "program counter {} out of range",
                index
            ))));
        }
        let word = self.program[index as usize];
        let raw_opcode = (word >> 16) as u16;
        let operand_raw = (word & 0xFFFF) as u16;
        let operand = sign_extend(operand_raw);

        let effective_opcode = match self.dir {
            Direction::Forward => raw_opcode,
            Direction::Backward => raw_opcode ^ DIRECTION_BIT,
        };
        let body = (effective_opcode & OPCODE_BODY_MASK) as usize;
        let forward = (effective_opcode & DIRECTION_BIT) == 0;

        match body {
            offset::START_STOP => self.op_start_stop(forward),
            offset::NOP => Ok(()),
            offset::PUSHC_POPC => self.op_pushc_popc(forward, operand),
            offset::DUP_UNDUP => self.op_dup_undup(forward),
            offset::SWAP => self.op_swap(),
            offset::BURY_DIG => self.op_bury_dig(forward),
            offset::ALLOCPAR_RELEASEPAR => self.op_allocpar_releasepar(forward, operand),
            offset::ASF_RSF => self.op_asf_rsf(forward, operand),
            offset::PUSHL_POPL => self.op_pushl_popl(forward, operand),
            offset::CALL => self.op_call(),
            offset::UNCALL => self.op_uncall(),
            offset::BRANCH => self.op_branch(operand),
            offset::BRT => self.op_brt(operand),
            offset::BRF => self.op_brf(operand),
            offset::PUSHTRUE_POPTRUE => self.op_pushtrue_poptrue(forward),
            offset::PUSHFALSE_POPFALSE => self.op_pushfalse_popfalse(forward),
            offset::CMPUSHEQ_CMPOPEQ => self.op_cmp(forward, |a, b| a == b),
            offset::CMPUSHNE_CMPOPNE => self.op_cmp(forward, |a, b| a != b),
            offset::CMPUSHLT_CMPOPLT => self.op_cmp(forward, |a, b| a < b),
            offset::CMPUSHLE_CMPOPLE => self.op_cmp(forward, |a, b| a <= b),
            offset::INC_DEC => self.op_inc_dec(forward, operand),
            offset::NEG => self.op_neg(),
            offset::ADD_SUB => self.op_add_sub(forward),
            offset::XOR => self.op_xor(),
            offset::SHL_SHR => self.op_shl_shr(forward),
            offset::ARPUSHADD_ARPOPADD => self.op_ar(forward, i32::wrapping_add),
            offset::ARPUSHSUB_ARPOPSUB => self.op_ar(forward, i32::wrapping_sub),
            offset::ARPUSHMUL_ARPOPMUL => self.op_ar(forward, i32::wrapping_mul),
            offset::ARPUSHDIV_ARPOPDIV => self.op_ar_checked(forward, |a, b| {
                a.checked_div(b)
                    .ok_or_else(|| Error::new(ErrorKind::InvalidArgument("division by zero".to_string())))
            }),
            offset::ARPUSHMOD_ARPOPMOD => self.op_ar_checked(forward, |a, b| {
                a.checked_rem(b)
                    .ok_or_else(|| Error::new(ErrorKind::InvalidArgument("division by zero".to_string())))
            }),
            offset::ARPUSHAND_ARPOPAND => self.op_ar(forward, |a, b| a & b),
            offset::ARPUSHOR_ARPOPOR => self.op_ar(forward, |a, b| a | b),
            offset::PUSHM_POPM => self.op_pushm_popm(forward, operand),
            offset::LOAD_STORE => self.op_load_store(forward, operand),
            offset::MEMSWAP => self.op_memswap(),
            offset::XORHC => self.op_xorhc(operand_raw),
            _ => Err(Error::new(ErrorKind::IllegalInstruction {
                instruction: word,
                opcode: effective_opcode,
            })),
        }
    }

    fn op_start_stop(&mut self, forward: bool) -> Result<(), Error> {
        if forward {
            if self.running {
                return Err(Error::new(ErrorKind::AlreadyRunning(true)));
            }
            self.running = true;
        } else {
            if !self.running {
                return Err(Error::new(ErrorKind::AlreadyRunning(false)));
            }
            self.running = false;
        }
        Ok(())
    }

    fn op_pushc_popc(&mut self, forward: bool, operand: i32) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            self.stack[self.sp as usize] = operand;
            self.sp += 1;
        } else {
            self.requires(1)?;
            self.sp -= 1;
            clear(&mut self.stack[self.sp as usize], operand)?;
        }
        Ok(())
    }

    fn op_dup_undup(&mut self, forward: bool) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            self.requires(1)?;
            self.stack[self.sp as usize] = self.stack[(self.sp - 1) as usize];
            self.sp += 1;
        } else {
            self.requires(2)?;
            self.sp -= 1;
            let below = self.stack[(self.sp - 1) as usize];
            clear(&mut self.stack[self.sp as usize], below)?;
        }
        Ok(())
    }

    fn op_swap(&mut self) -> Result<(), Error> {
        self.requires(2)?;
        let sp = self.sp as usize;
        self.stack.swap(sp - 1, sp - 2);
        Ok(())
    }

    /// `bury` rotates the top three cells so the deepest comes to the top;
    /// `dig` is its exact inverse.
    fn op_bury_dig(&mut self, forward: bool) -> Result<(), Error> {
        self.requires(3)?;
        let sp = self.sp as usize;
        let (a, b, c) = (self.stack[sp - 1], self.stack[sp - 2], self.stack[sp - 3]);
        if forward {
            self.stack[sp - 3] = a;
            self.stack[sp - 2] = c;
            self.stack[sp - 1] = b;
        } else {
            self.stack[sp - 1] = c;
            self.stack[sp - 2] = a;
            self.stack[sp - 3] = b;
        }
        Ok(())
    }

    fn op_allocpar_releasepar(&mut self, forward: bool, operand: i32) -> Result<(), Error> {
        self.assert_positive(operand)?;
        if forward {
            self.pushes(operand)?;
            self.sp += operand;
        } else {
            self.requires(operand)?;
            for i in 1..=operand {
                clear(&mut self.stack[(self.sp - i) as usize], 0)?;
            }
            self.sp -= operand;
        }
        Ok(())
    }

    /// `asf` pushes `operand` fresh locals plus a saved `fp`, then makes the
    /// new frame current. `rsf` clears the locals, restores the saved `fp`
    /// and leaves a zeroed cell behind where it was stored.
    fn op_asf_rsf(&mut self, forward: bool, operand: i32) -> Result<(), Error> {
        self.assert_positive(operand)?;
        if forward {
            self.pushes(operand + 1)?;
            self.stack[self.sp as usize] = self.fp;
            self.fp = self.sp;
            self.sp += operand + 1;
        } else {
            self.requires(operand + 1)?;
            for i in 1..=operand {
                clear(&mut self.stack[(self.sp - i) as usize], 0)?;
            }
            self.sp -= operand + 1;
            let new_sp = self.sp;
            clear(&mut self.fp, new_sp)?;
            std::mem::swap(&mut self.fp, &mut self.stack[self.sp as usize]);
        }
        Ok(())
    }

    fn op_pushl_popl(&mut self, forward: bool, operand: i32) -> Result<(), Error> {
        let local = self.fp + operand;
        if local < 0 || local as usize >= self.stack.len() {
            return Err(Error::new(ErrorKind::InvalidArgument(format!(
                "local index {} out of range",
                local
            ))));
        }
        if forward {
            self.pushes(1)?;
            let sp = self.sp as usize;
            self.stack.swap(sp, local as usize);
            self.sp += 1;
        } else {
            self.requires(1)?;
            self.sp -= 1;
            let sp = self.sp as usize;
            self.stack.swap(sp, local as usize);
            clear(&mut self.stack[sp], 0)?;
        }
        Ok(())
    }

    fn op_call(&mut self) -> Result<(), Error> {
        self.requires(1)?;
        std::mem::swap(&mut self.br, &mut self.stack[(self.sp - 1) as usize]);
        Ok(())
    }

    fn op_uncall(&mut self) -> Result<(), Error> {
        self.requires(1)?;
        self.br = -self.br;
        self.stack[(self.sp - 1) as usize] = -self.stack[(self.sp - 1) as usize];
        std::mem::swap(&mut self.br, &mut self.stack[(self.sp - 1) as usize]);
        self.dir = self.dir.invert();
        Ok(())
    }

    fn op_branch(&mut self, operand: i32) -> Result<(), Error> {
        self.br += self.dir.value() * operand;
        Ok(())
    }

    fn op_brt(&mut self, operand: i32) -> Result<(), Error> {
        self.requires(1)?;
        if self.stack[(self.sp - 1) as usize] == TRUE {
            self.br += self.dir.value() * operand;
        }
        Ok(())
    }

    fn op_brf(&mut self, operand: i32) -> Result<(), Error> {
        self.requires(1)?;
        if self.stack[(self.sp - 1) as usize] == FALSE {
            self.br += self.dir.value() * operand;
        }
        Ok(())
    }

    fn op_pushtrue_poptrue(&mut self, forward: bool) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            self.stack[self.sp as usize] = TRUE;
            self.sp += 1;
        } else {
            self.requires(1)?;
            self.sp -= 1;
            clear(&mut self.stack[self.sp as usize], TRUE)?;
        }
        Ok(())
    }

    fn op_pushfalse_popfalse(&mut self, forward: bool) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            self.stack[self.sp as usize] = FALSE;
            self.sp += 1;
        } else {
            self.requires(1)?;
            self.sp -= 1;
            clear(&mut self.stack[self.sp as usize], FALSE)?;
        }
        Ok(())
    }

    /// Shared body for the four `cmpush*`/`cmpop*` pairs: push evaluates the
    /// comparator and leaves the two operands in place, pop verifies the
    /// result it finds matches what the comparator would produce.
    fn op_cmp(&mut self, forward: bool, op: fn(i32, i32) -> bool) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            self.requires(2)?;
            let sp = self.sp as usize;
            let result = if op(self.stack[sp - 1], self.stack[sp - 2]) { TRUE } else { FALSE };
            self.stack[sp] = result;
            self.sp += 1;
        } else {
            self.requires(3)?;
            self.sp -= 1;
            let sp = self.sp as usize;
            let result = if op(self.stack[sp - 1], self.stack[sp - 2]) { TRUE } else { FALSE };
            clear(&mut self.stack[sp], result)?;
        }
        Ok(())
    }

    fn op_inc_dec(&mut self, forward: bool, operand: i32) -> Result<(), Error> {
        self.requires(1)?;
        let top = &mut self.stack[(self.sp - 1) as usize];
        if forward {
            *top = top.wrapping_add(operand);
        } else {
            *top = top.wrapping_sub(operand);
        }
        Ok(())
    }

    fn op_neg(&mut self) -> Result<(), Error> {
        self.requires(1)?;
        let top = &mut self.stack[(self.sp - 1) as usize];
        *top = top.wrapping_neg();
        Ok(())
    }

    fn op_add_sub(&mut self, forward: bool) -> Result<(), Error> {
        self.requires(2)?;
        let sp = self.sp as usize;
        let rhs = self.stack[sp - 2];
        let lhs = &mut self.stack[sp - 1];
        if forward {
            *lhs = lhs.wrapping_add(rhs);
        } else {
            *lhs = lhs.wrapping_sub(rhs);
        }
        Ok(())
    }

    fn op_xor(&mut self) -> Result<(), Error> {
        self.requires(2)?;
        let sp = self.sp as usize;
        self.stack[sp - 1] ^= self.stack[sp - 2];
        Ok(())
    }

    fn op_shl_shr(&mut self, forward: bool) -> Result<(), Error> {
        self.requires(2)?;
        let sp = self.sp as usize;
        let amount = (self.stack[sp - 2] as u32) % 32;
        let value = self.stack[sp - 1] as u32;
        let rotated = if forward {
            value.rotate_left(amount)
        } else {
            value.rotate_right(amount)
        };
        self.stack[sp - 1] = rotated as i32;
        Ok(())
    }

    /// Shared body for the seven `arpush*`/`arpop*` pairs, for operators that
    /// can never fail (wrapping add/sub/mul, bitwise and/or).
    fn op_ar(&mut self, forward: bool, op: fn(i32, i32) -> i32) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            self.requires(2)?;
            let sp = self.sp as usize;
            self.stack[sp] = op(self.stack[sp - 1], self.stack[sp - 2]);
            self.sp += 1;
        } else {
            self.requires(3)?;
            self.sp -= 1;
            let sp = self.sp as usize;
            let expected = op(self.stack[sp - 1], self.stack[sp - 2]);
            clear(&mut self.stack[sp], expected)?;
        }
        Ok(())
    }

    /// Same shape as `op_ar`, for div/mod, which can fail on a zero divisor.
    fn op_ar_checked(
        &mut self,
        forward: bool,
        op: fn(i32, i32) -> Result<i32, Error>,
    ) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            self.requires(2)?;
            let sp = self.sp as usize;
            let value = op(self.stack[sp - 1], self.stack[sp - 2])?;
            self.stack[sp] = value;
            self.sp += 1;
        } else {
            self.requires(3)?;
            self.sp -= 1;
            let sp = self.sp as usize;
            let expected = op(self.stack[sp - 1], self.stack[sp - 2])?;
            clear(&mut self.stack[sp], expected)?;
        }
        Ok(())
    }

    fn op_pushm_popm(&mut self, forward: bool, operand: i32) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            let sp = self.sp as usize;
            self.memory.swap(operand, &mut self.stack[sp])?;
            self.sp += 1;
        } else {
            self.requires(1)?;
            self.sp -= 1;
            let sp = self.sp as usize;
            self.memory.swap(operand, &mut self.stack[sp])?;
            clear(&mut self.stack[sp], 0)?;
        }
        Ok(())
    }

    fn op_load_store(&mut self, forward: bool, operand: i32) -> Result<(), Error> {
        if forward {
            self.pushes(1)?;
            self.requires(1)?;
            let sp = self.sp as usize;
            let address = self.stack[sp - 1] + operand;
            self.memory.swap(address, &mut self.stack[sp])?;
            self.sp += 1;
        } else {
            self.requires(2)?;
            self.sp -= 1;
            let sp = self.sp as usize;
            let address = self.stack[sp - 1] + operand;
            self.memory.swap(address, &mut self.stack[sp])?;
            clear(&mut self.stack[sp], 0)?;
        }
        Ok(())
    }

    fn op_memswap(&mut self) -> Result<(), Error> {
        self.requires(2)?;
        let sp = self.sp as usize;
        let a = self.stack[sp - 1];
        let b = self.stack[sp - 2];
        let va = self.memory.get(a)?;
        let vb = self.memory.get(b)?;
        *self.memory.get_mut(a)? = vb;
        *self.memory.get_mut(b)? = va;
        Ok(())
    }

    /// Xors the true high bits of a 32-bit constant into the top of stack.
    /// Paired with a preceding `pushc` of the constant's low 16 bits (which
    /// `pushc`/`popc` sign-extend); see [`encode_upper`] for how the
    /// assembler computes this operand so the pair reconstructs the original
    /// value exactly.
    fn op_xorhc(&mut self, operand_raw: u16) -> Result<(), Error> {
        self.requires(1)?;
        let sp = self.sp as usize;
        let delta = (operand_raw as u32) << 15;
        self.stack[sp - 1] = ((self.stack[sp - 1] as u32) ^ delta) as i32;
        Ok(())
    }
}

/// Computes the `Upper`-mode operand an assembler must emit for `xorhc` so
/// that, combined with a preceding `pushc` of `x`'s low 16 bits, the pair
/// reconstructs `x` exactly.
///
/// `pushc`/`popc` sign-extend their 16-bit operand, so whenever bit 15 of `x`
/// is set the naive high bits need complementing to cancel that sign
/// extension before `xorhc` applies the true upper bits.
///
/// # Examples
/// ```
/// use vcpu::processor::encode_upper;
///
/// let x: i32 = 0x0001_2345;
/// let low = x as i16 as i32;
/// let upper = encode_upper(x);
/// let reconstructed = ((low as u32) ^ ((upper as u32) << 15)) as i32;
/// assert_eq!(reconstructed, x);
/// ```
pub fn encode_upper(x: i32) -> u16 {
    let xu = x as u32;
    let slice = ((xu >> 15) & 0xFFFF) as u16;
    if xu & 0x8000 != 0 {
        !slice
    } else {
        slice
    }
}
