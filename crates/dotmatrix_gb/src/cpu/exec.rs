mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::{Bus, Cpu};

/// Result of decoding and executing one opcode.
///
/// The hardware's eleven opcode holes have no instruction behind them;
/// surfacing them as a distinct variant lets callers and tests assert
/// table coverage instead of scraping log output. [`Cpu::step`] converts
/// `Unimplemented` into a logged 4-cycle no-op so execution keeps going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The instruction ran; the payload is its cost in T-cycles.
    Handled(u32),
    /// No instruction exists for this opcode value.
    Unimplemented { opcode: u8, addr: u16 },
}

impl Cpu {
    /// Decode and execute a single opcode.
    ///
    /// The match below is deliberately wildcard-free: together with the
    /// explicit opcode-hole arm it covers all 256 byte values, so any gap
    /// in the table is a compile error rather than a runtime surprise.
    /// Instructions are grouped by their bit-level encoding families and
    /// the group handlers extract register/condition fields from the
    /// opcode, which keeps the near-identical variants (`LD r,r'`,
    /// `ADD A,r`, ...) in single data-driven handlers.
    pub fn exec_opcode<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> ExecOutcome {
        let cycles = match opcode {
            // NOP
            0x00 => 4,

            // Prefix byte: dispatch through the extended table.
            0xCB => self.step_cb(bus),

            // LD rr,d16
            0x01 | 0x11 | 0x21 | 0x31 => self.exec_ld_rr_d16(bus, opcode),

            // RLCA / RRCA / RLA / RRA
            0x07 | 0x0F | 0x17 | 0x1F => self.exec_rotate_a(opcode),

            // INC rr / DEC rr
            0x03 | 0x13 | 0x23 | 0x33 => self.exec_inc16_rr(opcode),
            0x0B | 0x1B | 0x2B | 0x3B => self.exec_dec16_rr(opcode),

            // LD r,d8 (including LD (HL),d8)
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                self.exec_ld_r_d8(bus, opcode)
            }

            // The LD r,r' matrix, with HALT in the 0x76 slot.
            0x40..=0x7F => self.exec_ld_rr_or_halt(bus, opcode),

            // LD (BC/DE/HL+/HL-),A and LD A,(BC/DE/HL+/HL-)
            0x02 | 0x12 | 0x22 | 0x32 => self.exec_ld_indirect_a(bus, opcode),
            0x0A | 0x1A | 0x2A | 0x3A => self.exec_ld_a_indirect(bus, opcode),

            // LD (a16),SP
            0x08 => self.exec_ld_a16_sp(bus),

            // STOP
            0x10 => self.exec_stop(bus),

            // LDH (a8),A / LDH A,(a8) and the (C) variants
            0xE0 | 0xF0 => self.exec_ldh_a8(bus, opcode),
            0xE2 | 0xF2 => self.exec_ldh_c(bus, opcode),

            // LD (a16),A / LD A,(a16)
            0xEA | 0xFA => self.exec_ld_a16_a(bus, opcode),

            // SP arithmetic: ADD SP,r8 / LD HL,SP+r8 / LD SP,HL
            0xE8 => self.exec_add_sp_r8(bus),
            0xF8 => self.exec_ld_hl_sp_r8(bus),
            0xF9 => self.exec_ld_sp_hl(),

            // Relative jumps.
            0x18 => self.jr(bus, true),
            0x20 | 0x28 | 0x30 | 0x38 => self.exec_jr_cc(bus, opcode),

            // Absolute jumps.
            0xC3 => self.exec_jp_a16(bus),
            0xE9 => self.exec_jp_hl(),
            0xC2 | 0xCA | 0xD2 | 0xDA => self.exec_jp_cc(bus, opcode),

            // ADD HL,rr
            0x09 | 0x19 | 0x29 | 0x39 => self.exec_add_hl_rr(opcode),

            // Accumulator/flag housekeeping.
            0x27 => self.exec_daa(),
            0x2F => self.exec_cpl(),
            0x37 => self.exec_scf(),
            0x3F => self.exec_ccf(),

            // The ALU block: ADD/ADC/SUB/SBC/AND/XOR/OR/CP against r/(HL).
            0x80..=0xBF => self.exec_alu_reg_group(bus, opcode),

            // The same eight ALU operations against d8.
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                self.exec_alu_imm(bus, opcode)
            }

            // INC r / DEC r
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                self.exec_inc8_reg(bus, opcode)
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                self.exec_dec8_reg(bus, opcode)
            }

            // Interrupt master enable control.
            0xF3 => self.exec_di(),
            0xFB => self.exec_ei(),

            // Calls and returns.
            0xCD => self.exec_call_a16(bus),
            0xC4 | 0xCC | 0xD4 | 0xDC => self.exec_call_cc(bus, opcode),
            0xC9 => self.exec_ret(bus),
            0xC0 | 0xC8 | 0xD0 | 0xD8 => self.exec_ret_cc(bus, opcode),
            0xD9 => self.exec_reti(bus),

            // PUSH rr / POP rr
            0xC5 | 0xD5 | 0xE5 | 0xF5 => self.exec_push_rr(bus, opcode),
            0xC1 | 0xD1 | 0xE1 | 0xF1 => self.exec_pop_rr(bus, opcode),

            // RST nn
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.exec_rst(bus, opcode)
            }

            // Opcode holes: no instruction exists at these byte values.
            0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => {
                return ExecOutcome::Unimplemented {
                    opcode,
                    addr: self.regs.pc.wrapping_sub(1),
                };
            }
        };

        ExecOutcome::Handled(cycles)
    }
}
