use super::{Bus, Cpu, Flag};

impl Cpu {
    /// The CB-prefixed table: rotates/shifts, BIT, RES, and SET.
    ///
    /// Decoding follows the standard x/y/z field split of the opcode byte:
    /// x (bits 7-6) picks the operation class, y (bits 5-3) the sub-op or
    /// bit index, z (bits 2-0) the target register.
    pub(super) fn step_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let cb = self.fetch8(bus);
        let x = cb >> 6;
        let y = (cb >> 3) & 0x07;
        let z = cb & 0x07;

        match x {
            // Rotates and shifts: result and flags both write back.
            0 => {
                let value = self.read_reg8(bus, z);
                let result = match y {
                    0 => self.alu_rlc(value),
                    1 => self.alu_rrc(value),
                    2 => self.alu_rl(value),
                    3 => self.alu_rr(value),
                    4 => self.alu_sla(value),
                    5 => self.alu_sra(value),
                    6 => self.alu_swap(value),
                    _ => self.alu_srl(value),
                };
                self.write_reg8(bus, z, result);

                if z == 6 { 16 } else { 8 }
            }

            // BIT y,r: Z reflects the tested bit, C is preserved.
            1 => {
                let value = self.read_reg8(bus, z);
                self.set_flag(Flag::Z, value & (1 << y) == 0);
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, true);

                if z == 6 { 12 } else { 8 }
            }

            // RES y,r
            2 => {
                let value = self.read_reg8(bus, z) & !(1 << y);
                self.write_reg8(bus, z, value);

                if z == 6 { 16 } else { 8 }
            }

            // SET y,r
            _ => {
                let value = self.read_reg8(bus, z) | (1 << y);
                self.write_reg8(bus, z, value);

                if z == 6 { 16 } else { 8 }
            }
        }
    }
}
