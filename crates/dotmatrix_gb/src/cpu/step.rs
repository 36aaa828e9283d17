use super::{Bus, Cpu, ExecOutcome};

impl Cpu {
    /// Execute one step: service a pending interrupt or run one
    /// instruction. Returns the T-cycles consumed.
    ///
    /// Bus reads and writes happen in the exact order the hardware issues
    /// them (operand fetches before destination writes), since mapped
    /// registers may have ordering-sensitive side effects.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        // STOP is exited when a joypad line (P1 bits 0-3) reads low. With
        // no input peripheral attached P1 reads 0xFF and the CPU stays
        // stopped; we still report a nominal cost so callers make
        // progress.
        if self.stopped {
            let p1 = bus.read8(0xFF00);
            if p1 & 0x0F != 0x0F {
                self.stopped = false;
            }
            return 4;
        }

        if let Some(cycles) = self.handle_interrupts(bus) {
            return cycles;
        }

        if self.halted {
            return 4;
        }

        let opcode = self.fetch8(bus);
        let cycles = match self.exec_opcode(bus, opcode) {
            ExecOutcome::Handled(cycles) => cycles,
            ExecOutcome::Unimplemented { opcode, addr } => {
                log::warn!("unimplemented opcode 0x{opcode:02X} at 0x{addr:04X}, running as NOP");
                4
            }
        };
        self.apply_ime_delay();

        cycles
    }
}
