use super::{Bus, Cpu};

impl Cpu {
    /// Decide whether a maskable interrupt should be serviced right now.
    ///
    /// A pending enabled interrupt always wakes the CPU from HALT, but it
    /// is only *serviced* when IME is set; waking without service is the
    /// documented HALT behaviour with IME clear.
    fn should_service_interrupt<B: Bus>(&mut self, bus: &mut B) -> bool {
        let ie = bus.read8(0xFFFF);
        let iflags = bus.read8(0xFF0F);
        if ie & iflags & 0x1F == 0 {
            return false;
        }

        if self.halted && !self.ime {
            self.halted = false;
            return false;
        }

        self.ime
    }

    /// Select the highest-priority pending interrupt and compute the IF
    /// value with its bit cleared.
    ///
    /// This is evaluated *after* the high byte of PC has been pushed:
    /// when SP points at the IE register that push can retarget or cancel
    /// the dispatch, and a write performed by the later low-byte push must
    /// not affect the selection.
    fn select_pending_interrupt<B: Bus>(&mut self, bus: &mut B) -> Option<(u8, u8)> {
        let ie = bus.read8(0xFFFF);
        let iflags = bus.read8(0xFF0F);
        let pending = ie & iflags & 0x1F;
        if pending == 0 {
            return None;
        }

        // Lowest set bit wins: VBlank > LCD STAT > Timer > Serial > Joypad.
        let index = pending.trailing_zeros() as u8;
        Some((index, iflags & !(1 << index)))
    }

    /// Service a pending interrupt if one should fire.
    ///
    /// Returns `Some(cycles)` when an interrupt was entered. Entry clears
    /// IME and the serviced IF bit, pushes PC (high byte first), and jumps
    /// to the fixed vector `0x40 + 8 * index`.
    pub(super) fn handle_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        if !self.should_service_interrupt(bus) {
            return None;
        }

        self.ime = false;
        self.halted = false;

        let pc = self.regs.pc;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, (pc >> 8) as u8);

        let selection = self.select_pending_interrupt(bus);

        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, pc as u8);

        match selection {
            Some((index, new_if)) => {
                let vector = 0x0040 + u16::from(index) * 8;
                log::debug!(
                    "interrupt {index}: vector 0x{vector:04X}, pc 0x{pc:04X}, sp 0x{sp:04X}",
                    sp = self.regs.sp,
                );
                bus.write8(0xFF0F, new_if);
                self.regs.pc = vector;
            }
            None => {
                // The high-byte push landed on IE and cleared every pending
                // line; the dispatch is cancelled and PC ends up at 0x0000.
                self.regs.pc = 0x0000;
            }
        }

        Some(20)
    }

    /// Apply the one-instruction delay of EI.
    #[inline]
    pub(super) fn apply_ime_delay(&mut self) {
        if self.ime_enable_delay {
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }
}
