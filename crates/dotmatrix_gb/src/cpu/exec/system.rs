use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// HALT: suspend fetching until an enabled interrupt becomes pending.
    ///
    /// Executing HALT with IME clear while `IE & IF` is already non-zero
    /// triggers the hardware's HALT bug instead: the CPU does not halt and
    /// the next opcode fetch fails to advance PC.
    pub(super) fn exec_halt<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if !self.ime {
            let ie = bus.read8(0xFFFF);
            let iflags = bus.read8(0xFF0F);
            if ie & iflags & 0x1F != 0 {
                self.halt_bug = true;
                return 4;
            }
        }

        self.halted = true;
        4
    }

    /// STOP: enter the deep low-power state. The padding byte is fetched
    /// and discarded so PC matches hardware.
    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let _padding = self.fetch8(bus);
        self.stopped = true;
        self.halted = false;
        4
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        4
    }

    /// EI: IME becomes set only after the *next* instruction completes.
    pub(super) fn exec_ei(&mut self) -> u32 {
        self.ime_enable_pending = true;
        4
    }
}
