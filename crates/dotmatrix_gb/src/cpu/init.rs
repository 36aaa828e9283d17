use super::{Cpu, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            stopped: false,
            halt_bug: false,
            ime_enable_pending: false,
            ime_enable_delay: false,
        };
        cpu.apply_power_on_state();
        cpu
    }

    /// Reset the CPU to its power-on state.
    ///
    /// Only processor state is affected; RAM contents belong to the bus
    /// and survive a CPU reset.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.ime = false;
        self.halted = false;
        self.stopped = false;
        self.halt_bug = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
        self.apply_power_on_state();
    }

    /// Register state at the point the boot ROM hands control to the
    /// cartridge entry point: everything clear except PC and SP.
    fn apply_power_on_state(&mut self) {
        self.regs.pc = 0x0100;
        self.regs.sp = 0xFFFE;
    }
}
