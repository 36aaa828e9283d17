mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod init;
mod interrupts;
mod regs;
mod step;

pub use bus::Bus;
pub use exec::ExecOutcome;
pub use regs::{Flag, Registers};

#[cfg(test)]
mod tests;

bitflags::bitflags! {
    /// The five interrupt sources, as laid out in the IF ($FF0F) and
    /// IE ($FFFF) registers. Lower bit index means higher priority.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct InterruptFlags: u8 {
        const VBLANK   = 1 << 0;
        const LCD_STAT = 1 << 1;
        const TIMER    = 1 << 2;
        const SERIAL   = 1 << 3;
        const JOYPAD   = 1 << 4;
    }
}

/// The Game Boy CPU (Sharp LR35902).
///
/// Holds the register file and interrupt-master/halt state; all memory
/// traffic goes through a [`Bus`] borrowed for the duration of each
/// [`Cpu::step`] call, so the CPU itself never owns the address space.
pub struct Cpu {
    pub regs: Registers,
    /// Interrupt master enable. When clear, no interrupt is ever serviced
    /// regardless of IF/IE.
    pub ime: bool,
    /// HALT state: instruction fetch is suspended until an enabled
    /// interrupt becomes pending.
    pub halted: bool,
    /// STOP low-power state. Exited when a joypad input line (P10-P13)
    /// reads low through the bus.
    stopped: bool,
    /// Set when HALT is executed with IME clear while an interrupt is
    /// already pending; the next opcode fetch then fails to advance PC.
    halt_bug: bool,
    ime_enable_pending: bool,
    ime_enable_delay: bool,
}

impl Cpu {
    #[inline]
    pub fn get_flag(&self, flag: Flag) -> bool {
        (self.regs.f & (1 << flag as u8)) != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        if value {
            self.regs.f |= 1 << flag as u8;
        } else {
            self.regs.f &= !(1 << flag as u8);
        }
    }

    #[inline]
    pub fn clear_flags(&mut self) {
        self.regs.f = 0;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
