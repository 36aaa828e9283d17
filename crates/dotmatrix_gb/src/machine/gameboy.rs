use crate::cpu::{Cpu, InterruptFlags};

use super::bus::GameBoyBus;
use super::cartridge::{Cartridge, CartridgeError, CartridgeHeader};

/// The assembled console: CPU plus bus (which owns the cartridge).
///
/// There is no reference cycle to manage — the container owns both halves
/// and lends the bus to the CPU for the duration of each step.
pub struct GameBoy {
    pub cpu: Cpu,
    bus: GameBoyBus,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: GameBoyBus::new(cartridge),
        }
    }

    /// Build a console straight from a raw ROM image.
    pub fn from_rom(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        Ok(Self::new(Cartridge::load(rom)?))
    }

    /// Build a console from a ROM image plus previously saved external
    /// RAM contents.
    pub fn from_rom_with_save(rom: Vec<u8>, save: &[u8]) -> Result<Self, CartridgeError> {
        Ok(Self::new(Cartridge::load_with_save(rom, Some(save))?))
    }

    /// Run one CPU step and return the T-cycles it consumed.
    ///
    /// The core does no pacing of its own; callers accumulate the returned
    /// counts and throttle against wall-clock time however they see fit.
    pub fn step(&mut self) -> u32 {
        self.cpu.step(&mut self.bus)
    }

    /// Reset the processor. RAM and cartridge state are untouched; only
    /// registers and interrupt state return to their power-on values.
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    pub fn bus(&self) -> &GameBoyBus {
        &self.bus
    }

    /// Mutable bus access, used to attach peripherals and to inspect or
    /// drive memory from the embedding application.
    pub fn bus_mut(&mut self) -> &mut GameBoyBus {
        &mut self.bus
    }

    pub fn header(&self) -> &CartridgeHeader {
        self.bus.cartridge().header()
    }

    /// Current external RAM contents, for save-file persistence.
    pub fn save_ram(&self) -> &[u8] {
        self.bus.cartridge().save_ram()
    }

    /// Raise interrupt request lines on behalf of external peripherals.
    pub fn request_interrupt(&mut self, flags: InterruptFlags) {
        self.bus.request_interrupt(flags);
    }
}
