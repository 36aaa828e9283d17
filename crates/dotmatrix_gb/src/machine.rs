mod bus;
mod cartridge;
mod gameboy;

pub use bus::{GameBoyBus, Peripheral};
pub use cartridge::{
    Cartridge, CartridgeError, CartridgeHeader, Destination, MapperKind, RamSize, RomSize,
};
pub use gameboy::GameBoy;

#[cfg(test)]
mod tests;
