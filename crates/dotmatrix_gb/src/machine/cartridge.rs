mod header;
mod mbc1;
mod mbc2;
mod mbc3;
mod mbc5;

pub use header::{CartridgeHeader, Destination, MapperKind, RamSize, RomSize};

use std::error::Error;
use std::fmt;

use mbc1::Mbc1Cartridge;
use mbc2::Mbc2Cartridge;
use mbc3::Mbc3Cartridge;
use mbc5::Mbc5Cartridge;

/// Minimum image length: everything up to and including the header
/// checksum bytes, so every header field read is in bounds.
const MIN_ROM_LEN: usize = 0x150;

/// Why a ROM image was rejected at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartridgeError {
    /// The image cannot hold a complete cartridge header.
    TooSmall { len: usize },
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { len } => {
                write!(f, "ROM too small: {len} bytes, need at least {MIN_ROM_LEN:#X}")
            }
        }
    }
}

impl Error for CartridgeError {}

/// A loaded cartridge: the parsed header plus the mapper backend that
/// implements its ROM/RAM banking.
///
/// The ROM buffer is immutable after load; the only mutable state is the
/// mapper's bank registers (driven by ROM-window writes) and the external
/// RAM contents.
#[derive(Debug)]
pub struct Cartridge {
    header: CartridgeHeader,
    mapper: Mapper,
}

#[derive(Debug)]
enum Mapper {
    RomOnly(RomOnlyCartridge),
    Mbc1(Mbc1Cartridge),
    Mbc2(Mbc2Cartridge),
    Mbc3(Mbc3Cartridge),
    Mbc5(Mbc5Cartridge),
}

impl Cartridge {
    /// Parse the header and build the mapper backend for a raw ROM image.
    ///
    /// Fails only when the image is too small to hold a header; unknown
    /// header codes are logged and substituted, never fatal.
    pub fn load(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        Self::load_with_save(rom, None)
    }

    /// Like [`Cartridge::load`], additionally seeding external RAM from a
    /// previously saved image.
    pub fn load_with_save(rom: Vec<u8>, save: Option<&[u8]>) -> Result<Self, CartridgeError> {
        if rom.len() < MIN_ROM_LEN {
            return Err(CartridgeError::TooSmall { len: rom.len() });
        }

        let header = CartridgeHeader::parse(&rom);
        let mapper = match header.mapper {
            MapperKind::RomOnly => Mapper::RomOnly(RomOnlyCartridge::new(rom, &header)),
            MapperKind::Mbc1 => Mapper::Mbc1(Mbc1Cartridge::new(rom, &header)),
            MapperKind::Mbc2 => Mapper::Mbc2(Mbc2Cartridge::new(rom, &header)),
            MapperKind::Mbc3 => Mapper::Mbc3(Mbc3Cartridge::new(rom, &header)),
            MapperKind::Mbc5 => Mapper::Mbc5(Mbc5Cartridge::new(rom, &header)),
            MapperKind::Mbc4 => {
                // MBC4 cartridges are rare and register-compatible enough
                // with MBC5 for banking purposes.
                log::debug!("MBC4 cartridge, using the MBC5 banking model");
                Mapper::Mbc5(Mbc5Cartridge::new(rom, &header))
            }
            MapperKind::Unknown => {
                log::warn!("unsupported mapper, falling back to unbanked ROM access");
                Mapper::RomOnly(RomOnlyCartridge::new(rom, &header))
            }
        };

        let mut cartridge = Self { header, mapper };
        if let Some(save) = save {
            cartridge.load_save_ram(save);
        }
        Ok(cartridge)
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    /// External RAM contents, for persistence by the embedding
    /// application.
    pub fn save_ram(&self) -> &[u8] {
        match &self.mapper {
            Mapper::RomOnly(m) => m.ram(),
            Mapper::Mbc1(m) => m.ram(),
            Mapper::Mbc2(m) => m.ram(),
            Mapper::Mbc3(m) => m.ram(),
            Mapper::Mbc5(m) => m.ram(),
        }
    }

    fn load_save_ram(&mut self, data: &[u8]) {
        let ram = match &mut self.mapper {
            Mapper::RomOnly(m) => m.ram_mut(),
            Mapper::Mbc1(m) => m.ram_mut(),
            Mapper::Mbc2(m) => m.ram_mut(),
            Mapper::Mbc3(m) => m.ram_mut(),
            Mapper::Mbc5(m) => m.ram_mut(),
        };
        if data.len() != ram.len() {
            log::warn!(
                "save data is {got} bytes, cartridge RAM is {want}; loading the overlap",
                got = data.len(),
                want = ram.len(),
            );
        }
        let len = data.len().min(ram.len());
        ram[..len].copy_from_slice(&data[..len]);
    }

    /// Read from the ROM window, 0x0000-0x7FFF.
    pub fn rom_read(&self, addr: u16) -> u8 {
        match &self.mapper {
            Mapper::RomOnly(m) => m.rom_read(addr),
            Mapper::Mbc1(m) => m.rom_read(addr),
            Mapper::Mbc2(m) => m.rom_read(addr),
            Mapper::Mbc3(m) => m.rom_read(addr),
            Mapper::Mbc5(m) => m.rom_read(addr),
        }
    }

    /// Write into the ROM window: interpreted by the mapper's control
    /// registers, ignored without a mapper.
    pub fn rom_write(&mut self, addr: u16, value: u8) {
        match &mut self.mapper {
            Mapper::RomOnly(m) => m.rom_write(addr, value),
            Mapper::Mbc1(m) => m.rom_write(addr, value),
            Mapper::Mbc2(m) => m.rom_write(addr, value),
            Mapper::Mbc3(m) => m.rom_write(addr, value),
            Mapper::Mbc5(m) => m.rom_write(addr, value),
        }
    }

    /// Read from the external RAM window, 0xA000-0xBFFF.
    pub fn ram_read(&self, addr: u16) -> u8 {
        match &self.mapper {
            Mapper::RomOnly(m) => m.ram_read(addr),
            Mapper::Mbc1(m) => m.ram_read(addr),
            Mapper::Mbc2(m) => m.ram_read(addr),
            Mapper::Mbc3(m) => m.ram_read(addr),
            Mapper::Mbc5(m) => m.ram_read(addr),
        }
    }

    /// Write into the external RAM window, 0xA000-0xBFFF.
    pub fn ram_write(&mut self, addr: u16, value: u8) {
        match &mut self.mapper {
            Mapper::RomOnly(m) => m.ram_write(addr, value),
            Mapper::Mbc1(m) => m.ram_write(addr, value),
            Mapper::Mbc2(m) => m.ram_write(addr, value),
            Mapper::Mbc3(m) => m.ram_write(addr, value),
            Mapper::Mbc5(m) => m.ram_write(addr, value),
        }
    }
}

/// Unbanked cartridge: the ROM window maps straight onto the image and
/// the RAM window (when the header declares RAM) onto a single buffer.
#[derive(Debug)]
struct RomOnlyCartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
}

impl RomOnlyCartridge {
    fn new(rom: Vec<u8>, header: &CartridgeHeader) -> Self {
        Self {
            rom,
            ram: vec![0xFF; header.ram_size.byte_len()],
        }
    }

    fn rom_read(&self, addr: u16) -> u8 {
        self.rom.get(addr as usize).copied().unwrap_or(0xFF)
    }

    fn rom_write(&mut self, _addr: u16, _value: u8) {
        // No mapper registers to drive; ROM is read-only.
    }

    fn ram_read(&self, addr: u16) -> u8 {
        let offset = (addr as usize).wrapping_sub(0xA000);
        self.ram.get(offset).copied().unwrap_or(0xFF)
    }

    fn ram_write(&mut self, addr: u16, value: u8) {
        let offset = (addr as usize).wrapping_sub(0xA000);
        if let Some(slot) = self.ram.get_mut(offset) {
            *slot = value;
        }
    }

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}
