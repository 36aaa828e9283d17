use std::fmt;

/// Fixed header field offsets within a ROM image.
mod offsets {
    pub const TITLE: usize = 0x134;
    pub const TITLE_END: usize = 0x143;
    pub const NEW_LICENSEE_HIGH: usize = 0x144;
    pub const NEW_LICENSEE_LOW: usize = 0x145;
    pub const CARTRIDGE_TYPE: usize = 0x147;
    pub const ROM_SIZE: usize = 0x148;
    pub const RAM_SIZE: usize = 0x149;
    pub const DESTINATION: usize = 0x14A;
    pub const OLD_LICENSEE: usize = 0x14B;
    pub const VERSION: usize = 0x14C;
}

/// Banking chip family, decoded from the cartridge type byte at 0x147.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapperKind {
    RomOnly,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc4,
    Mbc5,
    Unknown,
}

impl MapperKind {
    fn from_code(code: u8) -> Self {
        match code {
            0x00 | 0x08 | 0x09 => Self::RomOnly,
            0x01..=0x03 | 0xFF => Self::Mbc1,
            0x05 | 0x06 => Self::Mbc2,
            0x0F..=0x13 => Self::Mbc3,
            0x15..=0x17 => Self::Mbc4,
            0x19..=0x1E => Self::Mbc5,
            // Chips we know about but do not model (MMM01, pocket camera,
            // Bandai TAMA5, HuC...).
            0x0B..=0x0D | 0x20 | 0x22 | 0xFC..=0xFE => Self::Unknown,
            _ => {
                log::warn!("unknown cartridge type code 0x{code:02X}");
                Self::Unknown
            }
        }
    }
}

impl fmt::Display for MapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RomOnly => "ROM only",
            Self::Mbc1 => "MBC1",
            Self::Mbc2 => "MBC2",
            Self::Mbc3 => "MBC3",
            Self::Mbc4 => "MBC4",
            Self::Mbc5 => "MBC5",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// ROM size, decoded from the size byte at 0x148.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RomSize {
    Kb32,
    Kb64,
    Kb128,
    Kb256,
    Kb512,
    Mb1,
    Mb2,
    /// 1.1 MB (72 banks).
    Mb1x1,
    /// 1.2 MB (80 banks).
    Mb1x2,
    /// 1.5 MB (96 banks).
    Mb1x5,
}

impl RomSize {
    fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Kb32,
            0x01 => Self::Kb64,
            0x02 => Self::Kb128,
            0x03 => Self::Kb256,
            0x04 => Self::Kb512,
            0x05 => Self::Mb1,
            0x06 => Self::Mb2,
            0x52 => Self::Mb1x1,
            0x53 => Self::Mb1x2,
            0x54 => Self::Mb1x5,
            _ => {
                log::warn!("unknown ROM size code 0x{code:02X}, assuming 32 KiB");
                Self::Kb32
            }
        }
    }

    /// Number of 16 KiB ROM banks.
    pub fn bank_count(self) -> u16 {
        match self {
            Self::Kb32 => 2,
            Self::Kb64 => 4,
            Self::Kb128 => 8,
            Self::Kb256 => 16,
            Self::Kb512 => 32,
            Self::Mb1 => 64,
            Self::Mb2 => 128,
            Self::Mb1x1 => 72,
            Self::Mb1x2 => 80,
            Self::Mb1x5 => 96,
        }
    }

    pub fn byte_len(self) -> usize {
        self.bank_count() as usize * 0x4000
    }
}

/// External RAM size, decoded from the size byte at 0x149.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RamSize {
    None,
    Kb2,
    Kb8,
    Kb32,
    Kb64,
    Kb128,
}

impl RamSize {
    fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::None,
            0x01 => Self::Kb2,
            0x02 => Self::Kb8,
            0x03 => Self::Kb32,
            0x04 => Self::Kb128,
            0x05 => Self::Kb64,
            _ => {
                log::warn!("unknown RAM size code 0x{code:02X}, assuming none");
                Self::None
            }
        }
    }

    pub fn byte_len(self) -> usize {
        match self {
            Self::None => 0,
            Self::Kb2 => 0x800,
            Self::Kb8 => 0x2000,
            Self::Kb32 => 0x8000,
            Self::Kb64 => 0x10000,
            Self::Kb128 => 0x20000,
        }
    }

    /// Number of 8 KiB RAM banks, rounding the 2 KiB size up to one bank.
    pub fn bank_count(self) -> u8 {
        self.byte_len().div_ceil(0x2000) as u8
    }
}

/// Destination market, decoded from the byte at 0x14A.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Japanese,
    NonJapanese,
}

impl Destination {
    fn from_code(code: u8) -> Self {
        match code {
            0x00 => Self::Japanese,
            0x01 => Self::NonJapanese,
            _ => {
                log::warn!("unknown destination code 0x{code:02X}");
                Self::NonJapanese
            }
        }
    }
}

/// The parsed cartridge header record.
#[derive(Clone, Debug)]
pub struct CartridgeHeader {
    pub title: String,
    pub mapper: MapperKind,
    pub rom_size: RomSize,
    pub ram_size: RamSize,
    pub destination: Destination,
    pub licensee: String,
    pub version: u8,
}

impl CartridgeHeader {
    /// Parse the header fields. The caller guarantees the image holds at
    /// least 0x150 bytes.
    pub(super) fn parse(rom: &[u8]) -> Self {
        let header = Self {
            title: parse_title(rom),
            mapper: MapperKind::from_code(rom[offsets::CARTRIDGE_TYPE]),
            rom_size: RomSize::from_code(rom[offsets::ROM_SIZE]),
            ram_size: RamSize::from_code(rom[offsets::RAM_SIZE]),
            destination: Destination::from_code(rom[offsets::DESTINATION]),
            licensee: parse_licensee(rom),
            version: rom[offsets::VERSION],
        };

        log::info!(
            "cartridge: \"{title}\" v{version}, {mapper}, {rom} KiB ROM, {ram} KiB RAM, {licensee}",
            title = header.title,
            version = header.version,
            mapper = header.mapper,
            rom = header.rom_size.byte_len() / 1024,
            ram = header.ram_size.byte_len() / 1024,
            licensee = header.licensee,
        );

        header
    }
}

/// Title bytes run from 0x134 to 0x143 and stop at the first 0x00 or
/// non-printable byte; 16 printable characters at most.
fn parse_title(rom: &[u8]) -> String {
    let mut title = String::new();
    for &byte in &rom[offsets::TITLE..=offsets::TITLE_END] {
        if byte == 0 || !(0x20..=0x7E).contains(&byte) {
            break;
        }
        title.push(byte as char);
    }
    title
}

/// Resolve the licensee name. The old code at 0x14B is authoritative
/// unless it is 0x33, which defers to the two-character new code.
fn parse_licensee(rom: &[u8]) -> String {
    match rom[offsets::OLD_LICENSEE] {
        0x00 => "None".into(),
        0x01 => "Nintendo".into(),
        0x33 => new_licensee_name(
            rom[offsets::NEW_LICENSEE_HIGH],
            rom[offsets::NEW_LICENSEE_LOW],
        ),
        0x79 => "Accolade".into(),
        0xA4 => "Konami".into(),
        code => {
            log::debug!("unmapped old licensee code 0x{code:02X}");
            format!("Unknown (0x{code:02X})")
        }
    }
}

fn new_licensee_name(high: u8, low: u8) -> String {
    let code = [high as char, low as char];
    let code: String = code.iter().collect();
    let name = match code.as_str() {
        "00" => "None",
        "01" => "Nintendo R&D 1",
        "08" => "Capcom",
        "13" => "EA (Electronic Arts)",
        "18" => "Hudson Soft",
        "31" => "Nintendo",
        "32" => "Bandai",
        "34" => "Konami",
        "37" => "Taito",
        "41" => "Ubi Soft",
        "42" => "Atlus",
        "51" => "Acclaim Entertainment",
        "52" => "Activision",
        "78" => "THQ",
        "79" => "Accolade",
        "92" => "Video System",
        _ => return format!("Unknown (new={code})"),
    };
    name.into()
}
