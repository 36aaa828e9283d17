use super::*;
use crate::cpu::{Bus, InterruptFlags};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a ROM image of `len` bytes with a valid header.
fn rom_image(cart_type: u8, ram_size_code: u8, len: usize) -> Vec<u8> {
    let mut rom = vec![0u8; len];
    rom[0x134..0x13A].copy_from_slice(b"TETRIS");
    rom[0x147] = cart_type;
    rom[0x148] = match len {
        0x8000 => 0x00,
        0x10000 => 0x01,
        _ => 0x00,
    };
    rom[0x149] = ram_size_code;
    rom[0x14A] = 0x01;
    rom[0x14B] = 0x01; // Nintendo
    rom[0x14C] = 0x03;
    rom
}

/// 64 KiB MBC image (four banks) with a marker byte per bank at offset
/// 0x200, clear of the header area.
fn banked_rom(cart_type: u8, ram_size_code: u8) -> Vec<u8> {
    let mut rom = rom_image(cart_type, ram_size_code, 0x10000);
    for bank in 0..4 {
        rom[bank * 0x4000 + 0x200] = 0xB0 + bank as u8;
    }
    rom
}

fn test_bus(cart_type: u8, ram_size_code: u8) -> GameBoyBus {
    let cartridge = Cartridge::load(rom_image(cart_type, ram_size_code, 0x8000)).unwrap();
    GameBoyBus::new(cartridge)
}

#[test]
fn load_rejects_images_without_a_full_header() {
    init_logger();

    let err = Cartridge::load(vec![0; 0x14F]).unwrap_err();
    assert_eq!(err, CartridgeError::TooSmall { len: 0x14F });

    // One more byte is enough to parse safely.
    let mut rom = vec![0u8; 0x150];
    rom[0x134..0x13A].copy_from_slice(b"TETRIS");
    assert!(Cartridge::load(rom).is_ok());
}

#[test]
fn title_stops_at_terminator_or_non_printable() {
    let rom = rom_image(0x00, 0x00, 0x8000);
    let cartridge = Cartridge::load(rom).unwrap();
    assert_eq!(cartridge.header().title, "TETRIS");

    let mut rom = rom_image(0x00, 0x00, 0x8000);
    rom[0x137] = 0x01; // non-printable byte truncates
    let cartridge = Cartridge::load(rom).unwrap();
    assert_eq!(cartridge.header().title, "TET");

    // A full 16 printable bytes uses the whole field.
    let mut rom = rom_image(0x00, 0x00, 0x8000);
    for slot in rom[0x134..=0x143].iter_mut() {
        *slot = b'A';
    }
    let cartridge = Cartridge::load(rom).unwrap();
    assert_eq!(cartridge.header().title.len(), 16);
}

#[test]
fn header_code_tables() {
    init_logger();

    let kind = |code: u8| {
        Cartridge::load(rom_image(code, 0x00, 0x8000))
            .unwrap()
            .header()
            .mapper
    };
    assert_eq!(kind(0x00), MapperKind::RomOnly);
    assert_eq!(kind(0x01), MapperKind::Mbc1);
    assert_eq!(kind(0x05), MapperKind::Mbc2);
    assert_eq!(kind(0x10), MapperKind::Mbc3);
    assert_eq!(kind(0x15), MapperKind::Mbc4);
    assert_eq!(kind(0x19), MapperKind::Mbc5);
    assert_eq!(kind(0x0B), MapperKind::Unknown);
    assert_eq!(kind(0xEE), MapperKind::Unknown, "unmapped code degrades");

    let mut rom = rom_image(0x00, 0x03, 0x8000);
    rom[0x148] = 0x02;
    let header = Cartridge::load(rom).unwrap().header().clone();
    assert_eq!(header.rom_size, RomSize::Kb128);
    assert_eq!(header.rom_size.bank_count(), 8);
    assert_eq!(header.ram_size, RamSize::Kb32);
    assert_eq!(header.ram_size.byte_len(), 0x8000);
    assert_eq!(header.ram_size.bank_count(), 4);
    assert_eq!(header.destination, Destination::NonJapanese);
    assert_eq!(header.licensee, "Nintendo");
    assert_eq!(header.version, 0x03);

    // New-style licensee kicks in behind old code 0x33.
    let mut rom = rom_image(0x00, 0x00, 0x8000);
    rom[0x14B] = 0x33;
    rom[0x144] = b'1';
    rom[0x145] = b'3';
    let cartridge = Cartridge::load(rom).unwrap();
    assert_eq!(cartridge.header().licensee, "EA (Electronic Arts)");
}

/// Every address belongs to exactly one region: the table below restates
/// the dispatch ranges, and the loop proves they partition the 16-bit
/// space with no gap or overlap.
#[test]
fn address_space_is_partitioned() {
    const REGIONS: [(u16, u16); 10] = [
        (0x0000, 0x7FFF), // cartridge ROM
        (0x8000, 0x9FFF), // video RAM
        (0xA000, 0xBFFF), // cartridge RAM
        (0xC000, 0xDFFF), // work RAM
        (0xE000, 0xFDFF), // echo RAM
        (0xFE00, 0xFE9F), // OAM
        (0xFEA0, 0xFEFF), // unusable
        (0xFF00, 0xFF7F), // IO
        (0xFF80, 0xFFFE), // high RAM
        (0xFFFF, 0xFFFF), // interrupt enable
    ];

    let mut bus = test_bus(0x00, 0x00);
    for addr in 0..=0xFFFFu16 {
        let owners = REGIONS
            .iter()
            .filter(|(start, end)| (*start..=*end).contains(&addr))
            .count();
        assert_eq!(owners, 1, "address 0x{addr:04X} claimed by {owners} regions");
        // And the dispatcher accepts it without panicking.
        let _ = bus.read8(addr);
    }
}

#[test]
fn work_ram_is_mirrored_into_echo_ram() {
    let mut bus = test_bus(0x00, 0x00);

    bus.write8(0xC010, 0xAB);
    assert_eq!(bus.read8(0xE010), 0xAB);

    bus.write8(0xE010, 0xCD);
    assert_eq!(bus.read8(0xC010), 0xCD);

    // Top of the mirrored window: 0xFDFF aliases 0xDDFF.
    bus.write8(0xDDFF, 0x11);
    assert_eq!(bus.read8(0xFDFF), 0x11);
}

#[test]
fn oam_and_high_ram_store_bytes() {
    let mut bus = test_bus(0x00, 0x00);

    bus.write8(0xFE00, 0x12);
    bus.write8(0xFE9F, 0x34);
    assert_eq!(bus.read8(0xFE00), 0x12);
    assert_eq!(bus.read8(0xFE9F), 0x34);

    bus.write8(0xFF80, 0x56);
    bus.write8(0xFFFE, 0x78);
    assert_eq!(bus.read8(0xFF80), 0x56);
    assert_eq!(bus.read8(0xFFFE), 0x78);
}

#[test]
fn unusable_region_reads_ff_and_drops_writes() {
    init_logger();
    let mut bus = test_bus(0x00, 0x00);

    assert_eq!(bus.read8(0xFEA0), 0xFF);
    assert_eq!(bus.read8(0xFEFF), 0xFF);
    bus.write8(0xFEA5, 0x55);
    assert_eq!(bus.read8(0xFEA5), 0xFF);
}

#[test]
fn detached_peripherals_read_ff() {
    let mut bus = test_bus(0x00, 0x00);

    assert_eq!(bus.read8(0x8000), 0xFF, "video RAM with no video attached");
    assert_eq!(bus.read8(0xFF00), 0xFF, "IO with no peripheral attached");
    assert_eq!(bus.read8(0xFF42), 0xFF);
    bus.write8(0x9000, 0x12);
    bus.write8(0xFF40, 0x34);
    assert_eq!(bus.read8(0x9000), 0xFF);
}

#[test]
fn interrupt_registers_live_on_the_bus() {
    let mut bus = test_bus(0x00, 0x00);

    // Undriven IF bits read as 1.
    assert_eq!(bus.read8(0xFF0F), 0xE0);

    bus.write8(0xFF0F, 0xFF);
    assert_eq!(bus.read8(0xFF0F), 0xFF);
    assert_eq!(bus.interrupt_flags(), InterruptFlags::all());

    bus.write8(0xFF0F, 0x00);
    bus.request_interrupt(InterruptFlags::TIMER);
    assert_eq!(bus.read8(0xFF0F), 0xE0 | 0x04);

    bus.write8(0xFFFF, 0x1F);
    assert_eq!(bus.read8(0xFFFF), 0x1F);
}

#[test]
fn oam_dma_copies_a_rom_page() {
    let mut rom = rom_image(0x00, 0x00, 0x8000);
    for i in 0..0xA0usize {
        rom[0x1000 + i] = i as u8;
    }
    let mut bus = GameBoyBus::new(Cartridge::load(rom).unwrap());

    bus.write8(0xFF46, 0x10);
    for i in 0..0xA0u16 {
        assert_eq!(bus.read8(0xFE00 + i), i as u8);
    }
    assert_eq!(bus.read8(0xFF46), 0x10, "trigger register reads back");
}

#[test]
fn oam_dma_copies_a_work_ram_page() {
    let mut bus = test_bus(0x00, 0x00);
    for i in 0..0xA0u16 {
        bus.write8(0xC100 + i, (0xA0 - i) as u8);
    }

    bus.write8(0xFF46, 0xC1);
    for i in 0..0xA0u16 {
        assert_eq!(bus.read8(0xFE00 + i), (0xA0 - i) as u8);
    }
}

struct StubVideo {
    vram: Vec<u8>,
}

impl Peripheral for StubVideo {
    fn read8(&mut self, addr: u16) -> u8 {
        self.vram[(addr - 0x8000) as usize]
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.vram[(addr - 0x8000) as usize] = value;
    }
}

struct StubIo {
    last_write: (u16, u8),
}

impl Peripheral for StubIo {
    fn read8(&mut self, _addr: u16) -> u8 {
        0x42
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.last_write = (addr, value);
    }
}

#[test]
fn attached_peripherals_take_over_their_ranges() {
    let mut bus = test_bus(0x00, 0x00);
    bus.attach_video(Box::new(StubVideo {
        vram: vec![0; 0x2000],
    }));
    bus.attach_io(Box::new(StubIo {
        last_write: (0, 0),
    }));

    bus.write8(0x8123, 0x77);
    assert_eq!(bus.read8(0x8123), 0x77);

    assert_eq!(bus.read8(0xFF01), 0x42);
    bus.write8(0xFF02, 0x81);

    // IF and the DMA trigger stay bus-owned even with IO attached.
    assert_eq!(bus.read8(0xFF0F), 0xE0);
    bus.write8(0xFF46, 0xC1);
    assert_eq!(bus.read8(0xFF46), 0xC1);
}

#[test]
fn vblank_interrupt_dispatch_through_the_machine() {
    init_logger();
    let mut gb = GameBoy::from_rom(rom_image(0x00, 0x00, 0x8000)).unwrap();

    gb.cpu.ime = true;
    gb.bus_mut().write8(0xFFFF, 0x01);
    gb.request_interrupt(InterruptFlags::VBLANK);

    let cycles = gb.step();
    assert_eq!(cycles, 20);
    assert_eq!(gb.cpu.regs.pc, 0x0040);
    assert_eq!(gb.cpu.ime, false);
    assert!(gb.bus().interrupt_flags().is_empty(), "VBlank bit consumed");
    assert_eq!(gb.cpu.regs.sp, 0xFFFC);
    // The interrupted PC is retrievable from the stack.
    assert_eq!(gb.bus_mut().read16(0xFFFC), 0x0100);
}

#[test]
fn cpu_reset_preserves_ram_contents() {
    let mut gb = GameBoy::from_rom(rom_image(0x00, 0x00, 0x8000)).unwrap();

    gb.bus_mut().write8(0xC000, 0x42);
    gb.bus_mut().write8(0xFF80, 0x24);
    gb.cpu.regs.pc = 0x2000;
    gb.reset();

    assert_eq!(gb.cpu.regs.pc, 0x0100);
    assert_eq!(gb.bus_mut().read8(0xC000), 0x42);
    assert_eq!(gb.bus_mut().read8(0xFF80), 0x24);
}

#[test]
fn rom_only_cartridge_ignores_writes_and_bounds_checks() {
    let mut bus = test_bus(0x00, 0x00);

    let before = bus.read8(0x1000);
    bus.write8(0x1000, 0xAA);
    assert_eq!(bus.read8(0x1000), before);

    // Reads past the end of a short image come back as 0xFF.
    let rom = rom_image(0x00, 0x00, 0x150);
    let mut bus = GameBoyBus::new(Cartridge::load(rom).unwrap());
    assert_eq!(bus.read8(0x4000), 0xFF);
}

#[test]
fn unknown_mapper_falls_back_to_flat_rom() {
    init_logger();
    let mut rom = rom_image(0x22, 0x00, 0x8000);
    rom[0x0200] = 0x5C;
    let cartridge = Cartridge::load(rom).unwrap();
    assert_eq!(cartridge.header().mapper, MapperKind::Unknown);

    let mut bus = GameBoyBus::new(cartridge);
    assert_eq!(bus.read8(0x0200), 0x5C);
}

#[test]
fn mbc1_switches_rom_banks() {
    let mut bus = GameBoyBus::new(Cartridge::load(banked_rom(0x01, 0x00)).unwrap());

    // Fixed window always shows bank 0.
    assert_eq!(bus.read8(0x0200), 0xB0);
    // Bank 1 is selected at power-on.
    assert_eq!(bus.read8(0x4200), 0xB1);

    bus.write8(0x2000, 0x02);
    assert_eq!(bus.read8(0x4200), 0xB2);

    // Writing bank 0 selects bank 1.
    bus.write8(0x2000, 0x00);
    assert_eq!(bus.read8(0x4200), 0xB1);
}

#[test]
fn mbc1_ram_requires_enable_and_honours_banking_mode() {
    let mut bus = GameBoyBus::new(Cartridge::load(banked_rom(0x03, 0x03)).unwrap());

    // Disabled RAM floats high and swallows writes.
    assert_eq!(bus.read8(0xA000), 0xFF);
    bus.write8(0xA000, 0x55);
    assert_eq!(bus.read8(0xA000), 0xFF);

    bus.write8(0x0000, 0x0A); // enable
    bus.write8(0x6000, 0x01); // banking mode 1
    bus.write8(0x4000, 0x02); // RAM bank 2
    bus.write8(0xA000, 0x55);
    assert_eq!(bus.read8(0xA000), 0x55);

    bus.write8(0x4000, 0x00); // RAM bank 0
    bus.write8(0xA000, 0x66);
    bus.write8(0x4000, 0x02);
    assert_eq!(bus.read8(0xA000), 0x55, "bank 2 kept its byte");
    bus.write8(0x4000, 0x00);
    assert_eq!(bus.read8(0xA000), 0x66);
}

#[test]
fn mbc2_has_nibble_ram_keyed_on_address_bit_8() {
    let mut bus = GameBoyBus::new(Cartridge::load(banked_rom(0x05, 0x00)).unwrap());

    // Bank select lives at addresses with bit 8 set.
    bus.write8(0x2100, 0x03);
    assert_eq!(bus.read8(0x4200), 0xB3);

    // RAM enable lives at addresses with bit 8 clear.
    bus.write8(0x2000, 0x0A);
    bus.write8(0xA000, 0xAB);
    assert_eq!(bus.read8(0xA000), 0xFB, "upper nibble reads as 1s");
    // The 512 cells repeat through the window.
    assert_eq!(bus.read8(0xA200), 0xFB);
}

#[test]
fn mbc3_banks_rom_and_ram() {
    let mut bus = GameBoyBus::new(Cartridge::load(banked_rom(0x13, 0x03)).unwrap());

    bus.write8(0x2000, 0x03);
    assert_eq!(bus.read8(0x4200), 0xB3);

    bus.write8(0x0000, 0x0A);
    bus.write8(0x4000, 0x01);
    bus.write8(0xA010, 0x99);
    assert_eq!(bus.read8(0xA010), 0x99);

    // RTC register selects do not alias RAM.
    bus.write8(0x4000, 0x08);
    assert_eq!(bus.read8(0xA010), 0xFF);
    bus.write8(0x4000, 0x01);
    assert_eq!(bus.read8(0xA010), 0x99);
}

#[test]
fn mbc5_can_map_bank_zero_into_the_switchable_window() {
    let mut bus = GameBoyBus::new(Cartridge::load(banked_rom(0x19, 0x00)).unwrap());

    bus.write8(0x2000, 0x02);
    assert_eq!(bus.read8(0x4200), 0xB2);

    bus.write8(0x2000, 0x00);
    assert_eq!(bus.read8(0x4200), 0xB0, "MBC5 allows bank 0 here");
}

#[test]
fn save_ram_round_trips_through_construction() {
    let mut save = vec![0u8; 0x2000];
    save[0x000] = 0x11;
    save[0x123] = 0x22;

    let rom = rom_image(0x03, 0x02, 0x8000); // MBC1+RAM+BATTERY, 8 KiB
    let mut gb = GameBoy::from_rom_with_save(rom, &save).unwrap();

    gb.bus_mut().write8(0x0000, 0x0A); // RAM enable
    assert_eq!(gb.bus_mut().read8(0xA000), 0x11);
    assert_eq!(gb.bus_mut().read8(0xA123), 0x22);

    gb.bus_mut().write8(0xA000, 0x77);
    assert_eq!(gb.save_ram()[0x000], 0x77);
    assert_eq!(gb.save_ram()[0x123], 0x22);
    assert_eq!(gb.save_ram().len(), 0x2000);
}

#[test]
fn machine_runs_a_small_program() {
    init_logger();

    // LD A,0x12; LD (0xC000),A; JR -2 (spin)
    let mut rom = rom_image(0x00, 0x00, 0x8000);
    rom[0x100] = 0x3E;
    rom[0x101] = 0x12;
    rom[0x102] = 0xEA;
    rom[0x103] = 0x00;
    rom[0x104] = 0xC0;
    rom[0x105] = 0x18;
    rom[0x106] = 0xFE;

    let mut gb = GameBoy::from_rom(rom).unwrap();
    let mut total = 0u32;
    for _ in 0..4 {
        total += gb.step();
    }
    assert_eq!(gb.bus_mut().read8(0xC000), 0x12);
    assert_eq!(gb.cpu.regs.pc, 0x0105, "spinning on the JR");
    assert_eq!(total, 8 + 16 + 12 + 12);
}
