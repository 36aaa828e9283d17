//! Emulation core for the original Game Boy (DMG).
//!
//! The crate is split along the hardware's own seams: [`cpu`] holds the
//! LR35902 execution engine and the [`cpu::Bus`] trait it executes against;
//! [`machine`] holds the memory bus, the cartridge model, and the
//! [`machine::GameBoy`] container that wires everything together.
//!
//! Rendering, audio, timers, and input are deliberately not implemented
//! here. The bus routes their address ranges to [`machine::Peripheral`]
//! attachment points, and every CPU step reports its T-cycle cost so the
//! embedding application can drive those components and pace execution.

pub mod cpu;
pub mod machine;

pub use cpu::{Cpu, InterruptFlags};
pub use machine::{Cartridge, CartridgeError, GameBoy};
