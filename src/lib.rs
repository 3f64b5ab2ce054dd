//! Build tooling for the AfridevV2 (AFD2) MSP430 firmware: turns the ROM dump
//! of an application build into the over-the-air upgrade message understood by
//! the device, and combines application and bootloader build files.

pub mod config;
pub mod error;
pub mod rom;

pub use error::{Error, Result};
