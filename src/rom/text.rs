use std::path::Path;

use lazy_static::lazy_static;

use super::message::UpgradeMessage;
use crate::error::{Error, Result};

/// Each byte is written as two uppercase hex digits and a space.
const CELL: usize = 3;

lazy_static! {
    static ref HEX_TABLE: String = make_hex_table();
}

fn make_hex_table() -> String {
    let mut table = String::with_capacity(256 * CELL);
    for i in 0..256u32 {
        table.push_str(&format!("{:02X} ", i));
    }
    table
}

pub fn hex_text(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len() * CELL);
    for b in bytes.iter() {
        let s = *b as usize * CELL;
        text.push_str(&HEX_TABLE[s..s + CELL]);
    }
    text
}

/// Text form of an upgrade message, as read by the modem upload tooling.
pub fn to_text(message: &UpgradeMessage) -> String {
    hex_text(&message.to_bytes())
}

/**
 * Write `text` to `output`, replacing whatever is there, or print it to the
 * console when no output file is given.
 */
pub fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text).map_err(|e| Error::io(path, e)),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}
