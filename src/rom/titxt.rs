use combine::parser::char::{char, hex_digit, spaces};
use combine::{any, attempt, choice, many, many1, satisfy_map, Parser, Stream};
use std::path::Path;

use log::debug;

use super::image::RomImage;
use crate::error::{Error, Result};

/// One uppercase hex digit. Lowercase is not part of the dump format.
fn nibble<Input>() -> impl Parser<Input, Output = u8>
where
    Input: Stream<Token = char>,
{
    satisfy_map(|c: char| match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'A'..='F' => Some(c as u8 - b'A' + 10),
        _ => None,
    })
}

fn hex_pair<Input>() -> impl Parser<Input, Output = u8>
where
    Input: Stream<Token = char>,
{
    (nibble(), nibble()).map(|(hi, lo)| (hi << 4) | lo)
}

/// Every hex pair in the input, scanning left to right and skipping one
/// character wherever a pair does not start.
fn hex_pairs_parser<Input>() -> impl Parser<Input, Output = Vec<Option<u8>>>
where
    Input: Stream<Token = char>,
{
    many::<Vec<_>, _, _>(choice((
        attempt(hex_pair()).map(Some),
        any().map(|_| None),
    )))
}

/// `@ADDR` address directive (TI-TXT).
fn address_directive<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
{
    char('@').with(many1::<String, _, _>(hex_digit())).skip(spaces())
}

/**
 * Extract the bytes of every two-digit uppercase hex token in `line`. Any
 * other characters (separators, odd trailing digits, lowercase) are skipped.
 */
pub fn hex_pairs(line: &str) -> Vec<u8> {
    match hex_pairs_parser().parse(line) {
        Ok((pairs, _)) => pairs.into_iter().flatten().collect(),
        Err(_) => Vec::new(),
    }
}

/// A code line starts with two uppercase hex digits.
pub fn is_code_line(line: &str) -> bool {
    hex_pair().parse(line).is_ok()
}

/// Address of an `@ADDR` line, if `line` is one.
pub fn parse_address(line: &str) -> Option<u32> {
    let (digits, rest) = address_directive().parse(line).ok()?;
    if !rest.is_empty() {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok()
}

/**
 * Parse a TI-TXT ROM dump into its flat byte image.
 *
 * Only code lines contribute bytes. Address directives start a new region,
 * and every other line (including the closing `q`) is dropped.
 */
pub fn parse_rom_dump<'a, I>(lines: I) -> RomImage
where
    I: IntoIterator<Item = &'a str>,
{
    let mut image = RomImage::new();

    for (number, line) in lines.into_iter().enumerate() {
        if is_code_line(line) {
            image.extend_from_slice(&hex_pairs(line));
        } else if line.starts_with('@') {
            match parse_address(line) {
                Some(addr) => {
                    debug!("line {}: region at 0x{:04X}", number + 1, addr);
                    image.start_region(addr);
                }
                None => debug!("line {}: ignoring bad address directive", number + 1),
            }
        }
    }
    image
}

/// Read and parse a TI-TXT ROM dump file.
pub fn read_rom_file(path: &Path) -> Result<RomImage> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(parse_rom_dump(text.lines()))
}

//----------------------------------------------------------------------------
// Tests
//----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "@9000\n\
                        31 40 00 04 B0 13 5C 90 0C 43 B0 13 00 90 1C 43\n\
                        B0 13 56 90 32 D0 10 00 FD 3F 03 43\n\
                        @FFFE\n\
                        00 90\n\
                        q\n";

    #[test]
    fn code_lines_need_two_uppercase_digits() {
        assert!(is_code_line("00 01"));
        assert!(is_code_line("FF"));
        assert!(is_code_line("A5junk"));
        assert!(!is_code_line("@9000"));
        assert!(!is_code_line("q"));
        assert!(!is_code_line("ff 00"));
        assert!(!is_code_line("0"));
        assert!(!is_code_line(" 00"));
        assert!(!is_code_line(""));
    }

    #[test]
    fn tokenizer_skips_anything_that_is_not_a_pair() {
        assert_eq!(hex_pairs("00 01 02 03\n"), vec![0x00, 0x01, 0x02, 0x03]);
        assert_eq!(hex_pairs("0001,02;;03"), vec![0x00, 0x01, 0x02, 0x03]);
        assert_eq!(hex_pairs("ABC"), vec![0xab]);
        assert_eq!(hex_pairs("A BC D"), vec![0xbc]);
        assert_eq!(hex_pairs("ab cd EF"), vec![0xef]);
        assert_eq!(hex_pairs("xGHx12"), vec![0x12]);
        assert!(hex_pairs("").is_empty());
    }

    #[test]
    fn filters_directives_and_terminator() {
        let image = parse_rom_dump(DUMP.lines());
        assert_eq!(image.len(), 30);
        assert_eq!(&image.data()[..4], &[0x31, 0x40, 0x00, 0x04]);
        assert_eq!(&image.data()[28..], &[0x00, 0x90]);
    }

    #[test]
    fn non_code_lines_contribute_nothing_whatever_they_hold() {
        let lines = ["@9000 00 11 22", "q 00 11 22", "; AA BB", "", "01"];
        let image = parse_rom_dump(lines);
        assert_eq!(image.data(), &[0x01]);
    }

    #[test]
    fn spec_example_lines() {
        let image = parse_rom_dump(["00 01 02 03\n", "FF\n", "q\n"]);
        assert_eq!(image.data(), &[0x00, 0x01, 0x02, 0x03, 0xff]);
    }

    #[test]
    fn empty_dump_gives_empty_image() {
        let image = parse_rom_dump(["@9000", "q"]);
        assert!(image.is_empty());
        assert_eq!(image.regions().count(), 0);
    }

    #[test]
    fn address_directives_split_regions() {
        let image = parse_rom_dump(DUMP.lines());
        let regions: Vec<_> = image.regions().collect();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].address(), 0x9000);
        assert_eq!(regions[0].len(), 28);
        assert_eq!(regions[1].address(), 0xfffe);
        assert_eq!(image.region_data(regions[1]), &[0x00, 0x90]);
    }

    #[test]
    fn address_parsing() {
        assert_eq!(parse_address("@9000"), Some(0x9000));
        assert_eq!(parse_address("@fffe  "), Some(0xfffe));
        assert_eq!(parse_address("@"), None);
        assert_eq!(parse_address("@90zz"), None);
        assert_eq!(parse_address("9000"), None);
    }

    #[test]
    fn rom_file_is_read_and_parsed() {
        let path = std::env::temp_dir().join(format!("afd2-rom-{}.txt", std::process::id()));
        std::fs::write(&path, DUMP).unwrap();

        let image = read_rom_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(image, parse_rom_dump(DUMP.lines()));
    }

    #[test]
    fn missing_rom_file_is_an_io_error() {
        let path = Path::new("/nonexistent/AfridevV2_MSP430_rom.txt");
        assert!(matches!(read_rom_file(path), Err(Error::Io { .. })));
    }

    #[test]
    fn token_count_matches_image_length() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let mut lines = Vec::new();
        let mut expected = Vec::new();
        for _ in 0..50 {
            let n = rng.gen_range(1..17);
            let bytes: Vec<u8> = (0..n).map(|_| rng.gen()).collect();
            let line: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            lines.push(line.join(" "));
            expected.extend(bytes);
        }
        lines.push("q".to_string());

        let image = parse_rom_dump(lines.iter().map(|l| l.as_str()));
        assert_eq!(image.data(), expected.as_slice());
    }
}
