use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use afd2_msg::config::MessageConfig;
use afd2_msg::rom::decode::decode_text;
use afd2_msg::rom::intel::read_intel_hex_file;
use afd2_msg::rom::merge::{merge_files, COMBINED_FILE_NAME};
use afd2_msg::rom::text::{to_text, write_output};
use afd2_msg::rom::titxt::read_rom_file;
use afd2_msg::rom::{split_sections, RomImage, SectionLayout, UpgradeMessage};
use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};

// -- Data types for command-line options -- //
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbosity of generated output?
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a ROM dump into an AFD2 upgrade message
    Encode(EncodeArgs),
    /// Decode an upgrade message and check it the way the device does
    Inspect {
        #[arg(value_name = "FILENAME")]
        message: PathBuf,

        /// TOML file with the expected header constants
        #[arg(short, long, value_name = "FILENAME")]
        config: Option<PathBuf>,
    },
    /// Combine the application and bootloader build files
    Merge {
        app: PathBuf,
        boot: PathBuf,

        #[arg(short, long, value_name = "FILENAME", default_value = COMBINED_FILE_NAME)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct EncodeArgs {
    /// ROM dump of the application build
    #[arg(value_name = "INPUT", default_value = "AfridevV2_MSP430_rom.txt")]
    input: PathBuf,

    /// Message file to write; prints to the console when omitted
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Format of the input file
    #[arg(short, long, value_enum, default_value_t = InputFormat::TiTxt)]
    format: InputFormat,

    /// TOML file with the message header constants
    #[arg(short, long, value_name = "FILENAME")]
    config: Option<PathBuf>,

    /// Flash address of the (single) section
    #[arg(long, value_parser = parse_u16, conflicts_with = "per_region")]
    address: Option<u16>,

    /// Message number byte
    #[arg(long, value_parser = parse_u8)]
    msg_number: Option<u8>,

    /// Message ID, sent MSB first
    #[arg(long, value_parser = parse_u16)]
    msg_id: Option<u16>,

    /// Four upgrade keys, comma separated
    #[arg(long, value_parser = parse_u8, value_delimiter = ',')]
    keys: Vec<u8>,

    /// Emit one section per address region instead of a single section
    #[arg(long)]
    per_region: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InputFormat {
    /// TI-TXT ROM dump, as written by the hex converter
    TiTxt,
    /// Intel HEX
    Ihex,
}

fn parse_u8(input: &str) -> std::result::Result<u8, ParseIntError> {
    parse_int::parse(input)
}

fn parse_u16(input: &str) -> std::result::Result<u16, ParseIntError> {
    parse_int::parse(input)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MessageConfig> {
    match path {
        Some(path) => Ok(MessageConfig::from_file(path)?),
        None => Ok(MessageConfig::default()),
    }
}

fn read_image(path: &Path, format: InputFormat) -> Result<RomImage> {
    let image = match format {
        InputFormat::TiTxt => read_rom_file(path),
        InputFormat::Ihex => read_intel_hex_file(path),
    };
    image.with_context(|| format!("Could not read ROM file '{}'", path.display()))
}

fn encode(args: EncodeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.section_address = address;
    }
    if let Some(n) = args.msg_number {
        config.msg_number = n;
    }
    if let Some(id) = args.msg_id {
        config.msg_id = id;
    }
    if !args.keys.is_empty() {
        ensure!(
            args.keys.len() == 4,
            "Expected 4 upgrade keys, got {}",
            args.keys.len()
        );
        config.keys.copy_from_slice(&args.keys);
    }

    info!(
        "Converting '{}' to an AFD2 upgrade message",
        args.input.display()
    );
    let image = read_image(&args.input, args.format)?;
    info!(
        "Found {} byte(s) in {} region(s)",
        image.len(),
        image.regions().count()
    );

    let layout = if args.per_region {
        SectionLayout::Regions
    } else {
        SectionLayout::Single {
            address: config.section_address,
        }
    };
    let sections = split_sections(&image, layout)
        .with_context(|| format!("Could not build sections from '{}'", args.input.display()))?;
    let message = UpgradeMessage::build(sections, &config)?;

    for s in message.sections() {
        let h = s.header();
        info!(
            " - Section {}: ADDR = 0x{:04X}, SIZE = {}, CRC16 = 0x{:04X}",
            h.section_number, h.start_address, h.length, h.crc16
        );
    }

    write_output(&to_text(&message), args.output.as_deref())?;
    if let Some(output) = args.output {
        info!("File '{}' created ({} bytes)", output.display(), message.len());
    }
    Ok(())
}

fn inspect(path: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read message file '{}'", path.display()))?;
    let message = decode_text(&text)
        .with_context(|| format!("'{}' is not a valid upgrade message", path.display()))?;

    let h = message.header();
    println!("\nUpgrade message:");
    println!(" - Number:   0x{:02X}", h.msg_number);
    println!(" - ID:       0x{:02X}{:02X}", h.msg_id_msb, h.msg_id_lsb);
    println!(" - Keys:     {:02X?}", h.keys);
    println!(" - Sections: {}", h.number_of_sections);
    println!(" - Length:   {}", message.len());
    for s in message.sections() {
        let sh = s.header();
        println!(
            " - Section {}: ADDR = 0x{:04X}, SIZE = {}, CRC16 = 0x{:04X}",
            sh.section_number, sh.start_address, sh.length, sh.crc16
        );
    }
    println!();

    message.check_keys(&config)?;
    message.verify()?;
    info!("All section CRCs match");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Encode(encode_args) => encode(encode_args),
        Command::Inspect { message, config } => inspect(&message, config.as_deref()),
        Command::Merge { app, boot, output } => {
            merge_files(&app, &boot, &output)?;
            info!("File '{}' created", output.display());
            Ok(())
        }
    }
}
