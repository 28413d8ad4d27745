//! Command-line interface for the Qingping TLV codec.

use std::io::Read;

use anyhow::{bail, Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use qingping_codec::{
    calibration_command, co2_asc_command, config_command, encode, is_tlv_frame, led_command,
    offset_command, request_settings_command, temperature_unit_command, to_hex, unpack_frame,
    verify_checksum, Command as FrameCommand, Decoder, DecoderConfig, SensorOffsets, Tag,
    TemperatureUnit,
};

/// Qingping TLV tool - decode, inspect and build sensor frames.
#[derive(Parser, Debug)]
#[command(name = "qingping")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a frame into JSON telemetry.
    Decode {
        /// Frame as hex, or `-` to read it from stdin.
        frame: String,
        /// Reject frames with a missing or wrong checksum.
        #[arg(long)]
        verify_checksum: bool,
        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },
    /// List the sub-records of a frame.
    Inspect {
        /// Frame as hex, or `-` to read it from stdin.
        frame: String,
    },
    /// Encode a frame from raw records.
    Encode {
        /// Command byte (decimal or 0x-prefixed hex).
        #[arg(short, long, value_parser = parse_byte)]
        command: u8,
        /// Record as TAG=HEX, repeatable. Order is kept.
        #[arg(short, long = "record", value_parser = parse_record)]
        records: Vec<(u8, Vec<u8>)>,
    },
    /// Build a settings frame.
    Build {
        #[command(subcommand)]
        build_cmd: BuildCommand,
    },
}

/// Settings frame builders.
#[derive(Subcommand, Debug)]
enum BuildCommand {
    /// Upload and sampling intervals.
    Config {
        /// Upload interval in minutes.
        #[arg(long, default_value_t = 15)]
        report_interval: u16,
        /// Sampling interval in seconds.
        #[arg(long, default_value_t = 60)]
        collect_interval: u16,
    },
    /// Sensor calibration offsets.
    Offsets {
        /// Temperature offset in °C (step 0.1).
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        temperature: f64,
        /// Humidity offset in % (step 0.1).
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        humidity: f64,
        /// CO2 offset in ppm.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        co2: i64,
        /// PM2.5 offset.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        pm25: i64,
        /// PM10 offset.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        pm10: i64,
    },
    /// CO2 automatic self-calibration on/off.
    Co2Asc {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        enable: bool,
    },
    /// Indicator LED on/off.
    Led {
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        enable: bool,
    },
    /// Trigger a manual CO2 calibration.
    Calibrate,
    /// Temperature display unit.
    TemperatureUnit {
        #[arg(value_enum)]
        unit: UnitArg,
    },
    /// Ask the device for its current settings.
    RequestSettings,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UnitArg {
    Celsius,
    Fahrenheit,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(value: UnitArg) -> Self {
        match value {
            UnitArg::Celsius => TemperatureUnit::Celsius,
            UnitArg::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Decode {
            frame,
            verify_checksum,
            pretty,
        } => run_decode(&frame, verify_checksum, pretty),
        Command::Inspect { frame } => run_inspect(&frame),
        Command::Encode { command, records } => {
            let frame = encode(command, records)?;
            println!("{}", to_hex(&frame));
            Ok(())
        }
        Command::Build { build_cmd } => {
            let frame = build_frame(build_cmd)?;
            println!("{}", to_hex(&frame));
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let json_logging = std::env::var("QINGPING_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_directive = if verbose {
        "warn,qingping=debug"
    } else {
        "warn,qingping=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

fn run_decode(input: &str, verify: bool, pretty: bool) -> Result<()> {
    let frame = read_frame(input)?;
    tracing::debug!("Decoding {} byte frame", frame.len());
    let config = if verify {
        DecoderConfig::strict()
    } else {
        DecoderConfig::from_env()
    };

    let telemetry = Decoder::new(config)
        .try_decode(&frame)
        .context("Failed to decode frame")?;

    let json = if pretty {
        serde_json::to_string_pretty(&telemetry)?
    } else {
        serde_json::to_string(&telemetry)?
    };
    println!("{}", json);
    Ok(())
}

fn run_inspect(input: &str) -> Result<()> {
    let frame = read_frame(input)?;
    let unpacked = unpack_frame(&frame).context("Failed to unpack frame")?;
    if !is_tlv_frame(&frame) {
        tracing::warn!("Frame does not start with the 'CG' marker");
    }

    println!(
        "command:    {:#04x} ({:?})",
        unpacked.command,
        FrameCommand::from(unpacked.command)
    );
    println!("product id: {}", unpacked.product_id);
    println!(
        "payload:    {} bytes, {} records{}",
        unpacked.payload_len,
        unpacked.records.len(),
        if unpacked.truncated { " (truncated)" } else { "" }
    );
    match verify_checksum(&frame) {
        Ok(()) => println!("checksum:   ok"),
        Err(e) => println!("checksum:   {}", e),
    }

    for record in &unpacked.records {
        println!(
            "  {:#04x} {:<20} {:>5}  {}",
            record.tag,
            Tag::from(record.tag).name(),
            record.len(),
            hex::encode(record.value)
        );
    }
    Ok(())
}

fn build_frame(cmd: BuildCommand) -> Result<Vec<u8>> {
    let frame = match cmd {
        BuildCommand::Config {
            report_interval,
            collect_interval,
        } => config_command(report_interval, collect_interval)?,
        BuildCommand::Offsets {
            temperature,
            humidity,
            co2,
            pm25,
            pm10,
        } => offset_command(&SensorOffsets {
            temperature,
            humidity,
            co2,
            pm25,
            pm10,
        })?,
        BuildCommand::Co2Asc { enable } => co2_asc_command(enable)?,
        BuildCommand::Led { enable } => led_command(enable)?,
        BuildCommand::Calibrate => calibration_command()?,
        BuildCommand::TemperatureUnit { unit } => temperature_unit_command(unit.into())?,
        BuildCommand::RequestSettings => request_settings_command()?,
    };
    Ok(frame)
}

/// Read a hex frame from the argument, or from stdin for `-`.
fn read_frame(input: &str) -> Result<Vec<u8>> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read frame from stdin")?;
        buf
    } else {
        input.to_string()
    };
    parse_hex(&text).context("Frame is not valid hex")
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);
    if cleaned.is_empty() {
        bail!("empty input");
    }
    Ok(hex::decode(cleaned)?)
}

fn parse_byte(s: &str) -> std::result::Result<u8, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte '{}': {}", s, e))
}

fn parse_record(s: &str) -> std::result::Result<(u8, Vec<u8>), String> {
    let (tag, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=HEX, got '{}'", s))?;
    let tag = parse_byte(tag)?;
    let value = if value.is_empty() {
        Vec::new()
    } else {
        parse_hex(value).map_err(|e| format!("invalid value for tag {:#04x}: {}", tag, e))?
    };
    Ok((tag, value))
}
