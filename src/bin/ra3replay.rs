//! Red Alert 3 replay (.RA3Replay) tool CLI
//!
//! A command-line interface for inspecting, validating, and repairing RA3
//! replay files, plus CSF string-table conversion.
//!
//! ## Commands
//!
//! - `info` - Display replay metadata (header + duration)
//! - `validate` - Walk the chunk stream (exit codes for scripting)
//! - `fix` - Repair a replay with a truncated or missing footer
//! - `duration` - Fast-path duration read from the file tail
//! - `csf-dump` - Decode a CSF string table to JSON
//! - `csf-pack` - Encode a JSON label/text map to CSF

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use ra3_parser::{
    extract_final_timecode, read_details, repair_replay, scan_chunks, StringTable,
};

/// Red Alert 3 replay and string-table tool
#[derive(Parser)]
#[command(name = "ra3replay")]
#[command(about = "Red Alert 3 replay (.RA3Replay) parser and repair tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display replay information
    Info {
        /// Path to the replay file
        file: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Validate the replay's chunk stream and footer
    Validate {
        /// Path to the replay file
        file: PathBuf,
    },
    /// Repair a replay's footer
    Fix {
        /// Path to the replay file
        file: PathBuf,
        /// Output path for the repaired file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the match duration using only the file's tail bytes
    Duration {
        /// Path to the replay file
        file: PathBuf,
    },
    /// Decode a CSF string table to JSON
    CsfDump {
        /// Path to the .csf file
        file: PathBuf,
    },
    /// Encode a JSON object of label/text pairs to CSF
    CsfPack {
        /// Path to the JSON input
        file: PathBuf,
        /// Output path for the .csf file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct ValidateOutput {
    chunk_count: usize,
    last_timecode: Option<u32>,
    footer_timecode: Option<u32>,
    needs_repair: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), String> {
    match command {
        Commands::Info { file, json } => {
            let details = read_details(&file).map_err(|e| e.to_string())?;
            if json {
                let rendered =
                    serde_json::to_string_pretty(&details).map_err(|e| e.to_string())?;
                println!("{rendered}");
            } else {
                let header = &details.header;
                println!("Title:       {}", header.title);
                println!("Map:         {} ({})", header.map_name, header.map_id);
                println!(
                    "Version:     {}.{} ({} {})",
                    header.game_version.0, header.game_version.1, header.mod_name,
                    header.mod_version
                );
                println!("Timestamp:   {}", header.timestamp);
                println!("Players:     {}", header.players.join(", "));
                println!("Commentator: {}", header.has_commentator);
                match details.final_timecode {
                    Some(frames) => println!("Duration:    {frames} frames"),
                    None => println!("Duration:    unknown (footer missing, run `fix`)"),
                }
            }
            Ok(())
        }
        Commands::Validate { file } => {
            let data = fs::read(&file).map_err(|e| e.to_string())?;
            let summary = scan_chunks(&data).map_err(|e| e.to_string())?;
            let output = ValidateOutput {
                chunk_count: summary.chunk_count,
                last_timecode: summary.last_timecode,
                footer_timecode: summary.footer_timecode,
                needs_repair: summary.footer_timecode.is_none(),
            };
            let rendered = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
            println!("{rendered}");
            Ok(())
        }
        Commands::Fix { file, output } => {
            let data = fs::read(&file).map_err(|e| e.to_string())?;
            let fixed = repair_replay(&data).map_err(|e| e.to_string())?;
            fs::write(&output, fixed).map_err(|e| e.to_string())?;
            println!("wrote {}", output.display());
            Ok(())
        }
        Commands::Duration { file } => {
            let data = fs::read(&file).map_err(|e| e.to_string())?;
            let tail_start = footer_tail_start(&data)
                .ok_or_else(|| "no readable footer length".to_string())?;
            match extract_final_timecode(&data[tail_start..]) {
                Some(frames) => {
                    println!("{frames}");
                    Ok(())
                }
                None => Err("footer missing or inconsistent".to_string()),
            }
        }
        Commands::CsfDump { file } => {
            let data = fs::read(&file).map_err(|e| e.to_string())?;
            let table = StringTable::parse(&data).map_err(|e| e.to_string())?;
            let map: BTreeMap<&str, String> = table
                .iter()
                .map(|(label, units)| (label, String::from_utf16_lossy(units)))
                .collect();
            let rendered = serde_json::to_string_pretty(&map).map_err(|e| e.to_string())?;
            println!("{rendered}");
            Ok(())
        }
        Commands::CsfPack { file, output } => {
            let text = fs::read_to_string(&file).map_err(|e| e.to_string())?;
            let map: BTreeMap<String, String> =
                serde_json::from_str(&text).map_err(|e| e.to_string())?;
            let mut table = StringTable::new();
            for (label, value) in &map {
                let units: Vec<u16> = value.encode_utf16().collect();
                table.insert(label, &units);
            }
            fs::write(&output, table.encode()).map_err(|e| e.to_string())?;
            println!("wrote {} ({} entries)", output.display(), table.len());
            Ok(())
        }
    }
}

/// Locates the start of the terminator-plus-footer tail from the length
/// stored in the file's final 4 bytes.
fn footer_tail_start(data: &[u8]) -> Option<usize> {
    if data.len() < 4 {
        return None;
    }
    let length_bytes: [u8; 4] = data[data.len() - 4..].try_into().ok()?;
    let footer_length = u32::from_le_bytes(length_bytes) as usize;
    data.len().checked_sub(footer_length + 4)
}
