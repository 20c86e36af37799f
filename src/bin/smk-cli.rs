//! smk-cli - Command-line interface for the Smacker decoder
//!
//! Prints file metadata and walks every frame of a Smacker file, reporting
//! what each frame carries.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use smacker::{FrameStatus, OpenMode, Smacker, YScaleMode};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "smk-cli")]
#[command(about = "Inspect and decode Smacker (.smk) video files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for decoder trace logging)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header information and audio tracks
    Info {
        /// Smacker file to inspect
        input: PathBuf,
    },

    /// Decode every frame and report its contents
    Frames {
        /// Smacker file to decode
        input: PathBuf,

        /// Read frame chunks from disk as they are decoded
        #[arg(long)]
        disk: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let result = match cli.command {
        Commands::Info { input } => show_file_info(&input),
        Commands::Frames { input, disk } => {
            let mode = if disk { OpenMode::Disk } else { OpenMode::Memory };
            walk_frames(&input, mode, cli.verbose > 0, cli.quiet)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn show_file_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let smk = Smacker::open(input, OpenMode::Disk)?;
    let info = smk.info();

    let y_scale = match info.y_scale {
        YScaleMode::None => "none",
        YScaleMode::Double => "double",
        YScaleMode::Interlace => "interlace",
    };

    println!("Smacker File Information:");
    println!("  File: {}", input.display());
    println!("  Version: SMK{}", info.version.as_byte() as char);
    println!("  Dimensions: {}x{}", info.width, info.height);
    println!(
        "  Frames: {}{}",
        info.frame_count,
        if info.has_ring_frame { " + ring frame" } else { "" }
    );
    println!(
        "  Frame rate: {:.3} fps ({} us per frame)",
        info.fps, info.frame_duration_us
    );
    println!("  Y scale: {}", y_scale);
    println!("  Tree chunk: {} bytes", info.tree_size);

    let keyframes = (0..smk.total_frames())
        .filter(|&f| smk.is_keyframe(f).unwrap_or(false))
        .count();
    println!("  Keyframes: {}", keyframes);

    for (track, audio) in info.audio.iter().enumerate() {
        if !audio.exists {
            continue;
        }
        println!(
            "  Audio track {}: {} Hz, {}-bit, {}, {}",
            track,
            audio.sample_rate,
            audio.bit_depth,
            if audio.channels == 2 { "stereo" } else { "mono" },
            if audio.compressed { "DPCM" } else { "raw PCM" }
        );
    }

    Ok(())
}

fn walk_frames(
    input: &Path,
    mode: OpenMode,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let start_time = Instant::now();
    let mut smk = Smacker::open(input, mode)?;
    let total = smk.total_frames();

    let progress = if !quiet && !verbose {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb.set_message("Decoding...");
        Some(pb)
    } else {
        None
    };

    let mut palette_changes = 0;
    let mut audio_bytes = [0usize; smacker::NUM_AUDIO_TRACKS];
    let mut faults = 0;

    // a ring frame file loops forever, so stop after one pass
    let mut status = smk.first()?;
    for _ in 0..total {
        let frame = smk.current_frame();
        let frame_type = smk.frame_type(frame)?;
        if frame_type & 0x01 != 0 {
            palette_changes += 1;
        }
        for (track, bytes) in audio_bytes.iter_mut().enumerate() {
            *bytes += smk.audio_size(track);
        }
        faults += smk.render_faults().len();

        if verbose {
            let tracks: Vec<String> = (0..smacker::NUM_AUDIO_TRACKS)
                .filter(|&t| smk.audio_size(t) > 0)
                .map(|t| format!("{}:{}", t, smk.audio_size(t)))
                .collect();
            println!(
                "frame {:5}{}{} audio [{}]",
                frame,
                if smk.is_keyframe(frame)? { " key" } else { "    " },
                if frame_type & 0x01 != 0 { " pal" } else { "    " },
                tracks.join(" ")
            );
        }
        for fault in smk.render_faults() {
            eprintln!("  {}", fault);
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }

        if status != FrameStatus::More {
            break;
        }
        status = smk.next()?;
    }

    if let Some(ref pb) = progress {
        pb.finish_with_message("Decoding complete");
    }

    if !quiet {
        println!("✓ Decoded {} frames", total);
        println!("  Palette changes: {}", palette_changes);
        for (track, bytes) in audio_bytes.iter().enumerate() {
            if *bytes > 0 {
                println!("  Audio track {}: {} bytes", track, bytes);
            }
        }
        println!("  Render faults: {}", faults);
        println!("  Time: {:.2?}", start_time.elapsed());
    }

    smk.close();
    Ok(())
}
