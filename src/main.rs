use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wavemark::annotations::{AnnotationEntry, FileAnnotationStore, FileStoreError, SectionState};
use wavemark::audio::{self, AudioBuffer, DecodeError};
use wavemark::console::Command;
use wavemark::ViewerConfig;

#[derive(Parser, Debug)]
#[command(name = "wavemark")]
#[command(about = "Mono WAV viewer and annotator")]
#[command(version)]
struct Args {
    /// Mono PCM-16 or float32 WAV file
    wav: PathBuf,

    /// JSON viewer configuration
    #[arg(short, long, env = "WAVEMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Annotation file (defaults to the WAV path with the annotation extension)
    #[arg(short, long)]
    annotations: Option<PathBuf>,

    /// Print the annotations as JSON and exit
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wavemark=info")),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let args = Args::parse();
    let config = ViewerConfig::load_or_default(args.config.as_deref())?;

    let buffer = match audio::decode(&args.wav) {
        Ok(buffer) => buffer,
        Err(DecodeError::UnsupportedChannelLayout(channels)) => bail!(
            "{} has {} channels. Make sure the file is MONO",
            args.wav.display(),
            channels
        ),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load {}", args.wav.display()))
        }
    };

    let annotation_path = args
        .annotations
        .unwrap_or_else(|| config.annotation_path(&args.wav));
    let mut marks = FileAnnotationStore::open(&annotation_path, buffer.len())
        .with_context(|| format!("Failed to open {}", annotation_path.display()))?;

    if args.dump {
        println!("{}", serde_json::to_string_pretty(marks.entries_snapshot())?);
        return Ok(());
    }

    println!("Sample Rate: {} Hz", buffer.sample_rate());
    println!("Total Samples: {}", buffer.len());
    println!("Annotations: {}", annotation_path.display());
    let overview = buffer.overview(config.overview_points);
    println!(
        "Overview: {} points, peak {:.3}",
        overview.len(),
        overview.iter().fold(0.0f32, |p, s| p.max(s.abs()))
    );
    print_entries(&buffer, &marks);
    print_window(&buffer, 0.0, config.initial_window as f64);

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            prompt()?;
            continue;
        }

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run(command, &buffer, &config, &mut marks),
            Err(e) => println!("{e}"),
        }
        prompt()?;
    }

    Ok(())
}

fn run(command: Command, buffer: &AudioBuffer, config: &ViewerConfig, marks: &mut FileAnnotationStore) {
    let result = match command {
        Command::Mark {
            position,
            intensity,
        } => marks
            .insert_marker(position, intensity.unwrap_or(config.default_intensity))
            .map(|index| println!("Marker {} at sample {}", index, position)),
        Command::Section { position } => {
            marks
                .begin_or_complete_section(position)
                .map(|state| match state {
                    SectionState::Pending { start } => {
                        println!("Section start at sample {start}; pick the end")
                    }
                    SectionState::Completed { index } => println!("Section {index} added"),
                })
        }
        Command::Cancel => {
            if marks.cancel_pending_section() {
                println!("Pending section cancelled");
            }
            Ok(())
        }
        Command::Resize { index, start, end } => marks
            .update_section_bounds(index, start, end)
            .map(|new_index| println!("Section is now {new_index}")),
        Command::Delete { index } => marks.delete(index).map(|_| println!("Deleted {index}")),
        Command::DeleteNear { position } => match marks.store().nearest(position) {
            Some(index) => marks.delete(index).map(|_| println!("Deleted {index}")),
            None => {
                println!("Nothing to delete");
                Ok(())
            }
        },
        Command::List => {
            print_entries(buffer, marks);
            Ok(())
        }
        Command::Window { min, max } => {
            print_window(buffer, min, max);
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        match e {
            FileStoreError::Annotation(e) => println!("Rejected: {e}"),
            FileStoreError::Io(e) => tracing::error!("Failed to save annotations: {}", e),
        }
    }
}

fn print_entries(buffer: &AudioBuffer, marks: &FileAnnotationStore) {
    for (i, entry) in marks.entries_snapshot().iter().enumerate() {
        match entry {
            AnnotationEntry::Marker(m) => println!(
                "{:>4}: Marker at sample {} ({:.3} seconds) [{}]",
                i,
                m.sample_index,
                buffer.seconds_at(m.sample_index),
                m.intensity
            ),
            AnnotationEntry::Section(s) => println!(
                "{:>4}: Section {}..{} ({:.3}-{:.3} seconds)",
                i,
                s.start(),
                s.end(),
                buffer.seconds_at(s.start()),
                buffer.seconds_at(s.end())
            ),
        }
    }
}

fn print_window(buffer: &AudioBuffer, min: f64, max: f64) {
    let window = buffer.window(min, max);
    let visible = buffer.window_samples(&window);
    let peak = visible.iter().fold(0.0f32, |p, s| p.max(s.abs()));
    println!(
        "Window {}..{} ({} samples, peak {:.3})",
        window.offset,
        window.end(),
        window.len,
        peak
    );
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}
