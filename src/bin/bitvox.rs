use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use bitvox::config::{load_voice_defaults, VoicePreset};
use bitvox::engines::formant::phonemes::{by_category, Category};
use bitvox::engines::formant::FormantEngine;
use bitvox::export::export_kit_with;
use bitvox::preview::{CaptureSink, PreviewOptions, PreviewScheduler, StopHandle};
use bitvox::resolve::VoiceDefaults;
use bitvox::sheet::SyllableSheet;
use bitvox::synth::RenderEvent;
use bitvox::wav::write_wav;
use bitvox::{Note, SpeechEngine, TARGET_SAMPLE_RATE};

#[derive(Debug, Parser)]
#[command(name = "bitvox")]
#[command(about = "Render text as a syllable sample kit for 8-pad samplers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Split text into syllables and show the pad layout
    Syllabize(SyllabizeArgs),
    /// Render a kit WAV
    Export(ExportArgs),
    /// Play syllables one after another (Ctrl-C stops)
    Preview(PreviewArgs),
    /// List every phoneme code
    Phonemes,
    /// Convert text to phoneme notation
    G2p {
        text: String,
    },
}

#[derive(Debug, Args)]
struct TextArgs {
    text: String,
    #[command(flatten)]
    voice: VoiceArgs,
}

#[derive(Debug, Args)]
struct SyllabizeArgs {
    #[command(flatten)]
    input: TextArgs,
    #[arg(long, help = "Print the resolved syllables as JSON")]
    json: bool,
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[command(flatten)]
    input: TextArgs,
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    #[command(flatten)]
    input: TextArgs,
    #[arg(long, help = "Also write everything that was played to this WAV file")]
    record: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct VoiceArgs {
    #[arg(long, help = "Voice preset JSON; flags below override it")]
    voice: Option<PathBuf>,
    #[arg(long, allow_negative_numbers = true)]
    pitch: Option<i32>,
    #[arg(long, help = "Pitch as a note name, e.g. C#")]
    note: Option<Note>,
    #[arg(long, requires = "note")]
    octave: Option<u8>,
    #[arg(long, allow_negative_numbers = true)]
    speed: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    mouth: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    throat: Option<i32>,
    #[arg(long, help = "Treat the text as phoneme notation")]
    phonetic: bool,
}

impl VoiceArgs {
    fn defaults(&self) -> bitvox::error::Result<VoiceDefaults> {
        let base = match &self.voice {
            Some(path) => load_voice_defaults(path)?,
            None => VoiceDefaults::default(),
        };
        let flags = VoicePreset {
            pitch: self.pitch,
            note: self.note,
            octave: self.octave,
            speed: self.speed,
            mouth: self.mouth,
            throat: self.throat,
            phonetic: self.phonetic.then_some(true),
        };
        Ok(flags.apply_to(base))
    }
}

impl TextArgs {
    fn sheet(&self) -> bitvox::error::Result<SyllableSheet> {
        let mut sheet = SyllableSheet::new(self.voice.defaults()?);
        sheet.generate_from_text(&self.text);
        Ok(sheet)
    }
}

fn print_progress(event: &RenderEvent) {
    match event {
        RenderEvent::Started { .. } => {}
        RenderEvent::Completed { index, samples, .. } => {
            println!("  [{index}] {samples} samples");
        }
        RenderEvent::Failed { index, failure } => {
            println!("  [{index}] failed: {}", failure.cause);
        }
    }
}

fn syllabize(args: &SyllabizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let sheet = args.input.sheet()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(sheet.syllables())?);
        return Ok(());
    }
    for (index, syllable) in sheet.syllables().iter().enumerate() {
        let voice = syllable.voice();
        println!(
            "{index:>3}  {:<12} pitch {:>3}  speed {:>3}  mouth {:>3}  throat {:>3}",
            syllable.text(),
            voice.pitch,
            voice.speed,
            voice.mouth,
            voice.throat
        );
    }
    let layout = sheet.layout_preview();
    println!(
        "{} syllables, {} pads ({} padding)",
        layout.active_count, layout.target_slice_count, layout.padding_count
    );
    Ok(())
}

fn export(args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let sheet = args.input.sheet()?;
    let engine = FormantEngine::new();

    let kit = export_kit_with(&engine, sheet.syllables(), print_progress)?;
    let path = kit.write_to_dir(&args.out)?;

    println!(
        "Saved {} ({} syllables, {} pads of {} samples)",
        path.display(),
        kit.layout.active_count,
        kit.layout.target_slice_count,
        kit.layout.slice_duration_samples
    );
    if !kit.failed.is_empty() {
        let ids: Vec<String> = kit.failed.iter().map(ToString::to_string).collect();
        println!("Silent slots for failed syllables: {}", ids.join(", "));
    }
    Ok(())
}

async fn preview(args: &PreviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let sheet = args.input.sheet()?;
    let snapshot = sheet.snapshot();

    let sink = Arc::new(CaptureSink::new());
    let scheduler = PreviewScheduler::new(
        Arc::new(FormantEngine::new()),
        Arc::clone(&sink),
        PreviewOptions::default(),
    );

    let stop = StopHandle::new();
    let on_ctrl_c = {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.stop();
            }
        })
    };

    let report = scheduler
        .run(Arc::clone(&snapshot), &stop, |event| {
            if let RenderEvent::Started { index, .. } = event {
                println!("> {}", snapshot[*index].text());
            }
            print_progress(event);
        })
        .await;
    on_ctrl_c.abort();
    let report = report.ok_or("a preview is already running")?;

    println!(
        "Played {} of {} syllables{}",
        report.played,
        snapshot.len(),
        if report.cancelled { " (stopped)" } else { "" }
    );

    if let Some(path) = &args.record {
        let played: Vec<f32> = sink.take().into_iter().flatten().collect();
        write_wav(path, &played, TARGET_SAMPLE_RATE)?;
        println!("Recorded {} samples to {}", played.len(), path.display());
    }
    Ok(())
}

fn list_phonemes() {
    for category in Category::ALL {
        println!("{category}");
        for info in by_category(category) {
            println!("  {:<3} {}", info.code, info.example);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Syllabize(args) => syllabize(args)?,
        Commands::Export(args) => export(args)?,
        Commands::Preview(args) => preview(args).await?,
        Commands::Phonemes => list_phonemes(),
        Commands::G2p { text } => {
            println!("{}", FormantEngine::new().convert_to_phonemes(text)?);
        }
    }
    Ok(())
}
