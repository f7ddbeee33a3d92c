use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use syncscore::{
    DirectoryStore, FrameRenderer, Layout, PlaybackMode, RonScoreSource, Session, SessionCommand,
    Settings, TextRenderer,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Clock is a position in the recording
    Audio,
    /// Clock is a position in the score
    Midi,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Roll,
    Cinema,
}

/// Replays a song's aligned score as text frames.
#[derive(Debug, Parser)]
#[command(name = "syncscore", version)]
struct Args {
    /// Song id, the directory name under the songs root
    song: String,

    /// Directory holding one sub-directory per song
    #[arg(long, env = "SYNCSCORE_SONGS", default_value = "songs")]
    songs: PathBuf,

    /// Settings file (RON); defaults apply when missing
    #[arg(long, env = "SYNCSCORE_SETTINGS", default_value = "syncscore.ron")]
    settings: PathBuf,

    #[arg(long, value_enum, default_value = "audio")]
    mode: ModeArg,

    #[arg(long, value_enum, default_value = "roll")]
    layout: LayoutArg,

    /// Clock value of the first frame, in seconds
    #[arg(long, default_value_t = 0.0)]
    from: f64,

    /// Clock value after which stepping stops, in seconds
    #[arg(long, default_value_t = 10.0)]
    to: f64,

    #[arg(long, default_value_t = 4.0)]
    fps: f64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::load(&args.settings) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.settings.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&args, &settings) {
        Ok(frames) => {
            info!("Rendered {} frames", frames);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, settings: &Settings) -> syncscore::Result<usize> {
    let layout = match args.layout {
        LayoutArg::Roll => Layout::Roll(settings.roll),
        LayoutArg::Cinema => Layout::Cinema(settings.cinema),
    };
    let store = DirectoryStore::new(&args.songs);
    let (mut session, handle) =
        Session::open(&store, &RonScoreSource, &args.song, settings, layout)?;

    if let ModeArg::Midi = args.mode {
        let _ = handle.command_tx.send(SessionCommand::SetMode {
            mode: PlaybackMode::Symbolic,
            clock: args.from,
        });
    }

    let step = 1.0 / args.fps.max(1e-3);
    let mut renderer = TextRenderer::new(BufWriter::new(io::stdout().lock()));
    let mut frames = 0;
    let mut clock = args.from;
    while clock <= args.to {
        let frame = session.frame(clock);
        renderer.render(&frame)?;
        frames += 1;
        clock = args.from + frames as f64 * step;
    }

    Ok(frames)
}
