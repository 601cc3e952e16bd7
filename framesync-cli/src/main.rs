use std::cell::RefCell;
use std::io::Write as _;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use framesync::{
    AudioCommand, Movie, PlaybackDriver, PlaybackOpts, Position, SimulatedAudio,
};

#[derive(Parser, Debug)]
#[command(name = "framesync", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a scene and frame summary of a movie as JSON.
    Inspect(InspectArgs),
    /// Play a movie against synthetic ticks and print every notification as JSON lines.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input movie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input movie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Simulated wall-clock duration in seconds.
    #[arg(long, default_value_t = 1.0)]
    seconds: f64,

    /// Tick frequency in Hz.
    #[arg(long, default_value_t = 60.0)]
    tick_hz: f64,

    /// Playback options JSON; flags below override it.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Loop at the end of the movie.
    #[arg(long = "loop", default_value_t = false)]
    looping: bool,

    /// Skip display notifications for frames crossed by one late tick.
    #[arg(long, default_value_t = false)]
    catch_up: bool,

    /// Report a sub-frame interpolation weight to the renderer.
    #[arg(long, default_value_t = false)]
    interpolate: bool,

    /// Simulated audio device speed relative to the wall clock.
    #[arg(long, default_value_t = 1.0)]
    audio_rate: f64,

    /// Refuse to start streams so every scene runs on the wall clock; triggers are still printed.
    #[arg(long, default_value_t = false)]
    silent: bool,

    /// 0-based frame index, counted across scenes, to start playback from.
    #[arg(long, default_value_t = 0)]
    start_frame: u64,
}

#[derive(serde::Serialize)]
struct SceneSummary<'a> {
    index: usize,
    first_frame: Option<u64>,
    name: Option<&'a str>,
    frames: usize,
    streams_sound: bool,
    labels: Vec<&'a str>,
}

#[derive(serde::Serialize)]
struct MovieSummary<'a> {
    fps: f64,
    width: u32,
    height: u32,
    total_frames: u64,
    last_position: Position,
    duration_secs: f64,
    sounds: Vec<&'a str>,
    scenes: Vec<SceneSummary<'a>>,
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Line {
    WillDisplay {
        position: Position,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Render {
        position: Position,
        #[serde(skip_serializing_if = "Option::is_none")]
        weight: Option<f64>,
    },
    DidDisplay {
        position: Position,
    },
    Audio {
        #[serde(flatten)]
        command: AudioCommand,
    },
    Finished {
        position: Position,
    },
}

#[derive(serde::Serialize)]
struct Record<'a> {
    t: f64,
    #[serde(flatten)]
    line: &'a Line,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Simulate(args) => cmd_simulate(args),
    }
}

fn load_movie(path: &std::path::Path) -> anyhow::Result<Movie> {
    Movie::from_path(path).with_context(|| format!("load movie '{}'", path.display()))
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let movie = load_movie(&args.in_path)?;
    let scenes = movie
        .scenes()
        .iter()
        .map(|scene| SceneSummary {
            index: scene.index1(),
            first_frame: movie.ordinal_of(Position::new(scene.index1(), 1)),
            name: scene.name(),
            frames: scene.frame_count(),
            streams_sound: scene.has_stream_sound(),
            labels: scene.frames().iter().filter_map(|f| f.label()).collect(),
        })
        .collect();
    let summary = MovieSummary {
        fps: movie.fps().as_f64(),
        width: movie.canvas().width,
        height: movie.canvas().height,
        total_frames: movie.total_frames(),
        last_position: movie.last_position(),
        duration_secs: movie.fps().frames_to_secs(movie.total_frames()),
        sounds: movie.sounds().keys().map(String::as_str).collect(),
        scenes,
    };

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &summary).context("write summary")?;
    writeln!(out)?;
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    if !(args.tick_hz.is_finite() && args.tick_hz > 0.0) {
        anyhow::bail!("--tick-hz must be > 0");
    }
    if !(args.seconds.is_finite() && args.seconds >= 0.0) {
        anyhow::bail!("--seconds must be >= 0");
    }

    let mut opts = match &args.opts {
        Some(path) => {
            let f = std::fs::File::open(path)
                .with_context(|| format!("open opts '{}'", path.display()))?;
            serde_json::from_reader::<_, PlaybackOpts>(std::io::BufReader::new(f))
                .with_context(|| format!("parse opts '{}'", path.display()))?
        }
        None => PlaybackOpts::default(),
    };
    opts.looping |= args.looping;
    opts.catch_up_on_dropped_ticks |= args.catch_up;
    opts.interpolates_frames |= args.interpolate;

    let movie = Arc::new(load_movie(&args.in_path)?);
    let start = movie.position_at_ordinal(args.start_frame).with_context(|| {
        format!(
            "--start-frame {} is past the last frame (movie has {})",
            args.start_frame,
            movie.total_frames()
        )
    })?;
    let audio = SimulatedAudio::with_speed(args.audio_rate);
    audio.set_failing(args.silent);
    let mut driver =
        PlaybackDriver::new(movie, opts).with_audio_output(Box::new(audio.clone()));
    driver.seek(start)?;

    let lines = Rc::new(RefCell::new(Vec::new()));
    let will = Rc::clone(&lines);
    driver.on_will_display(move |n| {
        will.borrow_mut().push(Line::WillDisplay {
            position: n.position,
            label: n.frame.label().map(str::to_string),
        });
    });
    let render = Rc::clone(&lines);
    driver.on_render(move |r| {
        render.borrow_mut().push(Line::Render {
            position: r.position,
            weight: r.interpolation.map(|i| i.weight),
        });
    });
    let did = Rc::clone(&lines);
    driver.on_did_display(move |n| {
        did.borrow_mut().push(Line::DidDisplay {
            position: n.position,
        });
    });

    let mut out = std::io::stdout().lock();
    let dt = 1.0 / args.tick_hz;
    let ticks = (args.seconds * args.tick_hz).ceil() as u64;

    driver.play_at(0.0);
    flush(&mut out, 0.0, &lines, &audio)?;
    for k in 1..=ticks {
        let t = (k as f64) * dt;
        audio.advance_secs(dt);
        let report = driver.on_tick(t);
        flush(&mut out, t, &lines, &audio)?;
        if report.finished {
            emit(
                &mut out,
                t,
                &Line::Finished {
                    position: driver.position(),
                },
            )?;
            break;
        }
    }
    tracing::info!(position = %driver.position(), "simulation done");
    Ok(())
}

fn flush(
    out: &mut impl std::io::Write,
    t: f64,
    lines: &Rc<RefCell<Vec<Line>>>,
    audio: &SimulatedAudio,
) -> anyhow::Result<()> {
    let drained = std::mem::take(&mut *lines.borrow_mut());
    for line in &drained {
        emit(out, t, line)?;
    }
    for command in audio.drain_commands() {
        emit(out, t, &Line::Audio { command })?;
    }
    Ok(())
}

fn emit(out: &mut impl std::io::Write, t: f64, line: &Line) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, &Record { t, line }).context("write event")?;
    writeln!(out)?;
    Ok(())
}
