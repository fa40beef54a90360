use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::mpsc::Receiver,
    thread,
    time::Duration,
};

use clap::{Parser, Subcommand};
use daycycle_core::{
    pump_events, AppConfig, ClockPosition, Color, DaycycleError, DaylightSample,
    PlaybackController, PlaybackEvent, RenderGraph, RenderedFrame, Result, SceneDescriptor,
};
use tracing_subscriber::EnvFilter;

const MIN_TABLE_STEP_HOURS: f64 = 1.0 / 60.0;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Table { step, config } => run_table(step, config.as_deref()),
        Commands::Play {
            start,
            realtime,
            config,
        } => run_play(start, realtime, config.as_deref()),
        Commands::Drive { config, script } => run_drive(&script, config.as_deref()),
        Commands::Scene { ground, back_light } => run_scene(ground, back_light),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    }
}

fn run_table(step: f64, config: Option<&Path>) -> Result<()> {
    let rows = table_rows(step)?;
    let config = load_config(config)?;

    for row in 0..=rows {
        let position = ClockPosition::new(f64::from(row) * step);
        let sample = DaylightSample::compute(position, &config.brightness);
        println!(
            "{:>6.2}  {}  {:>8}  {}  {}",
            position.hours(),
            sample.display,
            sample.label,
            sample.color,
            swatch(sample.color)
        );
    }
    Ok(())
}

/// Number of intervals of `step` hours in a day. Steps finer than a minute
/// would only repeat display times.
fn table_rows(step: f64) -> Result<u32> {
    if !step.is_finite() || step < MIN_TABLE_STEP_HOURS {
        return Err(DaycycleError::msg(
            "--step must be at least one minute (1/60 hour)",
        ));
    }
    Ok((24.0 / step).floor() as u32)
}

fn run_play(start: f64, realtime: bool, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let mut controller = PlaybackController::with_config(&config);
    let events = controller.subscribe();
    let mut render = RenderGraph::default();

    tracing::info!(start, realtime, "starting playback");
    controller.seek(start);
    controller.play();

    loop {
        present(&controller, &events, &mut render);
        let Some(wait) = controller.until_next_tick() else {
            break;
        };
        if realtime {
            thread::sleep(wait);
        }
        controller.advance(wait);
    }

    tracing::info!(
        position = %controller.position(),
        frames = render.frames_drawn(),
        "playback finished"
    );
    Ok(())
}

fn run_drive(script: &[TransportCommand], config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let mut controller = PlaybackController::with_config(&config);
    let events = controller.subscribe();
    let mut render = RenderGraph::default();

    for command in script {
        tracing::debug!(?command, "applying transport command");
        match *command {
            TransportCommand::Play => controller.play(),
            TransportCommand::Pause => controller.pause(),
            TransportCommand::Next => controller.next(),
            TransportCommand::Previous => controller.previous(),
            TransportCommand::Seek(hours) => controller.seek(hours),
            TransportCommand::Wait(seconds) => {
                let elapsed = Duration::try_from_secs_f64(seconds)
                    .map_err(|err| DaycycleError::msg(format!("wait={seconds}: {err}")))?;
                controller.advance(elapsed);
            }
        }
        present(&controller, &events, &mut render);
        println!(
            "{:<12} -> {}  {}",
            command.to_string(),
            controller.position().display(),
            if controller.is_active() { "playing" } else { "idle" }
        );
    }
    Ok(())
}

fn run_scene(ground: bool, back_light: bool) -> Result<()> {
    let mut scene = SceneDescriptor::day_cycle_demo();
    if ground {
        scene = scene.with_ground();
    }
    if back_light {
        scene = scene.with_back_light();
    }
    println!("{}", serde_json::to_string_pretty(&scene)?);
    Ok(())
}

fn present(
    controller: &PlaybackController,
    events: &Receiver<PlaybackEvent>,
    render: &mut RenderGraph,
) {
    pump_events(events, render);
    if let Some(frame) = render.draw() {
        print_frame(controller, frame);
    }
}

fn print_frame(controller: &PlaybackController, frame: RenderedFrame) {
    let position = controller.position();
    let [r, g, b] = frame.background.to_normalized();
    println!(
        "frame {:>3}  {}  {:>8}  {}  ({r:.3}, {g:.3}, {b:.3})  {}",
        frame.index,
        position.display(),
        position.label(),
        frame.background,
        swatch(frame.background)
    );
}

fn swatch(color: Color) -> String {
    format!("\x1b[48;2;{};{};{}m      \x1b[0m", color.r, color.g, color.b)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Day/night lighting cycle viewer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the display time, label and background color across the day.
    Table {
        /// Hours between two rows.
        #[arg(short, long, default_value_t = 1.0)]
        step: f64,
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Play the day from a start position until it runs out.
    Play {
        /// Clock position to start from, in hours.
        #[arg(short, long, default_value_t = 0.0)]
        start: f64,
        /// Wait for the real tick interval between ticks.
        #[arg(short, long)]
        realtime: bool,
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a transport script: play, pause, next, previous, seek=H, wait=SECONDS.
    Drive {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(required = true)]
        script: Vec<TransportCommand>,
    },
    /// Print the scene description as JSON.
    Scene {
        /// Include the ground plane.
        #[arg(long)]
        ground: bool,
        /// Include the third light behind the mesh.
        #[arg(long)]
        back_light: bool,
    },
}

/// One scripted press of a transport control.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TransportCommand {
    Play,
    Pause,
    Next,
    Previous,
    Seek(f64),
    Wait(f64),
}

impl FromStr for TransportCommand {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let (name, argument) = match input.split_once('=') {
            Some((name, argument)) => (name, Some(argument)),
            None => (input, None),
        };
        let number = |argument: Option<&str>| -> std::result::Result<f64, String> {
            let argument = argument.ok_or_else(|| format!("`{name}` needs a value, e.g. {name}=2"))?;
            let value: f64 = argument
                .parse()
                .map_err(|_| format!("`{argument}` is not a number"))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(format!("`{argument}` is not a finite number"))
            }
        };

        match (name, argument) {
            ("play", None) => Ok(Self::Play),
            ("pause", None) => Ok(Self::Pause),
            ("next", None) => Ok(Self::Next),
            ("previous" | "prev", None) => Ok(Self::Previous),
            ("seek", argument) => number(argument).map(Self::Seek),
            ("wait", argument) => {
                let seconds = number(argument)?;
                if seconds < 0.0 {
                    return Err("wait needs a non-negative number of seconds".to_string());
                }
                Ok(Self::Wait(seconds))
            }
            _ => Err(format!("unknown transport command `{input}`")),
        }
    }
}

impl std::fmt::Display for TransportCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Play => f.write_str("play"),
            Self::Pause => f.write_str("pause"),
            Self::Next => f.write_str("next"),
            Self::Previous => f.write_str("previous"),
            Self::Seek(hours) => write!(f, "seek={hours}"),
            Self::Wait(seconds) => write!(f, "wait={seconds}"),
        }
    }
}
