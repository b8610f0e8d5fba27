use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use surface_playback::backend::mock::DEMO_PLAN;
use surface_playback::backend::{HttpBackend, MockBackend, PlaybackBackend};
use surface_playback::config::Settings;
use surface_playback::core::{DeliveryMode, StateSnapshot, SurfaceDescription};
use surface_playback::playback::{FrameSink, Player};
use surface_playback::view::{icon_rotation, itinerary_progress, AircraftTracker, TargetProgress, TrafficStatus, TrafficSummary};
use surface_playback::PlaybackError;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// States served by the built-in demo backend
const DEMO_STATE_COUNT: usize = 120;

#[derive(Parser)]
#[command(name = "surface-playback")]
#[command(version, about = "Headless playback of airport-surface traffic simulations")]
struct Cli {
    /// Backend base URL (overrides the settings file)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Serve a generated demo plan instead of contacting a backend
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the plans offered for a delivery mode.
    Plans {
        #[arg(short, long)]
        mode: Option<DeliveryMode>,
    },

    /// Load a plan and report its surface and first state.
    Inspect {
        #[arg(short, long)]
        plan: String,

        #[arg(short, long)]
        mode: Option<DeliveryMode>,
    },

    /// Auto-play a plan, logging every state. Ctrl-C stops.
    Play {
        #[arg(short, long)]
        plan: String,

        #[arg(short, long)]
        mode: Option<DeliveryMode>,

        /// Stop after this many ticks.
        #[arg(short, long)]
        ticks: Option<usize>,

        /// Jump forward this many states before playing.
        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Playback speed multiplier (0.1 to 10).
        #[arg(long, default_value_t = 1.0, value_parser = parse_speed)]
        speed: f64,

        /// Delay between ticks at normal speed, in milliseconds.
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn parse_speed(arg: &str) -> Result<f64, String> {
    let speed: f64 = arg.parse().map_err(|e| format!("{}", e))?;
    if !speed.is_finite() || speed <= 0.0 {
        return Err(format!("speed must be a positive number, got {}", arg));
    }
    Ok(speed)
}

/// Presentation that writes frames to the log
struct LogSink {
    tracker: AircraftTracker,
}

impl LogSink {
    fn new() -> Self {
        Self {
            tracker: AircraftTracker::new(),
        }
    }
}

impl FrameSink for LogSink {
    fn show_surface(&mut self, plan: &str, mode: DeliveryMode, surface: &SurfaceDescription) {
        self.tracker.clear();
        info!(
            "[{}] {} ({} mode): center {:.5},{:.5}, {} gates, {} spots, {} runways, {} taxiways, {} pushback ways",
            plan,
            surface.airport_name,
            mode,
            surface.airport_center.lat,
            surface.airport_center.lng,
            surface.gates.len(),
            surface.spots.len(),
            surface.runways.len(),
            surface.taxiways.len(),
            surface.pushback_ways.len()
        );
    }

    fn show_state(&mut self, state: &StateSnapshot, animate: bool) {
        let update = self.tracker.update(state);
        info!(
            "{} {}{}",
            state.time_label(),
            TrafficSummary::of(state),
            if animate { "" } else { " (jump)" }
        );
        if !update.added.is_empty() || !update.removed.is_empty() {
            info!("  arrived: {:?}, departed: {:?}", update.added, update.removed);
        }

        for aircraft in &state.aircrafts {
            let Some(tracked) = self.tracker.get(&aircraft.callsign) else {
                continue;
            };
            let target = itinerary_progress(aircraft)
                .and_then(|steps| steps.into_iter().find(|s| s.progress == TargetProgress::Current))
                .map_or("-".to_string(), |s| s.target.node_name.clone());

            debug!(
                "  {:<8} {:<11} {:.6},{:.6} heading {:5.1} icon {:5.1} next {}",
                aircraft.callsign,
                TrafficStatus::of(aircraft).label(),
                tracked.position.lat,
                tracked.position.lng,
                tracked.heading,
                icon_rotation(tracked.heading),
                target
            );
        }
    }

    fn show_error(&mut self, error: &PlaybackError) {
        error!("{}", error);
    }
}

fn backend(cli: &Cli, settings: &Settings) -> Result<Arc<dyn PlaybackBackend>> {
    if cli.demo {
        info!("Using demo backend with plan {}", DEMO_PLAN);
        return Ok(Arc::new(MockBackend::demo(DEMO_STATE_COUNT)));
    }

    let url = cli.backend_url.as_deref().unwrap_or(&settings.backend_url);
    let http = HttpBackend::new(url, settings.request_timeout()).context("Failed to create HTTP client")?;
    Ok(Arc::new(http))
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load();
    let backend = backend(&cli, &settings)?;
    let mut sink = LogSink::new();

    match cli.command {
        Commands::Plans { mode } => {
            let mode = mode.unwrap_or(settings.default_mode);
            let player = Player::new(backend, settings.playback_config());
            let plans = player.list_plans(mode).await?;
            for plan in plans {
                println!("{}", plan);
            }
        }
        Commands::Inspect { plan, mode } => {
            let mut player = Player::new(backend, settings.playback_config());
            let mut session = player.select_plan(mode.unwrap_or(settings.default_mode), &plan);
            session.start(&mut sink).await?;
            player.install(session);
        }
        Commands::Play {
            plan,
            mode,
            ticks,
            skip,
            speed,
            interval_ms,
        } => {
            let mut config = settings.playback_config();
            if let Some(ms) = interval_ms {
                config.auto_run_interval = std::time::Duration::from_millis(ms);
            }
            if skip > 0 {
                config.fast_forward_step = skip;
            }

            let mut player = Player::new(backend, config);
            let mut session = player.select_plan(mode.unwrap_or(settings.default_mode), &plan);
            session.set_speed(speed);
            session.start(&mut sink).await?;
            if skip > 0 {
                session.fast_forward(&mut sink).await?;
            }

            let handle = session.auto_play_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    handle.stop();
                }
            });

            let played = session.run_auto_play(&mut sink, ticks).await?;
            info!("Played {} states of plan {}", played, session.plan());
            player.install(session);
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .and_then(|rt| rt.block_on(run(cli)));

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
