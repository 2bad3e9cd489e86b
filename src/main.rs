use chrono::{DateTime, Local};
use color_eyre::{eyre::eyre, Result};
use emu_input::config::InputConfig;
use emu_input::controller::event_queue::{RawEvent, SystemEvent};
use emu_input::controller::platform::GilrsQueue;
use emu_input::controller::{InputHost, PlatformData};
use emu_input::mapping::{ActionMasks, BindType};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const STATS_INTERVAL_SECS: i64 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = InputConfig::load_or_default(None)
        .map_err(|e| eyre!("Failed to load input config: {}", e))?;
    setup_logging_env(&config.log_level);

    let platform: PlatformData = config.to_platform_data();
    let queue = GilrsQueue::create().map_err(|e| eyre!("Failed to open gamepads: {}", e))?;
    let joysticks = queue.joysticks();

    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<RawEvent>();
    let mut host = InputHost::create(
        Box::new(queue),
        Box::new(raw_tx),
        platform,
        config.name_prefix.clone(),
        config.allow_unbound_modifiers,
    );
    // gilrs delivers no key events. The keyboard device still drains system
    // events (hot-plug, quit) and hands them to raw_rx below.
    host.register_keyboard();
    for joystick in &joysticks {
        host.register_joystick(joystick);
    }
    let mut host = host.finish_probe();
    for (id, dev) in host.devices() {
        info!("  device {}: {}", id.0, dev.name);
    }

    let mut interval = time::interval(Duration::from_millis(config.poll_interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started: DateTime<Local> = Local::now();
    let mut last_stats = started;
    let mut polls: u64 = 0;
    let mut changes: u64 = 0;
    let mut last: ActionMasks = Default::default();

    info!("Polling input every {}ms, Ctrl-C to quit", config.poll_interval_ms);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let masks = host.update_all();
                polls += 1;
                if masks != last {
                    changes += 1;
                    for bind_type in BindType::ALL {
                        let idx = bind_type.index();
                        if masks[idx] != last[idx] {
                            info!("{}: {:#010x}", bind_type, masks[idx]);
                        }
                    }
                    last = masks;
                }

                let now = Local::now();
                if (now - last_stats).num_seconds() >= STATS_INTERVAL_SECS {
                    info!(
                        "Stats at {}: {} polls, {} changes, up {}s",
                        now.format("%H:%M:%S"),
                        polls,
                        changes,
                        (now - started).num_seconds()
                    );
                    last_stats = now;
                }
            }
            Some(event) = raw_rx.recv() => {
                match event {
                    RawEvent::System(SystemEvent::Quit) => break,
                    RawEvent::System(SystemEvent::JoystickAdded(id)) => {
                        warn!("Joystick {} connected after probe, restart to use it", id);
                    }
                    other => debug!("Unhandled raw event: {:?}", other),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    host.teardown();
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    Ok(())
}

fn setup_logging_env(level: &str) {
    let level = Level::from_str(level).unwrap_or(Level::INFO);
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
