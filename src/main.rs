mod clock;
mod config;
mod display;
mod locale;
mod location;
mod sky;
mod state;
mod util;
mod weather;

use crate::{
    config::Config,
    display::{Command, Display},
    location::IpApi,
    state::Controller,
    weather::OpenMeteo,
};
use anyhow::Context;
use log::{info, LevelFilter};
use std::{
    fs::OpenOptions,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_logging(&config)?;
    info!("Starting with {config:?}");

    // The terminal swallows Ctrl-C as a key press, but we still want to
    // shut down cleanly on SIGTERM/SIGHUP
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::Relaxed);
    })?;

    let agent = config.agent();
    let weather_api =
        Arc::new(OpenMeteo::new(agent.clone(), &config.weather_url));
    let geo_ip = Arc::new(IpApi::new(agent, &config.geoip_url));
    let mut controller = Controller::new(&config, weather_api, geo_ip);
    controller.select(config.initial_location());

    let mut display = Display::new()?;
    while running.load(Ordering::Relaxed) {
        controller.tick();
        display.tick(controller.state())?;
        match display.poll_input(Display::INTERVAL)? {
            Some(Command::Quit) => break,
            Some(Command::Select(choice)) => controller.select(choice),
            Some(Command::Cycle(offset)) => {
                let choice = controller.state().selection.cycle(offset);
                controller.select(choice);
            }
            None => {}
        }
    }

    info!("Exiting");
    Ok(())
}

/// The terminal is taken, so logs go to a file
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| {
            format!("Error opening log file {}", config.log_path.display())
        })?;
    env_logger::builder()
        .filter_module("skyclock", LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
