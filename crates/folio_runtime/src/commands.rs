//! Subcommand implementations

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use folio_core::orbit;
use folio_core::projects::Catalog;
use folio_core::time::FRAME_DURATION;
use folio_env::{detect, EnvironmentProbe, HostProbe, ProbeReadings, StaticProbe};
use folio_net::EmailJsTransport;
use folio_render::window::{BackgroundOptions, WindowConfig};
use folio_render::{render, FrameOutcome, HeadlessFactory, RenderMode};
use folio_services::{ContactMessage, ContactRelay, Notices, Settings};

use crate::ProbeArgs;

pub fn run(settings: &Settings) -> Result<()> {
    let window = &settings.window;
    let background = &settings.background;
    let config = WindowConfig {
        title: window.title.clone(),
        width: window.width,
        height: window.height,
        animate_title: window.animate_title,
    };
    let options = BackgroundOptions {
        seed: background.particle_seed,
        debounce: background.resize_debounce(),
        reduced_motion: background.reduced_motion,
    };
    tracing::info!(width = config.width, height = config.height, "opening background window");
    folio_render::window::run(config, options).context("event loop failed")
}

/// Host readings at the configured window size, with any overrides applied.
fn readings(settings: &Settings, args: &ProbeArgs) -> ProbeReadings {
    let mut host = HostProbe::new();
    if let Some(reduced) = settings.background.reduced_motion {
        host = host.with_reduced_motion(reduced);
    }
    host.set_viewport(settings.window.width, settings.window.height, 1.0);
    let mut readings = host.readings().unwrap_or_default();

    if let Some(width) = args.width {
        readings.viewport_width = width;
    }
    if let Some(height) = args.height {
        readings.viewport_height = height;
    }
    if let Some(ua) = &args.user_agent {
        readings.user_agent = ua.clone();
    }
    if args.reduced_motion {
        readings.prefers_reduced_motion = true;
    }
    if args.memory.is_some() {
        readings.device_memory_gb = args.memory;
    }
    if args.cores.is_some() {
        readings.hardware_concurrency = args.cores;
    }
    if args.pixel_ratio.is_some() {
        readings.pixel_ratio = args.pixel_ratio;
    }
    readings
}

pub fn profile(settings: &Settings, args: &ProbeArgs) -> Result<()> {
    let readings = readings(settings, args);
    let profile = detect(&StaticProbe::new(readings.clone()));
    let report = serde_json::json!({
        "readings": readings,
        "profile": profile,
        "fallback": profile.needs_fallback(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn projects(search: &str, tags: &[String], featured_only: bool) -> Result<()> {
    let catalog = Catalog::bundled();
    let matches: Vec<_> = catalog
        .filter(search, tags)
        .into_iter()
        .filter(|p| !featured_only || p.featured)
        .collect();

    if matches.is_empty() {
        println!("No projects found matching your criteria.");
        return Ok(());
    }
    for project in &matches {
        let star = if project.featured { "*" } else { " " };
        println!("{star} {:<28} {} [{}]", project.id, project.title, project.tags.join(", "));
        if let Some(url) = &project.live_url {
            println!("    live:   {url}");
        }
        if let Some(url) = &project.source_url {
            println!("    source: {url}");
        }
    }
    println!("{} of {} projects", matches.len(), catalog.len());
    Ok(())
}

pub fn orbit(time: f32, width: u32) -> Result<()> {
    println!("radius {:.0}px at {time:.2}s", orbit::radius(width));
    for (entry, offset) in orbit::TECH_STACK.iter().zip(orbit::positions(time, width)) {
        println!(
            "{:<12} {} ({:>7.1}, {:>7.1})",
            entry.name,
            entry.rgb().to_hex_string(),
            offset.x,
            offset.y
        );
    }
    Ok(())
}

pub fn contact(settings: &Settings, name: String, email: String, message: String) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let transport = EmailJsTransport::from_settings(&settings.contact);
    let relay = ContactRelay::new(settings.contact.clone(), transport);
    let message = ContactMessage::new(name, email, message);

    let result = runtime.block_on(relay.send_message(&message));

    let mut notices = Notices::new();
    notices.contact_outcome(&result, Instant::now());
    for notice in notices.active() {
        println!("[{:?}] {}", notice.kind, notice.message);
    }
    result.map(|delivery| {
        tracing::debug!(auto_reply = ?delivery.auto_reply, "contact delivered");
    })?;
    Ok(())
}

pub fn simulate(settings: &Settings, args: &ProbeArgs, frames: u32, out: Option<&Path>) -> Result<()> {
    let readings = readings(settings, args);
    let profile = detect(&StaticProbe::new(readings.clone()));
    let ratio = profile.pixel_ratio;
    let physical = |px: u32| (px as f32 * ratio).round().max(1.0) as u32;
    let mut factory = HeadlessFactory::new(physical(readings.viewport_width), physical(readings.viewport_height));

    let mut handle = render(&profile, &mut factory, settings.background.particle_seed);
    if handle.mode() == RenderMode::Fallback {
        let html = handle
            .fallback_background()
            .map(|bg| bg.to_html())
            .unwrap_or_default();
        match out {
            Some(path) => {
                fs::write(path, &html).with_context(|| format!("failed to write {}", path.display()))?;
                println!("fallback background written to {}", path.display());
            }
            None => print!("{html}"),
        }
        handle.teardown();
        return Ok(());
    }

    let started = Instant::now();
    let mut moved = 0u32;
    for _ in 0..frames {
        if let FrameOutcome::Drawn { moved: true } = handle.on_frame(FRAME_DURATION) {
            moved += 1;
        }
    }
    let stats = factory.stats();
    let frame_stats = handle.stats();
    let (min, max) = frame_stats.min_max();
    tracing::info!(
        frames,
        moved,
        drawn = stats.frames.get(),
        vertices = stats.last_vertex_count.get(),
        avg_ms = frame_stats.average().as_secs_f64() * 1000.0,
        min_ms = min.as_secs_f64() * 1000.0,
        max_ms = max.as_secs_f64() * 1000.0,
        fps = frame_stats.fps(),
        wall_ms = started.elapsed().as_secs_f64() * 1000.0,
        "simulation finished"
    );
    println!(
        "{} frames drawn ({} animated), {} vertices in the last frame, {:.1} simulated fps",
        stats.frames.get(),
        moved,
        stats.last_vertex_count.get(),
        frame_stats.fps()
    );
    handle.teardown();
    Ok(())
}
