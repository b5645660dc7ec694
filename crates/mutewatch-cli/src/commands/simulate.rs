//! Offline detection over a WAV file.
//!
//! The file is fed through the same monitor the `watch` command runs, in
//! fixed-size blocks. The clock is derived from the sample position, so the
//! output is deterministic and needs no audio devices.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use mutewatch_core::{BlockOutcome, CuePlayer, MuteMonitor, Trigger};
use mutewatch_io::CueSound;

use super::common::{check_settings, load_settings, resolve_settings_path};

#[derive(Args)]
pub struct SimulateArgs {
    /// Recording to analyze (WAV)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Frames per processing block
    #[arg(long, default_value = "480")]
    block_size: usize,

    /// Treat the source as unmuted (nothing should fire)
    #[arg(long)]
    unmuted: bool,

    /// Cue WAV whose length is added to the cooldown
    #[arg(long, value_name = "FILE")]
    cue: Option<PathBuf>,

    /// Settings file to use instead of the per-user default
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

/// Cue player that only knows the cue length.
struct SilentCue {
    length_ms: u64,
}

impl CuePlayer for SilentCue {
    fn restart_and_play(&mut self) {}

    fn cue_length_ms(&self) -> u64 {
        self.length_ms
    }
}

/// Feed `samples` to `monitor` block by block and collect every trigger.
fn detect(
    monitor: &mut MuteMonitor<SilentCue, ()>,
    config: &mutewatch_core::MonitorConfig,
    samples: &[f32],
    channels: usize,
    sample_rate: u32,
    block_size: usize,
    muted: bool,
) -> Vec<Trigger> {
    let block_len = block_size.max(1) * channels.max(1);
    let mut triggers = Vec::new();
    let mut frames_done: u64 = 0;

    for block in samples.chunks(block_len) {
        let now_ms = frames_done * 1000 / u64::from(sample_rate.max(1));
        if let BlockOutcome::Fired(trigger) =
            monitor.process_interleaved(config, muted, now_ms, block, channels)
        {
            triggers.push(trigger);
        }
        frames_done += (block.len() / channels.max(1)) as u64;
    }
    triggers
}

pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("--block-size must be at least 1");
    }

    let settings_path = resolve_settings_path(args.settings.as_deref());
    let settings = load_settings(&settings_path)?;
    check_settings(&settings)?;

    let recording = CueSound::load(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let channels = recording.channels() as usize;
    let sample_rate = recording.sample_rate();

    let cue_length_ms = match &args.cue {
        Some(path) => CueSound::load(path)
            .with_context(|| format!("failed to read cue {}", path.display()))?
            .length_ms(),
        None => 0,
    };

    let config = settings.monitor_config(sample_rate as f32, channels);
    let mut monitor = MuteMonitor::new(
        SilentCue {
            length_ms: cue_length_ms,
        },
        (),
    );

    println!("Input: {}", args.input.display());
    println!(
        "  {} Hz, {} channel(s), {:.2} s",
        sample_rate,
        channels,
        recording.length_ms() as f64 / 1000.0
    );
    println!(
        "  Thresholds: open {} dB, close {} dB",
        settings.open_threshold_db, settings.close_threshold_db
    );
    println!(
        "  Cooldown: {} ms + cue {} ms, block {} frames",
        settings.cooldown_ms, cue_length_ms, args.block_size
    );
    println!();

    let triggers = detect(
        &mut monitor,
        &config,
        recording.samples(),
        channels,
        sample_rate,
        args.block_size,
        !args.unmuted,
    );

    let mut actions = Vec::new();
    if config.dispatch.audio_cue {
        actions.push("audio");
    }
    if config.dispatch.visual_cue {
        actions.push("visual");
    }
    let actions = if actions.is_empty() {
        "none".to_string()
    } else {
        actions.join("+")
    };

    for trigger in &triggers {
        println!(
            "trigger at {:>8} ms  [{}]  indicator {} ms",
            trigger.fired_at_ms,
            actions,
            trigger.indicator_timeout_ms()
        );
    }
    println!();
    println!("{} trigger(s)", triggers.len());

    Ok(())
}
