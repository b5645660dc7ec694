//! Live monitoring command.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime};

use anyhow::Context;
use clap::Args;
use mutewatch_config::{Settings, SharedConfig, lint, validate};
use mutewatch_core::MuteState;
use mutewatch_indicator::{IndicatorMailbox, LogSurface, spawn_indicator_thread};
use mutewatch_io::{
    CaptureDevice, CuePlayback, CueSlot, CueSound, MonitorEngine, MuteFlag, SystemClock,
};

use super::common::{check_settings, load_settings, resolve_settings_path};

/// How often the settings file is checked for changes.
const SETTINGS_POLL: Duration = Duration::from_secs(1);

#[derive(Args)]
pub struct WatchArgs {
    /// Input device to monitor (index or partial name)
    #[arg(long)]
    input: Option<String>,

    /// Output device for the audible cue (overrides the settings file)
    #[arg(long)]
    output: Option<String>,

    /// Cue WAV file (overrides the settings file)
    #[arg(long, value_name = "FILE")]
    cue: Option<PathBuf>,

    /// Settings file to use instead of the per-user default
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Start with the source unmuted
    #[arg(long)]
    start_unmuted: bool,
}

pub fn run(args: WatchArgs) -> anyhow::Result<()> {
    let settings_path = resolve_settings_path(args.settings.as_deref());
    let settings = load_settings(&settings_path)?;
    check_settings(&settings)?;

    let capture = CaptureDevice::open(args.input.as_deref()).context("failed to open input")?;
    let sample_rate = capture.sample_rate();
    let channels = capture.channels() as usize;

    let shared = Arc::new(SharedConfig::new(
        settings.monitor_config(sample_rate as f32, channels),
    ));

    let mut cue = CueReloader::new(CueSource::resolve(
        args.cue.as_deref(),
        args.output.as_deref(),
        &settings,
    ));

    let running = Arc::new(AtomicBool::new(true));
    let mailbox = IndicatorMailbox::new();
    let indicator = spawn_indicator_thread(mailbox.clone(), LogSurface::new(), Arc::clone(&running))
        .context("failed to start indicator thread")?;

    let mute = MuteFlag::new(!args.start_unmuted);
    let mut engine = MonitorEngine::new(
        Arc::clone(&shared),
        channels,
        cue.slot(),
        mailbox,
        mute.clone(),
        SystemClock::new(),
    );

    let stream = capture.start(move |block| {
        engine.process(block);
    })?;

    println!("Watching {} ({} Hz, {} ch)", stream.name(), sample_rate, channels);
    match cue.device_name() {
        Some(device) => println!("  Cue: {} on {}", cue.source.path.display(), device),
        None => println!("  Cue: unavailable"),
    }
    println!("  Settings: {}", settings_path.display());
    println!("  Source is {}", mute_label(mute.is_muted()));
    println!("\nPress Enter to toggle mute, Ctrl+C to stop...\n");

    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    spawn_mute_toggle(mute)?;

    let mut watcher = SettingsWatcher::new(&settings_path);
    let mut last_poll = Instant::now();
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
        if last_poll.elapsed() < SETTINGS_POLL {
            continue;
        }
        last_poll = Instant::now();
        if let Some(updated) = watcher.poll() {
            cue.update(CueSource::resolve(
                args.cue.as_deref(),
                args.output.as_deref(),
                &updated,
            ));
            shared.publish(updated.monitor_config(sample_rate as f32, channels));
            tracing::info!(generation = shared.generation(), "settings reloaded");
        }
    }

    drop(stream);
    if indicator.join().is_err() {
        tracing::error!("indicator thread panicked");
    }
    println!("Done!");
    Ok(())
}

fn mute_label(muted: bool) -> &'static str {
    if muted { "MUTED" } else { "live" }
}

/// Cue file and output device the audible cue plays from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CueSource {
    path: PathBuf,
    device: Option<String>,
}

impl CueSource {
    /// Command-line overrides win over the settings file.
    fn resolve(cue: Option<&Path>, output: Option<&str>, settings: &Settings) -> Self {
        Self {
            path: cue.map_or_else(|| settings.cue_path(), Path::to_path_buf),
            device: output
                .map(str::to_string)
                .or_else(|| settings.output_device.clone()),
        }
    }
}

/// Owns the cue output stream and swaps it when the cue source changes.
///
/// The engine only sees the [`CueSlot`], so a reopen never blocks the audio
/// callback. The old stream is dropped here, on the control thread.
struct CueReloader {
    source: CueSource,
    playback: Option<CuePlayback>,
    slot: CueSlot,
}

impl CueReloader {
    fn new(source: CueSource) -> Self {
        let playback = open_cue(&source.path, source.device.as_deref());
        let slot = CueSlot::new();
        slot.install(playback.as_ref().map(CuePlayback::handle).as_ref());
        Self {
            source,
            playback,
            slot,
        }
    }

    fn slot(&self) -> CueSlot {
        self.slot.clone()
    }

    fn device_name(&self) -> Option<&str> {
        self.playback.as_ref().map(CuePlayback::device_name)
    }

    /// Reopen when the source changed or the last open failed.
    fn needs_reopen(&self, next: &CueSource) -> bool {
        self.playback.is_none() || *next != self.source
    }

    fn update(&mut self, next: CueSource) {
        if !self.needs_reopen(&next) {
            return;
        }
        let playback = open_cue(&next.path, next.device.as_deref());
        self.slot
            .install(playback.as_ref().map(CuePlayback::handle).as_ref());
        if let Some(playback) = &playback {
            tracing::info!(
                path = %next.path.display(),
                device = playback.device_name(),
                "cue reloaded"
            );
        }
        self.playback = playback;
        self.source = next;
    }
}

fn open_cue(path: &Path, device: Option<&str>) -> Option<CuePlayback> {
    let cue = match CueSound::load(path) {
        Ok(cue) => cue,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cue not loaded, audible cue disabled");
            return None;
        }
    };
    match CuePlayback::open(&cue, device) {
        Ok(playback) => Some(playback),
        Err(e) => {
            tracing::warn!(error = %e, "cue output unavailable, audible cue disabled");
            None
        }
    }
}

/// Toggle `mute` on every line read from stdin.
fn spawn_mute_toggle(mute: MuteFlag) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("mutewatch-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                let muted = mute.toggle();
                println!("Source is {}", mute_label(muted));
            }
        })?;
    Ok(())
}

/// Reloads the settings file when its modification time changes.
///
/// Files that fail to parse or validate are skipped with a warning and the
/// running configuration is kept.
struct SettingsWatcher {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl SettingsWatcher {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            modified: modified_time(path),
        }
    }

    fn poll(&mut self) -> Option<Settings> {
        let modified = modified_time(&self.path);
        if modified == self.modified {
            return None;
        }
        self.modified = modified;

        let settings = match load_settings(&self.path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{e:#}");
                return None;
            }
        };
        if let Err(e) = validate(&settings) {
            tracing::warn!(error = %e, "ignoring invalid settings");
            return None;
        }
        for warning in lint(&settings) {
            tracing::warn!("{warning}");
        }
        Some(settings)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch_later(path: &Path, content: &str, watcher: &SettingsWatcher) {
        fs::write(path, content).unwrap();
        // Make sure the mtime differs even on coarse filesystems.
        let bumped = watcher
            .modified
            .map_or_else(SystemTime::now, |t| t + Duration::from_secs(2));
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(bumped)
            .unwrap();
    }

    #[test]
    fn test_unchanged_file_is_not_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        Settings::default().save(&path).unwrap();

        let mut watcher = SettingsWatcher::new(&path);
        assert!(watcher.poll().is_none());
        assert!(watcher.poll().is_none());
    }

    #[test]
    fn test_changed_file_is_reloaded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        Settings::default().save(&path).unwrap();

        let mut watcher = SettingsWatcher::new(&path);
        touch_later(&path, "cooldown_ms = 3000\n", &watcher);

        let reloaded = watcher.poll().unwrap();
        assert_eq!(reloaded.cooldown_ms, 3000);
        assert!(watcher.poll().is_none());
    }

    #[test]
    fn test_invalid_file_keeps_running_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        Settings::default().save(&path).unwrap();

        let mut watcher = SettingsWatcher::new(&path);
        touch_later(&path, "indicator_size = 9000\n", &watcher);
        assert!(watcher.poll().is_none());

        touch_later(&path, "this is not toml =", &watcher);
        assert!(watcher.poll().is_none());
    }

    #[test]
    fn test_cue_source_prefers_command_line() {
        let settings = Settings {
            cue_file: Some(PathBuf::from("/tmp/settings-cue.wav")),
            output_device: Some("Speakers".to_string()),
            ..Settings::default()
        };

        let from_settings = CueSource::resolve(None, None, &settings);
        assert_eq!(from_settings.path, PathBuf::from("/tmp/settings-cue.wav"));
        assert_eq!(from_settings.device.as_deref(), Some("Speakers"));

        let overridden = CueSource::resolve(
            Some(Path::new("/tmp/cli-cue.wav")),
            Some("Headphones"),
            &settings,
        );
        assert_eq!(overridden.path, PathBuf::from("/tmp/cli-cue.wav"));
        assert_eq!(overridden.device.as_deref(), Some("Headphones"));
    }

    #[test]
    fn test_missing_cue_is_retried_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let source = CueSource {
            path: dir.path().join("missing.wav"),
            device: None,
        };

        let mut cue = CueReloader::new(source.clone());
        assert!(!cue.slot().is_loaded());
        assert!(cue.needs_reopen(&source), "failed open is retried");

        let moved = CueSource {
            path: dir.path().join("other.wav"),
            device: Some("Headphones".to_string()),
        };
        cue.update(moved.clone());
        assert_eq!(cue.source, moved);
        assert!(cue.device_name().is_none());
        assert!(!cue.slot().is_loaded());
    }

    #[test]
    fn test_file_created_after_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut watcher = SettingsWatcher::new(&path);
        assert!(watcher.poll().is_none());

        fs::write(&path, "hold_ms = 50\n").unwrap();
        assert_eq!(watcher.poll().map(|s| s.hold_ms), Some(50));
    }
}
