//! Integration tests for mutewatch-io.
//!
//! Exercises WAV cue decoding and the engine without touching audio devices.

use std::cell::Cell;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};
use mutewatch_config::{Settings, SharedConfig};
use mutewatch_core::{BlockOutcome, Clock, CuePlayer};
use mutewatch_io::{CueHandle, CueSlot, CueSound, MonitorEngine, MuteFlag};
use tempfile::TempDir;

struct ManualClock<'a>(&'a Cell<u64>);

impl Clock for ManualClock<'_> {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

fn write_i16_wav(path: &std::path::Path, channels: u16, sample_rate: u32, frames: usize) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames * channels as usize {
        let v = if i % 2 == 0 { i16::MAX } else { i16::MIN };
        writer.write_sample(v).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_load_int_cue() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cue.wav");
    write_i16_wav(&path, 2, 22_050, 22_050 * 3 / 2);

    let cue = CueSound::load(&path).unwrap();
    assert_eq!(cue.channels(), 2);
    assert_eq!(cue.sample_rate(), 22_050);
    assert_eq!(cue.frames(), 33_075);
    assert_eq!(cue.length_ms(), 1500);

    // Normalized by 2^15.
    assert!((cue.samples()[0] - 32767.0 / 32768.0).abs() < 1e-6);
    assert_eq!(cue.samples()[1], -1.0);
}

#[test]
fn test_load_float_cue() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cue.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 48000,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for i in 0..4800 {
        writer.write_sample((i as f32 / 4800.0) - 0.5).unwrap();
    }
    writer.finalize().unwrap();

    let cue = CueSound::load(&path).unwrap();
    assert_eq!(cue.length_ms(), 100);
    assert_eq!(cue.samples()[0], -0.5);
}

#[test]
fn test_missing_cue_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = CueSound::load(temp_dir.path().join("missing.wav")).unwrap_err();
    assert!(matches!(err, mutewatch_io::Error::Wav(_)), "got: {err}");
}

/// Cue length widens the debounce window; the engine restarts the cue on fire.
#[test]
fn test_engine_with_cue_handle() {
    let settings = Settings {
        audio_cue: true,
        cooldown_ms: 1000,
        ..Settings::default()
    };
    let shared = Arc::new(SharedConfig::new(settings.monitor_config(48000.0, 1)));
    let cue = CueSound::from_samples(vec![0.25; 96_000], 1, 48000);
    let handle = CueHandle::new(&cue);
    assert_eq!(handle.cue_length_ms(), 2000);

    let now = Cell::new(0);
    let mute = MuteFlag::new(true);
    let mut engine = MonitorEngine::new(
        Arc::clone(&shared),
        1,
        handle.clone(),
        (),
        mute.clone(),
        ManualClock(&now),
    );

    let speech = [0.2f32; 480];
    assert!(matches!(engine.process(&speech), BlockOutcome::Fired(_)));
    assert!(handle.is_playing());

    let mut out = [0.0f32; 16];
    handle.render(&mut out);
    assert_eq!(out, [0.25; 16]);

    now.set(2500);
    assert_eq!(engine.process(&speech), BlockOutcome::Listening { open: true });
    now.set(3001);
    assert!(matches!(engine.process(&speech), BlockOutcome::Fired(_)));

    // Unmuting bypasses detection entirely.
    mute.set(false);
    now.set(10_000);
    assert_eq!(engine.process(&speech), BlockOutcome::Bypassed);
    assert_eq!(engine.fired_count(), 2);
}

/// A settings change published mid-stream is adopted on the next block.
#[test]
fn test_engine_adopts_published_settings() {
    let shared = Arc::new(SharedConfig::new(Settings::default().monitor_config(48000.0, 1)));
    let now = Cell::new(0);
    let mut engine = MonitorEngine::new(
        Arc::clone(&shared),
        1,
        (),
        (),
        true,
        ManualClock(&now),
    );

    let speech = [0.1f32; 480];
    assert!(matches!(engine.process(&speech), BlockOutcome::Fired(_)));

    let quieter_room = Settings {
        open_threshold_db: -10.0,
        close_threshold_db: -16.0,
        ..Settings::default()
    };
    shared.publish(quieter_room.monitor_config(48000.0, 1));

    now.set(5000);
    assert_eq!(engine.process(&speech), BlockOutcome::Listening { open: false });
    assert_eq!(engine.config().cooldown_ms, 1500);
}

/// Replacing the cue while running changes the window from the next check.
#[test]
fn test_engine_follows_cue_slot_swap() {
    let settings = Settings {
        audio_cue: true,
        ..Settings::default()
    };
    let shared = Arc::new(SharedConfig::new(settings.monitor_config(48000.0, 1)));
    let slot = CueSlot::new();
    let now = Cell::new(0);
    let mut engine = MonitorEngine::new(
        Arc::clone(&shared),
        1,
        slot.clone(),
        (),
        true,
        ManualClock(&now),
    );

    let speech = [0.2f32; 480];
    // No cue installed yet: window is the bare cooldown.
    assert!(matches!(engine.process(&speech), BlockOutcome::Fired(_)));

    // A one-second cue arrives after a settings reload.
    let longer = CueHandle::new(&CueSound::from_samples(vec![0.25; 48_000], 1, 48000));
    slot.install(Some(&longer));

    now.set(1600);
    assert_eq!(engine.process(&speech), BlockOutcome::Listening { open: true });
    now.set(2500);
    assert_eq!(engine.process(&speech), BlockOutcome::Listening { open: true });
    now.set(2510);
    assert!(matches!(engine.process(&speech), BlockOutcome::Fired(_)));
    assert!(longer.is_playing());
    assert_eq!(engine.fired_count(), 2);
}
