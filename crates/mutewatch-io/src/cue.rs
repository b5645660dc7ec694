//! Audible cue: WAV decoding and lock-free playback.
//!
//! The output stream is opened once and runs for the life of the
//! [`CuePlayback`], writing silence while idle. The cue is converted to the
//! device's channel count and sample rate when the stream is opened.
//! Playback is controlled through a [`CueHandle`] that only touches an atomic
//! cursor, so it can be used as the [`CuePlayer`] on the capture thread
//! without blocking. A [`CueSlot`] lets the host replace the cue while the
//! capture thread keeps running.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;
use cpal::traits::{DeviceTrait, StreamTrait};
use hound::{SampleFormat, WavReader};
use mutewatch_core::CuePlayer;

use crate::devices::{device_name, output_device};
use crate::{Error, Result};

/// Cursor value meaning "not playing".
const IDLE: usize = usize::MAX;

/// A decoded cue sound.
#[derive(Debug, Clone, PartialEq)]
pub struct CueSound {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl CueSound {
    /// Decode a WAV file into interleaved f32 samples.
    ///
    /// Integer PCM is normalized by `2^(bits - 1)`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            SampleFormat::Int => {
                let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(Self::from_samples(samples, spec.channels, spec.sample_rate))
    }

    /// Wrap already decoded interleaved samples.
    ///
    /// A trailing partial frame is dropped.
    pub fn from_samples(mut samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % usize::from(channels);
        samples.truncate(whole);
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Duration in whole milliseconds (`frames * 1000 / sample_rate`).
    ///
    /// A zero sample rate reads as zero length.
    pub fn length_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / u64::from(self.sample_rate)
    }

    /// The same sound with `channels` channels at `sample_rate`.
    ///
    /// Mono is copied to every output channel; otherwise channels map one to
    /// one, extra input channels are dropped and extra output channels are
    /// silent. Rates are converted by linear interpolation.
    pub fn converted(&self, channels: u16, sample_rate: u32) -> Self {
        let samples = convert_interleaved(
            &self.samples,
            self.channels,
            self.sample_rate,
            channels,
            sample_rate,
        );
        Self::from_samples(samples, channels, sample_rate)
    }
}

/// Remap channels and resample interleaved audio.
///
/// Output length is `frames * dst_rate / src_rate` frames. A zero rate or an
/// empty input yields nothing.
pub(crate) fn convert_interleaved(
    samples: &[f32],
    src_channels: u16,
    src_rate: u32,
    dst_channels: u16,
    dst_rate: u32,
) -> Vec<f32> {
    let src_ch = usize::from(src_channels.max(1));
    let dst_ch = usize::from(dst_channels.max(1));
    let src_frames = samples.len() / src_ch;
    if src_frames == 0 || src_rate == 0 || dst_rate == 0 {
        return Vec::new();
    }
    if src_ch == dst_ch && src_rate == dst_rate {
        return samples[..src_frames * src_ch].to_vec();
    }

    let dst_frames = (src_frames as u64 * u64::from(dst_rate) / u64::from(src_rate)) as usize;
    let step = f64::from(src_rate) / f64::from(dst_rate);
    let mut out = Vec::with_capacity(dst_frames * dst_ch);

    for frame in 0..dst_frames {
        let pos = frame as f64 * step;
        let i0 = (pos as usize).min(src_frames - 1);
        let i1 = (i0 + 1).min(src_frames - 1);
        let frac = (pos - i0 as f64) as f32;

        for ch in 0..dst_ch {
            let src = if src_ch == 1 {
                0
            } else if ch < src_ch {
                ch
            } else {
                out.push(0.0);
                continue;
            };
            let a = samples[i0 * src_ch + src];
            let b = samples[i1 * src_ch + src];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

#[derive(Debug)]
struct CueState {
    samples: Vec<f32>,
    cursor: AtomicUsize,
    length_ms: u64,
}

/// Cloneable playback control for a cue.
///
/// # Example
///
/// ```rust
/// use mutewatch_core::CuePlayer;
/// use mutewatch_io::{CueHandle, CueSound};
///
/// let cue = CueSound::from_samples(vec![0.5; 4800], 1, 48000);
/// let mut handle = CueHandle::new(&cue);
/// assert_eq!(handle.cue_length_ms(), 100);
///
/// handle.restart_and_play();
/// let mut out = [0.0f32; 64];
/// handle.render(&mut out);
/// assert!(out.iter().all(|&s| s == 0.5));
/// ```
#[derive(Debug, Clone)]
pub struct CueHandle {
    state: Arc<CueState>,
}

impl CueHandle {
    /// Create an idle handle for `cue`.
    pub fn new(cue: &CueSound) -> Self {
        Self::with_samples(cue.samples.clone(), cue.length_ms())
    }

    /// Create an idle handle that renders `cue` converted for an output
    /// stream. The reported length stays that of the source file.
    pub fn for_output(cue: &CueSound, channels: u16, sample_rate: u32) -> Self {
        let converted = cue.converted(channels, sample_rate);
        Self::with_samples(converted.samples, cue.length_ms())
    }

    fn with_samples(samples: Vec<f32>, length_ms: u64) -> Self {
        Self {
            state: Arc::new(CueState {
                samples,
                cursor: AtomicUsize::new(IDLE),
                length_ms,
            }),
        }
    }

    /// Whether the cue is currently sounding.
    pub fn is_playing(&self) -> bool {
        self.state.cursor.load(Ordering::Acquire) != IDLE
    }

    /// Stop playback.
    pub fn stop(&self) {
        self.state.cursor.store(IDLE, Ordering::Release);
    }

    /// Fill an interleaved output buffer with the next cue samples.
    ///
    /// Writes silence when idle and after the last sample. A restart that
    /// lands while this runs takes effect on the next call.
    pub fn render(&self, out: &mut [f32]) {
        let samples = &self.state.samples;
        let start = self.state.cursor.load(Ordering::Acquire);
        if start == IDLE || start >= samples.len() {
            out.fill(0.0);
            if start != IDLE {
                let _ = self.state.cursor.compare_exchange(
                    start,
                    IDLE,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
            }
            return;
        }

        let n = out.len().min(samples.len() - start);
        out[..n].copy_from_slice(&samples[start..start + n]);
        out[n..].fill(0.0);

        let next = if start + n >= samples.len() { IDLE } else { start + n };
        let _ = self
            .state
            .cursor
            .compare_exchange(start, next, Ordering::AcqRel, Ordering::Acquire);
    }
}

impl CuePlayer for CueHandle {
    fn restart_and_play(&mut self) {
        self.state.cursor.store(0, Ordering::Release);
    }

    fn cue_length_ms(&self) -> u64 {
        self.state.length_ms
    }
}

/// Replaceable cue, shared between the host and the capture thread.
///
/// The host installs a new [`CueHandle`] whenever the cue file or output
/// device changes; the capture thread plays whatever is installed. An empty
/// slot plays nothing and reports a zero cue length. The previously installed
/// cue is kept alive until the next install, so the capture thread never
/// frees it.
///
/// # Example
///
/// ```rust
/// use mutewatch_core::CuePlayer;
/// use mutewatch_io::{CueHandle, CueSlot, CueSound};
///
/// let slot = CueSlot::new();
/// assert_eq!(slot.cue_length_ms(), 0);
///
/// let handle = CueHandle::new(&CueSound::from_samples(vec![0.5; 4800], 1, 48000));
/// slot.install(Some(&handle));
/// assert_eq!(slot.cue_length_ms(), 100);
///
/// let mut player = slot.clone();
/// player.restart_and_play();
/// assert!(handle.is_playing());
/// ```
#[derive(Debug, Clone)]
pub struct CueSlot {
    inner: Arc<SlotInner>,
}

#[derive(Debug)]
struct SlotInner {
    current: ArcSwapOption<CueState>,
    retired: ArcSwapOption<CueState>,
}

impl CueSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SlotInner {
                current: ArcSwapOption::empty(),
                retired: ArcSwapOption::empty(),
            }),
        }
    }

    /// Replace the installed cue. `None` empties the slot.
    pub fn install(&self, handle: Option<&CueHandle>) {
        let previous = self
            .inner
            .current
            .swap(handle.map(|h| Arc::clone(&h.state)));
        self.inner.retired.store(previous);
    }

    /// Whether a cue is installed.
    pub fn is_loaded(&self) -> bool {
        self.inner.current.load().is_some()
    }
}

impl Default for CueSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl CuePlayer for CueSlot {
    fn restart_and_play(&mut self) {
        let current = self.inner.current.load();
        if let Some(state) = &*current {
            state.cursor.store(0, Ordering::Release);
        }
    }

    fn cue_length_ms(&self) -> u64 {
        let current = self.inner.current.load();
        (*current).as_ref().map_or(0, |state| state.length_ms)
    }
}

/// Output stream dedicated to the cue.
pub struct CuePlayback {
    handle: CueHandle,
    device_name: String,
    _stream: cpal::Stream,
}

impl CuePlayback {
    /// Open an output stream for `cue` on the named or default output device.
    ///
    /// The stream uses the device's default output format; the cue is
    /// converted to it up front. The stream starts immediately, writing
    /// silence until the first restart.
    pub fn open(cue: &CueSound, device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = output_device(&host, device)?;
        let device_name = device_name(&device).unwrap_or_else(|_| "unknown".to_string());

        let stream_config: cpal::StreamConfig = device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?
            .into();

        let handle = CueHandle::for_output(cue, stream_config.channels, stream_config.sample_rate);
        let render_handle = handle.clone();

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    render_handle.render(data);
                },
                |err| tracing::error!(error = %err, "cue output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %device_name,
            channels = stream_config.channels,
            sample_rate = stream_config.sample_rate,
            cue_channels = cue.channels(),
            cue_sample_rate = cue.sample_rate(),
            length_ms = cue.length_ms(),
            "cue output stream started"
        );

        Ok(Self {
            handle,
            device_name,
            _stream: stream,
        })
    }

    /// Playback control to hand to the detection pipeline.
    pub fn handle(&self) -> CueHandle {
        self.handle.clone()
    }

    /// Name of the output device.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl std::fmt::Debug for CuePlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuePlayback")
            .field("device_name", &self.device_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_cue() -> CueSound {
        CueSound::from_samples((0..10).map(|i| i as f32).collect(), 2, 1000)
    }

    #[test]
    fn test_length_ms_is_exact() {
        let cue = CueSound::from_samples(vec![0.0; 1500], 1, 1000);
        assert_eq!(cue.length_ms(), 1500);
        let cue = CueSound::from_samples(vec![0.0; 44_100 * 2 + 2], 2, 44_100);
        assert_eq!(cue.frames(), 44_101);
        assert_eq!(cue.length_ms(), 1000);
    }

    #[test]
    fn test_partial_frame_dropped() {
        let cue = CueSound::from_samples(vec![0.1; 7], 2, 48000);
        assert_eq!(cue.samples().len(), 6);
        assert_eq!(cue.frames(), 3);
    }

    #[test]
    fn test_zero_sample_rate() {
        let cue = CueSound::from_samples(vec![0.1; 8], 1, 0);
        assert_eq!(cue.length_ms(), 0);
    }

    #[test]
    fn test_idle_renders_silence() {
        let handle = CueHandle::new(&ramp_cue());
        let mut out = [1.0f32; 4];
        handle.render(&mut out);
        assert_eq!(out, [0.0; 4]);
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_plays_to_end_then_silence() {
        let mut handle = CueHandle::new(&ramp_cue());
        handle.restart_and_play();

        let mut out = [0.0f32; 4];
        handle.render(&mut out);
        assert_eq!(out, [0.0, 1.0, 2.0, 3.0]);
        handle.render(&mut out);
        assert_eq!(out, [4.0, 5.0, 6.0, 7.0]);
        handle.render(&mut out);
        assert_eq!(out, [8.0, 9.0, 0.0, 0.0]);
        assert!(!handle.is_playing());
        handle.render(&mut out);
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn test_restart_rewinds() {
        let mut handle = CueHandle::new(&ramp_cue());
        handle.restart_and_play();
        let mut out = [0.0f32; 6];
        handle.render(&mut out);
        handle.restart_and_play();
        handle.render(&mut out);
        assert_eq!(out, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_stop() {
        let mut handle = CueHandle::new(&ramp_cue());
        handle.restart_and_play();
        assert!(handle.is_playing());
        handle.stop();
        let mut out = [9.0f32; 2];
        handle.render(&mut out);
        assert_eq!(out, [0.0; 2]);
    }

    #[test]
    fn test_convert_identity() {
        let cue = ramp_cue();
        assert_eq!(cue.converted(2, 1000), cue);
    }

    #[test]
    fn test_convert_mono_to_stereo() {
        let out = convert_interleaved(&[0.1, 0.2, 0.3], 1, 48000, 2, 48000);
        assert_eq!(out, [0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn test_convert_drops_and_pads_channels() {
        let stereo = [1.0, -1.0, 2.0, -2.0];
        assert_eq!(convert_interleaved(&stereo, 2, 1000, 1, 1000), [1.0, 2.0]);
        assert_eq!(
            convert_interleaved(&stereo, 2, 1000, 4, 1000),
            [1.0, -1.0, 0.0, 0.0, 2.0, -2.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_convert_upsample_interpolates() {
        let out = convert_interleaved(&[0.0, 1.0, 2.0], 1, 1000, 1, 2000);
        assert_eq!(out, [0.0, 0.5, 1.0, 1.5, 2.0, 2.0]);
    }

    #[test]
    fn test_convert_downsample() {
        let out = convert_interleaved(&[0.0, 1.0, 2.0, 3.0], 1, 2000, 1, 1000);
        assert_eq!(out, [0.0, 2.0]);
    }

    #[test]
    fn test_convert_degenerate() {
        assert!(convert_interleaved(&[], 1, 48000, 2, 44100).is_empty());
        assert!(convert_interleaved(&[0.5; 8], 1, 0, 2, 44100).is_empty());
        assert!(convert_interleaved(&[0.5; 8], 1, 48000, 2, 0).is_empty());
    }

    #[test]
    fn test_output_handle_keeps_source_length() {
        // One second of mono at 1 kHz, played on a 44.1 kHz stereo device.
        let cue = CueSound::from_samples(vec![0.25; 1000], 1, 1000);
        let mut handle = CueHandle::for_output(&cue, 2, 44_100);
        assert_eq!(handle.cue_length_ms(), 1000);

        handle.restart_and_play();
        let mut out = vec![0.0f32; 44_100 * 2];
        handle.render(&mut out);
        assert!(out.iter().all(|&s| s == 0.25));
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_slot_swaps_cue() {
        let slot = CueSlot::default();
        let mut player = slot.clone();
        player.restart_and_play();
        assert!(!slot.is_loaded());

        let first = CueHandle::new(&ramp_cue());
        let second = CueHandle::new(&CueSound::from_samples(vec![0.0; 2000], 1, 1000));
        slot.install(Some(&first));
        assert_eq!(player.cue_length_ms(), 5);

        slot.install(Some(&second));
        assert_eq!(player.cue_length_ms(), 2000);
        player.restart_and_play();
        assert!(second.is_playing());
        assert!(!first.is_playing());

        slot.install(None);
        assert_eq!(player.cue_length_ms(), 0);
    }

    #[test]
    fn test_slot_retains_replaced_cue() {
        let slot = CueSlot::new();
        let first = CueHandle::new(&ramp_cue());
        slot.install(Some(&first));
        slot.install(Some(&CueHandle::new(&ramp_cue())));
        // Held by `first` and by the slot until the next install.
        assert_eq!(Arc::strong_count(&first.state), 2);
        slot.install(None);
        assert_eq!(Arc::strong_count(&first.state), 1);
    }

    #[test]
    fn test_empty_cue() {
        let mut handle = CueHandle::new(&CueSound::from_samples(Vec::new(), 1, 48000));
        handle.restart_and_play();
        let mut out = [1.0f32; 3];
        handle.render(&mut out);
        assert_eq!(out, [0.0; 3]);
        assert!(!handle.is_playing());
        assert_eq!(handle.cue_length_ms(), 0);
    }
}
