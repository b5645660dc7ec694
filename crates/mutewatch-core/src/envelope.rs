//! Envelope follower: per-frame peak detection over multichannel audio.
//!
//! The follower itself is stateless. It reduces each frame of a block to
//! `max over channels of |sample|`; the only state that persists across frames
//! is the decaying `level` kept by [`Gate`](crate::Gate), which is updated in
//! lock-step with these peaks.
//!
//! Both buffer layouts delivered by audio hosts are supported:
//!
//! - **Planar**: one slice per channel (`[[L0, L1, ..], [R0, R1, ..]]`)
//! - **Interleaved**: one slice, frames back to back (`[L0, R0, L1, R1, ..]`)

/// Peak absolute value of a single interleaved frame.
///
/// Returns `0.0` for an empty frame.
///
/// # Example
/// ```rust
/// use mutewatch_core::frame_peak;
///
/// assert_eq!(frame_peak(&[0.25, -0.5]), 0.5);
/// assert_eq!(frame_peak(&[]), 0.0);
/// ```
#[inline]
pub fn frame_peak(frame: &[f32]) -> f32 {
    frame.iter().fold(0.0f32, |peak, &s| peak.max(s.abs()))
}

/// Iterator over per-frame peaks of planar channel buffers.
///
/// Created by [`planar_peaks`].
#[derive(Debug, Clone)]
pub struct PlanarPeaks<'a> {
    channels: &'a [&'a [f32]],
    frame: usize,
    frames: usize,
}

impl Iterator for PlanarPeaks<'_> {
    type Item = f32;

    #[inline]
    fn next(&mut self) -> Option<f32> {
        if self.frame >= self.frames {
            return None;
        }
        let i = self.frame;
        self.frame += 1;
        Some(
            self.channels
                .iter()
                .fold(0.0f32, |peak, ch| peak.max(ch[i].abs())),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frames - self.frame;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PlanarPeaks<'_> {}

/// Per-frame peaks of planar buffers.
///
/// At most `channel_limit` channels are inspected (at least one, if any are
/// present). The frame count is the length of the shortest inspected channel,
/// so ragged buffers never index out of bounds.
///
/// # Example
/// ```rust
/// use mutewatch_core::planar_peaks;
///
/// let left = [0.1f32, -0.7, 0.0];
/// let right = [-0.3f32, 0.2, 0.05];
/// let channels: [&[f32]; 2] = [&left, &right];
///
/// let peaks: Vec<f32> = planar_peaks(&channels, 2).collect();
/// assert_eq!(peaks, vec![0.3, 0.7, 0.05]);
/// ```
pub fn planar_peaks<'a>(channels: &'a [&'a [f32]], channel_limit: usize) -> PlanarPeaks<'a> {
    let used = channels.len().min(channel_limit.max(1));
    let channels = &channels[..used];
    let frames = channels.iter().map(|ch| ch.len()).min().unwrap_or(0);
    PlanarPeaks {
        channels,
        frame: 0,
        frames,
    }
}

/// Per-frame peaks of interleaved samples.
///
/// A trailing partial frame is ignored. `channels == 0` yields nothing.
///
/// # Example
/// ```rust
/// use mutewatch_core::interleaved_peaks;
///
/// let block = [0.1f32, -0.3, -0.7, 0.2];
/// let peaks: Vec<f32> = interleaved_peaks(&block, 2).collect();
/// assert_eq!(peaks, vec![0.3, 0.7]);
/// ```
pub fn interleaved_peaks(samples: &[f32], channels: usize) -> impl Iterator<Item = f32> + '_ {
    // chunks_exact panics on zero; an empty slice keeps the iterator type uniform.
    let (samples, size) = if channels == 0 {
        (&samples[..0], 1)
    } else {
        (samples, channels)
    };
    samples.chunks_exact(size).map(frame_peak)
}
