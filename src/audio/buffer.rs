use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Mono audio addressable as normalized `f32` samples in `[-1, 1]`.
///
/// The harness is agnostic to how a buffer was produced: synthesized to a
/// WAV file, captured from a microphone, or generated in a test. Disk
/// representation is 16-bit signed PCM throughout.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    #[must_use]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// A buffer of digital silence.
    #[must_use]
    pub fn silence(duration: Duration, sample_rate: u32) -> Self {
        let len = (sample_rate as f64 * duration.as_secs_f64()) as usize;
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Convert 16-bit PCM samples to the normalized float representation.
    #[must_use]
    pub fn from_i16(samples: &[i16], sample_rate: u32) -> Self {
        let samples = samples.iter().map(|&s| f32::from(s) / 32_768.0).collect();
        Self::new(samples, sample_rate)
    }

    /// Load a 16-bit PCM WAV file, folding multi-channel audio to mono.
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("failed to open WAV file {}", path.display()))?;

        let spec = reader.spec();
        let raw: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read audio samples")?;

        let channels = spec.channels.max(1) as usize;
        let mono: Vec<i16> = if channels == 1 {
            raw
        } else {
            // Sum channels without division to preserve volume, clamped to
            // the i16 range.
            raw.chunks_exact(channels)
                .map(|frame| {
                    let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                    sum.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
                })
                .collect()
        };

        let buffer = Self::from_i16(&mono, spec.sample_rate);
        info!(
            "loaded {}: {:.1}s at {}Hz",
            path.display(),
            buffer.duration_seconds(),
            spec.sample_rate
        );
        Ok(buffer)
    }

    /// Write the buffer as a 16-bit PCM mono WAV file.
    pub fn to_wav(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file {}", path.display()))?;
        for &sample in &self.samples {
            let value = (sample.clamp(-1.0, 1.0) * 32_767.0) as i16;
            writer
                .write_sample(value)
                .context("failed to write sample")?;
        }
        writer.finalize().context("failed to finalize WAV file")?;
        Ok(())
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Downsample by decimation to an integer divisor of the current rate.
    ///
    /// Recognition models expect 16 kHz; capture defaults are usually 44.1
    /// or 48 kHz. Decimation is crude but adequate for synthetic speech.
    #[must_use]
    pub fn downsample_to(&self, target_rate: u32) -> Self {
        if target_rate == 0 || self.sample_rate <= target_rate {
            return self.clone();
        }
        let ratio = (self.sample_rate / target_rate).max(1) as usize;
        let samples: Vec<f32> = self.samples.iter().step_by(ratio).copied().collect();
        Self::new(samples, target_rate)
    }
}
