use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

/// Injected streaming decode capability.
///
/// Mirrors the surface of chunk-fed streaming recognizers: push samples,
/// drain pending decodes, read the current hypothesis, signal end of input.
/// The feeder is agnostic to what sits behind it.
pub trait StreamingDecoder {
    /// Push a chunk of mono samples in `[-1, 1]`.
    fn accept_waveform(&mut self, sample_rate: u32, samples: &[f32]);

    /// Whether the decoder has buffered enough input to decode again.
    fn is_ready(&self) -> bool;

    /// Run one decode step.
    fn decode(&mut self);

    /// Current decoded hypothesis for the stream.
    fn text(&self) -> String;

    /// Signal that no more audio will arrive.
    fn input_finished(&mut self);
}

/// One distinct partial result observed during a feed.
#[derive(Debug, Clone, Serialize)]
pub struct StreamingPartial {
    pub text: String,

    /// Offset from the start of the feed, wall clock, seconds
    pub wall_clock_offset_seconds: f64,

    /// How much audio had been fed when this text appeared, seconds
    pub audio_position_seconds: f64,
}

/// Feeder configuration.
///
/// The chunk duration is a harness decision, not a decoder default: every
/// engine gets fed at the same cadence so first-partial offsets compare.
#[derive(Debug, Clone)]
pub struct FeederConfig {
    pub sample_rate: u32,
    pub chunk_duration: Duration,

    /// Silence appended after the last chunk so the decoder can flush
    pub trailing_silence: Duration,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            chunk_duration: Duration::from_millis(100),
            trailing_silence: Duration::from_millis(500),
        }
    }
}

/// Result of feeding one buffer through a decoder.
#[derive(Debug, Clone, Serialize)]
pub struct FeedOutcome {
    /// Decoder hypothesis after input finished
    pub final_text: String,

    /// Every distinct partial, in order of appearance
    pub partials: Vec<StreamingPartial>,

    /// Total feed duration, wall clock, seconds
    pub total_seconds: f64,
}

impl FeedOutcome {
    /// Wall-clock offset of the first partial, or `None` if the decoder
    /// never produced text (e.g. a silent buffer).
    #[must_use]
    pub fn first_partial_seconds(&self) -> Option<f64> {
        self.partials.first().map(|p| p.wall_clock_offset_seconds)
    }
}

/// Replays audio into a `StreamingDecoder` chunk by chunk.
pub struct ChunkFeeder {
    config: FeederConfig,
}

impl ChunkFeeder {
    #[must_use]
    pub fn new(config: FeederConfig) -> Self {
        Self { config }
    }

    /// Feed `samples` through `decoder` and collect distinct partials.
    ///
    /// After each chunk the decoder is drained and its current text compared
    /// with the last recorded one; only changes are recorded, so repeated
    /// identical hypotheses collapse into a single partial. After the last
    /// chunk a trailing silence buffer is fed, input is marked finished, and
    /// a differing final hypothesis is recorded as one more partial.
    pub fn feed(&self, decoder: &mut dyn StreamingDecoder, samples: &[f32]) -> FeedOutcome {
        let rate = self.config.sample_rate.max(1);
        let chunk_size =
            ((rate as f64 * self.config.chunk_duration.as_secs_f64()) as usize).max(1);

        let started = Instant::now();
        let mut partials: Vec<StreamingPartial> = Vec::new();
        let mut last_text = String::new();

        for (index, chunk) in samples.chunks(chunk_size).enumerate() {
            decoder.accept_waveform(rate, chunk);
            while decoder.is_ready() {
                decoder.decode();
            }

            let current = decoder.text().trim().to_owned();
            if !current.is_empty() && current != last_text {
                partials.push(StreamingPartial {
                    text: current.clone(),
                    wall_clock_offset_seconds: started.elapsed().as_secs_f64(),
                    audio_position_seconds: (index * chunk_size) as f64 / rate as f64,
                });
                last_text = current;
            }
        }

        let tail_len = (rate as f64 * self.config.trailing_silence.as_secs_f64()) as usize;
        if tail_len > 0 {
            let tail = vec![0.0f32; tail_len];
            decoder.accept_waveform(rate, &tail);
        }
        decoder.input_finished();
        while decoder.is_ready() {
            decoder.decode();
        }

        let final_text = decoder.text().trim().to_owned();
        let total_seconds = started.elapsed().as_secs_f64();

        if !final_text.is_empty() && final_text != last_text {
            partials.push(StreamingPartial {
                text: final_text.clone(),
                wall_clock_offset_seconds: total_seconds,
                audio_position_seconds: samples.len() as f64 / rate as f64,
            });
        }

        debug!(
            partials = partials.len(),
            total_seconds, "streaming feed complete"
        );

        FeedOutcome {
            final_text,
            partials,
            total_seconds,
        }
    }
}
