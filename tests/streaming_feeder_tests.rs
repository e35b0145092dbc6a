// Integration tests for the streaming chunk feeder.
//
// A mock decoder reveals one transcript word per fixed amount of voiced
// audio, which makes partial progression, deduplication, and the
// silent-buffer case fully deterministic.

use std::time::Duration;

use stt_harness::{AudioBuffer, ChunkFeeder, FeederConfig, StreamingDecoder};

/// Decoder that "recognizes" one word per `samples_per_word` voiced samples.
/// Silence produces no text at all.
struct MockDecoder {
    words: Vec<&'static str>,
    samples_per_word: usize,
    voiced_samples: usize,
    pending_decodes: usize,
    finished: bool,
}

impl MockDecoder {
    fn new(words: Vec<&'static str>, samples_per_word: usize) -> Self {
        Self {
            words,
            samples_per_word,
            voiced_samples: 0,
            pending_decodes: 0,
            finished: false,
        }
    }
}

impl StreamingDecoder for MockDecoder {
    fn accept_waveform(&mut self, _sample_rate: u32, samples: &[f32]) {
        self.voiced_samples += samples.iter().filter(|s| s.abs() > 0.001).count();
        self.pending_decodes += 1;
    }

    fn is_ready(&self) -> bool {
        self.pending_decodes > 0
    }

    fn decode(&mut self) {
        self.pending_decodes = self.pending_decodes.saturating_sub(1);
    }

    fn text(&self) -> String {
        let revealed = (self.voiced_samples / self.samples_per_word).min(self.words.len());
        self.words[..revealed].join(" ")
    }

    fn input_finished(&mut self) {
        self.finished = true;
    }
}

#[test]
fn test_silent_buffer_produces_no_partials() {
    let buffer = AudioBuffer::silence(Duration::from_secs(1), 16_000);
    let mut decoder = MockDecoder::new(vec!["hello", "world"], 3_200);

    let feeder = ChunkFeeder::new(FeederConfig::default());
    let outcome = feeder.feed(&mut decoder, buffer.samples());

    assert!(outcome.partials.is_empty());
    assert_eq!(outcome.first_partial_seconds(), None);
    assert!(outcome.final_text.is_empty());
    assert!(decoder.finished, "input_finished must be signalled");
}

#[test]
fn test_voiced_buffer_records_distinct_partials() {
    // 1 second of voiced audio at 16 kHz, one word per 3200 voiced samples:
    // the transcript grows to 5 words over ten 100 ms chunks.
    let samples = vec![0.5f32; 16_000];
    let mut decoder = MockDecoder::new(vec!["one", "two", "three", "four", "five"], 3_200);

    let feeder = ChunkFeeder::new(FeederConfig::default());
    let outcome = feeder.feed(&mut decoder, &samples);

    // Ten chunks but only five distinct texts: adjacent duplicates collapse.
    assert_eq!(outcome.partials.len(), 5);
    assert_eq!(outcome.partials[0].text, "one");
    assert_eq!(outcome.partials[4].text, "one two three four five");
    assert_eq!(outcome.final_text, "one two three four five");
    assert!(outcome.first_partial_seconds().is_some());
}

#[test]
fn test_partials_carry_increasing_positions() {
    let samples = vec![0.5f32; 16_000];
    let mut decoder = MockDecoder::new(vec!["a", "b", "c"], 4_000);

    let feeder = ChunkFeeder::new(FeederConfig::default());
    let outcome = feeder.feed(&mut decoder, &samples);

    for pair in outcome.partials.windows(2) {
        assert!(
            pair[1].wall_clock_offset_seconds >= pair[0].wall_clock_offset_seconds,
            "wall-clock offsets must be monotonic"
        );
        assert!(
            pair[1].audio_position_seconds >= pair[0].audio_position_seconds,
            "audio positions must be monotonic"
        );
    }
    assert!(outcome.total_seconds >= 0.0);
}

#[test]
fn test_trailing_silence_does_not_invent_partials() {
    // All words revealed mid-buffer; the flush must not add a duplicate
    // final partial.
    let samples = vec![0.5f32; 16_000];
    let mut decoder = MockDecoder::new(vec!["only"], 1_600);

    let feeder = ChunkFeeder::new(FeederConfig::default());
    let outcome = feeder.feed(&mut decoder, &samples);

    assert_eq!(outcome.partials.len(), 1);
    assert_eq!(outcome.final_text, "only");
}

#[test]
fn test_late_final_text_is_recorded_as_partial() {
    // Decoder that only produces text once input is finished, like a batch
    // model wrapped behind a streaming interface.
    struct FlushOnlyDecoder {
        finished: bool,
    }

    impl StreamingDecoder for FlushOnlyDecoder {
        fn accept_waveform(&mut self, _sample_rate: u32, _samples: &[f32]) {}

        fn is_ready(&self) -> bool {
            false
        }

        fn decode(&mut self) {}

        fn text(&self) -> String {
            if self.finished {
                "flushed result".to_owned()
            } else {
                String::new()
            }
        }

        fn input_finished(&mut self) {
            self.finished = true;
        }
    }

    let samples = vec![0.5f32; 8_000];
    let mut decoder = FlushOnlyDecoder { finished: false };

    let feeder = ChunkFeeder::new(FeederConfig::default());
    let outcome = feeder.feed(&mut decoder, &samples);

    assert_eq!(outcome.partials.len(), 1);
    assert_eq!(outcome.partials[0].text, "flushed result");
    assert_eq!(outcome.final_text, "flushed result");
    assert_eq!(
        outcome.first_partial_seconds(),
        Some(outcome.partials[0].wall_clock_offset_seconds)
    );
}

#[test]
fn test_custom_chunk_duration_changes_cadence() {
    let samples = vec![0.5f32; 16_000];
    let mut decoder = MockDecoder::new(vec!["word"], 1);

    let config = FeederConfig {
        sample_rate: 16_000,
        chunk_duration: Duration::from_millis(250),
        trailing_silence: Duration::from_millis(500),
    };
    let feeder = ChunkFeeder::new(config);
    let outcome = feeder.feed(&mut decoder, &samples);

    // The first chunk already reveals the single word.
    assert_eq!(outcome.partials.len(), 1);
    assert_eq!(outcome.partials[0].audio_position_seconds, 0.0);
}
