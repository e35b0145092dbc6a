//! Streaming decode simulation.
//!
//! Replays a pre-recorded audio buffer into a streaming-capable decoder in
//! fixed-duration chunks, recording the wall-clock offset of every distinct
//! partial result. The offset of the first partial approximates perceived
//! latency for a real-time listener, which is the headline metric of the
//! streaming benchmarks.

mod feeder;

pub use feeder::{ChunkFeeder, FeedOutcome, FeederConfig, StreamingDecoder, StreamingPartial};
