// Fountain Codec Library
//
// This library contains a systematic RaptorQ-style fountain codec over
// GF(256) together with its framing, configuration, logging and metrics
// helpers, consolidated into a single crate.

pub mod config;
pub mod error;
pub mod fec;
pub mod logger;
pub mod telemetry;

pub use config::CodecConfig;
pub use error::{FountainError, Result};
pub use fec::{DecodeStatus, Decoder, DecoderState, EncodingPacket, Encoder, EncodingPlan, SharedDecoder};
