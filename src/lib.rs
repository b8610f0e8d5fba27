//! Playback data access for airport-surface traffic simulations.
//!
//! A [`connector::PlaybackDataConnector`] walks the time-ordered states of a
//! simulation plan, fetched whole (batch) or on demand (streaming) from a
//! [`backend::PlaybackBackend`]. [`playback`] wraps connectors into per-plan
//! sessions with step, jump and auto-play controls that feed a
//! presentation-provided [`playback::FrameSink`].

pub mod backend;
pub mod config;
pub mod connector;
pub mod core;
pub mod error;
pub mod playback;
pub mod view;

pub use error::{PlaybackError, PlaybackResult};
