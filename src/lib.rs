// plomsound: endless generative square-wave melodies

pub mod audio;
pub mod audio_api;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod shared;

pub use error::{Error, Result};
