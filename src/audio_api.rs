use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;

// What the sink settled on when it was opened. The composer only needs
// `sample_rate`; `channels` and `sample_width` end up in the WAV header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_width: u16, // bytes per sample per channel
}

impl SinkConfig {
    pub fn mono_u8(sample_rate: u32) -> Self {
        Self { sample_rate, channels: 1, sample_width: 1 }
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.sample_width as u32
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.sample_width
    }
}

// Anything the renderer can push a finished tone into. A write either takes
// the whole buffer or fails; there is no partial progress to resume.
pub trait PcmSink {
    fn write_pcm(&mut self, pcm: &[u8]) -> Result<()>;

    fn config(&self) -> SinkConfig;

    // Block until everything written so far has been played. Default: nothing queued.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<P: PcmSink + ?Sized> PcmSink for Box<P> {
    fn write_pcm(&mut self, pcm: &[u8]) -> Result<()> {
        (**self).write_pcm(pcm)
    }

    fn config(&self) -> SinkConfig {
        (**self).config()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

// in-memory sink, mostly for tests and offline rendering
#[derive(Clone, Debug)]
pub struct MemorySink {
    pub config: SinkConfig,
    pub data: Vec<u8>,
    pub writes: usize,
}

impl MemorySink {
    pub fn new(config: SinkConfig) -> Self {
        Self { config, data: Vec::new(), writes: 0 }
    }
}

impl PcmSink for MemorySink {
    fn write_pcm(&mut self, pcm: &[u8]) -> Result<()> {
        self.data.extend_from_slice(pcm);
        self.writes += 1;
        Ok(())
    }

    fn config(&self) -> SinkConfig {
        self.config
    }
}

// Set from the ctrl-c handler, read by the composer between tones.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
