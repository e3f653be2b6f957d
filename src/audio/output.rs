use std::fs::File;
use std::io::{BufWriter, Seek, Write};

use crate::audio_api::{PcmSink, SinkConfig};
use crate::error::Result;

use super::wav::WavCapture;

// Live sink plus an optional WAV capture of the same bytes
pub struct Output<S: PcmSink, W: Write + Seek = BufWriter<File>> {
    sink: S,
    capture: Option<WavCapture<W>>,
    pcm_written: u64,
}

// What an orderly shutdown leaves behind.
pub struct Finished<S, W> {
    pub sink: S,
    pub capture: Option<W>,
    pub pcm_written: u64,
}

impl<S: PcmSink, W: Write + Seek> Output<S, W> {
    pub fn new(sink: S) -> Self {
        Self { sink, capture: None, pcm_written: 0 }
    }

    pub fn with_capture(sink: S, capture: WavCapture<W>) -> Self {
        Self { sink, capture: Some(capture), pcm_written: 0 }
    }

    pub fn config(&self) -> SinkConfig {
        self.sink.config()
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn pcm_written(&self) -> u64 {
        self.pcm_written
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // Device first, then the capture. Either failing is fatal.
    pub fn write(&mut self, pcm: &[u8]) -> Result<()> {
        self.sink.write_pcm(pcm)?;
        if let Some(capture) = self.capture.as_mut() {
            capture.append(pcm)?;
        }
        self.pcm_written += pcm.len() as u64;
        Ok(())
    }

    // Patch the WAV header, let the sink drain, release both.
    pub fn finish(mut self) -> Result<Finished<S, W>> {
        let capture = match self.capture.take() {
            Some(capture) => Some(capture.finish()?),
            None => None,
        };
        self.sink.close()?;
        Ok(Finished { sink: self.sink, capture, pcm_written: self.pcm_written })
    }
}
