use std::io::{Seek, Write};

use crate::audio_api::PcmSink;
use crate::error::{Error, Result};
use crate::shared::LOUDNESS;

use super::output::Output;

const SILENCE: u8 = 0;

// One buffer, sized for the longest tone (one second) up front
pub struct ToneRenderer {
    sample_rate: u32,
    buf: Vec<u8>,
}

impl ToneRenderer {
    pub fn new(sample_rate: u32) -> Result<Self> {
        let bytes = sample_rate as usize;
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes)
            .map_err(|_| Error::Allocation { what: "tone buffer", bytes })?;
        Ok(Self { sample_rate, buf })
    }

    // Fill the buffer with `sample_rate / length_div` bytes of a hard square
    // wave: silence for the first half of each cycle, `LOUDNESS` for the rest.
    pub fn render(&mut self, length_div: u8, freq: u32) -> &[u8] {
        debug_assert!(length_div >= 1, "tone length divisor of zero");
        debug_assert!(freq > 0, "tone frequency of zero");

        let total = (self.sample_rate / length_div as u32) as usize;
        // above the sample rate a cycle would be shorter than one sample
        let cycle = ((self.sample_rate / freq) as usize).max(1);
        let half_cycle = cycle / 2;

        self.buf.clear();
        self.buf.extend((0..total).map(|i| {
            if i % cycle < half_cycle { SILENCE } else { LOUDNESS }
        }));
        &self.buf
    }

    // Render one tone and push it through `out`. Returns the bytes written.
    pub fn render_and_emit<S, W>(
        &mut self,
        length_div: u8,
        freq: u32,
        out: &mut Output<S, W>,
    ) -> Result<usize>
    where
        S: PcmSink,
        W: Write + Seek,
    {
        let pcm = self.render(length_div, freq);
        let n = pcm.len();
        out.write(pcm)?;
        Ok(n)
    }
}
