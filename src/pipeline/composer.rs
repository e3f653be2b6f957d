use std::io::{Seek, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::tuning::{base_octave_frequency, Scale};
use crate::audio::{Output, ToneRenderer};
use crate::audio_api::{CancelToken, PcmSink};
use crate::error::Result;
use crate::shared::{PolicyKind, Sound};

use super::policy::Policy;

// Seconds since the epoch; the composer is seeded from this unless told otherwise.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub fn rng_from_seed(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

// Drives one policy: pick a sound, turn it into Hz, render it, repeat.
pub struct Composer<R: RngCore> {
    policy: Box<dyn Policy>,
    rng: R,
    scale: Scale,
    last: Sound,
    tones: u64,
}

impl<R: RngCore> Composer<R> {
    pub fn new(kind: PolicyKind, rng: R) -> Self {
        Self::with_policy(kind.to_policy(), rng)
    }

    pub fn with_policy(policy: Box<dyn Policy>, rng: R) -> Self {
        Self {
            policy,
            rng,
            scale: Scale::new(),
            last: Sound::default(),
            tones: 0,
        }
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    // The most recent sound played; zeroed before the first one.
    pub fn last(&self) -> Sound {
        self.last
    }

    pub fn tones(&self) -> u64 {
        self.tones
    }

    pub fn step<S, W>(&mut self, renderer: &mut ToneRenderer, out: &mut Output<S, W>) -> Result<Sound>
    where
        S: PcmSink,
        W: Write + Seek,
    {
        let sound = self.policy.next_sound(&mut self.rng)?;
        let freq = self.scale.frequency(&sound);
        log::info!(
            "freq {:5} (base {:5} step {:3} multiply {}/100000) length 1/{:3}",
            freq,
            base_octave_frequency(sound.octave_n),
            sound.freq_step,
            (self.scale.multiplier(sound.freq_step) * 100000.0) as u64,
            sound.length_div,
        );
        renderer.render_and_emit(sound.length_div, freq, out)?;
        self.last = sound;
        self.tones += 1;
        Ok(sound)
    }

    // Play until `cancel` is set. The flag is looked at only between tones,
    // so the tone being written when it flips is always finished.
    pub fn run<S, W>(&mut self, out: &mut Output<S, W>, cancel: &CancelToken) -> Result<u64>
    where
        S: PcmSink,
        W: Write + Seek,
    {
        let mut renderer = ToneRenderer::new(out.config().sample_rate)?;
        let start = self.tones;
        loop {
            self.step(&mut renderer, out)?;
            if cancel.is_cancelled() {
                break;
            }
        }
        Ok(self.tones - start)
    }
}
