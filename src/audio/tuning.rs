use crate::shared::{Sound, START_FREQ, STEPS_PER_OCTAVE};

pub fn base_octave_frequency(octave_n: u8) -> u32 {
    let mut multiplier: u32 = 1;
    for _ in 0..octave_n {
        multiplier *= 2;
    }
    START_FREQ * multiplier
}

pub fn integer_power(base: f64, exponent: u32) -> f64 {
    let mut result = 1.0;
    for _ in 0..exponent {
        result *= base;
    }
    result
}

// Newton from 1.0; also stops when f64 rounding flips between two guesses
pub fn nth_root_of_two(degree: u32) -> f64 {
    debug_assert!(degree > 0, "zeroth root of two is undefined");
    let d = degree as f64;
    let mut before_last = f64::NAN;
    let mut old = 0.0;
    let mut new = 1.0;
    while old != new && before_last != new {
        before_last = old;
        old = new;
        new = old - (integer_power(old, degree) - 2.0) / (d * integer_power(old, degree - 1));
    }
    new
}

// The scale the composer plays in: the per-step ratio is computed once.
#[derive(Clone, Copy, Debug)]
pub struct Scale {
    root_of_two: f64,
}

impl Scale {
    pub fn new() -> Self {
        Self { root_of_two: nth_root_of_two((STEPS_PER_OCTAVE - 1) as u32) }
    }

    pub fn multiplier(&self, freq_step: u8) -> f64 {
        integer_power(self.root_of_two, freq_step as u32)
    }

    // Frequency in whole Hz, truncated.
    pub fn tone_frequency(&self, octave_n: u8, freq_step: u8) -> u32 {
        (base_octave_frequency(octave_n) as f64 * self.multiplier(freq_step)) as u32
    }

    pub fn frequency(&self, sound: &Sound) -> u32 {
        self.tone_frequency(sound.octave_n, sound.freq_step)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::new()
    }
}
