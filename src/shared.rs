// Constants and the little value types every layer passes around.
//
// The composition layer only ever deals in `Sound`s: which octave, which step
// inside that octave, and what fraction of a second the tone lasts. Turning
// that into Hz happens in audio::tuning, turning Hz into bytes in audio::tone.
//
//   octave_n   0..N_OCTAVES            base freq = START_FREQ * 2^octave_n
//   freq_step  0..STEPS_PER_OCTAVE     multiplier = root^freq_step
//   length_div 1..MAX_LENGTH_DIVISOR   duration = 1/length_div seconds

use clap::ValueEnum;

pub const N_OCTAVES: u8 = 8;
pub const STEPS_PER_OCTAVE: u8 = 8;
pub const LOUDNESS: u8 = 8;
pub const MAX_LENGTH_DIVISOR: u8 = 16;
pub const DSP_RATE_TARGET: u32 = 48000;
pub const START_FREQ: u32 = 32;
pub const PROB_OCTAVE_CHANGE: u32 = 2;

// RIFF header for mono 8-bit PCM, fmt chunk of 16 bytes
pub const WAV_HEADER_LEN: u32 = 44;

pub const DEFAULT_WAV_PATH: &str = "out.wav";

// ye olde types
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sound {
    pub freq_step: u8,
    pub octave_n: u8,
    pub length_div: u8, // 0 only before the first tone was composed
}

impl Sound {
    pub fn new(freq_step: u8, octave_n: u8, length_div: u8) -> Self {
        Self { freq_step, octave_n, length_div }
    }

    // True while this is still the zeroed sound the composer starts from.
    pub fn is_unset(&self) -> bool {
        self.length_div == 0
    }

    pub fn at_lowest_step(&self) -> bool {
        self.freq_step == 0
    }

    pub fn at_highest_step(&self) -> bool {
        self.freq_step == STEPS_PER_OCTAVE - 1
    }
}

// which generation policy drives the composer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Stateless random walk with octave reflection at the scale edges
    #[default]
    Walk,
    /// Replayed loop that gains one note per cycle
    Grow,
    /// Replayed loop whose notes drift and occasionally multiply
    Mutate,
}

impl PolicyKind {
    pub fn label(self) -> &'static str {
        match self {
            PolicyKind::Walk => "random walk",
            PolicyKind::Grow => "growing loop",
            PolicyKind::Mutate => "mutating loop",
        }
    }
}
