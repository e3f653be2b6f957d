// Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::audio::SinkTarget;
use crate::shared::{PolicyKind, DEFAULT_WAV_PATH};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "plomsound")]
#[command(about = "Endless generative square-wave melodies", long_about = None)]
pub struct Args {
    /// Also record everything played to a WAV file
    #[arg(short = 'w', long)]
    pub wav: bool,

    /// Where the WAV recording goes
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_WAV_PATH)]
    pub output: PathBuf,

    /// How the next tone is chosen
    #[arg(short, long, value_enum, default_value_t = PolicyKind::Walk)]
    pub policy: PolicyKind,

    /// Seed for the random source (defaults to the current time)
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Write raw unsigned 8-bit pcm to stdout instead of the audio device
    #[arg(long)]
    pub stdout: bool,
}

impl Args {
    pub fn sink_target(&self) -> SinkTarget {
        if self.stdout { SinkTarget::Stdout } else { SinkTarget::Device }
    }

    pub fn wav_path(&self) -> Option<&std::path::Path> {
        self.wav.then_some(self.output.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["plomsound"]).unwrap();
        assert!(!args.wav);
        assert_eq!(args.policy, PolicyKind::Walk);
        assert_eq!(args.sink_target(), SinkTarget::Device);
        assert_eq!(args.wav_path(), None);
        assert_eq!(args.output, PathBuf::from("out.wav"));
    }

    #[test]
    fn wav_and_policy_flags() {
        let args = Args::try_parse_from(["plomsound", "-w", "-p", "mutate", "--seed", "42"]).unwrap();
        assert_eq!(args.wav_path(), Some(std::path::Path::new("out.wav")));
        assert_eq!(args.policy, PolicyKind::Mutate);
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Args::try_parse_from(["plomsound", "--policy", "shuffle"]).is_err());
    }
}
