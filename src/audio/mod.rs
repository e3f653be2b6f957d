use std::path::Path;

use crate::audio_api::PcmSink;
use crate::error::Result;
use crate::shared::DSP_RATE_TARGET;

pub mod device;
pub mod output;
pub mod tone;
pub mod tuning;
pub mod wav;

pub use device::{DeviceSink, RawSink};
pub use output::{Finished, Output};
pub use tone::ToneRenderer;
pub use tuning::Scale;
pub use wav::WavCapture;

// Where the pcm goes when it isn't (only) a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkTarget {
    Device,
    Stdout,
}

pub type DynOutput = Output<Box<dyn PcmSink>>;

// Open the sink, then the WAV capture if asked for one. The capture's header
// takes its format from whatever the sink settled on.
pub fn start_output(target: SinkTarget, wav_path: Option<&Path>) -> Result<DynOutput> {
    let sink: Box<dyn PcmSink> = match target {
        SinkTarget::Device => {
            let sink = DeviceSink::open()?;
            log::info!("output device has {} channels", sink.device_channels());
            Box::new(sink)
        }
        SinkTarget::Stdout => Box::new(RawSink::new(std::io::stdout().lock(), DSP_RATE_TARGET)),
    };

    let config = sink.config();
    log::info!("samples per second: {}", config.sample_rate);
    log::info!("channels: {}", config.channels);
    log::info!("bytes per frame: {}", config.block_align());

    match wav_path {
        Some(path) => {
            let capture = WavCapture::create(path, config)?;
            log::info!("capturing to {}", path.display());
            Ok(Output::with_capture(sink, capture))
        }
        None => Ok(Output::new(sink)),
    }
}
