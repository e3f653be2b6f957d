use std::io::Write;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError};

use crate::audio_api::{PcmSink, SinkConfig};
use crate::error::{Error, Result};
use crate::shared::DSP_RATE_TARGET;

// One tone in flight, one queued. A third write blocks until the callback
// has started on the second, which is what keeps the composer in real time.
const QUEUED_TONES: usize = 1;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);
// the longest tone is one second; a callback quiet for four of them is dead
const STALL_TIMEOUT: Duration = Duration::from_secs(4);

// The default output device, fed mono unsigned 8-bit pcm.
pub struct DeviceSink {
    feeder: Feeder,
    drained_rx: Receiver<()>,
    config: SinkConfig,
    device_channels: u16,
    _stream: cpal::Stream,
}

impl DeviceSink {
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::acquire("default output device"))?;

        let supported = pick_config(&device)?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(Error::acquire("output stream (only f32 devices are supported)"));
        }
        let sample_rate = supported.sample_rate();
        let device_channels = supported.channels();
        let stream_config: cpal::StreamConfig = supported.into();

        let (tx, rx) = crossbeam_channel::bounded::<Vec<u8>>(QUEUED_TONES);
        let (drained_tx, drained_rx) = crossbeam_channel::bounded::<()>(1);
        let (err_tx, err_rx) = crossbeam_channel::bounded::<String>(1);
        let mut playback = Playback::new(rx, drained_tx);
        let channels = device_channels as usize;

        let err_fn = move |err: cpal::StreamError| {
            log::error!("audio output stream error: {err}");
            // first error wins
            let _ = err_tx.try_send(err.to_string());
        };
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    playback.fill(data, channels);
                },
                err_fn,
                None,
            )
            .map_err(|e| Error::acquire_with("output stream", e))?;
        stream.play().map_err(|e| Error::acquire_with("output stream playback", e))?;

        Ok(Self {
            feeder: Feeder::new(tx, err_rx, STALL_TIMEOUT),
            drained_rx,
            config: SinkConfig::mono_u8(sample_rate),
            device_channels,
            _stream: stream,
        })
    }

    pub fn device_channels(&self) -> u16 {
        self.device_channels
    }
}

// target rate if some f32 range covers it, whatever the device prefers otherwise
fn pick_config(device: &cpal::Device) -> Result<cpal::SupportedStreamConfig> {
    let ranges = device
        .supported_output_configs()
        .map_err(|e| Error::acquire_with("output device configurations", e))?;
    for range in ranges {
        if range.sample_format() == cpal::SampleFormat::F32
            && range.min_sample_rate() <= DSP_RATE_TARGET
            && range.max_sample_rate() >= DSP_RATE_TARGET
        {
            return Ok(range.with_sample_rate(DSP_RATE_TARGET));
        }
    }
    log::warn!("no f32 output config at {DSP_RATE_TARGET} Hz, using device default");
    device
        .default_output_config()
        .map_err(|e| Error::acquire_with("default output config", e))
}

impl PcmSink for DeviceSink {
    fn write_pcm(&mut self, pcm: &[u8]) -> Result<()> {
        self.feeder.push(pcm)
    }

    fn config(&self) -> SinkConfig {
        self.config
    }

    fn close(&mut self) -> Result<()> {
        // dropping the sender is how the callback learns nothing else is coming
        if !self.feeder.hang_up() {
            return Ok(());
        }
        if self.drained_rx.recv_timeout(DRAIN_TIMEOUT).is_err() {
            log::warn!("audio device did not drain within {DRAIN_TIMEOUT:?}");
        }
        Ok(())
    }
}

// Writer end of the callback queue. A stream error reported by cpal, a
// dropped callback or a queue that stops moving all turn into Error::Device.
struct Feeder {
    tx: Option<Sender<Vec<u8>>>,
    err_rx: Receiver<String>,
    stall_timeout: Duration,
}

impl Feeder {
    fn new(tx: Sender<Vec<u8>>, err_rx: Receiver<String>, stall_timeout: Duration) -> Self {
        Self { tx: Some(tx), err_rx, stall_timeout }
    }

    fn push(&self, pcm: &[u8]) -> Result<()> {
        if let Ok(msg) = self.err_rx.try_recv() {
            return Err(Error::Device(msg));
        }
        let tx = self.tx.as_ref().ok_or_else(|| Error::Device("write after close".into()))?;
        let mut chunk = Vec::new();
        chunk
            .try_reserve_exact(pcm.len())
            .map_err(|_| Error::Allocation { what: "device chunk", bytes: pcm.len() })?;
        chunk.extend_from_slice(pcm);
        tx.send_timeout(chunk, self.stall_timeout).map_err(|e| match e {
            SendTimeoutError::Timeout(_) => match self.err_rx.try_recv() {
                Ok(msg) => Error::Device(msg),
                Err(_) => Error::Device(format!("output stream stalled for {:?}", self.stall_timeout)),
            },
            SendTimeoutError::Disconnected(_) => Error::Device("output stream stopped".into()),
        })
    }

    // false if already hung up
    fn hang_up(&mut self) -> bool {
        self.tx.take().is_some()
    }
}

// State owned by the output callback
struct Playback {
    rx: Receiver<Vec<u8>>,
    current: Vec<u8>,
    pos: usize,
    drained_tx: Option<Sender<()>>,
}

impl Playback {
    fn new(rx: Receiver<Vec<u8>>, drained_tx: Sender<()>) -> Self {
        Self { rx, current: Vec::new(), pos: 0, drained_tx: Some(drained_tx) }
    }

    fn next_sample(&mut self) -> f32 {
        while self.pos >= self.current.len() {
            match self.rx.try_recv() {
                Ok(chunk) => {
                    self.current = chunk;
                    self.pos = 0;
                }
                Err(TryRecvError::Empty) => return 0.0,
                Err(TryRecvError::Disconnected) => {
                    if let Some(tx) = self.drained_tx.take() {
                        let _ = tx.try_send(());
                    }
                    return 0.0;
                }
            }
        }
        let byte = self.current[self.pos];
        self.pos += 1;
        u8_to_f32(byte)
    }

    // mono source, so every device channel gets the same sample
    fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let s = self.next_sample();
            frame.fill(s);
        }
    }
}

// no recentring around 128: the square wave stays a quiet 0..LOUDNESS pulse on the device
fn u8_to_f32(byte: u8) -> f32 {
    byte as f32 / 128.0
}

// Raw pcm straight into a byte stream, e.g. stdout piped into `aplay -f U8`.
pub struct RawSink<W: Write> {
    inner: W,
    config: SinkConfig,
}

impl<W: Write> RawSink<W> {
    pub fn new(inner: W, sample_rate: u32) -> Self {
        Self { inner, config: SinkConfig::mono_u8(sample_rate) }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> PcmSink for RawSink<W> {
    fn write_pcm(&mut self, pcm: &[u8]) -> Result<()> {
        self.inner.write_all(pcm).map_err(|e| Error::io("write()", e))
    }

    fn config(&self) -> SinkConfig {
        self.config
    }

    fn close(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| Error::io("flush()", e))
    }
}
