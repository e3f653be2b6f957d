use std::io::Cursor;

use pretty_assertions::assert_eq;
use rand::RngCore;

use plomsound::audio::{Output, WavCapture};
use plomsound::audio_api::{CancelToken, MemorySink, PcmSink, SinkConfig};
use plomsound::pipeline::{rng_from_seed, Composer, Policy};
use plomsound::shared::{PolicyKind, Sound, LOUDNESS};
use plomsound::Result;

// always the same note
struct Fixed(Sound);

impl Policy for Fixed {
    fn next_sound(&mut self, _rng: &mut dyn RngCore) -> Result<Sound> {
        Ok(self.0)
    }
}

// stands in for ctrl-c arriving while the n-th tone is being written
struct CancelAfter {
    inner: MemorySink,
    token: CancelToken,
    after: usize,
    last_len: usize,
}

impl PcmSink for CancelAfter {
    fn write_pcm(&mut self, pcm: &[u8]) -> Result<()> {
        self.inner.write_pcm(pcm)?;
        self.last_len = pcm.len();
        if self.inner.writes == self.after {
            self.token.cancel();
        }
        Ok(())
    }

    fn config(&self) -> SinkConfig {
        self.inner.config
    }
}

fn le32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

#[test]
fn lowest_note_quarter_second_at_48k() {
    let cfg = SinkConfig::mono_u8(48000);
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut composer = Composer::with_policy(Box::new(Fixed(Sound::new(0, 0, 4))), rng_from_seed(0));
    assert_eq!(composer.scale().frequency(&Sound::new(0, 0, 4)), 32);

    let mut out: Output<MemorySink, Cursor<Vec<u8>>> = Output::new(MemorySink::new(cfg));
    composer.run(&mut out, &cancel).unwrap();
    let pcm = out.finish().unwrap().sink.data;

    assert_eq!(pcm.len(), 12000);
    let cycles: Vec<&[u8]> = pcm.chunks(1500).collect();
    assert_eq!(cycles.len(), 8);
    for cycle in cycles {
        assert_eq!(&cycle[..750], &[0u8; 750][..]);
        assert_eq!(&cycle[750..], &[LOUDNESS; 750][..]);
    }
}

#[test]
fn cancel_mid_run_finishes_the_tone_and_patches_the_header() {
    let cfg = SinkConfig::mono_u8(16000);
    let cancel = CancelToken::new();
    let sink = CancelAfter { inner: MemorySink::new(cfg), token: cancel.clone(), after: 25, last_len: 0 };
    let capture = WavCapture::new(Cursor::new(Vec::new()), cfg).unwrap();
    let mut out = Output::with_capture(sink, capture);

    let mut composer = Composer::new(PolicyKind::Grow, rng_from_seed(99));
    let played = composer.run(&mut out, &cancel).unwrap();
    assert_eq!(played, 25);

    let done = out.finish().unwrap();
    let last_len = done.sink.last_len;
    let pcm = done.sink.inner.data;
    let wav = done.capture.unwrap().into_inner();
    assert_eq!(done.pcm_written, pcm.len() as u64);
    assert_eq!(le32(&wav, 4) as usize, pcm.len() + 36);
    assert_eq!(le32(&wav, 40) as usize, pcm.len());
    assert_eq!(&wav[44..], &pcm[..]);
    // the final tone was written whole
    let last = composer.last();
    assert_eq!(last_len, 16000 / last.length_div as usize);
}

#[test]
fn every_policy_runs_until_cancelled() {
    for kind in [PolicyKind::Walk, PolicyKind::Grow, PolicyKind::Mutate] {
        let cfg = SinkConfig::mono_u8(8000);
        let cancel = CancelToken::new();
        let sink = CancelAfter { inner: MemorySink::new(cfg), token: cancel.clone(), after: 200, last_len: 0 };
        let mut out: Output<CancelAfter, Cursor<Vec<u8>>> = Output::new(sink);
        let mut composer = Composer::new(kind, rng_from_seed(5));
        assert_eq!(composer.run(&mut out, &cancel).unwrap(), 200, "{kind:?}");
        assert_eq!(out.sink().inner.writes, 200);
    }
}
