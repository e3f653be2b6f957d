// Streaming WAV capture. The header goes out first with both size fields at
// u32::MAX; finish() seeks back and patches offsets 4 and 40.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::audio_api::SinkConfig;
use crate::error::{Error, Result};
use crate::shared::WAV_HEADER_LEN;

const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 40;
const SIZE_PLACEHOLDER: u32 = u32::MAX;
const FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 8;

pub struct WavCapture<W: Write + Seek> {
    inner: W,
    bytes_written: u64, // header included
}

impl WavCapture<BufWriter<File>> {
    // Create (or truncate) `path` and write the placeholder header.
    pub fn create(path: &Path, config: SinkConfig) -> Result<Self> {
        let file = File::create(path)
            .map_err(|e| Error::acquire_with(format!("wav file {}", path.display()), e))?;
        Self::new(BufWriter::new(file), config)
    }
}

impl<W: Write + Seek> WavCapture<W> {
    pub fn new(mut inner: W, config: SinkConfig) -> Result<Self> {
        write_header(&mut inner, &config).map_err(|e| Error::io("writing wav header", e))?;
        Ok(Self { inner, bytes_written: WAV_HEADER_LEN as u64 })
    }

    pub fn append(&mut self, pcm: &[u8]) -> Result<()> {
        self.inner.write_all(pcm).map_err(|e| Error::io("write() to wav", e))?;
        self.bytes_written += pcm.len() as u64;
        Ok(())
    }

    pub fn payload_len(&self) -> u64 {
        self.bytes_written - WAV_HEADER_LEN as u64
    }

    // Patch both size fields from the final byte count and hand back the writer.
    pub fn finish(mut self) -> Result<W> {
        let riff_size = clamp_u32(self.bytes_written - 8);
        let data_size = clamp_u32(self.payload_len());
        patch_u32(&mut self.inner, RIFF_SIZE_OFFSET, riff_size)?;
        patch_u32(&mut self.inner, DATA_SIZE_OFFSET, data_size)?;
        self.inner.flush().map_err(|e| Error::io("flushing wav", e))?;
        log::info!("wav finalised: {} bytes of pcm", data_size);
        Ok(self.inner)
    }
}

fn write_header<W: Write>(w: &mut W, config: &SinkConfig) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_u32::<LittleEndian>(SIZE_PLACEHOLDER)?;
    w.write_all(b"WAVE")?;

    w.write_all(b"fmt ")?;
    w.write_u32::<LittleEndian>(16)?;
    w.write_u16::<LittleEndian>(FORMAT_PCM)?;
    w.write_u16::<LittleEndian>(config.channels)?;
    w.write_u32::<LittleEndian>(config.sample_rate)?;
    w.write_u32::<LittleEndian>(config.byte_rate())?;
    w.write_u16::<LittleEndian>(config.block_align())?;
    w.write_u16::<LittleEndian>(BITS_PER_SAMPLE)?;

    w.write_all(b"data")?;
    w.write_u32::<LittleEndian>(SIZE_PLACEHOLDER)?;
    Ok(())
}

fn patch_u32<W: Write + Seek>(w: &mut W, offset: u64, value: u32) -> Result<()> {
    w.seek(SeekFrom::Start(offset)).map_err(|e| Error::io("lseek() in wav", e))?;
    w.write_u32::<LittleEndian>(value).map_err(|e| Error::io("patching wav header", e))
}

// past 4 GiB the sizes can't be represented; leave the field saturated
fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn le32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    fn le16(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap())
    }

    #[test]
    fn header_starts_with_placeholders() {
        let cap = WavCapture::new(Cursor::new(Vec::new()), SinkConfig::mono_u8(48000)).unwrap();
        let bytes = cap.inner.get_ref();
        assert_eq!(bytes.len(), WAV_HEADER_LEN as usize);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(le32(bytes, 4), u32::MAX);
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(le32(bytes, 16), 16);
        assert_eq!(le16(bytes, 20), 1);
        assert_eq!(le16(bytes, 22), 1);
        assert_eq!(le32(bytes, 24), 48000);
        assert_eq!(le32(bytes, 28), 48000);
        assert_eq!(le16(bytes, 32), 1);
        assert_eq!(le16(bytes, 34), 8);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(le32(bytes, 40), u32::MAX);
    }

    #[test]
    fn finish_patches_sizes() {
        let mut cap = WavCapture::new(Cursor::new(Vec::new()), SinkConfig::mono_u8(8000)).unwrap();
        cap.append(&[0; 100]).unwrap();
        cap.append(&[8; 23]).unwrap();
        assert_eq!(cap.payload_len(), 123);

        let bytes = cap.finish().unwrap().into_inner();
        assert_eq!(bytes.len(), 44 + 123);
        assert_eq!(le32(&bytes, 4), 123 + 36);
        assert_eq!(le32(&bytes, 40), 123);
        assert_eq!(bytes[44 + 100], 8);
    }

    #[test]
    fn empty_capture_is_a_valid_file() {
        let cap = WavCapture::new(Cursor::new(Vec::new()), SinkConfig::mono_u8(48000)).unwrap();
        let bytes = cap.finish().unwrap().into_inner();
        assert_eq!(le32(&bytes, 4), 36);
        assert_eq!(le32(&bytes, 40), 0);
    }

    #[test]
    fn hound_reads_the_patched_file() {
        let mut cap = WavCapture::new(Cursor::new(Vec::new()), SinkConfig::mono_u8(22050)).unwrap();
        cap.append(&[0, 0, 8, 8, 0, 0, 8, 8]).unwrap();
        let bytes = cap.finish().unwrap().into_inner();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 8);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.len(), 8);
        // hound recentres unsigned 8-bit samples around zero
        let samples: Vec<i8> = reader.samples::<i8>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![-128, -128, -120, -120, -128, -128, -120, -120]);
    }
}
