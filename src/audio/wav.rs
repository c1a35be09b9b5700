//! WAV input via symphonia
//!
//! Only mono, signed 16-bit linear PCM is accepted. Symphonia hands out
//! packets of whatever size the container uses, so decoded samples are kept
//! in a small carry-over buffer and handed to the driver in exact windows.

use super::SampleSource;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_PCM_S16LE};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

pub struct WavSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    total_samples: u64,
    sample_buf: Option<SampleBuffer<i16>>,
    pending: Vec<i16>,
    pending_pos: usize,
    finished: bool,
}

impl WavSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_media(Box::new(file))
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_media(Box::new(Cursor::new(data)))
    }

    fn from_media(media: Box<dyn MediaSource>) -> Result<Self> {
        let mss = MediaSourceStream::new(media, Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

        let format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| Error::UnsupportedFormat("no audio track".into()))?;
        let params = &track.codec_params;

        if params.codec != CODEC_TYPE_PCM_S16LE {
            return Err(Error::UnsupportedFormat(
                "expected signed 16-bit linear PCM".into(),
            ));
        }
        let channels = params.channels.map(|c| c.count()).unwrap_or(0);
        if channels != 1 {
            return Err(Error::UnsupportedFormat(format!(
                "expected 1 channel, found {}",
                channels
            )));
        }
        let sample_rate = params
            .sample_rate
            .ok_or_else(|| Error::UnsupportedFormat("missing sample rate".into()))?;
        let total_samples = params.n_frames.unwrap_or(0);
        let track_id = track.id;

        let decoder = symphonia::default::get_codecs()
            .make(params, &DecoderOptions::default())
            .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

        log::info!(
            "opened WAV: {} Hz, {} samples ({:.2}s)",
            sample_rate,
            total_samples,
            total_samples as f64 / sample_rate as f64
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            total_samples,
            sample_buf: None,
            pending: Vec::new(),
            pending_pos: 0,
            finished: false,
        })
    }

    /// Decode the next packet into `pending`. Returns false at end of stream.
    fn decode_next(&mut self) -> Result<bool> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(false);
                }
                Err(e) => return Err(Error::Decode(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(msg)) => {
                    log::warn!("skipping undecodable packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(Error::Decode(e.to_string())),
            };

            let spec = *decoded.spec();
            let frames = decoded.capacity();
            if self
                .sample_buf
                .as_ref()
                .is_some_and(|b| b.capacity() < frames * spec.channels.count())
            {
                self.sample_buf = None;
            }
            let buf = self
                .sample_buf
                .get_or_insert_with(|| SampleBuffer::new(frames as u64, spec));
            buf.copy_interleaved_ref(decoded);

            if buf.samples().is_empty() {
                continue;
            }
            self.pending.clear();
            self.pending.extend_from_slice(buf.samples());
            self.pending_pos = 0;
            return Ok(true);
        }
    }
}

impl SampleSource for WavSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_samples(&self) -> u64 {
        self.total_samples
    }

    fn read_window(&mut self, buf: &mut [i16]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            if self.pending_pos >= self.pending.len() {
                if self.finished || !self.decode_next()? {
                    self.finished = true;
                    break;
                }
            }
            let available = &self.pending[self.pending_pos..];
            let count = available.len().min(buf.len() - filled);
            buf[filled..filled + count].copy_from_slice(&available[..count]);
            self.pending_pos += count;
            filled += count;
        }
        Ok(filled)
    }
}
