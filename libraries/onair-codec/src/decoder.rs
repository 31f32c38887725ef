/// In-memory audio decoder built on Symphonia
use crate::error::{CodecError, Result};
use onair_core::{AudioBuffer, AudioDecoder, AudioFormat, SampleRate};
use onair_dsp::{normalize, Int24, PcmSample};
use std::io::Cursor;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "wave", "flac", "mp3", "ogg", "oga", "m4a", "mp4", "aac"];

/// Decoder for uploaded files
///
/// Supports: WAV, FLAC, MP3, OGG/Vorbis, AAC/M4A
///
/// Every channel of the default track is kept; nothing is downmixed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a complete file held in memory
    ///
    /// # Errors
    /// `Decode` for unrecognized containers, missing tracks, or a stream
    /// whose layout changes mid-way.
    pub fn decode_bytes(&self, bytes: &[u8], extension_hint: Option<&str>) -> Result<AudioBuffer> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = extension_hint {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| CodecError::decode(format!("Failed to probe input: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| CodecError::decode("No audio tracks found"))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| CodecError::decode(format!("Failed to create decoder: {}", e)))?;

        let mut samples = Vec::new();
        let mut bits_per_sample = None;
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(CodecError::decode(format!("Error reading packet: {}", e)));
                }
            };

            // Skip packets that are not for the default track
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    // A corrupt frame is dropped; the rest of the stream is still usable
                    tracing::warn!(error = msg, "Skipping undecodable packet");
                    skipped_packets += 1;
                    continue;
                }
                Err(e) => return Err(CodecError::decode(format!("Decode error: {}", e))),
            };

            let spec = *decoded.spec();
            let packet_channels = spec.channels.count() as u16;
            if let Some(expected) = channels {
                if expected != packet_channels && !samples.is_empty() {
                    return Err(CodecError::decode(format!(
                        "Channel count changed mid-stream ({} -> {})",
                        expected, packet_channels
                    )));
                }
            }
            channels = Some(packet_channels);
            let rate = *sample_rate.get_or_insert(spec.rate);

            let buffer = convert_packet(decoded, packet_channels, rate)?;
            bits_per_sample.get_or_insert(buffer.format.bits_per_sample);
            samples.extend_from_slice(&buffer.samples);
        }

        let channels = channels.ok_or_else(|| CodecError::decode("Unknown channel layout"))?;
        let sample_rate = sample_rate.ok_or_else(|| CodecError::decode("Unknown sample rate"))?;

        tracing::debug!(
            channels,
            sample_rate,
            frames = samples.len() / channels.max(1) as usize,
            skipped_packets,
            "Decoded input"
        );

        let format = AudioFormat::new(
            SampleRate::new(sample_rate),
            channels,
            bits_per_sample.unwrap_or(32),
        );
        AudioBuffer::try_new(samples, format).map_err(|e| CodecError::decode(e.to_string()))
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&mut self, bytes: &[u8], extension_hint: Option<&str>) -> onair_core::Result<AudioBuffer> {
        Ok(self.decode_bytes(bytes, extension_hint)?)
    }

    fn supports_extension(&self, extension: &str) -> bool {
        SUPPORTED_EXTENSIONS.contains(&extension.to_lowercase().as_str())
    }
}

/// Route one decoded packet through the sample normalizer
fn convert_packet(decoded: AudioBufferRef<'_>, channels: u16, sample_rate: u32) -> Result<AudioBuffer> {
    let buffer = match decoded {
        AudioBufferRef::U8(buf) => normalize(&interleave(&buf, |s| s), channels, sample_rate),
        AudioBufferRef::U16(buf) => normalize(&interleave(&buf, |s| s), channels, sample_rate),
        AudioBufferRef::U24(buf) => normalize(
            // Offset-binary: move the midpoint to zero, then treat as signed
            &interleave(&buf, |s| Int24(s.inner() as i32 - 8_388_608)),
            channels,
            sample_rate,
        ),
        AudioBufferRef::U32(buf) => normalize(&interleave(&buf, |s| s), channels, sample_rate),
        AudioBufferRef::S8(buf) => normalize(&interleave(&buf, |s| s), channels, sample_rate),
        AudioBufferRef::S16(buf) => normalize(&interleave(&buf, |s| s), channels, sample_rate),
        AudioBufferRef::S24(buf) => {
            normalize(&interleave(&buf, |s| Int24(s.inner())), channels, sample_rate)
        }
        AudioBufferRef::S32(buf) => normalize(&interleave(&buf, |s| s), channels, sample_rate),
        AudioBufferRef::F32(buf) => normalize(&interleave(&buf, |s| s), channels, sample_rate),
        AudioBufferRef::F64(buf) => normalize(&interleave(&buf, |s| s), channels, sample_rate),
    };
    Ok(buffer?)
}

/// Interleave Symphonia's planar channels, mapping each sample
fn interleave<T, P, F>(buf: &symphonia::core::audio::AudioBuffer<T>, convert: F) -> Vec<P>
where
    T: Sample,
    P: PcmSample,
    F: Fn(T) -> P,
{
    let planes: Vec<&[T]> = (0..buf.spec().channels.count()).map(|c| buf.chan(c)).collect();
    let mut out = Vec::with_capacity(buf.frames() * planes.len());
    for i in 0..buf.frames() {
        for plane in &planes {
            out.push(convert(plane[i]));
        }
    }
    out
}
