//! File decoding through symphonia

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{
    CodecRegistry, CodecType, Decoder, DecoderOptions, CODEC_TYPE_NULL, CODEC_TYPE_PCM_F32LE,
    CODEC_TYPE_PCM_S16LE,
};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::{Hint, Probe};

use super::{AudioFileError, Resolution, SampleSource, SourceOpener, StreamInfo};

/// Decoders every WAV file needs
const REQUIRED_CODECS: [CodecType; 2] = [CODEC_TYPE_PCM_S16LE, CODEC_TYPE_PCM_F32LE];

/// Codec and format registries used to open files
///
/// [`AudioBackend::init`] uses symphonia's default registries, which always
/// carry the PCM decoders. The check is a sanity guard for backends built
/// over custom registries with [`AudioBackend::with_registries`].
pub struct AudioBackend {
    codecs: &'static CodecRegistry,
    probe: &'static Probe,
}

impl AudioBackend {
    pub fn init() -> Result<Self, AudioFileError> {
        Self::with_registries(symphonia::default::get_codecs(), symphonia::default::get_probe())
    }

    /// Backend over the given registries, failing if a PCM decoder is missing
    pub fn with_registries(
        codecs: &'static CodecRegistry,
        probe: &'static Probe,
    ) -> Result<Self, AudioFileError> {
        for codec in REQUIRED_CODECS {
            if codecs.get_codec(codec).is_none() {
                return Err(AudioFileError::BackendInit(format!(
                    "no decoder registered for codec {}",
                    codec
                )));
            }
        }
        log::info!("AudioBackend: codec registry ready");
        Ok(Self { codecs, probe })
    }

    /// Open a file for chunked decoding
    pub fn open(&self, path: &Path) -> Result<SymphoniaSource, AudioFileError> {
        SymphoniaSource::open_with(self.codecs, self.probe, path)
    }
}

impl SourceOpener for AudioBackend {
    fn open_source(&self, path: &Path) -> Result<Box<dyn SampleSource>, AudioFileError> {
        Ok(Box::new(self.open(path)?))
    }
}

/// Probe a file and return its format reader
fn probe(probe: &Probe, path: &Path) -> Result<Box<dyn FormatReader>, AudioFileError> {
    let file = File::open(path).map_err(|source| AudioFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = probe
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioFileError::UnsupportedFormat(e.to_string()))?;

    Ok(probed.format)
}

/// Frame count of a track
///
/// Containers that don't store the length up front are scanned packet by
/// packet with a second reader.
fn stream_frames(
    prober: &Probe,
    path: &Path,
    track_id: u32,
    n_frames: Option<u64>,
) -> Result<u64, AudioFileError> {
    match n_frames {
        Some(frames) => Ok(frames),
        None => {
            log::debug!("stream_frames: no frame count in {:?}, scanning packets", path);
            count_frames(prober, path, track_id)
        }
    }
}

fn count_frames(prober: &Probe, path: &Path, track_id: u32) -> Result<u64, AudioFileError> {
    let mut format = probe(prober, path)?;
    let mut frames = 0u64;

    loop {
        match format.next_packet() {
            Ok(packet) => {
                if packet.track_id() == track_id {
                    frames += packet.dur;
                }
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => {
                return Err(AudioFileError::UnsupportedFormat(format!(
                    "could not determine stream length: {}",
                    e
                )))
            }
        }
    }

    log::debug!("count_frames: {:?} has {} frames", path, frames);
    Ok(frames)
}

/// Decoded stream of one audio file
///
/// All channels are interleaved into a single flat stream of `f32` samples.
/// The file is closed when the source is dropped.
pub struct SymphoniaSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    info: StreamInfo,
    sample_buf: Option<SampleBuffer<f32>>,
    sample_buf_layout: Option<(u64, SignalSpec)>,
    pending: Vec<f32>,
    pending_pos: usize,
    finished: bool,
}

impl SymphoniaSource {
    /// Open with symphonia's default registries
    pub fn open(path: &Path) -> Result<Self, AudioFileError> {
        Self::open_with(symphonia::default::get_codecs(), symphonia::default::get_probe(), path)
    }

    fn open_with(codecs: &CodecRegistry, prober: &Probe, path: &Path) -> Result<Self, AudioFileError> {
        let format = probe(prober, path)?;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioFileError::NoAudioTrack(path.to_path_buf()))?;

        let track_id = track.id;
        let params = track.codec_params.clone();

        let decoder = codecs
            .make(&params, &DecoderOptions::default())
            .map_err(|e| AudioFileError::UnsupportedFormat(e.to_string()))?;

        let channels = params.channels.map(|c| c.count() as u16).unwrap_or(1);
        let frames = stream_frames(prober, path, track_id, params.n_frames)?;

        let info = StreamInfo {
            total_samples: frames * channels as u64,
            sample_rate: params.sample_rate.unwrap_or(0),
            channels,
            resolution: Resolution::from_bits(params.bits_per_sample),
        };

        log::info!(
            "SymphoniaSource: opened {:?} ({} frames, {} ch, {} Hz)",
            path,
            frames,
            info.channels,
            info.sample_rate
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            info,
            sample_buf: None,
            sample_buf_layout: None,
            pending: Vec::new(),
            pending_pos: 0,
            finished: false,
        })
    }

    /// Decode the next packet of our track into `pending`
    ///
    /// Returns `Ok(false)` once the stream is exhausted.
    fn decode_next(&mut self) -> Result<bool, AudioFileError> {
        if self.finished {
            return Ok(false);
        }

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    self.finished = true;
                    return Ok(false);
                }
                Err(e) => return Err(AudioFileError::Read(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let layout = (decoded.capacity() as u64, *decoded.spec());
                    if self.sample_buf_layout != Some(layout) {
                        self.sample_buf = Some(SampleBuffer::new(layout.0, layout.1));
                        self.sample_buf_layout = Some(layout);
                    }

                    self.pending.clear();
                    self.pending_pos = 0;
                    if let Some(buf) = self.sample_buf.as_mut() {
                        buf.copy_interleaved_ref(decoded);
                        self.pending.extend_from_slice(buf.samples());
                    }
                    return Ok(true);
                }
                Err(SymphoniaError::DecodeError(msg)) => {
                    // Corrupt packet, the stream can continue
                    log::warn!("Error decoding packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(AudioFileError::Read(e.to_string())),
            }
        }
    }
}

impl SampleSource for SymphoniaSource {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn read_chunk(&mut self, buf: &mut [f32]) -> Result<usize, AudioFileError> {
        let mut filled = 0;

        while filled < buf.len() {
            if self.pending_pos >= self.pending.len() {
                if !self.decode_next()? {
                    break;
                }
                continue;
            }

            let available = &self.pending[self.pending_pos..];
            let n = available.len().min(buf.len() - filled);
            buf[filled..filled + n].copy_from_slice(&available[..n]);
            filled += n;
            self.pending_pos += n;
        }

        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn write_wav(path: &Path, channels: u16, frames: usize, value: i16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..frames * channels as usize {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_backend_init() {
        assert!(AudioBackend::init().is_ok());
    }

    #[test]
    fn test_open_wav_reports_stream_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 800, 8192);

        let source = AudioBackend::init().unwrap().open(&path).unwrap();
        let info = source.info();
        assert_eq!(info.total_samples, 1600);
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(info.resolution, Resolution::Short);
        assert_eq!(info.byte_len(), 6400);
    }

    #[test]
    fn test_read_chunks_until_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, 800, 8192);

        let mut source = SymphoniaSource::open(&path).unwrap();
        let mut buf = vec![0.0f32; 300];
        let mut counts = Vec::new();
        loop {
            let n = source.read_chunk(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            for &sample in &buf[..n] {
                assert_relative_eq!(sample, 0.25, epsilon = 1e-4);
            }
            counts.push(n);
        }

        assert_eq!(counts, vec![300, 300, 200]);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let result = SymphoniaSource::open(Path::new("/nonexistent/track.wav"));
        assert!(matches!(result, Err(AudioFileError::Io { .. })));
    }

    #[test]
    fn test_open_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "definitely not audio").unwrap();

        let result = SymphoniaSource::open(&path);
        assert!(matches!(result, Err(AudioFileError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_backend_rejects_registry_without_pcm() {
        let empty: &'static CodecRegistry = Box::leak(Box::new(CodecRegistry::new()));
        let result = AudioBackend::with_registries(empty, symphonia::default::get_probe());
        assert!(matches!(result, Err(AudioFileError::BackendInit(_))));
    }

    #[test]
    fn test_packet_scan_counts_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 5000, 8192);

        let prober = symphonia::default::get_probe();
        let format = probe(prober, &path).unwrap();
        let track_id = format.default_track().unwrap().id;

        // No frame count in the header: every packet is walked
        assert_eq!(stream_frames(prober, &path, track_id, None).unwrap(), 5000);
        // A stored frame count is trusted as is
        assert_eq!(stream_frames(prober, &path, track_id, Some(42)).unwrap(), 42);
        // Packets of other tracks don't count
        assert_eq!(count_frames(prober, &path, track_id + 1).unwrap(), 0);
    }

    #[test]
    fn test_backend_opens_through_trait() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, 100, -8192);

        let backend = AudioBackend::init().unwrap();
        let mut source = backend.open_source(&path).unwrap();
        assert_eq!(source.info().total_samples, 100);

        let mut buf = vec![0.0f32; 100];
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 100);
        assert_relative_eq!(buf[0], -0.25, epsilon = 1e-4);
    }
}
