//! WAV loading and re-encoding for the recognition stage.

use std::io::Cursor;
use std::path::Path;

use crate::error::AudioError;
use crate::utils::config::AudioConsts;

/// Decoded recording handed to a [`Recognizer`](crate::recognize::Recognizer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioClip {
    /// File name the clip was read from (for logging and test doubles).
    pub name: String,
    /// Interleaved 16-bit PCM.
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// Read a WAV file into 16-bit samples. Wider integer and float formats are scaled down.
pub fn read_wav(path: &Path) -> Result<AudioClip, AudioError> {
    let mut reader = hound::WavReader::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = reader.spec();
    let samples_err = |source: hound::Error| AudioError::Samples {
        path: path.to_path_buf(),
        source,
    };

    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, bits) if bits <= 16 => reader
            .samples::<i16>()
            .collect::<Result<_, _>>()
            .map_err(samples_err)?,
        (hound::SampleFormat::Int, bits) => {
            let shift = u32::from(bits - 16);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<Result<_, _>>()
                .map_err(samples_err)?
        }
        (hound::SampleFormat::Float, _) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()
            .map_err(samples_err)?,
    };

    Ok(AudioClip {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Encode a clip as an in-memory 16-bit PCM WAV file.
pub fn to_wav_bytes(clip: &AudioClip) -> Result<Vec<u8>, AudioError> {
    let spec = hound::WavSpec {
        channels: clip.channels,
        sample_rate: clip.sample_rate,
        bits_per_sample: AudioConsts::BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &s in &clip.samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Write a 16-bit PCM WAV file. Used by tests and fixtures.
pub fn write_wav(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    samples: &[i16],
) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: AudioConsts::BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}
