// crates/playback-core/src/types.rs
//
// Metadata shapes returned across the host boundary. Plain data, no ffmpeg.

/// Output pixel layout for decoded video frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    Rgba,
    Bgra,
}

/// Snapshot of the video stream, stable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_secs: f64,
    pub total_frames: u64,
    pub pixel_format: PixelFormat,
    pub is_live: bool,
    pub codec_name: String,
}

/// Snapshot of the audio stream, stable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    pub source_rate: u32,
    pub source_channels: u16,
    pub output_rate: u32,
    pub output_channels: u16,
    pub codec_name: String,
}

impl AudioInfo {
    pub fn new(source_rate: u32, source_channels: u16, codec_name: String) -> Self {
        Self {
            source_rate,
            source_channels,
            output_rate: crate::limits::OUTPUT_SAMPLE_RATE,
            output_channels: crate::limits::OUTPUT_CHANNELS,
            codec_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_info_new_fills_in_fixed_output_shape() {
        let info = AudioInfo::new(44_100, 1, "aac".into());
        assert_eq!(info.output_rate, 48_000);
        assert_eq!(info.output_channels, 2);
        assert_eq!(info.source_rate, 44_100);
        assert_eq!(info.source_channels, 1);
    }

    #[test]
    fn pixel_format_defaults_to_rgba() {
        assert_eq!(PixelFormat::default(), PixelFormat::Rgba);
    }
}
