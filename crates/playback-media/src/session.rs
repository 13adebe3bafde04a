// crates/playback-media/src/session.rs
//
// Owns the demuxer and both codec decoders for one open(). Pure decode
// logic — no locks, no threads. The decoder worker (worker.rs) drives this
// against the shared queue/clock under the concurrency model.

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::context::Context as CodecContext;
use ffmpeg::format::{input_with_dictionary, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::resampling::context::Context as SwrContext;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags as ScaleFlags};
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::format::sample::{Sample, Type as SampleType};
use ffmpeg::Dictionary;

use playback_core::limits::{OUTPUT_CHANNELS, OUTPUT_SAMPLE_RATE};
use playback_core::{AudioInfo, OpenOptions, PixelFormat, PlayerError, VideoInfo};

/// A decoded, RGBA-converted video frame plus its media-time PTS.
pub struct DecodedVideo {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub pts: f64,
}

/// A decoded, resampled (f32 interleaved stereo @ output rate) audio chunk.
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub pts: f64,
}

struct VideoTrack {
    stream_index: usize,
    decoder: ffmpeg::decoder::video::Video,
    scaler: SwsContext,
    time_base: ffmpeg::Rational,
}

struct AudioTrack {
    stream_index: usize,
    decoder: ffmpeg::decoder::audio::Audio,
    resampler: SwrContext,
    time_base: ffmpeg::Rational,
}

pub struct MediaSession {
    input: ffmpeg::format::context::Input,
    video: Option<VideoTrack>,
    audio: Option<AudioTrack>,
    pub video_info: Option<VideoInfo>,
    pub audio_info: Option<AudioInfo>,
    pub is_live: bool,
    pub duration_secs: f64,
}

fn to_dictionary(options: &OpenOptions) -> Dictionary<'static> {
    let mut dict = Dictionary::new();
    for (k, v) in options.iter() {
        dict.set(k, v);
    }
    dict
}

fn pts_to_secs(pts: i64, tb: ffmpeg::Rational) -> f64 {
    pts as f64 * tb.numerator() as f64 / tb.denominator() as f64
}

impl MediaSession {
    /// Opens `url` with `options`, discovers streams, and builds the pixel
    /// converter / resampler. Fails with `OpenFailed` if the input can't be
    /// opened, and `NoVideoStream` if neither a video nor an audio stream
    /// was found.
    pub fn open(url: &str, options: &OpenOptions) -> Result<Self, PlayerError> {
        let dict = to_dictionary(options);
        let mut input = input_with_dictionary(&url, dict)
            .map_err(|e| PlayerError::OpenFailed(e.to_string()))?;

        let video_stream_index = input.streams().best(Type::Video).map(|s| s.index());
        let audio_stream_index = input.streams().best(Type::Audio).map(|s| s.index());

        if video_stream_index.is_none() && audio_stream_index.is_none() {
            return Err(PlayerError::NoVideoStream);
        }

        let video = match video_stream_index {
            Some(idx) => Some(Self::open_video_track(&input, idx)?),
            None => None,
        };
        let audio = match audio_stream_index {
            Some(idx) => Some(Self::open_audio_track(&input, idx)?),
            None => None,
        };

        let raw_duration = input.duration();
        let is_live = raw_duration <= 0;
        let duration_secs = if is_live {
            0.0
        } else {
            raw_duration as f64 / ffmpeg::ffi::AV_TIME_BASE as f64
        };

        let video_info = video.as_ref().map(|v| VideoInfo {
            width: v.decoder.width(),
            height: v.decoder.height(),
            fps: {
                let fr = input.stream(v.stream_index).map(|s| s.avg_frame_rate());
                fr.map(|r| r.numerator() as f64 / r.denominator().max(1) as f64)
                    .unwrap_or(0.0)
            },
            duration_secs,
            total_frames: input
                .stream(v.stream_index)
                .map(|s| s.frames().max(0) as u64)
                .unwrap_or(0),
            pixel_format: PixelFormat::Rgba,
            is_live,
            codec_name: v
                .decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        });

        let audio_info = audio.as_ref().map(|a| {
            AudioInfo::new(
                a.decoder.rate(),
                a.decoder.channels(),
                a.decoder
                    .codec()
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            )
        });

        Ok(Self {
            input,
            video,
            audio,
            video_info,
            audio_info,
            is_live,
            duration_secs,
        })
    }

    fn open_video_track(
        input: &ffmpeg::format::context::Input,
        stream_index: usize,
    ) -> Result<VideoTrack, PlayerError> {
        let stream = input
            .stream(stream_index)
            .ok_or_else(|| PlayerError::NoVideoStream)?;
        let time_base = stream.time_base();
        let ctx = CodecContext::from_parameters(stream.parameters())
            .map_err(|e| PlayerError::CodecOpenFailed(e.to_string()))?;
        let decoder = ctx
            .decoder()
            .video()
            .map_err(|e| PlayerError::CodecOpenFailed(e.to_string()))?;
        let scaler = SwsContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGBA,
            decoder.width(),
            decoder.height(),
            ScaleFlags::BILINEAR,
        )
        .map_err(|e| PlayerError::CodecOpenFailed(e.to_string()))?;

        Ok(VideoTrack {
            stream_index,
            decoder,
            scaler,
            time_base,
        })
    }

    fn open_audio_track(
        input: &ffmpeg::format::context::Input,
        stream_index: usize,
    ) -> Result<AudioTrack, PlayerError> {
        let stream = input
            .stream(stream_index)
            .ok_or_else(|| PlayerError::NoAudioStream)?;
        let time_base = stream.time_base();
        let ctx = CodecContext::from_parameters(stream.parameters())
            .map_err(|e| PlayerError::CodecOpenFailed(e.to_string()))?;
        let decoder = ctx
            .decoder()
            .audio()
            .map_err(|e| PlayerError::CodecOpenFailed(e.to_string()))?;

        let output_layout = if OUTPUT_CHANNELS == 1 {
            ChannelLayout::MONO
        } else {
            ChannelLayout::STEREO
        };
        let resampler = SwrContext::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            Sample::F32(SampleType::Packed),
            output_layout,
            OUTPUT_SAMPLE_RATE,
        )
        .map_err(|e| PlayerError::CodecOpenFailed(e.to_string()))?;

        Ok(AudioTrack {
            stream_index,
            decoder,
            resampler,
            time_base,
        })
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Reads and decodes exactly one compressed packet, returning any
    /// frames it produced. A packet normally yields at most one video frame
    /// and/or audio chunk; B-frame reordering can occasionally yield zero.
    /// Returns `Ok(None)` at clean end of stream, and `Err` on a genuine
    /// demuxer read failure — the two are distinguished by reading the
    /// packet directly instead of through the `packets()` convenience
    /// iterator, which collapses every `Err` (including non-EOF I/O
    /// failures) into iterator exhaustion.
    pub fn decode_next_packet(
        &mut self,
    ) -> Result<Option<(Vec<DecodedVideo>, Vec<DecodedAudio>)>, PlayerError> {
        let mut packet = ffmpeg::Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => {}
            Err(ffmpeg::Error::Eof) => return Ok(None),
            Err(e) => return Err(PlayerError::DecodeFailed(e.to_string())),
        }
        let stream_index = packet.stream();

        let mut videos = Vec::new();
        let mut audios = Vec::new();

        if let Some(video) = &mut self.video {
            if stream_index == video.stream_index {
                if video.decoder.send_packet(&packet).is_ok() {
                    let mut frame = ffmpeg::util::frame::video::Video::empty();
                    while video.decoder.receive_frame(&mut frame).is_ok() {
                        let pts = frame.pts().or_else(|| frame.timestamp()).unwrap_or(0);
                        let pts_secs = pts_to_secs(pts, video.time_base);

                        let mut rgba = ffmpeg::util::frame::video::Video::empty();
                        if video.scaler.run(&frame, &mut rgba).is_ok() {
                            let stride = rgba.stride(0);
                            let width = rgba.width();
                            let height = rgba.height();
                            let raw = rgba.data(0);
                            let row_bytes = width as usize * 4;
                            let data: Vec<u8> = (0..height as usize)
                                .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
                                .copied()
                                .collect();
                            videos.push(DecodedVideo {
                                data,
                                width,
                                height,
                                stride: row_bytes,
                                pts: pts_secs,
                            });
                        }
                    }
                }
                return Ok(Some((videos, audios)));
            }
        }

        if let Some(audio) = &mut self.audio {
            if stream_index == audio.stream_index {
                if audio.decoder.send_packet(&packet).is_ok() {
                    let mut frame = ffmpeg::util::frame::audio::Audio::empty();
                    while audio.decoder.receive_frame(&mut frame).is_ok() {
                        let pts = frame.pts().or_else(|| frame.timestamp()).unwrap_or(0);
                        let pts_secs = pts_to_secs(pts, audio.time_base);

                        let mut resampled = ffmpeg::util::frame::audio::Audio::empty();
                        if audio.resampler.run(&frame, &mut resampled).is_ok() {
                            audios.push(DecodedAudio {
                                samples: extract_f32_samples(&resampled),
                                pts: pts_secs,
                            });
                        }
                    }
                }
            }
        }

        Ok(Some((videos, audios)))
    }

    /// Seeks to the beginning and flushes both decoders. Used for loop wrap
    /// and explicit `seek(0)`.
    pub fn seek_to(&mut self, target_secs: f64) -> Result<(), PlayerError> {
        if self.is_live {
            return Err(PlayerError::SeekFailed("cannot seek a live source".into()));
        }
        let ts = (target_secs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
        self.input
            .seek(ts, ..ts)
            .map_err(|e| PlayerError::SeekFailed(e.to_string()))?;
        if let Some(video) = &mut self.video {
            video.decoder.flush();
        }
        if let Some(audio) = &mut self.audio {
            audio.decoder.flush();
        }
        Ok(())
    }
}

fn extract_f32_samples(frame: &ffmpeg::util::frame::audio::Audio) -> Vec<f32> {
    let channels = frame.channels() as usize;
    let sample_count = frame.samples() * channels;
    let data = frame.data(0);
    let mut samples = Vec::with_capacity(sample_count);
    for i in 0..sample_count {
        let offset = i * 4;
        if offset + 4 <= data.len() {
            samples.push(f32::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]));
        }
    }
    samples
}
