use std::path::{Path, PathBuf};

use crate::shared::frame_sequence::FrameSequence;
use crate::video::domain::video_toolkit::{ToolkitError, VideoToolkit};

/// `VideoToolkit` backed by ffmpeg-next (libavformat + libavcodec).
///
/// Frames cross the boundary as RGB24 PNG files; encoded video uses MPEG4
/// at YUV420P for broad container compatibility.
pub struct FfmpegToolkit;

impl FfmpegToolkit {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoToolkit for FfmpegToolkit {
    fn detect_fps(&self, video: &Path) -> Result<(u32, f64), ToolkitError> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(video)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("no video stream found")?;

        let rate = stream.rate();
        if rate.denominator() == 0 || rate.numerator() <= 0 {
            return Err("video reports no frame rate".into());
        }
        let exact = rate.numerator() as f64 / rate.denominator() as f64;
        Ok((exact.round() as u32, exact))
    }

    fn set_fps(&self, input: &Path, output: &Path, target_fps: u32) -> Result<(), ToolkitError> {
        ffmpeg_next::init()?;
        if target_fps == 0 {
            return Err("target fps must be positive".into());
        }
        let (_, input_fps) = self.detect_fps(input)?;

        let mut ictx = ffmpeg_next::format::input(input)?;
        let video_stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("no video stream found")?;
        let video_index = video_stream.index();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(video_stream.parameters())?;
        let mut decoder = codec_ctx.decoder().video()?;
        let width = decoder.width();
        let height = decoder.height();

        let mut octx = ffmpeg_next::format::output(output)?;
        let mut encoder = open_video_encoder(&mut octx, width, height, target_fps as f64)?;

        // Audio is stream-copied so the re-timed file still carries its
        // original track.
        let audio = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => {
                let mut ost = octx.add_stream(ffmpeg_next::encoder::find(
                    ffmpeg_next::codec::Id::None,
                ))?;
                ost.set_parameters(stream.parameters());
                unsafe {
                    (*ost.parameters().as_mut_ptr()).codec_tag = 0;
                }
                Some((stream.index(), stream.time_base(), ost.index()))
            }
            None => None,
        };

        octx.write_header()?;

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;
        let mut pacer = FramePacer::new(input_fps, target_fps as f64);

        for (stream, mut packet) in ictx.packets() {
            if stream.index() == video_index {
                if decoder.send_packet(&packet).is_err() {
                    continue;
                }
                let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
                while decoder.receive_frame(&mut decoded).is_ok() {
                    let mut yuv = ffmpeg_next::util::frame::video::Video::empty();
                    scaler.run(&decoded, &mut yuv)?;
                    pacer.push(&mut yuv, &mut encoder, &mut octx)?;
                }
            } else if let Some((audio_index, audio_tb, audio_ost)) = audio {
                if stream.index() != audio_index {
                    continue;
                }
                let ost_tb = octx
                    .stream(audio_ost)
                    .ok_or("missing audio output stream")?
                    .time_base();
                packet.rescale_ts(audio_tb, ost_tb);
                packet.set_position(-1);
                packet.set_stream(audio_ost);
                packet.write_interleaved(&mut octx)?;
            }
        }

        let _ = decoder.send_eof();
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            let mut yuv = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&decoded, &mut yuv)?;
            pacer.push(&mut yuv, &mut encoder, &mut octx)?;
        }

        encoder.flush(&mut octx)?;
        octx.write_trailer()?;
        log::debug!(
            "re-timed {} to {target_fps} fps at {}",
            input.display(),
            output.display()
        );
        Ok(())
    }

    fn extract_frames(&self, video: &Path, out_dir: &Path) -> Result<(), ToolkitError> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(video)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("no video stream found")?;
        let stream_index = stream.index();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let mut decoder = codec_ctx.decoder().video()?;
        let width = decoder.width();
        let height = decoder.height();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let mut written = 0usize;
        for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index {
                continue;
            }
            if decoder.send_packet(&packet).is_err() {
                continue;
            }
            save_decoded_frames(&mut decoder, &mut scaler, width, height, out_dir, &mut written)?;
        }
        let _ = decoder.send_eof();
        save_decoded_frames(&mut decoder, &mut scaler, width, height, out_dir, &mut written)?;

        log::debug!("extracted {written} frames from {}", video.display());
        Ok(())
    }

    fn create_video(
        &self,
        base_name: &str,
        fps: f64,
        frames_dir: &Path,
    ) -> Result<PathBuf, ToolkitError> {
        ffmpeg_next::init()?;

        let frames = FrameSequence::scan(frames_dir)?;
        if frames.is_empty() {
            return Err(format!("no frames to assemble in {}", frames_dir.display()).into());
        }
        let output = frames_dir.join(format!("{base_name}.mp4"));

        let first = image::open(&frames.paths()[0])?.to_rgb8();
        let (width, height) = first.dimensions();

        let mut octx = ffmpeg_next::format::output(&output)?;
        let mut encoder = open_video_encoder(&mut octx, width, height, fps)?;
        octx.write_header()?;

        encoder.write_rgb(first.as_raw(), &mut octx)?;
        for path in &frames.paths()[1..] {
            let frame = image::open(path)?.to_rgb8();
            if frame.dimensions() != (width, height) {
                return Err(format!("frame size mismatch: {}", path.display()).into());
            }
            encoder.write_rgb(frame.as_raw(), &mut octx)?;
        }
        encoder.flush(&mut octx)?;
        octx.write_trailer()?;

        log::debug!("assembled {} frames into {}", frames.len(), output.display());
        Ok(output)
    }

    fn add_audio(
        &self,
        frames_dir: &Path,
        original: &Path,
        original_filename: &str,
        keep_frames: bool,
        output: &Path,
    ) -> Result<(), ToolkitError> {
        ffmpeg_next::init()?;

        let stem = Path::new(original_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or("original filename has no stem")?;
        let silent = frames_dir.join(format!("{stem}.mp4"));
        if !silent.is_file() {
            return Err(format!("missing assembled video: {}", silent.display()).into());
        }

        let has_audio = ffmpeg_next::format::input(original)?
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .is_some();

        if has_audio {
            mux_streams(&silent, original, output)?;
        } else {
            log::debug!("{} has no audio stream; copying video only", original.display());
            std::fs::copy(&silent, output)?;
        }

        if !keep_frames {
            std::fs::remove_dir_all(frames_dir)?;
        }
        Ok(())
    }
}

/// Adds an MPEG4 video stream to `octx` and returns its opened encoder.
///
/// The stream must be added before any audio stream so it lands at index 0.
fn open_video_encoder(
    octx: &mut ffmpeg_next::format::context::Output,
    width: u32,
    height: u32,
    fps: f64,
) -> Result<VideoEncoder, ToolkitError> {
    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
        .ok_or("MPEG4 encoder not found")?;

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()?;
    encoder_ctx.set_width(width);
    encoder_ctx.set_height(height);
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);

    let rate = fps_rational(fps);
    let time_base = ffmpeg_next::Rational(rate.denominator(), rate.numerator());
    encoder_ctx.set_time_base(time_base);
    encoder_ctx.set_frame_rate(Some(rate));

    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }

    let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
    let mut ost = octx.add_stream(Some(codec))?;
    ost.set_parameters(&encoder);

    Ok(VideoEncoder {
        encoder,
        scaler: None,
        width,
        height,
        time_base,
        next_pts: 0,
    })
}

/// Expresses an fps value as a rational, keeping fractional rates like
/// 29.97 representable.
fn fps_rational(fps: f64) -> ffmpeg_next::Rational {
    let rounded = fps.round();
    if rounded <= 0.0 {
        return ffmpeg_next::Rational(30, 1);
    }
    if (fps - rounded).abs() < 1e-3 {
        ffmpeg_next::Rational(rounded as i32, 1)
    } else {
        ffmpeg_next::Rational((fps * 1000.0).round() as i32, 1000)
    }
}

/// MPEG4 encoder for one output stream, fed tightly-packed RGB24 or
/// pre-scaled YUV frames with explicit timestamps.
struct VideoEncoder {
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    time_base: ffmpeg_next::Rational,
    next_pts: i64,
}

impl VideoEncoder {
    fn write_rgb(
        &mut self,
        pixels: &[u8],
        octx: &mut ffmpeg_next::format::context::Output,
    ) -> Result<(), ToolkitError> {
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );
        let row_len = self.width as usize * 3;
        let stride = rgb_frame.stride(0);
        let data = rgb_frame.data_mut(0);
        for row in 0..self.height as usize {
            let dst = row * stride;
            data[dst..dst + row_len].copy_from_slice(&pixels[row * row_len..(row + 1) * row_len]);
        }

        if self.scaler.is_none() {
            self.scaler = Some(ffmpeg_next::software::scaling::Context::get(
                ffmpeg_next::format::Pixel::RGB24,
                self.width,
                self.height,
                ffmpeg_next::format::Pixel::YUV420P,
                self.width,
                self.height,
                ffmpeg_next::software::scaling::Flags::BILINEAR,
            )?);
        }
        let scaler = self.scaler.as_mut().ok_or("scaler not initialized")?;
        let mut yuv = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv)?;

        let pts = self.next_pts;
        self.write_yuv(&mut yuv, pts, octx)?;
        self.next_pts += 1;
        Ok(())
    }

    fn write_yuv(
        &mut self,
        frame: &mut ffmpeg_next::util::frame::video::Video,
        pts: i64,
        octx: &mut ffmpeg_next::format::context::Output,
    ) -> Result<(), ToolkitError> {
        frame.set_pts(Some(pts));
        self.encoder.send_frame(frame)?;
        self.drain(octx)
    }

    fn flush(
        &mut self,
        octx: &mut ffmpeg_next::format::context::Output,
    ) -> Result<(), ToolkitError> {
        self.encoder.send_eof()?;
        self.drain(octx)
    }

    fn drain(
        &mut self,
        octx: &mut ffmpeg_next::format::context::Output,
    ) -> Result<(), ToolkitError> {
        let ost_time_base = octx.stream(0).ok_or("missing output stream")?.time_base();
        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(self.time_base, ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

/// Index-based dup/drop resampling from a constant input rate to a target
/// rate: input frame `i` covers the interval `[i, i+1) / input_fps` and is
/// emitted once per output tick falling inside it.
struct FramePacer {
    input_fps: f64,
    target_fps: f64,
    seen: i64,
    emitted: i64,
}

impl FramePacer {
    fn new(input_fps: f64, target_fps: f64) -> Self {
        Self {
            input_fps,
            target_fps,
            seen: 0,
            emitted: 0,
        }
    }

    fn push(
        &mut self,
        frame: &mut ffmpeg_next::util::frame::video::Video,
        encoder: &mut VideoEncoder,
        octx: &mut ffmpeg_next::format::context::Output,
    ) -> Result<(), ToolkitError> {
        let input_end = (self.seen + 1) as f64 / self.input_fps;
        while (self.emitted as f64) / self.target_fps < input_end {
            encoder.write_yuv(frame, self.emitted, octx)?;
            self.emitted += 1;
        }
        self.seen += 1;
        Ok(())
    }
}

fn save_decoded_frames(
    decoder: &mut ffmpeg_next::decoder::Video,
    scaler: &mut ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    out_dir: &Path,
    written: &mut usize,
) -> Result<(), ToolkitError> {
    let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
    while decoder.receive_frame(&mut decoded).is_ok() {
        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&decoded, &mut rgb)?;
        let pixels = packed_rgb(&rgb, width, height);
        let image = image::RgbImage::from_raw(width, height, pixels)
            .ok_or("decoded frame size mismatch")?;
        *written += 1;
        image.save(out_dir.join(format!("{written:04}.png")))?;
    }
    Ok(())
}

/// Strips per-row padding from an ffmpeg RGB frame into a tightly-packed
/// buffer (stride may exceed width * 3).
fn packed_rgb(
    frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_len = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}

/// Remuxes the video streams of `video` and the audio streams of `audio`
/// into `output` without re-encoding.
fn mux_streams(video: &Path, audio: &Path, output: &Path) -> Result<(), ToolkitError> {
    let mut ictx_video = ffmpeg_next::format::input(video)?;
    let mut ictx_audio = ffmpeg_next::format::input(audio)?;
    let mut octx = ffmpeg_next::format::output(output)?;

    let video_map = map_streams(&ictx_video, ffmpeg_next::media::Type::Video, &mut octx)?;
    let audio_map = map_streams(&ictx_audio, ffmpeg_next::media::Type::Audio, &mut octx)?;

    octx.write_header()?;
    copy_mapped_packets(&mut ictx_video, &video_map, &mut octx)?;
    copy_mapped_packets(&mut ictx_audio, &audio_map, &mut octx)?;
    octx.write_trailer()?;

    Ok(())
}

/// Adds a stream-copy output for every input stream of `medium`, returning
/// input index -> output index (-1 for unmapped).
fn map_streams(
    ictx: &ffmpeg_next::format::context::Input,
    medium: ffmpeg_next::media::Type,
    octx: &mut ffmpeg_next::format::context::Output,
) -> Result<Vec<isize>, ToolkitError> {
    let mut map: Vec<isize> = vec![-1; ictx.nb_streams() as usize];
    for (idx, stream) in ictx.streams().enumerate() {
        if stream.parameters().medium() != medium {
            continue;
        }
        let mut ost = octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
        ost.set_parameters(stream.parameters());
        unsafe {
            (*ost.parameters().as_mut_ptr()).codec_tag = 0;
        }
        map[idx] = ost.index() as isize;
    }
    Ok(map)
}

fn copy_mapped_packets(
    ictx: &mut ffmpeg_next::format::context::Input,
    map: &[isize],
    octx: &mut ffmpeg_next::format::context::Output,
) -> Result<(), ToolkitError> {
    let time_bases: Vec<_> = ictx.streams().map(|s| s.time_base()).collect();

    for (stream, mut packet) in ictx.packets() {
        let ist_idx = stream.index();
        let ost_idx = map[ist_idx];
        if ost_idx < 0 {
            continue;
        }
        let ost_time_base = octx
            .stream(ost_idx as usize)
            .ok_or("missing output stream")?
            .time_base();
        packet.rescale_ts(time_bases[ist_idx], ost_time_base);
        packet.set_position(-1);
        packet.set_stream(ost_idx as usize);
        packet.write_interleaved(octx)?;
    }
    Ok(())
}
