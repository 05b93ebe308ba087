//! Binary record format for persisting profiles and camera images.
//!
//! All integers are little-endian. Both record kinds share the same magic
//! value, which must be checked before any other field is trusted. The
//! profile layout is fixed:
//!
//! ```text
//! magic:i16 (0x0CBD)
//! scan_head_id:u32 | camera:i32 | laser:i32 | timestamp_ns:u64
//! encoder_count:i32 | encoder_count x i64
//! laser_on_time_us:i32
//! point_count:i32 | point_count x (x:f32, y:f32, brightness:i32)
//! subpixel_count:i32 | subpixel_count x (x:f32, y:f32, brightness:i32)
//! ```
//!
//! The format deliberately carries no sampling-format tag; older files never
//! had one. On read the format is inferred from the written point pattern by
//! [`infer_data_format`]. Invalid points are written as the all-zero triple
//! (the legacy gap convention), which is what makes the inference possible
//! and also what makes it a heuristic: a genuine all-zero sample cannot be
//! told apart from a sub-sampled gap.
//!
//! The camera-image record uses the same magic and a parallel layout with
//! width/height and a byte-per-pixel buffer in place of the point sections.

use std::collections::BTreeMap;
use std::path::Path;

use bytes::{Buf, BufMut};

use crate::data::{
    CameraImage, DataFormat, Encoder, Point, Profile, ProfileFlags, INVALID_BRIGHTNESS,
};
use crate::error::{ScanError, ScanResult};

/// Shared magic value of both record kinds.
pub const RECORD_MAGIC: u16 = 0x0CBD;

/// Serialize a profile into the binary record format.
#[must_use]
pub fn encode_profile(profile: &Profile) -> Vec<u8> {
    let points = profile.raw_points();
    let subpixel = profile.camera_coords().unwrap_or(&[]);

    let mut buf = Vec::with_capacity(38 + 12 * (points.len() + subpixel.len()));
    buf.put_u16_le(RECORD_MAGIC);
    buf.put_u32_le(profile.scan_head_id);
    buf.put_i32_le(profile.camera as i32);
    buf.put_i32_le(profile.laser as i32);
    buf.put_u64_le(profile.timestamp_ns);

    buf.put_i32_le(profile.encoder_values.len() as i32);
    for count in profile.encoder_values.values() {
        buf.put_i64_le(*count);
    }

    buf.put_i32_le(profile.laser_on_time_us as i32);

    put_points(&mut buf, points);
    put_points(&mut buf, subpixel);
    buf
}

/// Deserialize a profile record.
///
/// Fails with [`ScanError::BadMagic`] when the record does not start with
/// the shared magic value, and with [`ScanError::Format`] on any truncation
/// or inconsistency; no partial profile is ever returned.
pub fn decode_profile(data: &[u8]) -> ScanResult<Profile> {
    let mut buf = data;
    check_magic(&mut buf)?;

    need(&buf, 4 + 4 + 4 + 8 + 4, "profile record header")?;
    let scan_head_id = buf.get_u32_le();
    let camera = read_id(&mut buf, "camera")?;
    let laser = read_id(&mut buf, "laser")?;
    let timestamp_ns = buf.get_u64_le();
    let encoder_values = read_encoders(&mut buf)?;

    need(&buf, 4, "laser-on time")?;
    let laser_on_time_us = buf.get_i32_le().max(0) as u32;

    let points = read_points(&mut buf, "point")?;
    let subpixel = read_points(&mut buf, "subpixel")?;

    let format = infer_data_format(&points, !subpixel.is_empty());
    let valid = points.iter().filter(|p| p.is_valid()).count();

    let mut profile = Profile::new(
        scan_head_id,
        camera,
        laser,
        0,
        timestamp_ns,
        encoder_values,
        laser_on_time_us,
        0,
        format,
        ProfileFlags::NONE,
        0,
        points,
        if subpixel.is_empty() {
            None
        } else {
            Some(subpixel)
        },
    );
    profile.set_valid_point_count(valid);
    Ok(profile)
}

/// Serialize a camera image into the binary record format.
#[must_use]
pub fn encode_image(image: &CameraImage) -> Vec<u8> {
    let mut buf = Vec::with_capacity(50 + image.pixels().len());
    buf.put_u16_le(RECORD_MAGIC);
    buf.put_u32_le(image.scan_head_id);
    buf.put_i32_le(image.camera as i32);
    buf.put_i32_le(image.laser as i32);
    buf.put_u64_le(image.timestamp_ns);

    buf.put_i32_le(image.encoder_values.len() as i32);
    for count in image.encoder_values.values() {
        buf.put_i64_le(*count);
    }

    buf.put_i32_le(image.laser_on_time_us as i32);
    buf.put_i32_le(image.exposure_us as i32);
    buf.put_i32_le(image.width as i32);
    buf.put_i32_le(image.height as i32);
    buf.put_i32_le(image.pixels().len() as i32);
    buf.put_slice(image.pixels());
    buf
}

/// Deserialize a camera-image record.
pub fn decode_image(data: &[u8]) -> ScanResult<CameraImage> {
    let mut buf = data;
    check_magic(&mut buf)?;

    need(&buf, 4 + 4 + 4 + 8 + 4, "image record header")?;
    let scan_head_id = buf.get_u32_le();
    let camera = read_id(&mut buf, "camera")?;
    let laser = read_id(&mut buf, "laser")?;
    let timestamp_ns = buf.get_u64_le();
    let encoder_values = read_encoders(&mut buf)?;

    need(&buf, 4 + 4 + 4 + 4 + 4, "image geometry")?;
    let laser_on_time_us = buf.get_i32_le().max(0) as u32;
    let exposure_us = buf.get_i32_le().max(0) as u32;
    let width = read_dimension(&mut buf, "width")?;
    let height = read_dimension(&mut buf, "height")?;
    let pixel_count = buf.get_i32_le();

    if pixel_count < 0 || pixel_count as u64 != u64::from(width) * u64::from(height) {
        return Err(ScanError::Format(format!(
            "pixel count {pixel_count} does not match {width}x{height}"
        )));
    }
    let pixel_count = pixel_count as usize;
    need(&buf, pixel_count, "pixel data")?;
    let mut pixels = vec![0u8; pixel_count];
    buf.copy_to_slice(&mut pixels);

    CameraImage::new(
        scan_head_id,
        camera,
        laser,
        timestamp_ns,
        encoder_values,
        laser_on_time_us,
        exposure_us,
        width,
        height,
        pixels,
    )
}

/// Write a profile record to a file.
pub fn write_profile_file<P: AsRef<Path>>(profile: &Profile, path: P) -> ScanResult<()> {
    std::fs::write(path, encode_profile(profile))?;
    Ok(())
}

/// Read a profile record from a file.
pub fn read_profile_file<P: AsRef<Path>>(path: P) -> ScanResult<Profile> {
    decode_profile(&std::fs::read(path)?)
}

/// Write a camera-image record to a file.
pub fn write_image_file<P: AsRef<Path>>(image: &CameraImage, path: P) -> ScanResult<()> {
    std::fs::write(path, encode_image(image))?;
    Ok(())
}

/// Read a camera-image record from a file.
pub fn read_image_file<P: AsRef<Path>>(path: P) -> ScanResult<CameraImage> {
    decode_image(&std::fs::read(path)?)
}

/// Best-effort inference of the sampling format of a legacy record.
///
/// Sub-sampled formats leave gaps (all-zero triples on disk, restored to the
/// sentinel on read) at every column their stride skipped: a record whose
/// every index not divisible by 4 is a gap reads as quarter resolution, every
/// odd index as half, anything else as full. A valid point carrying a real
/// brightness value marks the with-brightness variants. A record whose
/// subpixel section is non-empty is always the subpixel format.
///
/// This is a legacy-compatibility heuristic, not a guarantee: a genuine
/// all-zero valid sample at a gap position is indistinguishable from a gap
/// and will steer the inference wrong.
#[must_use]
pub fn infer_data_format(points: &[Point], subpixel_present: bool) -> DataFormat {
    if subpixel_present {
        return DataFormat::SubpixelBrightnessFull;
    }

    let has_brightness = points
        .iter()
        .any(|p| p.is_valid() && p.brightness != INVALID_BRIGHTNESS);

    let gaps_at = |stride: usize| {
        points.len() > 1
            && (1..points.len())
                .filter(|i| i % stride != 0)
                .all(|i| !points[i].is_valid())
    };

    let step = if gaps_at(4) {
        4
    } else if gaps_at(2) {
        2
    } else {
        1
    };

    match (has_brightness, step) {
        (true, 4) => DataFormat::XYBrightnessQuarter,
        (true, 2) => DataFormat::XYBrightnessHalf,
        (true, _) => DataFormat::XYBrightnessFull,
        (false, 4) => DataFormat::XYQuarter,
        (false, 2) => DataFormat::XYHalf,
        (false, _) => DataFormat::XYFull,
    }
}

fn put_points(buf: &mut Vec<u8>, points: &[Point]) {
    buf.put_i32_le(points.len() as i32);
    for point in points {
        if point.is_valid() {
            buf.put_f32_le(point.x as f32);
            buf.put_f32_le(point.y as f32);
            buf.put_i32_le(point.brightness);
        } else {
            // Legacy gap convention: invalid points persist as zeros.
            buf.put_f32_le(0.0);
            buf.put_f32_le(0.0);
            buf.put_i32_le(0);
        }
    }
}

fn read_points(buf: &mut &[u8], label: &str) -> ScanResult<Box<[Point]>> {
    need(buf, 4, label)?;
    let count = buf.get_i32_le();
    if count < 0 {
        return Err(ScanError::Format(format!("negative {label} count {count}")));
    }
    let count = count as usize;
    need(buf, count * 12, label)?;

    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        let x = buf.get_f32_le();
        let y = buf.get_f32_le();
        let brightness = buf.get_i32_le();
        if x == 0.0 && y == 0.0 && brightness == 0 {
            points.push(Point::INVALID);
        } else {
            points.push(Point::new(f64::from(x), f64::from(y), brightness));
        }
    }
    Ok(points.into_boxed_slice())
}

fn read_encoders(buf: &mut &[u8]) -> ScanResult<BTreeMap<Encoder, i64>> {
    need(buf, 4, "encoder count")?;
    let count = buf.get_i32_le();
    if count < 0 {
        return Err(ScanError::Format(format!("negative encoder count {count}")));
    }
    let count = count as usize;
    need(buf, count * 8, "encoder counts")?;

    let mut encoders = BTreeMap::new();
    for index in 0..count {
        let channel = Encoder::from_index(index).ok_or_else(|| {
            ScanError::Format(format!("record defines {count} encoder channels, at most 3 exist"))
        })?;
        encoders.insert(channel, buf.get_i64_le());
    }
    Ok(encoders)
}

fn check_magic(buf: &mut &[u8]) -> ScanResult<()> {
    need(buf, 2, "magic")?;
    let found = buf.get_u16_le();
    if found != RECORD_MAGIC {
        return Err(ScanError::BadMagic { found });
    }
    Ok(())
}

fn read_id(buf: &mut &[u8], label: &str) -> ScanResult<u32> {
    let value = buf.get_i32_le();
    u32::try_from(value)
        .map_err(|_| ScanError::Format(format!("negative {label} id {value}")))
}

fn read_dimension(buf: &mut &[u8], label: &str) -> ScanResult<u32> {
    let value = buf.get_i32_le();
    u32::try_from(value)
        .map_err(|_| ScanError::Format(format!("negative image {label} {value}")))
}

fn need(buf: &[u8], bytes: usize, what: &str) -> ScanResult<()> {
    if buf.remaining() < bytes {
        return Err(ScanError::Format(format!(
            "truncated record: {what} needs {bytes} bytes, {} remain",
            buf.remaining()
        )));
    }
    Ok(())
}
