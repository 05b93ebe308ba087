//! Binary record round-trips through the codec, in memory and on disk.

use std::collections::{BTreeMap, HashMap};

use triscan::codec::{
    decode_image, decode_profile, encode_image, encode_profile, read_profile_file,
    write_profile_file,
};
use triscan::{
    AlignmentParameters, AssemblerConfig, CableOrientation, CameraImage, DataFormat, DataType,
    DataTypeSet, Encoder, FragmentLayout, PacketHeader, Profile, ProfileAssembler, ProfileFlags,
    ScanError, SensorSpec,
};

fn identity_alignment() -> AlignmentParameters {
    AlignmentParameters::new(CableOrientation::CableDownstream, 0.0, 0.0, 0.0, 1000.0).unwrap()
}

/// Assemble one complete single-datagram profile with integer-valued
/// coordinates (exact in f32) so codec round-trips compare exactly.
fn assembled_profile(format: DataFormat, num_vals: usize) -> Profile {
    let mut assembler = ProfileAssembler::new(
        identity_alignment(),
        SensorSpec::new(vec![2], vec![3]),
        format,
        &AssemblerConfig {
            profiles_per_arena: 2,
        },
    );

    let step = format.step();
    let subpixel = format.has_subpixel();
    let brightness = format.has_brightness();

    let sample_type = if subpixel { DataType::Subpixel } else { DataType::XY };
    let sample_size = if subpixel { 2 } else { 4 };
    let mut layouts = HashMap::new();
    layouts.insert(
        sample_type,
        FragmentLayout {
            offset: 0,
            num_vals,
            step,
        },
    );
    let mut data_types = DataTypeSet::EMPTY.with(sample_type);
    if brightness {
        layouts.insert(
            DataType::Brightness,
            FragmentLayout {
                offset: num_vals * sample_size,
                num_vals,
                step,
            },
        );
        data_types = data_types.with(DataType::Brightness);
    }

    let header = PacketHeader {
        source_id: 0,
        scan_head_id: 17,
        camera_port: 0,
        laser_port: 0,
        flags: ProfileFlags::NONE,
        timestamp_ns: 987_654_321,
        laser_on_time_ns: 45_000,
        exposure_ns: 200_000,
        sequence_number: 3,
        total_datagrams: 1,
        datagram_index: 0,
        start_column: 0,
        data_types,
        encoder_values: BTreeMap::from([
            (Encoder::Main, 123_456),
            (Encoder::Auxiliary1, -999),
        ]),
        fragment_layouts: layouts,
    };

    let mut payload = Vec::new();
    for i in 0..num_vals {
        if subpixel {
            payload.extend_from_slice(&(600 + i as u16).to_be_bytes());
        } else {
            payload.extend_from_slice(&(700 + i as u16).to_be_bytes());
            payload.extend_from_slice(&(800 + i as u16).to_be_bytes());
        }
    }
    if brightness {
        for i in 0..num_vals {
            payload.push(10 + i as u8);
        }
    }

    let mut profile = assembler.create_new_profile(&header).unwrap();
    let complete = assembler
        .process_packet(&mut profile, &header, &payload)
        .unwrap();
    assert!(complete);
    profile
}

#[test]
fn profile_round_trip_preserves_everything() {
    let original = assembled_profile(DataFormat::XYBrightnessFull, 24);
    let decoded = decode_profile(&encode_profile(&original)).unwrap();

    assert_eq!(decoded.scan_head_id, original.scan_head_id);
    assert_eq!(decoded.camera, original.camera);
    assert_eq!(decoded.laser, original.laser);
    assert_eq!(decoded.timestamp_ns, original.timestamp_ns);
    assert_eq!(decoded.encoder_values, original.encoder_values);
    assert_eq!(decoded.laser_on_time_us, original.laser_on_time_us);
    assert_eq!(decoded.raw_points(), original.raw_points());
    assert_eq!(decoded.valid_point_count(), original.valid_point_count());
    assert!(decoded.is_complete());
}

#[test]
fn inference_recovers_every_xy_format() {
    for format in [
        DataFormat::XYBrightnessFull,
        DataFormat::XYBrightnessHalf,
        DataFormat::XYBrightnessQuarter,
        DataFormat::XYFull,
        DataFormat::XYHalf,
        DataFormat::XYQuarter,
    ] {
        let original = assembled_profile(format, 24);
        let decoded = decode_profile(&encode_profile(&original)).unwrap();
        assert_eq!(decoded.format, format, "format {format:?}");
        assert_eq!(
            decoded.raw_points(),
            original.raw_points(),
            "points {format:?}"
        );
        assert_eq!(
            decoded.valid_point_count(),
            original.valid_point_count(),
            "valid count {format:?}"
        );
    }
}

#[test]
fn subpixel_round_trip_keeps_camera_space_data() {
    let original = assembled_profile(DataFormat::SubpixelBrightnessFull, 12);
    let decoded = decode_profile(&encode_profile(&original)).unwrap();

    assert_eq!(decoded.format, DataFormat::SubpixelBrightnessFull);
    assert_eq!(decoded.camera_coords(), original.camera_coords());
}

#[test]
fn file_round_trip_through_tempdir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.bin");

    let original = assembled_profile(DataFormat::XYBrightnessHalf, 16);
    write_profile_file(&original, &path).unwrap();
    let decoded = read_profile_file(&path).unwrap();

    assert_eq!(decoded.raw_points(), original.raw_points());
    assert_eq!(decoded.format, DataFormat::XYBrightnessHalf);
}

#[test]
fn missing_file_surfaces_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.bin");
    assert!(matches!(
        read_profile_file(&path),
        Err(ScanError::Io(_))
    ));
}

#[test]
fn garbage_record_is_rejected_whole() {
    assert!(matches!(
        decode_profile(&[0x11, 0x22, 0x33]),
        Err(ScanError::Format(_)) | Err(ScanError::BadMagic { .. })
    ));
}

fn sample_image() -> CameraImage {
    let width = 8;
    let height = 4;
    let pixels: Vec<u8> = (0..width * height).map(|i| (i * 3 % 256) as u8).collect();
    CameraImage::new(
        17,
        2,
        3,
        555_000,
        BTreeMap::from([(Encoder::Main, 42)]),
        25,
        750,
        width as u32,
        height as u32,
        pixels,
    )
    .unwrap()
}

#[test]
fn image_round_trip_preserves_everything() {
    let original = sample_image();
    let decoded = decode_image(&encode_image(&original)).unwrap();

    assert_eq!(decoded.scan_head_id, original.scan_head_id);
    assert_eq!(decoded.camera, original.camera);
    assert_eq!(decoded.laser, original.laser);
    assert_eq!(decoded.timestamp_ns, original.timestamp_ns);
    assert_eq!(decoded.encoder_values, original.encoder_values);
    assert_eq!(decoded.laser_on_time_us, original.laser_on_time_us);
    assert_eq!(decoded.exposure_us, original.exposure_us);
    assert_eq!(decoded.width, original.width);
    assert_eq!(decoded.height, original.height);
    assert_eq!(decoded.pixels(), original.pixels());
}

#[test]
fn image_with_inconsistent_pixel_count_is_rejected() {
    let mut data = encode_image(&sample_image());
    // Corrupt the stored width (offset 22 in the fixed header, after one
    // encoder count), leaving the pixel count inconsistent.
    let width_offset = 2 + 4 + 4 + 4 + 8 + 4 + 8 + 4 + 4;
    data[width_offset] = 9;
    assert!(matches!(decode_image(&data), Err(ScanError::Format(_))));
}
