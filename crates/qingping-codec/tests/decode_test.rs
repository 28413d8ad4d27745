//! Decoder Integration Tests
//!
//! Builds frames by hand and checks the decoded telemetry, including the
//! malformed-input paths that must never panic.

use qingping_codec::decoder::{decode_history, decode_th_block};
use qingping_codec::{
    decode, is_tlv_frame, pack_frame, unpack_frame, DataType, DecodedTelemetry, Decoder,
    DecoderConfig, TlvError,
};

/// 23.5 °C, 45.6 %, 101.32 kPa, 87 %
const TH: [u8; 6] = [0xc8, 0xf1, 0x2d, 0x94, 0x27, 0x57];

fn realtime_value(timestamp: u32, rssi: u8) -> Vec<u8> {
    let mut v = timestamp.to_le_bytes().to_vec();
    v.extend_from_slice(&TH);
    v.push(rssi);
    v
}

fn history_value(start: u32, step: u16, blocks: usize) -> Vec<u8> {
    let mut v = start.to_le_bytes().to_vec();
    v.extend_from_slice(&step.to_le_bytes());
    for _ in 0..blocks {
        v.extend_from_slice(&TH);
    }
    v
}

fn full_environment_value(timestamp: u32) -> Vec<u8> {
    let mut v = timestamp.to_le_bytes().to_vec();
    v.push(10);
    for word in [235u16, 456, 812, 12, 18, 150, 42] {
        v.extend_from_slice(&word.to_le_bytes());
    }
    v.extend_from_slice(&70_000u32.to_le_bytes());
    v
}

#[test]
fn test_single_record_frame() {
    // Header declares a 4-byte payload holding tag 0x40 with a 1-byte value.
    let frame = [b'C', b'G', 0x32, 0x04, 0x00, 0x40, 0x01, 0x00, 0x01, 0xff, 0xff];
    let unpacked = unpack_frame(&frame).unwrap();
    assert_eq!(unpacked.records.len(), 1);
    assert_eq!(unpacked.records[0].tag, 0x40);
    assert_eq!(unpacked.records[0].len(), 1);
    assert_eq!(unpacked.records[0].value, b"\x01");
}

#[test]
fn test_three_byte_buffer_is_empty_not_a_crash() {
    let t = decode(b"CG\x32");
    assert!(t.is_empty());
    assert!(matches!(
        Decoder::default().try_decode(b"CG\x32"),
        Err(TlvError::TooShort { len: 3, .. })
    ));
}

#[test]
fn test_declared_length_past_buffer_is_empty() {
    let mut frame = pack_frame(0x41, [(0x64u8, vec![80])]).unwrap();
    frame[3] = 0xff;
    assert!(decode(&frame).is_empty());
}

#[test]
fn test_packed_th_example_value() {
    let raw: u64 = 0x1f688;
    let bytes = [0x88, 0xf6, 0x01, 0x00, 0x00, 0x00];
    let r = decode_th_block(&bytes).unwrap();
    assert_eq!(r.temperature, Some(((raw >> 12) as f64 - 500.0) / 10.0));
    assert_eq!(r.humidity, Some((raw & 0xfff) as f64 / 10.0));
    assert_eq!(r.temperature, Some(-46.9));
    assert_eq!(r.humidity, Some(167.2));
}

#[test]
fn test_signal_strength_byte_is_negative_dbm() {
    let frame = pack_frame(0x41, [(0x65u8, vec![0x9c])]).unwrap();
    assert_eq!(decode(&frame).signal_strength, Some(-100));

    let frame = pack_frame(0x41, [(0x65u8, vec![0x50])]).unwrap();
    assert_eq!(decode(&frame).signal_strength, Some(80));
}

#[test]
fn test_history_block_timestamps() {
    let t0 = 1_700_000_000;
    let frame = pack_frame(0x42, [(0x03u8, history_value(t0, 60, 3))]).unwrap();
    let readings = decode(&frame).sensor_data.unwrap();

    assert_eq!(readings.len(), 3);
    let stamps: Vec<u64> = readings.iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![t0 as u64, t0 as u64 + 60, t0 as u64 + 120]);
    assert!(readings.iter().all(|r| r.data_type == Some(DataType::Data)));
    assert!(readings.iter().all(|r| r.temperature == Some(23.5)));
}

#[test]
fn test_history_direct() {
    let readings = decode_history(&history_value(100, 10, 2));
    assert_eq!(readings[1].timestamp, 110);
}

#[test]
fn test_realtime_frame() {
    let frame = pack_frame(
        0x41,
        [
            (0x38u8, vec![0x0c]),
            (0x14, realtime_value(1_700_000_000, 0xb5)),
            (0x64, vec![87]),
        ],
    )
    .unwrap();
    let t = decode(&frame);

    assert_eq!(t.command, Some(0x41));
    assert_eq!(t.product_id, 0x0c);
    assert_eq!(t.battery, Some(87));
    let readings = t.sensor_data.unwrap();
    assert_eq!(readings.len(), 1);
    let r = &readings[0];
    assert_eq!(r.data_type, Some(DataType::Event));
    assert_eq!(r.timestamp, 1_700_000_000);
    assert_eq!(r.humidity, Some(45.6));
    assert_eq!(r.pressure, Some(101.32));
    assert_eq!(r.rssi, Some(-75));
}

#[test]
fn test_full_environment_block() {
    let frame = pack_frame(0x41, [(0x85u8, full_environment_value(1_700_000_000))]).unwrap();
    let readings = decode(&frame).sensor_data.unwrap();
    let r = &readings[0];

    assert_eq!(r.timestamp, 1_700_000_000);
    assert_eq!(r.temperature, Some(23.5));
    assert_eq!(r.humidity, Some(45.6));
    assert_eq!(r.co2, Some(812));
    assert_eq!(r.pm25, Some(12));
    assert_eq!(r.pm10, Some(18));
    assert_eq!(r.tvoc, Some(150));
    assert_eq!(r.noise, Some(42));
    assert_eq!(r.light, Some(70_000));
}

#[test]
fn test_composite_blocks_take_precedence() {
    let frame = pack_frame(
        0x41,
        [
            (0x85u8, full_environment_value(10)),
            (0x14, realtime_value(20, 0xc0)),
            (0x85, full_environment_value(30)),
        ],
    )
    .unwrap();
    let readings = decode(&frame).sensor_data.unwrap();
    let stamps: Vec<u64> = readings.iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![10, 30]);
}

#[test]
fn test_last_list_source_wins() {
    let frame = pack_frame(
        0x41,
        [(0x14u8, realtime_value(20, 0xc0)), (0x03, history_value(100, 60, 2))],
    )
    .unwrap();
    let readings = decode(&frame).sensor_data.unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].timestamp, 100);
}

#[test]
fn test_device_metadata() {
    let frame = pack_frame(
        0x41,
        [
            (0x11u8, b"1.2.3".to_vec()),
            (0x34, b"CGR1W".to_vec()),
            (0x35, b"0.9".to_vec()),
            (0x04, vec![15, 0]),
            (0x05, vec![60, 0]),
            (0x1d, vec![3]),
            (0x09, vec![55]),
            (0x2c, vec![1]),
            (0x61, vec![0x12, 0xab]),
        ],
    )
    .unwrap();
    let t = decode(&frame);

    assert_eq!(t.version.as_deref(), Some("1.2.3"));
    assert_eq!(t.version_model.as_deref(), Some("CGR1W"));
    assert_eq!(t.version_mcu.as_deref(), Some("0.9"));
    assert_eq!(t.report_interval, Some(15));
    assert_eq!(t.collect_interval, Some(60));
    assert_eq!(t.device_status, Some(3));
    assert_eq!(t.battery, Some(55));
    assert_eq!(t.usb_plugged_in, Some(true));
    assert_eq!(t.battery_charging, Some(true));
    assert_eq!(t.pm_module_connected, Some(true));
    assert_eq!(t.pm_module_serial.as_deref(), Some("12ab"));
    assert_eq!(t.sensor_data, None);
}

#[test]
fn test_unknown_tags_are_skipped() {
    let frame = pack_frame(
        0x41,
        [(0xeeu8, vec![1, 2, 3]), (0x64, vec![42]), (0x7a, Vec::new())],
    )
    .unwrap();
    let t = decode(&frame);
    assert_eq!(t.battery, Some(42));
}

#[test]
fn test_truncated_payload_keeps_earlier_records() {
    let mut frame = pack_frame(0x41, [(0x64u8, vec![42]), (0x65, vec![0x9c])]).unwrap();
    // Claim a longer value for the second record than the payload holds.
    frame[10] = 0x09;
    let t = decode(&frame);
    assert_eq!(t.battery, Some(42));
    assert_eq!(t.signal_strength, None);
}

#[test]
fn test_decode_is_idempotent() {
    let frame = pack_frame(
        0x42,
        [(0x03u8, history_value(1_000, 60, 4)), (0x64, vec![12])],
    )
    .unwrap();
    let first = decode(&frame);
    let second = decode(&frame);
    assert_eq!(first, second);
}

#[test]
fn test_json_path_is_rejected_by_marker() {
    let json = br#"{"type":"12","mac":"582D34000000"}"#;
    assert!(!is_tlv_frame(json));
    assert_eq!(decode(json), DecodedTelemetry::default());
}

#[test]
fn test_strict_mode_rejects_missing_checksum() {
    let mut frame = pack_frame(0x41, [(0x64u8, vec![42])]).unwrap();
    frame.truncate(frame.len() - 2);
    let strict = Decoder::new(DecoderConfig::strict());
    assert_eq!(strict.try_decode(&frame), Err(TlvError::MissingChecksum));
    assert_eq!(decode(&frame).battery, Some(42));
}

#[test]
fn test_json_rendering_uses_wire_names() {
    let frame = pack_frame(
        0x41,
        [(0x14u8, realtime_value(1_700_000_000, 0xb5)), (0x2c, vec![0])],
    )
    .unwrap();
    let json = serde_json::to_value(decode(&frame)).unwrap();

    assert_eq!(json["productId"], 0);
    assert_eq!(json["usbPluggedIn"], false);
    assert!(json.get("battery").is_none());
    let reading = &json["sensorData"][0];
    assert_eq!(reading["dataType"], "event");
    assert_eq!(reading["time"], "2023-11-14 22:13:20");
    assert_eq!(reading["rssi"], -75);
    assert!(reading.get("co2").is_none());
}
