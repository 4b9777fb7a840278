//! Tests for the line record decoder

use crate::{DecodeAnomaly, DecodeCursor, Decoder, LineRecordDecoder, MAX_LINE_LEN};

fn pairs(decoded: &crate::Decoded) -> Vec<(f64, f64)> {
    decoded
        .samples
        .iter()
        .map(|s| (s.timestamp_millis(), s.value))
        .collect()
}

#[test]
fn test_complete_record_and_retained_remainder() {
    let window = b"1000 42.5\n500 10";

    let decoded = LineRecordDecoder::new().decode(window);

    assert_eq!(pairs(&decoded), vec![(1000.0, 42.5)]);
    assert_eq!(decoded.consumed, 10);
    assert_eq!(&window[decoded.consumed..], b"500 10");
}

#[test]
fn test_no_terminator_consumes_nothing() {
    let decoded = LineRecordDecoder::new().decode(b"1000 42.5");
    assert!(decoded.samples.is_empty());
    assert_eq!(decoded.consumed, 0);
}

#[test]
fn test_remainder_completes_on_next_window() {
    let decoder = LineRecordDecoder::new();
    let mut cursor = DecodeCursor::new();

    cursor.extend(b"1000 42.5\n500 1");
    let first = cursor.decode_with(&decoder);
    assert_eq!(pairs(&first), vec![(1000.0, 42.5)]);
    assert_eq!(cursor.window(), b"500 1");

    cursor.extend(b"0\n");
    let second = cursor.decode_with(&decoder);
    assert_eq!(pairs(&second), vec![(500.0, 10.0)]);
    assert!(cursor.is_empty());
}

#[test]
fn test_multiple_records_and_whitespace() {
    let window = b"1 1.0\n  2\t2.0  \r\n3 3e2\n";

    let decoded = LineRecordDecoder::new().decode(window);

    assert_eq!(pairs(&decoded), vec![(1.0, 1.0), (2.0, 2.0), (3.0, 300.0)]);
    assert_eq!(decoded.consumed, window.len());
    assert!(decoded.anomalies.is_empty());
}

#[test]
fn test_malformed_records_are_skipped() {
    let window = b"1 1.0\nonly-one\n1 2 3\n4 4.0\n";

    let decoded = LineRecordDecoder::new().decode(window);

    assert_eq!(pairs(&decoded), vec![(1.0, 1.0), (4.0, 4.0)]);
    assert_eq!(decoded.consumed, window.len());
    assert_eq!(
        decoded.anomalies,
        vec![
            DecodeAnomaly::MalformedRecord {
                offset: 6,
                tokens: 1
            },
            DecodeAnomaly::MalformedRecord {
                offset: 15,
                tokens: 3
            },
        ]
    );
}

#[test]
fn test_unparsable_numbers_are_skipped() {
    let decoded = LineRecordDecoder::new().decode(b"abc 1\n1 xyz\n2 2\n");

    assert_eq!(pairs(&decoded), vec![(2.0, 2.0)]);
    assert_eq!(decoded.anomaly_count(), 2);
    assert!(matches!(
        decoded.anomalies[0],
        DecodeAnomaly::InvalidNumber { offset: 0 }
    ));
}

#[test]
fn test_blank_lines_are_ignored_silently() {
    let decoded = LineRecordDecoder::new().decode(b"\n\n1 1\n\n");

    assert_eq!(pairs(&decoded), vec![(1.0, 1.0)]);
    assert!(decoded.anomalies.is_empty());
    assert_eq!(decoded.consumed, 7);
}

#[test]
fn test_invalid_utf8_line_is_skipped() {
    let decoded = LineRecordDecoder::new().decode(b"\xff\xfe 1\n5 5\n");

    assert_eq!(pairs(&decoded), vec![(5.0, 5.0)]);
    assert_eq!(
        decoded.anomalies,
        vec![DecodeAnomaly::InvalidUtf8 { offset: 0 }]
    );
}

#[test]
fn test_multibyte_text_split_across_chunks() {
    // A multi-byte character split mid-sequence must not poison the record
    let text = "7 1\n8 2 é\n9 3\n".as_bytes();
    let split = text.iter().position(|&b| b == 0xc3).unwrap() + 1;

    let decoder = LineRecordDecoder::new();
    let mut cursor = DecodeCursor::new();
    cursor.extend(&text[..split]);
    let first = cursor.decode_with(&decoder);
    cursor.extend(&text[split..]);
    let second = cursor.decode_with(&decoder);

    assert_eq!(pairs(&first), vec![(7.0, 1.0)]);
    assert_eq!(pairs(&second), vec![(9.0, 3.0)]);
    assert!(matches!(
        second.anomalies[0],
        DecodeAnomaly::MalformedRecord { tokens: 3, .. }
    ));
}

#[test]
fn test_unterminated_text_stays_bounded() {
    let decoder = LineRecordDecoder::new();
    let mut cursor = DecodeCursor::new();
    let chunk = vec![b'7'; 64 * 1024];

    let mut dropped = 0;
    for _ in 0..16 {
        cursor.extend(&chunk);
        let decoded = cursor.decode_with(&decoder);
        assert!(decoded.samples.is_empty());
        dropped += decoded.anomalies.len();
        assert!(cursor.pending() <= MAX_LINE_LEN);
    }
    assert_eq!(dropped, 16);

    // Stream recovers once a terminator shows up
    cursor.extend(b"\n1000 42.5\n");
    let decoded = cursor.decode_with(&decoder);
    assert_eq!(pairs(&decoded), vec![(1000.0, 42.5)]);
    assert!(cursor.is_empty());
}

#[test]
fn test_short_unterminated_tail_is_retained() {
    let window = vec![b'1'; MAX_LINE_LEN];
    let decoded = LineRecordDecoder::new().decode(&window);
    assert_eq!(decoded.consumed, 0);
    assert!(decoded.anomalies.is_empty());

    let mut window = b"5 5\n".to_vec();
    window.extend(vec![b'1'; MAX_LINE_LEN + 1]);
    let decoded = LineRecordDecoder::new().decode(&window);
    assert_eq!(pairs(&decoded), vec![(5.0, 5.0)]);
    assert_eq!(decoded.consumed, window.len());
    assert_eq!(
        decoded.anomalies,
        vec![DecodeAnomaly::OversizedRecord {
            offset: 4,
            len: MAX_LINE_LEN + 1
        }]
    );
}
