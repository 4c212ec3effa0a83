use tagged_stream_rs::tagged_parser::{
    pack, unpack, DecoderMode, FinalizeReason, FinalizedRecord, StreamRecord, TaggedStreamDecoder,
};

fn decode_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> (FinalizedRecord, Vec<String>) {
    let mut decoder = TaggedStreamDecoder::new();
    let mut snapshots = Vec::new();
    for chunk in chunks {
        if let Some(update) = decoder.feed(chunk) {
            snapshots.push(update.explanation);
        }
    }
    (decoder.finalize(FinalizeReason::Normal), snapshots)
}

fn decode_whole(stream: &str) -> StreamRecord {
    decode_chunks([stream.as_bytes()]).0.into_record()
}

#[test]
fn test_three_chunk_scenario() {
    let mut decoder = TaggedStreamDecoder::new();

    decoder.feed(b"[EXPLANATION]\nThe result is ");
    let after_second = decoder
        .feed(b"42.\n[CHAR")
        .expect("explanation snapshot after second chunk");
    assert_eq!(after_second.explanation, "The result is 42.");
    assert_eq!(decoder.chart(), "");
    assert!(!decoder.saw_chart_marker());

    decoder.feed(b"T]\n{\"type\":\"bar\"}");
    assert_eq!(decoder.mode(), DecoderMode::InChart);

    let record = decoder.finalize(FinalizeReason::Normal);
    let unpacked = record.unpacked();
    assert_eq!(unpacked.explanation, "The result is 42.");
    assert_eq!(unpacked.chart_data, "{\"type\":\"bar\"}");
    assert!(record.chart_expected());
    assert!(record.chart_ready());
}

#[test]
fn test_chunk_boundary_independence_two_chunks() {
    let streams = [
        "[EXPLANATION]\nhello\n[CHART]\n{x:1}",
        "[EXPLANATION]\nhello 数据 ✓\n[CHART]\n{\"title\":\"销售 📊\"}",
        "[EXPLANATION]\nno chart at all, just text",
        "[EXPLANATION]\n[CHART]\n",
    ];

    for stream in streams {
        let expected = decode_whole(stream);
        let bytes = stream.as_bytes();
        for split in 0..=bytes.len() {
            let (record, _) = decode_chunks([&bytes[..split], &bytes[split..]]);
            assert_eq!(
                record.record(),
                &expected,
                "stream {:?} split at byte {}",
                stream,
                split
            );
        }
    }
}

#[test]
fn test_chunk_boundary_independence_every_size() {
    let stream = "[EXPLANATION]\nRevenue grew 12% — mostly in Q3 (季度).\n[CHART]\n{\"type\":\"line\"}";
    let expected = decode_whole(stream);
    for size in 1..=stream.len() {
        let (record, _) = decode_chunks(stream.as_bytes().chunks(size));
        assert_eq!(record.record(), &expected, "chunk size {}", size);
    }
    assert_eq!(
        expected.unpack().explanation,
        "Revenue grew 12% — mostly in Q3 (季度)."
    );
}

#[test]
fn test_snapshots_are_monotonic_and_never_show_markers() {
    let stream = "[EXPLANATION]\nFirst line.\nSecond line.\n[CHART]\n{\"series\":[1,2,3]}";
    for size in 1..=8 {
        let (_, snapshots) = decode_chunks(stream.as_bytes().chunks(size));
        let mut previous = String::new();
        for snapshot in snapshots {
            assert!(snapshot.starts_with(&previous), "chunk size {}", size);
            assert!(!snapshot.contains('['), "chunk size {}: {:?}", size, snapshot);
            assert!(!snapshot.contains("series"));
            previous = snapshot;
        }
    }
}

#[test]
fn test_split_explanation_marker_reassembles() {
    let (record, _) = decode_chunks([&b"[EXPL"[..], &b"ANATION]\nhi"[..]]);
    assert_eq!(record.unpacked().explanation, "hi");
}

#[test]
fn test_cancellation_preserves_partial_text() {
    let mut decoder = TaggedStreamDecoder::new();
    decoder.feed(b"[EXPLANATION]\npartial resu");
    decoder.cancel();
    let record = decoder.finalize(FinalizeReason::Cancelled);
    let unpacked = record.unpacked();
    assert_eq!(unpacked.explanation, "partial resu");
    assert_eq!(unpacked.chart_data, "NONE");
    assert!(!record.chart_expected());
}

#[test]
fn test_cancellation_inside_chart_keeps_chart_text() {
    let mut decoder = TaggedStreamDecoder::new();
    decoder.feed(b"[EXPLANATION]\ndone\n[CHART]\n{\"type\":");
    decoder.cancel();
    let record = decoder.finalize(FinalizeReason::Cancelled);
    assert_eq!(record.unpacked().chart_data, "{\"type\":");
    assert!(record.chart_expected());
}

#[test]
fn test_chart_marker_with_empty_body_is_distinguishable() {
    let (with_marker, _) = decode_chunks([&b"[EXPLANATION]\nanswer\n[CHART]\n"[..]]);
    // Same explanation bytes, so only the marker differs
    let (without_marker, _) = decode_chunks([&b"[EXPLANATION]\nanswer\n"[..]]);

    assert_eq!(with_marker.record(), without_marker.record());
    assert_eq!(with_marker.unpacked(), without_marker.unpacked());
    assert_eq!(with_marker.unpacked().chart_data, "NONE");
    assert!(with_marker.saw_chart_marker());
    assert!(!without_marker.saw_chart_marker());
    assert!(with_marker.chart_expected());
    assert!(!without_marker.chart_expected());
    assert!(!with_marker.chart_ready());
}

#[test]
fn test_transport_error_replaces_content() {
    let mut decoder = TaggedStreamDecoder::new();
    decoder.feed(b"[EXPLANATION]\nhalf an answ");
    let record = decoder.finalize(FinalizeReason::Error("API Error 502".to_string()));
    assert_eq!(record.record().as_str(), "[EXPLANATION]\nAPI Error 502");
    assert!(!record.record().as_str().contains("[CHART]"));
    assert_eq!(record.unpacked().chart_data, "NONE");
    assert!(!record.chart_expected());
}

#[test]
fn test_out_of_order_markers_degrade_to_text() {
    let (record, _) = decode_chunks([&b"[CHART]\n{}\n[EXPLANATION]\nlate"[..]]);
    // Everything before the opening marker is dropped
    assert_eq!(record.unpacked().explanation, "late");
    assert!(!record.saw_chart_marker());
}

#[test]
fn test_round_trip_properties() {
    let explanations = ["", "  padded  ", "多行\n文本", "ends with newline\n"];
    let charts = ["", "   ", "{\"a\":1}", " NONE "];
    for e in explanations {
        for c in charts {
            let unpacked = unpack(pack(e, c, true).as_str());
            assert_eq!(unpacked.explanation, e.trim());
            let expected_chart = if c.trim().is_empty() { "NONE" } else { c.trim() };
            assert_eq!(unpacked.chart_data, expected_chart);
        }
        assert_eq!(unpack(pack(e, "", false).as_str()).chart_data, "NONE");
    }
}

#[test]
fn test_unpack_legacy_plain_text() {
    let unpacked = unpack("just plain text");
    assert_eq!(unpacked.explanation, "just plain text");
    assert_eq!(unpacked.chart_data, "NONE");
}
