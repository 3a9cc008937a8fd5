use telemetry::{AnalyticsSummary, VaultRecord};

#[test]
fn test_vault_record_decode() {
    let text = r#"[
        {"id": 12, "timestamp": 1700000000.0, "metadata": {"conf": 0.91, "class": "INTRUDER", "zone": "A"}},
        {"person_id": 7, "timestamp": 1700000010.0, "metadata": {}}
    ]"#;
    let records: Vec<VaultRecord> = serde_json::from_str(text).expect("decode");
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].display_id(), Some(12));
    assert_eq!(records[0].class_label(), "INTRUDER");
    assert_eq!(records[0].metadata.conf, Some(0.91));
    assert!(records[0].metadata.extra.contains_key("zone"));

    assert_eq!(records[1].display_id(), Some(7));
    assert_eq!(records[1].class_label(), "PERSON");
}

#[test]
fn test_analytics_decode() {
    let text = r#"{"total_incidents": 5, "danger_count": 2, "warning_count": 3, "activity_trend": [1, 0, 4]}"#;
    let summary: AnalyticsSummary = serde_json::from_str(text).expect("decode");
    assert_eq!(summary.total_incidents, 5);
    assert_eq!(summary.danger_count, 2);
    assert_eq!(summary.activity_trend, vec![1.0, 0.0, 4.0]);
}
