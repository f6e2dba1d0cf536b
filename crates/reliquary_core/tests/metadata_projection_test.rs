use chrono::Utc;
use reliquary_core::{AssetMetadata, AssetRecord, FullMetadata, RedactedMetadata, Visibility};
use uuid::Uuid;

fn record(visibility: Visibility) -> AssetRecord {
    let now = Utc::now();
    AssetRecord {
        id: Uuid::new_v4(),
        display_name: "report.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        size: 42,
        storage_path: "ab/cd/secret-path".to_string(),
        public_url: None,
        owner_id: Some("owner-b".to_string()),
        visibility,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn redacted_projection_serializes_only_public_fields() {
    let record = record(Visibility::Private);
    let metadata = AssetMetadata::from(RedactedMetadata::from(&record));

    let json = serde_json::to_value(&metadata).unwrap();
    let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    keys.sort();

    assert_eq!(
        keys,
        vec!["created_at", "display_name", "id", "mime_type", "size"]
    );
    assert!(metadata.is_redacted());
}

#[test]
fn full_projection_hides_storage_path() {
    let record = record(Visibility::Public);
    let metadata = AssetMetadata::from(FullMetadata::from(&record));

    let json = serde_json::to_value(&metadata).unwrap();
    assert!(json.get("storage_path").is_none());
    assert_eq!(json["owner_id"], "owner-b");
    assert_eq!(json["visibility"], "public");
    assert!(!metadata.is_redacted());
}

#[test]
fn ownerless_private_asset_is_readable_only_anonymously() {
    let mut record = record(Visibility::Private);
    record.owner_id = None;

    assert!(record.is_readable_by(None));
    assert!(!record.is_readable_by(Some("anyone")));
}

#[test]
fn public_asset_is_readable_by_anyone() {
    let record = record(Visibility::Public);

    assert!(record.is_readable_by(None));
    assert!(record.is_readable_by(Some("stranger")));
}
