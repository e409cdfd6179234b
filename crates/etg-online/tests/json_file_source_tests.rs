// Reading saved bulk files.

use etg_core::errors::ExErrorKind;
use etg_core::source::CardSource;
use etg_online::JsonFileSource;
use tempfile::TempDir;

const BULK: &str = r#"[
  {
    "object": "card",
    "id": "0000579f-7b35-4ed3-b44c-db2a538066fe",
    "name": "Fury Sliver",
    "set_name": "Time Spiral",
    "border_color": "black",
    "frame_effects": ["legendary"],
    "image_status": "highres_scan",
    "image_uris": {"small": "https://cards.scryfall.io/small/a.jpg", "png": "https://cards.scryfall.io/png/a.png"},
    "prices": {"usd": "0.29", "usd_foil": null, "eur": "0.11", "tix": "0.02"}
  },
  {
    "object": "card",
    "id": "00006596-1166-4a79-8443-ca9f82e6db4e",
    "name": "Kor Outfitter",
    "prices": {"usd": null}
  }
]"#;

#[test]
fn test_reads_bulk_array() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("default-cards.json");
    std::fs::write(&path, BULK).unwrap();

    let records = JsonFileSource::new(&path).fetch().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Fury Sliver");
    assert_eq!(records[0].prices.usd, Some(0.29));
    assert_eq!(records[0].prices.usd_foil, None);
    assert_eq!(
        records[0].image_uris.as_ref().and_then(|u| u.png.as_deref()),
        Some("https://cards.scryfall.io/png/a.png")
    );
    assert!(records[1].image_uris.is_none());
}

#[test]
fn test_missing_file_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let err = JsonFileSource::new(temp_dir.path().join("absent.json"))
        .fetch()
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    std::fs::write(&path, "{ not an array").unwrap();

    let err = JsonFileSource::new(&path).fetch().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Serialization);
}
