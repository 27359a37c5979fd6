use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rf_core::SampleId;
use rf_fields::{Field, FieldError, FieldStore, load_basis, write_field};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

#[test]
fn write_list_read_roundtrip() {
    let root = unique_temp_dir("rf_fields_store");
    let store = FieldStore::new(root.clone()).expect("failed to create field store");

    let u = Field::new("U", 2, vec![1.0, 0.0, 0.5, 0.25]).unwrap();
    let p = Field::new("p", 1, vec![3.0, 4.0]).unwrap();
    let s3 = SampleId::from_ordinal(3).unwrap();
    let s1 = SampleId::from_ordinal(1).unwrap();

    let path = store.write(s3, &u).expect("failed to write U");
    assert!(path.ends_with("3/U.json"));
    store.write(s1, &p).expect("failed to write p");

    assert_eq!(store.list_samples().unwrap(), vec![s1, s3]);
    assert_eq!(store.read(s3, "U").unwrap(), u);
    assert!(matches!(
        store.read(s1, "U"),
        Err(FieldError::NotFound { .. })
    ));

    fs::remove_dir_all(root).ok();
}

#[test]
fn basis_loads_in_file_name_order() {
    let dir = unique_temp_dir("rf_fields_basis");
    for (i, v) in [3.0, 1.0, 2.0].iter().enumerate() {
        let mode = Field::new(format!("mode{i}"), 1, vec![*v, 0.0]).unwrap();
        write_field(&dir.join(format!("mode_{i:03}.json")), &mode).unwrap();
    }
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let basis = load_basis(&dir, 2).expect("failed to load basis");
    assert_eq!(basis.len(), 2);
    assert_eq!(basis.mode(0).unwrap().values[0], 3.0);
    assert_eq!(basis.mode(1).unwrap().name, "mode1");

    assert!(load_basis(&dir, 4).is_err());
    fs::remove_dir_all(dir).ok();
}

#[test]
fn malformed_field_is_json_error() {
    let dir = unique_temp_dir("rf_fields_bad");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("U.json");
    fs::write(&path, "{ \"name\": \"U\" ").unwrap();
    assert!(matches!(
        rf_fields::read_field(&path),
        Err(FieldError::Json(_))
    ));
    fs::remove_dir_all(dir).ok();
}

#[test]
fn unpadded_mode_numbers_load_numerically() {
    let dir = unique_temp_dir("rf_fields_unpadded");
    for i in [10, 2, 1] {
        let mode = Field::new(format!("mode{i}"), 1, vec![i as f64, 0.0]).unwrap();
        write_field(&dir.join(format!("mode_{i}.json")), &mode).unwrap();
    }

    let basis = load_basis(&dir, 3).expect("failed to load basis");
    let order: Vec<f64> = (0..3).map(|k| basis.mode(k).unwrap().values[0]).collect();
    assert_eq!(order, vec![1.0, 2.0, 10.0]);
    fs::remove_dir_all(dir).ok();
}
