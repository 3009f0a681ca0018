use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_read_dataset_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("urls.csv");
    fs::write(
        &path,
        "url,type\n\
         https://github.com,benign\n\
         http://paypal-verify.tk/login,phishing\n\
         http://hacked.example/index.php,defacement\n",
    )
    .unwrap();

    let data = read_dataset(&path).unwrap();
    assert_eq!(data.records.len(), 3);
    assert_eq!(data.phishing_count(), 1);
    // only `phishing` is positive
    assert!(!data.records[2].is_phishing());
}

#[test]
fn test_malformed_rows_are_skipped_and_counted() {
    let csv = "url,type\n\
               https://ok.com,benign\n\
               only-one-field\n\
               ,phishing\n\
               \"http://quoted.com/a,b\",phishing\n";

    let data = read_dataset_from(csv.as_bytes()).unwrap();
    assert_eq!(data.rows_read, 4);
    assert_eq!(data.skipped, 2);
    assert_eq!(data.records.len(), 2);
    assert_eq!(data.records[1].url, "http://quoted.com/a,b");
}

#[test]
fn test_extra_columns_and_order() {
    let csv = "type,source,url\nphishing,feed,http://x.tk\n";
    let data = read_dataset_from(csv.as_bytes()).unwrap();
    assert_eq!(data.records, vec![LabeledUrl::new("http://x.tk", "phishing")]);
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = read_dataset(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, DatasetError::Open { .. }));
}

#[test]
fn test_subsample_then_split_preserves_classes() {
    let records: Vec<LabeledUrl> = (0..200)
        .map(|i| {
            let kind = if i % 4 == 0 { PHISHING_TYPE } else { "benign" };
            LabeledUrl::new(format!("http://site{}.com", i), kind)
        })
        .collect();

    let sampled = subsample(records, 100, 42);
    let labels: Vec<bool> = sampled.iter().map(LabeledUrl::is_phishing).collect();
    let split = stratified_split(&labels, 0.2, 42);

    assert_eq!(sampled.len(), 100);
    assert!(split.test.iter().any(|&i| labels[i]));
    assert!(split.test.iter().any(|&i| !labels[i]));
}
