#[path = "../src/course.rs"]
#[allow(dead_code)]
mod course;
#[path = "../src/exchange.rs"]
#[allow(dead_code)]
mod exchange;

use course::{CourseDocument, Lesson, Module};
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;

const LIMIT: u64 = 5 * 1024 * 1024;

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn sample_course() -> CourseDocument {
    let mut doc = CourseDocument::default();
    doc.title = "Bundled".to_string();
    doc.modules.push(Module {
        id: "m1".into(),
        title: "Intro".to_string(),
        description: String::new(),
        lessons: vec![Lesson {
            id: 7.into(),
            title: "Hello".to_string(),
            description: String::new(),
            duration: "15m".to_string(),
            is_completed: true,
        }],
        completed: 1,
        expanded: true,
    });
    doc
}

fn read_entry(path: &PathBuf, name: &str) -> String {
    let f = File::open(path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut text = String::new();
    archive
        .by_name(name)
        .expect("entry in bundle")
        .read_to_string(&mut text)
        .expect("read entry");
    text
}

fn write_bundle(path: &PathBuf, manifest: &str, course: &str) {
    let f = File::create(path).expect("create bundle");
    let mut zip = zip::ZipWriter::new(f);
    zip.start_file("manifest.json", FileOptions::default())
        .expect("start manifest");
    zip.write_all(manifest.as_bytes()).expect("write manifest");
    zip.start_file("course.json", FileOptions::default())
        .expect("start course");
    zip.write_all(course.as_bytes()).expect("write course");
    zip.finish().expect("finish zip");
}

#[test]
fn zip_export_and_import_roundtrip() {
    let dir = temp_dir("coursed-bundle-src");
    let bundle_path = dir.join("course.coursebundle.zip");
    let doc = sample_course();

    let export = exchange::export_bundle(&doc, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, exchange::BUNDLE_FORMAT_V1);
    assert_eq!(export.entry_count, 2);

    let manifest: serde_json::Value =
        serde_json::from_str(&read_entry(&bundle_path, "manifest.json")).expect("manifest json");
    assert_eq!(manifest["format"].as_str(), Some(exchange::BUNDLE_FORMAT_V1));
    assert_eq!(
        manifest["courseSha256"].as_str(),
        Some(export.course_sha256.as_str())
    );
    assert!(manifest["exportedAt"].as_str().is_some());

    let restored = exchange::import_bundle(&bundle_path, LIMIT).expect("import bundle");
    assert_eq!(restored, doc);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn tampered_course_fails_checksum() {
    let dir = temp_dir("coursed-bundle-tamper");
    let good = dir.join("good.zip");
    let bad = dir.join("bad.zip");
    exchange::export_bundle(&sample_course(), &good).expect("export bundle");

    let manifest = read_entry(&good, "manifest.json");
    let course = read_entry(&good, "course.json").replace("Bundled", "Edited");
    write_bundle(&bad, &manifest, &course);

    let e = exchange::import_bundle(&bad, LIMIT).expect_err("checksum mismatch");
    assert!(matches!(
        e.downcast_ref::<exchange::ExchangeError>(),
        Some(exchange::ExchangeError::ChecksumMismatch)
    ));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn foreign_bundle_format_is_rejected() {
    let dir = temp_dir("coursed-bundle-format");
    let path = dir.join("other.zip");
    write_bundle(&path, r#"{"format": "legacy-archive-v2"}"#, "{}");

    let e = exchange::import_bundle(&path, LIMIT).expect_err("unsupported format");
    let code = e
        .downcast_ref::<exchange::ExchangeError>()
        .map(|x| x.code());
    assert_eq!(code, Some("unsupported_format"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn oversized_course_entry_is_rejected() {
    let dir = temp_dir("coursed-bundle-size");
    let path = dir.join("course.zip");
    exchange::export_bundle(&sample_course(), &path).expect("export bundle");
    let course_len = read_entry(&path, "course.json").len() as u64;

    let e = exchange::import_bundle(&path, course_len - 1).expect_err("too large");
    let code = e
        .downcast_ref::<exchange::ExchangeError>()
        .map(|x| x.code());
    assert_eq!(code, Some("too_large"));

    let restored = exchange::import_bundle(&path, course_len).expect("exact limit");
    assert_eq!(restored, sample_course());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn parse_modules_accepts_object_or_array_and_enforces_limit() {
    let from_object =
        exchange::parse_modules(r#"{"modules": [{"id": "a"}]}"#, 1024).expect("object");
    assert_eq!(from_object.len(), 1);
    assert!(from_object[0].expanded);

    let from_array = exchange::parse_modules(r#"[{"id": 1}, {"id": 2}]"#, 1024).expect("array");
    assert_eq!(from_array.len(), 2);

    let too_big = exchange::parse_modules(r#"[{"id": 1}]"#, 4).expect_err("limit");
    assert_eq!(too_big.code(), "too_large");

    let wrong_shape = exchange::parse_modules(r#"{"modules": "nope"}"#, 1024).expect_err("shape");
    assert_eq!(wrong_shape.code(), "missing_modules");

    let bad_module = exchange::parse_modules(r#"[{"title": "no id"}]"#, 1024).expect_err("no id");
    assert_eq!(bad_module.code(), "bad_json");
}
