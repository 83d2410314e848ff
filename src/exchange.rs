use crate::course::{CourseDocument, EntityId, Module};
use anyhow::Context;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const COURSE_ENTRY: &str = "course.json";
pub const BUNDLE_FORMAT_V1: &str = "coursed-bundle-v1";

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("invalid JSON: {0}")]
    MalformedJson(String),

    #[error("expected a modules array")]
    MissingModules,

    #[error("payload is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("duplicate module id: {0}")]
    DuplicateModuleId(String),

    #[error("duplicate lesson id {lesson} in module {module}")]
    DuplicateLessonId { module: String, lesson: String },

    #[error("unsupported bundle format: {0}")]
    UnsupportedFormat(String),

    #[error("course checksum does not match manifest")]
    ChecksumMismatch,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExchangeError {
    pub fn code(&self) -> &'static str {
        match self {
            ExchangeError::MalformedJson(_) => "bad_json",
            ExchangeError::MissingModules => "missing_modules",
            ExchangeError::TooLarge { .. } => "too_large",
            ExchangeError::DuplicateModuleId(_) | ExchangeError::DuplicateLessonId { .. } => {
                "duplicate_id"
            }
            ExchangeError::UnsupportedFormat(_) => "unsupported_format",
            ExchangeError::ChecksumMismatch => "checksum_mismatch",
            ExchangeError::Io(_) => "io_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BundleSummary {
    pub bundle_format: String,
    pub course_sha256: String,
    pub entry_count: usize,
}

/// The document verbatim as JSON.
pub fn export_json(doc: &CourseDocument, pretty: bool) -> anyhow::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(doc)
    } else {
        serde_json::to_string(doc)
    };
    text.context("failed to serialize course")
}

pub fn write_json(doc: &CourseDocument, out_path: &Path, pretty: bool) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let text = export_json(doc, pretty)?;
    std::fs::write(out_path, text)
        .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))
}

/// Ids must be unique among modules and among the lessons of each module.
pub fn check_unique_ids(modules: &[Module]) -> Result<(), ExchangeError> {
    let mut module_ids: HashSet<&EntityId> = HashSet::new();
    for m in modules {
        if !module_ids.insert(&m.id) {
            return Err(ExchangeError::DuplicateModuleId(m.id.to_string()));
        }
        let mut lesson_ids: HashSet<&EntityId> = HashSet::new();
        for l in &m.lessons {
            if !lesson_ids.insert(&l.id) {
                return Err(ExchangeError::DuplicateLessonId {
                    module: m.id.to_string(),
                    lesson: l.id.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Parses an import blob: either `{"modules": [...]}` or a bare array.
pub fn parse_modules(text: &str, max_bytes: u64) -> Result<Vec<Module>, ExchangeError> {
    let size = text.len() as u64;
    if size > max_bytes {
        return Err(ExchangeError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ExchangeError::MalformedJson(e.to_string()))?;
    let raw = match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut obj) => match obj.remove("modules") {
            Some(v @ serde_json::Value::Array(_)) => v,
            _ => return Err(ExchangeError::MissingModules),
        },
        _ => return Err(ExchangeError::MissingModules),
    };
    let modules: Vec<Module> =
        serde_json::from_value(raw).map_err(|e| ExchangeError::MalformedJson(e.to_string()))?;
    check_unique_ids(&modules)?;
    Ok(modules)
}

pub fn read_modules_file(path: &Path, max_bytes: u64) -> Result<Vec<Module>, ExchangeError> {
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(ExchangeError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let text = std::fs::read_to_string(path)?;
    parse_modules(&text, max_bytes)
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn export_bundle(doc: &CourseDocument, out_path: &Path) -> anyhow::Result<BundleSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let course_text = serde_json::to_string_pretty(doc).context("failed to serialize course")?;
    let course_sha256 = sha256_hex(course_text.as_bytes());

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
        "courseSha256": course_sha256,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(COURSE_ENTRY, opts)
        .context("failed to start course entry")?;
    zip.write_all(course_text.as_bytes())
        .context("failed to write course entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(BundleSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        course_sha256,
        entry_count: 2,
    })
}

/// `max_bytes` caps the uncompressed size of `course.json`.
pub fn import_bundle(in_path: &Path, max_bytes: u64) -> anyhow::Result<CourseDocument> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(ExchangeError::UnsupportedFormat(format.to_string()).into());
    }

    let mut course_text = String::new();
    {
        let mut entry = archive
            .by_name(COURSE_ENTRY)
            .context("bundle missing course.json")?;
        let size = entry.size();
        if size > max_bytes {
            return Err(ExchangeError::TooLarge {
                size,
                limit: max_bytes,
            }
            .into());
        }
        // The header size is not trusted; stop reading past the limit.
        (&mut entry)
            .take(max_bytes.saturating_add(1))
            .read_to_string(&mut course_text)
            .context("failed to read course.json")?;
    }
    let read = course_text.len() as u64;
    if read > max_bytes {
        return Err(ExchangeError::TooLarge {
            size: read,
            limit: max_bytes,
        }
        .into());
    }

    let expected = manifest
        .get("courseSha256")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if sha256_hex(course_text.as_bytes()) != expected {
        return Err(ExchangeError::ChecksumMismatch.into());
    }

    let doc: CourseDocument =
        serde_json::from_str(&course_text).context("course.json is not a course document")?;
    check_unique_ids(&doc.modules)?;
    Ok(doc)
}
