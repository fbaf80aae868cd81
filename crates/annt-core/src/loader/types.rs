//! File formats and errors for dataset loading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Object type code of a bounding box in annotation files.
pub(crate) const OBJECT_TYPE_BOX: i64 = 1;

/// Error types for dataset loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A required directory or file is missing.
    #[error("{0} does not exist")]
    NotFound(PathBuf),

    /// A file parsed as JSON but does not have the expected structure.
    #[error("Invalid format in {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    /// I/O error while reading a file or directory.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid JSON.
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An image file could not be decoded.
    #[error("Failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A tag declared in `taginfo.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    #[serde(rename = "colorIdx")]
    pub color_idx: u32,
    #[serde(rename = "tagName")]
    pub tag_name: String,
}

/// Contents of `taginfo.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct MetaFile {
    pub tags: Option<Vec<TagInfo>>,
}

/// Contents of a per-image annotation file.
#[derive(Debug, Deserialize)]
pub(crate) struct AnnotationFile {
    pub objects: Option<Vec<ObjectEntry>>,
}

/// One object of an annotation file. Only box objects are required to carry
/// a string name and an `[x, y, w, h]` position; other types keep their own
/// shapes for both fields.
#[derive(Debug, Deserialize)]
pub(crate) struct ObjectEntry {
    pub typ: i64,
    #[serde(default)]
    pub name: Option<serde_json::Value>,
    #[serde(default)]
    pub position: Option<serde_json::Value>,
}
