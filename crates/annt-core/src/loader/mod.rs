//! Dataset loading.
//!
//! A dataset is a directory with this layout:
//!
//! ```text
//! root/
//!   taginfo.json        {"tags": [{"colorIdx": 0, "tagName": "cat"}, ...]}
//!   images/             a.png, b.jpg, ...
//!   annotations/        a.json, b.json, ...
//! ```
//!
//! An image is paired with the annotation file named after the image file up
//! to its first `.`, with a `.json` extension. Images without an annotation
//! file are skipped.
//!
//! Annotation files hold `{"objects": [{"typ": 1, "name": "cat", "position": [x, y, w, h]}]}`.
//! Only `typ == 1` (box) objects whose tag is declared in `taginfo.json`
//! become boxes. A file without an `objects` key yields no annotation.
//!
//! # Examples
//!
//! ```ignore
//! use annt_core::loader::Dataset;
//!
//! let dataset = Dataset::open("data/animals")?;
//! for annotation in dataset.annotations()? {
//!     let annotation = annotation?;
//!     println!("{}: {} boxes", annotation, annotation.boxes.len());
//! }
//! ```

mod dataset;
mod types;

pub use dataset::{load_annotation_file, load_tag_info, Annotations, Dataset};
pub use types::{LoadError, TagInfo};
