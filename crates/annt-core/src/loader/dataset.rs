//! Directory walking and per-file loaders.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::types::{AnnotationFile, LoadError, MetaFile, TagInfo, OBJECT_TYPE_BOX};
use crate::annotation::Annotation;
use crate::bbox::BoundingBox;
use crate::color::{build_color_map, ColorMap, ColorScheme};
use crate::raster::Raster;

const IMAGES_DIR: &str = "images";
const ANNOTATIONS_DIR: &str = "annotations";
const META_FILE: &str = "taginfo.json";

/// An opened dataset directory.
///
/// Opening reads the tag metadata and builds the color map shared by every
/// annotation the dataset yields. Images are decoded lazily by
/// [`Dataset::annotations`].
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    tags: Vec<TagInfo>,
    tag_names: HashSet<Arc<str>>,
    color_map: Arc<ColorMap>,
}

impl Dataset {
    /// Open a dataset with the default color scheme.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` if `root`, `root/images` or
    /// `root/annotations` is not a directory, and `LoadError::InvalidFormat`
    /// if `taginfo.json` has no `tags` key.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::open_with_scheme(root, &ColorScheme::default())
    }

    /// Open a dataset, coloring tags with `scheme`.
    pub fn open_with_scheme(root: impl AsRef<Path>, scheme: &ColorScheme) -> Result<Self, LoadError> {
        let root = root.as_ref().to_path_buf();
        for dir in [root.clone(), root.join(IMAGES_DIR), root.join(ANNOTATIONS_DIR)] {
            if !dir.is_dir() {
                return Err(LoadError::NotFound(dir));
            }
        }

        let meta_path = root.join(META_FILE);
        let tags = load_tag_info(&meta_path)?;
        let color_map = build_color_map(
            tags.iter().map(|t| (t.tag_name.as_str(), t.color_idx)),
            scheme,
        )
        .map_err(|e| LoadError::InvalidFormat {
            path: meta_path.clone(),
            reason: e.to_string(),
        })?;
        let tag_names: HashSet<Arc<str>> =
            tags.iter().map(|t| Arc::from(t.tag_name.as_str())).collect();

        log::debug!("opened dataset {} with {} tags", root.display(), tags.len());

        Ok(Self {
            root,
            tags,
            tag_names,
            color_map: Arc::new(color_map),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Tags declared in `taginfo.json`, in file order.
    pub fn tags(&self) -> &[TagInfo] {
        &self.tags
    }

    /// Tag → color map shared by all annotations of this dataset.
    pub fn color_map(&self) -> &Arc<ColorMap> {
        &self.color_map
    }

    /// Iterate over the annotated images, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Io` if the image directory cannot be listed.
    pub fn annotations(&self) -> Result<Annotations<'_>, LoadError> {
        let image_dir = self.root.join(IMAGES_DIR);
        let entries = fs::read_dir(&image_dir).map_err(|source| LoadError::Io {
            path: image_dir.clone(),
            source,
        })?;

        let mut images = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Io {
                path: image_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() {
                images.push(path);
            }
        }
        images.sort();

        Ok(Annotations {
            dataset: self,
            images: images.into_iter(),
        })
    }

    /// Load every annotated image at once.
    pub fn load_all(&self) -> Result<Vec<Annotation>, LoadError> {
        self.annotations()?.collect()
    }

    /// Annotation file paired with an image: the image file name up to its
    /// first `.`, plus `.json`.
    fn annotation_path_for(&self, image_path: &Path) -> Option<PathBuf> {
        let file_name = image_path.file_name()?.to_str()?;
        let stem = file_name.split('.').next()?;
        Some(self.root.join(ANNOTATIONS_DIR).join(format!("{stem}.json")))
    }

    fn load_one(&self, image_path: &Path) -> Result<Option<Annotation>, LoadError> {
        let Some(annotation_path) = self.annotation_path_for(image_path) else {
            log::debug!("skipping {}: file name is not UTF-8", image_path.display());
            return Ok(None);
        };
        if !annotation_path.is_file() {
            log::debug!("skipping {}: no annotation file", image_path.display());
            return Ok(None);
        }

        let image = load_image(image_path)?;
        let boxes = load_annotation_file(
            &annotation_path,
            image.width,
            image.height,
            Some(&self.tag_names),
        )?;
        let Some(boxes) = boxes else {
            log::warn!(
                "skipping {}: {} has no objects",
                image_path.display(),
                annotation_path.display()
            );
            return Ok(None);
        };

        let filename = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(Some(
            Annotation::new(filename, image, boxes).with_color_map(Arc::clone(&self.color_map)),
        ))
    }
}

/// Lazy iterator over the annotations of a [`Dataset`].
#[derive(Debug)]
pub struct Annotations<'a> {
    dataset: &'a Dataset,
    images: std::vec::IntoIter<PathBuf>,
}

impl Iterator for Annotations<'_> {
    type Item = Result<Annotation, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        for image_path in self.images.by_ref() {
            match self.dataset.load_one(&image_path) {
                Ok(Some(annotation)) => return Some(Ok(annotation)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the tag list from a `taginfo.json` file.
pub fn load_tag_info(path: &Path) -> Result<Vec<TagInfo>, LoadError> {
    let meta: MetaFile = read_json(path)?;
    meta.tags.ok_or_else(|| LoadError::InvalidFormat {
        path: path.to_path_buf(),
        reason: "missing `tags`".to_string(),
    })
}

/// Read the boxes of one annotation file, anchored to an
/// `image_width x image_height` image.
///
/// Only box objects are kept, and when `available_tags` is given only boxes
/// whose tag is in it. Returns `Ok(None)` when the file has no `objects` key.
pub fn load_annotation_file(
    path: &Path,
    image_width: u32,
    image_height: u32,
    available_tags: Option<&HashSet<Arc<str>>>,
) -> Result<Option<Vec<BoundingBox>>, LoadError> {
    let file: AnnotationFile = read_json(path)?;
    let Some(objects) = file.objects else {
        return Ok(None);
    };

    let invalid = |reason: String| LoadError::InvalidFormat {
        path: path.to_path_buf(),
        reason,
    };

    let mut boxes = Vec::new();
    for (i, object) in objects.into_iter().enumerate() {
        if object.typ != OBJECT_TYPE_BOX {
            continue;
        }
        let name = match object.name {
            Some(serde_json::Value::String(name)) => name,
            Some(other) => {
                return Err(invalid(format!("object {i} name is not a string: {other}")));
            }
            None => return Err(invalid(format!("object {i} has no name"))),
        };
        let tag: Arc<str> = match available_tags {
            Some(tags) => match tags.get(name.as_str()) {
                Some(tag) => Arc::clone(tag),
                None => {
                    log::debug!("{}: ignoring undeclared tag {name:?}", path.display());
                    continue;
                }
            },
            None => Arc::from(name),
        };

        let position = object
            .position
            .ok_or_else(|| invalid(format!("object {i} has no position")))?;
        let [x, y, w, h]: [f64; 4] = serde_json::from_value(position)
            .map_err(|e| invalid(format!("object {i} position: {e}")))?;

        boxes.push(BoundingBox::new(tag, image_width, image_height, x, y, w, h));
    }

    Ok(Some(boxes))
}

/// Decode an image file to RGB8. EXIF orientation is not applied, so box
/// coordinates stay in stored pixel space.
fn load_image(path: &Path) -> Result<Raster, LoadError> {
    let img = image::open(path).map_err(|source| LoadError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Raster::from_rgb_image(img.into_rgb8()))
}
