use crate::click::ClickEvent;
use crate::point::{toggle, AnnotationSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Malformed marker data: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Serialize markers as a JSON list of `{x, y}` records.
pub fn encode(set: &AnnotationSet) -> String {
    serde_json::to_string(set).unwrap_or_else(|e| {
        log::error!("Could not serialize {} markers: {e}", set.len());
        "[]".to_owned()
    })
}

pub fn try_decode(data: &str) -> Result<AnnotationSet, StoreError> {
    let data = data.trim();
    if data.is_empty() || data == "null" {
        return Ok(AnnotationSet::new());
    }
    Ok(serde_json::from_str(data)?)
}

/// Like [`try_decode`], but anything unreadable starts the surface over
/// with no markers.
pub fn decode(data: &str) -> AnnotationSet {
    try_decode(data).unwrap_or_else(|e| {
        log::warn!("Discarding stored markers: {e}");
        AnnotationSet::new()
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Lives as long as the window.
    #[default]
    Memory,
    /// Sidecar JSON file next to the image.
    File,
}

/// Where one surface keeps its serialized markers between clicks.
#[derive(Debug)]
pub enum SurfaceStore {
    Memory(String),
    File(PathBuf),
}

impl SurfaceStore {
    pub fn memory() -> Self {
        Self::Memory(encode(&AnnotationSet::new()))
    }

    pub fn file(path: PathBuf) -> Self {
        Self::File(path)
    }

    pub fn open(kind: StorageType, image_path: &Path, surface_key: &str) -> Self {
        match kind {
            StorageType::Memory => Self::memory(),
            StorageType::File => Self::file(sidecar_path(image_path, surface_key)),
        }
    }

    pub fn load(&self) -> AnnotationSet {
        match self {
            Self::Memory(data) => decode(data),
            Self::File(path) => match std::fs::read_to_string(path) {
                Ok(data) => decode(&data),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => AnnotationSet::new(),
                Err(e) => {
                    log::warn!("Could not read {}: {e}", path.display());
                    AnnotationSet::new()
                }
            },
        }
    }

    pub fn save(&mut self, set: &AnnotationSet) -> Result<(), StoreError> {
        let data = encode(set);
        match self {
            Self::Memory(slot) => {
                *slot = data;
                Ok(())
            }
            Self::File(path) => std::fs::write(&*path, data).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

/// `photo.jpg` + `"image"` -> `photo.image.clicks.json`
pub fn sidecar_path(image_path: &Path, surface_key: &str) -> PathBuf {
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("annotations");
    image_path.with_file_name(format!("{stem}.{surface_key}.clicks.json"))
}

/// One click transition: rehydrate, toggle, write back.
pub fn apply_click(store: &mut SurfaceStore, event: Option<&ClickEvent>) -> AnnotationSet {
    let current = store.load();
    let clicked = event.and_then(ClickEvent::first_point);
    let next = toggle(current, clicked);
    // Without a click nothing changed; leave the stored bytes alone.
    let Some(p) = clicked else {
        return next;
    };
    log::debug!("toggle ({}, {}) -> {:?}", p.x, p.y, next.as_slice());
    if let Err(e) = store.save(&next) {
        log::warn!("Markers not persisted: {e}");
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::click::PointHit;
    use crate::point::MarkedPoint;

    fn click(x: f64, y: f64) -> ClickEvent {
        ClickEvent {
            points: vec![PointHit {
                x,
                y,
                point_index: None,
            }],
        }
    }

    #[test]
    fn empty_list_round_trips() {
        assert_eq!(encode(&AnnotationSet::new()), "[]");
        assert!(decode("[]").is_empty());
    }

    #[test]
    fn records_are_x_y_objects() {
        let set: AnnotationSet = vec![MarkedPoint::new(10.0, 20.5)].into();
        assert_eq!(encode(&set), r#"[{"x":10.0,"y":20.5}]"#);
    }

    #[test]
    fn decode_restores_order() {
        let set: AnnotationSet = vec![
            MarkedPoint::new(3.0, 1.0),
            MarkedPoint::new(1.0, 3.0),
            MarkedPoint::new(-2.5, 0.125),
        ]
        .into();
        let back = decode(&encode(&set));
        assert_eq!(back.as_slice(), set.as_slice());
    }

    #[test]
    fn garbage_starts_empty() {
        for data in ["", "null", "{", r#"{"x":1}"#, r#"[{"x":1}]"#, r#"[{"x":null,"y":1}]"#, "42"] {
            assert!(decode(data).is_empty(), "{data}");
        }
        assert!(try_decode("{").is_err());
        assert!(try_decode("").is_ok());
    }

    #[test]
    fn non_finite_coordinates_keep_the_other_markers() {
        let set: AnnotationSet =
            vec![MarkedPoint::new(f64::NAN, 0.0), MarkedPoint::new(1.0, 2.0)].into();
        assert_eq!(encode(&set), r#"[{"x":null,"y":0.0},{"x":1.0,"y":2.0}]"#);
    }

    #[test]
    fn bare_pairs_are_accepted() {
        let set = decode("[[10, 20], [3.5, 4]]");
        assert_eq!(
            set.as_slice(),
            &[MarkedPoint::new(10.0, 20.0), MarkedPoint::new(3.5, 4.0)]
        );
    }

    #[test]
    fn memory_store_rehydrates_each_click() {
        let mut store = SurfaceStore::memory();
        let after = apply_click(&mut store, Some(&click(10.0, 20.0)));
        assert_eq!(after.len(), 1);
        match &store {
            SurfaceStore::Memory(data) => assert_eq!(data, r#"[{"x":10.0,"y":20.0}]"#),
            SurfaceStore::File(_) => unreachable!(),
        }
        let after = apply_click(&mut store, Some(&click(10.0, 20.0)));
        assert!(after.is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn no_click_leaves_store_alone() {
        let mut store = SurfaceStore::memory();
        apply_click(&mut store, Some(&click(1.0, 1.0)));
        let after = apply_click(&mut store, None);
        assert_eq!(after.len(), 1);
        let empty = ClickEvent { points: Vec::new() };
        assert_eq!(apply_click(&mut store, Some(&empty)).len(), 1);
    }

    #[test]
    fn surfaces_do_not_share_state() {
        let mut image = SurfaceStore::memory();
        let mut graph = SurfaceStore::memory();
        apply_click(&mut image, Some(&click(5.0, 5.0)));
        assert!(graph.load().is_empty());
        apply_click(&mut graph, Some(&click(5.0, 5.0)));
        assert_eq!(image.load().len(), 1);
        assert_eq!(graph.load().len(), 1);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("nebula.jpg");
        let mut store = SurfaceStore::open(StorageType::File, &image, "image");
        assert!(store.load().is_empty());
        apply_click(&mut store, Some(&click(7.0, 8.0)));
        apply_click(&mut store, Some(&click(1.0, 2.0)));

        let reopened = SurfaceStore::open(StorageType::File, &image, "image");
        assert_eq!(
            reopened.load().as_slice(),
            &[MarkedPoint::new(7.0, 8.0), MarkedPoint::new(1.0, 2.0)]
        );
        assert!(dir.path().join("nebula.image.clicks.json").exists());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let mut store = SurfaceStore::file(path.clone());
        assert!(store.load().is_empty());
        apply_click(&mut store, Some(&click(1.0, 1.0)));
        assert_eq!(std::fs::read_to_string(path).unwrap(), r#"[{"x":1.0,"y":1.0}]"#);
    }

    #[test]
    fn no_click_never_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edited.json");
        std::fs::write(&path, "[{\"x\": 1, oops").unwrap();
        let mut store = SurfaceStore::file(path.clone());
        assert!(apply_click(&mut store, None).is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[{\"x\": 1, oops");

        let missing = dir.path().join("missing.json");
        apply_click(&mut SurfaceStore::file(missing.clone()), None);
        assert!(!missing.exists());
    }

    #[test]
    fn sidecar_names_follow_surface() {
        let p = sidecar_path(Path::new("/tmp/Crab_Nebula.jpg"), "graph");
        assert_eq!(p, PathBuf::from("/tmp/Crab_Nebula.graph.clicks.json"));
    }
}
