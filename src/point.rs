use serde::{Deserialize, Serialize};

/// A clicked coordinate in the surface's own space: pixel indices for
/// images, data units for plots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkedPoint {
    pub x: f64,
    pub y: f64,
}

impl MarkedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ordered markers for one surface. Each point appears at most once; later
/// points are drawn on top of earlier ones.
///
/// Equality compares membership only. Drawing order is visible through
/// [`AnnotationSet::as_slice`].
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct AnnotationSet {
    points: Vec<MarkedPoint>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, point: &MarkedPoint) -> bool {
        self.points.contains(point)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &MarkedPoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[MarkedPoint] {
        &self.points
    }
}

impl PartialEq for AnnotationSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|p| other.contains(p))
    }
}

impl From<Vec<MarkedPoint>> for AnnotationSet {
    /// Repeated entries are dropped; the first occurrence keeps its slot.
    fn from(raw: Vec<MarkedPoint>) -> Self {
        let mut points: Vec<MarkedPoint> = Vec::with_capacity(raw.len());
        for p in raw {
            if !points.contains(&p) {
                points.push(p);
            }
        }
        Self { points }
    }
}

impl<'de> Deserialize<'de> for AnnotationSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<MarkedPoint>::deserialize(deserializer).map(Self::from)
    }
}

/// Click to mark, click again to erase. A missing click leaves the set as is.
pub fn toggle(current: AnnotationSet, clicked: Option<MarkedPoint>) -> AnnotationSet {
    let Some(p) = clicked else {
        return current;
    };
    let mut points = current.points;
    match points.iter().position(|q| *q == p) {
        Some(i) => {
            points.remove(i);
        }
        None => points.push(p),
    }
    AnnotationSet { points }
}
