use crate::point::MarkedPoint;
use serde::{Deserialize, Serialize};

/// A single point under the cursor when a surface was clicked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointHit {
    pub x: f64,
    pub y: f64,
    /// Index of the snapped-to sample, for plots.
    #[serde(rename = "pointIndex", default, skip_serializing_if = "Option::is_none")]
    pub point_index: Option<usize>,
}

/// What a surface reports for one click. Only the first hit is used.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    #[serde(default)]
    pub points: Vec<PointHit>,
}

impl ClickEvent {
    pub fn single(hit: PointHit) -> Self {
        Self { points: vec![hit] }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn first_point(&self) -> Option<MarkedPoint> {
        let hit = self.points.first()?;
        if !hit.x.is_finite() || !hit.y.is_finite() {
            log::debug!("Ignoring click with non-finite coordinates");
            return None;
        }
        Some(MarkedPoint::new(hit.x, hit.y))
    }

    /// Parse a `{"points": [{"x": .., "y": ..}, ..]}` payload.
    #[cfg(test)]
    pub fn parse(data: &str) -> Option<Self> {
        match serde_json::from_str(data) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("Ignoring malformed click payload: {e}");
                None
            }
        }
    }
}
