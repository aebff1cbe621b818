// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detector output consumed by the reconstruction pipeline.
//!
//! All coordinates are plan units (pixels of the rescaled plan image).

use bimify_geometry::Polygon;
use bimify_topology::{ObjectKind, OpeningKind, OutletKind};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{ReconstructionError, Result};

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Class tag attached to every detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionClass {
    Wall,
    Room,
    Door,
    Window,
    Bed,
    Sink,
    Wc,
    Shower,
    Bath,
    #[serde(alias = "other-furniture")]
    Furniture,
    Outlet,
    Rj45,
}

impl DetectionClass {
    pub fn object_kind(&self) -> Option<ObjectKind> {
        match self {
            DetectionClass::Bed => Some(ObjectKind::Bed),
            DetectionClass::Sink => Some(ObjectKind::Sink),
            DetectionClass::Wc => Some(ObjectKind::Wc),
            DetectionClass::Shower => Some(ObjectKind::Shower),
            DetectionClass::Bath => Some(ObjectKind::Bath),
            DetectionClass::Furniture => Some(ObjectKind::Furniture),
            _ => None,
        }
    }

    pub fn opening_kind(&self) -> Option<OpeningKind> {
        match self {
            DetectionClass::Door => Some(OpeningKind::Door),
            DetectionClass::Window => Some(OpeningKind::Window),
            _ => None,
        }
    }

    pub fn outlet_kind(&self) -> Option<OutletKind> {
        match self {
            DetectionClass::Outlet => Some(OutletKind::Power),
            DetectionClass::Rj45 => Some(OutletKind::Data),
            _ => None,
        }
    }
}

/// One raw detection, as produced by the detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub class: DetectionClass,
    /// Footprint or boundary polygon
    #[serde(default)]
    pub footprint: Vec<Point2D>,
    /// Wall centerline
    #[serde(default)]
    pub centerline: Option<[Point2D; 2]>,
    /// Wall thickness
    #[serde(default)]
    pub thickness: Option<f64>,
    /// Room classifier output
    #[serde(default)]
    pub class_id: Option<u32>,
    /// Point-like detections (outlets)
    #[serde(default)]
    pub position: Option<Point2D>,
    /// Radians, from the downward vertical
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_score")]
    pub score: f32,
    /// Identifier carried over from a previous export
    #[serde(default)]
    pub id: Option<u32>,
}

fn default_score() -> f32 {
    1.0
}

/// Detected wall (centerline and thickness)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedWall {
    pub start: Point2D,
    pub end: Point2D,
    pub thickness: f64,
    #[serde(default)]
    pub footprint: Vec<Point2D>,
    #[serde(default)]
    pub id: Option<u32>,
}

/// Detected room (closed contour)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedRoom {
    pub boundary: Vec<Point2D>,
    #[serde(default)]
    pub class_id: Option<u32>,
    #[serde(default)]
    pub id: Option<u32>,
}

/// Detected door or window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedOpening {
    pub kind: OpeningKind,
    pub footprint: Vec<Point2D>,
    #[serde(default = "default_score")]
    pub score: f32,
    #[serde(default)]
    pub id: Option<u32>,
}

/// Detected furniture or fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedObject {
    pub kind: ObjectKind,
    pub footprint: Vec<Point2D>,
    #[serde(default = "default_score")]
    pub score: f32,
    #[serde(default)]
    pub id: Option<u32>,
}

/// Detected power or data outlet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedOutlet {
    pub kind: OutletKind,
    pub position: Point2D,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub id: Option<u32>,
}

/// Complete detection result for one plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectedPlan {
    #[serde(default)]
    pub walls: Vec<DetectedWall>,
    #[serde(default)]
    pub rooms: Vec<DetectedRoom>,
    #[serde(default)]
    pub openings: Vec<DetectedOpening>,
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
    #[serde(default)]
    pub outlets: Vec<DetectedOutlet>,
}

impl DetectedPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts class-tagged detections into a plan.
    ///
    /// Walls need a centerline and a thickness, outlets a position; the error
    /// names the index of the first detection missing one.
    pub fn from_detections(detections: Vec<Detection>) -> Result<Self> {
        let mut plan = Self::new();
        for (index, d) in detections.into_iter().enumerate() {
            let invalid = |reason: &str| ReconstructionError::InvalidDetection {
                index,
                reason: reason.to_string(),
            };
            match d.class {
                DetectionClass::Wall => {
                    let [start, end] = d.centerline.ok_or_else(|| invalid("wall without centerline"))?;
                    let thickness = d.thickness.ok_or_else(|| invalid("wall without thickness"))?;
                    plan.walls.push(DetectedWall {
                        start,
                        end,
                        thickness,
                        footprint: d.footprint,
                        id: d.id,
                    });
                }
                DetectionClass::Room => plan.rooms.push(DetectedRoom {
                    boundary: d.footprint,
                    class_id: d.class_id,
                    id: d.id,
                }),
                class => {
                    if let Some(kind) = class.opening_kind() {
                        plan.openings.push(DetectedOpening {
                            kind,
                            footprint: d.footprint,
                            score: d.score,
                            id: d.id,
                        });
                    } else if let Some(kind) = class.object_kind() {
                        plan.objects.push(DetectedObject {
                            kind,
                            footprint: d.footprint,
                            score: d.score,
                            id: d.id,
                        });
                    } else if let Some(kind) = class.outlet_kind() {
                        let position = d.position.ok_or_else(|| invalid("outlet without position"))?;
                        plan.outlets.push(DetectedOutlet {
                            kind,
                            position,
                            rotation: d.rotation,
                            id: d.id,
                        });
                    }
                }
            }
        }
        Ok(plan)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builds a polygon from detector points.
pub(crate) fn polygon_from(points: &[Point2D]) -> bimify_geometry::Result<Polygon> {
    Polygon::new(points.iter().map(Point2D::to_nalgebra).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detections_are_sorted_by_class() {
        let json = r#"[
            {"class": "wall", "centerline": [{"x": 0, "y": 0}, {"x": 100, "y": 0}], "thickness": 10},
            {"class": "room", "footprint": [{"x": 0, "y": 0}, {"x": 50, "y": 0}, {"x": 50, "y": 50}], "class_id": 4},
            {"class": "door", "footprint": [{"x": 0, "y": 0}, {"x": 9, "y": 0}, {"x": 9, "y": 1}]},
            {"class": "other-furniture", "footprint": [{"x": 0, "y": 0}, {"x": 9, "y": 0}, {"x": 9, "y": 1}], "score": 0.5},
            {"class": "rj45", "position": {"x": 3, "y": 4}}
        ]"#;
        let detections: Vec<Detection> = serde_json::from_str(json).unwrap();
        let plan = DetectedPlan::from_detections(detections).unwrap();
        assert_eq!(plan.walls.len(), 1);
        assert_eq!(plan.rooms[0].class_id, Some(4));
        assert_eq!(plan.openings[0].kind, OpeningKind::Door);
        assert_eq!(plan.objects[0].kind, ObjectKind::Furniture);
        assert_eq!(plan.objects[0].score, 0.5);
        assert_eq!(plan.outlets[0].kind, OutletKind::Data);
    }

    #[test]
    fn wall_without_thickness_is_rejected() {
        let detections = vec![Detection {
            class: DetectionClass::Wall,
            footprint: Vec::new(),
            centerline: Some([Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]),
            thickness: None,
            class_id: None,
            position: None,
            rotation: 0.0,
            score: 1.0,
            id: None,
        }];
        let err = DetectedPlan::from_detections(detections).unwrap_err();
        assert!(matches!(err, ReconstructionError::InvalidDetection { index: 0, .. }));
    }

    #[test]
    fn plan_json_defaults() {
        let plan = DetectedPlan::from_json(r#"{"walls": []}"#).unwrap();
        assert!(plan.rooms.is_empty());
        assert!(DetectedPlan::from_json("not json").is_err());
    }
}
