//! Occupancy sample contracts handed to the analytics engine.
//!
//! A detection collaborator turns decoded video frames into [`Sample`]s: one
//! per sampled frame, carrying the person count and (optionally) the person
//! bounding boxes it found. The engine never sees pixels.

use serde::{Deserialize, Serialize};

/// One sampled video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Frame number within the source video
    #[serde(alias = "frame_number")]
    pub frame_index: u64,

    /// Offset from the start of the video in seconds
    #[serde(alias = "timestamp")]
    pub timestamp_seconds: f64,

    /// Number of people detected in the frame.
    ///
    /// Signed on the wire so a misbehaving detector cannot make the whole
    /// sequence undeserializable; read it through [`Sample::occupancy`].
    #[serde(alias = "person_count")]
    pub occupancy_count: i64,

    /// Per-person bounding boxes, when the detector reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<BoundingBox>>,
}

impl Sample {
    pub fn new(frame_index: u64, timestamp_seconds: f64, occupancy_count: i64) -> Self {
        Self {
            frame_index,
            timestamp_seconds,
            occupancy_count,
            detections: None,
        }
    }

    /// Attach detection boxes to the sample
    pub fn with_detections(mut self, detections: Vec<BoundingBox>) -> Self {
        self.detections = Some(detections);
        self
    }

    /// Occupancy clamped to zero; negative counts are treated as empty frames
    pub fn occupancy(&self) -> u32 {
        self.occupancy_count.clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Detection boxes, or an empty slice when none were reported
    pub fn boxes(&self) -> &[BoundingBox] {
        self.detections.as_deref().unwrap_or(&[])
    }
}

/// Corner-form bounding box in frame pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,

    /// Detector confidence (0.0 to 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
        }
    }

    /// A box is usable only when it has finite corners and positive extent
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x2 > self.x1
            && self.y2 > self.y1
    }

    /// Center point (x, y)
    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// Pixel dimensions of the analysed video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Returns true when timestamps never decrease
pub fn is_time_ordered(samples: &[Sample]) -> bool {
    samples
        .windows(2)
        .all(|w| w[0].timestamp_seconds <= w[1].timestamp_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_occupancy_clamps_to_zero() {
        let sample = Sample::new(0, 0.0, -4);
        assert_eq!(sample.occupancy(), 0);
        assert_eq!(Sample::new(1, 1.0, 12).occupancy(), 12);
    }

    #[test]
    fn test_bounding_box_validity() {
        assert!(BoundingBox::new(10.0, 10.0, 20.0, 40.0, 0.9).is_valid());
        assert!(!BoundingBox::new(20.0, 10.0, 10.0, 40.0, 0.9).is_valid());
        assert!(!BoundingBox::new(10.0, 10.0, 20.0, 10.0, 0.9).is_valid());
        assert!(!BoundingBox::new(f64::NAN, 10.0, 20.0, 40.0, 0.9).is_valid());
    }

    #[test]
    fn test_sample_accepts_detector_field_names() {
        let sample: Sample = serde_json::from_value(serde_json::json!({
            "frame_number": 30,
            "timestamp": 1.0,
            "person_count": 7,
            "detections": [{"x1": 0.0, "y1": 0.0, "x2": 10.0, "y2": 20.0}]
        }))
        .unwrap();

        assert_eq!(sample.frame_index, 30);
        assert_eq!(sample.occupancy(), 7);
        assert_eq!(sample.boxes().len(), 1);
        assert_eq!(sample.boxes()[0].confidence, 1.0);
        assert_eq!(sample.boxes()[0].center(), (5.0, 10.0));
    }

    #[test]
    fn test_time_ordering() {
        let ordered = vec![Sample::new(0, 0.0, 1), Sample::new(1, 1.0, 1)];
        let unordered = vec![Sample::new(0, 2.0, 1), Sample::new(1, 1.0, 1)];
        assert!(is_time_ordered(&ordered));
        assert!(!is_time_ordered(&unordered));
        assert!(is_time_ordered(&[]));
    }
}
