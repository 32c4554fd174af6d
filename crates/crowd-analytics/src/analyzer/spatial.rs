/// Spatial distribution of detections over a fixed 3x3 frame grid
use super::density::DensityLevel;
use super::SeriesAnalyzer;
use common::samples::{FrameGeometry, Sample};
use serde::{Deserialize, Serialize};

pub const GRID_ROWS: usize = 3;
pub const GRID_COLS: usize = 3;

/// Zones holding more than this share of detections are hotspots
const HOTSPOT_PERCENTAGE: f64 = 15.0;

const ROW_NAMES: [&str; GRID_ROWS] = ["Top", "Middle", "Bottom"];
const COL_NAMES: [&str; GRID_COLS] = ["Left", "Center", "Right"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionPattern {
    #[serde(rename = "No data")]
    NoData,
    Uniform,
    Concentrated,
    #[serde(rename = "Bi-modal")]
    BiModal,
    Distributed,
}

impl DistributionPattern {
    fn from_hotspot_count(count: usize) -> Self {
        match count {
            0 => Self::Uniform,
            1 => Self::Concentrated,
            2 => Self::BiModal,
            _ => Self::Distributed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStats {
    pub zone_id: String,
    pub row: usize,
    pub col: usize,
    /// Human-readable position, e.g. "Top-Left"
    pub position: String,
    pub detection_count: u64,
    /// Share of all valid detections in the series (0 to 100)
    pub percentage: f64,
    pub density_level: DensityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialDistribution {
    pub distribution_pattern: DistributionPattern,
    pub total_detections_analyzed: u64,
    /// Malformed boxes that were ignored
    pub skipped_detections: u64,
    pub zones: Vec<ZoneStats>,
    /// Zones above the hotspot share, most crowded first
    pub hotspots: Vec<ZoneStats>,
    pub grid_size: GridSize,
}

impl SpatialDistribution {
    fn no_data(skipped_detections: u64) -> Self {
        Self {
            distribution_pattern: DistributionPattern::NoData,
            total_detections_analyzed: 0,
            skipped_detections,
            zones: Vec::new(),
            hotspots: Vec::new(),
            grid_size: GridSize {
                rows: GRID_ROWS,
                cols: GRID_COLS,
            },
        }
    }

    pub fn has_data(&self) -> bool {
        self.distribution_pattern != DistributionPattern::NoData
    }
}

/// Zone density by share of detections
fn zone_density(percentage: f64) -> DensityLevel {
    if percentage > 20.0 {
        DensityLevel::VeryHigh
    } else if percentage > 15.0 {
        DensityLevel::High
    } else if percentage > 10.0 {
        DensityLevel::Moderate
    } else if percentage > 5.0 {
        DensityLevel::Low
    } else {
        DensityLevel::VeryLow
    }
}

/// Map a center coordinate to a cell index: `clamp(floor(center / cell), 0, max)`
fn cell_index(center: f64, cell_size: f64, max_index: usize) -> usize {
    (center / cell_size).floor().clamp(0.0, max_index as f64) as usize
}

pub struct SpatialZoneAnalyzer {
    frame: FrameGeometry,
}

impl SpatialZoneAnalyzer {
    pub fn new(frame: FrameGeometry) -> Self {
        Self { frame }
    }
}

impl SeriesAnalyzer for SpatialZoneAnalyzer {
    type Output = SpatialDistribution;

    fn id(&self) -> &'static str {
        "spatial_zone_analyzer"
    }

    fn analyze(&self, samples: &[Sample]) -> SpatialDistribution {
        let mut counts = [[0u64; GRID_COLS]; GRID_ROWS];
        let mut total = 0u64;
        let mut skipped = 0u64;

        if self.frame.is_empty() {
            tracing::warn!(
                width = self.frame.width,
                height = self.frame.height,
                "frame geometry has no area, skipping zone analysis"
            );
            let malformed = samples
                .iter()
                .flat_map(|s| s.boxes())
                .filter(|bbox| !bbox.is_valid())
                .count();
            return SpatialDistribution::no_data(malformed as u64);
        }

        let cell_width = f64::from(self.frame.width) / GRID_COLS as f64;
        let cell_height = f64::from(self.frame.height) / GRID_ROWS as f64;

        for bbox in samples.iter().flat_map(|s| s.boxes()) {
            if !bbox.is_valid() {
                skipped += 1;
                continue;
            }

            let (center_x, center_y) = bbox.center();
            let col = cell_index(center_x, cell_width, GRID_COLS - 1);
            let row = cell_index(center_y, cell_height, GRID_ROWS - 1);

            counts[row][col] += 1;
            total += 1;
        }

        if skipped > 0 {
            tracing::debug!(skipped, "skipped malformed bounding boxes");
        }

        if total == 0 {
            return SpatialDistribution::no_data(skipped);
        }

        let mut zones = Vec::with_capacity(GRID_ROWS * GRID_COLS);
        for (row, row_counts) in counts.iter().enumerate() {
            for (col, &count) in row_counts.iter().enumerate() {
                let percentage = count as f64 / total as f64 * 100.0;
                zones.push(ZoneStats {
                    zone_id: format!("zone_{}_{}", row, col),
                    row,
                    col,
                    position: format!("{}-{}", ROW_NAMES[row], COL_NAMES[col]),
                    detection_count: count,
                    percentage,
                    density_level: zone_density(percentage),
                });
            }
        }

        // stable sort keeps row-major order among equal shares
        let mut hotspots: Vec<ZoneStats> = zones
            .iter()
            .filter(|z| z.percentage > HOTSPOT_PERCENTAGE)
            .cloned()
            .collect();
        hotspots.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        SpatialDistribution {
            distribution_pattern: DistributionPattern::from_hotspot_count(hotspots.len()),
            total_detections_analyzed: total,
            skipped_detections: skipped,
            zones,
            hotspots,
            grid_size: GridSize {
                rows: GRID_ROWS,
                cols: GRID_COLS,
            },
        }
    }
}
