use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{SIMPLIFY_DISTANCE, STRAIGHTNESS_THRESHOLD, STROKE_GAP_DISTANCE};

/// Canvas coordinates; y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Keep the first point, every point farther than `threshold` from the last
/// kept one, and always the final point. Single pass.
pub fn simplify(points: &[Point], threshold: f64) -> Vec<Point> {
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut kept = vec![*first];
    let mut last_kept_index = 0;
    for (offset, point) in rest.iter().enumerate() {
        let last = kept[kept.len() - 1];
        if last.distance_to(point) > threshold {
            kept.push(*point);
            last_kept_index = offset + 1;
        }
    }

    if last_kept_index < points.len() - 1 {
        kept.push(points[points.len() - 1]);
    }
    kept
}

/// Split wherever two consecutive points are more than `gap` apart. Every
/// returned stroke is non-empty.
pub fn segment(points: &[Point], gap: f64) -> Vec<Vec<Point>> {
    let mut strokes: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    for point in points {
        if let Some(previous) = current.last() {
            if previous.distance_to(point) > gap {
                strokes.push(std::mem::take(&mut current));
            }
        }
        current.push(*point);
    }
    if !current.is_empty() {
        strokes.push(current);
    }
    strokes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Right,
    Left,
    Down,
    Up,
    DownRight,
    UpRight,
    DownLeft,
    UpLeft,
}

impl Direction {
    /// 2:1 dominant-axis rule. A zero displacement lands in the last
    /// diagonal bucket, `UpLeft`.
    pub fn classify(dx: f64, dy: f64) -> Self {
        let (abs_x, abs_y) = (dx.abs(), dy.abs());
        if abs_x > abs_y * 2.0 {
            if dx > 0.0 { Self::Right } else { Self::Left }
        } else if abs_y > abs_x * 2.0 {
            if dy > 0.0 { Self::Down } else { Self::Up }
        } else if dx > 0.0 && dy > 0.0 {
            Self::DownRight
        } else if dx > 0.0 && dy < 0.0 {
            Self::UpRight
        } else if dx < 0.0 && dy > 0.0 {
            Self::DownLeft
        } else {
            Self::UpLeft
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Down => "down",
            Self::Up => "up",
            Self::DownRight => "down-right",
            Self::UpRight => "up-right",
            Self::DownLeft => "down-left",
            Self::UpLeft => "up-left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeShape {
    Straight,
    Curved,
}

impl StrokeShape {
    /// Strokes of two points or fewer are straight by definition. So is a
    /// stroke with no path length at all.
    pub fn classify(stroke: &[Point]) -> Self {
        if stroke.len() <= 2 {
            return Self::Straight;
        }
        let path_length: f64 = stroke.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
        if path_length == 0.0 {
            return Self::Straight;
        }
        let chord = stroke[0].distance_to(&stroke[stroke.len() - 1]);
        if chord / path_length > STRAIGHTNESS_THRESHOLD {
            Self::Straight
        } else {
            Self::Curved
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeSummary {
    pub direction: Direction,
    /// Start-to-end distance, rounded to whole pixels.
    pub length: u32,
    pub shape: StrokeShape,
}

pub fn summarize(stroke: &[Point]) -> Option<StrokeSummary> {
    let (start, end) = (stroke.first()?, stroke.last()?);
    Some(StrokeSummary {
        direction: Direction::classify(end.x - start.x, end.y - start.y),
        length: start.distance_to(end).round() as u32,
        shape: StrokeShape::classify(stroke),
    })
}

/// Raw capture → strokes → simplified strokes → per-stroke summaries.
/// Gaps are measured on the raw points; each stroke keeps its own endpoints.
pub fn analyze(points: &[Point]) -> Vec<StrokeSummary> {
    segment(points, STROKE_GAP_DISTANCE)
        .iter()
        .map(|stroke| simplify(stroke, SIMPLIFY_DISTANCE))
        .filter_map(|stroke| summarize(&stroke))
        .collect()
}

/// Text handed to the identification call, one line per stroke.
pub fn describe(points: &[Point]) -> String {
    let summaries = analyze(points);
    if summaries.is_empty() {
        return "No drawing provided".to_string();
    }

    let mut description = format!("Drawing with {} strokes:\n", summaries.len());
    for (index, summary) in summaries.iter().enumerate() {
        let shape = match summary.shape {
            StrokeShape::Straight => "straight line",
            StrokeShape::Curved => "curved line",
        };
        description.push_str(&format!(
            "Stroke {}: {} - length: {}px ({shape})\n",
            index + 1,
            summary.direction,
            summary.length
        ));
    }
    description
}
