//! Trajectory store and the loader for the cultural pedestrian dataset format.
//!
//! The first line of a dataset carries the scale factor in brackets (`[20]`),
//! every following line is tab separated with the recorded samples in its
//! second field as `(x,y,frame)` groups.

use std::fs;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use bevy::prelude::*;
use regex::Regex;
use thiserror::Error;

static HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid header pattern"));
static SAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+),(\d+),(\d+)\)").expect("valid sample pattern"));

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset '{}' could not be read", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scale factor not found on the first line")]
    MissingScale,
    #[error("scale factor '{0}' must be a positive number")]
    InvalidScale(String),
    #[error("malformed sample on line {line}")]
    MalformedSample {
        line: usize,
        #[source]
        source: ParseIntError,
    },
}

/// World-to-display divisor. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f32);

impl ScaleFactor {
    pub fn new(value: f32) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub x: i32,
    pub y: i32,
    /// Frame number as written in the file; playback indexes by position instead.
    pub frame_tag: i32,
}

/// Recorded path of one pedestrian. Index into `samples` is the frame number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn sample(&self, frame: usize) -> Option<&Sample> {
        self.samples.get(frame)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First and last recorded frame tags.
    pub fn tag_range(&self) -> Option<(i32, i32)> {
        Some((self.samples.first()?.frame_tag, self.samples.last()?.frame_tag))
    }
}

/// How far the frame cursor runs before wrapping back to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
pub enum LoopBound {
    /// Length of the longest trajectory.
    #[default]
    Longest,
    /// Length of the first trajectory in the file.
    FirstEntity,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Dataset {
    pub entities: Vec<Trajectory>,
    pub scale: ScaleFactor,
}

impl Dataset {
    pub fn loop_bound(&self, policy: LoopBound) -> usize {
        match policy {
            LoopBound::Longest => self.entities.iter().map(Trajectory::len).max().unwrap_or(0),
            LoopBound::FirstEntity => self.entities.first().map_or(0, Trajectory::len),
        }
    }

    /// Entity count when it falls short of `expected`.
    pub fn underpopulated(&self, expected: usize) -> Option<usize> {
        (self.entities.len() < expected).then_some(self.entities.len())
    }
}

pub fn load(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, limit)
}

/// Parses dataset text. `limit` caps the number of entities kept; lines
/// without samples do not count towards it.
pub fn parse(text: &str, limit: Option<usize>) -> Result<Dataset, LoadError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(LoadError::MissingScale)?;
    let raw_scale = HEADER
        .captures(header)
        .map(|c| c[1].to_string())
        .ok_or(LoadError::MissingScale)?;
    let scale = raw_scale
        .parse::<f32>()
        .ok()
        .and_then(ScaleFactor::new)
        .ok_or_else(|| LoadError::InvalidScale(raw_scale.clone()))?;

    let limit = limit.unwrap_or(usize::MAX);
    let mut entities = Vec::new();

    for (index, line) in lines.enumerate() {
        if entities.len() >= limit {
            break;
        }
        let Some(field) = line.split('\t').nth(1) else {
            continue;
        };

        let samples = SAMPLE
            .captures_iter(field)
            .map(|c| -> Result<Sample, ParseIntError> {
                Ok(Sample {
                    x: c[1].parse()?,
                    y: c[2].parse()?,
                    frame_tag: c[3].parse()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| LoadError::MalformedSample { line: index + 2, source })?;

        if !samples.is_empty() {
            entities.push(Trajectory::new(samples));
        }
    }

    Ok(Dataset { entities, scale })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE_TEXT: &str = "[10]\n\
        1\t(100,100,0)(110,105,1)(120,110,2)\n\
        2\t(0,0,0)\n\
        no tabs here\n\
        3\tnothing to see\n\
        4\t(5,6,7)(8,9,10)\n";

    #[test]
    fn parses_scale_and_trajectories() {
        let dataset = parse(SAMPLE_TEXT, None).unwrap();
        assert_eq!(dataset.scale.get(), 10.0);
        assert_eq!(dataset.entities.len(), 3);
        assert_eq!(dataset.entities[0].len(), 3);
        assert_eq!(
            dataset.entities[0].sample(1),
            Some(&Sample { x: 110, y: 105, frame_tag: 1 })
        );
        assert_eq!(dataset.entities[2].tag_range(), Some((7, 10)));
        assert!(dataset.entities[1].sample(1).is_none());
    }

    #[test]
    fn limit_counts_parsed_entities_only() {
        let dataset = parse(SAMPLE_TEXT, Some(2)).unwrap();
        assert_eq!(dataset.entities.len(), 2);
        assert_eq!(dataset.entities[1].len(), 1);
    }

    #[test]
    fn missing_header_is_fatal() {
        assert!(matches!(parse("", None), Err(LoadError::MissingScale)));
        assert!(matches!(parse("scale=10\n1\t(1,2,3)\n", None), Err(LoadError::MissingScale)));
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(matches!(parse("[0]\n1\t(1,2,3)\n", None), Err(LoadError::InvalidScale(s)) if s == "0"));
    }

    #[test]
    fn oversized_coordinate_is_malformed() {
        let err = parse("[1]\n1\t(1,2,3)\n2\t(99999999999,2,3)\n", None).unwrap_err();
        assert!(matches!(err, LoadError::MalformedSample { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn loop_bound_policies() {
        let dataset = parse("[1]\n1\t(0,0,0)(0,0,1)\n2\t(0,0,0)(0,0,1)(0,0,2)(0,0,3)\n", None).unwrap();
        assert_eq!(dataset.loop_bound(LoopBound::Longest), 4);
        assert_eq!(dataset.loop_bound(LoopBound::FirstEntity), 2);
        assert_eq!(Dataset::default().loop_bound(LoopBound::Longest), 0);
    }

    #[test]
    fn underpopulated_reports_short_datasets() {
        let line = "1\t(0,0,0)\n";
        let with = |n: usize| parse(&format!("[1]\n{}", line.repeat(n)), None).unwrap();

        assert_eq!(with(0).underpopulated(6), Some(0));
        assert_eq!(with(5).underpopulated(6), Some(5));
        assert_eq!(with(6).underpopulated(6), None);
        assert_eq!(with(7).underpopulated(6), None);
        assert_eq!(with(2).underpopulated(2), None);
        assert_eq!(with(2).underpopulated(3), Some(2));
    }

    #[test]
    fn trajectory_emptiness() {
        assert!(Trajectory::new(Vec::new()).is_empty());
        assert!(!Trajectory::new(vec![Sample { x: 0, y: 0, frame_tag: 0 }]).is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_TEXT.as_bytes()).unwrap();
        let dataset = load(file.path(), Some(10)).unwrap();
        assert_eq!(dataset.entities.len(), 3);
    }

    #[test]
    fn shipped_dataset_has_enough_entities() {
        let dataset = load(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/Paths_D.txt"), Some(10)).unwrap();
        assert_eq!(dataset.entities.len(), 8);
        assert_eq!(dataset.loop_bound(LoopBound::Longest), 40);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("Paths_D.txt"), None).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn scale_factor_rejects_non_positive() {
        assert!(ScaleFactor::new(0.0).is_none());
        assert!(ScaleFactor::new(-1.0).is_none());
        assert!(ScaleFactor::new(f32::NAN).is_none());
        assert_eq!(ScaleFactor::default().get(), 1.0);
    }
}
