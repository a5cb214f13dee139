use std::path::PathBuf;

use thiserror::Error;

use crate::segment::BodyPart;

/// Errors that can occur while extracting or segmenting a silhouette.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SegmentError {
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("no outer contour found in image")]
    NoContours,

    #[error("malformed point at index {index}: {reason}")]
    MalformedPoint { index: usize, reason: String },

    #[error(
        "region '{region}' references index {index} but the contour has only {len} points"
    )]
    IndexOutOfRange {
        region: BodyPart,
        index: usize,
        len: usize,
    },

    #[error("invalid index table: {0}")]
    InvalidTable(String),

    #[error("region '{0}' appears more than once")]
    DuplicateRegion(BodyPart),

    #[error("unknown region name '{0}'")]
    UnknownRegion(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SegmentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SegmentError::Io {
            path: path.into(),
            source,
        }
    }
}
