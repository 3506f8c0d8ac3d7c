//! Diff payload consumed by the view
//!
//! The wire format follows the Gerrit REST `DiffInfo` shape:
//!
//! ```json
//! {
//!   "meta_a": { "name": "src/lib.rs", "content_type": "text/x-rustsrc", "lines": 3 },
//!   "meta_b": { "name": "src/lib.rs", "content_type": "text/x-rustsrc", "lines": 3 },
//!   "intraline_status": "OK",
//!   "content": [
//!     { "ab": ["fn main() {"] },
//!     { "a": ["    old();"], "b": ["    new();"], "edit_a": [[4, 3]], "edit_b": [[4, 3]] },
//!     { "ab": ["}"] }
//!   ]
//! }
//! ```

use crate::error::{DiffError, RegionError};
use crate::side::DisplaySide;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Files with at least this many lines on either side skip syntax modes
pub const LARGE_FILE_LINES: usize = 500;

/// Whether intraline spans were computed by the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntraLineStatus {
    #[default]
    Off,
    Ok,
    #[serde(alias = "ERROR")]
    Timeout,
}

/// Per-side file metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub lines: usize,
}

/// One `[skip, mark]` pair of an intraline edit list.
///
/// `skip` characters are unchanged, the following `mark` characters changed.
/// Counts run across the lines of the region joined with `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span(pub usize, pub usize);

impl Span {
    pub fn skip(&self) -> usize {
        self.0
    }

    pub fn mark(&self) -> usize {
        self.1
    }
}

/// The changed part of a diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRegion {
    /// Lines removed from A (empty for a pure insertion)
    pub a: Vec<String>,
    /// Lines added to B (empty for a pure deletion)
    pub b: Vec<String>,
    pub edit_a: Option<Vec<Span>>,
    pub edit_b: Option<Vec<Span>>,
}

impl ChangeRegion {
    pub fn is_edit(&self) -> bool {
        !self.a.is_empty() && !self.b.is_empty()
    }

    pub fn lines(&self, side: DisplaySide) -> &[String] {
        match side {
            DisplaySide::A => &self.a,
            DisplaySide::B => &self.b,
        }
    }

    pub fn edits(&self, side: DisplaySide) -> Option<&[Span]> {
        match side {
            DisplaySide::A => self.edit_a.as_deref(),
            DisplaySide::B => self.edit_b.as_deref(),
        }
    }
}

/// One unit of diff output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRegion", into = "RawRegion")]
pub enum Region {
    /// Lines shared by both sides
    Common(Vec<String>),
    Change(ChangeRegion),
}

impl Region {
    pub fn len(&self, side: DisplaySide) -> usize {
        match self {
            Region::Common(lines) => lines.len(),
            Region::Change(change) => change.lines(side).len(),
        }
    }

    pub fn is_common(&self) -> bool {
        matches!(self, Region::Common(_))
    }
}

#[derive(Serialize, Deserialize)]
struct RawRegion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ab: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    a: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    b: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edit_a: Option<Vec<Span>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edit_b: Option<Vec<Span>>,
}

impl TryFrom<RawRegion> for Region {
    type Error = RegionError;

    fn try_from(raw: RawRegion) -> Result<Self, Self::Error> {
        match (raw.ab, raw.a, raw.b) {
            (Some(ab), None, None) => Ok(Region::Common(ab)),
            (Some(_), _, _) => Err(RegionError::Mixed),
            (None, None, None) => Err(RegionError::Empty),
            (None, a, b) => Ok(Region::Change(ChangeRegion {
                a: a.unwrap_or_default(),
                b: b.unwrap_or_default(),
                edit_a: raw.edit_a,
                edit_b: raw.edit_b,
            })),
        }
    }
}

impl From<Region> for RawRegion {
    fn from(region: Region) -> Self {
        match region {
            Region::Common(ab) => RawRegion {
                ab: Some(ab),
                a: None,
                b: None,
                edit_a: None,
                edit_b: None,
            },
            Region::Change(change) => RawRegion {
                ab: None,
                a: (!change.a.is_empty()).then_some(change.a),
                b: (!change.b.is_empty()).then_some(change.b),
                edit_a: change.edit_a,
                edit_b: change.edit_b,
            },
        }
    }
}

/// A whole-file diff result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffInfo {
    /// `None` when the file does not exist on side A (added file)
    #[serde(default)]
    pub meta_a: Option<FileMeta>,
    /// `None` when the file does not exist on side B (deleted file)
    #[serde(default)]
    pub meta_b: Option<FileMeta>,
    #[serde(default)]
    pub intraline_status: IntraLineStatus,
    #[serde(default)]
    pub content: Vec<Region>,
}

impl DiffInfo {
    pub fn from_json(json: &str) -> Result<Self, DiffError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, DiffError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json(&buf)
    }

    pub fn meta(&self, side: DisplaySide) -> Option<&FileMeta> {
        match side {
            DisplaySide::A => self.meta_a.as_ref(),
            DisplaySide::B => self.meta_b.as_ref(),
        }
    }

    pub fn content_type(&self, side: DisplaySide) -> Option<&str> {
        self.meta(side).and_then(|m| m.content_type.as_deref())
    }

    /// Full text of one side, rebuilt from the regions.
    ///
    /// Empty when the file is absent on that side.
    pub fn lines(&self, side: DisplaySide) -> Vec<String> {
        if self.meta(side).is_none() {
            return Vec::new();
        }
        let mut out = Vec::new();
        for region in &self.content {
            match region {
                Region::Common(lines) => out.extend(lines.iter().cloned()),
                Region::Change(change) => out.extend(change.lines(side).iter().cloned()),
            }
        }
        out
    }

    /// True when either side is big enough that syntax modes are skipped
    pub fn is_large_file(&self) -> bool {
        DisplaySide::BOTH
            .iter()
            .filter_map(|&side| self.meta(side))
            .any(|meta| meta.lines >= LARGE_FILE_LINES)
    }

    /// No regions, or one region that is entirely common
    pub fn is_no_diff(&self) -> bool {
        match self.content.as_slice() {
            [] => true,
            [only] => only.is_common(),
            _ => false,
        }
    }

    /// Drop intraline spans, as a producer does when intraline is off
    pub fn strip_intraline(&mut self) {
        for region in &mut self.content {
            if let Region::Change(change) = region {
                change.edit_a = None;
                change.edit_b = None;
            }
        }
        self.intraline_status = IntraLineStatus::Off;
    }
}
