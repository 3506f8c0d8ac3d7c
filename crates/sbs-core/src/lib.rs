//! sbs-core: line alignment and chunk navigation for side-by-side diffs
//!
//! A [`SideBySide`] view takes a [`DiffInfo`] (Gerrit-style regions), lays
//! both sides out in a pair of [`Pane`]s with padding so that common lines
//! line up, and answers navigation queries through a [`LineMapper`] and a
//! [`ChunkIndex`]. Drawing is left to the host.

pub mod chunk;
pub mod comments;
pub mod diff;
pub mod error;
pub mod events;
pub mod mapper;
pub mod mode;
pub mod padding;
pub mod pane;
pub mod prefs;
pub mod render;
pub mod sched;
pub mod scroll;
pub mod side;
pub mod skip;
pub mod view;

pub use chunk::{ChunkIndex, DiffChunkInfo, Direction};
pub use comments::{CommentBox, CommentInfo, CommentManager};
pub use diff::{ChangeRegion, DiffInfo, FileMeta, IntraLineStatus, Region, Span, LARGE_FILE_LINES};
pub use error::{DiffError, ModeError, RegionError};
pub use mapper::{LineMapper, LineOnOther};
pub use mode::{ModeInjector, PlainText};
pub use pane::{
    GutterType, LineClass, LineClassWhere, LineWidget, Pane, PaneEvent, PanePair, Pos, WidgetId,
    WidgetKind,
};
pub use prefs::{Context, DiffPreferences};
pub use sched::ReloadToken;
pub use side::DisplaySide;
pub use skip::{Expand, SkippedLines};
pub use view::{ReloadRequest, SideBySide};
