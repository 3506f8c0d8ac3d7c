//! Ordered change chunks and chunk navigation

use crate::mapper::LineMapper;
use crate::side::DisplaySide;
use std::cmp::Ordering;

/// Direction of chunk navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// One insertion, deletion or half of an edit, anchored to the side that
/// actually holds the lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffChunkInfo {
    pub side: DisplaySide,
    pub start: usize,
    pub end: usize,
    /// True when the region has lines on both sides
    pub edit: bool,
}

impl DiffChunkInfo {
    pub fn new(side: DisplaySide, start: usize, end: usize, edit: bool) -> Self {
        Self {
            side,
            start,
            end,
            edit,
        }
    }

    pub fn contains(&self, side: DisplaySide, line: usize) -> bool {
        self.side == side && self.start <= line && line <= self.end
    }

    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Deletion half of an edit pair
    pub fn is_edit_deletion(&self) -> bool {
        self.edit && self.side == DisplaySide::A
    }
}

/// Live comparator: chunks on the same side order by start line, chunks on
/// different sides compare after projecting the A chunk onto B. On a tie the
/// A chunk sorts first, so the deletion half of an edit sits right before
/// its insertion half.
fn compare_chunks(mapper: &LineMapper, o1: &DiffChunkInfo, o2: &DiffChunkInfo) -> Ordering {
    if o1.side == o2.side {
        return o1.start.cmp(&o2.start);
    }
    if o1.side == DisplaySide::A {
        let projected = mapper.line_on_other(DisplaySide::A, o1.start).line;
        projected.cmp(&o2.start).then(Ordering::Less)
    } else {
        let projected = mapper.line_on_other(DisplaySide::A, o2.start).line;
        o1.start.cmp(&projected).then(Ordering::Greater)
    }
}

/// Sort key equivalent to [`compare_chunks`], computed once per chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ChunkKey {
    line_on_b: usize,
    side_rank: u8,
    start: usize,
}

impl ChunkKey {
    fn probe(mapper: &LineMapper, side: DisplaySide, line: usize) -> Self {
        match side {
            DisplaySide::A => ChunkKey {
                line_on_b: mapper.line_on_other(DisplaySide::A, line).line,
                side_rank: 0,
                start: line,
            },
            DisplaySide::B => ChunkKey {
                line_on_b: line,
                side_rank: 1,
                start: line,
            },
        }
    }
}

/// Change chunks sorted for navigation
#[derive(Debug, Clone, Default)]
pub struct ChunkIndex {
    chunks: Vec<DiffChunkInfo>,
    keys: Vec<ChunkKey>,
    mapper: LineMapper,
}

impl ChunkIndex {
    /// Build the index. `chunks` are normally already in order since the
    /// renderer records them region by region; they are sorted regardless.
    pub fn new(chunks: Vec<DiffChunkInfo>, mapper: &LineMapper) -> Self {
        let mut keyed: Vec<(ChunkKey, DiffChunkInfo)> = chunks
            .into_iter()
            .map(|c| (ChunkKey::probe(mapper, c.side, c.start), c))
            .collect();
        keyed.sort_by_key(|(key, _)| *key);
        debug_assert!(keyed
            .windows(2)
            .all(|pair| compare_chunks(mapper, &pair[0].1, &pair[1].1) == Ordering::Less));
        let (keys, chunks) = keyed.into_iter().unzip();
        Self {
            chunks,
            keys,
            mapper: mapper.clone(),
        }
    }

    pub fn chunks(&self) -> &[DiffChunkInfo] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn first(&self) -> Option<&DiffChunkInfo> {
        self.chunks.first()
    }

    fn search(&self, side: DisplaySide, line: usize) -> Result<usize, usize> {
        let probe = ChunkKey::probe(&self.mapper, side, line);
        self.keys.binary_search(&probe)
    }

    /// Chunk containing `line` on `side`
    pub fn chunk_at(&self, side: DisplaySide, line: usize) -> Option<&DiffChunkInfo> {
        match self.search(side, line) {
            Ok(idx) => self.chunks.get(idx),
            // Only the start line is indexed. The tail of a deletion that
            // outgrows its edit partner projects past the partner, so look
            // back over the pair.
            Err(idx) => self.chunks[..idx]
                .iter()
                .rev()
                .take(2)
                .find(|c| c.contains(side, line)),
        }
    }

    /// Chunk to move to from cursor `line` on `side`.
    ///
    /// Landing on the deletion half of an edit steps once more so focus
    /// ends on the insertion half. `None` past either end.
    pub fn navigate(&self, side: DisplaySide, line: usize, dir: Direction) -> Option<&DiffChunkInfo> {
        let step = |idx: isize| match dir {
            Direction::Prev => idx - 1,
            Direction::Next => idx + 1,
        };
        let mut idx = match self.search(side, line) {
            Ok(found) => step(found as isize),
            Err(insert) => match dir {
                Direction::Prev => insert as isize - 1,
                Direction::Next => insert as isize,
            },
        };
        let lookup = self.get(idx)?;
        if lookup.is_edit_deletion() {
            idx = step(idx);
        }
        self.get(idx)
    }

    fn get(&self, idx: isize) -> Option<&DiffChunkInfo> {
        usize::try_from(idx).ok().and_then(|i| self.chunks.get(i))
    }
}
