//! Builds a `DiffInfo` from two texts, or serves one read from JSON

use crate::syntax::content_type_for_path;
use imara_diff::{Algorithm, Diff, InternedInput};
use sbs_core::{ChangeRegion, DiffInfo, FileMeta, IntraLineStatus, Region, ReloadRequest, Span};
use std::path::Path;

/// Edits with more lines than this get no intraline spans
pub const MAX_INTRALINE_LINES: usize = 1000;

/// What a diff is computed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffOptions {
    pub intraline: bool,
    pub ignore_whitespace: bool,
}

impl From<&ReloadRequest> for DiffOptions {
    fn from(request: &ReloadRequest) -> Self {
        Self {
            intraline: request.intraline,
            ignore_whitespace: request.ignore_whitespace,
        }
    }
}

/// One side of a text comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    fn meta(&self) -> FileMeta {
        FileMeta {
            name: self.name.clone(),
            content_type: Some(content_type_for_path(Path::new(&self.name))),
            lines: self.text.lines().count(),
        }
    }
}

/// Where diffs come from. `None` on a side means the file does not exist
/// there (added or deleted file).
#[derive(Debug, Clone)]
pub enum DiffSource {
    Files {
        old: Option<SourceFile>,
        new: Option<SourceFile>,
    },
    /// A precomputed diff; options other than intraline are ignored
    Json(DiffInfo),
}

impl DiffSource {
    pub fn produce(&self, options: DiffOptions) -> DiffInfo {
        match self {
            DiffSource::Files { old, new } => compute(old.as_ref(), new.as_ref(), options),
            DiffSource::Json(diff) => {
                let mut diff = diff.clone();
                if !options.intraline {
                    diff.strip_intraline();
                }
                if options.ignore_whitespace {
                    log::debug!("ignore-whitespace has no effect on a precomputed diff");
                }
                diff
            }
        }
    }

    /// Display name for the header
    pub fn name(&self) -> Option<&str> {
        match self {
            DiffSource::Files { old, new } => new.as_ref().or(old.as_ref()).map(|f| f.name.as_str()),
            DiffSource::Json(diff) => diff.meta_b.as_ref().or(diff.meta_a.as_ref()).map(|m| m.name.as_str()),
        }
    }
}

fn split_lines(file: Option<&SourceFile>) -> Vec<String> {
    file.map(|f| f.text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Text handed to the line differ: one token per line, every line ending
/// in `\n` so the last line compares like the others
fn tokens(lines: &[String], ignore_whitespace: bool) -> String {
    let mut out = String::new();
    for line in lines {
        if ignore_whitespace {
            out.extend(line.chars().filter(|c| !c.is_whitespace()));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

pub fn compute(old: Option<&SourceFile>, new: Option<&SourceFile>, options: DiffOptions) -> DiffInfo {
    let a = split_lines(old);
    let b = split_lines(new);
    let before = tokens(&a, options.ignore_whitespace);
    let after = tokens(&b, options.ignore_whitespace);
    let input = InternedInput::new(before.as_str(), after.as_str());
    let mut diff = Diff::compute(Algorithm::Histogram, &input);
    diff.postprocess_lines(&input);

    let mut content = Vec::new();
    let (mut line_a, mut line_b) = (0usize, 0usize);
    for hunk in diff.hunks() {
        let (start_a, end_a) = (hunk.before.start as usize, hunk.before.end as usize);
        let (start_b, end_b) = (hunk.after.start as usize, hunk.after.end as usize);
        push_common(&mut content, &a[line_a..start_a], &b[line_b..start_b]);
        content.push(Region::Change(ChangeRegion {
            a: a[start_a..end_a].to_vec(),
            b: b[start_b..end_b].to_vec(),
            edit_a: None,
            edit_b: None,
        }));
        line_a = end_a;
        line_b = end_b;
    }
    push_common(&mut content, &a[line_a..], &b[line_b..]);

    let mut info = DiffInfo {
        meta_a: old.map(SourceFile::meta),
        meta_b: new.map(SourceFile::meta),
        intraline_status: IntraLineStatus::Off,
        content,
    };
    if options.intraline {
        info.intraline_status = add_intraline(&mut info.content);
    }
    log::debug!(
        "computed {} regions (intraline {:?})",
        info.content.len(),
        info.intraline_status
    );
    info
}

/// Append lines the differ matched. With whitespace ignored the two sides
/// can still differ; such lines become a change without intraline edits.
fn push_common(content: &mut Vec<Region>, a: &[String], b: &[String]) {
    debug_assert_eq!(a.len(), b.len());
    let mut i = 0;
    while i < a.len() {
        let same = a[i] == b[i];
        let run = a[i..]
            .iter()
            .zip(&b[i..])
            .take_while(|(x, y)| (x == y) == same)
            .count();
        let region = if same {
            match content.last_mut() {
                Some(Region::Common(lines)) => {
                    lines.extend_from_slice(&a[i..i + run]);
                    i += run;
                    continue;
                }
                _ => Region::Common(a[i..i + run].to_vec()),
            }
        } else {
            Region::Change(ChangeRegion {
                a: a[i..i + run].to_vec(),
                b: b[i..i + run].to_vec(),
                edit_a: Some(Vec::new()),
                edit_b: Some(Vec::new()),
            })
        };
        content.push(region);
        i += run;
    }
}

fn add_intraline(content: &mut [Region]) -> IntraLineStatus {
    let oversized = content.iter().any(|region| match region {
        Region::Change(change) => change.a.len() + change.b.len() > MAX_INTRALINE_LINES,
        Region::Common(_) => false,
    });
    if oversized {
        log::info!("edit too large for intraline differences");
        return IntraLineStatus::Timeout;
    }
    for region in content.iter_mut() {
        let Region::Change(change) = region else {
            continue;
        };
        if !change.is_edit() || change.edit_a.is_some() {
            continue;
        }
        let (edit_a, edit_b) = edit_spans(&change.a, &change.b);
        change.edit_a = Some(edit_a);
        change.edit_b = Some(edit_b);
    }
    IntraLineStatus::Ok
}

/// Changed char ranges of both sides of an edit. Line pairs are compared
/// one by one when the counts match, otherwise the region is compared as
/// one text.
fn edit_spans(a: &[String], b: &[String]) -> (Vec<Span>, Vec<Span>) {
    let mut marks_a = Vec::new();
    let mut marks_b = Vec::new();
    if a.len() == b.len() {
        let (mut base_a, mut base_b) = (0, 0);
        for (line_a, line_b) in a.iter().zip(b) {
            let (ra, rb) = changed_ranges(line_a, line_b);
            marks_a.push((base_a + ra.0, ra.1));
            marks_b.push((base_b + rb.0, rb.1));
            base_a += line_a.chars().count() + 1;
            base_b += line_b.chars().count() + 1;
        }
    } else {
        let (ra, rb) = changed_ranges(&a.join("\n"), &b.join("\n"));
        marks_a.push(ra);
        marks_b.push(rb);
    }
    (to_spans(&marks_a), to_spans(&marks_b))
}

/// `(start, len)` in chars of the differing middle of each text, after the
/// common prefix and suffix
fn changed_ranges(a: &str, b: &str) -> ((usize, usize), (usize, usize)) {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let max_suffix = a.len().min(b.len()) - prefix;
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x == y)
        .count();
    (
        (prefix, a.len() - prefix - suffix),
        (prefix, b.len() - prefix - suffix),
    )
}

fn to_spans(marks: &[(usize, usize)]) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut end = 0;
    for &(start, len) in marks {
        if len == 0 {
            continue;
        }
        spans.push(Span(start - end, len));
        end = start + len;
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbs_core::DisplaySide;

    fn file(text: &str) -> Option<SourceFile> {
        Some(SourceFile::new("demo.rs", text))
    }

    fn options(intraline: bool, ignore_whitespace: bool) -> DiffOptions {
        DiffOptions {
            intraline,
            ignore_whitespace,
        }
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_regions_for_edit() {
        let diff = compute(
            file("a\nb\nc\n").as_ref(),
            file("a\nB\nc\n").as_ref(),
            options(false, false),
        );
        assert_eq!(
            diff.content,
            vec![
                Region::Common(lines(&["a"])),
                Region::Change(ChangeRegion {
                    a: lines(&["b"]),
                    b: lines(&["B"]),
                    edit_a: None,
                    edit_b: None,
                }),
                Region::Common(lines(&["c"])),
            ]
        );
        assert_eq!(diff.intraline_status, IntraLineStatus::Off);
        let meta = diff.meta_b.as_ref().unwrap();
        assert_eq!(meta.lines, 3);
        assert_eq!(meta.content_type.as_deref(), Some("text/x-rustsrc"));
    }

    #[test]
    fn test_added_file_has_no_side_a() {
        let diff = compute(None, file("x\ny").as_ref(), options(true, false));
        assert!(diff.meta_a.is_none());
        assert_eq!(diff.lines(DisplaySide::B), lines(&["x", "y"]));
        assert_eq!(diff.content.len(), 1);
    }

    #[test]
    fn test_identical_files_are_one_common_region() {
        let diff = compute(file("same\n").as_ref(), file("same").as_ref(), options(true, false));
        assert!(diff.is_no_diff());
    }

    #[test]
    fn test_intraline_spans_per_line_pair() {
        let diff = compute(
            file("let x = 1;\nfoo\n").as_ref(),
            file("let x = 22;\nfoo\n").as_ref(),
            options(true, false),
        );
        assert_eq!(diff.intraline_status, IntraLineStatus::Ok);
        let Region::Change(change) = &diff.content[0] else {
            panic!("expected a change first");
        };
        assert_eq!(change.edit_a, Some(vec![Span(8, 1)]));
        assert_eq!(change.edit_b, Some(vec![Span(8, 2)]));
    }

    #[test]
    fn test_edit_spans_skip_between_lines() {
        let (a, b) = edit_spans(&lines(&["ab", "cd"]), &lines(&["aX", "Yd"]));
        // "ab\ncd": change at 1, then at 3 (after the newline)
        assert_eq!(a, vec![Span(1, 1), Span(1, 1)]);
        assert_eq!(b, vec![Span(1, 1), Span(1, 1)]);
    }

    #[test]
    fn test_pure_insertion_inside_line() {
        let (a, b) = edit_spans(&lines(&["ab"]), &lines(&["aXb"]));
        assert!(a.is_empty());
        assert_eq!(b, vec![Span(1, 1)]);
    }

    #[test]
    fn test_oversized_edit_times_out() {
        let old: String = (0..=MAX_INTRALINE_LINES).map(|i| format!("old {i}\n")).collect();
        let new: String = (0..=MAX_INTRALINE_LINES).map(|i| format!("new {i}\n")).collect();
        let diff = compute(file(&old).as_ref(), file(&new).as_ref(), options(true, false));
        assert_eq!(diff.intraline_status, IntraLineStatus::Timeout);
        assert!(diff.content.iter().all(|r| match r {
            Region::Change(c) => c.edit_a.is_none(),
            Region::Common(_) => true,
        }));
    }

    #[test]
    fn test_ignore_whitespace() {
        let old = file("fn f() {\n  x();\n}\n");
        let new = file("fn f() {\n    x();\n}\n");
        let strict = compute(old.as_ref(), new.as_ref(), options(true, false));
        assert_eq!(strict.content.len(), 3);

        let loose = compute(old.as_ref(), new.as_ref(), options(true, true));
        // Matched despite indentation; still shown, but with no intraline marks
        let Region::Change(change) = &loose.content[1] else {
            panic!("expected the reindented line as a change");
        };
        assert_eq!(change.edit_b, Some(Vec::new()));
        assert_eq!(loose.lines(DisplaySide::A)[1], "  x();");
        assert_eq!(loose.lines(DisplaySide::B)[1], "    x();");
    }

    #[test]
    fn test_json_source_strips_intraline_when_off() {
        let diff = compute(file("a\n").as_ref(), file("b\n").as_ref(), options(true, false));
        let source = DiffSource::Json(diff);
        let produced = source.produce(options(false, false));
        assert_eq!(produced.intraline_status, IntraLineStatus::Off);
        assert_eq!(source.name(), Some("demo.rs"));
    }
}
