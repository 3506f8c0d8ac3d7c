use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sbs_core::{
    ChangeRegion, ChunkIndex, DiffChunkInfo, DiffInfo, DiffPreferences, Direction, DisplaySide,
    FileMeta, LineMapper, PlainText, Region, SideBySide,
};

fn build_diff(regions: usize) -> DiffInfo {
    let mut content = Vec::with_capacity(regions * 2);
    for i in 0..regions {
        content.push(Region::Common(
            (0..20).map(|n| format!("fn common_{i}_{n}() {{}}")).collect(),
        ));
        let a = (0..(i % 3)).map(|n| format!("let old_{n} = {i};")).collect();
        let b = (0..((i + 1) % 4)).map(|n| format!("let new_{n} = {i};")).collect();
        content.push(Region::Change(ChangeRegion {
            a,
            b,
            edit_a: None,
            edit_b: None,
        }));
    }
    let meta = |lines| {
        Some(FileMeta {
            name: "bench.rs".to_string(),
            content_type: None,
            lines,
        })
    };
    let len = |side| content.iter().map(|r: &Region| r.len(side)).sum::<usize>();
    DiffInfo {
        meta_a: meta(len(DisplaySide::A)),
        meta_b: meta(len(DisplaySide::B)),
        content,
        ..Default::default()
    }
}

fn build_index(diff: &DiffInfo) -> ChunkIndex {
    let mut mapper = LineMapper::new();
    let mut chunks = Vec::new();
    for region in &diff.content {
        match region {
            Region::Common(lines) => mapper.append_common(lines.len()),
            Region::Change(change) => {
                let (a, b) = (change.a.len(), change.b.len());
                mapper.append_common(a.min(b));
                if a > b {
                    mapper.append_delete(a - b);
                } else {
                    mapper.append_insert(b - a);
                }
                if a > 0 {
                    let end = mapper.line_a() - 1;
                    chunks.push(DiffChunkInfo::new(DisplaySide::A, end + 1 - a, end, b > 0));
                }
                if b > 0 {
                    let end = mapper.line_b() - 1;
                    chunks.push(DiffChunkInfo::new(DisplaySide::B, end + 1 - b, end, a > 0));
                }
            }
        }
    }
    ChunkIndex::new(chunks, &mapper)
}

fn bench_navigate(c: &mut Criterion) {
    let diff = build_diff(2_000);
    let index = build_index(&diff);
    let lines = index.chunks().last().map(|c| c.end + 20).unwrap_or(0);
    c.bench_function("chunk_navigate_all_lines", |b| {
        b.iter(|| {
            for line in (0..lines).step_by(7) {
                black_box(index.navigate(DisplaySide::B, line, Direction::Next));
            }
        })
    });
}

fn bench_display(c: &mut Criterion) {
    let diff = build_diff(500);
    c.bench_function("display_500_regions", |b| {
        b.iter(|| {
            let mut view = SideBySide::new(DiffPreferences::default());
            view.set_viewport_height(40.0);
            view.display(black_box(diff.clone()), Vec::new(), &mut PlainText);
            black_box(view.chunks().len())
        })
    });
}

criterion_group!(benches, bench_navigate, bench_display);
criterion_main!(benches);
