//! Benchmarks for filtering and rendering large option sets.
//!
//! Run with: cargo bench -p sift-widgets

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sift_core::geometry::Rect;
use sift_render::frame::Frame;
use sift_widgets::virtualized::{RowSlot, VirtualizedList, VirtualizedListState};
use sift_widgets::{SearchableSelect, SelectOption, StatefulWidget, Widget, filter_indices};
use std::hint::black_box;
use std::time::{Duration, Instant};

fn options(n: usize) -> Vec<SelectOption> {
    (1..=n).map(|i| SelectOption::new(format!("Option {i}"))).collect()
}

// ============================================================================
// Filter
// ============================================================================

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("select/filter");

    for n in [1_000, 10_000, 100_000] {
        let opts = options(n);
        for query in ["", "9999", "OPTION 1", "zzz"] {
            group.bench_with_input(
                BenchmarkId::new(format!("{query:?}"), n),
                &opts,
                |b, opts| b.iter(|| black_box(filter_indices(opts, black_box(query)))),
            );
        }
    }

    group.finish();
}

// ============================================================================
// Virtualized list
// ============================================================================

fn bench_virtualized_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("select/virtualized");

    for n in [100, 10_000, 1_000_000] {
        let mut frame = Frame::new(40, 6);
        let mut state = VirtualizedListState::new();
        state.scroll_to(n / 2, n);
        let list = VirtualizedList::new(n, |slot: RowSlot, frame: &mut Frame| {
            black_box((slot.index, frame.width()));
        });
        group.bench_with_input(BenchmarkId::new("render", n), &(), |b, _| {
            b.iter(|| {
                frame.clear();
                list.render(Rect::new(0, 0, 40, 6), &mut frame, &mut state);
                black_box(state.mounted());
            })
        });
    }

    group.finish();
}

// ============================================================================
// Full select
// ============================================================================

fn bench_select_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("select/render");

    let mut select = SearchableSelect::new(options(10_000));
    select.open();
    let mut frame = Frame::with_hit_grid(60, 12);
    group.bench_function("open_10k", |b| {
        b.iter(|| {
            frame.clear();
            select.render(Rect::new(0, 0, 60, 12), &mut frame);
            black_box(&frame.buffer);
        })
    });

    group.bench_function("settle_query_10k", |b| {
        let t0 = Instant::now();
        b.iter(|| {
            let mut select = SearchableSelect::new(options(10_000));
            select.open();
            select.handle_event_at(
                &sift_core::event::Event::Paste(sift_core::event::PasteEvent::bracketed("9999")),
                t0,
            );
            black_box(select.tick_at(t0 + Duration::from_millis(500)));
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_filter,
    bench_virtualized_render,
    bench_select_render
);
criterion_main!(benches);
