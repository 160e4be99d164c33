//! Window resolution benchmarks.
//!
//! Measures the per-render cost of resolving a window once the feed already
//! holds the items, and the cost of converging a far jump through the engine.
//!
//! Run with: cargo bench

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::VecDeque;
use storefeed::model::{
    Cursor, CursorPage, FilterState, ListingSurface, PageNumber, PageSize, SortKey, TotalCount,
};
use storefeed::state::{
    window_of, Command, Completion, CursorFeed, EngineConfig, PaginationEngine,
};

const FEED_LEN: usize = 50_000;

/// Feed already holding `FEED_LEN` items.
fn loaded_feed() -> CursorFeed<u64> {
    let filter = FilterState::unfiltered(SortKey::Featured, PageSize::new(24).expect("valid size"));
    let mut feed = CursorFeed::new(filter.query(), FEED_LEN);
    let load = feed.request_more(FEED_LEN).expect("empty feed accepts a load");
    feed.apply(
        &load,
        Ok(CursorPage::more((0..FEED_LEN as u64).collect(), Cursor::new("end"))),
    );
    feed
}

fn answer(command: Command, len: u64) -> Completion<u64> {
    match command {
        Command::LoadCursorBatch(load) => {
            let start = load
                .cursor
                .as_ref()
                .and_then(|cursor| cursor.as_str().parse::<u64>().ok())
                .unwrap_or(0);
            let end = (start + load.count as u64).min(len);
            let next = (end < len).then(|| Cursor::new(end.to_string()));
            Completion::CursorBatch {
                load,
                result: Ok(CursorPage {
                    items: (start..end).collect(),
                    next,
                }),
            }
        }
        Command::FetchOffsetWindow(load) => Completion::OffsetWindow {
            load,
            result: Ok(Vec::new()),
        },
        Command::FetchTotalCount(load) => Completion::TotalCount {
            load,
            result: Ok(TotalCount::exact(len)),
        },
    }
}

fn benchmark_resolve(c: &mut Criterion) {
    let feed = loaded_feed();
    let page_size = PageSize::new(24).expect("valid size");
    let previous: Vec<u64> = Vec::new();

    c.bench_function("window_of_first_page", |b| {
        b.iter(|| window_of(black_box(PageNumber::FIRST), page_size, black_box(&feed), &previous))
    });

    let deep = PageNumber::new(2_000).expect("valid page");
    c.bench_function("window_of_deep_page", |b| {
        b.iter(|| window_of(black_box(deep), page_size, black_box(&feed), &previous))
    });
}

fn benchmark_far_jump(c: &mut Criterion) {
    let filter = FilterState::unfiltered(SortKey::Featured, PageSize::new(24).expect("valid size"));

    c.bench_function("engine_converge_page_400", |b| {
        b.iter(|| {
            let mut engine = PaginationEngine::<u64>::new(
                EngineConfig::for_surface(ListingSurface::Products),
                filter.clone(),
            );
            let (_, commands) = engine.get_window(
                PageNumber::new(400).expect("valid page"),
                PageSize::new(24).expect("valid size"),
            );
            let mut queue: VecDeque<Command> = commands.into();
            while let Some(command) = queue.pop_front() {
                queue.extend(engine.apply(answer(command, FEED_LEN as u64)));
            }
            black_box(engine.window().items.len())
        })
    });
}

criterion_group!(benches, benchmark_resolve, benchmark_far_jump);
criterion_main!(benches);
