//! Benchmark: render passes and selection writes.
//!
//! Run with: `cargo bench -p collectionview --bench render_bench`
//!
//! Measures a full render pass (rebuild plus selection restore) and the
//! offset-addressed selection write at a few list sizes.

use std::hint::black_box;

use collectionview::{CollectionOptions, CollectionView, Record, RecordStore, Selector, SetOptions};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

#[derive(Debug)]
struct Entry {
    id: u32,
    label: String,
}

impl Record for Entry {
    type Id = u32;
    fn id(&self) -> Option<u32> {
        Some(self.id)
    }
}

fn view_of(n: u32) -> CollectionView<Entry> {
    let store = RecordStore::from_records((0..n).map(|id| Entry {
        id,
        label: format!("entry {id}"),
    }));
    let mut view = CollectionView::new(
        CollectionOptions::new()
            .collection(store)
            .item_template(|e: &Entry| e.label.clone())
            .select_multiple(true),
    )
    .unwrap();
    view.render().unwrap();
    view
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for n in [100u32, 1_000, 10_000] {
        let mut view = view_of(n);
        view.set_selected(Selector::Offsets(vec![n as usize / 2]), SetOptions::default())
            .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                view.render().unwrap();
                black_box(view.tree().visible_len())
            });
        });
    }
    group.finish();
}

fn bench_select_offsets(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_offsets");
    for n in [100u32, 1_000, 10_000] {
        let mut view = view_of(n);
        let offsets: Vec<usize> = (0..n as usize).step_by(10).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                view.set_selected(Selector::Offsets(offsets.clone()), SetOptions::silent())
                    .unwrap();
                view.select_none(SetOptions::silent()).unwrap();
                black_box(view.has_selection())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render, bench_select_offsets);
criterion_main!(benches);
