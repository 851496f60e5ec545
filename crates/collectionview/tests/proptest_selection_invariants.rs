//! Property-based invariant tests for selection under store churn.
//!
//! After any sequence of store mutations, selection writes, and drags,
//! followed by a sync:
//!
//! 1. Every selected record is in the store.
//! 2. No record is selected twice.
//! 3. Exactly the selected records carry the selected marker.
//! 4. The tree shows the store's records in store order, one binding each.

use std::collections::BTreeSet;

use collectionview::{
    CollectionOptions, CollectionView, ContainerFlags, Model, Record, RecordStore, Selector,
    SetOptions,
};
use proptest::prelude::*;

#[derive(Debug)]
struct Row(u32);

impl Record for Row {
    type Id = u32;
    fn id(&self) -> Option<u32> {
        Some(self.0)
    }
}

#[derive(Debug, Clone)]
enum Op {
    Push(u32),
    Remove(usize),
    Reset { keep: Vec<bool>, fresh: u32 },
    Select(Vec<usize>),
    Toggle(usize),
    Move { from: usize, to: usize },
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u32..1000).prop_map(Op::Push),
        2 => (0usize..16).prop_map(Op::Remove),
        1 => (proptest::collection::vec(any::<bool>(), 0..16), 0u32..1000)
            .prop_map(|(keep, fresh)| Op::Reset { keep, fresh }),
        3 => proptest::collection::vec(0usize..16, 0..4).prop_map(Op::Select),
        2 => (0usize..16).prop_map(Op::Toggle),
        2 => (0usize..16, 0usize..16).prop_map(|(from, to)| Op::Move { from, to }),
        1 => Just(Op::Clear),
    ]
}

fn apply(view: &mut CollectionView<Row>, store: &RecordStore<Row>, op: &Op) {
    match op {
        Op::Push(n) => {
            store.push(Row(*n));
        }
        Op::Remove(i) => {
            if let Some(m) = store.at(*i % store.len().max(1)) {
                store.remove(m.cid());
            }
        }
        Op::Reset { keep, fresh } => {
            let mut next: Vec<_> = store
                .models()
                .into_iter()
                .zip(keep.iter().chain(std::iter::repeat(&true)))
                .filter(|(_, k)| **k)
                .map(|(m, _)| m)
                .collect();
            next.push(Model::new(Row(*fresh)));
            store.reset(next);
        }
        Op::Select(offsets) => {
            view.set_selected(Selector::Offsets(offsets.clone()), SetOptions::default())
                .unwrap();
        }
        Op::Toggle(i) => {
            if let Some(m) = store.at(*i % store.len().max(1)) {
                view.toggle_selected(m.cid(), None, SetOptions::default())
                    .unwrap();
            }
        }
        Op::Move { from, to } => {
            let len = view.tree().len();
            if len > 0 {
                let cid = view.tree().containers()[*from % len].item_id();
                view.move_item(cid, *to % len).unwrap();
            }
        }
        Op::Clear => view.select_none(SetOptions::default()).unwrap(),
    }
}

fn check(view: &CollectionView<Row>, store: &RecordStore<Row>) {
    let selected = view.selected_cids();
    for cid in &selected {
        assert!(store.contains(*cid), "selected {cid:?} not in store");
    }
    let unique: BTreeSet<_> = selected.iter().copied().collect();
    assert_eq!(unique.len(), selected.len(), "duplicate selection");

    let marked: BTreeSet<_> = view
        .tree()
        .containers()
        .iter()
        .filter(|c| c.flags().contains(ContainerFlags::SELECTED))
        .map(|c| c.item_id())
        .collect();
    assert_eq!(marked, unique, "markers diverge from selection");

    assert_eq!(view.tree().item_order(), store.cids());
    assert_eq!(view.bindings().len(), store.len());
}

fn run(ops: &[Op], multiple: bool) {
    let store = RecordStore::from_records((0..4).map(Row));
    let mut view = CollectionView::new(
        CollectionOptions::new()
            .collection(store.clone())
            .item_template(|r: &Row| r.0.to_string())
            .select_multiple(multiple)
            .sortable(true),
    )
    .unwrap();
    view.render().unwrap();

    for op in ops {
        apply(&mut view, &store, op);
        view.sync().unwrap();
        check(&view, &store);
    }
}

proptest! {
    #[test]
    fn invariants_hold_for_multi_select(ops in proptest::collection::vec(op(), 1..40)) {
        run(&ops, true);
    }

    #[test]
    fn invariants_hold_for_single_select(ops in proptest::collection::vec(op(), 1..40)) {
        run(&ops, false);
    }
}
