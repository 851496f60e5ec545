use std::cell::RefCell;
use std::rc::Rc;

use collectionview::{
    AddressingMode, CollectionEvent, CollectionOptions, CollectionView, ContainerFlags, Model,
    Record, RecordStore, Selector, SetOptions, Subscription,
};

#[derive(Debug)]
struct Contact {
    name: &'static str,
}

impl Record for Contact {
    type Id = &'static str;
    fn id(&self) -> Option<&'static str> {
        Some(self.name)
    }
}

fn contacts(names: &[&'static str]) -> RecordStore<Contact> {
    RecordStore::from_records(names.iter().map(|name| Contact { name }))
}

fn rendered(store: &RecordStore<Contact>) -> CollectionView<Contact> {
    let mut view = CollectionView::new(
        CollectionOptions::new()
            .collection(store.clone())
            .item_template(|c: &Contact| c.name.to_string()),
    )
    .unwrap();
    view.render().unwrap();
    view
}

fn record_events(
    view: &CollectionView<Contact>,
) -> (Rc<RefCell<Vec<CollectionEvent<Contact>>>>, Subscription) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let sub = view.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    (log, sub)
}

fn names_of(models: &[Rc<Model<Contact>>]) -> Vec<&'static str> {
    models.iter().map(|m| m.name).collect()
}

fn marked(view: &CollectionView<Contact>) -> Vec<&'static str> {
    view.tree()
        .containers()
        .iter()
        .filter(|c| c.flags().contains(ContainerFlags::SELECTED))
        .filter_map(|c| view.store().get(c.item_id()))
        .map(|m| m.name)
        .collect()
}

#[test]
fn removing_selected_item_selects_its_successor() {
    let store = contacts(&["ann", "bob", "cy"]);
    let mut view = rendered(&store);
    let bob = store.models()[1].cid();
    view.set_selected(Selector::Cids(vec![bob]), SetOptions::default())
        .unwrap();
    let (log, _sub) = record_events(&view);

    store.remove(bob);
    view.sync().unwrap();

    assert_eq!(names_of(&view.selected_models()), vec!["cy"]);
    assert_eq!(marked(&view), vec!["cy"]);
    let changes: Vec<_> = log
        .borrow()
        .iter()
        .filter_map(|e| match e {
            CollectionEvent::SelectionChanged { new, old } => {
                Some((names_of(new), names_of(old)))
            }
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![(vec!["cy"], vec!["bob"])]);
}

#[test]
fn successor_is_visible_only_after_sync() {
    let store = contacts(&["ann", "bob", "cy"]);
    let mut view = rendered(&store);
    let bob = store.models()[1].cid();
    view.set_selected(Selector::Cids(vec![bob]), SetOptions::default())
        .unwrap();

    store.remove(bob);
    assert!(view.selected_cids().is_empty());
    assert!(!view.has_selection());

    view.sync().unwrap();
    assert_eq!(view.selected(AddressingMode::Id), Selector::Ids(vec!["cy"]));
}

#[test]
fn removing_last_selected_item_leaves_nothing_at_that_offset() {
    let store = contacts(&["ann", "bob", "cy"]);
    let mut view = rendered(&store);
    let cy = store.models()[2].cid();
    view.set_selected(Selector::Cids(vec![cy]), SetOptions::default())
        .unwrap();

    store.remove(cy);
    view.sync().unwrap();

    assert!(!view.has_selection());
    assert!(marked(&view).is_empty());
}

#[test]
fn unrelated_removal_keeps_selection() {
    let store = contacts(&["ann", "bob", "cy"]);
    let mut view = rendered(&store);
    let cy = store.models()[2].cid();
    view.set_selected(Selector::Cids(vec![cy]), SetOptions::default())
        .unwrap();
    let (log, _sub) = record_events(&view);

    store.remove(store.models()[0].cid());
    view.sync().unwrap();

    assert_eq!(view.selected_cids(), vec![cy]);
    assert_eq!(
        view.selected(AddressingMode::Offset),
        Selector::Offsets(vec![1])
    );
    assert!(
        log.borrow()
            .iter()
            .all(|e| !matches!(e, CollectionEvent::SelectionChanged { .. }))
    );
}

#[test]
fn disjoint_reset_reports_the_lost_selection() {
    let store = contacts(&["ann", "bob"]);
    let mut view = rendered(&store);
    let ann = store.models()[0].cid();
    view.set_selected(Selector::Cids(vec![ann]), SetOptions::default())
        .unwrap();
    let (log, _sub) = record_events(&view);

    store.reset([Model::new(Contact { name: "dee" }), Model::new(Contact { name: "eve" })]);
    view.sync().unwrap();

    assert!(!view.has_selection());
    assert_eq!(view.tree().lines(), vec!["  dee", "  eve"]);
    let changes: Vec<_> = log
        .borrow()
        .iter()
        .filter_map(|e| match e {
            CollectionEvent::SelectionChanged { new, old } => {
                Some((names_of(new), names_of(old)))
            }
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![(vec![], vec!["ann"])]);
}

#[test]
fn reset_keeping_selected_model_keeps_selection() {
    let store = contacts(&["ann", "bob"]);
    let mut view = rendered(&store);
    let bob = store.models()[1].clone();
    view.set_selected(Selector::Models(vec![bob.clone()]), SetOptions::default())
        .unwrap();

    store.reset([Model::new(Contact { name: "zed" }), bob.clone()]);
    view.sync().unwrap();

    assert_eq!(view.selected_cids(), vec![bob.cid()]);
    assert_eq!(marked(&view), vec!["bob"]);
}

#[test]
fn every_render_notifies_dependent_controls() {
    let store = contacts(&["ann", "bob"]);
    let mut view = rendered(&store);
    view.set_selected(Selector::Offsets(vec![0]), SetOptions::default())
        .unwrap();
    let (log, _sub) = record_events(&view);

    view.render().unwrap();
    view.render().unwrap();

    let names: Vec<&str> = log.borrow().iter().map(CollectionEvent::name).collect();
    assert_eq!(
        names,
        vec!["render", "updateDependentControls", "render", "updateDependentControls"]
    );
}

#[test]
fn store_changes_are_relayed_after_sync() {
    let store = contacts(&["ann"]);
    let mut view = rendered(&store);
    let (log, _sub) = record_events(&view);

    store.push(Contact { name: "bob" });
    assert_eq!(view.pending_changes(), 1);
    assert!(log.borrow().is_empty());

    view.sync().unwrap();
    assert_eq!(view.pending_changes(), 0);
    assert_eq!(view.tree().lines(), vec!["  ann", "  bob"]);
    assert!(
        log.borrow()
            .iter()
            .any(|e| matches!(e, CollectionEvent::StoreChanged(_)))
    );
}

#[test]
fn explicit_save_survives_removal() {
    let store = contacts(&["ann", "bob", "cy"]);
    let mut view = rendered(&store);
    let ann = store.models()[0].cid();
    view.set_selected(Selector::Cids(vec![ann]), SetOptions::default())
        .unwrap();
    view.save_selection().unwrap();

    view.select_none(SetOptions::silent()).unwrap();
    view.restore_selection().unwrap();

    assert_eq!(view.selected_cids(), vec![ann]);
    assert!(view.restore_selection().is_err());
}

#[test]
fn markers_follow_every_write() {
    let store = contacts(&["ann", "bob", "cy", "dee"]);
    let mut view = CollectionView::new(
        CollectionOptions::new()
            .collection(store.clone())
            .item_template(|c: &Contact| c.name.to_string())
            .select_multiple(true),
    )
    .unwrap();
    view.render().unwrap();

    view.set_selected(Selector::Offsets(vec![0, 2]), SetOptions::default())
        .unwrap();
    assert_eq!(marked(&view), vec!["ann", "cy"]);

    view.toggle_selected(store.models()[3].cid(), None, SetOptions::default())
        .unwrap();
    assert_eq!(marked(&view), vec!["ann", "cy", "dee"]);

    store.remove(store.models()[2].cid());
    view.sync().unwrap();
    assert_eq!(marked(&view), vec!["ann", "dee"]);
    assert_eq!(names_of(&view.selected_models()), vec!["ann", "dee"]);
}
