mod common;

use std::cell::Cell;
use std::rc::Rc;

use chapter::{Chapter, Extras};
use content::events::RESIZE;
use content::{ContentId, Event, EventPayload, Runnable as _};
use serde_json::json;

use common::{nested, params, setup, setup_nested, task, text};

fn count(chapter: &Chapter) -> Rc<Cell<u32>> {
    let seen = Rc::new(Cell::new(0));
    let handle = Rc::clone(&seen);
    chapter.events().on(RESIZE, move |_| handle.set(handle.get() + 1));
    seen
}

#[test]
fn child_resize_reaches_parent_once_and_no_sibling() {
    let (runtime, host) = setup();
    let chapter = Chapter::new(
        params(vec![text(), task(1.0), text()]),
        ContentId(1),
        Extras::default(),
        &host,
    )
    .unwrap();
    let parent_seen = count(&chapter);

    runtime.unit(1).resize();

    assert_eq!(parent_seen.get(), 1);
    assert_eq!(runtime.unit(0).resizes.get(), 0);
    assert_eq!(runtime.unit(1).resizes.get(), 1);
    assert_eq!(runtime.unit(2).resizes.get(), 0);
}

#[test]
fn parent_resize_reaches_every_child_once() {
    let (runtime, host) = setup();
    let chapter = Chapter::new(
        params(vec![text(), task(1.0), text()]),
        ContentId(2),
        Extras::default(),
        &host,
    )
    .unwrap();

    chapter.events().trigger_named(RESIZE);

    for position in 0..3 {
        assert_eq!(runtime.unit(position).resizes.get(), 1, "child {position}");
    }
}

#[test]
fn parent_resize_echoes_back_once_per_child() {
    let (runtime, host) = setup();
    let chapter = Chapter::new(
        params(vec![text(), task(1.0), text()]),
        ContentId(7),
        Extras::default(),
        &host,
    )
    .unwrap();
    let parent_seen = count(&chapter);

    chapter.events().trigger_named(RESIZE);

    assert_eq!(parent_seen.get(), 4);
    for position in 0..3 {
        assert_eq!(runtime.unit(position).resizes.get(), 1, "child {position}");
    }
}

#[test]
fn repeated_child_resizes_stay_upward() {
    let (runtime, host) = setup();
    let chapter = Chapter::new(
        params(vec![text(), text()]),
        ContentId(3),
        Extras::default(),
        &host,
    )
    .unwrap();
    let parent_seen = count(&chapter);

    runtime.unit(0).resize();
    runtime.unit(1).resize();
    runtime.unit(0).resize();

    assert_eq!(parent_seen.get(), 3);
    assert_eq!(runtime.unit(0).resizes.get(), 2);
    assert_eq!(runtime.unit(1).resizes.get(), 1);

    // The guard is down again, so a downward event still gets through.
    chapter.events().trigger_named(RESIZE);
    assert_eq!(runtime.unit(0).resizes.get(), 3);
    assert_eq!(runtime.unit(1).resizes.get(), 2);
}

#[test]
fn payload_is_forwarded_untouched() {
    let (runtime, host) = setup();
    let chapter = Chapter::new(
        params(vec![text()]),
        ContentId(4),
        Extras::default(),
        &host,
    )
    .unwrap();
    let payload = Rc::new(Cell::new(false));
    let handle = Rc::clone(&payload);
    chapter.events().on(RESIZE, move |event| {
        if let EventPayload::Data(data) = event.payload() {
            handle.set(*data == json!({ "height": 120 }));
        }
    });

    runtime
        .unit(0)
        .events()
        .trigger(&Event::with_payload(RESIZE, EventPayload::Data(json!({ "height": 120 }))));

    assert!(payload.get());
}

#[test]
fn show_solutions_and_reset_resize_the_children() {
    let (runtime, host) = setup();
    let chapter = Chapter::new(
        params(vec![task(1.0), text()]),
        ContentId(5),
        Extras::default(),
        &host,
    )
    .unwrap();

    chapter.show_solutions();
    assert_eq!(runtime.unit(0).solutions.get(), 1);
    assert_eq!(runtime.unit(1).solutions.get(), 1);
    assert_eq!(runtime.unit(0).resizes.get(), 1);

    chapter.reset_task();
    assert_eq!(runtime.unit(1).resizes.get(), 2);
}

#[test]
fn nested_chapter_forwards_leaf_resizes_to_the_outer_chapter() {
    let (runtime, host) = setup_nested();
    let outer = Chapter::new(
        params(vec![text(), nested(vec![text(), text()])]),
        ContentId(6),
        Extras::default(),
        &host,
    )
    .unwrap();
    let outer_seen = count(&outer);

    // Units are built depth first: outer text, then the inner chapter's two.
    runtime.unit(1).resize();

    assert_eq!(outer_seen.get(), 1);
    assert_eq!(runtime.unit(0).resizes.get(), 0);
    assert_eq!(runtime.unit(2).resizes.get(), 0);

    outer.events().trigger_named(RESIZE);
    for position in 0..3 {
        assert_eq!(runtime.unit(position).resizes.get(), if position == 1 { 2 } else { 1 });
    }
}
