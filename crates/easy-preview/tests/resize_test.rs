// Integration tests for drag-to-resize through PreviewApp
//
// Drives pointer-down / move / up sequences and checks the size written to
// the frame, the published viewport and the reconciled device.

use easy_preview::{
    DimensionIdentity, HandleKind, LiveSize, LoadPolicy, PointerPosition, PreviewApp, Viewport,
};
use std::sync::Arc;

mod common;

use common::FakeFrame;

fn app() -> (PreviewApp, Arc<FakeFrame>) {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    let app = PreviewApp::new(frame.clone(), LoadPolicy::default()).expect("default policy");
    (app, frame)
}

#[test]
fn test_drag_sequence_publishes_rounded_viewport() {
    let (mut app, frame) = app();
    app.select_device("iphone-se").unwrap();

    app.begin_resize(
        HandleKind::BottomRight,
        PointerPosition::new(100.0, 100.0),
        LiveSize::new(320.0, 568.0),
    );
    assert!(app.is_resizing());
    assert!(app.snapshot().is_resizing);

    let update = app
        .update_resize(PointerPosition::new(180.4, 150.6))
        .expect("drag is active");
    assert_eq!(update.viewport, Viewport { width: 400, height: 619 });
    assert_eq!(app.viewport(), update.viewport);
    assert_eq!(frame.last_size(), Some(update.live));
    assert!(app.identity().is_custom());

    app.end_resize();
    assert!(!app.is_resizing());
    tracing::info!("✓ Bottom-right drag resized to {}", app.viewport());
}

#[test]
fn test_drag_left_handle_grows_when_moving_left() {
    let (mut app, _frame) = app();
    app.begin_resize(
        HandleKind::Left,
        PointerPosition::new(300.0, 300.0),
        LiveSize::new(440.0, 956.0),
    );

    let update = app.update_resize(PointerPosition::new(250.0, 900.0)).unwrap();

    // Vertical movement is ignored by a side handle
    assert_eq!(update.viewport, Viewport { width: 490, height: 956 });
}

#[test]
fn test_drag_clamps_each_axis_independently() {
    let (mut app, _frame) = app();
    app.begin_resize(
        HandleKind::TopLeft,
        PointerPosition::new(0.0, 0.0),
        LiveSize::new(400.0, 700.0),
    );

    // Width shrinks below the floor, height shrinks within bounds
    let update = app.update_resize(PointerPosition::new(500.0, 100.0)).unwrap();

    assert_eq!(update.viewport, Viewport { width: 200, height: 600 });
}

#[test]
fn test_drag_onto_preset_dimensions_reconciles() {
    let (mut app, _frame) = app();
    app.begin_resize(
        HandleKind::Bottom,
        PointerPosition::new(0.0, 0.0),
        LiveSize::new(393.0, 800.0),
    );

    let update = app.update_resize(PointerPosition::new(0.0, 52.0)).unwrap();

    assert_eq!(update.identity.id(), "iphone-16");
    assert_eq!(app.identity().id(), "iphone-16");
    assert_eq!(app.snapshot().display_text(), "393 × 852");
}

#[test]
fn test_drag_starts_from_live_rect_not_state() {
    let (mut app, _frame) = app();
    // State says 440x956, but the container was rendered smaller
    app.begin_resize(
        HandleKind::Right,
        PointerPosition::new(10.0, 10.0),
        LiveSize::new(300.5, 500.0),
    );

    let update = app.update_resize(PointerPosition::new(20.0, 10.0)).unwrap();

    assert_eq!(update.viewport, Viewport { width: 311, height: 500 });
}

#[test]
fn test_move_without_drag_is_ignored() {
    let (mut app, frame) = app();
    let before = app.viewport();
    let sizes = frame.size_count();

    assert!(app.update_resize(PointerPosition::new(999.0, 999.0)).is_none());

    assert_eq!(app.viewport(), before);
    assert_eq!(frame.size_count(), sizes);
}

#[test]
fn test_end_without_drag_is_noop() {
    let (mut app, _frame) = app();
    app.end_resize();
    app.end_resize();
    assert!(!app.is_resizing());
}

#[test]
fn test_second_pointer_down_replaces_drag() {
    let (mut app, _frame) = app();
    app.begin_resize(
        HandleKind::Right,
        PointerPosition::new(0.0, 0.0),
        LiveSize::new(400.0, 700.0),
    );
    app.begin_resize(
        HandleKind::Top,
        PointerPosition::new(0.0, 0.0),
        LiveSize::new(400.0, 700.0),
    );

    let update = app.update_resize(PointerPosition::new(50.0, -40.0)).unwrap();

    assert_eq!(update.handle, HandleKind::Top);
    assert_eq!(update.viewport, Viewport { width: 400, height: 740 });

    // A single pointer-up ends the only session
    app.end_resize();
    assert!(app.update_resize(PointerPosition::new(0.0, 0.0)).is_none());
}

#[test]
fn test_moves_after_end_do_not_resize() {
    let (mut app, _frame) = app();
    app.begin_resize(
        HandleKind::BottomLeft,
        PointerPosition::new(0.0, 0.0),
        LiveSize::new(400.0, 700.0),
    );
    app.update_resize(PointerPosition::new(-20.0, 20.0)).unwrap();
    app.end_resize();
    let settled = app.viewport();

    assert!(app.update_resize(PointerPosition::new(-200.0, 200.0)).is_none());
    assert_eq!(settled, Viewport { width: 420, height: 720 });
    assert_eq!(app.viewport(), settled);
}

#[test]
fn test_every_handle_from_same_start() {
    let start = LiveSize::new(500.0, 800.0);
    let expected = [
        (HandleKind::TopLeft, 490, 810),
        (HandleKind::Top, 500, 810),
        (HandleKind::TopRight, 510, 810),
        (HandleKind::Right, 510, 800),
        (HandleKind::BottomRight, 510, 790),
        (HandleKind::Bottom, 500, 790),
        (HandleKind::BottomLeft, 490, 790),
        (HandleKind::Left, 490, 800),
    ];
    let (mut app, _frame) = app();
    for (handle, width, height) in expected {
        app.begin_resize(handle, PointerPosition::new(0.0, 0.0), start);
        let update = app.update_resize(PointerPosition::new(10.0, -10.0)).unwrap();
        assert_eq!(
            update.viewport,
            Viewport { width, height },
            "handle {}",
            handle
        );
        assert_eq!(update.identity, DimensionIdentity::Custom);
        app.end_resize();
    }
}
