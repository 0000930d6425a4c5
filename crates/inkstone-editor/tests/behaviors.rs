use inkstone_core::{
    EditorConfiguration, EditorMode, Exports, InkError, MIME_TEXT, Model, PointerEvent, StateError,
    Stroke,
};
use inkstone_editor::{
    BackendError, BackendResult, BehaviorsError, BoxFuture, EditorEvent, ImportIssueKind,
    LocalBackend, LocalBehaviors, PointDescriptor, RecognitionBackend, StrokeDescriptor,
};
use inkstone_render::Renderer;
use serde_json::json;
use std::cell::Cell;
use std::sync::mpsc::{Receiver, channel};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Init,
    Pending(usize),
    Model(usize),
    Resize(f64, f64),
    Destroy,
}

#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<Call>,
}

impl Renderer for RecordingRenderer {
    fn init(&mut self, _model: &Model) {
        self.calls.push(Call::Init);
    }

    fn draw_pending_stroke(&mut self, stroke: &Stroke) {
        self.calls.push(Call::Pending(stroke.len()));
    }

    fn draw_model(&mut self, model: &Model) {
        self.calls.push(Call::Model(model.len()));
    }

    fn resize(&mut self, model: &Model) {
        self.calls.push(Call::Resize(model.width, model.height));
    }

    fn destroy(&mut self) {
        self.calls.push(Call::Destroy);
    }
}

/// Backend answering with a text export of the stroke count, or failing on demand.
#[derive(Default)]
struct ScriptedBackend {
    fail: Cell<bool>,
    requests: Cell<usize>,
}

impl RecognitionBackend for ScriptedBackend {
    fn export(
        &self,
        model: &Model,
        _mime_types: &[String],
    ) -> BoxFuture<'_, BackendResult<Exports>> {
        self.requests.set(self.requests.get() + 1);
        let fail = self.fail.get();
        let count = model.len();
        Box::pin(async move {
            if fail {
                return Err(BackendError::Unavailable("offline".to_string()));
            }
            let mut exports = Exports::new();
            exports.insert(MIME_TEXT.to_string(), json!(format!("{count} strokes")));
            Ok(exports)
        })
    }

    fn convert(&self, _model: &Model) -> BoxFuture<'_, BackendResult<Exports>> {
        Box::pin(async { Err(BackendError::Convert("not supported".to_string())) })
    }
}

type Editor = LocalBehaviors<RecordingRenderer, ScriptedBackend>;

fn editor_with(config: EditorConfiguration) -> (Editor, Receiver<EditorEvent>) {
    let (tx, rx) = channel();
    let mut editor = LocalBehaviors::new(
        config,
        RecordingRenderer::default(),
        ScriptedBackend::default(),
        tx,
    );
    editor.init(640.0, 480.0);
    (editor, rx)
}

fn editor() -> (Editor, Receiver<EditorEvent>) {
    editor_with(EditorConfiguration::default())
}

fn send(editor: &mut Editor, event: PointerEvent) -> Result<(), BehaviorsError> {
    pollster::block_on(editor.handle_pointer_event(&event))
}

fn draw(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
    send(editor, PointerEvent::down(from.0, from.1)).unwrap();
    send(editor, PointerEvent::moved((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0)).unwrap();
    send(editor, PointerEvent::up(to.0, to.1)).unwrap();
}

fn erase_at(editor: &mut Editor, x: f64, y: f64) {
    let mode = editor.mode();
    editor.set_mode(EditorMode::Eraser);
    send(editor, PointerEvent::down(x, y)).unwrap();
    send(editor, PointerEvent::up(x, y)).unwrap();
    editor.set_mode(mode);
}

#[test]
fn test_write_gesture_commits_one_stroke() {
    let (mut editor, _rx) = editor();
    send(&mut editor, PointerEvent::down(10.0, 10.0)).unwrap();
    send(&mut editor, PointerEvent::moved(20.0, 10.0)).unwrap();
    send(&mut editor, PointerEvent::up(20.0, 10.0)).unwrap();

    let model = editor.model();
    assert_eq!(model.len(), 1);
    assert!(model.current_stroke().is_none());
    assert!(model.strokes()[0].is_sealed());

    let context = editor.context();
    assert_eq!(context.position, 1);
    assert!(context.can_undo);
    assert!(!context.can_redo);
}

#[test]
fn test_every_gesture_adds_exactly_one_stroke() {
    let (mut editor, _rx) = editor();
    for moves in 0..4 {
        let before = editor.model().len();
        send(&mut editor, PointerEvent::down(5.0, 5.0 * moves as f64)).unwrap();
        for step in 0..moves {
            send(&mut editor, PointerEvent::moved(10.0 + step as f64, 5.0)).unwrap();
        }
        send(&mut editor, PointerEvent::up(50.0, 50.0)).unwrap();
        assert_eq!(editor.model().len(), before + 1);
        assert!(editor.model().current_stroke().is_none());
        assert_eq!(editor.model().strokes()[before].len(), moves + 2);
    }
}

#[test]
fn test_renderer_sequence_for_write_gesture() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (30.0, 10.0));
    assert_eq!(
        editor.renderer().calls,
        vec![Call::Init, Call::Pending(1), Call::Pending(2), Call::Model(1)]
    );
}

#[test]
fn test_clear_is_undoable() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (20.0, 10.0));
    let captured = editor.model().strokes()[0].pointers().to_vec();

    editor.clear().unwrap();
    assert_eq!(editor.model().len(), 0);
    assert_eq!(editor.context().position, 2);
    assert!(editor.context().can_undo);

    editor.undo().unwrap();
    assert_eq!(editor.model().len(), 1);
    assert_eq!(editor.model().strokes()[0].pointers(), captured.as_slice());
}

#[test]
fn test_undo_redo_identity() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (20.0, 10.0));
    draw(&mut editor, (10.0, 50.0), (20.0, 50.0));
    draw(&mut editor, (10.0, 90.0), (20.0, 90.0));
    editor.undo().unwrap();
    assert!(editor.context().can_undo && editor.context().can_redo);

    let strokes = editor.model().strokes().to_vec();
    editor.undo().unwrap();
    editor.redo().unwrap();
    assert_eq!(editor.model().strokes(), strokes.as_slice());
}

#[test]
fn test_redo_after_new_checkpoint_is_noop() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (20.0, 10.0));
    editor.undo().unwrap();
    draw(&mut editor, (10.0, 50.0), (20.0, 50.0));

    let context = editor.context();
    assert!(!context.can_redo);
    editor.redo().unwrap();
    assert_eq!(editor.context(), context);
    assert_eq!(editor.model().len(), 1);
}

#[test]
fn test_history_boundaries_are_noops() {
    let (mut editor, rx) = editor();
    rx.try_iter().count();
    editor.undo().unwrap();
    editor.redo().unwrap();
    assert_eq!(editor.context().position, 0);
    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn test_erase_miss_records_nothing() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (20.0, 10.0));
    let context = editor.context();
    let requests = editor.backend().requests.get();

    erase_at(&mut editor, 300.0, 300.0);
    assert_eq!(editor.context(), context);
    assert_eq!(editor.model().len(), 1);
    assert_eq!(editor.backend().requests.get(), requests);
}

#[test]
fn test_erase_hit_records_checkpoint() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (30.0, 10.0));
    draw(&mut editor, (10.0, 80.0), (30.0, 80.0));

    erase_at(&mut editor, 20.0, 10.0);
    assert_eq!(editor.model().len(), 1);
    assert_eq!(editor.context().position, 3);

    editor.undo().unwrap();
    assert_eq!(editor.model().len(), 2);
}

#[test]
fn test_erase_drag_removes_along_path() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (30.0, 10.0));
    draw(&mut editor, (10.0, 80.0), (30.0, 80.0));

    editor.set_mode(EditorMode::Eraser);
    send(&mut editor, PointerEvent::down(20.0, 10.0)).unwrap();
    assert_eq!(editor.model().len(), 1);
    assert!(editor.renderer().calls.ends_with(&[Call::Model(1)]));
    send(&mut editor, PointerEvent::moved(20.0, 80.0)).unwrap();
    send(&mut editor, PointerEvent::up(200.0, 200.0)).unwrap();

    // one checkpoint for the whole drag
    assert!(editor.model().is_empty());
    assert_eq!(editor.context().stack_len, 4);
}

#[test]
fn test_capacity_evicts_oldest() {
    let config =
        EditorConfiguration::from_json(r#"{ "undo-redo": { "maxStackSize": 3 } }"#).unwrap();
    let (mut editor, _rx) = editor_with(config);
    for i in 0..5 {
        let y = 10.0 + 20.0 * i as f64;
        draw(&mut editor, (10.0, y), (20.0, y));
        let context = editor.context();
        assert!(context.stack_len <= 3);
        assert!(context.position < context.stack_len);
    }
    assert_eq!(editor.context().position, 2);

    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(editor.model().len(), 3);
    assert!(!editor.context().can_undo);
}

#[test]
fn test_import_keeps_valid_strokes() {
    let (mut editor, rx) = editor();
    let json = r#"[{"pointers": [{"x": 0, "y": 0}]}, {"pointers": [{"y": 5}]}]"#;
    let err = pollster::block_on(editor.import_point_events_json(json)).unwrap_err();

    let BehaviorsError::Import(import) = err else {
        panic!("expected import error, got {err:?}");
    };
    assert_eq!(import.added, 1);
    assert_eq!(import.issues.len(), 1);
    assert_eq!(import.issues[0].stroke_index, 2);
    assert_eq!(import.issues[0].kind, ImportIssueKind::MissingX);
    assert_eq!(import.issues[0].to_string(), "stroke 2 has no x at pointer at 0");

    assert_eq!(editor.model().len(), 1);
    assert_eq!(editor.context().position, 1);

    let events: Vec<_> = rx.try_iter().collect();
    let errors = events.iter().filter(|e| matches!(e, EditorEvent::Error(_))).count();
    assert_eq!(errors, 1);
    assert!(events.iter().any(|e| matches!(e, EditorEvent::Imported(_))));
}

#[test]
fn test_import_defaults() {
    let (mut editor, _rx) = editor();
    let descriptors = vec![StrokeDescriptor::from_points([
        PointDescriptor::new(1.0, 2.0),
        PointDescriptor::new(3.0, 4.0),
    ])];
    let added = pollster::block_on(editor.import_point_events(&descriptors)).unwrap();
    assert_eq!(added, 1);

    let stroke = &editor.model().strokes()[0];
    assert_eq!(stroke.pointer_id(), 1);
    assert_eq!(stroke.pointers()[1].t, 1.0);
    assert_eq!(stroke.pointers()[1].p, 1.0);
    assert_eq!(stroke.style(), editor.pen_style());
}

#[test]
fn test_import_of_nothing_records_nothing() {
    let (mut editor, _rx) = editor();
    let added = pollster::block_on(editor.import_point_events(&[])).unwrap();
    assert_eq!(added, 0);
    assert_eq!(editor.context().stack_len, 1);
}

#[test]
fn test_checkpoint_events() {
    let (mut editor, rx) = editor();
    assert_eq!(rx.try_recv().unwrap(), EditorEvent::Loaded);

    draw(&mut editor, (10.0, 10.0), (20.0, 10.0));
    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], EditorEvent::changed(editor.context()));
    assert_eq!(events[1], EditorEvent::Idle(false));
    assert_eq!(events[2], EditorEvent::Idle(true));
    let EditorEvent::Exported(exports) = &events[3] else {
        panic!("expected exports, got {:?}", events[3]);
    };
    assert_eq!(exports[MIME_TEXT], json!("1 strokes"));
    assert_eq!(editor.model().exports.as_ref(), Some(exports));
    assert_eq!(editor.history().current().exports.as_ref(), Some(exports));
}

#[test]
fn test_backend_failure_keeps_checkpoint() {
    let (mut editor, rx) = editor();
    editor.backend().fail.set(true);

    send(&mut editor, PointerEvent::down(10.0, 10.0)).unwrap();
    let err = send(&mut editor, PointerEvent::up(20.0, 10.0)).unwrap_err();
    assert!(matches!(err, BehaviorsError::Backend(BackendError::Unavailable(_))));

    assert_eq!(editor.model().len(), 1);
    assert_eq!(editor.context().position, 1);
    let offline = EditorEvent::Error("Backend unavailable: offline".to_string());
    assert!(rx.try_iter().any(|e| e == offline));
}

#[test]
fn test_convert_failure_reported() {
    let (mut editor, rx) = editor();
    let err = pollster::block_on(editor.convert()).unwrap_err();
    assert!(matches!(err, BehaviorsError::Backend(BackendError::Convert(_))));
    assert!(rx.try_iter().any(|e| matches!(e, EditorEvent::Error(_))));
}

#[test]
fn test_gesture_blocks_history_navigation() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (20.0, 10.0));
    send(&mut editor, PointerEvent::down(10.0, 50.0)).unwrap();

    let err = editor.undo().unwrap_err();
    assert!(matches!(err, BehaviorsError::Ink(InkError::State(StateError::GestureInProgress))));
    assert!(pollster::block_on(editor.import_point_events(&[])).is_err());

    send(&mut editor, PointerEvent::up(20.0, 50.0)).unwrap();
    editor.undo().unwrap();
    assert_eq!(editor.model().len(), 1);
}

#[test]
fn test_second_pointer_ignored_during_gesture() {
    let (mut editor, _rx) = editor();
    let touch = inkstone_core::PointerType::Touch;
    send(&mut editor, PointerEvent::down(10.0, 10.0)).unwrap();
    send(&mut editor, PointerEvent::down(100.0, 100.0).with_pointer(2, touch)).unwrap();
    send(&mut editor, PointerEvent::moved(100.0, 120.0).with_pointer(2, touch)).unwrap();
    send(&mut editor, PointerEvent::up(20.0, 10.0)).unwrap();

    assert_eq!(editor.model().len(), 1);
    assert_eq!(editor.model().strokes()[0].len(), 2);
}

#[test]
fn test_resize_keeps_history() {
    let (mut editor, rx) = editor();
    draw(&mut editor, (10.0, 10.0), (20.0, 10.0));
    rx.try_iter().count();

    editor.resize(50.0, 900.0);
    assert_eq!((editor.model().width, editor.model().height), (100.0, 900.0));
    assert!(editor.renderer().calls.ends_with(&[Call::Resize(100.0, 900.0)]));
    assert_eq!(editor.context().stack_len, 2);
    assert!(matches!(rx.try_recv().unwrap(), EditorEvent::Exported(_)));
}

#[test]
fn test_destroy_releases_renderer() {
    let (mut editor, _rx) = editor();
    editor.destroy();
    assert_eq!(editor.renderer().calls.last(), Some(&Call::Destroy));
}

#[test]
fn test_local_backend_session() {
    let mut editor = LocalBehaviors::new(
        EditorConfiguration::default(),
        RecordingRenderer::default(),
        LocalBackend::new(),
        inkstone_editor::NoopEmitter,
    );
    editor.init(0.0, 0.0);
    pollster::block_on(editor.handle_pointer_event(&PointerEvent::down(1.0, 1.0))).unwrap();
    pollster::block_on(editor.handle_pointer_event(&PointerEvent::up(5.0, 5.0))).unwrap();
    assert_eq!(editor.model().exports, Some(Exports::new()));
    assert_eq!(editor.model().width, 100.0);
}

#[test]
fn test_unfinished_erase_discarded_on_next_down() {
    let (mut editor, _rx) = editor();
    draw(&mut editor, (10.0, 10.0), (30.0, 10.0));
    let kept = editor.model().strokes()[0].clone();

    // erase gesture whose up never arrives
    editor.set_mode(EditorMode::Eraser);
    send(&mut editor, PointerEvent::down(20.0, 10.0)).unwrap();
    assert!(editor.model().is_empty());

    editor.set_mode(EditorMode::Pen);
    draw(&mut editor, (10.0, 100.0), (30.0, 100.0));
    assert_eq!(editor.model().len(), 2);
    assert_eq!(editor.model().strokes()[0], kept);
    assert_eq!(editor.context().position, 2);

    // undoing the new stroke leaves the first one alone
    editor.undo().unwrap();
    assert_eq!(editor.model().strokes(), std::slice::from_ref(&kept));
}

#[test]
fn test_import_issues_win_over_backend_failure() {
    let (mut editor, rx) = editor();
    editor.backend().fail.set(true);
    let json = r#"[{"pointers": [{"x": 0, "y": 0}]}, {"pointers": [{"y": 5}]}]"#;

    let err = pollster::block_on(editor.import_point_events_json(json)).unwrap_err();
    let BehaviorsError::Import(import) = err else {
        panic!("expected import error, got {err:?}");
    };
    assert_eq!(import.added, 1);
    assert_eq!(editor.model().len(), 1);
    assert_eq!(editor.context().position, 1);

    let errors: Vec<_> = rx.try_iter().filter(|e| matches!(e, EditorEvent::Error(_))).collect();
    assert_eq!(errors.len(), 2);
}
