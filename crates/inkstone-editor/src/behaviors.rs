//! Local editor behaviors.
//!
//! `LocalBehaviors` owns the scene, the pointer grabber, the renderer and the history. It
//! runs every pointer gesture through the intention state machine and records a history
//! checkpoint once a gesture's terminal mutation is done. The only await points are the
//! calls into the recognition backend, made after the checkpoint is recorded.

use crate::backend::RecognitionBackend;
use crate::error::{BehaviorsError, BehaviorsResult};
use crate::events::{EditorEvent, EventEmitter};
use crate::import::{ImportError, StrokeDescriptor, prepare_strokes};
use inkstone_core::{
    EditorConfiguration, EditorMode, Exports, GestureEffect, Intention, Model, PenStyle,
    PointerEvent, PointerGrabber, PointerPhase, SegmentHitTester, StateError, UndoRedoContext,
    UndoRedoManager, apply_gesture_event,
};
use inkstone_render::Renderer;

/// Editor behaviors running without a remote session.
pub struct LocalBehaviors<R: Renderer, B: RecognitionBackend> {
    configuration: EditorConfiguration,
    model: Model,
    grabber: PointerGrabber,
    renderer: R,
    backend: B,
    history: UndoRedoManager,
    emitter: Box<dyn EventEmitter>,
    mode: EditorMode,
    pen_style: PenStyle,
    hit_tester: SegmentHitTester,
    /// Intention latched when the open gesture began.
    gesture: Option<Intention>,
}

impl<R: Renderer, B: RecognitionBackend> LocalBehaviors<R, B> {
    /// Create behaviors with an empty scene sized to the configured minimums.
    pub fn new(
        configuration: EditorConfiguration,
        renderer: R,
        backend: B,
        emitter: impl EventEmitter + 'static,
    ) -> Self {
        log::info!("creating local behaviors");
        let (width, height) = configuration.clamp_size(0.0, 0.0);
        let model = Model::new(width, height);
        let history = UndoRedoManager::new(&model, configuration.undo_redo.max_stack_size);
        let grabber = PointerGrabber::new(
            configuration.grabber.xy_float_precision,
            configuration.grabber.timestamp_float_precision,
        );
        Self {
            pen_style: configuration.pen_style.clone(),
            hit_tester: SegmentHitTester {
                tolerance: configuration.eraser.tolerance,
            },
            configuration,
            model,
            grabber,
            renderer,
            backend,
            history,
            emitter: Box::new(emitter),
            mode: EditorMode::default(),
            gesture: None,
        }
    }

    /// Size the scene for the host surface and announce the session.
    pub fn init(&mut self, width: f64, height: f64) {
        log::info!("init {}x{}", width, height);
        let (width, height) = self.configuration.clamp_size(width, height);
        self.model.resize(width, height);
        self.sync_size_in_history();
        self.renderer.init(&self.model);
        self.emitter.emit(EditorEvent::Loaded);
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn context(&self) -> UndoRedoContext {
        self.history.context()
    }

    pub fn history(&self) -> &UndoRedoManager {
        &self.history
    }

    pub fn configuration(&self) -> &EditorConfiguration {
        &self.configuration
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Intention for the next gesture.
    pub fn intention(&self) -> Intention {
        self.mode.intention()
    }

    /// Check if a gesture is currently open.
    pub fn is_gesture_open(&self) -> bool {
        self.gesture.is_some() || self.model.current_stroke().is_some()
    }

    /// Switch mode. An open gesture keeps the intention it started with.
    pub fn set_mode(&mut self, mode: EditorMode) {
        log::info!("set mode {}", mode);
        self.mode = mode;
    }

    /// Switch mode by name; unknown names are logged and ignored.
    pub fn set_mode_by_name(&mut self, name: &str) {
        match name.parse::<EditorMode>() {
            Ok(mode) => self.set_mode(mode),
            Err(err) => log::warn!("{}, keeping {}", err, self.mode),
        }
    }

    pub fn pen_style(&self) -> &PenStyle {
        &self.pen_style
    }

    /// Style for strokes started from now on.
    pub fn set_pen_style(&mut self, style: PenStyle) {
        log::info!("set pen style {:?}", style);
        self.pen_style = style;
    }

    /// Feed one pointer event through the grabber and the state machine.
    ///
    /// Sequencing errors drop the gesture and are only logged. The returned error is a
    /// backend failure that occurred after the gesture's checkpoint was recorded.
    pub async fn handle_pointer_event(&mut self, event: &PointerEvent) -> BehaviorsResult<()> {
        log::debug!("pointer {:?} at ({}, {})", event.phase, event.x, event.y);
        match self.apply_pointer_event(event) {
            GestureEffect::None => {}
            GestureEffect::DrawPendingStroke => {
                if let Some(stroke) = self.model.current_stroke() {
                    self.renderer.draw_pending_stroke(stroke);
                }
            }
            GestureEffect::DrawModel => self.renderer.draw_model(&self.model),
            GestureEffect::Commit => {
                self.checkpoint();
                self.refresh_exports().await?;
            }
            GestureEffect::CommitIfChanged => {
                if self.model.modification_date() != self.history.current().modification_date() {
                    self.checkpoint();
                    self.refresh_exports().await?;
                } else {
                    log::debug!("erase gesture changed nothing");
                }
            }
        }
        Ok(())
    }

    fn apply_pointer_event(&mut self, event: &PointerEvent) -> GestureEffect {
        let Some(grabbed) = self.grabber.grab(event) else {
            return GestureEffect::None;
        };

        if grabbed.phase == PointerPhase::Down {
            let stale = self.gesture.is_some()
                || self.model.current_stroke().is_some()
                || self.model.modification_date() != self.history.current().modification_date();
            if stale {
                log::warn!("discarding unfinished {:?} gesture", self.gesture);
                self.restore_displayed_snapshot();
                self.renderer.draw_model(&self.model);
            }
            self.gesture = Some(self.mode.intention());
        }
        let Some(intention) = self.gesture else {
            log::warn!("pointer {:?} outside of a gesture dropped", grabbed.phase);
            return GestureEffect::None;
        };

        let result = apply_gesture_event(
            intention,
            &grabbed,
            &self.pen_style,
            &mut self.model,
            &self.hit_tester,
        );
        match result {
            Ok(effect) => {
                if grabbed.phase == PointerPhase::Up {
                    self.gesture = None;
                }
                effect
            }
            Err(err) => {
                log::warn!("{:?} gesture dropped: {}", intention, err);
                self.drop_gesture();
                GestureEffect::None
            }
        }
    }

    /// Abandon the open gesture and bring the scene back to the displayed checkpoint.
    fn drop_gesture(&mut self) {
        self.gesture = None;
        self.grabber.cancel();
        if self.model.modification_date() != self.history.current().modification_date() {
            self.restore_displayed_snapshot();
        }
        self.renderer.draw_model(&self.model);
    }

    /// Replace the scene content with the snapshot at the history position.
    fn restore_displayed_snapshot(&mut self) {
        let snapshot = self.history.current().clone();
        self.restore(snapshot);
    }

    /// Install a history snapshot as the live scene. Size is not part of history.
    fn restore(&mut self, snapshot: Model) {
        let (width, height) = (self.model.width, self.model.height);
        self.model = snapshot;
        self.model.resize(width, height);
    }

    /// Redraw, record the scene in history and notify.
    fn checkpoint(&mut self) {
        self.renderer.draw_model(&self.model);
        self.history.add_model_to_stack(&self.model);
        self.emit_changed();
    }

    fn emit_changed(&self) {
        self.emitter.emit(EditorEvent::changed(self.history.context()));
    }

    fn current_exports(&self) -> Exports {
        self.model.exports.clone().unwrap_or_default()
    }

    fn ensure_no_gesture(&self) -> Result<(), StateError> {
        if self.is_gesture_open() {
            return Err(StateError::GestureInProgress);
        }
        Ok(())
    }

    /// Keep the displayed snapshot's size in line with the live scene.
    fn sync_size_in_history(&mut self) {
        let mut snapshot = self.history.current().clone();
        snapshot.resize(self.model.width, self.model.height);
        self.history.update_model_in_stack(&snapshot);
    }

    /// Ask the backend for exports of the checkpointed scene.
    ///
    /// Failures are reported and returned; the checkpoint stays.
    async fn refresh_exports(&mut self) -> BehaviorsResult<()> {
        self.emitter.emit(EditorEvent::Idle(false));
        let result = self.backend.export(&self.model, &[]).await;
        self.emitter.emit(EditorEvent::Idle(true));
        match result {
            Ok(exports) => {
                self.model.exports = Some(exports.clone());
                self.history.update_model_in_stack(&self.model);
                log::debug!("exports updated: {:?}", exports.keys().collect::<Vec<_>>());
                self.emitter.emit(EditorEvent::Exported(exports));
                Ok(())
            }
            Err(err) => {
                log::error!("export failed: {}", err);
                self.emitter.emit(EditorEvent::Error(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Request exports for the given mime types (all when empty).
    pub async fn export(&mut self, mime_types: &[String]) -> BehaviorsResult<&Model> {
        log::info!("export {:?}", mime_types);
        self.ensure_no_gesture()?;
        self.emitter.emit(EditorEvent::Idle(false));
        let result = self.backend.export(&self.model, mime_types).await;
        self.emitter.emit(EditorEvent::Idle(true));
        match result {
            Ok(exports) => {
                let merged = self.model.exports.get_or_insert_with(Exports::new);
                merged.extend(exports.clone());
                self.history.update_model_in_stack(&self.model);
                self.emitter.emit(EditorEvent::Exported(exports));
                Ok(&self.model)
            }
            Err(err) => {
                log::error!("export failed: {}", err);
                self.emitter.emit(EditorEvent::Error(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Request a conversion of the scene.
    pub async fn convert(&mut self) -> BehaviorsResult<&Model> {
        log::info!("convert");
        self.ensure_no_gesture()?;
        self.emitter.emit(EditorEvent::Idle(false));
        let result = self.backend.convert(&self.model).await;
        self.emitter.emit(EditorEvent::Idle(true));
        match result {
            Ok(converts) => {
                self.model.converts = Some(converts.clone());
                self.history.update_model_in_stack(&self.model);
                self.emitter.emit(EditorEvent::Converted(converts));
                Ok(&self.model)
            }
            Err(err) => {
                log::error!("convert failed: {}", err);
                self.emitter.emit(EditorEvent::Error(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Add strokes described by the host, committing one checkpoint for the batch.
    ///
    /// Valid strokes are committed even when others are rejected; the rejections come back
    /// as a single [`ImportError`], which takes precedence over a backend failure on the
    /// export refresh. Returns the number of strokes added.
    pub async fn import_point_events(
        &mut self,
        descriptors: &[StrokeDescriptor],
    ) -> BehaviorsResult<usize> {
        log::info!("import {} stroke descriptors", descriptors.len());
        self.ensure_no_gesture()?;
        let (strokes, issues) = prepare_strokes(descriptors, &self.pen_style);

        let mut added = 0;
        for stroke in strokes {
            self.model.add_stroke(stroke)?;
            added += 1;
        }

        if !issues.is_empty() {
            let error = ImportError { added, issues };
            log::warn!("{}", error);
            self.emitter.emit(EditorEvent::Error(error.to_string()));
            if added > 0 {
                if let Err(err) = self.commit_import().await {
                    log::warn!("import committed without fresh exports: {}", err);
                }
            }
            return Err(error.into());
        }

        if added > 0 {
            self.commit_import().await?;
        }
        Ok(added)
    }

    /// Parse a JSON array of stroke descriptors and import it.
    pub async fn import_point_events_json(&mut self, json: &str) -> BehaviorsResult<usize> {
        let descriptors: Vec<StrokeDescriptor> = serde_json::from_str(json)?;
        self.import_point_events(&descriptors).await
    }

    async fn commit_import(&mut self) -> BehaviorsResult<()> {
        self.checkpoint();
        self.refresh_exports().await?;
        self.emitter.emit(EditorEvent::Imported(self.current_exports()));
        Ok(())
    }

    /// Resize the scene. Not recorded in history.
    pub fn resize(&mut self, width: f64, height: f64) -> &Model {
        log::info!("resize {}x{}", width, height);
        let (width, height) = self.configuration.clamp_size(width, height);
        self.model.resize(width, height);
        self.renderer.resize(&self.model);
        self.sync_size_in_history();
        self.emitter.emit(EditorEvent::Exported(self.current_exports()));
        log::debug!("resized to {}x{}", self.model.width, self.model.height);
        &self.model
    }

    /// Step back in history. A no-op at the bottom.
    pub fn undo(&mut self) -> BehaviorsResult<&Model> {
        log::info!("undo");
        self.ensure_no_gesture()?;
        if !self.history.can_undo() {
            log::debug!("nothing to undo");
            return Ok(&self.model);
        }
        let snapshot = self.history.undo();
        self.show_history_step(snapshot);
        Ok(&self.model)
    }

    /// Step forward in history. A no-op at the top.
    pub fn redo(&mut self) -> BehaviorsResult<&Model> {
        log::info!("redo");
        self.ensure_no_gesture()?;
        if !self.history.can_redo() {
            log::debug!("nothing to redo");
            return Ok(&self.model);
        }
        let snapshot = self.history.redo();
        self.show_history_step(snapshot);
        Ok(&self.model)
    }

    fn show_history_step(&mut self, snapshot: Model) {
        self.restore(snapshot);
        self.sync_size_in_history();
        self.renderer.draw_model(&self.model);
        self.emit_changed();
        self.emitter.emit(EditorEvent::Exported(self.current_exports()));
        log::debug!(
            "history at {} of {}, {} strokes",
            self.history.position(),
            self.history.len(),
            self.model.len()
        );
    }

    /// Remove every stroke. Undoable.
    pub fn clear(&mut self) -> BehaviorsResult<&Model> {
        log::info!("clear");
        self.ensure_no_gesture()?;
        self.model.clear();
        self.checkpoint();
        self.emitter.emit(EditorEvent::Cleared);
        self.emitter.emit(EditorEvent::Exported(self.current_exports()));
        Ok(&self.model)
    }

    /// Tear the session down.
    pub fn destroy(&mut self) {
        log::info!("destroy");
        self.grabber.cancel();
        self.gesture = None;
        self.renderer.destroy();
    }
}

impl<R: Renderer, B: RecognitionBackend> std::fmt::Debug for LocalBehaviors<R, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBehaviors")
            .field("mode", &self.mode)
            .field("strokes", &self.model.len())
            .field("context", &self.history.context())
            .finish_non_exhaustive()
    }
}
