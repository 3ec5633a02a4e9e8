use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use egui::{Color32, Pos2};
use futures::channel::oneshot;
use image::RgbaImage;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::command::Command;
use crate::config::EditorConfig;
use crate::element::Element;
use crate::error::{ExportError, ImageLoadError, SuggestionError};
use crate::export::{EXPORT_SCALE, ExportArtifact, ExportMode, Exporter};
use crate::geometry::{HandleMetrics, handle_at};
use crate::gizmo::{DragTarget, GestureGeometry, GizmoHandle, TransformGizmo};
use crate::id_generator::AsyncTag;
use crate::layer::{CanvasSize, LayerId, LayerModel, TextId, TextLayer};
use crate::palette::Palette;
use crate::renderer::CompositeRenderer;
use crate::selection::{SelectionController, SelectionEvent};
use crate::suggestions::{LayoutSuggestions, SuggestionClient};
use crate::util::time::timestamp_millis;

/// Where the product image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    pub fn decode(&self) -> Result<RgbaImage, ImageLoadError> {
        let decoded = match self {
            ImageSource::Path(path) => {
                let bytes = fs::read(path).map_err(|source| ImageLoadError::Read {
                    path: path.clone(),
                    source,
                })?;
                image::load_from_memory(&bytes)?
            }
            ImageSource::Bytes(bytes) => image::load_from_memory(bytes)?,
        };
        Ok(decoded.to_rgba8())
    }

    fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub canvas: CanvasSize,
    pub tagline: String,
    pub offer: String,
    pub image: Option<ImageSource>,
    pub swatches: Vec<Color32>,
    pub export_dir: PathBuf,
    pub suggestion_endpoint: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        EditorConfig::default().session_options()
    }
}

/// What the suggestion panel should show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SuggestionState {
    #[default]
    Idle,
    Pending,
    Ready(LayoutSuggestions),
    /// The last request failed; the message is for display only.
    Unavailable(String),
}

impl SuggestionState {
    /// Pretty JSON for the read-only panel. Failures show nothing; their
    /// reason only goes to the log.
    pub fn panel_json(&self) -> Option<String> {
        match self {
            SuggestionState::Ready(suggestions) => Some(suggestions.pretty()),
            _ => None,
        }
    }
}

/// Identifies one preview frame. Equal keys render identical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewKey {
    pub revision: u64,
    pub live_version: u64,
    pub image_generation: u64,
    pub image_loaded: bool,
}

struct Pending<T> {
    tag: AsyncTag,
    rx: oneshot::Receiver<T>,
}

impl<T> Pending<T> {
    /// `Some(None)` means the worker went away without answering.
    fn try_take(&mut self) -> Option<Option<T>> {
        match self.rx.try_recv() {
            Ok(Some(value)) => Some(Some(value)),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(None),
        }
    }
}

fn spawn_image_load(tag: AsyncTag, source: ImageSource) -> Pending<Result<RgbaImage, ImageLoadError>> {
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        let _ = tx.send(source.decode());
    });
    Pending { tag, rx }
}

fn spawn_export(
    tag: AsyncTag,
    exporter: Exporter,
    mode: ExportMode,
    rendered: RgbaImage,
    timestamp_millis: u64,
) -> Pending<Result<ExportArtifact, ExportError>> {
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        let _ = tx.send(exporter.deliver(mode, &rendered, timestamp_millis));
    });
    Pending { tag, rx }
}

type ExportCallback = Box<dyn FnMut(&str)>;

/// One editing session over a single creative.
///
/// Every mutation arrives through a method on this type, on one thread.
/// Background work (image decoding, export delivery, suggestion requests)
/// reports back via [`EditorSession::poll`], and completions tagged for an older image or a
/// closed session are dropped.
pub struct EditorSession {
    id: Uuid,
    model: LayerModel,
    selection: SelectionController,
    gizmo: TransformGizmo,
    palette: Palette,
    renderer: CompositeRenderer,
    handle_metrics: HandleMetrics,

    image_source: Option<ImageSource>,
    image_tag: AsyncTag,
    image_load: Option<Pending<Result<RgbaImage, ImageLoadError>>>,
    bitmap: Option<Arc<RgbaImage>>,

    suggestion_client: SuggestionClient,
    suggestion_load: Option<Pending<Result<LayoutSuggestions, SuggestionError>>>,
    suggestions: SuggestionState,

    exporter: Exporter,
    export_job: Option<Pending<Result<ExportArtifact, ExportError>>>,
    export_outcome: Option<Result<ExportArtifact, ExportError>>,
    on_embed: Option<ExportCallback>,
    closed: bool,
}

impl EditorSession {
    pub fn open(options: SessionOptions) -> Self {
        let id = Uuid::new_v4();
        info!(
            "Opening session {id} ({}x{})",
            options.canvas.width, options.canvas.height
        );
        let mut session = Self {
            id,
            model: LayerModel::seed(options.canvas, options.tagline, options.offer),
            selection: SelectionController::new(Some(LayerId::Image)),
            gizmo: TransformGizmo::new(),
            palette: Palette::new(options.swatches),
            renderer: CompositeRenderer::new(),
            handle_metrics: HandleMetrics::default(),
            image_source: None,
            image_tag: AsyncTag::new(id),
            image_load: None,
            bitmap: None,
            suggestion_client: SuggestionClient::new(options.suggestion_endpoint),
            suggestion_load: None,
            suggestions: SuggestionState::Idle,
            exporter: Exporter::new(options.export_dir),
            export_job: None,
            export_outcome: None,
            on_embed: None,
            closed: false,
        };
        if let Some(source) = options.image {
            session.start_image_load(source);
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &LayerModel {
        &self.model
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.bitmap.as_deref()
    }

    pub fn image_source(&self) -> Option<&ImageSource> {
        self.image_source.as_ref()
    }

    pub fn image_tag(&self) -> AsyncTag {
        self.image_tag
    }

    pub fn image_pending(&self) -> bool {
        self.image_load.is_some()
    }

    pub fn suggestions(&self) -> &SuggestionState {
        &self.suggestions
    }

    pub fn suggestion_tag(&self) -> Option<AsyncTag> {
        self.suggestion_load.as_ref().map(|p| p.tag)
    }

    pub fn export_pending(&self) -> bool {
        self.export_job.is_some()
    }

    pub fn export_tag(&self) -> Option<AsyncTag> {
        self.export_job.as_ref().map(|p| p.tag)
    }

    /// True while any background work may still report back.
    pub fn has_pending_work(&self) -> bool {
        self.image_load.is_some() || self.suggestion_load.is_some() || self.export_job.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn handle_metrics(&self) -> &HandleMetrics {
        &self.handle_metrics
    }

    /// Called by the view whenever its zoom changes so handles keep their
    /// on-screen size.
    pub fn set_handle_metrics(&mut self, metrics: HandleMetrics) {
        self.handle_metrics = metrics;
    }

    /// Invoked with the data URL after every successful embed export.
    pub fn set_export_callback(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_embed = Some(Box::new(callback));
    }

    /// Switches to a different product image. The creative starts over from
    /// its seeded defaults, and any load still running for the old image is
    /// ignored when it finishes.
    pub fn set_image_source(&mut self, source: Option<ImageSource>) {
        if self.closed {
            return;
        }
        info!(
            "Image source changed to {}",
            source.as_ref().map_or_else(|| "none".to_owned(), ImageSource::describe)
        );
        self.reset();
        self.bitmap = None;
        self.image_load = None;
        self.image_source = None;
        self.image_tag = AsyncTag::new(self.id);
        if let Some(source) = source {
            self.start_image_load(source);
        }
    }

    fn start_image_load(&mut self, source: ImageSource) {
        debug!("Loading image {} as {:?}", source.describe(), self.image_tag);
        self.image_load = Some(spawn_image_load(self.image_tag, source.clone()));
        self.image_source = Some(source);
    }

    /// Drains finished background work. Returns whether anything visible changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        let finished = self
            .image_load
            .as_mut()
            .and_then(|p| p.try_take().map(|r| (p.tag, r)));
        if let Some((tag, result)) = finished {
            self.image_load = None;
            changed |= self.complete_image_load(tag, result.unwrap_or(Err(ImageLoadError::Canceled)));
        }

        let finished = self
            .suggestion_load
            .as_mut()
            .and_then(|p| p.try_take().map(|r| (p.tag, r)));
        if let Some((tag, result)) = finished {
            changed |= self.complete_suggestions(tag, result.unwrap_or(Err(SuggestionError::Canceled)));
        }

        let finished = self
            .export_job
            .as_mut()
            .and_then(|p| p.try_take().map(|r| (p.tag, r)));
        if let Some((tag, result)) = finished {
            changed |= self.complete_export(tag, result.unwrap_or(Err(ExportError::Canceled)));
        }

        changed
    }

    /// Applies a finished image load if it was issued for the current image.
    pub fn complete_image_load(
        &mut self,
        tag: AsyncTag,
        result: Result<RgbaImage, ImageLoadError>,
    ) -> bool {
        if self.closed || tag != self.image_tag {
            debug!("Dropping stale image completion {tag:?}");
            return false;
        }
        if self.image_load.as_ref().is_some_and(|p| p.tag == tag) {
            self.image_load = None;
        }
        match result {
            Ok(bitmap) => {
                info!("Image loaded ({}x{})", bitmap.width(), bitmap.height());
                self.bitmap = Some(Arc::new(bitmap));
            }
            Err(err) => {
                warn!("Image failed to load, rendering it empty: {err}");
                self.bitmap = None;
            }
        }
        true
    }

    /// Sends an auxiliary image to the suggestion service. The layer model is
    /// never touched by the answer.
    pub fn upload_auxiliary(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) {
        if self.closed {
            return;
        }
        let tag = AsyncTag::new(self.id);
        let rx = self.suggestion_client.request(file_name.into(), bytes);
        self.suggestion_load = Some(Pending { tag, rx });
        self.suggestions = SuggestionState::Pending;
    }

    pub fn complete_suggestions(
        &mut self,
        tag: AsyncTag,
        result: Result<LayoutSuggestions, SuggestionError>,
    ) -> bool {
        if self.closed || self.suggestion_tag() != Some(tag) {
            debug!("Dropping stale suggestion completion {tag:?}");
            return false;
        }
        self.suggestion_load = None;
        self.suggestions = match result {
            Ok(suggestions) => {
                info!("Received layout suggestions");
                SuggestionState::Ready(suggestions)
            }
            Err(err) => {
                warn!("No layout suggestions: {err}");
                SuggestionState::Unavailable(err.to_string())
            }
        };
        true
    }

    /// Topmost layer under `pos`: offer, then tagline, then image.
    pub fn hit_test(&self, pos: Pos2) -> Option<LayerId> {
        self.model
            .layers()
            .iter()
            .rev()
            .find(|layer| layer.hit_test(pos))
            .map(|layer| layer.id())
    }

    pub fn pointer_down(&mut self, pos: Pos2) {
        if self.closed {
            return;
        }
        self.gizmo.cancel();

        if self.selection.is_selected(LayerId::Image) {
            let geometry = self.model.image().geometry;
            if let Some(handle) = handle_at(&geometry, pos, &self.handle_metrics) {
                self.gizmo.begin(DragTarget::Image(geometry), handle, pos);
                return;
            }
        }

        match self.hit_test(pos) {
            Some(id) => {
                self.selection.handle(SelectionEvent::LayerClicked(id));
                let target = match id.text_id() {
                    Some(text) => DragTarget::Text(text, self.model.text(text).position),
                    None => DragTarget::Image(self.model.image().geometry),
                };
                self.gizmo.begin(target, GizmoHandle::Move, pos);
            }
            None => self.selection.handle(SelectionEvent::BackgroundClicked),
        }
    }

    /// Feeds an intermediate pointer position to the running gesture.
    /// Returns whether the live preview changed.
    pub fn pointer_move(&mut self, pos: Pos2) -> bool {
        if self.closed {
            return false;
        }
        let before = self.gizmo.live_version();
        self.gizmo.update(pos);
        self.gizmo.live_version() != before
    }

    /// Ends the running gesture and commits the geometry for `pos`.
    pub fn pointer_up(&mut self, pos: Pos2) {
        if self.closed {
            return;
        }
        match self.gizmo.finish(pos) {
            Some(GestureGeometry::Image(geometry)) => self.model.update_image(geometry),
            Some(GestureGeometry::Text(id, position)) => {
                self.edit_text(id, |layer| layer.position = position);
            }
            None => {}
        }
    }

    pub fn apply(&mut self, command: Command) {
        if self.closed {
            debug!("Ignoring {command:?} on closed session");
            return;
        }
        command.apply(self);
    }

    pub(crate) fn edit_text(&mut self, id: TextId, edit: impl FnOnce(&mut TextLayer)) {
        let mut layer = self.model.text(id).clone();
        edit(&mut layer);
        self.model.update_text(id, layer);
    }

    pub(crate) fn choose_background(&mut self, color: Color32) {
        self.palette.choose(color, &mut self.model);
    }

    pub(crate) fn select(&mut self, id: Option<LayerId>) {
        match id {
            Some(id) => self.selection.handle(SelectionEvent::Select(id)),
            None => self.selection.handle(SelectionEvent::BackgroundClicked),
        }
    }

    /// Back to the seeded defaults with the image selected. The image itself
    /// and any suggestions stay.
    pub fn reset(&mut self) {
        if self.closed {
            return;
        }
        self.gizmo.cancel();
        self.model.reset();
        self.selection.select(LayerId::Image);
        self.palette.clear_choice();
        debug!("Session {} reset", self.id);
    }

    /// The committed model with any in-progress gesture applied on top.
    pub fn preview_model(&self) -> LayerModel {
        let mut model = self.model.clone();
        match self.gizmo.live() {
            Some(GestureGeometry::Image(geometry)) => model.update_image(*geometry),
            Some(GestureGeometry::Text(id, position)) => {
                let mut layer = model.text(*id).clone();
                layer.position = *position;
                model.update_text(*id, layer);
            }
            None => {}
        }
        model
    }

    pub fn preview_key(&self) -> PreviewKey {
        PreviewKey {
            revision: self.model.revision(),
            live_version: self.gizmo.live_version(),
            image_generation: self.image_tag.generation,
            image_loaded: self.bitmap.is_some(),
        }
    }

    pub fn render_preview(&self) -> RgbaImage {
        self.renderer
            .render(&self.preview_model(), self.bitmap(), 1.0)
    }

    /// Renders the committed model. In-progress gestures are not included.
    pub fn render(&self, scale: f32) -> RgbaImage {
        self.renderer.render(&self.model, self.bitmap(), scale)
    }

    /// Renders the committed model at export scale and hands encoding and
    /// delivery to a worker. The outcome arrives through [`EditorSession::poll`]
    /// and is collected with [`EditorSession::take_export_outcome`].
    ///
    /// Refusals (closed session, image still loading, export already
    /// running) are returned right away and start no work.
    pub fn export(&mut self, mode: ExportMode) -> Result<AsyncTag, ExportError> {
        if self.closed {
            return Err(ExportError::SessionClosed);
        }
        if self.image_pending() {
            return Err(ExportError::ImagePending);
        }
        if self.export_pending() {
            return Err(ExportError::InProgress);
        }
        let tag = AsyncTag::new(self.id);
        let rendered = self.render(EXPORT_SCALE);
        debug!("Exporting {mode:?} as {tag:?}");
        self.export_outcome = None;
        self.export_job = Some(spawn_export(
            tag,
            self.exporter.clone(),
            mode,
            rendered,
            timestamp_millis(),
        ));
        Ok(tag)
    }

    /// Records a finished export. Embeds are handed to the export callback.
    pub fn complete_export(
        &mut self,
        tag: AsyncTag,
        result: Result<ExportArtifact, ExportError>,
    ) -> bool {
        if self.closed || self.export_tag() != Some(tag) {
            debug!("Dropping stale export completion {tag:?}");
            return false;
        }
        self.export_job = None;
        match &result {
            Ok(ExportArtifact::Embedded(url)) => {
                if let Some(callback) = self.on_embed.as_mut() {
                    callback(url);
                }
            }
            Ok(ExportArtifact::Saved(_)) => {}
            Err(err) => warn!("Export failed: {err}"),
        }
        self.export_outcome = Some(result);
        true
    }

    /// The result of the last finished export, once.
    pub fn take_export_outcome(&mut self) -> Option<Result<ExportArtifact, ExportError>> {
        self.export_outcome.take()
    }

    /// Ends the session. Outstanding work is abandoned and later completions
    /// are ignored.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        info!("Closing session {}", self.id);
        self.gizmo.cancel();
        self.image_load = None;
        self.suggestion_load = None;
        self.export_job = None;
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::encode_png;
    use egui::pos2;
    use image::Rgba;
    use std::time::{Duration, Instant};

    fn options() -> SessionOptions {
        SessionOptions {
            canvas: CanvasSize::new(1080.0, 1080.0),
            tagline: "Sale".into(),
            offer: "20% Off".into(),
            image: None,
            ..Default::default()
        }
    }

    fn png_source(color: [u8; 4]) -> ImageSource {
        let img = RgbaImage::from_pixel(8, 8, Rgba(color));
        ImageSource::Bytes(encode_png(&img).unwrap().into())
    }

    fn wait_for_export(session: &mut EditorSession) -> Result<ExportArtifact, ExportError> {
        let deadline = Instant::now() + Duration::from_secs(30);
        loop {
            session.poll();
            if let Some(outcome) = session.take_export_outcome() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "export never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn wait_for_image(session: &mut EditorSession) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while session.image_pending() && Instant::now() < deadline {
            session.poll();
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_open_selects_image() {
        let session = EditorSession::open(options());
        assert_eq!(session.selection().active(), Some(LayerId::Image));
        assert!(!session.image_pending());
    }

    #[test]
    fn test_background_click_deselects_without_moving() {
        let mut session = EditorSession::open(options());
        session.apply(Command::Select(LayerId::Offer));
        let before = session.model().clone();

        session.pointer_down(pos2(5.0, 1075.0));
        session.pointer_up(pos2(5.0, 1075.0));

        assert_eq!(session.selection().state_name(), "none");
        assert!(session.model().same_content(&before));
    }

    #[test]
    fn test_image_load_completes_through_poll() {
        let mut session = EditorSession::open(SessionOptions {
            image: Some(png_source([0, 200, 0, 255])),
            ..options()
        });
        assert!(session.image_pending());
        wait_for_image(&mut session);
        assert!(!session.image_pending());
        assert_eq!(session.bitmap().map(|b| b.dimensions()), Some((8, 8)));
    }

    #[test]
    fn test_broken_image_renders_empty() {
        let mut session = EditorSession::open(SessionOptions {
            image: Some(ImageSource::Bytes(Arc::from(&b"not an image"[..]))),
            ..options()
        });
        wait_for_image(&mut session);
        assert!(session.bitmap().is_none());
        session.export(ExportMode::Embed).unwrap();
        assert!(wait_for_export(&mut session).is_ok());
    }

    #[test]
    fn test_stale_image_completion_is_ignored() {
        let mut session = EditorSession::open(options());
        let old = session.image_tag();
        session.set_image_source(None);
        let applied = session.complete_image_load(old, Ok(RgbaImage::new(4, 4)));
        assert!(!applied);
        assert!(session.bitmap().is_none());
    }

    #[test]
    fn test_export_while_loading_is_refused() {
        let mut session = EditorSession::open(options());
        session.image_load = Some(Pending {
            tag: session.image_tag(),
            rx: oneshot::channel().1,
        });
        assert!(matches!(
            session.export(ExportMode::Embed),
            Err(ExportError::ImagePending)
        ));
    }

    #[test]
    fn test_closed_session_rejects_everything() {
        let mut session = EditorSession::open(options());
        let before = session.model().clone();
        session.close();
        session.apply(Command::SetText {
            target: TextId::Tagline,
            content: "late".into(),
        });
        session.pointer_down(pos2(500.0, 500.0));
        assert!(session.model().same_content(&before));
        assert!(matches!(
            session.export(ExportMode::Download),
            Err(ExportError::SessionClosed)
        ));
    }

    #[test]
    fn test_embed_invokes_callback() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut session = EditorSession::open(options());
        let seen = Rc::new(RefCell::new(None::<String>));
        let sink = Rc::clone(&seen);
        session.set_export_callback(move |url| *sink.borrow_mut() = Some(url.to_owned()));

        session.export(ExportMode::Embed).unwrap();
        assert!(seen.borrow().is_none());
        let ExportArtifact::Embedded(url) = wait_for_export(&mut session).unwrap() else {
            panic!("expected data url");
        };
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(seen.borrow().as_deref(), Some(url.as_str()));
    }

    #[test]
    fn test_export_returns_before_delivery() {
        let mut session = EditorSession::open(options());
        let tag = session.export(ExportMode::Embed).unwrap();
        assert_eq!(session.export_tag(), Some(tag));
        assert!(session.has_pending_work());
        assert!(matches!(
            session.export(ExportMode::Download),
            Err(ExportError::InProgress)
        ));

        assert!(wait_for_export(&mut session).is_ok());
        assert!(!session.export_pending());
        assert!(session.take_export_outcome().is_none());
    }

    #[test]
    fn test_stale_export_completion_is_ignored() {
        let mut session = EditorSession::open(options());
        let foreign = AsyncTag::new(Uuid::new_v4());
        let applied =
            session.complete_export(foreign, Ok(ExportArtifact::Embedded("data:".into())));
        assert!(!applied);
        assert!(session.take_export_outcome().is_none());
    }

    #[test]
    fn test_close_abandons_running_export() {
        let mut session = EditorSession::open(options());
        let tag = session.export(ExportMode::Embed).unwrap();
        session.close();
        assert!(!session.has_pending_work());
        let applied =
            session.complete_export(tag, Ok(ExportArtifact::Embedded("data:".into())));
        assert!(!applied);
        assert!(session.take_export_outcome().is_none());
    }

    #[test]
    fn test_preview_shows_live_geometry_but_model_does_not() {
        let mut session = EditorSession::open(options());
        let start = session.model().image().geometry.center();
        session.pointer_down(start);
        assert!(session.pointer_move(start + egui::vec2(30.0, 0.0)));

        let committed = session.model().image().geometry;
        let preview = session.preview_model().image().geometry;
        assert!((preview.x - committed.x - 30.0).abs() < 1e-3);

        session.pointer_up(start + egui::vec2(10.0, 0.0));
        assert!((session.model().image().geometry.x - committed.x - 10.0).abs() < 1e-3);
        assert!(session.gizmo().live().is_none());
    }

    #[test]
    fn test_stale_suggestion_is_ignored() {
        let mut session = EditorSession::open(options());
        let foreign = AsyncTag::new(Uuid::new_v4());
        let applied = session.complete_suggestions(
            foreign,
            Err(SuggestionError::Malformed("x".into())),
        );
        assert!(!applied);
        assert_eq!(session.suggestions(), &SuggestionState::Idle);
    }

    #[test]
    fn test_failed_suggestions_leave_panel_empty() {
        let mut session = EditorSession::open(options());
        session.upload_auxiliary("ref.png", vec![1, 2, 3]);
        let tag = session.suggestion_tag().unwrap();
        session.complete_suggestions(tag, Err(SuggestionError::Malformed("<html>".into())));

        assert!(matches!(session.suggestions(), SuggestionState::Unavailable(_)));
        assert_eq!(session.suggestions().panel_json(), None);

        let ready = crate::suggestions::parse_response(r#"{"layout_suggestions": []}"#).unwrap();
        assert!(SuggestionState::Ready(ready).panel_json().is_some());
    }
}
