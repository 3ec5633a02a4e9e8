use egui::{Color32, CursorIcon, Pos2, Rect, Sense, pos2};

use crate::app::CreativeEditorApp;
use crate::element::Element;
use crate::geometry::{HandleMetrics, handle_at};
use crate::gizmo::GizmoHandle;
use crate::input::{CanvasView, route_event};
use crate::layer::{Layer, LayerId};

pub fn central_panel(app: &mut CreativeEditorApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::central_panel(&ctx.style()).fill(Color32::from_gray(48)))
        .show(ctx, |ui| {
            let Some(session) = app.session.as_mut() else {
                ui.centered_and_justified(|ui| {
                    if ui.button("Session closed. Open a new one").clicked() {
                        app.reopen = true;
                    }
                });
                return;
            };

            let available = ui.available_rect_before_wrap();
            let (_, painter) = ui.allocate_painter(available.size(), Sense::click_and_drag());
            let view = CanvasView::fit(session.model().canvas(), available);
            let metrics = HandleMetrics::for_view_scale(view.scale);
            session.set_handle_metrics(metrics);

            // Handle input
            for event in app.input.process_input(ctx, &view) {
                if route_event(&event, session) {
                    ctx.request_repaint();
                }
            }

            // Render the canvas
            let key = session.preview_key();
            match app.textures.preview_texture(ctx, key, || session.render_preview()) {
                Ok(texture) => {
                    let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                    painter.image(texture, view.rect, uv, Color32::WHITE);
                }
                Err(err) => log::error!("Preview texture failed: {err}"),
            }

            let Some(active) = session.selection().active() else {
                return;
            };
            let preview = session.preview_model();
            let layer = preview.layer(active);
            let hover = app.input.hover_pos().map(|p| view.to_canvas(p));

            let image = match layer {
                Layer::Image(image) => Some(image.geometry),
                Layer::Text(..) => None,
            };
            let outline = match image {
                Some(geometry) => geometry.corners(),
                None => rect_corners(layer.bounds()),
            };
            session
                .gizmo()
                .paint(&painter, outline, image.as_ref(), &metrics, hover, |p| view.to_screen(p));

            if let Some(cursor) = cursor_for(session.gizmo().active_handle(), hover, active, &layer, &metrics) {
                ctx.set_cursor_icon(cursor);
            }
        });
}

fn rect_corners(rect: Rect) -> [Pos2; 4] {
    [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
}

fn cursor_for(
    dragging: Option<GizmoHandle>,
    hover: Option<Pos2>,
    active: LayerId,
    layer: &Layer<'_>,
    metrics: &HandleMetrics,
) -> Option<CursorIcon> {
    let handle = dragging.or_else(|| {
        let pos = hover?;
        match layer {
            Layer::Image(image) if active == LayerId::Image => handle_at(&image.geometry, pos, metrics)
                .or_else(|| layer.hit_test(pos).then_some(GizmoHandle::Move)),
            _ => layer.hit_test(pos).then_some(GizmoHandle::Move),
        }
    })?;
    Some(match handle {
        GizmoHandle::Move => CursorIcon::Move,
        GizmoHandle::Scale(corner) => corner.cursor_icon(),
        GizmoHandle::Rotate => CursorIcon::Alias,
    })
}
