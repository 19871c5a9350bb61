use std::collections::HashMap;
use std::time::Duration;

use eframe::egui::{self, load::SizedTexture, ColorImage, Key, TextureHandle, TextureOptions};

use crate::app::events::{KEY_DISLIKE, KEY_LIKE};
use crate::app::{AppEvent, SessionController, Thumbnail};
use crate::cache::images::{ImageKey, ImageLoader, ImageSlot, MAX_IMAGE_EDGE, THUMBNAIL_EDGE};
use crate::catalog::ProductId;
use crate::error::AppError;

const WATCHED_KEYS: [(Key, u32); 2] = [(Key::Num1, KEY_DISLIKE), (Key::Num2, KEY_LIKE)];
const PRODUCT_IMAGE_HEIGHT: f32 = 360.0;
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// The product image on screen and the texture uploaded for it.
struct ShownImage<T> {
    key: Option<ImageKey>,
    texture: Option<T>,
}

impl<T> ShownImage<T> {
    fn new() -> Self {
        Self {
            key: None,
            texture: None,
        }
    }

    /// Switches to `key`, releasing the old texture. Returns the key that
    /// left the screen.
    fn show(&mut self, key: Option<ImageKey>) -> Option<ImageKey> {
        if key == self.key {
            return None;
        }
        self.texture = None;
        std::mem::replace(&mut self.key, key)
    }

    /// Keeps `texture` only if it belongs to the image still on screen.
    fn attach(&mut self, key: &ImageKey, texture: T) -> bool {
        if self.key.as_ref() != Some(key) {
            return false;
        }
        self.texture = Some(texture);
        true
    }
}

pub struct SwipeWindow {
    controller: SessionController,
    images: ImageLoader,
    product: ShownImage<TextureHandle>,
    thumbnails: HashMap<String, TextureHandle>,
}

impl SwipeWindow {
    fn new(controller: SessionController) -> Self {
        Self {
            images: ImageLoader::new(controller.source()),
            controller,
            product: ShownImage::new(),
            thumbnails: HashMap::new(),
        }
    }

    fn request_visible_images(&mut self) {
        let state = self.controller.state();
        let shown = state
            .view
            .as_ref()
            .map(|view| ImageKey::new(&view.image_src, MAX_IMAGE_EDGE));
        let thumbnails: Vec<ImageKey> = state
            .board
            .liked
            .iter()
            .chain(state.board.disliked.iter())
            .map(|thumbnail| ImageKey::new(&thumbnail.image_src, THUMBNAIL_EDGE))
            .collect();

        if let Some(previous) = self.product.show(shown) {
            self.images.forget(&previous);
        }
        if let Some(key) = &self.product.key {
            self.images.request(key);
        }
        for key in &thumbnails {
            self.images.request(key);
        }
    }

    fn upload_resolved_images(&mut self, ctx: &egui::Context) {
        for key in self.images.poll() {
            let Some(image) = self.images.take_ready(&key) else {
                continue;
            };
            let size = [image.width as usize, image.height as usize];
            let color_image = ColorImage::from_rgba_unmultiplied(size, &image.rgba);
            let name = format!("{}@{}", key.image_src, key.max_edge);
            let texture = ctx.load_texture(name, color_image, TextureOptions::LINEAR);

            if key.max_edge == THUMBNAIL_EDGE {
                self.thumbnails.insert(key.image_src, texture);
            } else if !self.product.attach(&key, texture) {
                self.images.forget(&key);
            }
        }
    }

    fn draw_image(
        &self,
        ui: &mut egui::Ui,
        texture: Option<&TextureHandle>,
        key: &ImageKey,
        max_height: f32,
    ) {
        if let Some(texture) = texture {
            let image = egui::Image::from_texture(SizedTexture::from_handle(texture));
            ui.add(image.max_height(max_height));
            return;
        }
        match self.images.get(key) {
            Some(ImageSlot::Failed(_)) => {
                ui.label("[image unavailable]");
            }
            _ => {
                ui.spinner();
            }
        }
    }

    fn draw_strip(&self, ui: &mut egui::Ui, title: &str, thumbnails: &[Thumbnail]) {
        ui.label(format!("{title} ({})", thumbnails.len()));
        ui.horizontal_wrapped(|ui| {
            for thumbnail in thumbnails {
                let key = ImageKey::new(&thumbnail.image_src, THUMBNAIL_EDGE);
                let texture = self.thumbnails.get(&thumbnail.image_src);
                self.draw_image(ui, texture, &key, THUMBNAIL_EDGE as f32);
            }
        });
    }
}

impl eframe::App for SwipeWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for (key, code) in WATCHED_KEYS {
            if ctx.input(|input| input.key_released(key)) {
                self.controller.dispatch(AppEvent::KeyReleased(code));
            }
        }

        self.controller.poll();
        self.request_visible_images();
        self.upload_resolved_images(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.heading("Left or Right");
            ui.label("Press 1 to dislike, 2 to like.");
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let state = self.controller.state();
            if let Some(error) = &state.last_error {
                ui.colored_label(egui::Color32::RED, error);
            } else if state.is_waiting() {
                ui.label("Loading...");
            } else {
                ui.label(format!(
                    "{} decisions, {} stale responses dropped",
                    state.board.len(),
                    state.dropped_responses
                ));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let (Some(view), Some(key)) = (self.controller.view(), &self.product.key) {
                ui.label(&view.description);
                let texture = self.product.texture.as_ref();
                self.draw_image(ui, texture, key, PRODUCT_IMAGE_HEIGHT);
                ui.hyperlink_to("View product", &view.link_href);
            } else {
                ui.spinner();
            }

            ui.separator();
            let board = &self.controller.state().board;
            self.draw_strip(ui, "Disliked", &board.disliked);
            ui.separator();
            self.draw_strip(ui, "Liked", &board.liked);
        });

        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}

/// Opens the widget window and blocks until it is closed.
pub fn launch_window(
    mut controller: SessionController,
    first_product_id: ProductId,
) -> Result<(), AppError> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([720.0, 760.0]),
        ..Default::default()
    };

    controller.dispatch(AppEvent::Start(first_product_id));
    let window = SwipeWindow::new(controller);

    eframe::run_native(
        "left-or-right",
        options,
        Box::new(|_cc| Ok(Box::new(window))),
    )
    .map_err(|error| AppError::Ui(format!("failed to start UI: {error}")))
}
