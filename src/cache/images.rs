use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::app::source::ProductSource;
use crate::error::AppError;

/// Longest edge kept for the product on screen.
pub const MAX_IMAGE_EDGE: u32 = 1024;
/// Longest edge kept for liked/disliked thumbnails.
pub const THUMBNAIL_EDGE: u32 = 64;

type LoadResult = (ImageKey, Result<DecodedImage, AppError>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, AppError> {
    let image = image::load_from_memory(bytes)?;
    Ok(into_decoded(image))
}

/// Shrinks the image so neither edge exceeds `max_edge`, keeping aspect
/// ratio. Smaller images come back unchanged.
pub fn fit_within(image: DecodedImage, max_edge: u32) -> Result<DecodedImage, AppError> {
    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image);
    }
    let (width, height) = (image.width, image.height);
    let Some(buffer) = image::RgbaImage::from_raw(width, height, image.rgba) else {
        return Err(AppError::Decode(format!(
            "pixel buffer does not match {width}x{height}"
        )));
    };
    let dynamic = DynamicImage::ImageRgba8(buffer);
    let resized = dynamic.resize(max_edge, max_edge, FilterType::Triangle);
    Ok(into_decoded(resized))
}

fn into_decoded(image: DynamicImage) -> DecodedImage {
    let rgba = image.to_rgba8();
    DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    }
}

/// One image source decoded at one size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey {
    pub image_src: String,
    pub max_edge: u32,
}

impl ImageKey {
    pub fn new(image_src: &str, max_edge: u32) -> Self {
        Self {
            image_src: image_src.to_string(),
            max_edge,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ImageSlot {
    Loading,
    Ready(DecodedImage),
    /// Pixels were handed to the renderer and are no longer held here.
    Uploaded,
    Failed(String),
}

/// Fetches and decodes images off the UI thread, once per key.
pub struct ImageLoader {
    source: Arc<dyn ProductSource>,
    slots: HashMap<ImageKey, ImageSlot>,
    result_tx: mpsc::Sender<LoadResult>,
    result_rx: mpsc::Receiver<LoadResult>,
}

impl ImageLoader {
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        Self {
            source,
            slots: HashMap::new(),
            result_tx,
            result_rx,
        }
    }

    pub fn request(&mut self, key: &ImageKey) {
        if self.slots.contains_key(key) {
            return;
        }
        self.slots.insert(key.clone(), ImageSlot::Loading);

        let source = Arc::clone(&self.source);
        let result_tx = self.result_tx.clone();
        let key = key.clone();
        thread::spawn(move || {
            let result = source
                .load_image(&key.image_src)
                .and_then(|bytes| decode_image(&bytes))
                .and_then(|image| fit_within(image, key.max_edge));
            if result_tx.send((key, result)).is_err() {
                debug!("image finished after loader closed");
            }
        });
    }

    /// Stores finished loads and returns the keys that resolved. Results for
    /// keys forgotten in the meantime are dropped.
    pub fn poll(&mut self) -> Vec<ImageKey> {
        let mut resolved = Vec::new();
        while let Ok((key, result)) = self.result_rx.try_recv() {
            let Some(slot) = self.slots.get_mut(&key) else {
                debug!(image_src = %key.image_src, "dropping image no longer wanted");
                continue;
            };
            *slot = match result {
                Ok(image) => ImageSlot::Ready(image),
                Err(error) => {
                    warn!(image_src = %key.image_src, "image load failed: {error}");
                    ImageSlot::Failed(error.to_string())
                }
            };
            resolved.push(key);
        }
        resolved
    }

    pub fn get(&self, key: &ImageKey) -> Option<&ImageSlot> {
        self.slots.get(key)
    }

    /// Hands out decoded pixels once, leaving `Uploaded` in their place.
    pub fn take_ready(&mut self, key: &ImageKey) -> Option<DecodedImage> {
        let slot = self.slots.get_mut(key)?;
        if !matches!(slot, ImageSlot::Ready(_)) {
            return None;
        }
        match std::mem::replace(slot, ImageSlot::Uploaded) {
            ImageSlot::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Drops everything known about `key`; a later request loads it again.
    pub fn forget(&mut self, key: &ImageKey) {
        self.slots.remove(key);
    }

    /// Bytes of decoded pixels still waiting to be taken.
    pub fn retained_bytes(&self) -> usize {
        self.slots
            .values()
            .map(|slot| match slot {
                ImageSlot::Ready(image) => image.rgba.len(),
                _ => 0,
            })
            .sum()
    }
}
