pub mod images;

pub use images::{decode_image, DecodedImage, ImageKey, ImageLoader, ImageSlot};
