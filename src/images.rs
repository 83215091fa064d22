use crate::error::{OrderError, Result};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

pub const MAX_PLACED_SIZE: u32 = 300;
pub const MIN_WIDTH: u32 = 50;

/// An image pinned onto the free-form canvas next to the order table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: String,
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl ImageItem {
    /// Place the `existing`-th image: size clamped to 300 px, each new image
    /// offset by 20 px from the previous one, wrapping every five.
    pub fn place(src: impl Into<String>, natural: (u32, u32), existing: usize) -> Self {
        let offset = 10 + ((existing * 20) % 100) as i32;
        ImageItem {
            id: new_image_id(),
            src: src.into(),
            width: natural.0.min(MAX_PLACED_SIZE),
            height: natural.1.min(MAX_PLACED_SIZE),
            x: offset,
            y: offset,
        }
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Grow or shrink by `delta` pixels of width, keeping the aspect ratio.
    pub fn resize_by(&mut self, delta: i32) {
        let aspect = if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        };
        let width = (self.width as i64 + delta as i64).clamp(MIN_WIDTH as i64, u32::MAX as i64);
        let width = width as u32;
        self.width = width;
        self.height = ((width as f64 / aspect).round() as u32).max(1);
    }
}

pub fn new_image_id() -> String {
    format!("img-{}-{}", chrono::Utc::now().timestamp_millis(), random_suffix(9))
}

pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Pixel dimensions of an encoded image (png, jpeg, gif, ...).
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OrderError::Image(e.to_string()))?
        .into_dimensions()
        .map_err(|e| OrderError::Image(e.to_string()))
}

/// Images placed on the canvas of one project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCanvas {
    items: Vec<ImageItem>,
}

impl ImageCanvas {
    pub fn new(items: Vec<ImageItem>) -> Self {
        ImageCanvas { items }
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, src: impl Into<String>, natural: (u32, u32)) -> &ImageItem {
        let item = ImageItem::place(src, natural, self.items.len());
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ImageItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<ImageItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }
}
