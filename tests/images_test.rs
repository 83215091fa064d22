use orderlist::images::{ImageCanvas, ImageItem, image_dimensions};
use std::io::Cursor;

#[test]
fn test_placement_clamps_and_cascades() {
    let mut canvas = ImageCanvas::default();
    let first = canvas.add("/a.png", (1200, 80)).clone();
    assert_eq!((first.width, first.height), (300, 80));
    assert_eq!((first.x, first.y), (10, 10));

    for _ in 0..4 {
        canvas.add("/b.png", (50, 50));
    }
    let sixth = canvas.add("/c.png", (50, 50)).clone();
    // Offsets wrap after five images.
    assert_eq!((sixth.x, sixth.y), (10, 10));
    assert_eq!(canvas.items()[2].x, 50);
    assert_eq!(canvas.len(), 6);
}

#[test]
fn test_ids_are_unique() {
    let a = ImageItem::place("/a.png", (10, 10), 0);
    let b = ImageItem::place("/a.png", (10, 10), 0);
    assert!(a.id.starts_with("img-"));
    assert_ne!(a.id, b.id);
}

#[test]
fn test_resize_keeps_aspect_ratio() {
    let mut item = ImageItem::place("/a.png", (200, 100), 0);
    item.resize_by(100);
    assert_eq!((item.width, item.height), (300, 150));

    item.resize_by(-1000);
    assert_eq!((item.width, item.height), (50, 25));
}

#[test]
fn test_resize_saturates_at_largest_width() {
    let mut item = ImageItem::place("/a.png", (100, 100), 0);
    item.width = u32::MAX - 10;
    item.height = u32::MAX - 10;
    item.resize_by(100);
    assert_eq!(item.width, u32::MAX);

    item.resize_by(i32::MAX);
    assert_eq!(item.width, u32::MAX);
    assert!(item.height > 0);
}

#[test]
fn test_move_and_remove() {
    let mut canvas = ImageCanvas::default();
    let id = canvas.add("/a.png", (20, 20)).id.clone();
    canvas.get_mut(&id).unwrap().move_to(120, -5);
    assert_eq!((canvas.items()[0].x, canvas.items()[0].y), (120, -5));

    assert!(canvas.remove(&id).is_some());
    assert!(canvas.remove(&id).is_none());
    assert!(canvas.is_empty());
}

#[test]
fn test_image_dimensions() {
    let mut png = Vec::new();
    image::DynamicImage::new_rgb8(7, 3)
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .unwrap();
    assert_eq!(image_dimensions(&png).unwrap(), (7, 3));
    assert!(image_dimensions(b"not an image").is_err());
}
