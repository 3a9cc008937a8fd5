use {
    crate::{ImageError, Surface},
    base::Vec2,
    crates_image::imageops::FilterType,
};

/// Decode an encoded image and scale it to exactly `target`.
///
/// Aspect ratio is not preserved; the backend already produces frames in the
/// logical aspect.
pub fn decode_frame_blocking(data: &[u8], target: Vec2<usize>) -> Result<Surface, ImageError> {
    let img = crates_image::load_from_memory(data)?;
    let (width, height) = (target.x as u32, target.y as u32);
    let rgb = if img.width() == width && img.height() == height {
        img.into_rgb8()
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
            .into_rgb8()
    };
    Surface::from_rgb(target, rgb.into_raw())
}

/// Decode on tokio's blocking thread pool.
pub async fn decode_frame(data: Vec<u8>, target: Vec2<usize>) -> Result<Surface, ImageError> {
    tokio::task::spawn_blocking(move || decode_frame_blocking(&data, target))
        .await
        .map_err(|e| ImageError::Decode(e.to_string()))?
}
