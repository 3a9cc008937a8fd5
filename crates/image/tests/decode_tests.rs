use {
    base::Vec2,
    crates_image::ImageEncoder,
    image::{ImageError, decode_frame, decode_frame_blocking},
};

#[tokio::test]
async fn test_decode_jpeg_scales_to_target() {
    let mut buffer = Vec::new();
    let img = crates_image::RgbImage::from_pixel(32, 18, crates_image::Rgb([0, 255, 0]));
    crates_image::codecs::jpeg::JpegEncoder::new(&mut buffer)
        .encode_image(&img)
        .expect("encode failed");

    let surface = decode_frame(buffer, Vec2::new(64, 36)).await.expect("decode");
    assert_eq!(surface.size(), Vec2::new(64, 36));
    let p = surface.pixel(10, 10).expect("pixel");
    assert!(p[1] > 200 && p[0] < 60 && p[2] < 60);
}

#[test]
fn test_decode_png_same_size() {
    let mut buffer = Vec::new();
    let img = crates_image::RgbImage::from_pixel(4, 2, crates_image::Rgb([1, 2, 3]));
    crates_image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), 4, 2, crates_image::ExtendedColorType::Rgb8)
        .expect("encode failed");

    let surface = decode_frame_blocking(&buffer, Vec2::new(4, 2)).expect("decode");
    assert_eq!(surface.pixel(3, 1), Some([1, 2, 3]));
}

#[test]
fn test_decode_garbage() {
    let result = decode_frame_blocking(b"definitely not an image", Vec2::new(4, 4));
    assert!(matches!(result, Err(ImageError::Decode(_))));
}
