use std::io::Cursor;

use base64::Engine as _;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let layer = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!((layer.width(), layer.height()), (1, 1));
    assert_eq!(
        layer.data(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_svg_parse_ok_and_err() {
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
    parse_svg(ok).unwrap();
    assert!(parse_svg(br#"<svg"#).is_err());
}

#[test]
fn svg_rasterizes_at_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"><rect width="4" height="2" fill="#ff0000"/></svg>"##;
    assert!(looks_like_svg(svg));
    let layer = decode_any(svg).unwrap();
    assert_eq!((layer.width(), layer.height()), (4, 2));
    assert_eq!(layer.pixel(1, 1), [255, 0, 0, 255]);
}

#[test]
fn base64_data_url_decodes() {
    let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 2, [0, 255, 0, 255]));
    let layer = decode_data_url(&format!("data:image/png;base64,{b64}")).unwrap();
    assert_eq!((layer.width(), layer.height()), (3, 2));
    assert_eq!(layer.pixel(2, 1), [0, 255, 0, 255]);
}

#[test]
fn percent_encoded_svg_data_url_decodes() {
    let url = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='2' height='2'%3E%3Crect width='2' height='2' fill='blue'/%3E%3C/svg%3E";
    let layer = decode_data_url(url).unwrap();
    assert_eq!(layer.pixel(0, 0), [0, 0, 255, 255]);
}

#[test]
fn malformed_data_urls_are_asset_errors() {
    assert!(matches!(decode_data_url("data:,"), Err(BackdropError::Asset(_))));
    assert!(matches!(decode_data_url("blob:xyz"), Err(BackdropError::Asset(_))));
    assert!(decode_data_url("data:image/png;base64,@@@").is_err());
}
