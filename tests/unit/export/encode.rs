use super::*;
use crate::assets::decode::{data_url_bytes, decode_image};
use crate::foundation::core::Rgba8;

#[test]
fn png_round_trips_through_the_data_url() {
    let mut layer = RasterLayer::new_transparent(6, 4).unwrap();
    layer.draw_over(
        &RasterLayer::filled(3, 4, Rgba8::new(255, 0, 0, 128)).unwrap(),
        0,
        0,
        1.0,
    );
    let art = encode_png(&layer, &ExportOptions::new(6, 4)).unwrap();
    assert_eq!((art.width, art.height), (6, 4));
    assert_eq!(art.blob.mime, "image/png");
    assert!(art.data_url.starts_with("data:image/png;base64,"));
    assert_eq!(&art.blob.bytes[1..4], b"PNG");

    let (mime, bytes) = data_url_bytes(&art.data_url).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, art.blob.bytes);

    let back = decode_image(&art.blob.bytes).unwrap();
    assert_eq!(back.pixel(5, 0), [0, 0, 0, 0]);
    assert_eq!(back.pixel(0, 0), layer.pixel(0, 0));
}

#[test]
fn placeholder_urls_are_encode_errors() {
    for bad in ["", "data:,", "  data:,  ", "data:image/png;base64,"] {
        let err = check_data_url(bad).unwrap_err();
        assert!(err.to_string().starts_with("encode error: "), "{bad:?}");
    }
    assert!(check_data_url("data:image/png;base64,AAAA").is_ok());
}
