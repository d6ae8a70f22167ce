//! Single-page PDF containing one raster image.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use thiserror::Error;

use crate::export::geometry::{fit_to_page, PageSize, Placement};
use crate::layout::mm_to_pt;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("image has no pixels")]
    EmptyImage,

    #[error("image stream compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct EncodedPdf {
    pub bytes: Vec<u8>,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub placement: Placement,
}

/// Embeds `bitmap` as a Flate-compressed RGB image on one page of `page` size,
/// fitted and centred by [`fit_to_page`].
pub fn encode_single_page(bitmap: &RgbaImage, page: PageSize) -> Result<EncodedPdf, PdfError> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(PdfError::EmptyImage);
    }

    let placement = fit_to_page(width, height, page);
    let page_width_pt = mm_to_pt(page.width_mm);
    let page_height_pt = mm_to_pt(page.height_mm);

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);
    let image_name = Name(b"Im1");

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page_writer = pdf.page(page_id);
    page_writer
        .media_box(Rect::new(0.0, 0.0, page_width_pt, page_height_pt))
        .parent(page_tree_id)
        .contents(content_id);
    page_writer
        .resources()
        .x_objects()
        .pair(image_name, image_id);
    page_writer.finish();

    let pixels = compress_rgb(bitmap)?;
    let mut image = pdf.image_xobject(image_id, &pixels);
    image.filter(Filter::FlateDecode);
    image.width(width as i32);
    image.height(height as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();

    // PDF user space has its origin bottom-left; placement is top-left based.
    let x = mm_to_pt(placement.x_mm);
    let w = mm_to_pt(placement.width_mm);
    let h = mm_to_pt(placement.height_mm);
    let y = page_height_pt - mm_to_pt(placement.y_mm) - h;

    let mut content = Content::new();
    content.save_state();
    content.transform([w, 0.0, 0.0, h, x, y]);
    content.x_object(image_name);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    Ok(EncodedPdf {
        bytes: pdf.finish(),
        page_width_pt,
        page_height_pt,
        placement,
    })
}

/// Drops the alpha channel (the capture background is opaque) and zlib-compresses
/// the RGB samples for a FlateDecode stream.
fn compress_rgb(bitmap: &RgbaImage) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    for pixel in bitmap.pixels() {
        encoder.write_all(&pixel.0[..3])?;
    }
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use image::Rgba;
    use std::io::Read;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_output_is_a_single_a4_page() {
        let bitmap = RgbaImage::from_pixel(20, 28, Rgba([255, 255, 255, 255]));
        let pdf = encode_single_page(&bitmap, PageSize::A4).unwrap();

        assert!(pdf.bytes.starts_with(b"%PDF-"));
        assert!(contains(&pdf.bytes, b"/Count 1"));
        assert!(contains(&pdf.bytes, b"/FlateDecode"));
        assert!(contains(&pdf.bytes, b"/Im1"));
        assert!((pdf.page_width_pt - 595.28).abs() < 0.01);
        assert!((pdf.page_height_pt - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_empty_bitmap_is_rejected() {
        assert!(matches!(
            encode_single_page(&RgbaImage::new(0, 0), PageSize::A4),
            Err(PdfError::EmptyImage)
        ));
    }

    #[test]
    fn test_rgb_stream_drops_alpha() {
        let bitmap = RgbaImage::from_pixel(2, 1, Rgba([1, 2, 3, 255]));
        let compressed = compress_rgb(&bitmap).unwrap();
        let mut raw = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(raw, vec![1, 2, 3, 1, 2, 3]);
    }
}
