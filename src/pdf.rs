use crate::error::{QuoteDocError, Result};
use crate::raster::RasterPage;
use crate::types::Size;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use lopdf::{Document as LoDocument, Object as LoObject, Stream as LoStream, dictionary};
use rayon::prelude::*;

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Debug, Clone, Default)]
pub struct PdfInfo {
    pub title: String,
    pub author: String,
}

pub fn assemble_image_pdf(
    pages: &[RasterPage],
    page_size: Size,
    jpeg_quality: u8,
    info: &PdfInfo,
) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(QuoteDocError::Pdf("no pages to write".to_string()));
    }
    let encoded: Vec<Vec<u8>> = pages
        .par_iter()
        .map(|page| encode_jpeg(page, jpeg_quality))
        .collect::<Result<_>>()?;

    let width = page_size.width.to_f32();
    let height = page_size.height.to_f32();
    let media_box = vec![
        LoObject::Integer(0),
        LoObject::Integer(0),
        LoObject::Real(width),
        LoObject::Real(height),
    ];

    let mut doc = LoDocument::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<LoObject> = Vec::with_capacity(pages.len());

    for (page, jpeg) in pages.iter().zip(encoded) {
        let image_id = doc.add_object(
            LoStream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => page.width as i64,
                    "Height" => page.height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                jpeg,
            )
            .with_compression(false),
        );
        let content = format!("q {width} 0 0 {height} 0 0 cm /Im1 Do Q\n").into_bytes();
        let content_id = doc.add_object(LoStream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im1" => image_id,
                },
            },
            "MediaBox" => media_box.clone(),
        });
        kids.push(LoObject::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        LoObject::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => LoObject::string_literal(info.title.as_str()),
        "Author" => LoObject::string_literal(info.author.as_str()),
        "Producer" => LoObject::string_literal(concat!("quotedoc ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn encode_jpeg(page: &RasterPage, quality: u8) -> Result<Vec<u8>> {
    let expected = page.width as usize * page.height as usize * 3;
    if page.rgb.len() != expected {
        return Err(QuoteDocError::Raster(format!(
            "raster buffer is {} bytes, expected {expected} for {}x{}",
            page.rgb.len(),
            page.width,
            page.height
        )));
    }
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode(&page.rgb, page.width, page.height, ExtendedColorType::Rgb8)
        .map_err(|err| QuoteDocError::Raster(format!("jpeg encode failed: {err}")))?;
    Ok(out)
}
