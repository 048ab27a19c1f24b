//! Picture extraction: pull every embedded image out of the published PDF.
//!
//! The Word document pandoc reads only references its pictures, so the
//! exporter also publishes the page as PDF and takes the pixels from there.
//! Images are numbered across the whole document in page order, then in
//! object order within a page, which is the order pandoc numbers its
//! `media/imageN` placeholders in.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a C++ library behind a synchronous API. Extraction runs on the
//! blocking thread pool so the runtime worker is never stalled.

use crate::error::ExportError;
use crate::sanitize::replace_whitespace;
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extract all images of `pdf_path` into `assets_dir` as PNG files.
///
/// Files are named `<page_name with underscores>_<NNN>.png`. Returns the
/// file names (not paths) in extraction order.
pub async fn extract_pdf_images(
    pdf_path: &Path,
    assets_dir: &Path,
    page_name: &str,
) -> Result<Vec<String>, ExportError> {
    let pdf = pdf_path.to_path_buf();
    let assets = assets_dir.to_path_buf();
    let stem = replace_whitespace(page_name);

    tokio::task::spawn_blocking(move || extract_blocking(&pdf, &assets, &stem))
        .await
        .map_err(|e| ExportError::Internal(format!("Image extraction task panicked: {}", e)))?
}

/// Name of the `index`-th image of a page.
pub fn asset_name(stem: &str, index: usize) -> String {
    format!("{}_{:03}.png", stem, index)
}

/// Bind to pdfium: `PDFIUM_LIB_PATH`, then the working directory, then the
/// system library path.
pub fn bind_pdfium() -> Result<Pdfium, ExportError> {
    let explicit = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from);

    let bindings = match explicit {
        Some(path) => Pdfium::bind_to_library(&path),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ExportError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn extract_blocking(
    pdf_path: &Path,
    assets_dir: &Path,
    stem: &str,
) -> Result<Vec<String>, ExportError> {
    std::fs::create_dir_all(assets_dir).map_err(|e| ExportError::io(assets_dir, e))?;

    let pdfium = bind_pdfium()?;
    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ExportError::PdfOpenFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    let mut names = Vec::new();
    for (page_idx, page) in document.pages().iter().enumerate() {
        for object in page.objects().iter() {
            let Some(image_object) = object.as_image_object() else {
                continue;
            };

            let name = asset_name(stem, names.len());
            let png_path = assets_dir.join(&name);

            let raw = image_object
                .get_raw_image()
                .map_err(|e| ExportError::ImageExtractionFailed {
                    path: png_path.clone(),
                    detail: format!("{:?}", e),
                })?;
            let image = png_compatible(raw);

            info!("Writing png: {}", png_path.display());
            image
                .save_with_format(&png_path, ImageFormat::Png)
                .map_err(|e| ExportError::ImageExtractionFailed {
                    path: png_path.clone(),
                    detail: e.to_string(),
                })?;
            debug!(
                "PDF page {} → {} ({}x{})",
                page_idx + 1,
                name,
                image.width(),
                image.height()
            );

            names.push(name);
        }
    }

    Ok(names)
}

/// PNG stores gray and RGB with or without alpha; anything else
/// (CMYK-derived, float) is converted to RGBA8.
fn png_compatible(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => img,
        other => DynamicImage::ImageRgba8(other.to_rgba8()),
    }
}
