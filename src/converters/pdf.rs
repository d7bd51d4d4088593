// src/converters/pdf.rs
use crate::utils::error::ConvertError;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::Browser;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

const LETTER_WIDTH_IN: f64 = 8.5;
const LETTER_HEIGHT_IN: f64 = 11.0;
const MM_PER_INCH: f64 = 25.4;

/// Letter paper, backgrounds on, 12mm top/bottom and 10mm side margins.
pub fn letter_print_options() -> PrintToPdfOptions {
    PrintToPdfOptions {
        print_background: Some(true),
        paper_width: Some(LETTER_WIDTH_IN),
        paper_height: Some(LETTER_HEIGHT_IN),
        margin_top: Some(12.0 / MM_PER_INCH),
        margin_bottom: Some(12.0 / MM_PER_INCH),
        margin_left: Some(10.0 / MM_PER_INCH),
        margin_right: Some(10.0 / MM_PER_INCH),
        ..Default::default()
    }
}

/// Renders a local HTML file to PDF with headless Chromium.
/// Blocking; call it from `spawn_blocking` inside async code.
pub fn html_to_pdf(html_path: &Path, pdf_path: &Path) -> Result<PathBuf, ConvertError> {
    let html_path = fs::canonicalize(html_path)?;
    if let Some(parent) = pdf_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let page_url = Url::from_file_path(&html_path)
        .map_err(|_| ConvertError::Pdf(format!("cannot build file URL for {}", html_path.display())))?;

    tracing::debug!("Launching headless browser for {}", page_url);
    let browser = Browser::default().map_err(|e| ConvertError::Pdf(format!("browser launch: {}", e)))?;
    let tab = browser
        .new_tab()
        .map_err(|e| ConvertError::Pdf(format!("new tab: {}", e)))?;

    tab.navigate_to(page_url.as_str())
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| ConvertError::Pdf(format!("loading {}: {}", page_url, e)))?;

    let pdf = tab
        .print_to_pdf(Some(letter_print_options()))
        .map_err(|e| ConvertError::Pdf(format!("printing {}: {}", page_url, e)))?;

    fs::write(pdf_path, &pdf)?;
    tracing::info!("Rendered {} bytes of PDF to {}", pdf.len(), pdf_path.display());
    Ok(pdf_path.to_path_buf())
}

/// Runs [`html_to_pdf`] on tokio's blocking pool.
pub async fn render_pdf(html_path: PathBuf, pdf_path: PathBuf) -> Result<PathBuf, ConvertError> {
    tokio::task::spawn_blocking(move || html_to_pdf(&html_path, &pdf_path)).await?
}
