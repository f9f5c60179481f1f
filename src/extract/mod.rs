// src/extract/mod.rs

//! Plain-text extraction for uploaded study material.
//!
//! Dispatch is a closed enumeration over the lowercase file extension; the
//! `Other` variant decodes raw bytes lossily instead of failing.

mod pdf;
mod slides;
mod tabular;

use std::fmt;

use serde::Serialize;

/// Text returned for image uploads. No visual analysis is performed.
pub const IMAGE_PLACEHOLDER: &str = "[Imagen cargada: el análisis visual no está habilitado aquí.]";

/// Text returned for PDF uploads when the crate is built without the `pdf` feature.
pub const PDF_PLACEHOLDER: &str =
    "[PDF cargado: la extracción de texto PDF no está disponible en esta versión.]";

/// The format family of an uploaded file, decided from its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    SlideDeck,
    Csv,
    Spreadsheet,
    PlainText,
    Image,
    Pdf,
    Other,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Self {
        let name = file_name.to_lowercase();
        let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

        match extension {
            "pptx" => Self::SlideDeck,
            "csv" => Self::Csv,
            "xlsx" => Self::Spreadsheet,
            "txt" => Self::PlainText,
            "jpg" | "jpeg" | "png" => Self::Image,
            "pdf" => Self::Pdf,
            _ => Self::Other,
        }
    }
}

/// Failure to parse an uploaded file. Aborts the upload it belongs to.
#[derive(Debug)]
pub enum ExtractError {
    /// The OOXML zip container could not be opened or read.
    Archive(String),
    /// A slide part was not well-formed XML.
    Xml(String),
    Csv(csv::Error),
    Spreadsheet(String),
    /// A `.txt` upload was not valid UTF-8.
    Encoding(std::string::FromUtf8Error),
    Pdf(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Archive(msg) => write!(f, "invalid slide-deck container: {msg}"),
            ExtractError::Xml(msg) => write!(f, "malformed slide XML: {msg}"),
            ExtractError::Csv(err) => write!(f, "invalid CSV: {err}"),
            ExtractError::Spreadsheet(msg) => write!(f, "invalid spreadsheet: {msg}"),
            ExtractError::Encoding(err) => write!(f, "text file is not valid UTF-8: {err}"),
            ExtractError::Pdf(msg) => write!(f, "unreadable PDF: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Csv(err) => Some(err),
            ExtractError::Encoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<csv::Error> for ExtractError {
    fn from(err: csv::Error) -> Self {
        ExtractError::Csv(err)
    }
}

impl From<std::string::FromUtf8Error> for ExtractError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ExtractError::Encoding(err)
    }
}

/// Extracts the plain text of one uploaded file, trimmed of surrounding whitespace.
pub fn extract(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let text = match DocumentKind::from_file_name(file_name) {
        DocumentKind::SlideDeck => slides::extract_pptx(bytes)?,
        DocumentKind::Csv => tabular::extract_csv(bytes)?,
        DocumentKind::Spreadsheet => tabular::extract_xlsx(bytes)?,
        DocumentKind::PlainText => {
            let decoded = String::from_utf8(bytes.to_vec())?;
            decoded.lines().collect::<Vec<_>>().join(" ")
        }
        DocumentKind::Image => IMAGE_PLACEHOLDER.to_string(),
        DocumentKind::Pdf => pdf::extract_pdf(bytes)?,
        DocumentKind::Other => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(text.trim().to_string())
}
