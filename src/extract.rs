//! Document text extraction for uploads, dispatched on the declared format
//! (file extension).

use tracing::debug;

use crate::error::ExtractionError;

pub trait TextExtractor: Send + Sync {
  fn extract(&self, bytes: &[u8], format: &str) -> Result<String, ExtractionError>;
}

/// Plain text, PDF and Word documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
  fn extract(&self, bytes: &[u8], format: &str) -> Result<String, ExtractionError> {
    let format = format.trim().trim_start_matches('.').to_lowercase();
    let text = match format.as_str() {
      "txt" | "text" | "md" => extract_plain(bytes),
      "pdf" => extract_pdf(bytes)?,
      "docx" | "doc" => extract_docx(bytes)?,
      other => return Err(ExtractionError::UnsupportedFormat(other.to_string())),
    };
    if text.trim().is_empty() {
      return Err(ExtractionError::Empty);
    }
    debug!(target: "mcq", %format, bytes = bytes.len(), chars = text.chars().count(), "document text extracted");
    Ok(text)
  }
}

/// Lowercased extension of an upload's file name ("" when there is none).
pub fn format_from_filename(name: &str) -> String {
  match name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
    _ => String::new(),
  }
}

/// UTF-8 first; anything else is read as Latin-1 so no byte is rejected.
fn extract_plain(bytes: &[u8]) -> String {
  match std::str::from_utf8(bytes) {
    Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
    Err(_) => bytes.iter().map(|&b| b as char).collect(),
  }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
  pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))
}

/// Paragraph texts joined by newlines. Tables, headers and footnotes are skipped.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
  use docx_rs::{DocumentChild, ParagraphChild, RunChild};

  let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
  let paragraphs: Vec<String> = docx
    .document
    .children
    .iter()
    .filter_map(|child| match child {
      DocumentChild::Paragraph(para) => Some(para),
      _ => None,
    })
    .map(|para| {
      para
        .children
        .iter()
        .filter_map(|pc| match pc {
          ParagraphChild::Run(run) => Some(run),
          _ => None,
        })
        .flat_map(|run| run.children.iter())
        .filter_map(|rc| match rc {
          RunChild::Text(t) => Some(t.text.as_str()),
          _ => None,
        })
        .collect::<String>()
    })
    .filter(|text| !text.is_empty())
    .collect();
  Ok(paragraphs.join("\n"))
}
