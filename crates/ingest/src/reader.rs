use lopdf::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("PDF file not found at '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load PDF '{}': {message}", path.display())]
    Load { path: PathBuf, message: String },

    #[error("no text could be extracted from '{}'; it might be image-based", .0.display())]
    NoText(PathBuf),
}

/// Text pulled out of a document, pages joined by newlines.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
    pub pages_with_text: usize,
}

pub struct PdfReader;

impl PdfReader {
    pub async fn read_pdf(path: &Path) -> Result<ExtractedText, ReadError> {
        if !path.exists() {
            return Err(ReadError::NotFound(path.to_path_buf()));
        }

        info!(path = %path.display(), "Reading text from PDF");

        let bytes = fs::read(path).await.map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extracted = Self::extract_from_bytes(&bytes).map_err(|err| match err {
            PageTextError::Load(message) => ReadError::Load {
                path: path.to_path_buf(),
                message,
            },
            PageTextError::Empty => ReadError::NoText(path.to_path_buf()),
        })?;

        info!(
            chars = extracted.text.len(),
            pages = extracted.pages_with_text,
            "Extracted text from PDF"
        );

        Ok(extracted)
    }

    fn extract_from_bytes(bytes: &[u8]) -> Result<ExtractedText, PageTextError> {
        let doc = Document::load_mem(bytes).map_err(|e| PageTextError::Load(e.to_string()))?;

        let pages = doc.get_pages();
        let page_count = pages.len();
        let mut text_parts = Vec::with_capacity(page_count);

        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) if !text.trim().is_empty() => text_parts.push(text),
                Ok(_) => {}
                Err(e) => warn!(page = page_num, error = %e, "Skipping page without extractable text"),
            }
        }

        if text_parts.is_empty() {
            return Err(PageTextError::Empty);
        }

        Ok(ExtractedText {
            pages_with_text: text_parts.len(),
            text: text_parts.join("\n"),
            page_count,
        })
    }
}

enum PageTextError {
    Load(String),
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    /// Build a PDF with one page per entry; `None` pages carry no text.
    fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let operations = match page {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![
                    Operation::new("m", vec![0.into(), 0.into()]),
                    Operation::new("l", vec![100.into(), 100.into()]),
                    Operation::new("S", vec![]),
                ],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = PdfReader::read_pdf(Path::new("definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReadError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"plain text, not a PDF").unwrap();

        let err = PdfReader::read_pdf(&path).await.unwrap_err();
        assert!(matches!(err, ReadError::Load { .. }));
    }

    #[tokio::test]
    async fn test_image_only_pdf_has_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, build_pdf(&[None, None])).unwrap();

        let err = PdfReader::read_pdf(&path).await.unwrap_err();
        assert!(matches!(err, ReadError::NoText(_)));
    }

    #[tokio::test]
    async fn test_reads_pages_with_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.pdf");
        std::fs::write(&path, build_pdf(&[Some("Noticee AAUFM6247N"), None])).unwrap();

        let extracted = PdfReader::read_pdf(&path).await.unwrap();
        assert_eq!(extracted.page_count, 2);
        assert_eq!(extracted.pages_with_text, 1);
        assert!(extracted.text.contains("AAUFM6247N"));
    }
}
