//! PDF text extraction backed by `lopdf`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lopdf::Document;

use super::{Extraction, ExtractionError, PdfExtractor, PAGE_SEPARATOR};

/// Pure-Rust extractor. Parsing runs on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text synchronously.
    pub fn extract_blocking(path: &Path) -> Result<Extraction, ExtractionError> {
        let doc = Document::load(path).map_err(|e| ExtractionError::Load(e.to_string()))?;

        let pages = doc.get_pages();
        let mut text = String::new();
        for page_num in pages.keys() {
            let page_text =
                doc.extract_text(&[*page_num])
                    .map_err(|e| ExtractionError::Page {
                        page: *page_num,
                        message: e.to_string(),
                    })?;
            text.push_str(&page_text);
            text.push_str(PAGE_SEPARATOR);
        }

        Ok(Extraction {
            text,
            page_count: pages.len() as u32,
        })
    }
}

#[async_trait]
impl PdfExtractor for LopdfExtractor {
    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractionError> {
        let path: PathBuf = path.to_path_buf();
        let extraction = tokio::task::spawn_blocking(move || Self::extract_blocking(&path))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))??;

        tracing::debug!(
            "Extracted {} chars from {} pages",
            extraction.text.len(),
            extraction.page_count
        );
        Ok(extraction)
    }
}

/// Build small PDFs for tests.
#[cfg(test)]
pub(crate) mod test_pdf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};

    /// A PDF with one page per entry; `None` produces a page without text.
    pub fn build(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };

        let contents = pages
            .iter()
            .map(|page| match page {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            })
            .collect();
        finish(doc, resources, contents)
    }

    /// A PDF whose pages only paint an image, like a scanned book.
    pub fn build_scanned(page_count: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0x00, 0x80, 0x80, 0xff],
        ));
        let resources = dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        };

        let contents = (0..page_count)
            .map(|_| {
                vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![612.into(), 0.into(), 0.into(), 792.into(), 0.into(), 0.into()],
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                    Operation::new("Q", vec![]),
                ]
            })
            .collect();
        finish(doc, resources, contents)
    }

    fn finish(mut doc: Document, resources: Dictionary, contents: Vec<Vec<Operation>>) -> Vec<u8> {
        let pages_id = doc.new_object_id();
        let resources_id = doc.add_object(resources);

        let mut kids: Vec<Object> = Vec::new();
        for operations in contents {
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[tokio::test]
    async fn test_extracts_pages_in_order() {
        let pdf = test_pdf::build(&[Some("Hello first page"), Some("Goodbye second page")]);
        let file = write_temp(&pdf);

        let extraction = LopdfExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(extraction.page_count, 2);

        let first = extraction.text.find("Hello").unwrap();
        let second = extraction.text.find("Goodbye").unwrap();
        assert!(first < second);
        assert!(extraction.text.ends_with(PAGE_SEPARATOR));
    }

    #[tokio::test]
    async fn test_pages_without_text_are_blank() {
        let pdf = test_pdf::build(&[None, None, None]);
        let file = write_temp(&pdf);

        let extraction = LopdfExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(extraction.page_count, 3);
        assert!(extraction.is_blank());
    }

    #[tokio::test]
    async fn test_image_only_pages_are_blank() {
        let pdf = test_pdf::build_scanned(4);
        let file = write_temp(&pdf);

        let extraction = LopdfExtractor::new().extract(file.path()).await.unwrap();
        assert_eq!(extraction.page_count, 4);
        assert!(extraction.is_blank());
    }

    #[tokio::test]
    async fn test_garbage_is_a_load_error() {
        let file = write_temp(b"this is not a pdf");

        let err = LopdfExtractor::new().extract(file.path()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Load(_)));
    }
}
