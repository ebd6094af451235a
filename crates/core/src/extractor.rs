use crate::error::IngestError;
use crate::models::UploadedPdf;
use lopdf::Document;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor: Send + Sync {
    fn extract_pages(&self, pdf: &UploadedPdf) -> Result<Vec<PageText>, IngestError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, pdf: &UploadedPdf) -> Result<Vec<PageText>, IngestError> {
        let document = Document::load_mem(&pdf.bytes).map_err(|error| {
            IngestError::PdfParse(format!("{}: {error}", pdf.file_name))
        })?;

        // get_pages is a BTreeMap, so pages come out in page-number order.
        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document.extract_text(&[page_no]).map_err(|error| {
                IngestError::PdfParse(format!("{} page {page_no}: {error}", pdf.file_name))
            })?;

            pages.push(PageText {
                number: page_no,
                text,
            });
        }

        debug!(file = %pdf.file_name, pages = pages.len(), "extracted pdf pages");
        Ok(pages)
    }
}

/// Concatenates the text of every page of every file, in upload order and
/// page order. Any failing page fails the whole set.
pub fn extract_raw_text(
    extractor: &dyn PdfExtractor,
    files: &[UploadedPdf],
) -> Result<String, IngestError> {
    let mut text = String::new();
    for file in files {
        for page in extractor.extract_pages(file)? {
            text.push_str(&page.text);
        }
    }
    Ok(text)
}

/// Builds a minimal PDF with one line of Courier text per page.
#[cfg(test)]
pub(crate) fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let stream = Stream::new(dictionary! {}, content.encode().unwrap());
        let content_id = document.add_object(stream);
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).unwrap();
    bytes
}
