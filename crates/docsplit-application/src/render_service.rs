//! Placeholder renderer that produces a one-page PDF naming the document.

use async_trait::async_trait;

use docsplit_core::Result;
use docsplit_core::render::{RenderService, RenderedDocument};
use docsplit_core::split::Document;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Renders every document as a single PDF page showing its filename.
///
/// Page images are not composed into the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderService;

impl PlaceholderRenderService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RenderService for PlaceholderRenderService {
    async fn render_document(&self, document: &Document) -> Result<RenderedDocument> {
        Ok(RenderedDocument {
            filename: document.filename.clone(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            data: placeholder_pdf(&document.filename),
        })
    }
}

/// Builds a minimal PDF 1.4 file with `text` on its only page.
fn placeholder_pdf(text: &str) -> Vec<u8> {
    let stream = format!("BT\n/F1 24 Tf\n100 700 Td\n({}) Tj\nET", escape_pdf_string(text));
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> >> >> \
         /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF",
        objects.len() + 1,
        xref_offset
    ));
    out.into_bytes()
}

fn escape_pdf_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_has_header_and_trailer() {
        let pdf = String::from_utf8(placeholder_pdf("w2.pdf")).unwrap();
        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.ends_with("%%EOF"));
        assert!(pdf.contains("(w2.pdf) Tj"));
    }

    #[test]
    fn test_xref_points_at_objects() {
        let pdf = String::from_utf8(placeholder_pdf("a.pdf")).unwrap();
        let startxref: usize = pdf
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(pdf[startxref..].starts_with("xref\n0 5\n"));

        let first_entry = pdf[startxref..].lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(pdf[offset..].starts_with("1 0 obj"));
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string(r"a(b)\c"), r"a\(b\)\\c");
        assert_eq!(escape_pdf_string("naïve"), "na?ve");
    }
}
