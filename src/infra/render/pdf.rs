//! Minimal PDF writer for todo reports.
//!
//! Produces a PDF 1.4 file with one Helvetica font, one content stream per
//! page and an exact cross-reference table. Layout: teal title, owner
//! details, a grey DRAFT watermark and a three-column table.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::core::error::RenderError;
use crate::core::job::ReportRenderer;
use crate::core::model::{Todo, UserId};

/// Table rows per page.
pub const ROWS_PER_PAGE: usize = 30;

const FIRST_ROW_Y: usize = 650;
const ROW_HEIGHT: usize = 20;

// Fixed object numbers; page objects follow in pairs (page, contents).
const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT: usize = 3;
const INFO: usize = 4;
const FIRST_PAGE: usize = 5;

/// Escape the PDF string delimiters.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\r' | '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

fn text(out: &mut String, size: u8, x: usize, y: usize, body: &str) {
    let _ = writeln!(out, "BT /F1 {size} Tf 0 0 0 rg {x} {y} Td ({}) Tj ET", escape(body));
}

fn page_content(display_name: &str, contact: &str, rows: &[Todo]) -> String {
    let mut out = String::new();
    out.push_str("BT /F1 16 Tf 0.0 0.5 0.5 rg 100 750 Td (ToDo List) Tj ET\n");
    text(&mut out, 12, 100, 720, &format!("User: {display_name}"));
    text(&mut out, 12, 100, 700, &format!("Email: {contact}"));
    out.push_str("q 0.9 g BT /F1 40 Tf 0.2 Tc 200 400 Td (DRAFT) Tj ET Q\n");
    text(&mut out, 12, 100, 670, "ID");
    text(&mut out, 12, 200, 670, "Task");
    text(&mut out, 12, 400, 670, "Description");
    out.push_str("100 665 m 500 665 l S\n");

    let mut y = FIRST_ROW_Y;
    for todo in rows {
        text(&mut out, 12, 100, y, &todo.id.to_string());
        text(&mut out, 12, 200, y, &todo.title);
        text(&mut out, 12, 400, y, &todo.description);
        y -= ROW_HEIGHT;
    }
    out
}

/// Accumulates objects while recording their byte offsets.
struct Writer {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl Writer {
    fn new(object_count: usize) -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(b"%PDF-1.4\n");
        Self {
            buf,
            offsets: vec![0; object_count + 1],
        }
    }

    fn object(&mut self, number: usize, body: &str) {
        self.offsets[number] = self.buf.len();
        self.buf
            .extend_from_slice(format!("{number} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let size = self.offsets.len();
        let mut tail = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets[1..] {
            let _ = write!(tail, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            tail,
            "trailer\n<< /Size {size} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        );
        self.buf.extend_from_slice(tail.as_bytes());
        self.buf
    }
}

/// Render a todo report to PDF bytes.
///
/// An empty `records` slice still yields one page with headers only.
#[must_use]
pub fn render_document(owner: UserId, display_name: &str, contact: &str, records: &[Todo]) -> Vec<u8> {
    let chunks: Vec<&[Todo]> = if records.is_empty() {
        vec![records]
    } else {
        records.chunks(ROWS_PER_PAGE).collect()
    };
    let page_count = chunks.len();
    let mut pdf = Writer::new(FIRST_PAGE - 1 + 2 * page_count);

    pdf.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));

    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", FIRST_PAGE + 2 * i))
        .collect();
    pdf.object(
        PAGES,
        &format!("<< /Type /Pages /Kids [{}] /Count {page_count} >>", kids.join(" ")),
    );
    pdf.object(FONT, "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");
    pdf.object(
        INFO,
        &format!("<< /Title ({}) /Producer (todo-taskq) >>", escape(&format!("ToDo List - user {owner}"))),
    );

    for (i, rows) in chunks.iter().enumerate() {
        let page = FIRST_PAGE + 2 * i;
        let contents = page + 1;
        pdf.object(
            page,
            &format!(
                "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 612 792] /Contents {contents} 0 R /Resources << /Font << /F1 {FONT} 0 R >> >> >>"
            ),
        );
        let stream = page_content(display_name, contact, rows);
        pdf.object(
            contents,
            &format!("<< /Length {} >>\nstream\n{stream}endstream", stream.len()),
        );
    }

    pdf.finish()
}

/// Writes reports as `<owner>_<random>.pdf` under one directory.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    output_dir: PathBuf,
}

impl PdfRenderer {
    /// Render into `output_dir`, created on first use.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory reports are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ReportRenderer for PdfRenderer {
    fn render(
        &self,
        owner: UserId,
        display_name: &str,
        contact: &str,
        records: &[Todo],
    ) -> Result<PathBuf, RenderError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(format!("{owner}_{}.pdf", Uuid::new_v4().simple()));
        fs::write(&path, render_document(owner, display_name, contact, records))?;
        info!(user_id = owner, path = %path.display(), rows = records.len(), "report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Todo> {
        (1..=n)
            .map(|i| {
                let mut t = Todo::new(format!("task {i}"), "desc");
                t.id = i64::try_from(i).unwrap();
                t
            })
            .collect()
    }

    /// Check every xref entry points at the matching `N 0 obj` header.
    fn assert_xref_consistent(pdf: &[u8]) {
        let text = String::from_utf8_lossy(pdf);
        let xref_at: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[xref_at..].starts_with("xref\n"));

        let entries: Vec<&str> = text[xref_at..].lines().skip(3).take_while(|l| l.ends_with(" n ")).collect();
        assert!(!entries.is_empty());
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", i + 1);
            assert!(text[offset..].starts_with(&expected), "object {} misplaced", i + 1);
        }
    }

    #[test]
    fn test_single_page_layout() {
        let pdf = render_document(1, "Jane (admin)", "jane@example.com", &rows(3));
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(ToDo List)"));
        assert!(text.contains("(User: Jane \\(admin\\))"));
        assert!(text.contains("(DRAFT)"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("100 610 Td (3)"));
        assert_xref_consistent(&pdf);
    }

    #[test]
    fn test_paginates_long_reports() {
        let pdf = render_document(1, "Jane", "jane@example.com", &rows(ROWS_PER_PAGE + 1));
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("/Count 2"));
        assert_eq!(text.matches("/Type /Page ").count(), 2);
        assert_xref_consistent(&pdf);
    }

    #[test]
    fn test_empty_report_has_one_page() {
        let pdf = render_document(1, "Jane", "", &[]);
        assert!(String::from_utf8_lossy(&pdf).contains("/Count 1"));
        assert_xref_consistent(&pdf);
    }

    #[test]
    fn test_renderer_prefixes_owner() {
        let dir = std::env::temp_dir().join(format!("taskq-render-{}", Uuid::new_v4().simple()));
        let renderer = PdfRenderer::new(&dir);
        let path = renderer.render(42, "Jane", "jane@example.com", &rows(2)).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("42_"));
        assert!(name.ends_with(".pdf"));
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF-1.4"));
        fs::remove_dir_all(dir).unwrap();
    }
}
