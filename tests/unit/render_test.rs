//! Tests for the PDF report writer

use todo_taskq::core::Todo;
use todo_taskq::infra::render::{render_document, ROWS_PER_PAGE};

fn numbered(n: usize) -> Vec<Todo> {
    (1..=n)
        .map(|i| {
            let mut todo = Todo::new(format!("Title{i}"), format!("Description{i}"));
            todo.id = i64::try_from(i).unwrap();
            todo
        })
        .collect()
}

#[test]
fn test_document_lists_every_row() {
    let pdf = String::from_utf8(render_document(1, "John Doe", "john.doe@example.com", &numbered(4))).unwrap();
    for i in 1..=4 {
        assert!(pdf.contains(&format!("(Title{i})")));
        assert!(pdf.contains(&format!("(Description{i})")));
    }
    assert!(pdf.contains("(Email: john.doe@example.com)"));
}

#[test]
fn test_page_count_follows_row_count() {
    let pages = |rows: usize| {
        let pdf = String::from_utf8(render_document(1, "u", "e", &numbered(rows))).unwrap();
        pdf.matches("/Type /Page ").count()
    };
    assert_eq!(pages(ROWS_PER_PAGE), 1);
    assert_eq!(pages(ROWS_PER_PAGE * 2), 2);
    assert_eq!(pages(ROWS_PER_PAGE * 2 + 1), 3);
}

#[test]
fn test_startxref_points_at_xref_table() {
    let pdf = String::from_utf8(render_document(1, "u", "e", &numbered(2))).unwrap();
    let offset: usize = pdf
        .rsplit("startxref\n")
        .next()
        .and_then(|tail| tail.lines().next())
        .unwrap()
        .parse()
        .unwrap();
    assert!(pdf[offset..].starts_with("xref\n0 "));
}
