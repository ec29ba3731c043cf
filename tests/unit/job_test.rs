//! Tests for job processing through the public collaborator seams

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use todo_taskq::core::{
    JobError, Process, PushChannel, PushError, RenderError, ReportJob, ReportRenderer, Todo, UserId,
};

struct FailingRenderer;

impl ReportRenderer for FailingRenderer {
    fn render(&self, _: UserId, _: &str, _: &str, _: &[Todo]) -> Result<PathBuf, RenderError> {
        Err(RenderError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        )))
    }
}

/// Captures the rows it was asked to render.
#[derive(Default)]
struct CapturingRenderer {
    rows: Mutex<Vec<Todo>>,
}

impl ReportRenderer for CapturingRenderer {
    fn render(&self, owner: UserId, _: &str, _: &str, records: &[Todo]) -> Result<PathBuf, RenderError> {
        self.rows.lock().extend_from_slice(records);
        Ok(PathBuf::from(format!("/reports/{owner}_x.pdf")))
    }
}

#[derive(Default)]
struct CountingPush {
    sent: Mutex<Vec<String>>,
}

impl PushChannel for CountingPush {
    fn send(&self, message: &[u8]) -> Result<(), PushError> {
        self.sent.lock().push(String::from_utf8_lossy(message).into_owned());
        Ok(())
    }
}

fn two_records() -> Vec<Todo> {
    vec![Todo::new("first", "a"), Todo::new("second", "b")]
}

#[test]
fn test_report_render_failure_pushes_nothing() {
    let push = Arc::new(CountingPush::default());
    let job = ReportJob::new(1, "Jane", "jane@example.com", two_records(), Arc::new(FailingRenderer), push.clone());

    let err = job.process().unwrap_err();
    assert!(matches!(err, JobError::Render(_)));
    assert!(push.sent.lock().is_empty());
}

#[test]
fn test_report_uses_snapshot_and_pushes_once() {
    let renderer = Arc::new(CapturingRenderer::default());
    let push = Arc::new(CountingPush::default());
    let mut records = two_records();
    let job = ReportJob::new(9, "Jane", "jane@example.com", records.clone(), renderer.clone(), push.clone());

    // Later changes to the caller's copy do not reach the job.
    records.push(Todo::new("third", "c"));
    job.process().unwrap();

    assert_eq!(renderer.rows.lock().len(), 2);
    assert_eq!(
        *push.sent.lock(),
        vec!["PDF generation complete. Download from: /download/9_x.pdf".to_string()]
    );
}
