//! Render a sample todo report to disk.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use todo_taskq::core::{AppResult, ReportRenderer, Todo};
use todo_taskq::infra::PdfRenderer;
use todo_taskq::util::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "render-report", about = "Render a sample four-row todo report")]
struct Args {
    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Name printed on the report.
    #[arg(long, default_value = "John Doe")]
    user_name: String,

    /// Email printed on the report.
    #[arg(long, default_value = "john.doe@example.com")]
    email: String,
}

fn main() -> AppResult<()> {
    init_tracing();
    let args = Args::parse();

    let todos: Vec<Todo> = (1..=4)
        .map(|i| {
            let mut todo = Todo::new(format!("Title{i}"), format!("Description{i}"));
            todo.id = i;
            todo.user_id = 1;
            todo
        })
        .collect();

    let path = PdfRenderer::new(args.out_dir).render(1, &args.user_name, &args.email, &todos)?;
    info!(path = %path.display(), "PDF generated");
    println!("{}", path.display());
    Ok(())
}
