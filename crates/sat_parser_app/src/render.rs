use sat_parser_core::{AppViewModel, JobRowView, JobStatus, ResultRowView, TablePreview};
use sat_parser_engine::{sample_table, SCHEMA};

const BAR_WIDTH: usize = 20;

/// Terminal lines for the intake, processing, and results sections.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(error) = &view.intake_error {
        lines.push(format!("! {error}"));
    }
    if !view.staged.is_empty() {
        lines.push(format!("Selected Files ({})", view.staged.len()));
        for row in &view.staged {
            lines.push(format!("  {} ({})", row.name, row.size_label));
        }
    }

    lines.push(format!(
        "Processing ({}) | Results ({})",
        view.processing_count, view.results_count
    ));
    for row in &view.processing {
        lines.push(job_line(row));
    }
    for row in &view.results {
        lines.push(result_line(row));
        if let Some(preview) = &row.preview {
            lines.extend(preview_lines(preview).into_iter().map(|l| format!("    {l}")));
        }
    }
    lines
}

fn job_line(row: &JobRowView) -> String {
    let marker = match row.status {
        JobStatus::Error => 'x',
        _ => '~',
    };
    format!(
        "{marker} {} [{}] {:>3}% {}: {}",
        row.name,
        progress_bar(row.percent),
        row.percent,
        row.status.label(),
        row.status_text
    )
}

fn result_line(row: &ResultRowView) -> String {
    format!(
        "✓ {} ({} records, processed {})",
        row.name,
        row.record_count,
        row.submitted_at.format("%Y-%m-%d %H:%M:%S")
    )
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Left-aligned columns sized to the widest cell.
pub fn table_lines(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let format_row = |row: &[String]| {
        let cells: Vec<String> = (0..columns)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}", width = widths[i])
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    };

    let mut lines = vec![format_row(header)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines
}

fn preview_lines(preview: &TablePreview) -> Vec<String> {
    let mut lines = table_lines(&preview.header, &preview.rows);
    if let Some(note) = &preview.note {
        lines.push(note.clone());
    }
    lines
}

pub fn render_schema() -> Vec<String> {
    let mut lines = vec!["SAT Questions Database Schema".to_string()];
    let header = ["Column Name", "Data Type", "Required", "Description"]
        .map(String::from)
        .to_vec();
    let rows: Vec<Vec<String>> = SCHEMA
        .iter()
        .map(|col| {
            vec![
                col.name.to_string(),
                col.sql_type.to_string(),
                if col.required { "Required" } else { "Optional" }.to_string(),
                col.description.to_string(),
            ]
        })
        .collect();
    lines.extend(table_lines(&header, &rows));

    lines.push(String::new());
    lines.push("Sample CSV Output".to_string());
    let sample = sample_table();
    if let Some((header, rows)) = sample.split_first() {
        lines.extend(table_lines(header, rows));
    }
    lines
}
