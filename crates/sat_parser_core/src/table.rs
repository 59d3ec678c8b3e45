/// Number of data rows shown in a result preview.
pub const PREVIEW_ROW_LIMIT: usize = 10;

/// Tabular output of a completed job: a header row followed by data rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Splits raw rows into header and data. An empty input yields an empty table.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let header = rows.remove(0);
        Self { header, rows }
    }

    /// Number of data rows, excluding the header.
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    /// Header first, then data rows.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut all = Vec::with_capacity(self.rows.len() + 1);
        all.push(self.header.clone());
        all.extend(self.rows.iter().cloned());
        all
    }

    pub fn preview(&self) -> TablePreview {
        let shown = self.rows.len().min(PREVIEW_ROW_LIMIT);
        let note = (self.rows.len() > PREVIEW_ROW_LIMIT).then(|| {
            format!(
                "Showing first {PREVIEW_ROW_LIMIT} rows of {} total records",
                self.rows.len()
            )
        });
        TablePreview {
            header: self.header.clone(),
            rows: self.rows[..shown].to_vec(),
            note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePreview {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub note: Option<String>,
}
