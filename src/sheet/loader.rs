use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::{
    config::{ColumnSettings, ColumnSpec, DataSettings},
    models::{CollectorRecord, Result, MISSING_VALUE},
    sheet::{CellValue, Workbook, Worksheet},
};

/// Anything that can hand the leaderboard a fresh set of collector rows.
pub trait RecordSource: Send + Sync {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    fn load_records(&self) -> Result<Vec<CollectorRecord>>;

    /// The unmapped sheet contents, as display strings.
    fn load_sheet(&self) -> Result<SheetView>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetView {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Column positions resolved against a sheet's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub rank: usize,
    pub profile_image: usize,
    pub collector_name: usize,
    pub nickname: usize,
    pub total_minifigs: usize,
    pub total_points: usize,
    pub special_title: usize,
}

impl ColumnMap {
    pub fn resolve(columns: &ColumnSettings, headers: &[String]) -> Self {
        let find = |spec: &ColumnSpec| {
            headers
                .iter()
                .position(|h| h == &spec.header)
                .unwrap_or(spec.fallback)
        };

        Self {
            rank: find(&columns.rank),
            profile_image: find(&columns.profile_image),
            collector_name: find(&columns.collector_name),
            nickname: find(&columns.nickname),
            total_minifigs: find(&columns.total_minifigs),
            total_points: find(&columns.total_points),
            special_title: find(&columns.special_title),
        }
    }
}

/// Reads collector rows from the active sheet of an xlsx workbook.
///
/// The file is re-read on every call, so edits to the workbook show up on
/// the next load without a restart.
#[derive(Debug, Clone)]
pub struct WorkbookLoader {
    path: PathBuf,
    columns: ColumnSettings,
}

impl WorkbookLoader {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnSettings) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    pub fn from_settings(settings: &DataSettings) -> Self {
        Self::new(settings.workbook_path.clone(), settings.columns.clone())
    }

    fn read_sheet(&self) -> Result<Option<Worksheet>> {
        if !self.path.exists() {
            warn!("Workbook {} not found, serving an empty leaderboard", self.path.display());
            return Ok(None);
        }
        let mut workbook = Workbook::open(&self.path)?;
        Ok(Some(workbook.active_sheet()?))
    }
}

fn header_names(sheet: &Worksheet) -> Vec<String> {
    sheet
        .rows()
        .first()
        .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default()
}

fn display_or_placeholder(cell: &CellValue) -> String {
    cell.display().unwrap_or_else(|| MISSING_VALUE.to_string())
}

fn metric(cell: &CellValue, column: &str, row: usize) -> i64 {
    match cell.as_integer() {
        Some(value) => value,
        None => {
            if !cell.is_empty() {
                debug!("Row {}: {} value '{}' is not an integer, using 0", row + 1, column, cell);
            }
            0
        }
    }
}

/// Maps every non-blank data row (row 2 onward) to a record.
pub fn records_from_sheet(sheet: &Worksheet, columns: &ColumnSettings) -> Vec<CollectorRecord> {
    let map = ColumnMap::resolve(columns, &header_names(sheet));

    sheet
        .rows()
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| !row.iter().all(CellValue::is_empty))
        .map(|(i, _)| CollectorRecord {
            rank: display_or_placeholder(sheet.cell(i, map.rank)),
            profile_image: display_or_placeholder(sheet.cell(i, map.profile_image)),
            collector_name: display_or_placeholder(sheet.cell(i, map.collector_name)),
            nickname: display_or_placeholder(sheet.cell(i, map.nickname)),
            total_minifigs: metric(sheet.cell(i, map.total_minifigs), &columns.total_minifigs.header, i),
            total_points: metric(sheet.cell(i, map.total_points), &columns.total_points.header, i),
            special_title: display_or_placeholder(sheet.cell(i, map.special_title)),
        })
        .collect()
}

impl RecordSource for WorkbookLoader {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_records(&self) -> Result<Vec<CollectorRecord>> {
        let Some(sheet) = self.read_sheet()? else {
            return Ok(Vec::new());
        };
        let records = records_from_sheet(&sheet, &self.columns);
        info!("Loaded {} collectors from sheet '{}'", records.len(), sheet.name);
        Ok(records)
    }

    fn load_sheet(&self) -> Result<SheetView> {
        let Some(sheet) = self.read_sheet()? else {
            return Ok(SheetView::default());
        };

        let width = sheet.width();
        let mut rows = sheet
            .rows()
            .iter()
            .map(|row| {
                (0..width)
                    .map(|c| row.get(c).map(|cell| cell.to_string()).unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()));

        let header = rows.next().unwrap_or_default();
        Ok(SheetView {
            name: sheet.name.clone(),
            header,
            rows: rows.collect(),
        })
    }
}
