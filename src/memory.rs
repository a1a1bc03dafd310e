//! In-process sheet used by the tests and the offline demo.

use crate::cell::CellValue;
use crate::error::BackendError;
use crate::layout::{COLUMN_COUNT, CellWrite};
use crate::store::SheetBackend;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    rows: Mutex<Vec<Vec<CellValue>>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

/// A grid of cells behind a shared handle; clones see the same sheet.
#[derive(Clone, Default)]
pub struct MemorySheet {
    inner: Arc<Inner>,
}

impl MemorySheet {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        let sheet = MemorySheet::default();
        *sheet.inner.rows.lock().unwrap() = rows;
        sheet
    }

    /// A sheet holding just a header row.
    pub fn with_header() -> Self {
        let header = (1..=COLUMN_COUNT)
            .map(|c| CellValue::Text(crate::layout::col_to_letter(c)))
            .collect();
        MemorySheet::new(vec![header])
    }

    pub fn push_row(&self, row: Vec<CellValue>) {
        self.inner.rows.lock().unwrap().push(row);
    }

    /// Copy of the cells at 1-based `row_number`.
    pub fn row(&self, row_number: u32) -> Option<Vec<CellValue>> {
        let rows = self.inner.rows.lock().unwrap();
        rows.get((row_number as usize).checked_sub(1)?).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.inner.rows.lock().unwrap().len()
    }

    /// Makes every following call fail with `message` until cleared.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.inner.failure.lock().unwrap() = message.map(str::to_string);
    }

    /// Number of backend calls made so far.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), BackendError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        match self.inner.failure.lock().unwrap().as_ref() {
            Some(message) => Err(BackendError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl SheetBackend for MemorySheet {
    async fn read_rows(&self, rows: Range<u32>) -> Result<Vec<Vec<CellValue>>, BackendError> {
        self.enter()?;
        let grid = self.inner.rows.lock().unwrap();
        let end = (rows.end as usize).min(grid.len());
        let start = (rows.start as usize).min(end);
        Ok(grid[start..end].to_vec())
    }

    async fn write_cells(&self, writes: &[CellWrite]) -> Result<(), BackendError> {
        self.enter()?;
        let mut grid = self.inner.rows.lock().unwrap();
        for write in writes {
            let r = write.row as usize - 1;
            if grid.len() <= r {
                grid.resize(r + 1, Vec::new());
            }
            let row = &mut grid[r];
            let c = write.column.index();
            if row.len() <= c {
                row.resize(c + 1, CellValue::Empty);
            }
            row[c] = write.value.clone();
        }
        Ok(())
    }

    async fn append_row(&self, row: &[CellValue]) -> Result<(), BackendError> {
        self.enter()?;
        let mut grid = self.inner.rows.lock().unwrap();
        let next = grid
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_blank()))
            .map_or(0, |last| last + 1);
        if next < grid.len() {
            grid[next] = row.to_vec();
        } else {
            grid.push(row.to_vec());
        }
        Ok(())
    }
}
