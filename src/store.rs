//! Fetch, partial-update and append of auction items against a sheet backend.

use crate::cell::CellValue;
use crate::error::{BackendError, Result, StoreError};
use crate::layout::{self, CellWrite, FIRST_DATA_ROW};
use crate::record::{AuctionItem, NewItem, UpdatePayload};
use log::{debug, info, warn};
use std::future::Future;
use std::ops::Range;

/// Raw cell access to the single worksheet holding the items.
///
/// Row indices are 0-based here (row 0 is the header), the way the sheet
/// grid is addressed; item ids are the 1-based row numbers.
pub trait SheetBackend: Send + Sync {
    /// Reads columns A..=V of `rows`, clipped to the sheet's extent.
    /// Trailing empty rows may be omitted from the result.
    fn read_rows(
        &self,
        rows: Range<u32>,
    ) -> impl Future<Output = std::result::Result<Vec<Vec<CellValue>>, BackendError>> + Send;

    fn write_cells(
        &self,
        writes: &[CellWrite],
    ) -> impl Future<Output = std::result::Result<(), BackendError>> + Send;

    /// Appends `row` after the last non-empty row.
    fn append_row(
        &self,
        row: &[CellValue],
    ) -> impl Future<Output = std::result::Result<(), BackendError>> + Send;
}

pub struct ItemStore<B> {
    backend: Option<B>,
    max_rows: u32,
}

impl<B: SheetBackend> ItemStore<B> {
    /// `max_rows` caps how many data rows a fetch loads.
    pub fn new(backend: B, max_rows: u32) -> Self {
        ItemStore {
            backend: Some(backend),
            max_rows,
        }
    }

    /// A store with no backend; every operation fails with `NotConfigured`.
    pub fn unconfigured() -> Self {
        ItemStore {
            backend: None,
            max_rows: 0,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn ensure_configured(&self) -> Result<()> {
        self.backend().map(|_| ())
    }

    fn backend(&self) -> Result<&B> {
        self.backend.as_ref().ok_or(StoreError::NotConfigured)
    }

    /// All non-gap rows in sheet order.
    pub async fn fetch_all(&self) -> Result<Vec<AuctionItem>> {
        let backend = self.backend()?;
        let rows = backend.read_rows(0..self.max_rows.saturating_add(1)).await?;

        let items: Vec<AuctionItem> = rows
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, row)| layout::row_to_item(row, index as u32 + 1))
            .collect();

        info!(
            "[store] loaded {} items from {} rows",
            items.len(),
            rows.len().saturating_sub(1)
        );
        Ok(items)
    }

    /// Writes the fields present in `payload` to row `row_id`.
    pub async fn update(&self, row_id: &str, payload: &UpdatePayload) -> Result<()> {
        let backend = self.backend()?;
        let row_number = parse_row_id(row_id)?;

        // Only the target row is loaded.
        let index = row_number - 1;
        let window = backend.read_rows(index..index + 1).await?;
        if window.first().and_then(|r| layout::row_to_item(r, row_number)).is_none() {
            warn!("[store] row {} has no product URL; updating anyway", row_number);
        }

        let writes = layout::apply_payload(row_number, payload);
        if writes.is_empty() {
            debug!("[store] empty update for row {}", row_number);
            return Ok(());
        }
        backend.write_cells(&writes).await?;

        info!("[store] updated {} cells in row {}", writes.len(), row_number);
        Ok(())
    }

    /// Appends a new row. Its id is whatever row number the sheet assigns.
    pub async fn append(&self, item: &NewItem) -> Result<()> {
        let backend = self.backend()?;
        let row = layout::item_to_row(item);
        backend.append_row(&row).await?;

        info!("[store] appended {}", item.product_url);
        Ok(())
    }
}

/// Parses an item id into a sheet row number. The header row and anything
/// non-numeric are rejected.
pub fn parse_row_id(row_id: &str) -> Result<u32> {
    match row_id.trim().parse::<u32>() {
        Ok(n) if n >= FIRST_DATA_ROW => Ok(n),
        _ => Err(StoreError::InvalidIdentifier(row_id.to_string())),
    }
}
