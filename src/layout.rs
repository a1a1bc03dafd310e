//! Fixed positional layout of the auction sheet and the conversions
//! between a row of cells and an [`AuctionItem`].
//!
//! Both directions go through [`Column`], so the read and write paths can
//! never disagree about where a field lives.

use crate::cell::{CellValue, read_price, to_bool, to_number, to_text};
use crate::record::{Assignee, AuctionItem, NewItem, UpdatePayload};
use chrono::Utc;

/// Columns A..=V.
pub const COLUMN_COUNT: usize = 22;

/// Row 1 holds the headers; data starts at row 2.
pub const FIRST_DATA_ROW: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    ProductUrl,
    BrandName,
    Check,
    BidTarget,
    Assignee,
    MarketPrice,
    BidPrice,
    WholesalePrice,
    ReferenceUrl1,
    ReferenceUrl2,
    ReferenceUrl3,
    ReferenceUrl4,
    ReferenceUrl5,
    Notes,
    RepresentativeCheck,
    JudgmentResult,
    Feedback,
    FeedbackConfirmed,
}

impl Column {
    /// 0-based position in the row.
    pub const fn index(self) -> usize {
        match self {
            Column::ProductUrl => 0,
            Column::BrandName => 3,
            Column::Check => 4,
            Column::BidTarget => 5,
            Column::Assignee => 6,
            Column::MarketPrice => 7,
            Column::BidPrice => 10,
            Column::WholesalePrice => 11,
            Column::ReferenceUrl1 => 12,
            Column::ReferenceUrl2 => 13,
            Column::ReferenceUrl3 => 14,
            Column::ReferenceUrl4 => 15,
            Column::ReferenceUrl5 => 16,
            Column::Notes => 17,
            Column::RepresentativeCheck => 18,
            Column::JudgmentResult => 19,
            Column::Feedback => 20,
            Column::FeedbackConfirmed => 21,
        }
    }

    pub fn letter(self) -> String {
        col_to_letter(self.index() + 1)
    }
}

/// 1-based column number to its A1 letters (1 → A, 27 → AA).
pub fn col_to_letter(col: usize) -> String {
    let mut col = col;
    let mut result = String::new();
    while col > 0 {
        col -= 1;
        result.push(((col % 26) as u8 + b'A') as char);
        col /= 26;
    }
    result.chars().rev().collect()
}

/// One cell assignment produced by a partial update.
#[derive(Clone, Debug, PartialEq)]
pub struct CellWrite {
    /// 1-based sheet row.
    pub row: u32,
    pub column: Column,
    pub value: CellValue,
}

impl CellWrite {
    /// A1 reference of the target cell, e.g. `E2`.
    pub fn a1(&self) -> String {
        format!("{}{}", self.column.letter(), self.row)
    }
}

fn cell_at(row: &[CellValue], column: Column) -> &CellValue {
    static EMPTY: CellValue = CellValue::Empty;
    row.get(column.index()).unwrap_or(&EMPTY)
}

/// Converts one sheet row into an item. Returns `None` for gap rows,
/// i.e. rows whose product URL is empty.
pub fn row_to_item(row: &[CellValue], row_number: u32) -> Option<AuctionItem> {
    let product_url = to_text(cell_at(row, Column::ProductUrl));
    if product_url.is_empty() {
        return None;
    }

    let text = |c| to_text(cell_at(row, c));
    let flag = |c| to_bool(cell_at(row, c));
    let now = Utc::now().to_rfc3339();

    Some(AuctionItem {
        id: row_number.to_string(),
        product_url,
        brand_name: text(Column::BrandName),
        check: flag(Column::Check),
        bid_target: flag(Column::BidTarget),
        assignee: Assignee::from(text(Column::Assignee)),
        market_price: to_number(cell_at(row, Column::MarketPrice)),
        bid_price: read_price(
            cell_at(row, Column::BidPrice),
            &format!("{}{}", Column::BidPrice.letter(), row_number),
        ),
        wholesale_price: read_price(
            cell_at(row, Column::WholesalePrice),
            &format!("{}{}", Column::WholesalePrice.letter(), row_number),
        ),
        reference_url1: text(Column::ReferenceUrl1),
        reference_url2: text(Column::ReferenceUrl2),
        reference_url3: text(Column::ReferenceUrl3),
        reference_url4: text(Column::ReferenceUrl4),
        reference_url5: text(Column::ReferenceUrl5),
        notes: text(Column::Notes),
        representative_check: flag(Column::RepresentativeCheck),
        judgment_result: flag(Column::JudgmentResult),
        feedback: text(Column::Feedback),
        feedback_confirmed: flag(Column::FeedbackConfirmed),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Builds a full-width row for appending. Unmapped columns are empty strings.
pub fn item_to_row(item: &NewItem) -> Vec<CellValue> {
    let mut row = vec![CellValue::Text(String::new()); COLUMN_COUNT];
    let mut put = |column: Column, value: CellValue| row[column.index()] = value;

    put(Column::ProductUrl, item.product_url.as_str().into());
    put(Column::BrandName, item.brand_name.as_str().into());
    put(Column::Check, item.check.into());
    put(Column::BidTarget, item.bid_target.into());
    put(Column::Assignee, item.assignee.label().into());
    put(Column::MarketPrice, item.market_price.into());
    put(Column::BidPrice, item.bid_price.into());
    put(Column::WholesalePrice, item.wholesale_price.into());
    put(Column::ReferenceUrl1, item.reference_url1.as_str().into());
    put(Column::ReferenceUrl2, item.reference_url2.as_str().into());
    put(Column::ReferenceUrl3, item.reference_url3.as_str().into());
    put(Column::ReferenceUrl4, item.reference_url4.as_str().into());
    put(Column::ReferenceUrl5, item.reference_url5.as_str().into());
    put(Column::Notes, item.notes.as_str().into());
    put(Column::RepresentativeCheck, item.representative_check.into());
    put(Column::JudgmentResult, item.judgment_result.into());
    put(Column::Feedback, item.feedback.as_str().into());
    put(Column::FeedbackConfirmed, item.feedback_confirmed.into());

    row
}

/// Translates a partial update into the cell writes for `row_number`.
/// Absent payload fields produce no write.
pub fn apply_payload(row_number: u32, payload: &UpdatePayload) -> Vec<CellWrite> {
    let mut writes = Vec::new();
    let mut set = |column: Column, value: CellValue| {
        writes.push(CellWrite {
            row: row_number,
            column,
            value,
        })
    };

    if let Some(v) = payload.check {
        set(Column::Check, v.into());
    }
    if let Some(v) = payload.bid_target {
        set(Column::BidTarget, v.into());
    }
    if let Some(v) = &payload.assignee {
        set(Column::Assignee, v.label().into());
    }
    if let Some(v) = payload.market_price {
        set(Column::MarketPrice, v.into());
    }
    if let Some(v) = &payload.reference_url1 {
        set(Column::ReferenceUrl1, v.as_str().into());
    }
    if let Some(v) = &payload.reference_url2 {
        set(Column::ReferenceUrl2, v.as_str().into());
    }
    if let Some(v) = &payload.reference_url3 {
        set(Column::ReferenceUrl3, v.as_str().into());
    }
    if let Some(v) = &payload.reference_url4 {
        set(Column::ReferenceUrl4, v.as_str().into());
    }
    if let Some(v) = &payload.reference_url5 {
        set(Column::ReferenceUrl5, v.as_str().into());
    }
    if let Some(v) = &payload.notes {
        set(Column::Notes, v.as_str().into());
    }
    if let Some(v) = payload.representative_check {
        set(Column::RepresentativeCheck, v.into());
    }
    if let Some(v) = payload.judgment_result {
        set(Column::JudgmentResult, v.into());
    }
    if let Some(v) = &payload.feedback {
        set(Column::Feedback, v.as_str().into());
    }
    if let Some(v) = payload.feedback_confirmed {
        set(Column::FeedbackConfirmed, v.into());
    }

    writes
}
