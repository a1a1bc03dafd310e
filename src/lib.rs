/*!
# Bid Sheet

A workflow front end for auction-bid research kept in a Google spreadsheet.

## Overview

Employees research auction items and enter market prices and reference
links; a representative approves or rejects each item with feedback; the
employees then read and acknowledge that feedback. The spreadsheet stays the
single source of truth. This crate maps its rows to typed items and back,
serves them over a small JSON API, and holds the client-side workflow state.

## Architecture

### Sheet Layer
- **cell**: tagged cell values and coercion to text, flags and numbers
  (including formula cells whose displayed value wins over the computed one)
- **layout**: the fixed column layout (A..=V) and row ⇄ item conversion
- **google**: Sheets v4 backend authenticated with a service account
- **memory**: in-process backend for tests and offline use

### Store Layer
- **store**: fetch all, partial update and append over any `SheetBackend`
- **config**: environment settings and the "is it configured" gate
- **error**: `NotConfigured`, `InvalidIdentifier` and backend failures

### Web Layer
- **app**: axum routes `GET/POST /api/items` and `PATCH /api/items/{row}`

### Client Layer
- **workflow**: entry / feedback-review / approval modes, optimistic overlay,
  derived counts and queues
- **client**: HTTP implementation of the workflow's `ItemsApi`
- **brands**, **sample**: category buckets and the fallback item set

## Data Layout

One worksheet, header in row 1, data from row 2. An item's id is its row
number, so inserting or deleting rows by hand re-numbers every item below.

## REST API Endpoints

- `GET /api/items` - Every non-empty row as an item
- `POST /api/items` - Appends a new row
- `PATCH /api/items/{row}` - Writes only the fields present in the body
*/

#[cfg(feature = "web")]
pub mod app;
pub mod brands;
pub mod cell;
pub mod client;
pub mod config;
pub mod error;
pub mod google;
pub mod layout;
pub mod memory;
pub mod record;
pub mod sample;
pub mod store;
pub mod workflow;

pub use cell::CellValue;
pub use error::{BackendError, StoreError};
pub use record::{Assignee, AuctionItem, NewItem, UpdatePayload};
pub use store::{ItemStore, SheetBackend};
