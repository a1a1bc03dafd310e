//! Client-held state for the three working modes: item entry, feedback
//! review and representative approval.
//!
//! The fetched list is kept as `confirmed`. User actions go into an
//! `overlay` keyed by item id before the write is sent; every view reads
//! the confirmed list with the overlay applied. A failed write leaves its
//! overlay in place, so the screen keeps showing what the user entered.

use crate::brands::{BRANDS, BrandKey};
use crate::cell::parse_number;
use crate::record::{Assignee, AuctionItem, UpdatePayload};
use crate::sample::sample_items;
use chrono::Utc;
use log::{info, warn};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;

/// Error body returned by the items API, or a transport failure (`kind` is `None`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiFailure {
    pub kind: Option<String>,
    pub message: String,
}

impl ApiFailure {
    pub fn is_not_configured(&self) -> bool {
        self.kind.as_deref() == Some("not_configured")
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{}: {}", kind, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// The two calls the front end makes against the server.
pub trait ItemsApi {
    fn fetch_items(&self) -> impl Future<Output = Result<Vec<AuctionItem>, ApiFailure>>;

    fn patch_item(
        &self,
        id: &str,
        payload: &UpdatePayload,
    ) -> impl Future<Output = Result<(), ApiFailure>>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Entry,
    FeedbackReview,
    Approval,
}

impl Tab {
    /// Employee-facing tabs need to know who is working.
    pub fn needs_user(self) -> bool {
        matches!(self, Tab::Entry | Tab::FeedbackReview)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Loading,
    SelectUser,
    Tab(Tab),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Loading,
    Connected,
    /// Showing the built-in sample items; edits stay local.
    Sample,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub bid_targets: usize,
    pub successes: usize,
    pub undecided: usize,
}

/// What an employee types for one item in entry mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryForm {
    pub market_price: String,
    pub reference_urls: [String; 5],
    pub notes: String,
}

impl EntryForm {
    /// A blank or unreadable price is saved as null and the item is not a bid target.
    pub fn payload(&self, assignee: &Assignee) -> UpdatePayload {
        let price = parse_number(&self.market_price);
        let [r1, r2, r3, r4, r5] = self.reference_urls.clone();
        UpdatePayload {
            market_price: Some(price),
            reference_url1: Some(r1),
            reference_url2: Some(r2),
            reference_url3: Some(r3),
            reference_url4: Some(r4),
            reference_url5: Some(r5),
            notes: Some(self.notes.clone()),
            check: Some(Some(true)),
            bid_target: Some(Some(price.is_some())),
            assignee: Some(assignee.clone()),
            ..Default::default()
        }
    }
}

struct Pending {
    patch: UpdatePayload,
    updated_at: String,
}

pub struct Workflow<A> {
    api: A,
    confirmed: Vec<AuctionItem>,
    overlay: HashMap<String, Pending>,
    status: ConnectionStatus,
    tab: Tab,
    current_user: Option<Assignee>,
    fallback_notified: bool,
    notices: Vec<Notice>,
}

impl<A: ItemsApi> Workflow<A> {
    pub fn new(api: A) -> Self {
        Workflow {
            api,
            confirmed: Vec::new(),
            overlay: HashMap::new(),
            status: ConnectionStatus::Loading,
            tab: Tab::default(),
            current_user: None,
            fallback_notified: false,
            notices: Vec::new(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn current_user(&self) -> Option<&Assignee> {
        self.current_user.as_ref()
    }

    /// Reloads from the server. Any failure switches to sample items; the
    /// user is told once, and not at all when the server is simply unconfigured.
    pub async fn refresh(&mut self) {
        self.status = ConnectionStatus::Loading;
        match self.api.fetch_items().await {
            Ok(items) => {
                info!("[workflow] loaded {} items", items.len());
                self.confirmed = items;
                self.status = ConnectionStatus::Connected;
                self.fallback_notified = false;
            }
            Err(failure) => {
                warn!("[workflow] fetch failed, using sample items: {}", failure);
                if !failure.is_not_configured() && !self.fallback_notified {
                    self.notices.push(Notice::Error(
                        "Could not load the sheet. Showing sample data.".to_string(),
                    ));
                    self.fallback_notified = true;
                }
                self.confirmed = sample_items();
                self.status = ConnectionStatus::Sample;
            }
        }
        self.overlay.clear();
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Only people on the roster can be selected.
    pub fn set_current_user(&mut self, user: Assignee) -> bool {
        if !user.is_rostered() {
            return false;
        }
        self.current_user = Some(user);
        true
    }

    pub fn clear_current_user(&mut self) {
        self.current_user = None;
    }

    pub fn screen(&self) -> Screen {
        if self.status == ConnectionStatus::Loading {
            Screen::Loading
        } else if self.tab.needs_user() && self.current_user.is_none() {
            Screen::SelectUser
        } else {
            Screen::Tab(self.tab)
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn with_overlay(&self, item: &AuctionItem) -> AuctionItem {
        let mut item = item.clone();
        if let Some(pending) = self.overlay.get(&item.id) {
            pending.patch.apply_to(&mut item);
            item.updated_at.clone_from(&pending.updated_at);
        }
        item
    }

    /// The item list as the user should see it.
    pub fn items(&self) -> Vec<AuctionItem> {
        self.confirmed.iter().map(|i| self.with_overlay(i)).collect()
    }

    pub fn item(&self, id: &str) -> Option<AuctionItem> {
        self.confirmed
            .iter()
            .find(|i| i.id == id)
            .map(|i| self.with_overlay(i))
    }

    fn count(&self, pred: impl Fn(&AuctionItem) -> bool) -> usize {
        self.items().iter().filter(|i| pred(i)).count()
    }

    fn is_mine(&self, item: &AuctionItem) -> bool {
        self.current_user.as_ref() == Some(&item.assignee)
    }

    /// Items whose entry is not done yet.
    pub fn pending_count(&self) -> usize {
        self.count(|i| !i.check)
    }

    /// Unacknowledged feedback addressed to the current user.
    pub fn feedback_count(&self) -> Option<usize> {
        self.current_user.as_ref()?;
        Some(self.unread_feedback().len())
    }

    /// Entered items the representative has not judged.
    pub fn approval_count(&self) -> usize {
        self.count(|i| i.check && !i.representative_check)
    }

    pub fn entry_queue(&self, mine_only: bool, brand: BrandKey) -> Vec<AuctionItem> {
        self.items()
            .into_iter()
            .filter(|i| !i.check)
            .filter(|i| !mine_only || self.is_mine(i))
            .filter(|i| brand.matches(&i.brand_name))
            .collect()
    }

    pub fn approval_queue(&self, brand: BrandKey) -> Vec<AuctionItem> {
        self.items()
            .into_iter()
            .filter(|i| i.check && !i.representative_check)
            .filter(|i| brand.matches(&i.brand_name))
            .collect()
    }

    /// Bucket sizes over the entry queue, `All` first.
    pub fn entry_brand_counts(&self) -> Vec<(BrandKey, usize)> {
        brand_counts(&self.entry_queue(false, BrandKey::All))
    }

    pub fn approval_brand_counts(&self) -> Vec<(BrandKey, usize)> {
        brand_counts(&self.approval_queue(BrandKey::All))
    }

    /// Every item with feedback for the current user, acknowledged or not.
    pub fn feedback_history(&self) -> Vec<AuctionItem> {
        self.items()
            .into_iter()
            .filter(|i| self.current_user.is_some() && self.is_mine(i))
            .filter(|i| !i.feedback.trim().is_empty())
            .collect()
    }

    pub fn unread_feedback(&self) -> Vec<AuctionItem> {
        self.feedback_history()
            .into_iter()
            .filter(|i| !i.feedback_confirmed)
            .collect()
    }

    pub fn summary(&self) -> Summary {
        let items = self.items();
        Summary {
            total: items.len(),
            bid_targets: items.iter().filter(|i| i.bid_target).count(),
            successes: items
                .iter()
                .filter(|i| i.representative_check && i.judgment_result)
                .count(),
            undecided: items.iter().filter(|i| !i.representative_check).count(),
        }
    }

    /// Share of items whose entry is done, rounded to a whole percent.
    pub fn progress_percent(&self) -> u32 {
        let total = self.confirmed.len();
        if total == 0 {
            return 0;
        }
        let done = total - self.pending_count();
        ((done as f64 / total as f64) * 100.0).round() as u32
    }

    pub async fn save_entry(&mut self, id: &str, form: &EntryForm) {
        let Some(user) = self.current_user.clone() else {
            self.notices
                .push(Notice::Error("Select who you are first.".to_string()));
            return;
        };
        self.patch(id, form.payload(&user), "Saved. Moving to the next item.")
            .await;
    }

    pub async fn approve(&mut self, id: &str, feedback: &str) {
        let payload = UpdatePayload {
            representative_check: Some(Some(true)),
            judgment_result: Some(Some(true)),
            feedback: Some(feedback.to_string()),
            ..Default::default()
        };
        self.patch(id, payload, "Recorded as a pass.").await;
    }

    pub async fn reject(&mut self, id: &str, feedback: &str) {
        let payload = UpdatePayload {
            representative_check: Some(Some(true)),
            judgment_result: Some(Some(false)),
            feedback: Some(feedback.to_string()),
            ..Default::default()
        };
        self.patch(id, payload, "Recorded as a fail.").await;
    }

    pub async fn save_feedback(&mut self, id: &str, feedback: &str) {
        let payload = UpdatePayload {
            feedback: Some(feedback.to_string()),
            ..Default::default()
        };
        self.patch(id, payload, "Feedback saved.").await;
    }

    pub async fn confirm_feedback(&mut self, id: &str) {
        let payload = UpdatePayload {
            feedback_confirmed: Some(Some(true)),
            ..Default::default()
        };
        self.patch(id, payload, "Marked as read.").await;
    }

    async fn patch(&mut self, id: &str, payload: UpdatePayload, message: &str) {
        if !self.confirmed.iter().any(|i| i.id == id) {
            warn!("[workflow] no item {} in the loaded list", id);
            self.notices
                .push(Notice::Error(format!("Item {} is not loaded.", id)));
            return;
        }

        let stamp = Utc::now().to_rfc3339();
        let pending = self.overlay.entry(id.to_string()).or_insert_with(|| Pending {
            patch: UpdatePayload::default(),
            updated_at: stamp.clone(),
        });
        pending.patch.merge(&payload);
        pending.updated_at.clone_from(&stamp);

        if self.status != ConnectionStatus::Connected {
            self.notices
                .push(Notice::Success(format!("{} (sample data)", message)));
            return;
        }

        match self.api.patch_item(id, &payload).await {
            Ok(()) => {
                self.confirm(id, &payload, &stamp);
                self.notices.push(Notice::Success(message.to_string()));
            }
            // The overlay stays; the user retries or reloads.
            Err(failure) => {
                warn!("[workflow] PATCH {} failed: {}", id, failure);
                self.notices
                    .push(Notice::Error(format!("Save failed: {}", failure.message)));
            }
        }
    }

    fn confirm(&mut self, id: &str, payload: &UpdatePayload, stamp: &str) {
        let Some(index) = self.confirmed.iter().position(|i| i.id == id) else {
            return;
        };
        let item = &mut self.confirmed[index];
        payload.apply_to(item);
        item.updated_at = stamp.to_string();

        // Drop the overlay once it no longer changes anything.
        let current = &self.confirmed[index];
        if self.with_overlay(current) == *current {
            self.overlay.remove(id);
        }
    }
}

fn brand_counts(items: &[AuctionItem]) -> Vec<(BrandKey, usize)> {
    let mut counts = vec![(BrandKey::All, items.len())];
    for brand in BRANDS {
        let n = items.iter().filter(|i| brand.matches(&i.brand_name)).count();
        counts.push((brand, n));
    }
    counts
}
