//! Workflow state against a scripted items API.

use bidsheet::brands::BrandKey;
use bidsheet::record::{Assignee, AuctionItem, UpdatePayload};
use bidsheet::sample::sample_items;
use bidsheet::workflow::{
    ApiFailure, ConnectionStatus, EntryForm, ItemsApi, Notice, Screen, Tab, Workflow,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Default)]
struct Script {
    fetches: VecDeque<Result<Vec<AuctionItem>, ApiFailure>>,
    patch_failure: Option<ApiFailure>,
    patches: Vec<(String, UpdatePayload)>,
}

#[derive(Clone, Default)]
struct FakeApi(Rc<RefCell<Script>>);

impl FakeApi {
    fn queue_fetch(&self, result: Result<Vec<AuctionItem>, ApiFailure>) {
        self.0.borrow_mut().fetches.push_back(result);
    }

    fn fail_patches(&self, failure: Option<ApiFailure>) {
        self.0.borrow_mut().patch_failure = failure;
    }

    fn patches(&self) -> Vec<(String, UpdatePayload)> {
        self.0.borrow().patches.clone()
    }
}

impl ItemsApi for FakeApi {
    async fn fetch_items(&self) -> Result<Vec<AuctionItem>, ApiFailure> {
        self.0
            .borrow_mut()
            .fetches
            .pop_front()
            .unwrap_or_else(|| Err(transport("no scripted response")))
    }

    async fn patch_item(&self, id: &str, payload: &UpdatePayload) -> Result<(), ApiFailure> {
        let mut script = self.0.borrow_mut();
        script.patches.push((id.to_string(), payload.clone()));
        match &script.patch_failure {
            Some(f) => Err(f.clone()),
            None => Ok(()),
        }
    }
}

fn transport(message: &str) -> ApiFailure {
    ApiFailure {
        kind: None,
        message: message.to_string(),
    }
}

fn not_configured() -> ApiFailure {
    ApiFailure {
        kind: Some("not_configured".to_string()),
        message: "Google Sheets is not configured.".to_string(),
    }
}

fn item(id: &str, brand: &str, assignee: Assignee) -> AuctionItem {
    AuctionItem {
        id: id.to_string(),
        product_url: format!("https://auction.example.com/lots/{id}"),
        brand_name: brand.to_string(),
        check: false,
        bid_target: false,
        assignee,
        market_price: None,
        bid_price: None,
        wholesale_price: None,
        reference_url1: String::new(),
        reference_url2: String::new(),
        reference_url3: String::new(),
        reference_url4: String::new(),
        reference_url5: String::new(),
        notes: String::new(),
        representative_check: false,
        judgment_result: false,
        feedback: String::new(),
        feedback_confirmed: false,
        created_at: "2025-02-01T00:00:00Z".to_string(),
        updated_at: "2025-02-01T00:00:00Z".to_string(),
    }
}

fn server_items() -> Vec<AuctionItem> {
    let mut entered = item("3", "HERMES ピコタン", Assignee::Ito);
    entered.check = true;
    entered.market_price = Some(300000.0);

    let mut judged = item("4", "CHANEL ボーイシャネル", Assignee::Yoshikawa);
    judged.check = true;
    judged.representative_check = true;
    judged.feedback = "参考URLを追加してください".to_string();

    vec![
        item("2", "LOUIS VUITTON スピーディ", Assignee::Yoshikawa),
        entered,
        judged,
        item("5", "GUCCI バンブー", Assignee::Mochizuki),
    ]
}

async fn connected() -> (Workflow<FakeApi>, FakeApi) {
    let api = FakeApi::default();
    api.queue_fetch(Ok(server_items()));
    let mut workflow = Workflow::new(api.clone());
    workflow.refresh().await;
    (workflow, api)
}

fn errors(notices: &[Notice]) -> usize {
    notices
        .iter()
        .filter(|n| matches!(n, Notice::Error(_)))
        .count()
}

#[tokio::test]
async fn starts_loading_then_asks_for_a_user() {
    let api = FakeApi::default();
    api.queue_fetch(Ok(server_items()));
    let mut workflow = Workflow::new(api);
    assert_eq!(workflow.screen(), Screen::Loading);

    workflow.refresh().await;
    assert_eq!(workflow.status(), ConnectionStatus::Connected);
    assert_eq!(workflow.screen(), Screen::SelectUser);

    workflow.select_tab(Tab::Approval);
    assert_eq!(workflow.screen(), Screen::Tab(Tab::Approval));

    workflow.select_tab(Tab::FeedbackReview);
    assert_eq!(workflow.screen(), Screen::SelectUser);
    assert!(!workflow.set_current_user(Assignee::Other("田中さん".to_string())));
    assert!(workflow.set_current_user(Assignee::Yoshikawa));
    assert_eq!(workflow.screen(), Screen::Tab(Tab::FeedbackReview));
}

#[tokio::test]
async fn counts_and_queues() {
    let (mut workflow, _) = connected().await;

    assert_eq!(workflow.pending_count(), 2);
    assert_eq!(workflow.approval_count(), 1);
    assert_eq!(workflow.feedback_count(), None);
    assert_eq!(workflow.progress_percent(), 50);

    workflow.set_current_user(Assignee::Yoshikawa);
    assert_eq!(workflow.feedback_count(), Some(1));

    let mine: Vec<String> = workflow
        .entry_queue(true, BrandKey::All)
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(mine, vec!["2".to_string()]);

    let gucci = workflow.entry_queue(false, BrandKey::Gucci);
    assert_eq!(gucci.len(), 1);
    assert_eq!(gucci[0].id, "5");

    let counts = workflow.entry_brand_counts();
    assert_eq!(counts[0], (BrandKey::All, 2));
    assert!(counts.contains(&(BrandKey::LouisVuitton, 1)));
    assert!(counts.contains(&(BrandKey::Hermes, 0)));

    let summary = workflow.summary();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.undecided, 3);
    assert_eq!(summary.successes, 0);
}

#[tokio::test]
async fn save_entry_is_visible_before_and_after_the_write() {
    let (mut workflow, api) = connected().await;
    workflow.set_current_user(Assignee::Mochizuki);

    let form = EntryForm {
        market_price: "64,000".to_string(),
        notes: "美品".to_string(),
        ..Default::default()
    };
    workflow.save_entry("5", &form).await;

    let saved = workflow.item("5").unwrap();
    assert!(saved.check);
    assert!(saved.bid_target);
    assert_eq!(saved.market_price, Some(64000.0));
    assert_eq!(saved.notes, "美品");
    assert_ne!(saved.updated_at, "2025-02-01T00:00:00Z");

    let patches = api.patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0, "5");
    assert_eq!(patches[0].1.assignee, Some(Assignee::Mochizuki));

    assert_eq!(workflow.pending_count(), 1);
    assert_eq!(workflow.approval_count(), 2);
    assert_eq!(errors(&workflow.take_notices()), 0);
}

#[tokio::test]
async fn failed_write_keeps_the_local_change() {
    let (mut workflow, api) = connected().await;
    api.fail_patches(Some(ApiFailure {
        kind: Some("update_failed".to_string()),
        message: "quota exceeded".to_string(),
    }));

    workflow.approve("3", "OK").await;

    let item = workflow.item("3").unwrap();
    assert!(item.representative_check);
    assert!(item.judgment_result);
    assert_eq!(item.feedback, "OK");
    assert_eq!(workflow.approval_count(), 0);

    let notices = workflow.take_notices();
    assert_eq!(notices, vec![Notice::Error("Save failed: quota exceeded".to_string())]);

    // Reloading drops the unsaved change.
    api.queue_fetch(Ok(server_items()));
    workflow.refresh().await;
    assert!(!workflow.item("3").unwrap().representative_check);
}

#[tokio::test]
async fn later_actions_layer_over_earlier_ones() {
    let (mut workflow, api) = connected().await;
    api.fail_patches(Some(transport("offline")));

    workflow.reject("3", "相場が低い").await;
    workflow.save_feedback("3", "相場が低いので見送り").await;

    let item = workflow.item("3").unwrap();
    assert!(item.representative_check);
    assert!(!item.judgment_result);
    assert_eq!(item.feedback, "相場が低いので見送り");
}

#[tokio::test]
async fn confirming_feedback_clears_the_unread_badge() {
    let (mut workflow, api) = connected().await;
    workflow.set_current_user(Assignee::Yoshikawa);
    assert_eq!(workflow.unread_feedback().len(), 1);

    workflow.confirm_feedback("4").await;

    assert_eq!(workflow.feedback_count(), Some(0));
    assert_eq!(workflow.feedback_history().len(), 1);
    assert_eq!(api.patches()[0].1.feedback_confirmed, Some(Some(true)));
}

#[tokio::test]
async fn fetch_failure_falls_back_to_samples_and_says_so_once() {
    let api = FakeApi::default();
    api.queue_fetch(Err(transport("connection refused")));
    api.queue_fetch(Err(transport("connection refused")));
    let mut workflow = Workflow::new(api.clone());

    workflow.refresh().await;
    assert_eq!(workflow.status(), ConnectionStatus::Sample);
    assert_eq!(workflow.items(), sample_items());
    assert_eq!(errors(&workflow.take_notices()), 1);

    workflow.refresh().await;
    assert_eq!(errors(&workflow.take_notices()), 0);

    // A successful load re-arms the notice.
    api.queue_fetch(Ok(server_items()));
    api.queue_fetch(Err(transport("connection refused")));
    workflow.refresh().await;
    assert_eq!(workflow.status(), ConnectionStatus::Connected);
    workflow.refresh().await;
    assert_eq!(errors(&workflow.take_notices()), 1);
}

#[tokio::test]
async fn unconfigured_server_falls_back_silently() {
    let api = FakeApi::default();
    api.queue_fetch(Err(not_configured()));
    let mut workflow = Workflow::new(api);

    workflow.refresh().await;
    assert_eq!(workflow.status(), ConnectionStatus::Sample);
    assert!(workflow.take_notices().is_empty());
}

#[tokio::test]
async fn sample_mode_saves_locally() {
    let api = FakeApi::default();
    api.queue_fetch(Err(not_configured()));
    let mut workflow = Workflow::new(api.clone());
    workflow.refresh().await;

    let id = sample_items()[0].id.clone();
    workflow.approve(&id, "良い").await;

    assert!(api.patches().is_empty());
    assert!(workflow.item(&id).unwrap().representative_check);
    match workflow.take_notices().as_slice() {
        [Notice::Success(m)] => assert!(m.contains("sample data"), "{m}"),
        other => panic!("unexpected notices: {other:?}"),
    }
}

#[tokio::test]
async fn save_entry_needs_a_user() {
    let (mut workflow, api) = connected().await;
    workflow.save_entry("2", &EntryForm::default()).await;

    assert!(api.patches().is_empty());
    assert!(!workflow.item("2").unwrap().check);
    assert_eq!(errors(&workflow.take_notices()), 1);
}
