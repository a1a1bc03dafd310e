use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// People who research items. Stored in the sheet by display name.
pub const ROSTER: [Assignee; 4] = [
    Assignee::Yoshikawa,
    Assignee::Ito,
    Assignee::Mochizuki,
    Assignee::Oride,
];

/// Column G of the sheet.
///
/// Names outside the roster are kept verbatim in `Other` so a read never
/// loses what a human typed into the sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Assignee {
    #[default]
    Unassigned,
    Yoshikawa,
    Ito,
    Mochizuki,
    Oride,
    Other(String),
}

impl Assignee {
    pub fn label(&self) -> &str {
        match self {
            Assignee::Unassigned => "",
            Assignee::Yoshikawa => "吉川さん",
            Assignee::Ito => "伊藤さん",
            Assignee::Mochizuki => "望月さん",
            Assignee::Oride => "折出さん",
            Assignee::Other(name) => name,
        }
    }

    pub fn is_rostered(&self) -> bool {
        ROSTER.contains(self)
    }
}

impl From<&str> for Assignee {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            return Assignee::Unassigned;
        }
        ROSTER
            .iter()
            .find(|a| a.label() == value)
            .cloned()
            .unwrap_or_else(|| Assignee::Other(value.to_string()))
    }
}

impl From<String> for Assignee {
    fn from(value: String) -> Self {
        Assignee::from(value.as_str())
    }
}

impl From<Assignee> for String {
    fn from(value: Assignee) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One auction item, mapped 1:1 to a data row of the sheet.
///
/// `id` is the 1-based physical row number. It is only stable while
/// nobody inserts, deletes or reorders rows in the sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionItem {
    pub id: String,
    pub product_url: String,
    pub brand_name: String,
    pub check: bool,
    pub bid_target: bool,
    pub assignee: Assignee,
    pub market_price: Option<f64>,
    pub bid_price: Option<f64>,
    pub wholesale_price: Option<f64>,
    pub reference_url1: String,
    pub reference_url2: String,
    pub reference_url3: String,
    pub reference_url4: String,
    pub reference_url5: String,
    pub notes: String,
    pub representative_check: bool,
    pub judgment_result: bool,
    pub feedback: String,
    pub feedback_confirmed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of a create request: every item field except identity and timestamps.
///
/// Missing keys and `null` both take the field's default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewItem {
    #[serde(deserialize_with = "null_as_default")]
    pub product_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub brand_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub check: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub bid_target: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub assignee: Assignee,
    pub market_price: Option<f64>,
    pub bid_price: Option<f64>,
    pub wholesale_price: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub reference_url1: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reference_url2: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reference_url3: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reference_url4: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reference_url5: String,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub representative_check: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub judgment_result: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub feedback: String,
    #[serde(deserialize_with = "null_as_default")]
    pub feedback_confirmed: bool,
}

impl From<&AuctionItem> for NewItem {
    fn from(item: &AuctionItem) -> Self {
        NewItem {
            product_url: item.product_url.clone(),
            brand_name: item.brand_name.clone(),
            check: item.check,
            bid_target: item.bid_target,
            assignee: item.assignee.clone(),
            market_price: item.market_price,
            bid_price: item.bid_price,
            wholesale_price: item.wholesale_price,
            reference_url1: item.reference_url1.clone(),
            reference_url2: item.reference_url2.clone(),
            reference_url3: item.reference_url3.clone(),
            reference_url4: item.reference_url4.clone(),
            reference_url5: item.reference_url5.clone(),
            notes: item.notes.clone(),
            representative_check: item.representative_check,
            judgment_result: item.judgment_result,
            feedback: item.feedback.clone(),
            feedback_confirmed: item.feedback_confirmed,
        }
    }
}

/// Sparse update of the mutable item fields.
///
/// `None` means "leave the stored value alone" and a JSON `null` clears the
/// cell. Numbers and flags keep that as `Some(None)`; for text fields a
/// cleared cell is just the empty string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub check: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub bid_target: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee: Option<Assignee>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub market_price: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_url1: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_url2: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_url3: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_url4: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_url5: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub representative_check: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub judgment_result: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "null_as_cleared",
        skip_serializing_if = "Option::is_none"
    )]
    pub feedback: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub feedback_confirmed: Option<Option<bool>>,
}

// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// A present key whose value is `null` becomes the empty value.
fn null_as_cleared<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(|v| Some(v.unwrap_or_default()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl UpdatePayload {
    pub fn is_empty(&self) -> bool {
        *self == UpdatePayload::default()
    }

    /// Copies every present field onto `item`.
    pub fn apply_to(&self, item: &mut AuctionItem) {
        if let Some(v) = self.check {
            item.check = v.unwrap_or(false);
        }
        if let Some(v) = self.bid_target {
            item.bid_target = v.unwrap_or(false);
        }
        if let Some(v) = &self.assignee {
            item.assignee = v.clone();
        }
        if let Some(v) = self.market_price {
            item.market_price = v;
        }
        if let Some(v) = &self.reference_url1 {
            item.reference_url1 = v.clone();
        }
        if let Some(v) = &self.reference_url2 {
            item.reference_url2 = v.clone();
        }
        if let Some(v) = &self.reference_url3 {
            item.reference_url3 = v.clone();
        }
        if let Some(v) = &self.reference_url4 {
            item.reference_url4 = v.clone();
        }
        if let Some(v) = &self.reference_url5 {
            item.reference_url5 = v.clone();
        }
        if let Some(v) = &self.notes {
            item.notes = v.clone();
        }
        if let Some(v) = self.representative_check {
            item.representative_check = v.unwrap_or(false);
        }
        if let Some(v) = self.judgment_result {
            item.judgment_result = v.unwrap_or(false);
        }
        if let Some(v) = &self.feedback {
            item.feedback = v.clone();
        }
        if let Some(v) = self.feedback_confirmed {
            item.feedback_confirmed = v.unwrap_or(false);
        }
    }

    /// Layers `later` on top of `self`; fields present in `later` win.
    pub fn merge(&mut self, later: &UpdatePayload) {
        fn take<T: Clone>(slot: &mut Option<T>, newer: &Option<T>) {
            if newer.is_some() {
                slot.clone_from(newer);
            }
        }
        take(&mut self.check, &later.check);
        take(&mut self.bid_target, &later.bid_target);
        take(&mut self.assignee, &later.assignee);
        take(&mut self.market_price, &later.market_price);
        take(&mut self.reference_url1, &later.reference_url1);
        take(&mut self.reference_url2, &later.reference_url2);
        take(&mut self.reference_url3, &later.reference_url3);
        take(&mut self.reference_url4, &later.reference_url4);
        take(&mut self.reference_url5, &later.reference_url5);
        take(&mut self.notes, &later.notes);
        take(&mut self.representative_check, &later.representative_check);
        take(&mut self.judgment_result, &later.judgment_result);
        take(&mut self.feedback, &later.feedback);
        take(&mut self.feedback_confirmed, &later.feedback_confirmed);
    }
}
