use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    // Thousands separators, yen signs (half and full width) and any whitespace.
    static ref NUMBER_NOISE: Regex = Regex::new(r"[,¥￥\s]").unwrap();
}

/// Checkbox spellings the sheet has produced over time, plus the legacy
/// free-text markers for "target" and "success".
const TRUE_TOKENS: [&str; 8] = ["true", "TRUE", "1", "✓", "yes", "YES", "対象", "成功"];

/// A single cell as read from the backing sheet.
///
/// Formula cells carry both the value the sheet engine last computed and
/// the string it currently renders; the two can disagree while the sheet
/// is recalculating.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Formula {
        computed: Box<CellValue>,
        display: Option<String>,
    },
}

impl CellValue {
    pub fn formula(computed: CellValue, display: Option<&str>) -> Self {
        CellValue::Formula {
            computed: Box::new(computed),
            display: display.map(str::to_string),
        }
    }

    /// The value used for plain coercion: the computed view for formulas.
    pub fn scalar(&self) -> &CellValue {
        match self {
            CellValue::Formula { computed, .. } => computed.scalar(),
            other => other,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self.scalar() {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

// A cleared value is written back as an empty string, never as zero or false.
impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => CellValue::Text(String::new()),
        }
    }
}

pub fn to_text(cell: &CellValue) -> String {
    match cell.scalar() {
        CellValue::Empty => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Formula { .. } => String::new(),
    }
}

pub fn to_bool(cell: &CellValue) -> bool {
    match cell.scalar() {
        CellValue::Bool(b) => *b,
        CellValue::Number(n) => *n == 1.0,
        CellValue::Text(s) => TRUE_TOKENS.contains(&s.trim()),
        _ => false,
    }
}

pub fn to_number(cell: &CellValue) -> Option<f64> {
    match cell.scalar() {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) => None,
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => parse_number(s),
        _ => None,
    }
}

/// Parses a human-formatted number such as `"¥85,000"` or `" 1 200 "`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = NUMBER_NOISE.replace_all(raw, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Reads a monetary cell, preferring what the sheet displays over what it
/// last computed.
pub fn read_price(cell: &CellValue, label: &str) -> Option<f64> {
    match cell {
        CellValue::Formula { computed, display } => {
            debug!(
                "[price] {}: computed={:?} display={:?}",
                label, computed, display
            );
            display
                .as_deref()
                .filter(|d| !d.is_empty())
                .and_then(parse_number)
                .or_else(|| to_number(computed))
        }
        other => to_number(other),
    }
}
