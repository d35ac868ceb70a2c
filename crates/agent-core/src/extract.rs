//! Argument Extraction
//!
//! Independent matchers that pull typed values out of an utterance. None of
//! them decides intent; the classifier owns ordering.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::PendingDiscount;
use crate::tool::Arguments;

/// Category used when a creation request names none
pub const DEFAULT_CATEGORY: &str = "General";

const CREATION_VERBS: [&str; 5] = ["add", "create", "insert", "new", "register"];

/// Words the name matchers tend to swallow at either end of a name
const NAME_NOISE: [&str; 7] = [
    "add", "create", "new", "product", "item", "insert", "register",
];

const CALCULATOR_VERBS: [&str; 7] = [
    "calculate", "compute", "multiply", "add", "subtract", "divide", "discount",
];

/// Most specific phrasing first
static PRODUCT_ID_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)\bproduct\s+with\s+id\s+(\d+)").unwrap(),
        Regex::new(r"(?i)\bproduct\s+(\d+)").unwrap(),
        Regex::new(r"(?i)\bid\s+(\d+)").unwrap(),
        Regex::new(r"#(\d+)").unwrap(),
    ]
});

static PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:price|cost|for)\s*:?\s*\$?(\d+(?:\.\d+)?)").unwrap()
});

static CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:category|in|type)\b\s*:?\s*([a-z\s]+?)(?:,|$|\s+in_stock)").unwrap()
});

static LABELLED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:product|item|name)\s*:\s*([a-z][a-z0-9\s]*?)(?:\s*,|\s+price|\s+for|\s+category|\s+\d)",
    )
    .unwrap()
});

static VERB_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:add|create|new|insert|register)(?:\s+(?:a|an|new))?\s+(?:product|item)?\s*:?\s*([a-z][a-z0-9\s]*?)(?:\s*,|\s+price|\s+for|\s+category|\s+in\s+|\s*\d)",
    )
    .unwrap()
});

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

static DISCOUNT_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:on|for)\s+([a-z]+)").unwrap());

/// Fields for a product creation request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProductFields {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
}

impl NewProductFields {
    /// Tool arguments for `add_product`
    pub fn to_arguments(&self) -> Arguments {
        Arguments::from([
            ("name".to_string(), serde_json::json!(self.name)),
            ("price".to_string(), serde_json::json!(self.price)),
            ("category".to_string(), serde_json::json!(self.category)),
            ("in_stock".to_string(), serde_json::json!(self.in_stock)),
        ])
    }
}

/// Binary arithmetic operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation keywords, checked group by group in this order
const OPERATION_KEYWORDS: [(Operation, &[&str]); 4] = [
    (Operation::Multiply, &["multiply", "times", "*", "×"]),
    (Operation::Add, &["add", "plus", "+"]),
    (Operation::Subtract, &["subtract", "minus", "-"]),
    (Operation::Divide, &["divide", "divided by", "/"]),
];

/// An arithmetic request with its operands in application order
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub operation: Operation,
    pub a: f64,
    pub b: f64,
}

impl Calculation {
    /// Tool arguments for `calculator`
    pub fn to_arguments(&self) -> Arguments {
        Arguments::from([
            ("operation".to_string(), serde_json::json!(self.operation.as_str())),
            ("a".to_string(), serde_json::json!(self.a)),
            ("b".to_string(), serde_json::json!(self.b)),
        ])
    }
}

/// Whether `text` contains `phrase` as whole words.
///
/// A word is a run of alphanumerics or underscores; a multi-word phrase must
/// appear as consecutive words.
pub fn contains_word(text: &str, phrase: &str) -> bool {
    let words: Vec<&str> = split_words(text).collect();
    let wanted: Vec<&str> = split_words(phrase).collect();

    !wanted.is_empty()
        && words
            .windows(wanted.len())
            .any(|window| window.iter().zip(&wanted).all(|(a, b)| a.eq_ignore_ascii_case(b)))
}

/// Whether any of `phrases` occurs in `text` as whole words
pub fn contains_any_word(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| contains_word(text, p))
}

fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
}

fn contains_any(lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| lower.contains(n))
}

/// A product identifier as the user wrote it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(u64),
    /// Digits too large for an id; the lookup still runs and fails there
    OutOfRange(String),
}

impl ProductRef {
    /// Value for the `product_id` tool argument
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Id(id) => serde_json::json!(id),
            Self::OutOfRange(digits) => serde_json::json!(digits),
        }
    }
}

impl From<u64> for ProductRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

/// Numeric product identifier, e.g. "product 1", "id 5", "#3"
pub fn extract_product_id(text: &str) -> Option<ProductRef> {
    let caps = PRODUCT_ID_PATTERNS.iter().find_map(|re| re.captures(text))?;
    let digits = &caps[1];

    Some(digits.parse().map_or_else(
        |_| {
            tracing::debug!(digits, "Product id out of range");
            ProductRef::OutOfRange(digits.to_string())
        },
        ProductRef::Id,
    ))
}

/// Name, price and category for a creation request.
///
/// Needs a creation verb plus both a name and a price.
pub fn extract_new_product(text: &str) -> Option<NewProductFields> {
    let lower = text.to_lowercase();
    if !contains_any(&lower, &CREATION_VERBS) {
        return None;
    }

    let price = PRICE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())?;

    let name = extract_product_name(text)?;

    let category = CATEGORY
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    Some(NewProductFields {
        name,
        price,
        category,
        in_stock: true,
    })
}

fn extract_product_name(text: &str) -> Option<String> {
    let caps = LABELLED_NAME
        .captures(text)
        .or_else(|| VERB_NAME.captures(text))?;

    let name = strip_name_noise(&caps[1]);
    (!name.is_empty()).then_some(name)
}

/// Drop a creation or label keyword captured at either end of a name.
///
/// Only whole words are dropped, so "Newspaper" keeps its leading "New". A
/// name that is itself a keyword ("New") still comes back empty.
fn strip_name_noise(captured: &str) -> String {
    let mut words: Vec<&str> = captured.split_whitespace().collect();

    for noise in NAME_NOISE {
        if words.last().is_some_and(|w| w.eq_ignore_ascii_case(noise)) {
            words.pop();
        }
        if words.first().is_some_and(|w| w.eq_ignore_ascii_case(noise)) {
            words.remove(0);
        }
    }

    words.join(" ")
}

/// Percentage and product name from "15% discount on keyboard"
pub fn extract_named_discount(text: &str) -> Option<PendingDiscount> {
    let lower = text.to_lowercase();
    if !lower.contains("discount") {
        return None;
    }

    let percent = INTEGER
        .find(&lower)
        .and_then(|m| m.as_str().parse::<f64>().ok())?;
    let product_name = DISCOUNT_TARGET.captures(&lower)?[1].to_string();

    Some(PendingDiscount {
        discount_percent: percent,
        product_name,
    })
}

/// Two-operand arithmetic, including "15% discount on 100".
///
/// For percentage discounts the operand below 100 is taken as the percent
/// and the other as the price, so "120% discount on 40" reads 40 as the
/// percent.
pub fn extract_calculation(text: &str) -> Option<Calculation> {
    let lower = text.to_lowercase();
    if !contains_any(&lower, &CALCULATOR_VERBS) {
        return None;
    }

    let mut numbers = DECIMAL
        .find_iter(&lower)
        .filter_map(|m| m.as_str().parse::<f64>().ok());
    let (a, b) = (numbers.next()?, numbers.next()?);

    let is_discount = lower.contains("discount") || contains_word(&lower, "off");
    if is_discount && lower.contains('%') {
        let (percent, price) = if a < 100.0 { (a, b) } else { (b, a) };
        return Some(Calculation {
            operation: Operation::Multiply,
            a: price,
            b: 1.0 - percent / 100.0,
        });
    }

    OPERATION_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|&(operation, _)| Calculation { operation, a, b })
}
