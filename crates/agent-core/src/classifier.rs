//! Intent Classification
//!
//! An ordered table of intent rules evaluated top to bottom; the first rule
//! whose matcher fires decides the action. Later rules are broader than
//! earlier ones, so the order of [`INTENT_RULES`] matters.
//!
//! [`RuleBasedEngine`] wraps the table as a [`DecisionEngine`]: user messages
//! are classified, tool results are handed to the formatter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::{ConversationContext, PendingDiscount};
use crate::engine::{Action, DecisionEngine};
use crate::error::Result;
use crate::extract::{
    Calculation, NewProductFields, ProductRef, contains_any_word, extract_calculation,
    extract_named_discount, extract_new_product, extract_product_id,
};
use crate::formatter::format_tool_output;
use crate::message::{Message, Role};
use crate::tool::{Arguments, ToolCall, names};

/// Reply when no rule matches
pub const FALLBACK_REPLY: &str = "I don't know how to handle that.";

const RETRIEVAL_VERBS: [&str; 5] = ["get", "show", "fetch", "find", "details"];

const STATS_WORDS: [&str; 7] = [
    "average",
    "mean",
    "stats",
    "statistics",
    "total",
    "count",
    "how many",
];

const LISTING_WORDS: [&str; 8] = ["list", "show", "display", "get", "what", "all", "view", "see"];

const CATALOG_NOUNS: [&str; 6] = ["product", "products", "item", "items", "catalog", "inventory"];

const PRICED_NOUNS: [&str; 8] = [
    "price", "prices", "cost", "costs", "product", "products", "item", "items",
];

/// One user utterance, with a lowercased copy for keyword checks
#[derive(Clone, Debug)]
pub struct Utterance<'a> {
    text: &'a str,
    lower: String,
}

impl<'a> Utterance<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_lowercase(),
        }
    }

    pub const fn text(&self) -> &str {
        self.text
    }

    fn mentions(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.lower.contains(n))
    }
}

/// What the user asked for
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    LookupProduct { product_id: ProductRef },
    CatalogStats,
    ListProducts,
    CreateProduct(NewProductFields),
    Calculate(Calculation),
    DiscountOnProduct(PendingDiscount),
}

impl Intent {
    /// Turn the intent into the tool call that serves it.
    ///
    /// A discount on a named product is parked in the context until a
    /// listing arrives to price it.
    pub fn into_action(self, context: &mut ConversationContext) -> Action {
        let call = match self {
            Self::LookupProduct { product_id } => ToolCall::new(
                names::GET_PRODUCT,
                Arguments::from([("product_id".to_string(), product_id.to_value())]),
            ),
            Self::CatalogStats => ToolCall::new(names::GET_STATS, Arguments::new()),
            Self::ListProducts => ToolCall::new(names::LIST_PRODUCTS, Arguments::new()),
            Self::CreateProduct(fields) => ToolCall::new(names::ADD_PRODUCT, fields.to_arguments()),
            Self::Calculate(calculation) => {
                ToolCall::new(names::CALCULATOR, calculation.to_arguments())
            }
            Self::DiscountOnProduct(pending) => {
                context.set_pending_discount(pending);
                ToolCall::new(names::LIST_PRODUCTS, Arguments::new())
            }
        };
        Action::ToolInvocation(call)
    }
}

/// A named matcher in the intent table
pub struct IntentRule {
    pub name: &'static str,
    pub matcher: fn(&Utterance<'_>) -> Option<Intent>,
}

/// Intent rules in evaluation order
pub static INTENT_RULES: [IntentRule; 6] = [
    IntentRule {
        name: "lookup_product",
        matcher: match_lookup,
    },
    IntentRule {
        name: "catalog_stats",
        matcher: match_stats,
    },
    IntentRule {
        name: "list_products",
        matcher: match_listing,
    },
    IntentRule {
        name: "create_product",
        matcher: match_creation,
    },
    IntentRule {
        name: "calculate",
        matcher: match_calculation,
    },
    IntentRule {
        name: "discount_on_product",
        matcher: match_named_discount,
    },
];

fn match_lookup(utterance: &Utterance<'_>) -> Option<Intent> {
    let product_id = extract_product_id(utterance.text())?;
    utterance
        .mentions(&RETRIEVAL_VERBS)
        .then_some(Intent::LookupProduct { product_id })
}

fn match_stats(utterance: &Utterance<'_>) -> Option<Intent> {
    (contains_any_word(&utterance.lower, &STATS_WORDS)
        && contains_any_word(&utterance.lower, &PRICED_NOUNS))
    .then_some(Intent::CatalogStats)
}

fn match_listing(utterance: &Utterance<'_>) -> Option<Intent> {
    (contains_any_word(&utterance.lower, &LISTING_WORDS)
        && contains_any_word(&utterance.lower, &CATALOG_NOUNS))
    .then_some(Intent::ListProducts)
}

fn match_creation(utterance: &Utterance<'_>) -> Option<Intent> {
    extract_new_product(utterance.text()).map(Intent::CreateProduct)
}

fn match_calculation(utterance: &Utterance<'_>) -> Option<Intent> {
    extract_calculation(utterance.text()).map(Intent::Calculate)
}

fn match_named_discount(utterance: &Utterance<'_>) -> Option<Intent> {
    extract_named_discount(utterance.text()).map(Intent::DiscountOnProduct)
}

/// Run the intent table against `text`; `None` means no rule fired
pub fn classify(text: &str) -> Option<Intent> {
    let utterance = Utterance::new(text);
    INTENT_RULES.iter().find_map(|rule| {
        let intent = (rule.matcher)(&utterance)?;
        tracing::debug!(rule = rule.name, "Intent rule matched");
        Some(intent)
    })
}

/// Deterministic decision engine over [`INTENT_RULES`]
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleBasedEngine;

impl RuleBasedEngine {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DecisionEngine for RuleBasedEngine {
    fn name(&self) -> &str {
        "rules"
    }

    async fn decide(
        &self,
        history: &[Message],
        context: &mut ConversationContext,
    ) -> Result<Action> {
        let Some(last) = history.last() else {
            return Ok(Action::reply(FALLBACK_REPLY));
        };

        match last.role {
            Role::User => {
                context.set_last_query(&last.content);
                Ok(classify(&last.content).map_or_else(
                    || Action::reply(FALLBACK_REPLY),
                    |intent| intent.into_action(context),
                ))
            }
            Role::Tool => Ok(Action::reply(format_tool_output(&last.content, context))),
            Role::System | Role::Assistant => Ok(Action::reply(FALLBACK_REPLY)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Operation;

    async fn decide_on(text: &str, ctx: &mut ConversationContext) -> Action {
        RuleBasedEngine::new()
            .decide(&[Message::user(text)], ctx)
            .await
            .unwrap()
    }

    fn tool_name(action: &Action) -> &str {
        &action.tool_call().expect("expected a tool call").name
    }

    #[test]
    fn test_lookup_with_any_retrieval_verb() {
        for text in [
            "get product 3",
            "show me product 3",
            "fetch id 3",
            "find #3",
            "details for product with id 3",
        ] {
            assert_eq!(
                classify(text),
                Some(Intent::LookupProduct { product_id: 3.into() }),
                "{text}"
            );
        }
    }

    #[test]
    fn test_oversized_id_still_looks_up() {
        let digits = "99999999999999999999999";
        let intent = classify(&format!("get product {digits}")).unwrap();
        assert_eq!(
            intent,
            Intent::LookupProduct {
                product_id: ProductRef::OutOfRange(digits.into())
            }
        );

        let mut ctx = ConversationContext::new();
        let call = intent.into_action(&mut ctx).tool_call().unwrap().clone();
        assert_eq!(call.name, names::GET_PRODUCT);
        assert_eq!(call.arguments["product_id"], digits);
    }

    #[test]
    fn test_lookup_beats_listing() {
        // "show" and "product" also satisfy the listing rule
        assert_eq!(
            classify("show product 7"),
            Some(Intent::LookupProduct { product_id: 7.into() })
        );
    }

    #[test]
    fn test_identifier_without_retrieval_verb_is_not_lookup() {
        assert_ne!(
            classify("product 7 please"),
            Some(Intent::LookupProduct { product_id: 7.into() })
        );
    }

    #[test]
    fn test_stats_intent() {
        assert_eq!(classify("What's the average price?"), Some(Intent::CatalogStats));
        assert_eq!(classify("how many products are there"), Some(Intent::CatalogStats));
        assert_eq!(classify("total count of items"), Some(Intent::CatalogStats));
    }

    #[test]
    fn test_discount_does_not_trigger_stats() {
        assert_eq!(classify("calculate discount on product"), None);
    }

    #[test]
    fn test_listing_intent() {
        assert_eq!(classify("List all products"), Some(Intent::ListProducts));
        assert_eq!(classify("what is in the inventory"), Some(Intent::ListProducts));
        assert_eq!(classify("let me see the catalog"), Some(Intent::ListProducts));
    }

    #[test]
    fn test_creation_intent() {
        let Some(Intent::CreateProduct(fields)) =
            classify("add product: Mouse, price 1500, category Electronics")
        else {
            panic!("expected a creation intent");
        };

        assert_eq!(fields.name, "Mouse");
        assert!((fields.price - 1500.0).abs() < f64::EPSILON);
        assert_eq!(fields.category, "Electronics");
        assert!(fields.in_stock);
    }

    #[test]
    fn test_discount_on_literal_numbers() {
        let Some(Intent::Calculate(calc)) = classify("calculate 15% discount on 100") else {
            panic!("expected a calculation");
        };

        assert_eq!(calc.operation, Operation::Multiply);
        assert!((calc.a - 100.0).abs() < 0.01);
        assert!((calc.b - 0.85).abs() < 0.01);
    }

    #[test]
    fn test_plain_arithmetic() {
        assert_eq!(
            classify("calculate 6 times 7"),
            Some(Intent::Calculate(Calculation {
                operation: Operation::Multiply,
                a: 6.0,
                b: 7.0,
            }))
        );
    }

    #[test]
    fn test_named_discount_intent() {
        assert_eq!(
            classify("calculate 15% discount on keyboard"),
            Some(Intent::DiscountOnProduct(PendingDiscount {
                discount_percent: 15.0,
                product_name: "keyboard".into(),
            }))
        );
    }

    #[test]
    fn test_unknown_utterance() {
        assert_eq!(classify("tell me a joke"), None);
    }

    #[test]
    fn test_rule_table_order() {
        let order: Vec<&str> = INTENT_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            order,
            [
                "lookup_product",
                "catalog_stats",
                "list_products",
                "create_product",
                "calculate",
                "discount_on_product",
            ]
        );
    }

    #[tokio::test]
    async fn test_engine_fallback_reply() {
        let mut ctx = ConversationContext::new();
        let action = decide_on("tell me a joke", &mut ctx).await;

        assert_eq!(action, Action::reply(FALLBACK_REPLY));
        assert_eq!(ctx.last_query(), Some("tell me a joke"));
    }

    #[tokio::test]
    async fn test_engine_lookup_arguments() {
        let mut ctx = ConversationContext::new();
        let action = decide_on("get product 1", &mut ctx).await;

        let call = action.tool_call().unwrap();
        assert_eq!(call.name, names::GET_PRODUCT);
        assert_eq!(call.number("product_id"), Some(1.0));
    }

    #[tokio::test]
    async fn test_engine_two_step_discount() {
        let mut ctx = ConversationContext::new();
        let action = decide_on("calculate 15% discount on keyboard", &mut ctx).await;

        assert_eq!(tool_name(&action), names::LIST_PRODUCTS);
        assert_eq!(
            ctx.pending_discount(),
            Some(&PendingDiscount {
                discount_percent: 15.0,
                product_name: "keyboard".into(),
            })
        );

        let history = [
            Message::user("calculate 15% discount on keyboard"),
            Message::assistant_tool_call(action.tool_call().unwrap().clone()),
            Message::tool(r#"[{"name": "Keyboard", "price": 2500, "category": "Electronics"}]"#, None),
        ];
        let Action::TextReply { content } = RuleBasedEngine::new().decide(&history, &mut ctx).await.unwrap()
        else {
            panic!("expected a text reply");
        };

        assert!(content.contains("15%"));
        assert!(content.contains("2125"));
        assert!(!ctx.has_pending_discount());

        let again = format_tool_output(r#"[{"name": "Keyboard", "price": 2500, "category": "Electronics"}]"#, &mut ctx);
        assert!(again.starts_with("Here are the products I found:"));
    }

    #[tokio::test]
    async fn test_latest_discount_wins() {
        let mut ctx = ConversationContext::new();
        decide_on("calculate 10% discount on mouse", &mut ctx).await;
        decide_on("calculate 25% discount on laptop", &mut ctx).await;

        let pending = ctx.pending_discount().unwrap();
        assert!((pending.discount_percent - 25.0).abs() < f64::EPSILON);
        assert_eq!(pending.product_name, "laptop");
    }

    #[tokio::test]
    async fn test_tool_result_goes_to_formatter() {
        let mut ctx = ConversationContext::new();
        let history = [Message::user("calculate 6 times 7"), Message::tool("42", None)];

        let action = RuleBasedEngine::new().decide(&history, &mut ctx).await.unwrap();
        assert_eq!(action, Action::reply("The result is: 42"));
    }
}
