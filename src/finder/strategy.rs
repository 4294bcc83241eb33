//! Locator interpretations, in the order the resolver tries them.
//!
//! Cheap, literal readings come first. The text readings are synthesized last
//! because they are the most likely to match an unintended element.

use crate::errors::Result;
use crate::types::{Selector, StrategyKind};

pub type SelectorBuilder = fn(&str) -> Selector;

pub const STRATEGIES: [(StrategyKind, SelectorBuilder); 4] = [
    (StrategyKind::Xpath, xpath),
    (StrategyKind::CssSelector, css),
    (StrategyKind::ExactText, exact_text),
    (StrategyKind::PartialText, partial_text),
];

pub fn selector_for(kind: StrategyKind, expression: &str) -> Selector {
    match kind {
        StrategyKind::Xpath => xpath(expression),
        StrategyKind::CssSelector => css(expression),
        StrategyKind::ExactText => exact_text(expression),
        StrategyKind::PartialText => partial_text(expression),
    }
}

/// Build a selector from a strategy name such as `"css"` or `"partial_text"`.
pub fn selector_for_name(name: &str, expression: &str) -> Result<Selector> {
    Ok(selector_for(name.parse()?, expression))
}

/// Quote `value` as an XPath string literal.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|part| format!("'{}'", part)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn xpath(expression: &str) -> Selector {
    Selector::XPath(expression.to_string())
}

fn css(expression: &str) -> Selector {
    Selector::Css(expression.to_string())
}

fn exact_text(expression: &str) -> Selector {
    Selector::XPath(format!("//*[text()={}]", xpath_literal(expression)))
}

fn partial_text(expression: &str) -> Selector {
    Selector::XPath(format!("//*[contains(text(),{})]", xpath_literal(expression)))
}
