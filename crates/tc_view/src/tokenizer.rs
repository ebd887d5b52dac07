//! See [`tokenize`].

use std::sync::LazyLock;

use fancy_regex::Regex;
use tracing::debug;

use crate::block::{GroupBlock, ToolLine};

/// Tool names rendered as structured tool steps.
///
/// This is a fixed enumeration: a tool name the server introduces later
/// renders as plain prose until the client is updated to list it.
const TOOL_NAMES: &[&str] = &[
    "get_btc_dominance",
    "get_ema_structure",
    "get_fear_greed_index",
    "get_funding_rates",
    "get_market_overview",
    "get_token_analysis",
    "get_token_price",
    "get_trending_coins",
    "search_news",
    "search_crypto_news",
    "search_web",
    "check_positions",
    "open_position",
    "close_position",
    "get_portfolio",
];

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    // Names are plain identifiers, safe to join unescaped.
    let names = TOOL_NAMES.join("|");
    let completion = r"(?: completed(?: in [0-9]+(?:\.[0-9]+)?s\.)?)?";

    let pattern = format!(
        r"Running: [^\n]*|Searching [^\n]*|Browsing [^\n]*|log_strategy_analysis\([^)\n]*\){completion}|(?:{names})\(\.\.\.\){completion}"
    );

    Regex::new(&pattern).expect("token pattern is valid")
});

static STRIP: LazyLock<Regex> = LazyLock::new(|| {
    let pattern =
        r"(?m)(?:,[ \t]*)?\b(?:market_analysis|position_check|strategy_decision|action_taken)=|,[ \t]*$";

    Regex::new(pattern).expect("strip pattern is valid")
});

/// Project an assembled assistant message into renderable blocks.
///
/// Pure and idempotent: the input is never mutated, and tokenizing the
/// same string twice yields identical output. Raw structured-output
/// fragments are stripped before the token scan.
#[must_use]
pub fn tokenize(assembled: &str) -> Vec<GroupBlock> {
    let stripped = STRIP.replace_all(assembled, "");

    let mut blocks: Vec<GroupBlock> = Vec::new();
    let mut cursor = 0;

    for found in TOKEN.find_iter(&stripped) {
        let token = match found {
            Ok(token) => token,
            Err(error) => {
                debug!(%error, "Token scan aborted mid-input.");
                break;
            }
        };

        push_prose(&mut blocks, &stripped[cursor..token.start()]);
        push_tool(&mut blocks, parse_tool_line(token.as_str()));
        cursor = token.end();
    }
    push_prose(&mut blocks, &stripped[cursor..]);

    if let Some(block) = blocks
        .iter_mut()
        .rev()
        .find(|block| block.tools.is_empty() && block.joined_text().chars().count() > 100)
    {
        block.final_result = true;
    }

    blocks
}

/// Append a prose segment, line by line, merging into the last block when
/// that block is itself prose.
fn push_prose(blocks: &mut Vec<GroupBlock>, segment: &str) {
    let lines = segment
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned);

    for line in lines {
        match blocks.last_mut() {
            Some(block) if block.tools.is_empty() => block.text_parts.push(line),
            _ => blocks.push(GroupBlock {
                text_parts: vec![line],
                ..GroupBlock::default()
            }),
        }
    }
}

/// Append a tool line, merging into the last block when that block is a
/// run of tool lines.
fn push_tool(blocks: &mut Vec<GroupBlock>, tool: ToolLine) {
    match blocks.last_mut() {
        Some(block) if block.text_parts.is_empty() => block.tools.push(tool),
        _ => blocks.push(GroupBlock {
            tools: vec![tool],
            ..GroupBlock::default()
        }),
    }
}

fn parse_tool_line(token: &str) -> ToolLine {
    if token.starts_with("Running: ")
        || token.starts_with("Searching ")
        || token.starts_with("Browsing ")
    {
        return ToolLine {
            label: token.to_owned(),
            name: None,
            completed: false,
            duration_seconds: None,
        };
    }

    ToolLine {
        label: token.to_owned(),
        name: token.split_once('(').map(|(name, _)| name.to_owned()),
        completed: token.contains(" completed"),
        duration_seconds: token
            .split_once(" completed in ")
            .and_then(|(_, rest)| rest.strip_suffix("s."))
            .and_then(|digits| digits.parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn prose(parts: &[&str]) -> GroupBlock {
        GroupBlock {
            text_parts: parts.iter().map(|&part| part.to_owned()).collect(),
            ..GroupBlock::default()
        }
    }

    #[test]
    fn test_pure_prose_is_one_block() {
        assert_eq!(tokenize("Hello world."), vec![prose(&["Hello world."])]);
    }

    #[test]
    fn test_tool_block_then_prose_block() {
        let blocks = tokenize("\nget_btc_dominance(...) completed in 1.2345s.BTC dominance is 54%.");

        assert_eq!(blocks, vec![
            GroupBlock {
                tools: vec![ToolLine {
                    label: "get_btc_dominance(...) completed in 1.2345s.".to_owned(),
                    name: Some("get_btc_dominance".to_owned()),
                    completed: true,
                    duration_seconds: Some(1.2345),
                }],
                ..GroupBlock::default()
            },
            prose(&["BTC dominance is 54%."]),
        ]);
    }

    #[test]
    fn test_tool_between_prose_yields_three_blocks() {
        let blocks =
            tokenize("Checking…\nget_ema_structure(...) completed in 0.5000s.EMA is bullish.");

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], prose(&["Checking…"]));
        assert_eq!(blocks[1].tools.len(), 1);
        assert_eq!(blocks[2], prose(&["EMA is bullish."]));
    }

    #[test]
    fn test_running_line_has_no_name() {
        let blocks = tokenize("Running: deep market scan\ndone");

        assert_eq!(blocks[0].tools, vec![ToolLine {
            label: "Running: deep market scan".to_owned(),
            name: None,
            completed: false,
            duration_seconds: None,
        }]);
    }

    #[test]
    fn test_pending_sentinel_is_a_tool_line() {
        let blocks = tokenize("\nget_token_analysis(...)");

        assert_eq!(blocks, vec![GroupBlock {
            tools: vec![ToolLine {
                label: "get_token_analysis(...)".to_owned(),
                name: Some("get_token_analysis".to_owned()),
                completed: false,
                duration_seconds: None,
            }],
            ..GroupBlock::default()
        }]);
    }

    #[test]
    fn test_log_strategy_analysis_keeps_arguments() {
        let blocks = tokenize("log_strategy_analysis(BTC, 4h) completed");

        assert_eq!(blocks[0].tools[0].label, "log_strategy_analysis(BTC, 4h) completed");
        assert_eq!(blocks[0].tools[0].name, Some("log_strategy_analysis".to_owned()));
        assert!(blocks[0].tools[0].completed);
        assert_eq!(blocks[0].tools[0].duration_seconds, None);
    }

    #[test]
    fn test_search_crypto_news_is_a_tool_line() {
        let blocks = tokenize("\nsearch_crypto_news(...) completed in 0.8000s.");

        assert_eq!(blocks[0].tools, vec![ToolLine {
            label: "search_crypto_news(...) completed in 0.8000s.".to_owned(),
            name: Some("search_crypto_news".to_owned()),
            completed: true,
            duration_seconds: Some(0.8),
        }]);
    }

    #[test]
    fn test_unlisted_tool_renders_as_prose() {
        assert_eq!(tokenize("mystery_tool(...)"), vec![prose(&["mystery_tool(...)"])]);
    }

    #[test]
    fn test_raw_fragments_are_stripped() {
        let blocks = tokenize("market_analysis=Momentum is turning.\nstrategy_decision=Hold.");
        assert_eq!(blocks, vec![prose(&["Momentum is turning.", "Hold."])]);

        let blocks = tokenize("Watching BTC,\naction_taken=none");
        assert_eq!(blocks, vec![prose(&["Watching BTC", "none"])]);
    }

    #[test]
    fn test_consecutive_tool_lines_merge() {
        let blocks = tokenize("\nsearch_web(...) completed in 0.2000s.\nget_token_price(...)");

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].tools.len(), 2);
        assert!(blocks[0].text_parts.is_empty());
    }

    #[test]
    fn test_final_result_flag_on_last_long_prose_block() {
        let long = "The structure favors continuation: higher lows on the daily, \
                    expanding volume, and a reclaimed range midpoint all point the same way.";
        let input = format!("{long}\nget_btc_dominance(...) completed in 1.0000s.\n{long}");

        let blocks = tokenize(&input);
        assert_eq!(blocks.len(), 3);
        assert!(!blocks[0].final_result);
        assert!(blocks[2].final_result);
    }

    #[test]
    fn test_short_prose_is_not_a_final_result() {
        let blocks = tokenize("Looks fine.");
        assert!(!blocks[0].final_result);
    }

    #[test]
    fn test_tokenize_is_idempotent() {
        let input = "Checking…\nget_ema_structure(...) completed in 0.5000s.EMA is bullish.";
        assert_eq!(tokenize(input), tokenize(input));
    }
}
