//! Coin detection over a finished assistant message.
//!
//! The allow-list is a fixed enumeration: a coin the assistant mentions
//! under a name that is not listed here will simply not produce a chip.
//! Additions require a client update.

/// The coin allow-list: canonical symbol plus the aliases it is detected
/// under. Symbols (all-caps ASCII) match case-sensitively on word
/// boundaries; other aliases match case-insensitively, and non-ASCII
/// aliases as plain substrings.
///
/// Order matters: detected symbols are reported in allow-list order.
const COINS: &[(&str, &[&str])] = &[
    ("BTC", &["BTC", "Bitcoin", "비트코인", "ビットコイン", "比特币"]),
    ("ETH", &["ETH", "Ethereum", "이더리움", "イーサリアム", "以太坊"]),
    ("XRP", &["XRP", "Ripple", "리플", "リップル"]),
    ("BNB", &["BNB", "Binance Coin"]),
    ("SOL", &["SOL", "Solana", "솔라나", "ソラナ"]),
    ("DOGE", &["DOGE", "Dogecoin", "도지코인", "狗狗币"]),
    ("ADA", &["ADA", "Cardano", "에이다"]),
    ("TRX", &["TRX", "Tron"]),
    ("AVAX", &["AVAX", "Avalanche", "아발란체"]),
    ("LINK", &["LINK", "Chainlink", "체인링크"]),
    ("DOT", &["DOT", "Polkadot", "폴카닷"]),
    ("MATIC", &["MATIC", "Polygon", "폴리곤"]),
    ("LTC", &["LTC", "Litecoin", "라이트코인"]),
    ("SHIB", &["SHIB", "Shiba Inu", "시바이누"]),
    ("UNI", &["UNI", "Uniswap"]),
    ("ATOM", &["ATOM", "Cosmos"]),
    ("XLM", &["XLM", "Stellar"]),
    ("NEAR", &["NEAR Protocol", "NEAR"]),
    ("APT", &["APT", "Aptos"]),
    ("ARB", &["ARB", "Arbitrum"]),
    ("OP", &["Optimism"]),
    ("SUI", &["SUI", "Sui Network"]),
    ("PEPE", &["PEPE", "Pepe"]),
    ("USDT", &["USDT", "Tether"]),
    ("USDC", &["USDC", "USD Coin"]),
];

/// Scan `text` for known coins, returning the deduplicated canonical
/// symbols in allow-list order.
#[must_use]
pub fn detect_coins(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();

    COINS
        .iter()
        .filter(|(_, aliases)| {
            aliases.iter().any(|alias| {
                if alias.is_ascii() && alias.chars().all(|c| !c.is_ascii_lowercase()) {
                    // Ticker symbol: exact case, own word.
                    contains_word(text, alias)
                } else if alias.is_ascii() {
                    contains_word(&lowered, &alias.to_lowercase())
                } else {
                    // Localized names have no useful word boundaries.
                    text.contains(alias)
                }
            })
        })
        .map(|(symbol, _)| *symbol)
        .collect()
}

/// Substring search requiring non-alphanumeric (or string-edge) characters
/// on both sides of the match.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(index, _)| {
        let before_ok = haystack[..index]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[index + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());

        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_symbol_and_name_mix() {
        assert_eq!(
            detect_coins("BTC and Ethereum both look constructive here."),
            vec!["BTC", "ETH"]
        );
    }

    #[test]
    fn test_allow_list_order_and_dedup() {
        // Mention order is Solana first, but the allow-list puts ETH
        // before SOL; ETH is also mentioned twice.
        assert_eq!(
            detect_coins("Solana outperformed ETH today, while eth gas fell."),
            vec!["ETH", "SOL"]
        );
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        assert_eq!(detect_coins("the btc symbol in lowercase"), Vec::<&str>::new());
        assert_eq!(detect_coins("BTC in uppercase"), vec!["BTC"]);
    }

    #[test]
    fn test_word_boundaries() {
        // "LINKED" must not match LINK, "ADAM" must not match ADA.
        assert_eq!(detect_coins("LINKED data about ADAM"), Vec::<&str>::new());
        assert_eq!(detect_coins("LINK/USDT is rangebound"), vec!["LINK", "USDT"]);
    }

    #[test]
    fn test_localized_names() {
        assert_eq!(detect_coins("비트코인 강세, 이더리움 약세"), vec!["BTC", "ETH"]);
        assert_eq!(detect_coins("比特币创新高"), vec!["BTC"]);
    }

    #[test]
    fn test_no_coins() {
        assert_eq!(
            detect_coins("Nothing about markets here."),
            Vec::<&str>::new()
        );
    }
}
