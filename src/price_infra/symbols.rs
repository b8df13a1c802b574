/// Trims and lowercases a user-facing ticker. Registry keys, stored samples
/// and lookups all use this form.
pub fn canonical_symbol(symbol: &str) -> String {
    symbol.trim().to_lowercase()
}

/// Maps a ticker to its CoinGecko asset id.
///
/// Unknown tickers fall through unchanged; they may already be a CoinGecko id.
pub fn to_coingecko_id(symbol: &str) -> String {
    let symbol = canonical_symbol(symbol);
    let id = match symbol.as_str() {
        "btc" => "bitcoin",
        "eth" => "ethereum",
        "bnb" => "binancecoin",
        "sol" => "solana",
        "xrp" => "ripple",
        "ada" => "cardano",
        "doge" => "dogecoin",
        "ton" => "the-open-network",
        "dot" => "polkadot",
        "trx" => "tron",
        _ => return symbol,
    };
    id.to_string()
}
