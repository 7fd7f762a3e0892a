use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopularStock {
    pub symbol: &'static str,
    pub name: &'static str,
}

/// Static list offered to callers that need a starting ticker set.
pub const POPULAR_STOCKS: &[PopularStock] = &[
    PopularStock { symbol: "AAPL", name: "Apple Inc." },
    PopularStock { symbol: "MSFT", name: "Microsoft Corporation" },
    PopularStock { symbol: "AMZN", name: "Amazon.com, Inc." },
    PopularStock { symbol: "GOOGL", name: "Alphabet Inc. (Class A)" },
    PopularStock { symbol: "META", name: "Meta Platforms, Inc." },
    PopularStock { symbol: "TSLA", name: "Tesla, Inc." },
    PopularStock { symbol: "NVDA", name: "NVIDIA Corporation" },
    PopularStock { symbol: "NFLX", name: "Netflix, Inc." },
    PopularStock { symbol: "JPM", name: "JPMorgan Chase & Co." },
    PopularStock { symbol: "BAC", name: "Bank of America Corporation" },
];
