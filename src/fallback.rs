//! Built-in articles served when aggregation produced nothing.
//!
//! The set is built once per process; dates are relative to that moment
//! (today, then one article per previous day).

use crate::models::Article;
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use std::sync::Arc;

struct Curated {
    title: &'static str,
    description: &'static str,
    author: &'static str,
    author_title: &'static str,
    source: &'static str,
    category: &'static str,
    comment_count: u32,
}

const CURATED: &[Curated] = &[
    Curated {
        title: "Bitcoin Surges Past $45,000 as Institutional Adoption Accelerates",
        description: "Bitcoin has reached a new milestone as institutional investors continue to pour into the cryptocurrency market, driving prices to new heights.",
        author: "CryptoNews Desk",
        author_title: "Senior Analyst",
        source: "CryptoNews",
        category: "Bitcoin",
        comment_count: 156,
    },
    Curated {
        title: "Ethereum 2.0 Upgrade Shows Promising Results for DeFi Ecosystem",
        description: "The Ethereum network upgrade is demonstrating significant improvements in transaction speed and cost efficiency for decentralized finance applications.",
        author: "DeFi Reporter",
        author_title: "Blockchain Specialist",
        source: "DeFi Pulse",
        category: "Ethereum",
        comment_count: 89,
    },
    Curated {
        title: "Gold-Backed Cryptocurrencies Gain Traction Amid Market Volatility",
        description: "Investors are increasingly turning to gold-backed digital assets as a hedge against traditional market volatility and inflation concerns.",
        author: "Market Analyst",
        author_title: "Investment Strategist",
        source: "Financial Times",
        category: "Gold",
        comment_count: 234,
    },
    Curated {
        title: "Central Bank Digital Currencies (CBDCs) Reshape Global Finance",
        description: "Major central banks worldwide are accelerating their CBDC initiatives, potentially revolutionizing cross-border payments and monetary policy.",
        author: "CBDC Expert",
        author_title: "Policy Analyst",
        source: "Central Banking",
        category: "CBDC",
        comment_count: 95,
    },
    Curated {
        title: "DeFi Protocols Reach $100 Billion in Total Value Locked",
        description: "Decentralized finance continues its explosive growth as innovative protocols attract billions in user deposits and trading volume.",
        author: "DeFi Analyst",
        author_title: "Protocol Researcher",
        source: "DeFi Llama",
        category: "DeFi",
        comment_count: 95,
    },
    Curated {
        title: "NFT Market Sees Record-Breaking Sales in Digital Art and Gaming",
        description: "The NFT ecosystem is experiencing unprecedented growth with major brands and artists entering the digital collectibles space.",
        author: "NFT Specialist",
        author_title: "Digital Art Curator",
        source: "NFT News",
        category: "NFT",
        comment_count: 95,
    },
];

static FALLBACK: Lazy<Arc<[Article]>> = Lazy::new(|| {
    let now = Utc::now();
    CURATED
        .iter()
        .enumerate()
        .map(|(i, curated)| {
            Article::new(
                (i + 1).to_string(),
                curated.title,
                now - Duration::days(i as i64),
                curated.source,
                curated.category,
            )
            .with_description(curated.description)
            .with_author(curated.author, curated.author_title)
            .with_comment_count(curated.comment_count)
            .with_image_url(Some(format!(
                "/images/blogs/blog_post_image_{}.webp",
                i + 1
            )))
        })
        .collect()
});

/// The fallback set, newest first.
pub fn fallback_articles() -> Arc<[Article]> {
    Arc::clone(&FALLBACK)
}
