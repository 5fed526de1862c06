//! The research workflow's nodes.
//!
//! Nodes short-circuit on missing input and return errors from providers or
//! the reasoning engine unchanged. The executor then records the node as
//! degraded and merges its `degraded()` update, which empties the owned field.

pub mod analyze;
pub mod gather;
pub mod retrieve;
pub mod select;
pub mod synthesize;

pub use analyze::{AnalysisNode, Source};
pub use gather::{SearchNode, SocialSearchNode};
pub use retrieve::PostRetrievalNode;
pub use select::UrlSelectionNode;
pub use synthesize::SynthesisNode;

pub const GOOGLE_SEARCH: &str = "google_search";
pub const BING_SEARCH: &str = "bing_search";
pub const YANDEX_SEARCH: &str = "yandex_search";
pub const REDDIT_SEARCH: &str = "reddit_search";
pub const SELECT_REDDIT_URLS: &str = "select_reddit_urls";
pub const RETRIEVE_REDDIT_POSTS: &str = "retrieve_reddit_posts";
pub const ANALYZE_GOOGLE_RESULTS: &str = "analyze_google_results";
pub const ANALYZE_BING_RESULTS: &str = "analyze_bing_results";
pub const ANALYZE_YANDEX_RESULTS: &str = "analyze_yandex_results";
pub const ANALYZE_REDDIT_RESULTS: &str = "analyze_reddit_results";
pub const SYNTHESIZE_FINAL_ANSWER: &str = "synthesize_final_answer";
