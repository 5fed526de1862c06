//! Prompt templates for the research workflow.

use scout_core::types::{ChatMessage, PostComment};

const SEARCH_ANALYST: &str = "You are an expert research analyst. You read raw search engine \
results and extract the facts that answer the user's question. Cite sources by URL where \
possible. Say plainly when the results do not answer the question.";

fn serp_analysis(engine: &str, focus: &str, user_question: &str, results: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!("{}\n\nFocus for {} results: {}", SEARCH_ANALYST, engine, focus)),
        ChatMessage::user(format!(
            "User question: {}\n\n{} search results (JSON):\n{}\n\n\
             Summarize the key findings relevant to the question.",
            user_question, engine, results
        )),
    ]
}

pub fn google_analysis(user_question: &str, results: &str) -> Vec<ChatMessage> {
    serp_analysis(
        "Google",
        "authoritative sources, knowledge panel facts and the top organic results.",
        user_question,
        results,
    )
}

pub fn bing_analysis(user_question: &str, results: &str) -> Vec<ChatMessage> {
    serp_analysis(
        "Bing",
        "complementary sources and anything the other engines are likely to miss.",
        user_question,
        results,
    )
}

pub fn yandex_analysis(user_question: &str, results: &str) -> Vec<ChatMessage> {
    serp_analysis(
        "Yandex",
        "international and regional perspectives on the question.",
        user_question,
        results,
    )
}

pub fn url_selection(user_question: &str, reddit_results: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You pick the Reddit discussions most likely to answer a question. \
             Return only URLs that appear in the provided posts.",
        ),
        ChatMessage::user(format!(
            "User question: {}\n\nReddit posts (JSON):\n{}\n\n\
             Select the post URLs whose discussions are most relevant.",
            user_question, reddit_results
        )),
    ]
}

fn render_comments(comments: &[PostComment]) -> String {
    comments
        .iter()
        .map(|c| {
            format!(
                "- [{}] {}{}: {}",
                c.post_title.as_deref().unwrap_or("untitled"),
                c.date.as_deref().unwrap_or("undated"),
                if c.parent_comment_id.is_some() { " (reply)" } else { "" },
                c.content.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Digest of retrieved comments, written into `post_detail_data`.
pub fn reddit_digest(
    user_question: &str,
    reddit_results: &str,
    comments: &[PostComment],
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You condense Reddit comment threads into the opinions, experiences and \
             recommendations that bear on a question.",
        ),
        ChatMessage::user(format!(
            "User question: {}\n\nPosts found (JSON):\n{}\n\nComments:\n{}\n\n\
             Write a compact digest of what commenters say.",
            user_question,
            reddit_results,
            render_comments(comments)
        )),
    ]
}

pub fn reddit_analysis(
    user_question: &str,
    reddit_results: &str,
    post_detail_data: &str,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "You analyze community discussions. Separate consensus from disagreement \
             and firsthand experience from hearsay.",
        ),
        ChatMessage::user(format!(
            "User question: {}\n\nPosts found (JSON):\n{}\n\nComment digest:\n{}\n\n\
             Analyze what the community thinks about the question.",
            user_question, reddit_results, post_detail_data
        )),
    ]
}

pub fn synthesis(
    user_question: &str,
    google_analysis: &str,
    bing_analysis: &str,
    yandex_analysis: &str,
    reddit_analysis: &str,
) -> Vec<ChatMessage> {
    let section = |name: &str, body: &str| {
        if body.is_empty() {
            format!("{} analysis: (no data)", name)
        } else {
            format!("{} analysis:\n{}", name, body)
        }
    };

    vec![
        ChatMessage::system(
            "You combine research from several sources into one clear answer. \
             Prefer facts confirmed by more than one source and point out conflicts.",
        ),
        ChatMessage::user(format!(
            "User question: {}\n\n{}\n\n{}\n\n{}\n\n{}\n\nWrite the final answer.",
            user_question,
            section("Google", google_analysis),
            section("Bing", bing_analysis),
            section("Yandex", yandex_analysis),
            section("Reddit", reddit_analysis)
        )),
    ]
}
