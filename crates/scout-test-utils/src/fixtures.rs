use serde_json::json;

use scout_core::types::*;

pub fn serp_results(engine: SearchEngine) -> SerpResults {
    SerpResults {
        knowledge: json!({ "title": format!("{} knowledge panel", engine) }),
        organic: json!([
            { "title": "The Rust Programming Language", "link": "https://doc.rust-lang.org/book/", "source": engine.as_str() },
            { "title": "Rust by Example", "link": "https://doc.rust-lang.org/rust-by-example/", "source": engine.as_str() }
        ]),
    }
}

pub fn social_posts() -> SocialPosts {
    let parsed_posts = vec![
        SocialPost {
            title: Some("Is Rust worth learning in 2025?".into()),
            url: Some("https://www.reddit.com/r/rust/comments/u1".into()),
        },
        SocialPost {
            title: Some("Async Rust experiences".into()),
            url: Some("https://www.reddit.com/r/rust/comments/u2".into()),
        },
    ];
    SocialPosts {
        total_found: parsed_posts.len(),
        parsed_posts,
    }
}

/// `count` comments spread over two posts.
pub fn post_details(count: usize) -> PostDetails {
    let parsed_comments: Vec<PostComment> = (0..count)
        .map(|i| PostComment {
            comment_id: Some(format!("c{}", i)),
            content: Some(format!("Comment number {}", i)),
            date: Some("2024-11-02".into()),
            parent_comment_id: if i == 0 { None } else { Some("c0".into()) },
            post_title: Some("Is Rust worth learning in 2025?".into()),
            url: Some(format!("https://www.reddit.com/r/rust/comments/u{}", i % 2 + 1)),
        })
        .collect();
    PostDetails {
        total_found: parsed_comments.len(),
        parsed_comments,
    }
}
