use scout_core::config::{is_configured, AppConfig};

struct CheckResult {
    label: String,
    ok: bool,
    detail: String,
}

pub fn run_doctor(config: &AppConfig) {
    let checks = vec![
        check_api_key(config),
        check_search_endpoint(config),
        check_search_key(config),
        check_social(config),
        check_polling(config),
    ];

    let mut ok_count = 0;
    let mut fail_count = 0;

    for check in &checks {
        let icon = if check.ok { "[OK]" } else { "[!!]" };
        println!("  {} {}: {}", icon, check.label, check.detail);
        if check.ok {
            ok_count += 1;
        } else {
            fail_count += 1;
        }
    }

    println!();
    println!("  {} passed, {} issues found", ok_count, fail_count);
}

fn check_api_key(config: &AppConfig) -> CheckResult {
    let provider = &config.model.provider;
    let needs_key = scout_llm::needs_api_key(provider);

    if !needs_key || is_configured(&config.model.api_key) {
        CheckResult {
            label: "Model API Key".into(),
            ok: true,
            detail: format!("Configured for {} ({})", config.model.model_id, provider),
        }
    } else {
        CheckResult {
            label: "Model API Key".into(),
            ok: false,
            detail: format!("No API key set for provider '{}'", provider),
        }
    }
}

fn check_search_endpoint(config: &AppConfig) -> CheckResult {
    match config.search.api_url.as_deref() {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => CheckResult {
            label: "Search Endpoint".into(),
            ok: true,
            detail: format!("{} (zone {})", url, config.search.zone),
        },
        Some(url) if !url.is_empty() && !url.starts_with("${") => CheckResult {
            label: "Search Endpoint".into(),
            ok: false,
            detail: format!("'{}' is not an http(s) URL", url),
        },
        _ => CheckResult {
            label: "Search Endpoint".into(),
            ok: false,
            detail: "search.api_url is not set (BRIGHT_DATA_API_URL)".into(),
        },
    }
}

fn check_search_key(config: &AppConfig) -> CheckResult {
    let ok = is_configured(&config.search.api_key);
    CheckResult {
        label: "Search API Key".into(),
        ok,
        detail: if ok {
            "Configured".into()
        } else {
            "search.api_key is not set (BRIGHT_DATA_API_KEY)".into()
        },
    }
}

fn check_social(config: &AppConfig) -> CheckResult {
    let social = &config.social;
    if !is_configured(&social.api_key) {
        return CheckResult {
            label: "Reddit Scraper".into(),
            ok: false,
            detail: "social.api_key is not set (BRIGHT_DATA_API_KEY)".into(),
        };
    }
    if social.posts_dataset_id.is_empty() || social.comments_dataset_id.is_empty() {
        return CheckResult {
            label: "Reddit Scraper".into(),
            ok: false,
            detail: "Dataset ids must not be empty".into(),
        };
    }
    CheckResult {
        label: "Reddit Scraper".into(),
        ok: true,
        detail: format!(
            "{} posts, {} comments per post via {}",
            social.num_of_posts, social.comment_limit, social.base_url
        ),
    }
}

fn check_polling(config: &AppConfig) -> CheckResult {
    let polling = &config.social.polling;
    if polling.max_attempts == 0 {
        return CheckResult {
            label: "Snapshot Polling".into(),
            ok: false,
            detail: "max_attempts is 0, snapshot jobs would never be checked".into(),
        };
    }
    let budget = polling.interval_secs * u64::from(polling.max_attempts);
    CheckResult {
        label: "Snapshot Polling".into(),
        ok: true,
        detail: format!(
            "{} attempts every {}s (up to {}s per job)",
            polling.max_attempts, polling.interval_secs, budget
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig::from_toml(
            r#"
[model]
model_id = "claude-sonnet-4-20250514"
api_key = "sk-test"

[search]
api_url = "https://api.brightdata.com/request"
api_key = "bd-key"

[social]
api_key = "bd-key"
"#,
        )
        .unwrap()
    }

    #[test]
    fn complete_config_passes_every_check() {
        let config = config();
        assert!(check_api_key(&config).ok);
        assert!(check_search_endpoint(&config).ok);
        assert!(check_search_key(&config).ok);
        assert!(check_social(&config).ok);
        assert!(check_polling(&config).ok);
    }

    #[test]
    fn unexpanded_or_missing_values_are_flagged() {
        let mut config = config();
        config.model.api_key = Some("${ANTHROPIC_API_KEY}".into());
        config.search.api_url = Some("api.brightdata.com".into());
        config.social.polling.max_attempts = 0;

        assert!(!check_api_key(&config).ok);
        assert!(!check_search_endpoint(&config).ok);
        assert!(!check_polling(&config).ok);

        config.model.provider = "ollama".into();
        assert!(check_api_key(&config).ok);
    }
}
