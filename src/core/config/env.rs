use std::str::FromStr;

use super::sections::ConfigError;

/// Trimmed value of `key`; blank values count as unset.
pub(super) fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn text(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn flag(key: &str) -> bool {
    optional(key).is_some_and(|value| is_truthy(&value))
}

pub(super) fn number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        None => Ok(default),
        Some(value) => {
            value.parse().map_err(|_| ConfigError::InvalidValue { field: key, value })
        }
    }
}

/// Accepts either a JSON array or a comma-separated list; empty input yields `defaults`.
pub(super) fn list(key: &'static str, defaults: &[&str]) -> Result<Vec<String>, ConfigError> {
    let items = match optional(key) {
        None => Vec::new(),
        Some(raw) if raw.starts_with('[') => serde_json::from_str::<Vec<String>>(&raw)
            .map_err(|_| ConfigError::InvalidValue { field: key, value: raw.clone() })?,
        Some(raw) => raw.split(',').map(str::trim).map(str::to_string).collect(),
    };

    let items: Vec<String> = items.into_iter().filter(|item| !item.is_empty()).collect();
    if items.is_empty() {
        return Ok(defaults.iter().map(|item| item.to_string()).collect());
    }
    Ok(items)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn truthy_values() {
        for value in ["1", "true", "YES", "On"] {
            assert!(is_truthy(value), "{value}");
        }
        for value in ["0", "false", "off", "nope"] {
            assert!(!is_truthy(value), "{value}");
        }
    }

    #[tokio::test]
    async fn list_reads_json_and_csv_and_falls_back() {
        let _guard = test_support::env_lock().await;
        const KEY: &str = "GRADEBOOK_TEST_LIST";

        std::env::set_var(KEY, "[\"http://a\",\"http://b\"]");
        assert_eq!(list(KEY, &[]).expect("json"), vec!["http://a", "http://b"]);

        std::env::set_var(KEY, "http://a, ,http://b");
        assert_eq!(list(KEY, &[]).expect("csv"), vec!["http://a", "http://b"]);

        std::env::set_var(KEY, "[\"http://a\"");
        assert!(list(KEY, &[]).is_err());

        std::env::set_var(KEY, "  ");
        assert_eq!(list(KEY, &["http://default"]).expect("default"), vec!["http://default"]);

        std::env::remove_var(KEY);
    }

    #[tokio::test]
    async fn number_reports_the_offending_key() {
        let _guard = test_support::env_lock().await;
        const KEY: &str = "GRADEBOOK_TEST_NUMBER";

        std::env::remove_var(KEY);
        assert_eq!(number::<u16>(KEY, 7).expect("default"), 7);

        std::env::set_var(KEY, "70000");
        let err = number::<u16>(KEY, 7).expect_err("out of range");
        std::env::remove_var(KEY);
        assert!(err.to_string().contains(KEY));
    }
}
