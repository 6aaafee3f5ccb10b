//! Token usage reported by a keep-alive response

use serde::{Deserialize, Serialize};

/// Usage record of a completion response.
///
/// Backends disagree on where cache reads are reported: DeepSeek-style
/// OpenAI-compatible APIs use `prompt_cache_hit_tokens`, Anthropic uses
/// `cache_read_input_tokens`. Both are kept so either can be consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheUsage {
    #[serde(default, alias = "prompt_tokens")]
    pub input_tokens: Option<u64>,
    #[serde(default, alias = "completion_tokens")]
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub prompt_cache_hit_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
}

impl CacheUsage {
    /// Tokens served from the backend's cache.
    ///
    /// `prompt_cache_hit_tokens` wins when it reports a non-zero count,
    /// otherwise `cache_read_input_tokens` is used; absent fields count as 0.
    /// Proxies that fill both fields often leave the unused one at zero,
    /// so a zero in the first field does not hide a count in the second.
    pub fn cache_hit_tokens(&self) -> u64 {
        match self.prompt_cache_hit_tokens {
            Some(hits) if hits > 0 => hits,
            _ => self.cache_read_input_tokens.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> CacheUsage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_prefers_prompt_cache_hit_tokens() {
        let usage = parse(json!({
            "prompt_tokens": 12000,
            "prompt_cache_hit_tokens": 11800,
            "cache_read_input_tokens": 5
        }));
        assert_eq!(usage.cache_hit_tokens(), 11800);
        assert_eq!(usage.input_tokens, Some(12000));
    }

    #[test]
    fn test_falls_back_to_cache_read_input_tokens() {
        let usage = parse(json!({
            "input_tokens": 3,
            "output_tokens": 1,
            "cache_read_input_tokens": 24576
        }));
        assert_eq!(usage.cache_hit_tokens(), 24576);

        let usage = parse(json!({
            "prompt_cache_hit_tokens": 0,
            "cache_read_input_tokens": 900
        }));
        assert_eq!(usage.cache_hit_tokens(), 900);
    }

    #[test]
    fn test_missing_fields_count_as_zero() {
        assert_eq!(parse(json!({})).cache_hit_tokens(), 0);
        assert_eq!(
            parse(json!({"cache_read_input_tokens": null})).cache_hit_tokens(),
            0
        );
    }
}
