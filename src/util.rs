use std::sync::LazyLock;
use regex::Regex;
use serenity::model::id::{ChannelId, RoleId};
use crate::error::BenchError;

// Discord refuses select-option labels and embed field values past these lengths.
pub const MAX_MODEL_NAME_LEN: usize = 100;
pub const EMBED_FIELD_LIMIT: usize = 1024;

static CHANNEL_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:<#(\d+)>|(\d+))$").unwrap());
static ROLE_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:<@&(\d+)>|(\d+))$").unwrap());

fn snowflake(regex: &Regex, input: &str) -> Option<u64> {
    let captures = regex.captures(input.trim())?;
    let digits = captures.get(1).or_else(|| captures.get(2))?;

    digits.as_str().parse::<u64>().ok().filter(|id| *id != 0)
}

/// Accepts `<#id>` or a bare id.
pub fn parse_channel_ref(input: &str) -> Option<ChannelId> {
    snowflake(&CHANNEL_REF, input).map(ChannelId::new)
}

/// Accepts `<@&id>` or a bare id.
pub fn parse_role_ref(input: &str) -> Option<RoleId> {
    snowflake(&ROLE_REF, input).map(RoleId::new)
}

/// A score reply must be nothing but ASCII digits and fit in an `i64`.
pub fn parse_score(content: &str) -> Option<i64> {
    if content.is_empty() || !content.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    content.parse::<i64>().ok()
}

pub fn validate_model_name(input: &str) -> Result<&str, BenchError> {
    let name = input.trim();

    if name.is_empty() {
        return Err(BenchError::Malformed("Please provide a GPU model name.".to_string()));
    }

    if name.chars().count() > MAX_MODEL_NAME_LEN {
        return Err(BenchError::Malformed(format!("GPU model names can be at most {MAX_MODEL_NAME_LEN} characters long.")));
    }

    Ok(name)
}

/// Joins lines for an embed field, cutting off whatever doesn't fit.
pub fn field_list(lines: impl IntoIterator<Item = String>, empty: &str) -> String {
    let mut out = String::new();

    for line in lines {
        let needed = if out.is_empty() { line.len() } else { line.len() + 1 };
        if out.len() + needed > EMBED_FIELD_LIMIT - 4 {
            out.push_str("\n…");
            break;
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line);
    }

    if out.is_empty() {
        empty.to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_are_plain_digits() {
        assert_eq!(parse_score("12345"), Some(12345));
        assert_eq!(parse_score("0"), Some(0));
        assert_eq!(parse_score("007"), Some(7));

        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("-5"), None);
        assert_eq!(parse_score("+5"), None);
        assert_eq!(parse_score("12.5"), None);
        assert_eq!(parse_score(" 12"), None);
        assert_eq!(parse_score("12k"), None);
        assert_eq!(parse_score("²"), None);
        assert_eq!(parse_score("99999999999999999999"), None);
    }

    #[test]
    fn channel_refs() {
        assert_eq!(parse_channel_ref("<#123>"), Some(ChannelId::new(123)));
        assert_eq!(parse_channel_ref(" 456 "), Some(ChannelId::new(456)));
        assert_eq!(parse_channel_ref("<@&123>"), None);
        assert_eq!(parse_channel_ref("#general"), None);
        assert_eq!(parse_channel_ref("0"), None);
    }

    #[test]
    fn role_refs() {
        assert_eq!(parse_role_ref("<@&789>"), Some(RoleId::new(789)));
        assert_eq!(parse_role_ref("789"), Some(RoleId::new(789)));
        assert_eq!(parse_role_ref("<#789>"), None);
        assert_eq!(parse_role_ref("@Staff"), None);
    }

    #[test]
    fn model_names_are_trimmed_and_bounded() {
        assert_eq!(validate_model_name("  RTX 4090 ").unwrap(), "RTX 4090");
        assert!(matches!(validate_model_name("   "), Err(BenchError::Malformed(_))));
        assert!(matches!(validate_model_name(&"x".repeat(101)), Err(BenchError::Malformed(_))));
        assert!(validate_model_name(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn field_list_fits_in_an_embed() {
        assert_eq!(field_list(Vec::new(), "None"), "None");
        assert_eq!(field_list(vec!["a".to_string(), "b".to_string()], "None"), "a\nb");

        let long = field_list((0..500).map(|i| format!("model {i}")), "None");
        assert!(long.len() <= EMBED_FIELD_LIMIT);
        assert!(long.ends_with('…'));
    }
}
