/// Format a channel mention
pub fn mention_channel(channel_id: u64) -> String {
    format!("<#{}>", channel_id)
}

/// Truncate a string to at most `max_chars` characters, adding ellipsis if needed
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_channel() {
        assert_eq!(mention_channel(123), "<#123>");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("お知らせ", 4), "お知らせ");
        assert_eq!(truncate("お知らせです", 5), "お知...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }
}
