const ELLIPSIS: &str = "...";

/// Shortens `s` to at most `max_chars` characters by cutting out the middle and replacing it with an ellipsis, e.g.
/// `"Introduction...Physics"`. Strings that already fit are returned unchanged.
pub fn middle_truncate(s: &str, max_chars: usize) -> String {
    let len = s.chars().count();
    if len <= max_chars {
        return s.to_string();
    }
    let ellipsis_len = ELLIPSIS.chars().count();
    if max_chars <= ellipsis_len + 1 {
        return s.chars().take(max_chars).collect();
    }
    let keep = max_chars - ellipsis_len;
    let start = keep - keep / 2;
    let end = keep / 2;
    let head = s.chars().take(start).collect::<String>();
    let tail = s.chars().skip(len - end).collect::<String>();
    format!("{head}{ELLIPSIS}{tail}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_strings_are_unchanged() {
        assert_eq!(middle_truncate("Physics 101", 127), "Physics 101");
        assert_eq!(middle_truncate("", 10), "");
        assert_eq!(middle_truncate("abcdefghij", 10), "abcdefghij");
    }

    #[test]
    fn long_strings_lose_their_middle() {
        assert_eq!(middle_truncate("abcdefghijk", 10), "abcd...ijk");
        assert_eq!(middle_truncate("abcdefghijkl", 9), "abc...jkl");
        let title = "A".repeat(100) + &"B".repeat(100);
        let truncated = middle_truncate(&title, 127);
        assert_eq!(truncated.chars().count(), 127);
        assert!(truncated.starts_with(&"A".repeat(62)));
        assert!(truncated.ends_with(&format!("...{}", "B".repeat(62))));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let title = "物理學導論".repeat(3);
        let truncated = middle_truncate(&title, 8);
        assert_eq!(truncated, "物理學...導論");
    }

    #[test]
    fn tiny_limits_hard_truncate() {
        assert_eq!(middle_truncate("abcdef", 3), "abc");
    }
}
