use unicode_width::UnicodeWidthStr;

/// Reflows `text` into lines no wider than `width` display columns, breaking at
/// whitespace. A single word wider than `width` is kept whole on its own line.
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    for word in text.split_whitespace() {
        let word_width = word.width();
        if current.is_empty() {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        if current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_width;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::wrap_text;
    use unicode_width::UnicodeWidthStr;

    fn words(count: usize) -> String {
        (0..count)
            .map(|index| format!("w{:04}", index))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn long_log_line_spans_several_lines() {
        let line = words(50);
        assert_eq!(line.len(), 299);

        let wrapped = wrap_text(&line, 150);
        assert!(wrapped.lines().count() >= 2);
        assert!(wrapped.lines().all(|part| part.width() <= 150));
    }

    #[test]
    fn rewrapping_is_stable() {
        let line = words(80);
        let once = wrap_text(&line, 150);
        assert_eq!(wrap_text(&once, 150), once);
    }

    #[test]
    fn short_line_is_unchanged() {
        assert_eq!(wrap_text("GET /healthz 200", 150), "GET /healthz 200");
    }

    #[test]
    fn oversized_token_stays_whole() {
        let token = "x".repeat(20);
        let wrapped = wrap_text(&format!("a {token} b"), 10);
        assert_eq!(wrapped, format!("a\n{token}\nb"));
    }

    #[test]
    fn runs_of_whitespace_collapse() {
        assert_eq!(wrap_text("level=info \t  msg=ready", 150), "level=info msg=ready");
        assert_eq!(wrap_text("", 150), "");
    }

    #[test]
    fn wide_glyphs_count_as_two_columns() {
        assert_eq!(wrap_text("日本 語", 4), "日本\n語");
    }
}
