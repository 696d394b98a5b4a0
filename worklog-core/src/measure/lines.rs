//! Line counting for save snapshots.
//!
//! Counts the lines that carry code: blank lines are skipped, and lines
//! that start with the language's comment markers are skipped. This is a
//! heuristic, not a parser; a trailing comment on a code line still counts
//! the line.

/// Comment-line prefixes per language (lowercased language name)
fn comment_prefixes(language: &str) -> &'static [&'static str] {
    match language.to_ascii_lowercase().as_str() {
        "typescript" | "javascript" | "java" | "c" | "c++" | "c/c++" | "go" | "rust" | "c#"
        | "kotlin" | "scala" | "swift" | "dart" | "php" => &["//", "/*", "*", "*/"],
        "python" | "yaml" | "shell" | "bash" | "zsh" | "fish" | "ruby" | "perl" | "toml"
        | "r" => &["#"],
        "html" | "xml" | "markdown" => &["<!--", "-->"],
        "css" | "scss" | "sass" | "less" => &["/*", "*", "*/"],
        "sql" | "lua" | "haskell" => &["--"],
        "json" => &["//"],
        _ => &[],
    }
}

/// Count the non-blank, non-comment lines of a file's text.
pub fn count_lines(text: &str, language: Option<&str>) -> i64 {
    let prefixes = language.map(comment_prefixes).unwrap_or(&[]);

    let mut count = 0;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if prefixes.iter().any(|p| trimmed.starts_with(p)) {
            continue;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_excluded() {
        let text = "fn main() {\n\n    println!(\"hi\");\n\n}\n";
        assert_eq!(count_lines(text, Some("Rust")), 3);
    }

    #[test]
    fn test_comment_lines_excluded() {
        let text = "// header\nfn main() {\n    // inner\n    work();\n}\n";
        assert_eq!(count_lines(text, Some("Rust")), 3);
    }

    #[test]
    fn test_python_hash_comments() {
        let text = "# module doc\nimport os\n\n# helper\ndef f():\n    pass\n";
        assert_eq!(count_lines(text, Some("Python")), 3);
    }

    #[test]
    fn test_unknown_language_counts_everything_non_blank() {
        let text = "// looks like a comment\nbut language is unknown\n";
        assert_eq!(count_lines(text, None), 2);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(count_lines("", Some("Rust")), 0);
    }
}
