//! Extension-based language detection.
//!
//! A plain lookup table; snapshots store the detected name as-is and the
//! aggregator never interprets it beyond equality.

/// Extension (without dot, lowercase) to display-name mapping
const EXTENSION_TO_LANGUAGE: &[(&str, &str)] = &[
    // TypeScript / JavaScript
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("js", "JavaScript"),
    ("jsx", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    // Python
    ("py", "Python"),
    ("pyw", "Python"),
    ("pyi", "Python"),
    // Java / JVM
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("scala", "Scala"),
    ("clj", "Clojure"),
    // C / C++
    ("c", "C"),
    ("cpp", "C++"),
    ("cc", "C++"),
    ("cxx", "C++"),
    ("h", "C/C++"),
    ("hpp", "C++"),
    ("hxx", "C++"),
    // Go / Rust
    ("go", "Go"),
    ("rs", "Rust"),
    // Web
    ("html", "HTML"),
    ("htm", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("sass", "SASS"),
    ("less", "Less"),
    // Markup / Config
    ("xml", "XML"),
    ("json", "JSON"),
    ("yaml", "YAML"),
    ("yml", "YAML"),
    ("toml", "TOML"),
    ("md", "Markdown"),
    ("markdown", "Markdown"),
    // Shell
    ("sh", "Shell"),
    ("bash", "Bash"),
    ("zsh", "Zsh"),
    ("fish", "Fish"),
    // SQL
    ("sql", "SQL"),
    // Other
    ("php", "PHP"),
    ("rb", "Ruby"),
    ("swift", "Swift"),
    ("hs", "Haskell"),
    ("ml", "OCaml"),
    ("fs", "F#"),
    ("cs", "C#"),
    ("dart", "Dart"),
    ("lua", "Lua"),
    ("r", "R"),
    ("m", "Objective-C"),
    ("mm", "Objective-C++"),
    ("pl", "Perl"),
    ("pm", "Perl"),
    ("vim", "Vim Script"),
    ("ps1", "PowerShell"),
    ("psm1", "PowerShell"),
];

/// Detect a language from a file path's extension.
///
/// Returns `None` for unknown or missing extensions; snapshots with no
/// language are excluded from the ratio breakdown, not errors.
pub fn detect_language(file_path: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(file_path)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    EXTENSION_TO_LANGUAGE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_extensions() {
        assert_eq!(detect_language("src/main.rs"), Some("Rust"));
        assert_eq!(detect_language("/abs/path/app.TSX"), Some("TypeScript"));
        assert_eq!(detect_language("setup.py"), Some("Python"));
        assert_eq!(detect_language("Cargo.toml"), Some("TOML"));
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(detect_language("Makefile"), None);
        assert_eq!(detect_language("notes.xyz"), None);
        assert_eq!(detect_language(""), None);
    }
}
