//! Pluggable per-file-type content extraction.
//!
//! The store dispatches on file extension to a registered
//! [`ContentExtractor`]; new file types are supported by registering a new
//! implementation, never by editing store logic. Markdown and Python
//! extractors ship by default.

use regex::Regex;

use crate::error::Result;

/// What an extractor pulls out of a raw file.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

/// Capability contract for file-type-specific extraction.
pub trait ContentExtractor: Send + Sync {
    /// Extract `(title, body, tags)` from raw file text.
    fn extract_content(&self, raw: &str) -> Result<Extracted>;

    /// Extensions (without the dot, lowercase) this extractor handles.
    fn supported_extensions(&self) -> &'static [&'static str];
}

/// Markdown extractor: first ATX heading as title, `tags:`/`#` labels as tags.
pub struct MarkdownExtractor {
    heading: Regex,
    tag: Regex,
}

impl MarkdownExtractor {
    pub fn new() -> Self {
        Self {
            heading: Regex::new(r"(?m)^#\s+(.+)$").expect("valid heading regex"),
            tag: Regex::new(r"(?:tags:|#)([A-Za-z0-9_\-]+)").expect("valid tag regex"),
        }
    }
}

impl Default for MarkdownExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for MarkdownExtractor {
    fn extract_content(&self, raw: &str) -> Result<Extracted> {
        let title = self
            .heading
            .captures(raw)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_else(|| "Untitled".to_string());

        let tags = self
            .tag
            .captures_iter(raw)
            .map(|c| c[1].to_string())
            .collect();

        Ok(Extracted {
            title,
            body: raw.to_string(),
            tags,
        })
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }
}

/// Python extractor: module docstring first line as title, `def`/`class`
/// names as tags.
pub struct PythonExtractor {
    docstring: Regex,
    symbol: Regex,
}

impl PythonExtractor {
    pub fn new() -> Self {
        Self {
            docstring: Regex::new(r#"(?s)"""(.+?)""""#).expect("valid docstring regex"),
            symbol: Regex::new(r"(?:def|class)\s+([A-Za-z0-9_]+)").expect("valid symbol regex"),
        }
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for PythonExtractor {
    fn extract_content(&self, raw: &str) -> Result<Extracted> {
        let title = self
            .docstring
            .captures(raw)
            .and_then(|c| {
                let first_line = c[1].trim().lines().next()?.trim().to_string();
                (!first_line.is_empty()).then_some(first_line)
            })
            .unwrap_or_else(|| "Python Module".to_string());

        let tags = self
            .symbol
            .captures_iter(raw)
            .map(|c| c[1].to_string())
            .collect();

        Ok(Extracted {
            title,
            body: raw.to_string(),
            tags,
        })
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_title_from_first_heading() {
        let md = "intro text\n\n# Getting Started\n\n## Details\nbody";
        let extracted = MarkdownExtractor::new().extract_content(md).unwrap();
        assert_eq!(extracted.title, "Getting Started");
        assert_eq!(extracted.body, md);
    }

    #[test]
    fn markdown_without_heading_is_untitled() {
        let extracted = MarkdownExtractor::new()
            .extract_content("just a paragraph")
            .unwrap();
        assert_eq!(extracted.title, "Untitled");
    }

    #[test]
    fn markdown_tags_from_hash_and_tags_prefix() {
        let md = "# T\n\ntags:setup some #rust notes #async-io";
        let extracted = MarkdownExtractor::new().extract_content(md).unwrap();
        assert!(extracted.tags.contains(&"setup".to_string()));
        assert!(extracted.tags.contains(&"rust".to_string()));
        assert!(extracted.tags.contains(&"async-io".to_string()));
    }

    #[test]
    fn python_title_from_docstring_first_line() {
        let py = "\"\"\"Embedding helpers.\n\nMore detail.\n\"\"\"\n\ndef embed(x):\n    pass\n";
        let extracted = PythonExtractor::new().extract_content(py).unwrap();
        assert_eq!(extracted.title, "Embedding helpers.");
        assert_eq!(extracted.tags, vec!["embed".to_string()]);
    }

    #[test]
    fn python_without_docstring_gets_default_title() {
        let py = "class Ring:\n    def push(self):\n        pass\n";
        let extracted = PythonExtractor::new().extract_content(py).unwrap();
        assert_eq!(extracted.title, "Python Module");
        assert_eq!(
            extracted.tags,
            vec!["Ring".to_string(), "push".to_string()]
        );
    }

    #[test]
    fn extensions_are_lowercase_without_dot() {
        assert_eq!(MarkdownExtractor::new().supported_extensions(), &["md", "markdown"]);
        assert_eq!(PythonExtractor::new().supported_extensions(), &["py"]);
    }
}
