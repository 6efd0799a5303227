//! Source languages and script-block extraction

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid script block pattern")
});

static SCRIPT_LANG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\blang\s*=\s*["']?(tsx|ts|typescript)\b"#).expect("valid script lang pattern")
});

/// Source languages the scanner understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    /// JavaScript, including JSX
    JavaScript,
    /// TypeScript without JSX
    TypeScript,
    /// TypeScript with JSX
    Tsx,
    /// Vue single-file component
    Vue,
}

impl SourceLanguage {
    /// Detect language from file extension
    #[inline]
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "vue" => Some(Self::Vue),
            _ => None,
        }
    }

    /// Detect language from path
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Get file extensions for this language
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::TypeScript => &["ts", "mts", "cts"],
            Self::Tsx => &["tsx"],
            Self::Vue => &["vue"],
        }
    }

    /// Get human-readable name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Vue => "vue",
        }
    }

    /// Tree-sitter grammar for script text in this language
    ///
    /// JavaScript is parsed with the TSX grammar, which accepts plain
    /// JavaScript and JSX. Vue files are split into script blocks first; the
    /// grammar returned here is the one used for a block without `lang`.
    #[must_use]
    pub fn grammar(&self) -> tree_sitter::Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::JavaScript | Self::Tsx | Self::Vue => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl std::fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A region of a file holding script text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptBlock<'a> {
    /// Script text
    pub text: &'a str,
    /// Byte offset of `text` in the whole file
    pub byte_offset: usize,
    /// Number of lines before `text` in the whole file
    pub line_offset: usize,
    /// Language the block is parsed as
    pub language: SourceLanguage,
}

/// Split a file into script blocks
///
/// Non-Vue files are a single block. Vue files yield one block per
/// `<script>` element; template and style sections are ignored.
#[must_use]
pub fn script_blocks(source: &str, language: SourceLanguage) -> Vec<ScriptBlock<'_>> {
    if language != SourceLanguage::Vue {
        return vec![ScriptBlock {
            text: source,
            byte_offset: 0,
            line_offset: 0,
            language,
        }];
    }

    SCRIPT_BLOCK
        .captures_iter(source)
        .filter_map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2)?;
            if body.as_str().trim().is_empty() {
                return None;
            }
            let language = match SCRIPT_LANG.captures(attrs).and_then(|c| c.get(1)) {
                Some(m) if m.as_str().eq_ignore_ascii_case("tsx") => SourceLanguage::Tsx,
                Some(_) => SourceLanguage::TypeScript,
                None => SourceLanguage::JavaScript,
            };
            Some(ScriptBlock {
                text: body.as_str(),
                byte_offset: body.start(),
                line_offset: source[..body.start()].matches('\n').count(),
                language,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detect_from_extension() {
        assert_eq!(SourceLanguage::from_extension("js"), Some(SourceLanguage::JavaScript));
        assert_eq!(SourceLanguage::from_extension(".TS"), Some(SourceLanguage::TypeScript));
        assert_eq!(SourceLanguage::from_extension("tsx"), Some(SourceLanguage::Tsx));
        assert_eq!(SourceLanguage::from_extension("vue"), Some(SourceLanguage::Vue));
        assert_eq!(SourceLanguage::from_extension("rs"), None);
        assert_eq!(
            SourceLanguage::from_path(Path::new("src/views/Paper.vue")),
            Some(SourceLanguage::Vue)
        );
        assert_eq!(SourceLanguage::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn plain_file_is_one_block() {
        let blocks = script_blocks("api.getTagList()", SourceLanguage::JavaScript);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].byte_offset, 0);
        assert_eq!(blocks[0].line_offset, 0);
    }

    #[test]
    fn vue_blocks_carry_offsets() {
        let source = concat!(
            "<template>\n  <div>{{ api.fake() }}</div>\n</template>\n",
            "<script>\nexport default {}\n</script>\n",
            "<script setup lang=\"ts\">\nconst a: number = 1\n</script>\n",
        );
        let blocks = script_blocks(source, SourceLanguage::Vue);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].language, SourceLanguage::JavaScript);
        assert_eq!(blocks[0].line_offset, 3);
        assert!(blocks[0].text.contains("export default"));
        assert_eq!(&source[blocks[0].byte_offset..][..blocks[0].text.len()], blocks[0].text);

        assert_eq!(blocks[1].language, SourceLanguage::TypeScript);
        assert_eq!(blocks[1].line_offset, 6);
    }

    #[test]
    fn vue_without_script_has_no_blocks() {
        let blocks = script_blocks(
            "<template><p/></template>\n<script src=\"./x.js\"></script>",
            SourceLanguage::Vue,
        );
        assert!(blocks.is_empty());
    }
}
