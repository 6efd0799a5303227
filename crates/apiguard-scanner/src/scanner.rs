//! Syntax-aware extraction of remote-procedure call sites

use crate::convention::CallConvention;
use crate::error::ScanError;
use crate::language::{script_blocks, ScriptBlock, SourceLanguage};
use crate::site::{CallOccurrence, CallSite, FileScan, UnanalyzableCall, UnanalyzableReason};
use apiguard_registry::{ApiConfig, DEFAULT_MARKERS, DEFAULT_REGISTRY_MODULE};
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

const SNIPPET_CHARS: usize = 80;

/// Extracts call sites for one calling convention
///
/// Stateless across files; one instance can be shared by worker threads.
/// Each scan builds its own tree-sitter parser.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    convention: CallConvention,
    reference: Regex,
    registry_module: String,
    markers: HashSet<String>,
}

impl SourceScanner {
    /// Create scanner with the default registry markers
    ///
    /// # Errors
    /// Returns [`ScanError::InvalidIdentifier`] if the convention's
    /// identifier cannot be searched for
    pub fn new(convention: CallConvention) -> Result<Self, ScanError> {
        let ident = convention.identifier();
        let pattern = format!(
            r"(?:^|[^A-Za-z0-9_$]){}(?:$|[^A-Za-z0-9_$])",
            regex::escape(ident)
        );
        let reference =
            Regex::new(&pattern).map_err(|_| ScanError::InvalidIdentifier(ident.to_string()))?;
        Ok(Self {
            convention,
            reference,
            registry_module: DEFAULT_REGISTRY_MODULE.to_string(),
            markers: DEFAULT_MARKERS.iter().map(|m| (*m).to_string()).collect(),
        })
    }

    /// Create scanner using the registry module and markers from `config`
    ///
    /// # Errors
    /// See [`SourceScanner::new`]
    pub fn for_config(convention: CallConvention, config: &ApiConfig) -> Result<Self, ScanError> {
        Ok(Self::new(convention)?
            .with_registry_markers(config.registry_module(), config.markers().iter().cloned()))
    }

    /// Replace registry-usage markers
    #[must_use]
    pub fn with_registry_markers<I, S>(mut self, module: impl Into<String>, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry_module = module.into();
        self.markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Calling convention
    #[inline]
    #[must_use]
    pub fn convention(&self) -> &CallConvention {
        &self.convention
    }

    /// Whether `source` mentions the convention's identifier as a word
    #[must_use]
    pub fn references_object(&self, source: &str) -> bool {
        self.reference.is_match(source)
    }

    /// Scan one file's text
    ///
    /// Call sites are deduplicated by `(method, argument_count)`, keeping
    /// the first occurrence in source order.
    ///
    /// # Errors
    /// Returns error if the extension has no grammar or parsing fails
    pub fn scan(&self, path: &Path, source: &str) -> Result<FileScan, ScanError> {
        if !self.references_object(source) {
            tracing::trace!(
                "Skipping {}: no reference to {}",
                path.display(),
                self.convention.identifier()
            );
            return Ok(FileScan::unreferenced(path));
        }

        let analysis = self.analyze(path, source)?;
        let mut seen = HashSet::new();
        let call_sites: Vec<CallSite> = analysis
            .occurrences
            .into_iter()
            .map(|occurrence| occurrence.site)
            .filter(|site| seen.insert((site.method.clone(), site.argument_count)))
            .collect();

        tracing::debug!(
            "Scanned {}: {} call sites, {} unanalyzable",
            path.display(),
            call_sites.len(),
            analysis.unanalyzable.len()
        );

        Ok(FileScan {
            path: path.to_path_buf(),
            call_sites,
            unanalyzable: analysis.unanalyzable,
            references_object: true,
            references_registry: analysis.references_registry,
            has_syntax_errors: analysis.has_syntax_errors,
        })
    }

    /// Read and scan a file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not UTF-8, or cannot
    /// be parsed
    pub fn scan_file(&self, path: &Path) -> Result<FileScan, ScanError> {
        let source = read_source(path)?;
        self.scan(path, &source)
    }

    /// Every call occurrence in source order, without dedup
    ///
    /// # Errors
    /// Returns error if the extension has no grammar or parsing fails
    pub fn occurrences(&self, path: &Path, source: &str) -> Result<Vec<CallOccurrence>, ScanError> {
        if !self.references_object(source) {
            return Ok(Vec::new());
        }
        Ok(self.analyze(path, source)?.occurrences)
    }

    /// Whether a module specifier names the registry module
    fn imports_registry(&self, specifier: &str) -> bool {
        !self.registry_module.is_empty() && specifier.contains(self.registry_module.as_str())
    }

    fn analyze(&self, path: &Path, source: &str) -> Result<Analysis, ScanError> {
        let language = SourceLanguage::from_path(path)
            .ok_or_else(|| ScanError::UnsupportedExtension(path.to_path_buf()))?;

        let mut parser = Parser::new();
        let mut analysis = Analysis::default();
        for block in script_blocks(source, language) {
            parser
                .set_language(&block.language.grammar())
                .map_err(|e| ScanError::ParserInit(e.to_string()))?;
            let tree = parser
                .parse(block.text, None)
                .ok_or_else(|| ScanError::ParseFailed(path.to_path_buf()))?;
            if tree.root_node().has_error() {
                tracing::debug!(
                    "Syntax errors in {}; continuing with partial tree",
                    path.display()
                );
                analysis.has_syntax_errors = true;
            }
            let ctx = BlockContext { path, block: &block };
            self.walk(&tree, &ctx, &mut analysis);
        }
        Ok(analysis)
    }

    fn walk(&self, tree: &Tree, ctx: &BlockContext<'_>, out: &mut Analysis) {
        let mut cursor = tree.walk();
        loop {
            let node = cursor.node();
            match node.kind() {
                "call_expression" => self.visit_call(node, ctx, out),
                "import_statement" | "export_statement" => {
                    if let Some(source) = node.child_by_field_name("source") {
                        if self.imports_registry(ctx.text(source)) {
                            out.references_registry = true;
                        }
                    }
                }
                "identifier" | "property_identifier" | "shorthand_property_identifier" => {
                    if self.markers.contains(ctx.text(node)) {
                        out.references_registry = true;
                    }
                }
                _ => {}
            }

            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
    }

    fn visit_call(&self, call: Node<'_>, ctx: &BlockContext<'_>, out: &mut Analysis) {
        let (Some(function), Some(arguments)) = (
            call.child_by_field_name("function"),
            call.child_by_field_name("arguments"),
        ) else {
            return;
        };
        // Tagged templates carry a template_string instead of arguments
        if arguments.kind() != "arguments" {
            return;
        }
        let args = argument_nodes(arguments);

        let is_loader = function.kind() == "import"
            || (function.kind() == "identifier" && ctx.text(function) == "require");
        if is_loader {
            if let Some(first) = args.first() {
                if first.kind() == "string" && self.imports_registry(ctx.text(*first)) {
                    out.references_registry = true;
                }
            }
        }

        match &self.convention {
            CallConvention::Member { object } => {
                member_call(object, call, function, args.len(), ctx, out);
            }
            CallConvention::Wrapper { function: wrapper } => {
                if function.kind() != "identifier" || ctx.text(function) != wrapper {
                    return;
                }
                match args.first() {
                    None => out.unanalyzable.push(ctx.unanalyzable(
                        call,
                        function,
                        UnanalyzableReason::MissingName,
                    )),
                    Some(first) => match literal_name(*first, ctx) {
                        Some((name, span)) => out.push(ctx, call, name, args.len(), span),
                        None => out.unanalyzable.push(ctx.unanalyzable(
                            call,
                            function,
                            UnanalyzableReason::NonLiteralName,
                        )),
                    },
                }
            }
        }
    }
}

/// Match `object.method(...)` and `object['method'](...)`
fn member_call(
    object: &str,
    call: Node<'_>,
    function: Node<'_>,
    argument_count: usize,
    ctx: &BlockContext<'_>,
    out: &mut Analysis,
) {
    let Some(target) = function.child_by_field_name("object") else {
        return;
    };
    if target.kind() != "identifier" || ctx.text(target) != object {
        return;
    }

    match function.kind() {
        "member_expression" => {
            let Some(property) = function.child_by_field_name("property") else {
                return;
            };
            // `api.#private` is never a remote call
            if property.kind() != "property_identifier" {
                return;
            }
            out.push(ctx, call, ctx.text(property), argument_count, property.byte_range());
        }
        "subscript_expression" => {
            let literal = function
                .child_by_field_name("index")
                .and_then(|index| literal_name(index, ctx));
            match literal {
                Some((name, span)) => out.push(ctx, call, name, argument_count, span),
                None => out.unanalyzable.push(ctx.unanalyzable(
                    call,
                    function,
                    UnanalyzableReason::ComputedMember,
                )),
            }
        }
        _ => {}
    }
}

/// Read a source file as UTF-8
///
/// # Errors
/// Returns [`ScanError::Io`] or [`ScanError::NotUtf8`]
pub fn read_source(path: &Path) -> Result<String, ScanError> {
    let bytes = std::fs::read(path).map_err(|e| ScanError::io_error(path, e))?;
    String::from_utf8(bytes).map_err(|_| ScanError::NotUtf8(path.to_path_buf()))
}

#[derive(Debug, Default)]
struct Analysis {
    occurrences: Vec<CallOccurrence>,
    unanalyzable: Vec<UnanalyzableCall>,
    references_registry: bool,
    has_syntax_errors: bool,
}

impl Analysis {
    fn push(
        &mut self,
        ctx: &BlockContext<'_>,
        call: Node<'_>,
        method: &str,
        argument_count: usize,
        span: Range<usize>,
    ) {
        self.occurrences.push(CallOccurrence {
            site: CallSite {
                method: method.to_string(),
                argument_count,
                file_path: ctx.path.to_path_buf(),
                line: Some(ctx.line(call)),
            },
            method_span: ctx.shift(span),
        });
    }
}

struct BlockContext<'a> {
    path: &'a Path,
    block: &'a ScriptBlock<'a>,
}

impl BlockContext<'_> {
    fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.block.text.as_bytes()).unwrap_or("")
    }

    fn line(&self, node: Node<'_>) -> usize {
        node.start_position().row + 1 + self.block.line_offset
    }

    fn shift(&self, span: Range<usize>) -> Range<usize> {
        span.start + self.block.byte_offset..span.end + self.block.byte_offset
    }

    fn unanalyzable(
        &self,
        call: Node<'_>,
        callee: Node<'_>,
        reason: UnanalyzableReason,
    ) -> UnanalyzableCall {
        UnanalyzableCall {
            file_path: self.path.to_path_buf(),
            line: self.line(call),
            snippet: self.text(callee).chars().take(SNIPPET_CHARS).collect(),
            reason,
        }
    }
}

/// Named, non-comment children of an `arguments` node
fn argument_nodes(arguments: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|node| !node.is_extra() && node.kind() != "comment")
        .collect()
}

/// Text and block-relative span of a plain string or template literal
fn literal_name<'s>(node: Node<'_>, ctx: &'s BlockContext<'_>) -> Option<(&'s str, Range<usize>)> {
    match node.kind() {
        "string" => {}
        "template_string" => {
            let mut cursor = node.walk();
            let interpolated = node
                .named_children(&mut cursor)
                .any(|child| child.kind() == "template_substitution");
            if interpolated {
                return None;
            }
        }
        _ => return None,
    }
    let range = node.byte_range();
    if range.len() < 3 {
        return None;
    }
    let inner = range.start + 1..range.end - 1;
    let name = ctx.block.text.get(inner.clone())?;
    Some((name, inner))
}
