//! Relative-link resolution between rendered documents.
//!
//! Rendered documents live in a `{language}/{framework}/{...dirs}/{item}.md`
//! tree, so linking from one document to another means computing the right
//! number of `../` hops plus the descent into the target's directory. The
//! resolver also handles the two awkward cases real corpora are full of:
//! the target living in a *different framework* (one extra hop to leave the
//! source framework's directory) and the target existing only in the *other
//! natural language* (two extra hops to leave the language root as well).
//!
//! The resolver is a total function. Malformed and legacy reference shapes
//! are everywhere in old archives, and a best-effort guess beats an aborted
//! conversion, so every branch has a defined fallback down to
//! `./{title}.md`.

use std::collections::HashMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::key::{self, Language};
use crate::{Error, Result};

/// Longest file stem the sanitizer will produce.
pub const MAX_STEM_LEN: usize = 64;

/// Capitalized display names for well-known frameworks.
///
/// Presentation only: directory components always come from the sanitized
/// lower-case URL segment so links agree with written output paths.
static FRAMEWORK_DISPLAY_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("accelerate", "Accelerate"),
        ("appkit", "AppKit"),
        ("avfoundation", "AVFoundation"),
        ("cloudkit", "CloudKit"),
        ("combine", "Combine"),
        ("coreanimation", "Core Animation"),
        ("coreaudio", "Core Audio"),
        ("coredata", "Core Data"),
        ("coregraphics", "Core Graphics"),
        ("coreimage", "Core Image"),
        ("corelocation", "Core Location"),
        ("coreml", "Core ML"),
        ("dispatch", "Dispatch"),
        ("foundation", "Foundation"),
        ("gameplaykit", "GameplayKit"),
        ("healthkit", "HealthKit"),
        ("homekit", "HomeKit"),
        ("mapkit", "MapKit"),
        ("metal", "Metal"),
        ("naturallanguage", "Natural Language"),
        ("objectivec", "Objective-C Runtime"),
        ("os", "os"),
        ("scenekit", "SceneKit"),
        ("security", "Security"),
        ("spritekit", "SpriteKit"),
        ("storekit", "StoreKit"),
        ("swiftui", "SwiftUI"),
        ("uikit", "UIKit"),
        ("webkit", "WebKit"),
        ("xctest", "XCTest"),
    ])
});

/// Per-document resolver state: where the document being rendered lives.
///
/// Threaded explicitly through rendering rather than stored as shared
/// mutable state, so concurrent rendering of independent documents is safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    /// Natural language of the source document.
    pub language: Language,
    /// Framework directory segment (lower-case URL form).
    pub framework: String,
    /// Path segments below the framework, the last being the document's
    /// own file stem. Empty for a framework root page.
    pub path_segments: Vec<String>,
}

impl SourceContext {
    /// Derive the context from the request key currently being rendered.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeyFormat`] when the key's language prefix is
    /// unrecognized.
    pub fn from_request_key(request_key: &str) -> Result<Self> {
        let decoded = key::decode(request_key)?;
        let mut segments = decoded.canonical_path.split('/');
        let _documentation = segments.next();
        let framework = segments.next().unwrap_or_default().to_string();
        let path_segments = segments
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self {
            language: decoded.language,
            framework,
            path_segments,
        })
    }

    fn dir_segments(&self) -> &[String] {
        let dirs = self.path_segments.len().saturating_sub(1);
        &self.path_segments[..dirs]
    }
}

/// Set of natural languages a documentation path exists in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LanguageSet(u8);

impl LanguageSet {
    const fn bit(language: Language) -> u8 {
        match language {
            Language::Swift => 0b01,
            Language::ObjectiveC => 0b10,
        }
    }

    /// Add a language to the set.
    pub const fn insert(&mut self, language: Language) {
        self.0 |= Self::bit(language);
    }

    /// Whether the set contains a language.
    #[must_use]
    pub const fn contains(self, language: Language) -> bool {
        self.0 & Self::bit(language) != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Which natural languages each normalized documentation path exists in.
///
/// Built once per conversion run from the full entry catalogue, read-only
/// during rendering. Keys are canonical lower-case paths of the form
/// `documentation/{framework}/{...}`.
#[derive(Debug, Default)]
pub struct LanguageIndex {
    paths: HashMap<String, LanguageSet>,
}

impl LanguageIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request key's path and language.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeyFormat`] for an unrecognized language prefix.
    pub fn insert_key(&mut self, request_key: &str) -> Result<()> {
        let decoded = key::decode(request_key)?;
        self.paths
            .entry(decoded.canonical_path)
            .or_default()
            .insert(decoded.language);
        Ok(())
    }

    /// Build an index from an entry catalogue, skipping malformed keys.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::new();
        for request_key in keys {
            if index.insert_key(request_key).is_err() {
                warn!(request_key, "skipping malformed key in language index");
            }
        }
        index
    }

    /// Languages the normalized path is available in, if known.
    #[must_use]
    pub fn languages_for(&self, normalized_path: &str) -> Option<LanguageSet> {
        self.paths.get(normalized_path).copied()
    }

    /// Number of distinct paths indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the index holds no paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Sanitize a display name or URL segment into a file stem.
///
/// Method signatures collapse to flat names (`init(frame:)` becomes
/// `init_frame`), everything is case-folded, characters outside
/// `[a-z0-9_-]` become `_`, runs collapse, ends are trimmed, and the result
/// is capped at [`MAX_STEM_LEN`] characters. An empty result becomes
/// `unnamed`.
///
/// This function is shared between output-path computation and link
/// resolution; the two must agree or links silently break.
#[must_use]
pub fn sanitize_file_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len().min(MAX_STEM_LEN));
    let mut pending_separator = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        let keep = c.is_ascii_alphanumeric() || c == '-';
        if keep || c == '_' {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = c == '_';
            if !pending_separator {
                out.push(c);
            }
            continue;
        }
        pending_separator = true;
    }
    out.truncate(MAX_STEM_LEN);
    while out.ends_with(['_', '-']) {
        out.pop();
    }
    if out.is_empty() {
        return "unnamed".to_string();
    }
    out
}

/// Capitalized display name for a framework URL segment.
///
/// Well-known frameworks come from a fixed table; anything else gets its
/// first letter upper-cased.
#[must_use]
pub fn framework_display_name(segment: &str) -> String {
    let lower = segment.to_ascii_lowercase();
    if let Some(name) = FRAMEWORK_DISPLAY_NAMES.get(lower.as_str()) {
        return (*name).to_string();
    }
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => lower,
    }
}

/// Relative output path for a request key's rendered document:
/// `{language}/{framework}/{...dirs}/{stem}.md`, with framework root pages
/// written as `_index.md`.
///
/// # Errors
///
/// [`Error::InvalidKeyFormat`] for an unrecognized language prefix or a key
/// outside the `documentation/` tree.
pub fn document_relative_path(request_key: &str) -> Result<PathBuf> {
    let context = SourceContext::from_request_key(request_key)?;
    if context.framework.is_empty() {
        return Err(Error::InvalidKeyFormat(request_key.to_string()));
    }

    let mut path = PathBuf::from(context.language.dir_name());
    path.push(sanitize_file_stem(&context.framework));
    for dir in context.dir_segments() {
        path.push(sanitize_file_stem(dir));
    }
    match context.path_segments.last() {
        Some(stem) => path.push(format!("{}.md", sanitize_file_stem(stem))),
        None => path.push("_index.md"),
    }
    Ok(path)
}

struct TargetPath {
    framework: String,
    segments: Vec<String>,
}

impl TargetPath {
    fn dir_segments(&self) -> &[String] {
        let dirs = self.segments.len().saturating_sub(1);
        &self.segments[..dirs]
    }

    fn file_name(&self) -> String {
        match self.segments.last() {
            Some(stem) => format!("{}.md", sanitize_file_stem(stem)),
            None => "_index.md".to_string(),
        }
    }

    fn normalized(&self) -> String {
        let mut normalized = format!("documentation/{}", self.framework);
        for segment in &self.segments {
            normalized.push('/');
            normalized.push_str(segment);
        }
        normalized
    }
}

fn is_external(url: &str) -> bool {
    url.contains(".html") || (url.contains("://") && !url.starts_with("doc://"))
}

fn parse_target_url(url: &str) -> Option<TargetPath> {
    let path = url.split(['#', '?']).next().unwrap_or(url);
    let lower = path.to_ascii_lowercase();
    let (_, rest) = lower.split_once("/documentation/")?;
    let mut segments: Vec<String> = rest
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.is_empty() {
        return None;
    }
    let framework = segments.remove(0);
    Some(TargetPath {
        framework,
        segments,
    })
}

fn join_relative(ups: usize, descend: Vec<String>) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(ups + descend.len());
    for _ in 0..ups {
        parts.push("..".to_string());
    }
    parts.extend(descend);
    if ups == 0 {
        format!("./{}", parts.join("/"))
    } else {
        parts.join("/")
    }
}

fn common_prefix_len(a: &[String], b: &[String]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Compute the relative markdown link from a source document to a target
/// reference URL.
///
/// Returns `None` only for external targets (rendered as plain text
/// upstream); every other shape resolves to a best-effort relative path.
/// With no source context the path is built purely from target segments.
#[must_use]
pub fn resolve_link(
    target_url: &str,
    target_title: &str,
    source: Option<&SourceContext>,
    language_index: &LanguageIndex,
) -> Option<String> {
    if is_external(target_url) {
        return None;
    }

    let Some(target) = parse_target_url(target_url) else {
        return Some(format!("./{}.md", sanitize_file_stem(target_title)));
    };

    let Some(source) = source else {
        let mut descend: Vec<String> = target
            .dir_segments()
            .iter()
            .map(|s| sanitize_file_stem(s))
            .collect();
        descend.push(target.file_name());
        return Some(join_relative(0, descend));
    };

    // Language selection: stay in the source language unless the catalogue
    // says the target only exists in the other one.
    let target_language = match language_index.languages_for(&target.normalized()) {
        Some(set) if !set.is_empty() && !set.contains(source.language) => source.language.other(),
        _ => source.language,
    };

    let source_dirs = source.dir_segments();

    if target_language == source.language && target.framework == source.framework {
        let target_dirs = target.dir_segments();
        let common = common_prefix_len(source_dirs, target_dirs);
        let mut descend: Vec<String> = target_dirs[common..]
            .iter()
            .map(|s| sanitize_file_stem(s))
            .collect();
        descend.push(target.file_name());
        return Some(join_relative(source_dirs.len() - common, descend));
    }

    let mut descend: Vec<String> = Vec::with_capacity(target.segments.len() + 2);
    let ups = if target_language == source.language {
        // Different framework: one extra hop to leave the source framework.
        source_dirs.len() + 1
    } else {
        // Different language: leave the framework and the language root.
        descend.push(target_language.dir_name().to_string());
        source_dirs.len() + 2
    };
    descend.push(sanitize_file_stem(&target.framework));
    for dir in target.dir_segments() {
        descend.push(sanitize_file_stem(dir));
    }
    descend.push(target.file_name());
    Some(join_relative(ups, descend))
}
