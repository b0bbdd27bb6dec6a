//! Typed model of a documentation entry's JSON payload.
//!
//! The extracted byte range parses into a [`DocumentTree`]: metadata, an
//! abstract, content sections, topic/see-also/relationship groupings, a
//! reference table, and a breadcrumb hierarchy. Block and inline content is
//! a closed tagged union keyed by a `type` field; node kinds this crate does
//! not know about deserialize into an explicit `Unknown` variant and render
//! to nothing, so future archive formats degrade instead of failing.
//!
//! Every field is defaulted: real-world archives omit almost anything, and a
//! partial document is strictly preferable to an aborted conversion.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A parsed documentation entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentTree {
    /// Schema version marker; presence is part of the extractor's sanity check.
    pub schema_version: Option<SchemaVersion>,
    /// Title, role, modules, and platform availability.
    pub metadata: Option<Metadata>,
    /// Leading inline summary of the entry.
    #[serde(rename = "abstract")]
    pub abstract_content: Vec<Inline>,
    /// Declarations, prose, and parameter sections, each tagged by kind.
    pub primary_content_sections: Vec<ContentSection>,
    /// Curated groups of child entries.
    pub topic_sections: Vec<TopicSection>,
    /// Related-entry groups.
    pub see_also_sections: Vec<TopicSection>,
    /// Type relationships (inherits from, conforms to, ...).
    pub relationships_sections: Vec<TopicSection>,
    /// Map from identifier to a displayable, linkable target description.
    pub references: BTreeMap<String, Reference>,
    /// Breadcrumb paths from root to this entry.
    pub hierarchy: Option<Hierarchy>,
}

/// Document schema version triple.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SchemaVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

/// Entry metadata: title, role, owning modules, platform availability.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    /// Display title; rendering falls back to "Untitled" when absent.
    pub title: Option<String>,
    /// Entry role (symbol, article, collection, ...); defaults to "unknown".
    pub role: Option<String>,
    /// Modules (frameworks) the entry belongs to.
    pub modules: Vec<Module>,
    /// Per-platform availability entries.
    pub platforms: Vec<Platform>,
}

/// A module (framework) owning an entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Module {
    /// Module display name.
    pub name: String,
}

/// Availability of an entry on one platform.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Platform {
    /// Platform display name.
    pub name: Option<String>,
    /// First version the entry appeared in.
    pub introduced_at: Option<String>,
    /// Whether the entry is deprecated on this platform.
    pub deprecated: bool,
    /// Whether the entry is in beta on this platform.
    pub beta: bool,
}

/// A primary content section, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentSection {
    /// Symbol declarations, possibly one per language.
    Declarations {
        /// The declaration variants.
        #[serde(default)]
        declarations: Vec<Declaration>,
    },
    /// Free-form prose blocks.
    Content {
        /// The section's block content.
        #[serde(default)]
        content: Vec<Block>,
    },
    /// Callable parameter descriptions.
    Parameters {
        /// The parameter list.
        #[serde(default)]
        parameters: Vec<Parameter>,
    },
    /// Any section kind this crate does not render.
    #[serde(other)]
    Unknown,
}

/// One declaration variant of a symbol.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Declaration {
    /// Languages this declaration applies to (e.g. "swift", "occ").
    pub languages: Vec<String>,
    /// Ordered declaration tokens; their texts concatenate to the full
    /// declaration, whitespace included.
    pub tokens: Vec<DeclarationToken>,
}

/// One token of a declaration's source text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeclarationToken {
    /// Literal token text.
    pub text: String,
}

/// A documented parameter of a callable symbol.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Description blocks.
    pub content: Vec<Block>,
}

/// A titled group of entry identifiers (topics, see-also, relationships).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TopicSection {
    /// Group title.
    pub title: Option<String>,
    /// Relationship kind for relationship sections (e.g. "inheritsFrom"),
    /// used as a title fallback.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Ordered identifiers, resolved through the reference table.
    pub identifiers: Vec<String>,
}

/// A linkable target description from the reference table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reference {
    /// The identifier this reference describes.
    pub identifier: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Target URL; absent or external URLs degrade to plain text.
    pub url: Option<String>,
    /// Reference kind (symbol, article, ...).
    pub kind: Option<String>,
    /// Reference type; "image" references carry variants instead of a URL.
    #[serde(rename = "type")]
    pub reference_type: Option<String>,
    /// Short inline summary of the target.
    #[serde(rename = "abstract")]
    pub abstract_content: Vec<Inline>,
    /// Alternative text for image references.
    pub alt: Option<String>,
    /// Whether a conforming type must implement the target.
    pub required: bool,
    /// Whether the target is deprecated.
    pub deprecated: bool,
    /// Whether the target is in beta.
    pub beta: bool,
    /// Image variants, first one wins when rendering.
    pub variants: Vec<ImageVariant>,
}

/// One renderable variant of an image reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageVariant {
    /// Variant URL.
    pub url: Option<String>,
    /// Trait tags (resolution, appearance).
    pub traits: Vec<String>,
}

/// Breadcrumb paths from root to the entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Hierarchy {
    /// Ordered ancestor identifier lists; the first path is rendered.
    pub paths: Vec<Vec<String>>,
}

/// Block-level content node.
///
/// Blocks nest: list items and table cells hold blocks, asides hold blocks.
/// Unknown kinds deserialize to [`Block::Unknown`] and render to nothing.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    /// Section heading.
    #[serde(rename_all = "camelCase")]
    Heading {
        /// Heading level from the source document; rendering clamps depth.
        #[serde(default)]
        level: u32,
        /// Heading text.
        #[serde(default)]
        text: String,
    },
    /// Paragraph of inline content.
    #[serde(rename_all = "camelCase")]
    Paragraph {
        /// Inline children.
        #[serde(default)]
        inline_content: Vec<Inline>,
    },
    /// Fenced code listing.
    #[serde(rename_all = "camelCase")]
    CodeListing {
        /// Declared syntax for the fence tag; absent means untagged.
        #[serde(default)]
        syntax: Option<String>,
        /// Code lines, joined by newlines when rendered.
        #[serde(default)]
        code: Vec<String>,
    },
    /// Callout rendered as a blockquote.
    #[serde(rename_all = "camelCase")]
    Aside {
        /// Aside style (note, warning, important, tip, experiment).
        #[serde(default)]
        style: Option<String>,
        /// Explicit display name overriding the style label.
        #[serde(default)]
        name: Option<String>,
        /// Inner block content.
        #[serde(default)]
        content: Vec<Block>,
    },
    /// Bulleted list.
    #[serde(rename_all = "camelCase")]
    UnorderedList {
        /// List items.
        #[serde(default)]
        items: Vec<ListItem>,
    },
    /// Numbered list.
    #[serde(rename_all = "camelCase")]
    OrderedList {
        /// List items.
        #[serde(default)]
        items: Vec<ListItem>,
        /// First item number; defaults to 1.
        #[serde(default)]
        start: Option<u64>,
    },
    /// Table; the first row is treated as the header.
    #[serde(rename_all = "camelCase")]
    Table {
        /// Rows of cells, each cell a list of blocks.
        #[serde(default)]
        rows: Vec<Vec<Vec<Block>>>,
    },
    /// Term/definition list.
    #[serde(rename_all = "camelCase")]
    TermList {
        /// Term/definition pairs.
        #[serde(default)]
        items: Vec<TermListItem>,
    },
    /// Any block kind this crate does not render.
    #[serde(other)]
    Unknown,
}

/// One item of an ordered or unordered list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListItem {
    /// Block content of the item.
    pub content: Vec<Block>,
}

/// One term/definition pair of a term list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TermListItem {
    /// The term.
    pub term: Option<Term>,
    /// The definition.
    pub definition: Option<Definition>,
}

/// A term's inline content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Term {
    /// Inline children.
    pub inline_content: Vec<Inline>,
}

/// A definition's block content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Definition {
    /// Block children.
    pub content: Vec<Block>,
}

/// Inline content node.
///
/// Unknown kinds deserialize to [`Inline::Unknown`] and render to nothing.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    /// Plain text.
    Text {
        /// The text.
        #[serde(default)]
        text: String,
    },
    /// Code voice, wrapped in backticks.
    CodeVoice {
        /// The code text.
        #[serde(default)]
        code: String,
    },
    /// Emphasized span.
    #[serde(rename_all = "camelCase")]
    Emphasis {
        /// Inline children.
        #[serde(default)]
        inline_content: Vec<Inline>,
    },
    /// Strong span.
    #[serde(rename_all = "camelCase")]
    Strong {
        /// Inline children.
        #[serde(default)]
        inline_content: Vec<Inline>,
    },
    /// Struck-through span.
    #[serde(rename_all = "camelCase")]
    Strikethrough {
        /// Inline children.
        #[serde(default)]
        inline_content: Vec<Inline>,
    },
    /// Subscript span; markdown has no native form, content passes through.
    #[serde(rename_all = "camelCase")]
    Subscript {
        /// Inline children.
        #[serde(default)]
        inline_content: Vec<Inline>,
    },
    /// Superscript span; markdown has no native form, content passes through.
    #[serde(rename_all = "camelCase")]
    Superscript {
        /// Inline children.
        #[serde(default)]
        inline_content: Vec<Inline>,
    },
    /// Link to another entry, resolved through the reference table.
    #[serde(rename_all = "camelCase")]
    Reference {
        /// Identifier into the reference table.
        #[serde(default)]
        identifier: String,
        /// Explicitly inactive references render as plain text.
        #[serde(default)]
        is_active: Option<bool>,
    },
    /// Inline image, resolved through the reference table.
    Image {
        /// Identifier into the reference table.
        #[serde(default)]
        identifier: String,
    },
    /// Any inline kind this crate does not render.
    #[serde(other)]
    Unknown,
}
