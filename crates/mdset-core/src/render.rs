//! Markdown rendering of a parsed document tree.
//!
//! [`render_document`] is a pure function from a [`DocumentTree`] plus the
//! rendering position ([`SourceContext`], [`LanguageIndex`]) to a
//! [`RenderedDocument`]: the same tree and context always yield byte-identical
//! output. Rendering never fails; unresolvable references degrade to plain
//! text and unknown node kinds render to nothing.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::document::{
    Block, ContentSection, Declaration, DocumentTree, Inline, Reference, TopicSection,
};
use crate::key::Language;
use crate::resolve::{LanguageIndex, SourceContext, framework_display_name, resolve_link};

/// Maximum heading weight produced, regardless of input nesting.
const MAX_HEADING_WEIGHT: usize = 6;

/// A documentation entry rendered to markdown parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Entry title; "Untitled" when the metadata carries none.
    pub title: String,
    /// Entry role; "unknown" when absent.
    pub role: String,
    /// Owning framework display name, if known.
    pub framework: Option<String>,
    /// Selected declaration text with its fence tag.
    pub declaration: Option<RenderedDeclaration>,
    /// Rendered abstract.
    pub abstract_md: Option<String>,
    /// Rendered prose body.
    pub body_md: Option<String>,
    /// Rendered parameter descriptions.
    pub parameters: Vec<RenderedParameter>,
    /// Topic groups.
    pub topics: Vec<TopicGroup>,
    /// See-also groups.
    pub see_also: Vec<TopicGroup>,
    /// Relationship groups.
    pub relationships: Vec<TopicGroup>,
    /// Breadcrumb titles from root to this entry.
    pub hierarchy: Vec<String>,
    /// Platform availability lines.
    pub availability: Vec<String>,
    /// True when any platform marks the entry deprecated.
    pub deprecated: bool,
    /// True when any platform marks the entry beta.
    pub beta: bool,
}

/// A declaration selected for the target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDeclaration {
    /// Concatenated declaration token text.
    pub text: String,
    /// Code fence tag.
    pub fence_tag: &'static str,
}

/// A rendered parameter description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedParameter {
    /// Parameter name.
    pub name: String,
    /// Rendered description.
    pub content_md: String,
}

/// A titled group of resolved entry links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicGroup {
    /// Group title.
    pub title: String,
    /// Resolved items, in section order.
    pub items: Vec<TopicItem>,
}

/// One resolved item of a topic group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicItem {
    /// Display title.
    pub title: String,
    /// Relative link, when the target is local and resolvable.
    pub link: Option<String>,
    /// Rendered abstract of the target.
    pub abstract_md: Option<String>,
    /// Markers such as "Required", "Deprecated", "Beta".
    pub markers: Vec<&'static str>,
}

/// Render a document tree to markdown parts.
///
/// `source` is the position of the document being rendered; pass `None` when
/// rendering outside a conversion run (links then resolve from target
/// segments alone).
#[must_use]
pub fn render_document(
    tree: &DocumentTree,
    language: Language,
    source: Option<&SourceContext>,
    language_index: &LanguageIndex,
) -> RenderedDocument {
    let renderer = Renderer {
        references: &tree.references,
        source,
        language_index,
    };

    let metadata = tree.metadata.as_ref();
    let title = metadata
        .and_then(|m| m.title.clone())
        .unwrap_or_else(|| "Untitled".to_string());
    let role = metadata
        .and_then(|m| m.role.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let framework = metadata
        .and_then(|m| m.modules.first().map(|module| module.name.clone()))
        .or_else(|| {
            source
                .filter(|s| !s.framework.is_empty())
                .map(|s| framework_display_name(&s.framework))
        });

    // OR-reduction across platforms: one deprecated platform marks the
    // whole entry.
    let deprecated = metadata.is_some_and(|m| m.platforms.iter().any(|p| p.deprecated));
    let beta = metadata.is_some_and(|m| m.platforms.iter().any(|p| p.beta));
    let availability = metadata
        .map(|m| {
            m.platforms
                .iter()
                .filter_map(|platform| {
                    let name = platform.name.as_deref()?;
                    Some(match platform.introduced_at.as_deref() {
                        Some(version) => format!("{name} {version}+"),
                        None => name.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let declaration = select_declaration(&tree.primary_content_sections, language).map(|decl| {
        RenderedDeclaration {
            text: decl.tokens.iter().map(|t| t.text.as_str()).collect(),
            fence_tag: language.fence_tag(),
        }
    });

    let abstract_md = non_empty(renderer.render_inlines(&tree.abstract_content));

    let body_md = non_empty(join_blocks(
        tree.primary_content_sections
            .iter()
            .filter_map(|section| match section {
                ContentSection::Content { content } => non_empty(renderer.render_blocks(content)),
                _ => None,
            }),
    ));

    let parameters = tree
        .primary_content_sections
        .iter()
        .filter_map(|section| match section {
            ContentSection::Parameters { parameters } => Some(parameters),
            _ => None,
        })
        .flatten()
        .map(|parameter| RenderedParameter {
            name: parameter.name.clone(),
            content_md: renderer.render_blocks(&parameter.content),
        })
        .collect();

    let topics = renderer.render_topic_sections(&tree.topic_sections);
    let see_also = renderer.render_topic_sections(&tree.see_also_sections);
    let relationships = renderer.render_topic_sections(&tree.relationships_sections);

    let hierarchy = tree
        .hierarchy
        .as_ref()
        .and_then(|h| h.paths.first())
        .map(|path| {
            path.iter()
                .map(|identifier| renderer.reference_title(identifier))
                .collect()
        })
        .unwrap_or_default();

    RenderedDocument {
        title,
        role,
        framework,
        declaration,
        abstract_md,
        body_md,
        parameters,
        topics,
        see_also,
        relationships,
        hierarchy,
        availability,
        deprecated,
        beta,
    }
}

/// Prefer the declaration matching the target language, falling back to the
/// first declaration present.
fn select_declaration(sections: &[ContentSection], language: Language) -> Option<&Declaration> {
    let declarations: Vec<&Declaration> = sections
        .iter()
        .filter_map(|section| match section {
            ContentSection::Declarations { declarations } => Some(declarations),
            _ => None,
        })
        .flatten()
        .collect();

    declarations
        .iter()
        .find(|decl| {
            decl.languages
                .iter()
                .any(|l| l == language.declaration_name())
        })
        .or_else(|| declarations.first())
        .copied()
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

/// Join pre-rendered blocks with blank lines, skipping empty renders.
fn join_blocks(parts: impl IntoIterator<Item = String>) -> String {
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

struct Renderer<'a> {
    references: &'a BTreeMap<String, Reference>,
    source: Option<&'a SourceContext>,
    language_index: &'a LanguageIndex,
}

impl Renderer<'_> {
    fn render_blocks(&self, blocks: &[Block]) -> String {
        join_blocks(blocks.iter().map(|block| self.render_block(block)))
    }

    fn render_block(&self, block: &Block) -> String {
        match block {
            Block::Heading { level, text } => {
                let weight = (*level as usize + 1).clamp(1, MAX_HEADING_WEIGHT);
                format!("{} {}", "#".repeat(weight), text)
            },
            Block::Paragraph { inline_content } => self.render_inlines(inline_content),
            Block::CodeListing { syntax, code } => {
                format!(
                    "```{}\n{}\n```",
                    syntax.as_deref().unwrap_or_default(),
                    code.join("\n")
                )
            },
            Block::Aside {
                style,
                name,
                content,
            } => self.render_aside(style.as_deref(), name.as_deref(), content),
            Block::UnorderedList { items } => items
                .iter()
                .map(|item| self.render_list_item("- ", &self.render_blocks(&item.content)))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::OrderedList { items, start } => {
                let first = start.unwrap_or(1);
                items
                    .iter()
                    .enumerate()
                    .map(|(offset, item)| {
                        let marker = format!("{}. ", first + offset as u64);
                        self.render_list_item(&marker, &self.render_blocks(&item.content))
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            },
            Block::Table { rows } => self.render_table(rows),
            Block::TermList { items } => items
                .iter()
                .map(|item| {
                    let term = item
                        .term
                        .as_ref()
                        .map(|t| self.render_inlines(&t.inline_content))
                        .unwrap_or_default();
                    let definition = item
                        .definition
                        .as_ref()
                        .map(|d| self.render_blocks(&d.content))
                        .unwrap_or_default();
                    format!("**{term}**: {definition}")
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
            // Forward compatible: unknown block kinds are dropped.
            Block::Unknown => String::new(),
        }
    }

    fn render_aside(&self, style: Option<&str>, name: Option<&str>, content: &[Block]) -> String {
        let label = name.map_or_else(|| aside_label(style), ToString::to_string);
        let rendered = self.render_blocks(content);

        let mut lines = rendered.lines();
        let first = lines.next().unwrap_or_default();
        let mut out = format!("> **{label}**: {first}");
        for line in lines {
            out.push('\n');
            if line.is_empty() {
                out.push('>');
            } else {
                let _ = write!(out, "> {line}");
            }
        }
        out
    }

    fn render_list_item(&self, marker: &str, body: &str) -> String {
        if body.is_empty() {
            return marker.trim_end().to_string();
        }
        let indent = " ".repeat(marker.len());
        let mut lines = body.lines();
        let mut out = format!("{marker}{}", lines.next().unwrap_or_default());
        for line in lines {
            out.push('\n');
            if !line.is_empty() {
                let _ = write!(out, "{indent}{line}");
            }
        }
        out
    }

    fn render_table(&self, rows: &[Vec<Vec<Block>>]) -> String {
        let mut row_iter = rows.iter();
        let Some(header) = row_iter.next() else {
            return String::new();
        };

        let mut out = self.render_table_row(header);
        let _ = write!(
            out,
            "\n|{}",
            " --- |".repeat(header.len().max(1))
        );
        for row in row_iter {
            out.push('\n');
            out.push_str(&self.render_table_row(row));
        }
        out
    }

    fn render_table_row(&self, cells: &[Vec<Block>]) -> String {
        let mut out = String::from("|");
        for cell in cells {
            let rendered = self.render_blocks(cell).replace('\n', " ").replace('|', "\\|");
            let _ = write!(out, " {rendered} |");
        }
        out
    }

    fn render_inlines(&self, inlines: &[Inline]) -> String {
        inlines
            .iter()
            .map(|inline| self.render_inline(inline))
            .collect()
    }

    fn render_inline(&self, inline: &Inline) -> String {
        match inline {
            Inline::Text { text } => text.clone(),
            Inline::CodeVoice { code } => format!("`{code}`"),
            Inline::Emphasis { inline_content } => {
                format!("*{}*", self.render_inlines(inline_content))
            },
            Inline::Strong { inline_content } => {
                format!("**{}**", self.render_inlines(inline_content))
            },
            Inline::Strikethrough { inline_content } => {
                format!("~~{}~~", self.render_inlines(inline_content))
            },
            // Markdown has no native sub/superscript; pass content through.
            Inline::Subscript { inline_content } | Inline::Superscript { inline_content } => {
                self.render_inlines(inline_content)
            },
            Inline::Reference {
                identifier,
                is_active,
            } => self.render_reference(identifier, *is_active),
            Inline::Image { identifier } => self.render_image(identifier),
            Inline::Unknown => String::new(),
        }
    }

    /// A reference renders as a markdown link when local and resolvable,
    /// otherwise as its bare title.
    fn render_reference(&self, identifier: &str, is_active: Option<bool>) -> String {
        let Some(reference) = self.references.get(identifier) else {
            return last_url_segment(identifier).to_string();
        };
        let title = reference
            .title
            .clone()
            .unwrap_or_else(|| last_url_segment(identifier).to_string());

        if is_active == Some(false) {
            return title;
        }
        let Some(url) = reference.url.as_deref() else {
            return title;
        };
        match resolve_link(url, &title, self.source, self.language_index) {
            Some(path) => format!("[{title}]({path})"),
            None => title,
        }
    }

    fn render_image(&self, identifier: &str) -> String {
        let Some(reference) = self.references.get(identifier) else {
            return String::new();
        };
        if reference.reference_type.as_deref() != Some("image") {
            return String::new();
        }
        let Some(url) = reference.variants.iter().find_map(|v| v.url.as_deref()) else {
            return String::new();
        };
        let alt = reference
            .alt
            .as_deref()
            .or(reference.title.as_deref())
            .unwrap_or_default();
        format!("![{alt}]({url})")
    }

    fn render_topic_sections(&self, sections: &[TopicSection]) -> Vec<TopicGroup> {
        sections
            .iter()
            .filter_map(|section| {
                let items: Vec<TopicItem> = section
                    .identifiers
                    .iter()
                    .filter_map(|identifier| self.render_topic_item(identifier))
                    .collect();
                if items.is_empty() {
                    return None;
                }
                Some(TopicGroup {
                    title: section
                        .title
                        .clone()
                        .or_else(|| section.kind.as_deref().map(relationship_title))
                        .unwrap_or_default(),
                    items,
                })
            })
            .collect()
    }

    /// Identifiers absent from the reference table are dropped, not rendered
    /// as broken links.
    fn render_topic_item(&self, identifier: &str) -> Option<TopicItem> {
        let reference = self.references.get(identifier)?;
        let title = reference
            .title
            .clone()
            .unwrap_or_else(|| last_url_segment(identifier).to_string());
        let link = reference
            .url
            .as_deref()
            .and_then(|url| resolve_link(url, &title, self.source, self.language_index));
        let abstract_md = non_empty(self.render_inlines(&reference.abstract_content));

        let mut markers = Vec::new();
        if reference.required {
            markers.push("Required");
        }
        if reference.deprecated {
            markers.push("Deprecated");
        }
        if reference.beta {
            markers.push("Beta");
        }

        Some(TopicItem {
            title,
            link,
            abstract_md,
            markers,
        })
    }

    fn reference_title(&self, identifier: &str) -> String {
        self.references
            .get(identifier)
            .and_then(|r| r.title.clone())
            .unwrap_or_else(|| identifier.to_string())
    }
}

fn aside_label(style: Option<&str>) -> String {
    let label = match style.unwrap_or_default() {
        "warning" => "Warning",
        "important" => "Important",
        "tip" => "Tip",
        "experiment" => "Experiment",
        _ => "Note",
    };
    label.to_string()
}

fn last_url_segment(identifier: &str) -> &str {
    identifier
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(identifier)
}

fn relationship_title(kind: &str) -> String {
    match kind {
        "inheritsFrom" => "Inherits From".to_string(),
        "inheritedBy" => "Inherited By".to_string(),
        "conformsTo" => "Conforms To".to_string(),
        "conformingTypes" => "Conforming Types".to_string(),
        other => framework_display_name(other),
    }
}

impl RenderedDocument {
    /// Assemble the full markdown page.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title);

        if !self.hierarchy.is_empty() {
            let _ = write!(out, "\n*{}*\n", self.hierarchy.join(" > "));
        }

        let mut banners = Vec::new();
        if self.deprecated {
            banners.push("Deprecated");
        }
        if self.beta {
            banners.push("Beta");
        }
        if !banners.is_empty() {
            let _ = write!(out, "\n> **{}**\n", banners.join(", "));
        }

        if let Some(abstract_md) = &self.abstract_md {
            let _ = write!(out, "\n{abstract_md}\n");
        }

        if !self.availability.is_empty() {
            let _ = write!(out, "\n*Available on: {}*\n", self.availability.join(", "));
        }

        if let Some(declaration) = &self.declaration {
            let _ = write!(
                out,
                "\n## Declaration\n\n```{}\n{}\n```\n",
                declaration.fence_tag, declaration.text
            );
        }

        if let Some(body_md) = &self.body_md {
            let _ = write!(out, "\n{body_md}\n");
        }

        if !self.parameters.is_empty() {
            out.push_str("\n## Parameters\n");
            for parameter in &self.parameters {
                let _ = write!(out, "\n**{}**: {}\n", parameter.name, parameter.content_md);
            }
        }

        Self::write_groups(&mut out, "Topics", &self.topics);
        Self::write_groups(&mut out, "Relationships", &self.relationships);
        Self::write_groups(&mut out, "See Also", &self.see_also);

        out
    }

    fn write_groups(out: &mut String, heading: &str, groups: &[TopicGroup]) {
        if groups.is_empty() {
            return;
        }
        let _ = write!(out, "\n## {heading}\n");
        for group in groups {
            if !group.title.is_empty() {
                let _ = write!(out, "\n### {}\n", group.title);
            }
            out.push('\n');
            for item in &group.items {
                let mut line = match &item.link {
                    Some(link) => format!("- [{}]({link})", item.title),
                    None => format!("- {}", item.title),
                };
                if let Some(abstract_md) = &item.abstract_md {
                    let _ = write!(line, ": {}", abstract_md.replace('\n', " "));
                }
                if !item.markers.is_empty() {
                    let _ = write!(line, " *({})*", item.markers.join(", "));
                }
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
}
