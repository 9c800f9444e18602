//! The seven preview templates.
//!
//! Templates are layout data only. One renderer walks the document and
//! consults the layout for placement and styling; editing wiring is shared.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::address::FieldAddress;
use crate::document::session::EditController;
use crate::models::cv::{
    CvData, Education, Entity, EntitySection, Experience, Language, Project, Section,
};
use crate::render::dates::format_date;
use crate::render::labels::{labels, Labels};
use crate::render::tree::Node;
use crate::render::{Renderer, VisualTree};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Modern,
    Classic,
    Minimal,
    Corporate,
    Technical,
    Creative,
    Compact,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 7] = [
        TemplateKind::Modern,
        TemplateKind::Classic,
        TemplateKind::Minimal,
        TemplateKind::Corporate,
        TemplateKind::Technical,
        TemplateKind::Creative,
        TemplateKind::Compact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Modern => "modern",
            TemplateKind::Classic => "classic",
            TemplateKind::Minimal => "minimal",
            TemplateKind::Corporate => "corporate",
            TemplateKind::Technical => "technical",
            TemplateKind::Creative => "creative",
            TemplateKind::Compact => "compact",
        }
    }

    pub fn layout(&self) -> Layout {
        const MAIN: &[Section] = &[
            Section::Summary,
            Section::Experience,
            Section::Projects,
            Section::Education,
            Section::Skills,
        ];
        const SPLIT_MAIN: &[Section] = &[Section::Summary, Section::Experience, Section::Projects];
        const SPLIT_SIDE: &[Section] = &[Section::Skills, Section::Education];

        match self {
            TemplateKind::Modern => Layout {
                header: Align::Left,
                show_picture: true,
                columns: Columns::Single(MAIN),
                upper_headings: true,
                skills: SkillsStyle::Chips,
            },
            TemplateKind::Classic => Layout {
                header: Align::Center,
                show_picture: false,
                columns: Columns::Single(MAIN),
                upper_headings: true,
                skills: SkillsStyle::Inline,
            },
            TemplateKind::Minimal => Layout {
                header: Align::Left,
                show_picture: false,
                columns: Columns::Single(MAIN),
                upper_headings: false,
                skills: SkillsStyle::Inline,
            },
            TemplateKind::Corporate => Layout {
                header: Align::Center,
                show_picture: true,
                columns: Columns::Split {
                    main: SPLIT_MAIN,
                    side: SPLIT_SIDE,
                },
                upper_headings: true,
                skills: SkillsStyle::List,
            },
            TemplateKind::Technical => Layout {
                header: Align::Left,
                show_picture: false,
                columns: Columns::Split {
                    main: SPLIT_MAIN,
                    side: SPLIT_SIDE,
                },
                upper_headings: false,
                skills: SkillsStyle::Chips,
            },
            TemplateKind::Creative => Layout {
                header: Align::Left,
                show_picture: true,
                columns: Columns::Split {
                    main: SPLIT_MAIN,
                    side: SPLIT_SIDE,
                },
                upper_headings: true,
                skills: SkillsStyle::Chips,
            },
            TemplateKind::Compact => Layout {
                header: Align::Center,
                show_picture: false,
                columns: Columns::Single(MAIN),
                upper_headings: true,
                skills: SkillsStyle::Inline,
            },
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateKind::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Columns {
    Single(&'static [Section]),
    Split {
        main: &'static [Section],
        side: &'static [Section],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillsStyle {
    Chips,
    List,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub header: Align,
    pub show_picture: bool,
    pub columns: Columns,
    pub upper_headings: bool,
    pub skills: SkillsStyle,
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

/// Renders any template from its layout data.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRenderer {
    pub kind: TemplateKind,
}

impl TemplateRenderer {
    pub fn new(kind: TemplateKind) -> Self {
        Self { kind }
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, doc: &CvData, language: Language, edit: &dyn EditController) -> VisualTree {
        let layout = self.kind.layout();
        let ctx = Ctx {
            doc,
            language,
            text: labels(language),
            edit,
            layout,
        };

        let body = match layout.columns {
            Columns::Single(order) => Node::el("main", "cv-body", ctx.sections(order)),
            Columns::Split { main, side } => Node::el(
                "div",
                "cv-body cv-columns",
                vec![
                    Node::el("main", "cv-main", ctx.sections(main)),
                    Node::el("aside", "cv-side", ctx.sections(side)),
                ],
            ),
        };

        let root = Node::el(
            "div",
            format!("cv cv-{}", self.kind),
            vec![ctx.header(), body],
        )
        .with_attr("id", "cv-preview");

        VisualTree {
            template: self.kind,
            language,
            root,
        }
    }
}

struct Ctx<'a> {
    doc: &'a CvData,
    language: Language,
    text: &'static Labels,
    edit: &'a dyn EditController,
    layout: Layout,
}

impl Ctx<'_> {
    /// Wraps committed `content` as the editable slot for `address`.
    fn editable(&self, address: FieldAddress, content: Node) -> Node {
        Node::Editable {
            multiline: address.is_multiline(),
            draft: self.edit.draft_for(&address).map(str::to_string),
            content: Box::new(content),
            address,
        }
    }

    fn editable_text(&self, address: FieldAddress, value: &str) -> Node {
        self.editable(address, Node::text(value))
    }

    fn heading(&self, section: Section) -> Node {
        let title = self.text.section(section);
        let title = if self.layout.upper_headings {
            title.to_uppercase()
        } else {
            title.to_string()
        };
        Node::el("h2", "cv-heading", vec![Node::text(title)])
    }

    fn header(&self) -> Node {
        let info = &self.doc.personal_info;
        let align = match self.layout.header {
            Align::Left => "cv-header align-left",
            Align::Center => "cv-header align-center",
        };

        let name = if info.full_name.is_empty() {
            self.text.placeholder_name
        } else {
            info.full_name.as_str()
        };
        let mut children = Vec::new();
        if self.layout.show_picture {
            if let Some(src) = info.profile_picture.as_deref() {
                children.push(
                    Node::el("img", "cv-photo", Vec::new())
                        .with_attr("src", src)
                        .with_attr("alt", info.full_name.as_str()),
                );
            }
        }
        children.push(Node::el(
            "h1",
            "cv-name",
            vec![self.editable_text(FieldAddress::personal("fullName"), name)],
        ));

        let contacts: [(&str, &str, Option<String>); 7] = [
            ("email", info.email.as_str(), Some(format!("mailto:{}", info.email.trim()))),
            ("phone", info.phone.as_str(), None),
            ("location", info.location.as_str(), None),
            ("website", info.website.as_str(), safe_href(&info.website)),
            ("linkedin", info.linkedin.as_str(), safe_href(&info.linkedin)),
            ("twitter", info.twitter.as_str(), safe_href(&info.twitter)),
            ("github", info.github.as_str(), safe_href(&info.github)),
        ];
        let items: Vec<Node> = contacts
            .into_iter()
            .filter(|(_, value, _)| !value.is_empty())
            .map(|(field, value, href)| {
                let inner = match href {
                    Some(href) => Node::el("a", "", vec![Node::text(value)]).with_attr("href", href),
                    None => Node::text(value),
                };
                Node::el(
                    "span",
                    format!("cv-contact cv-{field}"),
                    vec![self.editable(FieldAddress::personal(field), inner)],
                )
            })
            .collect();
        if !items.is_empty() {
            children.push(Node::el("div", "cv-contacts", items));
        }

        Node::el("header", align, children)
    }

    fn sections(&self, order: &[Section]) -> Vec<Node> {
        order.iter().filter_map(|s| self.section(*s)).collect()
    }

    /// `None` when the section's backing data is empty.
    fn section(&self, section: Section) -> Option<Node> {
        if section == Section::PersonalInfo || self.doc.is_section_empty(section) {
            return None;
        }
        let body = match section {
            Section::PersonalInfo => return None,
            Section::Summary => {
                vec![Node::el(
                    "p",
                    "cv-summary pre-line",
                    vec![self.editable_text(FieldAddress::summary(), &self.doc.summary)],
                )]
            }
            Section::Skills => vec![self.skills()],
            Section::Experience => self.entries(&self.doc.experience, EntitySection::Experience)?,
            Section::Education => self.entries(&self.doc.education, EntitySection::Education)?,
            Section::Projects => self.entries(&self.doc.projects, EntitySection::Projects)?,
        };

        let mut children = vec![self.heading(section)];
        children.extend(body);
        Some(Node::el("section", format!("cv-section cv-{section}"), children))
    }

    fn skills(&self) -> Node {
        let skills = &self.doc.skills;
        let content = match self.layout.skills {
            SkillsStyle::Chips => Node::el(
                "div",
                "cv-skills chips",
                skills
                    .iter()
                    .map(|s| Node::el("span", "cv-chip", vec![Node::text(s.as_str())]))
                    .collect(),
            ),
            SkillsStyle::List => Node::el(
                "ul",
                "cv-skills list",
                skills
                    .iter()
                    .map(|s| Node::el("li", "", vec![Node::text(s.as_str())]))
                    .collect(),
            ),
            SkillsStyle::Inline => Node::el(
                "p",
                "cv-skills inline",
                vec![Node::text(skills.join(" • "))],
            ),
        };
        self.editable(FieldAddress::skills(), content)
    }

    fn entries<E: EntryView>(&self, entities: &[E], section: EntitySection) -> Option<Vec<Node>> {
        if entities.is_empty() {
            return None;
        }
        Some(
            entities
                .iter()
                .map(|entity| self.entry(entity, section))
                .collect(),
        )
    }

    fn entry<E: EntryView>(&self, entity: &E, section: EntitySection) -> Node {
        let id = entity.id();
        let field = |name: &str| {
            let value = entity.get(name).and_then(|v| v.as_text().map(str::to_string));
            self.editable_text(
                FieldAddress::keyed(section, id, name),
                value.as_deref().unwrap_or_default(),
            )
        };

        let mut title = vec![Node::el("h3", "cv-entry-title", vec![field(E::TITLE)])];
        if let Some(link) = E::LINK {
            if entity.get(link).and_then(|v| v.as_text().map(|s| !s.is_empty())) == Some(true) {
                title.push(Node::el("span", "cv-entry-link", vec![field(link)]));
            }
        }
        let mut head = vec![Node::el("div", "cv-entry-titles", title)];
        if let Some(dates) = self.dates(entity, section) {
            head.push(dates);
        }

        let mut children = vec![Node::el("div", "cv-entry-head", head)];
        if let Some(subtitle) = E::SUBTITLE {
            children.push(Node::el("div", "cv-entry-subtitle", vec![field(subtitle)]));
        }
        let has_description = entity
            .get("description")
            .and_then(|v| v.as_text().map(|s| !s.is_empty()))
            .unwrap_or(false);
        if has_description {
            children.push(Node::el(
                "p",
                "cv-entry-description pre-line",
                vec![field("description")],
            ));
        }

        Node::el("article", "cv-entry", children).with_attr("data-entity", id)
    }

    /// The entry's date range with each stored date editable in place. The
    /// "Present" marker replaces the end date while `current` is set.
    fn dates<E: Entity>(&self, entity: &E, section: EntitySection) -> Option<Node> {
        let id = entity.id();
        let start = format_date(entity.start_date().trim(), self.language);
        let start = (!start.is_empty()).then(|| {
            self.editable_text(FieldAddress::keyed(section, id, "startDate"), &start)
        });
        let end = if entity.is_current() {
            Some(Node::text(self.text.present))
        } else {
            let end = format_date(entity.end_date().trim(), self.language);
            (!end.is_empty())
                .then(|| self.editable_text(FieldAddress::keyed(section, id, "endDate"), &end))
        };

        let children = match (start, end) {
            (None, None) => return None,
            (Some(start), Some(end)) => vec![start, Node::text(" – "), end],
            (Some(only), None) | (None, Some(only)) => vec![only],
        };
        Some(Node::el("span", "cv-dates", children))
    }
}

/// Link target for a user-entered profile URL. Only web and mail schemes
/// become live links; a bare host gets `https://`.
fn safe_href(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if ["http://", "https://", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        Some(url.to_string())
    } else if url.contains(':') {
        None
    } else {
        Some(format!("https://{url}"))
    }
}

/// Which entity fields fill the title, subtitle, and link slots.
pub trait EntryView: Entity {
    const TITLE: &'static str;
    const SUBTITLE: Option<&'static str>;
    const LINK: Option<&'static str>;
}

impl EntryView for Experience {
    const TITLE: &'static str = "position";
    const SUBTITLE: Option<&'static str> = Some("company");
    const LINK: Option<&'static str> = None;
}

impl EntryView for Education {
    const TITLE: &'static str = "degree";
    const SUBTITLE: Option<&'static str> = Some("institution");
    const LINK: Option<&'static str> = None;
}

impl EntryView for Project {
    const TITLE: &'static str = "name";
    const SUBTITLE: Option<&'static str> = None;
    const LINK: Option<&'static str> = Some("link");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::session::{EditSession, ReadOnly};
    use crate::render::tree::Node;

    fn doc() -> CvData {
        let mut doc = CvData::empty();
        doc.personal_info.full_name = "Ada Lovelace".to_string();
        doc.personal_info.email = "ada@example.com".to_string();
        doc.experience = vec![
            Experience {
                id: "e1".to_string(),
                position: "Engineer".to_string(),
                company: "Analytical Engines".to_string(),
                start_date: "1842-01".to_string(),
                end_date: "1843-09".to_string(),
                current: true,
                ..Experience::default()
            },
            Experience {
                id: "e2".to_string(),
                position: "Engineer".to_string(),
                company: "Difference Engines".to_string(),
                ..Experience::default()
            },
        ];
        doc
    }

    fn section_classes(tree: &Node) -> Vec<String> {
        let mut found = Vec::new();
        tree.walk(&mut |node| {
            if let Node::Element { tag: "section", class, .. } = node {
                found.push(class.clone());
            }
        });
        found
    }

    #[test]
    fn test_every_template_omits_empty_sections() {
        for kind in TemplateKind::ALL {
            let tree = TemplateRenderer::new(kind).render(&doc(), Language::En, &ReadOnly);
            let sections = section_classes(&tree.root);
            assert_eq!(sections, vec!["cv-section cv-experience"], "{kind}");
        }
    }

    #[test]
    fn test_current_entry_shows_present() {
        for kind in TemplateKind::ALL {
            let tree = TemplateRenderer::new(kind).render(&doc(), Language::En, &ReadOnly);
            let text = tree.root.plain_text();
            assert!(text.contains("JAN 1842 – Present"), "{kind}: {text}");
            assert!(!text.contains("SEP 1843"), "{kind}");
        }
    }

    #[test]
    fn test_placeholder_name_when_empty() {
        let tree = TemplateRenderer::new(TemplateKind::Classic).render(
            &CvData::empty(),
            Language::Vi,
            &ReadOnly,
        );
        assert!(tree.root.plain_text().contains("YOUR NAME"));
    }

    #[test]
    fn test_editable_addresses_are_distinct_per_entity() {
        let tree = TemplateRenderer::new(TemplateKind::Modern).render(&doc(), Language::En, &ReadOnly);
        let addresses = tree.root.editable_addresses();

        let first = FieldAddress::keyed(EntitySection::Experience, "e1", "position");
        let second = FieldAddress::keyed(EntitySection::Experience, "e2", "position");
        assert_eq!(addresses.iter().filter(|a| ***a == first).count(), 1);
        assert_eq!(addresses.iter().filter(|a| ***a == second).count(), 1);
    }

    #[test]
    fn test_draft_renders_only_at_active_address() {
        let mut session = EditSession::Idle;
        let address = FieldAddress::keyed(EntitySection::Experience, "e2", "position");
        session.activate(&doc(), address.clone(), 0);
        session.update_draft("Principal Engineer");

        let tree = TemplateRenderer::new(TemplateKind::Technical).render(&doc(), Language::En, &session);
        let mut drafts = Vec::new();
        tree.root.walk(&mut |node| {
            if let Node::Editable {
                address,
                draft: Some(draft),
                ..
            } = node
            {
                drafts.push((address.clone(), draft.clone()));
            }
        });
        assert_eq!(drafts, vec![(address, "Principal Engineer".to_string())]);
    }

    #[test]
    fn test_split_layout_places_skills_in_sidebar() {
        let mut doc = doc();
        doc.skills = vec!["Maths".to_string()];
        let tree = TemplateRenderer::new(TemplateKind::Corporate).render(&doc, Language::En, &ReadOnly);

        let mut aside_text = String::new();
        tree.root.walk(&mut |node| {
            if let Node::Element { tag: "aside", .. } = node {
                aside_text = node.plain_text();
            }
        });
        assert!(aside_text.contains("Maths"));
    }

    #[test]
    fn test_every_template_exposes_entry_dates_for_editing() {
        let mut doc = doc();
        doc.experience[0].current = false;
        for kind in TemplateKind::ALL {
            let tree = TemplateRenderer::new(kind).render(&doc, Language::En, &ReadOnly);
            let addresses = tree.root.editable_addresses();
            for field in ["startDate", "endDate"] {
                let address = FieldAddress::keyed(EntitySection::Experience, "e1", field);
                assert!(addresses.contains(&&address), "{kind}: {field}");
            }
            assert!(tree.root.plain_text().contains("JAN 1842 – SEP 1843"), "{kind}");
        }
    }

    #[test]
    fn test_current_entry_end_date_is_not_editable() {
        let tree = TemplateRenderer::new(TemplateKind::Minimal).render(&doc(), Language::En, &ReadOnly);
        let addresses = tree.root.editable_addresses();

        let start = FieldAddress::keyed(EntitySection::Experience, "e1", "startDate");
        let end = FieldAddress::keyed(EntitySection::Experience, "e1", "endDate");
        assert!(addresses.contains(&&start));
        assert!(!addresses.contains(&&end));
    }

    #[test]
    fn test_whitespace_summary_is_omitted() {
        let mut doc = doc();
        doc.summary = "   \n ".to_string();
        for kind in TemplateKind::ALL {
            let tree = TemplateRenderer::new(kind).render(&doc, Language::En, &ReadOnly);
            assert!(
                !section_classes(&tree.root).contains(&"cv-section cv-summary".to_string()),
                "{kind}"
            );
        }
    }

    #[test]
    fn test_unsafe_profile_links_are_not_live() {
        assert_eq!(safe_href("javascript:alert(1)"), None);
        assert_eq!(safe_href(" JavaScript:alert(1)"), None);
        assert_eq!(
            safe_href("github.com/ada").as_deref(),
            Some("https://github.com/ada")
        );
        assert_eq!(safe_href("HTTPS://ada.dev").as_deref(), Some("HTTPS://ada.dev"));

        let mut doc = doc();
        doc.personal_info.website = "javascript:alert(1)".to_string();
        let tree = TemplateRenderer::new(TemplateKind::Modern).render(&doc, Language::En, &ReadOnly);
        let mut hrefs = Vec::new();
        tree.root.walk(&mut |node| {
            if let Node::Element { tag: "a", attrs, .. } = node {
                hrefs.extend(attrs.iter().map(|(_, v)| v.clone()));
            }
        });
        assert_eq!(hrefs, vec!["mailto:ada@example.com".to_string()]);
        assert!(tree.root.plain_text().contains("javascript:alert(1)"));
    }

    #[test]
    fn test_template_parsing() {
        assert_eq!("Creative".parse::<TemplateKind>().unwrap(), TemplateKind::Creative);
        assert!("fancy".parse::<TemplateKind>().is_err());
    }
}
