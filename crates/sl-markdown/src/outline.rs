//! Segmentation of a document into front matter, scenes, and typed sections.

use crate::diagnostics::Sink;
use crate::source::Line;

/// The typed subsections a scene can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    Description,
    Items,
    Characters,
    Dialogues,
    Exits,
    Combinations,
}

impl SectionKind {
    fn parse(title: &str) -> Option<Self> {
        match title.trim().to_lowercase().as_str() {
            "description" | "descriptions" => Some(Self::Description),
            "items" => Some(Self::Items),
            "characters" => Some(Self::Characters),
            "dialogue" | "dialogues" => Some(Self::Dialogues),
            "exits" => Some(Self::Exits),
            "item combinations" | "combinations" => Some(Self::Combinations),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Section<'a> {
    pub kind: SectionKind,
    pub title: String,
    pub body: Vec<Line<'a>>,
}

#[derive(Debug)]
pub(crate) struct SceneBlock<'a> {
    pub name: String,
    pub header: Line<'a>,
    /// Lines between the scene marker and its first subsection.
    pub preamble: Vec<Line<'a>>,
    pub sections: Vec<Section<'a>>,
}

#[derive(Debug, Default)]
pub(crate) struct Outline<'a> {
    pub heading: Option<String>,
    pub front_matter: Vec<Line<'a>>,
    pub scenes: Vec<SceneBlock<'a>>,
    pub combinations: Vec<Line<'a>>,
    pub catalog: Vec<Line<'a>>,
}

enum Target {
    Preamble,
    Scene,
    Section,
    SkipSection,
    Combinations,
    Catalog,
    Skip,
}

/// Split a document's lines into its structural blocks.
pub(crate) fn outline<'a>(lines: &[Line<'a>], sink: &mut Sink) -> Outline<'a> {
    let mut out = Outline::default();
    let mut rest = lines;

    if let Some((first, tail)) = lines.split_first() {
        if first.text == "---" {
            sink.set_section("front matter");
            match tail.iter().position(|l| l.text == "---") {
                Some(end) => {
                    out.front_matter = tail[..end].to_vec();
                    rest = &tail[end + 1..];
                }
                None => {
                    sink.error(first, "front matter is never closed with `---`");
                    rest = tail;
                }
            }
        }
    }

    let mut target = Target::Preamble;
    for line in rest {
        if let Some(title) = line.heading(1) {
            if out.heading.is_none() && !title.is_empty() {
                out.heading = Some(title.to_string());
            }
            continue;
        }

        if let Some(title) = line.heading(2) {
            sink.set_section(title);
            target = if let Some(name) = strip_prefix_ci(title, "scene:") {
                sink.set_section(name);
                if name.is_empty() {
                    sink.error(line, "scene marker has no name");
                }
                out.scenes.push(SceneBlock {
                    name: name.to_string(),
                    header: *line,
                    preamble: Vec::new(),
                    sections: Vec::new(),
                });
                Target::Scene
            } else {
                match title.to_lowercase().as_str() {
                    "global item combinations" | "global combinations" => Target::Combinations,
                    "items" | "item catalog" => Target::Catalog,
                    _ => {
                        sink.warning(line, format!("unknown top-level section `{title}`"));
                        Target::Skip
                    }
                }
            };
            continue;
        }

        if let Some(title) = line.heading(3) {
            let Some(scene) = out.scenes.last_mut().filter(|_| {
                matches!(target, Target::Scene | Target::Section | Target::SkipSection)
            }) else {
                sink.warning(line, format!("subsection `{title}` outside of a scene"));
                target = Target::Skip;
                continue;
            };
            sink.set_section(format!("{} / {title}", scene.name));
            match SectionKind::parse(title) {
                Some(kind) => {
                    scene.sections.push(Section {
                        kind,
                        title: title.to_string(),
                        body: Vec::new(),
                    });
                    target = Target::Section;
                }
                None => {
                    sink.warning(line, format!("unknown subsection `{title}`"));
                    target = Target::SkipSection;
                }
            }
            continue;
        }

        match target {
            Target::Preamble | Target::SkipSection | Target::Skip => {}
            Target::Scene => {
                if let Some(scene) = out.scenes.last_mut() {
                    scene.preamble.push(*line);
                }
            }
            Target::Section => {
                if let Some(section) = out
                    .scenes
                    .last_mut()
                    .and_then(|scene| scene.sections.last_mut())
                {
                    section.body.push(*line);
                }
            }
            Target::Combinations => out.combinations.push(*line),
            Target::Catalog => out.catalog.push(*line),
        }
    }

    out
}

/// Case-insensitive ASCII prefix strip, returning the trimmed remainder.
pub(crate) fn strip_prefix_ci<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| text[prefix.len()..].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::split_lines;

    fn run(text: &str) -> (Outline<'_>, Vec<crate::Diagnostic>) {
        let lines = split_lines(text);
        let mut sink = Sink::new(0);
        let out = outline(&lines, &mut sink);
        (out, sink.finish())
    }

    #[test]
    fn segments_scenes_and_sections() {
        let text = "---\ntitle: Case\n---\n# The Case\n## Scene: Office\nDusty.\n### Description\nA room.\n### Items\n- Desk\n## Scene: Street\n### Exits\n- Office\n";
        let (out, diags) = run(text);
        assert!(diags.is_empty());
        assert_eq!(out.front_matter.len(), 1);
        assert_eq!(out.heading.as_deref(), Some("The Case"));
        assert_eq!(out.scenes.len(), 2);
        assert_eq!(out.scenes[0].name, "Office");
        assert_eq!(out.scenes[0].preamble[0].text, "Dusty.");
        assert_eq!(out.scenes[0].sections[1].kind, SectionKind::Items);
        assert_eq!(out.scenes[0].sections[1].body[0].text, "- Desk");
        assert_eq!(out.scenes[1].sections[0].kind, SectionKind::Exits);
    }

    #[test]
    fn global_blocks() {
        let text = "## Global Item Combinations\n- a + b = c\n## Items\n- Lockpick\n";
        let (out, diags) = run(text);
        assert!(diags.is_empty());
        assert_eq!(out.combinations.len(), 1);
        assert_eq!(out.catalog[0].text, "- Lockpick");
    }

    #[test]
    fn unknown_sections_warn_and_skip() {
        let text = "## Scene: Office\n### Smells\n- pipe smoke\n### Items\n- Desk\n## Appendix\nnotes\n";
        let (out, diags) = run(text);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| !d.is_error()));
        assert_eq!(out.scenes[0].sections.len(), 1);
        assert_eq!(out.scenes[0].sections[0].body.len(), 1);
    }

    #[test]
    fn unclosed_front_matter_is_an_error() {
        let (_, diags) = run("---\ntitle: Case\n## Scene: Office\n");
        assert!(diags[0].is_error());
    }

    #[test]
    fn prefix_is_case_insensitive() {
        assert_eq!(strip_prefix_ci("SCENE: Office", "scene:"), Some("Office"));
        assert_eq!(strip_prefix_ci("Items", "scene:"), None);
    }
}
