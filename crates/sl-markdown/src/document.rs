//! Segmentation of one file into a [`DocumentDraft`].

use crate::characters::parse_characters;
use crate::combinations::parse_combinations;
use crate::diagnostics::{Diagnostic, Sink};
use crate::dialogues::parse_dialogues;
use crate::draft::{DocumentDraft, SceneDraft};
use crate::exits::parse_exits;
use crate::frontmatter::parse_front_matter;
use crate::items::parse_items;
use crate::outline::{SectionKind, outline};
use crate::source::split_lines;

pub(crate) fn parse_file(file: usize, text: &str) -> (DocumentDraft, Vec<Diagnostic>) {
    let lines = split_lines(text);
    let mut sink = Sink::new(file);
    let outline = outline(&lines, &mut sink);

    let mut document = DocumentDraft {
        heading: outline.heading.clone(),
        ..DocumentDraft::default()
    };

    sink.set_section("front matter");
    document.front_matter = parse_front_matter(&outline.front_matter, &mut sink);

    for block in &outline.scenes {
        sink.set_section(block.name.as_str());
        let mut scene = SceneDraft::new(block.name.clone(), sink.origin(&block.header));
        scene
            .description
            .extend(block.preamble.iter().map(|l| l.text.to_string()));

        for section in &block.sections {
            sink.set_section(format!("{} / {}", block.name, section.title));
            let body = &section.body;
            match section.kind {
                SectionKind::Description => scene
                    .description
                    .extend(body.iter().map(|l| l.text.to_string())),
                SectionKind::Items => scene.items.extend(parse_items(body, &mut sink)),
                SectionKind::Characters => {
                    scene.characters.extend(parse_characters(body, &mut sink));
                }
                SectionKind::Dialogues => scene.dialogues.extend(parse_dialogues(body, &mut sink)),
                SectionKind::Exits => scene.exits.extend(parse_exits(body, &mut sink)),
                SectionKind::Combinations => {
                    document.recipes.extend(parse_combinations(body, &mut sink));
                }
            }
        }

        tracing::debug!(
            scene = %scene.name,
            items = scene.items.len(),
            characters = scene.characters.len(),
            exits = scene.exits.len(),
            "parsed scene"
        );
        document.scenes.push(scene);
    }

    sink.set_section("Global Item Combinations");
    document
        .recipes
        .extend(parse_combinations(&outline.combinations, &mut sink));

    sink.set_section("Items");
    document.catalog = parse_items(&outline.catalog, &mut sink);

    (document, sink.finish())
}
