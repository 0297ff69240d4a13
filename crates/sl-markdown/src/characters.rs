//! The `Characters` subsection.

use crate::diagnostics::Sink;
use crate::draft::{CharacterDraft, Property};
use crate::items::parse_item_line;
use crate::source::{Line, strip_bullet};
use crate::value::{decode_value, split_property};

/// Parse `Name: description` lines with carried items and properties below.
pub(crate) fn parse_characters(body: &[Line<'_>], sink: &mut Sink) -> Vec<CharacterDraft> {
    let Some(base) = body
        .iter()
        .filter(|l| l.heading(4).is_none())
        .map(|l| l.indent)
        .min()
    else {
        return Vec::new();
    };

    let mut characters: Vec<CharacterDraft> = Vec::new();
    for line in body {
        let (text, opens) = match line.heading(4) {
            Some(name) => (name, false),
            None => (strip_bullet(line.text), line.indent <= base),
        };

        if opens {
            let (name, description) = match text.split_once(':') {
                Some((name, description)) => (name.trim(), description.trim()),
                None => (text.trim(), ""),
            };
            if name.is_empty() {
                sink.error(line, "character line has no name");
                continue;
            }
            characters.push(CharacterDraft {
                name: name.to_string(),
                description: description.to_string(),
                origin: sink.origin(line),
                items: Vec::new(),
                properties: Vec::new(),
            });
            continue;
        }

        let Some(current) = characters.last_mut() else {
            sink.warning(line, "indented line does not belong to any character");
            continue;
        };
        if line.heading(4).is_none() {
            if let Some((key, value)) = split_property(text) {
                current.properties.push(Property {
                    key,
                    value: decode_value(value),
                    origin: sink.origin(line),
                });
                continue;
            }
        }
        match parse_item_line(text, sink.origin(line)) {
            Some(item) => current.items.push(item),
            None => sink.error(line, "carried item line has no name"),
        }
    }
    characters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::split_lines;

    #[test]
    fn characters_with_items_and_properties() {
        let text = "Informant: A nervous man in a grey coat.\n  - Crumpled Note\n  - accepts: [\"coin\"]\n  - on_give: He pockets it.\nClerk\n#### Ledger\n";
        let lines = split_lines(text);
        let mut sink = Sink::new(0);
        let characters = parse_characters(&lines, &mut sink);
        assert!(sink.finish().is_empty());
        assert_eq!(characters.len(), 2);
        assert_eq!(characters[0].name, "Informant");
        assert_eq!(characters[0].description, "A nervous man in a grey coat.");
        assert_eq!(characters[0].items[0].name, "Crumpled Note");
        assert_eq!(characters[0].properties.len(), 2);
        assert_eq!(characters[1].description, "");
        assert_eq!(characters[1].items[0].name, "Ledger");
    }

    #[test]
    fn orphan_lines_warn() {
        let lines = split_lines("  - Hat\nInformant: Nervous.\n");
        let mut sink = Sink::new(0);
        let characters = parse_characters(&lines, &mut sink);
        let diags = sink.finish();
        assert_eq!(characters.len(), 1);
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
    }
}
