//! The `Items` subsection and the `## Items` catalog.

use crate::diagnostics::{Origin, Sink};
use crate::draft::{ItemDraft, Property};
use crate::outline::strip_prefix_ci;
use crate::source::{Line, strip_bullet};
use crate::value::{decode_value, split_property};

/// Parse a list of items with their properties and nested contents.
pub(crate) fn parse_items(body: &[Line<'_>], sink: &mut Sink) -> Vec<ItemDraft> {
    let Some(base) = body
        .iter()
        .filter(|l| l.heading(4).is_none())
        .map(|l| l.indent)
        .min()
    else {
        return Vec::new();
    };

    let mut items: Vec<ItemDraft> = Vec::new();
    let mut nested_indent: Option<usize> = None;

    for line in body {
        if let Some(name) = line.heading(4) {
            match items.last_mut() {
                Some(parent) => {
                    if let Some(child) = parse_item_line(name, sink.origin(line)) {
                        attach_nested(parent, child, line, sink);
                        nested_indent = Some(line.indent);
                    }
                }
                None => sink.warning(line, format!("nested item `{name}` has no parent item")),
            }
            continue;
        }

        let text = strip_bullet(line.text);
        if line.indent <= base {
            nested_indent = None;
            match parse_item_line(text, sink.origin(line)) {
                Some(item) => items.push(item),
                None => sink.error(line, "item line has no name"),
            }
            continue;
        }

        let Some(current) = items.last_mut() else {
            sink.warning(line, "indented line does not belong to any item");
            continue;
        };

        let in_nested = nested_indent.is_some_and(|indent| line.indent > indent);
        if let Some((key, value)) = split_property(text) {
            let property = Property {
                key,
                value: decode_value(value),
                origin: sink.origin(line),
            };
            match current.nested.as_deref_mut().filter(|_| in_nested) {
                Some(child) => child.properties.push(property),
                None => current.properties.push(property),
            }
            continue;
        }

        if in_nested {
            sink.error(
                line,
                format!("`{text}` is nested more than one level deep; containers hold items, not containers"),
            );
            continue;
        }
        match parse_item_line(text, sink.origin(line)) {
            Some(child) => {
                attach_nested(current, child, line, sink);
                nested_indent = Some(line.indent);
            }
            None => sink.error(line, "nested item line has no name"),
        }
    }

    items
}

fn attach_nested(parent: &mut ItemDraft, child: ItemDraft, line: &Line<'_>, sink: &mut Sink) {
    match &parent.nested {
        Some(existing) => sink.error(
            line,
            format!(
                "`{}` already contains `{}`; an item can hold only one other item",
                parent.name, existing.name
            ),
        ),
        None => parent.nested = Some(Box::new(child)),
    }
}

/// Parse `Name (X) ##### Description: text`.
pub(crate) fn parse_item_line(text: &str, origin: Origin) -> Option<ItemDraft> {
    let (head, description) = match text.split_once("#####") {
        Some((head, tail)) => {
            let tail = tail.trim();
            let tail = strip_prefix_ci(tail, "description:").unwrap_or(tail);
            (head, Some(tail.to_string()).filter(|d| !d.is_empty()))
        }
        None => (text, None),
    };

    let (name, movable) = strip_immovable(head);
    if name.is_empty() {
        return None;
    }
    Some(ItemDraft {
        name,
        origin,
        movable,
        description,
        properties: Vec::new(),
        nested: None,
    })
}

fn strip_immovable(head: &str) -> (String, bool) {
    let lower = head.to_ascii_lowercase();
    match lower.find("(x)") {
        Some(at) => {
            let name = format!("{} {}", &head[..at], &head[at + 3..]);
            (collapse(&name), false)
        }
        None => (collapse(head), true),
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use sl_core::Value;

    use super::*;
    use crate::Diagnostic;
    use crate::source::split_lines;

    fn run(text: &str) -> (Vec<ItemDraft>, Vec<Diagnostic>) {
        let lines = split_lines(text);
        let mut sink = Sink::new(0);
        let items = parse_items(&lines, &mut sink);
        (items, sink.finish())
    }

    #[test]
    fn plain_and_immovable_items() {
        let (items, diags) = run("- Desk (X) ##### Description: A heavy oak desk.\n- Brass Key\n");
        assert!(diags.is_empty());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Desk");
        assert!(!items[0].movable);
        assert_eq!(items[0].description.as_deref(), Some("A heavy oak desk."));
        assert!(items[1].movable);
        assert_eq!(items[1].description, None);
    }

    #[test]
    fn properties_and_nesting() {
        let text = "- Desk (X)\n  - Silver Locket\n- Brass Key\n  - type: key\n  - aliases: [\"key\"]\n";
        let (items, diags) = run(text);
        assert!(diags.is_empty());
        assert_eq!(items[0].nested.as_ref().map(|n| n.name.as_str()), Some("Silver Locket"));
        assert_eq!(items[1].properties.len(), 2);
        assert_eq!(items[1].property("type").map(|p| &p.value), Some(&Value::from("key")));
        assert!(items[1].nested.is_none());
    }

    #[test]
    fn heading_style_nesting() {
        let (items, diags) = run("- Chest (X)\n#### Gold Coin\n");
        assert!(diags.is_empty());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].nested.as_ref().map(|n| n.name.as_str()), Some("Gold Coin"));
    }

    #[test]
    fn nested_properties_go_to_the_child() {
        let text = "- Chest (X)\n  - locked: true\n  - Jewel Box\n    - locked: true\n";
        let (items, diags) = run(text);
        assert!(diags.is_empty());
        assert_eq!(items[0].properties.len(), 1);
        let child = items[0].nested.as_ref().map(|n| n.properties.len());
        assert_eq!(child, Some(1));
    }

    #[test]
    fn second_nested_item_is_an_error() {
        let (items, diags) = run("- Desk (X)\n  - Locket\n  - Pen\n- Lamp\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_error());
        assert!(diags[0].message.contains("already contains"));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let (_, diags) = run("- Desk (X)\n  - Box\n    - Ring\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("more than one level"));
    }

    #[test]
    fn orphan_indented_line_warns() {
        let (items, diags) = run("  - Lamp\n- Desk\n");
        assert_eq!(items.len(), 1);
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
        let (items, diags) = run("#### Ring\n- Desk\n");
        assert_eq!(items.len(), 1);
        assert!(!diags[0].is_error());
    }
}
