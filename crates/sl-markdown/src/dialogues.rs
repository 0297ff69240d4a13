//! The `Dialogues` subsection: one conversation tree per speaker.
//!
//! A `Speaker: text` line opens the root node. Numbered lines open choices;
//! each choice leads to a child node whose parent is found through an
//! indentation stack. Any other line is response text for the node on top
//! of the stack.

use std::collections::BTreeSet;

use sl_core::NodeId;

use crate::diagnostics::Sink;
use crate::draft::{Annotation, ChoiceDraft, DialogueDraft, NodeDraft};
use crate::outline::strip_prefix_ci;
use crate::source::{Line, strip_number};

struct Frame {
    /// `None` for the root, which is never popped.
    indent: Option<usize>,
    node: usize,
    path: String,
}

struct Open {
    draft: DialogueDraft,
    stack: Vec<Frame>,
    ids: BTreeSet<NodeId>,
}

pub(crate) fn parse_dialogues(body: &[Line<'_>], sink: &mut Sink) -> Vec<DialogueDraft> {
    let base = body.iter().map(|l| l.indent).min().unwrap_or(0);
    let mut done: Vec<DialogueDraft> = Vec::new();
    let mut open: Option<Open> = None;
    let mut speakers: BTreeSet<String> = BTreeSet::new();
    // After a rejected speaker line, its whole tree is skipped.
    let mut skipping = false;

    for line in body {
        let numbered = strip_number(line.text);

        if numbered.is_none() && line.indent <= base {
            if let Some((speaker, text)) = speaker_line(line.text) {
                if let Some(finished) = open.take() {
                    done.push(finished.draft);
                }
                if !speakers.insert(speaker.to_lowercase()) {
                    sink.error(line, format!("duplicate speaker `{speaker}` in this section"));
                    skipping = true;
                    continue;
                }
                skipping = false;
                let root = NodeDraft {
                    id: NodeId::root(),
                    text: if text.is_empty() {
                        Vec::new()
                    } else {
                        vec![text.to_string()]
                    },
                    choices: Vec::new(),
                };
                open = Some(Open {
                    draft: DialogueDraft {
                        speaker: speaker.to_string(),
                        origin: sink.origin(line),
                        nodes: vec![root],
                    },
                    stack: vec![Frame {
                        indent: None,
                        node: 0,
                        path: String::new(),
                    }],
                    ids: BTreeSet::from([NodeId::root()]),
                });
                continue;
            }
        }

        if skipping {
            continue;
        }
        let Some(current) = open.as_mut() else {
            match numbered {
                Some(_) => sink.error(line, "dialogue option has no open speaker to attach to"),
                None => sink.warning(line, "dialogue text before any speaker line"),
            }
            continue;
        };

        match numbered {
            Some((_, label)) => open_choice(current, line, label, sink),
            None => {
                if let Some(node) = current
                    .stack
                    .last()
                    .and_then(|frame| current.draft.nodes.get_mut(frame.node))
                {
                    node.text.push(line.text.to_string());
                }
            }
        }
    }

    if let Some(finished) = open {
        done.push(finished.draft);
    }
    done
}

fn open_choice(current: &mut Open, line: &Line<'_>, label: &str, sink: &mut Sink) {
    while current
        .stack
        .last()
        .is_some_and(|frame| frame.indent.is_some_and(|indent| indent >= line.indent))
    {
        current.stack.pop();
    }
    let Some(parent) = current.stack.last() else {
        return;
    };

    let ordinal = current.draft.nodes[parent.node].choices.len() + 1;
    let path = if parent.path.is_empty() {
        ordinal.to_string()
    } else {
        format!("{}.{ordinal}", parent.path)
    };

    let (label, explicit_id, annotations) = parse_choice_label(label, line, sink);
    let id = NodeId::new(explicit_id.unwrap_or_else(|| path.clone()));
    if !current.ids.insert(id.clone()) {
        sink.error(line, format!("duplicate dialogue node id `{id}`"));
        return;
    }

    let parent_index = parent.node;
    let choice = ChoiceDraft {
        label,
        origin: sink.origin(line),
        next: id.clone(),
        annotations,
    };
    current.draft.nodes[parent_index].choices.push(choice);
    current.draft.nodes.push(NodeDraft {
        id,
        text: Vec::new(),
        choices: Vec::new(),
    });
    current.stack.push(Frame {
        indent: Some(line.indent),
        node: current.draft.nodes.len() - 1,
        path,
    });
}

/// Recognize `Speaker: text`. The speaker part is a short name.
fn speaker_line(text: &str) -> Option<(&str, &str)> {
    let (speaker, rest) = text.split_once(':')?;
    let speaker = speaker.trim();
    let words = speaker.split_whitespace().count();
    let starts_upper = speaker.chars().next().is_some_and(char::is_uppercase);
    let plain = !speaker.contains(['.', '!', '?', '[', '(', '"']);
    (starts_upper && plain && (1..=4).contains(&words)).then_some((speaker, rest.trim()))
}

/// Split a choice label into display text, an explicit node id, and effects.
fn parse_choice_label(
    text: &str,
    line: &Line<'_>,
    sink: &mut Sink,
) -> (String, Option<String>, Vec<Annotation>) {
    let mut label = String::new();
    let mut id = None;
    let mut annotations = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let Some(len) = rest[open..].find(']') else {
            break;
        };
        let inner = &rest[open + 1..open + len];
        label.push_str(&rest[..open]);
        match parse_annotation(inner) {
            Parsed::Id(value) => id = Some(value),
            Parsed::Effect(annotation) => annotations.push(annotation),
            Parsed::Missing(key) => sink.warning(line, format!("annotation `{key}` needs a value")),
            Parsed::Unknown(key) => sink.warning(line, format!("unknown choice annotation `{key}`")),
            Parsed::Text => label.push_str(&rest[open..=open + len]),
        }
        rest = &rest[open + len + 1..];
    }
    label.push_str(rest);

    if let Some((start, end, scene)) = find_leaves_to(&label) {
        annotations.push(Annotation::LeavesTo(scene));
        label.replace_range(start..end, " ");
    }

    let label = label.split_whitespace().collect::<Vec<_>>().join(" ");
    (label, id, annotations)
}

enum Parsed {
    Id(String),
    Effect(Annotation),
    Missing(String),
    Unknown(String),
    Text,
}

fn parse_annotation(inner: &str) -> Parsed {
    let Some((key, value)) = inner.split_once(':') else {
        return match inner.trim().to_lowercase().as_str() {
            "end" | "ends" | "end dialogue" | "ends dialogue" => Parsed::Effect(Annotation::Ends),
            _ => Parsed::Text,
        };
    };
    let key = key.trim().to_lowercase().replace([' ', '-'], "_");
    let value = value.trim().to_string();

    if key == "end" || key == "ends" {
        return Parsed::Effect(Annotation::Ends);
    }
    if value.is_empty() {
        return Parsed::Missing(key);
    }
    match key.as_str() {
        "id" => Parsed::Id(value),
        "requires" => Parsed::Effect(Annotation::Requires(value)),
        "sets" | "set" => Parsed::Effect(Annotation::Sets(value)),
        "gives" | "give" => Parsed::Effect(Annotation::Gives(value)),
        "takes" | "take" => Parsed::Effect(Annotation::Takes(value)),
        "goto" | "go_to" => Parsed::Effect(Annotation::Goto(value)),
        "leaves_to" | "leave_to" | "leaves" => {
            let scene = strip_prefix_ci(&value, "the ").unwrap_or(&value);
            Parsed::Effect(Annotation::LeavesTo(scene.to_string()))
        }
        _ => Parsed::Unknown(key),
    }
}

/// Find `(Leaves to [the] Scene)` and return its byte range and scene name.
fn find_leaves_to(label: &str) -> Option<(usize, usize, String)> {
    const MARKER: &str = "(leaves to ";
    let start = label.to_ascii_lowercase().find(MARKER)?;
    let close = start + label[start..].find(')')?;
    let inner = label[start + MARKER.len()..close].trim();
    let scene = strip_prefix_ci(inner, "the ").unwrap_or(inner);
    (!scene.is_empty()).then(|| (start, close + 1, scene.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Diagnostic;
    use crate::source::split_lines;

    fn run(text: &str) -> (Vec<DialogueDraft>, Vec<Diagnostic>) {
        let lines = split_lines(text);
        let mut sink = Sink::new(0);
        let dialogues = parse_dialogues(&lines, &mut sink);
        (dialogues, sink.finish())
    }

    fn ids(draft: &DialogueDraft) -> Vec<&str> {
        draft.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    const INFORMANT: &str = "\
Informant: Psst. Over here.
1. Who are you?
  Nobody you need to know.
  1. Fine. [ends: dialogue]
2. Got anything for me? [goto: node_b]
3. I'll be going. (Leaves to the Street)
";

    #[test]
    fn builds_tree_with_path_ids() {
        let (dialogues, diags) = run(INFORMANT);
        assert!(diags.is_empty());
        let informant = &dialogues[0];
        assert_eq!(informant.speaker, "Informant");
        assert_eq!(ids(informant), ["root", "1", "1.1", "2", "3"]);
        let root = &informant.nodes[0];
        assert_eq!(root.text, ["Psst. Over here."]);
        assert_eq!(root.choices.len(), 3);
        assert_eq!(informant.nodes[1].text, ["Nobody you need to know."]);
        assert_eq!(informant.nodes[1].choices[0].annotations, [Annotation::Ends]);
    }

    #[test]
    fn annotations_are_stripped_from_labels() {
        let (dialogues, _) = run(INFORMANT);
        let root = &dialogues[0].nodes[0];
        assert_eq!(root.choices[1].label, "Got anything for me?");
        assert_eq!(root.choices[1].annotations, [Annotation::Goto("node_b".into())]);
        assert_eq!(root.choices[2].label, "I'll be going.");
        assert_eq!(root.choices[2].annotations, [Annotation::LeavesTo("Street".into())]);
    }

    #[test]
    fn explicit_ids_and_effects() {
        let text = "Clerk: Yes?\n1. The key. [id: key_talk] [requires: badge_shown] [gives: Brass Key] [sets: got_key]\n";
        let (dialogues, diags) = run(text);
        assert!(diags.is_empty());
        assert_eq!(ids(&dialogues[0]), ["root", "key_talk"]);
        let choice = &dialogues[0].nodes[0].choices[0];
        assert_eq!(choice.label, "The key.");
        assert_eq!(
            choice.annotations,
            [
                Annotation::Requires("badge_shown".into()),
                Annotation::Gives("Brass Key".into()),
                Annotation::Sets("got_key".into()),
            ]
        );
    }

    #[test]
    fn literal_brackets_stay_in_label() {
        let (dialogues, _) = run("Clerk: Yes?\n1. Ask about [redacted]\n");
        assert_eq!(dialogues[0].nodes[0].choices[0].label, "Ask about [redacted]");
    }

    #[test]
    fn duplicate_speaker_is_reported_and_skipped() {
        let text = "Clerk: Yes?\n1. Hi\nClerk: Again?\n1. Bye\nGuard: Halt.\n";
        let (dialogues, diags) = run(text);
        assert_eq!(dialogues.len(), 2);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_error());
        assert_eq!(dialogues[1].speaker, "Guard");
    }

    #[test]
    fn option_without_parent_is_an_error() {
        let (dialogues, diags) = run("1. Hello?\nClerk: Yes?\n");
        assert_eq!(dialogues.len(), 1);
        assert!(diags[0].is_error());
    }

    #[test]
    fn duplicate_explicit_id_is_an_error() {
        let (_, diags) = run("Clerk: Yes?\n1. A [id: x]\n2. B [id: x]\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("duplicate dialogue node id"));
    }

    #[test]
    fn unknown_annotation_warns() {
        let (_, diags) = run("Clerk: Yes?\n1. A [mood: grumpy]\n");
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_error());
    }

    #[test]
    fn prose_with_colons_is_not_a_speaker() {
        assert!(speaker_line("Informant: Psst.").is_some());
        assert!(speaker_line("He whispers. Then: nothing").is_none());
        assert!(speaker_line("note: lowercase").is_none());
    }
}
