//! The `Exits` subsection.

use sl_core::Value;

use crate::diagnostics::Sink;
use crate::draft::ExitDraft;
use crate::source::{Line, strip_bullet};
use crate::value::{decode_value, split_property};

/// Parse exits. Each one is `- Destination`, `- label: Destination`,
/// `- label: {json gate}`, or a bare `- label` with gate lines beneath it.
pub(crate) fn parse_exits(body: &[Line<'_>], sink: &mut Sink) -> Vec<ExitDraft> {
    let Some(base) = body.iter().map(|l| l.indent).min() else {
        return Vec::new();
    };

    let mut exits: Vec<ExitDraft> = Vec::new();
    for line in body {
        let text = strip_bullet(line.text);

        if line.indent <= base {
            let mut exit = ExitDraft {
                label: text.to_string(),
                origin: sink.origin(line),
                destination: None,
                requires: None,
                blocked: false,
                message: None,
            };
            match text.split_once(':') {
                None => exit.destination = Some(text.to_string()),
                Some((label, rest)) => {
                    exit.label = label.trim().to_string();
                    let rest = rest.trim();
                    if rest.starts_with('{') {
                        match decode_value(rest) {
                            Value::Map(gate) => {
                                for (key, value) in gate {
                                    apply_gate(&mut exit, &key, &value, line, sink);
                                }
                            }
                            _ => sink.error(line, format!("exit gate for `{}` is not valid JSON", exit.label)),
                        }
                    } else if !rest.is_empty() {
                        exit.destination = Some(rest.to_string());
                    }
                }
            }
            if exit.label.is_empty() {
                sink.error(line, "exit has no label");
                continue;
            }
            exits.push(exit);
            continue;
        }

        let Some(exit) = exits.last_mut() else {
            sink.warning(line, "indented line does not belong to any exit");
            continue;
        };
        match split_property(text) {
            Some((key, value)) => apply_gate(exit, &key, &decode_value(value), line, sink),
            None => sink.warning(line, format!("expected `key: value` under exit `{}`", exit.label)),
        }
    }

    for exit in &exits {
        if exit.destination.is_none() {
            sink.push(crate::Diagnostic::error(
                exit.origin.clone(),
                format!("exit `{}` has no destination", exit.label),
            ));
        }
    }
    exits.retain(|exit| exit.destination.is_some());
    exits
}

fn apply_gate(exit: &mut ExitDraft, key: &str, value: &Value, line: &Line<'_>, sink: &mut Sink) {
    let text = value.to_string();
    match key {
        "destination" | "to" | "target" => exit.destination = Some(text),
        "requires" => exit.requires = Some(text),
        "message" => exit.message = Some(text),
        "blocked" => match value.as_bool() {
            Some(blocked) => exit.blocked = blocked,
            None => sink.error(line, format!("`blocked` must be true or false, got `{text}`")),
        },
        _ => sink.warning(line, format!("unknown exit field `{key}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Diagnostic;
    use crate::source::split_lines;

    fn run(text: &str) -> (Vec<ExitDraft>, Vec<Diagnostic>) {
        let lines = split_lines(text);
        let mut sink = Sink::new(0);
        let exits = parse_exits(&lines, &mut sink);
        (exits, sink.finish())
    }

    #[test]
    fn simple_and_labelled_exits() {
        let (exits, diags) = run("- Street\n- north: Hallway\n");
        assert!(diags.is_empty());
        assert_eq!(exits[0].label, "Street");
        assert_eq!(exits[0].destination.as_deref(), Some("Street"));
        assert_eq!(exits[1].label, "north");
        assert_eq!(exits[1].destination.as_deref(), Some("Hallway"));
    }

    #[test]
    fn json_gate() {
        let text = "- north: {\"destination\": \"vault\", \"requires\": \"key\", \"message\": \"The vault door is locked.\"}\n";
        let (exits, diags) = run(text);
        assert!(diags.is_empty());
        assert_eq!(exits[0].destination.as_deref(), Some("vault"));
        assert_eq!(exits[0].requires.as_deref(), Some("key"));
        assert_eq!(exits[0].message.as_deref(), Some("The vault door is locked."));
        assert!(!exits[0].blocked);
    }

    #[test]
    fn indented_gate_lines() {
        let text = "- cellar\n  - destination: Cellar\n  - blocked: true\n  - message: Rubble blocks the stairs.\n";
        let (exits, diags) = run(text);
        assert!(diags.is_empty());
        assert_eq!(exits[0].label, "cellar");
        assert!(exits[0].blocked);
    }

    #[test]
    fn missing_destination_is_an_error() {
        let (exits, diags) = run("- north:\n- Street\n");
        assert_eq!(exits.len(), 1);
        assert!(diags[0].is_error());
        assert!(diags[0].message.contains("no destination"));
    }

    #[test]
    fn bad_json_is_an_error() {
        let (_, diags) = run("- north: {destination: vault}\n");
        assert!(diags.iter().any(|d| d.message.contains("not valid JSON")));
    }
}
