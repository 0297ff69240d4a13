//! Combination recipes, from scene `Item Combinations` and the global block.

use crate::diagnostics::Sink;
use crate::draft::RecipeDraft;
use crate::source::{Line, strip_bullet};

/// Parse `a + b = result[: description]` lines.
///
/// The older orientation `result[: description] = a + b` is accepted too.
pub(crate) fn parse_combinations(body: &[Line<'_>], sink: &mut Sink) -> Vec<RecipeDraft> {
    body.iter()
        .filter_map(|line| match parse_line(strip_bullet(line.text)) {
            Ok(recipe) => Some(RecipeDraft {
                origin: sink.origin(line),
                ..recipe
            }),
            Err(reason) => {
                sink.error(line, format!("malformed combination: {reason}"));
                None
            }
        })
        .collect()
}

fn parse_line(text: &str) -> Result<RecipeDraft, &'static str> {
    let (left, right) = text.split_once('=').ok_or("expected `a + b = result`")?;
    let (ingredients, result) = if left.contains('+') {
        (left, right)
    } else if right.contains('+') {
        (right, left)
    } else {
        return Err("no `+` between the two ingredients");
    };

    let parts: Vec<&str> = ingredients.split('+').map(str::trim).collect();
    let [first, second] = parts.as_slice() else {
        return Err("a combination takes exactly two ingredients");
    };
    if first.is_empty() || second.is_empty() {
        return Err("an ingredient name is empty");
    }

    let (result, description) = match result.split_once(':') {
        Some((name, description)) => (name.trim(), Some(description.trim().to_string())),
        None => (result.trim(), None),
    };
    if result.is_empty() {
        return Err("the result name is empty");
    }

    Ok(RecipeDraft {
        first: first.to_string(),
        second: second.to_string(),
        result: result.to_string(),
        description: description.filter(|d| !d.is_empty()),
        origin: crate::diagnostics::Origin::world(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::split_lines;

    #[test]
    fn both_orientations() {
        let lines = split_lines(
            "- rag + alcohol = bandage: Clean enough for a wound.\n- lockpick: A bent pin. = wire + pin\n",
        );
        let mut sink = Sink::new(0);
        let recipes = parse_combinations(&lines, &mut sink);
        assert!(sink.finish().is_empty());
        assert_eq!(recipes[0].first, "rag");
        assert_eq!(recipes[0].second, "alcohol");
        assert_eq!(recipes[0].result, "bandage");
        assert_eq!(recipes[0].description.as_deref(), Some("Clean enough for a wound."));
        assert_eq!(recipes[1].result, "lockpick");
        assert_eq!(recipes[1].first, "wire");
    }

    #[test]
    fn malformed_lines_are_reported_and_skipped() {
        let lines = split_lines("- rag alcohol bandage\n- a + b + c = d\n- a + = d\n- a + b =\n- wire + pin = lockpick\n");
        let mut sink = Sink::new(0);
        let recipes = parse_combinations(&lines, &mut sink);
        let diags = sink.finish();
        assert_eq!(recipes.len(), 1);
        assert_eq!(diags.len(), 4);
        assert!(diags.iter().all(|d| d.is_error()));
    }
}
