//! The `---` block at the top of a document.

use sl_core::Value;

use crate::diagnostics::Sink;
use crate::draft::Property;
use crate::source::Line;
use crate::value::{decode_value, split_property};

/// Parse `key: value` lines. A key with an empty value collects the
/// `- item` lines that follow it into a list.
pub(crate) fn parse_front_matter(lines: &[Line<'_>], sink: &mut Sink) -> Vec<Property> {
    let mut properties: Vec<Property> = Vec::new();
    let mut collecting = false;

    for line in lines {
        if collecting {
            if let Some(item) = line.text.strip_prefix('-') {
                if let Some(Property {
                    value: Value::List(list),
                    ..
                }) = properties.last_mut()
                {
                    list.push(decode_value(item));
                }
                continue;
            }
        }

        match split_property(line.text) {
            Some((key, raw)) => {
                collecting = raw.is_empty();
                let value = if collecting {
                    Value::List(Vec::new())
                } else {
                    decode_value(raw)
                };
                properties.push(Property {
                    key,
                    value,
                    origin: sink.origin(line),
                });
            }
            None => {
                collecting = false;
                sink.warning(line, "front matter lines must be `key: value`");
            }
        }
    }
    properties
}
