//! Mention-table writer: the inverse of [`crate::parse`].

use chainviz_core::Mention;

use crate::parse::COLUMNS;

/// Quote a field when it holds a delimiter, a quote, or a line break.
fn escape_field(value: &str) -> String {
  if value.contains([',', '"', '\r', '\n']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

pub(crate) fn serialize(mentions: &[Mention]) -> String {
  let mut out = COLUMNS.join(",");
  out.push('\n');

  for m in mentions {
    let row = [
      m.conversation_id.to_string(),
      m.chain_id.to_string(),
      m.turn_id.to_string(),
      escape_field(&m.speaker),
      escape_field(&m.text),
      m.reference_type.code().to_string(),
    ];
    out.push_str(&row.join(","));
    out.push('\n');
  }

  out
}

#[cfg(test)]
mod tests {
  use chainviz_core::ReferenceType;

  use super::*;

  #[test]
  fn header_and_plain_row() {
    let out = serialize(&[Mention::new(
      2,
      5,
      11,
      "A",
      "the dog",
      ReferenceType::Nominal,
    )]);
    assert_eq!(
      out,
      "conv_id,chain_id,turn_id,speaker,text,reference_type\n2,5,11,A,the dog,N\n"
    );
  }

  #[test]
  fn fields_needing_quotes() {
    assert_eq!(escape_field("plain"), "plain");
    assert_eq!(escape_field("a, b"), "\"a, b\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
  }

  #[test]
  fn other_is_written_by_name() {
    let out = serialize(&[Mention::new(0, 0, 0, "B", "uh", ReferenceType::Other)]);
    assert!(out.ends_with("0,0,0,B,uh,Other\n"));
  }
}
