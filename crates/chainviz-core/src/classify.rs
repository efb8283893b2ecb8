//! Surface-form heuristics: the reference type of a mention, and a coarse
//! person/object hint for the entity a pronoun points at.

use serde::Serialize;

use crate::reference::ReferenceType;

/// English personal, possessive, reflexive, demonstrative and indefinite
/// pronouns, lowercase.
pub const PRONOUNS: &[&str] = &[
  "i", "me", "my", "mine", "myself",
  "we", "us", "our", "ours", "ourselves",
  "you", "your", "yours", "yourself", "yourselves",
  "he", "him", "his", "himself",
  "she", "her", "hers", "herself",
  "it", "its", "itself",
  "they", "them", "their", "theirs", "themselves", "themself",
  "this", "that", "these", "those",
  "who", "whom", "whose", "which", "what",
  "one", "oneself",
  "someone", "somebody", "something",
  "anyone", "anybody", "anything",
  "everyone", "everybody", "everything",
  "nobody", "nothing", "none",
  "y'all", "ya", "em",
];

/// Pronoun if the text is a listed pronoun; proper noun if it is longer than
/// one character, capitalised and digit-free; nominal otherwise.
pub fn classify_reference_type(text: &str) -> ReferenceType {
  let trimmed = text.trim();
  let lower = trimmed.to_lowercase();

  if PRONOUNS.contains(&lower.as_str()) {
    return ReferenceType::Pronoun;
  }

  let capitalised = trimmed.chars().next().is_some_and(char::is_uppercase);
  let has_digit = trimmed.chars().any(|c| c.is_ascii_digit());
  if lower.chars().count() > 1 && capitalised && !has_digit {
    return ReferenceType::ProperNoun;
  }

  ReferenceType::Nominal
}

// ─── Entity hint ─────────────────────────────────────────────────────────────

/// Pronouns that point at a person, or at a thing for `it`/`its`, lowercase.
pub const PERSON_PRONOUNS: &[&str] = &[
  "i", "me", "my", "mine", "myself",
  "we", "us", "our", "ours", "ourselves",
  "you", "your", "yours", "yourself", "yourselves",
  "he", "him", "his", "himself",
  "she", "her", "hers", "herself",
  "they", "them", "their", "theirs", "themselves", "themself",
  "it", "its",
];

/// What kind of entity a chain refers to, as far as its pronouns reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityHint {
  Person,
  Object,
}

/// `Object` for `it`/`its`, `Person` for any other personal pronoun, `None`
/// when the surface form alone cannot tell.
pub fn entity_hint(text: &str) -> Option<EntityHint> {
  let lower = text.trim().to_lowercase();
  match lower.as_str() {
    "it" | "its" => Some(EntityHint::Object),
    other if PERSON_PRONOUNS.contains(&other) => Some(EntityHint::Person),
    _ => None,
  }
}
