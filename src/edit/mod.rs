//! Deriving and applying text edits.
//!
//! A [`CompanionDocument`] is the user's edited copy of the page text. An
//! [`EditRecognizer`] turns it into a [`ModificationMap`](crate::model::ModificationMap),
//! which [`apply_modifications`] then applies to each span's text.

mod companion;
mod recognizer;
mod substitute;

pub use companion::CompanionDocument;
pub use recognizer::{
    build_modification_map, EditRecognizer, FieldRule, LabelRecognizer, PhraseSwap,
    RecognizerRules,
};
pub use substitute::apply_modifications;
