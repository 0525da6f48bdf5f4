//! Local lexical data: WordNet synsets, CMUdict pronunciations and
//! definition sources.

mod cmudict;
mod definitions;
mod wordnet;

pub use cmudict::{arpabet_to_ipa, PronouncingDictionary};
pub use definitions::{
    first_definition, DefinitionLookup, FreeDictionaryClient, Meaning, WordNetDefinitions,
};
pub use wordnet::{PartOfSpeech, Synset, WordNet};
