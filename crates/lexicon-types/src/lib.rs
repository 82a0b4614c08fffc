//! Shared record types for the Arabic lexicon API.
//!
//! Every lookup endpoint produces one [`Normalized`] value: a collection of
//! records parsed from a single model response. The types here only describe
//! the data and its JSON wire shape; parsing lives in `lexicon-normalize`.
//!
//! Text fields are kept verbatim (diacritics included). Grammatical tags on
//! [`WordForm`] are not validated against a closed set, since the model is
//! free to answer with whatever it likes.
//!
//! ```rust
//! use lexicon_types::{AudioRef, EndpointKind};
//!
//! let kind = EndpointKind::from_name("wordForms").unwrap();
//! assert_eq!(kind.as_str(), "wordForms");
//! assert!(!kind.resolves_audio());
//! assert_eq!(AudioRef::Unavailable.as_url(), None);
//! ```

use std::fmt;

use serde::ser::{Serialize, Serializer};

/// Lexical facet served by one lookup endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EndpointKind {
    WordForms,
    Dialect,
    Phonetic,
    Stems,
    Definition,
    Translations,
    Examples,
    Contexts,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 8] = [
        EndpointKind::WordForms,
        EndpointKind::Dialect,
        EndpointKind::Phonetic,
        EndpointKind::Stems,
        EndpointKind::Definition,
        EndpointKind::Translations,
        EndpointKind::Examples,
        EndpointKind::Contexts,
    ];

    /// Parse the endpoint name used in JSON keys (`wordForms`, `stems`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wordForms" => Some(EndpointKind::WordForms),
            "dialect" => Some(EndpointKind::Dialect),
            "phonetic" => Some(EndpointKind::Phonetic),
            "stems" => Some(EndpointKind::Stems),
            "definition" => Some(EndpointKind::Definition),
            "translations" => Some(EndpointKind::Translations),
            "examples" => Some(EndpointKind::Examples),
            "contexts" => Some(EndpointKind::Contexts),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::WordForms => "wordForms",
            EndpointKind::Dialect => "dialect",
            EndpointKind::Phonetic => "phonetic",
            EndpointKind::Stems => "stems",
            EndpointKind::Definition => "definition",
            EndpointKind::Translations => "translations",
            EndpointKind::Examples => "examples",
            EndpointKind::Contexts => "contexts",
        }
    }

    /// Whether records of this kind carry a synthesized audio URL.
    pub fn resolves_audio(self) -> bool {
        matches!(
            self,
            EndpointKind::Stems
                | EndpointKind::Translations
                | EndpointKind::Examples
                | EndpointKind::Contexts
        )
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of audio resolution for one record.
///
/// Serializes as the URL string, or `null` when synthesis failed.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum AudioRef {
    Url(String),
    Unavailable,
}

impl AudioRef {
    pub fn as_url(&self) -> Option<&str> {
        match self {
            AudioRef::Url(url) => Some(url),
            AudioRef::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AudioRef::Url(_))
    }
}

impl From<Option<String>> for AudioRef {
    fn from(value: Option<String>) -> Self {
        value.map_or(AudioRef::Unavailable, AudioRef::Url)
    }
}

impl Serialize for AudioRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AudioRef::Url(url) => serializer.serialize_str(url),
            AudioRef::Unavailable => serializer.serialize_none(),
        }
    }
}

/// One inflected form with its grammatical tags.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WordForm {
    pub form: String,
    /// `P` (past), `S` (present) or `F` (future).
    pub aspect: String,
    /// `m` or `f`.
    pub gender: String,
    /// `1` singular, `2` dual, `3` plural.
    pub number: String,
    /// `1`, `2` or `3`.
    pub person: String,
    /// `a` (active) or `p` (passive).
    pub voice: String,
}

impl Serialize for WordForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Tags<'a> {
            form: &'a str,
            aspect: &'a str,
            gender: &'a str,
            #[serde(rename = "numberWordForm")]
            number: &'a str,
            person: &'a str,
            voice: &'a str,
        }

        #[derive(serde::Serialize)]
        struct Wire<'a> {
            #[serde(rename = "formRepresentations")]
            form_representations: Tags<'a>,
        }

        Wire {
            form_representations: Tags {
                form: &self.form,
                aspect: &self.aspect,
                gender: &self.gender,
                number: &self.number,
                person: &self.person,
                voice: &self.voice,
            },
        }
        .serialize(serializer)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct DialectTag(pub String);

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct PhoneticTag(pub String);

/// A stem or root derived from the looked-up word.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stem {
    pub form: String,
    pub phonetic: String,
    pub dialect: String,
    pub audio: AudioRef,
    /// Free text such as `root` or `stem`.
    pub stem_type: String,
}

impl Serialize for Stem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Representation<'a> {
            form: &'a str,
            phonetic: &'a str,
            dialect: &'a str,
            audio: &'a AudioRef,
        }

        #[derive(serde::Serialize)]
        struct Wire<'a> {
            #[serde(rename = "formRepresentations")]
            form_representations: Representation<'a>,
            #[serde(rename = "type")]
            stem_type: &'a str,
        }

        Wire {
            form_representations: Representation {
                form: &self.form,
                phonetic: &self.phonetic,
                dialect: &self.dialect,
                audio: &self.audio,
            },
            stem_type: &self.stem_type,
        }
        .serialize(serializer)
    }
}

/// Statement or text representation inside a [`Definition`].
///
/// `audio` is whatever the model wrote in that column (usually `null`); no
/// synthesis happens for definitions.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct Representation {
    pub form: String,
    pub dialect: String,
    pub phonetic: String,
    pub audio: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    pub statement: Option<Representation>,
    pub text_representations: Vec<Representation>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct Translation {
    /// Language code as written by the model (`en`, `fr`, ...).
    pub language: String,
    pub form: String,
    pub phonetic: String,
    pub dialect: String,
    pub audio: AudioRef,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub form: String,
    pub phonetic: String,
    pub dialect: String,
    pub audio: AudioRef,
    pub example_type: String,
    pub show_in_results: bool,
    pub source: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub form: String,
    pub phonetic: String,
    pub dialect: String,
    pub audio: AudioRef,
    /// 1-based position assigned by the model.
    pub index: u32,
    pub record_id: i64,
    pub show_in_results: bool,
}

/// The structured result of one lookup, keyed by endpoint on the wire
/// (`{"wordForms": [...]}`, `{"dialect": "..."}`, ...).
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Normalized {
    WordForms(Vec<WordForm>),
    Dialect(Option<DialectTag>),
    Phonetic(Option<PhoneticTag>),
    Stems(Vec<Stem>),
    Definition(Definition),
    Translations(Vec<Translation>),
    Examples(Vec<Example>),
    Contexts(Vec<Context>),
}

impl Normalized {
    pub fn kind(&self) -> EndpointKind {
        match self {
            Normalized::WordForms(_) => EndpointKind::WordForms,
            Normalized::Dialect(_) => EndpointKind::Dialect,
            Normalized::Phonetic(_) => EndpointKind::Phonetic,
            Normalized::Stems(_) => EndpointKind::Stems,
            Normalized::Definition(_) => EndpointKind::Definition,
            Normalized::Translations(_) => EndpointKind::Translations,
            Normalized::Examples(_) => EndpointKind::Examples,
            Normalized::Contexts(_) => EndpointKind::Contexts,
        }
    }

    /// Number of records produced. A definition counts its statement and
    /// each text representation.
    pub fn record_count(&self) -> usize {
        match self {
            Normalized::WordForms(v) => v.len(),
            Normalized::Dialect(v) => usize::from(v.is_some()),
            Normalized::Phonetic(v) => usize::from(v.is_some()),
            Normalized::Stems(v) => v.len(),
            Normalized::Definition(d) => {
                usize::from(d.statement.is_some()) + d.text_representations.len()
            }
            Normalized::Translations(v) => v.len(),
            Normalized::Examples(v) => v.len(),
            Normalized::Contexts(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}
