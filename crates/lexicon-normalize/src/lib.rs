//! Turn free-text model responses into lexicon records.
//!
//! Model output is loosely structured: one record per line, a key before the
//! first colon, comma-separated attributes after it, with bullets, numbering
//! and chatter sprinkled around. This crate parses that text line by line.
//! A line that does not fit its endpoint's shape is skipped; it never fails
//! the whole response.
//!
//! # Layers
//! - [`lines`]: trims lines, strips bullets and ordinals, drops blank or
//!   separator-less lines.
//! - [`fields`]: splits a line into a key and attributes, either on every
//!   separator or on the rightmost few.
//! - [`builders`]: one [`LineBuilder`] per endpoint shape, checking arity and
//!   coercing booleans and integers.
//! - [`normalize`]: picks the builder for an [`EndpointKind`] and assembles
//!   the [`Normalized`] result.
//!
//! Pronunciation audio comes from an [`AudioResolver`] supplied by the
//! caller. The core never performs I/O itself; [`audio_forms`] lists the
//! forms a run will ask about so they can be synthesized ahead of time.
//!
//! # Example
//! ```rust
//! use lexicon_normalize::{NoAudio, normalize};
//! use lexicon_types::{EndpointKind, Normalized};
//!
//! let text = "- ضحك: P, m, 1, 3, a\n- ضحكت: P, f, 1, 3, a\nضحكا: P, m";
//! let Normalized::WordForms(forms) = normalize(text, EndpointKind::WordForms, &NoAudio) else {
//!     unreachable!();
//! };
//! assert_eq!(forms.len(), 2);
//! assert_eq!(forms[1].gender, "f");
//! ```

pub mod audio;
pub mod builders;
pub mod fields;
pub mod lines;

use lexicon_types::{DialectTag, EndpointKind, Normalized, PhoneticTag};
use thiserror::Error;

pub use audio::{AudioResolver, NoAudio};
pub use builders::{
    ContextBuilder, DefinitionBuilder, DefinitionLine, ExampleBuilder, LineBuilder, StemBuilder,
    TranslationBuilder, WordFormBuilder, assemble_definition, build_records,
};
pub use fields::{FieldPolicy, Fields, SplitMode, split_fields};
pub use lines::{Line, candidate_lines, strip_line_noise};

use audio::FormCollector;
use builders::scalar_value;

/// Why a single line produced no record.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SkipReason {
    #[error("missing '{0}' separator")]
    MissingSeparator(char),
    #[error("empty key")]
    EmptyKey,
    #[error("empty form")]
    EmptyForm,
    #[error("expected {expected} attributes, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("{field} is not an integer: {value:?}")]
    NotAnInteger { field: &'static str, value: String },
    #[error("index must be at least 1")]
    ZeroIndex,
    #[error("unknown line tag {0:?}")]
    UnknownTag(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum NormalizeError {
    #[error("unknown endpoint type: {0}")]
    UnknownEndpointType(String),
}

/// Resolve an endpoint name such as `wordForms` or `contexts`.
pub fn parse_endpoint(name: &str) -> Result<EndpointKind, NormalizeError> {
    EndpointKind::from_name(name).ok_or_else(|| NormalizeError::UnknownEndpointType(name.to_string()))
}

/// Parse `text` with the builder for `kind`.
///
/// Malformed lines are dropped; an empty response yields an empty
/// collection (or an absent value for the scalar endpoints).
pub fn normalize(text: &str, kind: EndpointKind, audio: &dyn AudioResolver) -> Normalized {
    match kind {
        EndpointKind::WordForms => {
            Normalized::WordForms(build_records(&WordFormBuilder, text, audio))
        }
        EndpointKind::Dialect => Normalized::Dialect(scalar_value(text).map(DialectTag)),
        EndpointKind::Phonetic => Normalized::Phonetic(scalar_value(text).map(PhoneticTag)),
        EndpointKind::Stems => Normalized::Stems(build_records(&StemBuilder, text, audio)),
        EndpointKind::Definition => Normalized::Definition(assemble_definition(build_records(
            &DefinitionBuilder,
            text,
            audio,
        ))),
        EndpointKind::Translations => {
            Normalized::Translations(build_records(&TranslationBuilder, text, audio))
        }
        EndpointKind::Examples => Normalized::Examples(build_records(&ExampleBuilder, text, audio)),
        EndpointKind::Contexts => Normalized::Contexts(build_records(&ContextBuilder, text, audio)),
    }
}

/// Like [`normalize`], but takes the endpoint by name.
pub fn normalize_named(
    text: &str,
    name: &str,
    audio: &dyn AudioResolver,
) -> Result<Normalized, NormalizeError> {
    let kind = parse_endpoint(name)?;
    Ok(normalize(text, kind, audio))
}

/// Forms that [`normalize`] would pass to the resolver, in call order.
///
/// Only lines that parse cleanly are included, and endpoints without audio
/// return nothing.
pub fn audio_forms(text: &str, kind: EndpointKind) -> Vec<String> {
    if !kind.resolves_audio() {
        return Vec::new();
    }
    let collector = FormCollector::default();
    normalize(text, kind, &collector);
    collector.into_forms()
}
