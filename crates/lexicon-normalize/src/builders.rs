//! Record builders, one per endpoint shape.
//!
//! Every builder turns a single cleaned line into a record or a
//! [`SkipReason`]. [`build_records`] folds a whole response through a builder
//! and keeps the successes in input order. Audio is resolved last, only for
//! lines that passed every other check.

use std::borrow::Cow;

use lexicon_types::{
    Context, Definition, EndpointKind, Example, Representation, Stem, Translation, WordForm,
};
use tracing::debug;

use crate::SkipReason;
use crate::audio::AudioResolver;
use crate::fields::{FieldPolicy, split_fields};
use crate::lines::candidate_lines;

const ARABIC_COMMA: char = '،';

/// Parses one line of a model response into a record.
pub trait LineBuilder {
    type Record;

    const KIND: EndpointKind;
    /// Rewrite `،` to `,` before splitting.
    const FOLDS_ARABIC_COMMA: bool = false;

    fn parse_line(
        &self,
        line: &str,
        audio: &dyn AudioResolver,
    ) -> Result<Self::Record, SkipReason>;
}

/// Run every candidate line of `text` through `builder`.
///
/// Lines that fail are logged at debug level and left out; the rest keep
/// their relative order.
pub fn build_records<B: LineBuilder>(
    builder: &B,
    text: &str,
    audio: &dyn AudioResolver,
) -> Vec<B::Record> {
    let text: Cow<'_, str> = if B::FOLDS_ARABIC_COMMA && text.contains(ARABIC_COMMA) {
        Cow::Owned(text.replace(ARABIC_COMMA, ","))
    } else {
        Cow::Borrowed(text)
    };

    let kind = B::KIND;
    candidate_lines(&text, ':')
        .filter_map(|line| match builder.parse_line(line.text, audio) {
            Ok(record) => Some(record),
            Err(reason) => {
                debug!(%kind, line = line.number, %reason, "skipping line");
                None
            }
        })
        .collect()
}

/// `form: aspect, gender, number, person, voice`
#[derive(Clone, Copy, Debug, Default)]
pub struct WordFormBuilder;

impl LineBuilder for WordFormBuilder {
    type Record = WordForm;

    const KIND: EndpointKind = EndpointKind::WordForms;
    const FOLDS_ARABIC_COMMA: bool = true;

    fn parse_line(&self, line: &str, _audio: &dyn AudioResolver) -> Result<WordForm, SkipReason> {
        let fields = split_fields(line, &FieldPolicy::all(','))?;
        let form = fields.non_empty_key()?;
        let [aspect, gender, number, person, voice] = fields.exact::<5>()?;
        Ok(WordForm {
            form: form.to_string(),
            aspect: aspect.to_string(),
            gender: gender.to_string(),
            number: number.to_string(),
            person: person.to_string(),
            voice: voice.to_string(),
        })
    }
}

/// `form: phonetic, dialect, audio, type`
///
/// The model's audio column is a placeholder and gets replaced by the
/// resolver's answer.
#[derive(Clone, Copy, Debug, Default)]
pub struct StemBuilder;

impl LineBuilder for StemBuilder {
    type Record = Stem;

    const KIND: EndpointKind = EndpointKind::Stems;
    const FOLDS_ARABIC_COMMA: bool = true;

    fn parse_line(&self, line: &str, audio: &dyn AudioResolver) -> Result<Stem, SkipReason> {
        let fields = split_fields(line, &FieldPolicy::all(','))?;
        let form = fields.non_empty_key()?;
        let [phonetic, dialect, _audio, stem_type] = fields.exact::<4>()?;
        Ok(Stem {
            form: form.to_string(),
            phonetic: phonetic.to_string(),
            dialect: dialect.to_string(),
            audio: audio.resolve(form),
            stem_type: stem_type.to_string(),
        })
    }
}

/// One tagged line of a definition response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DefinitionLine {
    Statement(Representation),
    TextRepresentation(Representation),
}

/// `Statement: form, dialect, phonetic, audio` or
/// `TextRepresentation: form, dialect, phonetic, audio`
#[derive(Clone, Copy, Debug, Default)]
pub struct DefinitionBuilder;

impl LineBuilder for DefinitionBuilder {
    type Record = DefinitionLine;

    const KIND: EndpointKind = EndpointKind::Definition;
    const FOLDS_ARABIC_COMMA: bool = true;

    fn parse_line(
        &self,
        line: &str,
        _audio: &dyn AudioResolver,
    ) -> Result<DefinitionLine, SkipReason> {
        let fields = split_fields(line, &FieldPolicy::rightmost(3))?;
        let tag: String = fields.key.split_whitespace().collect();
        let [form, dialect, phonetic, audio] = fields.exact::<4>()?;
        let representation = Representation {
            form: form.to_string(),
            dialect: dialect.to_string(),
            phonetic: phonetic.to_string(),
            audio: audio.to_string(),
        };
        if tag.eq_ignore_ascii_case("Statement") {
            Ok(DefinitionLine::Statement(representation))
        } else if tag.eq_ignore_ascii_case("TextRepresentation") {
            Ok(DefinitionLine::TextRepresentation(representation))
        } else {
            Err(SkipReason::UnknownTag(fields.key.to_string()))
        }
    }
}

/// Fold definition lines into one [`Definition`]. The first statement wins.
pub fn assemble_definition(lines: impl IntoIterator<Item = DefinitionLine>) -> Definition {
    let mut definition = Definition::default();
    for line in lines {
        match line {
            DefinitionLine::Statement(statement) => {
                if definition.statement.is_none() {
                    definition.statement = Some(statement);
                } else {
                    debug!("skipping repeated statement line");
                }
            }
            DefinitionLine::TextRepresentation(text) => {
                definition.text_representations.push(text);
            }
        }
    }
    definition
}

/// `language: form, phonetic, dialect, audio`
#[derive(Clone, Copy, Debug, Default)]
pub struct TranslationBuilder;

impl LineBuilder for TranslationBuilder {
    type Record = Translation;

    const KIND: EndpointKind = EndpointKind::Translations;

    fn parse_line(
        &self,
        line: &str,
        audio: &dyn AudioResolver,
    ) -> Result<Translation, SkipReason> {
        let fields = split_fields(line, &FieldPolicy::rightmost(3))?;
        let language = fields.non_empty_key()?;
        let [form, phonetic, dialect, _audio] = fields.exact::<4>()?;
        if form.is_empty() {
            return Err(SkipReason::EmptyForm);
        }
        Ok(Translation {
            language: language.to_string(),
            form: form.to_string(),
            phonetic: phonetic.to_string(),
            dialect: dialect.to_string(),
            audio: audio.resolve(form),
        })
    }
}

/// `form: phonetic, dialect, audio, exampleType, showInResults, source`
#[derive(Clone, Copy, Debug, Default)]
pub struct ExampleBuilder;

impl LineBuilder for ExampleBuilder {
    type Record = Example;

    const KIND: EndpointKind = EndpointKind::Examples;

    fn parse_line(&self, line: &str, audio: &dyn AudioResolver) -> Result<Example, SkipReason> {
        let fields = split_fields(line, &FieldPolicy::rightmost(5))?;
        let form = fields.non_empty_key()?;
        let [phonetic, dialect, _audio, example_type, show, source] = fields.exact::<6>()?;
        Ok(Example {
            form: form.to_string(),
            phonetic: phonetic.to_string(),
            dialect: dialect.to_string(),
            audio: audio.resolve(form),
            example_type: example_type.to_string(),
            show_in_results: parse_flag(show),
            source: source.to_string(),
        })
    }
}

/// `form: phonetic, dialect, audio, index, recordId, showInResults`
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextBuilder;

impl LineBuilder for ContextBuilder {
    type Record = Context;

    const KIND: EndpointKind = EndpointKind::Contexts;

    fn parse_line(&self, line: &str, audio: &dyn AudioResolver) -> Result<Context, SkipReason> {
        let fields = split_fields(line, &FieldPolicy::rightmost(5))?;
        let form = fields.non_empty_key()?;
        let [phonetic, dialect, _audio, index, record_id, show] = fields.exact::<6>()?;
        let index: u32 = parse_integer("index", index)?;
        if index == 0 {
            return Err(SkipReason::ZeroIndex);
        }
        let record_id: i64 = parse_integer("recordId", record_id)?;
        Ok(Context {
            form: form.to_string(),
            phonetic: phonetic.to_string(),
            dialect: dialect.to_string(),
            audio: audio.resolve(form),
            index,
            record_id,
            show_in_results: parse_flag(show),
        })
    }
}

/// Trimmed whole-response value for the dialect and phonetic endpoints.
pub fn scalar_value(text: &str) -> Option<String> {
    let value = text.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Case-insensitive `true`; anything else is false.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

fn parse_integer<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, SkipReason> {
    raw.trim()
        .parse()
        .map_err(|_| SkipReason::NotAnInteger {
            field,
            value: raw.to_string(),
        })
}
