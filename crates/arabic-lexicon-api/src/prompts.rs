use lexicon_types::EndpointKind;

const WORD_FORMS: &str = include_str!("../templates/prompts/word_forms.txt");
const DIALECT: &str = include_str!("../templates/prompts/dialect.txt");
const PHONETIC: &str = include_str!("../templates/prompts/phonetic.txt");
const STEMS: &str = include_str!("../templates/prompts/stems.txt");
const DEFINITION: &str = include_str!("../templates/prompts/definition.txt");
const TRANSLATIONS: &str = include_str!("../templates/prompts/translations.txt");
const EXAMPLES: &str = include_str!("../templates/prompts/examples.txt");
const CONTEXTS: &str = include_str!("../templates/prompts/contexts.txt");

fn template(kind: EndpointKind) -> &'static str {
    match kind {
        EndpointKind::WordForms => WORD_FORMS,
        EndpointKind::Dialect => DIALECT,
        EndpointKind::Phonetic => PHONETIC,
        EndpointKind::Stems => STEMS,
        EndpointKind::Definition => DEFINITION,
        EndpointKind::Translations => TRANSLATIONS,
        EndpointKind::Examples => EXAMPLES,
        EndpointKind::Contexts => CONTEXTS,
    }
}

/// The completion prompt asking for `kind` records about `word`.
pub fn prompt_for(kind: EndpointKind, word: &str) -> String {
    template(kind).replace("{word}", word)
}
