use std::cell::RefCell;
use std::path::PathBuf;

use lexicon_normalize::{NoAudio, audio_forms, normalize};
use lexicon_types::{AudioRef, EndpointKind, Normalized};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("read fixture")
}

fn url_for(form: &str) -> AudioRef {
    AudioRef::Url(format!("https://audio.test/files/{}.mp3", form.chars().count()))
}

#[test]
fn word_forms_keep_order_and_skip_short_lines() {
    let Normalized::WordForms(forms) = normalize(
        &fixture("word_forms.txt"),
        EndpointKind::WordForms,
        &NoAudio,
    ) else {
        panic!("wrong variant");
    };
    let names: Vec<_> = forms.iter().map(|f| f.form.as_str()).collect();
    assert_eq!(
        names,
        vec!["ضَحِكَ", "ضَحِكَتْ", "ضَحِكَا", "ضَحِكُوا", "يَضْحَكُ"]
    );
    assert_eq!(forms[4].aspect, "S");
    assert_eq!(forms[2].number, "2");
}

#[test]
fn word_form_scenarios() {
    let Normalized::WordForms(forms) =
        normalize("- ضحك: P, m, 1, 3, a", EndpointKind::WordForms, &NoAudio)
    else {
        panic!("wrong variant");
    };
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(
        (
            form.form.as_str(),
            form.aspect.as_str(),
            form.gender.as_str(),
            form.number.as_str(),
            form.person.as_str(),
            form.voice.as_str()
        ),
        ("ضحك", "P", "m", "1", "3", "a")
    );

    let malformed = normalize("ضحك: P, m, 1", EndpointKind::WordForms, &NoAudio);
    assert!(malformed.is_empty());
}

#[test]
fn malformed_line_does_not_disturb_neighbours() {
    let good = "ضحك: P, m, 1, 3, a\nضحكت: P, f, 1, 3, a";
    let with_noise = "ضحك: P, m, 1, 3, a\nضحكوا: P, m\nplain chatter\nضحكت: P, f, 1, 3, a";
    assert_eq!(
        normalize(good, EndpointKind::WordForms, &NoAudio),
        normalize(with_noise, EndpointKind::WordForms, &NoAudio)
    );
}

#[test]
fn stems_resolve_audio_per_record() {
    let Normalized::Stems(stems) = normalize(&fixture("stems.txt"), EndpointKind::Stems, &url_for)
    else {
        panic!("wrong variant");
    };
    assert_eq!(stems.len(), 2);
    assert_eq!(stems[0].form, "لَعِبَ");
    assert_eq!(stems[1].form, "ل ع ب");
    assert_eq!(stems[1].stem_type, "root");
    assert_eq!(stems[1].audio, url_for("ل ع ب"));
}

#[test]
fn definition_collects_one_statement_and_ordered_representations() {
    let Normalized::Definition(definition) = normalize(
        &fixture("definition.txt"),
        EndpointKind::Definition,
        &NoAudio,
    ) else {
        panic!("wrong variant");
    };
    let statement = definition.statement.expect("statement");
    assert_eq!(statement.form, "ضريبة");
    assert_eq!(statement.phonetic, "/dˤariːba/");
    assert_eq!(definition.text_representations.len(), 2);
    assert!(definition.text_representations[0].form.starts_with("(ضَريبةُ)"));
    assert!(
        definition.text_representations[0]
            .form
            .ends_with("الشركات, وتشمل ضرائب الدخل")
    );
    assert!(definition.text_representations[1].form.starts_with("الضَّريبةُ"));
}

#[test]
fn definition_scenario_with_two_representations() {
    let text = "Statement: ضرب, Standard Arabic, /dˤarb/, null\nTextRepresentation: الأول, Standard Arabic, null, null\nTextRepresentation: الثاني, Standard Arabic, null, null";
    let Normalized::Definition(definition) = normalize(text, EndpointKind::Definition, &NoAudio)
    else {
        panic!("wrong variant");
    };
    assert!(definition.statement.is_some());
    let forms: Vec<_> = definition
        .text_representations
        .iter()
        .map(|r| r.form.as_str())
        .collect();
    assert_eq!(forms, vec!["الأول", "الثاني"]);
}

#[test]
fn translations_use_rightmost_split() {
    let Normalized::Translations(translations) = normalize(
        &fixture("translations.txt"),
        EndpointKind::Translations,
        &url_for,
    ) else {
        panic!("wrong variant");
    };
    let languages: Vec<_> = translations.iter().map(|t| t.language.as_str()).collect();
    assert_eq!(languages, vec!["en", "fr", "ru"]);
    assert_eq!(translations[2].form, "Тот, кто задевает больное место");
    assert_eq!(translations[2].phonetic, "tot kto zadʲɪˈvajɪt");
    assert_eq!(translations[0].audio, url_for("Who touches a sensitive spot"));
}

#[test]
fn examples_coerce_flags_and_use_resolver() {
    let failing = |_: &str| AudioRef::Unavailable;
    let Normalized::Examples(examples) =
        normalize(&fixture("examples.txt"), EndpointKind::Examples, &failing)
    else {
        panic!("wrong variant");
    };
    assert_eq!(examples.len(), 3);
    assert!(examples[0].show_in_results);
    assert_eq!(examples[0].source, "عنترة بن شداد");
    assert_eq!(examples[0].phonetic, "ʔaˈħinnu ʔilaː ðˤarb as-suyuf");
    assert!(!examples[1].show_in_results);

    let scenario = &examples[2];
    assert_eq!(scenario.form, "قول");
    assert_eq!(scenario.phonetic, "/qawl/");
    assert_eq!(scenario.example_type, "proverb");
    assert!(scenario.show_in_results);
    assert_eq!(scenario.audio, AudioRef::Unavailable);
}

#[test]
fn contexts_drop_non_numeric_index() {
    let Normalized::Contexts(contexts) =
        normalize(&fixture("contexts.txt"), EndpointKind::Contexts, &NoAudio)
    else {
        panic!("wrong variant");
    };
    assert_eq!(contexts.len(), 2);
    assert_eq!(contexts[0].index, 1);
    assert_eq!(contexts[0].record_id, 1001);
    assert_eq!(contexts[1].index, 3);
    assert_eq!(contexts[1].record_id, 0);
    assert!(contexts[1].show_in_results);
}

#[test]
fn repeated_runs_are_identical() {
    for (name, kind) in [
        ("word_forms.txt", EndpointKind::WordForms),
        ("stems.txt", EndpointKind::Stems),
        ("definition.txt", EndpointKind::Definition),
        ("translations.txt", EndpointKind::Translations),
        ("examples.txt", EndpointKind::Examples),
        ("contexts.txt", EndpointKind::Contexts),
    ] {
        let text = fixture(name);
        assert_eq!(
            normalize(&text, kind, &url_for),
            normalize(&text, kind, &url_for),
            "{name}"
        );
    }
}

#[test]
fn resolver_sees_forms_in_line_order() {
    let text = fixture("examples.txt");
    let seen = RefCell::new(Vec::new());
    let recording = |form: &str| {
        seen.borrow_mut().push(form.to_string());
        AudioRef::Unavailable
    };
    normalize(&text, EndpointKind::Examples, &recording);
    assert_eq!(seen.into_inner(), audio_forms(&text, EndpointKind::Examples));
}

#[test]
fn scalar_endpoints_trim_the_whole_response() {
    let dialect = normalize("  فُصحى\n", EndpointKind::Dialect, &NoAudio);
    assert_eq!(
        serde_json::to_value(&dialect).unwrap(),
        serde_json::json!({"dialect": "فُصحى"})
    );
    let phonetic = normalize("", EndpointKind::Phonetic, &NoAudio);
    assert_eq!(
        serde_json::to_value(&phonetic).unwrap(),
        serde_json::json!({"phonetic": null})
    );
}
