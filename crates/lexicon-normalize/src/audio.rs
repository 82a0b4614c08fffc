//! Audio resolution capability handed to the builders.

use std::cell::RefCell;
use std::collections::HashMap;

use lexicon_types::AudioRef;

/// Maps a parsed form to the URL of its pronunciation.
///
/// Implementations must not fail: anything that goes wrong is reported as
/// [`AudioRef::Unavailable`].
pub trait AudioResolver {
    fn resolve(&self, form: &str) -> AudioRef;
}

impl<F> AudioResolver for F
where
    F: Fn(&str) -> AudioRef,
{
    fn resolve(&self, form: &str) -> AudioRef {
        self(form)
    }
}

/// Pre-resolved forms; unknown forms are unavailable.
impl AudioResolver for HashMap<String, AudioRef> {
    fn resolve(&self, form: &str) -> AudioRef {
        self.get(form).cloned().unwrap_or(AudioRef::Unavailable)
    }
}

/// Resolver that never produces audio.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAudio;

impl AudioResolver for NoAudio {
    fn resolve(&self, _form: &str) -> AudioRef {
        AudioRef::Unavailable
    }
}

/// Records every form it is asked about, in call order.
#[derive(Debug, Default)]
pub(crate) struct FormCollector {
    forms: RefCell<Vec<String>>,
}

impl FormCollector {
    pub(crate) fn into_forms(self) -> Vec<String> {
        self.forms.into_inner()
    }
}

impl AudioResolver for FormCollector {
    fn resolve(&self, form: &str) -> AudioRef {
        self.forms.borrow_mut().push(form.to_string());
        AudioRef::Unavailable
    }
}
