//! Read-only linguistic resources injected into the analyzer and the reducer.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{PrepError, PrepResult};

static STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();

fn get_stop_words() -> &'static HashSet<String> {
    STOP_WORDS.get_or_init(|| {
        stop_words::get(stop_words::LANGUAGE::English)
            .into_iter()
            .map(|x| x.to_string())
            .collect()
    })
}

/// Set of words removed by the stopword step of normalization.
#[derive(Debug, Clone)]
pub struct StopwordLexicon {
    words: HashSet<String>,
}

impl StopwordLexicon {
    /// The built-in English list.
    pub fn english() -> Self {
        Self {
            words: get_stop_words().clone(),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Loads a lexicon with one stopword per line. Blank lines and lines
    /// starting with `#` are ignored.
    pub fn from_file(path: &Path) -> PrepResult<Self> {
        let resource = format!("stopword lexicon {}", path.display());
        let content =
            std::fs::read_to_string(path).map_err(|e| PrepError::resource(&resource, e))?;
        let lexicon =
            Self::from_words(content.lines().filter(|l| !l.trim_start().starts_with('#')));
        if lexicon.is_empty() {
            return Err(PrepError::resource(resource, "no stopwords found"));
        }
        Ok(lexicon)
    }

    pub fn load(path: Option<&Path>) -> PrepResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::english()),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        if self.words.contains(token) {
            return true;
        }
        // typographic apostrophes survive extraction, the list uses ascii ones
        token.contains('\u{2019}') && self.words.contains(&token.replace('\u{2019}', "'"))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

const BUILTIN_LEMMAS: &str = include_str!("../resources/english_lemmas.tsv");

/// Suffix detachment rules for nouns, tried in order. A candidate is only
/// accepted when it is a known base form.
const NOUN_DETACHMENTS: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Dictionary-backed lemmatizer resource.
///
/// Holds irregular `inflected -> lemma` exceptions and the set of known base
/// forms. Regular inflections are resolved by suffix detachment validated
/// against the base forms, so a token is never reduced to a word the
/// dictionary does not know.
#[derive(Debug, Clone, Default)]
pub struct LemmaDictionary {
    exceptions: HashMap<String, String>,
    bases: HashSet<String>,
}

impl LemmaDictionary {
    /// The built-in English table.
    pub fn english() -> PrepResult<Self> {
        let mut dict = Self::default();
        dict.extend_from_str(BUILTIN_LEMMAS, "built-in lemma table")?;
        Ok(dict)
    }

    /// Built-in table extended with the entries from `path`, if any.
    pub fn load(path: Option<&Path>) -> PrepResult<Self> {
        let mut dict = Self::english()?;
        if let Some(path) = path {
            let resource = format!("lemma dictionary {}", path.display());
            let content =
                std::fs::read_to_string(path).map_err(|e| PrepError::resource(&resource, e))?;
            dict.extend_from_str(&content, &resource)?;
        }
        Ok(dict)
    }

    /// Parses `inflected<TAB>lemma` lines and bare base-form lines.
    pub fn extend_from_str(&mut self, content: &str, resource: &str) -> PrepResult<()> {
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            match fields.as_slice() {
                [base] => self.insert_base(base),
                [inflected, lemma] if !inflected.is_empty() && !lemma.is_empty() => {
                    self.insert_exception(inflected, lemma)
                }
                _ => {
                    return Err(PrepError::resource(
                        resource,
                        format!("malformed entry on line {}: {line:?}", lineno + 1),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn insert_base(&mut self, base: &str) {
        self.bases.insert(base.to_lowercase());
    }

    pub fn insert_exception(&mut self, inflected: &str, lemma: &str) {
        self.bases.insert(lemma.to_lowercase());
        self.exceptions
            .insert(inflected.to_lowercase(), lemma.to_lowercase());
    }

    pub fn is_base(&self, word: &str) -> bool {
        self.bases.contains(word)
    }

    /// Returns the base form of `token`, or `token` itself when the
    /// dictionary has nothing for it. Among several candidates the shortest
    /// one wins.
    pub fn lemmatize<'a>(&'a self, token: &'a str) -> Cow<'a, str> {
        let mut best: Option<Cow<'a, str>> = None;
        let mut offer = |candidate: Cow<'a, str>| {
            if best.as_ref().is_none_or(|b| candidate.len() < b.len()) {
                best = Some(candidate);
            }
        };

        if let Some(lemma) = self.exceptions.get(token) {
            offer(Cow::Borrowed(lemma.as_str()));
        }
        if self.is_base(token) {
            offer(Cow::Borrowed(token));
        }
        for (suffix, replacement) in NOUN_DETACHMENTS {
            if let Some(stem) = token.strip_suffix(suffix) {
                if stem.is_empty() {
                    continue;
                }
                let candidate = format!("{stem}{replacement}");
                if self.is_base(&candidate) {
                    offer(Cow::Owned(candidate));
                }
            }
        }

        best.unwrap_or(Cow::Borrowed(token))
    }

    pub fn len(&self) -> usize {
        self.exceptions.len() + self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty() && self.bases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_stopwords_contain_common_words() {
        let lexicon = StopwordLexicon::english();
        assert!(lexicon.contains("the"));
        assert!(lexicon.contains("and"));
        assert!(lexicon.contains("don't"));
        assert!(!lexicon.contains("topic"));
    }

    #[test]
    fn test_english_stopwords_keep_content_words() {
        let lexicon = StopwordLexicon::english();
        for word in ["research", "system", "information", "results", "problem"] {
            assert!(!lexicon.contains(word), "{word} is a content word");
        }
        assert!(lexicon.len() < 300);
    }

    #[test]
    fn test_typographic_apostrophe_matches() {
        let lexicon = StopwordLexicon::from_words(["don't"]);
        assert!(lexicon.contains("don\u{2019}t"));
    }

    #[test]
    fn test_builtin_lemmas_parse() {
        let dict = LemmaDictionary::english().unwrap();
        assert!(!dict.is_empty());
        assert!(dict.is_base("document"));
    }

    #[test]
    fn test_lemmatize_rules_need_known_base() {
        let mut dict = LemmaDictionary::default();
        dict.insert_base("class");
        dict.insert_base("study");
        dict.insert_base("box");
        assert_eq!(dict.lemmatize("classes"), "class");
        assert_eq!(dict.lemmatize("studies"), "study");
        assert_eq!(dict.lemmatize("boxes"), "box");
        // "bu" is not a base, so nothing happens
        assert_eq!(dict.lemmatize("bus"), "bus");
    }

    #[test]
    fn test_lemmatize_exceptions() {
        let mut dict = LemmaDictionary::default();
        dict.insert_exception("mice", "mouse");
        assert_eq!(dict.lemmatize("mice"), "mouse");
        assert_eq!(dict.lemmatize("mouse"), "mouse");
    }

    #[test]
    fn test_malformed_line_is_resource_error() {
        let mut dict = LemmaDictionary::default();
        let err = dict
            .extend_from_str("good\nbad\tline\textra\n", "test table")
            .unwrap_err();
        assert!(matches!(err, PrepError::ResourceLoad { .. }));
        assert!(err.to_string().contains("line 2"));
    }
}
