use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::TokenLengthBounds;
use crate::lexicon::StopwordLexicon;

static HYPHENATED_LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(?:\r\n|\n|\r)").expect("hyphenation pattern"));
static PDF_CID_GLYPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(cid:\d+?\)").expect("cid pattern"));
static JOINED_APOSTROPHE_OR_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"['\-]+(\w)").expect("contraction pattern"));
static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("punctuation pattern"));
static NUMERIC_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").expect("numeric pattern"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Spacing diacritics that accent folding leaves in place for [`SpacingMarkFilter`].
const SPACING_MARKS: &[char] = &[
    '\u{00B4}', // acute
    '\u{00A8}', // diaeresis
    '\u{0060}', // grave
    '\u{02C6}', // circumflex
    '\u{02DC}', // tilde
    '\u{00B8}', // cedilla
    '\u{00AF}', // macron
    '\u{02D8}', // breve
    '\u{02D9}', // dot above
    '\u{02DA}', // ring above
    '\u{02DB}', // ogonek
    '\u{02DD}', // double acute
];

/// A character filter receives the original text as a stream of characters and can transform the stream by adding,
/// removing, or changing characters. For instance, a character filter could be used to fold accented letters
/// to ASCII, or to delete the glyph placeholders a PDF converter leaves behind.
pub trait CharacterFilter: Send + Sync {
    fn filter(&self, text: String) -> String;
}

/// Undoes artifacts of PDF text extraction: typographic ligatures and `(cid:N)` glyph ids.
#[derive(Debug, Default)]
pub struct PdfArtifactFilter;

impl CharacterFilter for PdfArtifactFilter {
    fn filter(&self, text: String) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\u{FB02}' => out.push_str("fl"),
                '\u{FB01}' => out.push_str("fi"),
                '\u{FB00}' => out.push_str("ff"),
                '\u{FB03}' => out.push_str("ffi"),
                '\u{FB04}' => out.push_str("ffl"),
                c => out.push(c),
            }
        }
        PDF_CID_GLYPH.replace_all(&out, "").into_owned()
    }
}

/// Joins words split across lines by a trailing hyphen. A line break without a hyphen is kept.
#[derive(Debug, Default)]
pub struct HyphenationFilter;

impl CharacterFilter for HyphenationFilter {
    fn filter(&self, text: String) -> String {
        HYPHENATED_LINE_BREAK.replace_all(&text, "").into_owned()
    }
}

#[derive(Debug, Default)]
pub struct CaseFoldFilter;

impl CharacterFilter for CaseFoldFilter {
    fn filter(&self, text: String) -> String {
        text.to_lowercase()
    }
}

/// Splits the text on word boundaries, drops stopwords and joins the rest with single spaces.
pub struct StopWordFilter {
    lexicon: Arc<StopwordLexicon>,
    tokenizer: WordBoundaryTokenizer,
}

impl StopWordFilter {
    pub fn new(lexicon: Arc<StopwordLexicon>) -> Self {
        Self {
            lexicon,
            tokenizer: WordBoundaryTokenizer,
        }
    }
}

impl CharacterFilter for StopWordFilter {
    fn filter(&self, text: String) -> String {
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|w| !self.lexicon.contains(w))
            .collect::<Vec<String>>()
            .join(" ")
    }
}

/// Transliterates non-ASCII characters to their closest ASCII spelling
/// ("é" -> "e", "ß" -> "ss", "α" -> "a", "ж" -> "zh").
///
/// Spacing diacritics pass through untouched for [`SpacingMarkFilter`].
/// Characters with no ASCII rendition disappear.
#[derive(Debug, Default)]
pub struct AsciiFoldingFilter;

impl AsciiFoldingFilter {
    fn fold_char(c: char, out: &mut String) {
        if c.is_ascii() || SPACING_MARKS.contains(&c) {
            out.push(c);
        } else if c.is_whitespace() {
            out.push(' ');
        } else if let Some(ascii) = deunicode::deunicode_char(c) {
            // folding runs after case folding, keep the output lowercase
            out.extend(ascii.chars().map(|d| d.to_ascii_lowercase()));
        }
    }
}

impl CharacterFilter for AsciiFoldingFilter {
    fn filter(&self, text: String) -> String {
        if text.is_ascii() {
            return text;
        }
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            Self::fold_char(c, &mut out);
        }
        out
    }
}

/// Deletes spacing diacritical marks (´ ¨ ` ...) left over after folding.
#[derive(Debug, Default)]
pub struct SpacingMarkFilter;

impl CharacterFilter for SpacingMarkFilter {
    fn filter(&self, mut text: String) -> String {
        text.retain(|c| !SPACING_MARKS.contains(&c));
        text
    }
}

/// Collapses contractions and intra-word hyphens ("don't" -> "dont"), then
/// turns every other non-alphanumeric, non-whitespace character into a space.
#[derive(Debug, Default)]
pub struct PunctuationFilter;

impl CharacterFilter for PunctuationFilter {
    fn filter(&self, text: String) -> String {
        let collapsed = JOINED_APOSTROPHE_OR_HYPHEN.replace_all(&text, "${1}");
        NON_ALPHANUMERIC.replace_all(&collapsed, " ").into_owned()
    }
}

/// Deletes runs of digits that stand alone as a word.
#[derive(Debug, Default)]
pub struct NumericFilter;

impl CharacterFilter for NumericFilter {
    fn filter(&self, text: String) -> String {
        NUMERIC_RUN.replace_all(&text, "").into_owned()
    }
}

#[derive(Debug, Default)]
pub struct WhitespaceCollapseFilter;

impl CharacterFilter for WhitespaceCollapseFilter {
    fn filter(&self, text: String) -> String {
        WHITESPACE_RUN.replace_all(&text, " ").into_owned()
    }
}

/// A tokenizer receives a stream of characters, breaks it up into individual tokens (usually individual words),
/// and outputs a stream of tokens.
/// For instance, a whitespace tokenizer breaks text into tokens whenever it sees any whitespace.
/// It would convert the text "Quick brown fox!" into the terms [Quick, brown, fox!].
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: String) -> Vec<String>;
}

pub struct WhiteSpaceTokenizer;

impl Tokenizer for WhiteSpaceTokenizer {
    fn tokenize(&self, text: String) -> Vec<String> {
        text.split_whitespace()
            .map(|w| w.to_string())
            .collect::<Vec<String>>()
    }
}

/// Splits on Unicode word boundaries (UAX #29). Punctuation comes out as its
/// own token, whitespace is dropped, and a hyphen between two words stays
/// inside the word ("well-known" is one token).
pub struct WordBoundaryTokenizer;

impl Tokenizer for WordBoundaryTokenizer {
    fn tokenize(&self, text: String) -> Vec<String> {
        let starts_alphanumeric = |s: &str| s.chars().next().is_some_and(char::is_alphanumeric);
        let ends_alphanumeric = |s: &str| s.chars().next_back().is_some_and(char::is_alphanumeric);

        let mut tokens: Vec<String> = Vec::new();
        let mut open_hyphen = false;
        for segment in text.split_word_bounds() {
            if segment.chars().all(char::is_whitespace) {
                open_hyphen = false;
                continue;
            }
            if open_hyphen && starts_alphanumeric(segment) {
                if let Some(last) = tokens.last_mut() {
                    last.push_str(segment);
                    open_hyphen = false;
                    continue;
                }
            }
            open_hyphen = false;
            if segment == "-" {
                if let Some(last) = tokens.last_mut().filter(|t| ends_alphanumeric(t)) {
                    last.push('-');
                    open_hyphen = true;
                    continue;
                }
            }
            tokens.push(segment.to_string());
        }
        tokens
    }
}

/// A token filter receives the token stream and may add, remove, or change tokens.
/// For example, a length filter drops tokens that are too short or too long to be
/// meaningful terms.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken>;
}

/// Keeps tokens whose character count lies within the inclusive bounds.
pub struct TokenLengthFilter {
    bounds: TokenLengthBounds,
}

impl TokenLengthFilter {
    pub fn new(bounds: TokenLengthBounds) -> Self {
        Self { bounds }
    }
}

impl Default for TokenLengthFilter {
    fn default() -> Self {
        Self::new(TokenLengthBounds::default())
    }
}

impl TokenFilter for TokenLengthFilter {
    fn filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens.retain(|t| self.bounds.contains(&t.term));
        tokens
    }
}

/// Pure text analysis pipeline - no async, no I/O, just text transformations
pub struct TextAnalyzer {
    char_filters: Vec<Box<dyn CharacterFilter>>,
    tokenizer: Box<dyn Tokenizer>,
    token_filters: Vec<Box<dyn TokenFilter>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextToken {
    pub term: String,
    pub pos: usize,
}

impl std::ops::Deref for TextToken {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.term
    }
}

impl TextAnalyzer {
    pub fn new(
        char_filters: Vec<Box<dyn CharacterFilter>>,
        tokenizer: Box<dyn Tokenizer>,
        token_filters: Vec<Box<dyn TokenFilter>>,
    ) -> Self {
        Self {
            char_filters,
            tokenizer,
            token_filters,
        }
    }

    /// The document normalization chain. Order matters: stopwords are matched
    /// on case-folded text before accents are folded, and accents are folded
    /// before punctuation rules treat non-ASCII marks as noise.
    pub fn normalizer(
        lexicon: Arc<StopwordLexicon>,
        bounds: TokenLengthBounds,
        repair_pdf_artifacts: bool,
    ) -> Self {
        let mut char_filters: Vec<Box<dyn CharacterFilter>> = Vec::with_capacity(9);
        if repair_pdf_artifacts {
            char_filters.push(Box::new(PdfArtifactFilter));
        }
        char_filters.extend([
            Box::new(HyphenationFilter) as Box<dyn CharacterFilter>,
            Box::new(CaseFoldFilter),
            Box::new(StopWordFilter::new(lexicon)),
            Box::new(AsciiFoldingFilter),
            Box::new(SpacingMarkFilter),
            Box::new(PunctuationFilter),
            Box::new(NumericFilter),
            Box::new(WhitespaceCollapseFilter),
        ]);
        Self::new(
            char_filters,
            Box::new(WhiteSpaceTokenizer),
            vec![Box::new(TokenLengthFilter::new(bounds))],
        )
    }

    pub fn char_filter(&self, mut content: String) -> String {
        for filter in self.char_filters.iter() {
            content = filter.filter(content);
        }
        content
    }

    pub fn tokenize(&self, content: String) -> Vec<TextToken> {
        let tokens = self.tokenizer.tokenize(content);
        tokens
            .into_iter()
            .enumerate()
            .map(|(idx, term)| TextToken { term, pos: idx })
            .collect()
    }

    pub fn token_filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        for filter in self.token_filters.iter() {
            tokens = filter.filter(tokens);
        }
        tokens
    }

    /// Analyzes raw content and returns a list of tokens
    pub fn analyze(&self, raw_content: String) -> Vec<TextToken> {
        let content = self.char_filter(raw_content);
        let tokens = self.tokenize(content);
        self.token_filter(tokens)
    }

    /// Same as [`TextAnalyzer::analyze`] but yields bare terms in source order.
    pub fn normalize(&self, raw_content: &str) -> Vec<String> {
        self.analyze(raw_content.to_string())
            .into_iter()
            .map(|t| t.term)
            .collect()
    }
}
