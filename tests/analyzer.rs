use corpus_prep::analyzer::*;
use corpus_prep::config::TokenLengthBounds;
use corpus_prep::lexicon::StopwordLexicon;
use std::sync::Arc;

fn normalizer_with(stopwords: &[&str]) -> TextAnalyzer {
    TextAnalyzer::normalizer(
        Arc::new(StopwordLexicon::from_words(stopwords)),
        TokenLengthBounds::default(),
        true,
    )
}

fn english_normalizer() -> TextAnalyzer {
    TextAnalyzer::normalizer(
        Arc::new(StopwordLexicon::english()),
        TokenLengthBounds::default(),
        true,
    )
}

// CharacterFilter Tests

#[cfg(test)]
mod character_filter_tests {
    use super::*;

    mod hyphenation_filter {
        use super::*;

        #[test]
        fn test_joins_across_unix_newline() {
            assert_eq!(HyphenationFilter.filter("topic mod-\nels".into()), "topic models");
        }

        #[test]
        fn test_joins_across_old_mac_newline() {
            assert_eq!(HyphenationFilter.filter("mod-\rels".into()), "models");
        }

        #[test]
        fn test_plain_newline_untouched() {
            assert_eq!(HyphenationFilter.filter("end\nstart".into()), "end\nstart");
        }

        #[test]
        fn test_hyphen_before_space_untouched() {
            assert_eq!(HyphenationFilter.filter("pre- post".into()), "pre- post");
        }
    }

    mod case_fold_filter {
        use super::*;

        #[test]
        fn test_lowercases_unicode() {
            assert_eq!(CaseFoldFilter.filter("ÉCOLE Normale".into()), "école normale");
        }
    }

    mod stopword_filter {
        use super::*;

        #[test]
        fn test_removes_stopwords_and_rejoins() {
            let filter = StopWordFilter::new(Arc::new(StopwordLexicon::from_words(["the", "of"])));
            assert_eq!(
                filter.filter("the history of   the\nworld".into()),
                "history world"
            );
        }

        #[test]
        fn test_punctuation_becomes_separate_token() {
            let filter = StopWordFilter::new(Arc::new(StopwordLexicon::from_words(["and"])));
            assert_eq!(filter.filter("cats, and dogs.".into()), "cats , dogs .");
        }

        #[test]
        fn test_english_lexicon() {
            let filter = StopWordFilter::new(Arc::new(StopwordLexicon::english()));
            let result = filter.filter("the cat and the hat".into());
            assert!(!result.split(' ').any(|w| w == "the" || w == "and"));
            assert!(result.contains("cat"));
        }

        #[test]
        fn test_empty() {
            let filter = StopWordFilter::new(Arc::new(StopwordLexicon::english()));
            assert_eq!(filter.filter(String::new()), "");
        }
    }

    mod ascii_folding_filter {
        use super::*;

        #[test]
        fn test_ascii_passthrough() {
            assert_eq!(AsciiFoldingFilter.filter("plain text".into()), "plain text");
        }

        #[test]
        fn test_diacritics() {
            assert_eq!(
                AsciiFoldingFilter.filter("crème brûlée à la façade".into()),
                "creme brulee a la facade"
            );
        }

        #[test]
        fn test_letters_without_decomposition() {
            assert_eq!(AsciiFoldingFilter.filter("søren łódź".into()), "soren lodz");
        }

        #[test]
        fn test_compatibility_forms() {
            assert_eq!(AsciiFoldingFilter.filter("ｔｅｘｔ x²".into()), "text x2");
        }

        #[test]
        fn test_dashes_and_quotes() {
            assert_eq!(
                AsciiFoldingFilter.filter("\u{201C}quoted\u{201D} \u{2013} dash".into()),
                "\"quoted\" - dash"
            );
        }

        #[test]
        fn test_greek_and_cyrillic_transliterated() {
            assert_eq!(
                AsciiFoldingFilter.filter("αβγ привет москва".into()),
                "abg privet moskva"
            );
        }
    }

    mod punctuation_filter {
        use super::*;

        #[test]
        fn test_contraction_collapse() {
            assert_eq!(PunctuationFilter.filter("isn't it".into()), "isnt it");
        }

        #[test]
        fn test_hyphen_run_collapse() {
            assert_eq!(PunctuationFilter.filter("state--of-the-art".into()), "stateoftheart");
        }

        #[test]
        fn test_other_punctuation_to_space() {
            assert_eq!(PunctuationFilter.filter("a.b,c;d".into()), "a b c d");
        }

        #[test]
        fn test_leading_apostrophe_before_word() {
            assert_eq!(PunctuationFilter.filter("'quoted'".into()), "quoted ");
        }
    }

    mod numeric_filter {
        use super::*;

        #[test]
        fn test_standalone_numbers_removed() {
            assert_eq!(NumericFilter.filter("page 12 of 300".into()), "page  of ");
        }

        #[test]
        fn test_alphanumeric_kept() {
            assert_eq!(NumericFilter.filter("covid19 h2o 3d".into()), "covid19 h2o 3d");
        }
    }

    mod whitespace_collapse_filter {
        use super::*;

        #[test]
        fn test_collapses_mixed_whitespace() {
            assert_eq!(
                WhitespaceCollapseFilter.filter("a \t\n  b\r\nc".into()),
                "a b c"
            );
        }
    }
}

// Tokenizer Tests

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    mod whitespace_tokenizer {
        use super::*;

        #[test]
        fn test_multiple_spaces() {
            let tokenizer = WhiteSpaceTokenizer;
            let result = tokenizer.tokenize("hello    world".to_string());
            assert_eq!(result, vec!["hello", "world"]);
        }

        #[test]
        fn test_only_whitespace() {
            let tokenizer = WhiteSpaceTokenizer;
            let result = tokenizer.tokenize("   \n\t   ".to_string());
            assert_eq!(result.len(), 0);
        }

        #[test]
        fn test_mixed_whitespace_types() {
            let tokenizer = WhiteSpaceTokenizer;
            let result = tokenizer.tokenize("a\tb\nc\rd \n\t e".to_string());
            assert_eq!(result, vec!["a", "b", "c", "d", "e"]);
        }
    }

    mod word_boundary_tokenizer {
        use super::*;

        #[test]
        fn test_splits_punctuation() {
            let result = WordBoundaryTokenizer.tokenize("hello, world!".to_string());
            assert_eq!(result, vec!["hello", ",", "world", "!"]);
        }

        #[test]
        fn test_keeps_contractions() {
            let result = WordBoundaryTokenizer.tokenize("don't stop".to_string());
            assert_eq!(result, vec!["don't", "stop"]);
        }

        #[test]
        fn test_keeps_decimal_numbers() {
            let result = WordBoundaryTokenizer.tokenize("pi is 3.14".to_string());
            assert_eq!(result, vec!["pi", "is", "3.14"]);
        }

        #[test]
        fn test_multi_hyphen_compound() {
            let result = WordBoundaryTokenizer.tokenize("state-of-the-art work".to_string());
            assert_eq!(result, vec!["state-of-the-art", "work"]);
        }
    }
}

// Full normalization chain

#[cfg(test)]
mod normalizer_tests {
    use super::*;

    fn is_clean(tokens: &[String]) -> bool {
        tokens.iter().all(|t| {
            let len = t.chars().count();
            (3..=20).contains(&len)
                && t
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
    }

    #[test]
    fn test_output_alphabet_and_lengths() {
        let analyzer = english_normalizer();
        let inputs = [
            "",
            "The Quick Brown Fox — jumps over 13 lazy dogs!!!",
            "Ｆｕｌｌｗｉｄｔｈ ＴＥＸＴ and ℌilbert spaces",
            "Zürich, Köln & Łódź — naïve café crème",
            "e\u{FB03}cient \u{FB02}ow (cid:42) analysis",
            "semi-\nconductors, well-known state-of-the-art results",
            "emoji 🚀 rocket ☕ coffee 日本語 text",
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa short ab abc",
            "tabs\tand\r\nwindows\rline endings",
            "quotes \u{201C}smart\u{201D} and \u{2018}single\u{2019} ones",
            "x\u{00B4}y \u{00A8}umlaut `grave` ^caret~",
        ];
        for input in inputs {
            let tokens = analyzer.normalize(input);
            assert!(is_clean(&tokens), "{input:?} produced {tokens:?}");
            let joined = tokens.join(" ");
            assert!(!joined.contains("  "));
            assert_eq!(joined.trim(), joined);
        }
    }

    #[test]
    fn test_idempotent_on_ordinary_text() {
        let analyzer = english_normalizer();
        let inputs = [
            "Latent Dirichlet allocation models documents as mixtures of topics.",
            "Gibbs sampling, variational inference; and 2 other methods (1999).",
            "Über-complex résumés were parsed by ﬁfty tools.",
        ];
        for input in inputs {
            let once = analyzer.normalize(input).join(" ");
            let twice = analyzer.normalize(&once).join(" ");
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_stopwords_matched_before_folding() {
        // stopword removal sees "é" while it is still accented
        let analyzer = normalizer_with(&["the"]);
        assert_eq!(analyzer.normalize("the thé tea"), vec!["the", "tea"]);
    }

    #[test]
    fn test_non_latin_scripts_survive_folding() {
        let analyzer = normalizer_with(&[]);
        assert_eq!(
            analyzer.normalize("Привет мир Москва αβγ-phase μ-metal"),
            vec!["privet", "mir", "moskva", "abgphase", "mmetal"]
        );
    }

    #[test]
    fn test_english_stopwords_keep_content_words() {
        let analyzer = english_normalizer();
        assert_eq!(
            analyzer.normalize("The research system and don't the results"),
            vec!["research", "system", "results"]
        );
    }

    #[test]
    fn test_repeated_character_tokens_pass() {
        let analyzer = normalizer_with(&[]);
        assert_eq!(analyzer.normalize("zzz zz"), vec!["zzz"]);
    }

    #[test]
    fn test_numbers_only_removed_as_whole_words() {
        let analyzer = normalizer_with(&[]);
        assert_eq!(
            analyzer.normalize("in 2020 the mp3 and x86 chips"),
            vec!["the", "mp3", "and", "x86", "chips"]
        );
    }

    #[test]
    fn test_hyphenated_line_break_joined_before_tokenizing() {
        let analyzer = normalizer_with(&[]);
        assert_eq!(analyzer.normalize("topic mod-\nelling"), vec!["topic", "modelling"]);
        assert_eq!(analyzer.normalize("topic\nmodelling"), vec!["topic", "modelling"]);
    }

    #[test]
    fn test_custom_length_bounds() {
        let analyzer = TextAnalyzer::normalizer(
            Arc::new(StopwordLexicon::from_words(Vec::<&str>::new())),
            TokenLengthBounds::new(2, 4),
            true,
        );
        assert_eq!(analyzer.normalize("a ab abcd abcde"), vec!["ab", "abcd"]);
    }

    #[test]
    fn test_pdf_artifact_repair_can_be_disabled() {
        let raw = "e\u{FB03}cient(cid:7)";
        let repaired = normalizer_with(&[]);
        assert_eq!(repaired.normalize(raw), vec!["efficient"]);

        let untouched = TextAnalyzer::normalizer(
            Arc::new(StopwordLexicon::from_words(Vec::<&str>::new())),
            TokenLengthBounds::default(),
            false,
        );
        // the ligature is still transliterated, the glyph id leaves "cid" behind
        assert_eq!(untouched.normalize(raw), vec!["efficient", "cid"]);
    }

    #[test]
    fn test_analyze_positions_follow_surviving_tokens() {
        let analyzer = normalizer_with(&[]);
        let tokens = analyzer.analyze("one two three".to_string());
        let positions: Vec<usize> = tokens.iter().map(|t| t.pos).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}
