use chumsky::Parser;

use crate::grammar_parser::grammar_file;

#[cfg(test)]
mod invalid_input_tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;

    fn log_errors(
        test_name: &str,
        input: &str,
        errors: impl IntoIterator<Item = impl std::fmt::Display>,
    ) {
        let folder = Path::new("target/test_errors");
        if !folder.exists() {
            fs::create_dir_all(folder).unwrap();
        }
        let file_path = folder.join(format!("{}.log", test_name));
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "Input:\n{}\n", input).unwrap();
        writeln!(file, "Errors:").unwrap();
        for e in errors {
            writeln!(file, "  - {}", e).unwrap();
        }
        println!("Parse errors logged to {:?}", file_path);
    }

    #[test]
    fn test_short_header() {
        let input = "1 2\nS\n( )\nS -> ( S ) S\nS\n";
        let result = grammar_file().parse(input);

        assert!(
            result.has_errors(),
            "Expected parser to fail on a header with two counts"
        );
        log_errors("short_header", input, result.errors());
    }

    #[test]
    fn test_non_numeric_header() {
        let input = "one 2 2\nS\n( )\nS -> ( S ) S\nS ->\nS\n";
        let result = grammar_file().parse(input);

        assert!(
            result.has_errors(),
            "Expected parser to fail on a non numeric count"
        );
        log_errors("non_numeric_header", input, result.errors());
    }

    #[test]
    fn test_missing_arrow() {
        let input = "1 1 1\nS\na\nS a S\nS\n";
        let result = grammar_file().parse(input);

        assert!(
            result.has_errors(),
            "Expected parser to fail when '->' is missing"
        );
        log_errors("missing_arrow", input, result.errors());
    }

    #[test]
    fn test_missing_start() {
        let input = "1 1 1\nS\na\nS -> a\n";
        let result = grammar_file().parse(input);

        assert!(
            result.has_errors(),
            "Expected parser to fail without a start symbol"
        );
        log_errors("missing_start", input, result.errors());
    }

    #[test]
    fn test_rule_count_mismatch() {
        let input = "1 1 3\nS\na\nS -> a S\nS ->\nS\n";
        let result = grammar_file().parse(input);

        assert!(
            result.has_errors(),
            "Expected parser to reject a wrong rule count"
        );
        let messages: Vec<String> = result.errors().map(|e| e.to_string()).collect();
        assert!(
            messages.iter().any(|m| m.contains("Header declares 3 rules, found 2")),
            "unexpected errors: {:?}",
            messages
        );
        log_errors("rule_count_mismatch", input, result.errors());
    }

    #[test]
    fn test_alphabet_count_mismatch() {
        let input = "2 1 1\nS\na b\nS -> a\nS\n";
        let result = grammar_file().parse(input);

        let messages: Vec<String> = result.errors().map(|e| e.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("2 nonterminals, found 1")));
        assert!(messages.iter().any(|m| m.contains("1 terminals, found 2")));
        log_errors("alphabet_count_mismatch", input, result.errors());
    }

    #[test]
    fn test_query_count_mismatch() {
        let input = "1 1 1\nS\na\nS -> a\nS\n3\na\naa\n";
        let result = grammar_file().parse(input);

        let messages: Vec<String> = result.errors().map(|e| e.to_string()).collect();
        assert!(messages
            .iter()
            .any(|m| m.contains("Query section declares 3 words, found 2")));
        log_errors("query_count_mismatch", input, result.errors());
    }

    #[test]
    fn test_trailing_garbage() {
        let input = "1 1 1\nS\na\nS -> a\nS T\n";
        let result = grammar_file().parse(input);

        assert!(
            result.has_errors(),
            "Expected parser to fail on a second start symbol"
        );
        log_errors("trailing_garbage", input, result.errors());
    }
}
