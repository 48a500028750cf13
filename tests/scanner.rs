#[cfg(test)]
mod scanner_tests {
    use pretty_assertions::assert_eq;

    use rlox::scanner::*;
    use rlox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanned: ScanResult = scan(source);

        assert!(scanned.errors.is_empty(), "{:?}", scanned.errors);
        assert_eq!(scanned.tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in
            scanned.tokens.iter().zip(expected.iter())
        {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn error_lines(source: &str) -> Vec<String> {
        scan(source).errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn symbols() {
        assert_token_sequence(
            "({*.,+*});-/",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::MINUS, "-"),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn two_character_operators_are_greedy() {
        assert_token_sequence(
            "!= ! == = <= < >= >",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::BANG, "!"),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::EQUAL, "="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::GREATER, ">"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_token_sequence(
            "class breaker break a1_ _x nil",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "breaker"),
                (TokenType::BREAK, "break"),
                (TokenType::IDENTIFIER, "a1_"),
                (TokenType::IDENTIFIER, "_x"),
                (TokenType::NIL, "nil"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn trailing_dot_is_not_part_of_a_number() {
        assert_token_sequence(
            "123. 4.5",
            &[
                (TokenType::NUMBER(0.0), "123"),
                (TokenType::DOT, "."),
                (TokenType::NUMBER(0.0), "4.5"),
                (TokenType::EOF, ""),
            ],
        );

        let tokens: Vec<Token> = scan("4.5").tokens;
        assert!(matches!(tokens[0].token_type, TokenType::NUMBER(n) if n == 4.5));
    }

    #[test]
    fn strings_keep_raw_text_and_count_lines() {
        let tokens: Vec<Token> = scan("\"one\ntwo\" x").tokens;

        assert!(matches!(&tokens[0].token_type, TokenType::STRING(s) if s == "one\ntwo"));
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].token_type, TokenType::EOF);
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn comments_are_skipped() {
        assert_token_sequence(
            "// whole line\n1 /* inline */ + /* outer /* inner */ still outer */ 2",
            &[
                (TokenType::NUMBER(0.0), "1"),
                (TokenType::PLUS, "+"),
                (TokenType::NUMBER(0.0), "2"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn unexpected_chars_do_not_stop_scanning() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source).collect();

        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let error_count = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(error_count, 2, "Expected 2 error messages");

        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.to_string(), "[line 1] Error: Unexpected character.");
        }

        fn assert_token_matches(
            result: &rlox::error::Result<Token>,
            expected_type: TokenType,
            expected_lexeme: &str,
        ) {
            match result {
                Ok(token) => {
                    assert_eq!(
                        token.token_type, expected_type,
                        "Expected token type {:?}, got {:?}",
                        expected_type, token.token_type
                    );
                    assert_eq!(
                        token.lexeme, expected_lexeme,
                        "Expected lexeme '{}', got '{}'",
                        expected_lexeme, token.lexeme
                    );
                }
                Err(e) => panic!("Expected token but got error: {}", e),
            }
        }
    }

    #[test]
    fn one_error_per_non_ascii_character() {
        assert_eq!(
            error_lines("??\n?£\n⅛\n1"),
            vec![
                "[line 1] Error: Unexpected character.",
                "[line 1] Error: Unexpected character.",
                "[line 2] Error: Unexpected character.",
                "[line 2] Error: Unexpected character.",
                "[line 3] Error: Unexpected character.",
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(
            error_lines("1; \"oh\nno"),
            vec!["[line 2] Error: Unterminated string."]
        );
    }

    #[test]
    fn unterminated_block_comment_reports_innermost_opening_line() {
        assert_eq!(
            error_lines("/*oh no"),
            vec!["[line 1] Error: Unterminated block comment."]
        );
        assert_eq!(
            error_lines("/*oh no\n/*oh no\n/*oh no no no\n"),
            vec!["[line 3] Error: Unterminated block comment."]
        );
        assert_eq!(
            error_lines("/* a\n/* b */\nstill open"),
            vec!["[line 1] Error: Unterminated block comment."]
        );
    }

    #[test]
    fn eof_token_sits_on_the_last_line() {
        let tokens: Vec<Token> = scan("1\n2\n").tokens;
        let eof: &Token = tokens.last().unwrap();

        assert_eq!(eof.token_type, TokenType::EOF);
        assert_eq!(eof.line, 3);
    }

    #[test]
    fn token_display() {
        let tokens: Vec<Token> = scan("var x = 3 + 3.25 \"hi\"").tokens;
        let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        assert_eq!(
            rendered,
            vec![
                "VAR var null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 3 3.0",
                "PLUS + null",
                "NUMBER 3.25 3.25",
                "STRING \"hi\" hi",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn tokens_serialize_to_json() {
        let tokens: Vec<Token> = scan("x").tokens;
        let json: String = serde_json::to_string(&tokens[0]).unwrap();

        assert!(json.contains("\"lexeme\":\"x\""), "{}", json);
        assert!(json.contains("\"line\":1"), "{}", json);
    }
}
