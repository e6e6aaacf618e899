use errors::{Line, Reporter, SlangError};

pub mod token;
pub use token::{format_number, LiteralValue, Token, TokenKind};
use TokenKind::*;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ScanError {
    #[error("Unsupported character: {0}")]
    UnsupportedCharacter(char),
    #[error("Unterminated string")]
    UnterminatedString,
}

pub struct Scanner {
    start: usize,
    current: usize,
    line: usize,
    source: Vec<char>,
    tokens: Vec<Token>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self { start: 0, current: 0, line: 1, source: source.chars().collect(), tokens: Vec::new() }
    }

    /// Scans the whole source. Lexical errors go to `reporter` and scanning
    /// carries on, so the result always ends with an `Eof` token.
    pub fn scan_tokens(mut self, reporter: &mut impl Reporter) -> Vec<Token> {
        while let Some(c) = self.consume() {
            self.start = self.current - 1;
            match c {
                '(' => self.add_token(LeftParen),
                ')' => self.add_token(RightParen),
                '{' => self.add_token(LeftBrace),
                '}' => self.add_token(RightBrace),
                ',' => self.add_token(Comma),
                '.' => self.add_token(Dot),
                '-' => self.add_token(Minus),
                '+' => self.add_token(Plus),
                ';' => self.add_token(Semicolon),
                '*' => self.add_token(Star),

                '!' => {
                    let kind = if self.consume_if_matches('=') { BangEqual } else { Bang };
                    self.add_token(kind)
                }
                '=' => {
                    let kind = if self.consume_if_matches('=') { EqualEqual } else { Equal };
                    self.add_token(kind)
                }
                '<' => {
                    let kind = if self.consume_if_matches('=') { LessEqual } else { Less };
                    self.add_token(kind)
                }
                '>' => {
                    let kind = if self.consume_if_matches('=') { GreaterEqual } else { Greater };
                    self.add_token(kind)
                }

                '/' => {
                    if self.consume_if_matches('/') {
                        // Comment, the newline itself is left for the main loop
                        while self.peek().is_some_and(|c| c != '\n') {
                            self.consume();
                        }
                    } else {
                        self.add_token(Slash)
                    }
                }

                '"' => self.string(reporter),

                d if d.is_ascii_digit() => self.number(),

                a if is_alpha(a) => self.identifier(),

                ' ' | '\r' | '\t' => (),

                '\n' => self.line += 1,

                c => self.error(self.line, ScanError::UnsupportedCharacter(c), reporter),
            }
        }

        self.tokens.push(Token::eof(Line(self.line)));
        self.tokens
    }

    fn error(&self, line: usize, error: ScanError, reporter: &mut impl Reporter) {
        reporter.report(SlangError::Lexical { line: Line(line), message: error.to_string() });
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_literal_token(kind, None)
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: Option<LiteralValue>) {
        let token = Token::new(kind, self.lexeme(), literal, Line(self.line));
        log::trace!("{token}");
        self.tokens.push(token);
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.current += 1;
        Some(c)
    }

    fn consume_if_matches(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(c) if c == expected => {
                self.current += 1;
                true
            }
            _ => false,
        }
    }

    fn consume_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.current += 1;
        }
    }

    fn string(&mut self, reporter: &mut impl Reporter) {
        let start_line = self.line;
        loop {
            match self.consume() {
                Some('"') => break,
                Some('\n') => self.line += 1,
                Some(_) => (),
                None => {
                    self.error(start_line, ScanError::UnterminatedString, reporter);
                    return;
                }
            }
        }

        let contents = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_literal_token(Str, Some(LiteralValue::Str(contents)));
    }

    fn number(&mut self) {
        self.consume_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.current += 1;
            self.consume_while(|c| c.is_ascii_digit());
        }

        // digit+ ('.' digit+)? is always a valid f64
        let value = self.lexeme().parse().unwrap_or_default();
        self.add_literal_token(Number, Some(LiteralValue::Number(value)));
    }

    fn identifier(&mut self) {
        self.consume_while(is_alphanumeric);
        let kind = TokenKind::keyword(&self.lexeme()).unwrap_or(Identifier);
        self.add_token(kind);
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use errors::ErrorReporter;
    use pretty_assertions::assert_eq;

    use super::*;

    fn scan(source: &str) -> (Vec<Token>, ErrorReporter) {
        let mut reporter = ErrorReporter::new();
        let tokens = Scanner::new(source).scan_tokens(&mut reporter);
        (tokens, reporter)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).0.into_iter().map(|t| t.kind).collect()
    }

    fn token(kind: TokenKind, lexeme: &str, line: usize) -> Token {
        Token::new(kind, lexeme, None, Line(line))
    }

    #[test]
    fn string_literals() {
        let (tokens, reporter) = scan("\"hello world\"");
        assert!(!reporter.had_error());
        assert_eq!(
            tokens,
            vec![
                Token::new(
                    Str,
                    "\"hello world\"",
                    Some(LiteralValue::Str("hello world".to_string())),
                    Line(1)
                ),
                Token::eof(Line(1)),
            ]
        );

        let (tokens, _) = scan("\"\"");
        assert_eq!(tokens[0].literal, Some(LiteralValue::Str(String::new())));

        // No escape processing
        let (tokens, _) = scan(r#""a\nb""#);
        assert_eq!(tokens[0].literal, Some(LiteralValue::Str(r"a\nb".to_string())));
    }

    #[test]
    fn multiline_string() {
        let (tokens, reporter) = scan("\"a\nb\" 1");
        assert!(!reporter.had_error());
        assert_eq!(tokens[0].literal, Some(LiteralValue::Str("a\nb".to_string())));
        assert_eq!(tokens[1].line, Line(2));
        assert_eq!(tokens[2], Token::eof(Line(2)));
    }

    #[test]
    fn unterminated_string() {
        let (tokens, reporter) = scan("\"abc");
        assert_eq!(tokens, vec![Token::eof(Line(1))]);
        assert_eq!(
            reporter.errors().0,
            vec![SlangError::Lexical {
                line: Line(1),
                message: ScanError::UnterminatedString.to_string()
            }]
        );

        // Reported on the line the string started on
        let (tokens, reporter) = scan("1\n\"abc\ndef");
        assert_eq!(tokens.last(), Some(&Token::eof(Line(3))));
        assert_eq!(reporter.errors()[0].line(), Line(2));
    }

    #[test]
    fn two_char_tokens() {
        let (tokens, _) = scan("! != = == < <= > >=");
        assert_eq!(
            tokens,
            vec![
                token(Bang, "!", 1),
                token(BangEqual, "!=", 1),
                token(Equal, "=", 1),
                token(EqualEqual, "==", 1),
                token(Less, "<", 1),
                token(LessEqual, "<=", 1),
                token(Greater, ">", 1),
                token(GreaterEqual, ">=", 1),
                Token::eof(Line(1)),
            ]
        );
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(
            kinds("=(){},.-+;*/!<>"),
            vec![
                Equal, LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus,
                Semicolon, Star, Slash, Bang, Less, Greater, Eof,
            ]
        );
    }

    #[test]
    fn comments() {
        let (tokens, _) = scan("a // comment\nb");
        assert_eq!(
            tokens,
            vec![token(Identifier, "a", 1), token(Identifier, "b", 2), Token::eof(Line(2))]
        );

        assert_eq!(kinds("1 // trailing"), vec![Number, Eof]);
        assert_eq!(kinds("4 / 2"), vec![Number, Slash, Number, Eof]);
    }

    #[test]
    fn numbers() {
        let (tokens, _) = scan("123 45.67");
        assert_eq!(tokens[0].literal, Some(LiteralValue::Number(123.0)));
        assert_eq!(tokens[1].literal, Some(LiteralValue::Number(45.67)));
        assert_eq!(tokens[1].lexeme, "45.67");

        // A trailing dot is not part of the number
        let (tokens, _) = scan("12.");
        assert_eq!(
            tokens,
            vec![
                Token::new(Number, "12", Some(LiteralValue::Number(12.0)), Line(1)),
                token(Dot, ".", 1),
                Token::eof(Line(1)),
            ]
        );

        assert_eq!(kinds(".5"), vec![Dot, Number, Eof]);
        assert_eq!(kinds("1.2.3"), vec![Number, Dot, Number, Eof]);
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            kinds("and class else false for fun if nil or print return super this true var while"),
            vec![
                And, Class, Else, False, For, Fun, If, Nil, Or, Print, Return, Super, This, True,
                Var, While, Eof,
            ]
        );

        let (tokens, _) = scan("_foo bar2 orchid");
        assert_eq!(
            tokens,
            vec![
                token(Identifier, "_foo", 1),
                token(Identifier, "bar2", 1),
                token(Identifier, "orchid", 1),
                Token::eof(Line(1)),
            ]
        );
    }

    #[test]
    fn unsupported_characters_keep_scanning() {
        let (tokens, reporter) = scan("1 @ 2\n$");
        assert_eq!(tokens.iter().map(|t| t.kind).collect::<Vec<_>>(), vec![Number, Number, Eof]);
        assert_eq!(
            reporter.errors().0,
            vec![
                SlangError::Lexical {
                    line: Line(1),
                    message: ScanError::UnsupportedCharacter('@').to_string()
                },
                SlangError::Lexical {
                    line: Line(2),
                    message: ScanError::UnsupportedCharacter('$').to_string()
                },
            ]
        );
        assert_eq!(reporter.errors()[0].to_string(), "[line 1] Error: Unsupported character: @");
    }

    #[test]
    fn whitespace_and_lines() {
        let (tokens, reporter) = scan(" \t\r\n\n  ");
        assert!(!reporter.had_error());
        assert_eq!(tokens, vec![Token::eof(Line(3))]);
    }
}
