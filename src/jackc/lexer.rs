use std::{fmt, iter::Peekable, mem, str::Chars};

use super::error::{LexError, LexErrorKind, Position};

/// Largest integer constant the VM word can hold.
pub const MAX_INTEGER: u16 = i16::MAX as u16;

pub const SYMBOLS: [char; 19] = [
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "class" => Keyword::Class,
            "constructor" => Keyword::Constructor,
            "function" => Keyword::Function,
            "method" => Keyword::Method,
            "field" => Keyword::Field,
            "static" => Keyword::Static,
            "var" => Keyword::Var,
            "int" => Keyword::Int,
            "char" => Keyword::Char,
            "boolean" => Keyword::Boolean,
            "void" => Keyword::Void,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "this" => Keyword::This,
            "let" => Keyword::Let,
            "do" => Keyword::Do,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "return" => Keyword::Return,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(char),
    Identifier(String),
    IntegerConstant(u16),
    StringConstant(String),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "keyword '{}'", k),
            TokenKind::Symbol(c) => write!(f, "symbol '{}'", c),
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::IntegerConstant(n) => write!(f, "integer {}", n),
            TokenKind::StringConstant(s) => write!(f, "string \"{}\"", s),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Token { kind, position }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(k) => Some(k),
            _ => None,
        }
    }

    /// Whether this token can begin a term, and therefore an expression.
    pub fn starts_term(&self) -> bool {
        match &self.kind {
            TokenKind::IntegerConstant(_)
            | TokenKind::StringConstant(_)
            | TokenKind::Identifier(_) => true,
            TokenKind::Keyword(k) => matches!(
                k,
                Keyword::True | Keyword::False | Keyword::Null | Keyword::This
            ),
            TokenKind::Symbol(c) => matches!(c, '(' | '-' | '~'),
            TokenKind::Eof => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Tokenizer with a two-slot buffer: the current token and the one after it.
#[derive(Debug)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: Position,
    current: Token,
    next: Token,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Result<Self, LexError> {
        let start = Position::default();
        let mut lexer = Lexer {
            chars: src.chars().peekable(),
            position: start,
            current: Token::new(TokenKind::Eof, start),
            next: Token::new(TokenKind::Eof, start),
        };
        // Fill both buffer slots
        lexer.advance()?;
        lexer.advance()?;
        Ok(lexer)
    }

    pub fn has_more(&self) -> bool {
        !self.current.is_eof()
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn peek(&self) -> &Token {
        &self.next
    }

    /// Consume the current token and return it. The lookahead token
    /// becomes current and a fresh token is scanned into the lookahead slot.
    pub fn advance(&mut self) -> Result<Token, LexError> {
        let scanned = self.scan()?;
        let next = mem::replace(&mut self.next, scanned);
        Ok(mem::replace(&mut self.current, next))
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        Some(ch)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.chars.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') => match self.peek_second() {
                    Some('/') => self.skip_line_comment(),
                    Some('*') => self.skip_block_comment()?,
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.position;
        // Opening "/*"
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.chars.peek() == Some(&'/') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(LexError::new(LexErrorKind::UnterminatedComment, start)),
            }
        }
    }

    fn scan_word(&mut self) -> TokenKind {
        let mut value = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                value.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        match Keyword::from_word(&value) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(value),
        }
    }

    fn scan_integer(&mut self, start: Position) -> Result<TokenKind, LexError> {
        let mut value = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                value.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        match value.parse::<u16>() {
            Ok(n) if n <= MAX_INTEGER => Ok(TokenKind::IntegerConstant(n)),
            _ => Err(LexError::new(LexErrorKind::IntegerOutOfRange(value), start)),
        }
    }

    fn scan_string(&mut self, start: Position) -> Result<TokenKind, LexError> {
        // Opening quote
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(TokenKind::StringConstant(value)),
                Some(ch) => value.push(ch),
                None => return Err(LexError::new(LexErrorKind::UnterminatedString, start)),
            }
        }
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;
        let position = self.position;

        let kind = match self.chars.peek().copied() {
            None => TokenKind::Eof,
            Some(ch) if ch.is_ascii_alphabetic() => self.scan_word(),
            Some(ch) if ch.is_ascii_digit() => self.scan_integer(position)?,
            Some('"') => self.scan_string(position)?,
            Some(ch) if SYMBOLS.contains(&ch) => {
                self.bump();
                TokenKind::Symbol(ch)
            }
            Some(ch) => {
                return Err(LexError::new(LexErrorKind::InvalidCharacter(ch), position));
            }
        };

        Ok(Token::new(kind, position))
    }
}
