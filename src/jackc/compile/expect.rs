use crate::jackc::{
    error::{CompileError, Position},
    lexer::{Keyword, Token, TokenKind},
    scope::{self, Variable},
};

use super::CompilationEngine;

fn describe_keywords(keywords: &[Keyword]) -> String {
    let names: Vec<String> = keywords.iter().map(|k| format!("'{}'", k)).collect();
    format!("one of {}", names.join(", "))
}

impl CompilationEngine<'_, '_> {
    /// Build an `UnexpectedToken` error for the current token.
    pub(super) fn unexpected(&self, expected: impl Into<String>) -> CompileError {
        let token = self.lexer.current();
        CompileError::UnexpectedToken {
            expected: expected.into(),
            found: token.to_string(),
            position: token.position,
        }
    }

    pub(super) fn advance(&mut self) -> Result<Token, CompileError> {
        Ok(self.lexer.advance()?)
    }

    pub(super) fn expect_symbol(&mut self, symbol: char) -> Result<(), CompileError> {
        if !self.lexer.current().is_symbol(symbol) {
            return Err(self.unexpected(format!("symbol '{}'", symbol)));
        }
        self.advance()?;
        Ok(())
    }

    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), CompileError> {
        if !self.lexer.current().is_keyword(keyword) {
            return Err(self.unexpected(format!("keyword '{}'", keyword)));
        }
        self.advance()?;
        Ok(())
    }

    pub(super) fn current_is_any_keyword(&self, keywords: &[Keyword]) -> bool {
        self.lexer
            .current()
            .keyword()
            .is_some_and(|k| keywords.contains(&k))
    }

    pub(super) fn expect_any_keyword(&mut self, keywords: &[Keyword]) -> Result<Keyword, CompileError> {
        match self.lexer.current().keyword() {
            Some(k) if keywords.contains(&k) => {
                self.advance()?;
                Ok(k)
            }
            _ => Err(self.unexpected(describe_keywords(keywords))),
        }
    }

    pub(super) fn expect_identifier(&mut self) -> Result<(String, Position), CompileError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.position)),
            found => Err(CompileError::UnexpectedToken {
                expected: "identifier".into(),
                found: found.to_string(),
                position: token.position,
            }),
        }
    }

    /// Advance past `symbol` only if it is the current token.
    pub(super) fn advance_optional_symbol(&mut self, symbol: char) -> Result<bool, CompileError> {
        let found = self.lexer.current().is_symbol(symbol);
        if found {
            self.advance()?;
        }
        Ok(found)
    }

    pub(super) fn advance_optional_keyword(&mut self, keyword: Keyword) -> Result<bool, CompileError> {
        let found = self.lexer.current().is_keyword(keyword);
        if found {
            self.advance()?;
        }
        Ok(found)
    }

    /// Look `name` up in the subroutine scope, then the class scope.
    pub(super) fn find_variable(&self, name: &str) -> Option<Variable> {
        scope::resolve(&self.subroutine_scope, &self.class_scope, name)
            .ok()
            .cloned()
    }

    pub(super) fn resolve(&self, name: &str, position: Position) -> Result<Variable, CompileError> {
        scope::resolve(&self.subroutine_scope, &self.class_scope, name)
            .cloned()
            .map_err(|e| e.at(position))
    }
}
