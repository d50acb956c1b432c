use crate::jackc::{
    error::CompileError,
    lexer::{Keyword, TokenKind},
    vm::{
        Command, Segment,
        operand::{THAT_POINTER, THIS_POINTER},
    },
};

use super::{
    CompilationEngine, MATH_DIVIDE, MATH_MULTIPLY, STRING_APPEND_CHAR, STRING_NEW,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    And,
    Or,
    LessThan,
    GreaterThan,
    Equals,
}

impl BinaryOperation {
    fn from_token_kind(kind: &TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Symbol('+') => BinaryOperation::Add,
            TokenKind::Symbol('-') => BinaryOperation::Subtract,
            TokenKind::Symbol('*') => BinaryOperation::Multiply,
            TokenKind::Symbol('/') => BinaryOperation::Divide,
            TokenKind::Symbol('&') => BinaryOperation::And,
            TokenKind::Symbol('|') => BinaryOperation::Or,
            TokenKind::Symbol('<') => BinaryOperation::LessThan,
            TokenKind::Symbol('>') => BinaryOperation::GreaterThan,
            TokenKind::Symbol('=') => BinaryOperation::Equals,
            _ => return None,
        };
        Some(op)
    }
}

impl CompilationEngine<'_, '_> {
    /// `term (op term)*`, folded strictly left to right.
    ///
    /// Operators have no precedence: `a + b * c` computes `(a + b) * c`.
    pub(super) fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;

        while let Some(op) = BinaryOperation::from_token_kind(&self.lexer.current().kind) {
            self.advance()?;
            self.compile_term()?;
            self.emit_binary(op);
        }
        Ok(())
    }

    fn emit_binary(&mut self, op: BinaryOperation) {
        match op {
            BinaryOperation::Add => self.writer.arithmetic(Command::Add),
            BinaryOperation::Subtract => self.writer.arithmetic(Command::Sub),
            // No native multiply or divide in the VM
            BinaryOperation::Multiply => self.writer.call(MATH_MULTIPLY, 2),
            BinaryOperation::Divide => self.writer.call(MATH_DIVIDE, 2),
            BinaryOperation::And => self.writer.arithmetic(Command::And),
            BinaryOperation::Or => self.writer.arithmetic(Command::Or),
            BinaryOperation::LessThan => self.writer.arithmetic(Command::Lt),
            BinaryOperation::GreaterThan => self.writer.arithmetic(Command::Gt),
            BinaryOperation::Equals => self.writer.arithmetic(Command::Eq),
        }
    }

    fn compile_term(&mut self) -> Result<(), CompileError> {
        match &self.lexer.current().kind {
            TokenKind::Identifier(_) => {
                let next = self.lexer.peek();
                if next.is_symbol('[') {
                    self.compile_array_read()
                } else if next.is_symbol('(') || next.is_symbol('.') {
                    self.compile_subroutine_call()
                } else {
                    let (name, position) = self.expect_identifier()?;
                    let var = self.resolve(&name, position)?;
                    self.writer.push(var.segment(), var.index);
                    Ok(())
                }
            }
            TokenKind::IntegerConstant(value) => {
                let value = usize::from(*value);
                self.advance()?;
                self.writer.push(Segment::Constant, value);
                Ok(())
            }
            TokenKind::StringConstant(_) => {
                if let TokenKind::StringConstant(text) = self.advance()?.kind {
                    self.emit_string(&text);
                }
                Ok(())
            }
            TokenKind::Keyword(keyword) => {
                let keyword = *keyword;
                self.compile_keyword_constant(keyword)
            }
            TokenKind::Symbol('(') => {
                self.advance()?;
                self.compile_expression()?;
                self.expect_symbol(')')
            }
            TokenKind::Symbol('-') => {
                self.advance()?;
                self.compile_term()?;
                self.writer.arithmetic(Command::Neg);
                Ok(())
            }
            TokenKind::Symbol('~') => {
                self.advance()?;
                self.compile_term()?;
                self.writer.arithmetic(Command::Not);
                Ok(())
            }
            _ => Err(self.unexpected("term")),
        }
    }

    fn compile_keyword_constant(&mut self, keyword: Keyword) -> Result<(), CompileError> {
        match keyword {
            Keyword::True => {
                self.writer.push(Segment::Constant, 0);
                self.writer.arithmetic(Command::Not);
            }
            Keyword::False | Keyword::Null => self.writer.push(Segment::Constant, 0),
            Keyword::This => self.writer.push(Segment::Pointer, THIS_POINTER),
            _ => return Err(self.unexpected("term")),
        }
        self.advance()?;
        Ok(())
    }

    /// `name[expr]` as an rvalue.
    fn compile_array_read(&mut self) -> Result<(), CompileError> {
        let (name, position) = self.expect_identifier()?;
        let base = self.resolve(&name, position)?;
        self.writer.push(base.segment(), base.index);

        self.expect_symbol('[')?;
        self.compile_expression()?;
        self.expect_symbol(']')?;

        self.writer.arithmetic(Command::Add);
        self.writer.pop(Segment::Pointer, THAT_POINTER);
        self.writer.push(Segment::That, 0);
        Ok(())
    }

    fn emit_string(&mut self, text: &str) {
        self.writer.push(Segment::Constant, text.chars().count());
        self.writer.call(STRING_NEW, 1);
        for ch in text.chars() {
            self.writer.push(Segment::Constant, ch as usize);
            self.writer.call(STRING_APPEND_CHAR, 2);
        }
    }

    /// Resolve and emit one of the three call shapes:
    /// `var.method(..)`, `Class.function(..)` or `method(..)` on the current object.
    pub(super) fn compile_subroutine_call(&mut self) -> Result<(), CompileError> {
        let (first, _) = self.expect_identifier()?;

        let (callee, receivers) = if self.advance_optional_symbol('.')? {
            let (member, _) = self.expect_identifier()?;
            match self.find_variable(&first) {
                Some(object) => {
                    self.writer.push(object.segment(), object.index);
                    (format!("{}.{}", object.type_, member), 1)
                }
                None => (format!("{}.{}", first, member), 0),
            }
        } else {
            self.writer.push(Segment::Pointer, THIS_POINTER);
            (format!("{}.{}", self.class_name, first), 1)
        };

        self.expect_symbol('(')?;
        let arg_count = self.compile_expression_list()?;
        self.expect_symbol(')')?;

        self.writer.call(&callee, arg_count + receivers);
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<usize, CompileError> {
        if !self.lexer.current().starts_term() {
            return Ok(0);
        }

        let mut count = 0;
        loop {
            self.compile_expression()?;
            count += 1;
            if !self.advance_optional_symbol(',')? {
                return Ok(count);
            }
        }
    }
}
