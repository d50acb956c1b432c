//! Single-pass compiler from class source text to VM instructions.
//!
//! There is no syntax tree: each grammar production validates its tokens,
//! records declarations in the symbol tables and emits instructions as it
//! goes. One token of lookahead settles every choice in the grammar.

use log::debug;

use super::{
    error::CompileError,
    lexer::{Keyword, Lexer, TokenKind},
    scope::{Kind, SymbolTable, VarType},
    vm::{LabelCounter, Segment, VmWriter, operand::THIS_POINTER},
};

mod expect;
mod expressions;
mod statements;

// Runtime routines the generated code depends on
const MEMORY_ALLOC: &str = "Memory.alloc";
const MATH_MULTIPLY: &str = "Math.multiply";
const MATH_DIVIDE: &str = "Math.divide";
const STRING_NEW: &str = "String.new";
const STRING_APPEND_CHAR: &str = "String.appendChar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

#[derive(Debug)]
pub struct CompilationEngine<'src, 'l> {
    lexer: Lexer<'src>,
    writer: VmWriter<'l>,
    class_scope: SymbolTable,
    subroutine_scope: SymbolTable,
    class_name: String,
}

impl<'src, 'l> CompilationEngine<'src, 'l> {
    pub fn new(src: &'src str, labels: &'l mut LabelCounter) -> Result<Self, CompileError> {
        Ok(CompilationEngine {
            lexer: Lexer::new(src)?,
            writer: VmWriter::new(labels),
            class_scope: SymbolTable::new(),
            subroutine_scope: SymbolTable::new(),
            class_name: String::new(),
        })
    }

    pub fn writer(&self) -> &VmWriter<'l> {
        &self.writer
    }

    /// `class Name { classVarDec* subroutineDec* }`, then end of input.
    pub fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Class)?;
        let (name, _) = self.expect_identifier()?;
        self.class_name = name;
        self.expect_symbol('{')?;

        while self.current_is_any_keyword(&[Keyword::Static, Keyword::Field]) {
            self.compile_class_var_dec()?;
        }
        debug!("class scope of {}:\n{}", self.class_name, self.class_scope);

        while self.current_is_any_keyword(&[
            Keyword::Constructor,
            Keyword::Function,
            Keyword::Method,
        ]) {
            self.compile_subroutine()?;
        }

        self.expect_symbol('}')?;
        if self.lexer.has_more() {
            return Err(self.unexpected("end of file"));
        }
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let kind = match self.expect_any_keyword(&[Keyword::Static, Keyword::Field])? {
            Keyword::Static => Kind::Static,
            _ => Kind::Field,
        };
        let type_ = self.compile_type()?;

        loop {
            let (name, position) = self.expect_identifier()?;
            self.class_scope
                .define(&name, type_.clone(), kind)
                .map_err(|e| e.at(position))?;
            if !self.advance_optional_symbol(',')? {
                break;
            }
        }

        self.expect_symbol(';')
    }

    /// `int | char | boolean | ClassName`
    fn compile_type(&mut self) -> Result<VarType, CompileError> {
        let primitive = self.lexer.current().keyword().and_then(VarType::from_keyword);
        if let Some(type_) = primitive {
            self.advance()?;
            return Ok(type_);
        }
        match &self.lexer.current().kind {
            TokenKind::Identifier(_) => {
                let (name, _) = self.expect_identifier()?;
                Ok(VarType::Class(name))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn starts_type(&self) -> bool {
        let token = self.lexer.current();
        matches!(token.kind, TokenKind::Identifier(_))
            || token.keyword().and_then(VarType::from_keyword).is_some()
    }

    fn compile_subroutine(&mut self) -> Result<(), CompileError> {
        let kind = match self.expect_any_keyword(&[
            Keyword::Constructor,
            Keyword::Function,
            Keyword::Method,
        ])? {
            Keyword::Constructor => SubroutineKind::Constructor,
            Keyword::Method => SubroutineKind::Method,
            _ => SubroutineKind::Function,
        };

        if !self.advance_optional_keyword(Keyword::Void)? {
            self.compile_type()?;
        }

        let (name, position) = self.expect_identifier()?;
        let vm_name = format!("{}.{}", self.class_name, name);

        self.subroutine_scope.reset();
        if kind == SubroutineKind::Method {
            let receiver = VarType::Class(self.class_name.clone());
            self.subroutine_scope
                .define("this", receiver, Kind::Argument)
                .map_err(|e| e.at(position))?;
        }

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        while self.lexer.current().is_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }
        debug!("subroutine scope of {}:\n{}", vm_name, self.subroutine_scope);

        self.writer
            .function(&vm_name, self.subroutine_scope.count_of(Kind::Local));
        match kind {
            SubroutineKind::Constructor => {
                let fields = self.class_scope.count_of(Kind::Field);
                self.writer.push(Segment::Constant, fields);
                self.writer.call(MEMORY_ALLOC, 1);
                self.writer.pop(Segment::Pointer, THIS_POINTER);
            }
            SubroutineKind::Method => {
                self.writer.push(Segment::Argument, 0);
                self.writer.pop(Segment::Pointer, THIS_POINTER);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')
    }

    /// `((type name) (',' type name)*)?`
    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if !self.starts_type() {
            return Ok(());
        }

        loop {
            let type_ = self.compile_type()?;
            let (name, position) = self.expect_identifier()?;
            self.subroutine_scope
                .define(&name, type_, Kind::Argument)
                .map_err(|e| e.at(position))?;
            if !self.advance_optional_symbol(',')? {
                return Ok(());
            }
        }
    }

    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Var)?;
        let type_ = self.compile_type()?;

        loop {
            let (name, position) = self.expect_identifier()?;
            self.subroutine_scope
                .define(&name, type_.clone(), Kind::Local)
                .map_err(|e| e.at(position))?;
            if !self.advance_optional_symbol(',')? {
                break;
            }
        }

        self.expect_symbol(';')
    }
}

/// Compile one class into a fresh instruction list.
#[cfg(test)]
pub fn compile(
    src: &str,
    labels: &mut LabelCounter,
) -> Result<Vec<super::vm::VmInstruction>, CompileError> {
    let mut engine = CompilationEngine::new(src, labels)?;
    engine.compile_class()?;
    Ok(engine.writer.into_instructions())
}
