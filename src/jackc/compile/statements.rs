use crate::jackc::{
    error::CompileError,
    lexer::Keyword,
    vm::{
        Command, Segment,
        operand::{SCRATCH, THAT_POINTER},
    },
};

use super::CompilationEngine;

impl CompilationEngine<'_, '_> {
    /// Statements run until the first token that is not a keyword,
    /// normally the closing brace of the enclosing block.
    pub(super) fn compile_statements(&mut self) -> Result<(), CompileError> {
        while let Some(keyword) = self.lexer.current().keyword() {
            match keyword {
                Keyword::Let => self.compile_let()?,
                Keyword::If => self.compile_if()?,
                Keyword::While => self.compile_while()?,
                Keyword::Do => self.compile_do()?,
                Keyword::Return => self.compile_return()?,
                _ => return Err(self.unexpected("statement")),
            }
        }
        Ok(())
    }

    fn compile_block(&mut self) -> Result<(), CompileError> {
        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')
    }

    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Let)?;
        let (name, position) = self.expect_identifier()?;
        let target = self.resolve(&name, position)?;

        let is_array = self.advance_optional_symbol('[')?;
        if is_array {
            // Element address stays on the stack while the value is computed
            self.writer.push(target.segment(), target.index);
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.arithmetic(Command::Add);
        }

        self.expect_symbol('=')?;
        self.compile_expression()?;
        self.expect_symbol(';')?;

        if is_array {
            self.writer.pop(Segment::Temp, SCRATCH);
            self.writer.pop(Segment::Pointer, THAT_POINTER);
            self.writer.push(Segment::Temp, SCRATCH);
            self.writer.pop(Segment::That, 0);
        } else {
            self.writer.pop(target.segment(), target.index);
        }
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), CompileError> {
        let labels = self.writer.next_if_labels();

        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.if_goto(labels.if_true());
        self.writer.goto(labels.if_false());
        self.writer.label(labels.if_true());
        self.compile_block()?;

        if self.advance_optional_keyword(Keyword::Else)? {
            self.writer.goto(labels.end());
            self.writer.label(labels.if_false());
            self.compile_block()?;
            self.writer.label(labels.end());
        } else {
            self.writer.label(labels.if_false());
        }
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), CompileError> {
        let labels = self.writer.next_while_labels();

        self.expect_keyword(Keyword::While)?;
        self.writer.label(labels.begin());
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.arithmetic(Command::Not);
        self.writer.if_goto(labels.end());
        self.compile_block()?;
        self.writer.goto(labels.begin());
        self.writer.label(labels.end());
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Do)?;
        self.compile_subroutine_call()?;
        self.expect_symbol(';')?;
        // Every call leaves a value behind
        self.writer.pop(Segment::Temp, SCRATCH);
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Return)?;
        if self.lexer.current().starts_term() {
            self.compile_expression()?;
        } else {
            self.writer.push(Segment::Constant, 0);
        }
        self.expect_symbol(';')?;
        self.writer.return_();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::jackc::{
        compile::{
            compile,
            tests::{compile_err, compile_text},
        },
        error::CompileError,
        vm::LabelCounter,
    };

    fn body(statements: &str) -> Vec<String> {
        let src = format!(
            "class Main {{ field Array arr; static int s; method void run(int i) {{ var int x, y; {} }} }}",
            statements
        );
        // Drop the function header and the method prologue
        compile_text(&src).split_off(3)
    }

    #[test]
    fn test_bare_return_pushes_zero() {
        assert_eq!(body("return;"), vec!["push constant 0", "return"]);
    }

    #[test]
    fn test_return_with_expression() {
        assert_eq!(body("return x;"), vec!["push local 0", "return"]);
    }

    #[test]
    fn test_let_into_each_segment() {
        assert_eq!(
            body("let x = 1; let i = 2; let s = 3; let arr = 4;"),
            vec![
                "push constant 1",
                "pop local 0",
                "push constant 2",
                "pop argument 1",
                "push constant 3",
                "pop static 0",
                "push constant 4",
                "pop this 0",
            ]
        );
    }

    #[test]
    fn test_let_array_element() {
        assert_eq!(
            body("let arr[i] = y;"),
            vec![
                "push this 0",
                "push argument 1",
                "add",
                "push local 1",
                "pop temp 0",
                "pop pointer 1",
                "push temp 0",
                "pop that 0",
            ]
        );
    }

    #[test]
    fn test_let_array_to_array() {
        assert_eq!(
            body("let arr[0] = arr[1];"),
            vec![
                "push this 0",
                "push constant 0",
                "add",
                "push this 0",
                "push constant 1",
                "add",
                "pop pointer 1",
                "push that 0",
                "pop temp 0",
                "pop pointer 1",
                "push temp 0",
                "pop that 0",
            ]
        );
    }

    #[test]
    fn test_if_without_else() {
        assert_eq!(
            body("if (x) { let y = 1; }"),
            vec![
                "push local 0",
                "if-goto IF_TRUE_0",
                "goto IF_FALSE_0",
                "label IF_TRUE_0",
                "push constant 1",
                "pop local 1",
                "label IF_FALSE_0",
            ]
        );
    }

    #[test]
    fn test_if_with_else() {
        assert_eq!(
            body("if (x) { let y = 1; } else { let y = 2; }"),
            vec![
                "push local 0",
                "if-goto IF_TRUE_0",
                "goto IF_FALSE_0",
                "label IF_TRUE_0",
                "push constant 1",
                "pop local 1",
                "goto END_IF_0",
                "label IF_FALSE_0",
                "push constant 2",
                "pop local 1",
                "label END_IF_0",
            ]
        );
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(
            body("while (x) { let x = x - 1; }"),
            vec![
                "label BEGIN_WHILE_0",
                "push local 0",
                "not",
                "if-goto END_WHILE_0",
                "push local 0",
                "push constant 1",
                "sub",
                "pop local 0",
                "goto BEGIN_WHILE_0",
                "label END_WHILE_0",
            ]
        );
    }

    #[test]
    fn test_nested_control_flow_gets_distinct_labels() {
        let out = body("while (x) { while (y) { if (x) { } if (y) { } } }");
        for label in [
            "label BEGIN_WHILE_0",
            "label BEGIN_WHILE_1",
            "label END_WHILE_0",
            "label END_WHILE_1",
            "label IF_TRUE_0",
            "label IF_TRUE_1",
        ] {
            assert_eq!(out.iter().filter(|l| *l == label).count(), 1, "{}", label);
        }
    }

    #[test]
    fn test_do_discards_result() {
        assert_eq!(
            body("do Output.printInt(x);"),
            vec!["push local 0", "call Output.printInt 1", "pop temp 0"]
        );
    }

    #[test]
    fn test_sequential_whiles_across_functions_and_runs_never_collide() {
        let src = "class Main {
            function void a() { while (true) { } return; }
            function void b() { while (true) { } return; }
        }";
        let mut labels = LabelCounter::new();
        let first: Vec<String> = compile(src, &mut labels)
            .unwrap()
            .iter()
            .map(|i| i.to_string())
            .collect();
        let second: Vec<String> = compile(src, &mut labels)
            .unwrap()
            .iter()
            .map(|i| i.to_string())
            .collect();

        let begin_labels = |out: &[String]| -> Vec<String> {
            out.iter()
                .filter(|l| l.starts_with("label BEGIN_WHILE_"))
                .cloned()
                .collect()
        };
        assert_eq!(
            begin_labels(&first),
            vec!["label BEGIN_WHILE_0", "label BEGIN_WHILE_1"]
        );
        assert_eq!(
            begin_labels(&second),
            vec!["label BEGIN_WHILE_2", "label BEGIN_WHILE_3"]
        );
    }

    #[test]
    fn test_unknown_statement_keyword() {
        let err = compile_err("class A { function void f() { var int x; int x; } }");
        assert!(matches!(
            err,
            CompileError::UnexpectedToken { ref expected, .. } if expected == "statement"
        ));
    }

    #[test]
    fn test_let_of_undeclared_variable() {
        let err = compile_err("class A { function void f() { let nope = 1; return; } }");
        assert!(matches!(
            err,
            CompileError::UndeclaredIdentifier { ref name, position }
                if name == "nope" && position.line == 1 && position.column == 35
        ));
    }

    #[test]
    fn test_missing_semicolon_reports_found_token() {
        let err = compile_err("class A {\n function void f() {\n  return\n }\n}");
        assert_eq!(
            err.to_string(),
            "line 4, column 2: expected symbol ';', found symbol '}'"
        );
    }
}
