use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use compile::CompilationEngine;
use error::CompileError;
use vm::{Emit, LabelCounter};

pub mod compile;
pub mod error;
pub mod lexer;
pub mod scope;
pub mod vm;

pub const SOURCE_EXTENSION: &str = "jack";
pub const OUTPUT_EXTENSION: &str = "vm";

/// Compiles units one after another. The label counters live as long as the
/// compiler, so every unit compiled by one instance gets distinct labels.
#[derive(Debug, Default)]
pub struct Compiler {
    labels: LabelCounter,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler {
            labels: LabelCounter::new(),
        }
    }

    /// Compile one class read from `input` and write its instructions to `output`.
    ///
    /// Instructions generated before an error are still written; the caller
    /// must treat that output as invalid. Returns the number of instructions.
    pub fn compile_unit(
        &mut self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<usize, CompileError> {
        let mut src = String::new();
        input.read_to_string(&mut src)?;

        let mut engine = CompilationEngine::new(&src, &mut self.labels)?;
        let result = engine.compile_class();

        engine.writer().emit(output)?;
        result.map(|()| engine.writer().instructions().len())
    }
}

/// The source files named by `path`: the file itself, or every regular
/// `.jack` file directly inside a directory, sorted by path.
pub fn collect_units(path: &Path) -> io::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        // Surface a missing file as an io error
        fs::metadata(path)?;
        return Ok(vec![path.to_path_buf()]);
    }

    let mut units = vec![];
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file = entry.path();
        if entry.file_type()?.is_file()
            && file.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
        {
            units.push(file);
        }
    }
    units.sort();
    Ok(units)
}

pub fn output_path(unit: &Path) -> PathBuf {
    unit.with_extension(OUTPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "class Main {
        function void main() {
            var int i;
            let i = 0;
            while (i < 3) { let i = i + 1; }
            return;
        }
    }";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jackc-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_compile_unit_writes_text_protocol() {
        let mut compiler = Compiler::new();
        let mut out = Vec::new();
        let count = compiler
            .compile_unit(&mut MAIN.as_bytes(), &mut out)
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), count);
        assert!(text.starts_with("function Main.main 1\npush constant 0\npop local 0\nlabel BEGIN_WHILE_0\n"));
        assert!(text.ends_with("label END_WHILE_0\npush constant 0\nreturn\n"));
    }

    #[test]
    fn test_labels_continue_across_units() {
        let mut compiler = Compiler::new();
        let mut first = Vec::new();
        let mut second = Vec::new();
        compiler.compile_unit(&mut MAIN.as_bytes(), &mut first).unwrap();
        compiler.compile_unit(&mut MAIN.as_bytes(), &mut second).unwrap();

        let second = String::from_utf8(second).unwrap();
        assert!(second.contains("label BEGIN_WHILE_1\n"));
        assert!(!second.contains("BEGIN_WHILE_0"));
    }

    #[test]
    fn test_failed_unit_keeps_partial_output() {
        let src = "class Main {
            function void ok() { return; }
            function void bad() { let missing = 1; return; }
        }";
        let mut compiler = Compiler::new();
        let mut out = Vec::new();
        let err = compiler
            .compile_unit(&mut src.as_bytes(), &mut out)
            .unwrap_err();

        assert!(matches!(err, CompileError::UndeclaredIdentifier { .. }));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "function Main.ok 0\npush constant 0\nreturn\nfunction Main.bad 0\n"
        );
    }

    #[test]
    fn test_compiler_is_reusable_after_failure() {
        let mut compiler = Compiler::new();
        let mut sink = Vec::new();
        assert!(compiler.compile_unit(&mut "class".as_bytes(), &mut sink).is_err());

        let mut out = Vec::new();
        assert!(compiler.compile_unit(&mut MAIN.as_bytes(), &mut out).is_ok());
    }

    #[test]
    fn test_collect_units_in_directory() {
        let dir = scratch_dir("collect");
        fs::write(dir.join("Main.jack"), MAIN).unwrap();
        fs::write(dir.join("Ball.jack"), "class Ball { }").unwrap();
        fs::write(dir.join("notes.txt"), "not source").unwrap();
        fs::create_dir(dir.join("nested.jack")).unwrap();

        let units = collect_units(&dir).unwrap();
        assert_eq!(units, vec![dir.join("Ball.jack"), dir.join("Main.jack")]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_collect_units_single_file_and_missing_path() {
        let dir = scratch_dir("single");
        let file = dir.join("Main.jack");
        fs::write(&file, MAIN).unwrap();

        assert_eq!(collect_units(&file).unwrap(), vec![file.clone()]);
        assert!(collect_units(&dir.join("Nope.jack")).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("games/Pong/Ball.jack")),
            PathBuf::from("games/Pong/Ball.vm")
        );
    }
}
