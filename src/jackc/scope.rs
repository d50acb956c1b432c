use std::{collections::HashMap, fmt};

use super::{error::ScopeError, lexer::Keyword, vm::Segment};

/// Storage class of a variable. Each kind has its own index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

impl Kind {
    const COUNT: usize = 4;

    fn slot(self) -> usize {
        match self {
            Kind::Static => 0,
            Kind::Field => 1,
            Kind::Argument => 2,
            Kind::Local => 3,
        }
    }

    pub fn segment(self) -> Segment {
        match self {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Argument => Segment::Argument,
            Kind::Local => Segment::Local,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Static => "static",
            Kind::Field => "field",
            Kind::Argument => "argument",
            Kind::Local => "local",
        };
        f.write_str(name)
    }
}

/// Declared type of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarType {
    Int,
    Char,
    Boolean,
    Class(String),
}

impl VarType {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Int => Some(VarType::Int),
            Keyword::Char => Some(VarType::Char),
            Keyword::Boolean => Some(VarType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Int => f.write_str("int"),
            VarType::Char => f.write_str("char"),
            VarType::Boolean => f.write_str("boolean"),
            VarType::Class(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub type_: VarType,
    pub kind: Kind,
    pub index: usize,
}

impl Variable {
    pub fn segment(&self) -> Segment {
        self.kind.segment()
    }
}

/// One level of scoping. A compiler keeps one for the class (statics and
/// fields) and one for the subroutine being compiled (arguments and locals).
#[derive(Debug, Default)]
pub struct SymbolTable {
    variables: HashMap<String, Variable>,
    counts: [usize; Kind::COUNT],
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` with the next free index of `kind`.
    pub fn define(&mut self, name: &str, type_: VarType, kind: Kind) -> Result<&Variable, ScopeError> {
        if self.variables.contains_key(name) {
            return Err(ScopeError::DuplicateDeclaration(name.into()));
        }

        let index = self.counts[kind.slot()];
        self.counts[kind.slot()] += 1;

        let variable = Variable {
            name: name.into(),
            type_,
            kind,
            index,
        };
        Ok(self.variables.entry(name.into()).or_insert(variable))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Result<&Variable, ScopeError> {
        self.variables
            .get(name)
            .ok_or_else(|| ScopeError::UndeclaredIdentifier(name.into()))
    }

    pub fn reset(&mut self) {
        self.variables.clear();
        self.counts = [0; Kind::COUNT];
    }

    pub fn count_of(&self, kind: Kind) -> usize {
        self.counts[kind.slot()]
    }

    /// Variables ordered by kind then index, for debug dumps.
    pub fn sorted(&self) -> Vec<&Variable> {
        let mut vars: Vec<&Variable> = self.variables.values().collect();
        vars.sort_by_key(|v| (v.kind.slot(), v.index));
        vars
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for var in self.sorted() {
            writeln!(f, "{} {} {} {}", var.name, var.type_, var.kind, var.index)?;
        }
        Ok(())
    }
}

/// Resolve `name`, letting the subroutine scope shadow the class scope.
pub fn resolve<'t>(
    subroutine: &'t SymbolTable,
    class: &'t SymbolTable,
    name: &str,
) -> Result<&'t Variable, ScopeError> {
    if subroutine.contains(name) {
        return subroutine.lookup(name);
    }
    class.lookup(name)
}
