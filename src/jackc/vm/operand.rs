use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Static,
    Pointer,
    Temp,
}

/// ALU operations on the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmInstruction {
    Push(Segment, usize),
    Pop(Segment, usize),
    Arithmetic(Command),
    Label(String),
    Goto(String),
    IfGoto(String),
    Call(String, usize),     // name, argument count
    Function(String, usize), // name, local count
    Return,
}

// pointer 0 and pointer 1 rebind the base of `this` and `that`
pub const THIS_POINTER: usize = 0;
pub const THAT_POINTER: usize = 1;

pub const SCRATCH: usize = 0;

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Static => "static",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Add => "add",
            Command::Sub => "sub",
            Command::Neg => "neg",
            Command::Eq => "eq",
            Command::Gt => "gt",
            Command::Lt => "lt",
            Command::And => "and",
            Command::Or => "or",
            Command::Not => "not",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for VmInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmInstruction::Push(segment, index) => write!(f, "push {} {}", segment, index),
            VmInstruction::Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            VmInstruction::Arithmetic(command) => write!(f, "{}", command),
            VmInstruction::Label(name) => write!(f, "label {}", name),
            VmInstruction::Goto(name) => write!(f, "goto {}", name),
            VmInstruction::IfGoto(name) => write!(f, "if-goto {}", name),
            VmInstruction::Call(name, args) => write!(f, "call {} {}", name, args),
            VmInstruction::Function(name, locals) => write!(f, "function {} {}", name, locals),
            VmInstruction::Return => write!(f, "return"),
        }
    }
}
