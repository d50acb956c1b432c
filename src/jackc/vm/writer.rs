use std::io::{self, Write};

use log::trace;

use super::{
    labels::{IfLabels, LabelCounter, WhileLabels},
    operand::{Command, Segment, VmInstruction},
};

pub trait Emit {
    fn emit(&self, writer: &mut dyn Write) -> io::Result<()>;
}

impl Emit for VmInstruction {
    fn emit(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", self)
    }
}

/// Append-only instruction stream for one compilation unit.
///
/// Holds no decision logic: every method appends exactly one instruction,
/// apart from the label helpers which hand out fresh suffixes from the
/// run-wide [`LabelCounter`].
#[derive(Debug)]
pub struct VmWriter<'l> {
    instructions: Vec<VmInstruction>,
    labels: &'l mut LabelCounter,
}

impl<'l> VmWriter<'l> {
    pub fn new(labels: &'l mut LabelCounter) -> Self {
        VmWriter {
            instructions: vec![],
            labels,
        }
    }

    fn add_instruction(&mut self, instruction: VmInstruction) {
        trace!("emit {}", instruction);
        self.instructions.push(instruction);
    }

    pub fn push(&mut self, segment: Segment, index: usize) {
        self.add_instruction(VmInstruction::Push(segment, index));
    }

    pub fn pop(&mut self, segment: Segment, index: usize) {
        debug_assert!(segment != Segment::Constant, "cannot pop into constant");
        self.add_instruction(VmInstruction::Pop(segment, index));
    }

    pub fn arithmetic(&mut self, command: Command) {
        self.add_instruction(VmInstruction::Arithmetic(command));
    }

    pub fn label(&mut self, name: String) {
        self.add_instruction(VmInstruction::Label(name));
    }

    pub fn goto(&mut self, name: String) {
        self.add_instruction(VmInstruction::Goto(name));
    }

    pub fn if_goto(&mut self, name: String) {
        self.add_instruction(VmInstruction::IfGoto(name));
    }

    pub fn call(&mut self, name: &str, arg_count: usize) {
        self.add_instruction(VmInstruction::Call(name.into(), arg_count));
    }

    pub fn function(&mut self, name: &str, local_count: usize) {
        self.add_instruction(VmInstruction::Function(name.into(), local_count));
    }

    pub fn return_(&mut self) {
        self.add_instruction(VmInstruction::Return);
    }

    pub fn next_while_labels(&mut self) -> WhileLabels {
        self.labels.next_while()
    }

    pub fn next_if_labels(&mut self) -> IfLabels {
        self.labels.next_if()
    }

    pub fn instructions(&self) -> &[VmInstruction] {
        &self.instructions
    }

    #[cfg(test)]
    pub fn into_instructions(self) -> Vec<VmInstruction> {
        self.instructions
    }
}

impl Emit for VmWriter<'_> {
    fn emit(&self, writer: &mut dyn Write) -> io::Result<()> {
        for instruction in &self.instructions {
            instruction.emit(writer)?;
        }
        Ok(())
    }
}
