pub mod labels;
pub mod operand;
pub mod writer;

pub use labels::LabelCounter;
pub use operand::{Command, Segment, VmInstruction};
pub use writer::{Emit, VmWriter};
