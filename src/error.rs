use thiserror::Error;

use crate::opcode::Opcode;

/// Everything that can go wrong while the chipset executes a single step.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("The range {from:#06X} - {to:#06X} is outside of the memory of size {len:#06X}")]
    OutOfBounds { from: usize, to: usize, len: usize },
}

/// Errors surfaced while reading roms from the host.
#[derive(Error, Debug)]
pub enum RomError {
    #[error("The rom '{name}' is {size} bytes long, but at most {max} bytes fit into memory.")]
    TooLarge {
        name: String,
        size: usize,
        max: usize,
    },
    #[error("Unable to read the rom: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to read the rom archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}
