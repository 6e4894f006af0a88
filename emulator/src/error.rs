use std::num::ParseIntError;

use thiserror::Error;

/// Conditions that stop execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("illegal instruction 0o{word:o} at 0o{pc:o}")]
    IllegalInstruction { word: u16, pc: u16 },

    #[error("stack overflow: push would move sp to 0o{sp:o}")]
    StackOverflow { sp: u16 },
}

/// Reported after a step, but execution can carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Advisory {
    #[error("program counter 0o{pc:o} is not an even number")]
    UnalignedProgramCounter { pc: u16 },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: unrecognized directive {text:?}")]
    UnknownDirective { line: usize, text: String },

    #[error("line {line}: {text:?} is not an octal value")]
    NotOctal { line: usize, text: String },

    #[error("line {line}: {text:?} doesn't fit in a word")]
    BadValue {
        line: usize,
        text: String,
        #[source]
        source: ParseIntError,
    },

    #[error("program listing has no directives")]
    Empty,
}
