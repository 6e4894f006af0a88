pub mod address_space;
pub mod error;
pub mod loader;
pub mod processor;
pub mod resolver;
pub mod status;
pub mod trace;

pub use address_space::{AddressSpace, Loc, Size};
pub use error::{Advisory, Fault, LoadError};
pub use loader::{Directive, parse_listing};
pub use processor::{Processor, Registers, State};
pub use resolver::Intent;
pub use status::Status;
pub use trace::{FileTrace, NullTrace, RecordingTrace, TraceEvent, TraceSink, Transaction};
