use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Read = 0,
    Write = 1,
    InstructionFetch = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    pub kind: Transaction,
    pub addr: u16,
}

impl TraceEvent {
    pub fn new(kind: Transaction, addr: u16) -> TraceEvent {
        TraceEvent{kind, addr}
    }
}

// One line of the trace file: kind digit, then the address in octal.
impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {:06o}", self.kind as u8, self.addr)
    }
}

/// Receives one event per non-register memory access, in order.
pub trait TraceSink: Send {
    fn record(&mut self, event: TraceEvent);
    fn flush(&mut self) {}
}

#[derive(Default, Debug, Clone, Copy)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn record(&mut self, _event: TraceEvent) {}
}

/// Writes events to a file, one per line. If the file can't be opened or
/// written, tracing silently turns into a no-op after a warning.
pub struct FileTrace {
    path: PathBuf,
    out: Option<BufWriter<File>>,
}

impl FileTrace {
    pub fn create(path: impl AsRef<Path>) -> FileTrace {
        let path = path.as_ref().to_path_buf();
        let out = match File::create(&path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                warn!("Can't open trace file {}: {e}; tracing disabled", path.display());
                None
            }
        };
        FileTrace{path, out}
    }

    pub fn is_open(&self) -> bool {
        self.out.is_some()
    }
}

impl TraceSink for FileTrace {
    fn record(&mut self, event: TraceEvent) {
        let Some(out) = &mut self.out else {
            return;
        };
        if let Err(e) = writeln!(out, "{event}") {
            warn!("Writing trace file {} failed: {e}; tracing disabled", self.path.display());
            self.out = None;
        }
    }

    fn flush(&mut self) {
        let Some(out) = &mut self.out else {
            return;
        };
        if let Err(e) = out.flush() {
            warn!("Flushing trace file {} failed: {e}", self.path.display());
            self.out = None;
        }
    }
}

impl Drop for FileTrace {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Keeps events in memory. Clones share the same buffer, so a handle can be
/// kept while another is handed to the emulator.
#[derive(Default, Clone)]
pub struct RecordingTrace {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl RecordingTrace {
    pub fn new() -> RecordingTrace {
        Default::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl TraceSink for RecordingTrace {
    fn record(&mut self, event: TraceEvent) {
        self.events.lock().unwrap().push(event);
    }
}
