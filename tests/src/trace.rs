use crate::harness::HALT;
use common::asm::Reg;
use common::constants::DATA_START;
use common::mem::as_byte_slice;
use emu_lib::{FileTrace, Processor, RecordingTrace, State, TraceEvent, Transaction};

use Transaction::*;

fn traced(bin: &[u16]) -> (Processor, RecordingTrace) {
    let trace = RecordingTrace::new();
    let mut cpu = Processor::with_trace(trace.clone());
    cpu.load_bytes(as_byte_slice(bin), DATA_START);
    cpu.reg_write_word(Reg::PC, DATA_START);
    (cpu, trace)
}

fn ev(kind: Transaction, addr: u16) -> TraceEvent {
    TraceEvent::new(kind, addr)
}

#[test]
fn one_event_per_memory_access() {
    let (mut cpu, trace) = traced(&[
        0o12737, 0o5, 0o1000,   // mov #5, @#1000
        HALT,
    ]);
    assert_eq!(cpu.run(), State::Halted);
    assert_eq!(trace.events(), vec![
        ev(InstructionFetch, 0o400),
        ev(Read, 0o402),
        ev(Read, 0o404),
        ev(Write, 0o1000),
        ev(InstructionFetch, 0o406),
    ]);
}

#[test]
fn register_operands_are_not_traced() {
    let (mut cpu, trace) = traced(&[
        0o10001,    // mov r0, r1
        0o5202,     // inc r2
        0o261,      // sec
        HALT,
    ]);
    cpu.run();
    assert_eq!(trace.events(), vec![
        ev(InstructionFetch, 0o400),
        ev(InstructionFetch, 0o402),
        ev(InstructionFetch, 0o404),
        ev(InstructionFetch, 0o406),
    ]);
}

#[test]
fn read_modify_write() {
    let (mut cpu, trace) = traced(&[
        0o12700, 0o1000,    // mov #1000, r0
        0o5210,             // inc (r0)
        HALT,
    ]);
    cpu.run();
    assert_eq!(&trace.events()[2..], &[
        ev(InstructionFetch, 0o404),
        ev(Read, 0o1000),
        ev(Write, 0o1000),
        ev(InstructionFetch, 0o406),
    ]);
}

#[test]
fn stack_traffic() {
    let (mut cpu, trace) = traced(&[
        0o4767, 0o2,    // jsr pc, fun
        HALT,
    // fun:
        0o207,          // rts pc
    ]);
    cpu.run();
    let sp = cpu.reg_read_word(Reg::SP) - 2;
    assert_eq!(trace.events(), vec![
        ev(InstructionFetch, 0o400),
        ev(Read, 0o402),
        ev(Write, sp),
        ev(InstructionFetch, 0o406),
        ev(Read, sp),
        ev(InstructionFetch, 0o404),
    ]);
}

#[test]
fn toggled_off() {
    let (mut cpu, trace) = traced(&[
        0o5037, 0o1000,     // clr @#1000
        HALT,
    ]);
    cpu.set_trace_enabled(false);
    assert!(!cpu.trace_enabled());
    cpu.run();
    assert!(trace.events().is_empty());
}

#[test]
fn trace_file() {
    let path = std::env::temp_dir().join(format!("pdp11-cpu-trace-{}.txt", std::process::id()));
    let bin = [
        0o5037, 0o1000,     // clr @#1000
        HALT,
    ];
    {
        let mut cpu = Processor::with_trace(FileTrace::create(&path));
        cpu.load_bytes(as_byte_slice(&bin), DATA_START);
        cpu.run_at(DATA_START);
        cpu.flush_trace();
    }
    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(contents, "2 000400\n0 000402\n1 001000\n2 000404\n");
}

#[test]
fn unwritable_trace_file_does_not_stop_execution() {
    let path = std::env::temp_dir().join("no-such-dir-for-pdp11").join("trace.txt");
    let mut cpu = Processor::with_trace(FileTrace::create(&path));
    cpu.load_bytes(as_byte_slice(&[0o5200, HALT]), DATA_START);
    assert_eq!(cpu.run_at(DATA_START), State::Halted);
    assert_eq!(cpu.reg_read_word(Reg::R0), 1);
}
