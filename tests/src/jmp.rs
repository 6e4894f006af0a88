use crate::harness::{HALT, load, run_to_halt};
use common::asm::{AddrMode, JmpIns, JsrIns, Operand, Reg, RtsIns};
use common::constants::{DATA_START, STACK_INIT};
use emu_lib::{Fault, State};

fn jmp(mode: AddrMode, reg: Reg) -> u16 {
    JmpIns{dst: Operand::new(mode, reg)}.encode()
}

fn jsr(link: Reg, mode: AddrMode, reg: Reg) -> u16 {
    JsrIns{reg: link, dst: Operand::new(mode, reg)}.encode()
}

fn rts(reg: Reg) -> u16 {
    RtsIns{reg}.encode()
}

// bin must set r0 to 1 if the jump wasn't taken, 2 if it was
fn run(bin: &[u16]) {
    let mut cpu = load(bin);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.reg_read_word(Reg::R0), 2);
}

#[test]
fn relative() {
    run(&[
        jmp(AddrMode::Index, Reg::PC), 0o6, // jmp taken

        0o12700, 1,     // mov #1, r0
        HALT,

    // taken:
        0o12700, 2,     // mov #2, r0
        HALT,
    ]);
}

#[test]
fn abs() {
    run(&[
        jmp(AddrMode::AutoIncDef, Reg::PC), DATA_START + 0o12, // jmp @#taken

        0o12700, 1,     // mov #1, r0
        HALT,

    // taken:
        0o12700, 2,     // mov #2, r0
        HALT,
    ]);
}

#[test]
fn def() {
    run(&[
        0o12701, DATA_START + 0o14,     // mov #taken, r1
        jmp(AddrMode::Def, Reg::R1),    // jmp (r1)

        0o12700, 1,     // mov #1, r0
        HALT,

    // taken:
        0o12700, 2,     // mov #2, r0
        HALT,
    ]);
}

#[test]
fn reg_is_illegal() {
    let word = jmp(AddrMode::Gen, Reg::R1);
    let mut cpu = load(&[word]);
    assert_eq!(cpu.run(), State::Faulted(Fault::IllegalInstruction{word, pc: DATA_START}));
    assert_eq!(cpu.pc(), DATA_START);

    let word = jsr(Reg::R5, AddrMode::Gen, Reg::R1);
    let mut cpu = load(&[word]);
    assert!(matches!(cpu.run(), State::Faulted(Fault::IllegalInstruction{..})));
}

#[test]
fn call() {
    let bin = [
        0o12701, 0o0,   // mov #0, r1
        0o12702, 0o0,   // mov #0, r2
        0o407,          // br start

        0o12702, 0o2,   // mov #2, r2 ; shouldn't be executed

    // fun:
        0o12701, 0o1,   // mov #1, r1
        rts(Reg::PC),

        0o12702, 0o2,   // mov #2, r2 ; shouldn't be executed

    // start:
        jsr(Reg::PC, AddrMode::AutoIncDef, Reg::PC), DATA_START + 0o16, // jsr pc, @#fun
        HALT,
    ];
    let mut cpu = load(&bin);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.reg_read_word(Reg::R1), 1);
    assert_eq!(cpu.reg_read_word(Reg::R2), 0);
    assert_eq!(cpu.reg_read_word(Reg::SP), STACK_INIT);
}

#[test]
fn linkage_register() {
    let ret = DATA_START + 0o10;
    let bin = [
        0o12705, 0o1234,                                // mov #1234, r5
        jsr(Reg::R5, AddrMode::Index, Reg::PC), 0o4,    // jsr r5, fun
    // ret:
        HALT,
        HALT,

    // fun:
        0o10500,        // mov r5, r0
        rts(Reg::R5),
    ];
    let mut cpu = load(&bin);

    // Run up to the rts and look at the linkage.
    for _ in 0..3 {
        assert_eq!(cpu.step(), State::Running);
    }
    assert_eq!(cpu.reg_read_word(Reg::R0), ret);
    assert_eq!(cpu.reg_read_word(Reg::R5), ret);
    assert_eq!(cpu.reg_read_word(Reg::SP), STACK_INIT - 2);
    assert_eq!(cpu.peek_word(STACK_INIT - 2), 0o1234);

    run_to_halt(&mut cpu);
    assert_eq!(cpu.pc(), ret + 2);
    assert_eq!(cpu.reg_read_word(Reg::R5), 0o1234);
    assert_eq!(cpu.reg_read_word(Reg::SP), STACK_INIT);
}

#[test]
fn nested_calls() {
    let bin = [
        jsr(Reg::PC, AddrMode::Index, Reg::PC), 0o2,    // jsr pc, a
        HALT,

    // a:
        0o5200,                                         // inc r0
        jsr(Reg::PC, AddrMode::Index, Reg::PC), 0o2,    // jsr pc, b
        rts(Reg::PC),

    // b:
        0o5200,                                         // inc r0
        rts(Reg::PC),
    ];
    let mut cpu = load(&bin);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.reg_read_word(Reg::R0), 2);
    assert_eq!(cpu.pc(), DATA_START + 6);
    assert_eq!(cpu.reg_read_word(Reg::SP), STACK_INIT);
}

#[test]
fn jsr_overflow() {
    let word = jsr(Reg::PC, AddrMode::Index, Reg::PC);
    let mut cpu = load(&[word, 0o100]);
    cpu.reg_write_word(Reg::SP, 0o400);
    let state = cpu.step();
    assert_eq!(state, State::Faulted(Fault::StackOverflow{sp: 0o376}));
    assert!(state.is_terminal());
    assert_eq!(cpu.reg_read_word(Reg::SP), 0o400);
    assert_eq!(cpu.peek_word(0o376), 0);
}
