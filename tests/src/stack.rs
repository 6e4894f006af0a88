use crate::harness::{HALT, load, run_to_halt};
use common::asm::Reg;
use common::constants::{DATA_START, STACK_INIT, STACK_LIMIT};
use emu_lib::{AddressSpace, Fault};

#[test]
fn push_pop_round_trip() {
    let mut space = AddressSpace::new();
    for sp in [STACK_INIT, STACK_LIMIT + 2, 0o1000, 0o177700] {
        for val in [0, 1, 0o377, 0o100000, 0o177777, 0o123456] {
            space.reg_write_word(Reg::SP, sp);
            space.push_word(val).unwrap();
            assert_eq!(space.pop_word(), val);
            assert_eq!(space.reg_read_word(Reg::SP), sp);
        }
    }
}

#[test]
fn push_is_lifo() {
    let mut space = AddressSpace::new();
    for val in 1..=10 {
        space.push_word(val).unwrap();
    }
    assert_eq!(space.reg_read_word(Reg::SP), STACK_INIT - 20);
    for val in (1..=10).rev() {
        assert_eq!(space.pop_word(), val);
    }
    assert_eq!(space.reg_read_word(Reg::SP), STACK_INIT);
}

#[test]
fn overflow_at_low_water_mark() {
    let mut space = AddressSpace::new();
    space.reg_write_word(Reg::SP, STACK_LIMIT + 4);
    space.push_word(1).unwrap();
    space.push_word(2).unwrap();
    assert_eq!(space.reg_read_word(Reg::SP), STACK_LIMIT);
    assert_eq!(space.push_word(3), Err(Fault::StackOverflow{sp: STACK_LIMIT - 2}));
    assert_eq!(space.reg_read_word(Reg::SP), STACK_LIMIT);
    assert_eq!(space.peek_word(STACK_LIMIT - 2), 0);
}

// Pushes and pops done through addressing modes on the SP.
#[test]
fn push_pop_by_mode() {
    let bin = [
        0o12746, 0o1111,    // mov #1111, -(sp)
        0o12746, 0o2222,    // mov #2222, -(sp)
        0o12600,            // mov (sp)+, r0
        0o12601,            // mov (sp)+, r1
        HALT,
    ];
    let mut cpu = load(&bin);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0o2222);
    assert_eq!(cpu.reg_read_word(Reg::R1), 0o1111);
    assert_eq!(cpu.reg_read_word(Reg::SP), STACK_INIT);
}

#[test]
fn byte_ops_on_sp_step_by_word() {
    let bin = [
        0o112746, 0o12,     // movb #12, -(sp)
        0o112600,           // movb (sp)+, r0
        HALT,
    ];
    let mut cpu = load(&bin);
    run_to_halt(&mut cpu);
    assert_eq!(cpu.reg_read_word(Reg::R0), 0o12);
    assert_eq!(cpu.reg_read_word(Reg::SP), STACK_INIT);
    assert_eq!(cpu.peek_byte(STACK_INIT - 2), 0o12);
    assert_eq!(cpu.pc(), DATA_START + 8);
}
