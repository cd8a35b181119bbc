//! ModR/M.reg-indexed group sub-tables.
//!
//! Some opcodes (`80`-`83`, `C0`-`C1`, `F6`-`F7`, ...) only fully determine
//! their operand shape once the ModR/M byte's `reg` field is known. Each
//! group is an 8-entry row indexed by that field; [`group`] does the
//! lookup given a [`GroupId`] and a 3-bit `reg` value.

use super::flags::{GroupId, OpcodeFlags as F};

const fn row(bits: [u32; 8]) -> [F; 8] {
    [
        F::from_bits_truncate(bits[0]),
        F::from_bits_truncate(bits[1]),
        F::from_bits_truncate(bits[2]),
        F::from_bits_truncate(bits[3]),
        F::from_bits_truncate(bits[4]),
        F::from_bits_truncate(bits[5]),
        F::from_bits_truncate(bits[6]),
        F::from_bits_truncate(bits[7]),
    ]
}

const MODRM: u32 = F::HAS_MODRM.bits();
const IMM8: u32 = F::HAS_IMM8.bits();
const CHECK66: u32 = F::CHECK_66.bits();
const UNDEF: u32 = F::UNDEFINED.bits();
const SPECIAL: u32 = F::SPECIAL.bits();
const NEEDS_PATCH: u32 = F::NEEDS_PATCH.bits();

// Index 0 is unused; groups are numbered 1..=20 to match GroupId's
// discriminants so `GROUPS[id as usize]` is a direct lookup.
static GROUPS: [[F; 8]; 21] = [
    row([0; 8]), // unused
    // GRP_1 (80-83): ADD,OR,ADC,SBB,AND,SUB,XOR,CMP
    row([MODRM; 8]),
    // GRP_2 (C0-C1,D0-D3): ROL,ROR,RCL,RCR,SHL,SHR,SAL,SAR
    row([MODRM; 8]),
    // GRP_3A (F6): TEST,TEST,NOT,NEG,MUL,IMUL,DIV,IDIV
    row([
        MODRM | IMM8,
        MODRM | IMM8,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
    ]),
    // GRP_3B (F7): TEST,TEST,NOT,NEG,MUL,IMUL,DIV,IDIV
    row([
        MODRM | CHECK66,
        MODRM | CHECK66,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
    ]),
    // GRP_4 (FE): INC,DEC,undefined x6
    row([MODRM, MODRM, UNDEF, UNDEF, UNDEF, UNDEF, UNDEF, UNDEF]),
    // GRP_5 (FF): INC,DEC,CALL,CALLF,JMP,JMPF,PUSH,undefined
    row([
        MODRM,
        MODRM,
        MODRM,
        MODRM,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        MODRM,
        UNDEF,
    ]),
    // GRP_6 (0F 00): SLDT,STR,LLDT,LTR,VERR,VERW,undefined x2
    row([
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        UNDEF,
        UNDEF,
    ]),
    // GRP_7 (0F 01): SGDT,SIDT,LGDT,LIDT,SMSW,undefined,LMSW,INVLPG
    row([
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
        UNDEF,
        MODRM | SPECIAL,
        MODRM | SPECIAL,
    ]),
    // GRP_8 (0F BA): undefined x4,BT,BTS,BTR,BTC
    row([
        UNDEF,
        UNDEF,
        UNDEF,
        UNDEF,
        MODRM | IMM8,
        MODRM | IMM8,
        MODRM | IMM8,
        MODRM | IMM8,
    ]),
    // GRP_9 (0F C7): undefined,CMPXCHG,undefined x4,CMPXCHG8B/16B,VMPTRST
    row([
        UNDEF,
        MODRM,
        UNDEF,
        UNDEF,
        UNDEF,
        UNDEF,
        MODRM,
        MODRM,
    ]),
    // GRP_10 (8F): POP x8 (only reg 0 architecturally defined but encoder
    // treats the whole row uniformly)
    row([MODRM; 8]),
    // GRP_11 (0F B9): UD2, all reg values equivalent
    row([0; 8]),
    // GRP_12 (C6-C7): MOV x8
    row([MODRM; 8]),
    // GRP_13 (0F 71): undefined,undefined,PSRLW,undefined,PSRAW,undefined,PSLLW,undefined
    row([
        UNDEF,
        UNDEF,
        MODRM | IMM8,
        UNDEF,
        MODRM | IMM8,
        UNDEF,
        MODRM | IMM8,
        UNDEF,
    ]),
    // GRP_14 (0F 72): same pattern, PSRLD/PSRAD/PSLLD
    row([
        UNDEF,
        UNDEF,
        MODRM | IMM8,
        UNDEF,
        MODRM | IMM8,
        UNDEF,
        MODRM | IMM8,
        UNDEF,
    ]),
    // GRP_15 (0F 73): undefined,undefined,PSRLQ,PSRLDQ,undefined,undefined,PSLLQ,PSLLDQ
    row([
        UNDEF,
        UNDEF,
        MODRM | IMM8,
        MODRM | IMM8,
        UNDEF,
        UNDEF,
        MODRM | IMM8,
        MODRM | IMM8,
    ]),
    // GRP_16 (0F AE): FXSAVE,FXRSTOR,LDMXCSR,STMXCSR,XSAVE,XRSTOR,(LOCK)MFENCE,(LOCK)SFENCE
    row([MODRM; 8]),
    // GRP_17A (0F 18): PREFETCHNTA/T0/T1/T2, HINT_NOP x4
    row([MODRM; 8]),
    // GRP_17B (0F 19-1F): HINT_NOP x8
    row([MODRM; 8]),
    // GRP_FISTTP (DF/DB/DD /1): FILD/FISTTP/FIST/FISTP/... ; reg 1 is the
    // FISTTP form the patcher rewrites back to FISTP.
    row([
        MODRM,
        MODRM | NEEDS_PATCH,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
        MODRM,
    ]),
];

/// Look up the flags for `reg` (0..=7, the ModR/M.reg field) within `id`.
pub fn group(id: GroupId, reg: u8) -> F {
    GROUPS[id as usize][(reg & 0x7) as usize]
}
