//! The legacy one-byte opcode map (including the `0F` two-byte escape).
//!
//! Transcribed directly from the reference decoder's opcode table; see
//! [`super::groups`] for the ModR/M.reg sub-tables some of these entries
//! point into via [`OpcodeFlags::group_index`](super::flags::OpcodeFlags::group_index).

use super::flags::{GroupId, OpcodeFlags as F};

const MODRM: F = F::HAS_MODRM;
const PREFIX: F = F::IS_PREFIX;
const REX: F = F::IS_REX;
const TWOBYTE: F = F::IS_TWOBYTE;
const IMM8: F = F::HAS_IMM8;
const IMM16: F = F::HAS_IMM16;
const CHECK66: F = F::CHECK_66;
const CHECK67: F = F::CHECK_67;
const CHECKREX: F = F::CHECK_REX;
const IA32: F = F::IA32_ONLY;
const SPECIAL: F = F::SPECIAL;
const NONE: F = F::empty();

const fn g(id: GroupId) -> F {
    F::empty().with_group(id)
}

/// One row per opcode byte `0x00..=0xFF`.
pub static ONE_BYTE: [F; 256] = [
    MODRM.union(SPECIAL),                    // 00 ADD Eb,Gb
    MODRM,                                    // 01 ADD Ev,Gv
    MODRM,                                    // 02 ADD Gb,Eb
    MODRM,                                    // 03 ADD Gv,Ev
    IMM8,                                     // 04 ADD AL,Ib
    CHECK66,                                  // 05 ADD rAX,Iz
    IA32.union(SPECIAL),                      // 06 PUSH ES
    IA32.union(SPECIAL),                      // 07 POP ES
    MODRM,                                    // 08 OR Eb,Gb
    MODRM,                                    // 09 OR Ev,Gv
    MODRM,                                    // 0A OR Gb,Eb
    MODRM,                                    // 0B OR Gv,Ev
    IMM8,                                     // 0C OR AL,Ib
    CHECK66,                                  // 0D OR rAX,Iz
    IA32.union(SPECIAL),                      // 0E PUSH CS
    TWOBYTE,                                  // 0F two-byte escape
    MODRM,                                    // 10 ADC Eb,Gb
    MODRM,                                    // 11 ADC Ev,Gv
    MODRM,                                    // 12 ADC Gb,Eb
    MODRM,                                    // 13 ADC Gv,Ev
    IMM8,                                     // 14 ADC AL,Ib
    CHECK66,                                  // 15 ADC rAX,Iz
    IA32.union(SPECIAL),                      // 16 PUSH SS
    IA32.union(SPECIAL),                      // 17 POP SS
    MODRM,                                    // 18 SBB Eb,Gb
    MODRM,                                    // 19 SBB Ev,Gv
    MODRM,                                    // 1A SBB Gb,Eb
    MODRM,                                    // 1B SBB Gv,Ev
    IMM8,                                     // 1C SBB AL,Ib
    CHECK66,                                  // 1D SBB rAX,Iz
    IA32.union(SPECIAL),                      // 1E PUSH DS
    IA32.union(SPECIAL),                      // 1F POP DS
    MODRM,                                    // 20 AND Eb,Gb
    MODRM,                                    // 21 AND Ev,Gv
    MODRM,                                    // 22 AND Gb,Eb
    MODRM,                                    // 23 AND Gv,Ev
    IMM8,                                     // 24 AND AL,Ib
    CHECK66,                                  // 25 AND rAX,Iz
    PREFIX,                                   // 26 ES segment override
    IA32.union(SPECIAL),                      // 27 DAA
    MODRM,                                    // 28 SUB Eb,Gb
    MODRM,                                    // 29 SUB Ev,Gv
    MODRM,                                    // 2A SUB Gb,Eb
    MODRM,                                    // 2B SUB Gv,Ev
    IMM8,                                     // 2C SUB AL,Ib
    CHECK66,                                  // 2D SUB rAX,Iz
    PREFIX,                                   // 2E CS segment override
    IA32.union(SPECIAL),                      // 2F DAS
    MODRM,                                    // 30 XOR Eb,Gb
    MODRM,                                    // 31 XOR Ev,Gv
    MODRM,                                    // 32 XOR Gb,Eb
    MODRM,                                    // 33 XOR Gv,Ev
    IMM8,                                     // 34 XOR AL,Ib
    CHECK66,                                  // 35 XOR rAX,Iz
    PREFIX,                                   // 36 SS segment override
    IA32.union(SPECIAL),                      // 37 AAA
    MODRM,                                    // 38 CMP Eb,Gb
    MODRM,                                    // 39 CMP Ev,Gv
    MODRM,                                    // 3A CMP Gb,Eb
    MODRM,                                    // 3B CMP Gv,Ev
    IMM8,                                     // 3C CMP AL,Ib
    CHECK66,                                  // 3D CMP rAX,Iz
    PREFIX,                                   // 3E DS segment override
    IA32.union(SPECIAL),                      // 3F AAS
    REX, REX, REX, REX, REX, REX, REX, REX,   // 40-47 REX (INC in IA-32)
    REX, REX, REX, REX, REX, REX, REX, REX,   // 48-4F REX.W (DEC in IA-32)
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, // 50-57 PUSH reg
    NONE, NONE, NONE, NONE, NONE, NONE, NONE, NONE, // 58-5F POP reg
    IA32,                                      // 60 PUSHA/PUSHAD
    IA32,                                      // 61 POPA/POPAD
    IA32.union(MODRM),                        // 62 BOUND Gv,Ma
    MODRM.union(SPECIAL),                      // 63 ARPL Ew,Gw / MOVSXD Gv,Ed
    PREFIX,                                   // 64 FS segment override
    PREFIX,                                   // 65 GS segment override
    PREFIX,                                   // 66 operand-size override
    PREFIX,                                   // 67 address-size override
    CHECK66,                                  // 68 PUSH Iz
    MODRM.union(CHECK66),                      // 69 IMUL Gv,Ev,Iz
    IMM8,                                     // 6A PUSH Ib
    MODRM.union(IMM8),                         // 6B IMUL Gv,Ev,Ib
    NONE,                                      // 6C INS Yb,DX
    NONE,                                      // 6D INS Yz,DX
    NONE,                                      // 6E OUTS DX,Xb
    NONE,                                      // 6F OUTS DX,Xz
    IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, // 70-77 Jcc Jb
    IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, // 78-7F Jcc Jb
    g(GroupId::Group1).union(IMM8),            // 80 group 1 Eb,Ib
    g(GroupId::Group1).union(CHECK66),         // 81 group 1 Ev,Iz
    IA32.union(g(GroupId::Group1)).union(IMM8), // 82 group 1 Eb,Ib (alias)
    g(GroupId::Group1).union(IMM8),            // 83 group 1 Ev,Ib
    MODRM,                                     // 84 TEST Eb,Gb
    MODRM,                                     // 85 TEST Ev,Gv
    MODRM,                                     // 86 XCHG Eb,Gb
    MODRM,                                     // 87 XCHG Ev,Gv
    MODRM,                                     // 88 MOV Eb,Gb
    MODRM,                                     // 89 MOV Ev,Gv
    MODRM,                                     // 8A MOV Gb,Eb
    MODRM,                                     // 8B MOV Gv,Ev
    MODRM,                                     // 8C MOV Mw/Rv,Sw
    MODRM,                                     // 8D LEA Gv,M
    MODRM,                                     // 8E MOV Sw,Mw/Rv
    g(GroupId::Group10),                       // 8F group 10
    SPECIAL,                                   // 90 NOP / PAUSE
    NONE, NONE, NONE, NONE, NONE, NONE, NONE,  // 91-97 XCHG reg,rAX
    NONE,                                       // 98 CBW/CWDE/CDQE
    NONE,                                       // 99 CWD/CDQ/CQO
    IA32.union(CHECK66).union(IMM16),          // 9A CALL Ap
    NONE,                                       // 9B (F)WAIT
    NONE,                                       // 9C PUSHF/PUSHFD
    NONE,                                       // 9D POPF/POPFD
    NONE,                                       // 9E SAHF
    NONE,                                       // 9F LAHF
    CHECK67, CHECK67, CHECK67, CHECK67,        // A0-A3 MOV AL/rAX,Ob/Ov
    NONE, NONE, NONE, NONE,                    // A4-A7 MOVS/CMPS
    IMM8,                                       // A8 TEST AL,Ib
    CHECK66,                                    // A9 TEST rAX,Iz
    NONE, NONE, NONE, NONE, NONE, NONE,        // AA-AF STOS/LODS/SCAS
    IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, // B0-B7 MOV r8,Ib
    CHECKREX.union(CHECK66), CHECKREX.union(CHECK66),
    CHECKREX.union(CHECK66), CHECKREX.union(CHECK66),
    CHECKREX.union(CHECK66), CHECKREX.union(CHECK66),
    CHECKREX.union(CHECK66), CHECKREX.union(CHECK66), // B8-BF MOV r,Iv
    g(GroupId::Group2).union(IMM8),            // C0 group 2 Eb,Ib
    g(GroupId::Group2).union(IMM8),            // C1 group 2 Ev,Ib
    IMM16,                                       // C2 RETN Iw
    NONE,                                         // C3 RETN
    IA32.union(MODRM).union(SPECIAL),            // C4 LES Gz,Mp
    IA32.union(MODRM).union(SPECIAL),            // C5 LDS Gz,Mp
    g(GroupId::Group12).union(IMM8),             // C6 group 12 Eb,Ib
    g(GroupId::Group12).union(CHECK66),          // C7 group 12 Ev,Iz
    IMM16.union(IMM8),                           // C8 ENTER Iw,Ib
    NONE,                                          // C9 LEAVE
    IMM16,                                          // CA RETF Iw
    NONE,                                            // CB RETF
    NONE,                                             // CC INT3
    IMM8,                                              // CD INT Ib
    IA32,                                               // CE INTO
    SPECIAL,                                            // CF IRET
    g(GroupId::Group2),                                 // D0 group 2 Eb,1
    g(GroupId::Group2),                                 // D1 group 2 Ev,1
    g(GroupId::Group2),                                 // D2 group 2 Eb,CL
    g(GroupId::Group2),                                 // D3 group 2 Ev,CL
    IA32.union(IMM8).union(SPECIAL),                    // D4 AAM Ib
    IA32.union(IMM8).union(SPECIAL),                    // D5 AAD Ib
    IA32,                                                // D6 SALC
    NONE,                                                 // D7 XLAT
    MODRM,                                               // D8 ESC to coprocessor
    MODRM,                                               // D9 ESC to coprocessor
    MODRM,                                               // DA ESC to coprocessor
    g(GroupId::Fisttp),                                  // DB ESC to coprocessor
    MODRM,                                               // DC ESC to coprocessor
    g(GroupId::Fisttp),                                  // DD ESC to coprocessor
    MODRM,                                               // DE ESC to coprocessor
    g(GroupId::Fisttp),                                  // DF ESC to coprocessor
    IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, IMM8, IMM8,      // E0-E7 LOOP/IN/OUT
    CHECK66,                                              // E8 CALL Jz
    CHECK66,                                              // E9 JMP Jz
    IA32.union(CHECK66).union(IMM16).union(SPECIAL),      // EA JMP Ap
    IMM8,                                                   // EB JMP Jb
    NONE, NONE, NONE, NONE,                                // EC-EF IN/OUT DX
    PREFIX,                                                 // F0 LOCK
    NONE,                                                    // F1 INT1
    PREFIX,                                                  // F2 REPNE
    PREFIX,                                                  // F3 REP/REPE
    NONE,                                                     // F4 HLT
    NONE,                                                     // F5 CMC
    g(GroupId::Group3A),                                     // F6 group 3 Eb
    g(GroupId::Group3B),                                     // F7 group 3 Ev
    NONE, NONE, NONE, NONE, NONE, NONE,                      // F8-FD flag sets/clears
    g(GroupId::Group4),                                      // FE group 4
    g(GroupId::Group5),                                      // FF group 5
];
