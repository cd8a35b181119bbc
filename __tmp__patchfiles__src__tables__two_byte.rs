//! The `0F`-prefixed two-byte opcode map.
//!
//! Besides structural flags, these opcodes often require a specific
//! mandatory prefix (SSE's `66`/`F2`/`F3` overloading the same opcode
//! byte for different instructions); [`Descriptor::prefixes`] is the
//! accept-list checked against the observed prefix bits, mirroring
//! the reference decoder's `ext_opcode_t`.

use super::flags::{GroupId, OpcodeFlags as F, PrefixClass as P};

/// One opcode's flags plus its accepted mandatory-prefix set (empty
/// meaning "no mandatory prefix required").
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub flags: F,
    pub prefixes: P,
}

const fn d(flags: F, prefixes: P) -> Descriptor {
    Descriptor { flags, prefixes }
}

const NOP: P = P::empty();
const NONE: P = P::NONE;
const F2: P = P::F2;
const F3: P = P::F3;
const OPSIZE: P = P::OPSIZE;
const SSE_ALL: P = P::SSE_ALL;

const fn g(id: GroupId) -> F {
    F::empty().with_group(id)
}

/// One row per second opcode byte `0x00..=0xFF` following the `0F` escape.
pub static TWO_BYTE: [Descriptor; 256] = [
    d(g(GroupId::Group6), NOP),                           // 00 group 6
    d(g(GroupId::Group7), NOP),                           // 01 group 7
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // 02 LAR Gv,Ew
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // 03 LSL Gv,Ew
    d(F::UNDEFINED, NOP),                                 // 04
    d(F::empty(), NOP),                                   // 05 SYSCALL
    d(F::SPECIAL, NOP),                                   // 06 CLTS
    d(F::SPECIAL, NOP),                                   // 07 SYSRET
    d(F::SPECIAL, NOP),                                   // 08 INVD
    d(F::SPECIAL, NOP),                                   // 09 WBINVD
    d(F::UNDEFINED, NOP),                                 // 0A
    d(F::empty(), NOP),                                   // 0B UD2
    d(F::UNDEFINED, NOP),                                 // 0C
    d(F::HAS_MODRM, NOP),                                 // 0D PREFETCHx
    d(F::empty(), NOP),                                   // 0E FEMMS
    d(F::UNDEFINED, NOP),                                 // 0F (3DNow!)
    d(F::HAS_MODRM, SSE_ALL),                             // 10 MOVUPS/MOVSS/MOVUPD/MOVSD
    d(F::HAS_MODRM, SSE_ALL),                             // 11 MOVUPS/MOVSS/MOVUPD/MOVSD (store)
    d(F::HAS_MODRM, SSE_ALL),                             // 12 MOVLPS/MOVSLDUP/MOVLPD/MOVDDUP
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 13 MOVLPS/MOVLPD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 14 UNPCKLPS/PD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 15 UNPCKHPS/PD
    d(F::HAS_MODRM, NONE.union(F3).union(OPSIZE)),        // 16 MOVHPS/MOVSHDUP/MOVHPD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 17 MOVHPS/MOVHPD
    d(g(GroupId::Group17A), NOP),                         // 18 group 17 (PREFETCHhint)
    d(g(GroupId::Group17B), NOP),                         // 19 group 17 (HINT_NOP)
    d(g(GroupId::Group17B), NOP),                         // 1A
    d(g(GroupId::Group17B), NOP),                         // 1B
    d(g(GroupId::Group17B), NOP),                         // 1C
    d(g(GroupId::Group17B), NOP),                         // 1D
    d(g(GroupId::Group17B), NOP),                         // 1E
    d(g(GroupId::Group17B), NOP),                         // 1F
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // 20 MOV Rd,Cd
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // 21 MOV Rd,Dd
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // 22 MOV Cd,Rd
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // 23 MOV Dd,Rd
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // 24 MOV Rd,Td
    d(F::UNDEFINED, NOP),                                 // 25
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // 26 MOV Td,Rd
    d(F::UNDEFINED, NOP),                                 // 27
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 28 MOVAPS/MOVAPD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 29 MOVAPS/MOVAPD (store)
    d(F::HAS_MODRM, SSE_ALL),                             // 2A CVTPI2PS/CVTSI2SS/CVTPI2PD/CVTSI2SD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 2B MOVNTPS/MOVNTPD
    d(F::HAS_MODRM, SSE_ALL),                             // 2C CVTTPS2PI/CVTTSS2SI/CVTTPD2PI/CVTTSD2SI
    d(F::HAS_MODRM, SSE_ALL),                             // 2D CVTPS2PI/CVTSS2SI/CVTPD2PI/CVTSD2SI
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 2E UCOMISS/UCOMISD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 2F COMISS/COMISD
    d(F::SPECIAL, NOP),                                   // 30 WRMSR
    d(F::empty(), NOP),                                   // 31 RDTSC
    d(F::SPECIAL, NOP),                                   // 32 RDMSR
    d(F::empty(), NOP),                                   // 33 RDPMC
    d(F::NEEDS_PATCH, NOP),                                // 34 SYSENTER
    d(F::SPECIAL, NOP),                                   // 35 SYSEXIT
    d(F::UNDEFINED, NOP),                                 // 36
    d(F::UNDEFINED, NOP),                                 // 37
    d(F::ESC_3B_38, NOP),                                 // 38 three-byte 0F 38 escape
    d(F::UNDEFINED, NOP),                                 // 39
    d(F::ESC_3B_3A, NOP),                                 // 3A three-byte 0F 3A escape
    d(F::UNDEFINED, NOP),                                 // 3B
    d(F::UNDEFINED, NOP),                                 // 3C
    d(F::UNDEFINED, NOP),                                 // 3D
    d(F::UNDEFINED, NOP),                                 // 3E
    d(F::UNDEFINED, NOP),                                 // 3F
    d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP),
    d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), // 40-47 CMOVcc
    d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP),
    d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), // 48-4F CMOVcc
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 50 MOVMSKPS/PD
    d(F::HAS_MODRM, SSE_ALL),                             // 51 SQRTPS/SS/PD/SD
    d(F::HAS_MODRM, NONE.union(F3)),                      // 52 RSQRTPS/SS
    d(F::HAS_MODRM, NONE.union(F3)),                      // 53 RCPPS/SS
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 54 ANDPS/PD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 55 ANDNPS/PD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 56 ORPS/PD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 57 XORPS/PD
    d(F::HAS_MODRM, SSE_ALL),                             // 58 ADDPS/SS/PD/SD
    d(F::HAS_MODRM, SSE_ALL),                             // 59 MULPS/SS/PD/SD
    d(F::HAS_MODRM, SSE_ALL),                             // 5A CVTPS2PD/CVTSS2SD/CVTPD2PS/CVTSD2SS
    d(F::HAS_MODRM, NONE.union(F3).union(OPSIZE)),        // 5B CVTDQ2PS/CVTTPS2DQ/CVTPS2DQ
    d(F::HAS_MODRM, SSE_ALL),                             // 5C SUBPS/SS/PD/SD
    d(F::HAS_MODRM, SSE_ALL),                             // 5D MINPS/SS/PD/SD
    d(F::HAS_MODRM, SSE_ALL),                             // 5E DIVPS/SS/PD/SD
    d(F::HAS_MODRM, SSE_ALL),                             // 5F MAXPS/SS/PD/SD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 60 PUNPCKLBW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 61 PUNPCKLWD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 62 PUNPCKLDQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 63 PACKSSWB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 64 PCMPGTB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 65 PCMPGTW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 66 PCMPGTD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 67 PACKUSWB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 68 PUNPCKHBW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 69 PUNPCKHWD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 6A PUNPCKHDQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 6B PACKSSDW
    d(F::HAS_MODRM, OPSIZE),                              // 6C PUNPCKLQDQ
    d(F::HAS_MODRM, OPSIZE),                              // 6D PUNPCKHQDQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 6E MOVD
    d(F::HAS_MODRM, NONE.union(F3).union(OPSIZE)),        // 6F MOVQ/MOVDQU/MOVDQA
    d(F::HAS_MODRM.union(F::HAS_IMM8), SSE_ALL),          // 70 PSHUFW/PSHUFHW/PSHUFD/PSHUFLW
    d(g(GroupId::Group13), NONE.union(OPSIZE)),           // 71 group 13
    d(g(GroupId::Group14), NONE.union(OPSIZE)),           // 72 group 14
    d(g(GroupId::Group15), NONE.union(OPSIZE)),           // 73 group 15
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 74 PCMPEQB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 75 PCMPEQW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // 76 PCMPEQD
    d(F::empty(), NONE),                                  // 77 EMMS
    d(F::HAS_MODRM, NOP),                                 // 78 VMREAD
    d(F::HAS_MODRM, NOP),                                 // 79 VMWRITE
    d(F::UNDEFINED, NOP),                                 // 7A
    d(F::UNDEFINED, NOP),                                 // 7B
    d(F::HAS_MODRM, NONE.union(OPSIZE).union(F2)),        // 7C HADDPS/PD
    d(F::HAS_MODRM, NONE.union(OPSIZE).union(F2)),        // 7D HSUBPS/PD
    d(F::HAS_MODRM, NONE.union(F3).union(OPSIZE)),        // 7E MOVD/MOVQ
    d(F::HAS_MODRM, NONE.union(F3).union(OPSIZE)),        // 7F MOVQ/MOVDQU/MOVDQA (store)
    d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), d(F::CHECK_66, NOP),
    d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), // 80-87 Jcc Jv
    d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), d(F::CHECK_66, NOP),
    d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), d(F::CHECK_66, NOP), // 88-8F Jcc Jv
    d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP),
    d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), // 90-97 SETcc
    d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP),
    d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), d(F::HAS_MODRM, NOP), // 98-9F SETcc
    d(F::SPECIAL, NOP),                                   // A0 PUSH FS
    d(F::SPECIAL, NOP),                                   // A1 POP FS
    d(F::NEEDS_PATCH, NOP),                                // A2 CPUID
    d(F::HAS_MODRM, NOP),                                 // A3 BT Ev,Gv
    d(F::HAS_MODRM.union(F::HAS_IMM8), NOP),              // A4 SHLD Ev,Gv,Ib
    d(F::HAS_MODRM, NOP),                                 // A5 SHLD Ev,Gv,CL
    d(F::UNDEFINED, NOP),                                 // A6
    d(F::UNDEFINED, NOP),                                 // A7
    d(F::SPECIAL, NOP),                                   // A8 PUSH GS
    d(F::SPECIAL, NOP),                                   // A9 POP GS
    d(F::SPECIAL, NOP),                                   // AA RSM
    d(F::HAS_MODRM, NOP),                                 // AB BTS Ev,Gv
    d(F::HAS_MODRM.union(F::HAS_IMM8), NOP),              // AC SHRD Ev,Gv,Ib
    d(F::HAS_MODRM, NOP),                                 // AD SHRD Ev,Gv,CL
    d(g(GroupId::Group16), NOP),                          // AE group 16
    d(F::HAS_MODRM, NOP),                                 // AF IMUL Gv,Ev
    d(F::HAS_MODRM, NOP),                                 // B0 CMPXCHG Eb,Gb
    d(F::HAS_MODRM, NOP),                                 // B1 CMPXCHG Ev,Gv
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // B2 LSS Gz,Mp
    d(F::HAS_MODRM, NOP),                                 // B3 BTR Ev,Gv
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // B4 LFS Gz,Mp
    d(F::HAS_MODRM.union(F::SPECIAL), NOP),               // B5 LGS Gz,Mp
    d(F::HAS_MODRM, NOP),                                 // B6 MOVZX Gv,Eb
    d(F::HAS_MODRM, NOP),                                 // B7 MOVZX Gv,Ew
    d(F::HAS_MODRM, F3),                                  // B8 POPCNT
    d(g(GroupId::Group11), NOP),                          // B9 group 11 (UD2)
    d(g(GroupId::Group8), NOP),                           // BA group 8
    d(F::HAS_MODRM, NOP),                                 // BB BTC Ev,Gv
    d(F::HAS_MODRM, NOP),                                 // BC BSF Gv,Ev
    d(F::HAS_MODRM, NOP),                                 // BD BSR Gv,Ev
    d(F::HAS_MODRM, NOP),                                 // BE MOVSX Gv,Eb
    d(F::HAS_MODRM, NOP),                                 // BF MOVSX Gv,Ew
    d(F::HAS_MODRM, NOP),                                 // C0 XADD Eb,Gb
    d(F::HAS_MODRM, NOP),                                 // C1 XADD Ev,Gv
    d(F::HAS_MODRM.union(F::HAS_IMM8), SSE_ALL),          // C2 CMPPS/SS/PD/SD
    d(F::HAS_MODRM, NONE),                                // C3 MOVNTI
    d(F::HAS_MODRM.union(F::HAS_IMM8), NONE.union(OPSIZE)), // C4 PINSRW
    d(F::HAS_MODRM.union(F::HAS_IMM8), NONE.union(OPSIZE)), // C5 PEXTRW
    d(F::HAS_MODRM.union(F::HAS_IMM8), NONE.union(OPSIZE)), // C6 SHUFPS/PD
    d(g(GroupId::Group9), NOP),                           // C7 group 9
    d(F::empty(), NOP), d(F::empty(), NOP), d(F::empty(), NOP), d(F::empty(), NOP),
    d(F::empty(), NOP), d(F::empty(), NOP), d(F::empty(), NOP), d(F::empty(), NOP), // C8-CF BSWAP
    d(F::HAS_MODRM, OPSIZE.union(F2)),                    // D0 ADDSUBPS/PD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // D1 PSRLW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // D2 PSRLD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // D3 PSRLQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // D4 PADDQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // D5 PMULLW
    d(F::HAS_MODRM, F3.union(OPSIZE).union(F2)),          // D6 MOVQ2DQ/MOVQ/MOVDQ2Q
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // D7 PMOVMSKB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // D8 PSUBUSB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // D9 PSUBUSW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // DA PMINUB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // DB PAND
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // DC PADDUSB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // DD PADDUSW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // DE PMAXUB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // DF PANDN
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E0 PAVGB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E1 PSRAW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E2 PSRAD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E3 PAVGW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E4 PMULHUW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E5 PMULHW
    d(F::HAS_MODRM, F3.union(OPSIZE).union(F2)),          // E6 CVTDQ2PD/CVTTPD2DQ/CVTPD2DQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E7 MOVNTQ/MOVNTDQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E8 PSUBSB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // E9 PSUBSW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // EA PMINSW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // EB POR
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // EC PADDSB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // ED PADDSW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // EE PMAXSW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // EF PXOR
    d(F::HAS_MODRM.union(F::NEEDS_PATCH), F2),            // F0 LDDQU Vo,Mo
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F1 PSLLW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F2 PSLLD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F3 PSLLQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F4 PMULUDQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F5 PMADDWD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F6 PSADBW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F7 MASKMOVQ/MASKMOVDQU
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F8 PSUBB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // F9 PSUBW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // FA PSUBD
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // FB PSUBQ
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // FC PADDB
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // FD PADDW
    d(F::HAS_MODRM, NONE.union(OPSIZE)),                  // FE PADDD
    d(F::UNDEFINED, NOP),                                 // FF
];


