//! The `0F 3A`-prefixed three-byte opcode map (SSE4.1 immediate-form ops).

use super::two_byte::Descriptor;
use super::flags::{OpcodeFlags as F, PrefixClass as P};

const UNDEF: Descriptor = Descriptor {
    flags: F::UNDEFINED,
    prefixes: P::empty(),
};

const fn modrm_imm8(prefixes: P) -> Descriptor {
    Descriptor {
        flags: F::HAS_MODRM.union(F::HAS_IMM8),
        prefixes,
    }
}

const SIXTY_SIX: P = P::OPSIZE;
const NONE_66: P = P::NONE.union(P::OPSIZE);

const fn build() -> [Descriptor; 256] {
    let mut t = [UNDEF; 256];

    t[0x08] = modrm_imm8(SIXTY_SIX); // ROUNDPS
    t[0x09] = modrm_imm8(SIXTY_SIX); // ROUNDPD
    t[0x0A] = modrm_imm8(SIXTY_SIX); // ROUNDSS
    t[0x0B] = modrm_imm8(SIXTY_SIX); // ROUNDSD
    t[0x0C] = modrm_imm8(SIXTY_SIX); // BLENDPS
    t[0x0D] = modrm_imm8(SIXTY_SIX); // BLENDPD
    t[0x0E] = modrm_imm8(SIXTY_SIX); // PBLENDW
    t[0x0F] = modrm_imm8(NONE_66);   // PALIGNR

    t[0x14] = modrm_imm8(SIXTY_SIX); // PEXTRB
    t[0x15] = modrm_imm8(SIXTY_SIX); // PEXTRW
    t[0x16] = modrm_imm8(SIXTY_SIX); // PEXTRD/PEXTRQ
    t[0x17] = modrm_imm8(SIXTY_SIX); // EXTRACTPS

    t[0x20] = modrm_imm8(SIXTY_SIX); // PINSRB
    t[0x21] = modrm_imm8(SIXTY_SIX); // INSERTPS
    t[0x22] = modrm_imm8(SIXTY_SIX); // PINSRD/PINSRQ

    t[0x40] = modrm_imm8(SIXTY_SIX); // DPPS
    t[0x41] = modrm_imm8(SIXTY_SIX); // DPPD
    t[0x42] = modrm_imm8(SIXTY_SIX); // MPSADBW

    t[0x60] = modrm_imm8(SIXTY_SIX); // PCMPESTRM
    t[0x61] = modrm_imm8(SIXTY_SIX); // PCMPESTRI
    t[0x62] = modrm_imm8(SIXTY_SIX); // PCMPISTRM
    t[0x63] = modrm_imm8(SIXTY_SIX); // PCMPISTRI

    t
}

/// Table indexed by the opcode byte following `0F 3A`.
pub static THREE_BYTE_3A: [Descriptor; 256] = build();


