//! The `0F 38`-prefixed three-byte opcode map (mostly SSSE3/SSE4.1).
//!
//! Built as a const fn rather than a flat literal: almost the entire
//! map is undefined, so the table starts all-undefined and only the
//! handful of real opcodes get overwritten.

use super::two_byte::Descriptor;
use super::flags::{OpcodeFlags as F, PrefixClass as P};

const UNDEF: Descriptor = Descriptor {
    flags: F::UNDEFINED,
    prefixes: P::empty(),
};

const fn modrm(prefixes: P) -> Descriptor {
    Descriptor {
        flags: F::HAS_MODRM,
        prefixes,
    }
}

const NONE_66: P = P::NONE.union(P::OPSIZE);
const SIXTY_SIX: P = P::OPSIZE;

const fn build() -> [Descriptor; 256] {
    let mut t = [UNDEF; 256];

    t[0x00] = modrm(NONE_66); // PSHUFB
    t[0x01] = modrm(NONE_66); // PHADDW
    t[0x02] = modrm(NONE_66); // PHADDD
    t[0x03] = modrm(NONE_66); // PHADDSW
    t[0x04] = modrm(NONE_66); // PMADDUBSW
    t[0x05] = modrm(NONE_66); // PHSUBW
    t[0x06] = modrm(NONE_66); // PHSUBD
    t[0x07] = modrm(NONE_66); // PHSUBSW
    t[0x08] = modrm(NONE_66); // PSIGNB
    t[0x09] = modrm(NONE_66); // PSIGNW
    t[0x0A] = modrm(NONE_66); // PSIGND
    t[0x0B] = modrm(NONE_66); // PMULHRSW

    t[0x10] = modrm(SIXTY_SIX); // PBLENDVB
    t[0x14] = modrm(SIXTY_SIX); // BLENDVPS
    t[0x15] = modrm(SIXTY_SIX); // BLENDVPD
    t[0x17] = modrm(SIXTY_SIX); // PTEST

    t[0x1C] = modrm(NONE_66); // PABSB
    t[0x1D] = modrm(NONE_66); // PABSW
    t[0x1E] = modrm(NONE_66); // PABSD

    t[0x20] = modrm(SIXTY_SIX); // PMOVSXBW
    t[0x21] = modrm(SIXTY_SIX); // PMOVSXBD
    t[0x22] = modrm(SIXTY_SIX); // PMOVSXBQ
    t[0x23] = modrm(SIXTY_SIX); // PMOVSXWD
    t[0x24] = modrm(SIXTY_SIX); // PMOVSXWQ
    t[0x25] = modrm(SIXTY_SIX); // PMOVSXDQ

    t[0x28] = modrm(SIXTY_SIX); // PMULDQ
    t[0x29] = modrm(SIXTY_SIX); // PCMPEQQ
    t[0x2A] = modrm(SIXTY_SIX); // MOVNTDQA
    t[0x2B] = modrm(SIXTY_SIX); // PACKUSDW

    t[0x30] = modrm(SIXTY_SIX); // PMOVZXBW
    t[0x31] = modrm(SIXTY_SIX); // PMOVZXBD
    t[0x32] = modrm(SIXTY_SIX); // PMOVZXBQ
    t[0x33] = modrm(SIXTY_SIX); // PMOVZXWD
    t[0x34] = modrm(SIXTY_SIX); // PMOVZXWQ
    t[0x35] = modrm(SIXTY_SIX); // PMOVZXDQ

    t[0x37] = modrm(SIXTY_SIX); // PCMPGTQ
    t[0x38] = modrm(SIXTY_SIX); // PMINSB
    t[0x39] = modrm(SIXTY_SIX); // PMINSD
    t[0x3A] = modrm(SIXTY_SIX); // PMINUW
    t[0x3B] = modrm(SIXTY_SIX); // PMINUD
    t[0x3C] = modrm(SIXTY_SIX); // PMAXSB
    t[0x3D] = modrm(SIXTY_SIX); // PMAXSD
    t[0x3E] = modrm(SIXTY_SIX); // PMAXUW
    t[0x3F] = modrm(SIXTY_SIX); // PMAXUD
    t[0x40] = modrm(SIXTY_SIX); // PMULLD
    t[0x41] = modrm(SIXTY_SIX); // PHMINPOSUW

    t[0xF0] = modrm(P::F2); // CRC32
    t[0xF1] = modrm(P::F2); // CRC32

    t
}

/// Table indexed by the opcode byte following `0F 38`.
pub static THREE_BYTE_38: [Descriptor; 256] = build();
