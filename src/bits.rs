// Bitfield helpers over u64 words. Fields that fall partly outside the word
// are truncated rather than wrapping around into unrelated bits.

pub fn bitmask(nbits: u32) -> u64 {
    if nbits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << nbits) - 1
    }
}

pub fn getbits(num: u64, bitno: u32, nbits: u32) -> u64 {
    num.checked_shr(bitno).unwrap_or(0) & bitmask(nbits)
}

pub fn setbits(num: u64, bitno: u32, nbits: u32, data: u64) -> u64 {
    let mask = bitmask(nbits);
    let field = mask.checked_shl(bitno).unwrap_or(0);
    let value = (data & mask).checked_shl(bitno).unwrap_or(0);
    (num & !field) | (value & field)
}

pub fn getbit(num: u64, bitno: u32) -> bool {
    getbits(num, bitno, 1) == 1
}

pub fn setbit(num: u64, bitno: u32, data: bool) -> u64 {
    setbits(num, bitno, 1, data as u64)
}
