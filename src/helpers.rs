// Expands a 5-bit console color channel (0-31) to 8 bits.
pub fn scale_color(c: u8) -> u8 {
    ((c as u16) * 255 / 31) as u8
}

// Nearest 5-bit channel value for an 8-bit one.
pub fn unscale_color(c: u8) -> u8 {
    (((c as u16) * 31 + 127) / 255) as u8
}
