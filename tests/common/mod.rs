//! Synthetic barcode rasters for integration tests.

use barcode_scan::Frame;

const L_CODES: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011", "0110001", "0101111", "0111011",
    "0110111", "0001011",
];
const G_CODES: [&str; 10] = [
    "0100111", "0110011", "0011011", "0100001", "0011101", "0111001", "0000101", "0010001",
    "0001001", "0010111",
];
const R_CODES: [&str; 10] = [
    "1110010", "1100110", "1101100", "1000010", "1011100", "1001110", "1010000", "1000100",
    "1001000", "1110100",
];
// Left-half parity by leading digit; 'G' selects the even-parity set
const PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL",
    "LGGLGL",
];

const QUIET_MODULES: usize = 15;

/// The 95 modules of an EAN-13 symbol, `true` for bar.
pub fn ean13_modules(code: &str) -> Vec<bool> {
    let digits: Vec<usize> = code
        .bytes()
        .map(|b| usize::from(b - b'0'))
        .collect();
    assert_eq!(digits.len(), 13, "EAN-13 needs 13 digits");

    let mut pattern = String::from("101");
    for (digit, parity) in digits[1..7].iter().zip(PARITY[digits[0]].chars()) {
        pattern.push_str(if parity == 'G' {
            G_CODES[*digit]
        } else {
            L_CODES[*digit]
        });
    }
    pattern.push_str("01010");
    for digit in &digits[7..] {
        pattern.push_str(R_CODES[*digit]);
    }
    pattern.push_str("101");

    pattern.chars().map(|c| c == '1').collect()
}

/// Renders `code` as a luminance frame with the given bar/space levels.
pub fn ean13_frame_with_levels(code: &str, module_px: u32, height: u32, bar: u8, space: u8) -> Frame {
    let mut modules = vec![false; QUIET_MODULES];
    modules.extend(ean13_modules(code));
    modules.extend(std::iter::repeat(false).take(QUIET_MODULES));

    let row: Vec<u8> = modules
        .iter()
        .flat_map(|&is_bar| std::iter::repeat(if is_bar { bar } else { space }).take(module_px as usize))
        .collect();
    let width = row.len() as u32;
    let pixels = row.repeat(height as usize);

    Frame::new(pixels, width, height, 0)
}

/// Black-on-white EAN-13 frame.
pub fn ean13_frame(code: &str) -> Frame {
    ean13_frame_with_levels(code, 3, 80, 0, 255)
}

/// Plain white frame with nothing to decode.
pub fn blank_frame() -> Frame {
    Frame::new(vec![255; 375 * 80], 375, 80, 0)
}
