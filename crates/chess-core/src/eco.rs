//! ECO (Encyclopaedia of Chess Openings) classification codes.

/// Volume letter and two-digit number, e.g. `"C60"`.
pub fn is_valid_eco(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 3
        && matches!(bytes[0], b'A'..=b'E')
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit()
}

/// Uppercase and trim user input, returning it only if it is a valid code.
pub fn parse_eco(input: &str) -> Option<String> {
    let code = input.trim().to_ascii_uppercase();
    is_valid_eco(&code).then_some(code)
}
