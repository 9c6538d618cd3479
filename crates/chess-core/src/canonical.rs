//! Canonical move-line notation used as the opening catalog's search key.
//!
//! A canonical line numbers each move pair: `"1. e4 e5 2. Nf3 Nc6 3. Bb5"`.
//! Move tokens are copied verbatim; nothing here checks legality.

/// Render a SAN move list as a canonical line.
///
/// Even indices are White's moves, odd indices Black's. An unfinished final
/// pair simply omits Black's move. Empty input yields an empty string.
pub fn normalize<S: AsRef<str>>(moves: &[S]) -> String {
    let mut line = String::new();

    for (k, pair) in moves.chunks(2).enumerate() {
        if k > 0 {
            line.push(' ');
        }
        line.push_str(&format!("{}. {}", k + 1, pair[0].as_ref()));
        if let Some(black) = pair.get(1) {
            line.push(' ');
            line.push_str(black.as_ref());
        }
    }

    line
}

/// Split a canonical line back into its SAN tokens, dropping move numbers.
///
/// Also tolerates PGN-style numbering such as `"1.e4"` and black-to-move
/// markers (`"3..."`), and drops trailing game results.
pub fn parse_line(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter_map(|token| {
            let token = strip_move_number(token);
            if token.is_empty() || is_result(token) {
                None
            } else {
                Some(token.to_string())
            }
        })
        .collect()
}

/// Number of half-moves in a canonical line.
pub fn ply_count(line: &str) -> usize {
    parse_line(line).len()
}

fn strip_move_number(token: &str) -> &str {
    let digits = token.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return token;
    }
    let rest = &token[digits..];
    if rest.starts_with('.') {
        rest.trim_start_matches('.')
    } else {
        token
    }
}

fn is_result(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ruy_lopez() {
        let moves = ["e4", "e5", "Nf3", "Nc6", "Bb5"];
        assert_eq!(normalize(&moves), "1. e4 e5 2. Nf3 Nc6 3. Bb5");
    }

    #[test]
    fn test_normalize_single_white_move() {
        assert_eq!(normalize(&["e4"]), "1. e4");
    }

    #[test]
    fn test_normalize_empty() {
        let moves: [&str; 0] = [];
        assert_eq!(normalize(&moves), "");
    }

    #[test]
    fn test_normalize_full_pairs_has_no_trailing_space() {
        let line = normalize(&["d4", "d5", "c4", "e6"]);
        assert_eq!(line, "1. d4 d5 2. c4 e6");
        assert!(!line.ends_with(' '));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let moves = vec!["e4".to_string(), "c5".to_string(), "Nf3".to_string()];
        assert_eq!(normalize(&moves), normalize(&moves));
    }

    #[test]
    fn test_normalize_keeps_tokens_verbatim() {
        // Illegal or odd tokens pass through untouched
        let line = normalize(&["O-O", "Qxh7#", "zz9"]);
        assert_eq!(line, "1. O-O Qxh7# 2. zz9");
    }

    #[test]
    fn test_parse_line_inverts_normalize() {
        let moves = vec!["e4", "e5", "Nf3", "Nc6", "Bb5"];
        assert_eq!(parse_line(&normalize(&moves)), moves);
    }

    #[test]
    fn test_parse_line_pgn_numbering() {
        assert_eq!(parse_line("1.d4 Nf6 2.c4 e6 1-0"), vec!["d4", "Nf6", "c4", "e6"]);
        assert_eq!(parse_line("3... Nc6"), vec!["Nc6"]);
    }

    #[test]
    fn test_ply_count() {
        assert_eq!(ply_count(""), 0);
        assert_eq!(ply_count("1. e4"), 1);
        assert_eq!(ply_count("1. e4 e5 2. Nf3 Nc6 3. Bb5"), 5);
    }
}
