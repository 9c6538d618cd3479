//! Board replay helpers built on shakmaty.

use shakmaty::{fen::Fen, san::San, CastlingMode, Chess, EnPassantMode, Position};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("Invalid SAN '{san}' at ply {ply}")]
    InvalidSan { ply: usize, san: String },

    #[error("Illegal move '{san}' at ply {ply}")]
    IllegalMove { ply: usize, san: String },

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}

/// Play SAN moves from the initial position and return the resulting FEN.
pub fn fen_after<S: AsRef<str>>(moves: &[S]) -> Result<String, PositionError> {
    let mut pos = Chess::default();

    for (ply, san_str) in moves.iter().enumerate() {
        let san_str = san_str.as_ref();
        let san: San = san_str.parse().map_err(|_| PositionError::InvalidSan {
            ply,
            san: san_str.to_string(),
        })?;
        let mv = san.to_move(&pos).map_err(|_| PositionError::IllegalMove {
            ply,
            san: san_str.to_string(),
        })?;
        pos.play_unchecked(mv);
    }

    Ok(Fen::from_position(&pos, EnPassantMode::Legal).to_string())
}

/// Check that a FEN describes a legal standard-chess position.
pub fn validate_fen(fen: &str) -> Result<(), PositionError> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| PositionError::InvalidFen(format!("{e}")))?;
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| PositionError::InvalidFen(format!("{e}")))?;
    Ok(())
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_after_empty_is_start() {
        let moves: [&str; 0] = [];
        assert_eq!(fen_after(&moves).unwrap(), STARTING_FEN);
    }

    #[test]
    fn test_fen_after_ruy_lopez() {
        let fen = fen_after(&["e4", "e5", "Nf3", "Nc6", "Bb5"]).unwrap();
        assert_eq!(
            normalize_fen(&fen),
            "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq -"
        );
    }

    #[test]
    fn test_fen_after_illegal_move() {
        let err = fen_after(&["e4", "e4"]).unwrap_err();
        assert_eq!(err, PositionError::IllegalMove { ply: 1, san: "e4".into() });
    }

    #[test]
    fn test_fen_after_garbage_token() {
        assert!(matches!(
            fen_after(&["Zz9"]),
            Err(PositionError::InvalidSan { ply: 0, .. })
        ));
    }

    #[test]
    fn test_validate_fen() {
        assert!(validate_fen(STARTING_FEN).is_ok());
        assert!(validate_fen("not a fen").is_err());
        // Both kings missing
        assert!(validate_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn test_normalize_fen() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let normalized = normalize_fen(fen);
        assert_eq!(normalized, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3");
    }
}
