/// Errors returned by the square graph builder.
///
/// Broken graph invariants (detaching an idle edge, releasing twice) are
/// programmer errors and panic instead.
#[derive(thiserror::Error, Debug)]
pub enum SquareGraphError {
    #[error("a square needs exactly 4 corners, got {corners}")]
    CornerCount { corners: usize },
    #[error("square side {side} has zero length")]
    DegenerateSide { side: usize },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
