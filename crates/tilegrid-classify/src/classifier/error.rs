use tilegrid_core::GridError;

/// Errors returned by the classification pipeline.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("image buffer has {got} bytes, expected {expected}")]
    InvalidImageBuffer { expected: usize, got: usize },
    #[error(
        "template library is built for {library_w}x{library_h} cells, image yields {cell_w}x{cell_h}"
    )]
    CellSizeMismatch {
        library_w: usize,
        library_h: usize,
        cell_w: usize,
        cell_h: usize,
    },
}
