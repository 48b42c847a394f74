/// Aggregated view of quiz progress, useful for rendering a progress line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    /// One-based number of the question on screen.
    pub position: usize,
    pub answered: usize,
    pub remaining: usize,
    pub score: u32,
    pub is_complete: bool,
}
