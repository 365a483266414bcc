//! Fixed sizing and spacing constants shared by layout and rendering.
//!
//! Layout positions and rendering sizes both read from here so the hit-test
//! rectangles always match what is drawn.

/// Worktree box width
pub const WORKTREE_W: f32 = 200.0;
/// Worktree box height
pub const WORKTREE_H: f32 = 56.0;
/// Branch box width
pub const BRANCH_W: f32 = 180.0;
/// Branch box height
pub const BRANCH_H: f32 = 40.0;

/// Vertical gap between consecutive worktree rows
pub const WORKTREE_GAP: f32 = 100.0;
/// Center-to-center vertical spacing between sibling branches
pub const BRANCH_GAP: f32 = 50.0;
/// Horizontal gap between a worktree's right edge and its branch column
pub const H_GAP: f32 = 120.0;

/// Left margin before the worktree column
pub const LEFT_MARGIN: f32 = 80.0;
/// Top margin before the first worktree row
pub const TOP_MARGIN: f32 = 40.0;

/// Zoom clamp range
pub const MIN_SCALE: f32 = 0.3;
pub const MAX_SCALE: f32 = 2.5;

/// Padding subtracted from the container when fitting the whole diagram
pub const FIT_PADDING: f32 = 32.0;

/// Accent palette cycled per worktree row (emerald, violet, amber, sky, rose).
pub const ACCENTS: [[f32; 4]; 5] = [
    [0.204, 0.827, 0.600, 1.0],
    [0.655, 0.545, 0.980, 1.0],
    [0.984, 0.749, 0.141, 1.0],
    [0.219, 0.741, 0.972, 1.0],
    [0.984, 0.443, 0.522, 1.0],
];

/// Accent color for worktree row `index`.
pub fn accent_for(index: usize) -> [f32; 4] {
    ACCENTS[index % ACCENTS.len()]
}
