mod types;

pub use types::{LogChunk, Mode, TreeNode, TreeRow, flatten_tree};
