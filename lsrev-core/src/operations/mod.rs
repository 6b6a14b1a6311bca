//! Operations are what the command line front-end is built from.

mod list_tree_files;
pub use list_tree_files::{
    list_tree_files, FilesForTree, ListingTools, DEFAULT_TREE_ISH,
};
