mod edit;
mod log_book;
mod node_path;
mod walk;

pub use log_book::{Day, ImageRef, Item, LogBook, Project, Sub, SubSub};
pub use node_path::{Direction, NodePath};
pub use walk::NodeRef;
