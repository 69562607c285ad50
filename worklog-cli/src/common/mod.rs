mod editor_utils;

pub use editor_utils::{edit_text, resolve_editor};
