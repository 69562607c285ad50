//! The inline tag language: `((red))` and `{{highlight}}`.
//!
//! Text is parsed into [`Segment`]s once and rendered to HTML previews,
//! WordprocessingML runs, or (in the CLI) terminal styles.

mod docx;
mod html;
mod numbering;
mod segment;
mod wrap;

pub use docx::{Indent, RunStyle, paragraph_xml};
pub use html::{escape_text, render_html};
pub use numbering::{Depth, to_abc, to_roman};
pub use segment::{Segment, TagStyle, parse, parse_line};
pub use wrap::wrap_selection;
