//! Output generation for the feed.
//!
//! # Submodules
//!
//! - [`json`]: Renders a feed or a page as pretty JSON and writes `feed.json`
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── feed.json
//! ```

pub mod json;
