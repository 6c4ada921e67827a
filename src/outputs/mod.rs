//! Output generation for the published digest.
//!
//! # Submodules
//!
//! - [`html`]: Renders the whole archive into the static `index.html` page
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── index.html     # rendered archive, rewritten every successful run
//! ├── archive.json   # every published week, newest first
//! └── state.json     # rotation record
//! ```

pub mod html;
