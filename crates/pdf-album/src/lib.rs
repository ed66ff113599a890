//! Story-to-PDF album assembly.
//!
//! Turns an ordered list of images, text snippets and PDF pages kept in a
//! remote folder into one or more PDF albums, each under a configurable
//! size limit. The four operations a presentation layer needs are
//! re-exported here:
//!
//! - [`discover_content`]: list a folder and reconcile it with its saved order
//! - [`persist_order`]: write the user-chosen sequence back to the folder
//! - [`assemble_albums`]: render and bin-pack units into PDF buffers
//! - [`split_pdf_unit`]: explode a multi-page PDF into single-page units

pub mod album;
mod cache;
pub mod constants;
mod discovery;
mod order;
pub mod pages;
pub mod remote;
pub mod render;
mod settings;
mod split;
mod story;
mod types;

pub use album::{assemble_albums, assemble_albums_cached};
pub use cache::{PageCache, RenderParams};
pub use discovery::{DiscoverOptions, classify, discover_content, discover_content_with};
pub use order::{
    ORDER_RECORD_NAME, OrderRecord, SortKey, load_order, persist_order, reconcile,
};
pub use remote::{LocalFolderStore, MemoryStore, RemoteError, RemoteStore};
pub use render::{RenderedUnit, TextStyle, render_unit};
pub use settings::AlbumSettings;
pub use split::{split_page_name, split_pdf_unit, unique_split_names};
pub use story::{
    create_text_unit, finish_quick_sort, insert_unit, paste_units, remove_units,
    replace_with_split, unsorted_units,
};
pub use types::*;
