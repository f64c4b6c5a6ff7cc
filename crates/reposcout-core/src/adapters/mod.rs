//! Bundled [`ArtifactFetcher`](crate::ArtifactFetcher) implementations.
//!
//! | Adapter | Repositories |
//! |---------|--------------|
//! | [`HttpFetcher`] | `http://` / `https://` Maven-layout repositories |
//! | [`FileFetcher`] | `file://` directories on local disk |
//! | [`MemoryFetcher`] | in-memory map, for offline runs and tests |
//! | [`SchemeFetcher`] | dispatches to the above by URL scheme |

mod file;
mod http;
mod memory;
mod scheme;

pub use file::FileFetcher;
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;
pub use scheme::SchemeFetcher;
