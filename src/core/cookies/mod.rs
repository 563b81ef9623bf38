// Cookie handling module
// In-memory enumerable jar plus the on-disk formats yt-dlp understands.

pub mod formats;
pub mod jar;

pub use formats::{export_json, load_netscape, save_netscape};
pub use jar::{CookieJar, CookieRecord};
