//! I/O operations for downloading: the HTTP seam and the retrying driver.

mod downloader;
mod http;

pub use downloader::Downloader;
pub use http::{BoxStream, HttpClient};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
