pub mod browser;
pub mod download;
pub mod logging;
pub mod manager;
pub mod metadata;
pub mod navigation;
pub mod session;
pub mod sites;

pub use browser::{BrowserOptions, ChromiumSession};
pub use download::{download_document, DownloadOptions};
pub use manager::{AcquisitionConfig, AcquisitionManager, AcquisitionReport, RunReport};
pub use session::{BrowserSession, DownloadTrigger, SessionPage};

pub mod prelude {
    pub use super::browser::{BrowserOptions, ChromiumSession};
    pub use super::download::{download_document, DownloadOptions};
    pub use super::logging::{init_logging, Logger};
    pub use super::manager::{article_file_name, AcquisitionConfig, AcquisitionManager, AcquisitionReport, RunReport};
    pub use super::metadata::extract_metadata;
    pub use super::navigation::{NavigationConfig, ArticleLink, JournalIssue};
    pub use super::session::{load_cookies, BrowserSession, DownloadTrigger, SessionCookie, SessionPage};
    pub use super::sites::{default_site, find_site, get_sites};
    pub use muse_core::{Error, Result};
}
