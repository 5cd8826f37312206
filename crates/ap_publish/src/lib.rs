pub mod browser;
pub mod compose;
pub mod debug;
pub mod error;
pub mod profile;
pub mod scripts;
pub mod wait;

pub use browser::{BrowserPublisher, ClickStrategy};
pub use compose::{build_request, compose_body, select_tags};
pub use error::{PublishError, Result};
pub use profile::{SiteProfile, Timings};
pub use wait::{wait_until, WaitTimeout};

pub mod prelude {
    pub use crate::browser::BrowserPublisher;
    pub use crate::compose::build_request;
    pub use crate::profile::SiteProfile;
}
