mod driver;

pub use driver::{ChromiumDriver, LaunchOptions};
