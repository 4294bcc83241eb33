pub mod clock;
pub mod config;
pub mod driver;

pub use clock::{Clock, Interrupter, TokioClock};
pub use config::{BrowserConfig, Config, FinderConfig, RetryConfig, Viewport};
pub use driver::WebDriverTrait;
