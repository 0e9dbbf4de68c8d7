pub mod errors;
pub mod fetch_hook;
mod lifecycle;
pub mod polling_hook;
pub mod state;
pub mod transport;

pub use errors::{DEFAULT_ERROR_MESSAGE, FetchError};
pub use fetch_hook::{FetchHook, FetchView, Refetch};
pub use polling_hook::PollingHook;
pub use state::{FetchState, PollState, StateSurface};
pub use transport::{HttpTransport, Response, Transport};
