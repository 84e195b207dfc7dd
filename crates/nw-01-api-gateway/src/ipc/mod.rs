//! Bus integration: the reply routers and the correlation dispatcher.

pub mod dispatcher;
pub mod router;

pub use dispatcher::{CorrelationDispatcher, ExchangeRequest};
pub use router::{spawn_reply_routers, ReplyRouter};
