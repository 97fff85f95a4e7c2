//! Realtime chat: one WebSocket channel per open conversation, driven by a
//! background task with an explicit reconnect state machine.

pub mod channel;
pub mod connector;
pub mod log;
pub mod policy;
pub mod service;

pub use channel::{ChannelContext, ChannelEvent, ChannelState, ChatChannel, CloseReason};
pub use connector::{ChannelConnection, ChannelConnector, ChannelEndpoint};
pub use log::ConversationLog;
pub use policy::ReconnectPolicy;
pub use service::ChatService;
