//! Wire types shared by the analytics client, the desktop GUI and the fixture server.

pub mod error;
pub mod protocol;
