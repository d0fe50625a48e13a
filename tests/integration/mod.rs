//! Integration tests
//!
//! - **`realtime_test`** - presence and broadcast flows through `RealtimeHub`
//! - **`router_test`** - the assembled router without a database
//! - **`socket_test`** - the WebSocket route served on a real listener

mod realtime_test;
mod router_test;
mod socket_test;
