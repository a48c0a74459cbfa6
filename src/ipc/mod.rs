//! IPC event source that accepts input events over a Unix socket.
//!
//! Anything that can observe the real keyboard and pointer (a platform
//! event tap helper, a test script, `socat`) can connect to the socket and
//! feed newline-delimited JSON events into the engine.

pub mod listener;
