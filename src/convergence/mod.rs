//! Waits for a freshly initiated replica set to report a healthy topology.
//!
//! The poller issues `replSetGetStatus` through one client until every member
//! reports an accepted state. Transport hiccups, `ok: 0` replies and lagging
//! members all mean "not yet" and are retried after the backoff delay, with no
//! attempt budget. Only an unrecoverable error (closed connection, encoding
//! failure) or cancellation ends the wait early.

mod backoff;
mod poller;

pub use backoff::*;
pub use poller::*;

#[cfg(test)]
mod poller_test;
