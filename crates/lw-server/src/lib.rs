// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `loomworkd`: the HTTP server binding the session store, the IR
//! executor, and the job worker/outbox poller into the interactive
//! fiction workflow backend's Chat Pipeline and Flow API surfaces.

pub mod chat;
pub mod chat_api;
pub mod config;
pub mod debug_api;
pub mod error;
pub mod flow_api;
pub mod job;
pub mod poller;
pub mod routes;
pub mod state;

#[cfg(test)]
pub mod test_support;
