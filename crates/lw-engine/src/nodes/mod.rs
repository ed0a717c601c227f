// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The nine built-in atomic node types. One module per node, each
//! registered from a single fixed list at startup.

pub mod code;
pub mod filter;
pub mod increment_counter;
pub mod llm_chat;
pub mod map;
pub mod merge;
pub mod read_state;
pub mod split;
pub mod write_state;

use crate::registry::{NodeRegistry, RegistryError};
use std::sync::Arc;

/// Registers every built-in atomic node type. Invoked from
/// `NodeRegistry::with_builtins()` and from `reload`.
pub fn register_all(registry: &NodeRegistry) -> Result<(), RegistryError> {
    registry.register(code::TYPE_NAME, true, Arc::new(|def| Arc::new(code::Code::from_def(def))))?;
    registry.register(
        llm_chat::TYPE_NAME,
        true,
        Arc::new(|def| Arc::new(llm_chat::LlmChat::from_def(def))),
    )?;
    registry.register(
        read_state::TYPE_NAME,
        true,
        Arc::new(|def| Arc::new(read_state::ReadState::from_def(def))),
    )?;
    registry.register(
        write_state::TYPE_NAME,
        true,
        Arc::new(|def| Arc::new(write_state::WriteState::from_def(def))),
    )?;
    registry.register(
        increment_counter::TYPE_NAME,
        true,
        Arc::new(|def| Arc::new(increment_counter::IncrementCounter::from_def(def))),
    )?;
    registry.register(map::TYPE_NAME, true, Arc::new(|def| Arc::new(map::Map::from_def(def))))?;
    registry.register(
        filter::TYPE_NAME,
        true,
        Arc::new(|def| Arc::new(filter::Filter::from_def(def))),
    )?;
    registry.register(merge::TYPE_NAME, true, Arc::new(|def| Arc::new(merge::Merge::from_def(def))))?;
    registry.register(split::TYPE_NAME, true, Arc::new(|def| Arc::new(split::Split::from_def(def))))?;
    Ok(())
}
