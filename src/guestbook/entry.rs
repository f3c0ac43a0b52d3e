//! Guestbook entries and their ABI representation.

use alloy::dyn_abi::DynSolValue;
use serde::{Deserialize, Serialize};

use crate::blockchain::{BlockchainError, BlockchainResult, InterfaceSchema};
use crate::guestbook::binding::GET_ENTRIES;

/// One signed guestbook entry, as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub message: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Arguments for `signGuestbook(string,string)`.
    pub fn to_call_args(&self) -> Vec<DynSolValue> {
        vec![
            DynSolValue::String(self.name.clone()),
            DynSolValue::String(self.message.clone()),
        ]
    }

    fn from_tuple(value: &DynSolValue, layout: &EntryLayout) -> BlockchainResult<Self> {
        let DynSolValue::Tuple(fields) = value else {
            return Err(BlockchainError::Abi(format!(
                "Expected entry tuple, got {:?}",
                value.as_type()
            )));
        };
        let string_at = |index: usize, field: &str| match fields.get(index) {
            Some(DynSolValue::String(s)) => Ok(s.as_str()),
            _ => Err(BlockchainError::Abi(format!(
                "Entry field `{}` is not a string at position {} of {}",
                field,
                index,
                fields.len()
            ))),
        };
        Ok(Self::new(
            string_at(layout.name, "name")?,
            string_at(layout.message, "message")?,
        ))
    }
}

/// Positions of `name` and `message` in the struct returned by `getEntries()`.
///
/// Deployed contracts may carry extra fields (sender, timestamp); only these
/// two are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLayout {
    name: usize,
    message: usize,
}

impl Default for EntryLayout {
    fn default() -> Self {
        Self { name: 0, message: 1 }
    }
}

impl EntryLayout {
    /// Locate the fields by component name. Unnamed components fall back to
    /// `(name, message, ..)` order.
    pub fn from_schema(schema: &InterfaceSchema) -> BlockchainResult<Self> {
        let function = schema
            .abi()
            .function(GET_ENTRIES)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| {
                BlockchainError::Abi(format!("function {} not in schema", GET_ENTRIES))
            })?;
        let components = match function.outputs.as_slice() {
            [output] => &output.components,
            outputs => {
                return Err(BlockchainError::Abi(format!(
                    "{} declares {} outputs, expected one",
                    GET_ENTRIES,
                    outputs.len()
                )))
            }
        };

        let position = |field: &str| components.iter().position(|c| c.name == field);
        match (position("name"), position("message")) {
            (Some(name), Some(message)) => Ok(Self { name, message }),
            _ if components.len() >= 2 && components.iter().all(|c| c.name.is_empty()) => {
                Ok(Self::default())
            }
            _ => Err(BlockchainError::Abi(format!(
                "{} entry has no `name` and `message` fields",
                GET_ENTRIES
            ))),
        }
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Decode the return values of `getEntries()`.
///
/// Order is preserved exactly as returned.
pub fn decode_entries(output: &[DynSolValue], layout: &EntryLayout) -> BlockchainResult<Vec<Entry>> {
    match output {
        [DynSolValue::Array(items)] | [DynSolValue::FixedArray(items)] => {
            items.iter().map(|item| Entry::from_tuple(item, layout)).collect()
        }
        _ => Err(BlockchainError::Abi(format!(
            "getEntries returned {} values, expected one array",
            output.len()
        ))),
    }
}

/// Encode entries the way `getEntries()` returns them.
pub fn encode_entries(entries: &[Entry]) -> Vec<DynSolValue> {
    let items = entries
        .iter()
        .map(|e| DynSolValue::Tuple(e.to_call_args()))
        .collect();
    vec![DynSolValue::Array(items)]
}
