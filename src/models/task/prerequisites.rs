//! Prerequisite flags for a task.
//!
//! The store keeps protective equipment as a comma-joined label list
//! (`"herramientas,casco"`) and the two coordination checks as 0/1 integers.
//! Forms edit the same information as booleans. Conversion between the two
//! is lossless for the fixed label vocabulary.

use serde::{Deserialize, Deserializer, Serializer};

use super::Task;

pub const LABEL_TOOLS: &str = "herramientas";
pub const LABEL_SHOES: &str = "zapatos";
pub const LABEL_VEST: &str = "chaleco";
pub const LABEL_HELMET: &str = "casco";

/// Protective equipment a worker must bring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PpeItems {
    pub tools: bool,
    pub shoes: bool,
    pub vest: bool,
    pub helmet: bool,
}

impl PpeItems {
    /// Parse the wire label list. Unknown labels and blanks are ignored.
    pub fn parse(labels: &str) -> Self {
        let mut items = Self::default();
        for label in labels.split(',').map(str::trim).filter(|l| !l.is_empty()) {
            match label {
                LABEL_TOOLS => items.tools = true,
                LABEL_SHOES => items.shoes = true,
                LABEL_VEST => items.vest = true,
                LABEL_HELMET => items.helmet = true,
                other => log::debug!("Ignoring unknown prerequisite label {:?}", other),
            }
        }
        items
    }

    /// Render as the wire label list, in fixed vocabulary order.
    pub fn to_labels(&self) -> String {
        let flags = [
            (self.tools, LABEL_TOOLS),
            (self.shoes, LABEL_SHOES),
            (self.vest, LABEL_VEST),
            (self.helmet, LABEL_HELMET),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, label)| *label)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_empty(&self) -> bool {
        !(self.tools || self.shoes || self.vest || self.helmet)
    }
}

/// Form-side view of every prerequisite field of a task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrerequisiteFlags {
    pub ppe: PpeItems,
    pub client_response: bool,
    pub coord_st: bool,
    pub notes: String,
}

impl PrerequisiteFlags {
    pub fn from_task(task: &Task) -> Self {
        Self {
            ppe: PpeItems::parse(&task.prereq_ppe),
            client_response: task.prereq_client_response,
            coord_st: task.prereq_coord_st,
            notes: task.prereq_notes.clone(),
        }
    }

    /// True when every check is satisfied (notes are informational).
    pub fn all_checked(&self) -> bool {
        let ppe = self.ppe;
        ppe.tools && ppe.shoes && ppe.vest && ppe.helmet && self.client_response && self.coord_st
    }
}

/// Serde adapter for the store's 0/1 integer flags. Also accepts booleans.
pub(crate) mod int_flag {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(i64),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Bool(value)) => value,
            Some(Raw::Int(value)) => value != 0,
            None => false,
        })
    }
}
