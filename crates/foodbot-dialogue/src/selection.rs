//! Typed payload of inline product choices.
//!
//! Encoded as compact JSON, `{"t":"p","n":"apple","k":52}`, so it fits in
//! Telegram's 64-byte callback data. Decoding checks the tag, rejects
//! unknown fields, and never yields an empty product.

use foodbot_common::normalize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag identifying a product selection.
pub const SELECTION_TAG: &str = "p";

/// Largest payload the transport will carry.
pub const MAX_PAYLOAD_BYTES: usize = 64;

/// Why a selection payload was rejected.
#[derive(Error, Debug)]
pub enum SelectionError {
    /// Payload is longer than the transport allows
    #[error("Selection payload is {0} bytes, limit is {MAX_PAYLOAD_BYTES}")]
    TooLong(usize),

    /// Payload is not a selection message
    #[error("Malformed selection payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Payload carries another message type
    #[error("Unexpected selection tag: {0}")]
    UnexpectedTag(String),

    /// Product name is empty once normalized
    #[error("Selection has an empty product name")]
    EmptyProduct,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SelectionWire {
    t: String,
    n: String,
    k: u32,
}

/// A (product, kcal) pair chosen from an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Normalized product name.
    pub product: String,
    /// Energy value in kcal per 100 grams.
    pub kcal_per_100g: u32,
}

impl Selection {
    /// Creates a selection, normalizing the product name.
    pub fn new(product: &str, kcal_per_100g: u32) -> Self {
        Self {
            product: normalize(product),
            kcal_per_100g,
        }
    }

    /// Encodes the selection, or `None` if it would not fit in a payload.
    pub fn encode(&self) -> Option<String> {
        let wire = SelectionWire {
            t: SELECTION_TAG.to_string(),
            n: self.product.clone(),
            k: self.kcal_per_100g,
        };
        serde_json::to_string(&wire)
            .ok()
            .filter(|payload| payload.len() <= MAX_PAYLOAD_BYTES)
    }

    /// Decodes and validates a payload.
    pub fn decode(payload: &str) -> Result<Self, SelectionError> {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(SelectionError::TooLong(payload.len()));
        }

        let wire: SelectionWire = serde_json::from_str(payload)?;
        if wire.t != SELECTION_TAG {
            return Err(SelectionError::UnexpectedTag(wire.t));
        }

        let product = normalize(&wire.n);
        if product.is_empty() {
            return Err(SelectionError::EmptyProduct);
        }

        Ok(Self {
            product,
            kcal_per_100g: wire.k,
        })
    }
}
