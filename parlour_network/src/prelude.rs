//! Collects commonly-used names for convenient import

pub use crate::{
    validated::*,
    id::*,
    modes::*,
    types::*,
    config,
    network::{
        state,
        Network,
    },
    network::errors::{
        LookupError,
        LookupResult,
        ValidationError,
    },
};
