//! Permission decisions for user actions.
//!
//! Each regulated action has one check method returning a
//! [`PermissionResult`]. Failures carry the reply code and text that should
//! be sent back to the user; none of the checks mutate state.

use crate::prelude::*;
use crate::config::NetworkConfig;
use state::{Channel, Client};

mod error;
pub use error::*;

mod channel_policy;
pub use channel_policy::*;

mod standard_channel_policy;
pub use standard_channel_policy::*;

mod user_policy;
pub use user_policy::*;

mod oper_policy;
pub use oper_policy::*;

mod registration_policy;
pub use registration_policy::*;

/// Convenience definition of the `Result` type for permission checks.
pub type PermissionResult = Result<(), PermissionError>;

/// All the policy services in one place
pub struct PolicyService
{
    pub channel: Box<dyn ChannelPolicyService + Send + Sync>,
    pub user: Box<dyn UserPolicyService + Send + Sync>,
    pub oper: Box<dyn OperPolicyService + Send + Sync>,
    pub registration: Box<dyn RegistrationPolicyService + Send + Sync>,
}

impl PolicyService
{
    /// Construct the standard policy implementations from configuration
    pub fn standard(config: &NetworkConfig) -> Self
    {
        Self {
            channel: Box::new(StandardChannelPolicy::new(config)),
            user: Box::new(StandardUserPolicy::new()),
            oper: Box::new(StandardOperPolicy::new()),
            registration: Box::new(StandardRegistrationPolicy::new(config.bans.clone())),
        }
    }
}
