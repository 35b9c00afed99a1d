use super::*;
use crate::config::OperConfig;

use UserPermissionError::*;

use pwhash::unix;

/// Makes authentication and authorisation decisions for operators
pub trait OperPolicyService
{
    /// Check a name and password against one configured operator block. The
    /// client's `user@host` must also match the block's mask.
    fn authenticate(&self, oper_config: &OperConfig, user: &Client, name: &str, password: &str) -> bool;

    /// Require that the user is opered and holds the given privilege
    fn require_privilege(&self, user: &Client, privilege: Privileges) -> PermissionResult;

    /// The privileges conferred by a successful authentication against the given block
    fn privileges_for(&self, oper_config: &OperConfig) -> Privileges;
}

/// Standard implementation of [`OperPolicyService`]
pub struct StandardOperPolicy;

impl StandardOperPolicy
{
    pub fn new() -> Self
    {
        Self
    }
}

impl OperPolicyService for StandardOperPolicy
{
    fn authenticate(&self, oper_config: &OperConfig, user: &Client, name: &str, password: &str) -> bool
    {
        name == oper_config.name
            && oper_config.mask.matches(&user.mask().user_host())
            && unix::verify(password, &oper_config.hash)
    }

    fn require_privilege(&self, user: &Client, privilege: Privileges) -> PermissionResult
    {
        if !user.is_oper()
        {
            Err(PermissionError::User(NotOper))
        }
        else if !user.has_privilege(privilege)
        {
            Err(PermissionError::User(NoPrivilege))
        }
        else
        {
            Ok(())
        }
    }

    fn privileges_for(&self, oper_config: &OperConfig) -> Privileges
    {
        if oper_config.super_oper { Privileges::super_oper() } else { Privileges::standard_oper() }
    }
}
