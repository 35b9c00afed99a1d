use super::*;

use UserPermissionError::*;

/// Makes access decisions regarding user modes
pub trait UserPolicyService
{
    /// Determine whether the user may change one of their own user modes
    fn can_change_umode(&self, user: &Client, letter: char, adding: bool) -> PermissionResult;
}

/// Standard implementation of [`UserPolicyService`]
pub struct StandardUserPolicy;

impl StandardUserPolicy
{
    pub fn new() -> Self
    {
        Self
    }
}

impl UserPolicyService for StandardUserPolicy
{
    fn can_change_umode(&self, _user: &Client, letter: char, adding: bool) -> PermissionResult
    {
        // Operator status is only ever granted by OPER, but may be dropped freely
        if letter == letters::OPER && adding
        {
            Err(PermissionError::User(ReadOnlyUmode))
        }
        else
        {
            Ok(())
        }
    }
}
