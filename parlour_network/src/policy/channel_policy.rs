use super::*;

/// A `ChannelPolicyService` makes access decisions regarding channel permissions
pub trait ChannelPolicyService
{
    /// Determine whether the given user can join the named channel, which
    /// may not exist yet. A user who is already a member is always permitted.
    fn can_join(&self, user: &Client, name: &ChannelName, channel: Option<&Channel>, key: Option<&str>) -> PermissionResult;

    /// Determine whether the given user can send to the given channel
    fn can_send(&self, user: &Client, channel: &Channel) -> PermissionResult;

    /// Determine whether the given user can set the topic on the given channel
    fn can_set_topic(&self, user: &Client, channel: &Channel) -> PermissionResult;

    /// Determine whether the given user can read the topic of the given channel
    fn can_see_topic(&self, user: &Client, channel: &Channel) -> PermissionResult;

    /// Determine whether the given user can list the members of the given channel
    fn can_see_names(&self, user: &Client, channel: &Channel) -> PermissionResult;

    /// Determine whether the given user can change a channel-level mode letter
    fn can_change_mode(&self, user: &Client, channel: &Channel, letter: char) -> PermissionResult;

    /// Determine whether the given user can read the entries of a list mode
    fn can_query_list(&self, user: &Client, channel: &Channel, letter: char) -> PermissionResult;

    /// Determine whether the given user can grant a member flag to the target
    fn can_grant_flag(&self, user: &Client, channel: &Channel, target: &Client, flag: MembershipFlagSet) -> PermissionResult;

    /// Determine whether the given user can remove a member flag from the target
    fn can_remove_flag(&self, user: &Client, channel: &Channel, target: &Client, flag: MembershipFlagSet) -> PermissionResult;

    /// Determine whether the given user can kick the target from the channel
    fn can_kick(&self, user: &Client, channel: &Channel, target: &Client) -> PermissionResult;

    /// Determine whether the given user can invite the target to the channel
    fn can_invite(&self, user: &Client, channel: &Channel, target: &Client) -> PermissionResult;
}
