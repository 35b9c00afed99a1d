use super::*;
use crate::config::{ChannelPolicySettings, NetworkConfig};

use ChannelPermissionError::*;

/// Standard implementation of [`ChannelPolicyService`]
pub struct StandardChannelPolicy
{
    settings: ChannelPolicySettings,
    max_channels: usize,
}

impl StandardChannelPolicy
{
    pub fn new(config: &NetworkConfig) -> Self
    {
        Self {
            settings: config.channel_policy.clone(),
            max_channels: config.limits.max_channels,
        }
    }

    /// The rank required to change the given channel mode, or to act with
    /// the given half-op permission
    fn required_rank(&self, halfop_allowed: bool) -> MemberRank
    {
        if halfop_allowed { MemberRank::HalfOp } else { MemberRank::Op }
    }
}

fn err(channel: &Channel, e: ChannelPermissionError) -> PermissionResult
{
    Err(PermissionError::Channel(channel.name, e))
}

fn membership(user: &Client, channel: &Channel) -> Result<MembershipFlagSet, PermissionError>
{
    channel
        .membership(user.id)
        .ok_or(PermissionError::Channel(channel.name, NotOnChannel))
}

/// Check that a member holds at least `needed` rank
fn require_rank(channel: &Channel, flags: MembershipFlagSet, needed: MemberRank) -> PermissionResult
{
    let rank = flags.rank();
    if rank >= needed
    {
        Ok(())
    }
    else if rank >= MemberRank::HalfOp
    {
        err(channel, InsufficientRank)
    }
    else
    {
        err(channel, UserNotOp)
    }
}

/// Can a member of rank `source` act on a member of rank `target`? Half-ops
/// act only on members below half-op; everyone else on equal or lower ranks.
fn outranks(source: MemberRank, target: MemberRank) -> bool
{
    if source == MemberRank::HalfOp
    {
        target < MemberRank::HalfOp
    }
    else
    {
        source >= target
    }
}

fn is_banned(user: &Client, channel: &Channel) -> bool
{
    let mask = user.mask();
    channel.list_matches(letters::BAN, &mask) && !channel.list_matches(letters::EXCEPT, &mask)
}

impl ChannelPolicyService for StandardChannelPolicy
{
    fn can_join(&self, user: &Client, name: &ChannelName, channel: Option<&Channel>, key: Option<&str>) -> PermissionResult
    {
        if let Some(channel) = channel
        {
            if channel.members.contains_key(&user.id)
            {
                return Ok(());
            }
        }

        if user.channels.len() >= self.max_channels
        {
            return Err(PermissionError::Channel(*name, TooManyChannels));
        }

        let channel = match channel {
            Some(c) => c,
            None => return Ok(()),
        };
        let mask = user.mask();

        if is_banned(user, channel)
        {
            return err(channel, UserIsBanned);
        }

        if channel.has_mode(letters::INVITE_ONLY)
            && !channel.list_matches(letters::INVEX, &mask)
            && !channel.invites.contains(&user.id)
        {
            return err(channel, InviteOnlyChannel);
        }

        if let Some(chan_key) = channel.key()
        {
            if key != Some(chan_key)
            {
                return err(channel, BadChannelKey);
            }
        }

        if let Some(limit) = channel.limit()
        {
            if channel.members.len() >= limit
            {
                return err(channel, ChannelIsFull);
            }
        }

        if channel.has_mode(letters::OPER_ONLY) && !user.has_privilege(Privileges::OPER_CHANNELS)
        {
            return err(channel, OperOnlyChannel);
        }

        Ok(())
    }

    fn can_send(&self, user: &Client, channel: &Channel) -> PermissionResult
    {
        match channel.membership(user.id) {
            // Voice or higher overrides everything
            Some(flags) if flags.rank() >= MemberRank::Voice => return Ok(()),
            Some(_) => (),
            None if channel.has_mode(letters::NO_EXTERNAL) => return err(channel, CannotSendToChannel),
            None => (),
        }

        if channel.has_mode(letters::MODERATED) || is_banned(user, channel)
        {
            return err(channel, CannotSendToChannel);
        }

        Ok(())
    }

    fn can_set_topic(&self, user: &Client, channel: &Channel) -> PermissionResult
    {
        let flags = membership(user, channel)?;
        if channel.has_mode(letters::TOPIC_LOCK)
        {
            require_rank(channel, flags, self.required_rank(self.settings.halfop_can_set_topic))
        }
        else
        {
            Ok(())
        }
    }

    fn can_see_topic(&self, user: &Client, channel: &Channel) -> PermissionResult
    {
        if channel.is_secret() && channel.membership(user.id).is_none()
        {
            return err(channel, NotOnChannel);
        }
        Ok(())
    }

    fn can_see_names(&self, user: &Client, channel: &Channel) -> PermissionResult
    {
        self.can_see_topic(user, channel)
    }

    fn can_change_mode(&self, user: &Client, channel: &Channel, letter: char) -> PermissionResult
    {
        let flags = membership(user, channel)?;
        require_rank(channel, flags, self.required_rank(self.settings.halfop_modes.contains(letter)))
    }

    fn can_query_list(&self, user: &Client, channel: &Channel, letter: char) -> PermissionResult
    {
        if letter == letters::BAN
        {
            return Ok(());
        }
        let flags = membership(user, channel)?;
        require_rank(channel, flags, MemberRank::HalfOp)
    }

    fn can_grant_flag(&self, user: &Client, channel: &Channel, target: &Client, flag: MembershipFlagSet) -> PermissionResult
    {
        let source = membership(user, channel)?.rank();
        let target_rank = channel
            .membership(target.id)
            .ok_or(PermissionError::Channel(channel.name, UserNotOnChannel))?
            .rank();

        if source < MemberRank::HalfOp
        {
            return err(channel, UserNotOp);
        }
        if source == MemberRank::HalfOp && flag != MembershipFlagSet::VOICE
        {
            return err(channel, CannotGrantMode);
        }
        if source < MembershipFlagSet::rank_of(flag)
        {
            return err(channel, CannotGrantMode);
        }
        if user.id != target.id && !outranks(source, target_rank)
        {
            return err(channel, InsufficientRank);
        }
        Ok(())
    }

    fn can_remove_flag(&self, user: &Client, channel: &Channel, target: &Client, flag: MembershipFlagSet) -> PermissionResult
    {
        if user.id == target.id
        {
            membership(user, channel)?;
            return Ok(());
        }
        self.can_grant_flag(user, channel, target, flag)
    }

    fn can_kick(&self, user: &Client, channel: &Channel, target: &Client) -> PermissionResult
    {
        let source = membership(user, channel)?;
        let target_flags = channel
            .membership(target.id)
            .ok_or(PermissionError::Channel(channel.name, UserNotOnChannel))?;

        require_rank(channel, source, self.required_rank(self.settings.halfop_can_kick))?;

        if !outranks(source.rank(), target_flags.rank())
        {
            return err(channel, InsufficientRank);
        }
        Ok(())
    }

    fn can_invite(&self, user: &Client, channel: &Channel, target: &Client) -> PermissionResult
    {
        let flags = membership(user, channel)?;
        if channel.members.contains_key(&target.id)
        {
            return err(channel, UserOnChannel);
        }
        if channel.has_mode(letters::INVITE_ONLY)
        {
            require_rank(channel, flags, MemberRank::HalfOp)?;
        }
        Ok(())
    }
}
