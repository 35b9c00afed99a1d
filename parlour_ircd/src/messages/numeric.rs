use parlour_network::prelude::*;

define_numerics! {
    001(Welcome)    => { (network_name: &str, nick: &Nickname)  => ":Welcome to the {network_name} Internet Relay Chat network, {nick}" },
    002(YourHostIs) => { (server_name: &ServerName, version: &str)      => ":Your host is {server_name}, running version {version}" },
    003(Created)    => { (when: &str)                           => ":This server was created {when}" },
    004(MyInfo)     => { (server_name: &ServerName, version: &str, user_modes: &str, chan_modes: &str, chan_modes_with_a_parameter: &str)
                                                => "{server_name} {version} {user_modes} {chan_modes} {chan_modes_with_a_parameter}" },
    005(ISupport)   => { (data: &str)                           => "{data} :are supported by this server" },

    221(UserModeIs)             => { (modestring: &str)         => "{modestring}" },
    301(Away)                   => { (nick: &Nickname, reason: &str)    => "{nick} :{reason}" },
    305(Unaway)                 => { ()                         => ":You are no longer marked as being away" },
    306(NowAway)                => { ()                         => ":You have been marked as being away" },

    324(ChannelModeIs)          => { (chan: &ChannelName, modes: &str)
                                                                => "{chan} {modes}" },
    329(ChannelCreated)         => { (chan: &ChannelName, timestamp: i64)
                                                                => "{chan} {timestamp}" },
    331(NoTopic)                => { (chan: &ChannelName)       => "{chan} :No topic is set"},
    332(TopicIs)                => { (chan: &ChannelName, text: &str)
                                                                => "{chan} :{text}" },
    333(TopicSetBy)             => { (chan: &ChannelName, info: &str, timestamp: i64)
                                                                => "{chan} {info} {timestamp}" },

    341(Inviting)               => { (nick: &Nickname, chan: &ChannelName)
                                                                => "{nick} {chan}" },
    351(Version)                => { (version: &str, server_name: &ServerName, comments: &str)
                                                                => "{version} {server_name} :{comments}" },
    353(NamesReply)             => { (is_pub: char, chan: &ChannelName, content: &str)
                                                                => "{is_pub} {chan} :{content}" },
    366(EndOfNames)             => { (chname: &str)             => "{chname} :End of /NAMES list" },

    422(NoMotd)                 => { ()                         => ":MOTD File is missing"},
    375(MotdStart)              => { (server_name: &ServerName) => ":- {server_name} Message of the day - "},
    372(Motd)                   => { (line: &str)               => ":- {line}"},
    376(EndOfMotd)              => { ()                         => ":End of /MOTD command." },

    381(YoureOper)              => { ()                         => ":You are now an IRC operator" },

    401(NoSuchTarget)           => { (unknown: &str)            => "{unknown} :No such nick/channel" },
    403(NoSuchChannel)          => { (chname: &str)             => "{chname} :No such channel" },
    411(NoRecipient)            => { (command: &str)            => ":No recipient given ({command})" },
    412(NoTextToSend)           => { ()                         => ":No text to send" },
    417(InputTooLong)           => { ()                         => ":Input line was too long" },
    421(UnknownCommand)         => { (command: &str)            => "{command} :Unknown command" },
    431(NoNicknameGiven)        => { ()                         => ":No nickname given" },
    432(ErroneousNickname)      => { (nick: &str)               => "{nick} :Erroneous nickname" },
    433(NicknameInUse)          => { (nick: &Nickname)          => "{nick} :Nickname is already in use." },
    441(UserNotOnChannel)       => { (user: &Nickname, chan: &ChannelName)
                                                                => "{user} {chan} :They aren't on that channel" },
    443(UserOnChannel)          => { (user: &Nickname, chan: &ChannelName)
                                                                => "{user} {chan} :is already on channel" },
    451(NotRegistered)          => { ()                         => ":You have not registered" },
    461(NotEnoughParameters)    => { (command: &str)            => "{command} :Not enough parameters" },
    462(AlreadyRegistered)      => { ()                         => ":You may not reregister" },
    464(PasswordMismatch)       => { ()                         => ":Password incorrect" },
    465(YoureBanned)            => { (msg: &str)                => ":You are banned from this server: {msg}" },
    468(InvalidUsername)        => { ()                         => ":Your username is not valid" },
    479(InvalidChannelName)     => { (name: &str)               => "{name} :Illegal channel name" },
    491(NoOperConf)             => { ()                         => ":No O-lines for your host" },
    502(CantChangeOtherUserMode) => { ()                        => ":Can't change mode for other users" },

    367(BanList)            => { (chan: &ChannelName, entry: &str, setter: &str, ts: i64)
                                                                => "{chan} {entry} {setter} {ts}" },
    368(EndOfBanList)       => { (chan: &ChannelName)           => "{chan} :End of channel ban list" },
    346(InviteList)         => { (chan: &ChannelName, entry: &str, setter: &str, ts: i64)
                                                                => "{chan} {entry} {setter} {ts}" },
    347(EndOfInviteList)    => { (chan: &ChannelName)           => "{chan} :End of channel invite list" },
    348(ExceptList)         => { (chan: &ChannelName, entry: &str, setter: &str, ts: i64)
                                                                => "{chan} {entry} {setter} {ts}" },
    349(EndOfExceptList)    => { (chan: &ChannelName)           => "{chan} :End of channel exception list" },
}

/// Build the reply for a failed permission check, from its stable code and text
pub fn permission_denied(code: u16, context: &str, text: &str) -> super::UntargetedNumeric
{
    let code = format!("{:03}", code);
    if context.is_empty()
    {
        super::UntargetedNumeric::new(code, format!(":{}", text))
    }
    else
    {
        super::UntargetedNumeric::new(code, format!("{} :{}", context, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::UnknownTarget;
    use std::str::FromStr;

    #[test]
    fn numerics_format() {
        let server = ServerName::from_str("irc.example").unwrap();
        let nick = Nickname::from_str("alice").unwrap();

        let msg = Welcome::new("Parlour", &nick).format_for(&server, &nick);
        assert_eq!(msg.as_str(), ":irc.example 001 alice :Welcome to the Parlour Internet Relay Chat network, alice");

        let msg = NotRegistered::new().format_for(&server, &UnknownTarget);
        assert_eq!(msg.as_str(), ":irc.example 451 * :You have not registered");

        let chan = ChannelName::from_str("#test").unwrap();
        let msg = NamesReply::new('=', &chan, "@alice bob").format_for(&server, &nick);
        assert_eq!(msg.as_str(), ":irc.example 353 alice = #test :@alice bob");
    }

    #[test]
    fn permission_codes() {
        let server = ServerName::from_str("irc.example").unwrap();
        let nick = Nickname::from_str("alice").unwrap();

        let msg = permission_denied(474, "#test", "Cannot join channel (+b) - you are banned").format_for(&server, &nick);
        assert_eq!(msg.as_str(), ":irc.example 474 alice #test :Cannot join channel (+b) - you are banned");

        let msg = permission_denied(481, "", "Permission Denied").format_for(&server, &nick);
        assert_eq!(msg.as_str(), ":irc.example 481 alice :Permission Denied");
    }
}
