use parlour_network::prelude::*;

define_messages! {
    Nick    => { (source: &Mask, newnick: &Nickname)                => ":{source} NICK :{newnick}" },
    Join    => { (source: &Mask, chan: &ChannelName)                => ":{source} JOIN {chan}" },
    Kick    => { (source: &Mask, target: &Nickname, chan: &ChannelName, msg: &str)
                                                                    => ":{source} KICK {chan} {target} :{msg}" },
    Part    => { (source: &Mask, chan: &ChannelName, msg: &str)     => ":{source} PART {chan} :{msg}" },
    Invite  => { (source: &Mask, target: &Nickname, chan: &ChannelName)
                                                                    => ":{source} INVITE {target} :{chan}" },
    Quit    => { (source: &Mask, message: &str)                     => ":{source} QUIT :{message}" },
    Topic   => { (source: &Mask, chan: &ChannelName, text: &str)    => ":{source} TOPIC {chan} :{text}" },

    Mode    => { (source: &str, target: &str, changes: &str)        => ":{source} MODE {target} {changes}" },

    Notice  => { (source: &str, target: &str, message: &str)        => ":{source} NOTICE {target} :{message}" },
    Privmsg => { (source: &Mask, target: &str, message: &str)       => ":{source} PRIVMSG {target} :{message}" },

    Ping    => { (cookie: &str)                                     => "PING :{cookie}" },
    Pong    => { (source: &ServerName, cookie: &str)                => ":{source} PONG {source} :{cookie}" },

    Error   => { (text: &str)                                       => "ERROR :{text}" },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn named_messages() {
        let source = Mask::new("alice", "al", "host.example");
        let chan = ChannelName::from_str("#test").unwrap();
        let target = Nickname::from_str("bob").unwrap();

        assert_eq!(Join::new(&source, &chan).as_str(), ":alice!al@host.example JOIN #test");
        assert_eq!(
            Kick::new(&source, &target, &chan, "bye").as_str(),
            ":alice!al@host.example KICK #test bob :bye"
        );
        assert_eq!(Error::new("Closing Link").as_str(), "ERROR :Closing Link");

        let server = ServerName::from_str("irc.example").unwrap();
        assert_eq!(Pong::new(&server, "x").as_str(), ":irc.example PONG irc.example :x");
    }
}
