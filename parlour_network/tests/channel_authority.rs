use parlour_network::config::NetworkConfig;
use parlour_network::network::MemberModeError;
use parlour_network::policy::*;
use parlour_network::prelude::*;

use pretty_assertions::assert_eq;
use std::str::FromStr;
use std::sync::Arc;

struct Fixture {
    net: Network,
    policy: StandardChannelPolicy,
    chan: ChannelId,
    name: ChannelName,
    founder: ClientId,
}

fn add_client(net: &mut Network, nick: &str, host: &str) -> ClientId {
    net.add_client(state::NewClient {
        nick: Nickname::from_str(nick).unwrap(),
        user: Username::from_str("user").unwrap(),
        host: Hostname::from_str(host).unwrap(),
        realname: "Test".to_string(),
        ip: "192.0.2.1".parse().unwrap(),
        class: "users".to_string(),
    })
    .unwrap()
}

fn fixture_with(config: NetworkConfig) -> Fixture {
    let mut net = Network::new(Arc::new(ModeCatalogBuilder::standard().build()), config.limits.clone());
    let founder = add_client(&mut net, "founder", "op.example");
    let name = ChannelName::from_str("#test").unwrap();
    let chan = net.join_channel(founder, &name).unwrap().channel;
    Fixture { net, policy: StandardChannelPolicy::new(&config), chan, name, founder }
}

fn fixture() -> Fixture {
    fixture_with(NetworkConfig::default())
}

impl Fixture {
    fn mode(&mut self, tokens: &[&str]) -> Vec<ModeChange> {
        let parsed = parse_mode_tokens(self.net.catalog(), ModeTarget::Channel, tokens, 6);
        let setter = self.net.client(self.founder).unwrap().mask();
        self.net.apply_channel_modes(self.chan, &parsed.changes, &setter).unwrap().applied
    }

    fn can_join(&self, client: ClientId, key: Option<&str>) -> PermissionResult {
        let client = self.net.client(client).unwrap();
        let channel = self.net.channel(self.chan).ok();
        self.policy.can_join(client, &self.name, channel, key)
    }

    fn join(&mut self, client: ClientId) {
        self.can_join(client, None).unwrap();
        self.net.join_channel(client, &self.name).unwrap();
    }

    fn channel(&self) -> &state::Channel {
        self.net.channel(self.chan).unwrap()
    }
}

fn denial(result: PermissionResult) -> ChannelPermissionError {
    match result {
        Err(PermissionError::Channel(_, e)) => e,
        other => panic!("expected a channel denial, got {:?}", other),
    }
}

#[test]
fn ban_exception_overrides_ban() {
    let mut f = fixture();
    let evil = add_client(&mut f.net, "evil", "evil.com");
    f.mode(&["+b", "*!*@evil.com"]);
    assert_eq!(denial(f.can_join(evil, None)), ChannelPermissionError::UserIsBanned);
    assert_eq!(denial(f.can_join(evil, None)).code(), 474);

    f.mode(&["+e", "evil!*@*"]);
    assert!(f.can_join(evil, None).is_ok());
}

#[test]
fn ban_adds_exactly_one_entry() {
    let mut f = fixture();
    let applied = f.mode(&["+b", "*!*@evil.com"]);
    assert_eq!(applied.len(), 1);
    assert_eq!(f.channel().list(letters::BAN).len(), 1);
    assert_eq!(f.channel().list(letters::BAN)[0].pattern.as_str(), "*!*@evil.com");

    // A duplicate is not a change
    assert!(f.mode(&["+b", "*!*@EVIL.com"]).is_empty());
    assert_eq!(f.channel().list(letters::BAN).len(), 1);
}

#[test]
fn one_time_invite_is_consumed() {
    let mut f = fixture();
    let guest = add_client(&mut f.net, "guest", "guest.example");
    f.mode(&["+i"]);
    assert_eq!(denial(f.can_join(guest, None)), ChannelPermissionError::InviteOnlyChannel);

    let founder = f.net.client(f.founder).unwrap();
    let target = f.net.client(guest).unwrap();
    f.policy.can_invite(founder, f.channel(), target).unwrap();
    f.net.add_invite(f.chan, guest).unwrap();

    f.join(guest);
    f.net.part_channel(guest, f.chan).unwrap();

    assert_eq!(denial(f.can_join(guest, None)), ChannelPermissionError::InviteOnlyChannel);
}

#[test]
fn invite_exception_overrides_invite_only() {
    let mut f = fixture();
    let guest = add_client(&mut f.net, "guest", "friend.example");
    f.mode(&["+iI", "*!*@friend.example"]);
    assert!(f.can_join(guest, None).is_ok());
}

#[test]
fn existing_member_short_circuits() {
    let mut f = fixture();
    let member = add_client(&mut f.net, "member", "evil.com");
    f.join(member);
    f.mode(&["+bik", "*!*@evil.com", "sekrit"]);
    assert!(f.can_join(member, None).is_ok());
}

#[test]
fn key_limit_and_oper_only() {
    let mut f = fixture();
    let a = add_client(&mut f.net, "alpha", "a.example");
    let b = add_client(&mut f.net, "beta", "b.example");

    f.mode(&["+k", "sekrit"]);
    assert_eq!(denial(f.can_join(a, Some("wrong"))), ChannelPermissionError::BadChannelKey);
    assert!(f.can_join(a, Some("sekrit")).is_ok());
    f.mode(&["-k", "sekrit"]);

    f.mode(&["+l", "2"]);
    f.join(a);
    assert_eq!(denial(f.can_join(b, None)), ChannelPermissionError::ChannelIsFull);
    f.mode(&["-l"]);

    f.mode(&["+O"]);
    assert_eq!(denial(f.can_join(b, None)), ChannelPermissionError::OperOnlyChannel);
    f.net.grant_oper(b, "admin", Privileges::standard_oper()).unwrap();
    assert!(f.can_join(b, None).is_ok());
}

#[test]
fn too_many_channels() {
    let mut config = NetworkConfig::default();
    config.limits.max_channels = 1;
    let f = fixture_with(config);
    let founder = f.net.client(f.founder).unwrap();
    let other = ChannelName::from_str("#other").unwrap();
    let result = f.policy.can_join(founder, &other, None, None);
    assert_eq!(denial(result), ChannelPermissionError::TooManyChannels);
}

#[test]
fn op_and_voice_in_one_pass() {
    let mut f = fixture();
    let alice = add_client(&mut f.net, "alice", "a.example");
    f.join(alice);
    f.mode(&["+v", "alice"]);

    let applied = f.mode(&["+o-v", "alice", "alice"]);
    assert_eq!(format_mode_changes(&applied), "+o-v alice alice");
    assert_eq!(f.channel().membership(alice), Some(MembershipFlagSet::MEMBER | MembershipFlagSet::OP));
}

#[test]
fn unknown_letters_do_not_abort() {
    let mut f = fixture();
    let applied = f.mode(&["+nXt"]);
    assert_eq!(format_mode_changes(&applied), "+nt");
}

#[test]
fn list_capacity_drops_silently() {
    let mut config = NetworkConfig::default();
    config.limits.max_list_entries = 2;
    let mut f = fixture_with(config);
    let applied = f.mode(&["+bbb", "a!*@*", "b!*@*", "c!*@*"]);
    assert_eq!(applied.len(), 2);
    assert_eq!(f.channel().list(letters::BAN).len(), 2);
}

#[test]
fn member_mode_for_absent_nick() {
    let mut f = fixture();
    let outsider = add_client(&mut f.net, "outsider", "o.example");
    let parsed = parse_mode_tokens(f.net.catalog(), ModeTarget::Channel, &["+oo", "outsider", "nobody"], 6);
    let setter = f.net.client(f.founder).unwrap().mask();
    let result = f.net.apply_channel_modes(f.chan, &parsed.changes, &setter).unwrap();

    assert!(result.applied.is_empty());
    assert_eq!(
        result.errors,
        vec![
            MemberModeError::NotOnChannel(f.net.client(outsider).unwrap().nick),
            MemberModeError::NoSuchNick("nobody".to_string()),
        ]
    );
}

#[test]
fn halfop_authority() {
    let mut f = fixture();
    let half = add_client(&mut f.net, "half", "h.example");
    let half2 = add_client(&mut f.net, "half2", "h.example");
    let plain = add_client(&mut f.net, "plain", "p.example");
    f.join(half);
    f.join(half2);
    f.join(plain);
    f.mode(&["+hh", "half", "half2"]);

    let net = &f.net;
    let chan = net.channel(f.chan).unwrap();
    let (half, half2, plain, founder) = (
        net.client(half).unwrap(),
        net.client(half2).unwrap(),
        net.client(plain).unwrap(),
        net.client(f.founder).unwrap(),
    );

    assert!(f.policy.can_kick(half, chan, plain).is_ok());
    assert_eq!(denial(f.policy.can_kick(half, chan, half2)), ChannelPermissionError::InsufficientRank);
    assert_eq!(denial(f.policy.can_kick(half, chan, founder)), ChannelPermissionError::InsufficientRank);
    assert_eq!(denial(f.policy.can_kick(plain, chan, half)), ChannelPermissionError::UserNotOp);
    assert!(f.policy.can_kick(founder, chan, half).is_ok());

    assert!(f.policy.can_grant_flag(half, chan, plain, MembershipFlagSet::VOICE).is_ok());
    assert_eq!(
        denial(f.policy.can_grant_flag(half, chan, plain, MembershipFlagSet::OP)),
        ChannelPermissionError::CannotGrantMode
    );
    assert_eq!(
        denial(f.policy.can_grant_flag(founder, chan, plain, MembershipFlagSet::OWNER)),
        ChannelPermissionError::CannotGrantMode
    );
    assert!(f.policy.can_remove_flag(half, chan, half, MembershipFlagSet::HALFOP).is_ok());

    assert!(f.policy.can_change_mode(half, chan, 'm').is_ok());
    assert_eq!(denial(f.policy.can_change_mode(half, chan, 'k')), ChannelPermissionError::InsufficientRank);
    assert_eq!(denial(f.policy.can_change_mode(plain, chan, 'm')), ChannelPermissionError::UserNotOp);
}

#[test]
fn speaking_rules() {
    let mut f = fixture();
    let member = add_client(&mut f.net, "member", "m.example");
    let outsider = add_client(&mut f.net, "outsider", "o.example");
    f.join(member);

    {
        let chan = f.channel();
        assert!(f.policy.can_send(f.net.client(outsider).unwrap(), chan).is_ok());
    }

    f.mode(&["+nm"]);
    let chan = f.channel();
    let member_c = f.net.client(member).unwrap();
    assert_eq!(denial(f.policy.can_send(f.net.client(outsider).unwrap(), chan)).code(), 404);
    assert_eq!(denial(f.policy.can_send(member_c, chan)), ChannelPermissionError::CannotSendToChannel);
    assert!(f.policy.can_send(f.net.client(f.founder).unwrap(), chan).is_ok());

    f.mode(&["-m+v", "member"]);
    assert!(f.policy.can_send(f.net.client(member).unwrap(), f.channel()).is_ok());
}

#[test]
fn secret_channel_hides_names_and_topic() {
    let mut f = fixture();
    let outsider = add_client(&mut f.net, "outsider", "o.example");
    f.mode(&["+s"]);
    let chan = f.channel();
    let outsider = f.net.client(outsider).unwrap();
    assert_eq!(denial(f.policy.can_see_names(outsider, chan)), ChannelPermissionError::NotOnChannel);
    assert_eq!(denial(f.policy.can_see_topic(outsider, chan)).code(), 442);
}

#[test]
fn topic_lock() {
    let mut f = fixture();
    let member = add_client(&mut f.net, "member", "m.example");
    f.join(member);
    assert!(f.policy.can_set_topic(f.net.client(member).unwrap(), f.channel()).is_ok());
    f.mode(&["+t"]);
    assert_eq!(
        denial(f.policy.can_set_topic(f.net.client(member).unwrap(), f.channel())),
        ChannelPermissionError::UserNotOp
    );
}
