use parlour_network::config::ServerLimits;
use parlour_network::prelude::*;

use std::str::FromStr;
use std::sync::Arc;

fn network() -> Network {
    let limits = ServerLimits { max_channels: 100, ..Default::default() };
    Network::new(Arc::new(ModeCatalogBuilder::standard().build()), limits)
}

fn add_client(net: &mut Network, nick: &str) -> ClientId {
    net.add_client(state::NewClient {
        nick: Nickname::from_str(nick).unwrap(),
        user: Username::from_str("user").unwrap(),
        host: Hostname::from_str("host.example").unwrap(),
        realname: "Test".to_string(),
        ip: "192.0.2.1".parse().unwrap(),
        class: "users".to_string(),
    })
    .unwrap()
}

fn channel_name(i: usize) -> ChannelName {
    ChannelName::from_str(&format!("#chan{}", i)).unwrap()
}

/// Small deterministic generator so failures are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn assert_symmetric(net: &Network) {
    let violations = net.verify_membership_symmetry();
    assert!(violations.is_empty(), "{:?}", violations);

    for client in net.clients() {
        for chan in &client.channels {
            assert!(net.channel(*chan).unwrap().members.contains_key(&client.id));
        }
    }
    for channel in net.channels() {
        assert!(!channel.members.is_empty());
        for member in channel.members.keys() {
            assert!(net.client(*member).unwrap().channels.contains(&channel.id));
        }
    }
}

#[test]
fn random_operations_preserve_symmetry() {
    const CLIENTS: usize = 8;
    const CHANNELS: usize = 5;

    let mut net = network();
    let mut rng = Lcg(42);
    let mut clients: Vec<Option<ClientId>> =
        (0..CLIENTS).map(|i| Some(add_client(&mut net, &format!("user{}", i)))).collect();

    for step in 0..2000 {
        let slot = rng.next(CLIENTS);
        let name = channel_name(rng.next(CHANNELS));

        let Some(client) = clients[slot] else {
            clients[slot] = Some(add_client(&mut net, &format!("new{}x{}", slot, step)));
            continue;
        };

        match rng.next(10) {
            0..=4 => {
                net.join_channel(client, &name).unwrap();
            }
            5..=6 => {
                if let Ok(chan) = net.channel_by_name(&name) {
                    let id = chan.id;
                    let _ = net.part_channel(client, id);
                }
            }
            7..=8 => {
                if let Ok(chan) = net.channel_by_name(&name) {
                    let id = chan.id;
                    if let Some(target) = chan.members.keys().next().copied() {
                        net.kick_member(id, target).unwrap();
                    }
                }
            }
            _ => {
                net.remove_client(client).unwrap();
                clients[slot] = None;
            }
        }

        assert_symmetric(&net);
    }
}

#[test]
fn empty_channel_is_destroyed() {
    let mut net = network();
    let a = add_client(&mut net, "alice");
    let b = add_client(&mut net, "bob");
    let name = ChannelName::from_str("#test").unwrap();

    let joined = net.join_channel(a, &name).unwrap();
    assert!(joined.created);
    assert_eq!(joined.flags, MembershipFlagSet::MEMBER | MembershipFlagSet::OP);

    let second = net.join_channel(b, &name).unwrap();
    assert!(!second.created);
    assert_eq!(second.flags, MembershipFlagSet::MEMBER);

    assert!(!net.part_channel(a, joined.channel).unwrap());
    assert!(net.channel_by_name(&name).is_ok());

    let removed = net.remove_client(b).unwrap();
    assert_eq!(removed.destroyed_channels, vec![name]);
    assert!(net.channel_by_name(&name).is_err());
    assert!(net.channel(joined.channel).is_err());
    assert_symmetric(&net);
}

#[test]
fn removed_clients_leave_no_invitations() {
    let mut net = network();
    let a = add_client(&mut net, "alice");
    let name = ChannelName::from_str("#test").unwrap();
    let chan = net.join_channel(a, &name).unwrap().channel;

    for i in 0..1000 {
        let invitee = add_client(&mut net, &format!("guest{}", i));
        net.add_invite(chan, invitee).unwrap();
        net.remove_client(invitee).unwrap();
    }

    assert!(net.channel(chan).unwrap().invites.is_empty());
    assert_symmetric(&net);
}

#[test]
fn joining_consumes_the_invitation() {
    let mut net = network();
    let a = add_client(&mut net, "alice");
    let b = add_client(&mut net, "bob");
    let name = ChannelName::from_str("#test").unwrap();
    let chan = net.join_channel(a, &name).unwrap().channel;

    net.add_invite(chan, b).unwrap();
    assert!(net.channel(chan).unwrap().invites.contains(&b));

    net.join_channel(b, &name).unwrap();
    assert!(net.channel(chan).unwrap().invites.is_empty());
}

#[test]
fn parting_a_channel_not_joined_fails() {
    let mut net = network();
    let a = add_client(&mut net, "alice");
    let b = add_client(&mut net, "bob");
    let name = ChannelName::from_str("#test").unwrap();
    let chan = net.join_channel(a, &name).unwrap().channel;

    assert!(net.part_channel(b, chan).is_err());
    assert_symmetric(&net);
}

#[test]
fn rejoining_changes_nothing() {
    let mut net = network();
    let a = add_client(&mut net, "alice");
    let name = ChannelName::from_str("#test").unwrap();
    let first = net.join_channel(a, &name).unwrap();
    let again = net.join_channel(a, &name).unwrap();

    assert_eq!(first.channel, again.channel);
    assert!(!again.created);
    assert_eq!(again.flags, first.flags);
    assert_eq!(net.channel(first.channel).unwrap().members.len(), 1);
}

#[test]
fn nick_changes_keep_index() {
    let mut net = network();
    let a = add_client(&mut net, "alice");
    let b = add_client(&mut net, "bob");

    let old = net.change_nick(a, Nickname::from_str("Alicia").unwrap()).unwrap();
    assert_eq!(old.nick, "alice");
    assert!(net.client_by_nick(&Nickname::from_str("alice").unwrap()).is_err());
    assert_eq!(net.client_by_nick(&Nickname::from_str("ALICIA").unwrap()).unwrap().id, a);

    assert!(matches!(
        net.change_nick(b, Nickname::from_str("alicia").unwrap()),
        Err(ValidationError::NickInUse(_))
    ));
    net.change_nick(a, Nickname::from_str("ALICIA").unwrap()).unwrap();
    assert!(net.verify_membership_symmetry().is_empty());
}
