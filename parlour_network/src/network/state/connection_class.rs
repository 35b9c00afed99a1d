use crate::config::ConnectionClassConfig;
use crate::types::Pattern;

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A named policy bundle applied to connections, with a live count of the
/// connections currently attached to it.
#[derive(Debug)]
pub struct ConnectionClass
{
    pub name: String,
    pub ping_frequency: Duration,
    pub max_links: usize,
    pub sendq: usize,
    pub recvq: usize,
    pub restricted: bool,
    allow: Vec<Pattern>,
    links: AtomicUsize,
}

impl ConnectionClass
{
    pub fn new(config: &ConnectionClassConfig) -> Self
    {
        Self {
            name: config.name.clone(),
            ping_frequency: config.ping_frequency,
            max_links: config.max_links,
            sendq: config.sendq,
            recvq: config.recvq,
            restricted: config.restricted,
            allow: config.allow.clone(),
            links: AtomicUsize::new(0),
        }
    }

    /// Does this class accept connections from the given address?
    pub fn admits(&self, addr: &IpAddr) -> bool
    {
        let addr = addr.to_string();
        self.allow.iter().any(|p| p.matches(&addr))
    }

    /// Attach one more connection, unless doing so would exceed `max_links`.
    pub fn try_attach(&self) -> bool
    {
        self.links
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_links).then(|| n + 1)
            })
            .is_ok()
    }

    pub fn detach(&self)
    {
        if self
            .links
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_err()
        {
            tracing::error!(class = %self.name, "Detached from a class with no links");
        }
    }

    pub fn link_count(&self) -> usize
    {
        self.links.load(Ordering::Acquire)
    }
}

/// All configured connection classes, in configuration order
#[derive(Debug)]
pub struct ConnectionClassSet
{
    classes: Vec<Arc<ConnectionClass>>,
    by_name: HashMap<String, Arc<ConnectionClass>>,
    default: Arc<ConnectionClass>,
}

impl ConnectionClassSet
{
    /// Build the class set. If `default_class` names no configured class, the
    /// first configured class is used; if there are none, a permissive
    /// class named after `default_class` is created.
    pub fn new(configs: &[ConnectionClassConfig], default_class: &str) -> Self
    {
        let classes: Vec<_> = configs.iter().map(|c| Arc::new(ConnectionClass::new(c))).collect();
        let by_name: HashMap<_, _> = classes.iter().map(|c| (c.name.clone(), Arc::clone(c))).collect();

        let default = by_name
            .get(default_class)
            .or_else(|| classes.first())
            .cloned()
            .unwrap_or_else(|| {
                Arc::new(ConnectionClass::new(&ConnectionClassConfig {
                    name: default_class.to_string(),
                    ping_frequency: Duration::from_secs(120),
                    max_links: usize::MAX,
                    sendq: 256 * 1024,
                    recvq: 8 * 1024,
                    restricted: false,
                    allow: vec![Pattern::new("*".to_string())],
                }))
            });

        Self { classes, by_name, default }
    }

    pub fn get(&self, name: &str) -> Option<Arc<ConnectionClass>>
    {
        self.by_name.get(name).cloned()
    }

    /// The first class, in configuration order, that admits the address
    pub fn find_for_address(&self, addr: &IpAddr) -> Option<Arc<ConnectionClass>>
    {
        self.classes.iter().find(|c| c.admits(addr)).cloned()
    }

    pub fn default_class(&self) -> Arc<ConnectionClass>
    {
        Arc::clone(&self.default)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ConnectionClass>>
    {
        self.classes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, max_links: usize, allow: &[&str]) -> ConnectionClassConfig {
        ConnectionClassConfig {
            name: name.to_string(),
            ping_frequency: Duration::from_secs(60),
            max_links,
            sendq: 1024,
            recvq: 512,
            restricted: false,
            allow: allow.iter().map(|s| Pattern::new(s.to_string())).collect(),
        }
    }

    #[test]
    fn attach_respects_max_links() {
        let c = ConnectionClass::new(&class("c", 2, &["*"]));
        assert!(c.try_attach());
        assert!(c.try_attach());
        assert!(!c.try_attach());
        assert_eq!(c.link_count(), 2);
        c.detach();
        assert_eq!(c.link_count(), 1);
        assert!(c.try_attach());
    }

    #[test]
    fn detach_never_underflows() {
        let c = ConnectionClass::new(&class("c", 2, &["*"]));
        c.detach();
        assert_eq!(c.link_count(), 0);
    }

    #[test]
    fn address_selection_in_order() {
        let set = ConnectionClassSet::new(
            &[class("local", 10, &["127.*"]), class("users", 10, &["*"])],
            "users",
        );
        let local: IpAddr = "127.0.0.1".parse().unwrap();
        let remote: IpAddr = "192.0.2.1".parse().unwrap();
        assert_eq!(set.find_for_address(&local).unwrap().name, "local");
        assert_eq!(set.find_for_address(&remote).unwrap().name, "users");
        assert_eq!(set.default_class().name, "users");
    }
}
