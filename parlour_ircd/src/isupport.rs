use parlour_network::prelude::*;
use parlour_network::config::ServerLimits;

use once_cell::sync::OnceCell;

/// Maximum length of the tokens carried by one `005` line
const MAX_LEN: usize = 300;

pub enum ISupportParam
{
    Simple,
    String(String),
    Int(usize),
}

pub struct ISupportEntry
{
    pub name: String,
    pub param: ISupportParam,
}

impl ISupportEntry
{
    pub fn simple(name: &str) -> Self
    {
        Self { name: name.to_string(), param: ISupportParam::Simple }
    }

    pub fn string(name: &str, param: &str) -> Self
    {
        Self { name: name.to_string(), param: ISupportParam::String(param.to_string()) }
    }

    pub fn int(name: &str, param: usize) -> Self
    {
        Self { name: name.to_string(), param: ISupportParam::Int(param) }
    }

    fn format(&self) -> String
    {
        match &self.param {
            ISupportParam::Simple => self.name.clone(),
            ISupportParam::String(param) => format!("{}={}", self.name, param),
            ISupportParam::Int(param) => format!("{}={}", self.name, param),
        }
    }
}

/// Assembles the feature advertisement sent in `005` replies
pub struct ISupportBuilder
{
    entries: Vec<ISupportEntry>,
    cache: OnceCell<Vec<String>>,
}

impl ISupportBuilder
{
    pub fn new() -> Self
    {
        Self {
            entries: Vec::new(),
            cache: OnceCell::new(),
        }
    }

    /// The standard advertisement for a server with the given modes and limits
    pub fn standard(network_name: &str, catalog: &ModeCatalog, limits: &ServerLimits) -> Self
    {
        let mut ret = Self::new();
        let list_modes: String = catalog.list_modes().collect();

        ret.add(ISupportEntry::simple("EXCEPTS"));
        ret.add(ISupportEntry::simple("INVEX"));
        ret.add(ISupportEntry::string("NETWORK", network_name));
        ret.add(ISupportEntry::string("CASEMAPPING", "ascii"));
        ret.add(ISupportEntry::string("CHANTYPES", "#&"));
        ret.add(ISupportEntry::string("CHANMODES", &catalog.chanmodes_token()));
        ret.add(ISupportEntry::string("PREFIX", &catalog.prefix_token()));
        ret.add(ISupportEntry::int("MODES", limits.max_modes));
        ret.add(ISupportEntry::string("CHANLIMIT", &format!("#&:{}", limits.max_channels)));
        ret.add(ISupportEntry::string("MAXLIST", &format!("{}:{}", list_modes, limits.max_list_entries)));
        ret.add(ISupportEntry::int("NICKLEN", Nickname::LENGTH));
        ret.add(ISupportEntry::int("USERLEN", Username::LENGTH));
        ret.add(ISupportEntry::int("CHANNELLEN", ChannelName::LENGTH));
        ret.add(ISupportEntry::int("TOPICLEN", limits.topic_len));
        ret.add(ISupportEntry::int("KICKLEN", limits.kick_len));
        ret.add(ISupportEntry::int("AWAYLEN", limits.away_len));

        ret
    }

    pub fn add(&mut self, entry: ISupportEntry)
    {
        self.entries.push(entry);
        self.cache = OnceCell::new();
    }

    /// The advertisement, split into lines of at most [`MAX_LEN`] characters
    pub fn data(&self) -> &[String]
    {
        self.cache.get_or_init(|| self.build())
    }

    fn build(&self) -> Vec<String>
    {
        let mut result = Vec::new();
        let mut current = String::new();

        for entry in &self.entries
        {
            let s = entry.format();

            if !current.is_empty() && current.len() + s.len() + 1 > MAX_LEN
            {
                result.push(std::mem::take(&mut current));
            }
            else if !current.is_empty()
            {
                current.push(' ');
            }
            current.push_str(&s);
        }

        if !current.is_empty()
        {
            result.push(current);
        }
        result
    }
}

impl Default for ISupportBuilder
{
    fn default() -> Self
    {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tokens() {
        let catalog = ModeCatalog::standard();
        let builder = ISupportBuilder::standard("Parlour", &catalog, &ServerLimits::default());
        let joined = builder.data().join(" ");

        assert!(joined.contains("CHANMODES=Ibe,k,l,Oimnpst"));
        assert!(joined.contains("PREFIX=(qaohv)~&@%+"));
        assert!(joined.contains("MAXLIST=Ibe:64"));
        assert!(joined.contains("CHANLIMIT=#&:20"));
        assert!(joined.contains("NICKLEN=30"));
    }

    #[test]
    fn splits_long_advertisements() {
        let mut builder = ISupportBuilder::new();
        for i in 0..60 {
            builder.add(ISupportEntry::int(&format!("TOKEN{}", i), i));
        }

        let lines = builder.data();
        assert!(lines.len() > 1);
        for line in lines {
            assert!(line.len() <= MAX_LEN);
            assert!(!line.starts_with(' '));
        }

        let tokens: usize = lines.iter().map(|l| l.split(' ').count()).sum();
        assert_eq!(tokens, 60);
    }
}
