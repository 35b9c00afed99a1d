/// A tokenised, but not yet processed, protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage
{
    /// The source prefix, without its leading `:`
    pub prefix: Option<String>,
    /// The command
    pub command: String,
    /// The list of arguments
    pub args: Vec<String>,
    /// Whether the final argument was given in `:trailing` form
    pub trailing: bool,
}

impl ClientMessage
{
    /// Construct a message to be serialised
    pub fn new(command: impl ToString, args: Vec<String>) -> Self
    {
        Self {
            prefix: None,
            command: command.to_string(),
            args,
            trailing: false,
        }
    }

    /// Attach a source prefix
    pub fn with_prefix(mut self, prefix: impl ToString) -> Self
    {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Create a `ClientMessage` from a received line, with its terminator already removed
    pub fn parse(raw: &str) -> Option<Self>
    {
        let mut args = Vec::new();
        let mut trailing = false;
        let mut prefix = None;

        let mut raw = raw.trim_start();
        if raw.is_empty()
        {
            return None;
        }

        if let Some(rest) = raw.strip_prefix(':')
        {
            // A prefix with no command after it isn't a message
            let space_offset = rest.find(' ')?;
            prefix = Some(rest[..space_offset].to_string());
            raw = rest[space_offset..].trim_start();
            if raw.is_empty()
            {
                return None;
            }
        }

        let offset = match raw.find(' ') {
            Some(offset) => offset,
            None => {
                return Some(Self {
                    prefix,
                    command: raw.to_string(),
                    args,
                    trailing,
                });
            }
        };

        let command = &raw[0..offset];
        let mut rest = &raw[offset + 1..];

        loop {
            if let Some(arg) = rest.strip_prefix(':') {
                args.push(arg.to_string());
                trailing = true;
                break;
            }

            match rest.find(' ') {
                Some(offset) => {
                    let arg = &rest[0..offset];

                    if !arg.is_empty() {
                        args.push(arg.to_string());
                    }

                    rest = &rest[offset + 1..];
                }
                None => {
                    if !rest.is_empty() {
                        args.push(rest.to_string());
                    }
                    break;
                }
            }
        }

        Some(Self {
            prefix,
            command: command.to_string(),
            args,
            trailing,
        })
    }

    /// Render the message as a protocol line, without a terminator.
    ///
    /// The final argument is written in trailing form whenever it was
    /// received that way or could not be represented otherwise, so a parsed
    /// message serialises back to the same argument list.
    pub fn serialize(&self) -> String
    {
        let mut out = String::new();

        if let Some(prefix) = &self.prefix
        {
            out.push(':');
            out.push_str(prefix);
            out.push(' ');
        }
        out.push_str(&self.command);

        let last = self.args.len().saturating_sub(1);
        for (i, arg) in self.args.iter().enumerate()
        {
            out.push(' ');
            let needs_colon = arg.is_empty() || arg.contains(' ') || arg.starts_with(':');
            if i == last && (self.trailing || needs_colon)
            {
                out.push(':');
            }
            out.push_str(arg);
        }

        out
    }
}

impl std::fmt::Display for ClientMessage
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        f.write_str(&self.serialize())
    }
}
