//! Classification of inbound text.

/// An inbound message, classified.
///
/// Anything that is not one of the known commands is [`Command::Text`],
/// including quick-choice shortcuts such as `/52`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/limit`
    Limit,
    /// `/add`
    Add,
    /// `/stat`
    Stat,
    /// `/stat7`
    Stat7,
    /// `/cancel`
    Cancel,
    /// Free text, trimmed.
    Text(String),
}

impl Command {
    /// Classifies a message. A `@botname` suffix on a command is ignored.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Text(trimmed.to_string());
        };

        let name = rest.split('@').next().unwrap_or(rest);
        match name {
            "start" => Self::Start,
            "limit" => Self::Limit,
            "add" => Self::Add,
            "stat" => Self::Stat,
            "stat7" => Self::Stat7,
            "cancel" => Self::Cancel,
            _ => Self::Text(trimmed.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse(" /limit "), Command::Limit);
        assert_eq!(Command::parse("/add"), Command::Add);
        assert_eq!(Command::parse("/stat"), Command::Stat);
        assert_eq!(Command::parse("/stat7"), Command::Stat7);
        assert_eq!(Command::parse("/cancel@food_bot"), Command::Cancel);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(Command::parse("apple"), Command::Text("apple".to_string()));
        assert_eq!(Command::parse("/52"), Command::Text("/52".to_string()));
        assert_eq!(Command::parse("/stats"), Command::Text("/stats".to_string()));
        assert_eq!(Command::parse("stat"), Command::Text("stat".to_string()));
        assert_eq!(Command::parse("/start now"), Command::Text("/start now".to_string()));
    }
}
