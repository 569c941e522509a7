//! Command line parser

use super::DELIMITER;
use crate::codec::{decode_token, has_trailing_data};
use crate::error::CommandError;
use crate::record::{AuctionId, Token};

/// A parsed protocol command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `ADD:<id>:<hex64>`
    Add { id: AuctionId, token: Token },
    /// `ITEM:<id>:<hex64>`
    Item { id: AuctionId, token: Token },
    /// `BUY:<id>:<hex64>`
    Buy { id: AuctionId, token: Token },
    /// `ERASE:<id>`
    Erase { id: AuctionId },
    /// `STATUS:<id>`
    Status { id: AuctionId },
    /// `LIST`
    List,
    /// `RESET`
    Reset,
}

/// Lossy input that parsed successfully but deserves a log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseNotes {
    /// Id was longer than a slot holds and was truncated
    pub id_truncated: bool,
    /// Characters after the 64th hex digit were ignored
    pub token_trailing: bool,
}

/// Argument shape a keyword expects
#[derive(Clone, Copy)]
enum Shape {
    Bare,
    Id,
    IdToken,
}

const KEYWORDS: [(&str, Shape); 7] = [
    ("ADD", Shape::IdToken),
    ("ITEM", Shape::IdToken),
    ("BUY", Shape::IdToken),
    ("ERASE", Shape::Id),
    ("STATUS", Shape::Id),
    ("LIST", Shape::Bare),
    ("RESET", Shape::Bare),
];

impl Command {
    /// Parse one protocol line
    ///
    /// # Errors
    ///
    /// - [`CommandError::UnknownCommand`] if no keyword prefixes the line
    /// - [`CommandError::Syntax`] if a keyword is missing its delimiter or fields
    /// - [`CommandError::Format`] if the token field is not valid hex
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        Self::parse_with_notes(line).map(|(command, _)| command)
    }

    /// Parse one protocol line, also reporting lossy-but-accepted input
    pub fn parse_with_notes(line: &str) -> Result<(Self, ParseNotes), CommandError> {
        let line = line.trim();
        let (keyword, shape) = KEYWORDS
            .iter()
            .copied()
            .find(|(kw, _)| line.starts_with(kw))
            .ok_or(CommandError::UnknownCommand)?;

        let rest = &line[keyword.len()..];
        let mut notes = ParseNotes::default();

        if let Shape::Bare = shape {
            if !rest.is_empty() {
                return Err(CommandError::Syntax);
            }
            let command = match keyword {
                "LIST" => Command::List,
                _ => Command::Reset,
            };
            return Ok((command, notes));
        }

        let args = rest.strip_prefix(DELIMITER).ok_or(CommandError::Syntax)?;

        if let Shape::Id = shape {
            let id = parse_id(args, &mut notes)?;
            let command = match keyword {
                "ERASE" => Command::Erase { id },
                _ => Command::Status { id },
            };
            return Ok((command, notes));
        }

        let (raw_id, raw_token) = args.split_once(DELIMITER).ok_or(CommandError::Syntax)?;
        let id = parse_id(raw_id, &mut notes)?;
        let token = decode_token(raw_token)?;
        notes.token_trailing = has_trailing_data(raw_token);

        let command = match keyword {
            "ADD" => Command::Add { id, token },
            "ITEM" => Command::Item { id, token },
            _ => Command::Buy { id, token },
        };
        Ok((command, notes))
    }

    /// Protocol keyword of this command
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Add { .. } => "ADD",
            Command::Item { .. } => "ITEM",
            Command::Buy { .. } => "BUY",
            Command::Erase { .. } => "ERASE",
            Command::Status { .. } => "STATUS",
            Command::List => "LIST",
            Command::Reset => "RESET",
        }
    }
}

fn parse_id(raw: &str, notes: &mut ParseNotes) -> Result<AuctionId, CommandError> {
    notes.id_truncated = AuctionId::exceeds_max_len(raw);
    Ok(AuctionId::new(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HexError;

    const KEY_A: &str = "00112233445566778899AABBCCDDEEFF00112233445566778899AABBCCDDEEFF";

    fn line(parts: &[&str]) -> heapless::String<128> {
        let mut s = heapless::String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                s.push(':').unwrap();
            }
            s.push_str(part).unwrap();
        }
        s
    }

    #[test]
    fn test_parse_token_commands() {
        let add = Command::parse(&line(&["ADD", "lot1", KEY_A])).unwrap();
        let item = Command::parse(&line(&["ITEM", "lot1", KEY_A])).unwrap();
        let buy = Command::parse(&line(&["BUY", "lot1", KEY_A])).unwrap();

        let id = AuctionId::new("lot1").unwrap();
        let token = decode_token(KEY_A).unwrap();
        assert_eq!(add, Command::Add { id: id.clone(), token });
        assert_eq!(item, Command::Item { id: id.clone(), token });
        assert_eq!(buy, Command::Buy { id, token });
    }

    #[test]
    fn test_parse_id_commands() {
        let id = AuctionId::new("lot9").unwrap();
        assert_eq!(
            Command::parse("ERASE:lot9"),
            Ok(Command::Erase { id: id.clone() })
        );
        assert_eq!(Command::parse("STATUS:lot9"), Ok(Command::Status { id }));
    }

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!(Command::parse("LIST"), Ok(Command::List));
        assert_eq!(Command::parse("RESET"), Ok(Command::Reset));
        assert_eq!(Command::parse("  LIST \r"), Ok(Command::List));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(Command::parse("SELL:lot1"), Err(CommandError::UnknownCommand));
        assert_eq!(Command::parse("add:lot1:00"), Err(CommandError::UnknownCommand));
        assert_eq!(Command::parse(""), Err(CommandError::UnknownCommand));
    }

    #[test]
    fn test_missing_delimiter_is_syntax_error() {
        assert_eq!(Command::parse("ADD"), Err(CommandError::Syntax));
        assert_eq!(Command::parse("ADDlot1"), Err(CommandError::Syntax));
        assert_eq!(Command::parse("ADD:lot1"), Err(CommandError::Syntax));
        assert_eq!(Command::parse("ERASE"), Err(CommandError::Syntax));
        assert_eq!(Command::parse("LIST:all"), Err(CommandError::Syntax));
        assert_eq!(Command::parse("RESETNOW"), Err(CommandError::Syntax));
    }

    #[test]
    fn test_bad_id_is_syntax_error() {
        assert_eq!(
            Command::parse(&line(&["ADD", "", KEY_A])),
            Err(CommandError::Syntax)
        );
        assert_eq!(Command::parse("ERASE:"), Err(CommandError::Syntax));
        assert_eq!(Command::parse("ERASE:lot1:extra"), Err(CommandError::Syntax));
    }

    #[test]
    fn test_bad_token_is_format_error() {
        assert_eq!(
            Command::parse("ADD:lot1:ABCD"),
            Err(CommandError::Format(HexError::TooShort { len: 4 }))
        );

        let mut bad = heapless::String::<64>::new();
        bad.push_str(&KEY_A[..63]).unwrap();
        bad.push('x').unwrap();
        assert_eq!(
            Command::parse(&line(&["BUY", "lot1", &bad])),
            Err(CommandError::Format(HexError::InvalidCharacter { index: 63 }))
        );
    }

    #[test]
    fn test_parse_notes() {
        let (_, notes) = Command::parse_with_notes(&line(&["ADD", "lot1", KEY_A])).unwrap();
        assert_eq!(notes, ParseNotes::default());

        let (command, notes) =
            Command::parse_with_notes(&line(&["ITEM", "a-very-long-auction-id", KEY_A, "99"]))
                .unwrap();
        assert!(notes.id_truncated);
        assert!(notes.token_trailing);
        match command {
            Command::Item { id, .. } => assert_eq!(id.as_str(), "a-very-long"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_keyword() {
        assert_eq!(Command::parse("LIST").unwrap().keyword(), "LIST");
        assert_eq!(Command::parse("ERASE:x").unwrap().keyword(), "ERASE");
    }
}
