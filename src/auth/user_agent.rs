//! User-Agent parsing for session metadata.

use crate::auth::models::UserAgentInfo;
use woothee::parser::Parser;

/// Turns a raw `User-Agent` header into browser/os/device fields.
pub trait UserAgentParser: Send + Sync {
    fn parse(&self, user_agent: Option<&str>) -> UserAgentInfo;
}

/// Parser backed by the woothee dataset.
pub struct WootheeParser {
    parser: Parser,
}

impl WootheeParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }
}

impl Default for WootheeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAgentParser for WootheeParser {
    fn parse(&self, user_agent: Option<&str>) -> UserAgentInfo {
        let Some(result) = user_agent.and_then(|ua| self.parser.parse(ua)) else {
            return UserAgentInfo::default();
        };

        UserAgentInfo {
            browser: known(result.name),
            os: known(result.os),
            // Desktop agents carry no device
            device: known(result.category).filter(|c| c != "pc"),
        }
    }
}

fn known(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(value.to_string())
    }
}
