//! Common protocol types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use gk_crypto::CodeChallengeMethod;

/// Supported OAuth 2.0 grant types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization code grant (RFC 6749 Section 4.1).
    AuthorizationCode,

    /// Refresh token grant (RFC 6749 Section 6).
    RefreshToken,
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        };
        write!(f, "{s}")
    }
}

impl FromStr for GrantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Self::AuthorizationCode),
            "refresh_token" => Ok(Self::RefreshToken),
            _ => Err(format!("unknown grant type: {s}")),
        }
    }
}

/// Supported OAuth 2.0 response types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Authorization code response.
    Code,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code")
    }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            _ => Err(format!("unknown response type: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_type_round_trip() {
        assert_eq!(
            "authorization_code".parse::<GrantType>().unwrap(),
            GrantType::AuthorizationCode
        );
        assert_eq!(GrantType::RefreshToken.to_string(), "refresh_token");
        assert!("password".parse::<GrantType>().is_err());
    }

    #[test]
    fn response_type_parsing() {
        assert_eq!("code".parse::<ResponseType>().unwrap(), ResponseType::Code);
        assert!("token".parse::<ResponseType>().is_err());
    }
}
