//! PKCE challenge verification (RFC 7636).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CryptoError, CryptoResult};
use crate::hash::{constant_time_eq, sha256};

/// PKCE code challenge methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeChallengeMethod {
    /// Plain comparison of verifier and challenge.
    #[serde(rename = "plain")]
    Plain,

    /// SHA-256 of the verifier, base64url encoded.
    #[serde(rename = "S256")]
    S256,
}

impl fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CodeChallengeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "S256" => Ok(Self::S256),
            _ => Err(format!("unknown code challenge method: {s}")),
        }
    }
}

/// Verifies a PKCE `code_verifier` against the stored `code_challenge`.
///
/// Both methods compare in constant time: `plain` compares the raw strings,
/// `S256` compares the base64url-encoded SHA-256 of the verifier.
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` if the verifier violates the RFC 7636
/// format (43-128 characters from the unreserved set), and
/// `CryptoError::VerificationFailed` on mismatch.
pub fn verify_pkce(
    code_verifier: &str,
    code_challenge: &str,
    method: CodeChallengeMethod,
) -> CryptoResult<()> {
    if code_verifier.len() < 43 || code_verifier.len() > 128 {
        return Err(CryptoError::InvalidInput(
            "code_verifier must be between 43 and 128 characters".to_string(),
        ));
    }

    if !code_verifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~')
    {
        return Err(CryptoError::InvalidInput(
            "code_verifier contains invalid characters".to_string(),
        ));
    }

    let matches = match method {
        CodeChallengeMethod::Plain => {
            constant_time_eq(code_verifier.as_bytes(), code_challenge.as_bytes())
        }
        CodeChallengeMethod::S256 => {
            let computed = URL_SAFE_NO_PAD.encode(sha256(code_verifier.as_bytes()));
            constant_time_eq(computed.as_bytes(), code_challenge.as_bytes())
        }
    };

    if matches {
        Ok(())
    } else {
        Err(CryptoError::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s256_verification() {
        // Test vectors from RFC 7636
        let code_verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let code_challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

        assert!(verify_pkce(code_verifier, code_challenge, CodeChallengeMethod::S256).is_ok());
    }

    #[test]
    fn plain_verification() {
        let code_verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

        assert!(verify_pkce(code_verifier, code_verifier, CodeChallengeMethod::Plain).is_ok());
    }

    #[test]
    fn verification_fails_on_mismatch() {
        let code_verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let wrong_challenge = "wrong-challenge-XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";

        assert!(matches!(
            verify_pkce(code_verifier, wrong_challenge, CodeChallengeMethod::S256),
            Err(CryptoError::VerificationFailed)
        ));
    }

    #[test]
    fn verifier_too_short() {
        assert!(matches!(
            verify_pkce("tooshort", "tooshort", CodeChallengeMethod::Plain),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn verifier_with_invalid_characters() {
        let verifier = "a".repeat(42) + "!";
        assert!(matches!(
            verify_pkce(&verifier, &verifier, CodeChallengeMethod::Plain),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    #[test]
    fn method_round_trips_through_strings() {
        assert_eq!(
            "S256".parse::<CodeChallengeMethod>().unwrap(),
            CodeChallengeMethod::S256
        );
        assert_eq!(CodeChallengeMethod::Plain.to_string(), "plain");
        assert!("s256".parse::<CodeChallengeMethod>().is_err());
    }
}
