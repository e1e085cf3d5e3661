//! Native (challenge/response) authentication

use bytes::Bytes;
use irods_core_interface::{GridError, IrodsAccount, Result};
use md5::{Digest, Md5};
use secrecy::ExposeSecret;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use super::api::{AUTH_REQUEST_AN, AUTH_RESPONSE_AN};
use super::connection::Connection;
use super::pack;

pub const CHALLENGE_LEN: usize = 64;
pub const MAX_PASSWORD_LEN: usize = 50;

/// Answer a challenge with the account password
///
/// MD5 over the challenge followed by the password NUL-padded to
/// [`MAX_PASSWORD_LEN`]. Zero bytes in the digest are sent as 1 because the
/// server treats the response as a C string.
pub fn challenge_response(challenge: &[u8], password: &str) -> Result<[u8; 16]> {
    if challenge.len() != CHALLENGE_LEN {
        return Err(GridError::Protocol(format!(
            "challenge is {} bytes, expected {}",
            challenge.len(),
            CHALLENGE_LEN
        )));
    }
    let password = password.as_bytes();
    if password.len() > MAX_PASSWORD_LEN {
        return Err(GridError::Protocol(format!(
            "password longer than {} bytes",
            MAX_PASSWORD_LEN
        )));
    }

    let mut padded = [0u8; MAX_PASSWORD_LEN];
    padded[..password.len()].copy_from_slice(password);

    let mut hasher = Md5::new();
    hasher.update(challenge);
    hasher.update(padded);
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hasher.finalize());

    for byte in digest.iter_mut() {
        if *byte == 0 {
            *byte = 1;
        }
    }
    Ok(digest)
}

/// Run the native authentication exchange on a started connection
pub async fn authenticate_native<S>(conn: &mut Connection<S>, account: &IrodsAccount) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let reply = conn.api_call(AUTH_REQUEST_AN, None, Bytes::new()).await?;
    let request = pack::parse(&reply.body)?;
    request.expect_root("authRequestOut_PI")?;
    let challenge = request.bin("challenge")?;

    let response = challenge_response(&challenge, account.password().expose_secret())?;
    let body = pack::auth_response(&response, account.user_name());
    conn.api_call(AUTH_RESPONSE_AN, Some(body), Bytes::new()).await?;

    debug!(user = account.user_name(), zone = account.zone(), "Native authentication accepted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_matches_manual_digest() {
        let challenge: Vec<u8> = (0..CHALLENGE_LEN as u8).collect();

        let mut input = challenge.clone();
        input.extend_from_slice(b"rods");
        input.resize(CHALLENGE_LEN + MAX_PASSWORD_LEN, 0);
        let mut expected = [0u8; 16];
        expected.copy_from_slice(&Md5::digest(&input));
        for b in expected.iter_mut() {
            if *b == 0 {
                *b = 1;
            }
        }

        assert_eq!(challenge_response(&challenge, "rods").unwrap(), expected);
    }

    #[test]
    fn test_response_never_contains_zero() {
        for seed in 0u8..32 {
            let challenge = [seed; CHALLENGE_LEN];
            let response = challenge_response(&challenge, "").unwrap();
            assert!(!response.contains(&0));
        }
    }

    #[test]
    fn test_response_depends_on_password() {
        let challenge = [7u8; CHALLENGE_LEN];
        assert_ne!(
            challenge_response(&challenge, "a").unwrap(),
            challenge_response(&challenge, "b").unwrap()
        );
    }

    #[test]
    fn test_bad_challenge_length() {
        assert!(challenge_response(&[0u8; 10], "rods").is_err());
    }

    #[test]
    fn test_password_too_long() {
        let long = "x".repeat(MAX_PASSWORD_LEN + 1);
        assert!(challenge_response(&[0u8; CHALLENGE_LEN], &long).is_err());
        let exact = "x".repeat(MAX_PASSWORD_LEN);
        assert!(challenge_response(&[0u8; CHALLENGE_LEN], &exact).is_ok());
    }
}
