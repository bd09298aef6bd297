use sha1::{Digest, Sha1};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::{
    binlog_error::BinlogError, constants::OK_PACKET_STATUS, network::packet_channel::PacketChannel,
};

use super::handshake::{Greeting, HandshakeResponse};

pub const MYSQL_NATIVE_PASSWORD: &str = "mysql_native_password";
pub const CACHING_SHA2_PASSWORD: &str = "caching_sha2_password";

const AUTH_SWITCH_REQUEST: u8 = 0xFE;
const AUTH_MORE_DATA: u8 = 0x01;
const FAST_AUTH_SUCCESS: u8 = 0x03;
const PERFORM_FULL_AUTHENTICATION: u8 = 0x04;

// caching_sha2_password may need a few round trips
const MAX_AUTH_ROUNDS: usize = 4;

pub struct Authenticator<'a> {
    pub user: &'a str,
    pub password: &'a str,
    pub database: Option<&'a str>,
}

impl<'a> Authenticator<'a> {
    /// Answers the greeting and drives the exchange until the server
    /// accepts or rejects the login.
    pub async fn authenticate(
        &self,
        channel: &mut PacketChannel,
        greeting: &Greeting,
    ) -> Result<(), BinlogError> {
        let mut plugin = if greeting.auth_plugin_name.is_empty() {
            MYSQL_NATIVE_PASSWORD.to_string()
        } else {
            greeting.auth_plugin_name.clone()
        };
        let response = HandshakeResponse {
            user: self.user.to_string(),
            auth_response: scramble(&plugin, self.password, &greeting.scramble),
            database: self.database.map(|d| d.to_string()),
            auth_plugin_name: plugin.clone(),
        };
        channel.write_packet(&response.to_bytes()?).await?;

        for _ in 0..MAX_AUTH_ROUNDS {
            let payload = channel.read_response().await?;
            match payload.first().copied() {
                Some(OK_PACKET_STATUS) => {
                    debug!("authenticated as {} with {}", self.user, plugin);
                    return Ok(());
                }

                Some(AUTH_SWITCH_REQUEST) => {
                    let (name, data) = parse_auth_switch(&payload[1..]);
                    debug!("auth switch to {}", name);
                    plugin = name;
                    channel
                        .write_packet(&scramble(&plugin, self.password, &data))
                        .await?;
                }

                Some(AUTH_MORE_DATA) => match payload.get(1).copied() {
                    Some(FAST_AUTH_SUCCESS) => debug!("caching_sha2_password fast auth"),
                    Some(PERFORM_FULL_AUTHENTICATION) => {
                        return Err(BinlogError::ConnectError(format!(
                            "{} full authentication requires a secure connection",
                            CACHING_SHA2_PASSWORD
                        )))
                    }
                    other => {
                        return Err(BinlogError::ConnectError(format!(
                            "unexpected auth data {:?}",
                            other
                        )))
                    }
                },

                other => {
                    return Err(BinlogError::ConnectError(format!(
                        "unexpected auth response {:?}",
                        other
                    )))
                }
            }
        }

        Err(BinlogError::ConnectError(
            "authentication did not complete".into(),
        ))
    }
}

fn parse_auth_switch(data: &[u8]) -> (String, Vec<u8>) {
    let end = data.iter().position(|b| *b == 0).unwrap_or(data.len());
    let name = String::from_utf8_lossy(&data[..end]).to_string();
    let mut scramble = data.get(end + 1..).unwrap_or_default().to_vec();
    if scramble.last() == Some(&0) {
        scramble.pop();
    }
    (name, scramble)
}

pub fn scramble(plugin: &str, password: &str, salt: &[u8]) -> Vec<u8> {
    match plugin {
        MYSQL_NATIVE_PASSWORD => scramble_native_password(password, salt),
        CACHING_SHA2_PASSWORD => scramble_caching_sha2(password, salt),
        other => {
            warn!("unknown auth plugin {}, using {}", other, MYSQL_NATIVE_PASSWORD);
            scramble_native_password(password, salt)
        }
    }
}

/// `SHA1(password) XOR SHA1(salt + SHA1(SHA1(password)))`
pub fn scramble_native_password(password: &str, salt: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let stage1 = Sha1::digest(password.as_bytes());
    let stage2 = Sha1::digest(stage1);
    let mut hasher = Sha1::new();
    hasher.update(salt);
    hasher.update(stage2);
    let stage3 = hasher.finalize();
    stage1.iter().zip(stage3.iter()).map(|(a, b)| a ^ b).collect()
}

/// `SHA256(password) XOR SHA256(SHA256(SHA256(password)) + salt)`
pub fn scramble_caching_sha2(password: &str, salt: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let hash1 = Sha256::digest(password.as_bytes());
    let hash2 = Sha256::digest(hash1);
    let mut hasher = Sha256::new();
    hasher.update(hash2);
    hasher.update(salt);
    let hash3 = hasher.finalize();
    hash1.iter().zip(hash3.iter()).map(|(a, b)| a ^ b).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &[u8] = b"12345678901234567890";

    #[test]
    fn test_native_password() {
        let res = scramble_native_password("password", SALT);
        assert_eq!(res.len(), 20);
        assert!(scramble_native_password("", SALT).is_empty());

        // XOR with SHA1(salt + SHA1(SHA1(password))) recovers SHA1(password)
        let stage1 = Sha1::digest(b"password");
        let mut hasher = Sha1::new();
        hasher.update(SALT);
        hasher.update(Sha1::digest(stage1));
        let recovered: Vec<u8> = res
            .iter()
            .zip(hasher.finalize().iter())
            .map(|(a, b)| a ^ b)
            .collect();
        assert_eq!(recovered, stage1.to_vec());
    }

    #[test]
    fn test_caching_sha2() {
        assert_eq!(scramble_caching_sha2("password", SALT).len(), 32);
        assert!(scramble_caching_sha2("", SALT).is_empty());
        assert_ne!(
            scramble_caching_sha2("password", SALT),
            scramble_caching_sha2("password", b"09876543210987654321")
        );
    }

    #[test]
    fn test_parse_auth_switch() {
        let mut data = b"mysql_native_password\0".to_vec();
        data.extend_from_slice(SALT);
        data.push(0);
        let (name, salt) = parse_auth_switch(&data);
        assert_eq!(name, MYSQL_NATIVE_PASSWORD);
        assert_eq!(salt, SALT);
    }
}
