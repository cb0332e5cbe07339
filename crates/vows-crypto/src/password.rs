use anyhow::{Result, anyhow};
use scrypt::Params;

const SALT: &[u8] = b"D7zboYc4Uc";
const LOG_N: u8 = 14;
const R: u32 = 8;
const P: u32 = 1;
const KEY_LEN: usize = 16;

/// Hash a guestbook password. Returns the 16-byte scrypt key as lowercase hex.
///
/// Stored hashes are compared as plain strings, so the output must stay
/// byte-identical to what is already in the sheet.
pub fn hash_password(password: &str) -> Result<String> {
    let params =
        Params::new(LOG_N, R, P, KEY_LEN).map_err(|e| anyhow!("Invalid scrypt params: {}", e))?;

    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(password.as_bytes(), SALT, &params, &mut key)
        .map_err(|e| anyhow!("scrypt failed: {}", e))?;

    Ok(hex::encode(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vector() {
        assert_eq!(
            hash_password("1234").unwrap(),
            "9c2ee9dd79da1ec35b4047dfedb2da07"
        );
        assert_eq!(
            hash_password("hunter22").unwrap(),
            "d449f1ce9fa13e76a82ecbb2e17d7193"
        );
    }

    #[test]
    fn different_passwords_differ() {
        let stored = hash_password("1234").unwrap();
        assert_eq!(stored.len(), 32);
        assert_ne!(hash_password("wrong").unwrap(), stored);
    }
}
