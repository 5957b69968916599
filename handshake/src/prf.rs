//! The TLS 1.2 pseudo random function and the key derivations built on
//! top of it.
//! https://tools.ietf.org/html/rfc5246#section-5

use byteorder::{BigEndian, ByteOrder};
use hex;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384};

use wire;
use wire::HashAlgorithm;

use error::Error;

pub const MASTER_SECRET_LENGTH: usize = 48;
pub const VERIFY_DATA_LENGTH: usize = 12;

const MASTER_SECRET_LABEL: &'static [u8] = b"master secret";
const EXTENDED_MASTER_SECRET_LABEL: &'static [u8] = b"extended master secret";
const KEY_EXPANSION_LABEL: &'static [u8] = b"key expansion";
const VERIFY_DATA_CLIENT_LABEL: &'static [u8] = b"client finished";
const VERIFY_DATA_SERVER_LABEL: &'static [u8] = b"server finished";

fn hmac_hash(hash: HashAlgorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    match hash {
        HashAlgorithm::Sha256 => {
            let mut mac = Hmac::<Sha256>::new_varkey(key)
                .map_err(|_| Error::Crypto("invalid hmac key length".to_owned()))?;
            mac.input(data);
            Ok(mac.result().code().to_vec())
        }
        HashAlgorithm::Sha384 => {
            let mut mac = Hmac::<Sha384>::new_varkey(key)
                .map_err(|_| Error::Crypto("invalid hmac key length".to_owned()))?;
            mac.input(data);
            Ok(mac.result().code().to_vec())
        }
        _ => Err(Error::Wire(wire::Error::InvalidHashAlgorithm(hash.as_u8()))),
    }
}

// p_hash is the data expansion function: HMAC chained until enough
// output has been produced.
// https://tools.ietf.org/html/rfc5246#section-5
fn p_hash(
    secret: &[u8],
    seed: &[u8],
    requested_length: usize,
    hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    let mut last_round = seed.to_vec();
    let mut out = Vec::with_capacity(requested_length);

    while out.len() < requested_length {
        last_round = hmac_hash(hash, secret, &last_round)?;

        let mut with_secret = last_round.clone();
        with_secret.extend_from_slice(seed);
        let round_output = hmac_hash(hash, secret, &with_secret)?;

        let remaining = requested_length - out.len();
        if round_output.len() > remaining {
            out.extend_from_slice(&round_output[..remaining]);
        } else {
            out.extend_from_slice(&round_output);
        }
    }

    Ok(out)
}

// prf_psk_pre_master_secret builds the premaster secret for PSK suites:
// both halves are length prefixed, the first is all zero.
// https://tools.ietf.org/html/rfc4279#section-2
pub fn prf_psk_pre_master_secret(psk: &[u8]) -> Vec<u8> {
    let psk_len = psk.len();

    let mut out = vec![0u8; 2 + psk_len + 2];
    out.extend_from_slice(psk);
    BigEndian::write_u16(&mut out[..2], psk_len as u16);
    BigEndian::write_u16(&mut out[2 + psk_len..2 + psk_len + 2], psk_len as u16);
    out
}

pub fn prf_master_secret(
    pre_master_secret: &[u8],
    client_random: &[u8],
    server_random: &[u8],
    hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    let mut seed = MASTER_SECRET_LABEL.to_vec();
    seed.extend_from_slice(client_random);
    seed.extend_from_slice(server_random);
    p_hash(pre_master_secret, &seed, MASTER_SECRET_LENGTH, hash)
}

// https://tools.ietf.org/html/rfc7627#section-4
pub fn prf_extended_master_secret(
    pre_master_secret: &[u8],
    session_hash: &[u8],
    hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    let mut seed = EXTENDED_MASTER_SECRET_LABEL.to_vec();
    seed.extend_from_slice(session_hash);
    p_hash(pre_master_secret, &seed, MASTER_SECRET_LENGTH, hash)
}

/// The key material the record layer consumes once a cipher suite has
/// been initialized.
#[derive(Clone, PartialEq)]
pub struct EncryptionKeys {
    pub master_secret: Vec<u8>,
    pub client_mac_key: Vec<u8>,
    pub server_mac_key: Vec<u8>,
    pub client_write_key: Vec<u8>,
    pub server_write_key: Vec<u8>,
    pub client_write_iv: Vec<u8>,
    pub server_write_iv: Vec<u8>,
}

impl ::std::fmt::Debug for EncryptionKeys {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(
            f,
            r#"
        client_mac_key:   {}
        server_mac_key:   {}
        client_write_key: {}
        server_write_key: {}
        client_write_iv:  {}
        server_write_iv:  {}
        "#,
            hex::encode(&self.client_mac_key),
            hex::encode(&self.server_mac_key),
            hex::encode(&self.client_write_key),
            hex::encode(&self.server_write_key),
            hex::encode(&self.client_write_iv),
            hex::encode(&self.server_write_iv),
        )
    }
}

pub fn prf_encryption_keys(
    master_secret: &[u8],
    client_random: &[u8],
    server_random: &[u8],
    mac_len: usize,
    key_len: usize,
    iv_len: usize,
    hash: HashAlgorithm,
) -> Result<EncryptionKeys, Error> {
    let mut seed = KEY_EXPANSION_LABEL.to_vec();
    seed.extend_from_slice(server_random);
    seed.extend_from_slice(client_random);

    let material = p_hash(master_secret, &seed, 2 * mac_len + 2 * key_len + 2 * iv_len, hash)?;
    let mut offset = 0;

    let mut take = |len: usize| {
        let piece = material[offset..offset + len].to_vec();
        offset += len;
        piece
    };

    Ok(EncryptionKeys {
        master_secret: master_secret.to_vec(),
        client_mac_key: take(mac_len),
        server_mac_key: take(mac_len),
        client_write_key: take(key_len),
        server_write_key: take(key_len),
        client_write_iv: take(iv_len),
        server_write_iv: take(iv_len),
    })
}

fn prf_verify_data(
    label: &[u8],
    master_secret: &[u8],
    handshake_bodies: &[u8],
    hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    let transcript_digest = hash.digest(handshake_bodies)?;

    let mut seed = label.to_vec();
    seed.extend_from_slice(&transcript_digest);
    p_hash(master_secret, &seed, VERIFY_DATA_LENGTH, hash)
}

pub fn prf_verify_data_client(
    master_secret: &[u8],
    handshake_bodies: &[u8],
    hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    prf_verify_data(VERIFY_DATA_CLIENT_LABEL, master_secret, handshake_bodies, hash)
}

pub fn prf_verify_data_server(
    master_secret: &[u8],
    handshake_bodies: &[u8],
    hash: HashAlgorithm,
) -> Result<Vec<u8>, Error> {
    prf_verify_data(VERIFY_DATA_SERVER_LABEL, master_secret, handshake_bodies, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psk_pre_master_secret_layout() {
        let pms = prf_psk_pre_master_secret(&[0u8; 16]);
        assert_eq!(
            pms,
            hex!("001000000000000000000000000000000000001000000000000000000000000000000000")
                .to_vec()
        );
    }

    #[test]
    fn master_secret_is_48_bytes_and_deterministic() {
        let pms = hex!("8ce010a1eb9d2cb4b74d1e9ec6d8ab493d22b4a66fd971a1b07bd42d3cbbd045");
        let client_random = [0x11u8; 32];
        let server_random = [0x22u8; 32];

        let a = prf_master_secret(&pms, &client_random, &server_random, HashAlgorithm::Sha256)
            .unwrap();
        let b = prf_master_secret(&pms, &client_random, &server_random, HashAlgorithm::Sha256)
            .unwrap();

        assert_eq!(a.len(), MASTER_SECRET_LENGTH);
        assert_eq!(a, b);

        let c = prf_extended_master_secret(&pms, &[0x33u8; 32], HashAlgorithm::Sha256).unwrap();
        assert_eq!(c.len(), MASTER_SECRET_LENGTH);
        assert_ne!(a, c);
    }

    #[test]
    fn verify_data_sides_agree_on_shared_inputs() {
        let master_secret = [0x42u8; 48];
        let transcript = b"handshake transcript bytes";

        let client_a =
            prf_verify_data_client(&master_secret, transcript, HashAlgorithm::Sha256).unwrap();
        let client_b =
            prf_verify_data_client(&master_secret, transcript, HashAlgorithm::Sha256).unwrap();
        let server =
            prf_verify_data_server(&master_secret, transcript, HashAlgorithm::Sha256).unwrap();

        assert_eq!(client_a.len(), VERIFY_DATA_LENGTH);
        assert_eq!(client_a, client_b);
        // The labels differ, the outputs must too.
        assert_ne!(client_a, server);
    }

    #[test]
    fn encryption_keys_split_lengths() {
        let keys = prf_encryption_keys(
            &[0x42u8; 48],
            &[0x11u8; 32],
            &[0x22u8; 32],
            0,
            16,
            4,
            HashAlgorithm::Sha256,
        )
        .unwrap();

        assert!(keys.client_mac_key.is_empty());
        assert_eq!(keys.client_write_key.len(), 16);
        assert_eq!(keys.server_write_key.len(), 16);
        assert_eq!(keys.client_write_iv.len(), 4);
        assert_eq!(keys.server_write_iv.len(), 4);
        assert_ne!(keys.client_write_key, keys.server_write_key);
    }
}
