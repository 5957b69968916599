use super::*;
use algorithm::default_compression_methods;
use algorithm::{CipherSuiteId, HashAlgorithm, SignatureAlgorithm, SignatureHashAlgorithm};
use content::PROTOCOL_VERSION1_2;
use curve::NamedCurve;
use extension::Extension;
use random::HandshakeRandom;

fn round_trip(message: HandshakeMessage) {
    let mut handshake = Handshake::new(message);
    handshake.handshake_header.message_sequence = 7;

    let raw = handshake.marshal().unwrap();
    let parsed = Handshake::unmarshal(&raw).unwrap();

    assert_eq!(parsed, {
        let mut expected = handshake.clone();
        expected.handshake_header.length = (raw.len() - HANDSHAKE_HEADER_LENGTH) as u32;
        expected.handshake_header.fragment_length = expected.handshake_header.length;
        expected
    });
}

fn sample_random() -> HandshakeRandom {
    let mut random = HandshakeRandom::default();
    random.populate();
    random
}

#[test]
fn header_round_trip_preserves_all_fields() {
    let header = HandshakeHeader {
        handshake_type: HandshakeType::ClientKeyExchange,
        length: 0x0a0b0c,
        message_sequence: 0x0102,
        fragment_offset: 0x030405,
        fragment_length: 0x060708,
    };

    let raw = header.marshal();
    assert_eq!(raw, hex!("100a0b0c0102030405060708").to_vec());
    assert_eq!(HandshakeHeader::unmarshal(&raw).unwrap(), header);
}

#[test]
fn wrapper_refuses_fragmented_marshal() {
    let mut handshake = Handshake::new(HandshakeMessage::ServerHelloDone(ServerHelloDone {}));
    handshake.handshake_header.fragment_offset = 1;
    assert_eq!(handshake.marshal(), Err(::Error::UnableToMarshalFragmented));
}

#[test]
fn wrapper_rejects_length_mismatch() {
    let handshake = Handshake::new(HandshakeMessage::Finished(Finished {
        verify_data: vec![0u8; 12],
    }));
    let mut raw = handshake.marshal().unwrap();
    // Claim one byte more than the payload carries.
    write_u24(&mut raw[1..4], 13);
    assert_eq!(Handshake::unmarshal(&raw), Err(::Error::LengthMismatch));
}

#[test]
fn wrapper_rejects_unknown_type() {
    let raw = hex!("630000000000000000000000");
    assert_eq!(Handshake::unmarshal(&raw), Err(::Error::NotImplemented));
}

#[test]
fn client_hello_round_trip() {
    round_trip(HandshakeMessage::ClientHello(ClientHello {
        version: PROTOCOL_VERSION1_2,
        random: sample_random(),
        cookie: hex!("e6148823fa2e36eb8ad2b1a9").to_vec(),
        cipher_suites: vec![
            CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
            CipherSuiteId::TLS_PSK_WITH_AES_128_GCM_SHA256,
        ],
        compression_methods: default_compression_methods(),
        extensions: vec![
            Extension::UseExtendedMasterSecret,
            Extension::SupportedEllipticCurves {
                elliptic_curves: vec![NamedCurve::P256],
            },
        ],
    }));
}

#[test]
fn server_hello_round_trip() {
    round_trip(HandshakeMessage::ServerHello(ServerHello {
        version: PROTOCOL_VERSION1_2,
        random: sample_random(),
        cipher_suite: CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
        compression_method: default_compression_methods()[0],
        extensions: vec![Extension::UseExtendedMasterSecret],
    }));
}

#[test]
fn hello_verify_request_round_trip() {
    round_trip(HandshakeMessage::HelloVerifyRequest(HelloVerifyRequest {
        version: PROTOCOL_VERSION1_2,
        cookie: hex!("25fbeeb37c95cf00ebade6b6").to_vec(),
    }));
}

#[test]
fn certificate_round_trip() {
    round_trip(HandshakeMessage::Certificate(Certificate {
        certificate: vec![
            hex!("308201413081e8a003020102").to_vec(),
            hex!("3082017330821a").to_vec(),
        ],
    }));
}

#[test]
fn server_key_exchange_ecdhe_round_trip() {
    round_trip(HandshakeMessage::ServerKeyExchange(ServerKeyExchange::Ecdhe {
        named_curve: NamedCurve::X25519,
        public_key: vec![0x05; 32],
        algorithm: SignatureHashAlgorithm {
            hash: HashAlgorithm::Sha256,
            signature: SignatureAlgorithm::Ecdsa,
        },
        signature: vec![0x0a; 70],
    }));
}

#[test]
fn server_key_exchange_psk_round_trip() {
    round_trip(HandshakeMessage::ServerKeyExchange(ServerKeyExchange::Psk {
        identity_hint: b"dtls server hint".to_vec(),
    }));
}

#[test]
fn certificate_request_round_trip() {
    round_trip(HandshakeMessage::CertificateRequest(CertificateRequest {
        certificate_types: vec![
            ClientCertificateType::RSA_SIGN,
            ClientCertificateType::ECDSA_SIGN,
        ],
        signature_hash_algorithms: vec![
            SignatureHashAlgorithm {
                hash: HashAlgorithm::Sha256,
                signature: SignatureAlgorithm::Ecdsa,
            },
            SignatureHashAlgorithm {
                hash: HashAlgorithm::Sha384,
                signature: SignatureAlgorithm::Rsa,
            },
        ],
    }));
}

#[test]
fn server_hello_done_round_trip() {
    round_trip(HandshakeMessage::ServerHelloDone(ServerHelloDone {}));
}

#[test]
fn certificate_verify_round_trip() {
    round_trip(HandshakeMessage::CertificateVerify(CertificateVerify {
        algorithm: SignatureHashAlgorithm {
            hash: HashAlgorithm::Sha256,
            signature: SignatureAlgorithm::Ecdsa,
        },
        signature: vec![0x2b; 71],
    }));
}

#[test]
fn finished_round_trip() {
    round_trip(HandshakeMessage::Finished(Finished {
        verify_data: hex!("0102030405060708090a0b0c").to_vec(),
    }));
}

#[test]
fn client_key_exchange_marshal_requires_exactly_one_field() {
    let neither = ClientKeyExchange::default();
    assert_eq!(neither.marshal(), Err(::Error::InvalidClientKeyExchange));

    let both = ClientKeyExchange {
        identity_hint: Some(vec![1]),
        public_key: Some(vec![2]),
    };
    assert_eq!(both.marshal(), Err(::Error::InvalidClientKeyExchange));
}

#[test]
fn client_key_exchange_disambiguation() {
    // PSK framing: two byte big-endian length followed by the hint.
    let psk = ClientKeyExchange {
        identity_hint: Some(b"Client_identity".to_vec()),
        public_key: None,
    };
    let raw = psk.marshal().unwrap();
    assert_eq!(raw[..2], hex!("000f"));
    assert_eq!(ClientKeyExchange::unmarshal(&raw).unwrap(), psk);

    // ECDHE framing: single length byte followed by the public key.
    let ecdhe = ClientKeyExchange {
        identity_hint: None,
        public_key: Some(vec![0x42; 32]),
    };
    let raw = ecdhe.marshal().unwrap();
    assert_eq!(raw[0], 32);
    assert_eq!(ClientKeyExchange::unmarshal(&raw).unwrap(), ecdhe);
}
