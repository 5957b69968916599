use std::sync::Arc;

use wire::{
    Alert, AlertDescription, AlertLevel, CertificateVerify, CipherSuiteId, ClientKeyExchange,
    Content, Finished, Handshake, HandshakeHeader, HandshakeMessage, HashAlgorithm, NamedCurve,
    ServerKeyExchange, SignatureAlgorithm, SignatureHashAlgorithm, PROTOCOL_VERSION1_2,
};

use cache::HandshakeCache;
use cipher_suite::cipher_suite_for_id;
use config::{Certificate, ClientAuthType, ExtendedMasterSecretType, HandshakeConfig};
use crypto::{CryptoEngine, NamedCurveKeypair, PrivateKey, PrivateKeyKind};
use ctx::Context;
use error::Error;
use fragment_buffer::FragmentBuffer;
use handshaker::HandshakeFsm;
use state::State;

use super::{flight0, flight4, flight5, Flight, FlightConn, Packet};

// A deterministic stand-in for the real point arithmetic: public keys
// equal private keys and the shared secret is the xor of both halves,
// which commutes exactly like a Diffie-Hellman exchange.
struct StubCrypto;

fn stub_signature(key_material: &[u8], plaintext: &[u8]) -> Vec<u8> {
    let mut input = key_material.to_vec();
    input.extend_from_slice(plaintext);
    HashAlgorithm::Sha256.digest(&input).unwrap()
}

impl CryptoEngine for StubCrypto {
    fn generate_key_pair(&self, curve: NamedCurve) -> Result<NamedCurveKeypair, Error> {
        let key: [u8; 32] = ::rand::random();
        Ok(NamedCurveKeypair {
            curve,
            public_key: key.to_vec(),
            private_key: key.to_vec(),
        })
    }

    fn pre_master_secret(
        &self,
        public_key: &[u8],
        private_key: &[u8],
        _curve: NamedCurve,
    ) -> Result<Vec<u8>, Error> {
        if public_key.len() != private_key.len() {
            return Err(Error::Crypto("key length mismatch".to_owned()));
        }
        Ok(public_key
            .iter()
            .zip(private_key.iter())
            .map(|(a, b)| a ^ b)
            .collect())
    }

    fn generate_key_signature(
        &self,
        plaintext: &[u8],
        private_key: &PrivateKey,
        _hash: HashAlgorithm,
    ) -> Result<Vec<u8>, Error> {
        Ok(stub_signature(&private_key.raw, plaintext))
    }

    fn verify_key_signature(
        &self,
        plaintext: &[u8],
        signature: &[u8],
        _hash: HashAlgorithm,
        certificates: &[Vec<u8>],
    ) -> Result<(), Error> {
        if certificates.is_empty() {
            return Err(Error::Crypto("no certificate".to_owned()));
        }
        if stub_signature(&certificates[0], plaintext) != signature {
            return Err(Error::Crypto("key signature mismatch".to_owned()));
        }
        Ok(())
    }

    fn generate_certificate_verify(
        &self,
        plaintext: &[u8],
        private_key: &PrivateKey,
        _hash: HashAlgorithm,
    ) -> Result<Vec<u8>, Error> {
        Ok(stub_signature(&private_key.raw, plaintext))
    }

    fn verify_certificate_verify(
        &self,
        plaintext: &[u8],
        _hash: HashAlgorithm,
        signature: &[u8],
        certificates: &[Vec<u8>],
    ) -> Result<(), Error> {
        if certificates.is_empty() {
            return Err(Error::Crypto("no certificate".to_owned()));
        }
        if stub_signature(&certificates[0], plaintext) != signature {
            return Err(Error::Crypto("certificate verify mismatch".to_owned()));
        }
        Ok(())
    }

    fn verify_server_chain(
        &self,
        certificates: &[Vec<u8>],
        roots: &[Vec<u8>],
        _server_name: &str,
    ) -> Result<(), Error> {
        if certificates.is_empty() || roots.is_empty() {
            return Err(Error::Crypto("server chain rejected".to_owned()));
        }
        Ok(())
    }

    fn verify_client_chain(
        &self,
        certificates: &[Vec<u8>],
        cas: &[Vec<u8>],
    ) -> Result<(), Error> {
        if certificates.is_empty() || cas.is_empty() {
            return Err(Error::Crypto("client chain rejected".to_owned()));
        }
        Ok(())
    }
}

struct MockConn {
    written: Vec<Packet>,
    alerts: Vec<Alert>,
}

impl MockConn {
    fn new() -> Self {
        MockConn {
            written: Vec::new(),
            alerts: Vec::new(),
        }
    }
}

impl FlightConn for MockConn {
    fn notify(
        &mut self,
        _ctx: &Context,
        level: AlertLevel,
        description: AlertDescription,
    ) -> Result<(), Error> {
        self.alerts.push(Alert {
            alert_level: level,
            alert_description: description,
        });
        Ok(())
    }

    fn write_packets(&mut self, _ctx: &Context, mut packets: Vec<Packet>) -> Result<(), Error> {
        self.written.append(&mut packets);
        Ok(())
    }

    fn handle_queued_packets(&mut self, _ctx: &Context) -> Result<(), Error> {
        Ok(())
    }
}

fn test_certificate(tag: &[u8]) -> Certificate {
    Certificate {
        certificate: vec![tag.to_vec()],
        private_key: PrivateKey {
            raw: tag.to_vec(),
            kind: PrivateKeyKind::Ecdsa,
        },
    }
}

fn psk_callback(_identity_hint: &[u8]) -> Result<Vec<u8>, Error> {
    Ok(vec![0u8; 16])
}

struct Endpoint {
    fsm: HandshakeFsm,
    state: State,
    cache: HandshakeCache,
    cfg: HandshakeConfig,
    conn: MockConn,
    fragments: FragmentBuffer,
}

impl Endpoint {
    fn new(is_client: bool, cfg: HandshakeConfig) -> Self {
        Endpoint {
            fsm: HandshakeFsm::new(is_client),
            state: State::new(is_client),
            cache: HandshakeCache::new(),
            cfg,
            conn: MockConn::new(),
            fragments: FragmentBuffer::new(),
        }
    }
}

// Moves every packet one endpoint has written into the other endpoint's
// cache, then pokes its state machine. Change-cipher-spec records fall
// through the fragment buffer, mirroring how a connection would treat
// them.
fn pump(ctx: &Context, from: &mut Endpoint, to: &mut Endpoint) {
    let written: Vec<Packet> = from.conn.written.drain(..).collect();
    let mut received_any = false;

    for p in &written {
        let raw = p.record.marshal().unwrap();
        if !to.fragments.push(&raw).unwrap() {
            continue;
        }
        while let Some((data, epoch)) = to.fragments.pop() {
            let header = HandshakeHeader::unmarshal(&data).unwrap();
            to.cache.push(
                data.clone(),
                epoch,
                header.message_sequence,
                header.handshake_type,
                from.state.is_client,
            );
            received_any = true;
        }
    }

    if received_any {
        to.fsm
            .on_handshake_message(ctx, &mut to.conn, &mut to.state, &mut to.cache, &to.cfg)
            .unwrap();
    }
}

fn run_handshake(client: &mut Endpoint, server: &mut Endpoint) {
    let ctx = Context::new();

    server
        .fsm
        .run(&ctx, &mut server.conn, &mut server.state, &mut server.cache, &server.cfg)
        .unwrap();
    client
        .fsm
        .run(&ctx, &mut client.conn, &mut client.state, &mut client.cache, &client.cfg)
        .unwrap();

    for _ in 0..10 {
        pump(&ctx, client, server);
        pump(&ctx, server, client);
        if client.fsm.is_finished() && server.fsm.is_finished() {
            break;
        }
    }
}

#[test]
fn full_mutual_ecdhe_handshake_with_extended_master_secret() {
    let crypto: Arc<dyn CryptoEngine> = Arc::new(StubCrypto);

    let mut server_cfg = HandshakeConfig::new(crypto.clone());
    server_cfg.local_certificates = vec![test_certificate(b"server-cert")];
    server_cfg.client_auth = ClientAuthType::RequireAndVerifyClientCert;
    server_cfg.client_cas = vec![b"test-ca".to_vec()];
    server_cfg.extended_master_secret = ExtendedMasterSecretType::Require;

    let mut client_cfg = HandshakeConfig::new(crypto);
    client_cfg.local_certificates = vec![test_certificate(b"client-cert")];
    client_cfg.root_cas = vec![b"test-ca".to_vec()];
    client_cfg.extended_master_secret = ExtendedMasterSecretType::Require;

    let mut server = Endpoint::new(false, server_cfg);
    server.state.cookie = b"E6148823FA2E".to_vec();
    let mut client = Endpoint::new(true, client_cfg);

    run_handshake(&mut client, &mut server);

    assert!(client.fsm.is_finished());
    assert!(server.fsm.is_finished());
    assert_eq!(client.fsm.current_flight(), Flight::Flight5);
    assert_eq!(server.fsm.current_flight(), Flight::Flight6);

    assert!(client.state.extended_master_secret);
    assert!(server.state.extended_master_secret);

    assert_eq!(client.state.master_secret, server.state.master_secret);
    assert_eq!(client.state.master_secret.len(), 48);

    assert!(client.state.peer_certificates_verified);
    assert!(server.state.peer_certificates_verified);
    assert_eq!(server.state.peer_certificates, vec![b"client-cert".to_vec()]);
    assert_eq!(client.state.peer_certificates, vec![b"server-cert".to_vec()]);

    // Both key schedules ran and agree, the record layer can encrypt.
    let client_keys = client.state.cipher_suite.as_ref().unwrap().encryption_keys().unwrap().clone();
    let server_keys = server.state.cipher_suite.as_ref().unwrap().encryption_keys().unwrap().clone();
    assert_eq!(client_keys.client_write_key, server_keys.client_write_key);
    assert_eq!(client_keys.server_write_key, server_keys.server_write_key);

    assert!(client.conn.alerts.is_empty());
    assert!(server.conn.alerts.is_empty());
}

#[test]
fn psk_handshake_without_certificates() {
    let crypto: Arc<dyn CryptoEngine> = Arc::new(StubCrypto);

    let mut server_cfg = HandshakeConfig::new(crypto.clone());
    server_cfg.local_cipher_suite_ids = vec![CipherSuiteId::TLS_PSK_WITH_AES_128_GCM_SHA256];
    server_cfg.local_psk_callback = Some(psk_callback);
    server_cfg.local_psk_identity_hint = Some(b"Client_identity".to_vec());

    let mut client_cfg = HandshakeConfig::new(crypto);
    client_cfg.local_cipher_suite_ids = vec![CipherSuiteId::TLS_PSK_WITH_AES_128_GCM_SHA256];
    client_cfg.local_psk_callback = Some(psk_callback);
    client_cfg.local_psk_identity_hint = Some(b"Client_identity".to_vec());

    let mut server = Endpoint::new(false, server_cfg);
    server.state.cookie = b"25FBEEB37C95".to_vec();
    let mut client = Endpoint::new(true, client_cfg);

    run_handshake(&mut client, &mut server);

    assert!(client.fsm.is_finished());
    assert!(server.fsm.is_finished());

    // No certificate exchange happened at all.
    assert!(client.state.peer_certificates.is_empty());
    assert!(server.state.peer_certificates.is_empty());
    assert!(!server.state.remote_requested_certificate);

    assert_eq!(client.state.master_secret, server.state.master_secret);

    // The PSK premaster construction: both length prefixed halves.
    assert_eq!(client.state.pre_master_secret[..2], [0x00, 0x10]);
    assert_eq!(client.state.pre_master_secret, server.state.pre_master_secret);
}

fn cached_message(cache: &mut HandshakeCache, message: HandshakeMessage, seq: u16, epoch: u16, is_client: bool) {
    let mut handshake = Handshake::new(message);
    handshake.handshake_header.message_sequence = seq;
    let typ = handshake.handshake_message.handshake_type();
    cache.push(handshake.marshal().unwrap(), epoch, seq, typ, is_client);
}

#[test]
fn certificate_verify_without_certificate_is_fatal() {
    let ctx = Context::new();
    let mut conn = MockConn::new();
    let cfg = HandshakeConfig::new(Arc::new(StubCrypto));

    let mut state = State::new(false);
    state.cipher_suite = Some(
        cipher_suite_for_id(CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256).unwrap(),
    );

    let mut cache = HandshakeCache::new();
    cached_message(
        &mut cache,
        HandshakeMessage::ClientKeyExchange(ClientKeyExchange {
            identity_hint: None,
            public_key: Some(vec![0x42; 32]),
        }),
        0,
        0,
        true,
    );
    cached_message(
        &mut cache,
        HandshakeMessage::CertificateVerify(CertificateVerify {
            algorithm: SignatureHashAlgorithm {
                hash: HashAlgorithm::Sha256,
                signature: SignatureAlgorithm::Ecdsa,
            },
            signature: vec![0x0a; 32],
        }),
        1,
        0,
        true,
    );

    let result = flight4::parse(&ctx, &mut conn, &mut state, &cache, &cfg);
    match result {
        Err((Some(alert), Some(err))) => {
            assert_eq!(alert.alert_level, AlertLevel::Fatal);
            assert_eq!(alert.alert_description, AlertDescription::NoCertificate);
            assert_eq!(err, Error::CertificateVerifyNoCertificate);
        }
        other => panic!("unexpected flight4 result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn flipped_verify_data_bit_is_a_handshake_failure() {
    let ctx = Context::new();
    let mut conn = MockConn::new();
    let cfg = HandshakeConfig::new(Arc::new(StubCrypto));

    let mut state = State::new(true);
    state.cipher_suite = Some(
        cipher_suite_for_id(CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256).unwrap(),
    );
    state.master_secret = vec![0x42; 48];

    // A Finished whose verify data can not match the local transcript.
    let mut cache = HandshakeCache::new();
    cached_message(
        &mut cache,
        HandshakeMessage::Finished(Finished {
            verify_data: vec![0x01; 12],
        }),
        0,
        1,
        false,
    );

    let result = flight5::parse(&ctx, &mut conn, &mut state, &cache, &cfg);
    match result {
        Err((Some(alert), Some(err))) => {
            assert_eq!(alert.alert_description, AlertDescription::HandshakeFailure);
            assert_eq!(err, Error::VerifyDataMismatch);
        }
        other => panic!("unexpected flight5 result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn unlisted_signature_scheme_is_insufficient_security() {
    let cfg = HandshakeConfig::new(Arc::new(StubCrypto));

    let mut state = State::new(true);
    state.cipher_suite = Some(
        cipher_suite_for_id(CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256).unwrap(),
    );
    state.pre_master_secret = vec![0x11; 32];
    state.local_keypair = Some(NamedCurveKeypair {
        curve: NamedCurve::P256,
        public_key: vec![0x22; 32],
        private_key: vec![0x22; 32],
    });
    state.peer_certificates = vec![b"server-cert".to_vec()];

    // The server signed with rsa_pkcs1_sha1, which the local config
    // does not list.
    let mut cache = HandshakeCache::new();
    cached_message(
        &mut cache,
        HandshakeMessage::ServerKeyExchange(ServerKeyExchange::Ecdhe {
            named_curve: NamedCurve::P256,
            public_key: vec![0x33; 32],
            algorithm: SignatureHashAlgorithm {
                hash: HashAlgorithm::Sha1,
                signature: SignatureAlgorithm::Rsa,
            },
            signature: vec![0x44; 32],
        }),
        3,
        0,
        false,
    );

    let result = flight5::generate(&mut state, &cache, &cfg);
    match result {
        Err((Some(alert), Some(err))) => {
            assert_eq!(alert.alert_description, AlertDescription::InsufficientSecurity);
            assert_eq!(err, Error::NoAvailableSignatureSchemes);
        }
        other => panic!("unexpected flight5 result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn retransmit_timeout_resends_the_last_flight() {
    let crypto: Arc<dyn CryptoEngine> = Arc::new(StubCrypto);

    let mut server_cfg = HandshakeConfig::new(crypto.clone());
    server_cfg.local_certificates = vec![test_certificate(b"server-cert")];
    let mut client_cfg = HandshakeConfig::new(crypto);
    client_cfg.insecure_skip_verify = true;

    let mut server = Endpoint::new(false, server_cfg);
    server.state.cookie = b"ad28cc8f".to_vec();
    let mut client = Endpoint::new(true, client_cfg);

    run_handshake(&mut client, &mut server);
    assert!(client.fsm.is_finished());

    // The peer's Finished never arriving again means the timer fires and
    // the whole client flight goes out once more, byte for byte.
    let ctx = Context::new();
    client
        .fsm
        .on_retransmit_timeout(&ctx, &mut client.conn, &mut client.state, &mut client.cache)
        .unwrap();

    let resent: Vec<&Packet> = client.conn.written.iter().collect();
    assert!(!resent.is_empty());
    match resent[0].record.content {
        Content::Handshake(ref h) => match h.handshake_message {
            HandshakeMessage::ClientKeyExchange(_) => {}
            ref other => panic!("unexpected first message: {:?}", other),
        },
        _ => panic!("expected handshake record"),
    }
}

#[test]
fn cancelled_context_aborts_at_the_callout() {
    let ctx = Context::new();
    ctx.cancel();

    let mut conn = MockConn::new();
    let cfg = HandshakeConfig::new(Arc::new(StubCrypto));
    let mut state = State::new(false);

    let mut cache = HandshakeCache::new();
    cached_message(
        &mut cache,
        HandshakeMessage::ClientHello(::wire::ClientHello {
            version: PROTOCOL_VERSION1_2,
            random: ::wire::HandshakeRandom::default(),
            cookie: Vec::new(),
            cipher_suites: vec![CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256],
            compression_methods: ::wire::default_compression_methods(),
            extensions: Vec::new(),
        }),
        0,
        0,
        true,
    );

    let result = flight0::parse(&ctx, &mut conn, &mut state, &cache, &cfg);
    match result {
        Err((None, Some(err))) => assert_eq!(err, Error::ContextCancelled),
        other => panic!("unexpected flight0 result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn flight5_packets_carry_the_reset_flag() {
    let crypto: Arc<dyn CryptoEngine> = Arc::new(StubCrypto);
    let mut client_cfg = HandshakeConfig::new(crypto);
    client_cfg.insecure_skip_verify = true;

    let mut state = State::new(true);
    state.cipher_suite = Some(
        cipher_suite_for_id(CipherSuiteId::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256).unwrap(),
    );
    state.pre_master_secret = vec![0x11; 32];
    state.local_keypair = Some(NamedCurveKeypair {
        curve: NamedCurve::P256,
        public_key: vec![0x22; 32],
        private_key: vec![0x22; 32],
    });
    state.peer_certificates = vec![b"server-cert".to_vec()];

    let mut cache = HandshakeCache::new();
    let signed = stub_signature(
        b"server-cert",
        &::crypto::value_key_message(
            &state.local_random.marshal_fixed(),
            &state.remote_random.marshal_fixed(),
            &[0x33; 32],
            NamedCurve::P256,
        ),
    );
    cached_message(
        &mut cache,
        HandshakeMessage::ServerKeyExchange(ServerKeyExchange::Ecdhe {
            named_curve: NamedCurve::P256,
            public_key: vec![0x33; 32],
            algorithm: SignatureHashAlgorithm {
                hash: HashAlgorithm::Sha256,
                signature: SignatureAlgorithm::Ecdsa,
            },
            signature: signed,
        }),
        3,
        0,
        false,
    );

    let pkts = flight5::generate(&mut state, &cache, &client_cfg).unwrap();

    // ClientKeyExchange, ChangeCipherSpec, Finished.
    assert_eq!(pkts.len(), 3);

    let last = pkts.last().unwrap();
    assert!(last.should_encrypt);
    assert!(last.reset_local_sequence_number);
    assert_eq!(last.record.record_layer_header.epoch, 1);
    match last.record.content {
        Content::Handshake(ref h) => match h.handshake_message {
            HandshakeMessage::Finished(ref finished) => {
                assert_eq!(finished.verify_data.len(), 12);
            }
            _ => panic!("expected finished"),
        },
        _ => panic!("expected handshake"),
    }

    let cipher_spec = &pkts[pkts.len() - 2];
    match cipher_spec.record.content {
        Content::ChangeCipherSpec(_) => {}
        _ => panic!("expected change cipher spec before finished"),
    }
}
