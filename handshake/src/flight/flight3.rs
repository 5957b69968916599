use wire::{
    default_compression_methods, AlertDescription, ClientHello, Content, Extension, Handshake,
    HandshakeMessage, HandshakeType, RecordLayer, ServerKeyExchange, PROTOCOL_VERSION1_2,
};

use cache::{HandshakeCache, HandshakeCachePullRule};
use cipher_suite::cipher_suite_for_id;
use config::{ExtendedMasterSecretType, HandshakeConfig};
use ctx::Context;
use error::Error;
use prf::prf_psk_pre_master_secret;
use state::State;

use super::flight1::hello_extensions;
use super::{fatal_alert, Flight, FlightConn, FlightResult, Packet};

pub fn parse(
    ctx: &Context,
    _conn: &mut dyn FlightConn,
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Flight> {
    // Clients may receive multiple HelloVerifyRequests, use the cookie
    // from the latest one.
    // https://tools.ietf.org/html/rfc6347#section-4.2.1
    if let Some((seq, msgs)) = cache.full_pull_map(
        state.handshake_recv_sequence,
        &[HandshakeCachePullRule {
            typ: HandshakeType::HelloVerifyRequest,
            epoch: cfg.initial_epoch,
            is_client: false,
            optional: true,
        }],
    ) {
        if let Some(&HandshakeMessage::HelloVerifyRequest(ref hello_verify_request)) =
            msgs.get(&HandshakeType::HelloVerifyRequest)
        {
            state.cookie = hello_verify_request.cookie.clone();
            state.handshake_recv_sequence = seq;
            return Ok(Flight::Flight3);
        }
    }

    if state.cipher_suite.is_none() {
        let (seq, mut msgs) = match cache.full_pull_map(
            state.handshake_recv_sequence,
            &[HandshakeCachePullRule {
                typ: HandshakeType::ServerHello,
                epoch: cfg.initial_epoch,
                is_client: false,
                optional: false,
            }],
        ) {
            Some(pulled) => pulled,
            None => return Err((None, None)),
        };

        let server_hello = match msgs.remove(&HandshakeType::ServerHello) {
            Some(HandshakeMessage::ServerHello(server_hello)) => server_hello,
            _ => return Err(fatal_alert(AlertDescription::InternalError, None)),
        };

        if server_hello.version != PROTOCOL_VERSION1_2 {
            return Err(fatal_alert(
                AlertDescription::ProtocolVersion,
                Some(Error::UnsupportedProtocolVersion),
            ));
        }

        for extension in &server_hello.extensions {
            match extension {
                &Extension::UseSrtp { ref protection_profiles } => {
                    let matching = cfg
                        .local_srtp_protection_profiles
                        .iter()
                        .find(|profile| protection_profiles.contains(profile));
                    match matching {
                        Some(&profile) => state.srtp_protection_profile = Some(profile),
                        None => {
                            return Err(fatal_alert(
                                AlertDescription::IllegalParameter,
                                Some(Error::NoMatchingSrtpProfile),
                            ))
                        }
                    }
                }
                &Extension::UseExtendedMasterSecret => {
                    if cfg.extended_master_secret != ExtendedMasterSecretType::Disable {
                        state.extended_master_secret = true;
                    }
                }
                _ => {}
            }
        }

        if cfg.extended_master_secret == ExtendedMasterSecretType::Require
            && !state.extended_master_secret
        {
            return Err(fatal_alert(
                AlertDescription::InsufficientSecurity,
                Some(Error::ClientRequiredButNoServerEms),
            ));
        }

        if !cfg.local_cipher_suite_ids.contains(&server_hello.cipher_suite) {
            return Err(fatal_alert(
                AlertDescription::InsufficientSecurity,
                Some(Error::InvalidCipherSuite(server_hello.cipher_suite.0)),
            ));
        }

        state.remote_random = server_hello.random;
        match cipher_suite_for_id(server_hello.cipher_suite) {
            Ok(suite) => state.cipher_suite = Some(suite),
            Err(err) => {
                return Err(fatal_alert(AlertDescription::InsufficientSecurity, Some(err)))
            }
        }
        state.handshake_recv_sequence = seq;
    }

    let (seq, msgs) = match cache.full_pull_map(
        state.handshake_recv_sequence,
        &[
            HandshakeCachePullRule {
                typ: HandshakeType::Certificate,
                epoch: cfg.initial_epoch,
                is_client: false,
                optional: true,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::ServerKeyExchange,
                epoch: cfg.initial_epoch,
                is_client: false,
                optional: true,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::CertificateRequest,
                epoch: cfg.initial_epoch,
                is_client: false,
                optional: true,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::ServerHelloDone,
                epoch: cfg.initial_epoch,
                is_client: false,
                optional: false,
            },
        ],
    ) {
        Some(pulled) => pulled,
        None => return Err((None, None)),
    };

    if let Some(&HandshakeMessage::Certificate(ref certificate)) =
        msgs.get(&HandshakeType::Certificate)
    {
        state.peer_certificates = certificate.certificate.clone();
    }

    if let Some(&HandshakeMessage::ServerKeyExchange(ref server_key_exchange)) =
        msgs.get(&HandshakeType::ServerKeyExchange)
    {
        // The premaster derivation reaches into the PSK callback and the
        // crypto engine, both cancellation points.
        if let Err(err) = ctx.check() {
            return Err((None, Some(err)));
        }
        if let Err(pair) = handle_server_key_exchange(state, cfg, server_key_exchange) {
            return Err(pair);
        }
    }

    if msgs.contains_key(&HandshakeType::CertificateRequest) {
        state.remote_requested_certificate = true;
    }

    state.handshake_recv_sequence = seq;
    Ok(Flight::Flight5)
}

// handle_server_key_exchange derives the premaster secret as soon as the
// server's key exchange parameters are known. Shared with flight 5, which
// runs it for PSK suites that omit the ServerKeyExchange entirely.
pub fn handle_server_key_exchange(
    state: &mut State,
    cfg: &HandshakeConfig,
    server_key_exchange: &ServerKeyExchange,
) -> Result<(), (Option<::wire::Alert>, Option<Error>)> {
    if let Some(psk_callback) = cfg.local_psk_callback {
        let identity_hint: &[u8] = match server_key_exchange {
            &ServerKeyExchange::Psk { ref identity_hint } => identity_hint,
            _ => &[],
        };

        let psk = match psk_callback(identity_hint) {
            Ok(psk) => psk,
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        };
        state.pre_master_secret = prf_psk_pre_master_secret(&psk);
    } else {
        let (named_curve, public_key) = match server_key_exchange {
            &ServerKeyExchange::Ecdhe {
                named_curve,
                ref public_key,
                ..
            } => (named_curve, public_key),
            _ => {
                return Err(fatal_alert(
                    AlertDescription::UnexpectedMessage,
                    Some(Error::KeyExchangeMismatch),
                ))
            }
        };

        let keypair = match cfg.crypto.generate_key_pair(named_curve) {
            Ok(keypair) => keypair,
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        };

        match cfg
            .crypto
            .pre_master_secret(public_key, &keypair.private_key, named_curve)
        {
            Ok(pre_master_secret) => state.pre_master_secret = pre_master_secret,
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        }

        state.named_curve = named_curve;
        state.local_keypair = Some(keypair);
    }

    Ok(())
}

pub fn generate(
    state: &mut State,
    _cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Vec<Packet>> {
    Ok(vec![Packet {
        record: RecordLayer::new(
            PROTOCOL_VERSION1_2,
            0,
            Content::Handshake(Handshake::new(HandshakeMessage::ClientHello(ClientHello {
                version: PROTOCOL_VERSION1_2,
                random: state.local_random,
                cookie: state.cookie.clone(),
                cipher_suites: cfg.local_cipher_suite_ids.clone(),
                compression_methods: default_compression_methods(),
                extensions: hello_extensions(cfg),
            }))),
        ),
        should_encrypt: false,
        reset_local_sequence_number: false,
    }])
}
