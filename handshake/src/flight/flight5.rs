use wire::{
    AlertDescription, Certificate, CertificateVerify, ChangeCipherSpec, ClientKeyExchange,
    Content, Finished, Handshake, HandshakeMessage, HandshakeType, RecordLayer,
    ServerKeyExchange, PROTOCOL_VERSION1_2,
};

use cache::{HandshakeCache, HandshakeCachePullRule};
use config::HandshakeConfig;
use crypto::{select_signature_scheme, value_key_message};
use ctx::Context;
use error::Error;
use prf::{
    prf_extended_master_secret, prf_master_secret, prf_verify_data_client,
    prf_verify_data_server,
};
use state::State;

use super::flight3::handle_server_key_exchange;
use super::{fatal_alert, Flight, FlightConn, FlightResult, Packet};

// The rule set covering the whole transcript, in canonical order.
fn full_transcript_rules(cfg: &HandshakeConfig) -> Vec<HandshakeCachePullRule> {
    let mut rules = prior_transcript_rules(cfg);
    rules.push(HandshakeCachePullRule {
        typ: HandshakeType::CertificateVerify,
        epoch: cfg.initial_epoch,
        is_client: true,
        optional: false,
    });
    rules.push(HandshakeCachePullRule {
        typ: HandshakeType::Finished,
        epoch: cfg.initial_epoch + 1,
        is_client: true,
        optional: false,
    });
    rules
}

// Everything through ClientKeyExchange, the prefix CertificateVerify
// signs.
fn prior_transcript_rules(cfg: &HandshakeConfig) -> Vec<HandshakeCachePullRule> {
    vec![
        HandshakeCachePullRule {
            typ: HandshakeType::ClientHello,
            epoch: cfg.initial_epoch,
            is_client: true,
            optional: false,
        },
        HandshakeCachePullRule {
            typ: HandshakeType::ServerHello,
            epoch: cfg.initial_epoch,
            is_client: false,
            optional: false,
        },
        HandshakeCachePullRule {
            typ: HandshakeType::Certificate,
            epoch: cfg.initial_epoch,
            is_client: false,
            optional: false,
        },
        HandshakeCachePullRule {
            typ: HandshakeType::ServerKeyExchange,
            epoch: cfg.initial_epoch,
            is_client: false,
            optional: false,
        },
        HandshakeCachePullRule {
            typ: HandshakeType::CertificateRequest,
            epoch: cfg.initial_epoch,
            is_client: false,
            optional: false,
        },
        HandshakeCachePullRule {
            typ: HandshakeType::ServerHelloDone,
            epoch: cfg.initial_epoch,
            is_client: false,
            optional: false,
        },
        HandshakeCachePullRule {
            typ: HandshakeType::Certificate,
            epoch: cfg.initial_epoch,
            is_client: true,
            optional: false,
        },
        HandshakeCachePullRule {
            typ: HandshakeType::ClientKeyExchange,
            epoch: cfg.initial_epoch,
            is_client: true,
            optional: false,
        },
    ]
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

pub fn parse(
    _ctx: &Context,
    _conn: &mut dyn FlightConn,
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Flight> {
    let (_, mut msgs) = match cache.full_pull_map(
        state.handshake_recv_sequence,
        &[HandshakeCachePullRule {
            typ: HandshakeType::Finished,
            epoch: cfg.initial_epoch + 1,
            is_client: false,
            optional: false,
        }],
    ) {
        Some(pulled) => pulled,
        // No valid message received. Keep reading
        None => return Err((None, None)),
    };

    let finished = match msgs.remove(&HandshakeType::Finished) {
        Some(HandshakeMessage::Finished(finished)) => finished,
        _ => return Err(fatal_alert(AlertDescription::InternalError, None)),
    };

    let plaintext = cache.pull_and_merge(&full_transcript_rules(cfg));

    let hash_func = match state.cipher_suite.as_ref() {
        Some(suite) => suite.hash_func(),
        None => {
            return Err(fatal_alert(
                AlertDescription::InternalError,
                Some(Error::CipherSuiteUnset),
            ))
        }
    };

    let expected_verify_data =
        match prf_verify_data_server(&state.master_secret, &plaintext, hash_func) {
            Ok(expected) => expected,
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        };
    if !constant_time_eq(&expected_verify_data, &finished.verify_data) {
        return Err(fatal_alert(
            AlertDescription::HandshakeFailure,
            Some(Error::VerifyDataMismatch),
        ));
    }

    Ok(Flight::Flight5)
}

pub fn generate(
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Vec<Packet>> {
    let mut certificate = None;
    if !cfg.local_certificates.is_empty() {
        match cfg.get_certificate(&cfg.server_name) {
            Ok(found) => certificate = Some(found),
            Err(err) => {
                return Err(fatal_alert(AlertDescription::HandshakeFailure, Some(err)))
            }
        }
    }

    let mut pkts = Vec::new();

    if state.remote_requested_certificate {
        let certificate_chain = match certificate {
            Some(ref certificate) => certificate.certificate.clone(),
            None => Vec::new(),
        };
        pkts.push(Packet {
            record: RecordLayer::new(
                PROTOCOL_VERSION1_2,
                0,
                Content::Handshake(Handshake::new(HandshakeMessage::Certificate(Certificate {
                    certificate: certificate_chain,
                }))),
            ),
            should_encrypt: false,
            reset_local_sequence_number: false,
        });
    }

    let client_key_exchange = if cfg.local_psk_callback.is_none() {
        let keypair = match state.local_keypair {
            Some(ref keypair) => keypair,
            None => {
                return Err(fatal_alert(
                    AlertDescription::InternalError,
                    Some(Error::KeypairUnset),
                ))
            }
        };
        ClientKeyExchange {
            identity_hint: None,
            public_key: Some(keypair.public_key.clone()),
        }
    } else {
        ClientKeyExchange {
            identity_hint: Some(cfg.local_psk_identity_hint.clone().unwrap_or_default()),
            public_key: None,
        }
    };

    pkts.push(Packet {
        record: RecordLayer::new(
            PROTOCOL_VERSION1_2,
            0,
            Content::Handshake(Handshake::new(HandshakeMessage::ClientKeyExchange(
                client_key_exchange,
            ))),
        ),
        should_encrypt: false,
        reset_local_sequence_number: false,
    });

    let server_key_exchange_data = cache.pull_and_merge(&[HandshakeCachePullRule {
        typ: HandshakeType::ServerKeyExchange,
        epoch: cfg.initial_epoch,
        is_client: false,
        optional: false,
    }]);

    // The ServerKeyExchange is optional for PSK: derive the premaster
    // secret without one when it never arrived.
    let mut server_key_exchange = ServerKeyExchange::Psk {
        identity_hint: Vec::new(),
    };
    if server_key_exchange_data.is_empty() {
        if let Err(pair) = handle_server_key_exchange(state, cfg, &server_key_exchange) {
            return Err(pair);
        }
    } else {
        let raw_handshake = match Handshake::unmarshal(&server_key_exchange_data) {
            Ok(raw_handshake) => raw_handshake,
            Err(err) => {
                return Err(fatal_alert(
                    AlertDescription::UnexpectedMessage,
                    Some(err.into()),
                ))
            }
        };
        match raw_handshake.handshake_message {
            HandshakeMessage::ServerKeyExchange(parsed) => server_key_exchange = parsed,
            _ => {
                return Err(fatal_alert(
                    AlertDescription::UnexpectedMessage,
                    Some(Error::InvalidContentType),
                ))
            }
        }
    }

    // Append the not yet sent packets to the transcript, with the
    // message sequences they will be assigned on send.
    let mut merged = Vec::new();
    let mut seq_pred = state.handshake_send_sequence as u16;
    for p in pkts.iter_mut() {
        let h = match p.record.content {
            Content::Handshake(ref mut h) => h,
            _ => {
                return Err(fatal_alert(
                    AlertDescription::InternalError,
                    Some(Error::InvalidContentType),
                ))
            }
        };
        h.handshake_header.message_sequence = seq_pred;
        seq_pred += 1;
        match h.marshal() {
            Ok(raw) => merged.extend_from_slice(&raw),
            Err(err) => {
                return Err(fatal_alert(AlertDescription::InternalError, Some(err.into())))
            }
        }
    }

    if let Err(pair) = initialize_cipher_suite(state, cache, cfg, &server_key_exchange, &merged) {
        return Err(pair);
    }

    // If the client has sent a certificate with signing ability, a
    // digitally-signed CertificateVerify message is sent to explicitly
    // verify possession of the private key in the certificate.
    if state.remote_requested_certificate && !cfg.local_certificates.is_empty() {
        let mut plaintext = cache.pull_and_merge(&prior_transcript_rules(cfg));
        plaintext.extend_from_slice(&merged);

        let private_key = match certificate {
            Some(ref certificate) => &certificate.private_key,
            None => {
                return Err(fatal_alert(
                    AlertDescription::InternalError,
                    Some(Error::NoCertificates),
                ))
            }
        };

        // Find compatible signature scheme
        let signature_hash_algo =
            match select_signature_scheme(&cfg.local_signature_schemes, private_key) {
                Ok(scheme) => scheme,
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::InsufficientSecurity, Some(err)))
                }
            };

        match cfg.crypto.generate_certificate_verify(
            &plaintext,
            private_key,
            signature_hash_algo.hash,
        ) {
            Ok(signature) => state.local_certificates_verify = signature,
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        }

        let mut p = Packet {
            record: RecordLayer::new(
                PROTOCOL_VERSION1_2,
                0,
                Content::Handshake(Handshake::new(HandshakeMessage::CertificateVerify(
                    CertificateVerify {
                        algorithm: signature_hash_algo,
                        signature: state.local_certificates_verify.clone(),
                    },
                ))),
            ),
            should_encrypt: false,
            reset_local_sequence_number: false,
        };

        if let Content::Handshake(ref mut h) = p.record.content {
            h.handshake_header.message_sequence = seq_pred;
            match h.marshal() {
                Ok(raw) => merged.extend_from_slice(&raw),
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::InternalError, Some(err.into())))
                }
            }
        }
        pkts.push(p);
    }

    pkts.push(Packet {
        record: RecordLayer::new(
            PROTOCOL_VERSION1_2,
            0,
            Content::ChangeCipherSpec(ChangeCipherSpec {}),
        ),
        should_encrypt: false,
        reset_local_sequence_number: false,
    });

    if state.local_verify_data.is_empty() {
        let mut plaintext = cache.pull_and_merge(&full_transcript_rules(cfg));
        plaintext.extend_from_slice(&merged);

        let hash_func = match state.cipher_suite.as_ref() {
            Some(suite) => suite.hash_func(),
            None => {
                return Err(fatal_alert(
                    AlertDescription::InternalError,
                    Some(Error::CipherSuiteUnset),
                ))
            }
        };
        match prf_verify_data_client(&state.master_secret, &plaintext, hash_func) {
            Ok(verify_data) => state.local_verify_data = verify_data,
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        }
    }

    pkts.push(Packet {
        record: RecordLayer::new(
            PROTOCOL_VERSION1_2,
            1,
            Content::Handshake(Handshake::new(HandshakeMessage::Finished(Finished {
                verify_data: state.local_verify_data.clone(),
            }))),
        ),
        should_encrypt: true,
        reset_local_sequence_number: true,
    });

    Ok(pkts)
}

fn initialize_cipher_suite(
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
    server_key_exchange: &ServerKeyExchange,
    sending_plaintext: &[u8],
) -> Result<(), (Option<::wire::Alert>, Option<Error>)> {
    let (initialized, hash_func) = match state.cipher_suite.as_ref() {
        Some(suite) => (suite.is_initialized(), suite.hash_func()),
        None => {
            return Err(fatal_alert(
                AlertDescription::InternalError,
                Some(Error::CipherSuiteUnset),
            ))
        }
    };
    if initialized {
        return Ok(());
    }

    let client_random = state.local_random.marshal_fixed();
    let server_random = state.remote_random.marshal_fixed();

    if state.extended_master_secret {
        let session_hash =
            match cache.session_hash(hash_func, cfg.initial_epoch, sending_plaintext) {
                Ok(session_hash) => session_hash,
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::InternalError, Some(err)))
                }
            };
        match prf_extended_master_secret(&state.pre_master_secret, &session_hash, hash_func) {
            Ok(master_secret) => state.master_secret = master_secret,
            Err(err) => {
                return Err(fatal_alert(AlertDescription::IllegalParameter, Some(err)))
            }
        }
    } else {
        match prf_master_secret(
            &state.pre_master_secret,
            &client_random,
            &server_random,
            hash_func,
        ) {
            Ok(master_secret) => state.master_secret = master_secret,
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        }
    }

    if cfg.local_psk_callback.is_none() {
        let (named_curve, public_key, algorithm, signature) = match server_key_exchange {
            &ServerKeyExchange::Ecdhe {
                named_curve,
                ref public_key,
                algorithm,
                ref signature,
            } => (named_curve, public_key, algorithm, signature),
            _ => {
                return Err(fatal_alert(
                    AlertDescription::UnexpectedMessage,
                    Some(Error::InvalidContentType),
                ))
            }
        };

        // Verify the hash and signature algorithm pair is listed locally.
        let valid_signature_scheme = cfg
            .local_signature_schemes
            .iter()
            .any(|scheme| *scheme == algorithm);
        if !valid_signature_scheme {
            return Err(fatal_alert(
                AlertDescription::InsufficientSecurity,
                Some(Error::NoAvailableSignatureSchemes),
            ));
        }

        let expected_msg =
            value_key_message(&client_random, &server_random, public_key, named_curve);
        if let Err(err) = cfg.crypto.verify_key_signature(
            &expected_msg,
            signature,
            algorithm.hash,
            &state.peer_certificates,
        ) {
            return Err(fatal_alert(AlertDescription::BadCertificate, Some(err)));
        }

        let mut chain_verified = false;
        if !cfg.insecure_skip_verify {
            if let Err(err) = cfg.crypto.verify_server_chain(
                &state.peer_certificates,
                &cfg.root_cas,
                &cfg.server_name,
            ) {
                return Err(fatal_alert(AlertDescription::BadCertificate, Some(err)));
            }
            chain_verified = true;
        }
        if let Some(verify_peer_certificate) = cfg.verify_peer_certificate {
            if let Err(err) = verify_peer_certificate(&state.peer_certificates, chain_verified) {
                return Err(fatal_alert(AlertDescription::BadCertificate, Some(err)));
            }
        }
        state.peer_certificates_verified = chain_verified;
    }

    let master_secret = state.master_secret.clone();
    if let Some(suite) = state.cipher_suite.as_mut() {
        if let Err(err) = suite.init(&master_secret, &client_random, &server_random, true) {
            return Err(fatal_alert(AlertDescription::InternalError, Some(err)));
        }
    }

    Ok(())
}
