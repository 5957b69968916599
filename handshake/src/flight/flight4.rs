use wire::handshake::ClientCertificateType;
use wire::{
    AlertDescription, Certificate, CertificateRequest, Content, Extension, Handshake,
    HandshakeMessage, HandshakeType, PointFormat, RecordLayer, ServerHello, ServerHelloDone,
    ServerKeyExchange, NamedCurve, PROTOCOL_VERSION1_2,
};
use wire::default_compression_methods;

use cache::{HandshakeCache, HandshakeCachePullRule};
use config::{ClientAuthType, ExtendedMasterSecretType, HandshakeConfig};
use crypto::{select_signature_scheme, value_key_message};
use ctx::Context;
use error::Error;
use prf::{prf_extended_master_secret, prf_master_secret, prf_psk_pre_master_secret};
use state::State;

use super::{fatal_alert, Flight, FlightConn, FlightResult, Packet};

pub fn parse(
    ctx: &Context,
    conn: &mut dyn FlightConn,
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Flight> {
    let (seq, mut msgs) = match cache.full_pull_map(
        state.handshake_recv_sequence,
        &[
            HandshakeCachePullRule {
                typ: HandshakeType::Certificate,
                epoch: cfg.initial_epoch,
                is_client: true,
                optional: true,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::ClientKeyExchange,
                epoch: cfg.initial_epoch,
                is_client: true,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::CertificateVerify,
                epoch: cfg.initial_epoch,
                is_client: true,
                optional: true,
            },
        ],
    ) {
        Some(pulled) => pulled,
        // No valid message received. Keep reading
        None => return Err((None, None)),
    };

    // Validate type
    let client_key_exchange = match msgs.remove(&HandshakeType::ClientKeyExchange) {
        Some(HandshakeMessage::ClientKeyExchange(client_key_exchange)) => client_key_exchange,
        _ => return Err(fatal_alert(AlertDescription::InternalError, None)),
    };

    if let Some(&HandshakeMessage::Certificate(ref certificate)) =
        msgs.get(&HandshakeType::Certificate)
    {
        state.peer_certificates = certificate.certificate.clone();
    }

    if let Some(&HandshakeMessage::CertificateVerify(ref certificate_verify)) =
        msgs.get(&HandshakeType::CertificateVerify)
    {
        if state.peer_certificates.is_empty() {
            return Err(fatal_alert(
                AlertDescription::NoCertificate,
                Some(Error::CertificateVerifyNoCertificate),
            ));
        }

        let plaintext = cache.pull_and_merge(&[
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
        ]);

        // Verify the hash and signature algorithm pair is listed locally.
        let valid_signature_scheme = cfg
            .local_signature_schemes
            .iter()
            .any(|scheme| *scheme == certificate_verify.algorithm);
        if !valid_signature_scheme {
            return Err(fatal_alert(
                AlertDescription::InsufficientSecurity,
                Some(Error::NoAvailableSignatureSchemes),
            ));
        }

        if let Err(err) = ctx.check() {
            return Err((None, Some(err)));
        }
        if let Err(err) = cfg.crypto.verify_certificate_verify(
            &plaintext,
            certificate_verify.algorithm.hash,
            &certificate_verify.signature,
            &state.peer_certificates,
        ) {
            return Err(fatal_alert(AlertDescription::BadCertificate, Some(err)));
        }

        let mut verified = false;
        if cfg.client_auth >= ClientAuthType::VerifyClientCertIfGiven {
            if let Err(err) = ctx.check() {
                return Err((None, Some(err)));
            }
            if let Err(err) = cfg
                .crypto
                .verify_client_chain(&state.peer_certificates, &cfg.client_cas)
            {
                return Err(fatal_alert(AlertDescription::BadCertificate, Some(err)));
            }
            verified = true;
        }
        if let Some(verify_peer_certificate) = cfg.verify_peer_certificate {
            if let Err(err) = ctx.check() {
                return Err((None, Some(err)));
            }
            if let Err(err) = verify_peer_certificate(&state.peer_certificates, verified) {
                return Err(fatal_alert(AlertDescription::BadCertificate, Some(err)));
            }
        }
        state.peer_certificates_verified = verified;
    }

    let (initialized, is_psk, hash_func) = match state.cipher_suite.as_ref() {
        Some(suite) => (suite.is_initialized(), suite.is_psk(), suite.hash_func()),
        None => {
            return Err(fatal_alert(
                AlertDescription::InternalError,
                Some(Error::CipherSuiteUnset),
            ))
        }
    };

    if !initialized {
        let server_random = state.local_random.marshal_fixed();
        let client_random = state.remote_random.marshal_fixed();

        if is_psk {
            let psk_callback = match cfg.local_psk_callback {
                Some(psk_callback) => psk_callback,
                None => {
                    return Err(fatal_alert(
                        AlertDescription::InternalError,
                        Some(Error::PskCallbackUnset),
                    ))
                }
            };
            let identity_hint: &[u8] = match client_key_exchange.identity_hint {
                Some(ref identity_hint) => identity_hint,
                None => {
                    return Err(fatal_alert(
                        AlertDescription::IllegalParameter,
                        Some(Error::KeyExchangeMismatch),
                    ))
                }
            };

            if let Err(err) = ctx.check() {
                return Err((None, Some(err)));
            }
            match psk_callback(identity_hint) {
                Ok(psk) => state.pre_master_secret = prf_psk_pre_master_secret(&psk),
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::InternalError, Some(err)))
                }
            }
        } else {
            let public_key: &[u8] = match client_key_exchange.public_key {
                Some(ref public_key) => public_key,
                None => {
                    return Err(fatal_alert(
                        AlertDescription::IllegalParameter,
                        Some(Error::KeyExchangeMismatch),
                    ))
                }
            };
            let private_key = match state.local_keypair {
                Some(ref keypair) => keypair.private_key.clone(),
                None => {
                    return Err(fatal_alert(
                        AlertDescription::InternalError,
                        Some(Error::KeypairUnset),
                    ))
                }
            };

            if let Err(err) = ctx.check() {
                return Err((None, Some(err)));
            }
            match cfg
                .crypto
                .pre_master_secret(public_key, &private_key, state.named_curve)
            {
                Ok(pre_master_secret) => state.pre_master_secret = pre_master_secret,
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::IllegalParameter, Some(err)))
                }
            }
        }

        if state.extended_master_secret {
            let session_hash = match cache.session_hash(hash_func, cfg.initial_epoch, &[]) {
                Ok(session_hash) => session_hash,
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::InternalError, Some(err)))
                }
            };
            match prf_extended_master_secret(&state.pre_master_secret, &session_hash, hash_func) {
                Ok(master_secret) => state.master_secret = master_secret,
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::InternalError, Some(err)))
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
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::InternalError, Some(err)))
                }
            }
        }

        let master_secret = state.master_secret.clone();
        if let Some(suite) = state.cipher_suite.as_mut() {
            if let Err(err) = suite.init(&master_secret, &client_random, &server_random, false) {
                return Err(fatal_alert(AlertDescription::InternalError, Some(err)));
            }
        }
    }

    // Now, encrypted packets can be handled
    if let Err(err) = ctx.check() {
        return Err((None, Some(err)));
    }
    if let Err(err) = conn.handle_queued_packets(ctx) {
        return Err(fatal_alert(AlertDescription::InternalError, Some(err)));
    }

    let (seq, mut msgs) = match cache.full_pull_map(
        seq,
        &[HandshakeCachePullRule {
            typ: HandshakeType::Finished,
            epoch: cfg.initial_epoch + 1,
            is_client: true,
            optional: false,
        }],
    ) {
        Some(pulled) => pulled,
        // No valid message received. Keep reading
        None => return Err((None, None)),
    };
    state.handshake_recv_sequence = seq;

    match msgs.remove(&HandshakeType::Finished) {
        Some(HandshakeMessage::Finished(_)) => {}
        _ => return Err(fatal_alert(AlertDescription::InternalError, None)),
    }

    match cfg.client_auth {
        ClientAuthType::RequireAnyClientCert => {
            if state.peer_certificates.is_empty() {
                return Err(fatal_alert(
                    AlertDescription::NoCertificate,
                    Some(Error::ClientCertificateRequired),
                ));
            }
        }
        ClientAuthType::VerifyClientCertIfGiven => {
            if !state.peer_certificates.is_empty() && !state.peer_certificates_verified {
                return Err(fatal_alert(
                    AlertDescription::BadCertificate,
                    Some(Error::ClientCertificateNotVerified),
                ));
            }
        }
        ClientAuthType::RequireAndVerifyClientCert => {
            if state.peer_certificates.is_empty() {
                return Err(fatal_alert(
                    AlertDescription::NoCertificate,
                    Some(Error::ClientCertificateRequired),
                ));
            }
            if !state.peer_certificates_verified {
                return Err(fatal_alert(
                    AlertDescription::BadCertificate,
                    Some(Error::ClientCertificateNotVerified),
                ));
            }
        }
        ClientAuthType::NoClientCert | ClientAuthType::RequestClientCert => {}
    }

    Ok(Flight::Flight6)
}

pub fn generate(
    state: &mut State,
    _cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Vec<Packet>> {
    let (is_psk, cipher_suite_id) = match state.cipher_suite.as_ref() {
        Some(suite) => (suite.is_psk(), suite.id()),
        None => {
            return Err(fatal_alert(
                AlertDescription::InternalError,
                Some(Error::CipherSuiteUnset),
            ))
        }
    };

    let mut extensions = Vec::new();
    if (cfg.extended_master_secret == ExtendedMasterSecretType::Request
        || cfg.extended_master_secret == ExtendedMasterSecretType::Require)
        && state.extended_master_secret
    {
        extensions.push(Extension::UseExtendedMasterSecret);
    }
    if let Some(profile) = state.srtp_protection_profile {
        extensions.push(Extension::UseSrtp {
            protection_profiles: vec![profile],
        });
    }
    if !is_psk {
        extensions.push(Extension::SupportedEllipticCurves {
            elliptic_curves: vec![NamedCurve::X25519, NamedCurve::P256, NamedCurve::P384],
        });
        extensions.push(Extension::SupportedPointFormats {
            point_formats: vec![PointFormat::UNCOMPRESSED],
        });
    }

    let mut pkts = Vec::new();

    pkts.push(Packet {
        record: RecordLayer::new(
            PROTOCOL_VERSION1_2,
            0,
            Content::Handshake(Handshake::new(HandshakeMessage::ServerHello(ServerHello {
                version: PROTOCOL_VERSION1_2,
                random: state.local_random,
                cipher_suite: cipher_suite_id,
                compression_method: default_compression_methods()[0],
                extensions,
            }))),
        ),
        should_encrypt: false,
        reset_local_sequence_number: false,
    });

    if !is_psk {
        let certificate = match cfg.get_certificate(&cfg.server_name) {
            Ok(certificate) => certificate,
            Err(err) => {
                return Err(fatal_alert(AlertDescription::HandshakeFailure, Some(err)))
            }
        };

        pkts.push(Packet {
            record: RecordLayer::new(
                PROTOCOL_VERSION1_2,
                0,
                Content::Handshake(Handshake::new(HandshakeMessage::Certificate(Certificate {
                    certificate: certificate.certificate.clone(),
                }))),
            ),
            should_encrypt: false,
            reset_local_sequence_number: false,
        });

        let server_random = state.local_random.marshal_fixed();
        let client_random = state.remote_random.marshal_fixed();

        let keypair = match state.local_keypair {
            Some(ref keypair) => keypair.clone(),
            None => {
                return Err(fatal_alert(
                    AlertDescription::InternalError,
                    Some(Error::KeypairUnset),
                ))
            }
        };

        // Find compatible signature scheme
        let signature_hash_algo =
            match select_signature_scheme(&cfg.local_signature_schemes, &certificate.private_key) {
                Ok(scheme) => scheme,
                Err(err) => {
                    return Err(fatal_alert(AlertDescription::InsufficientSecurity, Some(err)))
                }
            };

        let plaintext = value_key_message(
            &client_random,
            &server_random,
            &keypair.public_key,
            state.named_curve,
        );
        match cfg.crypto.generate_key_signature(
            &plaintext,
            &certificate.private_key,
            signature_hash_algo.hash,
        ) {
            Ok(signature) => state.local_key_signature = signature,
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        }

        pkts.push(Packet {
            record: RecordLayer::new(
                PROTOCOL_VERSION1_2,
                0,
                Content::Handshake(Handshake::new(HandshakeMessage::ServerKeyExchange(
                    ServerKeyExchange::Ecdhe {
                        named_curve: state.named_curve,
                        public_key: keypair.public_key.clone(),
                        algorithm: signature_hash_algo,
                        signature: state.local_key_signature.clone(),
                    },
                ))),
            ),
            should_encrypt: false,
            reset_local_sequence_number: false,
        });

        if cfg.client_auth > ClientAuthType::NoClientCert {
            pkts.push(Packet {
                record: RecordLayer::new(
                    PROTOCOL_VERSION1_2,
                    0,
                    Content::Handshake(Handshake::new(HandshakeMessage::CertificateRequest(
                        CertificateRequest {
                            certificate_types: vec![
                                ClientCertificateType::RSA_SIGN,
                                ClientCertificateType::ECDSA_SIGN,
                            ],
                            signature_hash_algorithms: cfg.local_signature_schemes.clone(),
                        },
                    ))),
                ),
                should_encrypt: false,
                reset_local_sequence_number: false,
            });
        }
    } else if let Some(ref identity_hint) = cfg.local_psk_identity_hint {
        // To help the client in selecting which identity to use, the
        // server can provide a PSK identity hint in the ServerKeyExchange
        // message. If no hint is provided, the message is omitted.
        // https://tools.ietf.org/html/rfc4279#section-2
        pkts.push(Packet {
            record: RecordLayer::new(
                PROTOCOL_VERSION1_2,
                0,
                Content::Handshake(Handshake::new(HandshakeMessage::ServerKeyExchange(
                    ServerKeyExchange::Psk {
                        identity_hint: identity_hint.clone(),
                    },
                ))),
            ),
            should_encrypt: false,
            reset_local_sequence_number: false,
        });
    }

    pkts.push(Packet {
        record: RecordLayer::new(
            PROTOCOL_VERSION1_2,
            0,
            Content::Handshake(Handshake::new(HandshakeMessage::ServerHelloDone(
                ServerHelloDone {},
            ))),
        ),
        should_encrypt: false,
        reset_local_sequence_number: false,
    });

    Ok(pkts)
}
