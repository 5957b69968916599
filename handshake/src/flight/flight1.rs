use wire::{
    default_compression_methods, AlertDescription, ClientHello, Content, Extension, Handshake,
    HandshakeMessage, HandshakeType, NamedCurve, PointFormat, RecordLayer, PROTOCOL_VERSION1_0,
    PROTOCOL_VERSION1_2,
};

use cache::{HandshakeCache, HandshakeCachePullRule};
use config::{ExtendedMasterSecretType, HandshakeConfig};
use ctx::Context;
use error::Error;
use state::State;

use super::{fatal_alert, flight3, Flight, FlightConn, FlightResult, Packet};

pub fn parse(
    ctx: &Context,
    conn: &mut dyn FlightConn,
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Flight> {
    // HelloVerifyRequest can be skipped by the server, so allow
    // a ServerHello during flight one as well.
    let (seq, msgs) = match cache.full_pull_map(
        state.handshake_recv_sequence,
        &[
            HandshakeCachePullRule {
                typ: HandshakeType::HelloVerifyRequest,
                epoch: cfg.initial_epoch,
                is_client: false,
                optional: true,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::ServerHello,
                epoch: cfg.initial_epoch,
                is_client: false,
                optional: true,
            },
        ],
    ) {
        Some(pulled) => pulled,
        None => return Err((None, None)),
    };

    if msgs.contains_key(&HandshakeType::ServerHello) {
        // Flight 2 was skipped, parse as flight 3.
        return flight3::parse(ctx, conn, state, cache, cfg);
    }

    match msgs.get(&HandshakeType::HelloVerifyRequest) {
        Some(&HandshakeMessage::HelloVerifyRequest(ref hello_verify_request)) => {
            // DTLS 1.2 clients must not assume the server will use the
            // protocol version specified here. RFC 6347 Section 4.2.1
            if hello_verify_request.version != PROTOCOL_VERSION1_0
                && hello_verify_request.version != PROTOCOL_VERSION1_2
            {
                return Err(fatal_alert(
                    AlertDescription::ProtocolVersion,
                    Some(Error::UnsupportedProtocolVersion),
                ));
            }

            state.cookie = hello_verify_request.cookie.clone();
            state.handshake_recv_sequence = seq;
            Ok(Flight::Flight3)
        }
        Some(_) => Err(fatal_alert(AlertDescription::InternalError, None)),
        None => Err((None, None)),
    }
}

pub fn generate(
    state: &mut State,
    _cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Vec<Packet>> {
    state.local_epoch = 0;
    state.remote_epoch = 0;
    state.named_curve = ::wire::DEFAULT_NAMED_CURVE;
    state.cookie = Vec::new();
    state.local_random.populate();

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

// hello_extensions builds the extension set both ClientHello flights
// advertise.
pub fn hello_extensions(cfg: &HandshakeConfig) -> Vec<Extension> {
    let mut extensions = vec![
        Extension::SupportedSignatureAlgorithms {
            signature_hash_algorithms: cfg.local_signature_schemes.clone(),
        },
        Extension::RenegotiationInfo,
    ];

    if cfg.local_psk_callback.is_none() {
        extensions.push(Extension::SupportedEllipticCurves {
            elliptic_curves: vec![NamedCurve::P256, NamedCurve::X25519, NamedCurve::P384],
        });
        extensions.push(Extension::SupportedPointFormats {
            point_formats: vec![PointFormat::UNCOMPRESSED],
        });
    }

    if !cfg.local_srtp_protection_profiles.is_empty() {
        extensions.push(Extension::UseSrtp {
            protection_profiles: cfg.local_srtp_protection_profiles.clone(),
        });
    }

    if cfg.extended_master_secret == ExtendedMasterSecretType::Request
        || cfg.extended_master_secret == ExtendedMasterSecretType::Require
    {
        extensions.push(Extension::UseExtendedMasterSecret);
    }

    extensions
}
