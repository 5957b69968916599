use wire::{
    AlertDescription, Extension, HandshakeMessage, HandshakeType, PROTOCOL_VERSION1_2,
};

use cache::{HandshakeCache, HandshakeCachePullRule};
use cipher_suite::cipher_suite_for_id;
use config::{ExtendedMasterSecretType, HandshakeConfig};
use ctx::Context;
use error::Error;
use state::State;

use super::{fatal_alert, Flight, FlightConn, FlightResult, Packet};

pub fn parse(
    ctx: &Context,
    _conn: &mut dyn FlightConn,
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Flight> {
    let (seq, mut msgs) = match cache.full_pull_map(
        0,
        &[HandshakeCachePullRule {
            typ: HandshakeType::ClientHello,
            epoch: cfg.initial_epoch,
            is_client: true,
            optional: false,
        }],
    ) {
        Some(pulled) => pulled,
        // No valid message received. Keep reading
        None => return Err((None, None)),
    };
    state.handshake_recv_sequence = seq;

    let client_hello = match msgs.remove(&HandshakeType::ClientHello) {
        Some(HandshakeMessage::ClientHello(client_hello)) => client_hello,
        _ => return Err(fatal_alert(AlertDescription::InternalError, None)),
    };

    if client_hello.version != PROTOCOL_VERSION1_2 {
        return Err(fatal_alert(
            AlertDescription::ProtocolVersion,
            Some(Error::UnsupportedProtocolVersion),
        ));
    }

    state.remote_random = client_hello.random;
    state.local_random.populate();

    // Select the first locally configured suite the client offered.
    let selected = cfg
        .local_cipher_suite_ids
        .iter()
        .find(|id| client_hello.cipher_suites.contains(id));
    match selected {
        Some(&id) => match cipher_suite_for_id(id) {
            Ok(suite) => state.cipher_suite = Some(suite),
            Err(err) => {
                return Err(fatal_alert(AlertDescription::InsufficientSecurity, Some(err)))
            }
        },
        None => {
            return Err(fatal_alert(
                AlertDescription::InsufficientSecurity,
                Some(Error::CipherSuiteNoIntersection),
            ))
        }
    }

    for extension in &client_hello.extensions {
        match extension {
            &Extension::SupportedEllipticCurves { ref elliptic_curves } => {
                if elliptic_curves.is_empty() {
                    return Err(fatal_alert(
                        AlertDescription::InsufficientSecurity,
                        Some(Error::NoSupportedEllipticCurves),
                    ));
                }
                state.named_curve = elliptic_curves[0];
            }
            &Extension::UseSrtp { ref protection_profiles } => {
                let matching = cfg
                    .local_srtp_protection_profiles
                    .iter()
                    .find(|profile| protection_profiles.contains(profile));
                match matching {
                    Some(&profile) => state.srtp_protection_profile = Some(profile),
                    None => {
                        return Err(fatal_alert(
                            AlertDescription::InsufficientSecurity,
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
            Some(Error::ServerRequiredButNoClientEms),
        ));
    }

    if state.local_keypair.is_none() {
        if let Err(err) = ctx.check() {
            return Err((None, Some(err)));
        }
        match cfg.crypto.generate_key_pair(state.named_curve) {
            Ok(keypair) => state.local_keypair = Some(keypair),
            Err(err) => return Err(fatal_alert(AlertDescription::InternalError, Some(err))),
        }
    }

    Ok(Flight::Flight2)
}

pub fn generate(
    _state: &mut State,
    _cache: &HandshakeCache,
    _cfg: &HandshakeConfig,
) -> FlightResult<Vec<Packet>> {
    // The server stays silent until a ClientHello arrives.
    Ok(Vec::new())
}
