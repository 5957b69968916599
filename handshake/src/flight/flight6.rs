use wire::{
    AlertDescription, ChangeCipherSpec, Content, Finished, Handshake, HandshakeMessage,
    HandshakeType, RecordLayer, PROTOCOL_VERSION1_2,
};

use cache::{HandshakeCache, HandshakeCachePullRule};
use config::HandshakeConfig;
use ctx::Context;
use error::Error;
use prf::prf_verify_data_server;
use state::State;

use super::{fatal_alert, Flight, FlightConn, FlightResult, Packet};

pub fn parse(
    _ctx: &Context,
    _conn: &mut dyn FlightConn,
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Flight> {
    let (_, mut msgs) = match cache.full_pull_map(
        state.handshake_recv_sequence - 1,
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

    match msgs.remove(&HandshakeType::Finished) {
        Some(HandshakeMessage::Finished(_)) => {}
        _ => return Err(fatal_alert(AlertDescription::InternalError, None)),
    }

    // The other party retransmitted the last flight.
    Ok(Flight::Flight6)
}

pub fn generate(
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Vec<Packet>> {
    let mut pkts = vec![Packet {
        record: RecordLayer::new(
            PROTOCOL_VERSION1_2,
            0,
            Content::ChangeCipherSpec(ChangeCipherSpec {}),
        ),
        should_encrypt: false,
        reset_local_sequence_number: false,
    }];

    if state.local_verify_data.is_empty() {
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
            HandshakeCachePullRule {
                typ: HandshakeType::CertificateVerify,
                epoch: cfg.initial_epoch,
                is_client: true,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::Finished,
                epoch: cfg.initial_epoch + 1,
                is_client: true,
                optional: false,
            },
        ]);

        let hash_func = match state.cipher_suite.as_ref() {
            Some(suite) => suite.hash_func(),
            None => {
                return Err(fatal_alert(
                    AlertDescription::InternalError,
                    Some(Error::CipherSuiteUnset),
                ))
            }
        };
        match prf_verify_data_server(&state.master_secret, &plaintext, hash_func) {
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
