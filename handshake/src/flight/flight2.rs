use wire::{
    AlertDescription, Content, Handshake, HandshakeMessage, HandshakeType, HelloVerifyRequest,
    RecordLayer, PROTOCOL_VERSION1_2,
};

use cache::{HandshakeCache, HandshakeCachePullRule};
use config::HandshakeConfig;
use ctx::Context;
use error::Error;
use state::State;

use super::{fatal_alert, Flight, FlightConn, FlightResult, Packet};

pub fn parse(
    _ctx: &Context,
    _conn: &mut dyn FlightConn,
    state: &mut State,
    cache: &HandshakeCache,
    cfg: &HandshakeConfig,
) -> FlightResult<Flight> {
    let (seq, mut msgs) = match cache.full_pull_map(
        state.handshake_recv_sequence,
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

    let client_hello = match msgs.remove(&HandshakeType::ClientHello) {
        Some(HandshakeMessage::ClientHello(client_hello)) => client_hello,
        _ => return Err(fatal_alert(AlertDescription::InternalError, None)),
    };

    if client_hello.cookie.is_empty() {
        // The client retransmitted its first hello, the verify request
        // was probably lost. Send it again.
        return Ok(Flight::Flight2);
    }

    if state.cookie != client_hello.cookie {
        return Err(fatal_alert(
            AlertDescription::AccessDenied,
            Some(Error::CookieMismatch),
        ));
    }

    state.handshake_recv_sequence = seq;
    Ok(Flight::Flight4)
}

pub fn generate(
    state: &mut State,
    _cache: &HandshakeCache,
    _cfg: &HandshakeConfig,
) -> FlightResult<Vec<Packet>> {
    state.handshake_send_sequence = 0;

    Ok(vec![Packet {
        record: RecordLayer::new(
            PROTOCOL_VERSION1_2,
            0,
            Content::Handshake(Handshake::new(HandshakeMessage::HelloVerifyRequest(
                HelloVerifyRequest {
                    version: PROTOCOL_VERSION1_2,
                    cookie: state.cookie.clone(),
                },
            ))),
        ),
        should_encrypt: false,
        reset_local_sequence_number: false,
    }])
}
