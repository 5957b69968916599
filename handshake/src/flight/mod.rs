use std::fmt;

use wire::{Alert, AlertDescription, AlertLevel, RecordLayer};

use cache::HandshakeCache;
use config::HandshakeConfig;
use ctx::Context;
use error::Error;
use state::State;

mod flight0;
mod flight1;
mod flight2;
mod flight3;
mod flight4;
mod flight5;
mod flight6;

#[cfg(test)]
mod flight_test;

/*
  DTLS messages are grouped into a series of message flights, according
  to the diagrams below.  Although each flight of messages may consist
  of a number of messages, they should be viewed as monolithic for the
  purpose of timeout and retransmission.
  https://tools.ietf.org/html/rfc4347#section-4.2.4

  Client                                          Server
  ------                                          ------
                                      Waiting                 Flight 0

  ClientHello             -------->                           Flight 1

                          <-------    HelloVerifyRequest      Flight 2

  ClientHello             -------->                           Flight 3

                                             ServerHello    \
                                            Certificate*     \
                                      ServerKeyExchange*      Flight 4
                                     CertificateRequest*     /
                          <--------      ServerHelloDone    /

  Certificate*                                              \
  ClientKeyExchange                                          \
  CertificateVerify*                                          Flight 5
  [ChangeCipherSpec]                                         /
  Finished                -------->                         /

                                      [ChangeCipherSpec]    \ Flight 6
                          <--------             Finished    /
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Flight0,
    Flight1,
    Flight2,
    Flight3,
    Flight4,
    Flight5,
    Flight6,
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Flight::Flight0 => write!(f, "Flight 0"),
            Flight::Flight1 => write!(f, "Flight 1"),
            Flight::Flight2 => write!(f, "Flight 2"),
            Flight::Flight3 => write!(f, "Flight 3"),
            Flight::Flight4 => write!(f, "Flight 4"),
            Flight::Flight5 => write!(f, "Flight 5"),
            Flight::Flight6 => write!(f, "Flight 6"),
        }
    }
}

/// One outbound record plus the flags the record layer needs to send it.
/// `reset_local_sequence_number` is the one way signal that the epoch just
/// changed and record sequence numbering restarts at zero.
#[derive(Debug, Clone)]
pub struct Packet {
    pub record: RecordLayer,
    pub should_encrypt: bool,
    pub reset_local_sequence_number: bool,
}

/// The narrow slice of the owning connection the flights call back into.
pub trait FlightConn {
    // notify transmits an alert to the peer.
    fn notify(
        &mut self,
        ctx: &Context,
        level: AlertLevel,
        description: AlertDescription,
    ) -> Result<(), Error>;

    // write_packets hands a generated batch to the record layer.
    fn write_packets(&mut self, ctx: &Context, packets: Vec<Packet>) -> Result<(), Error>;

    // handle_queued_packets drains packets that arrived before the cipher
    // suite was initialized and could not be decrypted at the time.
    fn handle_queued_packets(&mut self, ctx: &Context) -> Result<(), Error>;
}

/// Either side of a flight failure: an alert to best-effort transmit,
/// an error to surface, or both. `(None, None)` means not enough
/// messages arrived yet and the caller should keep reading.
pub type FlightResult<T> = Result<T, (Option<Alert>, Option<Error>)>;

impl Flight {
    pub fn is_last_send_flight(&self) -> bool {
        *self == Flight::Flight6
    }

    pub fn is_last_recv_flight(&self) -> bool {
        *self == Flight::Flight5
    }

    pub fn has_retransmit(&self) -> bool {
        match *self {
            Flight::Flight0 | Flight::Flight2 => false,
            _ => true,
        }
    }

    // parse consumes the cache and returns the next flight.
    pub fn parse(
        &self,
        ctx: &Context,
        conn: &mut dyn FlightConn,
        state: &mut State,
        cache: &HandshakeCache,
        cfg: &HandshakeConfig,
    ) -> FlightResult<Flight> {
        match *self {
            Flight::Flight0 => flight0::parse(ctx, conn, state, cache, cfg),
            Flight::Flight1 => flight1::parse(ctx, conn, state, cache, cfg),
            Flight::Flight2 => flight2::parse(ctx, conn, state, cache, cfg),
            Flight::Flight3 => flight3::parse(ctx, conn, state, cache, cfg),
            Flight::Flight4 => flight4::parse(ctx, conn, state, cache, cfg),
            Flight::Flight5 => flight5::parse(ctx, conn, state, cache, cfg),
            Flight::Flight6 => flight6::parse(ctx, conn, state, cache, cfg),
        }
    }

    // generate drains state and cache into the outbound packet batch for
    // this flight. Pure over state: it never suspends.
    pub fn generate(
        &self,
        state: &mut State,
        cache: &HandshakeCache,
        cfg: &HandshakeConfig,
    ) -> FlightResult<Vec<Packet>> {
        match *self {
            Flight::Flight0 => flight0::generate(state, cache, cfg),
            Flight::Flight1 => flight1::generate(state, cache, cfg),
            Flight::Flight2 => flight2::generate(state, cache, cfg),
            Flight::Flight3 => flight3::generate(state, cache, cfg),
            Flight::Flight4 => flight4::generate(state, cache, cfg),
            Flight::Flight5 => flight5::generate(state, cache, cfg),
            Flight::Flight6 => flight6::generate(state, cache, cfg),
        }
    }
}

// fatal_alert pairs an alert description with an optional error, the
// shape every failing flight branch produces.
fn fatal_alert(description: AlertDescription, err: Option<Error>) -> (Option<Alert>, Option<Error>) {
    (
        Some(Alert {
            alert_level: AlertLevel::Fatal,
            alert_description: description,
        }),
        err,
    )
}
