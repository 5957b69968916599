use std::fmt;

use wire::Content;

use cache::HandshakeCache;
use config::HandshakeConfig;
use ctx::Context;
use error::Error;
use flight::{Flight, FlightConn, Packet};
use state::State;

// [RFC6347 Section-4.2.4]
//                      +-----------+
//                +---> | PREPARING | <--------------------+
//                |     +-----------+                      |
//                |           |                            |
//                |           | Buffer next flight         |
//                |           |                            |
//                |          \|/                           |
//                |     +-----------+                      |
//                |     |  SENDING  |<------------------+  |
//                |     +-----------+                   |  |
//        Receive |           |                         |  |
//           next |           | Send flight             |  |
//         flight |  +--------+                         |  |
//                |  |        | Set retransmit timer    |  |
//                |  |       \|/                        |  |
//                |  |  +-----------+                   |  |
//                +--)--|  WAITING  |-------------------+  |
//                |  |  +-----------+   Timer expires   |  |
//                |  |         |                        |  |
//                |  |         +------------------------+  |
//        Receive |  | Send           Read retransmit      |
//           last |  | last                                |
//         flight |  | flight                              |
//                |  |                                     |
//               \|/\|/                                    |
//            +-----------+                                |
//            | FINISHED  | -------------------------------+
//            +-----------+
//                 |  /|\
//                 |   |
//                 +---+
//              Read retransmit
//           Retransmit last flight

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Preparing,
    Sending,
    Waiting,
    Finished,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HandshakeState::Preparing => write!(f, "Preparing"),
            HandshakeState::Sending => write!(f, "Sending"),
            HandshakeState::Waiting => write!(f, "Waiting"),
            HandshakeState::Finished => write!(f, "Finished"),
        }
    }
}

pub fn srv_cli_str(is_client: bool) -> &'static str {
    if is_client {
        "client"
    } else {
        "server"
    }
}

/// Drives the flight state machine for one connection. Timers stay with
/// the owner: it calls `run` to start, `on_handshake_message` whenever
/// freshly reassembled messages have been cached, and
/// `on_retransmit_timeout` when its timer fires.
pub struct HandshakeFsm {
    current_flight: Flight,
    flights: Vec<Packet>,
    retransmit: bool,
    handshake_state: HandshakeState,
}

impl HandshakeFsm {
    pub fn new(is_client: bool) -> Self {
        HandshakeFsm {
            current_flight: if is_client {
                Flight::Flight1
            } else {
                Flight::Flight0
            },
            flights: Vec::new(),
            retransmit: false,
            handshake_state: HandshakeState::Preparing,
        }
    }

    pub fn current_flight(&self) -> Flight {
        self.current_flight
    }

    pub fn handshake_state(&self) -> HandshakeState {
        self.handshake_state
    }

    pub fn is_finished(&self) -> bool {
        self.handshake_state == HandshakeState::Finished
    }

    // run advances the machine until it blocks waiting for the peer or
    // the handshake completes.
    pub fn run(
        &mut self,
        ctx: &Context,
        conn: &mut dyn FlightConn,
        state: &mut State,
        cache: &mut HandshakeCache,
        cfg: &HandshakeConfig,
    ) -> Result<HandshakeState, Error> {
        loop {
            trace!(
                "[handshake:{}] {}: {}",
                srv_cli_str(state.is_client),
                self.current_flight,
                self.handshake_state
            );
            match self.handshake_state {
                HandshakeState::Preparing => self.prepare(ctx, conn, state, cache, cfg)?,
                HandshakeState::Sending => self.send(ctx, conn, state, cache)?,
                HandshakeState::Waiting | HandshakeState::Finished => {
                    return Ok(self.handshake_state)
                }
            }
        }
    }

    // on_handshake_message parses the current flight after new messages
    // have been cached and moves the machine forward.
    pub fn on_handshake_message(
        &mut self,
        ctx: &Context,
        conn: &mut dyn FlightConn,
        state: &mut State,
        cache: &mut HandshakeCache,
        cfg: &HandshakeConfig,
    ) -> Result<HandshakeState, Error> {
        let next = match self.current_flight.parse(ctx, conn, state, cache, cfg) {
            Ok(next) => next,
            Err((alert, err)) => {
                if let Some(alert) = alert {
                    conn.notify(ctx, alert.alert_level, alert.alert_description)?;
                }
                return match err {
                    Some(err) => Err(err),
                    // Not enough messages arrived yet, keep reading.
                    None => Ok(self.handshake_state),
                };
            }
        };

        trace!(
            "[handshake:{}] {} -> {}",
            srv_cli_str(state.is_client),
            self.current_flight,
            next
        );

        if next == self.current_flight && self.handshake_state == HandshakeState::Finished {
            // The peer retransmitted its final flight, resend ours as is.
            self.handshake_state = HandshakeState::Sending;
            return self.run(ctx, conn, state, cache, cfg);
        }

        if next.is_last_recv_flight() && next == self.current_flight {
            self.handshake_state = HandshakeState::Finished;
            return Ok(self.handshake_state);
        }

        self.current_flight = next;
        self.handshake_state = HandshakeState::Preparing;
        self.run(ctx, conn, state, cache, cfg)
    }

    // on_retransmit_timeout resends the current flight, when it is one
    // that retransmits at all.
    pub fn on_retransmit_timeout(
        &mut self,
        ctx: &Context,
        conn: &mut dyn FlightConn,
        state: &mut State,
        cache: &mut HandshakeCache,
    ) -> Result<(), Error> {
        if !self.retransmit {
            return Ok(());
        }
        self.write_pending(ctx, conn, state, cache)
    }

    fn prepare(
        &mut self,
        ctx: &Context,
        conn: &mut dyn FlightConn,
        state: &mut State,
        cache: &HandshakeCache,
        cfg: &HandshakeConfig,
    ) -> Result<(), Error> {
        self.flights.clear();
        self.retransmit = self.current_flight.has_retransmit();

        let mut pkts = match self.current_flight.generate(state, cache, cfg) {
            Ok(pkts) => pkts,
            Err((alert, err)) => {
                if let Some(alert) = alert {
                    conn.notify(ctx, alert.alert_level, alert.alert_description)?;
                }
                if let Some(err) = err {
                    return Err(err);
                }
                Vec::new()
            }
        };

        let epoch = cfg.initial_epoch;
        let mut next_epoch = epoch;
        for p in pkts.iter_mut() {
            p.record.record_layer_header.epoch += epoch;
            if p.record.record_layer_header.epoch > next_epoch {
                next_epoch = p.record.record_layer_header.epoch;
            }
            if let Content::Handshake(ref mut h) = p.record.content {
                h.handshake_header.message_sequence = state.handshake_send_sequence as u16;
                state.handshake_send_sequence += 1;
            }
        }
        if epoch != next_epoch {
            trace!(
                "[handshake:{}] -> changeCipherSpec (epoch: {})",
                srv_cli_str(state.is_client),
                next_epoch
            );
            state.local_epoch = next_epoch;
        }

        self.flights = pkts;
        self.handshake_state = HandshakeState::Sending;
        Ok(())
    }

    fn send(
        &mut self,
        ctx: &Context,
        conn: &mut dyn FlightConn,
        state: &mut State,
        cache: &mut HandshakeCache,
    ) -> Result<(), Error> {
        self.write_pending(ctx, conn, state, cache)?;

        self.handshake_state = if self.current_flight.is_last_send_flight() {
            HandshakeState::Finished
        } else {
            HandshakeState::Waiting
        };
        Ok(())
    }

    fn write_pending(
        &self,
        ctx: &Context,
        conn: &mut dyn FlightConn,
        state: &State,
        cache: &mut HandshakeCache,
    ) -> Result<(), Error> {
        // The transcript pulls read sent and received messages alike, so
        // outbound handshake messages land in the cache before they hit
        // the wire.
        for p in &self.flights {
            if let Content::Handshake(ref h) = p.record.content {
                let raw = h.marshal()?;
                cache.push(
                    raw,
                    p.record.record_layer_header.epoch,
                    h.handshake_header.message_sequence,
                    h.handshake_message.handshake_type(),
                    state.is_client,
                );
            }
        }

        conn.write_packets(ctx, self.flights.clone())
    }
}
