use std::collections::HashMap;

use wire::{Handshake, HandshakeMessage, HandshakeType, HashAlgorithm};

use error::Error;

#[cfg(test)]
mod cache_test;

/// One rule of a cache pull: which message type, at which epoch, from
/// which sender, and whether its absence fails the pull.
#[derive(Debug, Clone, Copy)]
pub struct HandshakeCachePullRule {
    pub typ: HandshakeType,
    pub epoch: u16,
    pub is_client: bool,
    pub optional: bool,
}

struct HandshakeCacheItem {
    typ: HandshakeType,
    is_client: bool,
    epoch: u16,
    message_sequence: u16,
    data: Vec<u8>,
}

/// Append-only log of the raw handshake messages both sides have
/// exchanged, feeding message dispatch and every transcript computation.
pub struct HandshakeCache {
    cache: Vec<HandshakeCacheItem>,
}

impl HandshakeCache {
    pub fn new() -> Self {
        HandshakeCache { cache: Vec::new() }
    }

    // push stores one canonical (non-fragmented) message. A message with
    // the same sequence from the same sender replaces the earlier entry,
    // a late authoritative reassembly wins.
    pub fn push(
        &mut self,
        data: Vec<u8>,
        epoch: u16,
        message_sequence: u16,
        typ: HandshakeType,
        is_client: bool,
    ) {
        for item in self.cache.iter_mut() {
            if item.message_sequence == message_sequence && item.is_client == is_client {
                item.typ = typ;
                item.epoch = epoch;
                item.data = data;
                return;
            }
        }

        self.cache.push(HandshakeCacheItem {
            typ,
            is_client,
            epoch,
            message_sequence,
            data,
        });
    }

    // pull returns the raw bytes matching each rule, or None per rule
    // when no message matches. When several match, the lowest message
    // sequence wins.
    fn pull(&self, rules: &[HandshakeCachePullRule]) -> Vec<Option<&HandshakeCacheItem>> {
        rules
            .iter()
            .map(|rule| {
                let mut found: Option<&HandshakeCacheItem> = None;
                for item in &self.cache {
                    if item.typ == rule.typ
                        && item.is_client == rule.is_client
                        && item.epoch == rule.epoch
                    {
                        match found {
                            None => found = Some(item),
                            Some(prior) if item.message_sequence < prior.message_sequence => {
                                found = Some(item)
                            }
                            _ => {}
                        }
                    }
                }
                found
            })
            .collect()
    }

    // full_pull_map parses the message for every rule, requiring the
    // matched messages to sit at consecutive sequences from start_seq in
    // rule order. None means some messages have not arrived yet.
    pub fn full_pull_map(
        &self,
        start_seq: u64,
        rules: &[HandshakeCachePullRule],
    ) -> Option<(u64, HashMap<HandshakeType, HandshakeMessage>)> {
        // Messages below the cursor were consumed by an earlier flight
        // and must not match again, a retransmitted ClientHello would
        // otherwise shadow the cookie bearing one forever.
        let items: Vec<Option<&HandshakeCacheItem>> = rules
            .iter()
            .map(|rule| {
                let mut found: Option<&HandshakeCacheItem> = None;
                for item in &self.cache {
                    if item.typ == rule.typ
                        && item.is_client == rule.is_client
                        && item.epoch == rule.epoch
                        && u64::from(item.message_sequence) >= start_seq
                    {
                        match found {
                            None => found = Some(item),
                            Some(prior) if item.message_sequence < prior.message_sequence => {
                                found = Some(item)
                            }
                            _ => {}
                        }
                    }
                }
                found
            })
            .collect();

        for (rule, item) in rules.iter().zip(items.iter()) {
            if !rule.optional && item.is_none() {
                // Missing mandatory message, can not continue.
                return None;
            }
        }

        let mut out = HashMap::new();
        let mut seq = start_seq;
        for item in items.into_iter() {
            let item = match item {
                Some(item) => item,
                None => continue,
            };

            let parsed = match Handshake::unmarshal(&item.data) {
                Ok(parsed) => parsed,
                Err(_) => return None,
            };
            if seq != u64::from(parsed.handshake_header.message_sequence) {
                // There is a gap. Some messages have not arrived.
                return None;
            }
            seq += 1;
            out.insert(item.typ, parsed.handshake_message);
        }

        Some((seq, out))
    }

    // pull_and_merge concatenates the raw bytes of every matching message
    // in rule order. This is the transcript hash input.
    pub fn pull_and_merge(&self, rules: &[HandshakeCachePullRule]) -> Vec<u8> {
        let mut merged = Vec::new();
        for item in self.pull(rules).into_iter() {
            if let Some(item) = item {
                merged.extend_from_slice(&item.data);
            }
        }
        merged
    }

    // session_hash digests the canonical transcript through
    // ClientKeyExchange, used for the extended master secret.
    // https://tools.ietf.org/html/rfc7627#section-3
    pub fn session_hash(
        &self,
        hash: HashAlgorithm,
        epoch: u16,
        additional: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut merged = self.pull_and_merge(&[
            HandshakeCachePullRule {
                typ: HandshakeType::ClientHello,
                epoch,
                is_client: true,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::ServerHello,
                epoch,
                is_client: false,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::Certificate,
                epoch,
                is_client: false,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::ServerKeyExchange,
                epoch,
                is_client: false,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::CertificateRequest,
                epoch,
                is_client: false,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::ServerHelloDone,
                epoch,
                is_client: false,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::Certificate,
                epoch,
                is_client: true,
                optional: false,
            },
            HandshakeCachePullRule {
                typ: HandshakeType::ClientKeyExchange,
                epoch,
                is_client: true,
                optional: false,
            },
        ]);
        merged.extend_from_slice(additional);

        Ok(hash.digest(&merged)?)
    }
}
