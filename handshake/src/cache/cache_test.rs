use super::*;
use wire::{Finished, Handshake, HandshakeMessage, ServerHelloDone};

fn message(typ: HandshakeType, message_sequence: u16) -> Vec<u8> {
    let body = match typ {
        HandshakeType::Finished => HandshakeMessage::Finished(Finished {
            verify_data: vec![message_sequence as u8; 12],
        }),
        _ => HandshakeMessage::ServerHelloDone(ServerHelloDone {}),
    };

    let mut handshake = Handshake::new(body);
    handshake.handshake_header.message_sequence = message_sequence;
    handshake.marshal().unwrap()
}

fn rule(typ: HandshakeType, epoch: u16, is_client: bool, optional: bool) -> HandshakeCachePullRule {
    HandshakeCachePullRule {
        typ,
        epoch,
        is_client,
        optional,
    }
}

#[test]
fn full_pull_map_requires_mandatory_messages() {
    let mut cache = HandshakeCache::new();
    cache.push(message(HandshakeType::ServerHelloDone, 0), 0, 0, HandshakeType::ServerHelloDone, false);

    assert!(cache
        .full_pull_map(0, &[rule(HandshakeType::Finished, 0, false, false)])
        .is_none());

    // An optional missing rule does not fail the pull.
    let (seq, msgs) = cache
        .full_pull_map(
            0,
            &[
                rule(HandshakeType::ServerHelloDone, 0, false, false),
                rule(HandshakeType::Finished, 0, false, true),
            ],
        )
        .unwrap();
    assert_eq!(seq, 1);
    assert_eq!(msgs.len(), 1);
}

#[test]
fn full_pull_map_rejects_sequence_gaps() {
    let mut cache = HandshakeCache::new();
    cache.push(message(HandshakeType::ServerHelloDone, 0), 0, 0, HandshakeType::ServerHelloDone, false);
    cache.push(message(HandshakeType::Finished, 2), 1, 2, HandshakeType::Finished, false);

    assert!(cache
        .full_pull_map(
            0,
            &[
                rule(HandshakeType::ServerHelloDone, 0, false, false),
                rule(HandshakeType::Finished, 1, false, false),
            ],
        )
        .is_none());
}

#[test]
fn full_pull_map_advances_monotonically() {
    let mut cache = HandshakeCache::new();
    cache.push(message(HandshakeType::ServerHelloDone, 0), 0, 0, HandshakeType::ServerHelloDone, false);

    let (seq, _) = cache
        .full_pull_map(0, &[rule(HandshakeType::ServerHelloDone, 0, false, false)])
        .unwrap();
    assert_eq!(seq, 1);

    cache.push(message(HandshakeType::Finished, 1), 1, 1, HandshakeType::Finished, false);
    let (seq, _) = cache
        .full_pull_map(seq, &[rule(HandshakeType::Finished, 1, false, false)])
        .unwrap();
    assert_eq!(seq, 2);
}

#[test]
fn duplicate_slot_is_replaced() {
    let mut cache = HandshakeCache::new();
    cache.push(vec![1, 2, 3], 0, 5, HandshakeType::Finished, true);
    cache.push(vec![9, 9, 9], 0, 5, HandshakeType::Finished, true);

    let merged = cache.pull_and_merge(&[rule(HandshakeType::Finished, 0, true, false)]);
    assert_eq!(merged, vec![9, 9, 9]);
}

#[test]
fn pull_and_merge_is_rule_ordered_and_insertion_independent() {
    let rules = [
        rule(HandshakeType::ServerHelloDone, 0, false, false),
        rule(HandshakeType::Finished, 0, true, false),
    ];

    let mut forward = HandshakeCache::new();
    forward.push(vec![0xaa], 0, 0, HandshakeType::ServerHelloDone, false);
    forward.push(vec![0xbb], 0, 1, HandshakeType::Finished, true);

    let mut backward = HandshakeCache::new();
    backward.push(vec![0xbb], 0, 1, HandshakeType::Finished, true);
    backward.push(vec![0xaa], 0, 0, HandshakeType::ServerHelloDone, false);

    assert_eq!(forward.pull_and_merge(&rules), vec![0xaa, 0xbb]);
    assert_eq!(backward.pull_and_merge(&rules), vec![0xaa, 0xbb]);
}

#[test]
fn session_hash_includes_additional_plaintext() {
    let mut cache = HandshakeCache::new();
    let mut seq = 0u16;
    for &(typ, is_client) in &[
        (HandshakeType::ClientHello, true),
        (HandshakeType::ServerHello, false),
        (HandshakeType::Certificate, false),
        (HandshakeType::ServerKeyExchange, false),
        (HandshakeType::CertificateRequest, false),
        (HandshakeType::ServerHelloDone, false),
        (HandshakeType::Certificate, true),
        (HandshakeType::ClientKeyExchange, true),
    ] {
        // The hash walks raw bytes, the bodies do not have to parse.
        cache.push(vec![typ.as_u8(), seq as u8], 0, seq, typ, is_client);
        seq += 1;
    }

    let plain = cache.session_hash(::wire::HashAlgorithm::Sha256, 0, &[]).unwrap();
    let extended = cache
        .session_hash(::wire::HashAlgorithm::Sha256, 0, &[1, 2, 3])
        .unwrap();

    assert_eq!(plain.len(), 32);
    assert_ne!(plain, extended);
}
