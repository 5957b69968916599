use std::collections::HashMap;

use wire::{
    ContentType, HandshakeHeader, RecordLayerHeader, HANDSHAKE_HEADER_LENGTH,
    RECORD_LAYER_HEADER_SIZE,
};

use error::Error;


// 2 mb max buffer size
const FRAGMENT_BUFFER_MAX_SIZE: usize = 2_000_000;

struct Fragment {
    record_layer_header: RecordLayerHeader,
    handshake_header: HandshakeHeader,
    data: Vec<u8>,
}

/// Reassembles fragmented handshake messages, yielding whole messages
/// strictly in message sequence order.
pub struct FragmentBuffer {
    // map of message sequence numbers that hold slices of fragments
    cache: HashMap<u16, Vec<Fragment>>,

    current_message_sequence_number: u16,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        FragmentBuffer {
            cache: HashMap::new(),
            current_message_sequence_number: 0,
        }
    }

    // push attempts to absorb a DTLS packet. Returning false means the
    // record is not a handshake and the caller handles it itself; an error
    // is fatal for the connection.
    pub fn push(&mut self, buf: &[u8]) -> Result<bool, Error> {
        let current_size = self.size();
        if current_size + buf.len() >= FRAGMENT_BUFFER_MAX_SIZE {
            return Err(Error::FragmentBufferOverflow {
                new_size: current_size + buf.len(),
                max_size: FRAGMENT_BUFFER_MAX_SIZE,
            });
        }

        let record_layer_header = RecordLayerHeader::unmarshal(buf)?;

        // Fragment isn't a handshake, we don't need to handle it
        if record_layer_header.content_type != ContentType::Handshake {
            return Ok(false);
        }

        let mut buf = &buf[RECORD_LAYER_HEADER_SIZE..];
        while !buf.is_empty() {
            let handshake_header = HandshakeHeader::unmarshal(buf)?;

            // end index should be the length of handshake header but if the
            // handshake was fragmented, we should keep them all
            let mut end = HANDSHAKE_HEADER_LENGTH + handshake_header.fragment_length as usize;
            if end > buf.len() {
                end = buf.len();
            }

            // Discard all headers, when rebuilding the message we will
            // write a canonical one.
            let data = buf[HANDSHAKE_HEADER_LENGTH..end].to_vec();

            self.cache
                .entry(handshake_header.message_sequence)
                .or_insert_with(Vec::new)
                .push(Fragment {
                    record_layer_header,
                    handshake_header,
                    data,
                });
            buf = &buf[end..];
        }

        Ok(true)
    }

    // pop returns the message at the current sequence cursor once every
    // fragment of it has arrived, as canonical non-fragmented bytes plus
    // the epoch it was received in.
    pub fn pop(&mut self) -> Option<(Vec<u8>, u16)> {
        let seq = self.current_message_sequence_number;

        let (content, epoch) = {
            let frags = match self.cache.get(&seq) {
                Some(frags) => frags,
                None => return None,
            };

            let mut raw_message = Vec::new();
            // Recursively collect up
            if !append_message(0, frags, &mut raw_message) {
                return None;
            }

            let mut first_header = frags[0].handshake_header;
            first_header.fragment_offset = 0;
            first_header.fragment_length = first_header.length;

            let mut content = first_header.marshal();
            content.extend_from_slice(&raw_message);

            (content, frags[0].record_layer_header.epoch)
        };

        self.cache.remove(&seq);
        self.current_message_sequence_number += 1;

        Some((content, epoch))
    }

    fn size(&self) -> usize {
        self.cache
            .values()
            .map(|frags| frags.iter().map(|f| f.data.len()).sum::<usize>())
            .sum()
    }
}

// append_message walks the fragments depth first: find the fragment at
// the target offset, recurse for the remainder of the message, then
// prepend this fragment's data so the result comes out in forward byte
// order.
fn append_message(target_offset: u32, frags: &[Fragment], raw_message: &mut Vec<u8>) -> bool {
    for f in frags {
        if f.handshake_header.fragment_offset == target_offset {
            let fragment_end = f.handshake_header.fragment_offset + f.handshake_header.fragment_length;

            // The zero length check MUST come before the recursive call,
            // an empty fragment would recurse on the same offset forever.
            if fragment_end != f.handshake_header.length
                && f.handshake_header.fragment_length != 0
                && !append_message(fragment_end, frags, raw_message)
            {
                return false;
            }

            let mut message = Vec::with_capacity(f.data.len() + raw_message.len());
            message.extend_from_slice(&f.data);
            message.extend_from_slice(raw_message);
            *raw_message = message;
            return true;
        }
    }

    false
}
