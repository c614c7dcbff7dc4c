//! Varint delta codec — compact binary serialization for ContentDelta
//!
//! Encodes delta operations into a compact byte stream using LEB128
//! varint encoding. A keystroke-sized edit costs about a dozen bytes,
//! which is what the history accounts against when reporting memory use.
//!
//! Format: `[u32 LE before_hash] [u32 LE after_hash] [varint op_count] [op]*`

use crate::delta::{ContentDelta, DeltaOp};

// ── Op Type Discriminants ──────────────────────────────────────────────

const OP_RETAIN: u8 = 0x00;
const OP_DELETE: u8 = 0x01;
const OP_INSERT: u8 = 0x02;

// ── Varint (LEB128) ───────────────────────────────────────────────────

/// Encode a u64 as LEB128 varint.
#[inline]
fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

#[inline]
fn encode_usize(value: usize, buf: &mut Vec<u8>) {
    encode_varint(value as u64, buf);
}

// ── DeltaOp Codec ──────────────────────────────────────────────────────

fn encode_op(op: &DeltaOp, buf: &mut Vec<u8>) {
    match op {
        DeltaOp::Retain(n) => {
            buf.push(OP_RETAIN);
            encode_usize(*n, buf);
        }
        DeltaOp::Delete(n) => {
            buf.push(OP_DELETE);
            encode_usize(*n, buf);
        }
        DeltaOp::Insert(text) => {
            buf.push(OP_INSERT);
            encode_usize(text.len(), buf);
            buf.extend_from_slice(text.as_bytes());
        }
    }
}

/// Encode a full delta into a byte buffer.
pub(crate) fn encode_delta(delta: &ContentDelta) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    buf.extend_from_slice(&delta.before_hash.0.to_le_bytes());
    buf.extend_from_slice(&delta.after_hash.0.to_le_bytes());
    encode_usize(delta.ops.len(), &mut buf);
    for op in &delta.ops {
        encode_op(op, &mut buf);
    }
    buf
}

/// Encoded delta size in bytes.
pub fn encoded_delta_size(delta: &ContentDelta) -> usize {
    encode_delta(delta).len()
}

// ── Tests ──────────────────────────────────────────────────────────────
