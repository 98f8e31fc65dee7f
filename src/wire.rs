//! Fixed-size wire codec for the control channel payload
//!
//! The GET/SET payload is a bit-exact contract shared with the admin
//! client: `flags` (u32), `uids` (128 x u64), `uids_num` (u64), all
//! little-endian and packed. Either the full exchange succeeds or nothing
//! is copied; length mismatches and an out-of-range count are rejected
//! before any state is touched.

use crate::control::ControlError;
use crate::policy::{Policy, PolicyFlags, MAX_UIDS};

/// Exact byte length of the control payload
pub const WIRE_LEN: usize = 4 + MAX_UIDS * 8 + 8;

const UIDS_OFFSET: usize = 4;
const COUNT_OFFSET: usize = UIDS_OFFSET + MAX_UIDS * 8;

/// Serialize a policy into a caller-supplied buffer of exactly [`WIRE_LEN`]
/// bytes. Array slots beyond the valid count are written as zero so a GET
/// never leaks stale entries from earlier, longer lists.
pub fn encode(policy: &Policy, buf: &mut [u8]) -> Result<(), ControlError> {
    if buf.len() != WIRE_LEN {
        return Err(ControlError::InvalidArgument("payload length mismatch"));
    }
    if policy.uids.len() > MAX_UIDS {
        return Err(ControlError::InvalidArgument("uid list exceeds capacity"));
    }

    buf[..UIDS_OFFSET].copy_from_slice(&policy.flags.to_bits().to_le_bytes());
    buf[UIDS_OFFSET..COUNT_OFFSET].fill(0);
    for (i, uid) in policy.uids.iter().enumerate() {
        let at = UIDS_OFFSET + i * 8;
        buf[at..at + 8].copy_from_slice(&uid.to_le_bytes());
    }
    buf[COUNT_OFFSET..].copy_from_slice(&(policy.uids.len() as u64).to_le_bytes());
    Ok(())
}

/// Serialize a policy into a freshly allocated exact-size buffer.
pub fn encode_vec(policy: &Policy) -> Result<Vec<u8>, ControlError> {
    let mut buf = vec![0u8; WIRE_LEN];
    encode(policy, &mut buf)?;
    Ok(buf)
}

/// Deserialize a candidate policy from a buffer of exactly [`WIRE_LEN`]
/// bytes. A count above capacity is rejected rather than truncated.
pub fn decode(buf: &[u8]) -> Result<Policy, ControlError> {
    if buf.len() != WIRE_LEN {
        return Err(ControlError::InvalidArgument("payload length mismatch"));
    }

    let mut flag_bytes = [0u8; 4];
    flag_bytes.copy_from_slice(&buf[..UIDS_OFFSET]);
    let flags = PolicyFlags::from_bits(u32::from_le_bytes(flag_bytes));

    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&buf[COUNT_OFFSET..]);
    let count = u64::from_le_bytes(count_bytes);
    if count > MAX_UIDS as u64 {
        return Err(ControlError::InvalidArgument("uid count exceeds capacity"));
    }

    let mut uids = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let at = UIDS_OFFSET + i * 8;
        let mut uid_bytes = [0u8; 8];
        uid_bytes.copy_from_slice(&buf[at..at + 8]);
        uids.push(u64::from_le_bytes(uid_bytes));
    }

    Ok(Policy { flags, uids })
}
