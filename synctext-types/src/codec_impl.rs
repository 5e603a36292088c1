//! Wire codec for [`Update`] (spec.md §4.1).
//!
//! Format: `op|line|startCol|endCol|ts|uid|len(prev)|prev|len(next)|next`
//!
//! The two length prefixes bound the bytes that follow exactly, so `prev`
//! and `next` may contain `'|'` without being mistaken for a delimiter.

use crate::{Error, Result, Uid, Update, UpdateOp, WallClock};

/// Serializes an `Update` into its wire form.
#[must_use]
pub fn encode(u: &Update) -> String {
    let mut s = String::with_capacity(32 + u.prev.len() + u.next.len());
    s.push_str(u.op.as_token());
    s.push('|');
    s.push_str(&u.line.to_string());
    s.push('|');
    s.push_str(&u.start_col.to_string());
    s.push('|');
    s.push_str(&u.end_col.to_string());
    s.push('|');
    s.push_str(&u.ts.as_secs().to_string());
    s.push('|');
    s.push_str(u.uid.as_str());
    s.push('|');
    s.push_str(&u.prev.len().to_string());
    s.push('|');
    s.push_str(&u.prev);
    s.push('|');
    s.push_str(&u.next.len().to_string());
    s.push('|');
    s.push_str(&u.next);
    s
}

/// Deserializes an `Update` from its wire form.
///
/// Fails with [`Error::Malformed`] if any tokenization step runs off the
/// end of the input, an integer field fails to parse, or a length prefix
/// exceeds the remaining payload.
pub fn decode(s: &str) -> Result<Update> {
    let mut pos = 0usize;
    let bytes = s.as_bytes();

    let mut next_token = |pos: &mut usize| -> Result<String> {
        let rest = &s[*pos..];
        let idx = rest
            .find('|')
            .ok_or_else(|| Error::Malformed("ran off end of message".to_string()))?;
        let tok = rest[..idx].to_string();
        *pos += idx + 1;
        Ok(tok)
    };

    let op_tok = next_token(&mut pos)?;
    let op = UpdateOp::from_token(&op_tok)
        .ok_or_else(|| Error::Malformed(format!("unknown op {op_tok:?}")))?;

    let line: i64 = next_token(&mut pos)?
        .parse()
        .map_err(|_| Error::Malformed("bad line".to_string()))?;
    let start_col: i64 = next_token(&mut pos)?
        .parse()
        .map_err(|_| Error::Malformed("bad startCol".to_string()))?;
    let end_col: i64 = next_token(&mut pos)?
        .parse()
        .map_err(|_| Error::Malformed("bad endCol".to_string()))?;
    let ts: u64 = next_token(&mut pos)?
        .parse()
        .map_err(|_| Error::Malformed("bad ts".to_string()))?;
    let uid_tok = next_token(&mut pos)?;
    let uid = Uid::new(uid_tok).map_err(|_| Error::Malformed("bad uid".to_string()))?;

    let prev_len: usize = next_token(&mut pos)?
        .parse()
        .map_err(|_| Error::Malformed("bad prev length".to_string()))?;
    if pos + prev_len > bytes.len() {
        return Err(Error::Malformed("prev length exceeds payload".to_string()));
    }
    let prev = s[pos..pos + prev_len].to_string();
    pos += prev_len;

    if pos >= bytes.len() || bytes[pos] != b'|' {
        return Err(Error::Malformed("missing separator after prev".to_string()));
    }
    pos += 1;

    let next_len_tok = {
        let rest = &s[pos..];
        let idx = rest
            .find('|')
            .ok_or_else(|| Error::Malformed("ran off end of message".to_string()))?;
        let tok = rest[..idx].to_string();
        pos += idx + 1;
        tok
    };
    let next_len: usize = next_len_tok
        .parse()
        .map_err(|_| Error::Malformed("bad next length".to_string()))?;
    if pos + next_len > bytes.len() {
        return Err(Error::Malformed("next length exceeds payload".to_string()));
    }
    let next = s[pos..pos + next_len].to_string();

    Ok(Update {
        op,
        line,
        start_col,
        end_col,
        prev,
        next,
        ts: WallClock::from_secs(ts),
        uid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Update {
        Update::replace(
            3,
            1,
            4,
            "ab|c",
            "xy|z",
            WallClock::from_secs(12345),
            Uid::new("peer-a").unwrap(),
        )
    }

    #[test]
    fn round_trips_with_pipe_in_payload() {
        let u = sample();
        let encoded = encode(&u);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(u, decoded);
    }

    #[test]
    fn rejects_truncated_message() {
        assert!(decode("insert|0|0|0|1|a|5|hel").is_err());
    }

    #[test]
    fn rejects_bad_integer() {
        assert!(decode("insert|x|0|0|1|a|0||0|").is_err());
    }

    #[test]
    fn rejects_oversized_length_prefix() {
        assert!(decode("insert|0|0|0|1|a|999|short|0|").is_err());
    }

    #[test]
    fn rejects_unknown_op() {
        assert!(decode("frobnicate|0|0|0|1|a|0||0|").is_err());
    }

    #[test]
    fn round_trips_empty_fields() {
        let u = Update::insert(0, 0, "", WallClock::from_secs(0), Uid::new("p").unwrap());
        let decoded = decode(&encode(&u)).unwrap();
        assert_eq!(u, decoded);
    }

    proptest::proptest! {
        #[test]
        fn round_trip_arbitrary_text(
            prev in "[a-zA-Z0-9 |]{0,40}",
            next in "[a-zA-Z0-9 |]{0,40}",
            line in 0i64..10_000,
            start_col in 0i64..1000,
            ts in 0u64..10_000_000,
        ) {
            let u = Update::replace(
                line,
                start_col,
                start_col + prev.len() as i64,
                prev,
                next,
                WallClock::from_secs(ts),
                Uid::new("peer").unwrap(),
            );
            let decoded = decode(&encode(&u)).unwrap();
            prop_assert_eq!(u, decoded);
        }
    }
}
