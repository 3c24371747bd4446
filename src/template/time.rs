//! Wall-clock timestamps as milliseconds since the Unix epoch.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{Template, Templated};
use crate::error::{MsgPackError, Result};
use crate::io::{Input, Output};
use crate::packer::Packer;
use crate::unpacker::Unpacker;

/// Writes a [`SystemTime`] as a signed 64-bit millisecond count; instants
/// before the epoch are negative. Sub-millisecond precision is dropped by
/// rounding toward the past.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeTemplate;

/// Floors to whole milliseconds on both sides of the epoch.
fn to_millis(t: &SystemTime) -> Result<i64> {
    let millis = match t.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_millis()),
        Err(e) => {
            let before = e.duration();
            let partial = u128::from(before.subsec_nanos() % 1_000_000 != 0);
            i64::try_from(before.as_millis() + partial).map(|m| -m)
        }
    };
    millis.map_err(|_| MsgPackError::Type("timestamp out of the 64-bit millisecond range".into()))
}

fn from_millis(millis: i64) -> Result<SystemTime> {
    let offset = Duration::from_millis(millis.unsigned_abs());
    let t = if millis >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    };
    t.ok_or_else(|| MsgPackError::Type(format!("timestamp {millis}ms is not representable")))
}

impl Template<SystemTime> for SystemTimeTemplate {
    fn write_present<O: Output>(&self, pk: &mut Packer<O>, value: &SystemTime) -> Result<()> {
        pk.write_i64(to_millis(value)?)
    }

    fn read_present<I: Input>(&self, u: &mut Unpacker<I>, _to: Option<SystemTime>) -> Result<SystemTime> {
        from_millis(u.read_i64()?)
    }
}

impl Templated for SystemTime {
    type Template = SystemTimeTemplate;

    fn template() -> SystemTimeTemplate {
        SystemTimeTemplate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(t: SystemTime) -> (SystemTime, usize, u64) {
        let mut pk = Packer::new(Vec::new());
        pk.pack(&t).unwrap();
        let bytes = pk.into_inner();
        let mut u = Unpacker::new(&bytes[..]);
        u.reset_read_byte_count();
        let back = u.unpack::<SystemTime>().unwrap();
        (back, bytes.len(), u.read_byte_count())
    }

    #[test]
    fn whole_milliseconds_round_trip() {
        for millis in [0i64, 1, 1_700_000_000_123, -86_400_000] {
            let t = from_millis(millis).unwrap();
            let (back, len, consumed) = round_trip(t);
            assert_eq!(back, t, "failed for {millis}");
            assert_eq!(len as u64, consumed);
        }
    }

    #[test]
    fn sub_millisecond_precision_is_dropped() {
        let t = UNIX_EPOCH + Duration::from_micros(1_500);
        let (back, _, _) = round_trip(t);
        assert_eq!(back, UNIX_EPOCH + Duration::from_millis(1));
    }

    #[test]
    fn instants_before_the_epoch_round_toward_the_past() {
        let t = UNIX_EPOCH - Duration::from_micros(1_500);
        assert_eq!(to_millis(&t).unwrap(), -2);
        let (back, _, _) = round_trip(t);
        assert_eq!(back, UNIX_EPOCH - Duration::from_millis(2));

        let exact = UNIX_EPOCH - Duration::from_millis(3);
        assert_eq!(to_millis(&exact).unwrap(), -3);
    }

    #[test]
    fn optional_time_reads_absent_from_nil() {
        let bytes = [0xC0];
        let mut u = Unpacker::new(&bytes[..]);
        assert_eq!(SystemTimeTemplate.read(&mut u, None, false).unwrap(), None);
    }
}
