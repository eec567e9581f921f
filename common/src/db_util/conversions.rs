//! Safe conversions between rust and sql integer types.

use super::*;

pub fn i32_to_u32(i: i32) -> Result<u32> {
    u32::try_from(i).map_err(|_| anyhow!("i32 value {i} is negative"))
}

pub fn u32_to_i32(i: u32) -> Result<i32> {
    i32::try_from(i).map_err(|_| anyhow!("u32 value {i} exceeds i32::MAX"))
}

pub fn usize_to_i64(i: usize) -> Result<i64> {
    i64::try_from(i).map_err(|_| anyhow!("usize value {i} exceeds i64::MAX"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_signed_unsigned_round_trip() {
        assert_eq!(i32_to_u32(7).unwrap(), 7);
        assert_eq!(u32_to_i32(7).unwrap(), 7);
        assert!(i32_to_u32(-1).is_err());
        assert!(u32_to_i32(u32::MAX).is_err());
    }
}
