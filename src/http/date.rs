use std::time::{SystemTime, UNIX_EPOCH};

/// `9999-12-31T23:59:59Z`, the last instant with a four digit year.
const MAX_SECS: u64 = 253_402_300_799;

const DAY_NAMES: [&[u8; 3]; 7] = [b"Sun", b"Mon", b"Tue", b"Wed", b"Thu", b"Fri", b"Sat"];
const MONTH_NAMES: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun",
    b"Jul", b"Aug", b"Sep", b"Oct", b"Nov", b"Dec",
];

/// Create [httpdate][rfc] for current time.
///
/// [rfc]: <https://datatracker.ietf.org/doc/html/rfc9110#section-5.6.7>
#[inline]
pub fn httpdate_now() -> [u8; 29] {
    httpdate(SystemTime::now())
}

/// Create [httpdate][rfc] (RFC 1123 format) with given time.
///
/// Times before the epoch render as the epoch, times past year 9999 as its last second.
///
/// [rfc]: <https://datatracker.ietf.org/doc/html/rfc9110#section-5.6.7>
pub fn httpdate(v: SystemTime) -> [u8; 29] {
    let secs = v
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
        .min(MAX_SECS);

    let days = secs / 86400;
    let secs_of_day = secs % 86400;
    let (year, month, day) = civil_from_days(days as i64);

    let mut buf: [u8; 29] = *b"ddd, 00 mmm 0000 00:00:00 GMT";

    // 1970-01-01 was a Thursday
    buf[..3].copy_from_slice(DAY_NAMES[((days + 4) % 7) as usize]);
    put2(&mut buf[5..7], day as u64);
    buf[8..11].copy_from_slice(MONTH_NAMES[month as usize - 1]);
    put2(&mut buf[12..14], year as u64 / 100);
    put2(&mut buf[14..16], year as u64 % 100);
    put2(&mut buf[17..19], secs_of_day / 3600);
    put2(&mut buf[20..22], secs_of_day % 3600 / 60);
    put2(&mut buf[23..25], secs_of_day % 60);

    buf
}

fn put2(dst: &mut [u8], v: u64) {
    dst[0] = b'0' + (v / 10 % 10) as u8;
    dst[1] = b'0' + (v % 10) as u8;
}

/// Proleptic Gregorian `(year, month, day)` from days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    // shift the epoch to 0000-03-01 so leap days land at the end of a year
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
