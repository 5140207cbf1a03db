use std::time::Duration;

const UNIT: f64 = 1024.0;
const RATE_SUFFIXES: [&str; 6] = ["KiB/s", "MiB/s", "GiB/s", "TiB/s", "PiB/s", "EiB/s"];
const SIZE_SUFFIXES: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

fn scaled(value: f64, suffixes: &[&str; 6], base: &str) -> String {
    if value < UNIT {
        return format!("{:.0} {}", value.max(0.0), base);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = value / UNIT;
    while n >= UNIT && exp < suffixes.len() - 1 {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}", value / div, suffixes[exp])
}

pub fn human_bytes_per_sec(bps: f64) -> String {
    scaled(bps, &RATE_SUFFIXES, "B/s")
}

pub fn human_bytes(bytes: u64) -> String {
    scaled(bytes as f64, &SIZE_SUFFIXES, "B")
}

pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3600, rem % 3600);
    let (mins, secs) = (rem / 60, rem % 60);
    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes_per_sec() {
        assert_eq!(human_bytes_per_sec(0.0), "0 B/s");
        assert_eq!(human_bytes_per_sec(1023.0), "1023 B/s");
        assert_eq!(human_bytes_per_sec(1024.0), "1.0 KiB/s");
        assert_eq!(human_bytes_per_sec(1536.0), "1.5 KiB/s");
        assert_eq!(human_bytes_per_sec(5.0 * 1024.0 * 1024.0), "5.0 MiB/s");
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(59)), "00:00:59");
        assert_eq!(format_uptime(Duration::from_secs(3 * 3600 + 61)), "03:01:01");
        assert_eq!(format_uptime(Duration::from_secs(2 * 86_400 + 5)), "2d 00:00:05");
    }
}
