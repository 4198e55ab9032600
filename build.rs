//! Embeds a UTC build stamp for `ndnetcdf version`.
//!
//! `SOURCE_DATE_EPOCH` pins the stamp for reproducible builds.

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

fn build_time() -> OffsetDateTime {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let stamp = build_time()
        .replace_nanosecond(0)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=NDNETCDF_BUILD_STAMP={}", stamp);
}
