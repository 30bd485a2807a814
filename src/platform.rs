//! # Platform Module
//!
//! The deploy leans on four stock utilities. Their names and flags differ
//! between macOS and the other Unixes, so every OS-specific spelling lives here:
//!
//! | Concern        | macOS        | elsewhere     |
//! |----------------|--------------|---------------|
//! | open a folder  | `open`       | `xdg-open`    |
//! | speak          | `say`        | `spd-say`     |
//! | in-place sed   | `sed -i ''`  | `sed -i`      |
//!
//! It also owns shell quoting, since every path we hand to `/bin/sh` contains
//! `Application Support` on the machine this tool was written for.

use std::path::Path;

/// Command that opens a directory in the desktop file browser.
pub fn opener() -> &'static str {
    if cfg!(target_os = "macos") { "open" } else { "xdg-open" }
}

/// Command that speaks its arguments aloud.
pub fn speaker() -> &'static str {
    if cfg!(target_os = "macos") { "say" } else { "spd-say" }
}

/// `sed` invocation that edits a file in place without leaving a backup.
///
/// BSD sed takes the backup suffix as a separate (here empty) argument,
/// GNU sed does not accept one.
pub fn sed_in_place() -> &'static str {
    if cfg!(target_os = "macos") { "sed -i ''" } else { "sed -i" }
}

/// Quotes `raw` so that `/bin/sh` passes it through as a single word, untouched.
///
/// Words made only of safe characters are returned as is; everything else is
/// wrapped in single quotes, with embedded quotes spelled `'\''`.
pub fn quote(raw: &str) -> String {
    let safe = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if safe {
        return raw.to_string();
    }
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// `quote` for paths. Non-UTF-8 bytes are replaced, which is fine for the
/// fixed, ASCII locations this tool deals with.
pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}
