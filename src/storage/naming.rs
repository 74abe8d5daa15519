//! Naming allocator
//!
//! Picks the on-disk filename for an upload. The candidate comes from the
//! original filename and an optional desired name; collisions are resolved
//! by appending `_{n}` before the extension until the name is free.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use log::debug;

/// Reduces a client supplied name to its final component so it can never
/// address anything but a direct child of the target directory.
pub fn sanitize_name(name: &str) -> Option<String> {
    let last = name
        .trim()
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim();

    match last {
        "" | "." | ".." => None,
        _ if last.contains('\0') => None,
        _ => Some(last.to_string()),
    }
}

/// Splits `name` into base and extension, the extension keeping its dot.
///
/// A leading dot does not start an extension, so `.env` has none.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// First candidate for the final filename, before collision resolution.
///
/// A desired name carrying its own extension wins verbatim; otherwise the
/// original file's extension is appended to it.
pub fn candidate_name(original: &str, desired: Option<&str>) -> String {
    match desired.and_then(sanitize_name) {
        None => original.to_string(),
        Some(desired) => {
            let (_, desired_ext) = split_extension(&desired);
            if desired_ext.len() > 1 {
                desired
            } else {
                let (_, original_ext) = split_extension(original);
                format!("{}{}", desired.trim_end_matches('.'), original_ext)
            }
        }
    }
}

const STAGING_SUFFIX: &str = ".upload";

/// Hidden sibling an upload streams into before it is renamed over `name`.
pub fn staging_name(name: &str) -> String {
    format!(".{name}{STAGING_SUFFIX}")
}

/// True for names shaped like [`staging_name`] output; listings skip them and
/// uploads may not claim them.
pub fn is_staging_name(name: &str) -> bool {
    name.len() > 1 + STAGING_SUFFIX.len()
        && name.starts_with('.')
        && name.ends_with(STAGING_SUFFIX)
}

/// Creates a fresh staging file for `name` in `dir`. A leftover staging file
/// from an earlier crash is left alone and a numbered variant is used.
pub fn reserve_staging(dir: &Path, name: &str) -> io::Result<(String, File)> {
    let numbered = (1u64..).map(|n| format!(".{name}.{n}{STAGING_SUFFIX}"));

    for staging in std::iter::once(staging_name(name)).chain(numbered) {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&staging))
        {
            Ok(file) => return Ok((staging, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free staging name left for {name}"),
    ))
}

/// The sequence `name`, `base_1.ext`, `base_2.ext`, ...
pub struct Candidates {
    base: String,
    ext: String,
    first: Option<String>,
    counter: u64,
}

impl Candidates {
    pub fn new(name: &str) -> Self {
        let (base, ext) = split_extension(name);
        Self {
            base: base.to_string(),
            ext: ext.to_string(),
            first: Some(name.to_string()),
            counter: 0,
        }
    }
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(first) = self.first.take() {
            return Some(first);
        }
        self.counter = self.counter.checked_add(1)?;
        Some(format!("{}_{}{}", self.base, self.counter, self.ext))
    }
}

/// Check-based allocation: the first candidate with no entry in `dir`.
///
/// Deterministic for a given directory state but not atomic; uploads go
/// through [`reserve`] instead.
pub fn allocate(dir: &Path, original: &str, desired: Option<&str>) -> String {
    let candidate = candidate_name(original, desired);
    Candidates::new(&candidate)
        .find(|name| dir.join(name).symlink_metadata().is_err())
        .unwrap_or(candidate)
}

/// Atomic allocation: creates the first free candidate with `create_new` and
/// returns its name along with the open, empty file. A concurrent upload that
/// claims the same name first just pushes this one to the next counter.
pub fn reserve(dir: &Path, original: &str, desired: Option<&str>) -> io::Result<(String, File)> {
    let candidate = candidate_name(original, desired);
    if is_staging_name(&candidate) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{candidate} is reserved for in-progress uploads"),
        ));
    }

    for name in Candidates::new(&candidate) {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
        {
            Ok(file) => {
                debug!("Reserved {} in {}", name, dir.display());
                return Ok((name, file));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name left for {candidate}"),
    ))
}
