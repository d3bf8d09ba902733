//! Shared utility functions.

/// Format bytes in human-readable form.
///
/// # Examples
///
/// ```
/// use commentctl::utils::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 bytes");
/// assert_eq!(format_bytes(512), "512 bytes");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// assert_eq!(format_bytes(1048576), "1.0 MB");
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        0 => "0 bytes".to_string(),
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{b} bytes"),
    }
}

/// Reads a yes/no answer from stdin. Anything but `y`/`yes` is a no.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed or stdin cannot be read.
pub fn confirm(prompt: &str) -> std::io::Result<bool> {
    use std::io::{BufRead, Write};

    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
