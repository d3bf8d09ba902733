//! Terminal output helpers.

/// Width of error box separators.
const ERROR_BOX_WIDTH: usize = 60;

/// Print an error box with a title and optional detail lines.
///
/// Outputs:
/// ```text
/// ============================================================
/// Backup failed
/// ============================================================
///
/// <detail>
/// ```
pub fn print_error_box(title: &str, detail: Option<&str>) {
    eprintln!("\n{}", "=".repeat(ERROR_BOX_WIDTH));
    eprintln!("{title}");
    eprintln!("{}", "=".repeat(ERROR_BOX_WIDTH));

    if let Some(detail) = detail
        && !detail.is_empty()
    {
        eprintln!("\n{detail}");
    }
}

/// Print a titled section header.
pub fn print_header(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
}
