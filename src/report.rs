//! Console banners and end-of-run statistics.

use std::time::Duration;

pub const CHECK: &str = "\u{2714}";
pub const CROSS: &str = "\u{2717}";
pub const DOWN_ARROW: &str = "\u{2193}";

pub const HEADER_WIDTH: usize = 80;

/// Builds a fixed-width banner line, either centered or left-aligned with
/// the spacer filling the remainder.
pub fn create_header(width: usize, title: &str, center: bool, spacer: &str) -> String {
    let mut output = if center {
        let pad = width.saturating_sub(title.len()) / 2;
        format!("{}{}{}", spacer.repeat(pad), title, spacer.repeat(pad))
    } else {
        format!("{}{}", title, spacer.repeat(width.saturating_sub(title.len())))
    };

    if output.len() < width {
        output.push_str(&spacer.repeat(width - output.len()));
    }
    if output.len() > width {
        output = format!("{}\n{}", spacer.repeat(width), output);
    }
    output
}

#[derive(Debug, Clone)]
pub struct RunStats {
    pub elapsed: Duration,
    pub n_ops: Option<usize>,
    pub op_name: String,
    pub successes: Option<usize>,
    pub failures: Option<usize>,
}

pub fn report_stats(stats: &RunStats) {
    println!("{}", create_header(HEADER_WIDTH, "RUN STATS", true, "-"));

    if let (Some(successes), Some(failures)) = (stats.successes, stats.failures) {
        println!("{CHECK} {successes} | {CROSS} {failures}");
    }

    let elapsed = stats.elapsed.as_secs_f64();
    println!("elapsed time: {elapsed:.2} seconds");

    if let Some(n_ops) = stats.n_ops
        && n_ops > 0
    {
        println!(
            "elapsed time per {}: {:.2} seconds",
            stats.op_name,
            elapsed / n_ops as f64
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_header_fills_to_width() {
        let header = create_header(20, "abc", false, ".");
        assert_eq!(header.len(), 20);
        assert!(header.starts_with("abc."));
    }

    #[test]
    fn centered_header_is_padded_both_sides() {
        let header = create_header(20, "ab", true, "-");
        assert_eq!(header.len(), 20);
        assert!(header.starts_with("---------ab"));
    }

    #[test]
    fn oversized_title_spills_to_second_line() {
        let header = create_header(5, "abcdefgh", false, ".");
        assert!(header.contains('\n'));
        assert!(header.starts_with("....."));
    }

    #[test]
    fn empty_spacer_keeps_title() {
        assert_eq!(create_header(10, "abc", false, ""), "abc");
    }
}
