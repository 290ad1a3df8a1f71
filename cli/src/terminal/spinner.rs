use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Style for spans created with `indicatif.pb_show`.
pub fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Replaces the spinner message of the current span, if it shows one.
pub fn set_message(msg: &str) {
    Span::current().pb_set_message(msg);
}
