//! End-of-run summary table.

use scriptor_core::RunSummary;

/// Render the summary block printed after a run.
pub fn format_summary(summary: &RunSummary, provider: &str, model: &str) -> String {
    let average = summary
        .average_output_tokens
        .map(|avg| format!("{avg:>8.1}"))
        .unwrap_or_else(|| format!("{:>8}", "n/a"));

    let lines = [
        String::new(),
        "  ====================================".to_string(),
        "               Summary".to_string(),
        "  ====================================".to_string(),
        format!("    Provider:     {provider} ({model})"),
        format!("    Files:        {:>8}", summary.files_processed),
        format!("    Duration:     {:>7.2}s", summary.elapsed_secs),
        "  ------------------------------------".to_string(),
        format!("    Tokens in:    {:>8}", summary.input_tokens),
        format!("    Tokens out:   {:>8}", summary.output_tokens),
        format!("    Avg out/file: {average}"),
        "  ------------------------------------".to_string(),
        format!("    Cost in:      ${:>7.2}", summary.input_cost_usd),
        format!("    Cost out:     ${:>7.2}", summary.output_cost_usd),
        format!("    Cost total:   ${:>7.2}", summary.total_cost_usd),
        "  ====================================".to_string(),
    ];
    lines.join("\n")
}

/// Print the summary to stderr (stdout is left for dry-run listings).
pub fn print_summary(summary: &RunSummary, provider: &str, model: &str) {
    eprintln!("{}", format_summary(summary, provider, model));
}
