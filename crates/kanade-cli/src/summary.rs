use std::path::Path;

use console::Style;
use kanade_core::engine::config::{EngineConfig, SolverVariant};
use kanade_core::engine::types::StreamSummary;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_engine_summary(config: &EngineConfig, input: &Path, output: &Path) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Kanade Registration"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(19)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!();

    // Estimation
    println!("  {}", s.header.apply_to("Estimation"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Solver"),
        s.method.apply_to(config.solver)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Reference"),
        s.method.apply_to(config.reference)
    );
    let levels = match config.num_levels {
        Some(n) => n.to_string(),
        None => "auto".to_string(),
    };
    println!(
        "    {:<12}{}",
        s.label.apply_to("Levels"),
        s.value.apply_to(levels)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Iterations"),
        s.value.apply_to(config.iterations)
    );
    println!(
        "    {:<12}{} ({})",
        s.label.apply_to("Threshold"),
        s.value.apply_to(config.gradient_threshold),
        config.gradient_term
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Seed frames"),
        s.value.apply_to(config.seed_frames)
    );
    match config.prefilter {
        Some(p) => println!(
            "    {:<12}{}",
            s.label.apply_to("Prefilter"),
            s.value.apply_to(format!("{} taps, radius {}", p.width, p.radius))
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Prefilter"),
            s.disabled.apply_to("off")
        ),
    }
    println!();

    // Output
    println!("  {}", s.header.apply_to("Output"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Transform"),
        s.method.apply_to(config.transform)
    );
    if config.solver == SolverVariant::Global {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Burn"),
            s.value.apply_to(format!("x {} / y {}", config.burn_x, config.burn_y))
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Max step"),
            s.value.apply_to(format!("{} px", config.max_step))
        );
    }
    println!();
}

pub fn print_stream_summary(summary: &StreamSummary) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(summary.frames)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Seeding"),
        s.value.apply_to(summary.skipped)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Mean motion"),
        s.value.apply_to(format!("{:.3} px", summary.mean_motion))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Max shift"),
        s.value.apply_to(format!("{:.3} px", summary.max_correction))
    );
    let fps = if summary.elapsed_ms > 0 {
        summary.frames as f64 * 1000.0 / summary.elapsed_ms as f64
    } else {
        0.0
    };
    println!(
        "    {:<12}{}",
        s.label.apply_to("Time"),
        s.value
            .apply_to(format!("{} ms ({:.1} fps)", summary.elapsed_ms, fps))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Saved"),
        s.path.apply_to(summary.output.display())
    );
    println!();
}
