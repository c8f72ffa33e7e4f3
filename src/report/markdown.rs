//! Stdout rendering, grouped into the same four sections as [`super::Report`].

use super::stats::grouped;
use super::Report;

fn table(rows: &[(&str, String)]) -> String {
    let mut out = String::from("| metric | value |\n|---|---|\n");
    for (name, value) in rows {
        out.push_str(&format!("| {name} | {value} |\n"));
    }
    out
}

pub(super) fn render(report: &Report) -> String {
    let c = &report.compute;
    let p = &report.parallelism;
    let m = &report.memory;
    let ct = &report.control;

    let mut out = String::new();
    out.push_str(&format!(
        "# Architecture-Independent Workload Characterization of kernel: {}\n\n",
        report.kernel_name
    ));

    out.push_str("## Compute\n\n");
    out.push_str(&table(&[
        (
            "total instruction count",
            grouped(c.total_instruction_count),
        ),
        (
            "unique opcodes for 90% coverage",
            c.unique_opcodes_for_90pct.to_string(),
        ),
    ]));
    let top_opcodes: Vec<String> = c
        .ranked_opcodes
        .iter()
        .take(c.unique_opcodes_for_90pct.max(1))
        .map(|(name, count)| format!("{name} ({count})"))
        .collect();
    if !top_opcodes.is_empty() {
        out.push_str(&format!("\nopcodes covering 90%: {}\n", top_opcodes.join(", ")));
    }
    out.push('\n');

    out.push_str("## Parallelism\n\n");
    out.push_str("### Utilization\n\n");
    out.push_str(&table(&[
        (
            "freedom to reorder",
            format!("{:.3}", p.utilization.freedom_to_reorder),
        ),
        (
            "resource pressure",
            format!("{:.3}", p.utilization.resource_pressure),
        ),
    ]));
    out.push_str("\n### Thread-Level Parallelism\n\n");
    out.push_str(&table(&[
        (
            "min instructions to barrier",
            p.thread_level.min_instructions_to_barrier.to_string(),
        ),
        (
            "max instructions to barrier",
            p.thread_level.max_instructions_to_barrier.to_string(),
        ),
        (
            "median instructions to barrier",
            p.thread_level.median_instructions_to_barrier.to_string(),
        ),
        (
            "barriers per instruction",
            format!("{:.3}", p.thread_level.barriers_per_instruction),
        ),
        ("granularity", format!("{:.6}", p.thread_level.granularity)),
    ]));
    out.push_str("\n### Work Distribution\n\n");
    out.push_str(&table(&[
        (
            "min instructions executed by a work-item",
            p.work_distribution.min_instructions_per_workitem.to_string(),
        ),
        (
            "max instructions executed by a work-item",
            p.work_distribution.max_instructions_per_workitem.to_string(),
        ),
        (
            "median instructions executed by a work-item",
            p.work_distribution.median_instructions_per_workitem.to_string(),
        ),
    ]));
    out.push_str("\n### Data Parallelism\n\n");
    out.push_str(&table(&[
        ("min simd width", p.data.simd_min.to_string()),
        ("max simd width", p.data.simd_max.to_string()),
        ("mean simd width", format!("{:.3}", p.data.simd_mean)),
        ("stdev simd width", format!("{:.3}", p.data.simd_stdev)),
        (
            "instructions per operand",
            format!("{:.3}", p.data.instructions_per_operand),
        ),
    ]));
    out.push('\n');

    out.push_str("## Memory\n\n");
    out.push_str("### Memory Footprint\n\n");
    out.push_str(&table(&[
        (
            "total memory footprint",
            m.footprint.total_memory_footprint.to_string(),
        ),
        ("90% memory footprint", m.footprint.footprint_90pct.to_string()),
        (
            "memory access count",
            grouped(m.footprint.memory_access_count),
        ),
    ]));
    out.push_str("\n### Memory Entropy\n\n");
    out.push_str(&table(&[(
        "global memory address entropy",
        format!("{:.4}", m.entropy.global_entropy),
    )]));
    let local_entropy_labels: Vec<(String, String)> = m
        .entropy
        .local_entropy
        .iter()
        .enumerate()
        .map(|(i, v)| {
            (
                format!("local memory address entropy -- {} LSBs skipped", i + 1),
                format!("{v:.4}"),
            )
        })
        .collect();
    out.push_str(&table(
        &local_entropy_labels
            .iter()
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect::<Vec<_>>(),
    ));
    out.push_str("\n### Memory Diversity\n\n");
    out.push_str(&table(&[
        (
            "total global memory accessed",
            grouped(m.diversity.total_global_accesses),
        ),
        (
            "total local memory accessed",
            grouped(m.diversity.total_local_accesses),
        ),
        (
            "total constant memory accessed",
            grouped(m.diversity.total_constant_accesses),
        ),
        (
            "relative local memory usage",
            format!("{:.2}%", m.diversity.relative_local_pct),
        ),
        (
            "relative constant memory usage",
            format!("{:.2}%", m.diversity.relative_constant_pct),
        ),
    ]));
    out.push('\n');

    out.push_str("## Control\n\n");
    out.push_str(&table(&[
        (
            "total unique branch instructions",
            ct.total_unique_branch_instructions.to_string(),
        ),
        (
            "90% branch instructions",
            ct.branch_instructions_90pct.to_string(),
        ),
    ]));
    out.push_str("\n### Branch Entropy\n\n");
    out.push_str(&table(&[
        (
            "branch entropy (yokota)",
            format!("{:.4}", ct.entropy.yokota_entropy),
        ),
        (
            "branch entropy (average linear)",
            format!("{:.4}", ct.entropy.average_entropy),
        ),
    ]));

    out
}
