use super::Report;

fn num(n: impl std::fmt::Display) -> String {
    n.to_string()
}

/// Builds the CSV's `(metric, value)` rows in the fixed order spec.md §6
/// lists them, with the per-scale metrics (instructions-to-barrier,
/// instructions-per-workitem, SIMD width, local memory entropy) expanded
/// into one row per scale.
pub(super) fn rows(report: &Report) -> Vec<(String, String)> {
    let c = &report.compute;
    let p = &report.parallelism;
    let m = &report.memory;
    let ct = &report.control;

    let mut rows = vec![
        ("opcode".to_owned(), num(c.unique_opcodes_for_90pct)),
        (
            "total instruction count".to_owned(),
            num(c.total_instruction_count),
        ),
        (
            "freedom to reorder".to_owned(),
            num(p.utilization.freedom_to_reorder),
        ),
        (
            "resource pressure".to_owned(),
            num(p.utilization.resource_pressure),
        ),
        ("workitems".to_owned(), num(report.threads_invoked)),
        ("operand sum".to_owned(), num(report.operand_sum)),
        (
            "total # of barriers hit".to_owned(),
            num(report.barriers_hit),
        ),
        (
            "min instructions to barrier".to_owned(),
            num(p.thread_level.min_instructions_to_barrier),
        ),
        (
            "max instructions to barrier".to_owned(),
            num(p.thread_level.max_instructions_to_barrier),
        ),
        (
            "median instructions to barrier".to_owned(),
            num(p.thread_level.median_instructions_to_barrier),
        ),
        (
            "min instructions executed by a work-item".to_owned(),
            num(p.work_distribution.min_instructions_per_workitem),
        ),
        (
            "max instructions executed by a work-item".to_owned(),
            num(p.work_distribution.max_instructions_per_workitem),
        ),
        (
            "median instructions executed by a work-item".to_owned(),
            num(p.work_distribution.median_instructions_per_workitem),
        ),
        ("max simd width".to_owned(), num(p.data.simd_max)),
        ("mean simd width".to_owned(), num(p.data.simd_mean)),
        ("stdev simd width".to_owned(), num(p.data.simd_stdev)),
        ("granularity".to_owned(), num(p.thread_level.granularity)),
        (
            "barriers per instruction".to_owned(),
            num(p.thread_level.barriers_per_instruction),
        ),
        (
            "instructions per operand".to_owned(),
            num(p.data.instructions_per_operand),
        ),
        (
            "total memory footprint".to_owned(),
            num(m.footprint.total_memory_footprint),
        ),
        (
            "90% memory footprint".to_owned(),
            num(m.footprint.footprint_90pct),
        ),
        (
            "global memory address entropy".to_owned(),
            num(m.entropy.global_entropy),
        ),
    ];

    for (i, entropy) in m.entropy.local_entropy.iter().enumerate() {
        let k = i + 1;
        rows.push((
            format!("local memory address entropy -- {k} LSBs skipped"),
            num(*entropy),
        ));
    }

    rows.extend([
        (
            "total global memory accessed".to_owned(),
            num(m.diversity.total_global_accesses),
        ),
        (
            "total local memory accessed".to_owned(),
            num(m.diversity.total_local_accesses),
        ),
        (
            "total constant memory accessed".to_owned(),
            num(m.diversity.total_constant_accesses),
        ),
        (
            "relative local memory usage".to_owned(),
            num(m.diversity.relative_local_pct),
        ),
        (
            "relative constant memory usage".to_owned(),
            num(m.diversity.relative_constant_pct),
        ),
        (
            "total unique branch instructions".to_owned(),
            num(ct.total_unique_branch_instructions),
        ),
        (
            "90% branch instructions".to_owned(),
            num(ct.branch_instructions_90pct),
        ),
        (
            "branch entropy (yokota)".to_owned(),
            num(ct.entropy.yokota_entropy),
        ),
        (
            "branch entropy (average linear)".to_owned(),
            num(ct.entropy.average_entropy),
        ),
    ]);

    rows
}
