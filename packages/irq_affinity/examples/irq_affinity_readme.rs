//! Example that demonstrates predicting the default interrupt affinity of a node.
//!
//! This shows how to use the `irq_affinity` package to compute the expected value of
//! `/proc/irq/default_smp_affinity` for both kernel isolation semantics.

use irq_affinity::{AffinityMode, build_full_mask, parse_cpu_range};
use new_zealand::nz;

fn main() {
    println!("=== IRQ Affinity README Example ===");

    let cpu_count = nz!(28_u32);
    let isolated = parse_cpu_range("0,1,3-4,11-16,23-27", Some(cpu_count)).unwrap();

    println!("Isolated processors: {isolated} ({} total)", isolated.len());
    println!("Default mask: {}", build_full_mask(cpu_count));

    for mode in [AffinityMode::ExcludeFromDefault, AffinityMode::IncludeOnly] {
        let predicted = mode.apply(cpu_count, &isolated).unwrap();

        println!(
            "{mode:?}: {predicted} (kernel format {}, processors {})",
            predicted.to_kernel_string(),
            predicted.enabled_cpus()
        );
    }

    println!("README example completed successfully!");
}
