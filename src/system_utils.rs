use {std::sync::OnceLock, sysinfo::System};

static SYSTEM: OnceLock<System> = OnceLock::new();

pub(crate) fn cpu_count() -> usize {
    SYSTEM
        .get_or_init(|| {
            let mut system = System::new();
            system.refresh_cpu_all();
            system
        })
        .cpus()
        .len()
        .max(1)
}

/// Worker count for mining: `requested`, capped at the available cores.
pub(crate) fn parallelism(requested: Option<usize>) -> usize {
    let available = cpu_count();

    requested
        .map(|requested| requested.clamp(1, available))
        .unwrap_or(available)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_count_is_positive() {
        assert!(cpu_count() >= 1);
    }

    #[test]
    fn parallelism_is_capped() {
        assert_eq!(parallelism(Some(0)), 1);
        assert_eq!(parallelism(Some(usize::MAX)), cpu_count());
        assert_eq!(parallelism(None), cpu_count());
    }
}
